use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use evo_core::{NaturalUnits, PhaseState, linspace};
use evo_df::DehnenDf;
use evo_moments::{
    DirectOptions, EvolvedDiskDf, MomentSet, OortConstants, Sampling, SeriesSampling,
};
use evo_orbit::integrate;
use serde::Serialize;

mod error;
mod scenario;

use error::CliResult;
use scenario::Scenario;

#[derive(Parser)]
#[command(name = "evodisk")]
#[command(about = "Evolved disk distribution function CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Velocity moments at the scenario's evaluation point
    Moments {
        /// Path to the scenario YAML file
        scenario: PathBuf,
        /// Integrate velocity space adaptively instead of on a grid
        #[arg(long)]
        direct: bool,
        /// Fail instead of warning when grid nodes fail to integrate
        #[arg(long)]
        strict: bool,
        /// Comma-separated times to evaluate at instead of the scenario's t
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
        times: Vec<f64>,
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// Oort constants at the scenario's evaluation point
    Oort {
        /// Path to the scenario YAML file
        scenario: PathBuf,
        #[arg(long)]
        strict: bool,
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// Integrate one orbit from the scenario's evaluation point
    Orbit {
        /// Path to the scenario YAML file
        scenario: PathBuf,
        /// Initial radial velocity
        #[arg(long, default_value_t = 0.0)]
        vr: f64,
        /// Initial tangential velocity
        #[arg(long, default_value_t = 1.0)]
        vt: f64,
        /// End time (defaults to t0)
        #[arg(long)]
        t_end: Option<f64>,
        /// Number of output times
        #[arg(long, default_value_t = 101)]
        samples: usize,
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Moments {
            scenario,
            direct,
            strict,
            times,
            format,
        } => cmd_moments(&scenario, direct, strict, &times, format),
        Commands::Oort {
            scenario,
            strict,
            format,
        } => cmd_oort(&scenario, strict, format),
        Commands::Orbit {
            scenario,
            vr,
            vt,
            t_end,
            samples,
            format,
        } => cmd_orbit(&scenario, vr, vt, t_end, samples, format),
    }
}

fn build_edf(scenario: &Scenario, strict: bool) -> CliResult<EvolvedDiskDf<DehnenDf>> {
    let edf = EvolvedDiskDf::new(
        scenario.initial_df(),
        &scenario.potentials()?,
        scenario.t0,
        scenario.integration,
    )?;
    Ok(edf.strict(strict))
}

fn cmd_moments(
    path: &Path,
    direct: bool,
    strict: bool,
    times: &[f64],
    format: Format,
) -> CliResult<()> {
    let scenario = Scenario::load(path)?;
    let edf = build_edf(&scenario, strict)?;
    if !times.is_empty() {
        return moment_series(&scenario, &edf, direct, times, format);
    }
    let sampling = if direct {
        Sampling::Direct(DirectOptions::default())
    } else {
        Sampling::Build(scenario.grid)
    };
    tracing::info!(
        r = scenario.point.r,
        phi = scenario.point.phi,
        t = scenario.point.t,
        direct,
        "computing moments"
    );
    let m = edf.moment_set(&scenario.point, sampling)?;

    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&m)?),
        Format::Text => print_moments(&m, scenario.physical.as_ref()),
    }
    Ok(())
}

#[derive(Serialize)]
struct TimedMoments {
    t: f64,
    #[serde(flatten)]
    moments: MomentSet,
}

fn moment_series(
    scenario: &Scenario,
    edf: &EvolvedDiskDf<DehnenDf>,
    direct: bool,
    times: &[f64],
    format: Format,
) -> CliResult<()> {
    let sampling = if direct {
        SeriesSampling::Direct(DirectOptions::default())
    } else {
        SeriesSampling::Build(scenario.grid)
    };
    let (r, phi) = (scenario.point.r, scenario.point.phi);
    tracing::info!(r, phi, times = times.len(), direct, "computing moment series");
    let series = edf.moment_series(r, phi, times, sampling)?;

    let rows: Vec<TimedMoments> = times
        .iter()
        .zip(series)
        .map(|(&t, moments)| TimedMoments { t, moments })
        .collect();
    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
        Format::Text => {
            for (k, row) in rows.iter().enumerate() {
                if k > 0 {
                    println!();
                }
                println!("t = {}", row.t);
                print_moments(&row.moments, scenario.physical.as_ref());
            }
        }
    }
    Ok(())
}

fn print_moments(m: &MomentSet, units: Option<&NaturalUnits>) {
    println!("Surface mass:      {:.6e}", m.surface_mass);
    println!("Mean vR:           {:.6}", m.mean_vr);
    println!("Mean vT:           {:.6}", m.mean_vt);
    println!("Sigma_R^2:         {:.6}", m.sigma_r2);
    println!("Sigma_T^2:         {:.6}", m.sigma_t2);
    println!("Sigma_RT:          {:.6}", m.sigma_rt);
    println!("Vertex deviation:  {:.4} deg", m.vertex_deviation);
    if let Some(u) = units {
        println!();
        println!("Mean vT:           {:.2} km/s", u.kms(m.mean_vt));
        println!("Sigma_R:           {:.2} km/s", u.kms2(m.sigma_r2).sqrt());
        println!("Sigma_T:           {:.2} km/s", u.kms2(m.sigma_t2).sqrt());
    }
}

fn cmd_oort(path: &Path, strict: bool, format: Format) -> CliResult<()> {
    let scenario = Scenario::load(path)?;
    let edf = build_edf(&scenario, strict)?;
    let grids = edf.oort_grids(&scenario.point, &scenario.oort_options())?;
    let oort = edf.oort_constants(&scenario.point, &grids)?;

    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&oort)?),
        Format::Text => print_oort(&oort, scenario.physical.as_ref()),
    }
    Ok(())
}

fn print_oort(o: &OortConstants, units: Option<&NaturalUnits>) {
    for (name, v) in [("A", o.a), ("B", o.b), ("C", o.c), ("K", o.k)] {
        match units {
            Some(u) => println!("{name}: {v:>10.6}   ({:.3} km/s/kpc)", u.kms_per_kpc(v)),
            None => println!("{name}: {v:>10.6}"),
        }
    }
}

#[derive(Serialize)]
struct OrbitRow {
    t: f64,
    r: f64,
    vr: f64,
    vt: f64,
    phi: f64,
}

/// `samples` times from `start` to `end`; a single time when they coincide.
fn output_times(start: f64, end: f64, samples: usize) -> Vec<f64> {
    if end == start {
        vec![start]
    } else {
        linspace(start, end, samples.max(2))
    }
}

fn cmd_orbit(
    path: &Path,
    vr: f64,
    vt: f64,
    t_end: Option<f64>,
    samples: usize,
    format: Format,
) -> CliResult<()> {
    let scenario = Scenario::load(path)?;
    let p = scenario.point;
    let init = PhaseState::new(p.r, vr, vt, p.phi);
    let times = output_times(p.t, t_end.unwrap_or(scenario.t0), samples);
    let traj = integrate(&scenario.potentials()?, init, &times, &scenario.integration)?;
    tracing::info!(
        accepted = traj.stats.accepted_steps,
        rejected = traj.stats.rejected_steps,
        evaluations = traj.stats.force_evaluations,
        "orbit integrated"
    );

    let rows: Vec<OrbitRow> = traj
        .t
        .iter()
        .zip(&traj.states)
        .map(|(&t, s)| OrbitRow {
            t,
            r: s.r,
            vr: s.vr,
            vt: s.vt,
            phi: s.phi,
        })
        .collect();

    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
        Format::Text => {
            println!("{:>12} {:>12} {:>12} {:>12} {:>12}", "t", "R", "vR", "vT", "phi");
            for row in &rows {
                println!(
                    "{:>12.6} {:>12.6} {:>12.6} {:>12.6} {:>12.6}",
                    row.t, row.r, row.vr, row.vt, row.phi
                );
            }
        }
    }
    Ok(())
}
