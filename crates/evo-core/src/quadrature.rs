//! One-dimensional quadrature rules.
//!
//! - Composite Simpson weights for equally spaced lattices (used by the
//!   velocity grids, where the nodes are fixed in advance)
//! - Adaptive Gauss-Kronrod (7/15) integration for smooth integrands where
//!   the nodes can be chosen freely
//!
//! The adaptive rule evaluates the 15 nodes of each panel in parallel, so
//! integrands must be `Sync`.

use rayon::prelude::*;

use crate::error::EvoError;

/// Composite Simpson weights for `n` equally spaced nodes with spacing `h`.
///
/// An even node count integrates the first `n - 1` nodes with Simpson's rule
/// and the final interval with the trapezoid rule.
pub fn simpson_weights(n: usize, h: f64) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![0.0],
        2 => vec![0.5 * h, 0.5 * h],
        _ => {
            let odd = if n % 2 == 1 { n } else { n - 1 };
            let mut w = vec![0.0; n];
            for (i, wi) in w.iter_mut().enumerate().take(odd) {
                *wi = if i == 0 || i == odd - 1 {
                    h / 3.0
                } else if i % 2 == 1 {
                    4.0 * h / 3.0
                } else {
                    2.0 * h / 3.0
                };
            }
            if odd < n {
                w[n - 2] += 0.5 * h;
                w[n - 1] = 0.5 * h;
            }
            w
        }
    }
}

/// Trapezoid weights for `n` equally spaced nodes with spacing `h`.
pub fn trapezoid_weights(n: usize, h: f64) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![0.0],
        _ => {
            let mut w = vec![h; n];
            w[0] = 0.5 * h;
            w[n - 1] = 0.5 * h;
            w
        }
    }
}

// Gauss-Kronrod 7/15 abscissae (positive half, descending) and weights.
const XGK: [f64; 8] = [
    0.991_455_371_120_812_6,
    0.949_107_912_342_758_5,
    0.864_864_423_359_769_1,
    0.741_531_185_599_394_4,
    0.586_087_235_467_691_1,
    0.405_845_151_377_397_2,
    0.207_784_955_007_898_5,
    0.0,
];
const WGK: [f64; 8] = [
    0.022_935_322_010_529_22,
    0.063_092_092_629_978_55,
    0.104_790_010_322_250_18,
    0.140_653_259_715_525_92,
    0.169_004_726_639_267_9,
    0.190_350_578_064_785_4,
    0.204_432_940_075_298_9,
    0.209_482_141_084_727_83,
];
// Gauss weights for XGK[1], XGK[3], XGK[5] and the centre.
const WG: [f64; 4] = [
    0.129_484_966_168_869_7,
    0.279_705_391_489_276_7,
    0.381_830_050_505_118_9,
    0.417_959_183_673_469_4,
];

/// Stopping rule for [`gauss_kronrod`].
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AdaptiveOptions {
    /// Absolute error target
    pub epsabs: f64,
    /// Relative error target
    pub epsrel: f64,
    /// Maximum number of panels before giving up
    pub max_subdivisions: usize,
}

impl Default for AdaptiveOptions {
    fn default() -> Self {
        Self {
            epsabs: 1e-10,
            epsrel: 1e-6,
            max_subdivisions: 50,
        }
    }
}

/// Result of an adaptive integration.
#[derive(Clone, Copy, Debug)]
pub struct QuadEstimate {
    pub value: f64,
    pub error: f64,
    pub evaluations: usize,
}

#[derive(Clone, Copy, Debug)]
struct Panel {
    a: f64,
    b: f64,
    value: f64,
    error: f64,
}

fn gk15_panel<F, E>(f: &F, a: f64, b: f64) -> Result<Panel, E>
where
    F: Fn(f64) -> Result<f64, E> + Sync,
    E: Send,
{
    let center = 0.5 * (a + b);
    let half = 0.5 * (b - a);

    // [centre, c - h x0, c + h x0, c - h x1, c + h x1, ...]
    let mut nodes = Vec::with_capacity(15);
    nodes.push(center);
    for x in XGK.iter().take(7) {
        nodes.push(center - half * x);
        nodes.push(center + half * x);
    }
    let values: Vec<f64> = nodes
        .par_iter()
        .map(|&x| f(x))
        .collect::<Result<Vec<_>, E>>()?;

    let fc = values[0];
    let pair = |k: usize| values[1 + 2 * k] + values[2 + 2 * k];

    let mut kronrod = WGK[7] * fc;
    for (k, w) in WGK.iter().take(7).enumerate() {
        kronrod += w * pair(k);
    }
    let gauss = WG[3] * fc + WG[0] * pair(1) + WG[1] * pair(3) + WG[2] * pair(5);

    Ok(Panel {
        a,
        b,
        value: half * kronrod,
        error: (half * (kronrod - gauss)).abs(),
    })
}

/// Adaptive Gauss-Kronrod integration of `f` over `[a, b]`.
///
/// The panel with the largest error estimate is bisected until the summed
/// error satisfies `max(epsabs, epsrel * |value|)`. Running out of panels is
/// reported as [`EvoError::ConvergenceFailed`]; errors from `f` propagate
/// unchanged.
pub fn gauss_kronrod<F, E>(f: F, a: f64, b: f64, opts: &AdaptiveOptions) -> Result<QuadEstimate, E>
where
    F: Fn(f64) -> Result<f64, E> + Sync,
    E: From<EvoError> + Send,
{
    if !(a.is_finite() && b.is_finite()) {
        return Err(EvoError::InvalidArg {
            what: "integration limits must be finite",
        }
        .into());
    }
    if opts.max_subdivisions == 0 {
        return Err(EvoError::InvalidArg {
            what: "max_subdivisions must be positive",
        }
        .into());
    }
    if a == b {
        return Ok(QuadEstimate {
            value: 0.0,
            error: 0.0,
            evaluations: 0,
        });
    }

    let mut panels = vec![gk15_panel(&f, a, b)?];
    let mut evaluations = 15;

    loop {
        let value: f64 = panels.iter().map(|p| p.value).sum();
        let error: f64 = panels.iter().map(|p| p.error).sum();
        if !value.is_finite() {
            return Err(EvoError::NonFinite {
                what: "adaptive quadrature estimate",
                value,
            }
            .into());
        }
        if error <= opts.epsabs.max(opts.epsrel * value.abs()) {
            return Ok(QuadEstimate {
                value,
                error,
                evaluations,
            });
        }
        if panels.len() >= opts.max_subdivisions {
            return Err(EvoError::ConvergenceFailed {
                what: "adaptive Gauss-Kronrod subdivision limit reached",
                estimate: value,
                error,
            }
            .into());
        }

        let worst = panels
            .iter()
            .enumerate()
            .max_by(|(_, p), (_, q)| p.error.total_cmp(&q.error))
            .map(|(i, _)| i)
            .unwrap_or(0);
        let Panel { a, b, .. } = panels.swap_remove(worst);
        let mid = 0.5 * (a + b);
        panels.push(gk15_panel(&f, a, mid)?);
        panels.push(gk15_panel(&f, mid, b)?);
        evaluations += 30;
    }
}
