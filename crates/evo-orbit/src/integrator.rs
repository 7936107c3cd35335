//! Single-step integrators on the Cartesian state `[x, y, vx, vy]`.

use crate::error::OrbitResult;
use crate::model::OrbitModel;

pub type Cartesian = [f64; 4];

/// Trait for one-step integrators.
pub trait Integrator {
    /// Order of the local error, used to scale step-doubling estimates.
    const ORDER: i32;

    /// Force evaluations per step.
    const EVALUATIONS: usize;

    /// Advance `y` from `t` by `h` (which may be negative).
    fn step<M: OrbitModel + ?Sized>(
        &self,
        model: &M,
        t: f64,
        y: &Cartesian,
        h: f64,
    ) -> OrbitResult<Cartesian>;
}

#[inline]
fn derivative<M: OrbitModel + ?Sized>(model: &M, t: f64, y: &Cartesian) -> OrbitResult<Cartesian> {
    let [ax, ay] = model.acceleration(t, [y[0], y[1]])?;
    Ok([y[2], y[3], ax, ay])
}

/// Symplectic drift-kick-drift leapfrog (second order).
#[derive(Clone, Copy, Debug)]
pub struct Leapfrog;

impl Integrator for Leapfrog {
    const ORDER: i32 = 2;
    const EVALUATIONS: usize = 1;

    fn step<M: OrbitModel + ?Sized>(
        &self,
        model: &M,
        t: f64,
        y: &Cartesian,
        h: f64,
    ) -> OrbitResult<Cartesian> {
        let half = 0.5 * h;
        let x = [y[0] + half * y[2], y[1] + half * y[3]];
        let [ax, ay] = model.acceleration(t + half, x)?;
        let vx = y[2] + h * ax;
        let vy = y[3] + h * ay;
        Ok([x[0] + half * vx, x[1] + half * vy, vx, vy])
    }
}

/// Seven-stage explicit Runge-Kutta method of order six (Butcher 1964).
#[derive(Clone, Copy, Debug)]
pub struct Rk6;

const C: [f64; 7] = [0.0, 1.0 / 3.0, 2.0 / 3.0, 1.0 / 3.0, 0.5, 0.5, 1.0];
const B: [f64; 7] = [
    11.0 / 120.0,
    0.0,
    27.0 / 40.0,
    27.0 / 40.0,
    -4.0 / 15.0,
    -4.0 / 15.0,
    11.0 / 120.0,
];
const A: [[f64; 6]; 7] = [
    [0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    [1.0 / 3.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    [0.0, 2.0 / 3.0, 0.0, 0.0, 0.0, 0.0],
    [1.0 / 12.0, 1.0 / 3.0, -1.0 / 12.0, 0.0, 0.0, 0.0],
    [-1.0 / 16.0, 9.0 / 8.0, -3.0 / 16.0, -3.0 / 8.0, 0.0, 0.0],
    [0.0, 9.0 / 8.0, -3.0 / 8.0, -3.0 / 4.0, 0.5, 0.0],
    [
        9.0 / 44.0,
        -9.0 / 11.0,
        63.0 / 44.0,
        18.0 / 11.0,
        0.0,
        -16.0 / 11.0,
    ],
];

impl Integrator for Rk6 {
    const ORDER: i32 = 6;
    const EVALUATIONS: usize = 7;

    fn step<M: OrbitModel + ?Sized>(
        &self,
        model: &M,
        t: f64,
        y: &Cartesian,
        h: f64,
    ) -> OrbitResult<Cartesian> {
        let mut k = [[0.0; 4]; 7];
        for s in 0..7 {
            let mut ys = *y;
            for (j, kj) in k.iter().enumerate().take(s) {
                let a = A[s][j];
                if a != 0.0 {
                    for i in 0..4 {
                        ys[i] += h * a * kj[i];
                    }
                }
            }
            k[s] = derivative(model, t + C[s] * h, &ys)?;
        }
        let mut out = *y;
        for (s, ks) in k.iter().enumerate() {
            if B[s] != 0.0 {
                for i in 0..4 {
                    out[i] += h * B[s] * ks[i];
                }
            }
        }
        Ok(out)
    }
}

/// Step-doubling error of `fine` (two half steps) against `coarse` (one full
/// step), normalised so that 1 means "exactly at tolerance".
///
/// Positions and velocities are scaled as groups by
/// `atol + rtol * max |component|` over the start and end states.
pub fn scaled_error(
    start: &Cartesian,
    coarse: &Cartesian,
    fine: &Cartesian,
    order: i32,
    rtol: f64,
    atol: f64,
) -> f64 {
    let richardson = f64::from(2i32.pow(order as u32) - 1);
    let mut err: f64 = 0.0;
    for group in [0..2, 2..4] {
        let size = group
            .clone()
            .map(|i| start[i].abs().max(fine[i].abs()))
            .fold(0.0, f64::max);
        let scale = atol + rtol * size;
        for i in group {
            let e = (fine[i] - coarse[i]).abs() / richardson / scale;
            // NaN compares false; keep it so callers see a failed step
            if e.is_nan() {
                return f64::NAN;
            }
            err = err.max(e);
        }
    }
    err
}
