//! Interpolants over the valid samples of one channel.
//!
//! `xs` are strictly increasing axis positions of the valid samples and `ys`
//! their values. Every evaluation is bracketed: the caller passes `k` with
//! `xs[k] < t < xs[k + 1]`.

use super::types::InterpolationMethod;

#[derive(Debug, Clone)]
enum Kernel {
    Step,
    Nearest,
    Linear,
    /// Lagrange polynomial through `points` samples nearest the gap.
    Local { points: usize },
    /// Second derivatives of the natural cubic spline at every sample.
    NaturalCubic { second: Vec<f64> },
    /// Hermite slopes at every sample.
    Pchip { slopes: Vec<f64> },
}

#[derive(Debug, Clone)]
pub struct Interpolant<'a> {
    xs: &'a [f64],
    ys: &'a [f64],
    kernel: Kernel,
}

impl<'a> Interpolant<'a> {
    /// `xs.len()` must be at least `method.min_samples()` (and at least 2).
    pub fn new(method: InterpolationMethod, xs: &'a [f64], ys: &'a [f64]) -> Self {
        let kernel = match method {
            InterpolationMethod::Zero => Kernel::Step,
            InterpolationMethod::Nearest => Kernel::Nearest,
            InterpolationMethod::Linear | InterpolationMethod::Time | InterpolationMethod::Slinear => {
                Kernel::Linear
            }
            InterpolationMethod::Quadratic => Kernel::Local { points: 3 },
            InterpolationMethod::Polynomial { degree } => Kernel::Local {
                points: degree as usize + 1,
            },
            InterpolationMethod::Cubic => Kernel::NaturalCubic {
                second: natural_second_derivatives(xs, ys),
            },
            InterpolationMethod::Spline => Kernel::Pchip {
                slopes: pchip_slopes(xs, ys),
            },
        };
        Self { xs, ys, kernel }
    }

    pub fn eval(&self, t: f64, k: usize) -> f64 {
        let (x0, x1) = (self.xs[k], self.xs[k + 1]);
        let (y0, y1) = (self.ys[k], self.ys[k + 1]);
        match &self.kernel {
            Kernel::Step => y0,
            Kernel::Nearest => {
                if t - x0 <= x1 - t {
                    y0
                } else {
                    y1
                }
            }
            Kernel::Linear => y0 + (y1 - y0) * (t - x0) / (x1 - x0),
            Kernel::Local { points } => self.lagrange(t, k, *points),
            Kernel::NaturalCubic { second } => {
                let h = x1 - x0;
                let a = (x1 - t) / h;
                let b = (t - x0) / h;
                a * y0
                    + b * y1
                    + ((a * a * a - a) * second[k] + (b * b * b - b) * second[k + 1]) * h * h / 6.0
            }
            Kernel::Pchip { slopes } => {
                let h = x1 - x0;
                let s = (t - x0) / h;
                let s2 = s * s;
                let s3 = s2 * s;
                let h00 = 2.0 * s3 - 3.0 * s2 + 1.0;
                let h10 = s3 - 2.0 * s2 + s;
                let h01 = -2.0 * s3 + 3.0 * s2;
                let h11 = s3 - s2;
                h00 * y0 + h10 * h * slopes[k] + h01 * y1 + h11 * h * slopes[k + 1]
            }
        }
    }

    /// Samples around the bracket, taken alternately from the left and right.
    fn local_window(&self, k: usize, points: usize) -> Vec<usize> {
        let n = self.xs.len();
        let points = points.min(n);
        let mut window = vec![k, k + 1];
        let mut left = k;
        let mut right = k + 1;
        let mut take_left = true;
        while window.len() < points {
            let can_left = left > 0;
            let can_right = right + 1 < n;
            if take_left && can_left || !can_right {
                left -= 1;
                window.push(left);
            } else {
                right += 1;
                window.push(right);
            }
            take_left = !take_left;
        }
        window
    }

    fn lagrange(&self, t: f64, k: usize, points: usize) -> f64 {
        let window = self.local_window(k, points);
        let mut total = 0.0;
        for &i in &window {
            let mut basis = 1.0;
            for &j in &window {
                if i != j {
                    basis *= (t - self.xs[j]) / (self.xs[i] - self.xs[j]);
                }
            }
            total += basis * self.ys[i];
        }
        total
    }
}

/// Natural cubic spline second derivatives, solved with the Thomas algorithm.
fn natural_second_derivatives(xs: &[f64], ys: &[f64]) -> Vec<f64> {
    let n = xs.len();
    let mut second = vec![0.0; n];
    if n < 3 {
        return second;
    }
    let h: Vec<f64> = xs.windows(2).map(|w| w[1] - w[0]).collect();

    // Unknowns are second[1..n-1]; row i couples i-1, i, i+1.
    let m = n - 2;
    let mut diag = vec![0.0; m];
    let mut upper = vec![0.0; m];
    let mut rhs = vec![0.0; m];
    for r in 0..m {
        let i = r + 1;
        diag[r] = 2.0 * (h[i - 1] + h[i]);
        upper[r] = h[i];
        rhs[r] = 6.0 * ((ys[i + 1] - ys[i]) / h[i] - (ys[i] - ys[i - 1]) / h[i - 1]);
    }

    // Forward sweep; the sub-diagonal of row r is h[r].
    for r in 1..m {
        let w = h[r] / diag[r - 1];
        diag[r] -= w * upper[r - 1];
        rhs[r] -= w * rhs[r - 1];
    }
    second[m] = rhs[m - 1] / diag[m - 1];
    for r in (0..m - 1).rev() {
        second[r + 1] = (rhs[r] - upper[r] * second[r + 2]) / diag[r];
    }
    second
}

/// Fritsch–Carlson monotone slopes with the shape-preserving end conditions.
fn pchip_slopes(xs: &[f64], ys: &[f64]) -> Vec<f64> {
    let n = xs.len();
    let h: Vec<f64> = xs.windows(2).map(|w| w[1] - w[0]).collect();
    let delta: Vec<f64> = (0..n - 1).map(|k| (ys[k + 1] - ys[k]) / h[k]).collect();

    if n == 2 {
        return vec![delta[0]; 2];
    }

    let mut slopes = vec![0.0; n];
    for k in 1..n - 1 {
        if delta[k - 1] * delta[k] > 0.0 {
            let w1 = 2.0 * h[k] + h[k - 1];
            let w2 = h[k] + 2.0 * h[k - 1];
            slopes[k] = (w1 + w2) / (w1 / delta[k - 1] + w2 / delta[k]);
        }
    }
    slopes[0] = end_slope(h[0], h[1], delta[0], delta[1]);
    slopes[n - 1] = end_slope(h[n - 2], h[n - 3], delta[n - 2], delta[n - 3]);
    slopes
}

fn end_slope(h0: f64, h1: f64, d0: f64, d1: f64) -> f64 {
    let slope = ((2.0 * h0 + h1) * d0 - h0 * d1) / (h0 + h1);
    if slope.signum() != d0.signum() || d0 == 0.0 {
        0.0
    } else if d0.signum() != d1.signum() && slope.abs() > 3.0 * d0.abs() {
        3.0 * d0
    } else {
        slope
    }
}
