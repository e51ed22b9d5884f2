//! Poisson upper tail in log space.

use std::f64::consts::PI;

use eyre::Result;

use pilecall_collections_rs::track::Track;

const MAX_ITERATIONS: usize = 100_000;
const EPSILON: f64 = 1e-15;
const TINY: f64 = 1e-300;

/// Natural logarithm of the gamma function (Lanczos approximation, g = 7).
pub fn ln_gamma(x: f64) -> f64 {
    const COEFFS: [f64; 8] = [
        676.5203681218851,
        -1259.1392167224028,
        771.32342877765313,
        -176.61502916214059,
        12.507343278686905,
        -0.13857109526572012,
        9.9843695780195716e-6,
        1.5056327351493116e-7,
    ];

    if x < 0.5 {
        // Reflection: Γ(x) = π / (sin(πx) · Γ(1 - x))
        (PI / (PI * x).sin()).ln() - ln_gamma(1.0 - x)
    } else {
        let x = x - 1.0;
        let mut ag = 0.99999999999980993_f64;
        for (i, &c) in COEFFS.iter().enumerate() {
            ag += c / (x + i as f64 + 1.0);
        }
        let t = x + 7.5;
        0.5 * (2.0 * PI).ln() + (x + 0.5) * t.ln() - t + ag.ln()
    }
}

/// `ln P(a, x)` through the power series, converges quickly for `x < a + 1`.
fn ln_lower_gamma_series(a: f64, x: f64) -> f64 {
    let mut ap = a;
    let mut term = 1.0 / a;
    let mut sum = term;
    for _ in 0..MAX_ITERATIONS {
        ap += 1.0;
        term *= x / ap;
        sum += term;
        if term.abs() < sum.abs() * EPSILON {
            break;
        }
    }
    sum.ln() - x + a * x.ln() - ln_gamma(a)
}

/// `Q(a, x) = 1 - P(a, x)` through the Lentz continued fraction, converges quickly for `x >= a + 1`.
fn upper_gamma_fraction(a: f64, x: f64) -> f64 {
    let mut b = x + 1.0 - a;
    let mut c = 1.0 / TINY;
    let mut d = 1.0 / b;
    let mut h = d;
    for i in 1..MAX_ITERATIONS {
        let an = -(i as f64) * (i as f64 - a);
        b += 2.0;
        d = an * d + b;
        if d.abs() < TINY {
            d = TINY;
        }
        c = b + an / c;
        if c.abs() < TINY {
            c = TINY;
        }
        d = 1.0 / d;
        let delta = d * c;
        h *= delta;
        if (delta - 1.0).abs() < EPSILON {
            break;
        }
    }
    (-x + a * x.ln() - ln_gamma(a)).exp() * h
}

/// Natural logarithm of `P(X >= count)` for `X ~ Poisson(mu)`.
///
/// Stays finite far below `f64::MIN_POSITIVE`: `log_sf(1000, 1)` is about `-5913`.
pub fn log_sf(count: f64, mu: f64) -> f64 {
    if count <= 0.0 {
        return 0.0;
    }
    if mu == 0.0 {
        return f64::NEG_INFINITY;
    }
    if mu == f64::INFINITY {
        return 0.0;
    }

    // P(X >= k) = P(k, mu), the regularized lower incomplete gamma function
    if mu < count + 1.0 {
        ln_lower_gamma_series(count, mu).min(0.0)
    } else {
        (-upper_gamma_fraction(count, mu)).ln_1p()
    }
}

/// Per-base `log_sf(treatment, control)`.
pub fn p_value_track(treatment: &Track<f64>, control: &Track<f64>) -> Result<Track<f64>> {
    treatment.zip_with(control, |count, mu| log_sf(*count, *mu))
}
