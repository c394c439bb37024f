//! Common envelopes.
//!
//! Each function returns a [`FunctionalPulse`]; sampling happens at the
//! centre of each time step.

use num_complex::Complex64;

use crate::error::PulseResult;
use crate::functional::{FunctionalPulse, PulseParams};

fn param(params: &PulseParams, name: &str) -> f64 {
    params.get(name).copied().unwrap_or_default()
}

fn amp(params: &PulseParams) -> Complex64 {
    Complex64::new(param(params, "amp"), param(params, "amp_im"))
}

/// Flat envelope of complex amplitude `amp + i*amp_im` (`amp_im` optional).
pub fn constant() -> PulseResult<FunctionalPulse> {
    FunctionalPulse::new("constant", ["duration", "amp"], |duration, p| {
        vec![amp(p); duration as usize]
    })
}

/// Flat envelope of amplitude `amp` between `t_on` and `t_off`, zero elsewhere.
pub fn square() -> PulseResult<FunctionalPulse> {
    FunctionalPulse::new(
        "square",
        ["duration", "amp", "t_on", "t_off"],
        |duration, p| {
            let (on, off) = (param(p, "t_on"), param(p, "t_off"));
            let a = Complex64::new(param(p, "amp"), 0.0);
            (0..duration)
                .map(|t| {
                    let x = t as f64 + 0.5;
                    if x >= on && x < off { a } else { Complex64::new(0.0, 0.0) }
                })
                .collect()
        },
    )
}

/// Gaussian of peak `amp` and width `sigma`, centred in the window.
pub fn gaussian() -> PulseResult<FunctionalPulse> {
    FunctionalPulse::new("gaussian", ["duration", "amp", "sigma"], |duration, p| {
        let a = param(p, "amp");
        let sigma = param(p, "sigma");
        let centre = duration as f64 / 2.0;
        (0..duration)
            .map(|t| {
                let x = t as f64 + 0.5 - centre;
                let value = if sigma > 0.0 {
                    a * (-x * x / (2.0 * sigma * sigma)).exp()
                } else {
                    0.0
                };
                Complex64::new(value, 0.0)
            })
            .collect()
    })
}

/// Linear ramp from `start` to `stop`.
pub fn linear() -> PulseResult<FunctionalPulse> {
    FunctionalPulse::new("linear", ["duration", "start", "stop"], |duration, p| {
        let (start, stop) = (param(p, "start"), param(p, "stop"));
        let n = duration.max(1) as f64;
        (0..duration)
            .map(|t| Complex64::new(start + (stop - start) * (t as f64 + 0.5) / n, 0.0))
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, f64)]) -> PulseParams {
        pairs.iter().map(|(k, v)| ((*k).to_string(), *v)).collect()
    }

    #[test]
    fn test_constant() {
        let p = constant()
            .unwrap()
            .call(5, &params(&[("amp", 0.2), ("amp_im", 0.1)]))
            .unwrap();
        assert_eq!(p.duration(), 5);
        assert!(p.samples().iter().all(|s| *s == Complex64::new(0.2, 0.1)));
    }

    #[test]
    fn test_square_window() {
        let p = square()
            .unwrap()
            .call(6, &params(&[("amp", 0.5), ("t_on", 2.0), ("t_off", 4.0)]))
            .unwrap();
        let re: Vec<f64> = p.samples().iter().map(|s| s.re).collect();
        assert_eq!(re, vec![0.0, 0.0, 0.5, 0.5, 0.0, 0.0]);
    }

    #[test]
    fn test_gaussian_symmetric_peak() {
        let p = gaussian()
            .unwrap()
            .call(10, &params(&[("amp", 0.8), ("sigma", 2.0)]))
            .unwrap();
        let s = p.samples();
        assert!((s[0].re - s[9].re).abs() < 1e-12);
        assert!(s[4].re > s[0].re);
        assert!(s.iter().all(|v| v.re <= 0.8));
    }

    #[test]
    fn test_linear_clips_above_one() {
        let out = linear()
            .unwrap()
            .generate(4, &params(&[("start", 0.0), ("stop", 2.0)]))
            .unwrap();
        // Centre samples: 0.25, 0.75, 1.25, 1.75.
        assert_eq!(out.clipped, vec![2, 3]);
        assert_eq!(out.pulse.samples()[3], Complex64::new(1.0, 0.0));
    }
}
