//! Pulses generated from an envelope function.

use num_complex::Complex64;
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

use crate::command::SamplePulse;
use crate::error::{PulseError, PulseResult};

/// Envelope parameters other than `duration`.
pub type PulseParams = FxHashMap<String, f64>;

/// Envelope function: `(duration, params) -> samples`.
pub type Generator = Arc<dyn Fn(u64, &PulseParams) -> Vec<Complex64> + Send + Sync>;

/// The parameter every envelope must declare.
pub const DURATION: &str = "duration";

/// A named envelope that materializes into [`SamplePulse`]s.
#[derive(Clone)]
pub struct FunctionalPulse {
    name: String,
    params: Vec<String>,
    generator: Generator,
}

/// Result of materializing a functional pulse.
#[derive(Debug, Clone)]
pub struct GeneratedPulse {
    /// The generated pulse.
    pub pulse: SamplePulse,
    /// Indices of samples whose magnitude exceeded 1 and were clipped.
    pub clipped: Vec<usize>,
}

impl FunctionalPulse {
    /// Wrap an envelope with its declared parameter names.
    ///
    /// `declared` must include `duration`.
    pub fn new<F>(
        name: impl Into<String>,
        declared: impl IntoIterator<Item = impl Into<String>>,
        generator: F,
    ) -> PulseResult<Self>
    where
        F: Fn(u64, &PulseParams) -> Vec<Complex64> + Send + Sync + 'static,
    {
        let name = name.into();
        let params: Vec<String> = declared.into_iter().map(Into::into).collect();
        if !params.iter().any(|p| p == DURATION) {
            return Err(PulseError::Construction(format!(
                "pulse function '{name}' requires a \"{DURATION}\" parameter"
            )));
        }
        Ok(Self {
            name,
            params,
            generator: Arc::new(generator),
        })
    }

    /// Envelope name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared parameter names, `duration` included.
    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// Sample the envelope and clip to the unit disc.
    ///
    /// Every declared parameter besides `duration` must be present in
    /// `params`. Samples with magnitude above 1 become `s / |s|`.
    pub fn generate(&self, duration: u64, params: &PulseParams) -> PulseResult<GeneratedPulse> {
        if let Some(missing) = self
            .params
            .iter()
            .find(|p| p.as_str() != DURATION && !params.contains_key(p.as_str()))
        {
            return Err(PulseError::Construction(format!(
                "pulse function '{}' is missing parameter '{missing}'",
                self.name
            )));
        }

        let mut samples = (self.generator)(duration, params);
        let mut clipped = Vec::new();
        for (i, s) in samples.iter_mut().enumerate() {
            let norm = s.norm();
            if norm > 1.0 {
                *s /= norm;
                clipped.push(i);
            }
        }

        if !clipped.is_empty() {
            warn!(
                "Pulse '{}' amplitude exceeds 1, clipped {} samples to unit magnitude",
                self.name,
                clipped.len()
            );
        }

        Ok(GeneratedPulse {
            pulse: SamplePulse::new(samples),
            clipped,
        })
    }

    /// Sample the envelope, returning only the pulse.
    pub fn call(&self, duration: u64, params: &PulseParams) -> PulseResult<SamplePulse> {
        Ok(self.generate(duration, params)?.pulse)
    }
}

impl fmt::Debug for FunctionalPulse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionalPulse")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}
