//! Per-experiment local oscillator frequencies.
//!
//! A [`LoConfig`] maps drive channels to qubit LO frequencies and measure
//! channels to measurement LO frequencies. Assembly compares it against the
//! backend defaults and emits a list only when it differs.

use qobj_pulse::Channel;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{AssembleError, AssembleResult};

/// Custom LO frequencies keyed by channel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<Channel, f64>", into = "BTreeMap<Channel, f64>")]
pub struct LoConfig {
    freqs: BTreeMap<Channel, f64>,
}

/// LO lists that differ from the defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoOverrides {
    /// Replacement qubit LO list.
    pub qubit_lo_freq: Option<Vec<f64>>,
    /// Replacement measurement LO list.
    pub meas_lo_freq: Option<Vec<f64>>,
}

impl LoConfig {
    /// No custom frequencies.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the frequency of a drive or measure channel.
    pub fn set(&mut self, channel: Channel, freq: f64) -> AssembleResult<&mut Self> {
        if !matches!(channel, Channel::Drive(_) | Channel::Measure(_)) {
            return Err(AssembleError::Config(format!(
                "LO frequency can only be set on drive or measure channels, not {channel}"
            )));
        }
        if !freq.is_finite() || freq <= 0.0 {
            return Err(AssembleError::Config(format!(
                "LO frequency on {channel} must be finite and positive, got {freq}"
            )));
        }
        self.freqs.insert(channel, freq);
        Ok(self)
    }

    /// Builder form of [`LoConfig::set`].
    pub fn with(mut self, channel: Channel, freq: f64) -> AssembleResult<Self> {
        self.set(channel, freq)?;
        Ok(self)
    }

    /// Custom frequency of `channel`.
    pub fn get(&self, channel: Channel) -> Option<f64> {
        self.freqs.get(&channel).copied()
    }

    /// Whether no frequency is set.
    pub fn is_empty(&self) -> bool {
        self.freqs.is_empty()
    }

    /// Rebuild each default list with the custom values and keep the lists
    /// that changed.
    ///
    /// A custom value is never dropped silently: one whose index lies past
    /// the end of its default list fails with
    /// [`AssembleError::LoOutOfRange`], and so does any custom value for a
    /// list that has no defaults at all (reported with `len` 0). A
    /// `LoConfig` with no values for a list needs no defaults for it.
    pub fn overrides(
        &self,
        qubit_defaults: Option<&[f64]>,
        meas_defaults: Option<&[f64]>,
    ) -> AssembleResult<LoOverrides> {
        let drive = self
            .freqs
            .iter()
            .filter(|(ch, _)| matches!(ch, Channel::Drive(_)));
        let meas = self
            .freqs
            .iter()
            .filter(|(ch, _)| matches!(ch, Channel::Measure(_)));
        Ok(LoOverrides {
            qubit_lo_freq: replaced(qubit_defaults, drive)?,
            meas_lo_freq: replaced(meas_defaults, meas)?,
        })
    }
}

fn replaced<'a>(
    defaults: Option<&[f64]>,
    custom: impl Iterator<Item = (&'a Channel, &'a f64)>,
) -> AssembleResult<Option<Vec<f64>>> {
    let mut freqs = defaults.map(<[f64]>::to_vec).unwrap_or_default();
    let mut touched = false;
    for (channel, freq) in custom {
        let len = freqs.len();
        let slot = channel
            .index()
            .and_then(|i| freqs.get_mut(i as usize))
            .ok_or(AssembleError::LoOutOfRange {
                channel: *channel,
                len,
            })?;
        *slot = *freq;
        touched = true;
    }

    let unchanged = defaults.is_some_and(|d| d == freqs.as_slice());
    Ok((touched && !unchanged).then_some(freqs))
}

impl TryFrom<BTreeMap<Channel, f64>> for LoConfig {
    type Error = AssembleError;

    fn try_from(freqs: BTreeMap<Channel, f64>) -> Result<Self, Self::Error> {
        let mut config = LoConfig::new();
        for (channel, freq) in freqs {
            config.set(channel, freq)?;
        }
        Ok(config)
    }
}

impl From<LoConfig> for BTreeMap<Channel, f64> {
    fn from(config: LoConfig) -> Self {
        config.freqs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUBIT: [f64; 2] = [5.0, 5.1];
    const MEAS: [f64; 2] = [6.5, 6.6];

    #[test]
    fn test_equal_override_is_omitted() {
        let lo = LoConfig::new().with(Channel::Drive(1), 5.1).unwrap();
        let out = lo.overrides(Some(&QUBIT), Some(&MEAS)).unwrap();
        assert_eq!(out, LoOverrides::default());
    }

    #[test]
    fn test_changed_override_emits_full_list() {
        let lo = LoConfig::new()
            .with(Channel::Drive(0), 4.9)
            .unwrap()
            .with(Channel::Measure(1), 6.7)
            .unwrap();
        let out = lo.overrides(Some(&QUBIT), Some(&MEAS)).unwrap();
        assert_eq!(out.qubit_lo_freq, Some(vec![4.9, 5.1]));
        assert_eq!(out.meas_lo_freq, Some(vec![6.5, 6.7]));
    }

    #[test]
    fn test_no_custom_values() {
        let out = LoConfig::new().overrides(Some(&QUBIT), None).unwrap();
        assert_eq!(out, LoOverrides::default());
    }

    #[test]
    fn test_out_of_range() {
        let lo = LoConfig::new().with(Channel::Drive(2), 5.2).unwrap();
        assert!(matches!(
            lo.overrides(Some(&QUBIT), None),
            Err(AssembleError::LoOutOfRange { channel: Channel::Drive(2), len: 2 })
        ));
        assert!(matches!(
            lo.overrides(None, None),
            Err(AssembleError::LoOutOfRange { len: 0, .. })
        ));
    }

    #[test]
    fn test_missing_defaults_only_matter_when_used() {
        let lo = LoConfig::new().with(Channel::Measure(0), 6.4).unwrap();
        let out = lo.overrides(None, Some(&[6.5])).unwrap();
        assert_eq!(out.qubit_lo_freq, None);
        assert_eq!(out.meas_lo_freq, Some(vec![6.4]));
        assert!(matches!(
            lo.overrides(Some(&QUBIT), None),
            Err(AssembleError::LoOutOfRange { channel: Channel::Measure(0), len: 0 })
        ));
    }

    #[test]
    fn test_only_drive_and_measure() {
        let mut lo = LoConfig::new();
        assert!(lo.set(Channel::Acquire(0), 5.0).is_err());
        assert!(lo.set(Channel::Drive(0), f64::NAN).is_err());
        assert!(lo.is_empty());
    }

    #[test]
    fn test_deserialize_by_channel_name() {
        let lo: LoConfig = serde_json::from_str(r#"{"d0": 5.05, "m0": 6.4}"#).unwrap();
        assert_eq!(lo.get(Channel::Drive(0)), Some(5.05));
        assert_eq!(lo.get(Channel::Measure(0)), Some(6.4));
        assert!(serde_json::from_str::<LoConfig>(r#"{"a0": 5.0}"#).is_err());
    }
}
