// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! Settings of the compiler that affect the event list.
use serde::{Deserialize, Serialize};

use crate::tinysample::TINYSAMPLE_DURATION;
use crate::{Error, Result};

/// Compiler settings, read only during a compilation.
///
/// The field names mirror the keys of the `laboneq` compiler settings, so that
/// the same JSON document can be shared between both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "SCREAMING_SNAKE_CASE")]
pub struct CompilerSettings {
    /// Duration of one tiny sample in seconds.
    pub tinysample: f64,
    /// Upper bound of events lowered from the IR tree.
    pub max_events_to_publish: usize,
    /// Whether loops are unrolled into every iteration in the event list.
    pub expand_loops_for_schedule: bool,
}

impl Default for CompilerSettings {
    fn default() -> Self {
        CompilerSettings {
            tinysample: TINYSAMPLE_DURATION,
            max_events_to_publish: 1000,
            expand_loops_for_schedule: true,
        }
    }
}

impl CompilerSettings {
    /// Parse settings from a (partial) JSON object and validate them.
    ///
    /// Missing keys keep their default value.
    pub fn from_json(text: &str) -> Result<Self> {
        let settings: CompilerSettings = serde_json::from_str(text)?;
        settings.validate()?;
        laboneq_log::debug!("Using compiler settings: {:?}", settings);
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.tinysample.is_finite() || self.tinysample <= 0.0 {
            return Err(Error::InvalidSetting {
                field: "TINYSAMPLE",
                reason: format!("Expected a positive duration, got {}", self.tinysample),
            });
        }
        if self.max_events_to_publish == 0 {
            return Err(Error::InvalidSetting {
                field: "MAX_EVENTS_TO_PUBLISH",
                reason: "At least one event must be allowed".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings = CompilerSettings::from_json(r#"{"MAX_EVENTS_TO_PUBLISH": 20}"#).unwrap();
        assert_eq!(settings.max_events_to_publish, 20);
        assert_eq!(settings.tinysample, TINYSAMPLE_DURATION);
        assert!(settings.expand_loops_for_schedule);
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let err = CompilerSettings::from_json(r#"{"MAX_EVENTS": 20}"#).unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_invalid_values() {
        let err = CompilerSettings::from_json(r#"{"TINYSAMPLE": -1.0}"#).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidSetting {
                field: "TINYSAMPLE",
                ..
            }
        ));
        let settings = CompilerSettings {
            max_events_to_publish: 0,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }
}
