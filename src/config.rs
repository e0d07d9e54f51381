//! Interactor settings loaded from JSON.

use serde::{Deserialize, Serialize};

use crate::error::GrabError;
use crate::precognition::{clamp_to_floor, DEFAULT_MIN_PRECOGNITION};
use crate::velocity::ThrowConfig;

/// Default grab precognition window, in seconds.
pub const DEFAULT_GRAB_PRECOGNITION: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractorConfig {
    /// How long a press may precede contact and still complete a grab, in seconds.
    pub grab_precognition: f32,
    /// Floor applied to `grab_precognition`.
    pub min_precognition: f32,
    pub throw: ThrowConfig,
}

impl Default for InteractorConfig {
    fn default() -> Self {
        Self {
            grab_precognition: DEFAULT_GRAB_PRECOGNITION,
            min_precognition: DEFAULT_MIN_PRECOGNITION,
            throw: ThrowConfig::default(),
        }
    }
}

impl InteractorConfig {
    /// Parses and validates a JSON document. Missing fields take their defaults.
    pub fn from_json_str(raw: &str) -> Result<Self, GrabError> {
        let config: InteractorConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values no clamp can repair. Low precognition values are fine; they are clamped
    /// when the gate is armed.
    pub fn validate(&self) -> Result<(), GrabError> {
        if !self.min_precognition.is_finite() || self.min_precognition <= 0.0 {
            return Err(GrabError::InvalidConfig(format!(
                "min_precognition must be a positive number, got {}",
                self.min_precognition
            )));
        }
        if self.grab_precognition.is_infinite() {
            return Err(GrabError::InvalidConfig(
                "grab_precognition must be finite".to_string(),
            ));
        }
        if !self.throw.is_finite() {
            return Err(GrabError::InvalidConfig(
                "throw multipliers must be finite".to_string(),
            ));
        }
        Ok(())
    }

    /// The window length the precognition gate will actually use.
    pub fn effective_precognition(&self) -> f32 {
        clamp_to_floor(self.grab_precognition, self.min_precognition)
    }
}
