//! Error type shared by grab attempts and configuration loading.

use thiserror::Error;

use crate::ObjectId;

/// Errors surfaced by grab attempts and configuration loading.
#[derive(Debug, Error)]
pub enum GrabError {
    /// No collider was supplied and none exists in the forwarding object's hierarchy.
    #[error("no collider found for object {object}")]
    MissingCollider { object: ObjectId },
    /// A configuration value that clamping cannot repair, such as a non-positive floor.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// The configuration document is not valid JSON for [`crate::InteractorConfig`].
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_cause() {
        let missing = GrabError::MissingCollider {
            object: ObjectId(9),
        };
        assert_eq!(missing.to_string(), "no collider found for object #9");

        let parse: GrabError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(parse.to_string().starts_with("failed to parse configuration"));
    }
}
