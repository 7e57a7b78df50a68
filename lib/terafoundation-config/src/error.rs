use snafu::Snafu;

/// A configuration value that violates the format rule of its option.
///
/// Every failure raised by a [`Schema`](crate::Schema) is reported through this single error
/// kind: the offending option key, and a human-readable reason describing the constraint that was
/// not met.
#[derive(Clone, Debug, Eq, PartialEq, Snafu)]
#[snafu(visibility(pub), display("Invalid value for option '{key}': {reason}"))]
pub struct ConfigError {
    key: String,
    reason: String,
}

impl ConfigError {
    /// Creates a new `ConfigError` for the given option key.
    pub fn new(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// The option key the error refers to.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Why the value was rejected.
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_key_and_reason() {
        let error = ConfigError::new("log_timeseries", "must be one of: daily, monthly, yearly");
        assert_eq!(
            error.to_string(),
            "Invalid value for option 'log_timeseries': must be one of: daily, monthly, yearly"
        );
        assert_eq!(error.key(), "log_timeseries");
    }

    #[test]
    fn context_selector_builds_the_same_error() {
        let error: Result<(), ConfigError> = ConfigSnafu {
            key: "user",
            reason: "must be a string",
        }
        .fail();
        assert_eq!(error, Err(ConfigError::new("user", "must be a string")));
    }
}
