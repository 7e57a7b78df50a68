use serde_json::Value;

use crate::format::FormatRule;

/// The declarative description of a single configuration option.
///
/// A descriptor without a default value marks a required option: validation of a configuration
/// lacking it fails.
#[derive(Clone, Debug)]
pub struct OptionDescriptor {
    key: &'static str,
    doc: &'static str,
    default: Option<Value>,
    format: FormatRule,
}

impl OptionDescriptor {
    /// Creates a required option accepting any value.
    pub const fn new(key: &'static str, doc: &'static str) -> Self {
        Self {
            key,
            doc,
            default: None,
            format: FormatRule::Any,
        }
    }

    /// Sets the value used when the option is absent from the input.
    #[must_use]
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Sets the rule candidate values must satisfy.
    #[must_use]
    pub fn with_format(mut self, format: FormatRule) -> Self {
        self.format = format;
        self
    }

    pub const fn key(&self) -> &'static str {
        self.key
    }

    pub const fn doc(&self) -> &'static str {
        self.doc
    }

    pub const fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub const fn format(&self) -> &FormatRule {
        &self.format
    }

    pub const fn is_required(&self) -> bool {
        self.default.is_none()
    }
}
