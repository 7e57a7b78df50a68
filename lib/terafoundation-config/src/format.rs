//! Format rules: the admissibility checks attached to every option.

use std::fmt;

use serde_json::Value;

/// A validator procedure.
///
/// Inspects a candidate value and returns a human-readable reason when the value is not
/// acceptable. Validators must be pure: they never alter the candidate.
pub type Validator = fn(&Value) -> Result<(), String>;

/// The primitive shape a value is expected to have.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Kind {
    /// A string.
    String,
    /// A JSON number, integral or floating-point.
    Number,
    /// `true` or `false`.
    Boolean,
    /// A sequence of values.
    Array,
    /// A key/value mapping.
    Object,
}

impl Kind {
    /// Whether `value` has this shape.
    pub const fn matches(self, value: &Value) -> bool {
        matches!(
            (self, value),
            (Kind::String, Value::String(_))
                | (Kind::Number, Value::Number(_))
                | (Kind::Boolean, Value::Bool(_))
                | (Kind::Array, Value::Array(_))
                | (Kind::Object, Value::Object(_))
        )
    }

    /// Gets the shape of an arbitrary value, as used in error messages.
    pub const fn name_of(value: &Value) -> &'static str {
        match value {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Kind::String => "string",
            Kind::Number => "number",
            Kind::Boolean => "boolean",
            Kind::Array => "array",
            Kind::Object => "object",
        };
        f.write_str(kind)
    }
}

/// The rule a candidate value must satisfy to be accepted for an option.
#[derive(Clone)]
pub enum FormatRule {
    /// Every value is accepted.
    Any,

    /// The value must have the given primitive shape.
    Kind(Kind),

    /// The value must be equal to one of the listed literals.
    OneOf(Vec<Value>),

    /// The value is judged by an arbitrary validator.
    Custom(Validator),
}

impl FormatRule {
    /// Builds a closed enumeration from a list of literals.
    pub fn one_of<I, T>(literals: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        FormatRule::OneOf(literals.into_iter().map(Into::into).collect())
    }

    /// Checks `value` against this rule.
    ///
    /// # Errors
    ///
    /// Returns the reason the value was rejected.
    pub fn check(&self, value: &Value) -> Result<(), String> {
        match self {
            FormatRule::Any => Ok(()),
            FormatRule::Kind(kind) if kind.matches(value) => Ok(()),
            FormatRule::Kind(kind) => Err(format!(
                "must be a {kind}, found {}",
                Kind::name_of(value)
            )),
            FormatRule::OneOf(literals) if literals.contains(value) => Ok(()),
            FormatRule::OneOf(literals) => Err(format!(
                "must be one of: {}, found {value}",
                render_literals(literals)
            )),
            FormatRule::Custom(validator) => validator(value),
        }
    }
}

impl fmt::Debug for FormatRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatRule::Any => f.write_str("Any"),
            FormatRule::Kind(kind) => f.debug_tuple("Kind").field(kind).finish(),
            FormatRule::OneOf(literals) => f.debug_tuple("OneOf").field(literals).finish(),
            FormatRule::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl fmt::Display for FormatRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatRule::Any => f.write_str("any value"),
            FormatRule::Kind(kind) => write!(f, "{kind}"),
            FormatRule::OneOf(literals) => write!(f, "one of: {}", render_literals(literals)),
            FormatRule::Custom(_) => f.write_str("custom"),
        }
    }
}

fn render_literals(literals: &[Value]) -> String {
    literals
        .iter()
        .map(Value::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Reads a value as a number without altering it.
///
/// JSON numbers are accepted, and so are strings holding a finite number, since hand-written
/// documents and environment overrides often carry numbers as text.
pub fn as_numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|number| number.is_finite()),
        _ => None,
    }
}
