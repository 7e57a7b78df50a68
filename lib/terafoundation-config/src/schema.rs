use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};
use snafu::OptionExt;

use crate::{
    descriptor::OptionDescriptor,
    error::{ConfigError, ConfigSnafu},
    format::as_numeric,
};

/// A registry of the options recognized by one subsystem.
///
/// Options are kept in declaration order, which is also the order they are documented and
/// validated in.
#[derive(Clone, Debug)]
pub struct Schema {
    name: &'static str,
    options: IndexMap<&'static str, OptionDescriptor>,
}

/// Incrementally declares the options of a [`Schema`].
#[derive(Debug)]
pub struct SchemaBuilder {
    name: &'static str,
    options: IndexMap<&'static str, OptionDescriptor>,
}

impl SchemaBuilder {
    /// Declares an option. A later declaration with the same key replaces the earlier one.
    #[must_use]
    pub fn option(mut self, descriptor: OptionDescriptor) -> Self {
        self.options.insert(descriptor.key(), descriptor);
        self
    }

    pub fn build(self) -> Schema {
        Schema {
            name: self.name,
            options: self.options,
        }
    }
}

impl Schema {
    pub fn builder(name: &'static str) -> SchemaBuilder {
        SchemaBuilder {
            name,
            options: IndexMap::new(),
        }
    }

    /// The name of the subsystem this schema describes.
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Gets every option descriptor, keyed by option name.
    pub const fn describe(&self) -> &IndexMap<&'static str, OptionDescriptor> {
        &self.options
    }

    pub fn get(&self, key: &str) -> Option<&OptionDescriptor> {
        self.options.get(key)
    }

    /// Judges whether `candidate` is an admissible value for the option `key`.
    ///
    /// The candidate is never altered.
    ///
    /// # Errors
    ///
    /// Fails if `key` is not an option of this schema, or if the candidate violates the option's
    /// format rule.
    pub fn validate(&self, key: &str, candidate: &Value) -> Result<(), ConfigError> {
        let descriptor = self.options.get(key).context(ConfigSnafu {
            key,
            reason: format!("not a recognized {} option", self.name),
        })?;

        descriptor
            .format()
            .check(candidate)
            .map_err(|reason| ConfigError::new(key, reason))
    }

    /// Validates a whole configuration object against this schema.
    ///
    /// Absent options take their default value. Keys the schema does not know about are logged
    /// and left out of the result.
    ///
    /// # Errors
    ///
    /// Every violated rule and every missing required option is reported; a configuration is
    /// either accepted as a whole or not at all.
    pub fn validate_config(&self, raw: &Map<String, Value>) -> Result<ValidatedConfig, Vec<ConfigError>> {
        let mut values = Map::new();
        let mut errors = Vec::new();

        for (key, descriptor) in &self.options {
            match (raw.get(*key), descriptor.default_value()) {
                (Some(candidate), _) => match self.validate(key, candidate) {
                    Ok(()) => {
                        values.insert((*key).to_owned(), candidate.clone());
                    }
                    Err(error) => errors.push(error),
                },
                (None, Some(default)) => {
                    values.insert((*key).to_owned(), default.clone());
                }
                (None, None) => errors.push(ConfigError::new(*key, "required option is missing")),
            }
        }

        for key in raw.keys().filter(|key| !self.options.contains_key(key.as_str())) {
            warn!(
                message = "Ignoring unrecognized configuration option.",
                schema = self.name,
                option = %key,
            );
        }

        if errors.is_empty() {
            Ok(ValidatedConfig { values })
        } else {
            Err(errors)
        }
    }

    /// Builds the configuration object made of every default value.
    ///
    /// Required options have no default and are left out.
    pub fn defaults(&self) -> Map<String, Value> {
        self.options
            .iter()
            .filter_map(|(key, descriptor)| {
                descriptor
                    .default_value()
                    .map(|default| ((*key).to_owned(), default.clone()))
            })
            .collect()
    }
}

/// A configuration object whose every value passed its option's format rule, or is the option's
/// default.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidatedConfig {
    values: Map<String, Value>,
}

impl ValidatedConfig {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Reads a numeric option, accepting numbers written as strings.
    pub fn get_numeric(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(as_numeric)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    pub const fn as_map(&self) -> &Map<String, Value> {
        &self.values
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.values
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use serde_json::json;
    use similar_asserts::assert_eq;

    use super::*;
    use crate::format::{FormatRule, Kind};

    fn above_ten(value: &Value) -> Result<(), String> {
        match as_numeric(value) {
            None => Err("must be a number".to_owned()),
            Some(n) if n <= 10.0 => Err("must be greater than 10".to_owned()),
            Some(_) => Ok(()),
        }
    }

    fn schema() -> Schema {
        Schema::builder("test")
            .option(
                OptionDescriptor::new("user", "user name")
                    .with_default("hdfs")
                    .with_format(FormatRule::Kind(Kind::String)),
            )
            .option(
                OptionDescriptor::new("limit", "a limit")
                    .with_default(30)
                    .with_format(FormatRule::Custom(above_ten)),
            )
            .option(OptionDescriptor::new("host", "required host"))
            .build()
    }

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!("test input must be an object"),
        }
    }

    #[test]
    fn describe_keeps_declaration_order() {
        let keys: Vec<_> = schema().describe().keys().copied().collect();
        assert_eq!(keys, vec!["user", "limit", "host"]);
    }

    #[test]
    fn validate_single_option() {
        let schema = schema();
        assert!(schema.validate("limit", &json!(11)).is_ok());
        assert_eq!(
            schema.validate("limit", &json!(10)),
            Err(ConfigError::new("limit", "must be greater than 10"))
        );
        assert!(schema.validate("host", &Value::Null).is_ok());
    }

    #[test]
    fn validate_unknown_option() {
        let error = schema().validate("nope", &json!(1)).unwrap_err();
        assert_eq!(error.key(), "nope");
        assert_eq!(error.reason(), "not a recognized test option");
    }

    #[test]
    fn absent_options_take_defaults() {
        let validated = schema()
            .validate_config(&object(json!({ "host": "nn1" })))
            .unwrap();
        assert_eq!(validated.get_str("user"), Some("hdfs"));
        assert_eq!(validated.get_numeric("limit"), Some(30.0));
        assert_eq!(validated.get_str("host"), Some("nn1"));
    }

    #[test]
    fn present_but_invalid_is_not_defaulted() {
        let errors = schema()
            .validate_config(&object(json!({ "host": "nn1", "user": 7 })))
            .unwrap_err();
        assert_eq!(
            errors,
            vec![ConfigError::new("user", "must be a string, found number")]
        );
    }

    #[test]
    fn collects_every_error() {
        let errors = schema()
            .validate_config(&object(json!({ "user": false, "limit": 2 })))
            .unwrap_err();
        let keys: Vec<_> = errors.iter().map(ConfigError::key).collect();
        assert_eq!(keys, vec!["user", "limit", "host"]);
        assert_eq!(errors[2].reason(), "required option is missing");
    }

    #[test]
    fn unknown_keys_are_dropped() {
        let validated = schema()
            .validate_config(&object(json!({ "host": "nn1", "extra": true })))
            .unwrap();
        assert!(validated.get("extra").is_none());
    }

    #[test]
    fn defaults_skip_required_options() {
        assert_eq!(
            Value::Object(schema().defaults()),
            json!({ "user": "hdfs", "limit": 30 })
        );
    }

    #[test]
    fn validated_config_serializes_as_a_plain_object() {
        let validated = schema()
            .validate_config(&object(json!({ "host": "nn1" })))
            .unwrap();
        assert_eq!(
            serde_json::to_value(&validated).unwrap(),
            json!({ "user": "hdfs", "limit": 30, "host": "nn1" })
        );
    }

    proptest! {
        #[test]
        fn limit_accepted_iff_above_ten(limit in -100i64..100) {
            let result = schema().validate("limit", &json!(limit));
            prop_assert_eq!(result.is_ok(), limit > 10);
        }

        #[test]
        fn validation_is_idempotent(limit in 11u32..10_000, user in "[a-z]{1,12}") {
            let raw = object(json!({ "host": "nn1", "limit": limit, "user": user }));
            let schema = schema();
            let first = schema.validate_config(&raw).unwrap();
            let second = schema.validate_config(&raw).unwrap();
            prop_assert_eq!(first, second);
        }
    }
}
