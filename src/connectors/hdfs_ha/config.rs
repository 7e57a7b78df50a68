use serde::Serialize;
use serde_json::{Map, Value};
use terafoundation_config::{
    ConfigError, FormatRule, Kind, OptionDescriptor, Schema, ValidatedConfig, as_numeric,
};

pub const USER: &str = "user";
pub const NAMENODE_PORT: &str = "namenode_port";
pub const NAMENODE_HOST: &str = "namenode_host";
pub const PATH_PREFIX: &str = "path_prefix";

/// The namenode(s) a connector may talk to.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(untagged)]
pub enum HostSet {
    Single(String),
    List(HostList),
}

/// A high-availability candidate list holding at least two hosts.
///
/// Only [`HostSet::list`] builds one.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct HostList(Vec<String>);

impl HostList {
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// The first candidate, designated active.
    pub fn first(&self) -> &str {
        &self.0[0]
    }
}

impl HostSet {
    /// Builds a high-availability host list.
    ///
    /// # Errors
    ///
    /// Fails when fewer than two hosts are given.
    pub fn list(hosts: Vec<String>) -> Result<Self, String> {
        if hosts.len() < 2 {
            return Err(format!(
                "at least two namenodes required, found {}",
                hosts.len()
            ));
        }
        Ok(HostSet::List(HostList(hosts)))
    }

    /// Parses the `namenode_host` option: a single host name, or an array of host names.
    pub fn parse(value: &Value) -> Result<Self, String> {
        match value {
            Value::String(host) if host.is_empty() => {
                Err("must be a string or an array, found an empty string".to_owned())
            }
            Value::String(host) => Ok(HostSet::Single(host.clone())),
            Value::Array(entries) => {
                let hosts = entries
                    .iter()
                    .map(|entry| match entry {
                        Value::String(host) if !host.is_empty() => Ok(host.clone()),
                        other => Err(format!(
                            "must be a string or an array of non-empty strings, found entry {other}"
                        )),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                HostSet::list(hosts)
            }
            other => Err(format!(
                "must be a string or an array, found {}",
                Kind::name_of(other)
            )),
        }
    }

    /// The namenode designated active: the single host, or the first of the list.
    pub fn current(&self) -> &str {
        match self {
            HostSet::Single(host) => host,
            HostSet::List(hosts) => hosts.first(),
        }
    }

    pub const fn is_high_availability(&self) -> bool {
        matches!(self, HostSet::List(_))
    }

    pub fn hosts(&self) -> &[String] {
        match self {
            HostSet::Single(host) => std::slice::from_ref(host),
            HostSet::List(hosts) => hosts.as_slice(),
        }
    }
}

fn validate_namenode_host(value: &Value) -> Result<(), String> {
    HostSet::parse(value).map(drop)
}

fn validate_namenode_port(value: &Value) -> Result<(), String> {
    port(value).map(drop)
}

fn port(value: &Value) -> Result<u16, String> {
    match as_numeric(value) {
        Some(number) if number.fract() == 0.0 && (1.0..=65535.0).contains(&number) => {
            Ok(number as u16)
        }
        _ => Err(format!("must be a port number between 1 and 65535, found {value}")),
    }
}

/// Gets the schema of an `hdfs_ha` connector endpoint.
pub fn config_schema() -> Schema {
    Schema::builder("hdfs_ha")
        .option(
            OptionDescriptor::new(USER, "User name sent with every WebHDFS request.")
                .with_default("hdfs")
                .with_format(FormatRule::Kind(Kind::String)),
        )
        .option(
            OptionDescriptor::new(NAMENODE_PORT, "Port of the namenode web interface.")
                .with_default(50070)
                .with_format(FormatRule::Custom(validate_namenode_port)),
        )
        .option(
            OptionDescriptor::new(
                NAMENODE_HOST,
                "A single namenode host, or an array of at least two hosts for high availability.",
            )
            .with_format(FormatRule::Custom(validate_namenode_host)),
        )
        .option(
            OptionDescriptor::new(PATH_PREFIX, "Path of the WebHDFS endpoint on the namenode.")
                .with_default("/webhdfs/v1")
                .with_format(FormatRule::Kind(Kind::String)),
        )
        .build()
}

/// A resolved connector configuration.
///
/// `effective` is the validated input with `namenode_host` replaced by the active namenode, which
/// is what the underlying client is built from.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ConnectorConfig {
    pub current_host: String,
    pub high_availability: bool,
    pub hosts: HostSet,
    pub user: String,
    pub namenode_port: u16,
    pub path_prefix: String,
    pub effective: Map<String, Value>,
}

impl ConnectorConfig {
    /// The full candidate list, when high availability is in effect.
    pub fn namenode_list(&self) -> Option<&[String]> {
        match &self.hosts {
            HostSet::List(hosts) => Some(hosts.as_slice()),
            HostSet::Single(_) => None,
        }
    }
}

impl TryFrom<&ValidatedConfig> for ConnectorConfig {
    type Error = ConfigError;

    fn try_from(config: &ValidatedConfig) -> Result<Self, Self::Error> {
        let hosts = HostSet::parse(option(config, NAMENODE_HOST)?)
            .map_err(|reason| ConfigError::new(NAMENODE_HOST, reason))?;
        let current_host = hosts.current().to_owned();

        let namenode_port = port(option(config, NAMENODE_PORT)?)
            .map_err(|reason| ConfigError::new(NAMENODE_PORT, reason))?;

        let mut effective = config.as_map().clone();
        effective.insert(NAMENODE_HOST.to_owned(), Value::from(current_host.clone()));

        Ok(Self {
            high_availability: hosts.is_high_availability(),
            current_host,
            hosts,
            user: string(config, USER)?,
            namenode_port,
            path_prefix: string(config, PATH_PREFIX)?,
            effective,
        })
    }
}

fn option<'a>(config: &'a ValidatedConfig, key: &str) -> Result<&'a Value, ConfigError> {
    config
        .get(key)
        .ok_or_else(|| ConfigError::new(key, "required option is missing"))
}

fn string(config: &ValidatedConfig, key: &str) -> Result<String, ConfigError> {
    option(config, key)?
        .as_str()
        .map(ToOwned::to_owned)
        .ok_or_else(|| ConfigError::new(key, "must be a string"))
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use similar_asserts::assert_eq;

    use super::*;

    fn validate(raw: Value) -> Result<ValidatedConfig, Vec<ConfigError>> {
        let Value::Object(raw) = raw else {
            panic!("test input must be an object");
        };
        config_schema().validate_config(&raw)
    }

    fn resolve(raw: Value) -> ConnectorConfig {
        ConnectorConfig::try_from(&validate(raw).unwrap()).unwrap()
    }

    #[test]
    fn defaults() {
        let validated = validate(json!({ "namenode_host": "nn1" })).unwrap();
        assert_eq!(validated.get_str(USER), Some("hdfs"));
        assert_eq!(validated.get(NAMENODE_PORT), Some(&json!(50070)));
        assert_eq!(validated.get_str(PATH_PREFIX), Some("/webhdfs/v1"));
    }

    #[test]
    fn namenode_host_is_required() {
        let errors = validate(json!({})).unwrap_err();
        assert_eq!(
            errors,
            vec![ConfigError::new(NAMENODE_HOST, "required option is missing")]
        );
    }

    #[test]
    fn namenode_host_shapes() {
        let schema = config_schema();
        assert!(schema.validate(NAMENODE_HOST, &json!("nn1")).is_ok());
        assert!(schema.validate(NAMENODE_HOST, &json!(["nn1", "nn2"])).is_ok());

        let error = schema.validate(NAMENODE_HOST, &json!(["nn1"])).unwrap_err();
        assert!(error.reason().starts_with("at least two namenodes required"));

        let error = schema.validate(NAMENODE_HOST, &json!([])).unwrap_err();
        assert!(error.reason().starts_with("at least two namenodes required"));

        let error = schema.validate(NAMENODE_HOST, &json!(42)).unwrap_err();
        assert_eq!(error.reason(), "must be a string or an array, found number");

        let error = schema.validate(NAMENODE_HOST, &Value::Null).unwrap_err();
        assert_eq!(error.reason(), "must be a string or an array, found null");

        let error = schema.validate(NAMENODE_HOST, &json!("")).unwrap_err();
        assert_eq!(
            error.reason(),
            "must be a string or an array, found an empty string"
        );

        let error = schema.validate(NAMENODE_HOST, &json!(["nn1", 2])).unwrap_err();
        assert_eq!(
            error.reason(),
            "must be a string or an array of non-empty strings, found entry 2"
        );

        let error = schema.validate(NAMENODE_HOST, &json!(["nn1", ""])).unwrap_err();
        assert_eq!(
            error.reason(),
            r#"must be a string or an array of non-empty strings, found entry """#
        );
    }

    #[test]
    fn namenode_port() {
        let schema = config_schema();
        assert!(schema.validate(NAMENODE_PORT, &json!(8020)).is_ok());
        assert!(schema.validate(NAMENODE_PORT, &json!("9870")).is_ok());
        assert!(schema.validate(NAMENODE_PORT, &json!(0)).is_err());
        assert!(schema.validate(NAMENODE_PORT, &json!(70000)).is_err());
        assert!(schema.validate(NAMENODE_PORT, &json!(80.5)).is_err());
    }

    #[test]
    fn single_host() {
        let config = resolve(json!({ "namenode_host": "nn1" }));
        assert_eq!(config.current_host, "nn1");
        assert!(!config.high_availability);
        assert_eq!(config.namenode_list(), None);
        assert_eq!(config.hosts.hosts(), ["nn1"]);
    }

    #[test]
    fn host_list() {
        let config = resolve(json!({ "namenode_host": ["nn1", "nn2", "nn3"] }));
        assert_eq!(config.current_host, "nn1");
        assert!(config.high_availability);
        assert_eq!(
            config.namenode_list(),
            Some(&["nn1".to_owned(), "nn2".to_owned(), "nn3".to_owned()][..])
        );
    }

    #[test]
    fn effective_config_carries_scalar_host() {
        let config = resolve(json!({
            "namenode_host": ["nn1", "nn2"],
            "namenode_port": 9870,
            "user": "etl",
        }));

        assert_eq!(
            Value::Object(config.effective),
            json!({
                "namenode_host": "nn1",
                "namenode_port": 9870,
                "path_prefix": "/webhdfs/v1",
                "user": "etl",
            })
        );
        assert_eq!(config.namenode_port, 9870);
        assert_eq!(config.user, "etl");
    }

    #[test]
    fn host_lists_come_from_the_checked_constructor() {
        assert!(HostSet::list(Vec::new()).is_err());
        assert!(HostSet::list(vec!["nn1".to_owned()]).is_err());

        let hosts = HostSet::list(vec!["nn1".to_owned(), "nn2".to_owned()]).unwrap();
        let HostSet::List(list) = &hosts else {
            panic!("expected a host list, got {hosts:?}");
        };
        assert_eq!(list.first(), "nn1");
        assert_eq!(list.as_slice(), ["nn1", "nn2"]);
        assert_eq!(hosts.current(), "nn1");
        assert!(hosts.is_high_availability());
        assert_eq!(serde_json::to_value(&hosts).unwrap(), json!(["nn1", "nn2"]));
    }
}
