use std::{fs, path::Path};

use indexmap::IndexMap;
use serde_json::{Map, Value};
use terafoundation_config::{Kind, ValidatedConfig};

use super::{
    Format, FormatHint, HostConfig, format,
    system::{self, SYSTEM_SECTION, SystemConfig},
};
use crate::{connectors, internal_events::ConfigLoaded};

/// Key of the connector definitions inside the system section.
pub const CONNECTORS_KEY: &str = "connectors";

/// Loads and validates a host document from a file.
///
/// The format is taken from `hint`, or guessed from the file extension, falling back to YAML.
pub fn load_from_path(path: &Path, hint: FormatHint) -> Result<HostConfig, Vec<String>> {
    let format = hint
        .or_else(|| Format::from_path(path))
        .unwrap_or_default();

    let content = fs::read_to_string(path)
        .map_err(|error| vec![format!("Could not read config file {path:?}: {error}.")])?;
    let config = load_from_str(&content, format)?;

    emit!(ConfigLoaded {
        path,
        connectors: config.connectors.values().map(IndexMap::len).sum(),
    });

    Ok(config)
}

/// Loads and validates a host document.
///
/// The system section and every connector endpoint are validated; all errors found are returned
/// together, and nothing is returned unless the whole document is valid.
pub fn load_from_str(content: &str, format: Format) -> Result<HostConfig, Vec<String>> {
    let document: Value = if content.trim().is_empty() {
        Value::Null
    } else {
        format::deserialize(content, format)?
    };
    load_from_document(document)
}

fn load_from_document(document: Value) -> Result<HostConfig, Vec<String>> {
    let mut section = match document {
        Value::Null => Map::new(),
        Value::Object(mut root) => match root.remove(SYSTEM_SECTION) {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(section)) => section,
            Some(other) => {
                return Err(vec![format!(
                    "Section \"{SYSTEM_SECTION}\" must be an object, found {}.",
                    Kind::name_of(&other)
                )]);
            }
        },
        other => {
            return Err(vec![format!(
                "Configuration document must be an object, found {}.",
                Kind::name_of(&other)
            )]);
        }
    };

    let raw_connectors = section.remove(CONNECTORS_KEY);
    let mut errors = Vec::new();

    let system = match system::config_schema().validate_config(&section) {
        Ok(validated) => match SystemConfig::try_from(&validated) {
            Ok(system) => Some((validated, system)),
            Err(error) => {
                errors.push(format!("{SYSTEM_SECTION}: {error}"));
                None
            }
        },
        Err(errs) => {
            errors.extend(
                errs.into_iter()
                    .map(|error| format!("{SYSTEM_SECTION}: {error}")),
            );
            None
        }
    };

    let connectors = load_connectors(raw_connectors, &mut errors);

    match system {
        Some((validated, system)) if errors.is_empty() => Ok(HostConfig {
            system,
            validated,
            connectors,
        }),
        _ => Err(errors),
    }
}

fn load_connectors(
    raw: Option<Value>,
    errors: &mut Vec<String>,
) -> IndexMap<String, IndexMap<String, ValidatedConfig>> {
    let mut connectors = IndexMap::new();

    let types = match raw {
        None | Some(Value::Null) => return connectors,
        Some(Value::Object(types)) => types,
        Some(other) => {
            errors.push(format!(
                "{SYSTEM_SECTION}.{CONNECTORS_KEY}: must be an object, found {}.",
                Kind::name_of(&other)
            ));
            return connectors;
        }
    };

    for (connector_type, endpoints) in types {
        let Some(schema) = connectors::config_schema(&connector_type) else {
            errors.push(format!(
                "{SYSTEM_SECTION}.{CONNECTORS_KEY}: unknown connector type \"{connector_type}\", expected one of: {}.",
                connectors::types().join(", ")
            ));
            continue;
        };

        let endpoints = match endpoints {
            Value::Object(endpoints) => endpoints,
            other => {
                errors.push(format!(
                    "{SYSTEM_SECTION}.{CONNECTORS_KEY}.{connector_type}: must be an object of endpoints, found {}.",
                    Kind::name_of(&other)
                ));
                continue;
            }
        };

        let mut validated_endpoints = IndexMap::new();
        for (endpoint, raw) in endpoints {
            let path = format!("{SYSTEM_SECTION}.{CONNECTORS_KEY}.{connector_type}.{endpoint}");
            let raw = match raw {
                Value::Object(raw) => raw,
                other => {
                    errors.push(format!(
                        "{path}: must be an object, found {}.",
                        Kind::name_of(&other)
                    ));
                    continue;
                }
            };

            match schema.validate_config(&raw) {
                Ok(validated) => {
                    validated_endpoints.insert(endpoint, validated);
                }
                Err(errs) => errors.extend(errs.into_iter().map(|error| format!("{path}: {error}"))),
            }
        }

        connectors.insert(connector_type, validated_endpoints);
    }

    connectors
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use serde_json::json;
    use similar_asserts::assert_eq;

    use super::*;
    use crate::config::system::{LogLevel, LoggingSink, Severity};

    #[test]
    fn empty_documents_use_defaults() {
        for (content, format) in [("", Format::Yaml), ("\n", Format::Json), ("{}", Format::Json)] {
            let config = load_from_str(content, format).unwrap();
            assert_eq!(config.system.logging, vec![LoggingSink::Console]);
            assert!(config.connectors.is_empty());
        }
    }

    #[test]
    fn other_top_level_sections_are_ignored() {
        let config = load_from_str(
            indoc! {r#"
                teraslice:
                  workers: 8
                terafoundation:
                  log_level: warn
            "#},
            Format::Yaml,
        )
        .unwrap();
        assert_eq!(config.system.log_level, LogLevel::Scalar(Severity::Warn));
    }

    #[test]
    fn connectors_are_not_system_options() {
        let config = load_from_str(
            indoc! {r#"
                terafoundation:
                  connectors:
                    hdfs_ha:
                      default:
                        namenode_host: nn1
                      archive:
                        namenode_host: [nn2, nn3]
                        user: archiver
            "#},
            Format::Yaml,
        )
        .unwrap();

        assert!(config.validated.get(CONNECTORS_KEY).is_none());
        let endpoints = &config.connectors["hdfs_ha"];
        assert_eq!(endpoints.len(), 2);
        assert_eq!(
            endpoints["default"].get_str("namenode_host"),
            Some("nn1")
        );
        assert_eq!(
            config.connector("hdfs_ha", "archive").and_then(|c| c.get("namenode_host")),
            Some(&json!(["nn2", "nn3"]))
        );
    }

    #[test]
    fn reports_every_error_across_sections() {
        let errors = load_from_str(
            indoc! {r#"
                terafoundation:
                  logging: [console, syslog]
                  log_buffer_limit: 10
                  connectors:
                    hdfs_ha:
                      default:
                        namenode_host: [nn1]
                    s3:
                      default: {}
            "#},
            Format::Yaml,
        )
        .unwrap_err();

        assert_eq!(
            errors,
            vec![
                "terafoundation: Invalid value for option 'logging': invalid logging sink: syslog",
                "terafoundation: Invalid value for option 'log_buffer_limit': must be greater than 10",
                "terafoundation.connectors.hdfs_ha.default: Invalid value for option 'namenode_host': at least two namenodes required, found 1",
                "terafoundation.connectors: unknown connector type \"s3\", expected one of: hdfs_ha.",
            ]
        );
    }

    #[test]
    fn malformed_sections() {
        assert_eq!(
            load_from_str("[1, 2]", Format::Json).unwrap_err(),
            vec!["Configuration document must be an object, found array."]
        );
        assert_eq!(
            load_from_str(r#"{"terafoundation": "yes"}"#, Format::Json).unwrap_err(),
            vec!["Section \"terafoundation\" must be an object, found string."]
        );
        assert_eq!(
            load_from_str(
                r#"{"terafoundation": {"connectors": {"hdfs_ha": {"default": "nn1"}}}}"#,
                Format::Json
            )
            .unwrap_err(),
            vec!["terafoundation.connectors.hdfs_ha.default: must be an object, found string."]
        );
    }

    #[test]
    fn load_from_path_guesses_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("terafoundation.toml");
        fs::write(
            &path,
            indoc! {r#"
                [terafoundation]
                log_timeseries = "daily"
            "#},
        )
        .unwrap();

        let config = load_from_path(&path, None).unwrap();
        assert_eq!(config.validated.get_str("log_timeseries"), Some("daily"));
    }

    #[test]
    fn load_from_missing_path() {
        let errors = load_from_path(Path::new("/nonexistent/terafoundation.yaml"), None).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("Could not read config file"));
    }
}
