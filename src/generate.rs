#![allow(missing_docs)]
use std::{fs, path::PathBuf};

use clap::Parser;
use serde_json::{Map, Value};

use crate::{
    config::{
        CONNECTORS_KEY, Format, SYSTEM_SECTION,
        format::{self, FormatHint},
        system,
    },
    connectors,
};

#[derive(Parser, Debug)]
#[command(rename_all = "kebab-case")]
pub struct Opts {
    /// Format of the generated document (toml, yaml or json).
    /// Defaults to the format of `--file` when given, otherwise yaml.
    #[arg(long)]
    format: Option<Format>,

    /// Include an endpoint named `default` for each of these connector types, with its defaults.
    #[arg(long, value_delimiter(','))]
    connectors: Vec<String>,

    /// Generate config as a file
    #[arg(long)]
    file: Option<PathBuf>,
}

/// Builds a host document holding every default value.
///
/// Connector endpoints list only their defaults, so required connector options have to be filled
/// in before the document validates.
pub fn generate_document(connector_types: &[String]) -> Result<Value, String> {
    let mut section = system::config_schema().defaults();

    if !connector_types.is_empty() {
        let mut types = Map::new();
        for connector_type in connector_types {
            let schema = connectors::config_schema(connector_type).ok_or_else(|| {
                format!(
                    "Unknown connector type \"{connector_type}\", expected one of: {}.",
                    connectors::types().join(", ")
                )
            })?;
            let mut endpoints = Map::new();
            endpoints.insert("default".to_owned(), Value::Object(schema.defaults()));
            types.insert(connector_type.clone(), Value::Object(endpoints));
        }
        section.insert(CONNECTORS_KEY.to_owned(), Value::Object(types));
    }

    let mut document = Map::new();
    document.insert(SYSTEM_SECTION.to_owned(), Value::Object(section));
    Ok(Value::Object(document))
}

fn output_format(opts: &Opts) -> Format {
    let from_file: FormatHint = opts
        .file
        .as_ref()
        .and_then(Format::from_path);
    opts.format.or(from_file).unwrap_or_default()
}

pub fn cmd(opts: &Opts) -> exitcode::ExitCode {
    let document = match generate_document(&opts.connectors) {
        Ok(document) => document,
        Err(error) => {
            error!(message = "Failed to generate configuration.", %error);
            return exitcode::USAGE;
        }
    };

    let output = match format::serialize(&document, output_format(opts)) {
        Ok(output) => output,
        Err(error) => {
            error!(message = "Failed to serialize configuration.", %error);
            return exitcode::SOFTWARE;
        }
    };

    match &opts.file {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
                if let Err(error) = fs::create_dir_all(parent) {
                    error!(message = "Failed to create directory.", path = ?parent, %error);
                    return exitcode::IOERR;
                }
            }
            if let Err(error) = fs::write(path, output) {
                error!(message = "Failed to write file.", ?path, %error);
                return exitcode::IOERR;
            }
            info!(message = "Config file written.", ?path);
        }
        #[allow(clippy::print_stdout)]
        None => println!("{output}"),
    }

    exitcode::OK
}

#[cfg(test)]
mod tests {
    use similar_asserts::assert_eq;

    use super::*;
    use crate::config::load_from_str;

    #[test]
    fn generated_defaults_validate() {
        for format in [Format::Toml, Format::Yaml, Format::Json] {
            let document = generate_document(&[]).unwrap();
            let content = format::serialize(&document, format).unwrap();
            let config = load_from_str(&content, format).unwrap();
            assert_eq!(
                Value::Object(config.validated.into_inner()),
                document[SYSTEM_SECTION]
            );
        }
    }

    #[cfg(feature = "connectors-hdfs_ha")]
    #[test]
    fn connector_defaults_need_required_options() {
        let document = generate_document(&["hdfs_ha".to_owned()]).unwrap();
        let endpoint = &document[SYSTEM_SECTION][CONNECTORS_KEY]["hdfs_ha"]["default"];
        assert_eq!(endpoint["namenode_port"], 50070);
        assert!(endpoint.get("namenode_host").is_none());

        let content = format::serialize(&document, Format::Json).unwrap();
        let errors = load_from_str(&content, Format::Json).unwrap_err();
        assert_eq!(
            errors,
            vec![
                "terafoundation.connectors.hdfs_ha.default: Invalid value for option 'namenode_host': required option is missing"
            ]
        );
    }

    #[test]
    fn unknown_connector_type() {
        let error = generate_document(&["s3".to_owned()]).unwrap_err();
        assert!(error.starts_with("Unknown connector type \"s3\""));
    }

    #[test]
    fn format_follows_file_extension() {
        let opts = Opts {
            format: None,
            connectors: vec![],
            file: Some(PathBuf::from("out/terafoundation.toml")),
        };
        assert_eq!(output_format(&opts), Format::Toml);

        let opts = Opts {
            format: Some(Format::Json),
            ..opts
        };
        assert_eq!(output_format(&opts), Format::Json);
    }
}
