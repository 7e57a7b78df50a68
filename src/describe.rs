#![allow(missing_docs)]
use clap::Parser;
use serde::Serialize;
use serde_json::Value;
use terafoundation_config::Schema;

use crate::{config::system, connectors};

#[derive(Parser, Debug)]
#[command(rename_all = "kebab-case")]
pub struct Opts {
    /// Describe a connector type instead of the system section.
    #[arg(long)]
    connector: Option<String>,

    /// Format the description in an encoding scheme.
    #[arg(long, default_value = "text")]
    format: Format,
}

#[derive(clap::ValueEnum, Debug, Clone, PartialEq)]
enum Format {
    Text,
    Json,
}

#[derive(Serialize)]
struct EncodedOption<'a> {
    key: &'a str,
    doc: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    default: Option<&'a Value>,
    required: bool,
    format: String,
}

fn encode(schema: &Schema) -> Vec<EncodedOption<'_>> {
    schema
        .describe()
        .values()
        .map(|option| EncodedOption {
            key: option.key(),
            doc: option.doc(),
            default: option.default_value(),
            required: option.is_required(),
            format: option.format().to_string(),
        })
        .collect()
}

fn render_text(schema: &Schema) -> String {
    let mut out = format!("{}:\n", schema.name());
    for option in encode(schema) {
        out.push_str(&format!("\n  {}\n    {}\n", option.key, option.doc));
        match option.default {
            Some(default) => out.push_str(&format!("    default: {default}\n")),
            None => out.push_str("    required\n"),
        }
        out.push_str(&format!("    format: {}\n", option.format));
    }
    out
}

pub fn cmd(opts: &Opts) -> exitcode::ExitCode {
    let schema = match opts.connector.as_deref() {
        None => system::config_schema(),
        Some(connector_type) => match connectors::config_schema(connector_type) {
            Some(schema) => schema,
            None => {
                error!(
                    message = "Unknown connector type.",
                    connector_type,
                    available = %connectors::types().join(", "),
                );
                return exitcode::USAGE;
            }
        },
    };

    let output = match opts.format {
        Format::Text => render_text(&schema),
        Format::Json => match serde_json::to_string_pretty(&encode(&schema)) {
            Ok(json) => json,
            Err(error) => {
                error!(message = "Failed to serialize description.", %error);
                return exitcode::SOFTWARE;
            }
        },
    };

    #[allow(clippy::print_stdout)]
    {
        println!("{output}");
    }

    exitcode::OK
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_lists_every_option() {
        let text = render_text(&system::config_schema());
        assert!(text.starts_with("terafoundation:\n"));
        for key in ["environment", "logging", "log_level", "log_timeseries", "workers"] {
            assert!(text.contains(&format!("\n  {key}\n")), "missing {key}");
        }
        assert!(text.contains("default: \"monthly\""));
    }

    #[cfg(feature = "connectors-hdfs_ha")]
    #[test]
    fn json_marks_required_options() {
        let schema = connectors::config_schema("hdfs_ha").unwrap();
        let encoded = serde_json::to_value(encode(&schema)).unwrap();
        let host = encoded
            .as_array()
            .unwrap()
            .iter()
            .find(|option| option["key"] == "namenode_host")
            .unwrap();

        assert_eq!(host["required"], true);
        assert!(host.get("default").is_none());
    }
}
