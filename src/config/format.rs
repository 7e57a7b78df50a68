//! Host documents can be written as TOML, YAML or JSON. All three decode to the same
//! `serde_json::Value` tree before any section is validated.

#![deny(missing_docs, missing_debug_implementations)]

use std::{fmt, path::Path, str::FromStr};

use serde::{Serialize, de::DeserializeOwned};

/// A format given on the command line, if any.
pub type FormatHint = Option<Format>;

/// Syntax of a host document.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Format {
    /// TOML.
    Toml,
    /// JSON.
    Json,
    /// YAML, also assumed for files without a known extension.
    #[default]
    Yaml,
}

impl Format {
    const ALL: [Format; 3] = [Format::Toml, Format::Json, Format::Yaml];

    const fn extensions(self) -> &'static [&'static str] {
        match self {
            Format::Toml => &["toml"],
            Format::Json => &["json"],
            Format::Yaml => &["yaml", "yml"],
        }
    }

    /// Guesses the format of a document from its file extension, which must be lowercase.
    pub fn from_path(path: impl AsRef<Path>) -> FormatHint {
        let extension = path.as_ref().extension()?.to_str()?;
        Format::ALL
            .into_iter()
            .find(|format| format.extensions().contains(&extension))
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.to_lowercase();
        Format::ALL
            .into_iter()
            .find(|format| format.extensions().contains(&name.as_str()))
            .ok_or_else(|| format!("Invalid format: {s}"))
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extensions()[0])
    }
}

/// Decodes a host document.
///
/// A syntax error is returned as a single message naming the format the document was read as.
pub fn deserialize<T: DeserializeOwned>(content: &str, format: Format) -> Result<T, Vec<String>> {
    let decoded = match format {
        Format::Toml => toml::from_str(content).map_err(|error| error.to_string()),
        Format::Yaml => serde_yaml::from_str(content).map_err(|error| error.to_string()),
        Format::Json => serde_json::from_str(content).map_err(|error| error.to_string()),
    };
    decoded.map_err(|error| vec![format!("Invalid {format} document: {}", error.trim_end())])
}

/// Encodes a host document. JSON output is pretty-printed.
pub fn serialize<T: Serialize>(value: &T, format: Format) -> Result<String, String> {
    let encoded = match format {
        Format::Toml => toml::to_string(value).map_err(|error| error.to_string()),
        Format::Yaml => serde_yaml::to_string(value).map_err(|error| error.to_string()),
        Format::Json => serde_json::to_string_pretty(value).map_err(|error| error.to_string()),
    };
    encoded.map_err(|error| format!("Could not write {format} document: {error}"))
}
