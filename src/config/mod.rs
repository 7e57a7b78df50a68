use indexmap::IndexMap; // IndexMap preserves insertion order, so connectors are reported in document order
use serde::Serialize;
use terafoundation_config::ValidatedConfig;

pub mod format;
mod loading;
pub mod system;

pub use format::{Format, FormatHint};
pub use loading::{CONNECTORS_KEY, load_from_path, load_from_str};
pub use system::{SYSTEM_SECTION, SystemConfig};

/// A validated host document.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HostConfig {
    /// Typed view of the system section.
    #[serde(skip)]
    pub system: SystemConfig,
    /// The system section with every default filled in.
    #[serde(rename = "terafoundation")]
    pub validated: ValidatedConfig,
    /// Validated endpoint configurations, by connector type then endpoint name.
    pub connectors: IndexMap<String, IndexMap<String, ValidatedConfig>>,
}

impl HostConfig {
    /// Gets the validated configuration of one connector endpoint.
    pub fn connector(&self, connector_type: &str, endpoint: &str) -> Option<&ValidatedConfig> {
        self.connectors.get(connector_type)?.get(endpoint)
    }

    /// Iterates over every connector endpoint as `(type, endpoint, config)`.
    pub fn endpoints(&self) -> impl Iterator<Item = (&str, &str, &ValidatedConfig)> {
        self.connectors.iter().flat_map(|(connector_type, endpoints)| {
            endpoints
                .iter()
                .map(move |(endpoint, config)| (connector_type.as_str(), endpoint.as_str(), config))
        })
    }

    #[cfg(feature = "connectors-hdfs_ha")]
    pub fn hdfs_ha(&self, endpoint: &str) -> Option<&ValidatedConfig> {
        self.connector(crate::connectors::hdfs_ha::NAME, endpoint)
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;

    #[test]
    fn endpoints_are_listed_per_type() {
        let config = load_from_str(
            indoc! {r#"
                {
                  "terafoundation": {
                    "connectors": {
                      "hdfs_ha": {
                        "default": { "namenode_host": "nn1" },
                        "ha": { "namenode_host": ["nn1", "nn2"] }
                      }
                    }
                  }
                }
            "#},
            Format::Json,
        )
        .unwrap();

        let mut endpoints: Vec<_> = config
            .endpoints()
            .map(|(connector_type, endpoint, _)| format!("{connector_type}.{endpoint}"))
            .collect();
        endpoints.sort();
        assert_eq!(endpoints, vec!["hdfs_ha.default", "hdfs_ha.ha"]);

        assert!(config.hdfs_ha("ha").is_some());
        assert!(config.hdfs_ha("missing").is_none());
        assert!(config.connector("s3", "default").is_none());
    }
}
