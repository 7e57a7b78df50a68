//! Storage connectors configured under `terafoundation.connectors`.

#[cfg(feature = "connectors-hdfs_ha")]
pub mod hdfs_ha;

use terafoundation_config::Schema;

/// Names of the connector types compiled into this build.
pub fn types() -> Vec<&'static str> {
    vec![
        #[cfg(feature = "connectors-hdfs_ha")]
        hdfs_ha::NAME,
    ]
}

/// Gets the endpoint schema of a connector type.
pub fn config_schema(connector_type: &str) -> Option<Schema> {
    match connector_type {
        #[cfg(feature = "connectors-hdfs_ha")]
        hdfs_ha::NAME => Some(hdfs_ha::config_schema()),
        _ => None,
    }
}
