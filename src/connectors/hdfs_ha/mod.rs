//! The `hdfs_ha` connector.
//!
//! Resolves which namenode of a (possibly highly-available) WebHDFS deployment to use, and
//! wraps a client for it behind an asynchronous interface. Only the initial namenode is
//! selected here; switching to another candidate when the active one fails is not handled.

pub mod client;
pub mod config;
mod handle;

use terafoundation_config::{Schema, ValidatedConfig};

pub use self::{
    client::{ClientError, FileStatus, FileType, RestClient, WebHdfs},
    config::{ConnectorConfig, HostList, HostSet},
    handle::HdfsClient,
};
use crate::internal_events::HdfsHaConnectorResolved;

/// Connector type name, as used under `connectors` in the host document.
pub const NAME: &str = "hdfs_ha";

/// A resolved connector: its configuration, and the client handle built from it.
#[derive(Clone, Debug)]
pub struct Connection<C> {
    pub config: ConnectorConfig,
    pub client: HdfsClient<C>,
}

pub fn config_schema() -> Schema {
    config::config_schema()
}

/// Resolves a validated endpoint configuration and connects a [`RestClient`] to the active
/// namenode.
///
/// No request is sent: the client only talks to the namenode once an operation is called.
pub fn create(config: &ValidatedConfig) -> crate::Result<Connection<RestClient>> {
    create_with(config, RestClient::new)
}

/// Like [`create`], building the underlying client with `build`.
pub fn create_with<C, F, E>(config: &ValidatedConfig, build: F) -> crate::Result<Connection<C>>
where
    C: WebHdfs,
    F: FnOnce(&ConnectorConfig) -> Result<C, E>,
    E: std::error::Error + Send + Sync + 'static,
{
    let config = ConnectorConfig::try_from(config)?;
    let client = HdfsClient::new(build(&config)?);

    emit!(HdfsHaConnectorResolved {
        current_host: &config.current_host,
        high_availability: config.high_availability,
    });

    Ok(Connection { config, client })
}
