#![deny(unused_allocation)]
#![deny(unused_assignments)]
#![deny(unused_comparisons)]

//! Host configuration for terafoundation services: validation of the system section and of
//! connector endpoints, and the `hdfs_ha` connector.

#[macro_use]
extern crate tracing;

#[macro_use]
pub mod internal_events;

pub mod app;
pub mod cli;
pub mod config;
pub mod connectors;
pub mod describe;
pub mod generate;
pub mod trace;
pub mod validate;

pub use terafoundation_config as schema;

pub type Error = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type Result<T> = std::result::Result<T, Error>;

pub fn get_version() -> String {
    let pkg_version = env!("CARGO_PKG_VERSION");
    match option_env!("TERAFOUNDATION_BUILD_DESC") {
        Some(desc) => format!("{pkg_version} ({desc})"),
        None => pkg_version.to_owned(),
    }
}
