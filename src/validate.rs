#![allow(missing_docs)]
use std::path::PathBuf;

use clap::Parser;
use colored::*;
use serde::Serialize;

#[cfg(feature = "connectors-hdfs_ha")]
use crate::connectors::hdfs_ha;
use crate::{
    cli::handle_config_errors,
    config::{self, Format, HostConfig},
};

#[derive(Parser, Debug)]
#[command(rename_all = "kebab-case")]
pub struct Opts {
    /// Host configuration document to validate.
    /// File format is detected from the file name unless `--format` is given.
    #[arg(short, long, env = "TERAFOUNDATION_CONFIG")]
    pub config: PathBuf,

    /// Force the format of the configuration document (toml, yaml or json).
    #[arg(long)]
    pub format: Option<Format>,

    /// Check that every hdfs_ha endpoint answers a status request for its root directory.
    #[arg(long)]
    pub probe: bool,

    /// Print the validated configuration, defaults included, as JSON.
    #[arg(long)]
    pub print: bool,
}

#[derive(Serialize)]
struct Summary<'a> {
    #[serde(flatten)]
    config: &'a HostConfig,
    workers: usize,
    sinks: Vec<&'static str>,
}

/// Validates a host document and resolves its connectors.
pub fn validate(opts: &Opts, color: bool) -> exitcode::ExitCode {
    let mut fmt = Formatter::new(color);

    let config = match config::load_from_path(&opts.config, opts.format) {
        Ok(config) => config,
        Err(errors) => {
            fmt.error(format!("Failed to load {:?}", opts.config));
            return handle_config_errors(errors);
        }
    };
    fmt.success(format!("Loaded {:?}", opts.config));

    #[cfg(feature = "connectors-hdfs_ha")]
    if let Err(code) = resolve_hdfs_ha(&config, opts.probe, &mut fmt) {
        return code;
    }

    if opts.print {
        let summary = Summary {
            config: &config,
            workers: config.system.workers,
            sinks: config.system.sinks().into_iter().map(|sink| sink.as_str()).collect(),
        };
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => Formatter::print_raw(&json),
            Err(error) => {
                error!(message = "Failed to serialize configuration.", %error);
                return exitcode::SOFTWARE;
            }
        }
    }

    fmt.success("Validated");
    exitcode::OK
}

/// Connects every hdfs_ha endpoint, and probes them when asked to.
#[cfg(feature = "connectors-hdfs_ha")]
fn resolve_hdfs_ha(
    config: &HostConfig,
    probe_endpoints: bool,
    fmt: &mut Formatter,
) -> Result<(), exitcode::ExitCode> {
    let mut errors = Vec::new();
    let mut connections = Vec::new();
    for (connector_type, endpoint, endpoint_config) in config.endpoints() {
        if connector_type != hdfs_ha::NAME {
            continue;
        }
        match hdfs_ha::create(endpoint_config) {
            Ok(connection) => {
                fmt.success(format!(
                    "Resolved {connector_type}.{endpoint} to {}",
                    connection.config.current_host
                ));
                connections.push((endpoint.to_owned(), connection));
            }
            Err(error) => errors.push(format!("{connector_type}.{endpoint}: {error}")),
        }
    }
    if !errors.is_empty() {
        return Err(handle_config_errors(errors));
    }

    if !probe_endpoints || connections.is_empty() {
        return Ok(());
    }

    match probe(&connections, config.system.workers) {
        Ok(failures) if failures.is_empty() => {
            fmt.success("Probed every hdfs_ha endpoint");
            Ok(())
        }
        Ok(failures) => {
            for failure in failures {
                fmt.error(failure);
            }
            Err(exitcode::UNAVAILABLE)
        }
        Err(error) => {
            error!(message = "Failed to start the async runtime.", %error);
            Err(exitcode::OSERR)
        }
    }
}

/// Requests the status of `/` from every endpoint concurrently, returning one message per
/// endpoint that failed.
#[cfg(feature = "connectors-hdfs_ha")]
fn probe(
    connections: &[(String, hdfs_ha::Connection<hdfs_ha::RestClient>)],
    workers: usize,
) -> std::io::Result<Vec<String>> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(workers.max(1))
        .enable_all()
        .build()?;

    let failures = runtime.block_on(async {
        let probes = connections.iter().map(|(endpoint, connection)| {
            let client = connection.client.clone();
            let endpoint = endpoint.clone();
            async move {
                client
                    .get_file_status("/")
                    .await
                    .err()
                    .map(|error| format!("{}.{endpoint}: {error}", hdfs_ha::NAME))
            }
        });
        futures::future::join_all(probes).await
    });

    Ok(failures.into_iter().flatten().collect())
}

struct Formatter {
    color: bool,
}

impl Formatter {
    const fn new(color: bool) -> Self {
        Self { color }
    }

    fn success(&mut self, message: impl AsRef<str>) {
        let mark = if self.color {
            "√".green().to_string()
        } else {
            "√".to_owned()
        };
        Self::print(mark, message.as_ref());
    }

    fn error(&mut self, message: impl AsRef<str>) {
        let mark = if self.color {
            "x".red().to_string()
        } else {
            "x".to_owned()
        };
        Self::print(mark, message.as_ref());
    }

    #[allow(clippy::print_stdout)]
    fn print(mark: String, message: &str) {
        println!("{mark} {message}");
    }

    #[allow(clippy::print_stdout)]
    fn print_raw(output: &str) {
        println!("{output}");
    }
}
