//! Host-wide operational settings: logging and worker count.

use std::{fmt, path::PathBuf, str::FromStr, time::Duration};

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use terafoundation_config::{
    ConfigError, FormatRule, Kind, OptionDescriptor, Schema, ValidatedConfig, as_numeric,
};
use tracing::level_filters::LevelFilter;

/// Name of the host document section validated by the system schema.
pub const SYSTEM_SECTION: &str = "terafoundation";

/// Environment value that additionally enables logging to file.
const PRODUCTION: &str = "production";

/// A destination log records can be written to.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoggingSink {
    Console,
    File,
    Elasticsearch,
}

impl LoggingSink {
    pub const ALL: [LoggingSink; 3] = [
        LoggingSink::Console,
        LoggingSink::File,
        LoggingSink::Elasticsearch,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            LoggingSink::Console => "console",
            LoggingSink::File => "file",
            LoggingSink::Elasticsearch => "elasticsearch",
        }
    }
}

impl FromStr for LoggingSink {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LoggingSink::ALL
            .into_iter()
            .find(|sink| sink.as_str() == s)
            .ok_or_else(|| format!("invalid logging sink: {s}"))
    }
}

impl fmt::Display for LoggingSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log severity, from the most to the least verbose.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

impl Severity {
    pub const ALL: [Severity; 6] = [
        Severity::Trace,
        Severity::Debug,
        Severity::Info,
        Severity::Warn,
        Severity::Error,
        Severity::Fatal,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Severity::Trace => "trace",
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warn => "warn",
            Severity::Error => "error",
            Severity::Fatal => "fatal",
        }
    }

    /// The most verbose `tracing` level this severity lets through.
    ///
    /// `tracing` has no level above `ERROR`, so `fatal` shares it.
    pub const fn level_filter(self) -> LevelFilter {
        match self {
            Severity::Trace => LevelFilter::TRACE,
            Severity::Debug => LevelFilter::DEBUG,
            Severity::Info => LevelFilter::INFO,
            Severity::Warn => LevelFilter::WARN,
            Severity::Error | Severity::Fatal => LevelFilter::ERROR,
        }
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Severity::ALL
            .into_iter()
            .find(|severity| severity.as_str() == s)
            .ok_or_else(|| format!("invalid log level: {s}"))
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The configured log level: either one severity for every sink, or a severity per sink.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LogLevel {
    Scalar(Severity),
    PerSink(IndexMap<LoggingSink, Severity>),
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Scalar(Severity::Info)
    }
}

impl LogLevel {
    /// Parses a log level from its configuration shape.
    ///
    /// Accepts a severity string, or an array of single-key `{sink: severity}` objects such as
    /// `[{"console": "warn"}, {"file": "info"}]`. Every malformed array entry is reported in one
    /// error.
    pub fn parse(value: &Value) -> Result<Self, String> {
        match value {
            Value::String(level) => level
                .parse()
                .map(LogLevel::Scalar)
                .map_err(|_| format!("string log level is not an accepted value: {level}")),
            Value::Array(entries) => {
                let mut levels = IndexMap::new();
                let mut offending = Vec::new();

                for entry in entries {
                    match per_sink_entry(entry) {
                        Some((sink, severity)) => {
                            levels.insert(sink, severity);
                        }
                        None => offending.push(entry.to_string()),
                    }
                }

                if offending.is_empty() {
                    Ok(LogLevel::PerSink(levels))
                } else {
                    Err(format!(
                        "array log level entries are not configured correctly: {}",
                        offending.join(", ")
                    ))
                }
            }
            other => Err(format!(
                "must be either a string or an array, found {}",
                Kind::name_of(other)
            )),
        }
    }

    /// Gets the severity that applies to `sink`. Sinks missing from a per-sink list log at `info`.
    pub fn for_sink(&self, sink: LoggingSink) -> Severity {
        match self {
            LogLevel::Scalar(severity) => *severity,
            LogLevel::PerSink(levels) => levels.get(&sink).copied().unwrap_or(Severity::Info),
        }
    }
}

fn per_sink_entry(entry: &Value) -> Option<(LoggingSink, Severity)> {
    let entry = entry.as_object()?;
    if entry.len() != 1 {
        return None;
    }

    let (sink, severity) = entry.iter().next()?;
    Some((sink.parse().ok()?, severity.as_str()?.parse().ok()?))
}

/// How frequently log indices are rolled over.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Timeseries {
    Daily,
    Monthly,
    Yearly,
}

impl Timeseries {
    pub const ALL: [Timeseries; 3] = [Timeseries::Daily, Timeseries::Monthly, Timeseries::Yearly];

    pub const fn as_str(self) -> &'static str {
        match self {
            Timeseries::Daily => "daily",
            Timeseries::Monthly => "monthly",
            Timeseries::Yearly => "yearly",
        }
    }
}

impl FromStr for Timeseries {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Timeseries::ALL
            .into_iter()
            .find(|timeseries| timeseries.as_str() == s)
            .ok_or_else(|| format!("invalid timeseries: {s}"))
    }
}

fn validate_logging(value: &Value) -> Result<(), String> {
    let sinks = value
        .as_array()
        .ok_or_else(|| format!("must be an array, found {}", Kind::name_of(value)))?;

    sinks.iter().try_for_each(|sink| match sink.as_str() {
        Some(name) => name.parse::<LoggingSink>().map(drop),
        None => Err(format!("invalid logging sink: {sink}")),
    })
}

fn validate_log_level(value: &Value) -> Result<(), String> {
    LogLevel::parse(value).map(drop)
}

// The buffer has to hold every record emitted before a downstream sink is attached.
fn validate_log_buffer_limit(value: &Value) -> Result<(), String> {
    number_above(value, 10.0)
}

fn validate_log_buffer_interval(value: &Value) -> Result<(), String> {
    number_above(value, 1000.0)
}

fn number_above(value: &Value, floor: f64) -> Result<(), String> {
    match as_numeric(value) {
        None => Err(format!("must be a number, found {value}")),
        Some(number) if number <= floor => Err(format!("must be greater than {floor}")),
        Some(_) => Ok(()),
    }
}

fn current_dir() -> String {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .display()
        .to_string()
}

/// Gets the schema of the host-wide settings.
pub fn config_schema() -> Schema {
    Schema::builder(SYSTEM_SECTION)
        .option(
            OptionDescriptor::new(
                "environment",
                "Set for legacy purposes. When set to `production`, logs are also written to file.",
            )
            .with_default("development"),
        )
        .option(
            OptionDescriptor::new(
                "log_path",
                "Directory where the logs are stored when logging to file.",
            )
            .with_default(current_dir())
            .with_format(FormatRule::Kind(Kind::String)),
        )
        .option(
            OptionDescriptor::new("logging", "The logging sinks to write to.")
                .with_default(vec!["console"])
                .with_format(FormatRule::Custom(validate_logging)),
        )
        .option(
            OptionDescriptor::new(
                "log_level",
                "Log level for every sink, or a list of `{sink: level}` objects to set it per sink.",
            )
            .with_default("info")
            .with_format(FormatRule::Custom(validate_log_level)),
        )
        .option(
            OptionDescriptor::new(
                "log_buffer_limit",
                "Number of log records buffered before they are sent. Only used by the `elasticsearch` sink.",
            )
            .with_default(30)
            .with_format(FormatRule::Custom(validate_log_buffer_limit)),
        )
        .option(
            OptionDescriptor::new(
                "log_buffer_interval",
                "Interval, in milliseconds, at which the log buffer is flushed.",
            )
            .with_default(60_000)
            .with_format(FormatRule::Custom(validate_log_buffer_interval)),
        )
        .option(
            OptionDescriptor::new("log_timeseries", "How frequently log indices are created.")
                .with_default("monthly")
                .with_format(FormatRule::one_of(
                    Timeseries::ALL.map(Timeseries::as_str),
                )),
        )
        .option(
            OptionDescriptor::new("workers", "Number of workers per server.")
                .with_default(num_cpus::get()),
        )
        .build()
}

/// Typed view of a validated system configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct SystemConfig {
    pub environment: String,
    pub log_path: PathBuf,
    pub logging: Vec<LoggingSink>,
    pub log_level: LogLevel,
    pub log_buffer_limit: usize,
    pub log_buffer_interval: Duration,
    pub log_timeseries: Timeseries,
    pub workers: usize,
}

impl SystemConfig {
    /// The sinks logs are written to, including the file sink implied by a production environment.
    pub fn sinks(&self) -> Vec<LoggingSink> {
        let mut sinks = self.logging.clone();
        if self.environment == PRODUCTION && !sinks.contains(&LoggingSink::File) {
            sinks.push(LoggingSink::File);
        }
        sinks
    }

    /// The `tracing` filter for the console sink, or `OFF` when console logging is disabled.
    pub fn console_filter(&self) -> LevelFilter {
        if self.logging.contains(&LoggingSink::Console) {
            self.log_level.for_sink(LoggingSink::Console).level_filter()
        } else {
            LevelFilter::OFF
        }
    }
}

impl TryFrom<&ValidatedConfig> for SystemConfig {
    type Error = ConfigError;

    fn try_from(config: &ValidatedConfig) -> Result<Self, Self::Error> {
        let environment = match option(config, "environment")? {
            Value::String(environment) => environment.clone(),
            other => other.to_string(),
        };

        let log_path = config
            .get_str("log_path")
            .map(PathBuf::from)
            .ok_or_else(|| ConfigError::new("log_path", "must be a string"))?;

        let logging = option(config, "logging")?
            .as_array()
            .into_iter()
            .flatten()
            .map(|sink| {
                sink.as_str()
                    .unwrap_or_default()
                    .parse()
                    .map_err(|reason| ConfigError::new("logging", reason))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let log_level = LogLevel::parse(option(config, "log_level")?)
            .map_err(|reason| ConfigError::new("log_level", reason))?;

        let log_timeseries = config
            .get_str("log_timeseries")
            .unwrap_or_default()
            .parse()
            .map_err(|reason| ConfigError::new("log_timeseries", reason))?;

        Ok(Self {
            environment,
            log_path,
            logging,
            log_level,
            log_buffer_limit: count(config, "log_buffer_limit")?,
            log_buffer_interval: Duration::from_millis(count(config, "log_buffer_interval")? as u64),
            log_timeseries,
            workers: workers(config),
        })
    }
}

fn option<'a>(config: &'a ValidatedConfig, key: &str) -> Result<&'a Value, ConfigError> {
    config
        .get(key)
        .ok_or_else(|| ConfigError::new(key, "required option is missing"))
}

fn count(config: &ValidatedConfig, key: &str) -> Result<usize, ConfigError> {
    match config.get_numeric(key) {
        Some(number) if number >= 0.0 => Ok(number as usize),
        _ => Err(ConfigError::new(key, "must be a non-negative number")),
    }
}

/// The `workers` option is not validated: anything but a whole non-negative number falls back to
/// one worker per CPU.
fn workers(config: &ValidatedConfig) -> usize {
    match config.get_numeric("workers") {
        Some(number) if number >= 0.0 && number.fract() == 0.0 => number as usize,
        _ => num_cpus::get(),
    }
}
