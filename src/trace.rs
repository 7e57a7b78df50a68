use tracing_subscriber::{EnvFilter, fmt};

/// Installs the global subscriber.
///
/// `levels` uses the `EnvFilter` directive syntax, e.g. `terafoundation=debug,warn`. Records are
/// written to stderr so command output on stdout stays machine readable.
pub fn init(color: bool, json: bool, levels: &str) {
    let filter = EnvFilter::try_new(levels).unwrap_or_else(|_| EnvFilter::new("info"));

    // Ignore errors when setting, since tests can initialize this multiple times.
    let _ = if json {
        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .flatten_event(true)
            .try_init()
    } else {
        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_ansi(color)
            .try_init()
    };
}

/// Builds the filter directives for a log level, scoped to this crate and its libraries.
pub fn level_directives(level: &str) -> String {
    match level {
        "off" => "off".to_owned(),
        level => [
            format!("terafoundation={level}"),
            format!("terafoundation_config={level}"),
            "reqwest=warn".to_owned(),
        ]
        .join(","),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directives_are_scoped() {
        assert_eq!(level_directives("off"), "off");
        assert_eq!(
            level_directives("debug"),
            "terafoundation=debug,terafoundation_config=debug,reqwest=warn"
        );
        assert!(EnvFilter::try_new(level_directives("trace")).is_ok());
    }
}
