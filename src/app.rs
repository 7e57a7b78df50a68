use crate::{
    cli::{LogFormat, Opts, SubCommand},
    describe, generate, trace, validate,
};

/// Parses the command line, sets up logging, and runs the requested command.
pub fn run() -> exitcode::ExitCode {
    let opts = match Opts::get_matches() {
        Ok(opts) => opts,
        Err(error) => {
            // clap prints help and version requests itself, through the same path as usage errors.
            let _ = error.print();
            return if error.use_stderr() {
                exitcode::USAGE
            } else {
                exitcode::OK
            };
        }
    };
    run_with_opts(opts)
}

pub fn run_with_opts(opts: Opts) -> exitcode::ExitCode {
    let level = std::env::var("LOG").unwrap_or_else(|_| trace::level_directives(opts.log_level()));

    let color = opts.root.color.use_color();
    let json = match opts.root.log_format {
        LogFormat::Text => false,
        LogFormat::Json => true,
    };

    trace::init(color, json, &level);
    debug!(message = "Log level is enabled.", level = ?level);

    match &opts.sub_command {
        SubCommand::Validate(v) => validate::validate(v, color),
        SubCommand::Describe(d) => describe::cmd(d),
        SubCommand::Generate(g) => generate::cmd(g),
    }
}
