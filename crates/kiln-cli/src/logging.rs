//! Tracing subscriber initialisation.
//!
//! Only the CLI crate calls [`init_logging`]; `kiln-core` and
//! `kiln-adapters` only emit spans and events. Events go to stderr so stdout
//! stays clean for generated output and `--output-format json`.
//!
//! | Flag(s)   | Level |
//! |-----------|-------|
//! | (none)    | WARN  |
//! | `-v`      | INFO  |
//! | `-vv`     | DEBUG, with targets and source lines |
//! | `-vvv`    | TRACE, with targets and source lines |
//! | `--quiet` | ERROR |
//!
//! `RUST_LOG` overrides the level if set.

use std::io::IsTerminal as _;

use tracing_subscriber::{
    EnvFilter, filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::cli::GlobalArgs;

/// Crates whose events pass the default filter.
const KILN_TARGETS: [&str; 3] = ["kiln", "kiln_core", "kiln_adapters"];

/// Install the global subscriber. Fails if one is already registered.
pub fn init_logging(args: &GlobalArgs) -> anyhow::Result<()> {
    let level = level_for(args);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(level)));

    let diagnostic = level >= LevelFilter::DEBUG;
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(diagnostic)
        .with_file(diagnostic)
        .with_line_number(diagnostic)
        .with_ansi(!args.no_color && std::io::stderr().is_terminal())
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialise tracing: {e}"))
}

/// `kiln=<level>,kiln_core=<level>,...` so dependency crates stay quiet.
fn filter_directives(level: LevelFilter) -> String {
    let level = level.to_string().to_ascii_lowercase();
    KILN_TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

fn level_for(args: &GlobalArgs) -> LevelFilter {
    if args.quiet {
        return LevelFilter::ERROR;
    }
    match args.verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;

    fn args_with(verbose: u8, quiet: bool) -> GlobalArgs {
        GlobalArgs {
            verbose,
            quiet,
            no_color: true,
            config: None,
            output_format: OutputFormat::Auto,
        }
    }

    #[test]
    fn verbosity_counts_up_from_warn() {
        assert_eq!(level_for(&args_with(0, false)), LevelFilter::WARN);
        assert_eq!(level_for(&args_with(1, false)), LevelFilter::INFO);
        assert_eq!(level_for(&args_with(2, false)), LevelFilter::DEBUG);
        assert_eq!(level_for(&args_with(10, false)), LevelFilter::TRACE);
    }

    #[test]
    fn quiet_wins_over_verbose() {
        assert_eq!(level_for(&args_with(0, true)), LevelFilter::ERROR);
        assert_eq!(level_for(&args_with(3, true)), LevelFilter::ERROR);
    }

    #[test]
    fn directives_cover_every_crate() {
        assert_eq!(
            filter_directives(LevelFilter::DEBUG),
            "kiln=debug,kiln_core=debug,kiln_adapters=debug"
        );
    }
}
