use clap::Parser;
use std::io::{self, IsTerminal};
use tracker_dash::cli::commands;
use tracker_dash::cli::{Cli, Commands};
use tracker_dash::logging::init_logging;
use tracker_dash::{DashError, StructuredError};

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose, cli.quiet, cli.log_file.as_deref()) {
        eprintln!("Failed to initialize logging: {e}");
    }

    let overrides = cli.overrides();

    let result = match &cli.command {
        Commands::Init { force } => commands::init::execute(*force, None),
        Commands::Issues(args) => commands::issues::execute(args, cli.json, &overrides),
        Commands::Stats(args) => commands::stats::execute(args, cli.json, &overrides),
        Commands::Timeline(args) => commands::timeline::execute(args, cli.json, &overrides),
        Commands::Options(args) => commands::options::execute(args, cli.json, &overrides),
        Commands::Sync(args) => commands::sync::execute(args, cli.json, &overrides),
        Commands::Projects(args) => commands::projects::execute(args, cli.json, &overrides),
        Commands::Versions(args) => commands::versions::execute(args, cli.json, &overrides),
        Commands::Config => commands::config::execute(cli.json, &overrides),
    };

    if let Err(e) = result {
        handle_error(&e, cli.json);
    }
}

/// Print the error and exit with its category code.
///
/// JSON goes to stderr when --json is set or stdout is not a TTY.
fn handle_error(err: &DashError, json_mode: bool) -> ! {
    let structured = StructuredError::from_error(err);
    let exit_code = structured.code.exit_code();

    if json_mode || !io::stdout().is_terminal() {
        let json = structured.to_json();
        eprintln!(
            "{}",
            serde_json::to_string_pretty(&json).unwrap_or_else(|_| json.to_string())
        );
    } else {
        eprintln!("{}", structured.to_human(io::stderr().is_terminal()));
    }

    std::process::exit(exit_code);
}
