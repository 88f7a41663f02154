use std::io::IsTerminal;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use sonar::cli::{self, Cli, Commands};
use sonar::project::{CommandLog, ProjectLayout};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("sonar=debug,info")
    } else {
        EnvFilter::new("sonar=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .without_time()
        .init();

    let command_log = ProjectLayout::from_current_dir()
        .ok()
        .and_then(|layout| CommandLog::open(&layout));
    if let Some(log) = &command_log {
        let argv: Vec<String> = std::env::args_os()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect();
        log.record_start(&argv);
    }

    let result = dispatch(cli);

    if let Some(log) = &command_log {
        let message = result.as_ref().err().map(|e| format!("{e:#}"));
        log.record_exit(message.as_deref());
    }

    result
}

fn dispatch(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::CheckFrameshift(args) => cli::frameshift::run(args, cli.format, cli.verbose),
        Commands::ListIds(args) => cli::list_ids::run(args, cli.format, cli.verbose),
        Commands::Dnaml(args) => cli::dnaml::run(args, cli.format, cli.verbose),
    }
}
