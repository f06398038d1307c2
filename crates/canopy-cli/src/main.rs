//! canopy CLI — extract, resolve, and query polyglot source repositories.

use clap::Parser;

mod cli_args;
mod commands;

use cli_args::{Cli, Commands};

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let exit_code = match cli.command {
        Commands::Index {
            path,
            force,
            languages,
            scripts_dir,
            format,
        } => commands::index::run(path, force, languages, scripts_dir, cli.db, format),
        Commands::Query { query, list, format } => commands::query::run(query, list, format, cli.db),
    };

    std::process::exit(exit_code);
}
