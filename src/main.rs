//! codemap CLI entry point.

use clap::Parser;
use codemap::cli::{self, Cli, Commands, EXIT_ERROR};

fn main() {
    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Apply(args) => cli::run_apply(args),
        Commands::Clean(args) => cli::run_clean(args),
        Commands::List(args) => cli::run_list(args),
        Commands::Stats(args) => cli::run_stats(args),
    };

    let exit_code = match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            EXIT_ERROR
        }
    };

    std::process::exit(exit_code);
}
