//! Quadterra CLI - Command-line interface
//!
//! This binary provides a command-line interface to the Quadterra library:
//! inspect keys and cache paths, build pyramids and seed the tile store.

mod commands;
mod error;
mod runner;

use clap::{Parser, Subcommand};

use commands::build::BuildArgs;
use commands::common::GlobalArgs;
use commands::key::KeyArgs;
use commands::path::PathArgs;
use commands::seed::SeedArgs;

#[derive(Parser)]
#[command(name = "quadterra", version)]
#[command(about = "Build and seed quadtree terrain tile pyramids", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Describe a tile key (level, position, extents, children)
    Key(KeyArgs),
    /// Show where a key is cached under each addressing scheme
    Path(PathArgs),
    /// Build the pyramid down to a level and print per-level counts
    Build(BuildArgs),
    /// Assemble every tile down to a level in parallel, filling the cache
    Seed(SeedArgs),
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Key(args) => commands::key::run(args, &cli.global),
        Commands::Path(args) => commands::path::run(args, &cli.global),
        Commands::Build(args) => commands::build::run(args, &cli.global),
        Commands::Seed(args) => commands::seed::run(args, &cli.global),
    };

    if let Err(e) = result {
        e.exit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_options_after_subcommand() {
        let cli = Cli::try_parse_from([
            "quadterra",
            "build",
            "--max-level",
            "5",
            "--config",
            "/tmp/q.ini",
            "--quiet",
        ])
        .unwrap();
        assert_eq!(cli.global.config.as_deref(), Some(std::path::Path::new("/tmp/q.ini")));
        assert!(cli.global.quiet);
        match cli.command {
            Commands::Build(args) => assert_eq!(args.max_level, 5),
            _ => panic!("expected build"),
        }
    }

    #[test]
    fn test_seed_requires_max_level() {
        assert!(Cli::try_parse_from(["quadterra", "seed"]).is_err());
    }
}
