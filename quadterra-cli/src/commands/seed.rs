//! `seed`: fill the tile store ahead of time.

use std::io::Write;
use std::time::Instant;

use clap::Args;
use quadterra::seed::{seed_levels_with_progress, SeedProgressCallback};

use super::common::GlobalArgs;
use crate::error::CliError;
use crate::runner::CliRunner;

#[derive(Debug, Args)]
pub struct SeedArgs {
    /// First level to report
    #[arg(long, default_value = "0")]
    pub min_level: u32,

    /// Deepest level to seed
    #[arg(long)]
    pub max_level: u32,
}

pub fn run(args: SeedArgs, global: &GlobalArgs) -> Result<(), CliError> {
    if args.min_level > args.max_level {
        return Err(CliError::Usage(format!(
            "--min-level ({}) must not exceed --max-level ({})",
            args.min_level, args.max_level
        )));
    }

    let runner = CliRunner::new(global)?;
    runner.log_startup("seed");
    let pipeline = runner.pipeline()?;
    println!("Seeding {}", pipeline.store.describe());

    let quiet = global.quiet;
    let progress: SeedProgressCallback = Box::new(move |p| {
        if !quiet && p.completed == p.total {
            print!("\r  level {:>2}: {} tile(s) assembled", p.level, p.total);
            let _ = std::io::stdout().flush();
        }
    });

    let roots = pipeline.assembler.profile().root_keys();
    let start = Instant::now();
    let report = seed_levels_with_progress(
        &pipeline.assembler,
        &roots,
        args.min_level,
        args.max_level,
        Some(&progress),
    );
    if !quiet {
        println!();
    }

    println!();
    println!("Level  Attempted  Built  Pruned");
    for level in &report.levels {
        println!(
            "{:>5}  {:>9}  {:>5}  {:>6}",
            level.level, level.attempted, level.built, level.pruned
        );
    }
    println!();
    println!(
        "Seeded {} tile(s) in {:.2}s",
        report.total_built(),
        start.elapsed().as_secs_f64()
    );

    let stats = pipeline.store.stats();
    println!(
        "Cache: {} write(s), {} failed write(s), {} hit(s), hit rate {:.1}%",
        stats.writes,
        stats.write_failures,
        stats.hits,
        stats.hit_rate() * 100.0
    );
    Ok(())
}
