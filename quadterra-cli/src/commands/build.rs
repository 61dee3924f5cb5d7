//! `build`: build the pyramid to a given depth and summarise it.

use std::collections::BTreeMap;
use std::time::Instant;

use clap::Args;
use quadterra::builder::{QuadtreeBuilder, TileTree};
use tracing::info;

use super::common::GlobalArgs;
use crate::error::CliError;
use crate::runner::CliRunner;

#[derive(Debug, Args)]
pub struct BuildArgs {
    /// Deepest level to subdivide to
    #[arg(long, default_value = "3")]
    pub max_level: u32,
}

/// Node and leaf counts for one level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LevelSummary {
    pub nodes: usize,
    pub leaves: usize,
}

pub fn run(args: BuildArgs, global: &GlobalArgs) -> Result<(), CliError> {
    let runner = CliRunner::new(global)?;
    runner.log_startup("build");
    let pipeline = runner.pipeline()?;

    let mut builder = QuadtreeBuilder::new(pipeline.assembler);
    if let Some(srs) = &runner.config().profile.srs {
        builder = builder.with_srs(srs.clone());
    }

    let start = Instant::now();
    let tree = builder.build(args.max_level);
    let elapsed = start.elapsed();
    if tree.is_empty() {
        return Err(CliError::NothingBuilt);
    }
    info!(nodes = tree.len(), elapsed_ms = elapsed.as_millis() as u64, "Build finished");

    println!("Profile:            {}", builder.profile());
    println!("Coordinate system:  {}", builder.coordinate_system());
    println!("Store:              {}", pipeline.store.describe());
    println!();
    println!("Level  Nodes  Leaves");
    for (level, summary) in summarize(&tree) {
        println!("{:>5}  {:>5}  {:>6}", level, summary.nodes, summary.leaves);
    }
    println!();
    println!(
        "Built {} tile(s) in {:.2}s",
        tree.len(),
        elapsed.as_secs_f64()
    );

    let stats = pipeline.store.stats();
    println!(
        "Cache: {} hit(s), {} miss(es), {} write(s), {} failed write(s)",
        stats.hits, stats.misses, stats.writes, stats.write_failures
    );
    Ok(())
}

/// Per-level node and leaf counts.
pub fn summarize(tree: &TileTree) -> BTreeMap<u32, LevelSummary> {
    let mut levels: BTreeMap<u32, LevelSummary> = BTreeMap::new();
    for (_, node) in tree.iter() {
        let entry = levels.entry(node.key.level()).or_default();
        entry.nodes += 1;
        if node.is_leaf() {
            entry.leaves += 1;
        }
    }
    levels
}
