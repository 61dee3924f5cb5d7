//! Parallel cache seeding.
//!
//! Walks the pyramid breadth-first, assembling every key of a level in
//! parallel with rayon. Sources wrapped in a
//! [`CachingSource`](crate::source::CachingSource) persist what they
//! produce, so a seeded store serves later builds without touching the
//! original sources.
//!
//! Subdivision follows the builder's rule: a parent's children only go
//! on to the next level if all of them assembled.

use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;

use crate::assembler::QuadrantAssembler;
use crate::key::TileKey;
use crate::log::Logger;
use crate::{log_debug, log_info};

/// Outcome for one level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelReport {
    pub level: u32,
    /// Keys assembled at this level.
    pub attempted: usize,
    /// Keys kept in the pyramid.
    pub built: usize,
    /// Keys dropped because they, or a sibling, had no data.
    pub pruned: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub levels: Vec<LevelReport>,
}

impl SeedReport {
    pub fn level(&self, level: u32) -> Option<&LevelReport> {
        self.levels.iter().find(|report| report.level == level)
    }

    pub fn total_built(&self) -> usize {
        self.levels.iter().map(|report| report.built).sum()
    }

    pub fn total_attempted(&self) -> usize {
        self.levels.iter().map(|report| report.attempted).sum()
    }
}

/// Progress of the level currently being seeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedProgress {
    pub level: u32,
    pub completed: usize,
    pub total: usize,
}

/// Called from worker threads as keys finish.
pub type SeedProgressCallback = Box<dyn Fn(SeedProgress) + Send + Sync>;

/// Seed from `roots` down to `max_level`, reporting levels from
/// `min_level` on.
///
/// Levels shallower than `min_level` are still assembled, since they
/// decide where the pyramid exists.
pub fn seed_levels(
    assembler: &QuadrantAssembler,
    roots: &[TileKey],
    min_level: u32,
    max_level: u32,
) -> SeedReport {
    seed_levels_with_progress(assembler, roots, min_level, max_level, None)
}

pub fn seed_levels_with_progress(
    assembler: &QuadrantAssembler,
    roots: &[TileKey],
    min_level: u32,
    max_level: u32,
    progress: Option<&SeedProgressCallback>,
) -> SeedReport {
    let logger = assembler.logger();
    let mut report = SeedReport::default();

    // Roots stand alone; deeper keys travel in sibling groups.
    let mut frontier: Vec<Vec<TileKey>> = roots.iter().map(|key| vec![*key]).collect();

    while let Some(level) = frontier.iter().flatten().map(TileKey::level).next() {
        if level > max_level {
            break;
        }
        let keys: Vec<TileKey> = frontier.iter().flatten().copied().collect();
        let total = keys.len();
        let completed = AtomicUsize::new(0);

        let assembled: Vec<bool> = keys
            .par_iter()
            .map(|key| {
                let ok = assembler.assemble(key).is_some();
                let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                if let Some(cb) = progress {
                    cb(SeedProgress {
                        level,
                        completed: done,
                        total,
                    });
                }
                ok
            })
            .collect();

        let mut level_report = LevelReport {
            level,
            attempted: total,
            built: 0,
            pruned: 0,
        };
        let mut survivors = Vec::new();
        let mut offset = 0;
        for group in &frontier {
            let results = &assembled[offset..offset + group.len()];
            offset += group.len();
            if results.iter().all(|ok| *ok) {
                level_report.built += group.len();
                survivors.extend(group.iter().copied());
            } else {
                level_report.pruned += group.len();
            }
        }

        if level >= min_level {
            log_info!(
                logger,
                "Seeded level {}: {} built, {} pruned",
                level,
                level_report.built,
                level_report.pruned
            );
            report.levels.push(level_report);
        } else {
            log_debug!(logger, "Walked level {}: {} tile(s) kept", level, level_report.built);
        }

        frontier = survivors
            .iter()
            .filter_map(|key| {
                let count = key.profile().quadrant_count(key.level());
                (0..count as u8)
                    .map(|quadrant| key.subkey(quadrant))
                    .collect::<Result<Vec<_>, _>>()
                    .ok()
            })
            .collect();
    }

    report
}
