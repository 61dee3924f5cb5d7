//! CLI runner for common setup and operations.
//!
//! Encapsulates logging initialization, configuration loading and the
//! wiring of sources, store and assembler shared by `build` and `seed`.

use std::sync::Arc;

use image::Rgba;
use quadterra::assembler::QuadrantAssembler;
use quadterra::config::ConfigFile;
use quadterra::key::{Extent, Profile};
use quadterra::log::{Logger, TracingLogger};
use quadterra::logging::{default_log_dir, default_log_file, init_logging, LoggingGuard};
use quadterra::source::{CachingSource, MemorySource, TileSource};
use quadterra::store::{create_store, TileStore};
use tracing::{info, warn};

use crate::commands::common::{load_config, GlobalArgs};
use crate::error::CliError;

/// Area covered by the built-in demo imagery.
const DEMO_COVERAGE: Extent = Extent::new(-60.0, -45.0, 60.0, 60.0);
const DEMO_MAX_LEVEL: u32 = 8;

/// Everything a command needs to assemble tiles.
pub struct Pipeline {
    pub assembler: Arc<QuadrantAssembler>,
    pub store: Arc<dyn TileStore>,
}

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    config: ConfigFile,
    logger: Arc<dyn Logger>,
}

impl CliRunner {
    /// Load the configuration and initialise logging.
    pub fn new(global: &GlobalArgs) -> Result<Self, CliError> {
        let config = load_config(global)?;

        let log_dir = global.log_dir.clone().unwrap_or_else(default_log_dir);
        let logging_guard = init_logging(&log_dir, default_log_file(), !global.quiet)
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Ok(Self {
            logging_guard,
            config,
            logger: Arc::new(TracingLogger),
        })
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("Quadterra v{}", quadterra::VERSION);
        info!("Quadterra CLI: {} command", command);
    }

    /// Open the configured sources behind the configured store.
    ///
    /// Without any configured source the built-in demo imagery is used so
    /// the commands can be tried out on an empty configuration.
    pub fn pipeline(&self) -> Result<Pipeline, CliError> {
        let profile = self.config.profile.to_profile()?;
        let store = create_store(&self.config.cache, Arc::clone(&self.logger));
        let mut assembler =
            QuadrantAssembler::new(profile, self.config.terrain.clone(), Arc::clone(&self.logger));

        if self.config.sources.is_empty() {
            warn!("No sources configured; using the built-in demo imagery");
            assembler = assembler.with_image_source(self.cached(demo_source(profile), &store));
        }

        for settings in self.config.image_sources() {
            let source = settings
                .open(Arc::clone(&self.logger))
                .map_err(|error| CliError::Source {
                    name: settings.name.clone(),
                    error,
                })?;
            info!(source = %settings.name, path = %settings.path.display(), "Image source");
            assembler = assembler.with_image_source(self.cached(Arc::new(source), &store));
        }

        for settings in self.config.elevation_sources() {
            let source = settings
                .open(Arc::clone(&self.logger))
                .map_err(|error| CliError::Source {
                    name: settings.name.clone(),
                    error,
                })?;
            info!(source = %settings.name, path = %settings.path.display(), "Elevation source");
            assembler = assembler.with_heightfield_source(self.cached(Arc::new(source), &store));
        }

        Ok(Pipeline {
            assembler: Arc::new(assembler),
            store,
        })
    }

    fn cached(&self, source: Arc<dyn TileSource>, store: &Arc<dyn TileStore>) -> Arc<dyn TileSource> {
        Arc::new(CachingSource::new(
            source,
            Arc::clone(store),
            Arc::clone(&self.logger),
        ))
    }
}

/// Uniform green imagery over a patch of the globe.
///
/// Projected profiles get full coverage since the patch is in degrees.
fn demo_source(profile: Profile) -> Arc<dyn TileSource> {
    let source = MemorySource::new("demo")
        .with_levels(0, DEMO_MAX_LEVEL)
        .with_uniform_image(Rgba([72, 128, 64, 255]), 64);
    if profile.is_geographic() {
        Arc::new(source.with_coverage(DEMO_COVERAGE))
    } else {
        Arc::new(source)
    }
}
