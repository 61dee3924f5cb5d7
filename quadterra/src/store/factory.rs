//! Store construction from configuration.

use std::sync::Arc;

use super::config::StoreConfig;
use super::{DiskTileStore, NoOpStore, TileStore};
use crate::log::Logger;
use crate::{log_info, log_warn};

/// Build the store described by `config`.
///
/// A persistent kind without a `path` is reported at warn level and
/// yields a [`NoOpStore`]; a misconfigured cache never fails the build.
pub fn create_store(config: &StoreConfig, logger: Arc<dyn Logger>) -> Arc<dyn TileStore> {
    let Some(scheme) = config.kind.scheme() else {
        log_info!(logger, "Tile cache disabled");
        return Arc::new(NoOpStore);
    };

    let Some(path) = config.path.clone() else {
        log_warn!(
            logger,
            "No path specified for {} cache; caching disabled",
            scheme.name()
        );
        return Arc::new(NoOpStore);
    };

    let store = DiskTileStore::new(path, scheme, config.format.clone(), logger.clone());
    log_info!(logger, "Using {}", store.describe());
    Arc::new(store)
}
