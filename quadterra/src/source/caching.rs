//! Read-through cache in front of a source.

use std::sync::Arc;

use image::RgbaImage;

use super::{HeightField, TileSource};
use crate::key::TileKey;
use crate::log::Logger;
use crate::log_trace;
use crate::store::{FragmentKind, SourceId, TileFragment, TileStore};

/// Decorator that consults a [`TileStore`] before asking the inner
/// source, and persists whatever the inner source produces.
///
/// Store failures never reach the caller: a failed read falls through to
/// the inner source and a failed write is dropped (the store reports it).
pub struct CachingSource {
    inner: Arc<dyn TileSource>,
    store: Arc<dyn TileStore>,
    image_id: SourceId,
    heightfield_id: SourceId,
    logger: Arc<dyn Logger>,
}

impl CachingSource {
    pub fn new(
        inner: Arc<dyn TileSource>,
        store: Arc<dyn TileStore>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        let image_id = SourceId::of(inner.as_ref(), FragmentKind::Image);
        let heightfield_id = SourceId::of(inner.as_ref(), FragmentKind::HeightField);
        Self {
            inner,
            store,
            image_id,
            heightfield_id,
            logger,
        }
    }

    pub fn store(&self) -> &Arc<dyn TileStore> {
        &self.store
    }

    fn persist(&self, key: &TileKey, id: &SourceId, fragment: &TileFragment) {
        if self.store.put(key, id, fragment).is_err() {
            log_trace!(self.logger, "[{}] continuing without caching {}", id, key);
        }
    }
}

impl TileSource for CachingSource {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn extension(&self) -> Option<&str> {
        self.inner.extension()
    }

    fn min_level(&self) -> u32 {
        self.inner.min_level()
    }

    fn max_level(&self) -> u32 {
        self.inner.max_level()
    }

    fn create_image(&self, key: &TileKey) -> Option<RgbaImage> {
        if let Some(image) = self
            .store
            .get(key, &self.image_id)
            .and_then(TileFragment::into_image)
        {
            return Some(image);
        }
        let image = self.inner.create_image(key)?;
        let fragment = TileFragment::Image(image);
        self.persist(key, &self.image_id, &fragment);
        fragment.into_image()
    }

    fn create_heightfield(&self, key: &TileKey) -> Option<HeightField> {
        if let Some(hf) = self
            .store
            .get(key, &self.heightfield_id)
            .and_then(TileFragment::into_heightfield)
        {
            return Some(hf);
        }
        let hf = self.inner.create_heightfield(key)?;
        let fragment = TileFragment::HeightField(hf);
        self.persist(key, &self.heightfield_id, &fragment);
        fragment.into_heightfield()
    }
}
