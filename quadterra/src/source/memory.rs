//! In-memory source.

use std::collections::HashMap;
use std::sync::Mutex;

use image::{Rgba, RgbaImage};

use super::{HeightField, TileSource};
use crate::key::{Extent, TileKey, MAX_LEVEL};

/// Source answering from explicit per-key content, optionally backed by a
/// uniform fill over a coverage area.
///
/// Every `create_*` call is recorded so callers can verify which keys a
/// source was actually asked for.
///
/// ```
/// use image::Rgba;
/// use quadterra::key::Profile;
/// use quadterra::source::{MemorySource, TileSource};
///
/// let source = MemorySource::new("blue").with_uniform_image(Rgba([0, 0, 255, 255]), 16);
/// let root = Profile::Mercator.root_keys()[0];
/// assert!(source.create_image(&root).is_some());
/// assert_eq!(source.requests(), vec![root]);
/// ```
pub struct MemorySource {
    name: String,
    extension: Option<String>,
    min_level: u32,
    max_level: u32,
    images: HashMap<TileKey, RgbaImage>,
    heightfields: HashMap<TileKey, HeightField>,
    fill_image: Option<(Rgba<u8>, u32)>,
    fill_heightfield: Option<HeightField>,
    coverage: Option<Extent>,
    requests: Mutex<Vec<TileKey>>,
}

impl MemorySource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extension: None,
            min_level: 0,
            max_level: MAX_LEVEL,
            images: HashMap::new(),
            heightfields: HashMap::new(),
            fill_image: None,
            fill_heightfield: None,
            coverage: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = Some(extension.into());
        self
    }

    pub fn with_levels(mut self, min_level: u32, max_level: u32) -> Self {
        self.min_level = min_level;
        self.max_level = max_level;
        self
    }

    pub fn with_image(mut self, key: TileKey, image: RgbaImage) -> Self {
        self.images.insert(key, image);
        self
    }

    pub fn with_heightfield(mut self, key: TileKey, heightfield: HeightField) -> Self {
        self.heightfields.insert(key, heightfield);
        self
    }

    /// Answer every covered key with a `size x size` image of `color`.
    pub fn with_uniform_image(mut self, color: Rgba<u8>, size: u32) -> Self {
        self.fill_image = Some((color, size));
        self
    }

    /// Answer every covered key with a copy of `heightfield`.
    pub fn with_uniform_heightfield(mut self, heightfield: HeightField) -> Self {
        self.fill_heightfield = Some(heightfield);
        self
    }

    /// Restrict the uniform fill to keys whose geographic extent
    /// overlaps `coverage`. Explicit per-key content is unaffected.
    pub fn with_coverage(mut self, coverage: Extent) -> Self {
        self.coverage = Some(coverage);
        self
    }

    /// Keys requested so far, in call order.
    pub fn requests(&self) -> Vec<TileKey> {
        match self.requests.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Levels requested so far, in call order.
    pub fn requested_levels(&self) -> Vec<u32> {
        self.requests().iter().map(TileKey::level).collect()
    }

    fn record(&self, key: &TileKey) {
        match self.requests.lock() {
            Ok(mut guard) => guard.push(*key),
            Err(poisoned) => poisoned.into_inner().push(*key),
        }
    }

    fn covers(&self, key: &TileKey) -> bool {
        match self.coverage {
            None => key.geo_extents().is_ok(),
            Some(coverage) => key
                .geo_extents()
                .map(|extent| extent.intersects(&coverage))
                .unwrap_or(false),
        }
    }
}

impl TileSource for MemorySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn extension(&self) -> Option<&str> {
        self.extension.as_deref()
    }

    fn min_level(&self) -> u32 {
        self.min_level
    }

    fn max_level(&self) -> u32 {
        self.max_level
    }

    fn create_image(&self, key: &TileKey) -> Option<RgbaImage> {
        self.record(key);
        if let Some(image) = self.images.get(key) {
            return Some(image.clone());
        }
        let (color, size) = self.fill_image?;
        self.covers(key)
            .then(|| RgbaImage::from_pixel(size, size, color))
    }

    fn create_heightfield(&self, key: &TileKey) -> Option<HeightField> {
        self.record(key);
        if let Some(hf) = self.heightfields.get(key) {
            return Some(hf.clone());
        }
        let fill = self.fill_heightfield.as_ref()?;
        self.covers(key).then(|| fill.clone())
    }
}
