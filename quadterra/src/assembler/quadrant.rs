//! Quadrant assembly.

use std::sync::Arc;

use super::lookup::{interpolate_heightfield, interpolate_image, request_direct, Lookup};
use super::payload::{ImageLayer, TilePayload};
use crate::config::TerrainSettings;
use crate::key::{Profile, TileKey};
use crate::log::Logger;
use crate::source::{HeightField, TileSource};
use crate::{log_debug, log_warn};

/// Composites the configured sources into a [`TilePayload`] per key.
///
/// Image sources contribute one layer each, in order. Elevation comes
/// from the first heightfield source only. Missing data is interpolated
/// from ancestor keys; when nothing is available the quadrant does not
/// exist and [`assemble`](Self::assemble) returns `None`.
pub struct QuadrantAssembler {
    profile: Profile,
    image_sources: Vec<Arc<dyn TileSource>>,
    heightfield_sources: Vec<Arc<dyn TileSource>>,
    settings: TerrainSettings,
    logger: Arc<dyn Logger>,
}

impl QuadrantAssembler {
    pub fn new(profile: Profile, settings: TerrainSettings, logger: Arc<dyn Logger>) -> Self {
        Self {
            profile,
            image_sources: Vec::new(),
            heightfield_sources: Vec::new(),
            settings,
            logger,
        }
    }

    pub fn with_image_source(mut self, source: Arc<dyn TileSource>) -> Self {
        self.image_sources.push(source);
        self
    }

    pub fn with_heightfield_source(mut self, source: Arc<dyn TileSource>) -> Self {
        self.heightfield_sources.push(source);
        self
    }

    pub fn profile(&self) -> Profile {
        self.profile
    }

    pub fn settings(&self) -> &TerrainSettings {
        &self.settings
    }

    pub fn logger(&self) -> &Arc<dyn Logger> {
        &self.logger
    }

    pub fn image_sources(&self) -> &[Arc<dyn TileSource>] {
        &self.image_sources
    }

    pub fn heightfield_sources(&self) -> &[Arc<dyn TileSource>] {
        &self.heightfield_sources
    }

    /// Assemble the payload for `key`, or `None` when the quadrant has no
    /// content (or cannot be placed in this profile).
    pub fn assemble(&self, key: &TileKey) -> Option<TilePayload> {
        if key.profile() != self.profile {
            log_warn!(
                self.logger,
                "Key {} does not belong to the {} profile",
                key,
                self.profile
            );
            return None;
        }
        if let Err(e) = key.geo_extents() {
            log_warn!(self.logger, "Cannot place {}: {}", key, e);
            return None;
        }

        // Direct requests first.
        let mut images: Vec<Option<(image::RgbaImage, TileKey)>> = self
            .image_sources
            .iter()
            .map(|source| {
                request_direct(source.as_ref(), key, |k| source.create_image(k)).map(|img| (img, *key))
            })
            .collect();

        let elevation = self.heightfield_sources.first();
        let mut heightfield = elevation
            .and_then(|source| request_direct(source.as_ref(), key, |k| source.create_heightfield(k)))
            .map(|hf| (hf, Some(*key)));

        if heightfield.is_none() && images.iter().all(Option::is_none) {
            log_debug!(
                self.logger,
                "No imagery or elevation for {}; not building tile",
                key
            );
            return None;
        }

        // Fill missing layers from ancestors.
        for (index, slot) in images.iter_mut().enumerate() {
            if slot.is_some() {
                continue;
            }
            let source = &self.image_sources[index];
            let found = interpolate_image(source.as_ref(), key);
            let depth = found.depth(key);
            match found.into_parts(*key) {
                Some(parts) => {
                    log_debug!(
                        self.logger,
                        "Interpolated image source {} ({}) for {} from {} level(s) up",
                        index,
                        source.name(),
                        key,
                        depth.unwrap_or(0)
                    );
                    *slot = Some(parts);
                }
                None => log_debug!(
                    self.logger,
                    "No image from source {} ({}) for {}",
                    index,
                    source.name(),
                    key
                ),
            }
        }

        if heightfield.is_none() {
            heightfield = match elevation {
                None => {
                    let size = self.settings.default_heightfield_size;
                    Some((HeightField::flat(size, size, 0.0), None))
                }
                Some(source) => {
                    let found = interpolate_heightfield(source.as_ref(), key);
                    match found {
                        Lookup::NotFound => {
                            log_warn!(self.logger, "Could not get a valid heightfield for {}", key);
                            return None;
                        }
                        found => {
                            log_debug!(self.logger, "Interpolated heightfield for {}", key);
                            found.into_parts(*key).map(|(hf, origin)| (hf, Some(origin)))
                        }
                    }
                }
            };
        }
        let (mut heightfield, heightfield_origin) = heightfield?;

        if self.profile.is_geographic() {
            heightfield.scale((1.0 / self.settings.meters_per_degree) as f32);
        }

        let image_layers = images
            .into_iter()
            .enumerate()
            .filter_map(|(source_index, slot)| {
                slot.map(|(image, origin_key)| ImageLayer {
                    image,
                    origin_key,
                    source_index,
                })
            })
            .collect();

        Some(TilePayload {
            key: *key,
            heightfield,
            heightfield_origin,
            image_layers,
        })
    }
}
