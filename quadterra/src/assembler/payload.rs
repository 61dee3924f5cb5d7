//! Assembled tile content.

use image::RgbaImage;

use crate::key::TileKey;
use crate::source::HeightField;

/// One image layer of a payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageLayer {
    /// Pixels covering the requested key's extent.
    pub image: RgbaImage,
    /// Key the pixels were originally produced for. Differs from the
    /// payload key when the layer was interpolated from an ancestor.
    pub origin_key: TileKey,
    /// Position of the producing source in the assembler's image list.
    pub source_index: usize,
}

/// Content assembled for one key: always a heightfield, plus zero or more
/// image layers in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct TilePayload {
    pub key: TileKey,
    /// Elevations in the profile's vertical units.
    pub heightfield: HeightField,
    /// Key the heightfield came from; `None` when it was synthesised flat.
    pub heightfield_origin: Option<TileKey>,
    pub image_layers: Vec<ImageLayer>,
}

impl TilePayload {
    /// Number of layers that had to be interpolated from ancestors.
    pub fn interpolated_layers(&self) -> usize {
        self.image_layers
            .iter()
            .filter(|layer| layer.origin_key != self.key)
            .count()
    }

    /// True when some layer or the heightfield came straight from a source.
    pub fn has_direct_data(&self) -> bool {
        self.heightfield_origin == Some(self.key)
            || self.image_layers.iter().any(|l| l.origin_key == self.key)
    }
}
