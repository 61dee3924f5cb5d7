//! Source backed by a local tile pyramid on disk.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::{imageops, DynamicImage, ImageBuffer, Pixel, RgbaImage};

use super::{HeightField, SourceError, TileSource};
use crate::key::{TileKey, MAX_LEVEL};
use crate::log::Logger;
use crate::{log_debug, log_warn};

/// Row numbering used by the pyramid's `<y>` path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowConvention {
    /// Rows counted from the south edge (OSGeo TMS).
    Tms,
    /// Rows counted from the north edge (XYZ / slippy map).
    Xyz,
}

/// What the files in the pyramid hold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SourceContent {
    /// Colour imagery.
    Imagery,
    /// 16-bit grayscale heightmaps; `metres = value * scale + offset`.
    Elevation { scale: f32, offset: f32 },
}

/// Reads `<root>/<level>/<x>/<y>.<ext>`.
///
/// Missing files are data-absent and logged at debug level; files that
/// exist but fail to decode are logged at warn level and also treated as
/// absent.
///
/// The plate-carrée root has no file of its own. It is served by placing
/// the two level-0 tiles side by side in the upper half of a square tile;
/// the off-globe lower half stays transparent (zero for elevation).
pub struct DirectorySource {
    name: String,
    root: PathBuf,
    extension: String,
    rows: RowConvention,
    content: SourceContent,
    min_level: u32,
    max_level: u32,
    logger: Arc<dyn Logger>,
}

impl DirectorySource {
    /// Open the pyramid at `root`.
    pub fn new(
        name: impl Into<String>,
        root: impl Into<PathBuf>,
        content: SourceContent,
        logger: Arc<dyn Logger>,
    ) -> Result<Self, SourceError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(SourceError::NotADirectory(root));
        }
        Ok(Self {
            name: name.into(),
            root,
            extension: "png".to_string(),
            rows: RowConvention::Tms,
            content,
            min_level: 0,
            max_level: MAX_LEVEL,
            logger,
        })
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn with_rows(mut self, rows: RowConvention) -> Self {
        self.rows = rows;
        self
    }

    pub fn with_levels(mut self, min_level: u32, max_level: u32) -> Result<Self, SourceError> {
        if min_level > max_level || max_level > MAX_LEVEL {
            return Err(SourceError::InvalidLevelRange {
                min: min_level,
                max: max_level,
            });
        }
        self.min_level = min_level;
        self.max_level = max_level;
        Ok(self)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File that would hold `key`, or `None` when the key has no
    /// position in the pyramid (off-globe plate-carrée rows).
    pub fn tile_path(&self, key: &TileKey) -> Option<PathBuf> {
        let level = key.profile().addressing_level(key.level());
        let rows = key.map_size_tiles();
        if level < 0 || key.y() >= rows {
            return None;
        }
        let y = match self.rows {
            RowConvention::Xyz => key.y(),
            RowConvention::Tms => rows - key.y() - 1,
        };
        Some(
            self.root
                .join(level.to_string())
                .join(key.x().to_string())
                .join(format!("{}.{}", y, self.extension)),
        )
    }

    fn read(&self, key: &TileKey) -> Option<DynamicImage> {
        if key.profile().addressing_level(key.level()) < 0 {
            return self.read_half_globe_root(key);
        }
        let path = self.tile_path(key)?;
        if !path.is_file() {
            log_debug!(self.logger, "[{}] no tile for {} at {}", self.name, key, path.display());
            return None;
        }
        match decode(&path) {
            Ok(image) => Some(image),
            Err(e) => {
                log_warn!(self.logger, "[{}] {}", self.name, e);
                None
            }
        }
    }

    fn read_half_globe_root(&self, key: &TileKey) -> Option<DynamicImage> {
        let west = self.read(&key.subkey(0).ok()?);
        let east = self.read(&key.subkey(1).ok()?);
        let (width, height) = match (&west, &east) {
            (Some(tile), _) | (None, Some(tile)) => (tile.width(), tile.height()),
            (None, None) => return None,
        };
        if let (Some(w), Some(e)) = (&west, &east) {
            if (w.width(), w.height()) != (e.width(), e.height()) {
                log_warn!(
                    self.logger,
                    "[{}] level-0 tiles differ in size ({}x{} vs {}x{}); cannot compose {}",
                    self.name,
                    w.width(),
                    w.height(),
                    e.width(),
                    e.height(),
                    key
                );
                return None;
            }
        }

        let tiles = [west, east];
        let root = match self.content {
            SourceContent::Imagery => {
                DynamicImage::ImageRgba8(side_by_side(&tiles, width, height, |t| t.to_rgba8()))
            }
            SourceContent::Elevation { .. } => {
                DynamicImage::ImageLuma16(side_by_side(&tiles, width, height, |t| t.to_luma16()))
            }
        };
        Some(root)
    }
}

/// Place `tiles` left to right along the top of a `2w x 2h` buffer.
fn side_by_side<P, F>(
    tiles: &[Option<DynamicImage>],
    width: u32,
    height: u32,
    convert: F,
) -> ImageBuffer<P, Vec<P::Subpixel>>
where
    P: Pixel,
    F: Fn(&DynamicImage) -> ImageBuffer<P, Vec<P::Subpixel>>,
{
    let mut out = ImageBuffer::new(width * 2, height * 2);
    for (column, tile) in tiles.iter().enumerate() {
        if let Some(tile) = tile {
            imageops::replace(&mut out, &convert(tile), column as i64 * width as i64, 0);
        }
    }
    out
}

fn decode(path: &Path) -> Result<DynamicImage, SourceError> {
    let bytes = std::fs::read(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    image::load_from_memory(&bytes).map_err(|source| SourceError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

/// Convert a 16-bit grayscale heightmap to metres.
fn heightmap_to_heightfield(
    image: &DynamicImage,
    scale: f32,
    offset: f32,
) -> Result<HeightField, SourceError> {
    let gray = image.to_luma16();
    let (columns, rows) = gray.dimensions();
    let samples = gray
        .pixels()
        .map(|p| p.0[0] as f32 * scale + offset)
        .collect();
    HeightField::new(columns, rows, samples)
}

impl TileSource for DirectorySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn extension(&self) -> Option<&str> {
        Some(&self.extension)
    }

    fn min_level(&self) -> u32 {
        self.min_level
    }

    fn max_level(&self) -> u32 {
        self.max_level
    }

    fn create_image(&self, key: &TileKey) -> Option<RgbaImage> {
        match self.content {
            SourceContent::Imagery => self.read(key).map(|image| image.to_rgba8()),
            SourceContent::Elevation { .. } => None,
        }
    }

    fn create_heightfield(&self, key: &TileKey) -> Option<HeightField> {
        let SourceContent::Elevation { scale, offset } = self.content else {
            return None;
        };
        let image = self.read(key)?;
        match heightmap_to_heightfield(&image, scale, offset) {
            Ok(hf) => Some(hf),
            Err(e) => {
                log_warn!(self.logger, "[{}] {} for {}", self.name, e, key);
                None
            }
        }
    }
}
