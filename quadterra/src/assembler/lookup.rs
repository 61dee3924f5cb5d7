//! Per-source data lookup with ancestor fallback.

use image::imageops::{self, FilterType};
use image::RgbaImage;

use crate::key::TileKey;
use crate::source::{HeightField, TileSource};

/// Outcome of looking up one source for one key.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    /// The source answered for the requested key itself.
    FoundDirect(T),
    /// The source had nothing for the key; `data` was derived from the
    /// nearest ancestor `key` (at `level`) that it did answer for, and
    /// already cropped and resampled to the requested key.
    FoundAncestor { level: u32, key: TileKey, data: T },
    NotFound,
}

impl<T> Lookup<T> {
    pub fn is_found(&self) -> bool {
        !matches!(self, Lookup::NotFound)
    }

    /// Data and the key it originally came from.
    pub fn into_parts(self, requested: TileKey) -> Option<(T, TileKey)> {
        match self {
            Lookup::FoundDirect(data) => Some((data, requested)),
            Lookup::FoundAncestor { key, data, .. } => Some((data, key)),
            Lookup::NotFound => None,
        }
    }

    /// Levels between the requested key and the data's origin.
    pub fn depth(&self, requested: &TileKey) -> Option<u32> {
        match self {
            Lookup::FoundDirect(_) => Some(0),
            Lookup::FoundAncestor { level, .. } => Some(requested.level() - level),
            Lookup::NotFound => None,
        }
    }
}

/// Ask `source` for `key` directly, without fallback.
///
/// Sources are never called for levels outside their range.
pub(crate) fn request_direct<T>(
    source: &dyn TileSource,
    key: &TileKey,
    fetch: impl Fn(&TileKey) -> Option<T>,
) -> Option<T> {
    if source.in_range(key.level()) {
        fetch(key)
    } else {
        None
    }
}

/// Walk `key`'s ancestors, nearest first, until `source` answers.
///
/// Ancestors deeper than the source's `max_level` are skipped without a
/// call; the walk stops once it passes above `min_level`. Keys shallower
/// than `min_level` never interpolate.
fn from_ancestors<T>(
    source: &dyn TileSource,
    key: &TileKey,
    fetch: impl Fn(&TileKey) -> Option<T>,
    fit: impl Fn(T, &TileKey, &TileKey) -> T,
) -> Lookup<T> {
    if key.level() < source.min_level() {
        return Lookup::NotFound;
    }
    for ancestor in key.ancestors() {
        if ancestor.level() < source.min_level() {
            break;
        }
        if ancestor.level() > source.max_level() {
            continue;
        }
        if let Some(data) = fetch(&ancestor) {
            return Lookup::FoundAncestor {
                level: ancestor.level(),
                key: ancestor,
                data: fit(data, &ancestor, key),
            };
        }
    }
    Lookup::NotFound
}

/// Image for `key` cut from the nearest ancestor `source` answers for.
pub(crate) fn interpolate_image(source: &dyn TileSource, key: &TileKey) -> Lookup<RgbaImage> {
    from_ancestors(source, key, |k| source.create_image(k), crop_image)
}

/// Heightfield for `key` resampled from the nearest ancestor `source`
/// answers for.
pub(crate) fn interpolate_heightfield(
    source: &dyn TileSource,
    key: &TileKey,
) -> Lookup<HeightField> {
    from_ancestors(source, key, |k| source.create_heightfield(k), crop_heightfield)
}

/// Crop the part of `image` (covering `ancestor`) that covers `key` and
/// upsample it back to the image's original size.
fn crop_image(image: RgbaImage, ancestor: &TileKey, key: &TileKey) -> RgbaImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return image;
    }
    let (u0, v0, u1, v1) = ancestor
        .native_extents()
        .normalized_window(&key.native_extents());

    let x0 = ((u0 * width as f64).floor() as u32).min(width - 1);
    let y0 = ((v0 * height as f64).floor() as u32).min(height - 1);
    let x1 = ((u1 * width as f64).ceil() as u32).clamp(x0 + 1, width);
    let y1 = ((v1 * height as f64).ceil() as u32).clamp(y0 + 1, height);

    let cropped = imageops::crop_imm(&image, x0, y0, x1 - x0, y1 - y0).to_image();
    imageops::resize(&cropped, width, height, FilterType::Triangle)
}

/// Resample the part of `hf` (covering `ancestor`) that covers `key` onto
/// a grid of the same size.
fn crop_heightfield(hf: HeightField, ancestor: &TileKey, key: &TileKey) -> HeightField {
    let window = ancestor
        .native_extents()
        .normalized_window(&key.native_extents());
    hf.resample_window(window, hf.columns(), hf.rows())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::Profile;
    use crate::source::MemorySource;
    use image::Rgba;

    /// 4x4 image whose quadrants are red, green, blue and white.
    fn quartered() -> RgbaImage {
        RgbaImage::from_fn(4, 4, |x, y| match (x < 2, y < 2) {
            (true, true) => Rgba([255, 0, 0, 255]),
            (false, true) => Rgba([0, 255, 0, 255]),
            (true, false) => Rgba([0, 0, 255, 255]),
            (false, false) => Rgba([255, 255, 255, 255]),
        })
    }

    #[test]
    fn test_direct_request_respects_level_range() {
        let root = Profile::Mercator.root_keys()[0];
        let source = MemorySource::new("s")
            .with_levels(1, 3)
            .with_uniform_image(Rgba([1, 2, 3, 255]), 4);

        assert!(request_direct(&source, &root, |k| source.create_image(k)).is_none());
        assert!(source.requests().is_empty());

        let child = root.subkey(2).unwrap();
        assert!(request_direct(&source, &child, |k| source.create_image(k)).is_some());
        assert_eq!(source.requested_levels(), vec![1]);
    }

    #[test]
    fn test_ancestor_is_cropped_to_quadrant() {
        let root = Profile::Mercator.root_keys()[0];
        let source = MemorySource::new("s").with_image(root, quartered());

        let lower_right = root.subkey(3).unwrap();
        let found = interpolate_image(&source, &lower_right);
        assert_eq!(found.depth(&lower_right), Some(1));
        let Lookup::FoundAncestor { level, key, data } = found else {
            panic!("expected ancestor data");
        };
        assert_eq!((level, key), (0, root));
        assert_eq!(data.dimensions(), (4, 4));
        assert!(data.pixels().all(|p| *p == Rgba([255, 255, 255, 255])));

        let upper_left = root.subkey(0).unwrap();
        let (data, origin) = interpolate_image(&source, &upper_left)
            .into_parts(upper_left)
            .unwrap();
        assert_eq!(origin, root);
        assert!(data.pixels().all(|p| *p == Rgba([255, 0, 0, 255])));
    }

    #[test]
    fn test_roots_have_nothing_to_interpolate_from() {
        let root = Profile::Mercator.root_keys()[0];
        let source = MemorySource::new("s").with_image(root, quartered());
        assert_eq!(interpolate_image(&source, &root), Lookup::NotFound);
        assert!(source.requests().is_empty());
    }

    #[test]
    fn test_out_of_range_source_is_not_called_directly() {
        let root = Profile::Geodetic.root_keys()[0];
        let source = MemorySource::new("mid")
            .with_levels(2, 4)
            .with_uniform_image(Rgba([1, 2, 3, 255]), 8);

        let mut key = root;
        for q in [0, 1, 2, 3, 0, 1] {
            key = key.subkey(q).unwrap();
        }
        assert_eq!(key.level(), 6);

        assert!(request_direct(&source, &key, |k| source.create_image(k)).is_none());
        let found = interpolate_image(&source, &key);
        assert!(matches!(found, Lookup::FoundAncestor { level: 4, .. }));
        assert_eq!(found.depth(&key), Some(2));
        assert_eq!(source.requested_levels(), vec![4]);
    }

    #[test]
    fn test_walk_stops_above_min_level() {
        let root = Profile::Mercator.root_keys()[0];
        let source = MemorySource::new("deep")
            .with_levels(2, 10)
            .with_image(root, quartered());
        let key = root.subkey(0).unwrap().subkey(0).unwrap().subkey(0).unwrap();

        assert_eq!(interpolate_image(&source, &key), Lookup::NotFound);
        assert_eq!(source.requested_levels(), vec![2]);

        // Keys shallower than the range never query.
        let shallow = MemorySource::new("deep").with_levels(2, 10);
        assert_eq!(
            interpolate_image(&shallow, &root.subkey(0).unwrap()),
            Lookup::NotFound
        );
        assert!(shallow.requests().is_empty());
    }

    #[test]
    fn test_heightfield_interpolation() {
        let root = Profile::Geodetic.root_keys()[0];
        let ramp = HeightField::new(3, 3, vec![0.0, 50.0, 100.0, 0.0, 50.0, 100.0, 0.0, 50.0, 100.0])
            .unwrap();
        let source = MemorySource::new("dem").with_heightfield(root, ramp);

        let east = root.subkey(1).unwrap();
        let hf = match interpolate_heightfield(&source, &east) {
            Lookup::FoundAncestor { data, .. } => data,
            other => panic!("unexpected {:?}", other),
        };
        assert_eq!((hf.columns(), hf.rows()), (3, 3));
        assert_eq!(hf.get(0, 0), 50.0);
        assert_eq!(hf.get(2, 2), 100.0);
    }

    #[test]
    fn test_crop_handles_sub_pixel_windows() {
        let root = Profile::Mercator.root_keys()[0];
        let mut key = root;
        for _ in 0..5 {
            key = key.subkey(3).unwrap();
        }
        let cropped = crop_image(quartered(), &root, &key);
        assert_eq!(cropped.dimensions(), (4, 4));
        assert!(cropped.pixels().all(|p| *p == Rgba([255, 255, 255, 255])));
    }
}
