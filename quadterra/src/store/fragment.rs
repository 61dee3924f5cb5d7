//! Encoded tile fragments.
//!
//! Images are written with the `image` crate in the store's format
//! (PNG unless the extension names JPEG). Heightfields use a small
//! little-endian layout:
//!
//! ```text
//! "QTHF" | u16 version | u16 reserved | u32 columns | u32 rows | f32 samples...
//! ```

use std::io::Cursor;

use bytes::{Buf, BufMut, Bytes, BytesMut};
use image::{ImageFormat, RgbaImage};

use super::types::{FragmentKind, StoreError};
use crate::source::HeightField;

const HEIGHTFIELD_MAGIC: &[u8; 4] = b"QTHF";
const HEIGHTFIELD_VERSION: u16 = 1;
const HEIGHTFIELD_HEADER_LEN: usize = 16;

/// One source's contribution to a tile, as persisted by a store.
#[derive(Debug, Clone, PartialEq)]
pub enum TileFragment {
    Image(RgbaImage),
    HeightField(HeightField),
}

impl TileFragment {
    pub fn kind(&self) -> FragmentKind {
        match self {
            TileFragment::Image(_) => FragmentKind::Image,
            TileFragment::HeightField(_) => FragmentKind::HeightField,
        }
    }

    pub fn into_image(self) -> Option<RgbaImage> {
        match self {
            TileFragment::Image(image) => Some(image),
            TileFragment::HeightField(_) => None,
        }
    }

    pub fn into_heightfield(self) -> Option<HeightField> {
        match self {
            TileFragment::HeightField(hf) => Some(hf),
            TileFragment::Image(_) => None,
        }
    }

    /// Encode for a file with the given extension.
    pub fn encode(&self, extension: &str) -> Result<Bytes, StoreError> {
        match self {
            TileFragment::Image(image) => encode_image(image, extension),
            TileFragment::HeightField(hf) => Ok(encode_heightfield(hf)),
        }
    }

    /// Decode a fragment, detecting its kind from the content.
    pub fn decode(data: &[u8]) -> Result<Self, StoreError> {
        if data.starts_with(HEIGHTFIELD_MAGIC) {
            return decode_heightfield(data).map(TileFragment::HeightField);
        }
        let image = image::load_from_memory(data)
            .map_err(|e| StoreError::Decode(e.to_string()))?;
        Ok(TileFragment::Image(image.to_rgba8()))
    }
}

fn encode_image(image: &RgbaImage, extension: &str) -> Result<Bytes, StoreError> {
    let mut out = Cursor::new(Vec::new());
    match ImageFormat::from_extension(extension) {
        Some(ImageFormat::Jpeg) => {
            // JPEG has no alpha channel.
            let rgb = image::DynamicImage::ImageRgba8(image.clone()).to_rgb8();
            rgb.write_to(&mut out, ImageFormat::Jpeg)?;
        }
        _ => image.write_to(&mut out, ImageFormat::Png)?,
    }
    Ok(Bytes::from(out.into_inner()))
}

fn encode_heightfield(hf: &HeightField) -> Bytes {
    let mut buf = BytesMut::with_capacity(HEIGHTFIELD_HEADER_LEN + hf.samples().len() * 4);
    buf.put_slice(HEIGHTFIELD_MAGIC);
    buf.put_u16_le(HEIGHTFIELD_VERSION);
    buf.put_u16_le(0);
    buf.put_u32_le(hf.columns());
    buf.put_u32_le(hf.rows());
    for &sample in hf.samples() {
        buf.put_f32_le(sample);
    }
    buf.freeze()
}

fn decode_heightfield(data: &[u8]) -> Result<HeightField, StoreError> {
    if data.len() < HEIGHTFIELD_HEADER_LEN {
        return Err(StoreError::Decode("truncated heightfield header".into()));
    }
    let mut buf = &data[HEIGHTFIELD_MAGIC.len()..];
    let version = buf.get_u16_le();
    if version != HEIGHTFIELD_VERSION {
        return Err(StoreError::Decode(format!(
            "unsupported heightfield version {}",
            version
        )));
    }
    let _reserved = buf.get_u16_le();
    let columns = buf.get_u32_le();
    let rows = buf.get_u32_le();

    let count = columns as usize * rows as usize;
    if buf.remaining() != count * 4 {
        return Err(StoreError::Decode(format!(
            "expected {} samples, found {} bytes",
            count,
            buf.remaining()
        )));
    }
    let samples = (0..count).map(|_| buf.get_f32_le()).collect();
    HeightField::new(columns, rows, samples).map_err(|e| StoreError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_heightfield_layout() {
        let hf = HeightField::new(2, 2, vec![1.0, -2.5, 3.25, 8848.0]).unwrap();
        let bytes = TileFragment::HeightField(hf.clone()).encode("qthf").unwrap();

        assert_eq!(&bytes[..4], b"QTHF");
        assert_eq!(bytes.len(), 16 + 4 * 4);
        assert_eq!(
            TileFragment::decode(&bytes).unwrap(),
            TileFragment::HeightField(hf)
        );
    }

    #[test]
    fn test_png_is_lossless() {
        let image = RgbaImage::from_fn(3, 2, |x, y| Rgba([x as u8 * 80, y as u8 * 100, 7, 200]));
        let bytes = TileFragment::Image(image.clone()).encode("png").unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
        assert_eq!(
            TileFragment::decode(&bytes).unwrap().into_image(),
            Some(image)
        );
    }

    #[test]
    fn test_jpeg_extension_writes_jpeg() {
        let image = RgbaImage::from_pixel(8, 8, Rgba([100, 150, 200, 255]));
        let bytes = TileFragment::Image(image).encode("jpg").unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
        let decoded = TileFragment::decode(&bytes).unwrap();
        assert_eq!(decoded.kind(), FragmentKind::Image);
    }

    #[test]
    fn test_unknown_extension_falls_back_to_png() {
        let image = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 0]));
        let bytes = TileFragment::Image(image).encode("tile").unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(TileFragment::decode(b"QTHF").is_err());
        assert!(TileFragment::decode(b"definitely not an image").is_err());

        let mut short = encode_heightfield(&HeightField::flat(2, 2, 0.0)).to_vec();
        short.pop();
        assert!(TileFragment::decode(&short).is_err());
    }
}
