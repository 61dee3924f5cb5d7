//! Quadrant assembly: compositing sources into tile payloads.
//!
//! For each key the assembler asks every in-range image source and the
//! first heightfield source for data. If nothing answers directly the
//! quadrant does not exist. Otherwise missing layers are recovered from
//! ancestor keys (cropped and upsampled), a flat grid stands in when no
//! elevation source is configured, and elevations are converted to
//! degrees for geographic profiles.
//!
//! Each layer's provenance is tracked as a [`Lookup`].

mod lookup;
mod payload;
mod quadrant;

pub use lookup::Lookup;
pub use payload::{ImageLayer, TilePayload};
pub use quadrant::QuadrantAssembler;
