//! Tile-local to world coordinate transforms.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use crate::key::Extent;

/// Whether world coordinates are degrees or projected units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateSystemType {
    Geographic,
    Projected,
}

/// Maps normalised tile coordinates `(u, v)` in `[0, 1]`, origin at the
/// south-west corner, onto a world extent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Locator {
    pub extent: Extent,
    pub coordinate_system: CoordinateSystemType,
    /// Rows are linear in Mercator northing rather than latitude, as for
    /// Web Mercator imagery drawn on a geographic tile.
    pub mercator: bool,
}

impl Locator {
    pub fn new(extent: Extent, coordinate_system: CoordinateSystemType) -> Self {
        Self {
            extent,
            coordinate_system,
            mercator: false,
        }
    }

    pub fn with_mercator(mut self) -> Self {
        self.mercator = true;
        self
    }

    /// World position of local `(u, v)`.
    pub fn to_world(&self, u: f64, v: f64) -> (f64, f64) {
        let e = &self.extent;
        let x = e.xmin + u * e.width();
        let y = if self.mercator {
            let (s, n) = (lat_to_northing(e.ymin), lat_to_northing(e.ymax));
            northing_to_lat(s + v * (n - s))
        } else {
            e.ymin + v * e.height()
        };
        (x, y)
    }

    /// Local `(u, v)` of world position `(x, y)`.
    pub fn to_local(&self, x: f64, y: f64) -> (f64, f64) {
        let e = &self.extent;
        let u = (x - e.xmin) / e.width();
        let v = if self.mercator {
            let (s, n) = (lat_to_northing(e.ymin), lat_to_northing(e.ymax));
            (lat_to_northing(y) - s) / (n - s)
        } else {
            (y - e.ymin) / e.height()
        };
        (u, v)
    }

    /// Column-major 4x4 matrix scaling the unit square onto the extent.
    ///
    /// Ignores any Mercator warp, which is not affine.
    #[rustfmt::skip]
    pub fn transform(&self) -> [f64; 16] {
        let e = &self.extent;
        [
            e.width(), 0.0, 0.0, 0.0,
            0.0, e.height(), 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            e.xmin, e.ymin, 0.0, 1.0,
        ]
    }
}

/// Unit-sphere Mercator northing of a latitude in degrees.
fn lat_to_northing(lat: f64) -> f64 {
    (FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln()
}

fn northing_to_lat(northing: f64) -> f64 {
    (2.0 * northing.exp().atan() - FRAC_PI_2).to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_round_trip() {
        let loc = Locator::new(Extent::new(10.0, 20.0, 30.0, 60.0), CoordinateSystemType::Geographic);
        assert_eq!(loc.to_world(0.0, 0.0), (10.0, 20.0));
        assert_eq!(loc.to_world(1.0, 1.0), (30.0, 60.0));
        assert_eq!(loc.to_world(0.5, 0.25), (20.0, 30.0));
        assert_eq!(loc.to_local(20.0, 30.0), (0.5, 0.25));
    }

    #[test]
    fn test_mercator_warp_keeps_corners_and_bends_middle() {
        let extent = Extent::new(-180.0, 0.0, 180.0, 80.0);
        let loc = Locator::new(extent, CoordinateSystemType::Geographic).with_mercator();

        let (_, south) = loc.to_world(0.0, 0.0);
        let (_, north) = loc.to_world(0.0, 1.0);
        assert!(south.abs() < 1e-9);
        assert!((north - 80.0).abs() < 1e-9);

        // Half way in Mercator northing is well above half way in latitude.
        let (_, mid) = loc.to_world(0.5, 0.5);
        assert!(mid > 40.0);

        let (u, v) = loc.to_local(0.0, mid);
        assert!((u - 0.5).abs() < 1e-12);
        assert!((v - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_mercator_flag_changes_only_rows() {
        let extent = Extent::new(0.0, -60.0, 90.0, 60.0);
        let linear = Locator::new(extent, CoordinateSystemType::Geographic);
        let warped = linear.with_mercator();

        let (lx, ly) = linear.to_world(0.25, 0.75);
        let (wx, wy) = warped.to_world(0.25, 0.75);
        assert_eq!(lx, wx);
        assert!(wy > ly);

        // Symmetric extent: the equator stays in the middle.
        assert!(warped.to_world(0.5, 0.5).1.abs() < 1e-9);
        assert_eq!(warped.transform(), linear.transform());
    }

    #[test]
    fn test_transform_matrix() {
        let loc = Locator::new(Extent::new(1.0, 2.0, 4.0, 10.0), CoordinateSystemType::Projected);
        let m = loc.transform();
        assert_eq!((m[0], m[5], m[12], m[13]), (3.0, 8.0, 1.0, 2.0));
    }
}
