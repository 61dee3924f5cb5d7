//! Key algebra type definitions

use std::f64::consts::PI;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use thiserror::Error;

/// Deepest level a key may address.
///
/// `tile_id` packs x and y into 28 bits each; geodetic keys carry one
/// extra column bit, which caps the level at 26.
pub const MAX_LEVEL: u32 = 26;

/// Half the Web Mercator world width in metres.
pub const MERCATOR_HALF_WORLD: f64 = 20_037_508.342_789_244;

/// Latitude clipped by the Web Mercator square.
pub const MERCATOR_MAX_LAT: f64 = 85.051_128_779_806_59;

/// Axis-aligned rectangle `(xmin, ymin, xmax, ymax)`.
///
/// Extents are always finite; equality and hashing compare bit patterns
/// so that extents can be part of a hashable [`Profile`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

impl Extent {
    pub const fn new(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Self {
        Self {
            xmin,
            ymin,
            xmax,
            ymax,
        }
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    #[inline]
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Centre point `(x, y)`.
    #[inline]
    pub fn center(&self) -> (f64, f64) {
        ((self.xmin + self.xmax) / 2.0, (self.ymin + self.ymax) / 2.0)
    }

    /// True when the extent is finite and has positive width and height.
    pub fn is_valid(&self) -> bool {
        [self.xmin, self.ymin, self.xmax, self.ymax]
            .iter()
            .all(|v| v.is_finite())
            && self.xmax > self.xmin
            && self.ymax > self.ymin
    }

    /// True when `other` lies entirely inside this extent.
    pub fn contains(&self, other: &Extent) -> bool {
        other.xmin >= self.xmin
            && other.xmax <= self.xmax
            && other.ymin >= self.ymin
            && other.ymax <= self.ymax
    }

    /// True when the two extents overlap with positive area.
    pub fn intersects(&self, other: &Extent) -> bool {
        self.xmin < other.xmax
            && other.xmin < self.xmax
            && self.ymin < other.ymax
            && other.ymin < self.ymax
    }

    /// Position of `other` within this extent as normalised
    /// `(u0, v0, u1, v1)` with `v` measured from the top edge.
    pub fn normalized_window(&self, other: &Extent) -> (f64, f64, f64, f64) {
        let u0 = (other.xmin - self.xmin) / self.width();
        let u1 = (other.xmax - self.xmin) / self.width();
        let v0 = (self.ymax - other.ymax) / self.height();
        let v1 = (self.ymax - other.ymin) / self.height();
        (u0, v0, u1, v1)
    }
}

impl Eq for Extent {}

impl Hash for Extent {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for v in [self.xmin, self.ymin, self.xmax, self.ymax] {
            v.to_bits().hash(state);
        }
    }
}

impl fmt::Display for Extent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {}, {})",
            self.xmin, self.ymin, self.xmax, self.ymax
        )
    }
}

/// Subdivision convention a key belongs to, without profile parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileKind {
    Geodetic,
    Mercator,
    PlateCarre,
    Projected,
}

impl FromStr for ProfileKind {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "geodetic" | "global-geodetic" => Ok(ProfileKind::Geodetic),
            "mercator" | "global-mercator" => Ok(ProfileKind::Mercator),
            "plate-carre" | "platecarre" | "plate_carre" => Ok(ProfileKind::PlateCarre),
            "projected" => Ok(ProfileKind::Projected),
            other => Err(KeyError::Malformed(format!("unknown profile '{}'", other))),
        }
    }
}

impl fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProfileKind::Geodetic => "geodetic",
            ProfileKind::Mercator => "mercator",
            ProfileKind::PlateCarre => "plate-carre",
            ProfileKind::Projected => "projected",
        };
        f.write_str(name)
    }
}

/// Spatial reference and subdivision convention of a pyramid.
///
/// Profile-specific behaviour (root layout, level-0 child count, row
/// counts used for Y inversion) is selected by matching on this tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Profile {
    /// Global lat/lon, two 180°×180° root tiles.
    Geodetic,
    /// Global spherical Web Mercator, one square root tile.
    Mercator,
    /// Global lat/lon with a single 360°×360° root whose lower half lies
    /// outside the globe, so level 0 only has two real quadrants.
    PlateCarre,
    /// Local projected grid over a configured extent.
    Projected(Extent),
}

impl Profile {
    pub fn kind(&self) -> ProfileKind {
        match self {
            Profile::Geodetic => ProfileKind::Geodetic,
            Profile::Mercator => ProfileKind::Mercator,
            Profile::PlateCarre => ProfileKind::PlateCarre,
            Profile::Projected(_) => ProfileKind::Projected,
        }
    }

    /// Single-letter tag used in canonical key strings.
    pub fn tag(&self) -> char {
        match self {
            Profile::Geodetic => 'g',
            Profile::Mercator => 'm',
            Profile::PlateCarre => 'c',
            Profile::Projected(_) => 'p',
        }
    }

    /// Geographic profiles express extents in degrees.
    pub fn is_geographic(&self) -> bool {
        !matches!(self, Profile::Projected(_))
    }

    /// Extent covered by all root tiles together, in native units.
    pub fn root_extent(&self) -> Extent {
        match self {
            Profile::Geodetic => Extent::new(-180.0, -90.0, 180.0, 90.0),
            Profile::Mercator => Extent::new(
                -MERCATOR_HALF_WORLD,
                -MERCATOR_HALF_WORLD,
                MERCATOR_HALF_WORLD,
                MERCATOR_HALF_WORLD,
            ),
            Profile::PlateCarre => Extent::new(-180.0, -270.0, 180.0, 90.0),
            Profile::Projected(extent) => *extent,
        }
    }

    /// Number of level-0 tiles across.
    pub fn root_columns(&self) -> u32 {
        match self {
            Profile::Geodetic => 2,
            _ => 1,
        }
    }

    /// Columns in the addressing grid at `level`.
    pub fn grid_columns(&self, level: u32) -> u32 {
        self.root_columns() << level
    }

    /// Rows in the addressing grid at `level`.
    pub fn grid_rows(&self, level: u32) -> u32 {
        1 << level
    }

    /// Rows that cover the profile's valid area at `level`.
    ///
    /// Equal to the grid rows except for plate-carrée, where only the
    /// upper half of the square grid lies on the globe.
    pub fn map_size_tiles(&self, level: u32) -> u32 {
        match self {
            Profile::PlateCarre if level > 0 => 1 << (level - 1),
            _ => self.grid_rows(level),
        }
    }

    /// Quadrants a key at `level` subdivides into.
    pub fn quadrant_count(&self, level: u32) -> usize {
        match self {
            Profile::PlateCarre if level == 0 => 2,
            _ => 4,
        }
    }

    /// Level number used by flat-hierarchical addressing.
    ///
    /// Plate-carrée levels shift down by one so that its level 1 lines
    /// up with the two-tile level 0 of the TMS global-geodetic layout.
    pub fn addressing_level(&self, level: u32) -> i64 {
        match self {
            Profile::PlateCarre => level as i64 - 1,
            _ => level as i64,
        }
    }

    /// The fixed level-0 keys of this profile.
    pub fn root_keys(&self) -> Vec<TileKey> {
        (0..self.root_columns())
            .map(|x| TileKey {
                level: 0,
                x,
                y: 0,
                profile: *self,
            })
            .collect()
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Profile::Projected(extent) => write!(f, "projected{}", extent),
            other => write!(f, "{}", other.kind()),
        }
    }
}

/// Immutable address of one quadrant of the pyramid.
///
/// Rows count from the top (north) edge: `y = 0` is the northernmost row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileKey {
    level: u32,
    x: u32,
    y: u32,
    profile: Profile,
}

impl TileKey {
    /// Create a key, checking it lies on the profile's addressing grid.
    pub fn new(profile: Profile, level: u32, x: u32, y: u32) -> Result<Self, KeyError> {
        if level > MAX_LEVEL {
            return Err(KeyError::LevelOutOfRange {
                level,
                max: MAX_LEVEL,
            });
        }
        if let Profile::Projected(extent) = profile {
            if !extent.is_valid() {
                return Err(KeyError::InvalidExtent(extent));
            }
        }
        if x >= profile.grid_columns(level) || y >= profile.grid_rows(level) {
            return Err(KeyError::OutOfGrid { level, x, y });
        }
        Ok(Self {
            level,
            x,
            y,
            profile,
        })
    }

    #[inline]
    pub fn level(&self) -> u32 {
        self.level
    }

    #[inline]
    pub fn x(&self) -> u32 {
        self.x
    }

    #[inline]
    pub fn y(&self) -> u32 {
        self.y
    }

    #[inline]
    pub fn profile(&self) -> Profile {
        self.profile
    }

    /// Valid rows at this key's level (see [`Profile::map_size_tiles`]).
    #[inline]
    pub fn map_size_tiles(&self) -> u32 {
        self.profile.map_size_tiles(self.level)
    }

    /// Child key for `quadrant` (0 = upper-left, 1 = upper-right,
    /// 2 = lower-left, 3 = lower-right).
    pub fn subkey(&self, quadrant: u8) -> Result<TileKey, KeyError> {
        if quadrant > 3 {
            return Err(KeyError::InvalidQuadrant(quadrant));
        }
        if self.level >= MAX_LEVEL {
            return Err(KeyError::LevelOutOfRange {
                level: self.level + 1,
                max: MAX_LEVEL,
            });
        }
        Ok(TileKey {
            level: self.level + 1,
            x: self.x * 2 + (quadrant & 1) as u32,
            y: self.y * 2 + (quadrant >> 1) as u32,
            profile: self.profile,
        })
    }

    /// Position of this key inside its parent, `None` for root keys.
    pub fn quadrant(&self) -> Option<u8> {
        if self.level == 0 {
            return None;
        }
        Some(((self.x & 1) + 2 * (self.y & 1)) as u8)
    }

    pub fn parent(&self) -> Option<TileKey> {
        if self.level == 0 {
            return None;
        }
        Some(TileKey {
            level: self.level - 1,
            x: self.x / 2,
            y: self.y / 2,
            profile: self.profile,
        })
    }

    /// Parent, grandparent, ... up to and including the root.
    pub fn ancestors(&self) -> Ancestors {
        Ancestors { next: self.parent() }
    }

    /// Extent in the profile's native units (degrees, or metres for
    /// Mercator and projected profiles).
    ///
    /// Every coordinate is computed from the same `index / count`
    /// fractions for parent and child, so children share their edges
    /// bit-for-bit with each other and with the parent.
    pub fn native_extents(&self) -> Extent {
        let root = self.profile.root_extent();
        let cols = self.profile.grid_columns(self.level) as f64;
        let rows = self.profile.grid_rows(self.level) as f64;
        Extent {
            xmin: root.xmin + root.width() * (self.x as f64 / cols),
            xmax: root.xmin + root.width() * ((self.x + 1) as f64 / cols),
            ymax: root.ymax - root.height() * (self.y as f64 / rows),
            ymin: root.ymax - root.height() * ((self.y + 1) as f64 / rows),
        }
    }

    /// Geographic extent of this key.
    ///
    /// Degrees for the global profiles (Mercator rows are converted with
    /// the inverse Web Mercator formula) and native units for projected
    /// profiles. Fails when the key falls outside the profile's valid
    /// area, e.g. the lower half of the plate-carrée root.
    pub fn geo_extents(&self) -> Result<Extent, KeyError> {
        if self.y >= self.map_size_tiles() {
            return Err(KeyError::OutsideProfile(self.to_string()));
        }
        let extent = match self.profile {
            Profile::Mercator => {
                let n = self.profile.grid_rows(self.level) as f64;
                Extent {
                    xmin: self.x as f64 / n * 360.0 - 180.0,
                    xmax: (self.x + 1) as f64 / n * 360.0 - 180.0,
                    ymax: mercator_row_to_lat(self.y as f64 / n),
                    ymin: mercator_row_to_lat((self.y + 1) as f64 / n),
                }
            }
            _ => self.native_extents(),
        };
        if !extent.is_valid() {
            return Err(KeyError::InvalidExtent(extent));
        }
        Ok(extent)
    }

    /// Stable 64-bit identifier: `level << 56 | x << 28 | y`.
    pub fn tile_id(&self) -> u64 {
        ((self.level as u64) << 56) | ((self.x as u64) << 28) | self.y as u64
    }

    /// Parse a canonical key string of a projected profile over `extent`.
    pub fn parse_projected(s: &str, extent: Extent) -> Result<TileKey, KeyError> {
        let digits = s
            .strip_prefix('p')
            .ok_or_else(|| KeyError::Malformed(s.to_string()))?;
        parse_digits(s, digits, Profile::Projected(extent))
    }
}

/// Latitude in degrees of a normalised Mercator row position.
fn mercator_row_to_lat(row_fraction: f64) -> f64 {
    (PI * (1.0 - 2.0 * row_fraction)).sinh().atan().to_degrees()
}

/// Canonical string: profile tag, root-tile digit, then one quadrant
/// digit per level, most significant first. For example the geodetic
/// key at level 2, x = 5, y = 1 is `g103`.
impl fmt::Display for TileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::with_capacity(self.level as usize + 2);
        out.push(self.profile.tag());
        let root = self.x >> self.level;
        out.push(char::from(b'0' + root as u8));
        for bit in (0..self.level).rev() {
            let digit = ((self.x >> bit) & 1) + 2 * ((self.y >> bit) & 1);
            out.push(char::from(b'0' + digit as u8));
        }
        f.write_str(&out)
    }
}

impl FromStr for TileKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let profile = match chars.next() {
            Some('g') => Profile::Geodetic,
            Some('m') => Profile::Mercator,
            Some('c') => Profile::PlateCarre,
            Some('p') => {
                return Err(KeyError::Malformed(format!(
                    "{} (projected keys need an extent, use TileKey::parse_projected)",
                    s
                )))
            }
            _ => return Err(KeyError::Malformed(s.to_string())),
        };
        parse_digits(s, chars.as_str(), profile)
    }
}

fn parse_digits(original: &str, digits: &str, profile: Profile) -> Result<TileKey, KeyError> {
    let bytes = digits.as_bytes();
    let (&root, quads) = bytes
        .split_first()
        .ok_or_else(|| KeyError::Malformed(original.to_string()))?;
    if !root.is_ascii_digit() || (root - b'0') as u32 >= profile.root_columns() {
        return Err(KeyError::Malformed(original.to_string()));
    }
    let level = quads.len() as u32;
    if level > MAX_LEVEL {
        return Err(KeyError::LevelOutOfRange {
            level,
            max: MAX_LEVEL,
        });
    }
    let mut x = (root - b'0') as u32;
    let mut y = 0u32;
    for &c in quads {
        let digit = match c {
            b'0'..=b'3' => (c - b'0') as u32,
            _ => return Err(KeyError::Malformed(original.to_string())),
        };
        x = x * 2 + (digit & 1);
        y = y * 2 + (digit >> 1);
    }
    TileKey::new(profile, level, x, y)
}

/// Iterator over a key's ancestors, nearest first.
#[derive(Debug, Clone)]
pub struct Ancestors {
    next: Option<TileKey>,
}

impl Iterator for Ancestors {
    type Item = TileKey;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.parent();
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.next.map_or(0, |k| k.level as usize + 1);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Ancestors {}

/// Errors produced by key construction and geometry.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum KeyError {
    #[error("level {level} exceeds the maximum of {max}")]
    LevelOutOfRange { level: u32, max: u32 },

    #[error("tile ({x}, {y}) is outside the level {level} grid")]
    OutOfGrid { level: u32, x: u32, y: u32 },

    #[error("key {0} lies outside the profile's valid area")]
    OutsideProfile(String),

    #[error("quadrant {0} is not in 0..=3")]
    InvalidQuadrant(u8),

    #[error("invalid extent {0}")]
    InvalidExtent(Extent),

    #[error("malformed tile key '{0}'")]
    Malformed(String),
}
