//! Regular elevation grid.

use super::SourceError;

/// Grid of elevation samples covering a tile's extent edge to edge.
///
/// Row 0 is the northern edge and column 0 the western edge, matching
/// image pixel order. Samples sit on the grid posts, so the first and
/// last rows/columns lie exactly on the tile boundary and are shared
/// with neighbouring tiles.
#[derive(Debug, Clone, PartialEq)]
pub struct HeightField {
    columns: u32,
    rows: u32,
    samples: Vec<f32>,
}

impl HeightField {
    /// Wrap `samples` (row-major, north first) in a grid.
    pub fn new(columns: u32, rows: u32, samples: Vec<f32>) -> Result<Self, SourceError> {
        if columns < 2 || rows < 2 {
            return Err(SourceError::InvalidHeightField(format!(
                "grid must be at least 2x2, got {}x{}",
                columns, rows
            )));
        }
        let expected = columns as usize * rows as usize;
        if samples.len() != expected {
            return Err(SourceError::InvalidHeightField(format!(
                "expected {} samples for {}x{}, got {}",
                expected,
                columns,
                rows,
                samples.len()
            )));
        }
        Ok(Self {
            columns,
            rows,
            samples,
        })
    }

    /// Grid of constant `elevation`. Sizes below 2 are raised to 2.
    pub fn flat(columns: u32, rows: u32, elevation: f32) -> Self {
        let columns = columns.max(2);
        let rows = rows.max(2);
        Self {
            columns,
            rows,
            samples: vec![elevation; columns as usize * rows as usize],
        }
    }

    #[inline]
    pub fn columns(&self) -> u32 {
        self.columns
    }

    #[inline]
    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    #[inline]
    fn index(&self, col: u32, row: u32) -> usize {
        row as usize * self.columns as usize + col as usize
    }

    /// Sample at a grid post. Panics if out of bounds, like slice indexing.
    #[inline]
    pub fn get(&self, col: u32, row: u32) -> f32 {
        self.samples[self.index(col, row)]
    }

    #[inline]
    pub fn set(&mut self, col: u32, row: u32, value: f32) {
        let idx = self.index(col, row);
        self.samples[idx] = value;
    }

    /// Bilinear sample at normalised `(u, v)`, `u` west to east and `v`
    /// north to south, both clamped to `[0, 1]`.
    pub fn sample(&self, u: f64, v: f64) -> f32 {
        let fx = u.clamp(0.0, 1.0) * (self.columns - 1) as f64;
        let fy = v.clamp(0.0, 1.0) * (self.rows - 1) as f64;

        let c0 = (fx.floor() as u32).min(self.columns - 2);
        let r0 = (fy.floor() as u32).min(self.rows - 2);
        let tx = (fx - c0 as f64) as f32;
        let ty = (fy - r0 as f64) as f32;

        let top = self.get(c0, r0) * (1.0 - tx) + self.get(c0 + 1, r0) * tx;
        let bottom = self.get(c0, r0 + 1) * (1.0 - tx) + self.get(c0 + 1, r0 + 1) * tx;
        top * (1.0 - ty) + bottom * ty
    }

    /// Resample the window `(u0, v0, u1, v1)` of this grid onto a new
    /// `columns x rows` grid.
    pub fn resample_window(&self, window: (f64, f64, f64, f64), columns: u32, rows: u32) -> Self {
        let (u0, v0, u1, v1) = window;
        let columns = columns.max(2);
        let rows = rows.max(2);
        let mut samples = Vec::with_capacity(columns as usize * rows as usize);
        for row in 0..rows {
            let v = v0 + (v1 - v0) * row as f64 / (rows - 1) as f64;
            for col in 0..columns {
                let u = u0 + (u1 - u0) * col as f64 / (columns - 1) as f64;
                samples.push(self.sample(u, v));
            }
        }
        Self {
            columns,
            rows,
            samples,
        }
    }

    /// Multiply every sample by `factor`.
    pub fn scale(&mut self, factor: f32) {
        for s in &mut self.samples {
            *s *= factor;
        }
    }

    /// Smallest and largest sample.
    pub fn min_max(&self) -> (f32, f32) {
        self.samples
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &s| {
                (lo.min(s), hi.max(s))
            })
    }
}
