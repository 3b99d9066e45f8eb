//! Height sources for extrusion.

use insole_field::HeightField;

/// A surface height over the outline plane.
///
/// `rim_height` is used for outline (boundary) points and defaults to
/// `height`.
pub trait HeightMap: Sync {
    /// Height at an interior point.
    fn height(&self, x: f64, y: f64) -> f64;

    /// Height at an outline point.
    fn rim_height(&self, x: f64, y: f64) -> f64 {
        self.height(x, y)
    }
}

impl HeightMap for HeightField {
    fn height(&self, x: f64, y: f64) -> f64 {
        Self::height(self, x, y)
    }

    fn rim_height(&self, x: f64, y: f64) -> f64 {
        Self::rim_height(self, x, y)
    }
}

/// A constant height.
impl HeightMap for f64 {
    fn height(&self, _x: f64, _y: f64) -> f64 {
        *self
    }
}

impl<M: HeightMap + ?Sized> HeightMap for &M {
    fn height(&self, x: f64, y: f64) -> f64 {
        (**self).height(x, y)
    }

    fn rim_height(&self, x: f64, y: f64) -> f64 {
        (**self).rim_height(x, y)
    }
}

/// A map shifted by a constant.
///
/// The shifted map is evaluated at interior points only: an offset surface
/// lies on a different outline than the one its source was sampled for, so
/// the source rim values do not apply.
#[derive(Debug, Clone, Copy)]
pub struct Offset<M> {
    /// Source map.
    pub map: M,
    /// Added to every height.
    pub offset: f64,
}

impl<M> Offset<M> {
    /// Shift `map` by `offset`.
    pub const fn new(map: M, offset: f64) -> Self {
        Self { map, offset }
    }
}

impl<M: HeightMap> HeightMap for Offset<M> {
    fn height(&self, x: f64, y: f64) -> f64 {
        self.map.height(x, y) + self.offset
    }
}
