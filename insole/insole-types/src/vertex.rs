//! Vertex type.

use nalgebra::{Point3, Vector3};

/// A mesh vertex: a position and an optional unit normal.
///
/// Normals are only filled in by the cleanup pass (see `insole-repair`) and
/// consumed by the visualization export; geometry stages work on positions.
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    /// Position in millimeters.
    pub position: Point3<f64>,
    /// Area-weighted unit normal, if computed.
    pub normal: Option<Vector3<f64>>,
}

impl Vertex {
    /// Create a vertex at the given position with no normal.
    #[inline]
    #[must_use]
    pub const fn new(position: Point3<f64>) -> Self {
        Self {
            position,
            normal: None,
        }
    }

    /// Create a vertex from raw coordinates.
    ///
    /// # Example
    ///
    /// ```
    /// use insole_types::Vertex;
    ///
    /// let v = Vertex::from_coords(1.0, 2.0, 3.0);
    /// assert_eq!(v.position.y, 2.0);
    /// assert!(v.normal.is_none());
    /// ```
    #[inline]
    #[must_use]
    pub fn from_coords(x: f64, y: f64, z: f64) -> Self {
        Self::new(Point3::new(x, y, z))
    }

    /// Builder-style normal assignment.
    #[inline]
    #[must_use]
    pub const fn with_normal(mut self, normal: Vector3<f64>) -> Self {
        self.normal = Some(normal);
        self
    }
}

impl From<Point3<f64>> for Vertex {
    fn from(position: Point3<f64>) -> Self {
        Self::new(position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_point_has_no_normal() {
        let v: Vertex = Point3::new(1.0, 1.0, 1.0).into();
        assert!(v.normal.is_none());
    }

    #[test]
    fn with_normal_sets_normal() {
        let v = Vertex::from_coords(0.0, 0.0, 0.0).with_normal(Vector3::z());
        assert_eq!(v.normal, Some(Vector3::z()));
    }
}
