//! Axis-aligned bounding box

use crate::core::types::DVec2;

/// Axis-aligned bounding box defined by min and max corners
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: DVec2,
    pub max: DVec2,
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Aabb {
    /// Inverted box that any `expand` call overwrites.
    pub const EMPTY: Aabb = Aabb {
        min: DVec2::splat(f64::INFINITY),
        max: DVec2::splat(f64::NEG_INFINITY),
    };

    /// Create AABB from min and max corners
    pub fn new(min: DVec2, max: DVec2) -> Self {
        Self { min, max }
    }

    /// Smallest box containing every point.
    pub fn from_points(points: impl IntoIterator<Item = DVec2>) -> Self {
        let mut aabb = Self::EMPTY;
        for p in points {
            aabb.expand(p);
        }
        aabb
    }

    /// True until the first point is added.
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    /// Get center point
    pub fn center(&self) -> DVec2 {
        (self.min + self.max) * 0.5
    }

    /// Get size (max - min)
    pub fn size(&self) -> DVec2 {
        self.max - self.min
    }

    /// Check if point is inside AABB
    pub fn contains_point(&self, p: DVec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x &&
        p.y >= self.min.y && p.y <= self.max.y
    }

    /// Check if two AABBs intersect
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x && self.max.x >= other.min.x &&
        self.min.y <= other.max.y && self.max.y >= other.min.y
    }

    /// Expand AABB to include point
    pub fn expand(&mut self, point: DVec2) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    /// Return merged AABB containing both
    pub fn merged(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Grow every side by `margin`.
    pub fn inflated(&self, margin: f64) -> Aabb {
        Aabb {
            min: self.min - DVec2::splat(margin),
            max: self.max + DVec2::splat(margin),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_and_accessors() {
        let aabb = Aabb::new(DVec2::ZERO, DVec2::ONE);
        assert_eq!(aabb.center(), DVec2::splat(0.5));
        assert_eq!(aabb.size(), DVec2::ONE);
    }

    #[test]
    fn test_contains_point() {
        let aabb = Aabb::new(DVec2::ZERO, DVec2::ONE);
        assert!(aabb.contains_point(DVec2::splat(0.5)));
        assert!(!aabb.contains_point(DVec2::splat(2.0)));
    }

    #[test]
    fn test_intersects() {
        let a = Aabb::new(DVec2::ZERO, DVec2::ONE);
        let b = Aabb::new(DVec2::splat(0.5), DVec2::splat(1.5));
        let c = Aabb::new(DVec2::splat(2.0), DVec2::splat(3.0));
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn test_from_points_and_empty() {
        assert!(Aabb::EMPTY.is_empty());
        let aabb = Aabb::from_points([DVec2::new(1.0, -2.0), DVec2::new(-3.0, 4.0)]);
        assert!(!aabb.is_empty());
        assert_eq!(aabb.min, DVec2::new(-3.0, -2.0));
        assert_eq!(aabb.max, DVec2::new(1.0, 4.0));
    }

    #[test]
    fn test_merged_and_inflated() {
        let a = Aabb::new(DVec2::ZERO, DVec2::ONE);
        let b = Aabb::new(DVec2::splat(2.0), DVec2::splat(3.0));
        let m = a.merged(&b);
        assert_eq!(m.min, DVec2::ZERO);
        assert_eq!(m.max, DVec2::splat(3.0));
        let i = a.inflated(1.0);
        assert_eq!(i.min, DVec2::splat(-1.0));
        assert_eq!(i.max, DVec2::splat(2.0));
    }
}
