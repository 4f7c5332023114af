use crate::{Interval, Vec3};

/// Axis-Aligned Bounding Box.
///
/// An AABB is defined by three intervals (one per axis) that bound a 3D volume.
/// Unlike a box meant for ray traversal it is never padded: the extent of a flat
/// panel really is zero along its thin axis, and placement relies on that.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub x: Interval,
    pub y: Interval,
    pub z: Interval,
}

impl Aabb {
    /// Create an AABB from two corner points.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        let x = Interval::new(a.x.min(b.x), a.x.max(b.x));
        let y = Interval::new(a.y.min(b.y), a.y.max(b.y));
        let z = Interval::new(a.z.min(b.z), a.z.max(b.z));
        Self { x, y, z }
    }

    /// Exact bounds of a point set, `None` when there are no points.
    pub fn enclosing<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Vec3>,
    {
        let mut bounds = Self::EMPTY;
        for p in points {
            bounds.x.include(p.x);
            bounds.y.include(p.y);
            bounds.z.include(p.z);
        }

        if bounds.is_empty() {
            None
        } else {
            Some(bounds)
        }
    }

    /// Create an AABB that surrounds two other AABBs.
    pub fn surrounding(box0: &Aabb, box1: &Aabb) -> Self {
        Self {
            x: Interval::surrounding(&box0.x, &box1.x),
            y: Interval::surrounding(&box0.y, &box1.y),
            z: Interval::surrounding(&box0.z, &box1.z),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty() || self.y.is_empty() || self.z.is_empty()
    }

    pub fn min(&self) -> Vec3 {
        Vec3::new(self.x.min, self.y.min, self.z.min)
    }

    pub fn max(&self) -> Vec3 {
        Vec3::new(self.x.max, self.y.max, self.z.max)
    }

    /// Size of the box along each axis.
    pub fn extent(&self) -> Vec3 {
        Vec3::new(self.x.size(), self.y.size(), self.z.size())
    }

    /// Returns the center point of the bounding box.
    pub fn centroid(&self) -> Vec3 {
        Vec3::new(self.x.center(), self.y.center(), self.z.center())
    }

    /// The 8 corners, min corner first.
    pub fn corners(&self) -> [Vec3; 8] {
        [
            Vec3::new(self.x.min, self.y.min, self.z.min),
            Vec3::new(self.x.max, self.y.min, self.z.min),
            Vec3::new(self.x.min, self.y.max, self.z.min),
            Vec3::new(self.x.max, self.y.max, self.z.min),
            Vec3::new(self.x.min, self.y.min, self.z.max),
            Vec3::new(self.x.max, self.y.min, self.z.max),
            Vec3::new(self.x.min, self.y.max, self.z.max),
            Vec3::new(self.x.max, self.y.max, self.z.max),
        ]
    }

    /// Returns true if the point lies inside or on the box.
    pub fn contains(&self, p: Vec3) -> bool {
        self.x.contains(p.x) && self.y.contains(p.y) && self.z.contains(p.z)
    }

    pub const EMPTY: Aabb = Aabb {
        x: Interval::EMPTY,
        y: Interval::EMPTY,
        z: Interval::EMPTY,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aabb_from_points() {
        let aabb = Aabb::from_points(Vec3::new(10.0, 0.0, 10.0), Vec3::new(0.0, 10.0, 0.0));

        assert_eq!(aabb.min(), Vec3::ZERO);
        assert_eq!(aabb.max(), Vec3::splat(10.0));
    }

    #[test]
    fn test_enclosing_bounds_every_point() {
        let points = [
            Vec3::new(-1.0, 4.0, 0.5),
            Vec3::new(3.0, -2.0, 7.0),
            Vec3::new(0.0, 0.0, -6.0),
            Vec3::new(2.5, 1.0, 1.0),
        ];
        let bounds = Aabb::enclosing(points).unwrap();

        for p in points {
            assert!(bounds.contains(p), "{p:?} outside {bounds:?}");
        }
        assert_eq!(bounds.min(), Vec3::new(-1.0, -2.0, -6.0));
        assert_eq!(bounds.max(), Vec3::new(3.0, 4.0, 7.0));
    }

    #[test]
    fn test_enclosing_empty_is_none() {
        assert!(Aabb::enclosing(Vec::<Vec3>::new()).is_none());
    }

    #[test]
    fn test_flat_bounds_are_not_padded() {
        let bounds = Aabb::enclosing([Vec3::ZERO, Vec3::new(1.0, 1.0, 0.0)]).unwrap();
        assert_eq!(bounds.extent(), Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_aabb_surrounding() {
        let box1 = Aabb::from_points(Vec3::ZERO, Vec3::new(5.0, 5.0, 5.0));
        let box2 = Aabb::from_points(Vec3::new(3.0, 3.0, 3.0), Vec3::new(10.0, 10.0, 10.0));
        let surrounding = Aabb::surrounding(&box1, &box2);

        assert_eq!(surrounding.x.min, 0.0);
        assert_eq!(surrounding.x.max, 10.0);
    }

    #[test]
    fn test_surrounding_empty_is_identity() {
        let b = Aabb::from_points(Vec3::ONE, Vec3::splat(2.0));
        assert_eq!(Aabb::surrounding(&Aabb::EMPTY, &b), b);
    }

    #[test]
    fn test_aabb_centroid_and_extent() {
        let aabb = Aabb::from_points(Vec3::new(0.0, -2.0, 4.0), Vec3::new(10.0, 2.0, 5.0));

        assert_eq!(aabb.centroid(), Vec3::new(5.0, 0.0, 4.5));
        assert_eq!(aabb.extent(), Vec3::new(10.0, 4.0, 1.0));
    }
}
