use glam::{Mat4, Vec3};

use crate::math::ray::Ray;

/// Axis-aligned bounding box. An empty box has `min > max` on every axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub const EMPTY: Aabb = Aabb {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    pub fn new(point1: Vec3, point2: Vec3) -> Aabb {
        let min = point1.min(point2);
        let max = point1.max(point2);
        Aabb { min, max }
    }

    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Aabb {
        points.into_iter().fold(Self::EMPTY, |mut aabb, point| {
            aabb.expand_to_point(point);
            aabb
        })
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn expand_to_point(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        if self.is_empty() {
            return Vec3::ZERO;
        }

        self.max - self.min
    }

    pub fn corners(&self) -> [Vec3; 8] {
        [
            Vec3::new(self.min.x, self.min.y, self.min.z),
            Vec3::new(self.max.x, self.min.y, self.min.z),
            Vec3::new(self.min.x, self.max.y, self.min.z),
            Vec3::new(self.max.x, self.max.y, self.min.z),
            Vec3::new(self.min.x, self.min.y, self.max.z),
            Vec3::new(self.max.x, self.min.y, self.max.z),
            Vec3::new(self.min.x, self.max.y, self.max.z),
            Vec3::new(self.max.x, self.max.y, self.max.z),
        ]
    }

    /// Bounds of this box after transforming all eight corners.
    pub fn transformed(&self, matrix: &Mat4) -> Aabb {
        if self.is_empty() {
            return *self;
        }

        Aabb::from_points(
            self.corners()
                .map(|corner| matrix.transform_point3(corner)),
        )
    }

    /// Slab test. Returns the distance along the ray to the first point inside the box.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        if self.is_empty() {
            return None;
        }

        let inv_dir = ray.direction.recip();
        let t0 = (self.min - ray.origin) * inv_dir;
        let t1 = (self.max - ray.origin) * inv_dir;

        let t_near = t0.min(t1).max_element();
        let t_far = t0.max(t1).min_element();

        if t_near <= t_far && t_far >= 0.0 {
            Some(t_near.max(0.0))
        } else {
            None
        }
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_points() {
        let aabb = Aabb::from_points([
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(-1.0, -2.0, -1.0),
        ]);

        assert_eq!(aabb.min, Vec3::new(-1.0, -2.0, -1.0));
        assert_eq!(aabb.max, Vec3::new(1.0, 1.0, 1.0));
        assert_eq!(aabb.size(), Vec3::new(2.0, 3.0, 2.0));
        assert_eq!(aabb.center(), Vec3::new(0.0, -0.5, 0.0));
    }

    #[test]
    fn test_empty_box() {
        let aabb = Aabb::from_points([]);
        assert!(aabb.is_empty());
        assert_eq!(aabb.size(), Vec3::ZERO);

        let ray = Ray::new(Vec3::ZERO, Vec3::Z);
        assert!(aabb.intersect_ray(&ray).is_none());
    }

    #[test]
    fn test_ray_intersection() {
        let aabb = Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0));

        let hit = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::Z);
        assert_eq!(aabb.intersect_ray(&hit), Some(4.0));

        let miss = Ray::new(Vec3::new(5.0, 0.0, -5.0), Vec3::Z);
        assert!(aabb.intersect_ray(&miss).is_none());

        let behind = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::Z);
        assert!(aabb.intersect_ray(&behind).is_none());

        let inside = Ray::new(Vec3::ZERO, Vec3::X);
        assert_eq!(aabb.intersect_ray(&inside), Some(0.0));
    }

    #[test]
    fn test_transformed() {
        let aabb = Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0));
        let matrix = Mat4::from_scale_rotation_translation(
            Vec3::splat(2.0),
            glam::Quat::IDENTITY,
            Vec3::new(0.0, 3.0, 0.0),
        );

        let transformed = aabb.transformed(&matrix);
        assert_eq!(transformed.min, Vec3::new(-2.0, 1.0, -2.0));
        assert_eq!(transformed.max, Vec3::new(2.0, 5.0, 2.0));
    }
}
