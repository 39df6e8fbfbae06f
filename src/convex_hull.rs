// Distributed under the GNU Affero General Public License v3.0 or later.
// See accompanying file LICENSE or https://www.gnu.org/licenses/agpl-3.0.html for details.

use glam::{DAffine3, DVec3};

/// Axis-aligned bounding box in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: DVec3,
    pub max: DVec3,
}

impl Aabb {
    /// Bounds of `points`, or `None` for an empty slice.
    pub fn from_points(points: &[DVec3]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut min = *first;
        let mut max = *first;

        for point in rest {
            min = min.min(*point);
            max = max.max(*point);
        }

        Some(Self { min, max })
    }

    /// Boxes that only touch count as intersecting.
    pub fn intersects(&self, other: &Aabb) -> bool {
        (self.min.x <= other.max.x && self.max.x >= other.min.x)
            && (self.min.y <= other.max.y && self.max.y >= other.min.y)
            && (self.min.z <= other.max.z && self.max.z >= other.min.z)
    }

    pub fn center(&self) -> DVec3 {
        (self.min + self.max) * 0.5
    }
}

/// Point cloud whose convex hull is the collision shape. The points are used as-is:
/// interior points and duplicates are harmless to the support mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConvexHull {
    vertices: Vec<DVec3>,
}

impl ConvexHull {
    pub fn from_points(vertices: Vec<DVec3>) -> Self {
        Self { vertices }
    }

    /// Box with edge lengths `size`, centered on the origin.
    pub fn cuboid(size: DVec3) -> Self {
        let half = size * 0.5;
        let mut vertices = Vec::with_capacity(8);
        for x in [-half.x, half.x] {
            for y in [-half.y, half.y] {
                for z in [-half.z, half.z] {
                    vertices.push(DVec3::new(x, y, z));
                }
            }
        }
        Self { vertices }
    }

    pub fn cube(size: f64) -> Self {
        Self::cuboid(DVec3::splat(size))
    }

    /// Triangle `a, b, c` swept by `height` along +Z.
    pub fn triangle_prism(a: DVec3, b: DVec3, c: DVec3, height: f64) -> Self {
        let lift = DVec3::Z * height;
        Self {
            vertices: vec![a, b, c, a + lift, b + lift, c + lift],
        }
    }

    pub fn vertices(&self) -> &[DVec3] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn translated(&self, offset: DVec3) -> Self {
        Self {
            vertices: self.vertices.iter().map(|v| *v + offset).collect(),
        }
    }

    /// Copy of the hull with every point mapped through `transform`.
    pub fn transformed(&self, transform: DAffine3) -> Self {
        Self {
            vertices: self
                .vertices
                .iter()
                .map(|v| transform.transform_point3(*v))
                .collect(),
        }
    }

    pub fn aabb(&self) -> Option<Aabb> {
        Aabb::from_points(&self.vertices)
    }

    /// Mean of the hull's points.
    pub fn centroid(&self) -> Option<DVec3> {
        if self.vertices.is_empty() {
            return None;
        }
        let sum: DVec3 = self.vertices.iter().copied().sum();
        Some(sum / self.vertices.len() as f64)
    }
}

impl From<Vec<DVec3>> for ConvexHull {
    fn from(vertices: Vec<DVec3>) -> Self {
        Self::from_points(vertices)
    }
}
