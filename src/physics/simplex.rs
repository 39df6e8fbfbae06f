// Distributed under the GNU Affero General Public License v3.0 or later.
// See accompanying file LICENSE or https://www.gnu.org/licenses/agpl-3.0.html for details.

use std::collections::HashMap;
use std::ops::Index;

use glam::DVec3;

use crate::math::{is_same_direction, triangle_normal};
use crate::physics::{CollisionError, support_point::SupportPoint};

/// A triangle of the expanding polytope together with its plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Face {
    pub indices: [usize; 3],
    /// Outward unit normal.
    pub normal: DVec3,
    /// Distance from the origin to the face's plane.
    pub distance: f64,
}

/// Ordered set of support points. During GJK it holds 1 to 4 points with the most
/// recently added one last; after [`Simplex::triangulate`] it becomes the vertex arena
/// of the EPA polytope and additionally owns the polytope's outward-facing triangles.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Simplex {
    vertices: Vec<SupportPoint>,
    faces: Vec<[usize; 3]>,
}

impl Simplex {
    pub fn new(first: SupportPoint) -> Self {
        let mut vertices = Vec::with_capacity(4);
        vertices.push(first);
        Self {
            vertices,
            faces: Vec::new(),
        }
    }

    pub fn from_points(points: &[SupportPoint]) -> Self {
        Self {
            vertices: points.to_vec(),
            faces: Vec::new(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn vertices(&self) -> &[SupportPoint] {
        &self.vertices
    }

    pub fn faces(&self) -> &[[usize; 3]] {
        &self.faces
    }

    pub fn push(&mut self, point: SupportPoint) {
        self.vertices.push(point);
    }

    /// Keeps only the vertices at `indices`, in that order.
    pub fn keep(&mut self, indices: &[usize]) {
        let kept: Vec<SupportPoint> = indices.iter().map(|&i| self.vertices[i]).collect();
        self.vertices = kept;
    }

    /// Unnormalized outward normal of `face`.
    pub fn face_normal(&self, face: [usize; 3]) -> DVec3 {
        triangle_normal(
            self.vertices[face[0]].minkowski(),
            self.vertices[face[1]].minkowski(),
            self.vertices[face[2]].minkowski(),
        )
    }

    /// Turns the converged GJK simplex into a tetrahedron with four outward faces.
    ///
    /// Lines and triangles are first promoted to a tetrahedron by adding synthetic points
    /// near the origin, `synthetic_offset` away from it.
    pub fn triangulate(&mut self, synthetic_offset: f64) -> Result<(), CollisionError> {
        match self.vertices.len() {
            2 => self.promote_line(synthetic_offset),
            3 => self.promote_triangle(synthetic_offset),
            4 => {}
            len => return Err(CollisionError::InvalidSimplex { len }),
        }

        self.faces = vec![
            self.outward_face(0, 1, 2, 3),
            self.outward_face(0, 3, 1, 2),
            self.outward_face(0, 2, 3, 1),
            self.outward_face(1, 3, 2, 0),
        ];
        debug_assert!(self.is_watertight(), "tetrahedron faces are inconsistently wound");
        Ok(())
    }

    fn promote_line(&mut self, offset: f64) {
        let a = self.vertices[0];
        let b = self.vertices[1];
        let ba = a.minkowski() - b.minkowski();
        let bo = -b.minkowski();

        let axis = ba.try_normalize().unwrap_or(DVec3::X);
        let first = ba
            .cross(bo)
            .try_normalize()
            .unwrap_or_else(|| axis.any_orthonormal_vector());
        let second = axis.cross(first);

        log::debug!("Promoting a 2-point simplex to a tetrahedron");
        for direction in [first, second] {
            let point = direction * offset;
            let anchor = self.nearest_vertex(point);
            self.vertices.push(SupportPoint::synthetic(point, &anchor));
        }
    }

    fn promote_triangle(&mut self, offset: f64) {
        let a = self.vertices[0].minkowski();
        let b = self.vertices[1].minkowski();
        let c = self.vertices[2].minkowski();

        let normal = triangle_normal(a, b, c).try_normalize().unwrap_or_else(|| {
            (b - a)
                .try_normalize()
                .unwrap_or(DVec3::X)
                .any_orthonormal_vector()
        });

        // Step through the origin, away from the triangle's plane.
        let side = if normal.dot(a) > 0.0 { -1.0 } else { 1.0 };
        let point = normal * (side * offset);

        log::debug!("Promoting a 3-point simplex to a tetrahedron");
        let anchor = self.nearest_vertex(point);
        self.vertices.push(SupportPoint::synthetic(point, &anchor));
    }

    fn nearest_vertex(&self, point: DVec3) -> SupportPoint {
        let mut nearest = self.vertices[0];
        for vertex in &self.vertices[1..] {
            if vertex.minkowski().distance_squared(point)
                < nearest.minkowski().distance_squared(point)
            {
                nearest = *vertex;
            }
        }
        nearest
    }

    /// Winds `a, b, c` so the face normal points away from `opposite`.
    fn outward_face(&self, a: usize, b: usize, c: usize, opposite: usize) -> [usize; 3] {
        let height = self.vertices[opposite].minkowski() - self.vertices[a].minkowski();
        let face = if is_same_direction(self.face_normal([a, b, c]), height) {
            [a, c, b]
        } else {
            [a, b, c]
        };
        debug_assert!(
            !is_same_direction(self.face_normal(face), height),
            "face {face:?} still faces its opposite vertex"
        );
        face
    }

    /// The face whose plane is nearest to the origin. Ties keep the first face found.
    /// Faces with zero area are skipped; `None` means no usable face is left.
    pub fn find_closest_face(&self) -> Option<Face> {
        let mut closest: Option<Face> = None;

        for &indices in &self.faces {
            let Some(normal) = self.face_normal(indices).try_normalize() else {
                continue;
            };
            let distance = normal.dot(self.vertices[indices[0]].minkowski()).abs();

            if closest.is_none_or(|face| distance < face.distance) {
                closest = Some(Face {
                    indices,
                    normal,
                    distance,
                });
            }
        }

        closest
    }

    /// Adds `point` to the polytope, replacing every face that can see it with a fan of
    /// faces around the horizon. Returns `false`, leaving the polytope untouched, when the
    /// point is already a vertex.
    pub fn extend(&mut self, point: SupportPoint) -> bool {
        if self
            .vertices
            .iter()
            .any(|v| v.minkowski() == point.minkowski())
        {
            return false;
        }

        let new_index = self.vertices.len();
        self.vertices.push(point);

        let vertices = &self.vertices;
        let p = point.minkowski();
        let mut horizon: Vec<(usize, usize)> = Vec::new();

        self.faces.retain(|&[a, b, c]| {
            let normal = triangle_normal(
                vertices[a].minkowski(),
                vertices[b].minkowski(),
                vertices[c].minkowski(),
            );
            if is_same_direction(normal, p - vertices[a].minkowski()) {
                add_edge(&mut horizon, a, b);
                add_edge(&mut horizon, b, c);
                add_edge(&mut horizon, c, a);
                false
            } else {
                true
            }
        });

        for (a, b) in horizon {
            self.faces.push([new_index, a, b]);
        }

        true
    }

    /// Every directed edge appears once and its reverse appears once.
    pub fn is_watertight(&self) -> bool {
        let mut edges: HashMap<(usize, usize), usize> = HashMap::new();
        for &[a, b, c] in &self.faces {
            for edge in [(a, b), (b, c), (c, a)] {
                *edges.entry(edge).or_default() += 1;
            }
        }

        edges
            .iter()
            .all(|(&(a, b), &count)| count == 1 && edges.get(&(b, a)) == Some(&1))
    }
}

impl Index<usize> for Simplex {
    type Output = SupportPoint;

    fn index(&self, index: usize) -> &Self::Output {
        &self.vertices[index]
    }
}

/// Adds the directed edge `a -> b`, or cancels it against an already collected `b -> a`.
fn add_edge(edges: &mut Vec<(usize, usize)>, a: usize, b: usize) {
    if let Some(index) = edges.iter().position(|&(u, v)| u == b && v == a) {
        edges.remove(index);
    } else {
        edges.push((a, b));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn point(x: f64, y: f64, z: f64) -> SupportPoint {
        SupportPoint::new(DVec3::new(x, y, z), DVec3::ZERO)
    }

    fn tetrahedron() -> Simplex {
        Simplex::from_points(&[
            point(1.0, 1.0, 1.0),
            point(-1.0, -1.0, 1.0),
            point(-1.0, 1.0, -1.0),
            point(1.0, -1.0, -1.0),
        ])
    }

    fn centroid(simplex: &Simplex) -> DVec3 {
        let sum: DVec3 = simplex.vertices().iter().map(|v| v.minkowski()).sum();
        sum / simplex.len() as f64
    }

    fn assert_faces_point_outward(simplex: &Simplex) {
        let center = centroid(simplex);
        for &face in simplex.faces() {
            let normal = simplex.face_normal(face);
            let to_face = simplex[face[0]].minkowski() - center;
            assert!(
                normal.dot(to_face) > 0.0,
                "face {face:?} points toward the centroid"
            );
        }
    }

    fn random_unit_vector(rng: &mut StdRng) -> DVec3 {
        loop {
            let v = DVec3::new(
                rng.random_range(-1.0..1.0),
                rng.random_range(-1.0..1.0),
                rng.random_range(-1.0..1.0),
            );
            let len_sq = v.length_squared();
            if len_sq > 0.01 && len_sq <= 1.0 {
                return v.normalize();
            }
        }
    }

    #[test]
    fn keep_reorders_and_drops_vertices() {
        let mut simplex = tetrahedron();
        simplex.keep(&[0, 2, 3]);
        assert_eq!(simplex.len(), 3);
        assert_eq!(simplex[0].minkowski(), DVec3::new(1.0, 1.0, 1.0));
        assert_eq!(simplex[1].minkowski(), DVec3::new(-1.0, 1.0, -1.0));
        assert_eq!(simplex[2].minkowski(), DVec3::new(1.0, -1.0, -1.0));
    }

    #[test]
    fn triangulate_tetrahedron_faces_point_outward() {
        let mut simplex = tetrahedron();
        simplex.triangulate(1e-5).unwrap();
        assert_eq!(simplex.faces().len(), 4);
        assert!(simplex.is_watertight());
        assert_faces_point_outward(&simplex);
    }

    #[test]
    fn triangulate_handles_either_input_winding() {
        let mut simplex = Simplex::from_points(&[
            point(1.0, 1.0, 1.0),
            point(-1.0, 1.0, -1.0),
            point(-1.0, -1.0, 1.0),
            point(1.0, -1.0, -1.0),
        ]);
        simplex.triangulate(1e-5).unwrap();
        assert!(simplex.is_watertight());
        assert_faces_point_outward(&simplex);
    }

    #[test]
    fn triangulate_promotes_line() {
        let mut simplex =
            Simplex::from_points(&[point(-1.0, 0.0, 0.0), point(2.0, 0.0, 0.0)]);
        simplex.triangulate(1e-3).unwrap();

        assert_eq!(simplex.len(), 4);
        assert_eq!(simplex.faces().len(), 4);
        assert!(simplex.is_watertight());
        assert_faces_point_outward(&simplex);

        for synthetic in &simplex.vertices()[2..] {
            assert_relative_eq!(synthetic.minkowski().length(), 1e-3, epsilon = 1e-12);
            assert_relative_eq!(synthetic.minkowski().x, 0.0, epsilon = 1e-12);
            assert_eq!(
                synthetic.hull1_point() - synthetic.hull2_point(),
                synthetic.minkowski()
            );
        }
    }

    #[test]
    fn triangulate_promotes_line_off_the_origin() {
        let mut simplex =
            Simplex::from_points(&[point(-1.0, 0.5, 0.0), point(2.0, 0.5, 0.0)]);
        simplex.triangulate(1e-3).unwrap();
        assert_eq!(simplex.len(), 4);
        assert!(simplex.is_watertight());
        assert_faces_point_outward(&simplex);
    }

    #[test]
    fn triangulate_promotes_triangle_through_the_origin() {
        let mut simplex = Simplex::from_points(&[
            point(-1.0, -1.0, 0.5),
            point(2.0, -1.0, 0.5),
            point(-1.0, 2.0, 0.5),
        ]);
        simplex.triangulate(1e-3).unwrap();

        assert_eq!(simplex.len(), 4);
        let synthetic = simplex[3].minkowski();
        // Plane sits at z = 0.5, so the new point lands just below the origin.
        assert_relative_eq!(synthetic.z, -1e-3, epsilon = 1e-12);
        assert_relative_eq!(synthetic.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(synthetic.y, 0.0, epsilon = 1e-12);
        assert!(simplex.is_watertight());
        assert_faces_point_outward(&simplex);
    }

    #[test]
    fn triangulate_rejects_unsupported_sizes() {
        let mut single = Simplex::new(point(1.0, 0.0, 0.0));
        assert_eq!(
            single.triangulate(1e-5),
            Err(CollisionError::InvalidSimplex { len: 1 })
        );

        let mut five = tetrahedron();
        five.push(point(0.0, 0.0, 3.0));
        assert_eq!(
            five.triangulate(1e-5),
            Err(CollisionError::InvalidSimplex { len: 5 })
        );
    }

    #[test]
    fn closest_face_is_nearest_plane() {
        let mut simplex = Simplex::from_points(&[
            point(-1.0, -1.0, -0.25),
            point(2.0, -1.0, -0.25),
            point(-1.0, 2.0, -0.25),
            point(0.0, 0.0, 3.0),
        ]);
        simplex.triangulate(1e-5).unwrap();

        let face = simplex.find_closest_face().unwrap();
        assert_relative_eq!(face.distance, 0.25, epsilon = 1e-12);
        assert_relative_eq!(face.normal.z, -1.0, epsilon = 1e-12);
        assert!(face.indices.contains(&0));
        assert!(face.indices.contains(&1));
        assert!(face.indices.contains(&2));
    }

    #[test]
    fn closest_face_of_untriangulated_simplex_is_none() {
        let simplex = tetrahedron();
        assert_eq!(simplex.find_closest_face(), None);
    }

    #[test]
    fn extend_with_duplicate_is_a_no_op() {
        let mut simplex = tetrahedron();
        simplex.triangulate(1e-5).unwrap();
        let vertices_before = simplex.vertices().to_vec();
        let faces_before = simplex.faces().to_vec();

        let duplicate = point(-1.0, 1.0, -1.0);
        assert!(!simplex.extend(duplicate));
        assert_eq!(simplex.vertices(), vertices_before.as_slice());
        assert_eq!(simplex.faces(), faces_before.as_slice());
    }

    #[test]
    fn extend_replaces_visible_face_with_fan() {
        let mut simplex = tetrahedron();
        simplex.triangulate(1e-5).unwrap();

        // Beyond the face opposite (1, 1, 1) only.
        assert!(simplex.extend(point(-2.0, -2.0, -2.0)));
        assert_eq!(simplex.len(), 5);
        assert_eq!(simplex.faces().len(), 6);
        assert!(simplex.is_watertight());
        assert_faces_point_outward(&simplex);
        assert!(simplex.faces().iter().filter(|f| f.contains(&4)).count() == 3);
    }

    #[test]
    fn extend_with_interior_point_keeps_faces() {
        let mut simplex = tetrahedron();
        simplex.triangulate(1e-5).unwrap();
        let faces_before = simplex.faces().to_vec();

        assert!(simplex.extend(point(0.0, 0.0, 0.1)));
        assert_eq!(simplex.len(), 5);
        assert_eq!(simplex.faces(), faces_before.as_slice());
    }

    #[test]
    fn repeated_extension_stays_watertight_and_convex() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let mut seed = Vec::with_capacity(4);
        for _ in 0..4 {
            seed.push(SupportPoint::new(random_unit_vector(&mut rng), DVec3::ZERO));
        }
        let mut simplex = Simplex::from_points(&seed);
        simplex.triangulate(1e-5).unwrap();

        for _ in 0..60 {
            let p = SupportPoint::new(random_unit_vector(&mut rng), DVec3::ZERO);
            assert!(simplex.extend(p));
            assert!(simplex.is_watertight());
            assert_faces_point_outward(&simplex);
        }

        // Points on a sphere are all hull vertices: F = 2V - 4.
        assert_eq!(simplex.faces().len(), 2 * simplex.len() - 4);
    }
}
