// Distributed under the GNU Affero General Public License v3.0 or later.
// See accompanying file LICENSE or https://www.gnu.org/licenses/agpl-3.0.html for details.

use glam::DVec3;

use crate::math::{barycentric, cartesian};
use crate::physics::{
    CollisionError,
    simplex::{Face, Simplex},
    support::support,
    support_point::SupportPoint,
};
use crate::settings::CollisionSettings;

#[derive(Clone, Debug, PartialEq)]
pub struct EpaResult {
    /// Contact point on the first hull.
    pub first_poc: DVec3,
    /// Contact point on the second hull.
    pub second_poc: DVec3,
    /// Unit normal of the polytope face closest to the origin, pointing from the first
    /// hull toward the second.
    pub penetration_normal: DVec3,
    pub penetration_depth: f64,
    /// `penetration_normal * penetration_depth`.
    pub intersection_vector: DVec3,
}

/// Expands the GJK simplex into a polytope until its face nearest to the origin lies on
/// the boundary of the Minkowski difference, then maps that face back onto both hulls.
pub fn epa(
    hull1: &[DVec3],
    hull2: &[DVec3],
    mut simplex: Simplex,
    settings: &CollisionSettings,
) -> Result<EpaResult, CollisionError> {
    simplex.triangulate(settings.epa.synthetic_offset)?;

    let mut iterations = 0;
    loop {
        let face = simplex
            .find_closest_face()
            .ok_or(CollisionError::DegeneratePolytope {
                vertices: simplex.len(),
            })?;

        let point = support(hull1, hull2, face.normal)?;
        let depth = point.minkowski().dot(face.normal).abs();
        iterations += 1;

        if depth - face.distance < settings.epa.tolerance || !simplex.extend(point) {
            return Ok(contact_from_face(&simplex, &face, point, depth));
        }

        if iterations >= settings.epa.max_iterations {
            log::warn!("EPA stopped after {iterations} iterations at depth {depth}");
            return Ok(contact_from_face(&simplex, &face, point, depth));
        }
    }
}

fn contact_from_face(simplex: &Simplex, face: &Face, point: SupportPoint, depth: f64) -> EpaResult {
    let [i, j, k] = face.indices;
    let (a, b, c) = (simplex[i], simplex[j], simplex[k]);

    let weights = barycentric(point.minkowski(), a.minkowski(), b.minkowski(), c.minkowski());

    EpaResult {
        first_poc: cartesian(weights, a.hull1_point(), b.hull1_point(), c.hull1_point()),
        second_poc: cartesian(weights, a.hull2_point(), b.hull2_point(), c.hull2_point()),
        penetration_normal: face.normal,
        penetration_depth: depth,
        intersection_vector: face.normal * depth,
    }
}
