// Distributed under the GNU Affero General Public License v3.0 or later.
// See accompanying file LICENSE or https://www.gnu.org/licenses/agpl-3.0.html for details.

use glam::DVec3;

use crate::math::{is_same_direction, perpendicular_toward, triangle_normal};
use crate::physics::{
    CollisionError,
    simplex::Simplex,
    support::{support, validate_hulls},
};
use crate::settings::{CollisionSettings, NonConvergencePolicy};

/// Distance from the origin to the current line or triangle, relative to the feature's
/// extent, below which the origin counts as lying on it.
const FEATURE_TOLERANCE: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq)]
pub struct GjkHit {
    /// Simplex enclosing (or touching) the origin, seed for EPA.
    pub simplex: Simplex,
    /// `false` when the iteration bound ran out and the hit is only assumed.
    pub converged: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GjkResult {
    NoIntersection,
    Intersection(GjkHit),
}

/// Decides whether the convex hulls of `hull1` and `hull2` overlap by searching their
/// Minkowski difference for the origin.
pub fn gjk_intersect(
    hull1: &[DVec3],
    hull2: &[DVec3],
    settings: &CollisionSettings,
) -> Result<GjkResult, CollisionError> {
    validate_hulls(hull1, hull2)?;

    let first = support(hull1, hull2, settings.gjk.initial_direction)?;
    let mut simplex = Simplex::new(first);
    let mut direction = -first.minkowski();

    for _ in 0..settings.gjk.max_iterations {
        if origin_on_feature(&simplex, direction) {
            return Ok(GjkResult::Intersection(GjkHit {
                simplex,
                converged: true,
            }));
        }

        let a = support(hull1, hull2, direction)?;
        // Nothing beyond the origin along the search direction: a separating plane exists.
        if a.minkowski().dot(direction) <= 0.0 {
            return Ok(GjkResult::NoIntersection);
        }

        simplex.push(a);
        if reduce_simplex(&mut simplex, &mut direction) {
            return Ok(GjkResult::Intersection(GjkHit {
                simplex,
                converged: true,
            }));
        }
    }

    match settings.gjk.non_convergence {
        NonConvergencePolicy::AssumeIntersection => {
            log::warn!(
                "GJK did not converge after {} iterations, assuming intersection",
                settings.gjk.max_iterations
            );
            Ok(GjkResult::Intersection(GjkHit {
                simplex,
                converged: false,
            }))
        }
        NonConvergencePolicy::Report => Err(CollisionError::NonConvergence {
            iterations: settings.gjk.max_iterations,
        }),
    }
}

/// Whether the origin lies on the line or triangle spanned by `simplex`, measured along
/// the search direction and scaled by the feature's largest edge from the newest vertex.
fn origin_on_feature(simplex: &Simplex, direction: DVec3) -> bool {
    if simplex.len() < 2 {
        return false;
    }
    let Some(normal) = direction.try_normalize() else {
        return true;
    };

    let a = simplex[simplex.len() - 1].minkowski();
    let extent_squared = simplex
        .vertices()
        .iter()
        .map(|v| v.minkowski().distance_squared(a))
        .fold(0.0, f64::max);

    a.dot(normal).abs() <= FEATURE_TOLERANCE * extent_squared.sqrt()
}

/// Drops the vertices that are not part of the feature closest to the origin and points
/// `direction` from that feature toward the origin. Returns `true` once a tetrahedron
/// contains the origin.
pub fn reduce_simplex(simplex: &mut Simplex, direction: &mut DVec3) -> bool {
    match simplex.len() {
        2 => reduce_line(simplex, direction),
        3 => reduce_triangle(simplex, direction),
        4 => reduce_tetrahedron(simplex, direction),
        _ => false,
    }
}

fn reduce_line(simplex: &mut Simplex, direction: &mut DVec3) -> bool {
    let a = simplex[1].minkowski();
    let b = simplex[0].minkowski();
    let ab = b - a;
    let ao = -a;

    if is_same_direction(ab, ao) {
        *direction = perpendicular_toward(ab, ao);
    } else {
        simplex.keep(&[1]);
        *direction = ao;
    }

    false
}

fn reduce_triangle(simplex: &mut Simplex, direction: &mut DVec3) -> bool {
    let a = simplex[2].minkowski();
    let b = simplex[1].minkowski();
    let c = simplex[0].minkowski();
    let ab = b - a;
    let ac = c - a;
    let ao = -a;
    let abc = ab.cross(ac);

    if is_same_direction(abc.cross(ac), ao) {
        if is_same_direction(ac, ao) {
            simplex.keep(&[0, 2]);
            *direction = perpendicular_toward(ac, ao);
        } else {
            reduce_to_ab_or_a(simplex, ab, ao, direction);
        }
    } else if is_same_direction(ab.cross(abc), ao) {
        reduce_to_ab_or_a(simplex, ab, ao, direction);
    } else if is_same_direction(abc, ao) {
        *direction = abc;
    } else {
        // Below the face: swap b and c so the kept winding faces the origin.
        simplex.keep(&[1, 0, 2]);
        *direction = -abc;
    }

    false
}

fn reduce_to_ab_or_a(simplex: &mut Simplex, ab: DVec3, ao: DVec3, direction: &mut DVec3) {
    if is_same_direction(ab, ao) {
        simplex.keep(&[1, 2]);
        *direction = perpendicular_toward(ab, ao);
    } else {
        simplex.keep(&[2]);
        *direction = ao;
    }
}

fn reduce_tetrahedron(simplex: &mut Simplex, direction: &mut DVec3) -> bool {
    let a = simplex[3].minkowski();
    let b = simplex[2].minkowski();
    let c = simplex[1].minkowski();
    let d = simplex[0].minkowski();

    // Faces sharing the newest vertex, each with its opposite vertex and the
    // simplex indices that form it (newest last).
    let faces = [
        ([a, b, c], d, [1, 2, 3]),
        ([a, c, d], b, [0, 1, 3]),
        ([a, b, d], c, [0, 2, 3]),
    ];

    for ([p, q, r], opposite, kept) in faces {
        if origin_outside_face(p, q, r, opposite) {
            simplex.keep(&kept);
            return reduce_triangle(simplex, direction);
        }
    }

    true
}

/// Whether the origin lies strictly on the outer side of triangle `a, b, c`, where
/// outer is the side away from `opposite`.
fn origin_outside_face(a: DVec3, b: DVec3, c: DVec3, opposite: DVec3) -> bool {
    let mut normal = triangle_normal(a, b, c);
    if is_same_direction(normal, opposite - a) {
        normal = -normal;
    }
    is_same_direction(normal, -a)
}
