// Distributed under the GNU Affero General Public License v3.0 or later.
// See accompanying file LICENSE or https://www.gnu.org/licenses/agpl-3.0.html for details.

use glam::DVec3;

use crate::physics::{CollisionError, HullSide, support_point::SupportPoint};

/// Vertex of `hull` with the largest projection on `direction`.
/// Ties keep the first vertex encountered.
pub fn furthest_point(hull: &[DVec3], direction: DVec3) -> Option<DVec3> {
    let mut best: Option<(DVec3, f64)> = None;

    for &vertex in hull {
        let dot = vertex.dot(direction);
        match best {
            Some((_, max)) if dot <= max => {}
            _ => best = Some((vertex, dot)),
        }
    }

    best.map(|(vertex, _)| vertex)
}

/// Support point of the Minkowski difference `hull1 - hull2` along `direction`.
pub fn support(
    hull1: &[DVec3],
    hull2: &[DVec3],
    direction: DVec3,
) -> Result<SupportPoint, CollisionError> {
    let p1 = furthest_point(hull1, direction).ok_or(CollisionError::EmptyHull {
        hull: HullSide::First,
    })?;
    let p2 = furthest_point(hull2, -direction).ok_or(CollisionError::EmptyHull {
        hull: HullSide::Second,
    })?;
    Ok(SupportPoint::new(p1, p2))
}

/// Fails fast when either hull cannot produce support points.
pub fn validate_hulls(hull1: &[DVec3], hull2: &[DVec3]) -> Result<(), CollisionError> {
    if hull1.is_empty() {
        return Err(CollisionError::EmptyHull {
            hull: HullSide::First,
        });
    }
    if hull2.is_empty() {
        return Err(CollisionError::EmptyHull {
            hull: HullSide::Second,
        });
    }
    Ok(())
}
