// Distributed under the GNU Affero General Public License v3.0 or later.
// See accompanying file LICENSE or https://www.gnu.org/licenses/agpl-3.0.html for details.

use glam::DVec3;

#[inline]
pub fn is_same_direction(v1: DVec3, v2: DVec3) -> bool {
    v1.dot(v2) > 0.0
}

#[inline]
pub fn is_opposite_direction(v1: DVec3, v2: DVec3) -> bool {
    v1.dot(v2) < 0.0
}

/// Unnormalized normal of the triangle `a, b, c`, counter-clockwise winding.
#[inline]
pub fn triangle_normal(a: DVec3, b: DVec3, c: DVec3) -> DVec3 {
    (b - a).cross(c - a)
}

/// Component of `toward` perpendicular to `edge`, scaled by `|edge|²`.
#[inline]
pub fn perpendicular_toward(edge: DVec3, toward: DVec3) -> DVec3 {
    edge.cross(toward).cross(edge)
}

/// Barycentric weights `(u, v, w)` of `p` with respect to the triangle `a, b, c`,
/// such that `p = u * a + v * b + w * c` when `p` lies in the triangle's plane.
///
/// Returns NaN weights for a degenerate triangle.
pub fn barycentric(p: DVec3, a: DVec3, b: DVec3, c: DVec3) -> DVec3 {
    let v0 = b - a;
    let v1 = c - a;
    let v2 = p - a;
    let d00 = v0.dot(v0);
    let d01 = v0.dot(v1);
    let d11 = v1.dot(v1);
    let d20 = v2.dot(v0);
    let d21 = v2.dot(v1);
    let denom = d00 * d11 - d01 * d01;

    let v = (d11 * d20 - d01 * d21) / denom;
    let w = (d00 * d21 - d01 * d20) / denom;
    let u = 1.0 - v - w;

    DVec3::new(u, v, w)
}

/// Inverse of [`barycentric`]: the point with weights `bary` over `a, b, c`.
#[inline]
pub fn cartesian(bary: DVec3, a: DVec3, b: DVec3, c: DVec3) -> DVec3 {
    a * bary.x + b * bary.y + c * bary.z
}
