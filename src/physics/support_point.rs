// Distributed under the GNU Affero General Public License v3.0 or later.
// See accompanying file LICENSE or https://www.gnu.org/licenses/agpl-3.0.html for details.

use glam::DVec3;

/// A vertex of the Minkowski difference, remembering which vertex of each hull produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SupportPoint {
    minkowski: DVec3,
    hull1_point: DVec3,
    hull2_point: DVec3,
}

impl SupportPoint {
    pub fn new(hull1_point: DVec3, hull2_point: DVec3) -> Self {
        Self {
            minkowski: hull1_point - hull2_point,
            hull1_point,
            hull2_point,
        }
    }

    /// A point at `minkowski` that borrows the hull vertices of `anchor`, shifting the
    /// first hull's vertex so that `minkowski == hull1_point - hull2_point` still holds.
    pub fn synthetic(minkowski: DVec3, anchor: &SupportPoint) -> Self {
        let offset = minkowski - anchor.minkowski;
        Self {
            minkowski,
            hull1_point: anchor.hull1_point + offset,
            hull2_point: anchor.hull2_point,
        }
    }

    #[inline]
    pub fn minkowski(&self) -> DVec3 {
        self.minkowski
    }

    #[inline]
    pub fn hull1_point(&self) -> DVec3 {
        self.hull1_point
    }

    #[inline]
    pub fn hull2_point(&self) -> DVec3 {
        self.hull2_point
    }
}
