// Distributed under the GNU Affero General Public License v3.0 or later.
// See accompanying file LICENSE or https://www.gnu.org/licenses/agpl-3.0.html for details.

pub mod collision;
pub mod epa;
pub mod gjk;
pub mod narrow_phase;
pub mod simplex;
pub mod support;
pub mod support_point;

use std::fmt;

use thiserror::Error;

/// Which of the two hulls handed to the detector an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HullSide {
    First,
    Second,
}

impl fmt::Display for HullSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HullSide::First => f.write_str("first"),
            HullSide::Second => f.write_str("second"),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum CollisionError {
    #[error("The {hull} convex hull has no vertices")]
    EmptyHull { hull: HullSide },

    #[error("GJK did not converge within {iterations} iterations")]
    NonConvergence { iterations: usize },

    #[error("Cannot triangulate a simplex of {len} vertices, only 2 to 4 are supported")]
    InvalidSimplex { len: usize },

    #[error("EPA polytope with {vertices} vertices has no non-degenerate face")]
    DegeneratePolytope { vertices: usize },

    #[error("Candidate pair references unknown body {index}")]
    UnknownBody { index: usize },
}
