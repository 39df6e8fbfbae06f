// Distributed under the GNU Affero General Public License v3.0 or later.
// See accompanying file LICENSE or https://www.gnu.org/licenses/agpl-3.0.html for details.

//! Narrow-phase collision detection between convex hulls: GJK decides whether two hulls
//! intersect and EPA recovers the penetration and contact points.

pub mod convex_hull;
pub mod math;
pub mod physics;
pub mod settings;
pub mod utils;

pub use convex_hull::{Aabb, ConvexHull};
pub use physics::collision::{
    Body, Collision, CollisionDetector, ContactData, Outcome, intersect, sphere_contact,
};
pub use physics::narrow_phase::{ContactState, NarrowPhase, NarrowPhaseOutput};
pub use physics::{CollisionError, HullSide};
pub use settings::{CollisionSettings, NonConvergencePolicy, SettingsError};
