// Distributed under the GNU Affero General Public License v3.0 or later.
// See accompanying file LICENSE or https://www.gnu.org/licenses/agpl-3.0.html for details.

use glam::DVec3;

use crate::physics::{
    CollisionError,
    epa::epa,
    gjk::{GjkResult, gjk_intersect},
    support::validate_hulls,
};
use crate::settings::CollisionSettings;

/// Contact geometry of two intersecting shapes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactData {
    /// Direction from the second body's reference position toward the first's.
    pub unit_normal: DVec3,
    pub first_poc: DVec3,
    pub second_poc: DVec3,
    /// Translation that would separate the shapes, `penetration_normal * penetration_depth`.
    pub intersection_vector: DVec3,
    /// Unit direction of least penetration, pointing from the first shape into the second.
    pub penetration_normal: DVec3,
    pub penetration_depth: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    NoIntersection,
    Intersection(ContactData),
}

impl Outcome {
    pub fn is_intersection(&self) -> bool {
        matches!(self, Outcome::Intersection(_))
    }

    pub fn contact(&self) -> Option<&ContactData> {
        match self {
            Outcome::Intersection(contact) => Some(contact),
            Outcome::NoIntersection => None,
        }
    }
}

/// A shape taking part in narrow-phase tests. `handle` refers back to the caller's
/// object and is never dereferenced here.
#[derive(Debug, Clone, Copy)]
pub struct Body<'a, H> {
    pub handle: H,
    /// Reference position used for the contact's unit normal.
    pub position: DVec3,
    /// World-space hull vertices.
    pub hull: &'a [DVec3],
    /// Bounding sphere radius. When both bodies of a pair have one, the pair is
    /// resolved as two spheres.
    pub radius: Option<f64>,
}

impl<'a, H: Copy> Body<'a, H> {
    pub fn new(handle: H, position: DVec3, hull: &'a [DVec3]) -> Self {
        Self {
            handle,
            position,
            hull,
            radius: None,
        }
    }

    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = Some(radius);
        self
    }
}

/// Contact between two bodies, identified by their handles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collision<H> {
    pub first: H,
    pub second: H,
    pub contact: ContactData,
}

impl<H: Copy> Collision<H> {
    /// Tests `first` against `second`, returning the collision when they intersect.
    pub fn detect(
        first: &Body<'_, H>,
        second: &Body<'_, H>,
        detector: &CollisionDetector,
    ) -> Result<Option<Self>, CollisionError> {
        let outcome = match (first.radius, second.radius) {
            (Some(r1), Some(r2)) => sphere_contact(first.position, r1, second.position, r2),
            _ => detector.intersect(first.position, first.hull, second.position, second.hull)?,
        };

        Ok(match outcome {
            Outcome::Intersection(contact) => Some(Self {
                first: first.handle,
                second: second.handle,
                contact,
            }),
            Outcome::NoIntersection => None,
        })
    }
}

/// GJK/EPA intersection test configured by [`CollisionSettings`].
#[derive(Debug, Clone, Default)]
pub struct CollisionDetector {
    settings: CollisionSettings,
}

impl CollisionDetector {
    pub fn new(settings: CollisionSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &CollisionSettings {
        &self.settings
    }

    /// Intersects two world-space convex hulls. The positions only orient the reported
    /// unit normal.
    pub fn intersect(
        &self,
        first_position: DVec3,
        hull1: &[DVec3],
        second_position: DVec3,
        hull2: &[DVec3],
    ) -> Result<Outcome, CollisionError> {
        validate_hulls(hull1, hull2)?;

        let simplex = match gjk_intersect(hull1, hull2, &self.settings)? {
            GjkResult::NoIntersection => return Ok(Outcome::NoIntersection),
            GjkResult::Intersection(hit) => hit.simplex,
        };

        let result = epa(hull1, hull2, simplex, &self.settings)?;
        let unit_normal = (first_position - second_position)
            .try_normalize()
            .unwrap_or(-result.penetration_normal);

        Ok(Outcome::Intersection(ContactData {
            unit_normal,
            first_poc: result.first_poc,
            second_poc: result.second_poc,
            intersection_vector: result.intersection_vector,
            penetration_normal: result.penetration_normal,
            penetration_depth: result.penetration_depth,
        }))
    }
}

/// [`CollisionDetector::intersect`] with default settings.
pub fn intersect(
    first_position: DVec3,
    hull1: &[DVec3],
    second_position: DVec3,
    hull2: &[DVec3],
) -> Result<Outcome, CollisionError> {
    CollisionDetector::default().intersect(first_position, hull1, second_position, hull2)
}

/// Closed-form contact of two spheres. Touching spheres do not intersect.
pub fn sphere_contact(
    first_position: DVec3,
    first_radius: f64,
    second_position: DVec3,
    second_radius: f64,
) -> Outcome {
    let offset = first_position - second_position;
    let distance = offset.length();
    let radii = first_radius + second_radius;
    if distance >= radii {
        return Outcome::NoIntersection;
    }

    // Concentric spheres have no preferred axis.
    let normal = offset.try_normalize().unwrap_or(DVec3::X);
    let intersection_vector = normal * (distance - radii);

    Outcome::Intersection(ContactData {
        unit_normal: normal,
        first_poc: first_position - normal * first_radius,
        second_poc: second_position + normal * second_radius,
        intersection_vector,
        penetration_normal: -normal,
        penetration_depth: radii - distance,
    })
}
