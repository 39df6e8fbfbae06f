// Distributed under the GNU Affero General Public License v3.0 or later.
// See accompanying file LICENSE or https://www.gnu.org/licenses/agpl-3.0.html for details.

use glam::DVec3;
use rayon::prelude::*;

use crate::convex_hull::Aabb;
use crate::physics::{
    CollisionError,
    collision::{Body, Collision, CollisionDetector},
};
use crate::settings::CollisionSettings;
use crate::utils::scope_timer::ScopeTimer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactState {
    Separated,
    Colliding,
}

/// Result of one narrow-phase pass, in candidate pair order after deduplication.
#[derive(Debug, Clone, PartialEq)]
pub struct NarrowPhaseOutput<H> {
    pub collisions: Vec<Collision<H>>,
    pub states: Vec<((usize, usize), ContactState)>,
}

impl<H> NarrowPhaseOutput<H> {
    pub fn state_of(&self, pair: (usize, usize)) -> Option<ContactState> {
        let pair = ordered_pair(pair.0, pair.1);
        self.states
            .iter()
            .find(|(candidate, _)| *candidate == pair)
            .map(|(_, state)| *state)
    }
}

/// Runs the exact intersection test over candidate pairs handed over by a broad phase.
#[derive(Debug, Clone, Default)]
pub struct NarrowPhase {
    detector: CollisionDetector,
}

impl NarrowPhase {
    pub fn new(settings: CollisionSettings) -> Self {
        Self {
            detector: CollisionDetector::new(settings),
        }
    }

    pub fn settings(&self) -> &CollisionSettings {
        self.detector.settings()
    }

    /// Tests the bodies at `pair` against each other.
    pub fn evaluate_pair<H: Copy>(
        &self,
        bodies: &[Body<'_, H>],
        pair: (usize, usize),
    ) -> Result<Option<Collision<H>>, CollisionError> {
        let first = bodies
            .get(pair.0)
            .ok_or(CollisionError::UnknownBody { index: pair.0 })?;
        let second = bodies
            .get(pair.1)
            .ok_or(CollisionError::UnknownBody { index: pair.1 })?;

        let spheres = first.radius.is_some() && second.radius.is_some();
        let precheck = self.settings().narrow_phase.aabb_precheck && !spheres;
        if precheck && !bounds_overlap(first.hull, second.hull) {
            return Ok(None);
        }

        Collision::detect(first, second, &self.detector)
    }

    /// Evaluates every candidate pair. Pairs are normalized so that `(a, b)` and `(b, a)`
    /// are tested once, and self pairs are dropped.
    pub fn run<H: Copy + Send + Sync>(
        &self,
        bodies: &[Body<'_, H>],
        pairs: &[(usize, usize)],
    ) -> Result<NarrowPhaseOutput<H>, CollisionError> {
        let _timer = ScopeTimer::new("narrow_phase");

        let mut candidates: Vec<(usize, usize)> = pairs
            .iter()
            .filter(|(a, b)| a != b)
            .map(|&(a, b)| ordered_pair(a, b))
            .collect();
        deduplicate_pairs(&mut candidates);

        let results: Vec<Option<Collision<H>>> = if self.settings().narrow_phase.parallel {
            candidates
                .par_iter()
                .map(|&pair| self.evaluate_pair(bodies, pair))
                .collect::<Result<_, _>>()?
        } else {
            candidates
                .iter()
                .map(|&pair| self.evaluate_pair(bodies, pair))
                .collect::<Result<_, _>>()?
        };

        let mut output = NarrowPhaseOutput {
            collisions: Vec::new(),
            states: Vec::with_capacity(candidates.len()),
        };
        for (pair, result) in candidates.into_iter().zip(results) {
            match result {
                Some(collision) => {
                    output.collisions.push(collision);
                    output.states.push((pair, ContactState::Colliding));
                }
                None => output.states.push((pair, ContactState::Separated)),
            }
        }

        log::debug!(
            "Narrow phase found {} collisions in {} pairs",
            output.collisions.len(),
            output.states.len()
        );
        Ok(output)
    }
}

/// Empty hulls have no bounds and are left to the exact test to reject.
fn bounds_overlap(hull1: &[DVec3], hull2: &[DVec3]) -> bool {
    match (Aabb::from_points(hull1), Aabb::from_points(hull2)) {
        (Some(a), Some(b)) => a.intersects(&b),
        _ => true,
    }
}

fn ordered_pair(a: usize, b: usize) -> (usize, usize) {
    if a <= b { (a, b) } else { (b, a) }
}

fn deduplicate_pairs(pairs: &mut Vec<(usize, usize)>) {
    pairs.sort_unstable();
    pairs.dedup();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convex_hull::ConvexHull;

    fn row_of_cubes(count: usize, spacing: f64) -> Vec<ConvexHull> {
        (0..count)
            .map(|i| ConvexHull::cube(1.0).translated(DVec3::new(i as f64 * spacing, 0.0, 0.0)))
            .collect()
    }

    fn bodies_for(hulls: &[ConvexHull]) -> Vec<Body<'_, usize>> {
        hulls
            .iter()
            .enumerate()
            .map(|(i, hull)| Body::new(i, hull.centroid().unwrap_or_default(), hull.vertices()))
            .collect()
    }

    fn all_pairs(count: usize) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        for a in 0..count {
            for b in (a + 1)..count {
                pairs.push((a, b));
            }
        }
        pairs
    }

    #[test]
    fn neighbours_in_overlapping_row_collide() {
        let hulls = row_of_cubes(4, 0.75);
        let bodies = bodies_for(&hulls);
        let output = NarrowPhase::default().run(&bodies, &all_pairs(4)).unwrap();

        assert_eq!(output.states.len(), 6);
        assert_eq!(output.collisions.len(), 3);
        assert_eq!(output.state_of((0, 1)), Some(ContactState::Colliding));
        assert_eq!(output.state_of((2, 1)), Some(ContactState::Colliding));
        assert_eq!(output.state_of((0, 2)), Some(ContactState::Separated));
        assert_eq!(output.state_of((0, 3)), Some(ContactState::Separated));

        for collision in &output.collisions {
            assert_eq!(collision.second, collision.first + 1);
            assert!((collision.contact.penetration_depth - 0.25).abs() < 1e-5);
        }
    }

    #[test]
    fn parallel_and_sequential_passes_agree() {
        let hulls: Vec<ConvexHull> = (0..27)
            .map(|i| {
                let (x, y, z) = (i % 3, (i / 3) % 3, i / 9);
                ConvexHull::cube(1.0).translated(DVec3::new(x as f64, y as f64, z as f64) * 0.9)
            })
            .collect();
        let bodies = bodies_for(&hulls);
        let pairs = all_pairs(bodies.len());

        let mut settings = CollisionSettings::default();
        settings.narrow_phase.parallel = true;
        let parallel = NarrowPhase::new(settings.clone()).run(&bodies, &pairs).unwrap();
        settings.narrow_phase.parallel = false;
        let sequential = NarrowPhase::new(settings).run(&bodies, &pairs).unwrap();

        assert_eq!(parallel, sequential);
        assert!(!parallel.collisions.is_empty());
    }

    #[test]
    fn duplicate_and_self_pairs_are_ignored() {
        let hulls = row_of_cubes(2, 0.5);
        let bodies = bodies_for(&hulls);
        let output = NarrowPhase::default()
            .run(&bodies, &[(0, 1), (1, 0), (1, 1), (0, 1)])
            .unwrap();

        assert_eq!(output.states, vec![((0, 1), ContactState::Colliding)]);
        assert_eq!(output.collisions.len(), 1);
    }

    #[test]
    fn aabb_precheck_does_not_change_results() {
        let hulls = row_of_cubes(5, 0.9);
        let bodies = bodies_for(&hulls);
        let pairs = all_pairs(bodies.len());

        let mut settings = CollisionSettings::default();
        settings.narrow_phase.aabb_precheck = false;
        let without = NarrowPhase::new(settings).run(&bodies, &pairs).unwrap();
        let with = NarrowPhase::default().run(&bodies, &pairs).unwrap();
        assert_eq!(with, without);
    }

    #[test]
    fn sphere_bodies_use_radius() {
        let hulls = row_of_cubes(2, 1.8);
        let bodies: Vec<Body<'_, usize>> = bodies_for(&hulls)
            .into_iter()
            .map(|body| body.with_radius(1.0))
            .collect();

        let phase = NarrowPhase::default();
        let collision = phase.evaluate_pair(&bodies, (0, 1)).unwrap().unwrap();
        assert!((collision.contact.penetration_depth - 0.2).abs() < 1e-12);
    }

    #[test]
    fn unknown_body_is_an_error() {
        let hulls = row_of_cubes(2, 0.5);
        let bodies = bodies_for(&hulls);
        let result = NarrowPhase::default().run(&bodies, &[(0, 1), (1, 7)]);
        assert_eq!(result, Err(CollisionError::UnknownBody { index: 7 }));
    }
}
