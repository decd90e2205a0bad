//! Geometric nearest-entity search.
//!
//! A worm scans along a ray cast from its own position. Every other live
//! entity whose bounding circle intersects the ray's line, with at least one
//! intersection in front of the worm, is a candidate; the candidate whose
//! center is closest wins.

use crate::value::error::RuntimeError;
use crate::world::{EntityId, World};

/// Normalize an angle into (−π, π].
pub fn normalize_angle(angle: f64) -> f64 {
    use std::f64::consts::PI;
    let two_pi = 2.0 * PI;
    let mut a = angle % two_pi;
    if a <= -PI {
        a += two_pi;
    } else if a > PI {
        a -= two_pi;
    }
    a
}

/// Find the nearest live entity intersecting the ray cast from `actor` at
/// `direction + angle_offset`.
///
/// Returns the empty reference when nothing qualifies. Faults when the actor
/// itself is no longer a live worm.
pub fn nearest_entity<W: World>(
    world: &W,
    actor: EntityId,
    angle_offset: f64,
) -> Result<Option<EntityId>, RuntimeError> {
    const WHAT: &str = "searchNearestEntity";
    let origin = world
        .entity(actor)
        .ok_or(RuntimeError::WrongEntityCapability(WHAT))?;
    let worm = world
        .worm(actor)
        .ok_or(RuntimeError::WrongEntityCapability(WHAT))?;

    let phi = normalize_angle(worm.direction + angle_offset);
    let (ray_x, ray_y) = (phi.cos(), phi.sin());

    let mut best: Option<(EntityId, f64)> = None;
    for id in world.live_entities() {
        if id == actor {
            continue;
        }
        let Some(entity) = world.entity(id) else {
            continue;
        };
        let dx = entity.x - origin.x;
        let dy = entity.y - origin.y;
        let dist_sq = dx * dx + dy * dy;

        // Line-circle intersection, parametrically: points on the ray's line
        // are origin + t * ray. `along` is the t of the circle center's
        // projection; the discriminant decides whether the line ever enters
        // the circle.
        let along = dx * ray_x + dy * ray_y;
        let discriminant = entity.radius * entity.radius - (dist_sq - along * along);
        if discriminant < 0.0 {
            continue;
        }

        // Both intersection parameters negative means the hit lies behind
        // the worm; a circle straddling the origin still counts.
        let far = along + discriminant.sqrt();
        if far < 0.0 {
            continue;
        }

        if best.map_or(true, |(_, d)| dist_sq < d) {
            best = Some((id, dist_sq));
        }
    }
    Ok(best.map(|(id, _)| id))
}
