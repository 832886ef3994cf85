//! Collision resolution for a proposed avatar position.
//!
//! Stages run in a fixed order and each sees the corrections applied by
//! the stages before it, so overlapping corrections compose with
//! last-applied-wins semantics:
//!
//!   buildings -> general scene -> ceiling -> floor -> absolute floor
//!
//! Flight mode is a deliberate no-clip override: every stage except the
//! absolute world floor is skipped while it is active.

use super::colliders::{BuildingCollider, SpatialQuery};
use super::constants::{avatar as avatar_consts, physics as physics_consts};
use super::Vec3;

/// Contact state threaded through the resolver stages.
#[derive(Debug, Clone, Copy)]
pub struct ContactState {
    pub position: Vec3,
    pub velocity: Vec3,
    pub grounded: bool,
}

/// Resolves a proposed move against the static world.
pub fn resolve(
    old: Vec3,
    proposed: Vec3,
    velocity: Vec3,
    flying: bool,
    buildings: &[BuildingCollider],
    scene: &dyn SpatialQuery,
) -> ContactState {
    let mut state = ContactState {
        position: proposed,
        velocity,
        grounded: false,
    };

    if !flying {
        resolve_buildings(old, &mut state, buildings);
        resolve_scene(old, &mut state, scene);
        resolve_ceiling(&mut state, scene);
        resolve_floor(&mut state, scene);
    }

    resolve_absolute_floor(&mut state);
    state
}

/// Building walls block, doorways pass. A blocked move reverts the
/// horizontal position to the old one and zeroes horizontal velocity;
/// there is no partial sliding along building walls.
fn resolve_buildings(old: Vec3, state: &mut ContactState, buildings: &[BuildingCollider]) {
    for building in buildings {
        if !building.blocks(state.position) {
            continue;
        }
        // If the old position is already inside the wall region (the
        // building appeared around the avatar), skip the correction so
        // the avatar can walk out instead of being wedged.
        if building.blocks(old) {
            continue;
        }
        state.position.x = old.x;
        state.position.z = old.z;
        state.velocity.x = 0.0;
        state.velocity.z = 0.0;
    }
}

/// Delegates to the external scene query. When the hit reports a surface
/// normal, only the inward velocity component is removed so the avatar
/// slides along the surface; without a normal the velocity is damped
/// uniformly.
fn resolve_scene(old: Vec3, state: &mut ContactState, scene: &dyn SpatialQuery) {
    let check = scene.check_move(old, state.position);
    if !check.blocked {
        return;
    }
    state.position = check.corrected;
    match check.normal {
        Some(normal) if normal.norm_squared() > physics_consts::EPSILON => {
            let normal = normal.normalize();
            let inward = state.velocity.dot(&normal);
            if inward < 0.0 {
                state.velocity -= normal * inward;
            }
        }
        _ => {
            state.velocity *= avatar_consts::BLOCKED_DAMP;
        }
    }
}

/// Clamps the avatar's head below any ceiling at the new horizontal
/// position and caps upward velocity at zero.
fn resolve_ceiling(state: &mut ContactState, scene: &dyn SpatialQuery) {
    let p = state.position;
    if let Some(ceiling) = scene.ceiling_height_at(p.x, p.z, p.y) {
        if p.y + avatar_consts::HEAD_CLEARANCE > ceiling {
            state.position.y = ceiling - avatar_consts::HEAD_CLEARANCE;
            state.velocity.y = state.velocity.y.min(0.0);
        }
    }
}

/// Samples the floor at the *new* horizontal position so terrain steps
/// are honored while moving. Snapping up zeroes vertical velocity and
/// sets the grounded flag; an ascending avatar at floor level is left
/// airborne so jumps are not swallowed.
fn resolve_floor(state: &mut ContactState, scene: &dyn SpatialQuery) {
    let p = state.position;
    let floor = scene.floor_height_at(p.x, p.z, p.y);
    if state.velocity.y <= 0.0 && p.y <= floor + avatar_consts::GROUND_EPSILON {
        state.position.y = floor;
        state.velocity.y = 0.0;
        state.grounded = true;
    }
}

/// The world floor always holds, flight mode included.
fn resolve_absolute_floor(state: &mut ContactState) {
    if state.position.y < physics_consts::WORLD_FLOOR {
        state.position.y = physics_consts::WORLD_FLOOR;
        state.velocity.y = state.velocity.y.max(0.0);
    }
}
