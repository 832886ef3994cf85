//! Static collider geometry: building footprints with entrance door
//! windows, and the external scene query boundary.

use super::constants::building as building_consts;
use super::Vec3;

/// An oriented building footprint the avatar collides with.
///
/// The footprint is a box in the building's local frame: `half_width`
/// along local X, `half_length` along local Z. Local +Z is the entrance
/// axis, so a point is rotated by `-entrance_yaw` around world Y when
/// transformed into the local frame.
#[derive(Debug, Clone)]
pub struct BuildingCollider {
    /// Stable identifier, also used as the zone name in broadcasts
    pub slug: String,
    /// World position of the footprint center (y is the floor height)
    pub position: Vec3,
    /// Yaw of the entrance direction, radians around world Y
    pub entrance_yaw: f32,
    pub half_width: f32,
    pub half_length: f32,
    /// Wall height above `position.y`
    pub height: f32,
}

impl BuildingCollider {
    pub fn new(slug: impl Into<String>, position: Vec3, entrance_direction: Vec3) -> Self {
        Self {
            slug: slug.into(),
            position,
            entrance_yaw: yaw_from_direction(entrance_direction),
            half_width: building_consts::DEFAULT_HALF_WIDTH,
            half_length: building_consts::DEFAULT_HALF_LENGTH,
            height: building_consts::DEFAULT_HEIGHT,
        }
    }

    /// Transforms a world point into the building's local frame.
    pub fn to_local(&self, point: Vec3) -> Vec3 {
        let d = point - self.position;
        let (sin, cos) = (-self.entrance_yaw).sin_cos();
        Vec3::new(d.x * cos + d.z * sin, d.y, -d.x * sin + d.z * cos)
    }

    /// True when the point is horizontally inside the footprint and
    /// vertically between the floor and the top of the walls.
    pub fn contains(&self, point: Vec3) -> bool {
        let local = self.to_local(point);
        local.x.abs() < self.half_width
            && local.z.abs() < self.half_length
            && local.y >= -f32::EPSILON
            && local.y < self.height
    }

    /// True when the point falls inside the lateral entrance window.
    pub fn in_door_window(&self, point: Vec3) -> bool {
        self.to_local(point).x.abs() < building_consts::DOOR_HALF_WIDTH
    }

    /// Walls block, doorways pass: a point is blocked when it is inside
    /// the footprint but outside the door window.
    pub fn blocks(&self, point: Vec3) -> bool {
        self.contains(point) && !self.in_door_window(point)
    }

    /// Interior spawn point for teleports into this building.
    pub fn interior_spawn(&self) -> Vec3 {
        let [x, y, z] = building_consts::INTERIOR_SPAWN;
        self.position + Vec3::new(x, y, z)
    }
}

/// Yaw around world Y for a horizontal direction vector, with the
/// convention that (0, 0, 1) maps to yaw 0.
pub fn yaw_from_direction(direction: Vec3) -> f32 {
    let len_sq = direction.x * direction.x + direction.z * direction.z;
    if len_sq < f32::EPSILON {
        return 0.0;
    }
    direction.x.atan2(direction.z)
}

/// Result of a scene move check.
#[derive(Debug, Clone, Copy)]
pub struct MoveCheck {
    pub blocked: bool,
    /// Position to use instead of the proposed one when blocked
    pub corrected: Vec3,
    /// Surface normal at the hit, when the scene knows it. Lets the
    /// resolver slide along the surface instead of damping uniformly.
    pub normal: Option<Vec3>,
}

impl MoveCheck {
    /// An unblocked move that keeps the proposed position.
    pub fn pass(proposed: Vec3) -> Self {
        Self {
            blocked: false,
            corrected: proposed,
            normal: None,
        }
    }
}

/// Scene geometry queries supplied by the spatial system.
///
/// The avatar never owns scene geometry beyond building footprints; floor
/// and ceiling heightmaps and arbitrary obstacle checks are answered
/// through this trait.
pub trait SpatialQuery: Send + Sync {
    /// Floor height under (x, z) for an avatar currently at height y.
    fn floor_height_at(&self, x: f32, z: f32, y: f32) -> f32;

    /// Ceiling height above (x, z), if any ceiling exists there.
    fn ceiling_height_at(&self, x: f32, z: f32, y: f32) -> Option<f32>;

    /// Checks a proposed move against scene obstacles.
    fn check_move(&self, old: Vec3, proposed: Vec3) -> MoveCheck;
}

/// Axis-aligned solid box used by [`Terrain`].
#[derive(Debug, Clone, Copy)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn contains(&self, p: Vec3) -> bool {
        p.x > self.min.x
            && p.x < self.max.x
            && p.y > self.min.y
            && p.y < self.max.y
            && p.z > self.min.z
            && p.z < self.max.z
    }

    fn contains_xz(&self, x: f32, z: f32) -> bool {
        x > self.min.x && x < self.max.x && z > self.min.z && z < self.max.z
    }
}

/// Simple built-in spatial system: a flat ground plane, raised platforms,
/// ceiling slabs, and solid obstacle boxes. Enough for the sim binary and
/// tests; a renderer would supply its own [`SpatialQuery`].
#[derive(Default)]
pub struct Terrain {
    pub ground_height: f32,
    /// Walkable platform tops. The floor query returns the highest top at
    /// or below the avatar's step reach.
    pub platforms: Vec<Aabb>,
    /// Ceiling slabs; the ceiling query returns the lowest bottom face
    /// above the avatar.
    pub ceilings: Vec<Aabb>,
    /// Solid boxes the avatar cannot enter
    pub obstacles: Vec<Aabb>,
}

impl Terrain {
    pub fn flat(ground_height: f32) -> Self {
        Self {
            ground_height,
            ..Self::default()
        }
    }
}

impl SpatialQuery for Terrain {
    fn floor_height_at(&self, x: f32, z: f32, y: f32) -> f32 {
        let mut floor = self.ground_height;
        for platform in &self.platforms {
            // A platform only supports the avatar when its top is below
            // head height; floors above the avatar are ignored.
            if platform.contains_xz(x, z) && platform.max.y <= y + 1.0 && platform.max.y > floor {
                floor = platform.max.y;
            }
        }
        floor
    }

    fn ceiling_height_at(&self, x: f32, z: f32, y: f32) -> Option<f32> {
        let mut ceiling: Option<f32> = None;
        for slab in &self.ceilings {
            if slab.contains_xz(x, z) && slab.min.y > y {
                ceiling = Some(match ceiling {
                    Some(c) => c.min(slab.min.y),
                    None => slab.min.y,
                });
            }
        }
        ceiling
    }

    fn check_move(&self, old: Vec3, proposed: Vec3) -> MoveCheck {
        for obstacle in &self.obstacles {
            if !obstacle.contains(proposed) {
                continue;
            }
            // Push out along the axis of least penetration and report
            // that face's normal so velocity can slide along the wall.
            let center = (obstacle.min + obstacle.max) * 0.5;
            let half = (obstacle.max - obstacle.min) * 0.5;
            let d = proposed - center;
            let pen_x = half.x - d.x.abs();
            let pen_z = half.z - d.z.abs();

            let (corrected, normal) = if pen_x <= pen_z {
                let sign = if d.x >= 0.0 { 1.0 } else { -1.0 };
                (
                    Vec3::new(center.x + sign * half.x, proposed.y, proposed.z),
                    Vec3::new(sign, 0.0, 0.0),
                )
            } else {
                let sign = if d.z >= 0.0 { 1.0 } else { -1.0 };
                (
                    Vec3::new(proposed.x, proposed.y, center.z + sign * half.z),
                    Vec3::new(0.0, 0.0, sign),
                )
            };

            // If the old position was already inside (obstacle spawned on
            // top of the avatar), let the move through so it can escape.
            if obstacle.contains(old) {
                return MoveCheck::pass(proposed);
            }

            return MoveCheck {
                blocked: true,
                corrected,
                normal: Some(normal),
            };
        }
        MoveCheck::pass(proposed)
    }
}
