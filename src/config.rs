//! World configuration parsing from world.toml files

use serde::Deserialize;
use std::path::Path;

use crate::world::colliders::BuildingCollider;
use crate::world::constants::{avatar as avatar_consts, building as building_consts, physics as physics_consts};
use crate::world::kinematics::AvatarTuning;
use crate::world::Vec3;

/// Avatar tuning section
#[derive(Debug, Clone, Deserialize)]
pub struct AvatarSection {
    #[serde(default = "default_walk_speed")]
    pub walk_speed: f32,
    #[serde(default = "default_sprint_multiplier")]
    pub sprint_multiplier: f32,
    #[serde(default = "default_flight_multiplier")]
    pub flight_multiplier: f32,
    #[serde(default = "default_acceleration")]
    pub acceleration: f32,
    #[serde(default = "default_friction")]
    pub friction: f32,
    #[serde(default = "default_gravity")]
    pub gravity: f32,
    #[serde(default = "default_jump_speed")]
    pub jump_speed: f32,
    /// Whether the double-tap flight toggle is available
    #[serde(default = "default_can_fly")]
    pub can_fly: bool,
}

impl Default for AvatarSection {
    fn default() -> Self {
        Self {
            walk_speed: default_walk_speed(),
            sprint_multiplier: default_sprint_multiplier(),
            flight_multiplier: default_flight_multiplier(),
            acceleration: default_acceleration(),
            friction: default_friction(),
            gravity: default_gravity(),
            jump_speed: default_jump_speed(),
            can_fly: default_can_fly(),
        }
    }
}

impl AvatarSection {
    pub fn tuning(&self) -> AvatarTuning {
        AvatarTuning {
            walk_speed: self.walk_speed,
            sprint_multiplier: self.sprint_multiplier,
            flight_multiplier: self.flight_multiplier,
            acceleration: self.acceleration,
            friction: self.friction,
            gravity: self.gravity,
            jump_speed: self.jump_speed,
            can_fly: self.can_fly,
        }
    }
}

fn default_walk_speed() -> f32 {
    avatar_consts::WALK_SPEED
}

fn default_sprint_multiplier() -> f32 {
    avatar_consts::SPRINT_MULTIPLIER
}

fn default_flight_multiplier() -> f32 {
    avatar_consts::FLIGHT_MULTIPLIER
}

fn default_acceleration() -> f32 {
    avatar_consts::ACCELERATION
}

fn default_friction() -> f32 {
    avatar_consts::FRICTION
}

fn default_gravity() -> f32 {
    physics_consts::GRAVITY
}

fn default_jump_speed() -> f32 {
    avatar_consts::JUMP_SPEED
}

fn default_can_fly() -> bool {
    true
}

/// One building entry in the world layout
#[derive(Debug, Clone, Deserialize)]
pub struct BuildingSection {
    /// Stable identifier; doubles as the zone name
    pub slug: String,
    /// World position of the footprint center [x, y, z]
    pub position: [f32; 3],
    /// Horizontal entrance direction [x, z]
    pub entrance_direction: [f32; 2],
    #[serde(default = "default_half_width")]
    pub half_width: f32,
    #[serde(default = "default_half_length")]
    pub half_length: f32,
    #[serde(default = "default_building_height")]
    pub height: f32,
}

fn default_half_width() -> f32 {
    building_consts::DEFAULT_HALF_WIDTH
}

fn default_half_length() -> f32 {
    building_consts::DEFAULT_HALF_LENGTH
}

fn default_building_height() -> f32 {
    building_consts::DEFAULT_HEIGHT
}

impl BuildingSection {
    pub fn collider(&self) -> BuildingCollider {
        let [x, y, z] = self.position;
        let [dx, dz] = self.entrance_direction;
        let mut collider = BuildingCollider::new(
            self.slug.clone(),
            Vec3::new(x, y, z),
            Vec3::new(dx, 0.0, dz),
        );
        collider.half_width = self.half_width;
        collider.half_length = self.half_length;
        collider.height = self.height;
        collider
    }
}

/// World configuration from world.toml
#[derive(Debug, Clone, Deserialize)]
pub struct WorldConfig {
    /// Display name of the world
    pub name: String,
    /// Description shown in listings
    #[serde(default)]
    pub description: Option<String>,
    /// Avatar tuning
    #[serde(default)]
    pub avatar: AvatarSection,
    /// Building layout
    #[serde(default)]
    pub buildings: Vec<BuildingSection>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: "Virtual Office".to_string(),
            description: None,
            avatar: AvatarSection::default(),
            buildings: Vec::new(),
        }
    }
}

impl WorldConfig {
    /// Load world configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, WorldConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| WorldConfigError::IoError(path.to_path_buf(), e))?;

        toml::from_str(&content)
            .map_err(|e| WorldConfigError::ParseError(path.to_path_buf(), e))
    }

    /// Load world configuration from a world directory
    /// Looks for world.toml in the given directory
    pub fn from_world_dir(world_dir: &Path) -> Result<Self, WorldConfigError> {
        let config_path = world_dir.join("world.toml");
        Self::from_file(&config_path)
    }

    pub fn building_colliders(&self) -> Vec<BuildingCollider> {
        self.buildings.iter().map(BuildingSection::collider).collect()
    }
}

/// Errors that can occur when loading world configuration
#[derive(Debug)]
pub enum WorldConfigError {
    IoError(std::path::PathBuf, std::io::Error),
    ParseError(std::path::PathBuf, toml::de::Error),
}

impl std::fmt::Display for WorldConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorldConfigError::IoError(path, e) => {
                write!(f, "Failed to read {}: {}", path.display(), e)
            }
            WorldConfigError::ParseError(path, e) => {
                write!(f, "Failed to parse {}: {}", path.display(), e)
            }
        }
    }
}

impl std::error::Error for WorldConfigError {}
