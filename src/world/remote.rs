//! Remote players: presence messages, the snapshot roster, and the
//! outgoing position broadcaster.
//!
//! Snapshots arrive over an external channel; the frame loop drains the
//! channel, then every remote avatar interpolates toward its latest
//! snapshot. Nothing blocks and stale snapshots are never replayed, the
//! avatar is always chasing the newest state.

use chrono::{DateTime, Utc};
use crossbeam_channel::{Receiver, Sender, TryRecvError};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::constants::remote as remote_consts;
use super::kinematics::wrap_angle_signed_pi;
use super::Vec3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WirePosition {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl From<Vec3> for WirePosition {
    fn from(v: Vec3) -> Self {
        Self {
            x: v.x,
            y: v.y,
            z: v.z,
        }
    }
}

impl From<WirePosition> for Vec3 {
    fn from(p: WirePosition) -> Self {
        Vec3::new(p.x, p.y, p.z)
    }
}

/// Avatars only rotate around world Y on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireRotation {
    pub y: f32,
}

/// Snapshot of one remote player as last seen on the channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSnapshot {
    pub id: Uuid,
    pub username: String,
    pub display_name: String,
    /// Profile picture URL, if the player has one
    pub avatar_url: Option<String>,
    pub is_admin: bool,
    /// Cosmetic equipment selection, renderer-defined
    pub equipment: Option<String>,
    pub position: WirePosition,
    pub rotation: WireRotation,
    pub current_zone: String,
    pub is_moving: bool,
    pub last_update: DateTime<Utc>,
}

/// Presence channel messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum PresenceEvent {
    PlayerJoined {
        player: PlayerSnapshot,
    },
    PositionBroadcast {
        player_id: Uuid,
        position: WirePosition,
        rotation: WireRotation,
        current_zone: String,
        is_moving: bool,
        timestamp: DateTime<Utc>,
    },
    PlayerLeft {
        player_id: Uuid,
    },
}

/// A remote avatar entity: the latest snapshot plus the interpolated
/// render state chasing it.
#[derive(Debug, Clone)]
pub struct RemoteAvatar {
    pub snapshot: PlayerSnapshot,
    pub position: Vec3,
    pub yaw: f32,
}

impl RemoteAvatar {
    fn new(snapshot: PlayerSnapshot) -> Self {
        // New players appear at their snapshot, no sweep-in.
        let position = snapshot.position.into();
        let yaw = snapshot.rotation.y;
        Self {
            snapshot,
            position,
            yaw,
        }
    }

    /// One frame of chase toward the latest snapshot.
    pub fn interpolate(&mut self, dt: f32) {
        let target: Vec3 = self.snapshot.position.into();
        let alpha = 1.0 - (-remote_consts::POSITION_RATE * dt.max(0.0)).exp();
        self.position = self.position.lerp(&target, alpha);

        let yaw_alpha = 1.0 - (-remote_consts::YAW_RATE * dt.max(0.0)).exp();
        let delta = wrap_angle_signed_pi(self.snapshot.rotation.y - self.yaw);
        self.yaw = wrap_angle_signed_pi(self.yaw + delta * yaw_alpha);
    }
}

/// Concurrent roster of remote players fed by the presence channel.
pub struct RemoteRoster {
    players: DashMap<Uuid, RemoteAvatar>,
    rx: Receiver<PresenceEvent>,
}

impl RemoteRoster {
    pub fn new(rx: Receiver<PresenceEvent>) -> Self {
        Self {
            players: DashMap::new(),
            rx,
        }
    }

    /// Applies every pending presence event. Called once per frame
    /// before interpolation.
    pub fn drain_events(&self) {
        loop {
            match self.rx.try_recv() {
                Ok(event) => self.apply(event),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
    }

    fn apply(&self, event: PresenceEvent) {
        match event {
            PresenceEvent::PlayerJoined { player } => {
                tracing::debug!(player_id = %player.id, name = %player.display_name, "player joined");
                self.players.insert(player.id, RemoteAvatar::new(player));
            }
            PresenceEvent::PositionBroadcast {
                player_id,
                position,
                rotation,
                current_zone,
                is_moving,
                timestamp,
            } => {
                // Updates for unknown players are dropped; a join must
                // come first.
                if let Some(mut avatar) = self.players.get_mut(&player_id) {
                    avatar.snapshot.position = position;
                    avatar.snapshot.rotation = rotation;
                    avatar.snapshot.current_zone = current_zone;
                    avatar.snapshot.is_moving = is_moving;
                    avatar.snapshot.last_update = timestamp;
                }
            }
            PresenceEvent::PlayerLeft { player_id } => {
                tracing::debug!(player_id = %player_id, "player left");
                self.players.remove(&player_id);
            }
        }
    }

    /// Interpolates every remote avatar toward its snapshot.
    pub fn interpolate_all(&self, dt: f32) {
        for mut entry in self.players.iter_mut() {
            entry.value_mut().interpolate(dt);
        }
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn get(&self, player_id: &Uuid) -> Option<RemoteAvatar> {
        self.players.get(player_id).map(|entry| entry.value().clone())
    }

    pub fn all(&self) -> Vec<RemoteAvatar> {
        self.players.iter().map(|entry| entry.value().clone()).collect()
    }
}

/// Samples the local avatar and emits a position broadcast when it has
/// moved far enough, at a capped rate.
pub struct PositionBroadcaster {
    player_id: Uuid,
    tx: Sender<PresenceEvent>,
    last_position: Option<Vec3>,
    last_yaw: f32,
    since_last: f32,
}

impl PositionBroadcaster {
    pub fn new(player_id: Uuid, tx: Sender<PresenceEvent>) -> Self {
        Self {
            player_id,
            tx,
            last_position: None,
            last_yaw: 0.0,
            since_last: 0.0,
        }
    }

    /// Emits a broadcast when the avatar crossed the distance or yaw
    /// threshold and the rate cap allows it. Returns whether a message
    /// was sent.
    pub fn maybe_broadcast(
        &mut self,
        position: Vec3,
        yaw: f32,
        horizontal_speed: f32,
        current_zone: &str,
        dt: f32,
    ) -> bool {
        self.since_last += dt;
        if self.since_last < remote_consts::BROADCAST_MIN_INTERVAL {
            return false;
        }

        let moved = match self.last_position {
            Some(last) => (position - last).norm() >= remote_consts::BROADCAST_MIN_DISTANCE,
            None => true,
        };
        let turned =
            wrap_angle_signed_pi(yaw - self.last_yaw).abs() >= remote_consts::BROADCAST_MIN_YAW;
        if !moved && !turned {
            return false;
        }

        let event = PresenceEvent::PositionBroadcast {
            player_id: self.player_id,
            position: position.into(),
            rotation: WireRotation { y: yaw },
            current_zone: current_zone.to_string(),
            is_moving: horizontal_speed > remote_consts::MOVING_SPEED,
            timestamp: Utc::now(),
        };
        // A disconnected channel just means nobody is listening.
        if self.tx.send(event).is_err() {
            return false;
        }
        self.last_position = Some(position);
        self.last_yaw = yaw;
        self.since_last = 0.0;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(id: Uuid, position: Vec3) -> PlayerSnapshot {
        PlayerSnapshot {
            id,
            username: "nora".to_string(),
            display_name: "Nora".to_string(),
            avatar_url: None,
            is_admin: false,
            equipment: None,
            position: position.into(),
            rotation: WireRotation { y: 0.0 },
            current_zone: "ground".to_string(),
            is_moving: false,
            last_update: Utc::now(),
        }
    }

    #[test]
    fn roster_applies_join_update_leave() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let roster = RemoteRoster::new(rx);
        let id = Uuid::new_v4();

        tx.send(PresenceEvent::PlayerJoined {
            player: snapshot(id, Vec3::zeros()),
        })
        .unwrap();
        roster.drain_events();
        assert_eq!(roster.len(), 1);

        tx.send(PresenceEvent::PositionBroadcast {
            player_id: id,
            position: Vec3::new(4.0, 0.0, 0.0).into(),
            rotation: WireRotation { y: 1.0 },
            current_zone: "hq".to_string(),
            is_moving: true,
            timestamp: Utc::now(),
        })
        .unwrap();
        roster.drain_events();
        let avatar = roster.get(&id).unwrap();
        assert_eq!(avatar.snapshot.current_zone, "hq");
        // Interpolated position lags the snapshot until it catches up.
        assert_eq!(avatar.position, Vec3::zeros());

        tx.send(PresenceEvent::PlayerLeft { player_id: id }).unwrap();
        roster.drain_events();
        assert!(roster.is_empty());
    }

    #[test]
    fn update_before_join_is_dropped() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let roster = RemoteRoster::new(rx);
        tx.send(PresenceEvent::PositionBroadcast {
            player_id: Uuid::new_v4(),
            position: WirePosition { x: 0.0, y: 0.0, z: 0.0 },
            rotation: WireRotation { y: 0.0 },
            current_zone: "ground".to_string(),
            is_moving: false,
            timestamp: Utc::now(),
        })
        .unwrap();
        roster.drain_events();
        assert!(roster.is_empty());
    }

    #[test]
    fn interpolation_chases_latest_snapshot() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let roster = RemoteRoster::new(rx);
        let id = Uuid::new_v4();
        tx.send(PresenceEvent::PlayerJoined {
            player: snapshot(id, Vec3::zeros()),
        })
        .unwrap();
        roster.drain_events();

        tx.send(PresenceEvent::PositionBroadcast {
            player_id: id,
            position: Vec3::new(10.0, 0.0, 0.0).into(),
            rotation: WireRotation { y: 0.0 },
            current_zone: "ground".to_string(),
            is_moving: true,
            timestamp: Utc::now(),
        })
        .unwrap();
        roster.drain_events();

        for _ in 0..600 {
            roster.interpolate_all(1.0 / 60.0);
        }
        let avatar = roster.get(&id).unwrap();
        assert!((avatar.position.x - 10.0).abs() < 0.05);
    }

    #[test]
    fn broadcaster_respects_distance_and_interval() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut broadcaster = PositionBroadcaster::new(Uuid::new_v4(), tx);

        // First sighting always broadcasts once the interval elapses.
        assert!(broadcaster.maybe_broadcast(Vec3::zeros(), 0.0, 0.0, "ground", 0.2));
        // Crossing the threshold too soon after the last send: silent.
        assert!(!broadcaster.maybe_broadcast(Vec3::new(5.0, 0.0, 0.0), 0.0, 5.0, "ground", 0.01));
        // Same move once the interval elapses: broadcast.
        assert!(broadcaster.maybe_broadcast(Vec3::new(5.0, 0.0, 0.0), 0.0, 5.0, "ground", 0.2));
        // Tiny drift below both thresholds: silent.
        assert!(!broadcaster.maybe_broadcast(Vec3::new(5.01, 0.0, 0.0), 0.0, 1.0, "ground", 0.2));

        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(events.len(), 2);
        match &events[1] {
            PresenceEvent::PositionBroadcast { position, is_moving, .. } => {
                assert_eq!(position.x, 5.0);
                assert!(*is_moving);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn presence_events_use_snake_case_tags() {
        let event = PresenceEvent::PlayerLeft {
            player_id: Uuid::nil(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"player_left\""));
        assert!(json.contains("\"playerId\""));
    }
}
