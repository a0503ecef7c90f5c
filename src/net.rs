//! Messages exchanged with the multiplayer transport, and how inbound ones
//! are applied.
//!
//! Snapshots are authoritative and replace local state wholesale
//! (last writer wins); there is no merging and no reconciliation.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::engine::Engine;
use crate::entities::GameState;
use crate::error::GameResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NetMessage {
    /// Full authoritative state after a tick.
    StateSnapshot { timestamp: f64, state: GameState },
    PlayerMove {
        timestamp: f64,
        player_id: String,
        position: Vec2,
    },
    PlayerShoot { timestamp: f64, player_id: String },
}

impl NetMessage {
    pub fn snapshot(state: &GameState, timestamp: f64) -> Self {
        NetMessage::StateSnapshot {
            timestamp,
            state: state.clone(),
        }
    }

    pub fn player_move(player_id: &str, position: Vec2, timestamp: f64) -> Self {
        NetMessage::PlayerMove {
            timestamp,
            player_id: player_id.to_string(),
            position,
        }
    }

    pub fn player_shoot(player_id: &str, timestamp: f64) -> Self {
        NetMessage::PlayerShoot {
            timestamp,
            player_id: player_id.to_string(),
        }
    }

    pub fn timestamp(&self) -> f64 {
        match self {
            NetMessage::StateSnapshot { timestamp, .. }
            | NetMessage::PlayerMove { timestamp, .. }
            | NetMessage::PlayerShoot { timestamp, .. } => *timestamp,
        }
    }
}

/// Encode a message to bytes.
pub fn encode(message: &NetMessage) -> GameResult<Vec<u8>> {
    Ok(serde_json::to_vec(message)?)
}

/// Decode a message from bytes.
pub fn decode(data: &[u8]) -> GameResult<NetMessage> {
    Ok(serde_json::from_slice(data)?)
}

impl Engine {
    /// Apply an inbound message: snapshots overwrite the state, move and
    /// shoot events go through the regular command API.
    pub fn apply_network_message(&mut self, message: NetMessage) {
        trace!(timestamp = message.timestamp(), "applying network message");
        match message {
            NetMessage::StateSnapshot { state, .. } => self.apply_snapshot(state),
            NetMessage::PlayerMove {
                player_id, position, ..
            } => self.update_player_position(&player_id, position),
            NetMessage::PlayerShoot { player_id, .. } => self.player_shoot(&player_id),
        }
    }
}
