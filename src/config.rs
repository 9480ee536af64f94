//! Game configuration
//!
//! Configuration is a JSON file with every field optional. Loading
//! never fails the program: an unreadable or malformed file logs a
//! warning and yields the defaults, and individual values outside
//! their legal range are pulled back to something playable.

use crate::error::{GameError, GameResult};
use crate::game::sources::SeatKind;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::warn;

/// Tunable game parameters
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Board edge length, even, 4 to 10
    pub board_size: u8,
    /// Rows of men per side at game start
    pub starting_rows: u8,
    /// Strongest level the engine may be asked to play
    pub max_level: u8,
    pub white_seat: SeatKind,
    pub black_seat: SeatKind,
    /// Feed interactive moves back to the engine
    pub learning: bool,
    /// Floor on the engine's apparent thinking time
    pub engine_min_latency_ms: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            board_size: 8,
            starting_rows: 3,
            max_level: 9,
            white_seat: SeatKind::Interactive,
            black_seat: SeatKind::Engine,
            learning: false,
            engine_min_latency_ms: 500,
        }
    }
}

impl GameConfig {
    /// Load from `path`, falling back to defaults on any failure
    pub fn load(path: &Path) -> GameConfig {
        match Self::try_load(path) {
            Ok(config) => config.sanitized(),
            Err(err) => {
                warn!("[CONFIG] Falling back to defaults: {}", err);
                GameConfig::default()
            }
        }
    }

    /// Load from `path`, surfacing the failure
    pub fn try_load(path: &Path) -> GameResult<GameConfig> {
        let text = fs::read_to_string(path).map_err(|err| GameError::Io {
            message: err.to_string(),
        })?;
        serde_json::from_str(&text).map_err(|err| GameError::Config {
            message: err.to_string(),
        })
    }

    /// Pull out-of-range values back to something playable
    pub fn sanitized(mut self) -> Self {
        if self.board_size < 4 || self.board_size > 10 || self.board_size % 2 != 0 {
            warn!(
                "[CONFIG] Unplayable board size {}, using 8",
                self.board_size
            );
            self.board_size = 8;
        }
        if self.starting_rows == 0 || self.starting_rows as u16 * 2 + 2 > self.board_size as u16 {
            let rows = self.board_size / 2 - 1;
            warn!(
                "[CONFIG] {} starting rows do not fit, using {}",
                self.starting_rows, rows
            );
            self.starting_rows = rows;
        }
        if self.max_level == 0 {
            warn!("[CONFIG] Maximum level 0 is meaningless, using 1");
            self.max_level = 1;
        }
        self
    }

    /// Clamp a requested engine level into the configured range
    pub fn clamp_level(&self, level: u8) -> u8 {
        level.clamp(1, self.max_level)
    }

    pub fn min_latency(&self) -> Duration {
        Duration::from_millis(self.engine_min_latency_ms)
    }
}
