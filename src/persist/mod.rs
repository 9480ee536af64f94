//! Saved games and the results tally
//!
//! Two small on-disk formats live here. A saved game is a fixed header
//! followed by a bincode body, with enough redundancy that a load can
//! cross-check itself before handing a board back. The results tally
//! is three bytes of win and draw counters updated in place after each
//! finished game.
//!
//! Load failures never destroy anything: a corrupt file is reported
//! and the in-memory game stays as it was.

use crate::error::{GameError, GameResult};
use crate::game::board::{Board, BoardSnapshot};
use crate::game::piece::{Color, Rank};
use crate::game::position::Position;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Magic prefix of a save file
pub const SAVE_HEADER: &[u8] = b"Checkers Game File";

/// One piece as stored in a save file
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedPiece {
    pub rank: Rank,
    pub pos: Position,
}

/// Complete persisted game state
///
/// The occupancy snapshot duplicates the piece lists; the redundancy
/// lets [`restore`] reject files whose halves disagree.
///
/// [`restore`]: SavedGame::restore
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedGame {
    pub board_size: u8,
    pub turn: Color,
    pub occupancy: BoardSnapshot,
    pub white_pieces: Vec<SavedPiece>,
    pub black_pieces: Vec<SavedPiece>,
}

impl SavedGame {
    /// Flatten a live game into its saved form
    pub fn capture(board: &Board, turn: Color) -> Self {
        let pieces = |color: Color| {
            board
                .side(color)
                .pieces()
                .iter()
                .filter_map(|&id| board.piece(id))
                .map(|piece| SavedPiece {
                    rank: piece.rank,
                    pos: piece.pos,
                })
                .collect()
        };
        Self {
            board_size: board.size(),
            turn,
            occupancy: board.snapshot(),
            white_pieces: pieces(Color::White),
            black_pieces: pieces(Color::Black),
        }
    }

    /// Write header and body to `path`
    pub fn save(&self, path: &Path) -> GameResult<()> {
        let body = bincode::serialize(self).map_err(|err| GameError::CorruptSave {
            message: format!("encoding failed: {err}"),
        })?;
        let mut bytes = Vec::with_capacity(SAVE_HEADER.len() + body.len());
        bytes.extend_from_slice(SAVE_HEADER);
        bytes.extend_from_slice(&body);
        fs::write(path, bytes).map_err(|err| GameError::Io {
            message: err.to_string(),
        })?;
        debug!("[GAME] Saved game to {}", path.display());
        Ok(())
    }

    /// Read and decode a save file
    pub fn load(path: &Path) -> GameResult<Self> {
        let bytes = fs::read(path).map_err(|err| GameError::Io {
            message: err.to_string(),
        })?;
        let Some(body) = bytes.strip_prefix(SAVE_HEADER) else {
            return Err(GameError::CorruptSave {
                message: "missing save file header".into(),
            });
        };
        bincode::deserialize(body).map_err(|err| GameError::CorruptSave {
            message: format!("decoding failed: {err}"),
        })
    }

    /// Rebuild a board and the side to move
    ///
    /// Every stored piece must land on an empty playable in-bounds
    /// square and the rebuilt board must match the stored occupancy
    /// snapshot, otherwise the file is rejected as corrupt.
    pub fn restore(&self) -> GameResult<(Board, Color)> {
        let mut board = Board::empty(self.board_size)?;
        let mut place = |color: Color, saved: &[SavedPiece]| -> GameResult<()> {
            for piece in saved {
                if !piece.pos.in_bounds(self.board_size)
                    || !piece.pos.is_playable()
                    || board.piece_id_at(piece.pos).is_some()
                {
                    return Err(GameError::CorruptSave {
                        message: format!("piece on invalid square {}", piece.pos),
                    });
                }
                board.place_piece(color, piece.rank, piece.pos);
            }
            Ok(())
        };
        place(Color::White, &self.white_pieces)?;
        place(Color::Black, &self.black_pieces)?;
        if board.snapshot() != self.occupancy {
            return Err(GameError::CorruptSave {
                message: "piece lists disagree with occupancy snapshot".into(),
            });
        }
        Ok((board, self.turn))
    }
}

/// Win and draw counters as stored on disk
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TallyCounts {
    pub white_wins: u8,
    pub black_wins: u8,
    pub draws: u8,
}

/// Three-byte results file updated after every finished game
#[derive(Clone, Debug)]
pub struct ResultsTally {
    path: PathBuf,
}

impl ResultsTally {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Read the counters; a missing file counts as all zeros
    pub fn read(&self) -> GameResult<TallyCounts> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(TallyCounts::default())
            }
            Err(err) => {
                return Err(GameError::Io {
                    message: err.to_string(),
                })
            }
        };
        if bytes.len() < 3 {
            return Err(GameError::CorruptSave {
                message: format!("tally file holds {} byte(s), expected 3", bytes.len()),
            });
        }
        Ok(TallyCounts {
            white_wins: bytes[0],
            black_wins: bytes[1],
            draws: bytes[2],
        })
    }

    pub fn record_win(&self, side: Color) -> GameResult<()> {
        self.bump(|counts| match side {
            Color::White => counts.white_wins = counts.white_wins.saturating_add(1),
            Color::Black => counts.black_wins = counts.black_wins.saturating_add(1),
        })
    }

    pub fn record_draw(&self) -> GameResult<()> {
        self.bump(|counts| counts.draws = counts.draws.saturating_add(1))
    }

    fn bump(&self, update: impl FnOnce(&mut TallyCounts)) -> GameResult<()> {
        let mut counts = self.read()?;
        update(&mut counts);
        fs::write(
            &self.path,
            [counts.white_wins, counts.black_wins, counts.draws],
        )
        .map_err(|err| GameError::Io {
            message: err.to_string(),
        })
    }
}
