//! Move sources for the two seats
//!
//! The controller asks a [`MoveSource`] for the next move and does not
//! care who answers. An interactive seat hands moves over a single-slot
//! channel fed from outside the control cycle; an engine seat translates
//! the board into the engine wire format and back.
//!
//! # Architecture
//!
//! - `InteractiveSource` / `MoveFeeder` - channel pair, capacity one so
//!   a second submission while one is pending is refused, not queued
//! - `EngineSource` - drives a [`MoveEngine`] with a minimum latency so
//!   instant replies still read as a turn taken

use crate::engine::{decode_square, EngineRequest, MoveEngine};
use crate::game::board::Board;
use crate::game::moves::Move;
use crate::game::piece::Color;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::{error, warn};

/// How a seat is driven, as named in configuration
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeatKind {
    Interactive,
    Engine,
}

/// Supplier of moves for one side
#[async_trait]
pub trait MoveSource: Send + Sync {
    /// Produce the next move for `side` on `board`
    ///
    /// `None` means the seat gives up: the feeder hung up or the
    /// engine declined or failed.
    async fn next_move(&mut self, board: &Board, side: Color) -> Option<Move>;

    fn is_interactive(&self) -> bool;
}

/// Seat fed by an external caller through a channel
pub struct InteractiveSource {
    rx: mpsc::Receiver<Move>,
}

/// Sending half handed to the UI or test driving an interactive seat
#[derive(Clone)]
pub struct MoveFeeder {
    tx: mpsc::Sender<Move>,
}

impl MoveFeeder {
    /// Offer a move to the seat
    ///
    /// Returns false when the slot is already taken or the controller
    /// is gone; the caller should surface that instead of retrying
    /// blindly.
    pub fn submit(&self, mv: Move) -> bool {
        self.tx.try_send(mv).is_ok()
    }
}

impl InteractiveSource {
    /// Create a connected seat and feeder pair
    pub fn pair() -> (Self, MoveFeeder) {
        let (tx, rx) = mpsc::channel(1);
        (Self { rx }, MoveFeeder { tx })
    }
}

#[async_trait]
impl MoveSource for InteractiveSource {
    async fn next_move(&mut self, _board: &Board, _side: Color) -> Option<Move> {
        self.rx.recv().await
    }

    fn is_interactive(&self) -> bool {
        true
    }
}

/// Seat driven by a [`MoveEngine`]
pub struct EngineSource {
    engine: Arc<dyn MoveEngine>,
    level: u8,
    min_latency: Duration,
    add_to_history: bool,
    use_opening_book: bool,
}

impl EngineSource {
    pub fn new(engine: Arc<dyn MoveEngine>) -> Self {
        Self {
            engine,
            level: 1,
            min_latency: Duration::from_millis(500),
            add_to_history: false,
            use_opening_book: false,
        }
    }

    pub fn with_level(mut self, level: u8) -> Self {
        self.level = level;
        self
    }

    pub fn with_min_latency(mut self, latency: Duration) -> Self {
        self.min_latency = latency;
        self
    }

    pub fn with_history(mut self, add_to_history: bool) -> Self {
        self.add_to_history = add_to_history;
        self
    }

    pub fn with_opening_book(mut self, use_opening_book: bool) -> Self {
        self.use_opening_book = use_opening_book;
        self
    }
}

#[async_trait]
impl MoveSource for EngineSource {
    async fn next_move(&mut self, board: &Board, side: Color) -> Option<Move> {
        let masks = match board.encode() {
            Ok(masks) => masks,
            Err(err) => {
                error!("[ENGINE] Board encoding failed: {}", err);
                return None;
            }
        };
        let request = EngineRequest {
            side,
            level: self.level,
            masks,
            add_to_history: self.add_to_history,
            use_opening_book: self.use_opening_book,
        };
        // Pace the reply so an instant engine still reads as a turn
        let (result, _) = tokio::join!(
            self.engine.compute_move(request),
            sleep(self.min_latency)
        );
        let path = match result {
            Ok(Some(path)) => path,
            Ok(None) => {
                warn!("[ENGINE] Engine declined to move for {:?}", side);
                return None;
            }
            Err(err) => {
                error!("[ENGINE] Move computation failed: {}", err);
                return None;
            }
        };
        if path.len() < 2 {
            warn!("[ENGINE] Engine path too short: {:?}", path);
            return None;
        }
        let start = decode_square(path[0], board.size());
        let Some(id) = board.piece_id_at(start) else {
            warn!("[ENGINE] Engine moved from empty square {}", start);
            return None;
        };
        let mut mv = Move::new(id);
        for &square in &path[1..] {
            mv.push_hop(decode_square(square, board.size()));
        }
        Some(mv)
    }

    fn is_interactive(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GameResult;
    use crate::game::piece::Rank;
    use crate::game::position::Position;

    struct ScriptedEngine {
        path: Option<Vec<u32>>,
    }

    #[async_trait]
    impl MoveEngine for ScriptedEngine {
        async fn compute_move(&self, _request: EngineRequest) -> GameResult<Option<Vec<u32>>> {
            Ok(self.path.clone())
        }
    }

    #[tokio::test]
    async fn test_feeder_slot_holds_one_move() {
        let (mut source, feeder) = InteractiveSource::pair();
        let board = Board::empty(8).unwrap();

        assert!(feeder.submit(Move::new(crate::game::piece::PieceId(0))));
        assert!(!feeder.submit(Move::new(crate::game::piece::PieceId(1))));

        let mv = source.next_move(&board, Color::White).await.unwrap();
        assert_eq!(mv.piece(), crate::game::piece::PieceId(0));
        assert!(feeder.submit(Move::new(crate::game::piece::PieceId(1))));
    }

    #[tokio::test]
    async fn test_source_ends_when_feeder_hangs_up() {
        let (mut source, feeder) = InteractiveSource::pair();
        let board = Board::empty(8).unwrap();
        drop(feeder);
        assert!(source.next_move(&board, Color::White).await.is_none());
    }

    #[tokio::test]
    async fn test_engine_source_decodes_path() {
        let mut board = Board::empty(8).unwrap();
        let id = board.place_piece(Color::White, Rank::Man, Position::new(2, 3));
        let engine = ScriptedEngine {
            path: Some(vec![
                crate::engine::encode_square(Position::new(2, 3), 8),
                crate::engine::encode_square(Position::new(3, 4), 8),
            ]),
        };
        let mut source = EngineSource::new(Arc::new(engine)).with_min_latency(Duration::ZERO);
        assert!(!source.is_interactive());

        let mv = source.next_move(&board, Color::White).await.unwrap();
        assert_eq!(mv.piece(), id);
        assert_eq!(mv.hops(), &[Position::new(3, 4)]);
    }

    #[tokio::test]
    async fn test_engine_source_rejects_bad_paths() {
        let mut board = Board::empty(8).unwrap();
        board.place_piece(Color::White, Rank::Man, Position::new(2, 3));

        let declined = ScriptedEngine { path: None };
        let mut source = EngineSource::new(Arc::new(declined)).with_min_latency(Duration::ZERO);
        assert!(source.next_move(&board, Color::White).await.is_none());

        let empty_start = ScriptedEngine {
            path: Some(vec![
                crate::engine::encode_square(Position::new(4, 5), 8),
                crate::engine::encode_square(Position::new(5, 6), 8),
            ]),
        };
        let mut source = EngineSource::new(Arc::new(empty_start)).with_min_latency(Duration::ZERO);
        assert!(source.next_move(&board, Color::White).await.is_none());

        let short = ScriptedEngine {
            path: Some(vec![0]),
        };
        let mut source = EngineSource::new(Arc::new(short)).with_min_latency(Duration::ZERO);
        assert!(source.next_move(&board, Color::White).await.is_none());
    }
}
