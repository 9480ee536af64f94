//! Built-in engine picking uniformly among legal moves
//!
//! Decodes the request masks back into a board, enumerates every
//! complete legal move for the side to move and draws one at random.
//! Capture chains are grown hop by hop on probe boards so a king never
//! chases its own tail around already-captured pieces.

use crate::engine::{encode_square, EngineRequest, MoveEngine};
use crate::error::GameResult;
use crate::game::board::{Board, BoardMasks};
use crate::game::moves::Move;
use crate::game::piece::{Color, Rank};
use crate::game::position::playable_positions;
use crate::game::rules;
use async_trait::async_trait;
use rand::Rng;
use tracing::debug;

/// Uniformly random legal-move engine
#[derive(Clone, Copy, Debug)]
pub struct RandomEngine {
    board_size: u8,
}

impl RandomEngine {
    pub fn new(board_size: u8) -> Self {
        Self { board_size }
    }

    fn board_from_masks(&self, masks: BoardMasks) -> GameResult<Board> {
        let mut board = Board::empty(self.board_size)?;
        for (bit, pos) in playable_positions(self.board_size).enumerate() {
            let flag = 1u64 << bit;
            if masks.black_men & flag != 0 {
                board.place_piece(Color::Black, Rank::Man, pos);
            } else if masks.black_kings & flag != 0 {
                board.place_piece(Color::Black, Rank::King, pos);
            } else if masks.white_men & flag != 0 {
                board.place_piece(Color::White, Rank::Man, pos);
            } else if masks.white_kings & flag != 0 {
                board.place_piece(Color::White, Rank::King, pos);
            }
        }
        Ok(board)
    }
}

#[async_trait]
impl MoveEngine for RandomEngine {
    async fn compute_move(&self, request: EngineRequest) -> GameResult<Option<Vec<u32>>> {
        let board = self.board_from_masks(request.masks)?;
        let moves = legal_moves(&board, request.side);
        if moves.is_empty() {
            debug!("[ENGINE] No legal move for {:?}, declining", request.side);
            return Ok(None);
        }
        let pick = rand::rng().random_range(0..moves.len());
        let mv = &moves[pick];
        let Some(piece) = board.piece(mv.piece()) else {
            return Ok(None);
        };
        let mut path = Vec::with_capacity(mv.hop_count() + 1);
        path.push(encode_square(piece.pos, self.board_size));
        for &hop in mv.hops() {
            path.push(encode_square(hop, self.board_size));
        }
        debug!(
            "[ENGINE] Picked move {}/{} with {} capture(s)",
            pick + 1,
            moves.len(),
            mv.capture_count()
        );
        Ok(Some(path))
    }
}

/// Every complete legal move for `side`
fn legal_moves(board: &Board, side: Color) -> Vec<Move> {
    let mut moves = Vec::new();
    for &id in board.side(side).pieces() {
        let Some(piece) = board.piece(id) else {
            continue;
        };
        for target in piece.possible_targets(board.size(), false) {
            grow(board, Move::with_hops(id, vec![target]), &mut moves);
        }
    }
    moves
}

/// Extend a candidate path until it is complete or dead
fn grow(board: &Board, mut mv: Move, out: &mut Vec<Move>) {
    if rules::check_legal(board, &mut mv, false) {
        out.push(mv);
        return;
    }
    if !rules::check_legal(board, &mut mv, true) || !mv.is_capture() {
        return;
    }
    let Some(landing) = mv.last_hop() else {
        return;
    };
    let mut probe = board.clone();
    probe.relocate(mv.piece(), landing);
    for &captured in mv.captured() {
        probe.remove_piece(captured);
    }
    let Some(piece) = probe.piece(mv.piece()) else {
        return;
    };
    for target in piece.possible_targets(probe.size(), true) {
        let mut extended = mv.clone();
        extended.push_hop(target);
        grow(board, extended, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::position::Position;

    fn request(board: &Board, side: Color) -> EngineRequest {
        EngineRequest {
            side,
            level: 1,
            masks: board.encode().unwrap(),
            add_to_history: false,
            use_opening_book: false,
        }
    }

    #[tokio::test]
    async fn test_declines_without_pieces() {
        let board = Board::empty(8).unwrap();
        let engine = RandomEngine::new(8);
        let path = engine
            .compute_move(request(&board, Color::White))
            .await
            .unwrap();
        assert!(path.is_none());
    }

    #[tokio::test]
    async fn test_forced_capture_is_the_only_choice() {
        //! With a mandatory jump on the board every sampled move is it
        let mut board = Board::empty(8).unwrap();
        board.place_piece(Color::White, Rank::Man, Position::new(2, 3));
        board.place_piece(Color::Black, Rank::Man, Position::new(3, 4));
        let engine = RandomEngine::new(8);

        for _ in 0..5 {
            let path = engine
                .compute_move(request(&board, Color::White))
                .await
                .unwrap()
                .expect("a capture is available");
            assert_eq!(path.len(), 2);
            assert_eq!(path[0], encode_square(Position::new(2, 3), 8));
            assert_eq!(path[1], encode_square(Position::new(4, 5), 8));
        }
    }

    #[tokio::test]
    async fn test_chain_capture_returned_in_full() {
        let mut board = Board::empty(8).unwrap();
        board.place_piece(Color::White, Rank::Man, Position::new(2, 3));
        board.place_piece(Color::Black, Rank::Man, Position::new(3, 4));
        board.place_piece(Color::Black, Rank::Man, Position::new(5, 4));
        let engine = RandomEngine::new(8);

        let path = engine
            .compute_move(request(&board, Color::White))
            .await
            .unwrap()
            .expect("the double jump is forced");
        assert_eq!(
            path,
            vec![
                encode_square(Position::new(2, 3), 8),
                encode_square(Position::new(4, 5), 8),
                encode_square(Position::new(6, 3), 8),
            ]
        );
    }

    #[tokio::test]
    async fn test_samples_only_legal_moves() {
        let mut board = Board::empty(8).unwrap();
        board.place_piece(Color::White, Rank::Man, Position::new(2, 3));
        let engine = RandomEngine::new(8);

        for _ in 0..10 {
            let path = engine
                .compute_move(request(&board, Color::White))
                .await
                .unwrap()
                .expect("two simple steps exist");
            assert_eq!(path[0], encode_square(Position::new(2, 3), 8));
            let target = path[1];
            assert!(
                target == encode_square(Position::new(3, 2), 8)
                    || target == encode_square(Position::new(3, 4), 8)
            );
        }
    }
}
