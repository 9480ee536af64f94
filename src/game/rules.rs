//! Move legality
//!
//! Validation walks the hop path square by square against an immutable
//! board, rebuilding the move's capture list as it goes. Two levels of
//! strictness exist: a partial check accepts any legal prefix of a
//! move, a complete check additionally enforces the mandatory-capture
//! rule and rejects capture chains that stop while another jump is
//! available.
//!
//! Maximality is probed on a scratch clone of the board with the moving
//! piece relocated and its victims removed, so blocked or already
//! captured pieces never offer phantom continuations.

use crate::error::{GameError, GameResult};
use crate::game::board::Board;
use crate::game::moves::Move;
use crate::game::piece::{Color, PieceId, Rank};
use crate::game::position::Position;

/// Validate a move against the board
///
/// Rebuilds `mv`'s capture list from scratch. With `partial` set, any
/// legal prefix passes; without it the move must be complete, meaning
/// a capture chain runs until no further jump exists and a simple step
/// is only legal when the side has no capture anywhere.
pub fn check_legal(board: &Board, mv: &mut Move, partial: bool) -> bool {
    mv.clear_captures();
    let Some(piece) = board.piece(mv.piece()) else {
        return false;
    };
    if mv.hop_count() == 0 {
        return false;
    }

    let forward = piece.side.forward() as i16;
    let is_king = piece.rank == Rank::King;
    let total = mv.hop_count();
    let mut source = piece.pos;
    let mut captured: Vec<PieceId> = Vec::new();

    for &target in mv.hops() {
        if !target.in_bounds(board.size()) || board.piece_id_at(target).is_some() {
            return false;
        }
        let dr = target.row as i16 - source.row as i16;
        let dc = target.col as i16 - source.col as i16;

        if dc.abs() == 1 && (dr == forward || (is_king && dr.abs() == 1)) {
            // A plain step can never be part of a longer path
            if total != 1 {
                return false;
            }
        } else if dr.abs() == 2 && dc.abs() == 2 && (dr * forward > 0 || is_king) {
            let over = source.midpoint(target);
            let Some(victim) = board.piece_at(over) else {
                return false;
            };
            if victim.side == piece.side || captured.contains(&victim.id) {
                return false;
            }
            captured.push(victim.id);
        } else {
            return false;
        }
        source = target;
    }

    let landing = source;
    let jumped = !captured.is_empty();
    for id in captured {
        mv.record_capture(id);
    }
    if partial {
        return true;
    }
    if jumped {
        !chain_continues(board, mv, landing)
    } else {
        !is_mandatory_capture(board, piece.side)
    }
}

/// Validate a complete move, explaining a rejection
///
/// Wrapper over [`check_legal`] for callers that want an error value
/// to surface instead of a bare bool.
pub fn validate(board: &Board, mv: &mut Move) -> GameResult<()> {
    if check_legal(board, mv, false) {
        return Ok(());
    }
    let message = match board.piece(mv.piece()) {
        Some(piece) => format!(
            "no legal path for the {:?} {:?} at {}",
            piece.side, piece.rank, piece.pos
        ),
        None => "the moving piece is no longer on the board".into(),
    };
    Err(GameError::IllegalMove { message })
}

/// Whether the chain could jump again from `landing`
fn chain_continues(board: &Board, mv: &Move, landing: Position) -> bool {
    let mut probe = board.clone();
    probe.relocate(mv.piece(), landing);
    for &id in mv.captured() {
        probe.remove_piece(id);
    }
    let Some(piece) = probe.piece(mv.piece()) else {
        return false;
    };
    let targets = piece.possible_targets(probe.size(), true);
    let id = piece.id;
    targets.into_iter().any(|target| {
        let mut hop = Move::with_hops(id, vec![target]);
        check_legal(&probe, &mut hop, true)
    })
}

/// Whether `side` has a capture available anywhere on the board
pub fn is_mandatory_capture(board: &Board, side: Color) -> bool {
    board.side(side).pieces().iter().any(|&id| {
        let Some(piece) = board.piece(id) else {
            return false;
        };
        piece
            .possible_targets(board.size(), true)
            .into_iter()
            .any(|target| {
                let mut hop = Move::with_hops(id, vec![target]);
                check_legal(board, &mut hop, true)
            })
    })
}

/// Squares a piece can legally reach in one hop
///
/// Capture prefixes count, so a piece standing at the start of a jump
/// chain reports the first landing square even though the full move has
/// more hops.
pub fn legal_one_hop_targets(board: &Board, id: PieceId) -> Vec<Position> {
    let Some(piece) = board.piece(id) else {
        return Vec::new();
    };
    piece
        .possible_targets(board.size(), false)
        .into_iter()
        .filter(|&target| {
            let mut hop = Move::with_hops(id, vec![target]);
            check_legal(board, &mut hop, true)
        })
        .collect()
}

/// Whether `side` has any legal move at all
pub fn got_moves(board: &Board, side: Color) -> bool {
    board
        .side(side)
        .pieces()
        .iter()
        .any(|&id| !legal_one_hop_targets(board, id).is_empty())
}
