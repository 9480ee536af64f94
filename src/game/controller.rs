//! Async turn controller
//!
//! One task owns the board, history and phase for the whole game and
//! drives the control cycle: check for a finished game, service any
//! pending control task, ask the side to move for its move, validate
//! it, apply it, record it. Everything else talks to that task through
//! a [`ControllerHandle`].
//!
//! # Concurrency
//!
//! - Control tasks land in a single-slot [`PendingTask`] guarded by a
//!   mutex; a [`Notify`] wakes the controller out of a move suspension
//!   so the task is serviced before the next move is awaited
//! - Cancellation is a generation counter on a watch channel. The
//!   controller selects on it while suspended and polls it between
//!   steps; once bumped it can never be unbumped, so a cancelled game
//!   stays cancelled. Dropping every handle counts as cancellation.
//!
//! # Reference
//!
//! A move arriving in the same instant as a control task loses: the
//! task is serviced and the move is discarded, so the seat must submit
//! it again against the post-task board.

use crate::engine::{encode_square, MoveEngine};
use crate::error::GameResult;
use crate::game::board::{Board, BoardSnapshot};
use crate::game::display::{GameDisplay, NullDisplay};
use crate::game::history::GameHistory;
use crate::game::moves::Move;
use crate::game::piece::Color;
use crate::game::rules;
use crate::game::sources::MoveSource;
use crate::game::state::{GamePhase, PhaseState};
use crate::persist::ResultsTally;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Notify};
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Out-of-band request to the control cycle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlTask {
    Undo,
    Redo,
    Restart,
    Stop,
}

/// Single-slot holder for the next control task
///
/// A second request while one is waiting is refused rather than
/// queued; the caller sees the refusal and can retry after the
/// controller drains the slot.
#[derive(Debug, Default)]
pub struct PendingTask {
    pending: Option<ControlTask>,
}

impl PendingTask {
    pub fn request(&mut self, task: ControlTask) -> bool {
        if self.pending.is_some() {
            return false;
        }
        self.pending = Some(task);
        true
    }

    pub fn take(&mut self) -> Option<ControlTask> {
        self.pending.take()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// Cloneable handle for posting tasks and cancelling the game
///
/// Dropping every handle cancels the controller: the generation
/// channel closes and the control cycle winds down on its next check.
#[derive(Clone)]
pub struct ControllerHandle {
    pending: Arc<Mutex<PendingTask>>,
    notify: Arc<Notify>,
    generation: Arc<watch::Sender<u64>>,
}

impl ControllerHandle {
    /// Post a control task, waking the controller if it is suspended
    ///
    /// Returns false when another task is already waiting.
    pub fn post(&self, task: ControlTask) -> bool {
        let accepted = self.pending.lock().request(task);
        if accepted {
            self.notify.notify_one();
        } else {
            warn!("[GAME] Control task {:?} refused, another is pending", task);
        }
        accepted
    }

    /// Cancel the game without ceremony
    pub fn cancel(&self) {
        self.generation.send_modify(|generation| *generation += 1);
    }
}

/// Everything needed to start a game
pub struct GameSetup {
    pub board_size: u8,
    pub starting_rows: u8,
    pub white: Box<dyn MoveSource>,
    pub black: Box<dyn MoveSource>,
    pub display: Arc<dyn GameDisplay>,
    pub engine_sync: Option<Arc<dyn MoveEngine>>,
    pub learning: bool,
    pub tally: Option<ResultsTally>,
    pub yield_interval: Duration,
    pub position: Option<(Board, Color)>,
}

impl GameSetup {
    pub fn new(white: Box<dyn MoveSource>, black: Box<dyn MoveSource>) -> Self {
        Self {
            board_size: 8,
            starting_rows: 3,
            white,
            black,
            display: Arc::new(NullDisplay),
            engine_sync: None,
            learning: false,
            tally: None,
            yield_interval: Duration::from_millis(10),
            position: None,
        }
    }

    pub fn with_board(mut self, board_size: u8, starting_rows: u8) -> Self {
        self.board_size = board_size;
        self.starting_rows = starting_rows;
        self
    }

    pub fn with_display(mut self, display: Arc<dyn GameDisplay>) -> Self {
        self.display = display;
        self
    }

    /// Keep an engine's internal history in step with the game
    ///
    /// Required for learning feedback and for engines that track the
    /// game on their side of the bridge.
    pub fn with_engine_sync(mut self, engine: Arc<dyn MoveEngine>) -> Self {
        self.engine_sync = Some(engine);
        self
    }

    pub fn with_learning(mut self, learning: bool) -> Self {
        self.learning = learning;
        self
    }

    pub fn with_tally(mut self, tally: ResultsTally) -> Self {
        self.tally = Some(tally);
        self
    }

    pub fn with_yield_interval(mut self, interval: Duration) -> Self {
        self.yield_interval = interval;
        self
    }

    /// Start from a given position instead of the standard layout,
    /// for example one restored from a save file
    pub fn with_position(mut self, board: Board, turn: Color) -> Self {
        self.position = Some((board, turn));
        self
    }
}

/// What came out of a move suspension
enum Requested {
    Move(Move),
    Declined,
    Interrupted,
    Cancelled,
}

/// The task-owned game state and its control cycle
pub struct GameController {
    board: Board,
    history: GameHistory,
    phase: PhaseState,
    turn: Color,
    initial: BoardSnapshot,
    initial_turn: Color,
    white_source: Box<dyn MoveSource>,
    black_source: Box<dyn MoveSource>,
    display: Arc<dyn GameDisplay>,
    engine_sync: Option<Arc<dyn MoveEngine>>,
    learning: bool,
    tally: Option<ResultsTally>,
    pending: Arc<Mutex<PendingTask>>,
    task_notify: Arc<Notify>,
    generation: watch::Receiver<u64>,
    yield_interval: Duration,
    draw_pending: bool,
}

impl GameController {
    /// Build a controller and its handle
    ///
    /// The undo unit is two snapshots when exactly one seat is
    /// interactive, so an undo rewinds the engine's reply along with
    /// the player's move, and one snapshot otherwise.
    pub fn new(setup: GameSetup) -> GameResult<(Self, ControllerHandle)> {
        let (board, turn) = match setup.position {
            Some((board, turn)) => (board, turn),
            None => (
                Board::with_starting_rows(setup.board_size, setup.starting_rows)?,
                Color::White,
            ),
        };
        let undo_unit = if setup.white.is_interactive() != setup.black.is_interactive() {
            2
        } else {
            1
        };
        let initial = board.snapshot();
        let history = GameHistory::new(initial.clone(), undo_unit);

        let pending = Arc::new(Mutex::new(PendingTask::default()));
        let notify = Arc::new(Notify::new());
        let (generation_tx, generation_rx) = watch::channel(0u64);
        let handle = ControllerHandle {
            pending: pending.clone(),
            notify: notify.clone(),
            generation: Arc::new(generation_tx),
        };

        let controller = Self {
            board,
            history,
            phase: PhaseState::default(),
            turn,
            initial,
            initial_turn: turn,
            white_source: setup.white,
            black_source: setup.black,
            display: setup.display,
            engine_sync: setup.engine_sync,
            learning: setup.learning,
            tally: setup.tally,
            pending,
            task_notify: notify,
            generation: generation_rx,
            yield_interval: setup.yield_interval,
            draw_pending: false,
        };
        Ok((controller, handle))
    }

    /// Drive the game to its end and return the final phase
    pub async fn run(mut self) -> GamePhase {
        self.phase.transition_to(GamePhase::Running);
        info!(
            "[GAME] Game started on a {0}x{0} board, {1:?} to move",
            self.board.size(),
            self.turn
        );
        self.display
            .on_update(self.history.can_undo(), self.history.can_redo());

        loop {
            if self.cancelled() {
                return self.wind_down();
            }
            if self.draw_pending {
                return self.finish(GamePhase::Draw);
            }
            // Take the task in its own statement so the lock guard is
            // not held across the awaits below
            let task = self.pending.lock().take();
            if let Some(task) = task {
                match task {
                    ControlTask::Stop => return self.finish(GamePhase::Stopped),
                    ControlTask::Undo => self.service_undo().await,
                    ControlTask::Redo => self.service_redo().await,
                    ControlTask::Restart => self.service_restart().await,
                }
                continue;
            }

            let side = self.turn;
            if self.board.side(side).piece_count() == 0 || !rules::got_moves(&self.board, side) {
                let phase = match side.opponent() {
                    Color::White => GamePhase::WhiteWon,
                    Color::Black => GamePhase::BlackWon,
                };
                return self.finish(phase);
            }

            let mut mv = match self.request_move(side).await {
                Requested::Move(mv) => mv,
                Requested::Declined => {
                    warn!("[GAME] {:?} seat gave up, stopping the game", side);
                    return self.finish(GamePhase::Stopped);
                }
                Requested::Interrupted => continue,
                Requested::Cancelled => return self.wind_down(),
            };
            if self.pending.lock().is_pending() {
                debug!("[GAME] Discarding move, a control task arrived first");
                continue;
            }

            if let Err(err) = rules::validate(&self.board, &mut mv) {
                warn!("[GAME] Rejected move from the {:?} seat: {}", side, err);
                return self.finish(GamePhase::Stopped);
            }
            self.display.on_move_shown(&mv);
            self.notify_learn(side, &mv).await;
            if !self.board.apply_move(&mv) {
                warn!("[GAME] Move could not be applied, stopping the game");
                return self.finish(GamePhase::Stopped);
            }

            let occurrences = self.history.record(self.board.snapshot());
            if occurrences >= 3 {
                info!("[GAME] Position repeated {} times, draw after this turn", occurrences);
                self.draw_pending = true;
            }
            self.turn = side.opponent();
            self.display
                .on_update(self.history.can_undo(), self.history.can_redo());
            sleep(self.yield_interval).await;
        }
    }

    fn cancelled(&self) -> bool {
        self.generation.has_changed().unwrap_or(true)
    }

    /// Suspend on the seat's move, a posted task or cancellation
    async fn request_move(&mut self, side: Color) -> Requested {
        let Self {
            board,
            white_source,
            black_source,
            task_notify,
            generation,
            ..
        } = self;
        let source = match side {
            Color::White => white_source,
            Color::Black => black_source,
        };
        tokio::select! {
            _ = generation.changed() => Requested::Cancelled,
            _ = task_notify.notified() => Requested::Interrupted,
            mv = source.next_move(board, side) => match mv {
                Some(mv) => Requested::Move(mv),
                None => Requested::Declined,
            },
        }
    }

    /// End the game loudly: final phase, tally, display
    fn finish(&mut self, phase: GamePhase) -> GamePhase {
        self.phase.transition_to(phase);
        if let Some(tally) = &self.tally {
            let result = match phase {
                GamePhase::WhiteWon => tally.record_win(Color::White),
                GamePhase::BlackWon => tally.record_win(Color::Black),
                GamePhase::Draw => tally.record_draw(),
                _ => Ok(()),
            };
            if let Err(err) = result {
                warn!("[GAME] Failed to update results tally: {}", err);
            }
        }
        self.display.on_message(phase.message());
        self.display.on_update(false, false);
        info!("[GAME] Game over: {}", phase.message());
        phase
    }

    /// End the game silently after cancellation
    fn wind_down(&mut self) -> GamePhase {
        self.phase.transition_to(GamePhase::Stopped);
        info!("[GAME] Game cancelled");
        GamePhase::Stopped
    }

    async fn service_undo(&mut self) {
        let Some(snapshot) = self.history.undo().cloned() else {
            debug!("[GAME] Undo requested with nothing to undo");
            return;
        };
        self.board.restore(&snapshot);
        if self.history.flips_turn() {
            self.turn = self.turn.opponent();
        }
        if let Some(engine) = &self.engine_sync {
            if let Err(err) = engine.undo().await {
                warn!("[ENGINE] Engine undo failed: {}", err);
            }
        }
        self.display
            .on_update(self.history.can_undo(), self.history.can_redo());
    }

    async fn service_redo(&mut self) {
        let Some(snapshot) = self.history.redo().cloned() else {
            debug!("[GAME] Redo requested with nothing to redo");
            return;
        };
        self.board.restore(&snapshot);
        if self.history.flips_turn() {
            self.turn = self.turn.opponent();
        }
        if let Some(engine) = &self.engine_sync {
            if let Err(err) = engine.redo().await {
                warn!("[ENGINE] Engine redo failed: {}", err);
            }
        }
        self.display
            .on_update(self.history.can_undo(), self.history.can_redo());
    }

    async fn service_restart(&mut self) {
        self.board.restore(&self.initial);
        self.turn = self.initial_turn;
        self.history = GameHistory::new(self.initial.clone(), self.history.undo_unit());
        self.draw_pending = false;
        if let Some(engine) = &self.engine_sync {
            if let Err(err) = engine.clear_history().await {
                warn!("[ENGINE] Engine history clear failed: {}", err);
            }
        }
        info!("[GAME] Game restarted");
        self.display.on_message("new game");
        self.display
            .on_update(self.history.can_undo(), self.history.can_redo());
    }

    /// Hand an interactive seat's validated move to the engine
    ///
    /// Runs before the move is applied so the squares in the feedback
    /// still describe the position the engine last saw.
    async fn notify_learn(&self, side: Color, mv: &Move) {
        if !self.learning {
            return;
        }
        let Some(engine) = &self.engine_sync else {
            return;
        };
        let interactive = match side {
            Color::White => self.white_source.is_interactive(),
            Color::Black => self.black_source.is_interactive(),
        };
        if !interactive {
            return;
        }
        let size = self.board.size();
        let Some(piece) = self.board.piece(mv.piece()) else {
            return;
        };
        let mut path = Vec::with_capacity(mv.hop_count() + 1);
        path.push(encode_square(piece.pos, size));
        for &hop in mv.hops() {
            path.push(encode_square(hop, size));
        }
        let captured: Vec<u32> = mv
            .captured()
            .iter()
            .filter_map(|&id| self.board.piece(id))
            .map(|victim| encode_square(victim.pos, size))
            .collect();
        if let Err(err) = engine.learn(side, &path, &captured).await {
            warn!("[ENGINE] Learn feedback failed: {}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::piece::Rank;
    use crate::game::position::Position;
    use crate::game::sources::InteractiveSource;

    #[test]
    fn test_pending_task_single_slot() {
        let mut pending = PendingTask::default();
        assert!(!pending.is_pending());
        assert!(pending.request(ControlTask::Undo));
        assert!(!pending.request(ControlTask::Redo));
        assert!(pending.is_pending());
        assert_eq!(pending.take(), Some(ControlTask::Undo));
        assert!(pending.take().is_none());
        assert!(pending.request(ControlTask::Redo));
    }

    fn two_piece_setup() -> (GameSetup, crate::game::sources::MoveFeeder, crate::game::sources::MoveFeeder) {
        let mut board = Board::empty(8).unwrap();
        board.place_piece(Color::White, Rank::Man, Position::new(2, 3));
        board.place_piece(Color::Black, Rank::Man, Position::new(3, 4));
        let (white, white_feeder) = InteractiveSource::pair();
        let (black, black_feeder) = InteractiveSource::pair();
        let setup = GameSetup::new(Box::new(white), Box::new(black))
            .with_position(board, Color::White)
            .with_yield_interval(Duration::ZERO);
        (setup, white_feeder, black_feeder)
    }

    #[tokio::test]
    async fn test_capturing_the_last_piece_wins() {
        let (setup, white_feeder, _black_feeder) = two_piece_setup();
        let (controller, _handle) = GameController::new(setup).unwrap();

        assert!(white_feeder.submit(Move::with_hops(
            crate::game::piece::PieceId(0),
            vec![Position::new(4, 5)],
        )));
        let phase = tokio::spawn(controller.run()).await.unwrap();
        assert_eq!(phase, GamePhase::WhiteWon);
    }

    #[tokio::test]
    async fn test_illegal_move_stops_the_game() {
        let (setup, white_feeder, _black_feeder) = two_piece_setup();
        let (controller, _handle) = GameController::new(setup).unwrap();

        // Jumping to an empty diagonal with no victim in between
        assert!(white_feeder.submit(Move::with_hops(
            crate::game::piece::PieceId(0),
            vec![Position::new(4, 1)],
        )));
        let phase = tokio::spawn(controller.run()).await.unwrap();
        assert_eq!(phase, GamePhase::Stopped);
    }

    #[tokio::test]
    async fn test_cancel_winds_the_game_down() {
        let (setup, _white_feeder, _black_feeder) = two_piece_setup();
        let (controller, handle) = GameController::new(setup).unwrap();

        let game = tokio::spawn(controller.run());
        handle.cancel();
        assert_eq!(game.await.unwrap(), GamePhase::Stopped);
    }

    #[tokio::test]
    async fn test_dropping_every_handle_cancels() {
        let (setup, _white_feeder, _black_feeder) = two_piece_setup();
        let (controller, handle) = GameController::new(setup).unwrap();

        let game = tokio::spawn(controller.run());
        drop(handle);
        assert_eq!(game.await.unwrap(), GamePhase::Stopped);
    }

    #[tokio::test]
    async fn test_stop_task_finishes_the_game() {
        let (setup, _white_feeder, _black_feeder) = two_piece_setup();
        let (controller, handle) = GameController::new(setup).unwrap();

        let game = tokio::spawn(controller.run());
        assert!(handle.post(ControlTask::Stop));
        assert_eq!(game.await.unwrap(), GamePhase::Stopped);
    }

    #[tokio::test]
    async fn test_seat_hangup_stops_the_game() {
        let (setup, white_feeder, _black_feeder) = two_piece_setup();
        let (controller, _handle) = GameController::new(setup).unwrap();

        drop(white_feeder);
        let phase = tokio::spawn(controller.run()).await.unwrap();
        assert_eq!(phase, GamePhase::Stopped);
    }

    #[test]
    fn test_undo_unit_follows_seat_kinds() {
        let (white, _wf) = InteractiveSource::pair();
        let (black, _bf) = InteractiveSource::pair();
        let setup = GameSetup::new(Box::new(white), Box::new(black));
        let (controller, _handle) = GameController::new(setup).unwrap();
        assert_eq!(controller.history.undo_unit(), 1);

        let engine = Arc::new(crate::engine::RandomEngine::new(8));
        let (white, _wf) = InteractiveSource::pair();
        let black = crate::game::sources::EngineSource::new(engine);
        let setup = GameSetup::new(Box::new(white), Box::new(black));
        let (controller, _handle) = GameController::new(setup).unwrap();
        assert_eq!(controller.history.undo_unit(), 2);
    }
}
