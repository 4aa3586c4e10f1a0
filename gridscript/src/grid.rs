//! Reference host: an actor on a bounded grid.
//!
//! [`Grid`] exposes two commands, `moveX(n)` and `moveY(n)`.  Each one shifts
//! the actor by `n` cells along its axis, clamps the result to the board, then
//! waits `step_delay` before completing so a viewer can follow the moves.
//! Missing arguments count as 0 and extra ones are ignored.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tracing::trace;

use crate::command::CommandTable;
use crate::config::RunConfig;

// ── Types ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    /// Name of the host command moving along this axis.
    pub fn command(self) -> &'static str {
        match self {
            Axis::X => "moveX",
            Axis::Y => "moveY",
        }
    }
}

/// One completed move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub axis: Axis,
    /// Requested offset, before clamping.
    pub delta: i64,
    /// Position after the move.
    pub to: (i64, i64),
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}) -> ({}, {})", self.axis.command(), self.delta, self.to.0, self.to.1)
    }
}

type Observer = Arc<dyn Fn(&Move) + Send + Sync>;

#[derive(Debug, Default)]
struct State {
    pos: (i64, i64),
    history: Vec<Move>,
}

/// A `cols × rows` board with one actor on it.
///
/// Cloning a `Grid` gives another handle to the same board.
#[derive(Clone)]
pub struct Grid {
    cols: i64,
    rows: i64,
    step_delay: Duration,
    state: Arc<Mutex<State>>,
    observer: Option<Observer>,
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grid")
            .field("cols", &self.cols)
            .field("rows", &self.rows)
            .field("step_delay", &self.step_delay)
            .field("position", &self.position())
            .finish()
    }
}

impl Grid {
    /// A board of the given size with the actor at `start`, clamped onto it.
    pub fn new(cols: i64, rows: i64, start: (i64, i64)) -> Self {
        let cols = cols.max(1);
        let rows = rows.max(1);
        let pos = (start.0.clamp(0, cols - 1), start.1.clamp(0, rows - 1));
        Grid {
            cols,
            rows,
            step_delay: Duration::ZERO,
            state: Arc::new(Mutex::new(State { pos, history: Vec::new() })),
            observer: None,
        }
    }

    pub fn from_config(config: &RunConfig) -> Self {
        Grid::new(config.cols, config.rows, (config.start_x, config.start_y))
            .with_step_delay(Duration::from_millis(config.step_delay_ms))
    }

    pub fn with_step_delay(mut self, delay: Duration) -> Self {
        self.step_delay = delay;
        self
    }

    /// Call `f` after every move, before the step delay starts.
    pub fn with_observer(mut self, f: impl Fn(&Move) + Send + Sync + 'static) -> Self {
        self.observer = Some(Arc::new(f));
        self
    }

    pub fn size(&self) -> (i64, i64) {
        (self.cols, self.rows)
    }

    pub fn position(&self) -> (i64, i64) {
        self.lock().pos
    }

    /// Every move so far, oldest first.
    pub fn history(&self) -> Vec<Move> {
        self.lock().history.clone()
    }

    /// Command table exposing `moveX` and `moveY` on this board.
    pub fn commands(&self) -> CommandTable {
        let mut table = CommandTable::new();
        for axis in [Axis::X, Axis::Y] {
            let grid = self.clone();
            table.register(axis.command(), move |args| {
                let grid = grid.clone();
                async move {
                    grid.step(axis, args.first().copied().unwrap_or(0)).await;
                    Ok(())
                }
            });
        }
        table
    }

    /// Move the actor and wait out the step delay.
    pub async fn step(&self, axis: Axis, delta: i64) -> Move {
        let mv = self.apply(axis, delta);
        trace!(%mv, "move");
        if let Some(observer) = &self.observer {
            observer(&mv);
        }
        if !self.step_delay.is_zero() {
            tokio::time::sleep(self.step_delay).await;
        }
        mv
    }

    fn apply(&self, axis: Axis, delta: i64) -> Move {
        let mut state = self.lock();
        let (x, y) = state.pos;
        state.pos = match axis {
            Axis::X => (x.saturating_add(delta).clamp(0, self.cols - 1), y),
            Axis::Y => (x, y.saturating_add(delta).clamp(0, self.rows - 1)),
        };
        let mv = Move { axis, delta, to: state.pos };
        state.history.push(mv);
        mv
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
