// Game session: the mutable player-facing state of one board
// Reveal with flood fill, flagging, win/loss detection and the game clock

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, trace};

use crate::msw_error::GameError;
use crate::msw_layout::MineLayout;

/// What the player can see of a single cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellView {
    Hidden,
    Flagged,
    Revealed(u8), // Number of neighboring mines (0-8)
    Exploded,     // The mine that ended the game
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    InProgress,
    Won,
    Lost,
}

impl GameStatus {
    pub fn is_over(self) -> bool {
        self != GameStatus::InProgress
    }
}

/// How a reveal request on a flagged cell is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FlagPolicy {
    /// Flagged cells ignore reveal requests until unflagged
    #[default]
    Guard,
    /// The flag is removed and the cell revealed as if it were hidden
    RevealThrough,
}

/// Result of a single reveal request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevealOutcome {
    /// Nothing changed (cell already open, guarded by a flag, or game over)
    Unchanged,
    /// Safe cells opened by this request, in the order they were opened
    Opened {
        cells: Vec<(usize, usize)>,
        won: bool,
    },
    /// A mine was hit and the game is lost
    Exploded { at: (usize, usize) },
}

/// One playthrough of a board, from creation to a terminal status.
/// Owns its layout and visibility grid exclusively.
#[derive(Debug, Clone)]
pub struct GameSession {
    layout: MineLayout,
    view: Vec<CellView>, // Row-major, same dimensions as the layout
    mines_remaining: isize,
    status: GameStatus,
    policy: FlagPolicy,
    start_time: Option<Instant>, // Set while the clock runs
    elapsed: Duration,           // Frozen time once the clock stops
}

impl GameSession {
    /// Start a session on `layout` with every cell hidden
    pub fn new(layout: MineLayout) -> Self {
        Self::with_policy(layout, FlagPolicy::default())
    }

    pub fn with_policy(layout: MineLayout, policy: FlagPolicy) -> Self {
        let cells = layout.rows() * layout.cols();
        GameSession {
            view: vec![CellView::Hidden; cells],
            mines_remaining: layout.mine_count() as isize,
            status: GameStatus::InProgress,
            policy,
            start_time: None,
            elapsed: Duration::ZERO,
            layout,
        }
    }

    /// Generate a random board and start a session on it.
    /// The same seed always yields the same layout.
    pub fn new_game(
        rows: usize,
        cols: usize,
        mine_count: usize,
        seed: Option<u64>,
    ) -> Result<Self, GameError> {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let layout = MineLayout::generate(rows, cols, mine_count, &mut rng)?;
        info!(
            "Creating new game: {}x{} with {} mines",
            rows, cols, mine_count
        );
        Ok(Self::new(layout))
    }

    /// Start a session on a layout given as map text
    pub fn load(text: &str) -> Result<Self, GameError> {
        let layout = MineLayout::parse(text)?;
        info!(
            "Loaded game: {}x{} with {} mines",
            layout.rows(),
            layout.cols(),
            layout.mine_count()
        );
        Ok(Self::new(layout))
    }

    /// A fresh session over the same layout and policy
    pub fn replay(&self) -> Self {
        Self::with_policy(self.layout.clone(), self.policy)
    }

    pub fn rows(&self) -> usize {
        self.layout.rows()
    }

    pub fn cols(&self) -> usize {
        self.layout.cols()
    }

    pub fn mine_count(&self) -> usize {
        self.layout.mine_count()
    }

    pub fn layout(&self) -> &MineLayout {
        &self.layout
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn policy(&self) -> FlagPolicy {
        self.policy
    }

    /// Mine count minus placed flags. Negative when the player over-flags.
    pub fn mines_remaining(&self) -> isize {
        self.mines_remaining
    }

    pub fn cell_view(&self, r: usize, c: usize) -> Result<CellView, GameError> {
        let idx = self.checked_index(r, c)?;
        Ok(self.view[idx])
    }

    /// Visibility grid row by row
    pub fn view_rows(&self) -> impl Iterator<Item = &[CellView]> {
        self.view.chunks(self.cols())
    }

    /// Time since the first reveal; frozen once the game is over
    pub fn elapsed(&self) -> Duration {
        match self.start_time {
            Some(t0) => t0.elapsed(),
            None => self.elapsed,
        }
    }

    fn checked_index(&self, r: usize, c: usize) -> Result<usize, GameError> {
        if !self.layout.contains(r, c) {
            return Err(GameError::OutOfBounds {
                row: r,
                col: c,
                rows: self.rows(),
                cols: self.cols(),
            });
        }
        Ok(r * self.cols() + c)
    }

    fn ensure_in_progress(&self, r: usize, c: usize) -> Result<(), GameError> {
        if self.status.is_over() {
            return Err(GameError::InvalidTransition {
                row: r,
                col: c,
                reason: "the game is over",
            });
        }
        Ok(())
    }

    fn stop_clock(&mut self) {
        if let Some(t0) = self.start_time.take() {
            self.elapsed = t0.elapsed();
        }
    }

    fn finish(&mut self, status: GameStatus) {
        self.status = status;
        self.stop_clock();
        info!(
            "Game over: {:?} after {}s with {} mines unflagged",
            status,
            self.elapsed.as_secs(),
            self.mines_remaining
        );
    }

    /// Reveal the cell at (r, c).
    /// - A mine ends the game and only that cell becomes `Exploded`
    /// - A cell with no neighboring mines opens its whole zero region
    ///   plus the numbered cells bordering it
    /// - Flags are never crossed by the flood fill
    #[instrument(level = "trace", skip(self))]
    pub fn reveal(&mut self, r: usize, c: usize) -> Result<RevealOutcome, GameError> {
        let idx = self.checked_index(r, c)?;
        if self.status.is_over() {
            debug!("Ignoring reveal on finished game at ({}, {})", r, c);
            return Ok(RevealOutcome::Unchanged);
        }

        let current = self.view[idx];
        match current {
            CellView::Hidden => {}
            CellView::Flagged if self.policy == FlagPolicy::RevealThrough => {
                self.view[idx] = CellView::Hidden;
                self.mines_remaining += 1;
                debug!("Removed flag at ({}, {}) to reveal it", r, c);
            }
            state => {
                debug!("Ignoring reveal on {:?} cell ({}, {})", state, r, c);
                return Ok(RevealOutcome::Unchanged);
            }
        }

        if self.start_time.is_none() {
            self.start_time = Some(Instant::now());
        }

        if self.layout.has_mine(r, c) {
            self.view[idx] = CellView::Exploded;
            self.finish(GameStatus::Lost);
            return Ok(RevealOutcome::Exploded { at: (r, c) });
        }

        let cells = self.flood_fill(r, c);
        trace!("Opened {} cells from ({}, {})", cells.len(), r, c);
        let won = self.check_win();
        if won {
            self.finish(GameStatus::Won);
        }
        Ok(RevealOutcome::Opened { cells, won })
    }

    // Iterative fill over an explicit stack; depth never exceeds the cell count
    fn flood_fill(&mut self, r: usize, c: usize) -> Vec<(usize, usize)> {
        let cols = self.cols();
        let mut opened = Vec::new();
        let mut pending = vec![(r, c)];
        while let Some((r, c)) = pending.pop() {
            let idx = r * cols + c;
            if self.view[idx] != CellView::Hidden {
                continue;
            }
            let n = self.layout.neighbor_mines(r, c);
            self.view[idx] = CellView::Revealed(n);
            opened.push((r, c));
            if n == 0 {
                pending.extend(
                    self.layout
                        .neighbors(r, c)
                        .filter(|&(nr, nc)| self.view[nr * cols + nc] == CellView::Hidden),
                );
            }
        }
        opened
    }

    /// Flag a hidden cell as a suspected mine
    #[instrument(level = "trace", skip(self))]
    pub fn flag(&mut self, r: usize, c: usize) -> Result<(), GameError> {
        let idx = self.checked_index(r, c)?;
        self.ensure_in_progress(r, c)?;
        if self.view[idx] != CellView::Hidden {
            return Err(GameError::InvalidTransition {
                row: r,
                col: c,
                reason: "only hidden cells can be flagged",
            });
        }
        self.view[idx] = CellView::Flagged;
        self.mines_remaining -= 1;
        debug!("Cell ({}, {}) flagged", r, c);
        if self.check_win() {
            self.finish(GameStatus::Won);
        }
        Ok(())
    }

    /// Remove the flag from a flagged cell
    #[instrument(level = "trace", skip(self))]
    pub fn unflag(&mut self, r: usize, c: usize) -> Result<(), GameError> {
        let idx = self.checked_index(r, c)?;
        self.ensure_in_progress(r, c)?;
        if self.view[idx] != CellView::Flagged {
            return Err(GameError::InvalidTransition {
                row: r,
                col: c,
                reason: "only flagged cells can be unflagged",
            });
        }
        self.view[idx] = CellView::Hidden;
        self.mines_remaining += 1;
        debug!("Cell ({}, {}) unflagged", r, c);
        Ok(())
    }

    /// Flag a hidden cell or unflag a flagged one
    pub fn toggle_flag(&mut self, r: usize, c: usize) -> Result<(), GameError> {
        match self.cell_view(r, c)? {
            CellView::Flagged => self.unflag(r, c),
            _ => self.flag(r, c),
        }
    }

    /// True when no cell is hidden and every flag sits on a mine.
    /// A flag on a safe cell blocks the win until it is removed.
    pub fn check_win(&self) -> bool {
        let cols = self.cols();
        self.view.iter().enumerate().all(|(i, cell)| match cell {
            CellView::Hidden => false,
            CellView::Flagged => self.layout.has_mine(i / cols, i % cols),
            CellView::Revealed(_) | CellView::Exploded => true,
        })
    }
}
