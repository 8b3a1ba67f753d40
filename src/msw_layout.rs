// Mine layout: the immutable ground truth of one board
// Handles random generation, parsing of map text and the canonical text form

use rand::Rng;
use rand::seq::index;
use std::fmt;

use crate::msw_error::GameError;

/// Ground-truth mine placement for one board.
/// Never changes once a session has been built from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MineLayout {
    rows: usize,
    cols: usize,
    mines: Vec<bool>, // Row-major, true = mine
    mine_count: usize,
}

/// Cells of the Moore neighborhood of (r, c), clipped to a `rows x cols` grid.
/// Corners have 3 neighbors, edges 5, interior cells 8.
pub fn neighbors(
    rows: usize,
    cols: usize,
    r: usize,
    c: usize,
) -> impl Iterator<Item = (usize, usize)> {
    let (r_lo, r_hi) = (r.saturating_sub(1), (r + 1).min(rows.saturating_sub(1)));
    let (c_lo, c_hi) = (c.saturating_sub(1), (c + 1).min(cols.saturating_sub(1)));
    (r_lo..=r_hi)
        .flat_map(move |nr| (c_lo..=c_hi).map(move |nc| (nr, nc)))
        .filter(move |&cell| cell != (r, c))
}

fn check_dimensions(rows: usize, cols: usize, mine_count: usize) -> Result<usize, GameError> {
    let invalid = GameError::InvalidConfiguration {
        rows,
        cols,
        mines: mine_count,
    };
    if rows == 0 || cols == 0 {
        return Err(invalid);
    }
    match rows.checked_mul(cols) {
        Some(cells) if mine_count < cells => Ok(cells),
        _ => Err(invalid),
    }
}

impl MineLayout {
    /// Place `mine_count` mines uniformly at random on a `rows x cols` board.
    /// Every subset of cells is equally likely; the first reveal is not protected.
    pub fn generate<R: Rng + ?Sized>(
        rows: usize,
        cols: usize,
        mine_count: usize,
        rng: &mut R,
    ) -> Result<Self, GameError> {
        let cells = check_dimensions(rows, cols, mine_count)?;
        let mut mines = vec![false; cells];
        for i in index::sample(rng, cells, mine_count) {
            mines[i] = true;
        }
        Ok(MineLayout {
            rows,
            cols,
            mines,
            mine_count,
        })
    }

    /// Parse a map: one line per row, `1` for a mine and `0` for a safe cell.
    /// Accepts `\n` or `\r\n` line breaks and ignores trailing blank lines.
    pub fn parse(text: &str) -> Result<Self, GameError> {
        let mut lines: Vec<&str> = text.lines().collect();
        while lines.last().is_some_and(|l| l.trim().is_empty()) {
            lines.pop();
        }
        if lines.is_empty() {
            return Err(GameError::MalformedLayout("empty layout".into()));
        }

        let mut mines = Vec::new();
        let mut cols = 0;
        for (r, line) in lines.iter().enumerate() {
            let start = mines.len();
            for (c, ch) in line.chars().enumerate() {
                match ch {
                    '0' => mines.push(false),
                    '1' => mines.push(true),
                    other => {
                        return Err(GameError::MalformedLayout(format!(
                            "unexpected character {other:?} at row {r}, column {c}"
                        )));
                    }
                }
            }
            let width = mines.len() - start;
            if r == 0 {
                cols = width;
            } else if width != cols {
                return Err(GameError::MalformedLayout(format!(
                    "row {r} has {width} cells, expected {cols}"
                )));
            }
        }

        let mine_count = mines.iter().filter(|m| **m).count();
        if mine_count == mines.len() {
            return Err(GameError::MalformedLayout("layout has no safe cell".into()));
        }
        Ok(MineLayout {
            rows: lines.len(),
            cols,
            mines,
            mine_count,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn mine_count(&self) -> usize {
        self.mine_count
    }

    pub fn contains(&self, r: usize, c: usize) -> bool {
        r < self.rows && c < self.cols
    }

    /// Whether (r, c) holds a mine. Coordinates outside the board hold none.
    pub fn has_mine(&self, r: usize, c: usize) -> bool {
        self.contains(r, c) && self.mines[r * self.cols + c]
    }

    pub fn neighbors(&self, r: usize, c: usize) -> impl Iterator<Item = (usize, usize)> {
        neighbors(self.rows, self.cols, r, c)
    }

    /// Number of mines around (r, c), 0 to 8
    pub fn neighbor_mines(&self, r: usize, c: usize) -> u8 {
        self.neighbors(r, c)
            .filter(|&(nr, nc)| self.has_mine(nr, nc))
            .count() as u8
    }

    /// All mine coordinates in row-major order
    pub fn mine_positions(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.mines
            .iter()
            .enumerate()
            .filter(|(_, m)| **m)
            .map(|(i, _)| (i / self.cols, i % self.cols))
    }
}

/// Canonical map text: every row on its own line, each line newline-terminated.
impl fmt::Display for MineLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.mines.chunks(self.cols) {
            for &mine in row {
                f.write_str(if mine { "1" } else { "0" })?;
            }
            f.write_str("\n")?;
        }
        Ok(())
    }
}
