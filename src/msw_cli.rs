// Line-oriented console front end
// Menu, map loading, board printing and move prompts over any reader/writer

use rand::rngs::StdRng;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::msw_config::{Config, Difficulty, TIERS};
use crate::msw_game::{CellView, GameSession, GameStatus, RevealOutcome};
use crate::msw_layout::MineLayout;
use crate::msw_store::{self, BestTimes, format_time};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Move {
    Flag,
    Remove,
    Safe,
}

/// Character shown for a cell. Mines under hidden cells are drawn as `*`
/// when `show_mine` is set (after a loss).
pub fn cell_char(view: CellView, show_mine: bool) -> char {
    match view {
        CellView::Hidden if show_mine => '*',
        CellView::Hidden => ' ',
        CellView::Flagged => 'x',
        CellView::Revealed(n) => char::from(b'0' + n),
        CellView::Exploded => '!',
    }
}

/// Print the board with a column header and row numbers
pub fn render_board<W: Write>(out: &mut W, game: &GameSession, show_mines: bool) -> io::Result<()> {
    let header: String = (0..game.cols())
        .map(|c| char::from(b'0' + (c % 10) as u8))
        .collect();
    writeln!(out, "   {header}")?;
    for (r, row) in game.view_rows().enumerate() {
        let line: String = row
            .iter()
            .enumerate()
            .map(|(c, v)| cell_char(*v, show_mines && game.layout().has_mine(r, c)))
            .collect();
        writeln!(out, "{r:>2} {line}")?;
    }
    writeln!(out, "Mines left: {}", game.mines_remaining())
}

/// Interactive session driver
pub struct Console<R, W> {
    input: R,
    out: W,
    cfg: Config,
    cfg_path: Option<PathBuf>,
    best: BestTimes,
    rng: StdRng,
    game: Option<GameSession>,
    tier: Option<usize>, // Best-times tier of the current game, None for maps/custom
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, out: W, cfg: Config, best: BestTimes, rng: StdRng) -> Self {
        Console {
            input,
            out,
            cfg,
            cfg_path: None,
            best,
            rng,
            game: None,
            tier: None,
        }
    }

    /// Persist difficulty changes to this config file
    pub fn with_config_path(mut self, path: PathBuf) -> Self {
        self.cfg_path = Some(path);
        self
    }

    pub fn best_times(&self) -> &BestTimes {
        &self.best
    }

    pub fn game(&self) -> Option<&GameSession> {
        self.game.as_ref()
    }

    /// Read one trimmed line after printing `msg`. None on end of input.
    fn prompt(&mut self, msg: &str) -> io::Result<Option<String>> {
        write!(self.out, "{msg}")?;
        self.out.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Main menu loop; returns when the player quits or input ends
    pub fn run(&mut self) -> io::Result<()> {
        writeln!(self.out, "Welcome to Minesweeper!")?;
        loop {
            let Some(reply) =
                self.prompt("Choose an action: (n)ew game, (l)oad map, (p)lay, (b)est times, (q)uit ")?
            else {
                return Ok(());
            };
            match reply.as_str() {
                "n" => self.new_game()?,
                "l" => self.choose_map()?,
                "p" => {
                    if self.game.is_some() {
                        self.play()?;
                    } else {
                        writeln!(self.out, "You must start a game or load a map first.")?;
                    }
                }
                "b" => self.show_best_times()?,
                "q" => return Ok(()),
                _ => writeln!(self.out, "Invalid entry. Must be 'n', 'l', 'p', 'b', or 'q'.")?,
            }
        }
    }

    fn new_game(&mut self) -> io::Result<()> {
        let msg = format!(
            "Choose a level (0-{}), (c)ustom, or press enter for {}: ",
            TIERS - 1,
            self.cfg.difficulty.name()
        );
        let Some(reply) = self.prompt(&msg)? else {
            return Ok(());
        };
        let difficulty = match reply.as_str() {
            "" => self.cfg.difficulty.clone(),
            "c" => Difficulty::Custom(self.cfg.custom_rows, self.cfg.custom_cols, self.cfg.custom_mines),
            s => match s.parse::<usize>() {
                Ok(i) if i < TIERS => Difficulty::from_index(i, 0, 0, 0),
                _ => {
                    writeln!(self.out, "Invalid entry. Must be 0-{}, 'c', or empty.", TIERS - 1)?;
                    return Ok(());
                }
            },
        };

        let (rows, cols, mines) = difficulty.params();
        match MineLayout::generate(rows, cols, mines, &mut self.rng) {
            Ok(layout) => {
                self.game = Some(GameSession::with_policy(layout, self.cfg.reveal_flagged));
                self.tier = difficulty.tier();
                writeln!(self.out, "New {} game: {rows}x{cols} with {mines} mines.", difficulty.name())?;
            }
            Err(e) => {
                writeln!(self.out, "{e}")?;
                return Ok(());
            }
        }

        if difficulty != self.cfg.difficulty {
            self.cfg.difficulty = difficulty;
            if let Some(path) = &self.cfg_path {
                if let Err(e) = self.cfg.save(path) {
                    warn!("Could not save configuration: {}", e);
                }
            }
        }
        Ok(())
    }

    fn choose_map(&mut self) -> io::Result<()> {
        let maps = match msw_store::available_maps(&self.cfg.maps_dir) {
            Ok(maps) => maps,
            Err(e) => {
                warn!("Could not list maps: {}", e);
                Vec::new()
            }
        };
        writeln!(self.out, "Available maps: {}", maps.join(", "))?;
        loop {
            let Some(reply) = self.prompt("Enter a map number, or return to (m)enu: ")? else {
                return Ok(());
            };
            match reply.as_str() {
                "m" | "q" => return Ok(()),
                "" => writeln!(self.out, "Invalid entry. Must be a map number or 'm'.")?,
                id => {
                    match msw_store::load_map(&self.cfg.maps_dir, id) {
                        Ok(layout) => {
                            self.game = Some(GameSession::with_policy(layout, self.cfg.reveal_flagged));
                            self.tier = None;
                            writeln!(self.out, "Map {id} loaded.")?;
                        }
                        Err(e) => writeln!(self.out, "{e}")?,
                    }
                    return Ok(());
                }
            }
        }
    }

    fn show_best_times(&mut self) -> io::Result<()> {
        for tier in 0..TIERS {
            let name = Difficulty::from_index(tier, 0, 0, 0).name();
            let time = self.best.get(tier).map(format_time).unwrap_or_default();
            writeln!(self.out, "{name:<12} {time}")?;
        }
        Ok(())
    }

    /// Ask for a coordinate below `limit`. None means back to the menu.
    fn input_index(&mut self, msg: &str, limit: usize) -> io::Result<Option<usize>> {
        loop {
            let Some(reply) = self.prompt(msg)? else {
                return Ok(None);
            };
            if reply == "q" {
                return Ok(None);
            }
            match reply.parse::<usize>() {
                Ok(i) if i < limit => return Ok(Some(i)),
                _ => writeln!(self.out, "Invalid entry. Must be in 0-{}.", limit - 1)?,
            }
        }
    }

    fn input_move(&mut self) -> io::Result<Option<Move>> {
        loop {
            let Some(reply) =
                self.prompt("(f)lag a mine there, (r)emove a flag, or (d)eclare it safe? ")?
            else {
                return Ok(None);
            };
            match reply.as_str() {
                "f" => return Ok(Some(Move::Flag)),
                "r" => return Ok(Some(Move::Remove)),
                "d" => return Ok(Some(Move::Safe)),
                "q" => return Ok(None),
                _ => writeln!(self.out, "Invalid entry. Must be 'f', 'r', or 'd'.")?,
            }
        }
    }

    fn play(&mut self) -> io::Result<()> {
        loop {
            let (rows, cols) = match &self.game {
                Some(game) => {
                    render_board(&mut self.out, game, false)?;
                    (game.rows(), game.cols())
                }
                None => return Ok(()),
            };

            writeln!(self.out, "Choose a square to act upon")?;
            let Some(r) = self.input_index("Enter a row number: ", rows)? else {
                return Ok(());
            };
            let Some(c) = self.input_index("Enter a column number: ", cols)? else {
                return Ok(());
            };
            let Some(mv) = self.input_move()? else {
                return Ok(());
            };

            let Some(game) = self.game.as_mut() else {
                return Ok(());
            };
            debug!("Console move {:?} at ({}, {})", mv, r, c);
            let result = match mv {
                Move::Flag => game.flag(r, c),
                Move::Remove => game.unflag(r, c),
                Move::Safe => match game.reveal(r, c) {
                    Ok(RevealOutcome::Unchanged)
                        if game.cell_view(r, c) == Ok(CellView::Flagged) =>
                    {
                        writeln!(
                            self.out,
                            "Square ({r},{c}) is flagged. Remove the flag before declaring it safe."
                        )?;
                        Ok(())
                    }
                    other => other.map(|_| ()),
                },
            };
            if let Err(e) = result {
                writeln!(self.out, "{e}")?;
            }

            match game.status() {
                GameStatus::InProgress => {}
                GameStatus::Won => return self.game_won(),
                GameStatus::Lost => return self.game_lost(),
            }
        }
    }

    fn game_won(&mut self) -> io::Result<()> {
        let Some(game) = self.game.take() else {
            return Ok(());
        };
        render_board(&mut self.out, &game, false)?;
        let elapsed = game.elapsed();
        writeln!(self.out, "Congratulations! You won! Time: {}", format_time(elapsed))?;
        if let Some(tier) = self.tier {
            if self.best.record(tier, elapsed) {
                writeln!(self.out, "New best time!")?;
                if let Err(e) = self.best.save(&self.cfg.best_times_path()) {
                    warn!("Could not save best times: {}", e);
                }
            }
        }
        self.install_replay(&game);
        Ok(())
    }

    /// Keep the finished layout around for another try. A board whose mines
    /// have been seen no longer counts toward best times.
    fn install_replay(&mut self, game: &GameSession) {
        self.game = Some(game.replay());
        self.tier = None;
    }

    fn game_lost(&mut self) -> io::Result<()> {
        let Some(game) = self.game.take() else {
            return Ok(());
        };
        render_board(&mut self.out, &game, true)?;
        writeln!(self.out, "Oops! You hit a mine! Game over.")?;
        self.install_replay(&game);
        Ok(())
    }
}
