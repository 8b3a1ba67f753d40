//! # mswpr
//!
//! A classic Minesweeper engine: a rectangular board of covered squares,
//! some hiding mines. The player reveals squares or flags suspected mines
//! until a mine goes off (loss) or every square is correctly revealed or
//! flagged (win).
//!
//! ## Modules
//!
//! - `msw_layout`: immutable mine placement, random generation, map text
//! - `msw_game`: the game session (reveal with flood fill, flags, win/loss)
//! - `msw_store`: `map<N>.txt` files and the best-times record
//! - `msw_config`: difficulty presets and the TOML configuration
//! - `msw_cli`: a line-oriented console front end
//! - `msw_error`: error types

pub mod msw_cli;
pub mod msw_config;
pub mod msw_error;
pub mod msw_game;
pub mod msw_layout;
pub mod msw_store;

pub use crate::msw_config::{Config, Difficulty, TIERS};
pub use crate::msw_error::{ConfigError, GameError, StoreError};
pub use crate::msw_game::{CellView, FlagPolicy, GameSession, GameStatus, RevealOutcome};
pub use crate::msw_layout::MineLayout;
pub use crate::msw_store::BestTimes;
