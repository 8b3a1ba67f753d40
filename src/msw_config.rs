// Configuration management
// Difficulty presets, user preferences and TOML persistence

use directories::ProjectDirs;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::msw_error::ConfigError;
use crate::msw_game::FlagPolicy;

/// Difficulty presets and custom settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Difficulty {
    Beginner,                    // 9x9, 10 mines
    Intermediate,                // 16x16, 40 mines
    Expert,                      // 23x23, 99 mines
    Master,                      // 26x26, 150 mines
    Custom(usize, usize, usize), // rows, cols, mines
}

/// Number of preset tiers that keep a best time
pub const TIERS: usize = 4;

impl Serialize for Difficulty {
    /// Serialize difficulty as a human-readable string (not an index)
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Difficulty {
    /// Deserialize difficulty from its name in the config file
    fn deserialize<D>(deserializer: D) -> Result<Difficulty, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.as_str() {
            x if x == Difficulty::Beginner.name() => Ok(Difficulty::Beginner),
            x if x == Difficulty::Intermediate.name() => Ok(Difficulty::Intermediate),
            x if x == Difficulty::Expert.name() => Ok(Difficulty::Expert),
            x if x == Difficulty::Master.name() => Ok(Difficulty::Master),
            // Custom is rebuilt from the custom_* fields after loading
            x if x == Difficulty::Custom(0, 0, 0).name() => Ok(Difficulty::Custom(0, 0, 0)),
            _ => Err(serde::de::Error::custom("unknown difficulty")),
        }
    }
}

impl Difficulty {
    /// Board dimensions and mine count: (rows, cols, mines)
    pub fn params(&self) -> (usize, usize, usize) {
        match self {
            Difficulty::Beginner => (9, 9, 10),
            Difficulty::Intermediate => (16, 16, 40),
            Difficulty::Expert => (23, 23, 99),
            Difficulty::Master => (26, 26, 150),
            Difficulty::Custom(r, c, n) => (*r, *c, *n),
        }
    }

    /// Stable identifier used in the config file
    pub fn name(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "Beginner",
            Difficulty::Intermediate => "Intermediate",
            Difficulty::Expert => "Expert",
            Difficulty::Master => "Master",
            Difficulty::Custom(_, _, _) => "Custom",
        }
    }

    /// Best-times tier of a preset; Custom boards are not ranked
    pub fn tier(&self) -> Option<usize> {
        match self {
            Difficulty::Beginner => Some(0),
            Difficulty::Intermediate => Some(1),
            Difficulty::Expert => Some(2),
            Difficulty::Master => Some(3),
            Difficulty::Custom(_, _, _) => None,
        }
    }

    /// Preset for a tier index; anything past the presets is Custom
    pub fn from_index(
        i: usize,
        custom_rows: usize,
        custom_cols: usize,
        custom_mines: usize,
    ) -> Difficulty {
        match i {
            0 => Difficulty::Beginner,
            1 => Difficulty::Intermediate,
            2 => Difficulty::Expert,
            3 => Difficulty::Master,
            _ => Difficulty::Custom(custom_rows, custom_cols, custom_mines),
        }
    }
}

/// User configuration, persisted to disk as TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // Difficulty used for new random games
    pub difficulty: Difficulty,

    // Custom difficulty parameters
    pub custom_rows: usize,
    pub custom_cols: usize,
    pub custom_mines: usize,

    // Whether a reveal request on a flagged cell is ignored or goes through
    pub reveal_flagged: FlagPolicy,

    // Where map<N>.txt files live and where best times are kept
    pub maps_dir: PathBuf,
    pub best_times_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            difficulty: Difficulty::Beginner,
            custom_rows: 20,
            custom_cols: 30,
            custom_mines: 120,
            reveal_flagged: FlagPolicy::Guard,
            maps_dir: PathBuf::from("."),
            best_times_file: PathBuf::from("best_times.txt"),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let mut cfg: Config = toml::from_str(&content)?;
        // A saved Custom difficulty carries its size in the custom_* fields
        if matches!(cfg.difficulty, Difficulty::Custom(_, _, _)) {
            cfg.difficulty = Difficulty::Custom(cfg.custom_rows, cfg.custom_cols, cfg.custom_mines);
        }
        cfg.validate()?;
        Ok(cfg)
    }

    /// Write configuration to a TOML file, creating parent directories
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let s = toml::to_string(self)?;
        let write_err = |e| ConfigError::FileWrite {
            path: path.to_path_buf(),
            source: e,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        fs::write(path, s).map_err(write_err)?;
        debug!("Saved config to {}", path.display());
        Ok(())
    }

    /// Reject custom settings the board generator would refuse
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (rows, cols, mines) = (self.custom_rows, self.custom_cols, self.custom_mines);
        if rows == 0 || cols == 0 {
            return Err(ConfigError::Validation(
                "custom_rows and custom_cols must be > 0".into(),
            ));
        }
        if rows.checked_mul(cols).is_none_or(|cells| mines >= cells) {
            return Err(ConfigError::Validation(format!(
                "custom_mines must be < {rows}x{cols}"
            )));
        }
        Ok(())
    }

    /// Board parameters for the selected difficulty
    pub fn board_params(&self) -> (usize, usize, usize) {
        self.difficulty.params()
    }

    /// Best-times file resolved against the maps directory when relative
    pub fn best_times_path(&self) -> PathBuf {
        if self.best_times_file.is_absolute() {
            self.best_times_file.clone()
        } else {
            self.maps_dir.join(&self.best_times_file)
        }
    }
}

/// Get the configuration file path
/// Uses the platform config directory (e.g. ~/.config/mswpr/mswpr.toml on Linux)
/// Falls back to the current directory if ProjectDirs is unavailable
pub fn config_path() -> Option<PathBuf> {
    let exe = env::current_exe().ok()?;
    let name = exe.file_stem().and_then(|s| s.to_str())?;
    match ProjectDirs::from("com", "mswpr", name) {
        Some(proj) => Some(proj.config_dir().join(format!("{name}.toml"))),
        None => env::current_dir()
            .ok()
            .map(|dir| dir.join(format!("{name}.toml"))),
    }
}

/// Load configuration from `path`, or fall back to defaults.
/// A missing file is created with the defaults; an unreadable or invalid
/// one is left alone and reported.
pub fn load_or_create_config(path: &Path) -> Config {
    if path.exists() {
        match Config::load(path) {
            Ok(cfg) => return cfg,
            Err(e) => {
                warn!("Using default configuration: {}", e);
                return Config::default();
            }
        }
    }
    let cfg = Config::default();
    if let Err(e) = cfg.save(path) {
        warn!("Could not write default configuration: {}", e);
    }
    cfg
}
