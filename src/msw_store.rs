// Persistence: map files and the best-times record
// Maps are map<N>.txt layout files; best times are one M:SS line per tier

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::msw_config::TIERS;
use crate::msw_error::StoreError;
use crate::msw_layout::MineLayout;

/// Stored time for a tier nobody has finished yet (100:00)
pub const WORST_TIME: Duration = Duration::from_secs(100 * 60);

/// Path of map `id` inside `dir`
pub fn map_path(dir: &Path, id: &str) -> PathBuf {
    dir.join(format!("map{id}.txt"))
}

/// Load map `id` from `dir`.
/// A missing or empty file is reported as `MapNotFound` so the caller can
/// tell the player and carry on.
pub fn load_map(dir: &Path, id: &str) -> Result<MineLayout, StoreError> {
    let path = map_path(dir, id);
    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(StoreError::MapNotFound(path)),
        Err(e) => return Err(StoreError::Io { path, source: e }),
    };
    if text.trim().is_empty() {
        return Err(StoreError::MapNotFound(path));
    }
    let layout = MineLayout::parse(&text)?;
    info!(
        "Loaded {}: {}x{} with {} mines",
        path.display(),
        layout.rows(),
        layout.cols(),
        layout.mine_count()
    );
    Ok(layout)
}

/// Ids of every map<N>.txt in `dir`, numeric ids in numeric order
pub fn available_maps(dir: &Path) -> Result<Vec<String>, StoreError> {
    let entries = fs::read_dir(dir).map_err(|e| StoreError::Io {
        path: dir.to_path_buf(),
        source: e,
    })?;
    let mut ids: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file())
        .filter_map(|entry| {
            let name = entry.file_name().into_string().ok()?;
            let id = name.strip_prefix("map")?.strip_suffix(".txt")?;
            (!id.is_empty()).then(|| id.to_string())
        })
        .collect();
    ids.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
    debug!("Found {} maps in {}", ids.len(), dir.display());
    Ok(ids)
}

/// Format a duration as minutes and zero-padded seconds, e.g. `1:05`
pub fn format_time(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// Parse a `M:SS` / `MM:SS` time string
pub fn parse_time(s: &str) -> Result<Duration, StoreError> {
    let bad = || StoreError::BadTime(s.to_string());
    let (minutes, seconds) = s.trim().split_once(':').ok_or_else(bad)?;
    let minutes: u64 = minutes.parse().map_err(|_| bad())?;
    let seconds: u64 = seconds.parse().map_err(|_| bad())?;
    if seconds >= 60 || minutes.checked_mul(60).is_none() {
        return Err(bad());
    }
    Ok(Duration::from_secs(minutes * 60 + seconds))
}

/// Best completion time per preset tier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BestTimes {
    times: [Duration; TIERS],
}

impl Default for BestTimes {
    fn default() -> Self {
        BestTimes {
            times: [WORST_TIME; TIERS],
        }
    }
}

impl BestTimes {
    /// Read best times from `path`. A missing file, or missing lines, count
    /// as `100:00`.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No best times at {}, using defaults", path.display());
                return Ok(BestTimes::default());
            }
            Err(e) => {
                return Err(StoreError::Io {
                    path: path.to_path_buf(),
                    source: e,
                });
            }
        };
        let mut best = BestTimes::default();
        for (slot, line) in best.times.iter_mut().zip(text.lines()) {
            *slot = parse_time(line)?;
        }
        Ok(best)
    }

    /// Like `load`, but never fails: unreadable files give the defaults and
    /// each bad line falls back to `100:00` on its own, so the good lines
    /// survive the next `save`.
    pub fn load_lenient(path: &Path) -> Self {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                if e.kind() != io::ErrorKind::NotFound {
                    warn!("Ignoring best times in {}: {}", path.display(), e);
                }
                return BestTimes::default();
            }
        };
        let mut best = BestTimes::default();
        for (tier, (slot, line)) in best.times.iter_mut().zip(text.lines()).enumerate() {
            match parse_time(line) {
                Ok(t) => *slot = t,
                Err(e) => warn!("Best time for tier {} reset: {}", tier, e),
            }
        }
        best
    }

    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        let text: String = self
            .times
            .iter()
            .map(|t| format_time(*t) + "\n")
            .collect();
        fs::write(path, text).map_err(|e| StoreError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }

    pub fn get(&self, tier: usize) -> Option<Duration> {
        self.times.get(tier).copied()
    }

    /// Store `elapsed` for `tier` if it beats the current record.
    /// Times are kept to the second; ties keep the old record.
    pub fn record(&mut self, tier: usize, elapsed: Duration) -> bool {
        let elapsed = Duration::from_secs(elapsed.as_secs());
        match self.times.get_mut(tier) {
            Some(best) if elapsed < *best => {
                info!(
                    "New best time for tier {}: {} (was {})",
                    tier,
                    format_time(elapsed),
                    format_time(*best)
                );
                *best = elapsed;
                true
            }
            _ => false,
        }
    }
}
