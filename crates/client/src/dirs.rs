//! Platform-specific directory utilities

use std::path::PathBuf;

/// Get the platform-specific log directory
///
/// Follows platform conventions:
/// - macOS: `~/Library/Caches/battle/logs`
/// - Linux: `~/.cache/battle/logs` (or `$XDG_CACHE_HOME/battle/logs`)
/// - Windows: `%LOCALAPPDATA%\battle\logs`
/// - Fallback: `/tmp/battle/logs`
///
/// `BATTLE_LOG_DIR` overrides all of the above.
pub fn log_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("BATTLE_LOG_DIR") {
        return PathBuf::from(dir);
    }

    let base_dir = directories::ProjectDirs::from("", "", "battle")
        .map(|dirs| dirs.cache_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("/tmp/battle"));

    base_dir.join("logs")
}

/// Directory holding `battle.toml`, `roster.ron` and `scenarios/`.
///
/// Resolution order: explicit argument, `BATTLE_DATA_DIR`, then the content
/// shipped next to the sources.
pub fn data_dir(explicit: Option<PathBuf>) -> PathBuf {
    explicit
        .or_else(|| std::env::var("BATTLE_DATA_DIR").ok().map(PathBuf::from))
        .unwrap_or_else(|| {
            PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../battle/content/data")
        })
}
