//! Platform-specific directory paths

use std::path::PathBuf;

use directories::ProjectDirs;

const QUALIFIER: &str = "dev";
const ORGANIZATION: &str = "gridstore";
const APPLICATION: &str = "gridstore";

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
}

/// Get the cache directory.
///
/// - Linux: `$XDG_CACHE_HOME/gridstore` or `~/.cache/gridstore`
/// - macOS: `~/Library/Caches/dev.gridstore.gridstore`
/// - Windows: `C:\Users\<User>\AppData\Local\gridstore\gridstore\cache`
pub fn cache_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.cache_dir().to_path_buf())
}

/// Get the path to the latest log file.
pub fn log_file() -> Option<PathBuf> {
    cache_dir().map(|dir| dir.join("latest.log"))
}
