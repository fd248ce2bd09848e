use anyhow::Result;
use std::env;
use std::path::PathBuf;

const SETTING_PATH_ENV: &str = "CLIPSYNC_CONFIG";
const DEFAULT_SETTING_FILE: &str = "clipsync.json";

/// Resolve the settings file path.
///
/// `CLIPSYNC_CONFIG` wins when set; otherwise the file lives next to the
/// working directory the server was started from.
pub fn get_setting_path() -> Result<PathBuf> {
    if let Ok(path) = env::var(SETTING_PATH_ENV) {
        return Ok(PathBuf::from(path));
    }
    Ok(env::current_dir()?.join(DEFAULT_SETTING_FILE))
}
