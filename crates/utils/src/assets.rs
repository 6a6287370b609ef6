use std::path::PathBuf;

use directories::ProjectDirs;

const ASSET_DIR_ENV: &str = "ROOMERY_ASSET_DIR";

/// Root directory for everything the server persists: the sqlite file, the
/// config file and uploaded images. `ROOMERY_ASSET_DIR` overrides the
/// platform default.
pub fn asset_dir() -> PathBuf {
    let dir = std::env::var(ASSET_DIR_ENV)
        .ok()
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(platform_asset_dir);
    if !dir.exists() {
        std::fs::create_dir_all(&dir).expect("Failed to create asset directory");
    }
    dir
}

fn platform_asset_dir() -> PathBuf {
    if cfg!(debug_assertions) {
        // Development data stays inside the checkout.
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../dev_assets")
    } else {
        ProjectDirs::from("uk", "roomery", "roomery")
            .expect("OS didn't give us a home directory")
            .data_dir()
            .to_path_buf()
    }
}

pub fn config_path() -> PathBuf {
    asset_dir().join("config.json")
}

pub fn storage_dir() -> PathBuf {
    asset_dir().join("storage")
}
