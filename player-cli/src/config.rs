//! Optional `player.toml` overrides for the engine's tuning knobs. Looked up
//! first in the current directory, then under the XDG config home, same
//! order the rest of this codebase's corpus uses for its own config files.

use std::path::Path;
use std::time::Duration;

use player_core::PlayerConfig;
use serde::Deserialize;

#[derive(Deserialize, Default)]
pub struct Config {
    frames_per_block: Option<usize>,
    max_blocks: Option<usize>,
    wake_timeout_ms: Option<u64>,
    destroy_timeout_ms: Option<u64>,
}

impl Config {
    pub fn apply(&self, mut base: PlayerConfig) -> PlayerConfig {
        if let Some(v) = self.frames_per_block {
            base.frames_per_block = v;
        }
        if let Some(v) = self.max_blocks {
            base.max_blocks = v;
        }
        if let Some(v) = self.wake_timeout_ms {
            base.wake_timeout = Duration::from_millis(v);
        }
        if let Some(v) = self.destroy_timeout_ms {
            base.destroy_timeout = Duration::from_millis(v);
        }
        base
    }
}

fn load_file(path: &Path) -> Option<Config> {
    log::debug!("looking for config in {}", path.display());
    let contents = std::fs::read_to_string(path).ok()?;

    match toml::from_str(&contents) {
        Ok(config) => {
            log::info!("reading config from {}", path.display());
            Some(config)
        }
        Err(e) => {
            log::error!("error reading config at {}: {e}", path.display());
            None
        }
    }
}

pub fn read() -> Config {
    if let Some(config) = load_file(Path::new("player.toml")) {
        return config;
    }

    if let Ok(dirs) = xdg::BaseDirectories::new() {
        if let Some(path) = dirs.find_config_file("player.toml") {
            if let Some(config) = load_file(&path) {
                return config;
            }
        }
    }

    Config::default()
}
