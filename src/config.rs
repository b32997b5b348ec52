use std::fs;
use std::io;

use serde::{Deserialize, Serialize};

use crate::render::Settings;

const CONFIG_PATH: &str = "config.json";

/// App state persisted across runs. Scene contents are built in code and are
/// never written out; only the selection is remembered.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppConfig {
    pub settings: Settings,
    pub resolution_y: u32,
    pub scene: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            settings: Settings::default(),
            resolution_y: 300,
            scene: "showcase".to_owned(),
        }
    }
}

impl AppConfig {
    /// Falls back to defaults when the file is missing or malformed.
    pub fn load() -> Self {
        let mut config = match fs::read_to_string(CONFIG_PATH) {
            Ok(contents) => match serde_json::from_str::<AppConfig>(&contents) {
                Ok(config) => config,
                Err(err) => {
                    log::warn!("Ignoring malformed {CONFIG_PATH}: {err}");
                    AppConfig::default()
                }
            },
            Err(_) => AppConfig::default(),
        };

        config.settings.samples_per_pixel = config.settings.samples_per_pixel.clamp(1, 16);
        config.resolution_y = config.resolution_y.clamp(1, 2000);
        config
    }

    pub fn save(&self) -> io::Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(io::Error::other)?;
        fs::write(CONFIG_PATH, json)
    }
}
