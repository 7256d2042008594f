//! Project configuration, read from `scene-compiler.json`.

use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::engine::assets::resolve_pack_paths;

pub const CONFIG_FILE_NAME: &str = "scene-compiler.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompilerConfig {
    /// Extension of the generated file written next to each scene.
    pub output_extension: String,
    /// Asset-pack files, relative to the config file's directory.
    pub asset_packs: Vec<PathBuf>,
    pub scene_super_class: String,
    pub prefab_super_class: String,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        CompilerConfig {
            output_extension: "js".into(),
            asset_packs: Vec::new(),
            scene_super_class: "Phaser.Scene".into(),
            prefab_super_class: "Phaser.GameObjects.Container".into(),
        }
    }
}

impl CompilerConfig {
    /// Read the config at `path`. A missing file gives the defaults, and so
    /// does an invalid one, with a warning.
    pub fn load(path: &Path) -> Self {
        let mut config = match std::fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str::<CompilerConfig>(&json) {
                Ok(config) => config,
                Err(e) => {
                    warn!("Invalid config {} ({e}), using defaults", path.display());
                    Self::default()
                }
            },
            Err(_) => {
                debug!("No config at {}, using defaults", path.display());
                Self::default()
            }
        };

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        config.asset_packs = resolve_pack_paths(base, &config.asset_packs);
        config
    }

    /// The config file inside `dir`.
    pub fn path_in(dir: &Path) -> PathBuf {
        dir.join(CONFIG_FILE_NAME)
    }

    /// Generated file for a scene: same stem, `output_extension` extension.
    pub fn output_path(&self, scene_path: &Path) -> PathBuf {
        scene_path.with_extension(self.output_extension.trim_start_matches('.'))
    }
}
