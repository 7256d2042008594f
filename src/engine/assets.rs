//! Asset packs and asset resolution.
//!
//! `AssetFinder` indexes the asset-pack files of a project by key.
//! `AssetResolver` asks every node's extension which assets it needs and turns
//! the unique ones into loader declarations.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::Deserialize;
use serde_json::Value;

use crate::error::{CompileError, Result};
use crate::types::{AssetKind, AssetReference, Diagnostic, LoaderDeclaration};

use super::registry::{AssetsArgs, ExtensionRegistry};
use super::scene::Scene;

// ---------------------------------------------------------------------------
// Asset packs
// ---------------------------------------------------------------------------

/// One entry of an asset pack's `files` list.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PackItem {
    Image {
        key: String,
        url: String,
    },
    Atlas {
        key: String,
        #[serde(rename = "textureURL")]
        texture_url: String,
        #[serde(rename = "atlasURL")]
        atlas_url: String,
    },
    #[serde(rename = "multiatlas")]
    MultiAtlas {
        key: String,
        url: String,
        #[serde(default)]
        path: String,
    },
    Spritesheet {
        key: String,
        url: String,
        #[serde(rename = "frameConfig", default)]
        frame_config: Value,
    },
    BitmapFont {
        key: String,
        #[serde(rename = "textureURL")]
        texture_url: String,
        #[serde(rename = "fontDataURL")]
        font_data_url: String,
    },
    #[serde(other)]
    Unsupported,
}

impl PackItem {
    pub fn key(&self) -> Option<&str> {
        match self {
            PackItem::Image { key, .. }
            | PackItem::Atlas { key, .. }
            | PackItem::MultiAtlas { key, .. }
            | PackItem::Spritesheet { key, .. }
            | PackItem::BitmapFont { key, .. } => Some(key),
            PackItem::Unsupported => None,
        }
    }

    pub fn kind(&self) -> Option<AssetKind> {
        match self {
            PackItem::Image { .. } => Some(AssetKind::Image),
            PackItem::Atlas { .. } => Some(AssetKind::Atlas),
            PackItem::MultiAtlas { .. } => Some(AssetKind::MultiAtlas),
            PackItem::Spritesheet { .. } => Some(AssetKind::Spritesheet),
            PackItem::BitmapFont { .. } => Some(AssetKind::BitmapFont),
            PackItem::Unsupported => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct AssetFinder {
    items: HashMap<String, PackItem>,
}

impl AssetFinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index every pack file. The first item registered under a key wins.
    pub fn from_pack_files<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        let mut finder = Self::new();
        for path in paths {
            let path = path.as_ref();
            let text = fs::read_to_string(path).map_err(|e| CompileError::io(path, e))?;
            let pack: Value = serde_json::from_str(&text)?;
            finder.add_pack(&pack);
            debug!("Indexed asset pack {}", path.display());
        }
        Ok(finder)
    }

    /// Index one pack document: every top-level section with a `files` list.
    pub fn add_pack(&mut self, pack: &Value) {
        let Some(sections) = pack.as_object() else {
            warn!("Ignoring asset pack that is not a JSON object");
            return;
        };

        for (section_name, section) in sections {
            let Some(files) = section.get("files").and_then(Value::as_array) else {
                continue;
            };
            for file in files {
                match PackItem::deserialize(file) {
                    Ok(item) => self.add_item(item),
                    Err(e) => warn!("Skipping invalid entry in pack section \"{section_name}\": {e}"),
                }
            }
        }
    }

    pub fn add_item(&mut self, item: PackItem) {
        let Some(key) = item.key().map(str::to_string) else {
            return;
        };
        if self.items.contains_key(&key) {
            warn!("Duplicate asset key \"{key}\" in asset packs, keeping the first one");
            return;
        }
        self.items.insert(key, item);
    }

    pub fn find(&self, key: &str) -> Option<&PackItem> {
        self.items.get(key)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Resolve pack paths from a config file relative to its directory.
pub fn resolve_pack_paths(base: &Path, packs: &[PathBuf]) -> Vec<PathBuf> {
    packs
        .iter()
        .map(|p| if p.is_absolute() { p.clone() } else { base.join(p) })
        .collect()
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

pub struct AssetResolver<'r> {
    registry: &'r ExtensionRegistry,
}

impl<'r> AssetResolver<'r> {
    pub fn new(registry: &'r ExtensionRegistry) -> Self {
        AssetResolver { registry }
    }

    /// Unique assets needed by the scene, in first-discovery order.
    ///
    /// A failing extension contributes nothing and leaves a diagnostic.
    pub fn collect_assets(
        &self,
        scene: &Scene,
        finder: &AssetFinder,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Vec<AssetReference> {
        let mut seen = HashSet::new();
        let mut assets = Vec::new();

        for node in scene.walk() {
            let Some(ext) = self.registry.extension(node.type_name()) else {
                continue;
            };

            let found = match ext.assets(AssetsArgs {
                record: node.record(),
                finder,
                scene,
            }) {
                Ok(found) => found,
                Err(e) => {
                    let message = format!("Cannot list the assets of \"{}\": {e:#}", node.type_name());
                    warn!("{message}");
                    diagnostics.push(Diagnostic::new(Some(node.id()), message));
                    continue;
                }
            };

            for asset in found {
                if seen.insert(asset.clone()) {
                    assets.push(asset);
                }
            }
        }

        assets
    }

    /// Loader declarations for the scene. Assets no updater accepts are
    /// left out, they are expected to be loaded elsewhere.
    pub fn resolve(
        &self,
        scene: &Scene,
        finder: &AssetFinder,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Vec<LoaderDeclaration> {
        let mut declarations: Vec<LoaderDeclaration> = Vec::new();

        for asset in self.collect_assets(scene, finder, diagnostics) {
            let Some(updater) = self.registry.loader_updater_for(&asset) else {
                debug!("No loader updater accepts {} \"{}\"", asset.asset_kind, asset.key);
                continue;
            };
            if let Some(declaration) = updater.declaration(scene, &asset, finder) {
                // Two frames of one texture share a single load call.
                if !declarations.contains(&declaration) {
                    declarations.push(declaration);
                }
            }
        }

        declarations
    }
}
