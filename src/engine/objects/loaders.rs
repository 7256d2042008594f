use crate::engine::assets::{AssetFinder, PackItem};
use crate::engine::registry::LoaderUpdater;
use crate::engine::scene::Scene;
use crate::types::{AssetKind, AssetReference, LoaderDeclaration};

/// Textures: images, atlases and spritesheets.
pub struct ImageLoaderUpdater;

impl LoaderUpdater for ImageLoaderUpdater {
    fn accepts(&self, asset: &AssetReference) -> bool {
        matches!(
            asset.asset_kind,
            AssetKind::Image | AssetKind::Atlas | AssetKind::MultiAtlas | AssetKind::Spritesheet
        )
    }

    fn declaration(
        &self,
        _scene: &Scene,
        asset: &AssetReference,
        finder: &AssetFinder,
    ) -> Option<LoaderDeclaration> {
        let key = &asset.key;
        match finder.find(key)? {
            PackItem::Image { url, .. } => Some(LoaderDeclaration::new("image", key).arg(url.as_str())),
            PackItem::Atlas {
                texture_url,
                atlas_url,
                ..
            } => Some(
                LoaderDeclaration::new("atlas", key)
                    .arg(texture_url.as_str())
                    .arg(atlas_url.as_str()),
            ),
            PackItem::MultiAtlas { url, path, .. } => Some(
                LoaderDeclaration::new("multiatlas", key)
                    .arg(url.as_str())
                    .arg(path.as_str()),
            ),
            PackItem::Spritesheet {
                url, frame_config, ..
            } => Some(
                LoaderDeclaration::new("spritesheet", key)
                    .arg(url.as_str())
                    .arg(frame_config.clone()),
            ),
            PackItem::BitmapFont { .. } | PackItem::Unsupported => None,
        }
    }
}

pub struct BitmapFontLoaderUpdater;

impl LoaderUpdater for BitmapFontLoaderUpdater {
    fn accepts(&self, asset: &AssetReference) -> bool {
        asset.asset_kind == AssetKind::BitmapFont
    }

    fn declaration(
        &self,
        _scene: &Scene,
        asset: &AssetReference,
        finder: &AssetFinder,
    ) -> Option<LoaderDeclaration> {
        match finder.find(&asset.key)? {
            PackItem::BitmapFont {
                texture_url,
                font_data_url,
                ..
            } => Some(
                LoaderDeclaration::new("bitmapFont", &asset.key)
                    .arg(texture_url.as_str())
                    .arg(font_data_url.as_str()),
            ),
            _ => None,
        }
    }
}
