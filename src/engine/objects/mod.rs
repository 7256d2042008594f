//! Built-in object kinds and loader updaters.
//!
//! Each kind lives in its own module with its extension (construction, asset
//! listing and code generation) side by side.

mod bitmap_text;
mod container;
mod image;
mod loaders;

pub use bitmap_text::BitmapTextExtension;
pub use container::ContainerExtension;
pub use image::ImageExtension;
pub use loaders::{BitmapFontLoaderUpdater, ImageLoaderUpdater};

use crate::codegen::number;

use super::registry::ExtensionRegistry;
use super::scene::SceneObjectNode;

pub fn register_builtins(registry: &mut ExtensionRegistry) {
    registry.register_extension(Box::new(ImageExtension));
    registry.register_extension(Box::new(ContainerExtension));
    registry.register_extension(Box::new(BitmapTextExtension));

    registry.register_loader_updater(Box::new(ImageLoaderUpdater));
    registry.register_loader_updater(Box::new(BitmapFontLoaderUpdater));
}

/// The `x, y` arguments every factory call starts with.
fn position_args(node: &SceneObjectNode) -> Vec<String> {
    let t = node.transform();
    vec![number(t.x), number(t.y)]
}
