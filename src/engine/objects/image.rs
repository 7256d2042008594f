use std::rc::Rc;

use anyhow::Result;
use log::debug;

use crate::codegen::quote;
use crate::codegen::scene::SceneCodeGenerator;
use crate::engine::assets::AssetFinder;
use crate::engine::registry::{AssetsArgs, CreateObjectArgs, ObjectExtension};
use crate::engine::scene::SceneObjectNode;
use crate::engine::source::TextureRef;
use crate::types::AssetReference;

use super::position_args;

/// Texture keys Phaser substitutes for an absent or broken texture.
const DEFAULT_TEXTURE: &str = "__DEFAULT";
const MISSING_TEXTURE: &str = "__MISSING";

pub struct ImageExtension;

impl ObjectExtension for ImageExtension {
    fn type_name(&self) -> &str {
        "image"
    }

    fn create_object(&self, args: CreateObjectArgs<'_>) -> Result<SceneObjectNode> {
        Ok(SceneObjectNode::with_origin(Rc::clone(args.record), 0.5, 0.5))
    }

    fn assets(&self, args: AssetsArgs<'_>) -> Result<Vec<AssetReference>> {
        let Some(texture) = args.record.texture()? else {
            return Ok(Vec::new());
        };
        Ok(texture_asset(&texture, args.finder).into_iter().collect())
    }

    fn js_type(&self) -> &str {
        "Phaser.GameObjects.Image"
    }

    fn generate(&self, node: &SceneObjectNode, var: &str, generator: &mut SceneCodeGenerator<'_>) {
        let mut args = position_args(node);
        match node.record().texture() {
            Ok(Some(TextureRef { key, frame })) => {
                args.push(quote(&key));
                if let Some(frame) = frame {
                    args.push(quote(&frame));
                }
            }
            Ok(None) => args.push(quote(DEFAULT_TEXTURE)),
            // Already reported by the asset pass.
            Err(_) => args.push(quote(MISSING_TEXTURE)),
        }
        generator.create_call(var, "image", &args);
        generator.object_properties(node, var);
    }
}

/// The pack item behind a texture, or nothing when no pack knows the key.
fn texture_asset(texture: &TextureRef, finder: &AssetFinder) -> Option<AssetReference> {
    let Some(kind) = finder.find(&texture.key).and_then(|item| item.kind()) else {
        debug!("Texture \"{}\" is not in any asset pack", texture.key);
        return None;
    };
    Some(AssetReference::new(kind, &texture.key).with_frame(texture.frame.clone()))
}
