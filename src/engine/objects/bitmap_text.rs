use std::rc::Rc;

use anyhow::{Result, bail};

use crate::codegen::scene::SceneCodeGenerator;
use crate::codegen::{number, quote};
use crate::engine::registry::{AssetsArgs, CreateObjectArgs, ObjectExtension};
use crate::engine::scene::SceneObjectNode;
use crate::types::{AssetKind, AssetReference};

use super::position_args;

pub struct BitmapTextExtension;

impl ObjectExtension for BitmapTextExtension {
    fn type_name(&self) -> &str {
        "bitmapText"
    }

    fn create_object(&self, args: CreateObjectArgs<'_>) -> Result<SceneObjectNode> {
        Ok(SceneObjectNode::with_origin(Rc::clone(args.record), 0.0, 0.0))
    }

    fn assets(&self, args: AssetsArgs<'_>) -> Result<Vec<AssetReference>> {
        let font = match args.record.get("font") {
            None => return Ok(Vec::new()),
            Some(value) => match value.as_str() {
                Some(font) => font,
                None => bail!("`font` must be a string, found {value}"),
            },
        };

        match args.finder.find(font).and_then(|item| item.kind()) {
            Some(AssetKind::BitmapFont) => Ok(vec![AssetReference::new(AssetKind::BitmapFont, font)]),
            _ => Ok(Vec::new()),
        }
    }

    fn js_type(&self) -> &str {
        "Phaser.GameObjects.BitmapText"
    }

    fn generate(&self, node: &SceneObjectNode, var: &str, generator: &mut SceneCodeGenerator<'_>) {
        let record = node.record();
        let mut args = position_args(node);

        let font = record.str_prop("font").unwrap_or_default();
        if font.is_empty() {
            generator.diagnostic(node, "Bitmap text has no font");
        }
        args.push(quote(font));
        args.push(quote(record.str_prop("text").unwrap_or_default()));

        let size = record.f64_prop("fontSize");
        let align = record.f64_prop("align");
        if size.is_some() || align.is_some() {
            args.push(size.map_or_else(|| "undefined".into(), number));
        }
        if let Some(align) = align {
            args.push(number(align));
        }

        generator.create_call(var, "bitmapText", &args);
        generator.object_properties(node, var);
    }
}
