use std::rc::Rc;

use anyhow::Result;

use crate::codegen::scene::SceneCodeGenerator;
use crate::engine::registry::{AssetsArgs, CreateObjectArgs, ObjectExtension};
use crate::engine::scene::SceneObjectNode;
use crate::types::AssetReference;

use super::position_args;

pub struct ContainerExtension;

impl ObjectExtension for ContainerExtension {
    fn type_name(&self) -> &str {
        "container"
    }

    fn create_object(&self, args: CreateObjectArgs<'_>) -> Result<SceneObjectNode> {
        Ok(SceneObjectNode::new(Rc::clone(args.record)))
    }

    /// Children list their own assets.
    fn assets(&self, _args: AssetsArgs<'_>) -> Result<Vec<AssetReference>> {
        Ok(Vec::new())
    }

    fn js_type(&self) -> &str {
        "Phaser.GameObjects.Container"
    }

    fn generate(&self, node: &SceneObjectNode, var: &str, generator: &mut SceneCodeGenerator<'_>) {
        generator.create_call(var, "container", &position_args(node));
        generator.object_properties(node, var);

        for child in node.children() {
            if let Some(child_var) = generator.generate_object(child) {
                generator.code().line(&format!("{var}.add({child_var});"));
            }
        }
    }

    fn accepts_children(&self) -> bool {
        true
    }
}
