//! Scene graph builder.
//!
//! Builds the node forest in two passes over the description: first every
//! node is constructed by its extension (preorder, children attached in input
//! order), then every node reads its properties from its record. A record
//! whose type has no extension is skipped with its subtree.

use std::rc::Rc;

use log::warn;

use crate::types::Diagnostic;

use super::registry::{CreateObjectArgs, ExtensionRegistry};
use super::scene::{Scene, SceneObjectNode};
use super::source::{ObjectRecord, SceneDescription};

pub struct SceneMaker<'r> {
    registry: &'r ExtensionRegistry,
}

impl<'r> SceneMaker<'r> {
    pub fn new(registry: &'r ExtensionRegistry) -> Self {
        SceneMaker { registry }
    }

    /// Materialize a scene. Never fails; problems land in `diagnostics`.
    pub fn create_scene(
        &self,
        description: &SceneDescription,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Scene {
        let mut scene = Scene::from_description(description);
        let mut objects = self.build(&description.display_list, &scene, diagnostics);
        for node in &mut objects {
            populate(node);
        }
        scene.objects = objects;
        scene
    }

    /// Construct pass: one node per resolvable record, same order as input.
    pub fn build(
        &self,
        records: &[Rc<ObjectRecord>],
        scene: &Scene,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Vec<SceneObjectNode> {
        records
            .iter()
            .filter_map(|record| self.create_object(record, scene, diagnostics))
            .collect()
    }

    fn create_object(
        &self,
        record: &Rc<ObjectRecord>,
        scene: &Scene,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Option<SceneObjectNode> {
        let type_name = &record.type_name;

        let Some(ext) = self.registry.extension(type_name) else {
            let message = if type_name.is_empty() {
                "Object has no `type`, no extension can build it".to_string()
            } else {
                format!("No extension is registered for type \"{type_name}\"")
            };
            warn!("{message}");
            diagnostics.push(Diagnostic::new(Some(&record.id), message));
            return None;
        };

        let mut node = match ext.create_object(CreateObjectArgs { record, scene }) {
            Ok(node) => node,
            Err(e) => {
                let message = format!("Cannot create object of type \"{type_name}\": {e:#}");
                warn!("{message}");
                diagnostics.push(Diagnostic::new(Some(&record.id), message));
                return None;
            }
        };

        if !record.children.is_empty() {
            if ext.accepts_children() {
                for child in self.build(&record.children, scene, diagnostics) {
                    node.add_child(child);
                }
            } else {
                let message = format!(
                    "Type \"{type_name}\" does not accept children, skipping {} of them",
                    record.children.len()
                );
                warn!("{message}");
                diagnostics.push(Diagnostic::new(Some(&record.id), message));
            }
        }

        Some(node)
    }
}

/// Populate pass, parents before children.
fn populate(node: &mut SceneObjectNode) {
    node.read_record();
    for child in node.children_mut() {
        populate(child);
    }
}
