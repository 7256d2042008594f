//! Capability lookup for object kinds and loader updaters.
//!
//! The registry is built once at startup and passed by reference to the
//! maker, the asset resolver and the code generator.

use std::collections::HashMap;
use std::rc::Rc;

use anyhow::Result;
use log::warn;

use crate::codegen::scene::SceneCodeGenerator;
use crate::types::{AssetReference, LoaderDeclaration};

use super::assets::AssetFinder;
use super::objects;
use super::scene::{Scene, SceneObjectNode};
use super::source::ObjectRecord;

pub struct CreateObjectArgs<'a> {
    pub record: &'a Rc<ObjectRecord>,
    pub scene: &'a Scene,
}

pub struct AssetsArgs<'a> {
    pub record: &'a ObjectRecord,
    pub finder: &'a AssetFinder,
    pub scene: &'a Scene,
}

/// Everything the compiler knows about one object kind.
pub trait ObjectExtension {
    /// The `type` tag this extension handles.
    fn type_name(&self) -> &str;

    /// Construct an unpopulated node for the record.
    fn create_object(&self, args: CreateObjectArgs<'_>) -> Result<SceneObjectNode>;

    /// Assets the object needs loaded before it can be created.
    fn assets(&self, args: AssetsArgs<'_>) -> Result<Vec<AssetReference>>;

    /// JSDoc type of the created object, used for class fields.
    fn js_type(&self) -> &str;

    /// Emit the code that creates the object as `var`, and its children if any.
    fn generate(&self, node: &SceneObjectNode, var: &str, generator: &mut SceneCodeGenerator<'_>);

    fn accepts_children(&self) -> bool {
        false
    }
}

/// Turns an asset into a preload declaration. The first updater whose
/// `accepts` returns true handles the asset.
pub trait LoaderUpdater {
    fn accepts(&self, asset: &AssetReference) -> bool;

    fn declaration(
        &self,
        scene: &Scene,
        asset: &AssetReference,
        finder: &AssetFinder,
    ) -> Option<LoaderDeclaration>;
}

#[derive(Default)]
pub struct ExtensionRegistry {
    extensions: HashMap<String, Box<dyn ObjectExtension>>,
    loader_updaters: Vec<Box<dyn LoaderUpdater>>,
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the built-in object kinds and loader updaters.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        objects::register_builtins(&mut registry);
        registry
    }

    /// Registering a type twice replaces the earlier extension.
    pub fn register_extension(&mut self, extension: Box<dyn ObjectExtension>) {
        let type_name = extension.type_name().to_string();
        if self.extensions.insert(type_name.clone(), extension).is_some() {
            warn!("Replacing the extension registered for type \"{type_name}\"");
        }
    }

    pub fn register_loader_updater(&mut self, updater: Box<dyn LoaderUpdater>) {
        self.loader_updaters.push(updater);
    }

    pub fn extension(&self, type_name: &str) -> Option<&dyn ObjectExtension> {
        self.extensions.get(type_name).map(Box::as_ref)
    }

    pub fn loader_updater_for(&self, asset: &AssetReference) -> Option<&dyn LoaderUpdater> {
        self.loader_updaters
            .iter()
            .find(|updater| updater.accepts(asset))
            .map(Box::as_ref)
    }
}
