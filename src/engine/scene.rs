//! The materialized scene: a forest of `SceneObjectNode`s owned by a `Scene`.

use std::rc::Rc;

use serde_json::{Map, Value};

use super::source::{ObjectRecord, SceneDescription, SceneType};

#[derive(Debug, Clone)]
pub struct Scene {
    pub scene_type: SceneType,
    pub id: Option<String>,
    pub settings: Map<String, Value>,
    pub objects: Vec<SceneObjectNode>,
}

impl Scene {
    /// An empty scene carrying the description's header fields.
    pub fn from_description(description: &SceneDescription) -> Self {
        Scene {
            scene_type: description.scene_type,
            id: description.id.clone(),
            settings: description.settings.clone(),
            objects: Vec::new(),
        }
    }

    /// All nodes, parents before children, in input order.
    pub fn walk(&self) -> impl Iterator<Item = &SceneObjectNode> {
        self.objects.iter().flat_map(SceneObjectNode::walk)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub x: f64,
    pub y: f64,
    pub angle: f64,
    pub scale_x: f64,
    pub scale_y: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Transform {
            x: 0.0,
            y: 0.0,
            angle: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Origin {
    pub x: f64,
    pub y: f64,
}

/// Runtime counterpart of an `ObjectRecord`.
///
/// Created empty by an extension, then filled by `read_record`. Children are
/// owned; dropping a node drops its subtree.
///
/// A node holds no reference to its `Scene`. Code that needs the owning scene
/// gets it alongside the node, through `CreateObjectArgs` and `AssetsArgs`.
#[derive(Debug, Clone)]
pub struct SceneObjectNode {
    record: Rc<ObjectRecord>,
    id: String,
    label: String,
    transform: Transform,
    origin: Option<Origin>,
    visible: bool,
    data: Map<String, Value>,
    children: Vec<SceneObjectNode>,
}

impl SceneObjectNode {
    pub fn new(record: Rc<ObjectRecord>) -> Self {
        SceneObjectNode {
            record,
            id: String::new(),
            label: String::new(),
            transform: Transform::default(),
            origin: None,
            visible: true,
            data: Map::new(),
            children: Vec::new(),
        }
    }

    /// Same as `new`, with the origin this kind uses when the record has none.
    pub fn with_origin(record: Rc<ObjectRecord>, x: f64, y: f64) -> Self {
        let mut node = Self::new(record);
        node.origin = Some(Origin { x, y });
        node
    }

    /// Populate step: read the declarative properties from the record.
    /// Missing or mistyped fields keep their defaults.
    pub fn read_record(&mut self) {
        let record = Rc::clone(&self.record);

        self.id = record.id.clone();
        self.label = record
            .str_prop("label")
            .filter(|l| !l.trim().is_empty())
            .unwrap_or(record.id.as_str())
            .to_string();

        let defaults = Transform::default();
        self.transform = Transform {
            x: record.f64_prop("x").unwrap_or(defaults.x),
            y: record.f64_prop("y").unwrap_or(defaults.y),
            angle: record.f64_prop("angle").unwrap_or(defaults.angle),
            scale_x: record.f64_prop("scaleX").unwrap_or(defaults.scale_x),
            scale_y: record.f64_prop("scaleY").unwrap_or(defaults.scale_y),
        };

        if let Some(origin) = &mut self.origin {
            origin.x = record.f64_prop("originX").unwrap_or(origin.x);
            origin.y = record.f64_prop("originY").unwrap_or(origin.y);
        }

        self.visible = record.bool_prop("visible").unwrap_or(true);

        if let Some(Value::Object(data)) = record.get("data") {
            self.data = data.clone();
        }
    }

    pub fn record(&self) -> &ObjectRecord {
        &self.record
    }

    pub fn type_name(&self) -> &str {
        &self.record.type_name
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Name used for the object's variable in generated code.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn origin(&self) -> Option<&Origin> {
        self.origin.as_ref()
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    /// Custom properties, emitted as `setData` calls.
    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    pub fn children(&self) -> &[SceneObjectNode] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut [SceneObjectNode] {
        &mut self.children
    }

    pub fn add_child(&mut self, child: SceneObjectNode) {
        self.children.push(child);
    }

    /// This node and its whole subtree in preorder.
    pub fn walk(&self) -> Box<dyn Iterator<Item = &SceneObjectNode> + '_> {
        Box::new(std::iter::once(self).chain(self.children.iter().flat_map(SceneObjectNode::walk)))
    }
}
