//! Scene description types, the declarative format written by the editor.
//!
//! These types describe *what exists* in a scene, not how it is built. The
//! maker reads them and materializes a `Scene` through the registered
//! object extensions.

use std::rc::Rc;

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{CompileError, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SceneType {
    #[default]
    #[serde(alias = "Scene")]
    Scene,
    #[serde(alias = "Prefab")]
    Prefab,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneDescription {
    #[serde(default)]
    pub scene_type: SceneType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient_records")]
    pub display_list: Vec<Rc<ObjectRecord>>,
    /// Opaque to the maker; the code generator reads `className` and `sceneKey`.
    #[serde(default)]
    pub settings: Map<String, Value>,
}

impl SceneDescription {
    /// Shape check: an object with a `displayList` array.
    pub fn is_valid_format(data: &Value) -> bool {
        data.get("displayList").is_some_and(Value::is_array)
    }

    /// Parse a scene file. Fails before anything is built when the document
    /// is not JSON or does not pass the shape check.
    pub fn from_json(text: &str) -> Result<Self> {
        let data: Value = serde_json::from_str(text)?;
        Self::from_value(data)
    }

    pub fn from_value(data: Value) -> Result<Self> {
        if !Self::is_valid_format(&data) {
            return Err(CompileError::Format(
                "expected an object with a `displayList` array".into(),
            ));
        }
        Ok(serde_json::from_value(data)?)
    }

    pub fn setting_str(&self, name: &str) -> Option<&str> {
        self.settings
            .get(name)
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
    }
}

/// One node of the declarative scene tree.
///
/// Every field other than `type`, `id` and the children is kept verbatim in
/// `properties`, so extensions can read whatever their kind needs.
///
/// Parsing never fails on a single record: a missing or non-string `type`
/// becomes `""` (which no extension handles), a numeric `id` keeps its
/// decimal text, and an element that is not an object becomes an untyped
/// record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObjectRecord {
    #[serde(rename = "type", default, deserialize_with = "lenient_string")]
    pub type_name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(
        default,
        alias = "list",
        deserialize_with = "lenient_records",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub children: Vec<Rc<ObjectRecord>>,
    #[serde(flatten)]
    pub properties: Map<String, Value>,
}

impl ObjectRecord {
    /// Parse one element of a `displayList` or `children` array.
    pub fn from_value(value: Value) -> Self {
        match serde_json::from_value(value) {
            Ok(record) => record,
            Err(e) => {
                debug!("Treating unreadable record as untyped: {e}");
                Self::default()
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    pub fn str_prop(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn f64_prop(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_f64)
    }

    pub fn bool_prop(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }

    /// The `texture` field, when present.
    pub fn texture(&self) -> anyhow::Result<Option<TextureRef>> {
        match self.get("texture") {
            None | Some(Value::Null) => Ok(None),
            Some(value) => Ok(Some(TextureRef::deserialize(value)?)),
        }
    }
}

fn lenient_string<'de, D>(d: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Value::deserialize(d)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

fn lenient_records<'de, D>(d: D) -> std::result::Result<Vec<Rc<ObjectRecord>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let items = match Value::deserialize(d)? {
        Value::Array(items) => items,
        _ => Vec::new(),
    };
    Ok(items
        .into_iter()
        .map(|item| Rc::new(ObjectRecord::from_value(item)))
        .collect())
}

// ---------------------------------------------------------------------------
// Texture references
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextureRef {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame: Option<String>,
}

/// Accepts either a plain key (`"logo"`) or a full reference
/// (`{"key":"atlas","frame":"hero"}`). Numeric frames, as spritesheets use,
/// are kept as their decimal text.
impl<'de> Deserialize<'de> for TextureRef {
    fn deserialize<D>(d: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::{Error, MapAccess, Visitor};
        use std::fmt;

        #[derive(Deserialize)]
        struct Full {
            key: String,
            #[serde(default)]
            frame: Option<Value>,
        }

        struct TextureVisitor;

        impl<'de> Visitor<'de> for TextureVisitor {
            type Value = TextureRef;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a texture key or a {key, frame} object")
            }

            fn visit_str<E: Error>(self, v: &str) -> std::result::Result<TextureRef, E> {
                Ok(TextureRef {
                    key: v.to_string(),
                    frame: None,
                })
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                map: A,
            ) -> std::result::Result<TextureRef, A::Error> {
                let full = Full::deserialize(serde::de::value::MapAccessDeserializer::new(map))?;
                let frame = match full.frame {
                    None | Some(Value::Null) => None,
                    Some(Value::String(s)) => Some(s),
                    Some(Value::Number(n)) => Some(n.to_string()),
                    Some(other) => {
                        return Err(A::Error::custom(format!("invalid texture frame {other}")));
                    }
                };
                Ok(TextureRef {
                    key: full.key,
                    frame,
                })
            }
        }

        d.deserialize_any(TextureVisitor)
    }
}
