//! Shared boundary types for the scene compiler.
//!
//! This module defines the values that cross component boundaries:
//! - Extensions → Asset Resolver: `AssetReference`s
//! - Asset Resolver → Code Generator: `LoaderDeclaration`s
//! - Every stage → caller: `Diagnostic`s

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Assets
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AssetKind {
    Image,
    Atlas,
    MultiAtlas,
    Spritesheet,
    BitmapFont,
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AssetKind::Image => "image",
            AssetKind::Atlas => "atlas",
            AssetKind::MultiAtlas => "multiatlas",
            AssetKind::Spritesheet => "spritesheet",
            AssetKind::BitmapFont => "bitmapFont",
        };
        f.write_str(name)
    }
}

/// An asset a scene object depends on. Identity is the whole value, so two
/// references to the same key with different frames are distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetReference {
    pub asset_kind: AssetKind,
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame: Option<String>,
}

impl AssetReference {
    pub fn new(asset_kind: AssetKind, key: impl Into<String>) -> Self {
        AssetReference {
            asset_kind,
            key: key.into(),
            frame: None,
        }
    }

    pub fn with_frame(mut self, frame: Option<String>) -> Self {
        self.frame = frame;
        self
    }
}

// ---------------------------------------------------------------------------
// Loader declarations
// ---------------------------------------------------------------------------

/// One preload call, e.g. `this.load.image("logo", "assets/logo.png")`.
///
/// Arguments are kept as JSON values so the code generator can print them as
/// literals without knowing what each loader method expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoaderDeclaration {
    pub method: String,
    pub key: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<serde_json::Value>,
}

impl LoaderDeclaration {
    pub fn new(method: impl Into<String>, key: impl Into<String>) -> Self {
        LoaderDeclaration {
            method: method.into(),
            key: key.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, value: impl Into<serde_json::Value>) -> Self {
        self.args.push(value.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Diagnostics
// ---------------------------------------------------------------------------

/// A recoverable problem found while compiling. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,
    pub message: String,
}

impl Diagnostic {
    pub fn new(object_id: Option<&str>, message: impl Into<String>) -> Self {
        Diagnostic {
            object_id: object_id.filter(|id| !id.is_empty()).map(str::to_string),
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.object_id {
            Some(id) => write!(f, "[{id}] {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}
