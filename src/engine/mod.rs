//! Engine: the scene compiler.
//!
//! Turns a `SceneDescription` (what the editor saved) into a `Scene` (nodes
//! built by the registered extensions), the scene into loader declarations,
//! and both into the source of a scene class.
//!
//! The engine never talks to the terminal; progress is reported through a
//! `ProgressMonitor` and problems through `Diagnostic`s.

pub mod assets;
pub mod maker;
pub mod objects;
pub mod registry;
pub mod scene;
pub mod source;

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::codegen::scene::{ClassSettings, SceneCodeGenerator, format_to_class_name};
use crate::config::CompilerConfig;
use crate::error::{CompileError, Result};
use crate::types::{Diagnostic, LoaderDeclaration};

use assets::{AssetFinder, AssetResolver};
use maker::SceneMaker;
use registry::ExtensionRegistry;
use source::{SceneDescription, SceneType};

#[derive(Debug, Clone)]
pub struct CompileOutput {
    pub text: String,
    pub declarations: Vec<LoaderDeclaration>,
    pub diagnostics: Vec<Diagnostic>,
}

pub enum FileOutcome<'a> {
    Compiled(&'a CompileOutput),
    Failed(&'a CompileError),
}

/// Observer of a batch compile. `is_cancelled` is asked before each file.
pub trait ProgressMonitor {
    fn file_done(&mut self, index: usize, total: usize, path: &Path, outcome: FileOutcome<'_>);

    fn is_cancelled(&self) -> bool {
        false
    }
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub compiled: Vec<PathBuf>,
    pub failed: Vec<PathBuf>,
    pub cancelled: bool,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && !self.cancelled
    }
}

pub struct Compiler {
    registry: ExtensionRegistry,
    finder: AssetFinder,
    config: CompilerConfig,
}

impl Compiler {
    pub fn new(registry: ExtensionRegistry, finder: AssetFinder, config: CompilerConfig) -> Self {
        Compiler {
            registry,
            finder,
            config,
        }
    }

    /// Built-in extensions plus the asset packs named by the config.
    pub fn from_config(config: CompilerConfig) -> Result<Self> {
        let finder = AssetFinder::from_pack_files(&config.asset_packs)?;
        debug!("{} assets indexed from {} packs", finder.len(), config.asset_packs.len());
        Ok(Self::new(ExtensionRegistry::with_builtins(), finder, config))
    }

    /// Compile one scene document. `previous` is the last generated text
    /// (or `""`), `class_name` the fallback when the scene has no
    /// `className` setting.
    pub fn compile_text(&self, json: &str, previous: &str, class_name: &str) -> Result<CompileOutput> {
        let description = SceneDescription::from_json(json)?;
        let mut diagnostics = Vec::new();

        let scene = SceneMaker::new(&self.registry).create_scene(&description, &mut diagnostics);
        let declarations =
            AssetResolver::new(&self.registry).resolve(&scene, &self.finder, &mut diagnostics);

        let class = self.class_settings(&description, class_name);
        let (text, generated) =
            SceneCodeGenerator::new(&self.registry, previous).generate(&scene, &class, &declarations);
        diagnostics.extend(generated);

        Ok(CompileOutput {
            text,
            declarations,
            diagnostics,
        })
    }

    /// Compile a scene file and write the generated file next to it. Nothing
    /// is written unless generation succeeds.
    pub fn compile_file(&self, path: &Path) -> Result<CompileOutput> {
        let json = fs::read_to_string(path).map_err(|e| CompileError::io(path, e))?;

        let output_path = self.config.output_path(path);
        let previous = match fs::read_to_string(&output_path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
            Err(e) => return Err(CompileError::io(&output_path, e)),
        };

        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
        let output = self.compile_text(&json, &previous, stem)?;

        fs::write(&output_path, &output.text).map_err(|e| CompileError::io(&output_path, e))?;
        info!("{} -> {}", path.display(), output_path.display());
        Ok(output)
    }

    /// Compile the files one at a time. A failing file is reported and
    /// skipped; cancellation is checked between files.
    pub fn compile_batch(&self, paths: &[PathBuf], monitor: &mut dyn ProgressMonitor) -> BatchReport {
        let mut report = BatchReport::default();
        let total = paths.len();

        for (index, path) in paths.iter().enumerate() {
            if monitor.is_cancelled() {
                info!("Batch cancelled after {index} of {total} files");
                report.cancelled = true;
                break;
            }

            match self.compile_file(path) {
                Ok(output) => {
                    monitor.file_done(index, total, path, FileOutcome::Compiled(&output));
                    report.compiled.push(path.clone());
                }
                Err(e) => {
                    monitor.file_done(index, total, path, FileOutcome::Failed(&e));
                    report.failed.push(path.clone());
                }
            }
        }

        report
    }

    fn class_settings(&self, description: &SceneDescription, fallback: &str) -> ClassSettings {
        let class_name = description
            .setting_str("className")
            .map(str::to_string)
            .unwrap_or_else(|| format_to_class_name(fallback));
        let scene_key = description
            .setting_str("sceneKey")
            .map_or_else(|| class_name.clone(), str::to_string);
        let super_class = match description.setting_str("superClass") {
            Some(super_class) => super_class.to_string(),
            None => match description.scene_type {
                SceneType::Scene => self.config.scene_super_class.clone(),
                SceneType::Prefab => self.config.prefab_super_class.clone(),
            },
        };

        ClassSettings {
            class_name,
            scene_key,
            super_class,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("scene-compiler-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn compiler() -> Compiler {
        let mut finder = AssetFinder::new();
        finder.add_pack(&json!({ "s": { "files": [
            { "type": "image", "key": "logo", "url": "assets/logo.png" }
        ]}}));
        Compiler::new(ExtensionRegistry::with_builtins(), finder, CompilerConfig::default())
    }

    const SCENE: &str = r#"{
        "id": "level-1",
        "displayList": [
            { "type": "image", "id": "a", "label": "logo", "x": 400, "y": 300, "texture": { "key": "logo" } },
            { "type": "sparkles", "id": "fx" }
        ]
    }"#;

    #[test]
    fn compiles_a_scene_end_to_end() {
        let output = compiler().compile_text(SCENE, "", "level").unwrap();

        assert_eq!(output.declarations.len(), 1);
        assert_eq!(output.diagnostics.len(), 1);
        assert_eq!(output.diagnostics[0].object_id.as_deref(), Some("fx"));
        assert!(output.text.contains("class Level extends Phaser.Scene {"));
        assert!(output.text.contains("super(\"Level\");"));
        assert!(output.text.contains("this.load.image(\"logo\", \"assets/logo.png\");"));
        assert!(output.text.contains("const logo = this.add.image(400, 300, \"logo\");"));
    }

    #[test]
    fn malformed_record_does_not_fail_the_file() {
        let json = r#"{ "displayList": [
            { "type": "image", "id": "first", "texture": "logo" },
            { "id": "x" },
            { "type": 42, "id": "y" },
            { "type": "image", "id": 7, "texture": "logo" }
        ] }"#;
        let output = compiler().compile_text(json, "", "level").unwrap();

        assert_eq!(output.diagnostics.len(), 2);
        assert!(output.text.contains("const first = this.add.image(0, 0, \"logo\");"));
        assert!(output.text.contains("const _7 = this.add.image(0, 0, \"logo\");"));
    }

    #[test]
    fn invalid_texture_is_reported_once() {
        let json = r#"{ "displayList": [{ "type": "image", "id": "broken", "texture": 12 }] }"#;
        let output = compiler().compile_text(json, "", "level").unwrap();

        assert_eq!(output.diagnostics.len(), 1);
        assert_eq!(output.diagnostics[0].object_id.as_deref(), Some("broken"));
        assert!(output.text.contains("this.add.image(0, 0, \"__MISSING\");"));
    }

    #[test]
    fn settings_override_names() {
        let json = json!({
            "sceneType": "PREFAB",
            "settings": { "className": "Hero", "sceneKey": "ignored" },
            "displayList": []
        })
        .to_string();
        let output = compiler().compile_text(&json, "", "file-stem").unwrap();
        assert!(output.text.contains("class Hero extends Phaser.GameObjects.Container {"));
        assert!(output.diagnostics.is_empty());
    }

    #[test]
    fn rejects_documents_without_a_display_list() {
        let err = compiler().compile_text(r#"{ "objects": [] }"#, "", "x").unwrap_err();
        assert!(matches!(err, CompileError::Format(_)));
        let err = compiler().compile_text("{ nope", "", "x").unwrap_err();
        assert!(matches!(err, CompileError::Json(_)));
    }

    #[test]
    fn compile_file_keeps_user_code_across_runs() {
        let dir = temp_dir("file");
        let scene_path = dir.join("level.scene");
        fs::write(&scene_path, SCENE).unwrap();

        let compiler = compiler();
        compiler.compile_file(&scene_path).unwrap();
        let output_path = dir.join("level.js");
        let first = fs::read_to_string(&output_path).unwrap();

        let edited = first.replace("// Write your code here\n", "// Write your code here\n\t\tthis.score = 0;\n");
        assert_ne!(edited, first);
        fs::write(&output_path, &edited).unwrap();

        compiler.compile_file(&scene_path).unwrap();
        assert_eq!(fs::read_to_string(&output_path).unwrap(), edited);
    }

    #[test]
    fn failed_compile_leaves_previous_output_alone() {
        let dir = temp_dir("failed");
        let scene_path = dir.join("broken.scene");
        fs::write(&scene_path, "{}").unwrap();
        fs::write(dir.join("broken.js"), "hand written").unwrap();

        assert!(compiler().compile_file(&scene_path).is_err());
        assert_eq!(fs::read_to_string(dir.join("broken.js")).unwrap(), "hand written");
    }

    #[derive(Default)]
    struct Recorder {
        done: Vec<(usize, bool)>,
        cancel_after: Option<usize>,
    }

    impl ProgressMonitor for Recorder {
        fn file_done(&mut self, index: usize, _total: usize, _path: &Path, outcome: FileOutcome<'_>) {
            self.done.push((index, matches!(outcome, FileOutcome::Compiled(_))));
        }

        fn is_cancelled(&self) -> bool {
            self.cancel_after.is_some_and(|n| self.done.len() >= n)
        }
    }

    #[test]
    fn batch_skips_failures_and_continues() {
        let dir = temp_dir("batch");
        let paths: Vec<PathBuf> = ["a", "b", "c"].iter().map(|n| dir.join(format!("{n}.scene"))).collect();
        fs::write(&paths[0], SCENE).unwrap();
        fs::write(&paths[1], "not json").unwrap();
        fs::write(&paths[2], SCENE).unwrap();

        let mut monitor = Recorder::default();
        let report = compiler().compile_batch(&paths, &mut monitor);

        assert_eq!(monitor.done, [(0, true), (1, false), (2, true)]);
        assert_eq!(report.compiled, [paths[0].clone(), paths[2].clone()]);
        assert_eq!(report.failed, [paths[1].clone()]);
        assert!(!report.cancelled);
        assert!(!report.is_success());
    }

    #[test]
    fn batch_stops_between_files_when_cancelled() {
        let dir = temp_dir("cancel");
        let paths: Vec<PathBuf> = ["a", "b"].iter().map(|n| dir.join(format!("{n}.scene"))).collect();
        for path in &paths {
            fs::write(path, SCENE).unwrap();
        }

        let mut monitor = Recorder {
            cancel_after: Some(1),
            ..Recorder::default()
        };
        let report = compiler().compile_batch(&paths, &mut monitor);

        assert!(report.cancelled);
        assert_eq!(report.compiled.len(), 1);
        assert!(!dir.join("b.js").exists());
    }
}
