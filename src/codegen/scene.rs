//! JavaScript scene-class writer.
//!
//! Writes one class per scene file. Everything between the compiled-code
//! markers is regenerated on every pass; the file head, the file tail, the
//! constructor user region and the class-body user region are carried over
//! from the previous generation.

use std::collections::HashSet;

use log::warn;

use crate::engine::registry::ExtensionRegistry;
use crate::engine::scene::{Scene, SceneObjectNode};
use crate::engine::source::SceneType;
use crate::types::{Diagnostic, LoaderDeclaration};

use super::{CodeBuffer, empty_string_to_none, number, quote};

pub const COMPILED_START: &str = "/* START OF COMPILED CODE */";
pub const COMPILED_END: &str = "/* END OF COMPILED CODE */";
pub const USER_CTR_START: &str = "/* START-USER-CTR-CODE */";
pub const USER_CTR_END: &str = "/* END-USER-CTR-CODE */";
pub const USER_CODE_START: &str = "/* START-USER-CODE */";
pub const USER_CODE_END: &str = "/* END-USER-CODE */";

const DEFAULT_HEAD: &str = "\n// You can write more code here\n\n";
const DEFAULT_TAIL: &str = "\n\n// You can write more code here\n";

const JS_RESERVED: &[&str] = &[
    "arguments", "await", "break", "case", "catch", "class", "const", "continue", "debugger",
    "default", "delete", "do", "else", "enum", "export", "extends", "false", "finally", "for",
    "function", "if", "import", "in", "instanceof", "let", "new", "null", "return", "scene",
    "super", "switch", "this", "throw", "true", "try", "typeof", "var", "void", "while", "with",
    "yield",
];

/// Class-level names for one generated file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassSettings {
    pub class_name: String,
    pub scene_key: String,
    pub super_class: String,
}

pub struct SceneCodeGenerator<'r> {
    registry: &'r ExtensionRegistry,
    code: CodeBuffer,
    scene_type: SceneType,
    names: HashSet<String>,
    /// Objects with class scope: (variable, JSDoc type).
    fields: Vec<(String, String)>,
    diagnostics: Vec<Diagnostic>,
}

impl<'r> SceneCodeGenerator<'r> {
    /// `previous` is the last generation of the same file, or `""`.
    pub fn new(registry: &'r ExtensionRegistry, previous: impl Into<String>) -> Self {
        SceneCodeGenerator {
            registry,
            code: CodeBuffer::new(previous),
            scene_type: SceneType::Scene,
            names: HashSet::new(),
            fields: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn generate(
        mut self,
        scene: &Scene,
        class: &ClassSettings,
        declarations: &[LoaderDeclaration],
    ) -> (String, Vec<Diagnostic>) {
        self.scene_type = scene.scene_type;

        self.code.section_start(COMPILED_START, DEFAULT_HEAD);
        self.code.line("");
        self.code.line("");
        self.code.open_indent(&format!(
            "class {} extends {} {{",
            class.class_name, class.super_class
        ));
        self.code.line("");

        match scene.scene_type {
            SceneType::Scene => self.scene_body(scene, class, declarations),
            SceneType::Prefab => self.prefab_body(scene),
        }

        self.field_declarations();

        self.code.section(
            USER_CODE_START,
            USER_CODE_END,
            match scene.scene_type {
                SceneType::Scene => {
                    "\n\n\t// Write your code here\n\n\tcreate() {\n\n\t\tthis.editorCreate();\n\t}\n\n\t"
                }
                SceneType::Prefab => "\n\n\t// Write your code here.\n\n\t",
            },
        );
        self.code.close_indent("}");
        self.code.line("");
        self.code.section_end(COMPILED_END, DEFAULT_TAIL);

        (self.code.into_text(), self.diagnostics)
    }

    fn scene_body(&mut self, scene: &Scene, class: &ClassSettings, declarations: &[LoaderDeclaration]) {
        self.code.open_indent("constructor() {");
        self.code.line(&format!("super({});", quote(&class.scene_key)));
        self.code.line("");
        self.user_ctr_code();
        self.code.close_indent("}");
        self.code.line("");

        let preload = self.code.offset();
        self.code.open_indent("preload() {");
        self.code.line("");
        for declaration in declarations {
            self.code.line(&loader_call(declaration));
        }
        self.code.close_indent("}");
        self.code.line("");
        if declarations.is_empty() {
            self.code.cut(preload, self.code.offset());
        }

        self.code.open_indent("editorCreate() {");
        for node in &scene.objects {
            self.generate_object(node);
        }
        self.field_assignments();
        self.code.close_indent("}");
        self.code.line("");
    }

    fn prefab_body(&mut self, scene: &Scene) {
        self.code.open_indent("constructor(scene, x, y) {");
        self.code.line("super(scene, x ?? 0, y ?? 0);");
        for node in &scene.objects {
            if let Some(var) = self.generate_object(node) {
                self.code.line(&format!("this.add({var});"));
            }
        }
        self.field_assignments();
        self.code.line("");
        self.user_ctr_code();
        self.code.close_indent("}");
        self.code.line("");
    }

    fn user_ctr_code(&mut self) {
        self.code.section(
            USER_CTR_START,
            USER_CTR_END,
            "\n\t\t// Write your code here.\n\t\t",
        );
    }

    fn field_assignments(&mut self) {
        let fields = &self.fields;
        self.code.trim(|code| {
            code.line("");
            for (var, _) in fields {
                code.line(&format!("this.{var} = {var};"));
            }
        });
    }

    fn field_declarations(&mut self) {
        let fields = &self.fields;
        self.code.trim(|code| {
            for (var, js_type) in fields {
                code.line(&format!("/** @type {{{js_type}}} */"));
                code.line(&format!("{var};"));
            }
            code.line("");
        });
    }

    // -----------------------------------------------------------------------
    // Object API, used by the object extensions
    // -----------------------------------------------------------------------

    pub fn code(&mut self) -> &mut CodeBuffer {
        &mut self.code
    }

    /// Factory used to create objects: the scene itself or the prefab's scene.
    pub fn add_expr(&self) -> &'static str {
        match self.scene_type {
            SceneType::Scene => "this.add",
            SceneType::Prefab => "scene.add",
        }
    }

    /// Emit the code of one object and return its variable name.
    pub fn generate_object(&mut self, node: &SceneObjectNode) -> Option<String> {
        let registry = self.registry;
        let Some(ext) = registry.extension(node.type_name()) else {
            self.diagnostic(node, format!("No code generator for type \"{}\"", node.type_name()));
            return None;
        };

        let var = self.declare_var(node);
        self.code.line("");
        self.code.line(&format!("// {}", node.label().replace(['\r', '\n'], " ")));
        ext.generate(node, &var, self);

        if node.record().str_prop("scope") == Some("CLASS") {
            self.fields.push((var.clone(), ext.js_type().to_string()));
        }

        Some(var)
    }

    /// `const <var> = <add>.<factory>(<args>);`
    pub fn create_call(&mut self, var: &str, factory: &str, args: &[String]) {
        let add = self.add_expr();
        self.code.append(&format!("const {var} = {add}.{factory}("));
        self.code.join(args);
        self.code.line(");");
    }

    /// Assignments for every property that differs from its default.
    pub fn object_properties(&mut self, node: &SceneObjectNode, var: &str) {
        let t = *node.transform();
        if t.angle != 0.0 {
            self.code.line(&format!("{var}.angle = {};", number(t.angle)));
        }
        if t.scale_x != 1.0 {
            self.code.line(&format!("{var}.scaleX = {};", number(t.scale_x)));
        }
        if t.scale_y != 1.0 {
            self.code.line(&format!("{var}.scaleY = {};", number(t.scale_y)));
        }

        let record = node.record();
        if let Some(origin) = node.origin() {
            if record.get("originX").is_some() || record.get("originY").is_some() {
                self.code.line(&format!(
                    "{var}.setOrigin({}, {});",
                    number(origin.x),
                    number(origin.y)
                ));
            }
        }

        if !node.visible() {
            self.code.line(&format!("{var}.visible = false;"));
        }

        for (key, value) in node.data() {
            self.code.line(&format!("{var}.setData({}, {value});", quote(key)));
        }
    }

    pub fn diagnostic(&mut self, node: &SceneObjectNode, message: impl Into<String>) {
        let diagnostic = Diagnostic::new(Some(node.id()), message);
        warn!("{diagnostic}");
        self.diagnostics.push(diagnostic);
    }

    /// A valid, unused identifier derived from the node's label.
    fn declare_var(&mut self, node: &SceneObjectNode) -> String {
        let base = [node.label(), node.type_name()]
            .into_iter()
            .filter_map(|name| empty_string_to_none(Some(name)))
            .map(format_to_valid_var_name)
            .find(|var| !var.is_empty())
            .unwrap_or_else(|| "obj".into());

        let mut var = base.clone();
        let mut n = 1;
        while !self.names.insert(var.clone()) {
            var = format!("{base}_{n}");
            n += 1;
        }
        var
    }
}

/// Keep identifier characters, replace the rest with `_`, and avoid a leading
/// digit or a reserved word.
pub fn format_to_valid_var_name(name: &str) -> String {
    let mut var: String = name
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' || c == '$' { c } else { '_' })
        .collect();
    if var.starts_with(|c: char| c.is_ascii_digit()) || JS_RESERVED.contains(&var.as_str()) {
        var.insert(0, '_');
    }
    var
}

/// File stem → class name: identifier characters only, first letter upper.
pub fn format_to_class_name(stem: &str) -> String {
    let var = format_to_valid_var_name(stem);
    let mut chars = var.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => "Scene".into(),
    }
}

fn loader_call(declaration: &LoaderDeclaration) -> String {
    let mut args = vec![quote(&declaration.key)];
    args.extend(declaration.args.iter().map(|a| a.to_string()));
    format!("this.load.{}({});", declaration.method, args.join(", "))
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::engine::maker::SceneMaker;
    use crate::engine::source::SceneDescription;

    fn class() -> ClassSettings {
        ClassSettings {
            class_name: "Level".into(),
            scene_key: "Level".into(),
            super_class: "Phaser.Scene".into(),
        }
    }

    fn generate(data: Value, previous: &str, declarations: &[LoaderDeclaration]) -> String {
        let registry = ExtensionRegistry::with_builtins();
        let description = SceneDescription::from_value(data).unwrap();
        let mut diagnostics = Vec::new();
        let scene = SceneMaker::new(&registry).create_scene(&description, &mut diagnostics);
        let (text, _) = SceneCodeGenerator::new(&registry, previous).generate(&scene, &class(), declarations);
        text
    }

    #[test]
    fn writes_a_complete_scene_class() {
        let text = generate(
            json!({ "displayList": [
                { "type": "image", "id": "a", "x": 400, "y": 300, "texture": { "key": "logo" } }
            ]}),
            "",
            &[LoaderDeclaration::new("image", "logo").arg("assets/logo.png")],
        );

        let expected = "
// You can write more code here

/* START OF COMPILED CODE */

class Level extends Phaser.Scene {

	constructor() {
		super(\"Level\");

		/* START-USER-CTR-CODE */
		// Write your code here.
		/* END-USER-CTR-CODE */
	}

	preload() {

		this.load.image(\"logo\", \"assets/logo.png\");
	}

	editorCreate() {

		// a
		const a = this.add.image(400, 300, \"logo\");
	}

	/* START-USER-CODE */

	// Write your code here

	create() {

		this.editorCreate();
	}

	/* END-USER-CODE */
}

/* END OF COMPILED CODE */

// You can write more code here
";
        assert_eq!(text, expected);
    }

    #[test]
    fn empty_preload_is_left_out() {
        let text = generate(json!({ "displayList": [] }), "", &[]);
        assert!(!text.contains("preload"));
        assert!(text.contains("\teditorCreate() {\n\t}\n"));
    }

    #[test]
    fn containers_nest_children_and_properties() {
        let text = generate(
            json!({ "displayList": [
                { "type": "container", "id": "c", "label": "panel", "x": 10, "angle": 45, "children": [
                    { "type": "image", "id": "i", "label": "icon", "texture": { "key": "ui", "frame": "star" }, "originX": 0, "originY": 1 },
                    { "type": "bitmapText", "id": "t", "label": "score", "font": "arcade", "text": "0", "fontSize": 32, "visible": false }
                ]}
            ]}),
            "",
            &[],
        );

        let body = "\t\t// panel
		const panel = this.add.container(10, 0);
		panel.angle = 45;

		// icon
		const icon = this.add.image(0, 0, \"ui\", \"star\");
		icon.setOrigin(0, 1);
		panel.add(icon);

		// score
		const score = this.add.bitmapText(0, 0, \"arcade\", \"0\", 32);
		score.visible = false;
		panel.add(score);
	}
";
        assert!(text.contains(body), "{text}");
    }

    #[test]
    fn duplicate_and_invalid_labels_get_unique_names() {
        let text = generate(
            json!({ "displayList": [
                { "type": "image", "id": "1", "label": "my image", "texture": "logo" },
                { "type": "image", "id": "2", "label": "my image", "texture": "logo" },
                { "type": "image", "id": "3", "label": "class", "texture": "logo" },
                { "type": "image", "id": "4", "texture": "logo" }
            ]}),
            "",
            &[],
        );
        assert!(text.contains("const my_image = "));
        assert!(text.contains("const my_image_1 = "));
        assert!(text.contains("const _class = "));
        assert!(text.contains("const _4 = "));
    }

    #[test]
    fn blank_labels_fall_back_to_the_type() {
        let text = generate(
            json!({ "displayList": [
                { "type": "image", "label": "   ", "texture": "logo" },
                { "type": "bitmapText", "font": "arcade", "text": "say \"hi\"\nbye" }
            ]}),
            "",
            &[],
        );
        assert!(text.contains("const image = this.add.image(0, 0, \"logo\");"));
        assert!(text.contains(r#"const bitmapText = this.add.bitmapText(0, 0, "arcade", "say \"hi\"\nbye");"#));
    }

    #[test]
    fn class_scope_objects_become_fields() {
        let text = generate(
            json!({ "displayList": [
                { "type": "image", "id": "p", "label": "player", "scope": "CLASS", "texture": "logo" }
            ]}),
            "",
            &[],
        );
        assert!(text.contains("\t\tconst player = this.add.image(0, 0, \"logo\");\n\n\t\tthis.player = player;\n\t}\n"));
        assert!(text.contains("\t/** @type {Phaser.GameObjects.Image} */\n\tplayer;\n\n\t/* START-USER-CODE */"));
    }

    #[test]
    fn prefab_adds_objects_to_itself() {
        let registry = ExtensionRegistry::with_builtins();
        let description = SceneDescription::from_value(json!({
            "sceneType": "PREFAB",
            "displayList": [{ "type": "image", "id": "body", "texture": "logo", "data": { "hp": 3 } }]
        }))
        .unwrap();
        let mut diagnostics = Vec::new();
        let scene = SceneMaker::new(&registry).create_scene(&description, &mut diagnostics);
        let class = ClassSettings {
            class_name: "Enemy".into(),
            scene_key: "Enemy".into(),
            super_class: "Phaser.GameObjects.Container".into(),
        };
        let (text, _) = SceneCodeGenerator::new(&registry, "").generate(&scene, &class, &[]);

        assert!(text.contains("class Enemy extends Phaser.GameObjects.Container {"));
        let ctr = "\tconstructor(scene, x, y) {
		super(scene, x ?? 0, y ?? 0);

		// body
		const body = scene.add.image(0, 0, \"logo\");
		body.setData(\"hp\", 3);
		this.add(body);

		/* START-USER-CTR-CODE */";
        assert!(text.contains(ctr), "{text}");
        assert!(!text.contains("editorCreate"));
    }

    #[test]
    fn regeneration_keeps_user_regions() {
        let data = json!({ "displayList": [
            { "type": "image", "id": "a", "texture": "logo" }
        ]});
        let first = generate(data.clone(), "", &[]);

        let edited = first
            .replace("// You can write more code here\n\n/* START", "import { x } from \"./x.js\";\n\n/* START")
            .replace("\t\t// Write your code here.\n", "\t\tthis.hp = 10;\n")
            .replace("\t\tthis.editorCreate();\n", "\t\tthis.editorCreate();\n\t\tthis.a.setDepth(5);\n")
            + "\nexport default Level;\n";

        let changed = json!({ "displayList": [
            { "type": "image", "id": "a", "x": 20, "texture": "logo" }
        ]});
        let second = generate(changed, &edited, &[]);

        assert!(second.contains("import { x } from \"./x.js\";"));
        assert!(second.contains("\t\tthis.hp = 10;\n"));
        assert!(second.contains("\t\tthis.a.setDepth(5);\n"));
        assert!(second.ends_with("// You can write more code here\n\nexport default Level;\n"));
        assert!(second.contains("const a = this.add.image(20, 0, \"logo\");"));
    }

    #[test]
    fn regeneration_is_idempotent() {
        let data = json!({ "displayList": [
            { "type": "container", "id": "c", "scope": "CLASS", "children": [
                { "type": "image", "id": "a", "texture": { "key": "ui", "frame": "x" } }
            ]}
        ]});
        let declarations = [LoaderDeclaration::new("atlas", "ui").arg("ui.png").arg("ui.json")];
        let first = generate(data.clone(), "", &declarations);
        let second = generate(data, &first, &declarations);
        assert_eq!(first, second);
    }

    #[test]
    fn names() {
        assert_eq!(format_to_valid_var_name(" hero-1 "), "hero_1");
        assert_eq!(format_to_valid_var_name("9lives"), "_9lives");
        assert_eq!(format_to_class_name("level-01"), "Level_01");
        assert_eq!(format_to_class_name(""), "Scene");
    }
}
