//! Validation System - The Compile Gate
//!
//! Accepts any JSON value and reports every defect it finds, in document
//! order, as a path-prefixed message. Never panics, never short-circuits
//! across rules.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constraints::{
    is_known_font, ALIGNMENTS, BORDER_RADII, COLUMN_COUNTS, COLUMN_GAPS, CONTENT_WIDTH_MAX,
    CONTENT_WIDTH_MIN, DIVIDER_STYLES, DIVIDER_WIDTHS, FONTS, FONT_SIZES, ICON_STYLES,
    LINE_HEIGHTS, LOGO_WIDTH_MAX, LOGO_WIDTH_MIN, MAX_COLUMN_NESTING, MAX_WIDTH,
    SOCIAL_ICON_SIZES, SOCIAL_NETWORKS, SPACER_HEIGHTS, TEXT_ALIGNMENTS, VERTICAL_ALIGNMENTS,
};
use crate::document::{BlockKind, Template};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ValidationResult {
    pub fn success() -> Self {
        Self { valid: true, errors: vec![] }
    }

    pub fn failure(errors: Vec<String>) -> Self {
        Self { valid: false, errors }
    }

    pub fn from_errors(errors: Vec<String>) -> Self {
        if errors.is_empty() {
            Self::success()
        } else {
            Self::failure(errors)
        }
    }
}

/// Document-level rule - produces error messages for one concern
pub trait ValidationRule {
    fn name(&self) -> &'static str;
    fn validate(&self, document: &Map<String, Value>) -> Vec<String>;
}

/// Render a JSON value for an error message; strings lose their quotes
fn describe(value: Option<&Value>) -> String {
    match value {
        None => "undefined".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Absent and `null` both mean "not specified"
fn specified<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    map.get(key).filter(|v| !v.is_null())
}

fn join<T: ToString>(values: &[T]) -> String {
    values.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(", ")
}

// --- Document Rules ---

pub struct VersionRule;

impl ValidationRule for VersionRule {
    fn name(&self) -> &'static str { "version" }

    fn validate(&self, document: &Map<String, Value>) -> Vec<String> {
        let version = document.get("version");
        if version.and_then(Value::as_str) == Some(Template::VERSION) {
            vec![]
        } else {
            vec![format!(
                "Unsupported version: {}. Expected \"{}\"",
                describe(version),
                Template::VERSION
            )]
        }
    }
}

pub struct MetadataRule;

impl ValidationRule for MetadataRule {
    fn name(&self) -> &'static str { "metadata" }

    fn validate(&self, document: &Map<String, Value>) -> Vec<String> {
        let Some(metadata) = document.get("metadata").and_then(Value::as_object) else {
            return vec!["Missing or invalid metadata".to_string()];
        };

        ["subject", "preheader"]
            .iter()
            .filter(|field| !metadata.get(**field).is_some_and(Value::is_string))
            .map(|field| format!("metadata.{} must be a string", field))
            .collect()
    }
}

pub struct SettingsRule;

impl ValidationRule for SettingsRule {
    fn name(&self) -> &'static str { "settings" }

    fn validate(&self, document: &Map<String, Value>) -> Vec<String> {
        let Some(settings) = document.get("settings").and_then(Value::as_object) else {
            return vec!["Missing or invalid settings".to_string()];
        };

        let mut errors = vec![];

        if !settings.get("backgroundColor").is_some_and(Value::is_string) {
            errors.push("settings.backgroundColor must be a string".to_string());
        }

        match settings.get("contentWidth") {
            Some(Value::Number(n)) => match n.as_f64() {
                Some(w) if w < CONTENT_WIDTH_MIN as f64 || w > CONTENT_WIDTH_MAX as f64 => {
                    errors.push(format!(
                        "settings.contentWidth must be between {} and {}",
                        CONTENT_WIDTH_MIN, CONTENT_WIDTH_MAX
                    ));
                }
                _ if n.as_u64().is_none() => {
                    errors.push("settings.contentWidth must be an integer".to_string());
                }
                _ => {}
            },
            _ => errors.push("settings.contentWidth must be a number".to_string()),
        }

        if !settings.get("fontFamily").is_some_and(Value::is_string) {
            errors.push("settings.fontFamily must be a string".to_string());
        }

        errors
    }
}

pub struct ContentRule;

impl ValidationRule for ContentRule {
    fn name(&self) -> &'static str { "content" }

    fn validate(&self, document: &Map<String, Value>) -> Vec<String> {
        let Some(content) = document.get("content").and_then(Value::as_array) else {
            return vec!["content must be an array".to_string()];
        };

        let mut errors = vec![];
        for (index, block) in content.iter().enumerate() {
            validate_block(block, &format!("content[{}]", index), 0, &mut errors);
        }
        errors
    }
}

// --- Block Rules ---

/// `depth` counts the EmailColumns blocks enclosing this one
fn validate_block(block: &Value, prefix: &str, depth: usize, errors: &mut Vec<String>) {
    let Some(block) = block.as_object() else {
        errors.push(format!("{}: Block must be an object", prefix));
        return;
    };

    let type_name = block.get("type");
    let Some(kind) = type_name.and_then(Value::as_str).and_then(BlockKind::from_type_name) else {
        errors.push(format!("{}: Invalid block type \"{}\"", prefix, describe(type_name)));
        return;
    };

    let Some(props) = block.get("props").and_then(Value::as_object) else {
        errors.push(format!("{}: Block must have props object", prefix));
        return;
    };

    let mut check = PropChecker { props, prefix, errors: &mut *errors };
    check_props(kind, &mut check);

    if kind == BlockKind::EmailColumns {
        if depth >= MAX_COLUMN_NESTING {
            errors.push(format!(
                "{}: columns nesting exceeds {} levels",
                prefix, MAX_COLUMN_NESTING
            ));
            return;
        }
        match specified(block, "children") {
            None => {}
            Some(Value::Array(children)) => {
                for (index, child) in children.iter().enumerate() {
                    let child_prefix = format!("{}.children[{}]", prefix, index);
                    validate_block(child, &child_prefix, depth + 1, errors);
                }
            }
            Some(_) => errors.push(format!("{}.children must be an array", prefix)),
        }
    }
}

fn check_props(kind: BlockKind, check: &mut PropChecker<'_>) {
    match kind {
        BlockKind::EmailHeader => {
            check.int_range("logoWidth", LOGO_WIDTH_MIN, LOGO_WIDTH_MAX);
            check.one_of_str("align", ALIGNMENTS);
            check.strings(&["logoUrl", "logoAlt", "backgroundColor", "padding"]);
        }
        BlockKind::EmailText => {
            check.one_of_int("fontSize", FONT_SIZES);
            check.one_of_str("lineHeight", LINE_HEIGHTS);
            check.font("fontFamily");
            check.one_of_str("align", TEXT_ALIGNMENTS);
            check.strings(&["content", "color", "padding"]);
        }
        BlockKind::EmailImage => {
            check.required_text("alt", "is required for accessibility");
            check.image_width("width");
            check.one_of_str("align", ALIGNMENTS);
            check.strings(&["src", "href", "padding"]);
        }
        BlockKind::EmailButton => {
            check.required_text("text", "is required");
            check.required_text("href", "is required");
            check.one_of_int("borderRadius", BORDER_RADII);
            check.one_of_int("fontSize", FONT_SIZES);
            check.one_of_str("align", ALIGNMENTS);
            check.boolean("fullWidth");
            check.strings(&["backgroundColor", "textColor", "padding"]);
        }
        BlockKind::EmailColumns => {
            check.one_of_int("columns", COLUMN_COUNTS);
            check.one_of_str("gap", COLUMN_GAPS);
            check.one_of_str("verticalAlign", VERTICAL_ALIGNMENTS);
            check.boolean("stackOnMobile");
        }
        BlockKind::EmailSpacer => {
            check.one_of_int("height", SPACER_HEIGHTS);
        }
        BlockKind::EmailDivider => {
            check.one_of_int("width", DIVIDER_WIDTHS);
            check.one_of_str("style", DIVIDER_STYLES);
            check.strings(&["color", "padding"]);
        }
        BlockKind::EmailSocial => {
            check.one_of_int("iconSize", SOCIAL_ICON_SIZES);
            check.one_of_str("iconStyle", ICON_STYLES);
            check.one_of_str("align", ALIGNMENTS);
            check.social_networks("networks");
            for network in SOCIAL_NETWORKS {
                check.string(&format!("{}Url", network));
            }
        }
        BlockKind::EmailFooter => {
            check.boolean("showUnsubscribe");
            check.strings(&[
                "companyName",
                "address",
                "unsubscribeText",
                "backgroundColor",
                "textColor",
            ]);
        }
    }
}

/// Field checks for one block's props; every message names its field path
struct PropChecker<'a> {
    props: &'a Map<String, Value>,
    prefix: &'a str,
    errors: &'a mut Vec<String>,
}

impl<'a> PropChecker<'a> {
    fn field(&self, name: &str) -> Option<&'a Value> {
        specified(self.props, name)
    }

    fn fail(&mut self, name: &str, message: impl std::fmt::Display) {
        self.errors.push(format!("{}.props.{} {}", self.prefix, name, message));
    }

    fn string(&mut self, name: &str) {
        if self.field(name).is_some_and(|v| !v.is_string()) {
            self.fail(name, "must be a string");
        }
    }

    fn strings(&mut self, names: &[&str]) {
        for name in names {
            self.string(name);
        }
    }

    fn boolean(&mut self, name: &str) {
        if self.field(name).is_some_and(|v| !v.is_boolean()) {
            self.fail(name, "must be a boolean");
        }
    }

    /// Checked by truthiness: absent, null and "" are all missing
    fn required_text(&mut self, name: &str, message: &str) {
        let props = self.props;
        match props.get(name) {
            Some(Value::String(s)) if !s.is_empty() => {}
            Some(Value::String(_)) | Some(Value::Null) | None => self.fail(name, message),
            Some(_) => self.fail(name, "must be a non-empty string"),
        }
    }

    fn one_of_int(&mut self, name: &str, allowed: &[u32]) {
        let Some(value) = self.field(name) else { return };
        let member = value
            .as_u64()
            .is_some_and(|n| allowed.iter().any(|a| u64::from(*a) == n));
        if !member {
            self.fail(name, format!("must be one of: {}", join(allowed)));
        }
    }

    fn one_of_str(&mut self, name: &str, allowed: &[&str]) {
        let Some(value) = self.field(name) else { return };
        if !value.as_str().is_some_and(|s| allowed.contains(&s)) {
            self.fail(name, format!("must be one of: {}", join(allowed)));
        }
    }

    fn int_range(&mut self, name: &str, min: u32, max: u32) {
        let Some(value) = self.field(name) else { return };
        let in_range = value
            .as_u64()
            .is_some_and(|n| (u64::from(min)..=u64::from(max)).contains(&n));
        if !in_range {
            self.fail(name, format!("must be between {} and {}", min, max));
        }
    }

    fn font(&mut self, name: &str) {
        let Some(value) = self.field(name) else { return };
        if !value.as_str().is_some_and(is_known_font) {
            let labels: Vec<_> = FONTS.iter().map(|f| f.label).collect();
            self.fail(name, format!("must be one of the safe font stacks: {}", labels.join(", ")));
        }
    }

    fn image_width(&mut self, name: &str) {
        let Some(value) = self.field(name) else { return };
        let ok = match value {
            Value::String(s) => s == "full",
            other => other.as_u64().is_some_and(|n| n <= u64::from(MAX_WIDTH)),
        };
        if !ok {
            self.fail(name, format!("must be \"full\" or between 0 and {}", MAX_WIDTH));
        }
    }

    fn social_networks(&mut self, name: &str) {
        let Some(value) = self.field(name) else { return };
        let Some(entries) = value.as_array() else {
            self.fail(name, "must be an array");
            return;
        };

        for (index, entry) in entries.iter().enumerate() {
            let entry_name = format!("{}[{}]", name, index);
            let Some(entry) = entry.as_object() else {
                self.fail(&entry_name, "must be an object");
                continue;
            };
            let known = entry
                .get("type")
                .and_then(Value::as_str)
                .is_some_and(|t| SOCIAL_NETWORKS.contains(&t));
            if !known {
                self.fail(
                    &format!("{}.type", entry_name),
                    format!("must be one of: {}", join(SOCIAL_NETWORKS)),
                );
            }
            if !entry.get("url").is_some_and(Value::is_string) {
                self.fail(&format!("{}.url", entry_name), "must be a string");
            }
        }
    }
}

/// Validator runs every document rule in order and accumulates errors
pub struct Validator {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl Validator {
    pub fn new() -> Self {
        Self {
            rules: vec![
                Box::new(VersionRule),
                Box::new(MetadataRule),
                Box::new(SettingsRule),
                Box::new(ContentRule),
            ],
        }
    }

    pub fn validate(&self, candidate: &Value) -> ValidationResult {
        let Some(document) = candidate.as_object() else {
            return ValidationResult::failure(vec!["Template must be an object".to_string()]);
        };

        let mut errors = vec![];
        for rule in &self.rules {
            let found = rule.validate(document);
            if !found.is_empty() {
                tracing::trace!(rule = rule.name(), count = found.len(), "rule reported errors");
            }
            errors.extend(found);
        }

        tracing::debug!(errors = errors.len(), "template validated");
        ValidationResult::from_errors(errors)
    }

    /// Validate an already-typed document through its JSON form
    pub fn validate_template(&self, template: &Template) -> ValidationResult {
        match template.to_value() {
            Ok(value) => self.validate(&value),
            Err(e) => ValidationResult::failure(vec![format!("Template could not be serialized: {}", e)]),
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate a candidate document with the default rule set
pub fn validate(candidate: &Value) -> ValidationResult {
    Validator::new().validate(candidate)
}
