//! Editing Surface Adapter
//!
//! The editor works on a flat node list with synthetic positional ids and a
//! root props bag. These functions convert between that shape and a
//! `Template`. Editor data is untrusted: the reverse conversion yields a
//! JSON candidate for the validator, not a typed document.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::config::EditorConfig;
use crate::constraints::DEFAULT_FONT;
use crate::document::{Block, BlockKind, Template};
use crate::host::{ImageUpload, InboundEvent, OutboundEvent, UploadError};
use crate::pipeline::{EmailPipeline, PipelineError};

/// Root props routed to `metadata`; everything else is a setting
pub const METADATA_FIELDS: [&str; 2] = ["subject", "preheader"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorNode {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub props: Map<String, Value>,
    /// Nested nodes of an `EmailColumns` block
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<EditorNode>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditorRoot {
    #[serde(default)]
    pub props: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditorData {
    #[serde(default)]
    pub content: Vec<EditorNode>,
    #[serde(default)]
    pub root: EditorRoot,
}

fn into_map(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn to_node(block: &Block, id: String) -> Result<EditorNode, serde_json::Error> {
    let mut encoded = into_map(serde_json::to_value(block)?);
    let mut props = encoded.remove("props").map(into_map).unwrap_or_default();

    let children = match block {
        Block::EmailColumns { children, .. } => children
            .iter()
            .enumerate()
            .map(|(j, child)| to_node(child, format!("{}-{}", id, j)))
            .collect::<Result<Vec<_>, _>>()?,
        _ => vec![],
    };

    props.insert("id".to_string(), Value::String(id));
    Ok(EditorNode {
        kind: block.kind().as_str().to_string(),
        props,
        children,
    })
}

/// Template → editor nodes; ids are `block-{i}`, column children `block-{i}-{j}`
pub fn to_editor(template: &Template) -> Result<EditorData, serde_json::Error> {
    let content = template
        .content
        .iter()
        .enumerate()
        .map(|(i, block)| to_node(block, format!("block-{}", i)))
        .collect::<Result<Vec<_>, _>>()?;

    let mut props = into_map(serde_json::to_value(&template.settings)?);
    props.extend(into_map(serde_json::to_value(&template.metadata)?));

    Ok(EditorData {
        content,
        root: EditorRoot { props },
    })
}

fn from_node(node: &EditorNode) -> Value {
    let mut props = node.props.clone();
    props.remove("id");

    let mut block = Map::new();
    block.insert("type".to_string(), Value::String(node.kind.clone()));
    block.insert("props".to_string(), Value::Object(props));
    if node.kind == BlockKind::EmailColumns.as_str() {
        let children = node.children.iter().map(from_node).collect();
        block.insert("children".to_string(), Value::Array(children));
    }
    Value::Object(block)
}

/// Editor nodes → candidate template JSON (strips ids, splits root props)
pub fn from_editor(data: &EditorData) -> Value {
    let root = &data.root.props;

    let mut metadata = Map::new();
    for field in METADATA_FIELDS {
        let value = root.get(field).filter(|v| !v.is_null()).cloned();
        metadata.insert(field.to_string(), value.unwrap_or_else(|| json!("")));
    }

    let mut settings = into_map(json!({
        "backgroundColor": "#ffffff",
        "contentWidth": 600,
        "fontFamily": DEFAULT_FONT,
    }));
    for (key, value) in root {
        if !METADATA_FIELDS.contains(&key.as_str()) && !value.is_null() {
            settings.insert(key.clone(), value.clone());
        }
    }

    json!({
        "version": Template::VERSION,
        "metadata": metadata,
        "settings": settings,
        "content": data.content.iter().map(from_node).collect::<Vec<_>>(),
    })
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// One editing session: owns the current editor data and the config it
/// was opened with.
pub struct EditorSession<'a> {
    config: &'a EditorConfig,
    data: EditorData,
    preview_html: Option<String>,
    last_upload: Option<Result<String, String>>,
}

impl<'a> EditorSession<'a> {
    pub fn new(config: &'a EditorConfig, initial: Option<&Template>) -> Result<Self, serde_json::Error> {
        let data = match initial {
            Some(template) => to_editor(template)?,
            None => to_editor(&Template::default())?,
        };
        Ok(Self {
            config,
            data,
            preview_html: None,
            last_upload: None,
        })
    }

    pub fn data(&self) -> &EditorData {
        &self.data
    }

    /// Every edit replaces the whole document
    pub fn replace(&mut self, data: EditorData) {
        self.data = data;
    }

    /// Append a block with defaults from the session config
    pub fn insert_block(&mut self, kind: BlockKind) -> Result<(), serde_json::Error> {
        let mut block = Block::with_defaults(kind);
        match &mut block {
            Block::EmailHeader { props } => {
                if let Some(logo) = &self.config.brand_logo {
                    props.logo_url = logo.clone();
                }
            }
            Block::EmailFooter { props } => {
                if let Some(footer) = &self.config.default_footer {
                    props.company_name = footer.company_name.clone();
                    props.address = footer.address.clone();
                }
            }
            _ => {}
        }

        let id = format!("block-{}", self.data.content.len());
        self.data.content.push(to_node(&block, id)?);
        Ok(())
    }

    pub fn variable_tokens(&self) -> Vec<String> {
        self.config.variables.iter().map(|v| v.token()).collect()
    }

    /// `(label, token)` pairs for the variable insert menu
    pub fn variable_options(&self) -> Vec<(String, String)> {
        self.config
            .variables
            .iter()
            .map(|v| (v.label.clone(), v.token()))
            .collect()
    }

    /// `(label, value)` pairs for colour pickers, labels capitalized
    pub fn color_options(&self) -> Vec<(String, String)> {
        self.config
            .palette()
            .into_iter()
            .map(|(name, value)| (capitalize(&name), value))
            .collect()
    }

    pub fn autosave(&self) -> OutboundEvent {
        OutboundEvent::Autosave { json: from_editor(&self.data) }
    }

    pub fn publish(&self, pipeline: &EmailPipeline) -> Result<OutboundEvent, PipelineError> {
        let compiled = pipeline.compile(&from_editor(&self.data))?;
        Ok(OutboundEvent::Save {
            json: compiled.template,
            mjml: compiled.mjml,
        })
    }

    pub fn request_preview(&self, pipeline: &EmailPipeline) -> Result<OutboundEvent, PipelineError> {
        let compiled = pipeline.compile(&from_editor(&self.data))?;
        Ok(OutboundEvent::Preview { mjml: compiled.mjml })
    }

    /// Check an upload locally before it is sent to the host
    pub fn upload_image(&self, upload: ImageUpload) -> Result<OutboundEvent, UploadError> {
        upload.decode()?;
        Ok(OutboundEvent::Upload(upload))
    }

    pub fn apply(&mut self, event: InboundEvent) {
        match event {
            InboundEvent::PreviewHtml { html } => self.preview_html = Some(html),
            InboundEvent::UploadComplete { url } => self.last_upload = Some(Ok(url)),
            InboundEvent::UploadFailed { error } => {
                tracing::warn!(%error, "image upload failed");
                self.last_upload = Some(Err(error));
            }
        }
    }

    pub fn preview_html(&self) -> Option<&str> {
        self.preview_html.as_deref()
    }

    /// URL of the last successful upload, or the host's error message
    pub fn last_upload(&self) -> Option<Result<&str, &str>> {
        self.last_upload
            .as_ref()
            .map(|r| r.as_ref().map(String::as_str).map_err(String::as_str))
    }
}
