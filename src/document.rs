//! Document Model - Templates Are Data
//!
//! A template is metadata, global settings and an ordered list of typed
//! blocks. Nothing here enforces the constraint catalog; documents can
//! arrive from anywhere and go through `validation` before `compiler`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constraints::DEFAULT_FONT;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub version: String,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub content: Vec<Block>,
}

impl Template {
    pub const VERSION: &'static str = "1.0";

    pub fn new(metadata: Metadata, settings: Settings, content: Vec<Block>) -> Self {
        Self {
            version: Self::VERSION.to_string(),
            metadata,
            settings,
            content,
        }
    }

    /// Deserialize a candidate. `null` block props and `children` count as
    /// unspecified and take their defaults, matching the validator.
    pub fn from_value(mut value: Value) -> Result<Self, serde_json::Error> {
        if let Some(Value::Array(content)) = value.get_mut("content") {
            content.iter_mut().for_each(drop_null_props);
        }
        serde_json::from_value(value)
    }

    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

fn drop_null_props(block: &mut Value) {
    let Some(block) = block.as_object_mut() else { return };
    if let Some(Value::Object(props)) = block.get_mut("props") {
        props.retain(|_, v| !v.is_null());
    }
    match block.get_mut("children") {
        Some(Value::Array(children)) => children.iter_mut().for_each(drop_null_props),
        Some(Value::Null) => {
            block.remove("children");
        }
        _ => {}
    }
}

impl Default for Template {
    fn default() -> Self {
        Self::new(Metadata::default(), Settings::default(), vec![])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub preheader: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub background_color: String,
    pub content_width: u32,
    pub font_family: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            background_color: "#f4f4f4".to_string(),
            content_width: 600,
            font_family: DEFAULT_FONT.to_string(),
        }
    }
}

/// The closed set of block variants, tagged by `type` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Block {
    EmailHeader { props: HeaderProps },
    EmailText { props: TextProps },
    EmailImage { props: ImageProps },
    EmailButton { props: ButtonProps },
    EmailColumns {
        props: ColumnsProps,
        #[serde(default)]
        children: Vec<Block>,
    },
    EmailSpacer { props: SpacerProps },
    EmailDivider { props: DividerProps },
    EmailSocial { props: SocialProps },
    EmailFooter { props: FooterProps },
}

impl Block {
    pub fn kind(&self) -> BlockKind {
        match self {
            Block::EmailHeader { .. } => BlockKind::EmailHeader,
            Block::EmailText { .. } => BlockKind::EmailText,
            Block::EmailImage { .. } => BlockKind::EmailImage,
            Block::EmailButton { .. } => BlockKind::EmailButton,
            Block::EmailColumns { .. } => BlockKind::EmailColumns,
            Block::EmailSpacer { .. } => BlockKind::EmailSpacer,
            Block::EmailDivider { .. } => BlockKind::EmailDivider,
            Block::EmailSocial { .. } => BlockKind::EmailSocial,
            Block::EmailFooter { .. } => BlockKind::EmailFooter,
        }
    }

    /// A block of the given kind carrying its default props
    pub fn with_defaults(kind: BlockKind) -> Self {
        match kind {
            BlockKind::EmailHeader => Block::EmailHeader { props: HeaderProps::default() },
            BlockKind::EmailText => Block::EmailText { props: TextProps::default() },
            BlockKind::EmailImage => Block::EmailImage { props: ImageProps::default() },
            BlockKind::EmailButton => Block::EmailButton { props: ButtonProps::default() },
            BlockKind::EmailColumns => Block::EmailColumns {
                props: ColumnsProps::default(),
                children: vec![],
            },
            BlockKind::EmailSpacer => Block::EmailSpacer { props: SpacerProps::default() },
            BlockKind::EmailDivider => Block::EmailDivider { props: DividerProps::default() },
            BlockKind::EmailSocial => Block::EmailSocial { props: SocialProps::default() },
            BlockKind::EmailFooter => Block::EmailFooter { props: FooterProps::default() },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockKind {
    EmailHeader,
    EmailText,
    EmailImage,
    EmailButton,
    EmailColumns,
    EmailSpacer,
    EmailDivider,
    EmailSocial,
    EmailFooter,
}

impl BlockKind {
    pub const ALL: [BlockKind; 9] = [
        BlockKind::EmailHeader,
        BlockKind::EmailText,
        BlockKind::EmailImage,
        BlockKind::EmailButton,
        BlockKind::EmailColumns,
        BlockKind::EmailSpacer,
        BlockKind::EmailDivider,
        BlockKind::EmailSocial,
        BlockKind::EmailFooter,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BlockKind::EmailHeader => "EmailHeader",
            BlockKind::EmailText => "EmailText",
            BlockKind::EmailImage => "EmailImage",
            BlockKind::EmailButton => "EmailButton",
            BlockKind::EmailColumns => "EmailColumns",
            BlockKind::EmailSpacer => "EmailSpacer",
            BlockKind::EmailDivider => "EmailDivider",
            BlockKind::EmailSocial => "EmailSocial",
            BlockKind::EmailFooter => "EmailFooter",
        }
    }

    pub fn from_type_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.as_str() == name)
    }
}

// --- Keyword enums ---

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    Left,
    #[default]
    Center,
    Right,
}

impl Align {
    pub fn as_str(&self) -> &'static str {
        match self {
            Align::Left => "left",
            Align::Center => "center",
            Align::Right => "right",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

impl TextAlign {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
            TextAlign::Justify => "justify",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlign {
    #[default]
    Top,
    Middle,
    Bottom,
}

impl VerticalAlign {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerticalAlign::Top => "top",
            VerticalAlign::Middle => "middle",
            VerticalAlign::Bottom => "bottom",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DividerStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

impl DividerStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            DividerStyle::Solid => "solid",
            DividerStyle::Dashed => "dashed",
            DividerStyle::Dotted => "dotted",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnGap {
    None,
    Sm,
    #[default]
    Md,
    Lg,
}

impl ColumnGap {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnGap::None => "none",
            ColumnGap::Sm => "sm",
            ColumnGap::Md => "md",
            ColumnGap::Lg => "lg",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IconStyle {
    #[default]
    Color,
    Black,
    White,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SocialNetwork {
    Facebook,
    Twitter,
    Linkedin,
    Instagram,
    Youtube,
}

impl SocialNetwork {
    pub const ALL: [SocialNetwork; 5] = [
        SocialNetwork::Facebook,
        SocialNetwork::Twitter,
        SocialNetwork::Linkedin,
        SocialNetwork::Instagram,
        SocialNetwork::Youtube,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SocialNetwork::Facebook => "facebook",
            SocialNetwork::Twitter => "twitter",
            SocialNetwork::Linkedin => "linkedin",
            SocialNetwork::Instagram => "instagram",
            SocialNetwork::Youtube => "youtube",
        }
    }
}

/// Image width in pixels, or the `"full"` keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImageWidth {
    Pixels(u32),
    Keyword(WidthKeyword),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WidthKeyword {
    #[serde(rename = "full")]
    Full,
}

impl ImageWidth {
    pub const FULL: ImageWidth = ImageWidth::Keyword(WidthKeyword::Full);

    /// `0` and `"full"` both mean the whole column
    pub fn is_full(&self) -> bool {
        matches!(self, ImageWidth::Pixels(0) | ImageWidth::Keyword(WidthKeyword::Full))
    }
}

impl Default for ImageWidth {
    fn default() -> Self {
        ImageWidth::Pixels(0)
    }
}

// --- Props ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HeaderProps {
    pub logo_url: String,
    pub logo_alt: String,
    pub logo_width: u32,
    pub background_color: String,
    pub align: Align,
    pub padding: String,
}

impl Default for HeaderProps {
    fn default() -> Self {
        Self {
            logo_url: String::new(),
            logo_alt: "Company Logo".to_string(),
            logo_width: 150,
            background_color: "#ffffff".to_string(),
            align: Align::Center,
            padding: "md".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextProps {
    /// Rich text authored in the editor; emitted verbatim
    pub content: String,
    pub font_size: u32,
    pub font_family: String,
    pub color: String,
    pub align: TextAlign,
    pub line_height: String,
    pub padding: String,
}

impl Default for TextProps {
    fn default() -> Self {
        Self {
            content: "Your text here...".to_string(),
            font_size: 16,
            font_family: DEFAULT_FONT.to_string(),
            color: "#333333".to_string(),
            align: TextAlign::Left,
            line_height: "1.5".to_string(),
            padding: "md".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImageProps {
    pub src: String,
    pub alt: String,
    pub width: ImageWidth,
    pub align: Align,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    pub padding: String,
}

impl Default for ImageProps {
    fn default() -> Self {
        Self {
            src: String::new(),
            alt: String::new(),
            width: ImageWidth::default(),
            align: Align::Center,
            href: None,
            padding: "md".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ButtonProps {
    pub text: String,
    pub href: String,
    pub background_color: String,
    pub text_color: String,
    pub font_size: u32,
    pub border_radius: u32,
    pub align: Align,
    pub full_width: bool,
    /// One of the button tiers `sm`, `md`, `lg`
    pub padding: String,
}

impl Default for ButtonProps {
    fn default() -> Self {
        Self {
            text: "Click Here".to_string(),
            href: "#".to_string(),
            background_color: "#007bff".to_string(),
            text_color: "#ffffff".to_string(),
            font_size: 16,
            border_radius: 4,
            align: Align::Center,
            full_width: false,
            padding: "md".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ColumnsProps {
    pub columns: u32,
    pub gap: ColumnGap,
    pub vertical_align: VerticalAlign,
    pub stack_on_mobile: bool,
}

impl Default for ColumnsProps {
    fn default() -> Self {
        Self {
            columns: 2,
            gap: ColumnGap::Md,
            vertical_align: VerticalAlign::Top,
            stack_on_mobile: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpacerProps {
    pub height: u32,
}

impl Default for SpacerProps {
    fn default() -> Self {
        Self { height: 20 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DividerProps {
    pub color: String,
    pub width: u32,
    pub style: DividerStyle,
    pub padding: String,
}

impl Default for DividerProps {
    fn default() -> Self {
        Self {
            color: "#e0e0e0".to_string(),
            width: 1,
            style: DividerStyle::Solid,
            padding: "md".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialLink {
    #[serde(rename = "type")]
    pub network: SocialNetwork,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SocialProps {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub networks: Vec<SocialLink>,
    pub icon_size: u32,
    pub align: Align,
    pub icon_style: IconStyle,
    // Flat per-network fields, as written by the editor sidebar
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facebook_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instagram_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub youtube_url: Option<String>,
}

impl Default for SocialProps {
    fn default() -> Self {
        Self {
            networks: vec![],
            icon_size: 32,
            align: Align::Center,
            icon_style: IconStyle::Color,
            facebook_url: None,
            twitter_url: None,
            linkedin_url: None,
            instagram_url: None,
            youtube_url: None,
        }
    }
}

impl SocialProps {
    pub fn flat_url(&self, network: SocialNetwork) -> Option<&str> {
        let url = match network {
            SocialNetwork::Facebook => &self.facebook_url,
            SocialNetwork::Twitter => &self.twitter_url,
            SocialNetwork::Linkedin => &self.linkedin_url,
            SocialNetwork::Instagram => &self.instagram_url,
            SocialNetwork::Youtube => &self.youtube_url,
        };
        url.as_deref()
    }

    /// Populated links: `networks` entries first, then flat fields in catalog order
    pub fn links(&self) -> Vec<(SocialNetwork, &str)> {
        let listed = self
            .networks
            .iter()
            .map(|link| (link.network, link.url.as_str()));
        let flat = SocialNetwork::ALL
            .iter()
            .filter_map(|&network| self.flat_url(network).map(|url| (network, url)));

        listed.chain(flat).filter(|(_, url)| !url.is_empty()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FooterProps {
    pub company_name: String,
    pub address: String,
    pub show_unsubscribe: bool,
    pub unsubscribe_text: String,
    pub background_color: String,
    pub text_color: String,
}

impl Default for FooterProps {
    fn default() -> Self {
        Self {
            company_name: "Company Name".to_string(),
            address: "123 Street, City, Country".to_string(),
            show_unsubscribe: true,
            unsubscribe_text: "Unsubscribe".to_string(),
            background_color: "#f4f4f4".to_string(),
            text_color: "#666666".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_block_tagged_by_type() {
        let block: Block = serde_json::from_value(json!({
            "type": "EmailSpacer",
            "props": { "height": 40 }
        }))
        .unwrap();
        assert_eq!(block, Block::EmailSpacer { props: SpacerProps { height: 40 } });
        assert_eq!(block.kind(), BlockKind::EmailSpacer);
    }

    #[test]
    fn test_missing_props_fields_take_defaults() {
        let block: Block = serde_json::from_value(json!({
            "type": "EmailButton",
            "props": { "text": "Buy", "href": "https://shop.example" }
        }))
        .unwrap();
        match block {
            Block::EmailButton { props } => {
                assert_eq!(props.text, "Buy");
                assert_eq!(props.border_radius, 4);
                assert_eq!(props.padding, "md");
            }
            other => panic!("unexpected block {:?}", other),
        }
    }

    #[test]
    fn test_columns_children_default_empty() {
        let block: Block = serde_json::from_value(json!({
            "type": "EmailColumns",
            "props": { "columns": 3 }
        }))
        .unwrap();
        match block {
            Block::EmailColumns { props, children } => {
                assert_eq!(props.columns, 3);
                assert!(children.is_empty());
            }
            other => panic!("unexpected block {:?}", other),
        }
    }

    #[test]
    fn test_image_width_forms() {
        let full: ImageWidth = serde_json::from_value(json!("full")).unwrap();
        let px: ImageWidth = serde_json::from_value(json!(300)).unwrap();
        assert!(full.is_full());
        assert!(ImageWidth::Pixels(0).is_full());
        assert_eq!(px, ImageWidth::Pixels(300));
        assert_eq!(serde_json::to_value(ImageWidth::FULL).unwrap(), json!("full"));
    }

    #[test]
    fn test_social_links_merge_both_forms() {
        let props: SocialProps = serde_json::from_value(json!({
            "networks": [{ "type": "youtube", "url": "https://yt.example" }],
            "facebookUrl": "https://fb.example",
            "twitterUrl": ""
        }))
        .unwrap();
        let links = props.links();
        assert_eq!(
            links,
            vec![
                (SocialNetwork::Youtube, "https://yt.example"),
                (SocialNetwork::Facebook, "https://fb.example"),
            ]
        );
    }

    #[test]
    fn test_block_kind_names() {
        for kind in BlockKind::ALL {
            assert_eq!(BlockKind::from_type_name(kind.as_str()), Some(kind));
        }
        assert_eq!(BlockKind::from_type_name("EmailVideo"), None);
    }

    #[test]
    fn test_unknown_top_level_fields_ignored() {
        let t = Template::from_value(json!({
            "version": "1.0",
            "metadata": { "subject": "s", "preheader": "p" },
            "settings": { "backgroundColor": "#fff", "contentWidth": 500, "fontFamily": "Georgia, serif" },
            "content": [],
            "theme": "dark"
        }))
        .unwrap();
        assert_eq!(t.settings.content_width, 500);
        assert!(t.to_value().unwrap().get("theme").is_none());
    }

    #[test]
    fn test_null_props_take_defaults() {
        let t = Template::from_value(json!({
            "version": "1.0",
            "metadata": { "subject": "", "preheader": "" },
            "settings": { "backgroundColor": "#fff", "contentWidth": 600, "fontFamily": "Arial" },
            "content": [
                { "type": "EmailSpacer", "props": { "height": null } },
                { "type": "EmailColumns", "props": { "gap": null }, "children": null },
                { "type": "EmailColumns", "props": {}, "children": [
                    { "type": "EmailHeader", "props": { "align": null, "logoWidth": null } }
                ] }
            ]
        }))
        .unwrap();

        assert_eq!(t.content[0], Block::EmailSpacer { props: SpacerProps::default() });
        assert_eq!(
            t.content[1],
            Block::EmailColumns { props: ColumnsProps::default(), children: vec![] }
        );
        match &t.content[2] {
            Block::EmailColumns { children, .. } => {
                assert_eq!(children[0], Block::EmailHeader { props: HeaderProps::default() });
            }
            other => panic!("unexpected block {:?}", other),
        }
    }
}
