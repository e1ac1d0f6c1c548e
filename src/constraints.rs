//! Constraint Catalog - Email-Client-Safe Values
//!
//! Closed enumerations only. A value either renders in Outlook, Gmail and
//! friends or it does not; nothing here is interpolated.

use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct FontOption {
    pub value: &'static str,
    pub label: &'static str,
}

/// System-safe font stacks, each ending in a generic family
pub const FONTS: &[FontOption] = &[
    FontOption { value: "Arial, Helvetica, sans-serif", label: "Arial" },
    FontOption { value: "Georgia, serif", label: "Georgia" },
    FontOption { value: "Tahoma, sans-serif", label: "Tahoma" },
    FontOption { value: "Verdana, sans-serif", label: "Verdana" },
    FontOption { value: "Times New Roman, serif", label: "Times New Roman" },
    FontOption { value: "Courier New, monospace", label: "Courier New" },
    FontOption { value: "Trebuchet MS, sans-serif", label: "Trebuchet MS" },
    FontOption { value: "Lucida Sans Unicode, sans-serif", label: "Lucida Sans" },
];

pub const DEFAULT_FONT: &str = "Arial, Helvetica, sans-serif";

pub const FONT_SIZES: &[u32] = &[12, 14, 16, 18, 20, 24, 28, 32, 36, 48];

pub const LINE_HEIGHTS: &[&str] = &["1.2", "1.4", "1.5", "1.6", "1.8"];

/// Outlook mangles anything rounder than 8px
pub const BORDER_RADII: &[u32] = &[0, 4, 8];

pub const PADDING: &[(&str, &str)] = &[
    ("none", "0px"),
    ("xs", "5px"),
    ("sm", "10px"),
    ("md", "20px"),
    ("lg", "30px"),
    ("xl", "40px"),
];

pub const BUTTON_PADDING: &[(&str, &str)] = &[
    ("sm", "10px 20px"),
    ("md", "15px 30px"),
    ("lg", "20px 40px"),
];

pub const DEFAULT_PADDING: &str = "md";

pub const MAX_WIDTH: u32 = 600;
pub const CONTENT_WIDTH_MIN: u32 = 400;
pub const CONTENT_WIDTH_MAX: u32 = 700;
pub const MIN_COLUMN_WIDTH: u32 = 100;

pub const LOGO_WIDTH_MIN: u32 = 50;
pub const LOGO_WIDTH_MAX: u32 = 300;

/// Raster formats only; webp/avif/svg break in legacy clients
pub const IMAGE_FORMATS: &[&str] = &["jpg", "jpeg", "png", "gif"];
pub const MAX_IMAGE_SIZE_KB: usize = 500;

pub const SPACER_HEIGHTS: &[u32] = &[10, 20, 30, 40, 50, 60];
pub const DIVIDER_WIDTHS: &[u32] = &[1, 2, 3];
pub const COLUMN_COUNTS: &[u32] = &[1, 2, 3, 4];
pub const SOCIAL_ICON_SIZES: &[u32] = &[24, 32, 40];

pub const SOCIAL_NETWORKS: &[&str] = &["facebook", "twitter", "linkedin", "instagram", "youtube"];

pub const ALIGNMENTS: &[&str] = &["left", "center", "right"];
pub const TEXT_ALIGNMENTS: &[&str] = &["left", "center", "right", "justify"];
pub const VERTICAL_ALIGNMENTS: &[&str] = &["top", "middle", "bottom"];
pub const DIVIDER_STYLES: &[&str] = &["solid", "dashed", "dotted"];
pub const COLUMN_GAPS: &[&str] = &["none", "sm", "md", "lg"];
pub const ICON_STYLES: &[&str] = &["color", "black", "white"];

/// Deepest chain of EmailColumns-inside-EmailColumns accepted by the validator
pub const MAX_COLUMN_NESTING: usize = 3;

/// Resolved at send time, never by this crate
pub const UNSUBSCRIBE_PLACEHOLDER: &str = "{{unsubscribe_url}}";

fn lookup(table: &'static [(&'static str, &'static str)], key: &str) -> Option<&'static str> {
    table.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

/// Resolve a padding size to a CSS length, falling back to `md`
pub fn padding(key: &str) -> &'static str {
    lookup(PADDING, key)
        .or_else(|| lookup(PADDING, DEFAULT_PADDING))
        .unwrap_or("20px")
}

/// Resolve a button padding tier, falling back to `md`
pub fn button_padding(key: &str) -> &'static str {
    lookup(BUTTON_PADDING, key)
        .or_else(|| lookup(BUTTON_PADDING, DEFAULT_PADDING))
        .unwrap_or("15px 30px")
}

pub fn is_known_font(stack: &str) -> bool {
    FONTS.iter().any(|f| f.value == stack)
}

/// Serializable snapshot of the whole catalog
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    pub fonts: &'static [FontOption],
    pub font_sizes: &'static [u32],
    pub line_heights: &'static [&'static str],
    pub border_radius: &'static [u32],
    pub padding: &'static [(&'static str, &'static str)],
    pub button_padding: &'static [(&'static str, &'static str)],
    pub max_width: u32,
    pub content_width: [u32; 2],
    pub min_column_width: u32,
    pub image_formats: &'static [&'static str],
    pub max_image_size_kb: usize,
    pub spacer_heights: &'static [u32],
    pub divider_widths: &'static [u32],
    pub column_counts: &'static [u32],
    pub social_icon_sizes: &'static [u32],
    pub social_networks: &'static [&'static str],
}

impl Catalog {
    pub fn current() -> Self {
        Self {
            fonts: FONTS,
            font_sizes: FONT_SIZES,
            line_heights: LINE_HEIGHTS,
            border_radius: BORDER_RADII,
            padding: PADDING,
            button_padding: BUTTON_PADDING,
            max_width: MAX_WIDTH,
            content_width: [CONTENT_WIDTH_MIN, CONTENT_WIDTH_MAX],
            min_column_width: MIN_COLUMN_WIDTH,
            image_formats: IMAGE_FORMATS,
            max_image_size_kb: MAX_IMAGE_SIZE_KB,
            spacer_heights: SPACER_HEIGHTS,
            divider_widths: DIVIDER_WIDTHS,
            column_counts: COLUMN_COUNTS,
            social_icon_sizes: SOCIAL_ICON_SIZES,
            social_networks: SOCIAL_NETWORKS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padding_fallback() {
        assert_eq!(padding("xl"), "40px");
        assert_eq!(padding("none"), "0px");
        assert_eq!(padding("huge"), "20px");
        assert_eq!(button_padding("lg"), "20px 40px");
        assert_eq!(button_padding("xs"), "15px 30px");
    }

    #[test]
    fn test_fonts_end_in_generic_family() {
        for font in FONTS {
            let last = font.value.rsplit(',').next().unwrap().trim();
            assert!(["serif", "sans-serif", "monospace"].contains(&last), "{}", font.value);
        }
        assert!(is_known_font(DEFAULT_FONT));
    }

    #[test]
    fn test_no_modern_image_formats() {
        for fmt in ["webp", "avif", "svg"] {
            assert!(!IMAGE_FORMATS.contains(&fmt));
        }
    }

    #[test]
    fn test_catalog_serializes() {
        let json = serde_json::to_value(Catalog::current()).unwrap();
        assert_eq!(json["maxWidth"], 600);
        assert_eq!(json["contentWidth"], serde_json::json!([400, 700]));
        assert_eq!(json["padding"][0], serde_json::json!(["none", "0px"]));
    }
}
