//! MJML Compiler - Document To Markup
//!
//! Pure, single-pass lowering of a validated template. The compiler trusts
//! its input: run `validation` first. Free text is escaped on the way out;
//! `EmailText.content` is editor-authored rich text and passes through raw.

use crate::constraints::{self, UNSUBSCRIBE_PLACEHOLDER};
use crate::document::{
    Block, ButtonProps, ColumnGap, ColumnsProps, DividerProps, FooterProps, HeaderProps,
    IconStyle, ImageProps, ImageWidth, SocialProps, SpacerProps, Template, TextProps,
};
use crate::escape::escape_html;

const EMPTY_COLUMN: &str = "        <!-- Empty column -->";

/// Compile a validated template to MJML
pub fn compile(template: &Template) -> String {
    let Template { metadata, settings, content, .. } = template;

    let sections: Vec<String> = content
        .iter()
        .map(render_section)
        .filter(|s| !s.is_empty())
        .collect();
    let body = if sections.is_empty() {
        String::new()
    } else {
        format!("{}\n", sections.join("\n"))
    };

    format!(
        r#"<mjml>
  <mj-head>
    <mj-title>{subject}</mj-title>
    <mj-preview>{preheader}</mj-preview>
    <mj-attributes>
      <mj-all font-family="{font}" />
      <mj-section padding="0" />
      <mj-class name="no-stack" />
    </mj-attributes>
  </mj-head>
  <mj-body width="{width}px" background-color="{background}">
{body}  </mj-body>
</mjml>"#,
        subject = escape_html(&metadata.subject),
        preheader = escape_html(&metadata.preheader),
        font = escape_html(&settings.font_family),
        width = settings.content_width,
        background = escape_html(&settings.background_color),
        body = body,
    )
}

/// Items per column for `len` children across `columns` columns.
///
/// Contiguous chunks of `ceil(len / columns)`; trailing chunks may be short
/// or empty. A column count of zero is treated as the default of two.
pub fn chunk_sizes(len: usize, columns: usize) -> Vec<usize> {
    let columns = if columns == 0 { 2 } else { columns };
    let per_column = len.div_ceil(columns);

    (0..columns)
        .map(|i| {
            let start = (i * per_column).min(len);
            let end = (start + per_column).min(len);
            end - start
        })
        .collect()
}

/// A block lowered to its section attributes and column-level element
struct Lowered {
    section_attrs: String,
    element: String,
}

fn render_section(block: &Block) -> String {
    if let Block::EmailColumns { props, children } = block {
        return render_columns(props, children);
    }

    match lower(block) {
        Some(Lowered { section_attrs, element }) => format!(
            "    <mj-section{}>\n      <mj-column>\n{}\n      </mj-column>\n    </mj-section>",
            section_attrs, element
        ),
        None => String::new(),
    }
}

fn lower(block: &Block) -> Option<Lowered> {
    match block {
        Block::EmailHeader { props } => Some(lower_header(props)),
        Block::EmailText { props } => Some(lower_text(props)),
        Block::EmailImage { props } => Some(lower_image(props)),
        Block::EmailButton { props } => Some(lower_button(props)),
        Block::EmailSpacer { props } => Some(lower_spacer(props)),
        Block::EmailDivider { props } => Some(lower_divider(props)),
        Block::EmailSocial { props } => lower_social(props),
        Block::EmailFooter { props } => Some(lower_footer(props)),
        // Columns own a whole section; inside a column they flatten
        Block::EmailColumns { .. } => None,
    }
}

/// Column-level elements for a child block. Sections cannot nest inside
/// columns, so section attributes are dropped and nested columns flatten.
fn column_elements(block: &Block) -> Vec<String> {
    match block {
        Block::EmailColumns { children, .. } => children.iter().flat_map(column_elements).collect(),
        other => lower(other).map(|l| l.element).into_iter().collect(),
    }
}

fn attr(name: &str, value: impl std::fmt::Display) -> String {
    format!("\n          {}=\"{}\"", name, value)
}

fn padding_attr(key: &str) -> String {
    format!(" padding=\"{}\"", constraints::padding(key))
}

fn lower_header(props: &HeaderProps) -> Lowered {
    let alt = if props.logo_alt.is_empty() { "Logo" } else { props.logo_alt.as_str() };

    Lowered {
        section_attrs: format!(
            " background-color=\"{}\"{}",
            escape_html(&props.background_color),
            padding_attr(&props.padding)
        ),
        element: format!(
            "        <mj-image{}{}{}{}\n        />",
            attr("src", escape_html(&props.logo_url)),
            attr("alt", escape_html(alt)),
            attr("width", format!("{}px", props.logo_width)),
            attr("align", props.align.as_str()),
        ),
    }
}

fn lower_text(props: &TextProps) -> Lowered {
    Lowered {
        section_attrs: padding_attr(&props.padding),
        element: format!(
            "        <mj-text{}{}{}{}{}\n        >{}</mj-text>",
            attr("font-size", format!("{}px", props.font_size)),
            attr("font-family", escape_html(&props.font_family)),
            attr("color", escape_html(&props.color)),
            attr("align", props.align.as_str()),
            attr("line-height", escape_html(&props.line_height)),
            props.content,
        ),
    }
}

fn lower_image(props: &ImageProps) -> Lowered {
    let width = match props.width {
        ImageWidth::Pixels(px) if px > 0 => format!("{}px", px),
        _ => "100%".to_string(),
    };
    let href = match props.href.as_deref() {
        Some(href) if !href.is_empty() => attr("href", escape_html(href)),
        _ => String::new(),
    };

    Lowered {
        section_attrs: padding_attr(&props.padding),
        element: format!(
            "        <mj-image{}{}{}{}{}\n        />",
            attr("src", escape_html(&props.src)),
            attr("alt", escape_html(&props.alt)),
            attr("width", width),
            attr("align", props.align.as_str()),
            href,
        ),
    }
}

fn lower_button(props: &ButtonProps) -> Lowered {
    let width = if props.full_width { attr("width", "100%") } else { String::new() };

    Lowered {
        section_attrs: String::new(),
        element: format!(
            "        <mj-button{}{}{}{}{}{}{}{}\n        >{}</mj-button>",
            attr("href", escape_html(&props.href)),
            attr("background-color", escape_html(&props.background_color)),
            attr("color", escape_html(&props.text_color)),
            attr("font-size", format!("{}px", props.font_size)),
            attr("border-radius", format!("{}px", props.border_radius)),
            attr("align", props.align.as_str()),
            attr("padding", constraints::button_padding(&props.padding)),
            width,
            escape_html(&props.text),
        ),
    }
}

fn lower_spacer(props: &SpacerProps) -> Lowered {
    Lowered {
        section_attrs: String::new(),
        element: format!("        <mj-spacer height=\"{}px\" />", props.height),
    }
}

fn lower_divider(props: &DividerProps) -> Lowered {
    Lowered {
        section_attrs: padding_attr(&props.padding),
        element: format!(
            "        <mj-divider{}{}{}\n        />",
            attr("border-color", escape_html(&props.color)),
            attr("border-width", format!("{}px", props.width)),
            attr("border-style", props.style.as_str()),
        ),
    }
}

fn lower_social(props: &SocialProps) -> Option<Lowered> {
    let links = props.links();
    if links.is_empty() {
        return None;
    }

    let (mode, icon_background) = match props.icon_style {
        IconStyle::Color => ("vertical", None),
        IconStyle::Black => ("horizontal", Some("#000000")),
        IconStyle::White => ("horizontal", Some("#ffffff")),
    };
    let background = icon_background
        .map(|color| format!(" background-color=\"{}\"", color))
        .unwrap_or_default();

    let elements: Vec<String> = links
        .iter()
        .map(|(network, url)| {
            format!(
                "          <mj-social-element name=\"{}\" href=\"{}\" icon-size=\"{}px\"{} />",
                network.as_str(),
                escape_html(url),
                props.icon_size,
                background,
            )
        })
        .collect();

    Some(Lowered {
        section_attrs: String::new(),
        element: format!(
            "        <mj-social align=\"{}\" mode=\"{}\">\n{}\n        </mj-social>",
            props.align.as_str(),
            mode,
            elements.join("\n"),
        ),
    })
}

fn lower_footer(props: &FooterProps) -> Lowered {
    let text_color = escape_html(&props.text_color);
    let address = escape_html(&props.address)
        .replace("\r\n", "<br/>")
        .replace('\n', "<br/>");
    let unsubscribe = if props.show_unsubscribe {
        let label = if props.unsubscribe_text.is_empty() {
            "Unsubscribe"
        } else {
            props.unsubscribe_text.as_str()
        };
        format!(
            "\n          <br/><a href=\"{}\" style=\"color: {}; text-decoration: underline;\">{}</a>",
            UNSUBSCRIBE_PLACEHOLDER,
            text_color,
            escape_html(label),
        )
    } else {
        String::new()
    };

    Lowered {
        section_attrs: format!(" background-color=\"{}\"", escape_html(&props.background_color)),
        element: format!(
            "        <mj-text{}{}{}{}\n        >\n          <strong>{}</strong><br/>\n          {}{}\n        </mj-text>",
            attr("font-size", "12px"),
            attr("color", &text_color),
            attr("align", "center"),
            attr("line-height", "1.6"),
            escape_html(&props.company_name),
            address,
            unsubscribe,
        ),
    }
}

fn render_columns(props: &ColumnsProps, children: &[Block]) -> String {
    let sizes = chunk_sizes(children.len(), props.columns as usize);
    let column_padding = match props.gap {
        ColumnGap::None => String::new(),
        gap => format!(" padding=\"0 {}\"", constraints::padding(gap.as_str())),
    };

    let mut start = 0;
    let columns: Vec<String> = sizes
        .iter()
        .map(|size| {
            let chunk = &children[start..start + size];
            start += size;

            let elements: Vec<String> = chunk.iter().flat_map(column_elements).collect();
            let inner = if elements.is_empty() {
                EMPTY_COLUMN.to_string()
            } else {
                elements.join("\n")
            };
            format!(
                "      <mj-column vertical-align=\"{}\"{}>\n{}\n      </mj-column>",
                props.vertical_align.as_str(),
                column_padding,
                inner
            )
        })
        .collect();

    let stack = if props.stack_on_mobile { "" } else { " mj-class=\"no-stack\"" };
    format!("    <mj-section{}>\n{}\n    </mj-section>", stack, columns.join("\n"))
}
