//! Contract Invariant Tests
//!
//! These tests verify the non-negotiable guarantees.

use serde_json::{json, Value};
use visual_mailer_core::{compile, hashing::canonical_json, validate, EmailPipeline, Template};

fn document(content: Value) -> Value {
    json!({
        "version": "1.0",
        "metadata": { "subject": "Spring <Sale>", "preheader": "Fish & Chips" },
        "settings": {
            "backgroundColor": "#f4f4f4",
            "contentWidth": 600,
            "fontFamily": "Arial, Helvetica, sans-serif"
        },
        "content": content
    })
}

fn with_width(width: Value) -> Value {
    let mut doc = document(json!([]));
    doc["settings"]["contentWidth"] = width;
    doc
}

fn compile_value(candidate: &Value) -> String {
    EmailPipeline::new().compile(candidate).unwrap().mjml
}

#[test]
fn invariant_compile_calls_validate() {
    let pipeline = EmailPipeline::new();

    // Invalid: unknown block type
    let candidate = document(json!([{ "type": "EmailVideo", "props": {} }]));
    let result = pipeline.compile(&candidate);

    // Must fail - validation is enforced
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("Validation failed"));
}

#[cfg(feature = "test-hooks")]
#[test]
fn invariant_compile_increments_validation_counter() {
    use visual_mailer_core::pipeline::{get_validation_call_count, reset_validation_call_count};

    reset_validation_call_count();
    let pipeline = EmailPipeline::new();
    pipeline.compile(&document(json!([]))).unwrap();
    let _ = pipeline.compile(&json!({ "version": "2.0" }));
    assert!(get_validation_call_count() >= 2);
}

#[test]
fn invariant_envelope_is_single_document() {
    let mjml = compile_value(&document(json!([
        { "type": "EmailSpacer", "props": { "height": 20 } },
        { "type": "EmailDivider", "props": {} }
    ])));

    assert_eq!(mjml.matches("<mjml>").count(), 1);
    assert_eq!(mjml.matches("</mjml>").count(), 1);
    assert!(mjml.starts_with("<mjml>"));
    assert!(mjml.ends_with("</mjml>"));
    assert!(mjml.contains("<mj-title>Spring &lt;Sale&gt;</mj-title>"));
    assert!(mjml.contains("<mj-preview>Fish &amp; Chips</mj-preview>"));
    assert!(mjml.contains("<mj-body width=\"600px\" background-color=\"#f4f4f4\">"));
}

#[test]
fn invariant_content_width_boundaries() {
    assert!(!validate(&with_width(json!(399))).valid);
    assert!(validate(&with_width(json!(400))).valid);
    assert!(validate(&with_width(json!(700))).valid);
    assert!(!validate(&with_width(json!(701))).valid);

    let result = validate(&with_width(json!(701)));
    assert_eq!(result.errors, vec!["settings.contentWidth must be between 400 and 700"]);
}

#[test]
fn invariant_image_alt_required() {
    let image = |alt: Option<&str>| {
        let mut props = json!({ "src": "https://example.com/a.png", "width": "full" });
        if let Some(alt) = alt {
            props["alt"] = json!(alt);
        }
        document(json!([{ "type": "EmailImage", "props": props }]))
    };

    let missing = validate(&image(None));
    assert_eq!(missing.errors, vec!["content[0].props.alt is required for accessibility"]);

    let empty = validate(&image(Some("")));
    assert_eq!(empty.errors, vec!["content[0].props.alt is required for accessibility"]);

    assert!(validate(&image(Some("Hero banner"))).valid);
}

#[test]
fn invariant_columns_distribute_children() {
    let children: Vec<Value> = (0..7)
        .map(|i| json!({ "type": "EmailText", "props": { "content": format!("item-{}", i) } }))
        .collect();
    let mjml = compile_value(&document(json!([{
        "type": "EmailColumns",
        "props": { "columns": 3 },
        "children": children
    }])));

    let columns: Vec<&str> = mjml.split("<mj-column").skip(1).collect();
    assert_eq!(columns.len(), 3);
    let counts: Vec<usize> = columns.iter().map(|c| c.matches("<mj-text").count()).collect();
    assert_eq!(counts, vec![3, 3, 1]);

    // Order is preserved across columns
    let first = mjml.find("item-0").unwrap();
    let last = mjml.find("item-6").unwrap();
    assert!(first < last);
}

#[test]
fn invariant_empty_columns_marked() {
    let mjml = compile_value(&document(json!([{
        "type": "EmailColumns",
        "props": { "columns": 2 },
        "children": []
    }])));

    assert_eq!(mjml.matches("<mj-column").count(), 2);
    assert_eq!(mjml.matches("<!-- Empty column -->").count(), 2);
}

#[test]
fn invariant_unknown_type_names_type_and_index() {
    let result = validate(&document(json!([
        { "type": "EmailSpacer", "props": {} },
        { "type": "EmailVideo", "props": {} }
    ])));

    assert!(!result.valid);
    assert_eq!(result.errors, vec!["content[1]: Invalid block type \"EmailVideo\""]);
}

#[test]
fn invariant_footer_unsubscribe_toggle() {
    let footer = |show: bool| {
        document(json!([{
            "type": "EmailFooter",
            "props": { "companyName": "Acme", "address": "1 Road", "showUnsubscribe": show }
        }]))
    };

    let on = compile_value(&footer(true));
    assert_eq!(on.matches("{{unsubscribe_url}}").count(), 1);

    let off = compile_value(&footer(false));
    assert!(!off.contains("{{unsubscribe_url}}"));
    assert!(off.contains("<strong>Acme</strong>"));
}

#[test]
fn invariant_social_without_links_contributes_nothing() {
    let empty = compile_value(&document(json!([])));
    let social = compile_value(&document(json!([
        { "type": "EmailSocial", "props": { "facebookUrl": "" } }
    ])));

    assert_eq!(empty, social);
    assert!(!social.contains("mj-social"));
}

#[test]
fn invariant_compile_deterministic() {
    let template = Template::from_value(document(json!([
        { "type": "EmailHeader", "props": { "logoUrl": "https://example.com/logo.png" } },
        { "type": "EmailButton", "props": { "text": "Shop", "href": "https://example.com" } }
    ])))
    .unwrap();

    assert_eq!(compile(&template), compile(&template));

    let pipeline = EmailPipeline::new();
    let a = pipeline.compile_template(&template).unwrap();
    let b = pipeline.compile_template(&template).unwrap();
    assert_eq!(a.document_hash, b.document_hash);
    assert_eq!(a.markup_hash, b.markup_hash);
    assert_ne!(a.id, b.id);
}

#[test]
fn invariant_canonical_json_deterministic() {
    let obj1 = json!({"z": 1, "a": 2, "m": {"b": 1, "a": 2}});
    let obj2 = json!({"a": 2, "m": {"a": 2, "b": 1}, "z": 1});

    let c1 = canonical_json(&obj1).unwrap();
    let c2 = canonical_json(&obj2).unwrap();

    // Must be identical despite different input ordering
    assert_eq!(c1, c2);
}

#[test]
fn invariant_valid_document_survives_json_round_trip() {
    let candidate = document(json!([
        { "type": "EmailImage", "props": { "src": "a.png", "alt": "A", "width": 320, "href": "https://example.com" } },
        { "type": "EmailSocial", "props": { "networks": [{ "type": "twitter", "url": "https://x.com/acme" }] } },
        { "type": "EmailColumns", "props": { "columns": 2 }, "children": [
            { "type": "EmailSpacer", "props": { "height": 40 } }
        ] }
    ]));
    assert!(validate(&candidate).valid);

    let template = Template::from_value(candidate).unwrap();
    let text = serde_json::to_string(&template).unwrap();
    let reparsed: Value = serde_json::from_str(&text).unwrap();

    assert!(validate(&reparsed).valid);
    assert_eq!(Template::from_value(reparsed).unwrap(), template);
}

#[test]
fn invariant_validation_result_structure() {
    let result = validate(&json!({
        "version": 1,
        "metadata": "nope",
        "settings": { "backgroundColor": "#fff", "contentWidth": 600, "fontFamily": "Arial" },
        "content": {}
    }));

    // Every failing rule reports, in rule order
    assert!(!result.valid);
    assert_eq!(
        result.errors,
        vec![
            "Unsupported version: 1. Expected \"1.0\"",
            "Missing or invalid metadata",
            "content must be an array",
        ]
    );

    let ok = validate(&document(json!([])));
    assert!(ok.valid);
    assert!(ok.errors.is_empty());
}

mod properties {
    use super::*;
    use proptest::prelude::*;
    use proptest::sample::select;
    use serde_json::Map;
    use visual_mailer_core::Validator;

    const LEAF_KINDS: &[&str] = &[
        "EmailHeader",
        "EmailText",
        "EmailImage",
        "EmailButton",
        "EmailSpacer",
        "EmailDivider",
        "EmailSocial",
        "EmailFooter",
        "EmailVideo",
    ];

    /// Absent, null or an in-catalog value; now and then a wrong-typed one
    fn field(valid: Vec<Value>) -> BoxedStrategy<Option<Value>> {
        let mut ok = vec![None, Some(Value::Null)];
        ok.extend(valid.into_iter().map(Some));
        let junk = vec![Some(json!(true)), Some(json!(-1)), Some(json!(1.5)), Some(json!({}))];
        prop_oneof![8 => select(ok), 1 => select(junk)].boxed()
    }

    fn fields(kind: &str) -> Vec<(&'static str, Vec<Value>)> {
        let align = vec![json!("left"), json!("center"), json!("right")];
        let text = vec![json!(""), json!("Fish & <Chips>")];
        let color = vec![json!("#333333")];
        let padding = vec![json!("sm"), json!("xl"), json!("huge")];

        match kind {
            "EmailHeader" => vec![
                ("logoUrl", vec![json!("https://example.com/logo.png")]),
                ("logoAlt", text.clone()),
                ("logoWidth", vec![json!(0), json!(50), json!(150), json!(300)]),
                ("backgroundColor", color.clone()),
                ("align", align.clone()),
                ("padding", padding.clone()),
            ],
            "EmailText" => vec![
                ("content", vec![json!("<p>Hi {{first_name}}</p>")]),
                ("fontSize", vec![json!(12), json!(48)]),
                ("fontFamily", vec![json!("Georgia, serif")]),
                ("color", color.clone()),
                ("align", vec![json!("justify"), json!("left")]),
                ("lineHeight", vec![json!("1.5")]),
                ("padding", padding.clone()),
            ],
            "EmailImage" => vec![
                ("src", vec![json!("https://example.com/a.png")]),
                ("alt", vec![json!("Hero"), json!("Banner"), json!("")]),
                ("width", vec![json!("full"), json!(0), json!(320), json!(600)]),
                ("align", align.clone()),
                ("href", vec![json!("https://example.com")]),
                ("padding", padding.clone()),
            ],
            "EmailButton" => vec![
                ("text", vec![json!("Shop & save")]),
                ("href", vec![json!("https://example.com")]),
                ("backgroundColor", color.clone()),
                ("textColor", color.clone()),
                ("fontSize", vec![json!(16)]),
                ("borderRadius", vec![json!(0), json!(8)]),
                ("align", align.clone()),
                ("fullWidth", vec![json!(true), json!(false)]),
                ("padding", vec![json!("sm"), json!("lg")]),
            ],
            "EmailColumns" => vec![
                ("columns", vec![json!(1), json!(2), json!(3), json!(4)]),
                ("gap", vec![json!("none"), json!("lg")]),
                ("verticalAlign", vec![json!("middle"), json!("bottom")]),
                ("stackOnMobile", vec![json!(false)]),
            ],
            "EmailSpacer" => vec![("height", vec![json!(10), json!(60)])],
            "EmailDivider" => vec![
                ("color", color.clone()),
                ("width", vec![json!(1), json!(3)]),
                ("style", vec![json!("dotted")]),
                ("padding", padding),
            ],
            "EmailSocial" => vec![
                (
                    "networks",
                    vec![json!([]), json!([{ "type": "linkedin", "url": "https://linkedin.com/acme" }])],
                ),
                ("iconSize", vec![json!(24), json!(40)]),
                ("iconStyle", vec![json!("white"), json!("color")]),
                ("align", align),
                ("facebookUrl", vec![json!(""), json!("https://facebook.com/acme")]),
                ("youtubeUrl", vec![json!("https://youtube.com/acme")]),
            ],
            "EmailFooter" => vec![
                ("companyName", text.clone()),
                ("address", vec![json!("1 Road\nTown")]),
                ("showUnsubscribe", vec![json!(true), json!(false)]),
                ("unsubscribeText", text),
                ("backgroundColor", color.clone()),
                ("textColor", color),
            ],
            _ => vec![],
        }
    }

    fn props(kind: &str) -> impl Strategy<Value = Value> {
        let (keys, pools): (Vec<_>, Vec<_>) = fields(kind)
            .into_iter()
            .map(|(key, pool)| (key, field(pool)))
            .unzip();

        pools.prop_map(move |values| {
            let props: Map<String, Value> = keys
                .iter()
                .zip(values)
                .filter_map(|(key, value)| value.map(|v| (key.to_string(), v)))
                .collect();
            Value::Object(props)
        })
    }

    fn block() -> impl Strategy<Value = Value> {
        let leaf = select(LEAF_KINDS).prop_flat_map(|kind| {
            props(kind).prop_map(move |props| json!({ "type": kind, "props": props }))
        });

        leaf.prop_recursive(4, 32, 4, |inner| {
            (props("EmailColumns"), 0u8..3, prop::collection::vec(inner, 0..5)).prop_map(
                |(props, shape, children)| {
                    let mut block = json!({ "type": "EmailColumns", "props": props });
                    match shape {
                        0 => block["children"] = json!(children),
                        1 => block["children"] = Value::Null,
                        _ => {}
                    }
                    block
                },
            )
        })
    }

    fn any_document() -> impl Strategy<Value = Value> {
        prop::collection::vec(block(), 0..6).prop_map(|content| document(json!(content)))
    }

    proptest! {
        #[test]
        fn invariant_metadata_round_trips_and_escapes(
            subject in ".*",
            preheader in ".*",
            width in 400u32..=700,
        ) {
            let mut candidate = document(json!([]));
            candidate["metadata"] = json!({ "subject": subject, "preheader": preheader });
            candidate["settings"]["contentWidth"] = json!(width);
            prop_assert!(validate(&candidate).valid);

            let template = Template::from_value(candidate).unwrap();
            let reparsed: Value = serde_json::to_value(&template).unwrap();
            prop_assert!(validate(&reparsed).valid);
            prop_assert_eq!(Template::from_value(reparsed).unwrap(), template.clone());

            let mjml = compile(&template);
            let title = format!("<mj-title>{}</mj-title>", visual_mailer_core::escape_html(&subject));
            prop_assert!(mjml.contains(&title));
            prop_assert_eq!(mjml.matches("</mjml>").count(), 1);
        }

        #[test]
        fn invariant_valid_content_always_compiles(candidate in any_document()) {
            let pipeline = EmailPipeline::new();
            if validate(&candidate).valid {
                let compiled = pipeline.compile(&candidate);
                prop_assert!(compiled.is_ok(), "{:?}", compiled.err());
            } else {
                prop_assert!(pipeline.compile(&candidate).is_err());
            }
        }

        #[test]
        fn invariant_encode_decode_preserves_validity(candidate in any_document()) {
            if validate(&candidate).valid {
                let template = Template::from_value(candidate).unwrap();
                let encoded = serde_json::to_string(&template).unwrap();
                let decoded: Value = serde_json::from_str(&encoded).unwrap();

                let result = validate(&decoded);
                prop_assert!(result.valid, "{:?}", result.errors);
                prop_assert_eq!(&result, &Validator::new().validate_template(&template));
                prop_assert_eq!(Template::from_value(decoded).unwrap(), template);
            }
        }
    }
}
