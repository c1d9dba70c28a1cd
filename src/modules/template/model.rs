use serde::Serialize;
use serde_json::Value;

use crate::modules::template::schema::{
    CarouselButtonEntity, CarouselCardComponentEntity, CarouselCardEntity, TemplateButtonEntity,
    TemplateComponentEntity, TemplateEntity, WaComponentFormat, WaComponentType,
    WaTemplateCategory, WaTemplateStatus,
};

// The batch loader returns templates with every nested level already in
// memory; nothing downstream touches the store again.

#[derive(Debug, Clone)]
pub struct TemplateTree {
    pub template: TemplateEntity,
    pub components: Vec<ComponentNode>,
}

#[derive(Debug, Clone)]
pub struct ComponentNode {
    pub component: TemplateComponentEntity,
    pub buttons: Vec<TemplateButtonEntity>,
    pub cards: Vec<CardNode>,
}

#[derive(Debug, Clone)]
pub struct CardNode {
    pub card: CarouselCardEntity,
    pub components: Vec<CardComponentNode>,
}

#[derive(Debug, Clone)]
pub struct CardComponentNode {
    pub component: CarouselCardComponentEntity,
    pub buttons: Vec<CarouselButtonEntity>,
}

/// Full template structure embedded in every TEMPLATE-type message: header
/// media, body with substituted variables, footer, buttons, carousel cards.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateDetailResponse {
    pub template_id: i64,
    pub name: String,
    pub language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<WaTemplateCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<WaTemplateStatus>,
    pub components: Vec<TemplateComponentResponse>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateComponentResponse {
    pub component_type: WaComponentType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<WaComponentFormat>,

    /// Original template text with {{1}}, {{2}} placeholders.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Text with variables substituted. None when no variables applied;
    /// the caller falls back to the static text verbatim.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rendered_text: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_handle: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_security_recommendation: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_expiration_minutes: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_order: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub buttons: Option<Vec<TemplateButtonResponse>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carousel_cards: Option<Vec<CarouselCardResponse>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateButtonResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub button_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub otp_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub button_index: Option<i32>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarouselCardResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_index: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_media_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_handle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buttons: Option<Vec<TemplateButtonResponse>>,
}

impl TemplateDetailResponse {
    /// Build the response from a loaded tree, substituting placeholders from
    /// the message's `template_vars` payload.
    ///
    /// Payload shape (Meta convention):
    ///   { "header": ["value"],
    ///     "body":   [["param1", "param2"]] }
    pub fn from_tree(tree: &TemplateTree, template_vars: Option<&str>) -> Self {
        let vars = parse_vars(template_vars);

        let components =
            tree.components.iter().map(|node| map_component(node, &vars)).collect();

        TemplateDetailResponse {
            template_id: tree.template.id,
            name: tree.template.name.clone(),
            language: tree.template.language.clone(),
            category: tree.template.category,
            status: tree.template.status,
            components,
        }
    }
}

fn map_component(node: &ComponentNode, vars: &serde_json::Map<String, Value>) -> TemplateComponentResponse {
    let c = &node.component;

    let rendered_text = apply_vars(c.text.as_deref(), c.component_type.vars_key(), vars);

    let buttons: Vec<TemplateButtonResponse> = node
        .buttons
        .iter()
        .map(|b| TemplateButtonResponse {
            button_type: b.button_type.map(|t| t.as_str().to_string()),
            text: b.text.clone(),
            url: b.url.clone(),
            phone_number: b.phone_number.clone(),
            otp_type: b.otp_type.map(|t| t.as_str().to_string()),
            button_index: b.button_index,
        })
        .collect();

    let carousel_cards: Vec<CarouselCardResponse> =
        node.cards.iter().map(map_carousel_card).collect();

    TemplateComponentResponse {
        component_type: c.component_type,
        format: c.format,
        text: c.text.clone(),
        rendered_text,
        media_url: c.media_url.clone(),
        media_handle: c.media_handle.clone(),
        add_security_recommendation: c.add_security_recommendation,
        code_expiration_minutes: c.code_expiration_minutes,
        component_order: c.component_order,
        buttons: if buttons.is_empty() { None } else { Some(buttons) },
        carousel_cards: if carousel_cards.is_empty() { None } else { Some(carousel_cards) },
    }
}

fn map_carousel_card(node: &CardNode) -> CarouselCardResponse {
    let mut header_format = None;
    let mut header_media_url = None;
    let mut header_handle = None;
    let mut body_text = None;
    let mut buttons = Vec::new();

    for sub in &node.components {
        match sub.component.component_type.as_deref() {
            Some("HEADER") => {
                header_format = sub.component.format.clone();
                header_media_url = sub.component.media_url.clone();
                header_handle = sub.component.media_handle.clone();
            }
            Some("BODY") => body_text = sub.component.text.clone(),
            Some("BUTTONS") => {
                buttons = sub
                    .buttons
                    .iter()
                    .map(|b| TemplateButtonResponse {
                        button_type: b.button_type.clone(),
                        text: b.text.clone(),
                        url: b.url.clone(),
                        phone_number: b.phone_number.clone(),
                        otp_type: None,
                        button_index: b.button_index,
                    })
                    .collect();
            }
            _ => {}
        }
    }

    CarouselCardResponse {
        card_index: node.card.card_index,
        header_format,
        header_media_url,
        header_handle,
        body_text,
        buttons: if buttons.is_empty() { None } else { Some(buttons) },
    }
}

/// Unparsable or non-object variable payloads become an empty map, never an
/// error.
fn parse_vars(template_vars: Option<&str>) -> serde_json::Map<String, Value> {
    let Some(raw) = template_vars else {
        return serde_json::Map::new();
    };
    if raw.trim().is_empty() {
        return serde_json::Map::new();
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => map,
        Ok(_) => serde_json::Map::new(),
        Err(e) => {
            log::debug!("Could not parse templateVars JSON: {e}");
            serde_json::Map::new()
        }
    }
}

/// Substitute the `{{1}}`, `{{2}}` placeholders for one component.
///
/// HEADER variables are a flat list; BODY variables are a list of
/// parameter-lists of which only the first is used. A placeholder whose
/// value is missing or not a string stays unresolved; the rest still
/// substitute. Returns None when nothing changed so callers can tell
/// "no variables needed" apart from a rendered result.
fn apply_vars(
    text: Option<&str>,
    component_key: &str,
    vars: &serde_json::Map<String, Value>,
) -> Option<String> {
    let text = text?;
    if !text.contains("{{") {
        return None;
    }

    let values: &Vec<Value> = match (component_key, vars.get(component_key)) {
        ("header", Some(Value::Array(list))) => list,
        ("body", Some(Value::Array(outer))) => match outer.first() {
            Some(Value::Array(inner)) => inner,
            _ => return None,
        },
        _ => return None,
    };

    let mut result = text.to_string();
    for (i, value) in values.iter().enumerate() {
        if let Some(s) = value.as_str() {
            result = result.replace(&format!("{{{{{}}}}}", i + 1), s);
        }
    }

    if result == text {
        None
    } else {
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(raw: &str) -> serde_json::Map<String, Value> {
        parse_vars(Some(raw))
    }

    #[test]
    fn body_vars_substitute_from_first_parameter_list() {
        let v = vars(r#"{"body":[["Raj","1234"]]}"#);
        assert_eq!(
            apply_vars(Some("Hi {{1}}, order {{2}}"), "body", &v),
            Some("Hi Raj, order 1234".to_string())
        );
    }

    #[test]
    fn body_uses_only_the_first_variant() {
        let v = vars(r#"{"body":[["Raj"],["Priya"]]}"#);
        assert_eq!(apply_vars(Some("Hi {{1}}"), "body", &v), Some("Hi Raj".to_string()));
    }

    #[test]
    fn header_vars_are_a_flat_list() {
        let v = vars(r#"{"header":["Diwali"]}"#);
        assert_eq!(
            apply_vars(Some("{{1}} sale!"), "header", &v),
            Some("Diwali sale!".to_string())
        );
    }

    #[test]
    fn empty_vars_leave_text_unrendered() {
        let v = vars("{}");
        assert_eq!(apply_vars(Some("Hi {{1}}"), "body", &v), None);
    }

    #[test]
    fn unparsable_payload_is_treated_as_empty() {
        let v = vars("{not json at all");
        assert!(v.is_empty());
        assert_eq!(apply_vars(Some("Hi {{1}}"), "body", &v), None);

        assert!(parse_vars(None).is_empty());
        assert!(parse_vars(Some("  ")).is_empty());
        // valid JSON but not an object
        assert!(parse_vars(Some(r#"["a","b"]"#)).is_empty());
    }

    #[test]
    fn text_without_placeholders_is_not_rendered() {
        let v = vars(r#"{"body":[["Raj"]]}"#);
        assert_eq!(apply_vars(Some("No variables here"), "body", &v), None);
    }

    #[test]
    fn non_body_header_components_never_render() {
        let v = vars(r#"{"footer":["x"],"body":[["x"]]}"#);
        assert_eq!(apply_vars(Some("Bye {{1}}"), "footer", &v), None);
    }

    #[test]
    fn out_of_range_placeholder_stays_unresolved() {
        let v = vars(r#"{"body":[["only"]]}"#);
        assert_eq!(
            apply_vars(Some("{{1}} and {{2}}"), "body", &v),
            Some("only and {{2}}".to_string())
        );
    }

    #[test]
    fn non_string_value_skips_that_placeholder_only() {
        let v = vars(r#"{"body":[[5,"x"]]}"#);
        assert_eq!(
            apply_vars(Some("{{1}} {{2}}"), "body", &v),
            Some("{{1}} x".to_string())
        );
    }

    #[test]
    fn missing_text_renders_nothing() {
        let v = vars(r#"{"body":[["Raj"]]}"#);
        assert_eq!(apply_vars(None, "body", &v), None);
    }
}
