use serde::Serialize;
use serde_json::{json, Value};

use crate::state::AppState;

#[derive(Serialize)]
pub struct Text<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_description: Option<&'a str>,
}

impl<'a> Text<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            kind: "Text",
            text,
            size: None,
            content_description: None,
        }
    }

    pub fn size(mut self, size: f64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn content_description(mut self, cd: &'a str) -> Self {
        self.content_description = Some(cd);
        self
    }
}

#[derive(Serialize)]
pub struct Button<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub text: &'a str,
    pub action: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requires_file_picker: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_filter: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_description: Option<&'a str>,
}

impl<'a> Button<'a> {
    pub fn new(text: &'a str, action: &'a str) -> Self {
        Self {
            kind: "Button",
            text,
            action,
            id: None,
            enabled: None,
            requires_file_picker: None,
            mime_filter: None,
            content_description: None,
        }
    }

    pub fn id(mut self, id: &'a str) -> Self {
        self.id = Some(id);
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    pub fn requires_file_picker(mut self, needs: bool) -> Self {
        self.requires_file_picker = Some(needs);
        self
    }

    pub fn mime_filter(mut self, mime: &'a str) -> Self {
        self.mime_filter = Some(mime);
        self
    }

    pub fn content_description(mut self, cd: &'a str) -> Self {
        self.content_description = Some(cd);
        self
    }
}

#[derive(Serialize)]
pub struct Column<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding: Option<u32>,
    pub children: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_description: Option<&'a str>,
}

impl<'a> Column<'a> {
    pub fn new(children: Vec<Value>) -> Self {
        Self {
            kind: "Column",
            padding: None,
            children,
            content_description: None,
        }
    }

    pub fn padding(mut self, padding: u32) -> Self {
        self.padding = Some(padding);
        self
    }

    pub fn content_description(mut self, cd: &'a str) -> Self {
        self.content_description = Some(cd);
        self
    }
}

#[derive(Serialize)]
pub struct Row {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub children: Vec<Value>,
}

impl Row {
    pub fn new(children: Vec<Value>) -> Self {
        Self {
            kind: "Row",
            children,
        }
    }
}

#[derive(Serialize)]
pub struct Card<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub children: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding: Option<u32>,
}

impl<'a> Card<'a> {
    pub fn new(children: Vec<Value>) -> Self {
        Self {
            kind: "Card",
            children,
            title: None,
            padding: None,
        }
    }

    pub fn title(mut self, title: &'a str) -> Self {
        self.title = Some(title);
        self
    }

    pub fn padding(mut self, padding: u32) -> Self {
        self.padding = Some(padding);
        self
    }
}

/// Draggable rectangle drawn by the host on top of the document viewer.
/// `x`/`y` are screen coordinates inside the viewport.
#[derive(Serialize)]
pub struct PlaceholderOverlay<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub id: u64,
    pub label: &'a str,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub dragging: bool,
    pub remove_action: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_description: Option<&'a str>,
}

/// Host-side document viewer. The core never renders the PDF; it only tells
/// the host what to overlay and when to follow the pointer document-wide.
#[derive(Serialize)]
pub struct DocumentViewport<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_uri: Option<&'a str>,
    pub content_width: f64,
    pub content_height: f64,
    pub scroll_x: f64,
    pub scroll_y: f64,
    pub pointer_capture: bool,
    pub pointer_down_action: &'static str,
    pub pointer_move_action: &'static str,
    pub pointer_up_action: &'static str,
    pub viewport_action: &'static str,
    pub overlays: Vec<Value>,
}

impl<'a> DocumentViewport<'a> {
    pub fn new(overlays: Vec<Value>) -> Self {
        Self {
            kind: "DocumentViewport",
            source_uri: None,
            content_width: 0.0,
            content_height: 0.0,
            scroll_x: 0.0,
            scroll_y: 0.0,
            pointer_capture: false,
            pointer_down_action: "pointer_down",
            pointer_move_action: "pointer_move",
            pointer_up_action: "pointer_up",
            viewport_action: "viewport_update",
            overlays,
        }
    }

    pub fn source_uri(mut self, uri: Option<&'a str>) -> Self {
        self.source_uri = uri;
        self
    }

    pub fn content(mut self, width: f64, height: f64) -> Self {
        self.content_width = width;
        self.content_height = height;
        self
    }

    pub fn scroll(mut self, x: f64, y: f64) -> Self {
        self.scroll_x = x;
        self.scroll_y = y;
        self
    }

    pub fn pointer_capture(mut self, capture: bool) -> Self {
        self.pointer_capture = capture;
        self
    }
}

/// Serialize a widget into a tree node. Widgets are plain structs of strings
/// and numbers, so this cannot fail in practice.
pub fn node<T: Serialize>(widget: T) -> Value {
    serde_json::to_value(widget).unwrap_or(Value::Null)
}

pub fn maybe_push_back(children: &mut Vec<Value>, state: &AppState) {
    if state.nav_depth() > 1 {
        children.push(json!({
            "type": "Button",
            "text": rust_i18n::t!("app.back"),
            "action": "back"
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn button_skips_unset_fields() {
        let val = node(Button::new("Export", "log_export").enabled(false));
        assert_eq!(val.get("type").and_then(|v| v.as_str()), Some("Button"));
        assert_eq!(val.get("enabled").and_then(|v| v.as_bool()), Some(false));
        assert!(val.get("requires_file_picker").is_none());
        assert!(val.get("id").is_none());
    }

    #[test]
    fn viewport_serializes_actions_and_capture() {
        let val = node(
            DocumentViewport::new(vec![])
                .source_uri(Some("file:///a.pdf"))
                .content(595.0, 842.0)
                .scroll(0.0, 12.0)
                .pointer_capture(true),
        );
        assert_eq!(val.get("type").and_then(|v| v.as_str()), Some("DocumentViewport"));
        assert_eq!(val.get("pointer_capture").and_then(|v| v.as_bool()), Some(true));
        assert_eq!(val.get("pointer_up_action").and_then(|v| v.as_str()), Some("pointer_up"));
        assert_eq!(val.get("scroll_y").and_then(|v| v.as_f64()), Some(12.0));
        assert!(val.get("overlays").and_then(|v| v.as_array()).is_some());
    }
}
