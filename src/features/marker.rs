use chrono::Local;
use log::{debug, info};
use rust_i18n::t;
use serde_json::Value;

use crate::config::MarkerConfig;
use crate::features::action_log::{round_px, ActionLog, LogAction, LogEntry};
use crate::features::document::PDF_MIME;
use crate::features::drag::{DragController, DragOutcome};
use crate::features::geometry::{Point, Viewport};
use crate::features::placement::{Placeholder, PlaceholderId, PlacementStore};
use crate::state::AppState;
use crate::ui::{
    maybe_push_back, node, Button as UiButton, Card as UiCard, Column as UiColumn,
    DocumentViewport as UiDocumentViewport, PlaceholderOverlay as UiPlaceholderOverlay,
    Row as UiRow, Text as UiText,
};

/// Wall-clock time as shown in the log, e.g. `3:04:05 PM`.
pub fn local_timestamp() -> String {
    Local::now().format("%-I:%M:%S %p").to_string()
}

/// Placements, their log and the drag in progress for one loaded document.
#[derive(Debug)]
pub struct MarkerSession {
    pub viewport: Viewport,
    placements: PlacementStore,
    log: ActionLog,
    drag: DragController,
    clock: fn() -> String,
}

impl MarkerSession {
    pub fn new() -> Self {
        Self {
            viewport: Viewport::default(),
            placements: PlacementStore::new(),
            log: ActionLog::new(),
            drag: DragController::new(),
            clock: local_timestamp,
        }
    }

    pub fn with_clock(mut self, clock: fn() -> String) -> Self {
        self.clock = clock;
        self
    }

    pub fn placements(&self) -> &[Placeholder] {
        self.placements.items()
    }

    pub fn log(&self) -> &ActionLog {
        &self.log
    }

    pub fn drag(&self) -> &DragController {
        &self.drag
    }

    /// Start over for a newly shown document. Any drag is abandoned unlogged.
    pub fn reset(&mut self, viewport: Viewport) {
        self.drag.cancel();
        self.placements.clear();
        self.log.clear();
        self.viewport = viewport;
    }

    /// Stored positions are left alone; the clamp applies on the next add,
    /// move or drag.
    pub fn update_viewport(
        &mut self,
        content_width: Option<f64>,
        content_height: Option<f64>,
        scroll_x: Option<f64>,
        scroll_y: Option<f64>,
    ) {
        self.viewport
            .update(content_width, content_height, scroll_x, scroll_y);
    }

    fn record(&mut self, placeholder: &Placeholder, action: LogAction) -> LogEntry {
        let entry = LogEntry::snapshot(placeholder, action, (self.clock)());
        info!("{}", entry.export_line());
        self.log.append(entry.clone());
        entry
    }

    /// New placeholder at the configured spot of the visible window.
    pub fn add(&mut self, config: &MarkerConfig) -> Placeholder {
        let position = self.viewport.screen_to_content(config.default_position);
        let placeholder = self.placements.insert(
            position,
            config.default_size,
            &config.label_prefix,
            &self.viewport,
        );
        self.record(&placeholder, LogAction::Added);
        placeholder
    }

    /// Direct move to content coordinates. Logs only when the clamped
    /// position differs from where the placeholder already is. A placeholder
    /// that is being dragged is left to the drag.
    pub fn move_to(&mut self, id: PlaceholderId, x: f64, y: f64) -> Option<LogEntry> {
        if self.drag.dragged_id() == Some(id) {
            debug!("move of {id} ignored during drag");
            return None;
        }
        let before = self.placements.get(id)?.position();
        let after = self
            .placements
            .set_position(id, Point::new(x, y), &self.viewport)?;
        if after == before {
            return None;
        }
        let placeholder = self.placements.get(id)?.clone();
        Some(self.record(&placeholder, LogAction::Moved))
    }

    /// Log then drop a placeholder. Unknown ids are ignored.
    pub fn remove(&mut self, id: PlaceholderId) -> Option<LogEntry> {
        let placeholder = self.placements.get(id)?.clone();
        if self.drag.dragged_id() == Some(id) {
            self.drag.cancel();
        }
        let entry = self.record(&placeholder, LogAction::Removed);
        self.placements.remove(id);
        Some(entry)
    }

    pub fn pointer_down(&mut self, id: PlaceholderId, pointer: Point) -> bool {
        self.drag
            .pointer_down(id, pointer, &self.placements, &self.viewport)
    }

    pub fn pointer_move(&mut self, pointer: Point) -> Option<Point> {
        self.drag
            .pointer_move(pointer, &mut self.placements, &self.viewport)
    }

    /// Finish the drag; one "Moved" entry if it went anywhere.
    pub fn pointer_up(&mut self) -> Option<LogEntry> {
        match self.drag.pointer_up(&self.placements) {
            DragOutcome::Moved { id, .. } => {
                let placeholder = self.placements.get(id)?.clone();
                Some(self.record(&placeholder, LogAction::Moved))
            }
            DragOutcome::Unchanged { .. } | DragOutcome::Ignored => None,
        }
    }

    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    pub fn export_text(&self) -> Option<String> {
        self.log.export()
    }
}

impl Default for MarkerSession {
    fn default() -> Self {
        Self::new()
    }
}

pub fn render_home_screen(state: &AppState) -> Value {
    let mut children = vec![
        node(UiText::new(&t!("app.title")).size(22.0)),
        upload_button(),
        node(UiText::new(&t!("app.upload_hint")).size(14.0)),
    ];
    push_error(&mut children, state);
    node(UiColumn::new(children).padding(24))
}

pub fn render_marker_screen(state: &AppState) -> Value {
    let Some(document) = state.document.as_ref() else {
        return render_home_screen(state);
    };
    let session = &state.session;
    let viewport = &session.viewport;
    let dragged = session.drag().dragged_id();

    let mut children = vec![
        node(UiText::new(&t!("app.title")).size(22.0)),
        upload_button(),
        node(UiText::new(&t!("app.loaded", name = &document.display_name)).size(12.0)),
        node(UiText::new(&t!("app.pages", count = document.page_count)).size(12.0)),
    ];

    let placed = session.placements().len();
    children.push(node(UiRow::new(vec![
        node(
            UiButton::new(&t!("marker.add"), "placeholder_add")
                .id("placeholder_add_btn")
                .content_description(&t!("marker.add_description")),
        ),
        node(UiText::new(&t!("marker.placed", count = placed)).size(12.0)),
    ])));

    let overlays: Vec<Value> = session
        .placements()
        .iter()
        .map(|p| {
            let screen = viewport.content_to_screen(p.position());
            let description = t!("marker.remove_description", label = &p.label);
            node(UiPlaceholderOverlay {
                kind: "Placeholder",
                id: p.id,
                label: &p.label,
                x: screen.x,
                y: screen.y,
                width: p.width,
                height: p.height,
                dragging: dragged == Some(p.id),
                remove_action: "placeholder_remove",
                content_description: Some(description.as_ref()),
            })
        })
        .collect();
    children.push(node(
        UiDocumentViewport::new(overlays)
            .source_uri(document.source_uri.as_deref())
            .content(viewport.content.width, viewport.content.height)
            .scroll(viewport.scroll.x, viewport.scroll.y)
            .pointer_capture(session.drag().listeners().is_capturing()),
    ));

    children.push(render_log_card(state));
    push_error(&mut children, state);
    maybe_push_back(&mut children, state);

    node(UiColumn::new(children).padding(20))
}

fn render_log_card(state: &AppState) -> Value {
    let session = &state.session;
    let log = session.log();
    let has_entries = !log.is_empty();

    let mut card_children = vec![node(UiRow::new(vec![
        node(
            UiButton::new(&t!("log.export"), "log_export")
                .id("log_export_btn")
                .enabled(has_entries),
        ),
        node(
            UiButton::new(&t!("log.clear"), "log_clear")
                .id("log_clear_btn")
                .enabled(has_entries),
        ),
    ]))];

    if has_entries {
        for entry in log.entries() {
            let lines = [
                format!("{} · {}", entry.label, entry.timestamp),
                entry.action.as_str().to_string(),
                t!("log.position", x = entry.x1, y = entry.y1).into_owned(),
                t!("log.size", width = entry.width, height = entry.height).into_owned(),
                t!(
                    "log.bounds",
                    x1 = entry.x1,
                    y1 = entry.y1,
                    x2 = entry.x2,
                    y2 = entry.y2
                )
                .into_owned(),
            ];
            let entry_children = lines
                .iter()
                .map(|line| node(UiText::new(line).size(12.0)))
                .collect();
            card_children.push(node(UiColumn::new(entry_children).padding(6)));
        }
    } else {
        card_children.push(node(UiText::new(&t!("log.empty")).size(12.0)));
    }

    if !session.placements().is_empty() {
        let mut current = vec![node(UiText::new(&t!("marker.current")).size(14.0))];
        for p in session.placements() {
            let line = t!(
                "marker.bounds_line",
                label = &p.label,
                x1 = round_px(p.x),
                y1 = round_px(p.y),
                x2 = round_px(p.x + p.width),
                y2 = round_px(p.y + p.height)
            );
            current.push(node(UiText::new(&line).size(12.0)));
        }
        card_children.push(node(UiColumn::new(current).padding(8)));
    }

    if let Some(path) = &state.last_export {
        card_children.push(node(
            UiText::new(&t!("log.exported", path = path))
                .size(12.0)
                .content_description("log_export_path"),
        ));
    }

    node(
        UiCard::new(card_children)
            .title(&t!("log.title"))
            .padding(12),
    )
}

fn upload_button() -> Value {
    node(
        UiButton::new(&t!("app.upload"), "document_select")
            .id("document_select_btn")
            .requires_file_picker(true)
            .mime_filter(PDF_MIME)
            .content_description(&t!("app.upload_description")),
    )
}

fn push_error(children: &mut Vec<Value>, state: &AppState) {
    if let Some(err) = &state.last_error {
        children.push(node(
            UiText::new(&t!("error.prefix", message = err))
                .size(12.0)
                .content_description("marker_error"),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::geometry::Size;

    fn fixed_clock() -> String {
        "10:00:00 AM".to_string()
    }

    fn session() -> MarkerSession {
        let mut s = MarkerSession::new().with_clock(fixed_clock);
        s.reset(Viewport::new(Size::new(595.0, 842.0)));
        s
    }

    #[test]
    fn add_drag_remove_scenario() {
        let cfg = MarkerConfig::default();
        let mut s = session();

        let p = s.add(&cfg);
        assert_eq!(p.position(), Point::new(50.0, 100.0));
        let added = &s.log().entries()[0];
        assert_eq!(added.action, LogAction::Added);
        assert_eq!((added.x1, added.y1, added.x2, added.y2), (50, 100, 200, 150));

        assert!(s.pointer_down(p.id, Point::new(60.0, 110.0)));
        s.pointer_move(Point::new(150.0, 110.0));
        s.pointer_move(Point::new(310.0, 110.0));
        assert_eq!(s.log().len(), 1, "intermediate moves are not logged");
        let moved = s.pointer_up().expect("drag should log a move");
        assert_eq!(moved.action, LogAction::Moved);
        assert_eq!(moved.label, p.label);
        assert_eq!((moved.x1, moved.y1, moved.x2, moved.y2), (300, 100, 450, 150));

        let removed = s.remove(p.id).expect("remove should log");
        assert_eq!(removed.action, LogAction::Removed);
        assert_eq!((removed.x1, removed.y1), (300, 100));
        assert!(s.placements().is_empty());
        assert_eq!(s.log().len(), 3);
        assert_eq!(s.log().entries()[2].timestamp, "10:00:00 AM");
    }

    #[test]
    fn drag_back_to_start_logs_nothing() {
        let mut s = session();
        let p = s.add(&MarkerConfig::default());
        s.pointer_down(p.id, Point::new(60.0, 110.0));
        s.pointer_move(Point::new(400.0, 500.0));
        s.pointer_move(Point::new(60.0, 110.0));
        assert!(s.pointer_up().is_none());
        assert_eq!(s.log().len(), 1);
    }

    #[test]
    fn add_uses_visible_window_when_scrolled() {
        let mut s = session();
        s.update_viewport(None, Some(3000.0), None, Some(900.0));
        let p = s.add(&MarkerConfig::default());
        assert_eq!(p.position(), Point::new(50.0, 1000.0));
    }

    #[test]
    fn add_clamps_inside_small_content() {
        let mut s = session();
        s.reset(Viewport::new(Size::new(100.0, 120.0)));
        let p = s.add(&MarkerConfig::default());
        assert_eq!(p.position(), Point::new(0.0, 70.0));
    }

    #[test]
    fn move_to_clamps_and_skips_noop() {
        let mut s = session();
        let p = s.add(&MarkerConfig::default());

        assert!(s.move_to(p.id, 50.0, 100.0).is_none());
        let entry = s.move_to(p.id, 10_000.0, -3.0).expect("real move logs");
        assert_eq!((entry.x1, entry.y1), (445, 0));
        let stored = &s.placements()[0];
        assert!(stored.x >= 0.0 && stored.x <= 595.0 - stored.width);
        assert!(stored.y >= 0.0 && stored.y <= 842.0 - stored.height);
        assert!(s.move_to(999, 1.0, 1.0).is_none());
        assert_eq!(s.log().len(), 2);
    }

    #[test]
    fn viewport_reports_keep_stored_positions() {
        let mut s = session();
        let p = s.add(&MarkerConfig::default());
        s.move_to(p.id, 300.0, 400.0).expect("real move logs");

        s.update_viewport(Some(0.0), Some(0.0), None, None);
        s.update_viewport(Some(595.0), Some(842.0), None, None);
        assert_eq!(s.placements()[0].position(), Point::new(300.0, 400.0));

        s.update_viewport(Some(200.0), Some(200.0), None, None);
        assert_eq!(s.placements()[0].position(), Point::new(300.0, 400.0));
        assert_eq!(s.log().len(), 2);
        let last = s.log().entries().last().unwrap();
        assert_eq!((last.x1, last.y1), (300, 400));
    }

    #[test]
    fn remove_unknown_is_noop() {
        let mut s = session();
        s.add(&MarkerConfig::default());
        assert!(s.remove(12345).is_none());
        assert_eq!(s.log().len(), 1);
        assert_eq!(s.placements().len(), 1);
    }

    #[test]
    fn removing_the_dragged_placeholder_releases_listeners() {
        let mut s = session();
        let p = s.add(&MarkerConfig::default());
        let listeners = s.drag().listeners();
        s.pointer_down(p.id, Point::new(60.0, 110.0));
        assert!(listeners.is_capturing());
        s.remove(p.id);
        assert!(!listeners.is_capturing());
        assert!(s.pointer_up().is_none());
        assert_eq!(s.log().len(), 2);
    }

    #[test]
    fn reset_cancels_drag_without_logging() {
        let mut s = session();
        let p = s.add(&MarkerConfig::default());
        let listeners = s.drag().listeners();
        s.pointer_down(p.id, Point::new(60.0, 110.0));
        s.pointer_move(Point::new(200.0, 200.0));
        s.reset(Viewport::new(Size::new(612.0, 792.0)));
        assert!(!listeners.is_capturing());
        assert!(s.log().is_empty());
        assert!(s.placements().is_empty());
        let next = s.add(&MarkerConfig::default());
        assert_eq!(next.label, "Signature 1");
        assert_ne!(next.id, p.id);
    }

    #[test]
    fn labels_and_ids_strictly_increase() {
        let mut s = session();
        let cfg = MarkerConfig::default();
        let mut last: Option<Placeholder> = None;
        for i in 0..20 {
            let p = s.add(&cfg);
            if i % 3 == 0 {
                s.remove(p.id);
            }
            if let Some(prev) = &last {
                assert!(p.id > prev.id);
                let idx = |l: &str| l.trim_start_matches("Signature ").parse::<u32>().unwrap();
                assert!(idx(&p.label) > idx(&prev.label));
            }
            last = Some(p);
        }
    }

    #[test]
    fn timestamp_looks_like_a_clock_reading() {
        let ts = local_timestamp();
        assert!(ts.ends_with("AM") || ts.ends_with("PM"), "{ts}");
        assert_eq!(ts.matches(':').count(), 2);
    }
}
