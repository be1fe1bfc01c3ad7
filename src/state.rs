use crate::config::MarkerConfig;
use crate::features::document::LoadedDocument;
use crate::features::geometry::Viewport;
use crate::features::marker::MarkerSession;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Home,
    Marker,
}

pub struct AppState {
    pub nav_stack: Vec<Screen>,
    pub config: MarkerConfig,
    pub document: Option<LoadedDocument>,
    pub session: MarkerSession,
    pub last_error: Option<String>,
    pub last_export: Option<String>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            nav_stack: vec![Screen::Home],
            config: MarkerConfig::default(),
            document: None,
            session: MarkerSession::new(),
            last_error: None,
            last_export: None,
        }
    }

    pub fn ensure_navigation(&mut self) {
        if self.nav_stack.is_empty() {
            self.nav_stack.push(Screen::Home);
        }
    }

    pub fn current_screen(&self) -> Screen {
        self.nav_stack.last().cloned().unwrap_or(Screen::Home)
    }

    pub fn nav_depth(&self) -> usize {
        let depth = self.nav_stack.len();
        if depth == 0 {
            1
        } else {
            depth
        }
    }

    pub fn push_screen(&mut self, screen: Screen) {
        self.ensure_navigation();
        if self.current_screen() != screen {
            self.nav_stack.push(screen);
        }
    }

    pub fn pop_screen(&mut self) {
        self.ensure_navigation();
        if self.nav_stack.len() > 1 {
            self.nav_stack.pop();
        }
    }

    pub fn reset_navigation(&mut self) {
        self.nav_stack.clear();
        self.nav_stack.push(Screen::Home);
    }

    /// Show a freshly loaded document. Everything tied to the previous one is
    /// discarded, including a drag in progress.
    pub fn open_document(&mut self, document: LoadedDocument) {
        let content = document.content_size(self.config.px_per_point);
        self.session.reset(Viewport::new(content));
        self.document = Some(document);
        self.last_error = None;
        self.last_export = None;
        self.push_screen(Screen::Marker);
    }

    /// Tear down the marker view.
    pub fn close_document(&mut self) {
        self.session.reset(Viewport::default());
        self.document = None;
        self.last_export = None;
        self.reset_navigation();
    }

    pub fn reset_runtime(&mut self) {
        self.close_document();
        self.config = MarkerConfig::default();
        self.last_error = None;
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
