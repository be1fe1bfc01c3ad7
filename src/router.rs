use crate::config::MarkerConfig;
use crate::error::MarkerError;
use crate::features::document::{load_document, DocumentSource};
use crate::features::export::write_export;
use crate::features::geometry::Point;
use crate::features::marker::{render_home_screen, render_marker_screen};
use crate::features::placement::PlaceholderId;
use crate::i18n::update_locale;
use crate::logging;
use crate::state::{AppState, Screen};

use jni::objects::{JClass, JString};
use jni::sys::jstring;
use jni::JNIEnv;
use log::{debug, warn};
use rust_i18n::t;
use serde::Deserialize;
use serde_json::{json, Value};
use std::{
    collections::HashMap,
    fs::File,
    os::unix::io::{FromRawFd, RawFd},
    ptr,
    sync::{Mutex, MutexGuard, OnceLock},
};

static STATE: OnceLock<Mutex<AppState>> = OnceLock::new();

fn state_cell() -> &'static Mutex<AppState> {
    STATE.get_or_init(|| Mutex::new(AppState::new()))
}

#[derive(Deserialize, Default)]
struct Command {
    action: String,
    path: Option<String>,
    fd: Option<i32>,
    mime: Option<String>,
    error: Option<String>,
    bindings: Option<HashMap<String, String>>,
}

#[derive(Debug)]
enum Action {
    Init {
        bindings: HashMap<String, String>,
    },
    Reset,
    Back,
    SetLocale {
        locale: String,
    },
    DocumentSelect {
        fd: Option<i32>,
        uri: Option<String>,
        mime: Option<String>,
        error: Option<String>,
    },
    DocumentClose,
    ViewportUpdate(ViewportReport),
    PlaceholderAdd,
    PlaceholderMove {
        id: PlaceholderId,
        x: f64,
        y: f64,
    },
    PlaceholderRemove {
        id: PlaceholderId,
    },
    PointerDown {
        id: PlaceholderId,
        pointer: Point,
        viewport: ViewportReport,
    },
    PointerMove {
        pointer: Point,
        viewport: ViewportReport,
    },
    PointerUp {
        pointer: Option<Point>,
        viewport: ViewportReport,
    },
    LogClear,
    LogExport,
}

/// Optional viewport values the host attaches to pointer and scroll events.
#[derive(Debug, Default, Clone, Copy)]
struct ViewportReport {
    content_width: Option<f64>,
    content_height: Option<f64>,
    scroll_x: Option<f64>,
    scroll_y: Option<f64>,
}

impl ViewportReport {
    fn from_bindings(bindings: &HashMap<String, String>) -> Self {
        Self {
            content_width: parse_f64_binding(bindings, "content_width"),
            content_height: parse_f64_binding(bindings, "content_height"),
            scroll_x: parse_f64_binding(bindings, "scroll_x"),
            scroll_y: parse_f64_binding(bindings, "scroll_y"),
        }
    }

    fn is_empty(&self) -> bool {
        self.content_width.is_none()
            && self.content_height.is_none()
            && self.scroll_x.is_none()
            && self.scroll_y.is_none()
    }

    fn apply(self, state: &mut AppState) {
        if self.is_empty() {
            return;
        }
        state.session.update_viewport(
            self.content_width,
            self.content_height,
            self.scroll_x,
            self.scroll_y,
        );
    }
}

struct FdHandle(Option<i32>);

impl FdHandle {
    fn new(fd: Option<i32>) -> Self {
        Self(fd)
    }

    fn take(&mut self) -> Option<i32> {
        self.0.take()
    }
}

impl Drop for FdHandle {
    fn drop(&mut self) {
        if let Some(fd) = self.0.take() {
            if fd >= 0 {
                unsafe { File::from_raw_fd(fd as RawFd) };
            }
        }
    }
}

fn parse_action(command: Command) -> Result<Action, MarkerError> {
    let Command {
        action,
        path,
        fd,
        mime,
        error,
        bindings,
    } = command;

    let bindings = bindings.unwrap_or_default();

    match action.as_str() {
        "init" => Ok(Action::Init { bindings }),
        "reset" => Ok(Action::Reset),
        "back" => Ok(Action::Back),
        "set_locale" => Ok(Action::SetLocale {
            locale: bindings.get("locale").cloned().unwrap_or_default(),
        }),
        "document_select" => Ok(Action::DocumentSelect {
            fd,
            uri: path,
            mime,
            error,
        }),
        "document_close" => Ok(Action::DocumentClose),
        "viewport_update" => Ok(Action::ViewportUpdate(ViewportReport::from_bindings(
            &bindings,
        ))),
        "placeholder_add" => Ok(Action::PlaceholderAdd),
        "placeholder_move" => Ok(Action::PlaceholderMove {
            id: required_id(&bindings)?,
            x: parse_f64_binding(&bindings, "x").ok_or(MarkerError::MissingBinding("x"))?,
            y: parse_f64_binding(&bindings, "y").ok_or(MarkerError::MissingBinding("y"))?,
        }),
        "placeholder_remove" => Ok(Action::PlaceholderRemove {
            id: required_id(&bindings)?,
        }),
        "pointer_down" => Ok(Action::PointerDown {
            id: required_id(&bindings)?,
            pointer: required_pointer(&bindings)?,
            viewport: ViewportReport::from_bindings(&bindings),
        }),
        "pointer_move" => Ok(Action::PointerMove {
            pointer: required_pointer(&bindings)?,
            viewport: ViewportReport::from_bindings(&bindings),
        }),
        "pointer_up" => Ok(Action::PointerUp {
            pointer: required_pointer(&bindings).ok(),
            viewport: ViewportReport::from_bindings(&bindings),
        }),
        "log_clear" => Ok(Action::LogClear),
        "log_export" => Ok(Action::LogExport),
        "error" => Err(error.map(MarkerError::Host).unwrap_or(MarkerError::InvalidJson)),
        other => Err(MarkerError::UnknownAction(other.to_string())),
    }
}

fn required_id(bindings: &HashMap<String, String>) -> Result<PlaceholderId, MarkerError> {
    parse_u64_binding(bindings, "placeholder_id").ok_or(MarkerError::MissingBinding("placeholder_id"))
}

fn required_pointer(bindings: &HashMap<String, String>) -> Result<Point, MarkerError> {
    let x = parse_f64_binding(bindings, "pointer_x").ok_or(MarkerError::MissingBinding("pointer_x"))?;
    let y = parse_f64_binding(bindings, "pointer_y").ok_or(MarkerError::MissingBinding("pointer_y"))?;
    Ok(Point::new(x, y))
}

fn parse_u64_binding(bindings: &HashMap<String, String>, key: &str) -> Option<u64> {
    bindings.get(key).and_then(|v| v.trim().parse::<u64>().ok())
}

fn parse_f64_binding(bindings: &HashMap<String, String>, key: &str) -> Option<f64> {
    bindings
        .get(key)
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

#[no_mangle]
pub extern "system" fn Java_aeska_esignmarker_MainActivity_dispatch(
    mut env: JNIEnv,
    _class: JClass,
    input: JString,
) -> jstring {
    let response = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let input_str: String = env
            .get_string(&input)
            .map(|s| s.into())
            .unwrap_or_else(|_| "{}".to_string());

        let command: Command = serde_json::from_str(&input_str).unwrap_or_else(|_| Command {
            action: "error".into(),
            ..Command::default()
        });

        handle_command(command)
    }));

    let json_value = match response {
        Ok(Ok(value)) => value,
        Ok(Err(err)) => error_ui(&err.to_string()),
        Err(_) => error_ui("panic"),
    };

    let output_string = json_value.to_string();
    match env.new_string(output_string) {
        Ok(java_str) => java_str.into_raw(),
        Err(_) => {
            let fallback = error_ui("jni_new_string_failed").to_string();
            env.new_string(fallback)
                .map(|s| s.into_raw())
                .unwrap_or(ptr::null_mut())
        }
    }
}

fn lock_state() -> (MutexGuard<'static, AppState>, bool) {
    match state_cell().lock() {
        Ok(guard) => (guard, false),
        Err(poisoned) => (poisoned.into_inner(), true),
    }
}

fn handle_command(command: Command) -> Result<Value, MarkerError> {
    logging::init();
    let (mut state, lock_poisoned) = lock_state();
    state.ensure_navigation();

    let action = match parse_action(command) {
        Ok(action) => action,
        Err(err) => {
            warn!("rejected command: {err}");
            state.last_error = Some(err.user_message());
            return Ok(render_ui(&state));
        }
    };
    debug!("dispatch {action:?}");

    match action {
        Action::Init { bindings } => {
            if !bindings.is_empty() {
                state.config = MarkerConfig::from_bindings(&bindings);
            }
        }
        Action::Reset => {
            state.reset_runtime();
        }
        Action::Back => {
            state.last_error = None;
            if state.current_screen() == Screen::Marker {
                state.close_document();
            } else {
                state.pop_screen();
            }
        }
        Action::SetLocale { locale } => {
            update_locale(&locale);
        }
        Action::DocumentSelect {
            fd,
            uri,
            mime,
            error,
        } => {
            let mut fd_handle = FdHandle::new(fd);
            let loaded = if let Some(err) = error {
                Err(MarkerError::Host(err))
            } else if let Some(raw_fd) = fd_handle.take() {
                load_document(DocumentSource::Fd(raw_fd as RawFd), uri.as_deref(), mime.as_deref())
            } else if let Some(path) = uri.as_deref() {
                load_document(DocumentSource::Path(path), Some(path), mime.as_deref())
            } else {
                Err(MarkerError::MissingSource)
            };
            match loaded {
                Ok(document) => state.open_document(document),
                Err(err) => {
                    warn!("document rejected: {err}");
                    state.last_error = Some(err.user_message());
                }
            }
        }
        Action::DocumentClose => {
            state.last_error = None;
            state.close_document();
        }
        Action::ViewportUpdate(report) => {
            report.apply(&mut state);
        }
        Action::PlaceholderAdd => {
            state.last_error = None;
            if state.document.is_some() {
                let config = state.config.clone();
                state.session.add(&config);
            } else {
                debug!("placeholder_add without a document");
            }
        }
        Action::PlaceholderMove { id, x, y } => {
            state.last_error = None;
            state.session.move_to(id, x, y);
        }
        Action::PlaceholderRemove { id } => {
            state.last_error = None;
            state.session.remove(id);
        }
        Action::PointerDown {
            id,
            pointer,
            viewport,
        } => {
            viewport.apply(&mut state);
            state.session.pointer_down(id, pointer);
        }
        Action::PointerMove { pointer, viewport } => {
            viewport.apply(&mut state);
            state.session.pointer_move(pointer);
        }
        Action::PointerUp { pointer, viewport } => {
            viewport.apply(&mut state);
            if let Some(pointer) = pointer {
                state.session.pointer_move(pointer);
            }
            state.session.pointer_up();
        }
        Action::LogClear => {
            state.last_error = None;
            state.session.clear_log();
            state.last_export = None;
        }
        Action::LogExport => {
            state.last_error = None;
            if state.session.log().is_empty() {
                debug!("log_export with empty log ignored");
            } else {
                let source_uri = state
                    .document
                    .as_ref()
                    .and_then(|d| d.source_uri.as_deref());
                let result = write_export(
                    state.session.log(),
                    source_uri,
                    &state.config.export_file_name,
                );
                match result {
                    Ok(path) => state.last_export = Some(path.display().to_string()),
                    Err(err) => {
                        warn!("export failed: {err}");
                        state.last_error = Some(err.user_message());
                    }
                }
            }
        }
    }

    if lock_poisoned && state.last_error.is_none() {
        state.last_error = Some("state_poisoned".into());
    }

    Ok(render_ui(&state))
}

fn error_ui(message: &str) -> Value {
    json!({
        "type": "Column",
        "padding": 24,
        "children": [
            { "type": "Text", "text": t!("error.title"), "size": 18.0 },
            { "type": "Text", "text": message }
        ]
    })
}

fn render_ui(state: &AppState) -> Value {
    match state.current_screen() {
        Screen::Home => render_home_screen(state),
        Screen::Marker => render_marker_screen(state),
    }
}
