//! Pointer-driven dragging of placeholders.
//!
//! While a drag is active the host must follow the pointer over the whole
//! document, not just over the placeholder. That document-wide registration is
//! represented by a [`ListenerGuard`]: it exists exactly as long as the
//! controller is in the dragging state and unregisters itself on drop, so
//! every way out of a drag (pointer-up, cancel, the session going away)
//! releases it.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use log::debug;

use crate::features::geometry::{Point, Viewport};
use crate::features::placement::{PlaceholderId, PlacementStore};

/// Count of live document-wide pointer registrations.
#[derive(Debug, Default)]
pub struct PointerListeners {
    active: AtomicUsize,
}

impl PointerListeners {
    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    pub fn is_capturing(&self) -> bool {
        self.active() > 0
    }
}

#[derive(Debug)]
pub struct ListenerGuard {
    registry: Arc<PointerListeners>,
}

impl ListenerGuard {
    fn acquire(registry: &Arc<PointerListeners>) -> Self {
        let count = registry.active.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("pointer listeners attached (active={count})");
        Self {
            registry: Arc::clone(registry),
        }
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        let previous = self.registry.active.fetch_sub(1, Ordering::SeqCst);
        debug!("pointer listeners detached (active={})", previous.saturating_sub(1));
    }
}

#[derive(Debug)]
enum DragState {
    Idle,
    Dragging {
        id: PlaceholderId,
        /// Pointer minus placeholder top-left, in content coordinates.
        pointer_offset: Point,
        start: Point,
        _listeners: ListenerGuard,
    },
}

/// Result of finishing a drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragOutcome {
    /// The placeholder ended somewhere else; log one move.
    Moved { id: PlaceholderId, from: Point, to: Point },
    /// Dropped where it was picked up.
    Unchanged { id: PlaceholderId },
    /// No drag was active, or its placeholder is gone.
    Ignored,
}

#[derive(Debug)]
pub struct DragController {
    state: DragState,
    listeners: Arc<PointerListeners>,
}

impl DragController {
    pub fn new() -> Self {
        Self {
            state: DragState::Idle,
            listeners: Arc::new(PointerListeners::default()),
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    pub fn dragged_id(&self) -> Option<PlaceholderId> {
        match self.state {
            DragState::Dragging { id, .. } => Some(id),
            DragState::Idle => None,
        }
    }

    pub fn listeners(&self) -> Arc<PointerListeners> {
        Arc::clone(&self.listeners)
    }

    /// Idle → Dragging. `pointer` is in screen coordinates. Returns whether a
    /// drag started; a second pointer-down or an unknown id is ignored.
    pub fn pointer_down(
        &mut self,
        id: PlaceholderId,
        pointer: Point,
        store: &PlacementStore,
        viewport: &Viewport,
    ) -> bool {
        if self.is_dragging() {
            debug!("pointer_down on {id} ignored: drag already active");
            return false;
        }
        let Some(placeholder) = store.get(id) else {
            debug!("pointer_down on unknown placeholder {id}");
            return false;
        };
        let start = placeholder.position();
        let pointer_offset = viewport.screen_to_content(pointer).offset_from(start);
        self.state = DragState::Dragging {
            id,
            pointer_offset,
            start,
            _listeners: ListenerGuard::acquire(&self.listeners),
        };
        debug!("drag start id={id} at ({}, {})", start.x, start.y);
        true
    }

    /// Dragging → Dragging. Moves the placeholder under the pointer without
    /// logging. Returns the applied position.
    pub fn pointer_move(
        &mut self,
        pointer: Point,
        store: &mut PlacementStore,
        viewport: &Viewport,
    ) -> Option<Point> {
        let (id, offset) = match &self.state {
            DragState::Dragging {
                id, pointer_offset, ..
            } => (*id, *pointer_offset),
            DragState::Idle => return None,
        };
        let target = viewport.screen_to_content(pointer).offset_from(offset);
        let applied = store.set_position(id, target, viewport);
        if applied.is_none() {
            debug!("dragged placeholder {id} vanished; ending drag");
            self.state = DragState::Idle;
        }
        applied
    }

    /// Dragging → Idle, reporting the net displacement.
    pub fn pointer_up(&mut self, store: &PlacementStore) -> DragOutcome {
        let previous = std::mem::replace(&mut self.state, DragState::Idle);
        let DragState::Dragging { id, start, .. } = previous else {
            return DragOutcome::Ignored;
        };
        let Some(placeholder) = store.get(id) else {
            return DragOutcome::Ignored;
        };
        let end = placeholder.position();
        debug!("drag end id={id} at ({}, {})", end.x, end.y);
        if end == start {
            DragOutcome::Unchanged { id }
        } else {
            DragOutcome::Moved {
                id,
                from: start,
                to: end,
            }
        }
    }

    /// Abandon any active drag without reporting it.
    pub fn cancel(&mut self) {
        if let DragState::Dragging { id, .. } = self.state {
            debug!("drag on {id} cancelled");
        }
        self.state = DragState::Idle;
    }
}

impl Default for DragController {
    fn default() -> Self {
        Self::new()
    }
}
