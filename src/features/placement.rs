use serde::Serialize;

use crate::features::geometry::{Point, Size, Viewport};

pub type PlaceholderId = u64;

/// A draggable rectangle marking where a signature goes. Position is in
/// content coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Placeholder {
    pub id: PlaceholderId,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub label: String,
}

impl Placeholder {
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// Ordered placeholders for the loaded document.
///
/// Ids come from a counter that survives [`PlacementStore::clear`], so an id
/// is never handed out twice in the same process. Label numbers restart per
/// document but never repeat within one, even after removals.
#[derive(Debug, Clone)]
pub struct PlacementStore {
    items: Vec<Placeholder>,
    next_id: PlaceholderId,
    next_label: u32,
}

impl PlacementStore {
    pub const fn new() -> Self {
        Self {
            items: Vec::new(),
            next_id: 1,
            next_label: 1,
        }
    }

    pub fn items(&self) -> &[Placeholder] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: PlaceholderId) -> Option<&Placeholder> {
        self.items.iter().find(|p| p.id == id)
    }

    /// Append a new placeholder at `position` (clamped) and return a copy of it.
    pub fn insert(
        &mut self,
        position: Point,
        size: Size,
        label_prefix: &str,
        viewport: &Viewport,
    ) -> Placeholder {
        let clamped = viewport.clamp(position, size);
        let placeholder = Placeholder {
            id: self.next_id,
            x: clamped.x,
            y: clamped.y,
            width: size.width,
            height: size.height,
            label: format!("{label_prefix} {}", self.next_label),
        };
        self.next_id += 1;
        self.next_label += 1;
        self.items.push(placeholder.clone());
        placeholder
    }

    /// Move a placeholder to the clamped `position`. Returns the applied
    /// position, or `None` when `id` is unknown.
    pub fn set_position(
        &mut self,
        id: PlaceholderId,
        position: Point,
        viewport: &Viewport,
    ) -> Option<Point> {
        let placeholder = self.items.iter_mut().find(|p| p.id == id)?;
        let clamped = viewport.clamp(position, placeholder.size());
        placeholder.x = clamped.x;
        placeholder.y = clamped.y;
        Some(clamped)
    }

    pub fn remove(&mut self, id: PlaceholderId) -> Option<Placeholder> {
        let index = self.items.iter().position(|p| p.id == id)?;
        Some(self.items.remove(index))
    }

    /// Drop every placeholder and restart label numbering.
    pub fn clear(&mut self) {
        self.items.clear();
        self.next_label = 1;
    }
}

impl Default for PlacementStore {
    fn default() -> Self {
        Self::new()
    }
}
