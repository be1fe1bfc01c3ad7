pub mod action_log;
pub mod document;
pub mod drag;
pub mod export;
pub mod geometry;
pub mod marker;
pub mod placement;
pub mod storage;
