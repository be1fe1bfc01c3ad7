rust_i18n::i18n!("locales", fallback = "en");

pub mod config;
pub mod error;
pub mod features;
mod i18n;
mod logging;
mod router;
mod state;
mod ui;

