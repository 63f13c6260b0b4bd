//! Supported recognition locales
//!
//! The registry is a static, curated table. The first entry doubles as the
//! fallback for unknown codes, so lookups never fail.

mod registry;

pub use registry::{find_by_code, is_registered, list_popular, DEFAULT_LANGUAGE, LANGUAGES};

use serde::Serialize;

/// A recognition locale plus the metadata shown in the language selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Language {
    /// Locale id handed to the recognizer (e.g. "en-US")
    pub code: &'static str,

    /// Display name (e.g. "English (US)")
    pub name: &'static str,

    /// Flag glyph for the selector
    pub flag: &'static str,

    /// Region the locale is spoken in
    pub region: &'static str,
}

impl Language {
    /// Selector label: flag followed by name
    pub fn label(&self) -> String {
        format!("{} {}", self.flag, self.name)
    }
}
