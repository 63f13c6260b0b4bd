//! Binding between the speech engine and a text search field
//!
//! [`VoiceSearch`] owns an engine plus the caller's callbacks and turns
//! engine events into callback invocations and notices. [`SearchField`] is
//! the caller-owned text value; the voice side only ever proposes a
//! replacement for it.

mod field;
mod voice;

pub use field::SearchField;
pub use voice::{VoiceSearch, VoiceSearchOptions};
