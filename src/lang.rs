//! Display string translation
//!
//! Catalog lookup lives outside this crate; callers plug in their own.

/// Translates a source-language display string
pub trait Translate {
    fn tr(&self, msgid: &str) -> String;
}

/// Passes strings through unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct Untranslated;

impl Translate for Untranslated {
    fn tr(&self, msgid: &str) -> String {
        msgid.to_string()
    }
}
