//! Icon-lookup collaborator.
//!
//! The configuration asks an [`IconSource`] for each type's default icon at
//! construction time. Lookup is best-effort: a failure degrades to "no icon",
//! it never fails construction.

use crate::style::Icon;

#[derive(Debug, thiserror::Error)]
pub enum IconError {
    #[error("no icon available for type: {type_iri}")]
    Unavailable { type_iri: String },

    #[error("icon store error for type {type_iri}: {message}")]
    Store { type_iri: String, message: String },
}

pub trait IconSource {
    fn default_icon(&self, type_iri: &str) -> Result<Icon, IconError>;
}

/// The null icon source: every lookup fails, every type starts without an
/// icon.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoIcons;

impl IconSource for NoIcons {
    fn default_icon(&self, type_iri: &str) -> Result<Icon, IconError> {
        Err(IconError::Unavailable {
            type_iri: type_iri.to_string(),
        })
    }
}
