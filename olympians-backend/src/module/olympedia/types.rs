//! olympedia.org data types

/// One anchor found on a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLink {
    /// Raw `href` attribute, empty when absent
    pub href: String,
    /// Anchor text with nested markup removed
    pub text: String,
}
