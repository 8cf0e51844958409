use atelier_core::DocumentQuery;
use std::collections::BTreeSet;

/// Font families referenced by the document's text nodes.
///
/// Owned by the editor state and refreshed after every structural edit so
/// font loading can be driven from it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FontRegistry {
    families: BTreeSet<String>,
}

impl FontRegistry {
    /// Recollect families. Returns `true` if the set changed.
    pub fn refresh(&mut self, query: &DocumentQuery<'_>) -> bool {
        let families = query.fonts();
        if families == self.families {
            return false;
        }
        log::debug!("font registry: {} famil(ies)", families.len());
        self.families = families;
        true
    }

    pub fn contains(&self, family: &str) -> bool {
        self.families.contains(family)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.families.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.families.len()
    }

    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }
}
