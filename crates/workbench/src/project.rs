//! Projects opened during this session.

use reconcile::ResourceName;

/// Ordered list of project names opened in this session.
///
/// Appends are unconditional: opening the same project twice records it
/// twice. Removal takes out the first matching entry only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectRegistry {
    entries: Vec<ResourceName>,
}

impl ProjectRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `name`, even if it is already recorded.
    pub fn push(&mut self, name: ResourceName) {
        self.entries.push(name);
    }

    /// Remove the first entry equal to `name`. Returns whether one was found.
    pub fn remove_first(&mut self, name: &ResourceName) -> bool {
        match self.entries.iter().position(|n| n == name) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    /// Whether `name` is recorded at least once.
    pub fn contains(&self, name: &ResourceName) -> bool {
        self.entries.contains(name)
    }

    /// Number of entries, duplicates included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in the order they were opened.
    pub fn iter(&self) -> impl Iterator<Item = &ResourceName> {
        self.entries.iter()
    }

    /// Entries as a slice.
    pub fn as_slice(&self) -> &[ResourceName] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_keeps_duplicates() {
        let mut registry = ProjectRegistry::new();
        registry.push(ResourceName::from("x"));
        registry.push(ResourceName::from("x"));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_remove_first_only() {
        let mut registry = ProjectRegistry::new();
        registry.push(ResourceName::from("a"));
        registry.push(ResourceName::from("b"));
        registry.push(ResourceName::from("a"));

        assert!(registry.remove_first(&ResourceName::from("a")));
        let names: Vec<&str> = registry.iter().map(ResourceName::as_str).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert!(!registry.remove_first(&ResourceName::from("zzz")));
    }
}
