use crate::models::Tag;

/// Ordered set of user-defined tags. Owns tag lifetime.
///
/// Cascading renames and deletes into media items is the caller's job;
/// see `Library::update_tag` and `Library::delete_tag`.
#[derive(Debug, Clone, Default)]
pub struct TagRegistry {
    tags: Vec<Tag>,
}

impl TagRegistry {
    pub fn new(tags: Vec<Tag>) -> Self {
        Self { tags }
    }

    pub fn all(&self) -> &[Tag] {
        &self.tags
    }

    pub fn get(&self, id: &str) -> Option<&Tag> {
        self.tags.iter().find(|t| t.id == id)
    }

    /// Create and append a tag, returning it for immediate use.
    pub fn add_tag(&mut self, name: &str, color: &str) -> Tag {
        let tag = Tag::new(name, color);
        self.tags.push(tag.clone());
        tag
    }

    /// Replace the tag with the same id. Returns `false` for unknown ids.
    pub fn update_tag(&mut self, tag: &Tag) -> bool {
        match self.tags.iter_mut().find(|t| t.id == tag.id) {
            Some(existing) => {
                *existing = tag.clone();
                true
            }
            None => false,
        }
    }

    /// Remove a tag, returning it if it existed.
    pub fn delete_tag(&mut self, id: &str) -> Option<Tag> {
        let pos = self.tags.iter().position(|t| t.id == id)?;
        Some(self.tags.remove(pos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_update_delete() {
        let mut registry = TagRegistry::default();
        let drama = registry.add_tag("Drama", "#EF4444");
        let comfy = registry.add_tag("Comfy", "#10B981");
        assert_eq!(registry.all().len(), 2);
        assert_ne!(drama.id, comfy.id);

        let renamed = Tag {
            name: "Heavy drama".into(),
            ..drama.clone()
        };
        assert!(registry.update_tag(&renamed));
        assert_eq!(registry.get(&drama.id).unwrap().name, "Heavy drama");

        assert_eq!(registry.delete_tag(&drama.id).map(|t| t.id), Some(drama.id));
        assert_eq!(registry.all(), std::slice::from_ref(&comfy));
    }

    #[test]
    fn test_unknown_ids_are_noops() {
        let mut registry = TagRegistry::default();
        registry.add_tag("Drama", "#EF4444");
        let ghost = Tag::new("Ghost", "#000000");

        assert!(!registry.update_tag(&ghost));
        assert!(registry.delete_tag(&ghost.id).is_none());
        assert_eq!(registry.all().len(), 1);
    }

    #[test]
    fn test_duplicate_names_allowed() {
        let mut registry = TagRegistry::default();
        registry.add_tag("Rewatch", "#fff");
        registry.add_tag("Rewatch", "#000");
        assert_eq!(registry.all().len(), 2);
    }
}
