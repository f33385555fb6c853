use serde::{Deserialize, Serialize};

/// A user-defined label with a display color.
///
/// Media items embed copies of tags, so a rename or recolor has to be
/// propagated explicitly (see `Library::update_tag`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: String,
    pub name: String,
    pub color: String,
}

impl Tag {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            color: color.into(),
        }
    }
}
