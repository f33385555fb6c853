//! Turning user-typed references into ids.
//!
//! A reference matches by exact id first, then by a unique id prefix, then
//! by a unique case-insensitive name.

use reel_core::library::Library;
use reel_core::models::{MediaItem, Tag};

use crate::error::CliError;

fn resolve<'a, T>(
    entries: &'a [T],
    query: &str,
    kind: &'static str,
    id: impl Fn(&T) -> &str,
    name: impl Fn(&T) -> &str,
) -> Result<&'a T, CliError> {
    let query = query.trim();
    if let Some(found) = entries.iter().find(|e| id(*e) == query) {
        return Ok(found);
    }

    let unique = |matches: Vec<&'a T>| match matches.as_slice() {
        [] => Ok(None),
        [one] => Ok(Some(*one)),
        _ => Err(CliError::Ambiguous {
            kind,
            query: query.to_string(),
        }),
    };

    if !query.is_empty() {
        let by_prefix = entries
            .iter()
            .filter(|e| id(*e).starts_with(query))
            .collect();
        if let Some(found) = unique(by_prefix)? {
            return Ok(found);
        }
    }

    let lowered = query.to_lowercase();
    let by_name = entries
        .iter()
        .filter(|e| name(*e).to_lowercase() == lowered)
        .collect();
    unique(by_name)?.ok_or_else(|| CliError::NotFound {
        kind,
        query: query.to_string(),
    })
}

pub fn media<'a>(library: &'a Library, query: &str) -> Result<&'a MediaItem, CliError> {
    resolve(library.all_media(), query, "item", |m| &m.id, |m| &m.title)
}

pub fn tag<'a>(library: &'a Library, query: &str) -> Result<&'a Tag, CliError> {
    resolve(library.all_tags(), query, "tag", |t| &t.id, |t| &t.name)
}

pub fn tag_ids(library: &Library, queries: &[String]) -> Result<Vec<String>, CliError> {
    queries
        .iter()
        .map(|q| tag(library, q).map(|t| t.id.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags() -> Vec<Tag> {
        vec![
            Tag {
                id: "a1b2".into(),
                name: "Comfy".into(),
                color: "#10B981".into(),
            },
            Tag {
                id: "a1c3".into(),
                name: "Rewatch".into(),
                color: "#3B82F6".into(),
            },
            Tag {
                id: "ff00".into(),
                name: "a1".into(),
                color: "#EF4444".into(),
            },
        ]
    }

    fn find<'a>(entries: &'a [Tag], query: &str) -> Result<&'a Tag, CliError> {
        resolve(entries, query, "tag", |t| &t.id, |t| &t.name)
    }

    #[test]
    fn test_exact_id_and_unique_prefix() {
        let entries = tags();
        assert_eq!(find(&entries, "a1c3").unwrap().name, "Rewatch");
        assert_eq!(find(&entries, "a1b").unwrap().name, "Comfy");
    }

    #[test]
    fn test_ambiguous_prefix() {
        let entries = tags();
        assert!(matches!(
            find(&entries, "a1"),
            Err(CliError::Ambiguous { kind: "tag", .. })
        ));
    }

    #[test]
    fn test_name_is_case_insensitive() {
        let entries = tags();
        assert_eq!(find(&entries, "comfy").unwrap().id, "a1b2");
        assert!(matches!(
            find(&entries, "nope"),
            Err(CliError::NotFound { .. })
        ));
    }
}
