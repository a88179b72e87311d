//! Prefix tree over `/`-separated path segments.

use std::collections::BTreeMap;

use crate::domain::path::is_path_param;

/// A path trie keyed by path segments.
///
/// Insertion stores declared templates verbatim; lookup walks a concrete path
/// preferring exact children and falling back to a `{…}` child, which matches
/// any single concrete segment. Re-inserting a template overwrites its value.
#[derive(Debug, Clone)]
pub struct PathTrie<T> {
    root: Node<T>,
}

#[derive(Debug, Clone)]
struct Node<T> {
    // BTreeMap keeps the parameter-child fallback deterministic.
    children: BTreeMap<String, Node<T>>,
    template: Option<String>,
    value: Option<T>,
}

impl<T> Default for Node<T> {
    fn default() -> Self {
        Self {
            children: BTreeMap::new(),
            template: None,
            value: None,
        }
    }
}

impl<T> Default for PathTrie<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PathTrie<T> {
    pub fn new() -> Self {
        Self {
            root: Node::default(),
        }
    }

    /// Insert `template` with its associated value.
    pub fn insert(&mut self, template: &str, value: T) -> Result<(), TrieError> {
        if template.is_empty() {
            return Err(TrieError::EmptyTemplate);
        }

        let mut node = &mut self.root;
        for segment in segments(template) {
            node = node.children.entry(segment.to_string()).or_default();
        }
        node.template = Some(template.to_string());
        node.value = Some(value);
        Ok(())
    }

    /// Look up a concrete path, returning the matched template and its value.
    ///
    /// At each level an exact child wins; otherwise a `{…}` child matches the
    /// segment. Returns `None` when any level has neither, or when the final
    /// node holds no value.
    pub fn get(&self, path: &str) -> Option<(&str, &T)> {
        let mut node = &self.root;
        for segment in segments(path) {
            node = match node.children.get(segment) {
                Some(child) => child,
                None => node
                    .children
                    .iter()
                    .find(|(key, _)| is_path_param(key))
                    .map(|(_, child)| child)?,
            };
        }

        match (&node.template, &node.value) {
            (Some(template), Some(value)) => Some((template.as_str(), value)),
            _ => None,
        }
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TrieError {
    #[error("cannot insert an empty path template")]
    EmptyTemplate,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PathTrie<u32> {
        let mut trie = PathTrie::new();
        trie.insert("/users", 1).unwrap();
        trie.insert("/users/{id}", 2).unwrap();
        trie.insert("/users/{id}/books", 3).unwrap();
        trie.insert("/health", 4).unwrap();
        trie
    }

    #[test]
    fn exact_lookup() {
        let trie = sample();
        assert_eq!(trie.get("/users"), Some(("/users", &1)));
        assert_eq!(trie.get("/health"), Some(("/health", &4)));
    }

    #[test]
    fn parameter_child_matches_any_segment() {
        let trie = sample();
        assert_eq!(trie.get("/users/123"), Some(("/users/{id}", &2)));
        assert_eq!(trie.get("/users/alice"), Some(("/users/{id}", &2)));
        assert_eq!(
            trie.get("/users/123/books"),
            Some(("/users/{id}/books", &3))
        );
    }

    #[test]
    fn exact_child_preferred_over_parameter() {
        let mut trie = sample();
        trie.insert("/users/me", 9).unwrap();
        assert_eq!(trie.get("/users/me"), Some(("/users/me", &9)));
        assert_eq!(trie.get("/users/42"), Some(("/users/{id}", &2)));
    }

    #[test]
    fn misses() {
        let trie = sample();
        assert!(trie.get("/orders").is_none());
        assert!(trie.get("/users/1/books/2").is_none());
        // Intermediate node without a stored template.
        let mut deep = PathTrie::new();
        deep.insert("/a/b/c", 1).unwrap();
        assert!(deep.get("/a/b").is_none());
    }

    #[test]
    fn insert_overwrites() {
        let mut trie = sample();
        trie.insert("/users", 10).unwrap();
        assert_eq!(trie.get("/users"), Some(("/users", &10)));
    }

    #[test]
    fn empty_template_is_an_error() {
        let mut trie: PathTrie<u32> = PathTrie::new();
        assert_eq!(trie.insert("", 1), Err(TrieError::EmptyTemplate));
    }
}
