//! Resolution of image filenames against the document that named them

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors produced by a [`PathResolver`]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PathError {
    #[error("empty filename")]
    Empty,

    #[error("'{path}' escapes the source directory")]
    OutsideSource { path: String },
}

/// Host service turning a filename written in a document into a usable URI
pub trait PathResolver {
    /// Resolve `filename` as written in the document `docname`
    fn resolve(&self, filename: &str, docname: &str) -> Result<String, PathError>;
}

/// Resolves filenames inside a source directory tree
///
/// Document names are `/`-separated paths without extension, relative to the
/// source root (`chapter/intro`). A filename is relative to the directory of
/// its document, or to the source root when it starts with `/`. The result is
/// a normalized `/`-separated path relative to the source root.
#[derive(Debug, Clone, Default)]
pub struct SourceTree {
    root: PathBuf,
}

impl SourceTree {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Filesystem location of a resolved URI
    pub fn absolute(&self, uri: &str) -> PathBuf {
        self.root.join(uri)
    }
}

impl PathResolver for SourceTree {
    fn resolve(&self, filename: &str, docname: &str) -> Result<String, PathError> {
        if filename.is_empty() {
            return Err(PathError::Empty);
        }

        let mut parts: Vec<&str> = Vec::new();
        let relative = match filename.strip_prefix('/') {
            Some(rooted) => rooted,
            None => {
                // Directory of the document: every segment but the last
                if let Some((dir, _)) = docname.rsplit_once('/') {
                    parts.extend(dir.split('/').filter(|s| !s.is_empty()));
                }
                filename
            }
        };

        for segment in relative.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    if parts.pop().is_none() {
                        return Err(PathError::OutsideSource {
                            path: filename.to_string(),
                        });
                    }
                }
                other => parts.push(other),
            }
        }

        Ok(parts.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_to_document_directory() {
        let tree = SourceTree::new("doc");
        assert_eq!(
            tree.resolve("img/a.png", "chapter/intro"),
            Ok("chapter/img/a.png".to_string())
        );
        assert_eq!(tree.resolve("a.png", "index"), Ok("a.png".to_string()));
    }

    #[test]
    fn test_rooted_filename() {
        let tree = SourceTree::new("doc");
        assert_eq!(
            tree.resolve("/img/a.png", "chapter/intro"),
            Ok("img/a.png".to_string())
        );
    }

    #[test]
    fn test_parent_segments_are_normalized() {
        let tree = SourceTree::new("doc");
        assert_eq!(
            tree.resolve("../img/./a.png", "chapter/intro"),
            Ok("img/a.png".to_string())
        );
    }

    #[test]
    fn test_escaping_the_source_root_fails() {
        let tree = SourceTree::new("doc");
        assert!(matches!(
            tree.resolve("../../a.png", "chapter/intro"),
            Err(PathError::OutsideSource { .. })
        ));
    }

    #[test]
    fn test_absolute_joins_root() {
        let tree = SourceTree::new("doc");
        assert_eq!(tree.absolute("img/a.png"), Path::new("doc").join("img/a.png"));
    }
}
