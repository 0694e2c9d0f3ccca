//! Build session: documents, the grid map registry and their lifecycle
//!
//! A build reads documents first and writes them afterwards. Reading a
//! document registers its grid maps; writing it resolves its image grids
//! against every map registered by the build, so a grid may use maps from
//! documents read after its own.

use std::collections::BTreeMap;

use rayon::prelude::*;
use thiserror::Error;

use crate::error::{ConsistencyError, DirectiveError};
use crate::gridmap::{resolve_grid, GridMap, Registry};
use crate::math::{parse_definition, parse_inference};
use crate::parser::ast::{Directive, DirectiveKind};
use crate::parser::{parse_grid_map, parse_image_grid, scan};
use crate::paths::PathResolver;
use crate::renderer::Block;

/// Errors that abort a build step
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Consistency(#[from] ConsistencyError),

    #[error("document '{0}' has not been read")]
    UnknownDocument(String),
}

/// Block kinds rendered in the write phase
#[derive(Debug, Clone, Copy)]
enum Deferred {
    ImageGrid,
    Inference,
    Definition,
}

/// A document after the read phase
#[derive(Debug, Clone)]
struct ReadDocument {
    source: String,
    pending: Vec<(Deferred, Directive)>,
    /// Names of directives this crate does not handle
    skipped: Vec<String>,
    errors: Vec<DirectiveError>,
}

/// Result of writing one document
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentOutput {
    pub docname: String,
    /// Rendered blocks in document order
    pub blocks: Vec<Block>,
    /// Failed blocks from both phases, in source order
    pub errors: Vec<DirectiveError>,
    /// Other directives passed over, in source order
    pub skipped: Vec<String>,
}

/// Read one document into its own registry
fn read_document(docname: &str, source: String) -> (ReadDocument, Registry) {
    let document = scan(&source);
    let mut registry = Registry::new();
    let mut pending = Vec::new();
    let mut skipped = Vec::new();
    let mut errors = Vec::new();

    for directive in document.directives {
        match directive.kind() {
            Some(DirectiveKind::GridMap) => match parse_grid_map(&directive) {
                Ok(decl) => {
                    let map = GridMap::from_decl(&decl, docname);
                    if let Err(err) = registry.add(map) {
                        errors.push(DirectiveError::DuplicateMap {
                            name: err.name,
                            span: decl.name.span,
                        });
                    }
                }
                Err(err) => errors.push(err),
            },
            Some(DirectiveKind::ImageGrid) => pending.push((Deferred::ImageGrid, directive)),
            Some(DirectiveKind::Inference) => pending.push((Deferred::Inference, directive)),
            Some(DirectiveKind::Definition) => pending.push((Deferred::Definition, directive)),
            None => skipped.push(directive.name.node),
        }
    }

    let document = ReadDocument {
        source,
        pending,
        skipped,
        errors,
    };
    (document, registry)
}

pub struct Build<R> {
    registry: Registry,
    documents: BTreeMap<String, ReadDocument>,
    resolver: R,
}

impl<R: PathResolver> Build<R> {
    pub fn new(resolver: R) -> Self {
        Self {
            registry: Registry::new(),
            documents: BTreeMap::new(),
            resolver,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Names of the documents read so far
    pub fn docnames(&self) -> impl Iterator<Item = &str> {
        self.documents.keys().map(|s| s.as_str())
    }

    /// Source text of a document that has been read
    pub fn source(&self, docname: &str) -> Option<&str> {
        self.documents.get(docname).map(|d| d.source.as_str())
    }

    /// Read (or re-read) a document, replacing its previous grid maps
    ///
    /// On a consistency error the session keeps the document's previous
    /// contents.
    pub fn read(&mut self, docname: &str, source: impl Into<String>) -> Result<(), BuildError> {
        let (document, registry) = read_document(docname, source.into());
        if let Some(err) = self.registry.collision(&registry, &[docname]) {
            return Err(err.into());
        }
        self.purge(docname);
        self.registry.merge(registry)?;
        self.documents.insert(docname.to_string(), document);
        Ok(())
    }

    /// Read documents in parallel, one registry per worker
    ///
    /// Worker registries are merged into the build once every document has
    /// been read. A grid map name defined by two documents aborts the merge
    /// and leaves the session unchanged. When a docname is given more than
    /// once, the last source wins.
    pub fn read_parallel(&mut self, documents: Vec<(String, String)>) -> Result<(), BuildError> {
        let documents: BTreeMap<String, String> = documents.into_iter().collect();

        let read: Vec<(String, ReadDocument, Registry)> = documents
            .into_par_iter()
            .map(|(docname, source)| {
                let (document, registry) = read_document(&docname, source);
                (docname, document, registry)
            })
            .collect();

        let mut incoming = Registry::new();
        let mut read_documents = Vec::with_capacity(read.len());
        for (docname, document, registry) in read {
            incoming.merge(registry)?;
            read_documents.push((docname, document));
        }

        let replaced: Vec<&str> = read_documents.iter().map(|(name, _)| name.as_str()).collect();
        if let Some(err) = self.registry.collision(&incoming, &replaced) {
            return Err(err.into());
        }
        for docname in replaced {
            self.registry.purge(docname);
        }
        self.registry.merge(incoming)?;
        self.documents.extend(read_documents);
        Ok(())
    }

    /// Forget a document and every grid map it defined
    pub fn purge(&mut self, docname: &str) {
        self.registry.purge(docname);
        self.documents.remove(docname);
    }

    /// Render the blocks of a document that has been read
    pub fn write(&self, docname: &str) -> Result<DocumentOutput, BuildError> {
        let document = self
            .documents
            .get(docname)
            .ok_or_else(|| BuildError::UnknownDocument(docname.to_string()))?;

        let mut blocks = Vec::new();
        let mut errors = document.errors.clone();
        for (kind, directive) in &document.pending {
            match self.render(*kind, directive) {
                Ok(block) => blocks.push(block),
                Err(err) => errors.push(err),
            }
        }
        errors.sort_by_key(|e| e.span().start);

        Ok(DocumentOutput {
            docname: docname.to_string(),
            blocks,
            errors,
            skipped: document.skipped.clone(),
        })
    }

    fn render(&self, kind: Deferred, directive: &Directive) -> Result<Block, DirectiveError> {
        match kind {
            Deferred::ImageGrid => {
                let spec = parse_image_grid(directive)?;
                let table = resolve_grid(&spec, &self.registry, &self.resolver)?;
                Ok(Block::ImageGrid(table))
            }
            Deferred::Inference => parse_inference(directive).map(Block::Math),
            Deferred::Definition => parse_definition(directive).map(Block::Math),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paths::SourceTree;

    const MAPS: &str = "\
.. grid-map:: base

   a: a.png
   b: b.png

.. grid-map:: extra : base

   b: other_b.png
   c: c.png
";

    fn build() -> Build<SourceTree> {
        Build::new(SourceTree::new("."))
    }

    #[test]
    fn test_read_registers_maps() {
        let mut build = build();
        build.read("maps", MAPS).unwrap();
        let names: Vec<&str> = build.registry().names().collect();
        assert_eq!(names, vec!["base", "extra"]);
        assert_eq!(build.registry().get("extra").unwrap().parents, vec!["base"]);
    }

    #[test]
    fn test_reread_replaces_maps() {
        let mut build = build();
        build.read("maps", MAPS).unwrap();
        build
            .read("maps", ".. grid-map:: base\n\n   z: z.png\n")
            .unwrap();
        let names: Vec<&str> = build.registry().names().collect();
        assert_eq!(names, vec!["base"]);
        assert_eq!(build.registry().get("base").unwrap().get('z'), Some("z.png"));
    }

    #[test]
    fn test_same_name_in_two_documents_is_fatal() {
        let mut build = build();
        build.read("one", MAPS).unwrap();
        let err = build
            .read("two", ".. grid-map:: base\n\n   q: q.png\n")
            .unwrap_err();
        assert!(matches!(err, BuildError::Consistency(ref e) if e.name == "base"));
    }

    #[test]
    fn test_duplicate_map_in_one_document_is_a_block_error() {
        let mut build = build();
        let source = ".. grid-map:: base\n\n   a: a.png\n\n.. grid-map:: base\n\n   b: b.png\n";
        build.read("index", source).unwrap();
        let output = build.write("index").unwrap();
        assert_eq!(output.errors.len(), 1);
        assert!(matches!(output.errors[0], DirectiveError::DuplicateMap { .. }));
        assert_eq!(build.registry().get("base").unwrap().get('a'), Some("a.png"));
    }

    #[test]
    fn test_failed_block_does_not_register() {
        let mut build = build();
        build
            .read("index", ".. grid-map:: broken\n\n   a: a.png\n   a: again.png\n")
            .unwrap();
        assert!(build.registry().is_empty());
        assert_eq!(build.write("index").unwrap().errors.len(), 1);
    }

    #[test]
    fn test_write_uses_maps_from_other_documents() {
        let mut build = build();
        build
            .read("chapter/grid", ".. image-grid:: extra base\n\n   |abc|\n")
            .unwrap();
        build.read("defs/maps", MAPS).unwrap();

        let output = build.write("chapter/grid").unwrap();
        assert!(output.errors.is_empty(), "{:?}", output.errors);
        let Block::ImageGrid(table) = &output.blocks[0] else {
            panic!("expected an image grid");
        };
        let uris: Vec<&str> = table.cells().map(|c| c.uri.as_str()).collect();
        assert_eq!(uris, vec!["defs/a.png", "defs/other_b.png", "defs/c.png"]);
    }

    #[test]
    fn test_write_collects_errors_in_source_order() {
        let mut build = build();
        let source = "\
.. image-grid:: base

   |x|

.. unknown:: thing

.. definition::

   only one line
";
        build.read("maps", MAPS).unwrap();
        build.read("index", source).unwrap();
        let output = build.write("index").unwrap();
        assert!(output.blocks.is_empty());
        assert_eq!(output.errors.len(), 2);
        assert!(matches!(output.errors[0], DirectiveError::UnresolvedChar { ch: 'x', .. }));
        assert!(matches!(output.errors[1], DirectiveError::DefinitionLineCount { found: 1, .. }));
        assert_eq!(output.skipped, vec!["unknown"]);
    }

    #[test]
    fn test_nested_blocks_are_read() {
        let mut build = build();
        let source = "\
.. container:: boards

   .. grid-map:: inner

      i: i.png

   .. image-grid:: inner

      |iq|
";
        build.read("index", source).unwrap();
        assert!(build.registry().contains("inner"));

        let output = build.write("index").unwrap();
        assert_eq!(output.skipped, vec!["container"]);
        assert_eq!(output.errors.len(), 1);
        let DirectiveError::UnresolvedChar { ch, span, .. } = &output.errors[0] else {
            panic!("unexpected error: {:?}", output.errors[0]);
        };
        assert_eq!(*ch, 'q');
        assert_eq!(&source[span.clone()], "q");
    }

    #[test]
    fn test_failed_read_keeps_previous_contents() {
        let mut build = build();
        build.read("maps", MAPS).unwrap();
        build.read("other", ".. grid-map:: other\n\n   o: o.png\n").unwrap();

        let err = build
            .read("other", ".. grid-map:: base\n\n   q: q.png\n")
            .unwrap_err();
        assert!(matches!(err, BuildError::Consistency(ref e) if e.second_document == "other"));
        assert!(build.registry().contains("other"));
        assert_eq!(build.registry().get("base").unwrap().source_document, "maps");
        assert!(build.source("other").unwrap().contains("o.png"));
    }

    #[test]
    fn test_write_unknown_document() {
        let build = build();
        assert!(matches!(
            build.write("nope"),
            Err(BuildError::UnknownDocument(_))
        ));
    }

    #[test]
    fn test_read_parallel_merges_workers() {
        let mut build = build();
        let documents = vec![
            ("maps".to_string(), MAPS.to_string()),
            (
                "more".to_string(),
                ".. grid-map:: third\n\n   t: t.png\n".to_string(),
            ),
            (
                "index".to_string(),
                ".. image-grid:: third base\n\n   |ta|\n".to_string(),
            ),
        ];
        build.read_parallel(documents).unwrap();
        assert_eq!(build.registry().len(), 3);
        let output = build.write("index").unwrap();
        assert!(output.errors.is_empty());
        assert_eq!(output.blocks.len(), 1);
    }

    #[test]
    fn test_read_parallel_collision_is_fatal() {
        let mut build = build();
        let documents = vec![
            ("one".to_string(), ".. grid-map:: dup\n\n   a: a.png\n".to_string()),
            ("two".to_string(), ".. grid-map:: dup\n\n   b: b.png\n".to_string()),
        ];
        let err = build.read_parallel(documents).unwrap_err();
        assert!(matches!(err, BuildError::Consistency(ref e) if e.name == "dup"));
    }

    #[test]
    fn test_read_parallel_repeated_docname_last_wins() {
        let mut build = build();
        let documents = vec![
            ("index".to_string(), ".. grid-map:: old\n\n   a: a.png\n".to_string()),
            ("index".to_string(), ".. grid-map:: new\n\n   a: a.png\n".to_string()),
        ];
        build.read_parallel(documents).unwrap();
        let names: Vec<&str> = build.registry().names().collect();
        assert_eq!(names, vec!["new"]);
    }

    #[test]
    fn test_read_parallel_rereads_and_keeps_session_on_failure() {
        let mut build = build();
        build.read("maps", MAPS).unwrap();

        // Re-reading `maps` may keep its names
        build
            .read_parallel(vec![("maps".to_string(), MAPS.to_string())])
            .unwrap();
        assert_eq!(build.registry().len(), 2);

        let err = build
            .read_parallel(vec![
                ("new".to_string(), ".. grid-map:: third\n\n   t: t.png\n".to_string()),
                ("copy".to_string(), MAPS.to_string()),
            ])
            .unwrap_err();
        assert!(matches!(err, BuildError::Consistency(ref e) if e.first_document == "maps"));
        let names: Vec<&str> = build.registry().names().collect();
        assert_eq!(names, vec!["base", "extra"]);
        assert!(build.source("new").is_none());

        // Moving the maps in the same call is fine
        build
            .read_parallel(vec![
                ("maps".to_string(), ".. grid-map:: third\n\n   t: t.png\n".to_string()),
                ("copy".to_string(), MAPS.to_string()),
            ])
            .unwrap();
        assert_eq!(build.registry().get("base").unwrap().source_document, "copy");
    }

    #[test]
    fn test_purge_forgets_document() {
        let mut build = build();
        build.read("maps", MAPS).unwrap();
        build.read("other", ".. grid-map:: other\n\n   o: o.png\n").unwrap();
        build.purge("maps");
        let names: Vec<&str> = build.registry().names().collect();
        assert_eq!(names, vec!["other"]);
        assert!(build.source("maps").is_none());
        let docs: Vec<&str> = build.docnames().collect();
        assert_eq!(docs, vec!["other"]);
    }
}
