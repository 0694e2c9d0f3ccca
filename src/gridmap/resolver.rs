//! Resolution of image grids against the registry

use crate::error::DirectiveError;
use crate::parser::ast::ImageGridSpec;
use crate::paths::PathResolver;

use super::registry::{GridMap, Registry};

/// One resolved grid cell
#[derive(Debug, Clone, PartialEq)]
pub struct ImageCell {
    pub ch: char,
    /// Grid map that supplied the image
    pub map: String,
    /// Image location, resolved against the map's defining document
    pub uri: String,
}

/// Table of resolved images, one row per grid row
#[derive(Debug, Clone, PartialEq)]
pub struct ImageTable {
    pub columns: usize,
    pub rows: Vec<Vec<ImageCell>>,
}

impl ImageTable {
    pub fn cells(&self) -> impl Iterator<Item = &ImageCell> {
        self.rows.iter().flatten()
    }
}

/// Resolve every cell of `spec` to an image
///
/// Parent maps are searched in the order the `image-grid` block lists them
/// and the first map containing the character wins. A character no listed
/// map defines fails the whole grid.
pub fn resolve_grid(
    spec: &ImageGridSpec,
    registry: &Registry,
    paths: &dyn PathResolver,
) -> Result<ImageTable, DirectiveError> {
    let maps = spec
        .parents
        .iter()
        .map(|parent| {
            registry
                .get(&parent.node)
                .ok_or_else(|| DirectiveError::UnknownMap {
                    name: parent.node.clone(),
                    span: parent.span.clone(),
                })
        })
        .collect::<Result<Vec<&GridMap>, _>>()?;

    let mut rows = Vec::with_capacity(spec.rows.len());
    for row in &spec.rows {
        let mut cells = Vec::with_capacity(spec.columns);
        let mut offset = row.span.start;
        for &ch in &row.node {
            let span = offset..offset + ch.len_utf8();
            offset = span.end;

            let Some((map, filename)) = maps.iter().find_map(|m| m.get(ch).map(|f| (*m, f)))
            else {
                return Err(DirectiveError::UnresolvedChar {
                    ch,
                    maps: spec.parents.iter().map(|p| p.node.clone()).collect(),
                    span,
                });
            };

            let uri = paths
                .resolve(filename, &map.source_document)
                .map_err(|source| DirectiveError::Path {
                    filename: filename.to_string(),
                    source,
                    span: span.clone(),
                })?;

            cells.push(ImageCell {
                ch,
                map: map.name.clone(),
                uri,
            });
        }
        rows.push(cells);
    }

    Ok(ImageTable {
        columns: spec.columns,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gridmap::GridMap;
    use crate::parser::{parse_image_grid, scan};
    use crate::paths::SourceTree;
    use pretty_assertions::assert_eq;

    fn map(name: &str, document: &str, entries: &[(char, &str)]) -> GridMap {
        GridMap {
            name: name.to_string(),
            parents: vec![],
            entries: entries
                .iter()
                .map(|(c, f)| (*c, f.to_string()))
                .collect(),
            source_document: document.to_string(),
        }
    }

    fn sample_registry() -> Registry {
        let mut registry = Registry::new();
        registry
            .add(map("a", "maps/first", &[('z', "from_a.png"), ('x', "x.png")]))
            .unwrap();
        registry
            .add(map("b", "second", &[('z', "from_b.png"), ('y', "y.png")]))
            .unwrap();
        registry
    }

    fn resolve(source: &str) -> Result<ImageTable, DirectiveError> {
        let doc = scan(source);
        let spec = parse_image_grid(&doc.directives[0])?;
        resolve_grid(&spec, &sample_registry(), &SourceTree::new("."))
    }

    #[test]
    fn test_first_listed_map_wins() {
        let table = resolve(".. image-grid:: a b\n\n   |z|\n").unwrap();
        assert_eq!(table.rows[0][0].map, "a");
        assert_eq!(table.rows[0][0].uri, "maps/from_a.png");

        let table = resolve(".. image-grid:: b a\n\n   |z|\n").unwrap();
        assert_eq!(table.rows[0][0].map, "b");
        assert_eq!(table.rows[0][0].uri, "from_b.png");
    }

    #[test]
    fn test_later_maps_fill_gaps() {
        let table = resolve(".. image-grid:: a b\n\n   |xy|\n   |yx|\n").unwrap();
        assert_eq!(table.columns, 2);
        let order: Vec<char> = table.cells().map(|c| c.ch).collect();
        assert_eq!(order, vec!['x', 'y', 'y', 'x']);
        assert_eq!(table.rows[0][1].uri, "y.png");
        assert_eq!(table.rows[1][1].uri, "maps/x.png");
    }

    #[test]
    fn test_unresolved_character_fails() {
        let source = ".. image-grid:: a b\n\n   |xq|\n";
        let err = resolve(source).unwrap_err();
        match err {
            DirectiveError::UnresolvedChar { ch, maps, span } => {
                assert_eq!(ch, 'q');
                assert_eq!(maps, vec!["a".to_string(), "b".to_string()]);
                assert_eq!(&source[span], "q");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_map_fails() {
        let err = resolve(".. image-grid:: a nope\n\n   |x|\n").unwrap_err();
        assert!(matches!(err, DirectiveError::UnknownMap { ref name, .. } if name == "nope"));
    }

    #[test]
    fn test_path_errors_are_reported() {
        let mut registry = Registry::new();
        registry
            .add(map("up", "index", &[('u', "../outside.png")]))
            .unwrap();
        let doc = scan(".. image-grid:: up\n\n   |u|\n");
        let spec = parse_image_grid(&doc.directives[0]).unwrap();
        let err = resolve_grid(&spec, &registry, &SourceTree::new(".")).unwrap_err();
        assert!(matches!(err, DirectiveError::Path { .. }));
    }
}
