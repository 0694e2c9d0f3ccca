//! HTML output for grids and math blocks

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::gridmap::{ImageCell, ImageTable};
use crate::math::{MathBlock, Title};

use super::{HtmlConfig, WriteError, Writer};

pub struct HtmlWriter {
    config: HtmlConfig,
}

impl HtmlWriter {
    pub fn new(config: HtmlConfig) -> Self {
        Self { config }
    }

    fn image_src(&self, cell: &ImageCell) -> Result<String, WriteError> {
        let Some(root) = &self.config.embed_root else {
            return Ok(escape_html(&cell.uri));
        };
        let path = root.join(&cell.uri);
        let bytes = std::fs::read(&path).map_err(|source| WriteError::ImageRead {
            path: path.clone(),
            source,
        })?;
        Ok(format!(
            "data:{};base64,{}",
            mime_type(&cell.uri),
            STANDARD.encode(bytes)
        ))
    }

    fn title(&self, title: &Title) -> String {
        let text = match title {
            Title::Text(text) => escape_html(text),
            Title::Math(latex) => format!(r"\({}\)", escape_html(latex)),
        };
        format!(
            r#"<p><span class="{}">{}</span></p>"#,
            escape_html(&self.config.title_class),
            text
        )
    }
}

impl Writer for HtmlWriter {
    fn write_table(&self, table: &ImageTable) -> Result<String, WriteError> {
        let mut lines = vec![
            format!(
                r#"<table class="{}">"#,
                escape_html(&self.config.table_classes.join(" "))
            ),
            "<colgroup>".to_string(),
        ];
        lines.extend(std::iter::repeat("<col>".to_string()).take(table.columns));
        lines.push("</colgroup>".to_string());
        lines.push("<tbody>".to_string());

        for row in &table.rows {
            lines.push("<tr>".to_string());
            for cell in row {
                lines.push(format!(
                    r#"<td><img src="{}" alt="{}" class="{}" style="height: {}; vertical-align: middle"></td>"#,
                    self.image_src(cell)?,
                    escape_html(&cell.ch.to_string()),
                    escape_html(&self.config.image_class),
                    escape_html(&self.config.row_height),
                ));
            }
            lines.push("</tr>".to_string());
        }

        lines.push("</tbody>".to_string());
        lines.push("</table>".to_string());
        Ok(lines.join("\n"))
    }

    fn write_math(&self, math: &MathBlock) -> String {
        let mut lines = vec![r#"<div class="math-block">"#.to_string()];
        if let Some(title) = &math.title {
            lines.push(self.title(title));
        }
        lines.push(format!(
            r#"<div class="math">\[{}\]</div>"#,
            escape_html(&math.latex)
        ));
        lines.push("</div>".to_string());
        lines.join("\n")
    }
}

/// MIME type guessed from the file extension
fn mime_type(uri: &str) -> &'static str {
    let ext = uri
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

/// Escape special HTML characters
fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn table() -> ImageTable {
        let cell = |ch: char, uri: &str| ImageCell {
            ch,
            map: "base".to_string(),
            uri: uri.to_string(),
        };
        ImageTable {
            columns: 2,
            rows: vec![
                vec![cell('a', "a.png"), cell('b', "b.png")],
                vec![cell('<', "lt.png"), cell('d', "d.png")],
            ],
        }
    }

    #[test]
    fn test_write_table() {
        let html = HtmlWriter::new(HtmlConfig::default())
            .write_table(&table())
            .unwrap();
        insta::assert_snapshot!(html, @r#"
        <table class="longtable borderless">
        <colgroup>
        <col>
        <col>
        </colgroup>
        <tbody>
        <tr>
        <td><img src="a.png" alt="a" class="image-grid" style="height: 3em; vertical-align: middle"></td>
        <td><img src="b.png" alt="b" class="image-grid" style="height: 3em; vertical-align: middle"></td>
        </tr>
        <tr>
        <td><img src="lt.png" alt="&lt;" class="image-grid" style="height: 3em; vertical-align: middle"></td>
        <td><img src="d.png" alt="d" class="image-grid" style="height: 3em; vertical-align: middle"></td>
        </tr>
        </tbody>
        </table>
        "#);
    }

    #[test]
    fn test_row_height_applies_to_every_image() {
        let html = HtmlWriter::new(HtmlConfig::new().with_row_height("20px"))
            .write_table(&table())
            .unwrap();
        assert_eq!(html.matches("height: 20px").count(), 4);
    }

    #[test]
    fn test_embedded_images() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = std::fs::File::create(dir.path().join("a.png")).unwrap();
        file.write_all(b"png!").unwrap();

        let table = ImageTable {
            columns: 1,
            rows: vec![vec![ImageCell {
                ch: 'a',
                map: "base".to_string(),
                uri: "a.png".to_string(),
            }]],
        };
        let html = HtmlWriter::new(HtmlConfig::new().with_embedded_images(dir.path()))
            .write_table(&table)
            .unwrap();
        assert!(html.contains(r#"src="data:image/png;base64,cG5nIQ==""#));
    }

    #[test]
    fn test_missing_embedded_image() {
        let dir = tempfile::tempdir().unwrap();
        let err = HtmlWriter::new(HtmlConfig::new().with_embedded_images(dir.path()))
            .write_table(&table())
            .unwrap_err();
        assert!(matches!(err, WriteError::ImageRead { .. }));
    }

    #[test]
    fn test_write_math() {
        let math = MathBlock {
            title: Some(Title::Text("weak".to_string())),
            latex: r"a < b".to_string(),
        };
        let html = HtmlWriter::new(HtmlConfig::default()).write_math(&math);
        insta::assert_snapshot!(html, @r#"
        <div class="math-block">
        <p><span class="inference-title">weak</span></p>
        <div class="math">\[a &lt; b\]</div>
        </div>
        "#);
    }

    #[test]
    fn test_title_class_is_escaped() {
        let math = MathBlock {
            title: Some(Title::Text("cut".to_string())),
            latex: "A".to_string(),
        };
        let config = HtmlConfig::new().with_title_class(r#"rule" onclick="x"#);
        let html = HtmlWriter::new(config).write_math(&math);
        assert!(html.contains(r#"<span class="rule&quot; onclick=&quot;x">cut</span>"#));
    }

    #[test]
    fn test_mime_type() {
        assert_eq!(mime_type("x/Tile.PNG"), "image/png");
        assert_eq!(mime_type("a.svg"), "image/svg+xml");
        assert_eq!(mime_type("noext"), "application/octet-stream");
    }
}
