//! LaTeX output for grids and math blocks

use crate::gridmap::ImageTable;
use crate::math::{MathBlock, Title};

use super::{LatexConfig, WriteError, Writer};

pub struct LatexWriter {
    config: LatexConfig,
}

impl LatexWriter {
    pub fn new(config: LatexConfig) -> Self {
        Self { config }
    }
}

impl Writer for LatexWriter {
    fn write_table(&self, table: &ImageTable) -> Result<String, WriteError> {
        let env = &self.config.environment;
        let spec = vec!["@{}l@{}"; table.columns].join(" ");
        let mut lines = vec![format!(r"\begin{{{}}}{{{}}}", env, spec)];
        for row in &table.rows {
            // Lower each image by the strut depth so it sits on the baseline
            let cells: Vec<String> = row
                .iter()
                .map(|cell| {
                    format!(
                        r"\raisebox{{-\dp\strutbox}}{{\includegraphics[height={}]{{{}}}}}",
                        self.config.row_height,
                        escape_path(&cell.uri)
                    )
                })
                .collect();
            lines.push(format!(r"{}\\", cells.join("&")));
        }
        lines.push(format!(r"\end{{{}}}", env));
        Ok(lines.join("\n"))
    }

    fn write_math(&self, math: &MathBlock) -> String {
        let mut lines = Vec::new();
        match &math.title {
            Some(Title::Text(text)) => lines.push(format!(r"\par\noindent\textbf{{{}}}", escape_latex(text))),
            Some(Title::Math(latex)) => lines.push(format!(r"\par\noindent\({}\)", latex)),
            None => {}
        }
        lines.push(r"\[".to_string());
        lines.push(math.latex.clone());
        lines.push(r"\]".to_string());
        lines.join("\n")
    }
}

/// Protect a file name inside `\includegraphics{...}`
///
/// TeX would read `#`, `%` and friends as markup. They are written with
/// `\string`, or with the kernel's `\@...char` macros where `\string` can
/// not be used (a comment character, or a brace inside the argument), so
/// the graphics driver sees the file name unchanged.
fn escape_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for c in path.chars() {
        match c {
            '#' | '&' | '_' | '~' | '^' | '$' => {
                out.push_str(r"\string");
                out.push(c);
            }
            '%' => out.push_str(r"\csname @percentchar\endcsname "),
            '{' => out.push_str(r"\csname @charlb\endcsname "),
            '}' => out.push_str(r"\csname @charrb\endcsname "),
            '\\' => out.push_str(r"\csname @backslashchar\endcsname "),
            _ => out.push(c),
        }
    }
    out
}

/// Escape characters with special meaning in LaTeX text mode
fn escape_latex(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str(r"\textbackslash{}"),
            '~' => out.push_str(r"\textasciitilde{}"),
            '^' => out.push_str(r"\textasciicircum{}"),
            '&' | '%' | '$' | '#' | '_' | '{' | '}' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}
