use std::{fmt::Write as _, fs, path::Path};

use tracing::info;

use crate::{
    embedding::Embedding,
    error::{Error, Result},
    store::CorpusStore,
};

const WIDTH: f64 = 800.0;
const HEIGHT: f64 = 600.0;
const MARGIN: f64 = 60.0;

/// Labelled 2-D scatter plot of an embedding.
///
/// Point `i` is the embedding row `i` and carries the label stored for
/// corpus position `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPlot {
    pub points: Vec<(String, [f64; 2])>,
}

impl ScatterPlot {
    /// # Arguments
    /// * `embedding` - one row per stored document
    /// * `store` - source of the point labels
    ///
    /// # Errors
    /// [`Error::StoreInconsistent`] when the row count and the store size
    /// differ
    pub fn new(embedding: &Embedding, store: &CorpusStore) -> Result<Self> {
        if embedding.len() != store.len() {
            return Err(Error::StoreInconsistent {
                reason: format!("{} embedded rows for {} stored documents", embedding.len(), store.len()),
            });
        }
        let points = embedding
            .coords
            .iter()
            .enumerate()
            .map(|(idx, coord)| {
                let label = store.label(idx).ok_or_else(|| Error::StoreInconsistent {
                    reason: format!("no label for document {idx}"),
                })?;
                Ok((label.to_owned(), *coord))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { points })
    }

    /// Coordinates as an aligned text table
    pub fn render_table(&self) -> String {
        let width = self.points.iter().map(|(label, _)| label.chars().count()).max().unwrap_or(0).max(5);
        let mut out = String::new();
        let _ = writeln!(out, "{:>4}  {:<width$}  {:>10}  {:>10}", "#", "label", "x", "y");
        for (idx, (label, [x, y])) in self.points.iter().enumerate() {
            let _ = writeln!(out, "{idx:>4}  {label:<width$}  {x:>10.6}  {y:>10.6}");
        }
        out
    }

    /// Standalone SVG document with one annotated circle per point
    pub fn to_svg(&self) -> String {
        let (min_x, max_x) = bounds(self.points.iter().map(|(_, c)| c[0]));
        let (min_y, max_y) = bounds(self.points.iter().map(|(_, c)| c[1]));
        let span_x = (max_x - min_x).max(f64::EPSILON);
        let span_y = (max_y - min_y).max(f64::EPSILON);
        let plot_w = WIDTH - 2.0 * MARGIN;
        let plot_h = HEIGHT - 2.0 * MARGIN;

        let mut svg = String::new();
        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{HEIGHT}" viewBox="0 0 {WIDTH} {HEIGHT}">"#
        );
        let _ = writeln!(svg, r#"  <rect width="100%" height="100%" fill="white"/>"#);
        for (label, [x, y]) in &self.points {
            // single points and flat axes sit in the middle
            let px = if max_x > min_x { MARGIN + (x - min_x) / span_x * plot_w } else { WIDTH / 2.0 };
            let py = if max_y > min_y { HEIGHT - MARGIN - (y - min_y) / span_y * plot_h } else { HEIGHT / 2.0 };
            let _ = writeln!(svg, r#"  <circle cx="{px:.2}" cy="{py:.2}" r="4" fill="steelblue"/>"#);
            let _ = writeln!(
                svg,
                r#"  <text x="{:.2}" y="{:.2}" font-family="sans-serif" font-size="12">{}</text>"#,
                px + 6.0,
                py - 6.0,
                escape_xml(label)
            );
        }
        svg.push_str("</svg>\n");
        svg
    }

    pub fn write_svg<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path.as_ref(), self.to_svg())?;
        info!(path = %path.as_ref().display(), points = self.points.len(), "scatter plot written");
        Ok(())
    }
}

fn bounds<I: Iterator<Item = f64>>(values: I) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)))
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::clean;

    fn store(titles: &[&str]) -> CorpusStore {
        titles.iter().enumerate().fold(CorpusStore::new(), |store, (i, title)| {
            store.append_if_new(clean(&format!("document {i}{title}")), *title).0
        })
    }

    fn embedding(coords: Vec<[f64; 2]>) -> Embedding {
        Embedding { coords, eigenvalues: [1.0, 0.5] }
    }

    #[test]
    fn labels_follow_positions() {
        let plot = ScatterPlot::new(&embedding(vec![[0.0, 1.0], [2.0, -1.0]]), &store(&["Moby Dick", "Emma"])).unwrap();
        assert_eq!(plot.points[0], ("Moby Dick".to_string(), [0.0, 1.0]));
        assert_eq!(plot.points[1].0, "Emma");
        let table = plot.render_table();
        assert!(table.contains("Moby Dick"));
        assert_eq!(table.lines().count(), 3);
    }

    #[test]
    fn row_count_must_match_store() {
        let err = ScatterPlot::new(&embedding(vec![[0.0, 0.0]]), &store(&["a", "b"])).unwrap_err();
        assert!(matches!(err, Error::StoreInconsistent { .. }));
    }

    #[test]
    fn svg_has_a_point_per_document_and_escapes_labels() {
        let plot = ScatterPlot::new(
            &embedding(vec![[0.0, 0.0], [1.0, 1.0], [0.5, 0.2]]),
            &store(&["War & Peace", "<Emma>", "Ulysses"]),
        )
        .unwrap();
        let svg = plot.to_svg();
        assert!(svg.starts_with("<svg"));
        assert_eq!(svg.matches("<circle").count(), 3);
        assert!(svg.contains("War &amp; Peace"));
        assert!(svg.contains("&lt;Emma&gt;"));
        assert!(!svg.contains("NaN"));
    }

    #[test]
    fn single_point_is_centred() {
        let plot = ScatterPlot::new(&embedding(vec![[0.0, 0.0]]), &store(&["solo"])).unwrap();
        assert!(plot.to_svg().contains(r#"cx="400.00" cy="300.00""#));
    }

    #[test]
    fn write_svg_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plot.svg");
        let plot = ScatterPlot::new(&embedding(vec![[0.0, 0.0]]), &store(&["solo"])).unwrap();
        plot.write_svg(&path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), plot.to_svg());
    }
}
