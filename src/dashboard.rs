//! ## Dashboard Assembly
//!
//! A [`Dashboard`] is an ordered list of sections: headings, text, preformatted
//! tables, and charts. [`Dashboard::render_html`] writes it out as a single
//! self-contained HTML page in which every chart is a Vega-Lite specification handed
//! to vega-embed. A chart that fails to render shows its error inline in its own
//! container; the page and the process are unaffected.

use crate::charts::ChartSpec;
use crate::exceptions::ReportFactoryResult;
use arrow::util::pretty::pretty_format_batches;
use datafusion::prelude::DataFrame;

/// One block of the dashboard, rendered in order.
#[derive(Debug, Clone)]
pub enum Section {
    /// A top-level heading.
    Heading(String),
    /// A paragraph of plain text.
    Text(String),
    /// A monospace table with a subheading.
    Table { title: String, body: String },
    /// An embedded chart.
    Chart(ChartSpec),
}

/// An ordered collection of sections with a page title.
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub title: String,
    pub sections: Vec<Section>,
}

impl Dashboard {
    /// Creates an empty dashboard with the given page title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            sections: Vec::new(),
        }
    }

    /// Appends a heading section.
    pub fn push_heading(&mut self, text: impl Into<String>) {
        self.sections.push(Section::Heading(text.into()));
    }

    /// Appends a text section.
    pub fn push_text(&mut self, text: impl Into<String>) {
        self.sections.push(Section::Text(text.into()));
    }

    /// Appends a table section.
    pub fn push_table(&mut self, title: impl Into<String>, body: impl Into<String>) {
        self.sections.push(Section::Table {
            title: title.into(),
            body: body.into(),
        });
    }

    /// Appends a chart section.
    pub fn push_chart(&mut self, spec: ChartSpec) {
        self.sections.push(Section::Chart(spec));
    }

    /// Renders the dashboard as a self-contained HTML page.
    pub fn render_html(&self) -> String {
        let mut body = String::new();
        let mut embeds = String::new();
        let mut chart_index = 0usize;

        body.push_str(&format!("<h1>{}</h1>\n", escape_html(&self.title)));
        for section in &self.sections {
            match section {
                Section::Heading(text) => {
                    body.push_str(&format!("<h2>{}</h2>\n", escape_html(text)));
                }
                Section::Text(text) => {
                    body.push_str(&format!("<p>{}</p>\n", escape_html(text)));
                }
                Section::Table { title, body: table } => {
                    body.push_str(&format!(
                        "<h3>{}</h3>\n<pre>{}</pre>\n",
                        escape_html(title),
                        escape_html(table)
                    ));
                }
                Section::Chart(spec) => {
                    body.push_str(&format!(
                        "<h3>{}</h3>\n<div id=\"chart-{}\" class=\"chart\"></div>\n",
                        escape_html(&spec.title),
                        chart_index
                    ));
                    // vega-embed reports a failed spec inside the chart's own container.
                    embeds.push_str(&format!(
                        "vegaEmbed('#chart-{}', {}).catch(function(err) {{ document.getElementById('chart-{}').textContent = String(err); }});\n",
                        chart_index,
                        spec.to_vega_lite(),
                        chart_index
                    ));
                    chart_index += 1;
                }
            }
        }

        format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n\
             <script src=\"https://cdn.jsdelivr.net/npm/vega@5\"></script>\n\
             <script src=\"https://cdn.jsdelivr.net/npm/vega-lite@5\"></script>\n\
             <script src=\"https://cdn.jsdelivr.net/npm/vega-embed@6\"></script>\n\
             <style>\nbody {{ font-family: sans-serif; max-width: 960px; margin: 2rem auto; }}\n\
             .chart {{ width: 100%; }}\npre {{ overflow-x: auto; }}\n</style>\n</head>\n<body>\n{}\
             <script>\n{}</script>\n</body>\n</html>\n",
            escape_html(&self.title),
            body,
            embeds
        )
    }
}

/// Formats a frame's rows as a monospace table body for a [`Section::Table`].
pub async fn table_section_body(df: &DataFrame) -> ReportFactoryResult<String> {
    let batches = df.clone().collect().await?;
    Ok(pretty_format_batches(&batches)?.to_string())
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
