//! ## Chart Specifications
//!
//! This module maps aggregated summaries onto chart specifications: axis bindings,
//! color assignment, and text-label overlays. A [`ChartSpec`] is renderer-agnostic
//! data; [`ChartSpec::to_vega_lite`] serializes it as a Vega-Lite v5 JSON document
//! with the data inlined, ready for vega-embed.
//!
//! Categorical color assignment is a total function: a category names its own display
//! color by lower-casing itself when that is a valid CSS color, with "Rainbow" mapped
//! to a fixed pastel instead of the literal string, and everything else falling back
//! to a default color.

use crate::reports::categorical::CategoryCount;
use crate::reports::spatial::LocationCluster;
use crate::reports::temporal::DailyCount;
use serde_json::{json, Value};

/// Marker color used when a chart has no per-category assignment.
pub const DEFAULT_MARKER_COLOR: &str = "#83c9ff";

/// Fallback for category names that are not valid CSS colors.
pub const DEFAULT_CATEGORY_COLOR: &str = "steelblue";

/// The one category whose display color is not its own lowercased name.
pub const RAINBOW_CATEGORY: &str = "Rainbow";

/// Display color assigned to [`RAINBOW_CATEGORY`].
pub const RAINBOW_DISPLAY_COLOR: &str = "papayawhip";

/// Maps a category name to its display color.
///
/// Total: "Rainbow" maps to [`RAINBOW_DISPLAY_COLOR`], any name whose lowercase form
/// is a valid CSS color maps to that form, and everything else maps to
/// [`DEFAULT_CATEGORY_COLOR`].
pub fn category_display_color(name: &str) -> String {
    if name == RAINBOW_CATEGORY {
        return RAINBOW_DISPLAY_COLOR.to_string();
    }
    let lowered = name.to_lowercase();
    if csscolorparser::parse(&lowered).is_ok() {
        lowered
    } else {
        DEFAULT_CATEGORY_COLOR.to_string()
    }
}

/// The kinds of chart the presentation layer knows how to describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    /// Vertical bars over a labeled axis.
    Bar,
    /// Vertical bars over an ordered bucket axis.
    Histogram,
    /// Points positioned by longitude/latitude.
    GeoScatter,
}

/// A renderer-agnostic chart description with inline data.
#[derive(Debug, Clone)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    /// Field bound to the x axis.
    pub x_field: String,
    /// Field bound to the y axis.
    pub y_field: String,
    /// Optional x-axis title overriding the field name.
    pub x_title: Option<String>,
    /// Optional y-axis title overriding the field name.
    pub y_title: Option<String>,
    /// Inline data rows, one JSON object per mark.
    pub data: Vec<Value>,
    /// Single marker color, used when no per-category assignment applies.
    pub marker_color: Option<String>,
    /// Field whose values select per-mark colors.
    pub color_field: Option<String>,
    /// (category, color) pairs forming the color scale's domain and range.
    pub color_scale: Vec<(String, String)>,
    /// Field rendered as a text overlay on each mark.
    pub text_field: Option<String>,
}

impl ChartSpec {
    fn new(kind: ChartKind, title: impl Into<String>, x_field: &str, y_field: &str) -> Self {
        Self {
            kind,
            title: title.into(),
            x_field: x_field.to_string(),
            y_field: y_field.to_string(),
            x_title: None,
            y_title: None,
            data: Vec::new(),
            marker_color: None,
            color_field: None,
            color_scale: Vec::new(),
            text_field: None,
        }
    }

    fn mark_type(&self) -> &'static str {
        match self.kind {
            ChartKind::Bar | ChartKind::Histogram => "bar",
            ChartKind::GeoScatter => "circle",
        }
    }

    fn x_type(&self) -> &'static str {
        match self.kind {
            ChartKind::Histogram => "ordinal",
            ChartKind::Bar => "nominal",
            ChartKind::GeoScatter => "quantitative",
        }
    }

    /// Renders the specification as a Vega-Lite v5 JSON document.
    pub fn to_vega_lite(&self) -> Value {
        let mut x_enc = json!({ "field": self.x_field, "type": self.x_type() });
        if let Some(title) = &self.x_title {
            x_enc["title"] = json!(title);
        }
        if self.kind == ChartKind::Bar {
            // Preserve the data order instead of Vega-Lite's alphabetical default.
            x_enc["sort"] = json!(null);
        }
        let mut y_enc = json!({ "field": self.y_field, "type": "quantitative" });
        if let Some(title) = &self.y_title {
            y_enc["title"] = json!(title);
        }

        let mut mark = json!({ "type": self.mark_type() });
        let mut encoding = json!({ "x": x_enc, "y": y_enc });

        if let Some(color_field) = &self.color_field {
            let domain: Vec<&str> = self.color_scale.iter().map(|(c, _)| c.as_str()).collect();
            let range: Vec<&str> = self.color_scale.iter().map(|(_, c)| c.as_str()).collect();
            encoding["color"] = json!({
                "field": color_field,
                "type": "nominal",
                "scale": { "domain": domain, "range": range },
                "legend": null,
            });
        } else if let Some(color) = &self.marker_color {
            mark["color"] = json!(color);
        }

        let body = match &self.text_field {
            Some(text_field) => {
                let text_encoding = json!({
                    "x": encoding["x"],
                    "y": encoding["y"],
                    "text": { "field": text_field, "type": "quantitative" },
                });
                json!({
                    "layer": [
                        { "mark": mark, "encoding": encoding },
                        { "mark": { "type": "text", "dy": -6 }, "encoding": text_encoding },
                    ],
                })
            }
            None => json!({ "mark": mark, "encoding": encoding }),
        };

        let mut spec = json!({
            "$schema": "https://vega.github.io/schema/vega-lite/v5.json",
            "title": self.title,
            "width": "container",
            "data": { "values": self.data },
        });
        if let Value::Object(map) = body {
            for (key, value) in map {
                spec[key] = value;
            }
        }
        spec
    }
}

/// Chart of counts per hour-of-day.
pub fn hourly_histogram_chart(title: impl Into<String>, counts: &[u64]) -> ChartSpec {
    let mut spec = ChartSpec::new(ChartKind::Histogram, title, "hour", "pickup_count");
    spec.marker_color = Some(DEFAULT_MARKER_COLOR.to_string());
    spec.data = counts
        .iter()
        .enumerate()
        .map(|(hour, count)| json!({ "hour": hour, "pickup_count": count }))
        .collect();
    spec
}

/// Bar chart of counts per calendar date, labeled with the count.
pub fn daily_counts_chart(
    title: impl Into<String>,
    rows: &[DailyCount],
    marker_color: &str,
) -> ChartSpec {
    let mut spec = ChartSpec::new(ChartKind::Bar, title, "date", "pickup_count");
    spec.marker_color = Some(marker_color.to_string());
    spec.text_field = Some("pickup_count".to_string());
    spec.data = rows
        .iter()
        .map(|row| json!({ "date": row.label, "pickup_count": row.count }))
        .collect();
    spec
}

/// Bar chart of the most populated coordinate clusters, labeled with the count.
///
/// When `labels` provides one name per cluster, clusters are shown under those names;
/// otherwise the rounded coordinate pair is used as the label.
pub fn top_locations_chart(
    title: impl Into<String>,
    clusters: &[LocationCluster],
    labels: Option<&[&str]>,
    marker_color: &str,
) -> ChartSpec {
    let mut spec = ChartSpec::new(ChartKind::Bar, title, "location", "pickup_count");
    spec.marker_color = Some(marker_color.to_string());
    spec.text_field = Some("pickup_count".to_string());
    spec.data = clusters
        .iter()
        .enumerate()
        .map(|(i, cluster)| {
            let location = match labels {
                Some(names) if names.len() == clusters.len() => names[i].to_string(),
                _ => format!("{:.3}, {:.3}", cluster.lat, cluster.lon),
            };
            json!({ "location": location, "pickup_count": cluster.count })
        })
        .collect();
    spec
}

/// Bar chart ranking categories by count, one display color per category.
pub fn category_counts_chart(title: impl Into<String>, rows: &[CategoryCount]) -> ChartSpec {
    let mut spec = ChartSpec::new(ChartKind::Bar, title, "category", "count");
    spec.color_field = Some("category".to_string());
    spec.color_scale = rows
        .iter()
        .map(|row| (row.category.clone(), category_display_color(&row.category)))
        .collect();
    spec.data = rows
        .iter()
        .map(|row| json!({ "category": row.category, "count": row.count }))
        .collect();
    spec
}

/// Scatter chart of coordinate pairs.
pub fn pickup_map_chart(title: impl Into<String>, points: &[(f64, f64)]) -> ChartSpec {
    let mut spec = ChartSpec::new(ChartKind::GeoScatter, title, "lon", "lat");
    spec.marker_color = Some(DEFAULT_MARKER_COLOR.to_string());
    spec.data = points
        .iter()
        .map(|(lat, lon)| json!({ "lat": lat, "lon": lon }))
        .collect();
    spec
}
