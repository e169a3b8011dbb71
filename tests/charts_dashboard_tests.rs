use chrono::NaiveDate;
use report_factory::charts::{
    category_counts_chart, category_display_color, daily_counts_chart, hourly_histogram_chart,
    pickup_map_chart, top_locations_chart, ChartKind, DEFAULT_CATEGORY_COLOR,
    DEFAULT_MARKER_COLOR, RAINBOW_DISPLAY_COLOR,
};
use report_factory::dashboard::Dashboard;
use report_factory::reports::categorical::CategoryCount;
use report_factory::reports::spatial::LocationCluster;
use report_factory::reports::temporal::DailyCount;

fn sample_daily() -> Vec<DailyCount> {
    vec![
        DailyCount {
            date: NaiveDate::from_ymd_opt(2014, 9, 1).unwrap(),
            label: "September 1".to_string(),
            count: 3,
        },
        DailyCount {
            date: NaiveDate::from_ymd_opt(2014, 9, 2).unwrap(),
            label: "September 2".to_string(),
            count: 5,
        },
    ]
}

fn sample_categories() -> Vec<CategoryCount> {
    vec![
        CategoryCount {
            category: "Red".to_string(),
            count: 2,
        },
        CategoryCount {
            category: "Blue".to_string(),
            count: 1,
        },
        CategoryCount {
            category: "Rainbow".to_string(),
            count: 1,
        },
    ]
}

/// ------------------ Color Mapping Tests ------------------

#[test]
fn test_valid_color_names_map_to_lowercase() {
    assert_eq!(category_display_color("Red"), "red");
    assert_eq!(category_display_color("Blue"), "blue");
    assert_eq!(category_display_color("papayawhip"), "papayawhip");
}

#[test]
fn test_rainbow_maps_to_fixed_pastel() {
    assert_eq!(category_display_color("Rainbow"), RAINBOW_DISPLAY_COLOR);
    assert_eq!(category_display_color("Rainbow"), "papayawhip");
}

#[test]
fn test_unknown_names_fall_back_to_default() {
    assert_eq!(category_display_color("NotAColor"), DEFAULT_CATEGORY_COLOR);
    assert_eq!(category_display_color(""), DEFAULT_CATEGORY_COLOR);
}

/// ------------------ Chart Spec Tests ------------------

#[test]
fn test_hourly_histogram_chart_has_24_rows() {
    let mut counts = [0u64; 24];
    counts[9] = 2;
    counts[14] = 1;
    let spec = hourly_histogram_chart("Number of pickups by hour", &counts);

    assert_eq!(spec.kind, ChartKind::Histogram);
    assert_eq!(spec.data.len(), 24);
    let vega = spec.to_vega_lite();
    assert_eq!(vega["mark"]["type"], "bar");
    assert_eq!(vega["encoding"]["x"]["type"], "ordinal");
    assert_eq!(vega["encoding"]["y"]["field"], "pickup_count");
    assert_eq!(vega["data"]["values"][9]["pickup_count"], 2);
}

#[test]
fn test_daily_counts_chart_overlays_count_labels() {
    let spec = daily_counts_chart("Number of pickups per day", &sample_daily(), "#112233");
    assert_eq!(spec.marker_color.as_deref(), Some("#112233"));

    let vega = spec.to_vega_lite();
    let layers = vega["layer"].as_array().expect("labeled bar charts are layered");
    assert_eq!(layers.len(), 2);
    assert_eq!(layers[0]["mark"]["color"], "#112233");
    assert_eq!(layers[1]["mark"]["type"], "text");
    assert_eq!(layers[1]["encoding"]["text"]["field"], "pickup_count");
    assert_eq!(vega["data"]["values"][0]["date"], "September 1");
}

#[test]
fn test_top_locations_chart_uses_labels_when_provided() {
    let clusters = vec![
        LocationCluster {
            lat: 40.641,
            lon: -73.778,
            count: 4,
        },
        LocationCluster {
            lat: 40.777,
            lon: -73.874,
            count: 3,
        },
    ];
    let labels = ["JFK Terminal 4", "LaGuardia Airport"];
    let spec = top_locations_chart("Top pickups", &clusters, Some(&labels), DEFAULT_MARKER_COLOR);
    assert_eq!(spec.data[0]["location"], "JFK Terminal 4");

    // Without labels the rounded coordinates stand in.
    let spec = top_locations_chart("Top pickups", &clusters, None, DEFAULT_MARKER_COLOR);
    assert_eq!(spec.data[0]["location"], "40.641, -73.778");
}

#[test]
fn test_category_counts_chart_assigns_display_colors() {
    let spec = category_counts_chart("Most popular puffle colors", &sample_categories());
    assert_eq!(
        spec.color_scale,
        vec![
            ("Red".to_string(), "red".to_string()),
            ("Blue".to_string(), "blue".to_string()),
            ("Rainbow".to_string(), "papayawhip".to_string()),
        ]
    );

    let vega = spec.to_vega_lite();
    assert_eq!(vega["encoding"]["color"]["scale"]["domain"][2], "Rainbow");
    assert_eq!(vega["encoding"]["color"]["scale"]["range"][2], "papayawhip");
    assert_eq!(vega["encoding"]["color"]["legend"], serde_json::Value::Null);
}

#[test]
fn test_pickup_map_chart_is_quantitative_scatter() {
    let spec = pickup_map_chart("Map of all pickups at 17:00", &[(40.7, -74.0)]);
    assert_eq!(spec.kind, ChartKind::GeoScatter);

    let vega = spec.to_vega_lite();
    assert_eq!(vega["mark"]["type"], "circle");
    assert_eq!(vega["encoding"]["x"]["field"], "lon");
    assert_eq!(vega["encoding"]["x"]["type"], "quantitative");
    assert_eq!(vega["encoding"]["y"]["field"], "lat");
}

/// ------------------ Dashboard Tests ------------------

#[test]
fn test_dashboard_renders_sections_in_order() {
    let mut dash = Dashboard::new("Uber pickups in NYC!");
    dash.push_text("Loading data... Done!");
    dash.push_chart(hourly_histogram_chart("Pickups by hour", &[1u64; 24]));
    dash.push_heading("Supabase Integration");
    dash.push_table("Puffles", "| id | name |");

    let html = dash.render_html();
    assert!(html.contains("<h1>Uber pickups in NYC!</h1>"));
    assert!(html.contains("<p>Loading data... Done!</p>"));
    assert!(html.contains("id=\"chart-0\""));
    assert!(html.contains("vegaEmbed('#chart-0'"));
    assert!(html.contains("<h2>Supabase Integration</h2>"));
    assert!(html.contains("<pre>| id | name |</pre>"));

    let heading_pos = html.find("Supabase Integration").unwrap();
    let chart_pos = html.find("chart-0").unwrap();
    assert!(chart_pos < heading_pos);
}

#[test]
fn test_dashboard_escapes_markup() {
    let mut dash = Dashboard::new("<script>alert(1)</script>");
    dash.push_text("a < b & c > d");
    let html = dash.render_html();
    assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
    assert!(html.contains("a &lt; b &amp; c &gt; d"));
}
