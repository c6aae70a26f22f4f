use serde::{Deserialize, Serialize};
use vademecum::connector::AngleMetric;
use vademecum::geometry::{GeoPoint, ScreenBox};
use vademecum::projection::{MapView, Projection, ViewSize};
use vademecum::{
    AtlasOptions, Config, Continent, MapStyle, PanelRect, SceneOptions, compute_scene,
    parse_atlas, place_connectors, render_svg,
};
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CountryRenderOptions {
    continent: Option<Continent>,
    style: Option<String>,
    font_family: Option<String>,
    font_size: Option<f32>,
    angle_metric: Option<AngleMetric>,
    focus: Option<bool>,
    crop: Option<bool>,
}

fn build_config(options: &CountryRenderOptions) -> Config {
    let mut config = Config::for_continent(options.continent.unwrap_or_default());
    if options.style.as_deref() == Some("contextual") {
        config.style = MapStyle::contextual();
    }
    if let Some(font_family) = &options.font_family {
        config.style.font_family = font_family.clone();
    }
    if let Some(font_size) = options.font_size {
        config.style.font_size = font_size;
    }
    if let Some(metric) = options.angle_metric {
        config.layout.angle_metric = metric;
    }
    if options.crop == Some(false) {
        config.export.crop = None;
    }
    config
}

fn parse_options<T: Default + for<'de> Deserialize<'de>>(raw: Option<String>) -> Result<T, JsValue> {
    match raw {
        Some(raw) => serde_json::from_str(&raw).map_err(|error| JsValue::from_str(&error.to_string())),
        None => Ok(T::default()),
    }
}

fn to_js(error: impl ToString) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn country_svg(geojson: &str, country: &str, options: CountryRenderOptions) -> Result<String, String> {
    let config = build_config(&options);
    let atlas = parse_atlas(geojson, &AtlasOptions::default()).map_err(|error| error.to_string())?;
    let scene_options = SceneOptions {
        highlight: Some(country.to_string()),
        focus: options.focus.unwrap_or(false),
    };
    let scene = compute_scene(&atlas, &config, &scene_options).map_err(|error| error.to_string())?;
    Ok(render_svg(&scene, &config.style, config.export.crop.as_ref()))
}

/// Renders `country` highlighted on the map of `geojson`.
#[wasm_bindgen]
pub fn render_country_svg(geojson: &str, country: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let options = parse_options::<CountryRenderOptions>(options_json)?;
    country_svg(geojson, country, options).map_err(to_js)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConnectorRequest {
    centroid: GeoPoint,
    center: GeoPoint,
    zoom: f64,
    width: f64,
    height: f64,
    panel: ScreenBox,
    #[serde(default)]
    corner_inset: f64,
    #[serde(default)]
    angle_metric: AngleMetric,
}

#[derive(Debug, Serialize)]
struct ConnectorResponse {
    lines: [[GeoPoint; 2]; 2],
}

fn connector_response(request: &ConnectorRequest) -> ConnectorResponse {
    let view = MapView::new(request.center, request.zoom, ViewSize::new(request.width, request.height));
    let panel = PanelRect::from_box(&request.panel).inset_vertical(request.corner_inset);
    let pair = place_connectors(view.to_screen(request.centroid), &panel, &view, request.angle_metric);
    ConnectorResponse {
        lines: pair.segments().map(|segment| [segment.from, segment.to]),
    }
}

/// Connector polylines for a map widget, as `{"lines": [[from, to], [from, to]]}`
/// with `{lat, lng}` points.
#[wasm_bindgen]
pub fn connector_lat_lngs(request_json: &str) -> Result<String, JsValue> {
    let request: ConnectorRequest = serde_json::from_str(request_json).map_err(to_js)?;
    serde_json::to_string(&connector_response(&request)).map_err(to_js)
}
