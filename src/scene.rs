use tracing::debug;

use crate::atlas::{Atlas, Country};
use crate::config::Config;
use crate::connector::{ConnectorPair, place_connectors};
use crate::error::{Error, Result};
use crate::geometry::{GeoPoint, PanelRect, ScreenBox, ScreenPoint};
use crate::placement::place_panel;
use crate::projection::{MapView, Projection, ViewSize};
use crate::text_metrics::label_width;

#[derive(Debug, Clone, Default)]
pub struct SceneOptions {
    pub highlight: Option<String>,
    pub focus: bool,
}

impl SceneOptions {
    pub fn highlight(name: impl Into<String>) -> Self {
        Self {
            highlight: Some(name.into()),
            focus: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CountryShape {
    pub index: usize,
    pub name: String,
    pub highlighted: bool,
    pub rings: Vec<Vec<ScreenPoint>>,
}

#[derive(Debug, Clone)]
pub struct Tooltip {
    pub text: String,
    pub anchor: ScreenPoint,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScaleBar {
    pub meters: f64,
    pub width: f64,
    pub label: String,
}

#[derive(Debug, Clone)]
pub struct Minimap {
    pub panel: ScreenBox,
    pub view: MapView,
    /// Every country in panel-local coordinates, the highlighted one marked.
    pub shapes: Vec<CountryShape>,
    pub tooltip: Tooltip,
    pub scale: Option<ScaleBar>,
}

#[derive(Debug, Clone)]
pub struct Highlight {
    pub index: usize,
    pub name: String,
    pub code: String,
    pub centroid: GeoPoint,
    pub minimap_zoom: f64,
    pub minimap: Option<Minimap>,
    pub connectors: Option<ConnectorPair>,
}

#[derive(Debug, Clone)]
pub struct Scene {
    pub size: ViewSize,
    pub main: MapView,
    pub shapes: Vec<CountryShape>,
    pub highlight: Option<Highlight>,
}

impl Scene {
    pub fn minimap(&self) -> Option<&Minimap> {
        self.highlight.as_ref()?.minimap.as_ref()
    }

    pub fn connectors(&self) -> Option<&ConnectorPair> {
        self.highlight.as_ref()?.connectors.as_ref()
    }
}

pub fn compute_scene(atlas: &Atlas, config: &Config, options: &SceneOptions) -> Result<Scene> {
    let index = match options.highlight.as_deref() {
        Some(query) => Some(
            atlas
                .index_of(query)
                .ok_or_else(|| Error::UnknownCountry(query.to_string()))?,
        ),
        None => None,
    };
    Ok(compute_scene_at(atlas, config, index, options.focus))
}

/// Scene with the country at `index` highlighted. Out-of-range indices
/// highlight nothing.
pub fn compute_scene_at(atlas: &Atlas, config: &Config, index: Option<usize>, focus: bool) -> Scene {
    let layout = &config.layout;
    let size = ViewSize::new(config.render.width as f64, config.render.height as f64);
    let highlighted = index.and_then(|index| atlas.countries.get(index).map(|country| (index, country)));

    let main = match highlighted {
        Some((_, country)) if focus => {
            MapView::fit_bounds(&country.bounds, size, layout.focus_padding, &layout.zoom)
        }
        _ => MapView::fit_bounds(&atlas.bounds, size, 0.0, &layout.zoom)
            .set_zoom(layout.main_zoom, &layout.zoom),
    };

    let highlighted_index = highlighted.map(|(index, _)| index);
    let shapes = atlas
        .countries
        .iter()
        .enumerate()
        .map(|(index, country)| {
            project_country(index, country, Some(index) == highlighted_index, &main)
        })
        .collect();

    let highlight =
        highlighted.map(|(index, country)| highlight_country(atlas, index, country, &main, config));

    Scene {
        size,
        main,
        shapes,
        highlight,
    }
}

fn highlight_country(
    atlas: &Atlas,
    index: usize,
    country: &Country,
    main: &MapView,
    config: &Config,
) -> Highlight {
    let layout = &config.layout;
    let centroid = country.bounds.center();

    let avoid = main.screen_box(&country.bounds);
    let panel = place_panel(&layout.panel_candidates, layout.panel, &avoid);
    let panel_size = ViewSize::new(panel.width, panel.height);
    let view = MapView::fit_bounds(&country.bounds, panel_size, layout.minimap_padding, &layout.zoom);

    let mut highlight = Highlight {
        index,
        name: country.name.clone(),
        code: country.code.clone(),
        centroid,
        minimap_zoom: view.zoom,
        minimap: None,
        connectors: None,
    };

    if view.zoom <= layout.minimap_zoom_threshold {
        debug!(country = %country.name, zoom = view.zoom, "minimap hidden");
        return highlight;
    }

    let corners = PanelRect::from_box(&panel).inset_vertical(layout.corner_inset);
    let connectors = place_connectors(main.to_screen(centroid), &corners, main, layout.angle_metric);
    debug!(
        country = %country.name,
        zoom = view.zoom,
        primary = ?connectors.primary.tag,
        secondary = ?connectors.secondary.tag,
        "minimap shown"
    );

    let font_size = config.style.font_size;
    let text_width = label_width(&country.name, font_size, &config.style.font_family) as f64;
    let tooltip = Tooltip {
        text: country.name.clone(),
        anchor: view.to_screen(view.north_center()),
        width: text_width + 2.0 * layout.tooltip_padding_x,
        height: font_size as f64 * 1.2 + 2.0 * layout.tooltip_padding_y,
    };

    highlight.minimap = Some(Minimap {
        panel,
        view,
        shapes: atlas
            .countries
            .iter()
            .enumerate()
            .map(|(other, shape)| project_country(other, shape, other == index, &view))
            .collect(),
        tooltip,
        scale: scale_bar(&view, layout.scale_max_width),
    });
    highlight.connectors = Some(connectors);
    highlight
}

fn project_country(
    index: usize,
    country: &Country,
    highlighted: bool,
    view: &MapView,
) -> CountryShape {
    let rings = country
        .polygons
        .iter()
        .flatten()
        .map(|ring| ring.iter().map(|point| view.to_screen(*point)).collect::<Vec<_>>())
        .collect();
    CountryShape {
        index,
        name: country.name.clone(),
        highlighted,
        rings,
    }
}

/// Metric scale bar for the horizontal line through the middle of `view`,
/// at most `max_width` pixels long.
pub fn scale_bar(view: &MapView, max_width: f64) -> Option<ScaleBar> {
    if max_width <= 0.0 {
        return None;
    }
    let y = view.size.height / 2.0;
    let left = view.to_geo(ScreenPoint::new(0.0, y));
    let right = view.to_geo(ScreenPoint::new(max_width, y));
    let max_meters = left.distance_to(right);
    if !(max_meters.is_finite() && max_meters > 0.0) {
        return None;
    }
    let meters = round_scale(max_meters);
    let label = if meters < 1000.0 {
        format!("{meters} m")
    } else {
        format!("{} km", meters / 1000.0)
    };
    Some(ScaleBar {
        meters,
        width: (max_width * meters / max_meters).round(),
        label,
    })
}

fn round_scale(value: f64) -> f64 {
    let pow10 = 10f64.powi(value.log10().floor() as i32);
    let d = value / pow10;
    let step = if d >= 10.0 {
        10.0
    } else if d >= 5.0 {
        5.0
    } else if d >= 3.0 {
        3.0
    } else if d >= 2.0 {
        2.0
    } else {
        1.0
    };
    pow10 * step
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::{AtlasOptions, parse_atlas};
    use crate::geometry::Corner;

    fn square(name: &str, code: &str, west: f64, south: f64, size: f64) -> String {
        let (e, n) = (west + size, south + size);
        format!(
            r#"{{"type":"Feature","properties":{{"name_it":"{name}","iso_a2":"{code}"}},
               "geometry":{{"type":"Polygon","coordinates":[[[{west},{south}],[{e},{south}],[{e},{n}],[{west},{n}],[{west},{south}]]]}}}}"#
        )
    }

    fn atlas() -> Atlas {
        let features = [
            square("Grande", "GR", -80.0, -50.0, 40.0),
            square("Piccolo", "PI", -60.0, 10.0, 2.0),
            square("Isola", "IS", -20.0, 0.0, 0.5),
        ];
        let input = format!(r#"{{"type":"FeatureCollection","features":[{}]}}"#, features.join(","));
        parse_atlas(&input, &AtlasOptions::default()).unwrap()
    }

    #[test]
    fn base_map_has_no_highlight() {
        let config = Config::default();
        let scene = compute_scene(&atlas(), &config, &SceneOptions::default()).unwrap();
        assert_eq!(scene.shapes.len(), 3);
        assert!(scene.shapes.iter().all(|shape| !shape.highlighted));
        assert!(scene.highlight.is_none());
        assert_eq!(scene.main.zoom, 2.25);
    }

    #[test]
    fn large_country_hides_minimap() {
        let config = Config::default();
        let scene = compute_scene(&atlas(), &config, &SceneOptions::highlight("Grande")).unwrap();
        let highlight = scene.highlight.as_ref().unwrap();
        assert!(highlight.minimap_zoom <= config.layout.minimap_zoom_threshold);
        assert!(scene.minimap().is_none());
        assert!(scene.connectors().is_none());
        assert!(scene.shapes[0].highlighted);
    }

    #[test]
    fn small_country_gets_minimap_and_connectors() {
        let config = Config::default();
        let scene = compute_scene(&atlas(), &config, &SceneOptions::highlight("PI")).unwrap();
        let minimap = scene.minimap().expect("minimap");
        assert!(minimap.view.zoom > config.layout.minimap_zoom_threshold);
        assert_eq!(minimap.tooltip.text, "Piccolo");
        assert_eq!(minimap.shapes.len(), 3);
        let marked: Vec<&str> = minimap
            .shapes
            .iter()
            .filter(|shape| shape.highlighted)
            .map(|shape| shape.name.as_str())
            .collect();
        assert_eq!(marked, ["Piccolo"]);
        assert!((minimap.tooltip.anchor.x - minimap.panel.width / 2.0).abs() < 1e-6);
        assert!(minimap.tooltip.anchor.y.abs() < 1e-6);

        let connectors = scene.connectors().expect("connectors");
        assert_ne!(connectors.primary.tag, connectors.secondary.tag);
        let centroid = scene.main.to_screen(GeoPoint::new(11.0, -59.0));
        assert!((connectors.centroid.x - centroid.x).abs() < 1e-6);
        // the country sits left of every panel candidate
        assert!(matches!(connectors.primary.tag, Corner::TopLeft | Corner::BottomLeft));
    }

    #[test]
    fn focus_frames_the_country() {
        let config = Config::default();
        let options = SceneOptions {
            highlight: Some("Piccolo".to_string()),
            focus: true,
        };
        let scene = compute_scene(&atlas(), &config, &options).unwrap();
        assert!(scene.main.zoom > 2.25);
        let b = scene.main.screen_box(&atlas().countries[1].bounds);
        assert!(b.x >= config.layout.focus_padding - 1e-6);
    }

    #[test]
    fn unknown_country_is_an_error() {
        let result = compute_scene(&atlas(), &Config::default(), &SceneOptions::highlight("Atlantide"));
        assert!(matches!(result, Err(Error::UnknownCountry(name)) if name == "Atlantide"));
    }

    #[test]
    fn scale_rounds_to_nice_numbers() {
        assert_eq!(round_scale(7.4), 5.0);
        assert_eq!(round_scale(2_950.0), 2_000.0);
        assert_eq!(round_scale(31_000.0), 30_000.0);
        assert_eq!(round_scale(999.0), 500.0);
        assert_eq!(round_scale(100.0), 100.0);
    }

    #[test]
    fn scale_bar_labels_units() {
        let view = MapView::new(GeoPoint::new(0.0, 0.0), 10.0, ViewSize::new(400.0, 400.0));
        let bar = scale_bar(&view, 100.0).unwrap();
        // ~152.9 m/px at zoom 0 on the equator -> ~14.9 km per 100 px at zoom 10
        assert_eq!(bar.label, "10 km");
        assert!(bar.width <= 100.0 && bar.width > 50.0);

        let close = MapView::new(GeoPoint::new(0.0, 0.0), 16.0, ViewSize::new(400.0, 400.0));
        assert_eq!(scale_bar(&close, 100.0).unwrap().label, "200 m");
    }
}
