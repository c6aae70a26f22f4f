use crate::atlas::AtlasOptions;
use crate::connector::AngleMetric;
use crate::continent::Continent;
use crate::export::{CropRegion, ExportFormat};
use crate::geometry::ScreenBox;
use crate::projection::ZoomLimits;
use crate::style::{MapStyle, PathStyle};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_ARCHIVE_NAME: &str = "Countries_Export.zip";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub zoom: ZoomLimits,
    pub main_zoom: f64,
    pub minimap_padding: f64,
    pub focus_padding: f64,
    /// The minimap is shown only above this zoom; larger countries are
    /// readable on the main map alone.
    pub minimap_zoom_threshold: f64,
    pub panel: ScreenBox,
    pub panel_candidates: Vec<ScreenBox>,
    pub corner_inset: f64,
    pub angle_metric: AngleMetric,
    pub scale_max_width: f64,
    pub tooltip_padding_x: f64,
    pub tooltip_padding_y: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self::for_continent(Continent::Americas)
    }
}

impl LayoutConfig {
    pub fn for_continent(continent: Continent) -> Self {
        let preset = continent.preset();
        Self {
            zoom: ZoomLimits::default(),
            main_zoom: preset.main_zoom,
            minimap_padding: 50.0,
            focus_padding: 50.0,
            minimap_zoom_threshold: 4.0,
            panel: preset.panel,
            panel_candidates: preset.panel_candidates,
            corner_inset: 1.0,
            angle_metric: AngleMetric::default(),
            scale_max_width: 100.0,
            tooltip_padding_x: 6.0,
            tooltip_padding_y: 4.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
    pub background: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 2560.0,
            height: 1440.0,
            background: "#FFFFFF".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    pub crop: Option<CropRegion>,
    pub format: ExportFormat,
    pub archive_name: String,
}

impl ExportConfig {
    pub fn for_continent(continent: Continent) -> Self {
        Self {
            crop: Some(continent.preset().crop),
            format: ExportFormat::default(),
            archive_name: DEFAULT_ARCHIVE_NAME.to_string(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self::for_continent(Continent::Americas)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub continent: Continent,
    pub style: MapStyle,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
    pub export: ExportConfig,
    pub atlas: AtlasOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self::for_continent(Continent::Americas)
    }
}

impl Config {
    pub fn for_continent(continent: Continent) -> Self {
        let style = MapStyle::vademecum();
        let render = RenderConfig {
            background: style.background.clone(),
            ..Default::default()
        };
        Self {
            continent,
            style,
            layout: LayoutConfig::for_continent(continent),
            render,
            export: ExportConfig::for_continent(continent),
            atlas: AtlasOptions::default(),
        }
    }

    pub fn with_continent(mut self, continent: Continent) -> Self {
        let preset = continent.preset();
        self.continent = continent;
        self.layout.main_zoom = preset.main_zoom;
        self.layout.panel = preset.panel;
        self.layout.panel_candidates = preset.panel_candidates;
        self.export.crop = Some(preset.crop);
        self
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PathStyleFile {
    weight: Option<f32>,
    opacity: Option<f32>,
    color: Option<String>,
    fill_color: Option<String>,
    fill_opacity: Option<f32>,
}

impl PathStyleFile {
    fn apply(self, style: &mut PathStyle) {
        if let Some(v) = self.weight {
            style.weight = v;
        }
        if let Some(v) = self.opacity {
            style.opacity = v;
        }
        if let Some(v) = self.color {
            style.color = v;
        }
        if let Some(v) = self.fill_color {
            style.fill_color = v;
        }
        if let Some(v) = self.fill_opacity {
            style.fill_opacity = v;
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StyleFile {
    font_family: Option<String>,
    font_size: Option<f32>,
    background: Option<String>,
    country: Option<PathStyleFile>,
    highlight: Option<PathStyleFile>,
    minimap_country: Option<PathStyleFile>,
    minimap_highlight: Option<PathStyleFile>,
    connector: Option<PathStyleFile>,
    panel_background: Option<String>,
    panel_border: Option<String>,
    tooltip_background: Option<String>,
    tooltip_border: Option<String>,
    tooltip_text: Option<String>,
    scale_color: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutFile {
    min_zoom: Option<f64>,
    max_zoom: Option<f64>,
    zoom_snap: Option<f64>,
    main_zoom: Option<f64>,
    minimap_padding: Option<f64>,
    focus_padding: Option<f64>,
    minimap_zoom_threshold: Option<f64>,
    panel: Option<ScreenBox>,
    panel_candidates: Option<Vec<ScreenBox>>,
    corner_inset: Option<f64>,
    angle_metric: Option<AngleMetric>,
    scale_max_width: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExportFile {
    crop: Option<CropRegion>,
    no_crop: Option<bool>,
    format: Option<ExportFormat>,
    archive_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    continent: Option<Continent>,
    theme: Option<String>,
    style: Option<StyleFile>,
    layout: Option<LayoutFile>,
    export: Option<ExportFile>,
    width: Option<f32>,
    height: Option<f32>,
    name_property: Option<String>,
    code_property: Option<String>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };

    let contents = std::fs::read_to_string(path)
        .map_err(|err| anyhow::anyhow!("{}: {err}", path.display()))?;
    let parsed = parse_config_file(&contents)
        .map_err(|err| anyhow::anyhow!("{}: {err}", path.display()))?;
    Ok(apply_config_file(parsed))
}

// strict JSON first; json5 errors are the ones reported
fn parse_config_file(contents: &str) -> Result<ConfigFile, json5::Error> {
    match serde_json::from_str(contents) {
        Ok(parsed) => Ok(parsed),
        Err(_) => json5::from_str(contents),
    }
}

fn apply_config_file(parsed: ConfigFile) -> Config {
    let mut config = Config::for_continent(parsed.continent.unwrap_or_default());

    if let Some(theme_name) = parsed.theme.as_deref() {
        if theme_name == "contextual" {
            config.style = MapStyle::contextual();
        } else if theme_name == "default" || theme_name == "vademecum" {
            config.style = MapStyle::vademecum();
        }
    }

    if let Some(style) = parsed.style {
        let target = &mut config.style;
        if let Some(v) = style.font_family {
            target.font_family = v;
        }
        if let Some(v) = style.font_size {
            target.font_size = v;
        }
        if let Some(v) = style.background {
            target.background = v;
        }
        if let Some(v) = style.country {
            v.apply(&mut target.country);
        }
        if let Some(v) = style.highlight {
            v.apply(&mut target.highlight);
        }
        if let Some(v) = style.minimap_country {
            v.apply(&mut target.minimap_country);
        }
        if let Some(v) = style.minimap_highlight {
            v.apply(&mut target.minimap_highlight);
        }
        if let Some(v) = style.connector {
            v.apply(&mut target.connector);
        }
        if let Some(v) = style.panel_background {
            target.panel_background = v;
        }
        if let Some(v) = style.panel_border {
            target.panel_border = v;
        }
        if let Some(v) = style.tooltip_background {
            target.tooltip_background = v;
        }
        if let Some(v) = style.tooltip_border {
            target.tooltip_border = v;
        }
        if let Some(v) = style.tooltip_text {
            target.tooltip_text = v;
        }
        if let Some(v) = style.scale_color {
            target.scale_color = v;
        }
    }
    config.render.background = config.style.background.clone();

    if let Some(layout) = parsed.layout {
        let target = &mut config.layout;
        if let Some(v) = layout.min_zoom {
            target.zoom.min = v;
        }
        if let Some(v) = layout.max_zoom {
            target.zoom.max = v;
        }
        if let Some(v) = layout.zoom_snap {
            target.zoom.snap = v.max(0.0);
        }
        if let Some(v) = layout.main_zoom {
            target.main_zoom = v;
        }
        if let Some(v) = layout.minimap_padding {
            target.minimap_padding = v;
        }
        if let Some(v) = layout.focus_padding {
            target.focus_padding = v;
        }
        if let Some(v) = layout.minimap_zoom_threshold {
            target.minimap_zoom_threshold = v;
        }
        if let Some(v) = layout.panel {
            target.panel = v;
            // an explicit panel without candidates pins the position
            if layout.panel_candidates.is_none() {
                target.panel_candidates.clear();
            }
        }
        if let Some(v) = layout.panel_candidates {
            target.panel_candidates = v;
        }
        if let Some(v) = layout.corner_inset {
            target.corner_inset = v;
        }
        if let Some(v) = layout.angle_metric {
            target.angle_metric = v;
        }
        if let Some(v) = layout.scale_max_width {
            target.scale_max_width = v;
        }
    }

    if let Some(export) = parsed.export {
        if let Some(v) = export.crop {
            config.export.crop = Some(v);
        }
        if export.no_crop == Some(true) {
            config.export.crop = None;
        }
        if let Some(v) = export.format {
            config.export.format = v;
        }
        if let Some(v) = export.archive_name {
            config.export.archive_name = v;
        }
    }

    if let Some(v) = parsed.width {
        config.render.width = v;
    }
    if let Some(v) = parsed.height {
        config.render.height = v;
    }
    if let Some(v) = parsed.name_property {
        config.atlas.name_property = v;
    }
    if let Some(v) = parsed.code_property {
        config.atlas.code_property = v;
    }

    config
}
