use crate::connector::{CandidateLine, GeoSegment};
use crate::geometry::{GeoPoint, ScreenBox, ScreenPoint};
use crate::projection::MapView;
use crate::scene::{ScaleBar, Scene};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct SceneDump {
    pub width: f64,
    pub height: f64,
    pub main: MapView,
    pub countries: usize,
    pub highlight: Option<HighlightDump>,
}

#[derive(Debug, Serialize)]
pub struct HighlightDump {
    pub name: String,
    pub code: String,
    pub centroid: GeoPoint,
    pub minimap_zoom: f64,
    pub minimap: Option<MinimapDump>,
    pub connectors: Option<ConnectorDump>,
}

#[derive(Debug, Serialize)]
pub struct MinimapDump {
    pub panel: ScreenBox,
    pub view: MapView,
    pub tooltip: String,
    pub tooltip_anchor: ScreenPoint,
    pub scale: Option<ScaleDump>,
}

#[derive(Debug, Serialize)]
pub struct ScaleDump {
    pub meters: f64,
    pub width: f64,
    pub label: String,
}

#[derive(Debug, Serialize)]
pub struct ConnectorDump {
    pub centroid: ScreenPoint,
    pub primary: CandidateLine,
    pub secondary: CandidateLine,
    pub segments: [GeoSegment; 2],
}

impl From<&ScaleBar> for ScaleDump {
    fn from(scale: &ScaleBar) -> Self {
        ScaleDump {
            meters: scale.meters,
            width: scale.width,
            label: scale.label.clone(),
        }
    }
}

impl SceneDump {
    pub fn from_scene(scene: &Scene) -> Self {
        let highlight = scene.highlight.as_ref().map(|highlight| HighlightDump {
            name: highlight.name.clone(),
            code: highlight.code.clone(),
            centroid: highlight.centroid,
            minimap_zoom: highlight.minimap_zoom,
            minimap: highlight.minimap.as_ref().map(|minimap| MinimapDump {
                panel: minimap.panel,
                view: minimap.view,
                tooltip: minimap.tooltip.text.clone(),
                tooltip_anchor: minimap.tooltip.anchor,
                scale: minimap.scale.as_ref().map(ScaleDump::from),
            }),
            connectors: highlight.connectors.as_ref().map(|pair| ConnectorDump {
                centroid: pair.centroid,
                primary: pair.primary,
                secondary: pair.secondary,
                segments: pair.segments(),
            }),
        });

        SceneDump {
            width: scene.size.width,
            height: scene.size.height,
            main: scene.main,
            countries: scene.shapes.len(),
            highlight,
        }
    }
}

pub fn write_scene_dump(path: &Path, scene: &Scene) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = SceneDump::from_scene(scene);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}
