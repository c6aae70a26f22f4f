pub mod atlas;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod connector;
pub mod continent;
pub mod error;
pub mod export;
pub mod geometry;
pub mod placement;
pub mod projection;
pub mod render;
pub mod scene;
pub mod scene_dump;
pub mod style;
pub mod text_metrics;

pub use atlas::{Atlas, AtlasOptions, Country, parse_atlas};
#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig, RenderConfig, load_config};
pub use connector::{AngleMetric, ConnectorPair, place_connectors};
pub use continent::Continent;
pub use error::{Error, Result};
pub use export::{CropRegion, ExportFormat, export_archive};
pub use geometry::{Corner, GeoPoint, PanelRect, ScreenPoint};
pub use projection::{MapView, Projection};
pub use render::render_svg;
pub use scene::{Scene, SceneOptions, compute_scene};
pub use style::MapStyle;
