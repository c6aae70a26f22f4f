use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid GeoJSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("feature {feature}: position needs at least 2 coordinates")]
    InvalidPosition { feature: usize },

    #[error("no country features with a `{property}` property")]
    EmptyAtlas { property: String },

    #[error("unknown country: {0}")]
    UnknownCountry(String),

    #[error("crop region {width}x{height}+{x}+{y} lies outside the {viewport_width}x{viewport_height} viewport")]
    EmptyCrop {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        viewport_width: u32,
        viewport_height: u32,
    },

    #[error("rasterization failed: {0}")]
    Raster(String),

    #[error("archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
