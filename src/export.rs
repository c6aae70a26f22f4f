use std::collections::HashSet;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufWriter, Seek, Write};
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use zip::CompressionMethod;
use zip::write::SimpleFileOptions;

use crate::atlas::Atlas;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::geometry::ScreenBox;
use crate::render::render_svg;
use crate::scene::compute_scene_at;

static UNSAFE_FILE_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[/\\:*?"<>|\x00-\x1f]+"#).expect("valid file name pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRegion {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn as_box(&self) -> ScreenBox {
        ScreenBox::new(self.x as f64, self.y as f64, self.width as f64, self.height as f64)
    }

    pub fn clamp_to(&self, width: u32, height: u32) -> Option<CropRegion> {
        let right = self.x.saturating_add(self.width).min(width);
        let bottom = self.y.saturating_add(self.height).min(height);
        if self.x >= right || self.y >= bottom {
            return None;
        }
        Some(CropRegion::new(self.x, self.y, right - self.x, bottom - self.y))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Png,
    Svg,
}

impl Default for ExportFormat {
    fn default() -> Self {
        if cfg!(feature = "png") {
            ExportFormat::Png
        } else {
            ExportFormat::Svg
        }
    }
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Svg => "svg",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportProgress {
    pub completed: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub entries: Vec<String>,
    pub with_minimap: usize,
}

/// Archive entry name `"{code} - {name}.{ext}"` with characters that are not
/// allowed in file names replaced by `_`.
pub fn entry_name(code: &str, name: &str, format: ExportFormat) -> String {
    let stem = format!("{code} - {name}");
    let stem = UNSAFE_FILE_CHARS.replace_all(&stem, "_");
    format!("{}.{}", stem.trim(), format.extension())
}

fn unique_name(name: String, taken: &mut HashSet<String>) -> String {
    if taken.insert(name.clone()) {
        return name;
    }
    let (stem, ext) = name.rsplit_once('.').unwrap_or((name.as_str(), ""));
    let mut n = 2;
    loop {
        let candidate = if ext.is_empty() {
            format!("{stem} ({n})")
        } else {
            format!("{stem} ({n}).{ext}")
        };
        if taken.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

pub fn checked_crop(config: &Config) -> Result<Option<CropRegion>> {
    let Some(crop) = config.export.crop else {
        return Ok(None);
    };
    let (width, height) = (config.render.width as u32, config.render.height as u32);
    crop.clamp_to(width, height).map(Some).ok_or(Error::EmptyCrop {
        x: crop.x,
        y: crop.y,
        width: crop.width,
        height: crop.height,
        viewport_width: width,
        viewport_height: height,
    })
}

/// Renders one image with the country at `index` highlighted, cropped to the
/// export region. Also reports whether the minimap was shown.
pub fn render_country(atlas: &Atlas, config: &Config, index: usize) -> Result<(Vec<u8>, bool)> {
    let crop = checked_crop(config)?;
    let scene = compute_scene_at(atlas, config, Some(index), false);
    let svg = render_svg(&scene, &config.style, crop.as_ref());
    let bytes = match config.export.format {
        ExportFormat::Svg => svg.into_bytes(),
        #[cfg(feature = "png")]
        ExportFormat::Png => crate::render::rasterize_png(&svg, &config.render)?,
        #[cfg(not(feature = "png"))]
        ExportFormat::Png => {
            return Err(Error::Raster("PNG export needs the `png` feature".to_string()));
        }
    };
    Ok((bytes, scene.minimap().is_some()))
}

pub fn export_archive<W, F>(atlas: &Atlas, config: &Config, writer: W, mut on_progress: F) -> Result<ExportSummary>
where
    W: Write + Seek,
    F: FnMut(ExportProgress),
{
    checked_crop(config)?;
    let mut zip = zip::ZipWriter::new(writer);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let total = atlas.len();
    let mut taken = HashSet::new();
    let mut summary = ExportSummary::default();

    for (idx, country) in atlas.countries.iter().enumerate() {
        let (bytes, with_minimap) = render_country(atlas, config, idx)?;
        let base = entry_name(&country.code, &country.name, config.export.format);
        let name = unique_name(base.clone(), &mut taken);
        if name != base {
            warn!(%base, %name, "duplicate archive entry renamed");
        }
        zip.start_file(name.as_str(), options)?;
        zip.write_all(&bytes)?;

        if with_minimap {
            summary.with_minimap += 1;
        }
        summary.entries.push(name);
        let progress = ExportProgress {
            completed: idx + 1,
            total,
        };
        info!("Progress: {} / {}", progress.completed, progress.total);
        on_progress(progress);
    }

    zip.finish()?.flush()?;
    Ok(summary)
}

/// Builds the archive next to `path` and moves it into place once complete.
pub fn write_archive<F>(atlas: &Atlas, config: &Config, path: &Path, on_progress: F) -> Result<ExportSummary>
where
    F: FnMut(ExportProgress),
{
    checked_crop(config)?;
    let partial = partial_path(path);
    let result = File::create(&partial)
        .map_err(Error::from)
        .and_then(|file| export_archive(atlas, config, BufWriter::new(file), on_progress));
    let summary = match result {
        Ok(summary) => summary,
        Err(err) => {
            let _ = fs::remove_file(&partial);
            return Err(err);
        }
    };
    fs::rename(&partial, path)?;
    info!(path = %path.display(), entries = summary.entries.len(), "export complete");
    Ok(summary)
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".part");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_names_follow_code_and_name() {
        assert_eq!(entry_name("BR", "Brasile", ExportFormat::Png), "BR - Brasile.png");
        assert_eq!(entry_name("--", "Isole Falkland/Malvinas", ExportFormat::Svg), "-- - Isole Falkland_Malvinas.svg");
        assert_eq!(entry_name("XX", "a:b?", ExportFormat::Png), "XX - a_b_.png");
    }

    #[test]
    fn duplicate_names_get_suffix() {
        let mut taken = HashSet::new();
        assert_eq!(unique_name("A.png".to_string(), &mut taken), "A.png");
        assert_eq!(unique_name("A.png".to_string(), &mut taken), "A (2).png");
        assert_eq!(unique_name("A.png".to_string(), &mut taken), "A (3).png");
    }

    #[test]
    fn partial_archive_sits_next_to_target() {
        assert_eq!(
            partial_path(Path::new("out/Countries_Export.zip")),
            PathBuf::from("out/Countries_Export.zip.part")
        );
    }

    #[test]
    fn crop_clamps_to_viewport() {
        let crop = CropRegion::new(850, 200, 1350, 1200);
        assert_eq!(crop.clamp_to(2560, 1440), Some(crop));
        assert_eq!(crop.clamp_to(1920, 1080), Some(CropRegion::new(850, 200, 1070, 880)));
        assert_eq!(crop.clamp_to(800, 600), None);
    }
}
