use crate::atlas::{Atlas, parse_atlas};
use crate::config::{Config, load_config};
use crate::continent::Continent;
use crate::export::{ExportFormat, write_archive};
use crate::render::{render_svg, write_output_svg};
use crate::scene::{SceneOptions, compute_scene};
use crate::scene_dump::write_scene_dump;
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "vademecum", version, about = "Country highlight maps with a minimap inset")]
pub struct Args {
    /// GeoJSON FeatureCollection or '-' for stdin. Defaults to the continent's file.
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file (svg/png/zip). SVG goes to stdout if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format; `zip` exports every country
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON/JSON5 file
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Continent preset (file, zoom, panel and crop)
    #[arg(long = "continent", value_enum)]
    pub continent: Option<Continent>,

    /// Country to highlight (name or ISO code)
    #[arg(long = "country")]
    pub country: Option<String>,

    /// Frame the map on the highlighted country
    #[arg(long = "focus", requires = "country")]
    pub focus: bool,

    /// Images inside the zip archive
    #[arg(long = "imageFormat", value_enum)]
    pub image_format: Option<ImageFormat>,

    /// Viewport width
    #[arg(short = 'w', long = "width")]
    pub width: Option<f32>,

    /// Viewport height
    #[arg(short = 'H', long = "height")]
    pub height: Option<f32>,

    /// Write the computed scene as JSON
    #[arg(long = "dumpScene")]
    pub dump_scene: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
    Zip,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Svg,
    Png,
}

pub fn run() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let mut config = load_config(args.config.as_deref())?;
    if let Some(continent) = args.continent {
        config = config.with_continent(continent);
    }
    if let Some(width) = args.width {
        config.render.width = width;
    }
    if let Some(height) = args.height {
        config.render.height = height;
    }
    if let Some(format) = args.image_format {
        config.export.format = match format {
            ImageFormat::Svg => ExportFormat::Svg,
            ImageFormat::Png => ExportFormat::Png,
        };
    }

    let input_path = args
        .input
        .clone()
        .unwrap_or_else(|| PathBuf::from(config.continent.preset().geojson));
    let atlas = read_atlas(&input_path, &config)?;
    info!(countries = atlas.len(), continent = config.continent.name(), "atlas ready");

    match args.output_format {
        OutputFormat::Zip => export_all(&atlas, &config, args.output.as_deref()),
        OutputFormat::Svg | OutputFormat::Png => render_one(&atlas, &config, &args),
    }
}

fn export_all(atlas: &Atlas, config: &Config, output: Option<&Path>) -> Result<()> {
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(&config.export.archive_name));
    let summary = write_archive(atlas, config, &output, |progress| {
        eprint!("\rProgress: {} / {}", progress.completed, progress.total);
    })?;
    eprintln!();
    eprintln!(
        "Exported {} countries to {} ({} with minimap)",
        summary.entries.len(),
        output.display(),
        summary.with_minimap
    );
    Ok(())
}

fn render_one(atlas: &Atlas, config: &Config, args: &Args) -> Result<()> {
    let options = SceneOptions {
        highlight: args.country.clone(),
        focus: args.focus,
    };
    let scene = compute_scene(atlas, config, &options)?;
    if let Some(path) = args.dump_scene.as_deref() {
        write_scene_dump(path, &scene)?;
    }
    let svg = render_svg(&scene, &config.style, None);

    if args.output_format == OutputFormat::Png {
        let output = ensure_output(&args.output, "png")?;
        write_png(&svg, &output, config)
    } else {
        write_output_svg(&svg, args.output.as_deref())
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn read_atlas(path: &Path, config: &Config) -> Result<Atlas> {
    let input = if path == Path::new("-") {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(path)
            .map_err(|err| anyhow::anyhow!("{}: {err}", path.display()))?
    };
    Ok(parse_atlas(&input, &config.atlas)?)
}

#[cfg(feature = "png")]
fn write_png(svg: &str, output: &Path, config: &Config) -> Result<()> {
    crate::render::write_output_png(svg, output, &config.render)
}

#[cfg(not(feature = "png"))]
fn write_png(_svg: &str, _output: &Path, _config: &Config) -> Result<()> {
    Err(anyhow::anyhow!("PNG output needs the `png` feature"))
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!("Output path required for {} output", ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_export_flags() {
        let args = Args::try_parse_from([
            "vademecum",
            "-i",
            "geojson/Europe.json",
            "-e",
            "zip",
            "--continent",
            "europe",
            "--imageFormat",
            "svg",
        ])
        .unwrap();
        assert_eq!(args.output_format, OutputFormat::Zip);
        assert_eq!(args.continent, Some(Continent::Europe));
        assert_eq!(args.image_format, Some(ImageFormat::Svg));
    }

    #[test]
    fn focus_requires_country() {
        assert!(Args::try_parse_from(["vademecum", "--focus"]).is_err());
        let args = Args::try_parse_from(["vademecum", "--country", "Cuba", "--focus"]).unwrap();
        assert!(args.focus);
    }

    #[test]
    fn png_needs_output_path() {
        assert!(ensure_output(&None, "png").is_err());
        assert_eq!(
            ensure_output(&Some(PathBuf::from("out.png")), "png").unwrap(),
            PathBuf::from("out.png")
        );
    }
}
