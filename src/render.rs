#[cfg(feature = "png")]
use crate::config::RenderConfig;
use crate::export::CropRegion;
use crate::geometry::ScreenPoint;
use crate::projection::Projection;
use crate::scene::{CountryShape, Minimap, Scene};
use crate::style::{MapStyle, PathStyle};
use anyhow::Result;
use std::path::Path;

/// Renders `scene` as a standalone SVG document. With a `region`, the
/// document only shows that part of the viewport.
pub fn render_svg(scene: &Scene, style: &MapStyle, region: Option<&CropRegion>) -> String {
    let mut svg = String::new();
    let (x, y, width, height) = match region {
        Some(crop) => (crop.x as f64, crop.y as f64, crop.width as f64, crop.height as f64),
        None => (0.0, 0.0, scene.size.width, scene.size.height),
    };

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"{x} {y} {width} {height}\">",
    ));
    svg.push_str(&format!(
        "<rect x=\"{x}\" y=\"{y}\" width=\"{width}\" height=\"{height}\" fill=\"{}\"/>",
        style.background
    ));

    svg.push_str("<g class=\"countries\">");
    for shape in scene.shapes.iter().filter(|shape| !shape.highlighted) {
        svg.push_str(&shape_svg(shape, &style.country));
    }
    // highlighted country goes on top of its neighbours
    for shape in scene.shapes.iter().filter(|shape| shape.highlighted) {
        svg.push_str(&shape_svg(shape, &style.highlight));
    }
    svg.push_str("</g>");

    if let Some(connectors) = scene.connectors() {
        svg.push_str("<g class=\"connectors\">");
        for segment in connectors.segments() {
            let points = [scene.main.to_screen(segment.from), scene.main.to_screen(segment.to)];
            svg.push_str(&format!(
                "<path d=\"{}\" fill=\"none\" {}/>",
                points_to_path(&points, false),
                stroke_attrs(&style.connector)
            ));
        }
        svg.push_str("</g>");
    }

    if let Some(minimap) = scene.minimap() {
        svg.push_str(&minimap_svg(minimap, style));
    }

    svg.push_str("</svg>");
    svg
}

fn minimap_svg(minimap: &Minimap, style: &MapStyle) -> String {
    let panel = &minimap.panel;
    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg class=\"minimap\" x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" viewBox=\"0 0 {:.2} {:.2}\" overflow=\"hidden\">",
        panel.x, panel.y, panel.width, panel.height, panel.width, panel.height
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        style.panel_background
    ));

    if style.minimap_country.is_visible() {
        for shape in minimap.shapes.iter().filter(|shape| !shape.highlighted) {
            svg.push_str(&shape_svg(shape, &style.minimap_country));
        }
    }
    if style.minimap_highlight.is_visible() {
        for shape in minimap.shapes.iter().filter(|shape| shape.highlighted) {
            svg.push_str(&shape_svg(shape, &style.minimap_highlight));
        }
    }

    let tooltip = &minimap.tooltip;
    let rect_x = tooltip.anchor.x - tooltip.width / 2.0;
    let rect_y = tooltip.anchor.y + 4.0;
    svg.push_str(&format!(
        "<rect x=\"{rect_x:.2}\" y=\"{rect_y:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"3\" ry=\"3\" fill=\"{}\" stroke=\"{}\" stroke-width=\"0.8\"/>",
        tooltip.width, tooltip.height, style.tooltip_background, style.tooltip_border
    ));
    let text_y = rect_y + tooltip.height / 2.0;
    svg.push_str(&format!(
        "<text x=\"{:.2}\" y=\"{text_y:.2}\" text-anchor=\"middle\" dominant-baseline=\"central\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
        tooltip.anchor.x,
        escape_xml(&style.font_family),
        style.font_size,
        style.tooltip_text,
        escape_xml(&tooltip.text)
    ));

    if let Some(scale) = &minimap.scale {
        let left = 10.0;
        let bottom = panel.height - 10.0;
        let right = left + scale.width;
        let top = bottom - 6.0;
        svg.push_str(&format!(
            "<path d=\"M {left:.2} {top:.2} L {left:.2} {bottom:.2} L {right:.2} {bottom:.2} L {right:.2} {top:.2}\" fill=\"none\" stroke=\"{}\" stroke-width=\"2\"/>",
            style.scale_color
        ));
        svg.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
            left + 3.0,
            top - 3.0,
            escape_xml(&style.font_family),
            (style.font_size * 0.8).max(1.0),
            style.scale_color,
            escape_xml(&scale.label)
        ));
    }

    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"none\" stroke=\"{}\" stroke-width=\"2\"/>",
        style.panel_border
    ));
    svg.push_str("</svg>");
    svg
}

fn shape_svg(shape: &CountryShape, style: &PathStyle) -> String {
    let d = shape
        .rings
        .iter()
        .filter(|ring| ring.len() >= 2)
        .map(|ring| points_to_path(ring, true))
        .collect::<Vec<_>>()
        .join(" ");
    format!(
        "<path data-name=\"{}\" d=\"{}\" fill=\"{}\" fill-opacity=\"{}\" fill-rule=\"evenodd\" {}/>",
        escape_xml(&shape.name),
        d,
        style.fill_color,
        style.fill_opacity,
        stroke_attrs(style)
    )
}

fn stroke_attrs(style: &PathStyle) -> String {
    if style.weight <= 0.0 {
        return "stroke=\"none\"".to_string();
    }
    format!(
        "stroke=\"{}\" stroke-opacity=\"{}\" stroke-width=\"{}\" stroke-linejoin=\"round\"",
        style.color, style.opacity, style.weight
    )
}

fn points_to_path(points: &[ScreenPoint], closed: bool) -> String {
    let Some(first) = points.first() else {
        return String::new();
    };
    let mut d = String::new();
    d.push_str(&format!("M {:.2} {:.2}", first.x, first.y));
    for point in points.iter().skip(1) {
        d.push_str(&format!(" L {:.2} {:.2}", point.x, point.y));
    }
    if closed {
        d.push_str(" Z");
    }
    d
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
static FONT_DB: once_cell::sync::Lazy<std::sync::Arc<usvg::fontdb::Database>> =
    once_cell::sync::Lazy::new(|| {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();
        std::sync::Arc::new(db)
    });

#[cfg(feature = "png")]
pub fn rasterize_png(svg: &str, render_cfg: &RenderConfig) -> crate::error::Result<Vec<u8>> {
    use crate::error::Error;

    let mut opt = usvg::Options::default();
    opt.font_family = "Inter".to_string();
    opt.default_size = usvg::Size::from_wh(render_cfg.width, render_cfg.height)
        .ok_or_else(|| Error::Raster(format!("invalid size {}x{}", render_cfg.width, render_cfg.height)))?;
    opt.fontdb = FONT_DB.clone();

    let tree = usvg::Tree::from_str(svg, &opt).map_err(|err| Error::Raster(err.to_string()))?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| Error::Raster("failed to allocate pixmap".to_string()))?;
    pixmap.fill(parse_background(&render_cfg.background));

    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap.as_mut());
    pixmap.encode_png().map_err(|err| Error::Raster(err.to_string()))
}

#[cfg(feature = "png")]
fn parse_background(color: &str) -> resvg::tiny_skia::Color {
    let hex = color.trim().trim_start_matches('#');
    let channel = |range: std::ops::Range<usize>| hex.get(range).and_then(|v| u8::from_str_radix(v, 16).ok());
    match (hex.len(), channel(0..2), channel(2..4), channel(4..6)) {
        (6, Some(r), Some(g), Some(b)) => resvg::tiny_skia::Color::from_rgba8(r, g, b, 255),
        _ => resvg::tiny_skia::Color::WHITE,
    }
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig) -> Result<()> {
    let bytes = rasterize_png(svg, render_cfg)?;
    std::fs::write(output, bytes)?;
    Ok(())
}

pub fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
