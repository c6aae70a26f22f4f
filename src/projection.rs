use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::geometry::{GeoBounds, GeoPoint, ScreenBox, ScreenPoint};

const SPHERE_RADIUS: f64 = 6_378_137.0;
const MAX_LATITUDE: f64 = 85.051_128_779_8;
const TILE_SIZE: f64 = 256.0;

pub trait Projection {
    fn to_screen(&self, point: GeoPoint) -> ScreenPoint;
    fn to_geo(&self, point: ScreenPoint) -> GeoPoint;
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomLimits {
    pub min: f64,
    pub max: f64,
    /// Zoom levels are multiples of this step; `0` disables snapping.
    pub snap: f64,
}

impl Default for ZoomLimits {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: 18.0,
            snap: 0.25,
        }
    }
}

impl ZoomLimits {
    pub fn snap_zoom(&self, zoom: f64) -> f64 {
        if self.snap > 0.0 {
            (zoom / self.snap).round() * self.snap
        } else {
            zoom
        }
    }

    pub fn clamp(&self, zoom: f64) -> f64 {
        zoom.max(self.min).min(self.max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewSize {
    pub width: f64,
    pub height: f64,
}

impl ViewSize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// A spherical Mercator view: what a map widget of `size` pixels shows when
/// centered on `center` at `zoom`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapView {
    pub center: GeoPoint,
    pub zoom: f64,
    pub size: ViewSize,
}

pub fn project(point: GeoPoint, zoom: f64) -> ScreenPoint {
    let lat = point.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let sin = lat.sin();
    let x = SPHERE_RADIUS * point.lng.to_radians();
    let y = SPHERE_RADIUS * ((1.0 + sin) / (1.0 - sin)).ln() / 2.0;
    let scale = world_scale(zoom);
    let k = 0.5 / (PI * SPHERE_RADIUS);
    ScreenPoint::new(scale * (k * x + 0.5), scale * (-k * y + 0.5))
}

pub fn unproject(point: ScreenPoint, zoom: f64) -> GeoPoint {
    let scale = world_scale(zoom);
    let k = 0.5 / (PI * SPHERE_RADIUS);
    let x = (point.x / scale - 0.5) / k;
    let y = (point.y / scale - 0.5) / -k;
    let lat = (2.0 * (y / SPHERE_RADIUS).exp().atan() - PI / 2.0).to_degrees();
    let lng = (x / SPHERE_RADIUS).to_degrees();
    GeoPoint::new(lat, lng)
}

fn world_scale(zoom: f64) -> f64 {
    TILE_SIZE * 2f64.powf(zoom)
}

impl MapView {
    pub fn new(center: GeoPoint, zoom: f64, size: ViewSize) -> Self {
        Self { center, zoom, size }
    }

    pub fn fit_bounds(bounds: &GeoBounds, size: ViewSize, padding: f64, limits: &ZoomLimits) -> Self {
        let zoom = bounds_zoom(bounds, size, padding, limits);
        let sw = project(bounds.south_west(), zoom);
        let ne = project(bounds.north_east(), zoom);
        let mid = ScreenPoint::new((sw.x + ne.x) / 2.0, (sw.y + ne.y) / 2.0);
        Self {
            center: unproject(mid, zoom),
            zoom,
            size,
        }
    }

    pub fn set_zoom(self, zoom: f64, limits: &ZoomLimits) -> Self {
        Self {
            zoom: limits.clamp(limits.snap_zoom(zoom)),
            ..self
        }
    }

    fn pixel_origin(&self) -> ScreenPoint {
        let center = project(self.center, self.zoom);
        ScreenPoint::new(center.x - self.size.width / 2.0, center.y - self.size.height / 2.0)
    }

    pub fn north_center(&self) -> GeoPoint {
        self.to_geo(ScreenPoint::new(self.size.width / 2.0, 0.0))
    }

    pub fn screen_box(&self, bounds: &GeoBounds) -> ScreenBox {
        ScreenBox::from_corners(
            self.to_screen(bounds.north_west()),
            self.to_screen(bounds.south_east()),
        )
    }
}

impl Projection for MapView {
    fn to_screen(&self, point: GeoPoint) -> ScreenPoint {
        let world = project(point, self.zoom);
        let origin = self.pixel_origin();
        ScreenPoint::new(world.x - origin.x, world.y - origin.y)
    }

    fn to_geo(&self, point: ScreenPoint) -> GeoPoint {
        let origin = self.pixel_origin();
        unproject(ScreenPoint::new(point.x + origin.x, point.y + origin.y), self.zoom)
    }
}

fn bounds_zoom(bounds: &GeoBounds, size: ViewSize, padding: f64, limits: &ZoomLimits) -> f64 {
    let nw = project(bounds.north_west(), 0.0);
    let se = project(bounds.south_east(), 0.0);
    let bounds_width = (se.x - nw.x).abs();
    let bounds_height = (se.y - nw.y).abs();
    let avail_width = (size.width - 2.0 * padding).max(0.0);
    let avail_height = (size.height - 2.0 * padding).max(0.0);

    let scale = (avail_width / bounds_width).min(avail_height / bounds_height);
    if !scale.is_finite() {
        return limits.max;
    }
    if scale <= 0.0 {
        return limits.min;
    }

    let mut zoom = scale.log2();
    if limits.snap > 0.0 {
        // round away float noise before flooring so exact fits keep their level
        let fine = limits.snap / 100.0;
        zoom = (zoom / fine).round() * fine;
        zoom = (zoom / limits.snap).floor() * limits.snap;
    }
    limits.clamp(zoom)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> MapView {
        MapView::new(GeoPoint::new(-15.8, -47.9), 3.0, ViewSize::new(800.0, 600.0))
    }

    #[test]
    fn center_projects_to_middle() {
        let v = view();
        let p = v.to_screen(v.center);
        assert!((p.x - 400.0).abs() < 1e-6);
        assert!((p.y - 300.0).abs() < 1e-6);
    }

    #[test]
    fn round_trip_within_tolerance() {
        let v = view();
        for point in [
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(45.5, -73.6),
            GeoPoint::new(-54.8, -68.3),
            GeoPoint::new(60.1, 24.9),
        ] {
            let back = v.to_geo(v.to_screen(point));
            assert!((back.lat - point.lat).abs() < 1e-9, "{point:?} -> {back:?}");
            assert!((back.lng - point.lng).abs() < 1e-9, "{point:?} -> {back:?}");
        }
    }

    #[test]
    fn zoom_zero_world_is_one_tile() {
        let tl = project(GeoPoint::new(MAX_LATITUDE, -180.0), 0.0);
        let br = project(GeoPoint::new(-MAX_LATITUDE, 180.0), 0.0);
        assert!(tl.x.abs() < 1e-6 && tl.y.abs() < 1e-6);
        assert!((br.x - 256.0).abs() < 1e-6 && (br.y - 256.0).abs() < 1e-6);
    }

    #[test]
    fn fit_bounds_snaps_down() {
        let bounds = GeoBounds {
            south: -10.0,
            west: -10.0,
            north: 10.0,
            east: 10.0,
        };
        let limits = ZoomLimits::default();
        let fitted = MapView::fit_bounds(&bounds, ViewSize::new(500.0, 500.0), 50.0, &limits);
        // 400px available for 20 degrees: 256 * 2^z * 20/360 <= 400 -> z <= 4.81
        assert_eq!(fitted.zoom, 4.75);
        assert!(fitted.center.lat.abs() < 1e-9);
        assert!(fitted.center.lng.abs() < 1e-9);
        let b = fitted.screen_box(&bounds);
        assert!(b.x >= 50.0 && b.right() <= 450.0);
    }

    #[test]
    fn point_bounds_use_max_zoom() {
        let bounds = GeoBounds::from_point(GeoPoint::new(1.0, 2.0));
        let limits = ZoomLimits::default();
        let fitted = MapView::fit_bounds(&bounds, ViewSize::new(500.0, 500.0), 50.0, &limits);
        assert_eq!(fitted.zoom, limits.max);
    }

    #[test]
    fn set_zoom_snaps() {
        let limits = ZoomLimits::default();
        assert_eq!(view().set_zoom(2.3, &limits).zoom, 2.25);
        assert_eq!(view().set_zoom(40.0, &limits).zoom, 18.0);
    }
}
