use serde::{Deserialize, Serialize};

const EARTH_RADIUS_M: f64 = 6_371_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(self, other: ScreenPoint) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Direction from `self` towards `other`, in degrees within `[0, 360)`.
    pub fn angle_to(self, other: ScreenPoint) -> f64 {
        let degrees = (other.y - self.y).atan2(other.x - self.x).to_degrees();
        let normalized = degrees.rem_euclid(360.0);
        // rem_euclid can round up to exactly 360 for tiny negative inputs
        if normalized >= 360.0 { 0.0 } else { normalized }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn distance_to(self, other: GeoPoint) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let sin_dlat = ((other.lat - self.lat).to_radians() / 2.0).sin();
        let sin_dlng = ((other.lng - self.lng).to_radians() / 2.0).sin();
        let a = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlng * sin_dlng;
        2.0 * EARTH_RADIUS_M * a.sqrt().min(1.0).asin()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl GeoBounds {
    pub fn from_point(point: GeoPoint) -> Self {
        Self {
            south: point.lat,
            west: point.lng,
            north: point.lat,
            east: point.lng,
        }
    }

    pub fn extend(&mut self, point: GeoPoint) {
        self.south = self.south.min(point.lat);
        self.north = self.north.max(point.lat);
        self.west = self.west.min(point.lng);
        self.east = self.east.max(point.lng);
    }

    pub fn union(&self, other: &GeoBounds) -> GeoBounds {
        GeoBounds {
            south: self.south.min(other.south),
            west: self.west.min(other.west),
            north: self.north.max(other.north),
            east: self.east.max(other.east),
        }
    }

    pub fn from_points<I: IntoIterator<Item = GeoPoint>>(points: I) -> Option<Self> {
        let mut iter = points.into_iter();
        let mut bounds = GeoBounds::from_point(iter.next()?);
        for point in iter {
            bounds.extend(point);
        }
        Some(bounds)
    }

    pub fn center(&self) -> GeoPoint {
        GeoPoint::new((self.south + self.north) / 2.0, (self.west + self.east) / 2.0)
    }

    pub fn south_west(&self) -> GeoPoint {
        GeoPoint::new(self.south, self.west)
    }

    pub fn north_east(&self) -> GeoPoint {
        GeoPoint::new(self.north, self.east)
    }

    pub fn north_west(&self) -> GeoPoint {
        GeoPoint::new(self.north, self.west)
    }

    pub fn south_east(&self) -> GeoPoint {
        GeoPoint::new(self.south, self.east)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScreenBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ScreenBox {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_corners(a: ScreenPoint, b: ScreenPoint) -> Self {
        let x = a.x.min(b.x);
        let y = a.y.min(b.y);
        Self {
            x,
            y,
            width: (a.x - b.x).abs(),
            height: (a.y - b.y).abs(),
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn overlap_area(&self, other: &ScreenBox) -> f64 {
        let w = self.right().min(other.right()) - self.x.max(other.x);
        let h = self.bottom().min(other.bottom()) - self.y.max(other.y);
        if w <= 0.0 || h <= 0.0 { 0.0 } else { w * h }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PanelRect {
    pub top_left: ScreenPoint,
    pub top_right: ScreenPoint,
    pub bottom_left: ScreenPoint,
    pub bottom_right: ScreenPoint,
}

impl PanelRect {
    pub fn from_box(rect: &ScreenBox) -> Self {
        Self {
            top_left: ScreenPoint::new(rect.x, rect.y),
            top_right: ScreenPoint::new(rect.right(), rect.y),
            bottom_left: ScreenPoint::new(rect.x, rect.bottom()),
            bottom_right: ScreenPoint::new(rect.right(), rect.bottom()),
        }
    }

    /// Pulls the top corners down and the bottom corners up by `dy` pixels so
    /// connector ends land on the panel border rather than just outside it.
    pub fn inset_vertical(mut self, dy: f64) -> Self {
        self.top_left.y += dy;
        self.top_right.y += dy;
        self.bottom_left.y -= dy;
        self.bottom_right.y -= dy;
        self
    }

    pub fn corner(&self, corner: Corner) -> ScreenPoint {
        match corner {
            Corner::TopLeft => self.top_left,
            Corner::TopRight => self.top_right,
            Corner::BottomLeft => self.bottom_left,
            Corner::BottomRight => self.bottom_right,
        }
    }

    pub fn corners(&self) -> [(Corner, ScreenPoint); 4] {
        Corner::ALL.map(|corner| (corner, self.corner(corner)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn angle_is_normalized() {
        let origin = ScreenPoint::new(0.0, 0.0);
        assert_eq!(origin.angle_to(ScreenPoint::new(1.0, 0.0)), 0.0);
        assert!((origin.angle_to(ScreenPoint::new(0.0, 1.0)) - 90.0).abs() < 1e-9);
        assert!((origin.angle_to(ScreenPoint::new(-1.0, 0.0)) - 180.0).abs() < 1e-9);
        assert!((origin.angle_to(ScreenPoint::new(0.0, -1.0)) - 270.0).abs() < 1e-9);
        assert_eq!(origin.angle_to(origin), 0.0);
    }

    #[test]
    fn overlap_area_ignores_touching_edges() {
        let a = ScreenBox::new(0.0, 0.0, 10.0, 10.0);
        let b = ScreenBox::new(10.0, 0.0, 10.0, 10.0);
        let c = ScreenBox::new(5.0, 5.0, 10.0, 10.0);
        assert_eq!(a.overlap_area(&b), 0.0);
        assert_eq!(a.overlap_area(&c), 25.0);
    }

    #[test]
    fn haversine_quarter_meridian() {
        let d = GeoPoint::new(0.0, 0.0).distance_to(GeoPoint::new(90.0, 0.0));
        assert!((d - 10_007_543.0).abs() < 10.0, "{d}");
    }

    #[test]
    fn panel_inset_moves_rows_inward() {
        let panel = PanelRect::from_box(&ScreenBox::new(10.0, 20.0, 100.0, 50.0)).inset_vertical(1.0);
        assert_eq!(panel.top_left, ScreenPoint::new(10.0, 21.0));
        assert_eq!(panel.bottom_right, ScreenPoint::new(110.0, 69.0));
    }
}
