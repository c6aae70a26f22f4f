//! Connector lines between a highlighted country and the minimap panel.
//!
//! The primary line always goes to the panel corner nearest the country
//! centroid. The secondary line goes to whichever of the next two nearest
//! corners points in the more different direction, so the two lines fan out
//! instead of running side by side.

use serde::{Deserialize, Serialize};

use crate::geometry::{Corner, GeoPoint, PanelRect, ScreenPoint};
use crate::projection::Projection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AngleMetric {
    /// Plain `|a - b|` of the two angles in `[0, 360)`.
    #[default]
    Absolute,
    /// Shortest way around the circle, within `[0, 180]`.
    Circular,
}

impl AngleMetric {
    pub fn difference(self, a: f64, b: f64) -> f64 {
        let diff = (a - b).abs();
        match self {
            AngleMetric::Absolute => diff,
            AngleMetric::Circular => diff.min(360.0 - diff),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CandidateLine {
    pub corner: ScreenPoint,
    pub distance: f64,
    pub tag: Corner,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoSegment {
    pub from: GeoPoint,
    pub to: GeoPoint,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConnectorPair {
    pub centroid: ScreenPoint,
    pub primary: CandidateLine,
    pub secondary: CandidateLine,
    pub primary_geo: GeoSegment,
    pub secondary_geo: GeoSegment,
}

impl ConnectorPair {
    pub fn segments(&self) -> [GeoSegment; 2] {
        [self.primary_geo, self.secondary_geo]
    }
}

/// The four corner candidates ordered by distance from `centroid`.
///
/// The sort is stable, so equal distances keep the
/// top-left, top-right, bottom-left, bottom-right order.
pub fn rank_corners(centroid: ScreenPoint, panel: &PanelRect) -> [CandidateLine; 4] {
    let mut candidates = panel.corners().map(|(tag, corner)| CandidateLine {
        corner,
        distance: centroid.distance_to(corner),
        tag,
    });
    candidates.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    candidates
}

pub fn select_corners(
    centroid: ScreenPoint,
    panel: &PanelRect,
    metric: AngleMetric,
) -> (CandidateLine, CandidateLine) {
    let [nearest, second, third, _] = rank_corners(centroid, panel);
    let reference = centroid.angle_to(nearest.corner);
    let second_diff = metric.difference(centroid.angle_to(second.corner), reference);
    let third_diff = metric.difference(centroid.angle_to(third.corner), reference);

    // ties keep the nearer corner
    let secondary = if third_diff > second_diff { third } else { second };
    (nearest, secondary)
}

/// Both connector lines, projected back to geographic coordinates.
pub fn place_connectors<P: Projection + ?Sized>(
    centroid: ScreenPoint,
    panel: &PanelRect,
    projection: &P,
    metric: AngleMetric,
) -> ConnectorPair {
    let (primary, secondary) = select_corners(centroid, panel, metric);
    let from = projection.to_geo(centroid);
    ConnectorPair {
        centroid,
        primary,
        secondary,
        primary_geo: GeoSegment {
            from,
            to: projection.to_geo(primary.corner),
        },
        secondary_geo: GeoSegment {
            from,
            to: projection.to_geo(secondary.corner),
        },
    }
}
