use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathStyle {
    pub weight: f32,
    pub opacity: f32,
    pub color: String,
    pub fill_color: String,
    pub fill_opacity: f32,
}

impl PathStyle {
    pub fn is_visible(&self) -> bool {
        (self.weight > 0.0 && self.opacity > 0.0) || self.fill_opacity > 0.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapStyle {
    pub font_family: String,
    pub font_size: f32,
    pub background: String,
    pub country: PathStyle,
    pub highlight: PathStyle,
    pub minimap_country: PathStyle,
    pub minimap_highlight: PathStyle,
    pub connector: PathStyle,
    pub panel_background: String,
    pub panel_border: String,
    pub tooltip_background: String,
    pub tooltip_border: String,
    pub tooltip_text: String,
    pub scale_color: String,
}

impl MapStyle {
    pub fn vademecum() -> Self {
        let highlight = PathStyle {
            weight: 1.0,
            opacity: 1.0,
            color: "darkgreen".to_string(),
            fill_color: "darkgreen".to_string(),
            fill_opacity: 0.5,
        };
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 14.0,
            background: "#FFFFFF".to_string(),
            country: PathStyle {
                weight: 0.25,
                opacity: 1.0,
                color: "black".to_string(),
                fill_color: "gray".to_string(),
                fill_opacity: 0.4,
            },
            minimap_highlight: highlight.clone(),
            highlight,
            minimap_country: PathStyle {
                weight: 0.0,
                opacity: 0.0,
                color: "black".to_string(),
                fill_color: "gray".to_string(),
                fill_opacity: 0.0,
            },
            connector: PathStyle {
                weight: 1.0,
                opacity: 1.0,
                color: "gray".to_string(),
                fill_color: "none".to_string(),
                fill_opacity: 0.0,
            },
            panel_background: "#FFFFFF".to_string(),
            panel_border: "#555555".to_string(),
            tooltip_background: "#FFFFFF".to_string(),
            tooltip_border: "#333333".to_string(),
            tooltip_text: "#222222".to_string(),
            scale_color: "#333333".to_string(),
        }
    }

    /// Same layout with the minimap showing neighbouring countries too.
    pub fn contextual() -> Self {
        let mut style = Self::vademecum();
        style.minimap_country = style.country.clone();
        style
    }
}

impl Default for MapStyle {
    fn default() -> Self {
        Self::vademecum()
    }
}
