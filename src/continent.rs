use serde::{Deserialize, Serialize};

use crate::export::CropRegion;
use crate::geometry::ScreenBox;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum Continent {
    #[default]
    Americas,
    Europe,
    Africa,
    Asia,
    Oceania,
}

/// Framing of one continent sheet on a 2560x1440 viewport.
#[derive(Debug, Clone, PartialEq)]
pub struct ContinentPreset {
    pub geojson: &'static str,
    pub main_zoom: f64,
    pub panel: ScreenBox,
    pub panel_candidates: Vec<ScreenBox>,
    pub crop: CropRegion,
}

impl Continent {
    pub fn name(self) -> &'static str {
        match self {
            Continent::Americas => "Americas",
            Continent::Europe => "Europe",
            Continent::Africa => "Africa",
            Continent::Asia => "Asia",
            Continent::Oceania => "Oceania",
        }
    }

    pub fn preset(self) -> ContinentPreset {
        match self {
            // the Americas are tall: crop a portrait strip, panel on the right
            Continent::Americas => ContinentPreset {
                geojson: "geojson/Americas.json",
                main_zoom: 2.3,
                panel: ScreenBox::new(1690.0, 240.0, 480.0, 480.0),
                panel_candidates: vec![
                    ScreenBox::new(1690.0, 240.0, 480.0, 480.0),
                    ScreenBox::new(1690.0, 890.0, 480.0, 480.0),
                    ScreenBox::new(880.0, 890.0, 480.0, 480.0),
                ],
                crop: CropRegion::new(850, 200, 1350, 1200),
            },
            Continent::Europe => ContinentPreset {
                geojson: "geojson/Europe.json",
                main_zoom: 3.5,
                panel: ScreenBox::new(1760.0, 180.0, 440.0, 440.0),
                panel_candidates: vec![
                    ScreenBox::new(1760.0, 180.0, 440.0, 440.0),
                    ScreenBox::new(380.0, 180.0, 440.0, 440.0),
                    ScreenBox::new(1760.0, 860.0, 440.0, 440.0),
                ],
                crop: CropRegion::new(340, 140, 1900, 1200),
            },
            Continent::Africa => ContinentPreset {
                geojson: "geojson/Africa.json",
                main_zoom: 2.75,
                panel: ScreenBox::new(300.0, 820.0, 460.0, 460.0),
                panel_candidates: vec![
                    ScreenBox::new(300.0, 820.0, 460.0, 460.0),
                    ScreenBox::new(1800.0, 820.0, 460.0, 460.0),
                    ScreenBox::new(300.0, 200.0, 460.0, 460.0),
                ],
                crop: CropRegion::new(260, 140, 2040, 1200),
            },
            Continent::Asia => ContinentPreset {
                geojson: "geojson/Asia.json",
                main_zoom: 2.5,
                panel: ScreenBox::new(1880.0, 880.0, 460.0, 460.0),
                panel_candidates: vec![
                    ScreenBox::new(1880.0, 880.0, 460.0, 460.0),
                    ScreenBox::new(220.0, 880.0, 460.0, 460.0),
                    ScreenBox::new(1880.0, 160.0, 460.0, 460.0),
                ],
                crop: CropRegion::new(180, 120, 2200, 1260),
            },
            Continent::Oceania => ContinentPreset {
                geojson: "geojson/Oceania.json",
                main_zoom: 3.0,
                panel: ScreenBox::new(260.0, 180.0, 460.0, 460.0),
                panel_candidates: vec![
                    ScreenBox::new(260.0, 180.0, 460.0, 460.0),
                    ScreenBox::new(1840.0, 180.0, 460.0, 460.0),
                    ScreenBox::new(260.0, 820.0, 460.0, 460.0),
                ],
                crop: CropRegion::new(220, 140, 2120, 1200),
            },
        }
    }
}
