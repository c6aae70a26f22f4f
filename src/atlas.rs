use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::geometry::{GeoBounds, GeoPoint};

pub const MISSING_CODE: &str = "--";

/// Rings of one polygon; the first is the outer boundary, the rest are holes.
pub type Polygon = Vec<Vec<GeoPoint>>;

#[derive(Debug, Clone)]
pub struct Country {
    pub name: String,
    pub code: String,
    pub polygons: Vec<Polygon>,
    pub bounds: GeoBounds,
}

#[derive(Debug, Clone)]
pub struct Atlas {
    pub countries: Vec<Country>,
    pub bounds: GeoBounds,
}

#[derive(Debug, Clone)]
pub struct AtlasOptions {
    pub name_property: String,
    pub code_property: String,
}

impl Default for AtlasOptions {
    fn default() -> Self {
        Self {
            name_property: "name_it".to_string(),
            code_property: "iso_a2".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    properties: Option<Map<String, Value>>,
    #[serde(default)]
    geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum Geometry {
    Polygon { coordinates: Vec<Vec<Vec<f64>>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Vec<f64>>>> },
    #[serde(other)]
    Unsupported,
}

pub fn parse_atlas(input: &str, options: &AtlasOptions) -> Result<Atlas> {
    let collection: FeatureCollection = serde_json::from_str(input)?;
    let mut countries = Vec::with_capacity(collection.features.len());

    for (idx, feature) in collection.features.into_iter().enumerate() {
        let properties = feature.properties.unwrap_or_default();
        let Some(name) = string_property(&properties, &options.name_property) else {
            warn!(feature = idx, property = %options.name_property, "skipping feature without a name");
            continue;
        };
        let code = string_property(&properties, &options.code_property)
            .unwrap_or_else(|| MISSING_CODE.to_string());

        let polygons = match feature.geometry {
            Some(Geometry::Polygon { coordinates }) => vec![convert_polygon(coordinates, idx)?],
            Some(Geometry::MultiPolygon { coordinates }) => coordinates
                .into_iter()
                .map(|polygon| convert_polygon(polygon, idx))
                .collect::<Result<Vec<_>>>()?,
            Some(Geometry::Unsupported) | None => {
                warn!(feature = idx, %name, "skipping feature without polygon geometry");
                continue;
            }
        };

        let Some(bounds) = GeoBounds::from_points(polygons.iter().flatten().flatten().copied()) else {
            warn!(feature = idx, %name, "skipping feature with empty geometry");
            continue;
        };
        countries.push(Country {
            name,
            code,
            polygons,
            bounds,
        });
    }

    let bounds = countries
        .iter()
        .map(|country| country.bounds)
        .reduce(|acc, bounds| acc.union(&bounds))
        .ok_or_else(|| Error::EmptyAtlas {
            property: options.name_property.clone(),
        })?;
    debug!(countries = countries.len(), "atlas loaded");
    Ok(Atlas { countries, bounds })
}

fn string_property(properties: &Map<String, Value>, key: &str) -> Option<String> {
    match properties.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn convert_polygon(rings: Vec<Vec<Vec<f64>>>, feature: usize) -> Result<Polygon> {
    rings
        .into_iter()
        .map(|ring| {
            ring.into_iter()
                .map(|position| match position.as_slice() {
                    [lng, lat, ..] => Ok(GeoPoint::new(*lat, *lng)),
                    _ => Err(Error::InvalidPosition { feature }),
                })
                .collect::<Result<Vec<_>>>()
        })
        .collect()
}

impl Atlas {
    pub fn len(&self) -> usize {
        self.countries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }

    /// Exact name match first, then case-insensitive name or code.
    pub fn find(&self, query: &str) -> Option<&Country> {
        let query = query.trim();
        self.countries
            .iter()
            .find(|country| country.name == query)
            .or_else(|| {
                let folded = query.to_lowercase();
                self.countries.iter().find(|country| {
                    country.name.to_lowercase() == folded
                        || (country.code != MISSING_CODE && country.code.eq_ignore_ascii_case(query))
                })
            })
    }

    pub fn index_of(&self, query: &str) -> Option<usize> {
        let found = self.find(query)?;
        self.countries.iter().position(|country| std::ptr::eq(country, found))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
      "type": "FeatureCollection",
      "features": [
        {"type": "Feature", "properties": {"name_it": "Cile", "iso_a2": "CL"},
         "geometry": {"type": "Polygon", "coordinates": [[[-75, -55], [-67, -55], [-67, -17], [-75, -17], [-75, -55]]]}},
        {"type": "Feature", "properties": {"name": "nameless"},
         "geometry": {"type": "Polygon", "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 0]]]}},
        {"type": "Feature", "properties": {"name_it": "Punto"},
         "geometry": {"type": "Point", "coordinates": [0, 0]}},
        {"type": "Feature", "properties": {"name_it": "Isole", "iso_a2": "IS"},
         "geometry": {"type": "MultiPolygon", "coordinates": [
            [[[10, 10, 5], [12, 10, 5], [12, 12, 5], [10, 10, 5]]],
            [[[20, -5], [22, -5], [22, -3], [20, -5]]]
         ]}}
      ]
    }"#;

    #[test]
    fn parses_polygons_and_skips_the_rest() {
        let atlas = parse_atlas(SAMPLE, &AtlasOptions::default()).unwrap();
        let names: Vec<&str> = atlas.countries.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Cile", "Isole"]);

        let isole = &atlas.countries[1];
        assert_eq!(isole.polygons.len(), 2);
        assert_eq!(isole.bounds.south, -5.0);
        assert_eq!(isole.bounds.east, 22.0);
        assert_eq!(atlas.bounds.west, -75.0);
        assert_eq!(atlas.bounds.north, 12.0);
    }

    #[test]
    fn finds_by_name_or_code() {
        let atlas = parse_atlas(SAMPLE, &AtlasOptions::default()).unwrap();
        assert_eq!(atlas.find("Cile").map(|c| c.code.as_str()), Some("CL"));
        assert_eq!(atlas.find("cile").map(|c| c.code.as_str()), Some("CL"));
        assert_eq!(atlas.find("is").map(|c| c.name.as_str()), Some("Isole"));
        assert_eq!(atlas.index_of("Isole"), Some(1));
        assert!(atlas.find("Atlantide").is_none());
    }

    #[test]
    fn accented_names_match_in_any_case() {
        let input = r#"{"features": [{"properties": {"name_it": "Perù", "iso_a2": "PE"},
            "geometry": {"type": "Polygon", "coordinates": [[[-81, -18], [-69, -18], [-69, 0], [-81, -18]]]}}]}"#;
        let atlas = parse_atlas(input, &AtlasOptions::default()).unwrap();
        assert_eq!(atlas.index_of("PERÙ"), Some(0));
        assert_eq!(atlas.index_of("perù"), Some(0));
        assert!(atlas.find("peru").is_none());
    }

    #[test]
    fn custom_name_property() {
        let options = AtlasOptions {
            name_property: "name".to_string(),
            ..Default::default()
        };
        let atlas = parse_atlas(SAMPLE, &options).unwrap();
        assert_eq!(atlas.len(), 1);
        assert_eq!(atlas.countries[0].code, MISSING_CODE);
    }

    #[test]
    fn short_position_is_an_error() {
        let input = r#"{"features": [{"properties": {"name_it": "X"},
            "geometry": {"type": "Polygon", "coordinates": [[[1]]]}}]}"#;
        assert!(matches!(
            parse_atlas(input, &AtlasOptions::default()),
            Err(Error::InvalidPosition { feature: 0 })
        ));
    }

    #[test]
    fn empty_collection_is_an_error() {
        let input = r#"{"type": "FeatureCollection", "features": []}"#;
        assert!(matches!(
            parse_atlas(input, &AtlasOptions::default()),
            Err(Error::EmptyAtlas { .. })
        ));
    }
}
