//! Declarative map overlays and the built-in Arequipa dataset.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::location::{Coordinate, ParseError};

/// Base map style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MapType {
    #[default]
    Normal,
    Hybrid,
    Terrain,
    Satellite,
}

impl MapType {
    pub const ALL: [MapType; 4] = [Self::Normal, Self::Hybrid, Self::Terrain, Self::Satellite];

    /// Menu label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Hybrid => "H\u{ed}brido",
            Self::Terrain => "Terreno",
            Self::Satellite => "Sat\u{e9}lite",
        }
    }

    /// Accepts the English name or the menu label, case-insensitive.
    pub fn parse(s: &str) -> Result<Self, ParseError> {
        let lower = s.trim().to_lowercase();
        match lower.as_str() {
            "normal" => Ok(Self::Normal),
            "hybrid" | "h\u{ed}brido" | "hibrido" => Ok(Self::Hybrid),
            "terrain" | "terreno" => Ok(Self::Terrain),
            "satellite" | "sat\u{e9}lite" | "satelite" => Ok(Self::Satellite),
            _ => Err(ParseError::MapType(s.to_string())),
        }
    }
}

impl fmt::Display for MapType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => write!(f, "normal"),
            Self::Hybrid => write!(f, "hybrid"),
            Self::Terrain => write!(f, "terrain"),
            Self::Satellite => write!(f, "satellite"),
        }
    }
}

impl std::str::FromStr for MapType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// RGBA color, alpha in 0.0..=1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Color {
    pub const RED: Color = Color::rgb(0xFF, 0x00, 0x00);
    pub const GREEN: Color = Color::rgb(0x00, 0xFF, 0x00);
    pub const BLUE: Color = Color::rgb(0x00, 0x00, 0xFF);
    pub const YELLOW: Color = Color::rgb(0xFF, 0xFF, 0x00);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerIcon {
    pub asset: String,
    /// Rendered as a square of this many pixels.
    pub size_px: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub position: Coordinate,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<MarkerIcon>,
}

impl Marker {
    pub fn new(position: Coordinate, title: impl Into<String>) -> Self {
        Self { position, title: title.into(), snippet: None, icon: None }
    }

    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = Some(snippet.into());
        self
    }

    pub fn with_icon(mut self, asset: impl Into<String>, size_px: u32) -> Self {
        self.icon = Some(MarkerIcon { asset: asset.into(), size_px });
        self
    }

    /// The "you are here" marker.
    pub fn current_location(position: Coordinate) -> Self {
        Self::new(position, "Ubicaci\u{f3}n Actual").with_snippet("Est\u{e1}s aqu\u{ed}")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub name: String,
    pub points: Vec<Coordinate>,
    pub stroke_color: Color,
    pub fill_color: Color,
    pub stroke_width: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    pub name: String,
    pub points: Vec<Coordinate>,
    pub color: Color,
    pub width: f32,
}

impl Polyline {
    /// Sum of the great-circle lengths of every segment, in metres.
    pub fn length_m(&self) -> f64 {
        self.points
            .windows(2)
            .map(|w| w[0].distance_to(&w[1]))
            .sum()
    }
}

/// Every static overlay drawn on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overlays {
    pub markers: Vec<Marker>,
    pub polygons: Vec<Polygon>,
    pub polylines: Vec<Polyline>,
}

// ─── Built-in dataset ───────────────────────────────────────────

pub const AREQUIPA: Coordinate = Coordinate::from_static(-16.4040102, -71.559611);
pub const YURA: Coordinate = Coordinate::from_static(-16.2520984, -71.6836503);

const POINTS_OF_INTEREST: &[(f64, f64, &str)] = &[
    (-16.433415, -71.5442652, "JLByR"),
    (-16.4205151, -71.4945209, "Paucarpata"),
    (-16.3524187, -71.5675994, "Zamacola"),
];

const PLAZA_DE_ARMAS: &[(f64, f64)] = &[
    (-16.398866, -71.536961),
    (-16.398744, -71.536529),
    (-16.399178, -71.536289),
    (-16.399299, -71.536721),
];

const PARQUE_LAMBRAMANI: &[(f64, f64)] = &[
    (-16.422704, -71.530830),
    (-16.422920, -71.531340),
    (-16.423264, -71.531110),
    (-16.423050, -71.530600),
];

const MALL_AVENTURA: &[(f64, f64)] = &[
    (-16.432292, -71.509145),
    (-16.432757, -71.509626),
    (-16.433013, -71.509310),
    (-16.432566, -71.508853),
];

const TOURIST_ROUTE: &[(f64, f64)] = &[
    (-16.398866, -71.536961),  // Plaza de Armas
    (-16.4040102, -71.559611), // Arequipa
    (-16.4205151, -71.4945209), // Paucarpata
];

const BIKE_TRAIL: &[(f64, f64)] = &[
    (-16.430999, -71.537649),
    (-16.431130, -71.541150),
    (-16.432120, -71.543500),
    (-16.433000, -71.546000),
];

fn points(raw: &[(f64, f64)]) -> Vec<Coordinate> {
    raw.iter().map(|&(lat, lon)| Coordinate::from_static(lat, lon)).collect()
}

/// Markers, polygons and routes around Arequipa, Perú.
pub fn arequipa_overlays() -> Overlays {
    let mut markers = vec![Marker::new(AREQUIPA, "Arequipa, Per\u{fa}").with_icon("monta_icon.png", 150)];
    markers.extend(POINTS_OF_INTEREST.iter().map(|&(lat, lon, title)| {
        Marker::new(Coordinate::from_static(lat, lon), title).with_snippet("Punto de inter\u{e9}s")
    }));

    let polygons = vec![
        Polygon {
            name: "Plaza de Armas".into(),
            points: points(PLAZA_DE_ARMAS),
            stroke_color: Color::RED,
            fill_color: Color::BLUE.with_alpha(0.5),
            stroke_width: 5.0,
        },
        Polygon {
            name: "Parque Lambramani".into(),
            points: points(PARQUE_LAMBRAMANI),
            stroke_color: Color::GREEN,
            fill_color: Color::GREEN.with_alpha(0.5),
            stroke_width: 5.0,
        },
        Polygon {
            name: "Mall Aventura".into(),
            points: points(MALL_AVENTURA),
            stroke_color: Color::YELLOW,
            fill_color: Color::YELLOW.with_alpha(0.5),
            stroke_width: 5.0,
        },
    ];

    let polylines = vec![
        Polyline {
            name: "Ruta tur\u{ed}stica".into(),
            points: points(TOURIST_ROUTE),
            color: Color::BLUE,
            width: 6.0,
        },
        Polyline {
            name: "Recorrido en bicicleta".into(),
            points: points(BIKE_TRAIL),
            color: Color::RED,
            width: 8.0,
        },
    ];

    Overlays { markers, polygons, polylines }
}
