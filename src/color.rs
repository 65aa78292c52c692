//! Colours as accepted by the graph styling options.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::GraphError;

/// An 8-bit RGBA colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

const NAMED: &[(&str, [u8; 3])] = &[
    ("black", [0x00, 0x00, 0x00]),
    ("white", [0xff, 0xff, 0xff]),
    ("red", [0xff, 0x00, 0x00]),
    ("green", [0x00, 0x80, 0x00]),
    ("lime", [0x00, 0xff, 0x00]),
    ("blue", [0x00, 0x00, 0xff]),
    ("yellow", [0xff, 0xff, 0x00]),
    ("cyan", [0x00, 0xff, 0xff]),
    ("magenta", [0xff, 0x00, 0xff]),
    ("gray", [0x80, 0x80, 0x80]),
    ("grey", [0x80, 0x80, 0x80]),
    ("silver", [0xc0, 0xc0, 0xc0]),
    ("orange", [0xff, 0xa5, 0x00]),
    ("purple", [0x80, 0x00, 0x80]),
    ("brown", [0xa5, 0x2a, 0x2a]),
    ("navy", [0x00, 0x00, 0x80]),
    ("teal", [0x00, 0x80, 0x80]),
    ("turquoise", [0x40, 0xe0, 0xd0]),
    ("royalblue", [0x41, 0x69, 0xe1]),
    ("steelblue", [0x46, 0x82, 0xb4]),
    ("lightsteelblue", [0xb0, 0xc4, 0xde]),
    ("skyblue", [0x87, 0xce, 0xeb]),
    ("darkblue", [0x00, 0x00, 0x8b]),
    ("darkgreen", [0x00, 0x64, 0x00]),
    ("darkred", [0x8b, 0x00, 0x00]),
    ("lightgray", [0xd3, 0xd3, 0xd3]),
    ("lightgrey", [0xd3, 0xd3, 0xd3]),
    ("darkgray", [0xa9, 0xa9, 0xa9]),
    ("darkgrey", [0xa9, 0xa9, 0xa9]),
];

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Parses `#rgb`, `#rrggbb`, `#rrggbbaa`, a grey level `"0.0"..="1.0"`,
    /// a single-letter code (`b g r c m y k w`) or a named colour.
    pub fn parse(text: &str) -> Result<Self, GraphError> {
        let s = text.trim();
        let bad = || GraphError::invalid(format!("unrecognised colour {text:?}"));

        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(bad);
        }

        if let Ok(level) = s.parse::<f64>() {
            if !(0.0..=1.0).contains(&level) {
                return Err(bad());
            }
            let v = (level * 255.0).round() as u8;
            return Ok(Color::rgb(v, v, v));
        }

        let lower = s.to_ascii_lowercase();
        let short = match lower.as_str() {
            "b" => Some(Color::rgb(0x00, 0x00, 0xff)),
            "g" => Some(Color::rgb(0x00, 0x80, 0x00)),
            "r" => Some(Color::rgb(0xff, 0x00, 0x00)),
            "c" => Some(Color::rgb(0x00, 0xbf, 0xbf)),
            "m" => Some(Color::rgb(0xbf, 0x00, 0xbf)),
            "y" => Some(Color::rgb(0xbf, 0xbf, 0x00)),
            "k" => Some(Color::BLACK),
            "w" => Some(Color::WHITE),
            _ => None,
        };
        if let Some(c) = short {
            return Ok(c);
        }

        NAMED
            .iter()
            .find(|(name, _)| *name == lower)
            .map(|(_, [r, g, b])| Color::rgb(*r, *g, *b))
            .ok_or_else(bad)
    }

    /// `#rrggbb`, or `#rrggbbaa` when not opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    /// Channels scaled to `0.0..=1.0`, as PostScript and PDF expect.
    pub fn unit_rgb(&self) -> (f64, f64, f64) {
        (
            self.r as f64 / 255.0,
            self.g as f64 / 255.0,
            self.b as f64 / 255.0,
        )
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        3 => {
            let nib = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);
            Some(Color::rgb(nib(0)?, nib(1)?, nib(2)?))
        }
        6 => Some(Color::rgb(byte(0)?, byte(2)?, byte(4)?)),
        8 => Some(Color::rgba(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
        _ => None,
    }
}

impl FromStr for Color {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::parse(s)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Color {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Color::parse(&s).map_err(serde::de::Error::custom)
    }
}
