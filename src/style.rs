use std::fmt;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use eyre::{Result, WrapErr};
use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::GraphError;

/// Encoded image format of a rendered graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Png,
    Pdf,
    Ps,
    Svg,
    /// Tightly packed RGBA8 pixels, row-major, top row first.
    Raw,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Pdf => "pdf",
            OutputFormat::Ps => "ps",
            OutputFormat::Svg => "svg",
            OutputFormat::Raw => "raw",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = GraphError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(OutputFormat::Png),
            "pdf" => Ok(OutputFormat::Pdf),
            "ps" | "eps" => Ok(OutputFormat::Ps),
            "svg" => Ok(OutputFormat::Svg),
            "raw" | "rgba" => Ok(OutputFormat::Raw),
            other => Err(GraphError::invalid(format!("unsupported output format {other:?}"))),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderStyle {
    pub width: u32,
    pub height: u32,
    pub color: Color,
    pub background: Color,
    pub transparent: bool,
    pub format: OutputFormat,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            width: 800,
            height: 200,
            color: Color::RED,
            background: Color::WHITE,
            transparent: false,
            format: OutputFormat::Png,
        }
    }
}

impl RenderStyle {
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_colors(mut self, color: Color, background: Color) -> Self {
        self.color = color;
        self.background = background;
        self
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn transparent(mut self, transparent: bool) -> Self {
        self.transparent = transparent;
        self
    }

    pub fn validate(&self) -> std::result::Result<(), GraphError> {
        if self.width == 0 || self.height == 0 {
            return Err(GraphError::invalid(format!(
                "graph size must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

/// Persisted graph settings: style plus an optional time window.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    pub style: RenderStyle,
    pub starttime: Option<DateTime<Utc>>,
    pub endtime: Option<DateTime<Utc>>,
}

impl GraphConfig {
    pub fn from_json_str(s: &str) -> Result<Self> {
        let config: GraphConfig = serde_json::from_str(s).wrap_err("invalid graph config")?;
        config.style.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read graph config {}", path.display()))?;
        Self::from_json_str(&text).wrap_err_with(|| format!("in {}", path.display()))
    }
}
