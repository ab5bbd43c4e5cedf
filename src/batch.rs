//! JSON description of a canvas and line commands to draw on it
//!
//! ```json
//! {
//!     "width": 400,
//!     "height": 200,
//!     "background": "#000000",
//!     "commands": [
//!         { "start": [0, 100], "end": [399, 100], "thickness": 3, "color": "#ffffff" },
//!         {
//!             "start": [0, 0],
//!             "end": [399, 199],
//!             "gradient": [
//!                 { "position": 0.0, "color": "#ff0000" },
//!                 { "position": 1.0, "color": "#0000ff" }
//!             ]
//!         }
//!     ]
//! }
//! ```
use crate::{Color, DrawLineCommand, Generator, Gradient, GradientError, GradientMark, ImageOwned, Line};
use serde::{Deserialize, Serialize};
use std::{fmt, io::Read};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSpec {
    pub width: usize,
    pub height: usize,
    /// Color of the canvas created by [`BatchSpec::canvas`]
    #[serde(default = "default_background")]
    pub background: Color,
    #[serde(default)]
    pub commands: Vec<LineSpec>,
}

fn default_background() -> Color {
    Color::BLACK
}

fn default_thickness() -> i32 {
    1
}

/// Single line, either `color` or `gradient` (or both) must be present
///
/// When both are present the gradient marks are placed on top of the flat
/// gradient of the color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineSpec {
    pub start: [i32; 2],
    pub end: [i32; 2],
    #[serde(default = "default_thickness")]
    pub thickness: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub gradient: Vec<MarkSpec>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarkSpec {
    pub position: f32,
    pub color: Color,
}

impl BatchSpec {
    pub fn from_json(json: &str) -> Result<Self, BatchError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_reader(reader: impl Read) -> Result<Self, BatchError> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn to_json(&self) -> Result<String, BatchError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Create image of the batch size filled with the background color
    pub fn canvas(&self) -> ImageOwned<Color> {
        ImageOwned::new_filled(self.height, self.width, self.background)
    }

    /// Convert all line descriptions to commands, preserving their order
    pub fn commands(&self) -> Result<Vec<DrawLineCommand>, BatchError> {
        self.commands
            .iter()
            .enumerate()
            .map(|(index, spec)| spec.to_command(index))
            .collect()
    }

    pub fn generator(&self) -> Result<Generator<DrawLineCommand>, BatchError> {
        Ok(self.commands()?.into_iter().collect())
    }
}

impl LineSpec {
    fn to_command(&self, index: usize) -> Result<DrawLineCommand, BatchError> {
        let mut gradient = self.color.map(Gradient::from_color).unwrap_or_default();
        for mark in self.gradient.iter() {
            gradient
                .mark(GradientMark::new(mark.color, mark.position))
                .map_err(|error| BatchError::Gradient { index, error })?;
        }
        if gradient.is_empty() {
            return Err(BatchError::MissingColor { index });
        }
        let line = Line::new(self.start, self.end, self.thickness);
        Ok(DrawLineCommand::new(line, gradient))
    }
}

#[derive(Debug)]
pub enum BatchError {
    Json(serde_json::Error),
    /// Command has neither color nor gradient
    MissingColor { index: usize },
    Gradient { index: usize, error: GradientError },
}

impl fmt::Display for BatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchError::Json(error) => write!(f, "Invalid batch JSON: {}", error),
            BatchError::MissingColor { index } => {
                write!(f, "Command #{} requires either color or gradient", index)
            }
            BatchError::Gradient { index, error } => write!(f, "Command #{}: {}", index, error),
        }
    }
}

impl std::error::Error for BatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BatchError::Json(error) => Some(error),
            BatchError::Gradient { error, .. } => Some(error),
            BatchError::MissingColor { .. } => None,
        }
    }
}

impl From<serde_json::Error> for BatchError {
    fn from(error: serde_json::Error) -> Self {
        Self::Json(error)
    }
}
