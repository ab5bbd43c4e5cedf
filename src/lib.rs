//! Conflict-aware parallel rasterization of line drawing commands.
//!
//! Main features:
//!  - Horizontal, vertical and diagonal lines of arbitrary integer thickness
//!  - Multi-stop color gradients along the line
//!  - Commands with non-intersecting affected areas are drawn concurrently
//!
//! ```
//! use linegen::*;
//!
//! let mut image = ImageOwned::new_filled(200, 400, Color::BLACK);
//! let generator: Generator<DrawLineCommand> = (0..10)
//!     .map(|i| DrawLineCommand::plain(Line::new((0, i * 20), (399, i * 20), 3), Color::WHITE))
//!     .collect();
//! assert_eq!(generator.apply_commands(&mut image).ok(), Some(1));
//! ```
#![deny(warnings)]

mod color;
mod command;
mod drawing;
mod generator;
mod geometry;
mod grad;
mod image;
mod rasterize;
mod utils;

#[cfg(feature = "serde")]
mod batch;
#[cfg(feature = "png")]
mod png;

pub use color::{Color, ColorError};
pub use command::{Command, CommandError, DrawLineCommand};
pub use drawing::{Drawing, DrawingMut, RegionMut};
pub use generator::{partition, Batch, CommandFailure, Generator, Schedule, ScheduleError};
pub use geometry::{Line, LineKind, Point, Rect};
pub use grad::{Gradient, GradientError, GradientMark, POS_MAX};
pub use image::{Image, ImageMut, ImageMutRef, ImageOwned, ImageRef, Shape};
pub use rasterize::draw_line;

#[cfg(feature = "serde")]
pub use batch::{BatchError, BatchSpec, LineSpec, MarkSpec};
#[cfg(feature = "png")]
pub use crate::png::{read_png, write_png, PngError};
