use crate::Color;
use std::{cmp::Ordering, fmt};

/// Maximum value of the gradient mark position, positions live in `[0, POS_MAX]`
pub const POS_MAX: f32 = 1.0;

/// Specifies color at a particular position of the gradient
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientMark {
    pub color: Color,
    pub position: f32,
}

impl GradientMark {
    pub fn new(color: Color, position: f32) -> Self {
        Self { color, position }
    }
}

/// Piecewise linear color ramp
///
/// Marks are always sorted by position and positions are unique. A plain color is
/// encoded as two marks of the same color at `0` and `POS_MAX`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Gradient {
    marks: Vec<GradientMark>,
}

impl Gradient {
    /// Gradient without any marks
    pub fn empty() -> Self {
        Self::default()
    }

    /// Flat gradient of the color passed
    pub fn from_color(color: Color) -> Self {
        Self {
            marks: vec![
                GradientMark::new(color, 0.0),
                GradientMark::new(color, POS_MAX),
            ],
        }
    }

    /// Build gradient by marking all provided marks in order
    pub fn new(marks: impl IntoIterator<Item = GradientMark>) -> Result<Self, GradientError> {
        let mut gradient = Self::empty();
        for mark in marks {
            gradient.mark(mark)?;
        }
        Ok(gradient)
    }

    /// Same as [`Gradient::mark`] but consumes and returns the gradient
    pub fn with_mark(mut self, mark: GradientMark) -> Result<Self, GradientError> {
        self.mark(mark)?;
        Ok(self)
    }

    pub fn marks(&self) -> &[GradientMark] {
        &self.marks
    }

    pub fn len(&self) -> usize {
        self.marks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    /// Insert a new mark or replace the mark with exactly the same position
    ///
    /// Marking an empty gradient produces a flat gradient of the mark's color.
    pub fn mark(&mut self, mark: GradientMark) -> Result<(), GradientError> {
        if !(0.0..=POS_MAX).contains(&mark.position) {
            return Err(GradientError::InvalidMark {
                position: mark.position,
            });
        }
        if self.marks.is_empty() {
            *self = Self::from_color(mark.color);
            return Ok(());
        }
        let index = self.marks.binary_search_by(|probe| {
            probe
                .position
                .partial_cmp(&mark.position)
                .unwrap_or(Ordering::Greater)
        });
        match index {
            Ok(index) => self.marks[index] = mark,
            Err(index) => self.marks.insert(index, mark),
        }
        Ok(())
    }

    /// Color shared by all marks, `None` if marks differ or there are no marks
    pub fn to_plain_color(&self) -> Option<Color> {
        let (first, rest) = self.marks.split_first()?;
        rest.iter()
            .all(|mark| mark.color == first.color)
            .then_some(first.color)
    }

    /// Map integer position `pos` inside of `[start, end]` to the gradient
    ///
    /// Positions at or before `start` return the first mark, at or after `end`
    /// the last one. Otherwise the color is linearly interpolated between marks
    /// bracketing `(pos - start) / (end - start)` and the returned mark holds that
    /// progress as its position.
    ///
    /// Gradient is expected to have at least two marks.
    pub fn mark_at(&self, start: i32, end: i32, pos: i32) -> GradientMark {
        let (first, last) = match (self.marks.first(), self.marks.last()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => return GradientMark::new(Color::TRANSPARENT, 0.0),
        };
        if pos <= start {
            return first;
        }
        if pos >= end {
            return last;
        }
        // canonical plain color gradient
        if self.marks.len() == 2 && first.color == last.color {
            return first;
        }

        let span = end as i64 - start as i64;
        let progress = ((pos as i64 - start as i64) as f64 / span as f64) as f32 * POS_MAX;
        let index = self.marks.binary_search_by(|mark| {
            if mark.position < progress {
                Ordering::Less
            } else {
                Ordering::Greater
            }
        });
        let index = match index {
            Ok(index) => index,
            Err(index) => index,
        };
        if index == 0 {
            first
        } else if index == self.marks.len() {
            last
        } else {
            let left = &self.marks[index - 1];
            let right = &self.marks[index];
            let left_weight = right.position - progress;
            let right_weight = progress - left.position;
            GradientMark::new(
                left.color.blend(right.color, left_weight, right_weight),
                progress,
            )
        }
    }
}

impl From<Color> for Gradient {
    fn from(color: Color) -> Self {
        Self::from_color(color)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GradientError {
    /// Mark position is outside of `[0, POS_MAX]`
    InvalidMark { position: f32 },
    /// Gradient has to have at least two marks to be sampled
    NotEnoughMarks { count: usize },
}

impl fmt::Display for GradientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GradientError::InvalidMark { position } => write!(
                f,
                "Invalid gradient mark position {}, expected value in [0, {}]",
                position, POS_MAX
            ),
            GradientError::NotEnoughMarks { count } => write!(
                f,
                "Gradient requires at least two marks, found {}",
                count
            ),
        }
    }
}

impl std::error::Error for GradientError {}
