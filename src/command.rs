//! Drawing commands executed by the [`Generator`](crate::Generator)
use crate::{draw_line, Color, DrawingMut, Gradient, GradientError, Line, Rect};
use std::{fmt, sync::Arc};

/// Unit of drawing work
///
/// Implementations must not write any pixel outside of [`Command::affected_area`],
/// commands with non-intersecting areas are executed concurrently.
pub trait Command: Send + Sync {
    /// Rectangle containing every pixel this command can write
    fn affected_area(&self) -> Rect;

    /// Draw into the target
    fn execute(&self, target: &mut dyn DrawingMut) -> Result<(), CommandError>;
}

impl<C: Command + ?Sized> Command for &C {
    fn affected_area(&self) -> Rect {
        (**self).affected_area()
    }

    fn execute(&self, target: &mut dyn DrawingMut) -> Result<(), CommandError> {
        (**self).execute(target)
    }
}

impl<C: Command + ?Sized> Command for Box<C> {
    fn affected_area(&self) -> Rect {
        (**self).affected_area()
    }

    fn execute(&self, target: &mut dyn DrawingMut) -> Result<(), CommandError> {
        (**self).execute(target)
    }
}

impl<C: Command + ?Sized> Command for Arc<C> {
    fn affected_area(&self) -> Rect {
        (**self).affected_area()
    }

    fn execute(&self, target: &mut dyn DrawingMut) -> Result<(), CommandError> {
        (**self).execute(target)
    }
}

/// Draw a single line with a gradient
#[derive(Debug, Clone, PartialEq)]
pub struct DrawLineCommand {
    pub line: Line,
    pub gradient: Gradient,
}

impl DrawLineCommand {
    pub fn new(line: Line, gradient: Gradient) -> Self {
        Self { line, gradient }
    }

    /// Line of a single plain color
    pub fn plain(line: Line, color: Color) -> Self {
        Self::new(line, Gradient::from_color(color))
    }
}

impl Command for DrawLineCommand {
    fn affected_area(&self) -> Rect {
        self.line.affected_area()
    }

    fn execute(&self, target: &mut dyn DrawingMut) -> Result<(), CommandError> {
        if self.gradient.len() < 2 {
            return Err(GradientError::NotEnoughMarks {
                count: self.gradient.len(),
            }
            .into());
        }
        draw_line(target, self.line, &self.gradient);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommandError {
    /// Command was provided with unusable gradient
    Gradient(GradientError),
    /// Command tried to write pixels outside of its affected area
    RegionViolation { area: Rect, escaped: usize },
    /// Command panicked while executing
    Panicked(String),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Gradient(error) => write!(f, "{}", error),
            CommandError::RegionViolation { area, escaped } => write!(
                f,
                "Command wrote {} pixel(s) outside of its affected area {:?}",
                escaped, area
            ),
            CommandError::Panicked(message) => write!(f, "Command panicked: {}", message),
        }
    }
}

impl std::error::Error for CommandError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CommandError::Gradient(error) => Some(error),
            _ => None,
        }
    }
}

impl From<GradientError> for CommandError {
    fn from(error: GradientError) -> Self {
        Self::Gradient(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Drawing, GradientMark, ImageOwned, Point};

    #[test]
    fn test_draw_line_command() -> Result<(), CommandError> {
        let mut img = ImageOwned::new_filled(10, 10, Color::BLACK);
        let cmd = DrawLineCommand::plain(Line::new((0, 5), (9, 5), 1), Color::WHITE);
        assert_eq!(cmd.affected_area(), Rect::from_pixels((0, 5), (9, 5)));
        cmd.execute(&mut img)?;
        assert_eq!(img.pixel(Point::new(4, 5)), Some(Color::WHITE));
        assert_eq!(img.pixel(Point::new(4, 4)), Some(Color::BLACK));
        Ok(())
    }

    #[test]
    fn test_not_enough_marks() {
        let mut img = ImageOwned::new_filled(10, 10, Color::BLACK);
        let cmd = DrawLineCommand::new(Line::new((0, 5), (9, 5), 1), Gradient::empty());
        let err = cmd.execute(&mut img);
        assert_eq!(
            err,
            Err(CommandError::Gradient(GradientError::NotEnoughMarks {
                count: 0
            }))
        );
        assert!(img.pixel(Point::new(4, 5)) == Some(Color::BLACK));
    }

    #[test]
    fn test_boxed_and_shared() -> Result<(), GradientError> {
        let gradient = Gradient::from_color(Color::BLACK)
            .with_mark(GradientMark::new(Color::WHITE, 1.0))?;
        let line = Line::new((0, 0), (5, 5), 3);
        let cmd = DrawLineCommand::new(line, gradient);
        let boxed: Box<dyn Command> = Box::new(cmd.clone());
        let shared: Arc<dyn Command> = Arc::new(cmd.clone());
        assert_eq!(boxed.affected_area(), line.affected_area());
        assert_eq!(shared.affected_area(), line.affected_area());
        fn area_of<C: Command>(cmd: C) -> Rect {
            cmd.affected_area()
        }
        assert_eq!(area_of(&cmd), line.affected_area());
        Ok(())
    }

    #[test]
    fn test_error_display() {
        let err = CommandError::RegionViolation {
            area: Rect::from_pixels((0, 0), (1, 1)),
            escaped: 3,
        };
        assert!(err.to_string().contains("3 pixel(s)"));
        let err: CommandError = GradientError::NotEnoughMarks { count: 1 }.into();
        assert_eq!(
            err.to_string(),
            "Gradient requires at least two marks, found 1"
        );
    }
}
