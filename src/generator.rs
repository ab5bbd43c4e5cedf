//! Conflict-aware scheduling of drawing commands
//!
//! Commands are executed in rounds. Each round takes every pending command whose
//! affected area does not intersect areas of commands already taken into the round,
//! runs them concurrently and waits for all of them to finish. Remaining commands
//! are deferred to the next round in their original order.
use crate::{
    drawing::SharedTarget, Color, Command, CommandError, ImageMut, Rect,
};
use std::{
    any::Any,
    fmt,
    panic::{self, AssertUnwindSafe},
};

/// Collection of commands applied to a pixel buffer
pub struct Generator<C = Box<dyn Command>> {
    commands: Vec<C>,
}

impl<C> Default for Generator<C> {
    fn default() -> Self {
        Self {
            commands: Vec::new(),
        }
    }
}

impl<C> FromIterator<C> for Generator<C> {
    fn from_iter<T: IntoIterator<Item = C>>(iter: T) -> Self {
        Self {
            commands: iter.into_iter().collect(),
        }
    }
}

impl<C: Command> Generator<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append command, commands are scheduled in the order they were added
    pub fn push(&mut self, command: C) -> &mut Self {
        self.commands.push(command);
        self
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn commands(&self) -> &[C] {
        &self.commands
    }

    /// Start scheduling, see [`Schedule::next_batch`]
    pub fn schedule(&self) -> Schedule<'_, C> {
        Schedule {
            pending: self.commands.iter().enumerate().collect(),
            round: 0,
        }
    }

    /// Indices of commands executed in each round, without executing anything
    pub fn plan(&self) -> Vec<Vec<usize>> {
        let mut schedule = self.schedule();
        std::iter::from_fn(|| schedule.next_batch())
            .map(|batch| batch.indices().collect())
            .collect()
    }

    /// Execute all commands on the target
    ///
    /// Returns number of rounds it took to execute all commands. A failed command
    /// does not stop other commands or later rounds, all failures are reported
    /// together once every round is done.
    pub fn apply_commands<I>(&self, target: &mut I) -> Result<usize, ScheduleError>
    where
        I: ImageMut<Pixel = Color> + ?Sized,
    {
        let span = tracing::debug_span!("[apply_commands]", commands = self.commands.len());
        let _guard = span.enter();

        let mut schedule = self.schedule();
        let mut failures = Vec::new();
        while let Some(batch) = schedule.next_batch() {
            let round = batch.round();
            let failed = tracing::debug_span!("[round]", round, batch = batch.len())
                .in_scope(|| batch.execute(&mut *target));
            for failure in failed.iter() {
                tracing::warn!(
                    index = failure.index,
                    round,
                    "[command failed] {}",
                    failure.error
                );
            }
            failures.extend(failed);
        }

        let cycles = schedule.round();
        tracing::debug!(cycles, failures = failures.len(), "[apply_commands:done]");
        if failures.is_empty() {
            Ok(cycles)
        } else {
            Err(ScheduleError { cycles, failures })
        }
    }
}

/// Pending commands, each call to [`Schedule::next_batch`] produces one round
pub struct Schedule<'a, C> {
    pending: Vec<(usize, &'a C)>,
    round: usize,
}

impl<'a, C: Command> Schedule<'a, C> {
    /// Take the next conflict free batch, `None` once all commands were scheduled
    pub fn next_batch(&mut self) -> Option<Batch<'a, C>> {
        if self.pending.is_empty() {
            return None;
        }
        let pending = std::mem::take(&mut self.pending);
        let (batch, deferred) = partition(pending, |(_, command)| command.affected_area());
        self.pending = deferred;

        let round = self.round;
        self.round += 1;
        tracing::trace!(
            round,
            batch = batch.len(),
            deferred = self.pending.len(),
            "[partition]"
        );
        Some(Batch {
            round,
            entries: batch
                .into_iter()
                .map(|((index, command), area)| (index, command, area))
                .collect(),
        })
    }

    /// Whether all commands were scheduled
    pub fn is_done(&self) -> bool {
        self.pending.is_empty()
    }

    /// Number of batches produced so far
    pub fn round(&self) -> usize {
        self.round
    }

    /// Number of commands not yet scheduled
    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

/// Split items into a conflict free batch and deferred items
///
/// Items are scanned in order, an item joins the batch if its area does not
/// intersect area of any item already in the batch. Deferred items keep their
/// relative order. Items with empty areas never conflict.
pub fn partition<T, F>(items: impl IntoIterator<Item = T>, area: F) -> (Vec<(T, Rect)>, Vec<T>)
where
    F: Fn(&T) -> Rect,
{
    let mut batch: Vec<(T, Rect)> = Vec::new();
    let mut deferred = Vec::new();
    for item in items {
        let item_area = area(&item);
        if batch.iter().any(|(_, other)| other.intersects(item_area)) {
            deferred.push(item);
        } else {
            batch.push((item, item_area));
        }
    }
    (batch, deferred)
}

/// Commands of a single round, areas of the commands are pairwise disjoint
pub struct Batch<'a, C> {
    round: usize,
    entries: Vec<(usize, &'a C, Rect)>,
}

impl<'a, C: Command> Batch<'a, C> {
    /// Round this batch belongs to, starting from `0`
    pub fn round(&self) -> usize {
        self.round
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Indices of commands in this batch
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.entries.iter().map(|(index, _, _)| *index)
    }

    /// Execute all commands of the batch concurrently and wait for them to finish
    ///
    /// Commands are executed one by one if pixels of the target may share memory
    /// (see [`Shape::is_disjoint`](crate::Shape::is_disjoint)).
    pub fn execute<I>(self, target: &mut I) -> Vec<CommandFailure>
    where
        I: ImageMut<Pixel = Color> + ?Sized,
    {
        let round = self.round;
        let target = SharedTarget::new(target);
        let run = |(index, command, area): (usize, &C, Rect)| {
            // either regions are created one at a time, or the target is disjoint
            // and areas of the batch are pairwise disjoint
            let mut region = unsafe { target.region(area) };
            let result = panic::catch_unwind(AssertUnwindSafe(|| command.execute(&mut region)));
            let error = match result {
                Ok(Ok(())) if region.escaped() == 0 => return None,
                Ok(Ok(())) => CommandError::RegionViolation {
                    area: region.region(),
                    escaped: region.escaped(),
                },
                Ok(Err(error)) => error,
                Err(payload) => CommandError::Panicked(panic_message(payload)),
            };
            Some(CommandFailure {
                index,
                round,
                error,
            })
        };

        #[cfg(feature = "multithreading")]
        {
            use rayon::prelude::*;
            if target.is_disjoint() {
                return self.entries.into_par_iter().filter_map(run).collect();
            }
        }
        if !target.is_disjoint() {
            tracing::warn!(round, "[batch] pixels of the target alias, executing sequentially");
        }
        self.entries.into_iter().filter_map(run).collect()
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Command that failed during [`Generator::apply_commands`]
#[derive(Debug, Clone, PartialEq)]
pub struct CommandFailure {
    /// Index of the command in the generator
    pub index: usize,
    /// Round in which command was executed
    pub round: usize,
    pub error: CommandError,
}

impl fmt::Display for CommandFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "command #{} (round {}): {}",
            self.index, self.round, self.error
        )
    }
}

/// All command failures of a single [`Generator::apply_commands`] run
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleError {
    /// Number of rounds that were executed
    pub cycles: usize,
    pub failures: Vec<CommandFailure>,
}

impl fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} command(s) failed in {} round(s)",
            self.failures.len(),
            self.cycles
        )?;
        for failure in self.failures.iter() {
            write!(f, "\n  {}", failure)?;
        }
        Ok(())
    }
}

impl std::error::Error for ScheduleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.failures
            .first()
            .map(|failure| &failure.error as &(dyn std::error::Error + 'static))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        draw_line, DrawLineCommand, Drawing, DrawingMut, Gradient, GradientError, GradientMark,
        ImageMutRef, ImageOwned, Line, Point, Shape,
    };

    type Error = Box<dyn std::error::Error>;

    fn red() -> Color {
        Color::from_rgba8([255, 0, 0, 255])
    }

    fn black_drawing() -> ImageOwned<Color> {
        ImageOwned::new_filled(300, 400, Color::BLACK)
    }

    /// Command that writes one pixel outside of the area it reports
    struct RogueCommand;

    impl Command for RogueCommand {
        fn affected_area(&self) -> Rect {
            Rect::from_pixels((0, 0), (1, 1))
        }

        fn execute(&self, target: &mut dyn DrawingMut) -> Result<(), CommandError> {
            target.set_pixel(Point::new(0, 0), Color::WHITE);
            target.set_pixel(Point::new(5, 5), Color::WHITE);
            Ok(())
        }
    }

    struct PanicCommand;

    impl Command for PanicCommand {
        fn affected_area(&self) -> Rect {
            Rect::from_pixels((100, 100), (110, 110))
        }

        fn execute(&self, _target: &mut dyn DrawingMut) -> Result<(), CommandError> {
            panic!("command exploded")
        }
    }

    #[test]
    fn test_identical_commands() -> Result<(), Error> {
        let line = Line::new((0, 100), (399, 100), 3);
        let colors = [Color::WHITE, red(), Color::BLACK, Color::WHITE];
        let generator: Generator<DrawLineCommand> = colors
            .iter()
            .map(|color| DrawLineCommand::plain(line, *color))
            .collect();
        assert_eq!(generator.plan(), vec![vec![0], vec![1], vec![2], vec![3]]);

        let mut drawing = black_drawing();
        assert_eq!(generator.apply_commands(&mut drawing)?, 4);
        // rounds are strictly ordered, the last command wins
        assert_eq!(drawing.pixel(Point::new(50, 100)), Some(Color::WHITE));
        Ok(())
    }

    #[test]
    fn test_disjoint_commands() -> Result<(), Error> {
        let generator: Generator<DrawLineCommand> = (0..10)
            .map(|i| DrawLineCommand::plain(Line::new((0, i * 10), (399, i * 10), 3), Color::WHITE))
            .collect();
        assert_eq!(generator.plan(), vec![(0..10).collect::<Vec<usize>>()]);
        let mut drawing = black_drawing();
        assert_eq!(generator.apply_commands(&mut drawing)?, 1);
        Ok(())
    }

    #[test]
    fn test_touching_commands_do_not_conflict() {
        // thickness 3 lines at y = 0 and y = 3 occupy rows -1..=1 and 2..=4
        let mut generator = Generator::<DrawLineCommand>::new();
        generator
            .push(DrawLineCommand::plain(Line::new((0, 0), (10, 0), 3), Color::WHITE))
            .push(DrawLineCommand::plain(Line::new((0, 3), (10, 3), 3), Color::WHITE))
            .push(DrawLineCommand::plain(Line::new((0, 2), (10, 2), 1), Color::WHITE));
        assert_eq!(generator.plan(), vec![vec![0, 1], vec![2]]);
    }

    #[test]
    fn test_deferred_order() {
        let line = |y| DrawLineCommand::plain(Line::new((0, y), (10, y), 1), Color::WHITE);
        let generator: Generator<DrawLineCommand> =
            [line(0), line(0), line(5), line(0), line(5), line(9)]
                .into_iter()
                .collect();
        assert_eq!(
            generator.plan(),
            vec![vec![0, 2, 5], vec![1, 4], vec![3]]
        );
    }

    #[test]
    fn test_empty() -> Result<(), Error> {
        let generator = Generator::<Box<dyn Command>>::new();
        assert!(generator.plan().is_empty());
        let mut drawing = black_drawing();
        assert_eq!(generator.apply_commands(&mut drawing)?, 0);
        assert!(generator.schedule().is_done());
        Ok(())
    }

    #[test]
    fn test_same_as_sequential() -> Result<(), Error> {
        let gradient = Gradient::from_color(red())
            .with_mark(GradientMark::new(Color::WHITE, 0.5))?
            .with_mark(GradientMark::new(Color::from_rgba8([0, 0, 255, 128]), 1.0))?;
        let commands = vec![
            DrawLineCommand::plain(Line::new((0, 0), (400, 0), 5), Color::WHITE),
            DrawLineCommand::plain(Line::new((0, 200), (400, 200), 0), Color::WHITE),
            DrawLineCommand::new(Line::new((10, 20), (390, 180), 4), gradient.clone()),
            DrawLineCommand::new(Line::new((200, 10), (200, 150), 7), gradient.clone()),
            DrawLineCommand::new(Line::new((380, 290), (20, 210), 3), gradient),
            DrawLineCommand::plain(Line::new((-50, 250), (500, 250), 2), red()),
            DrawLineCommand::plain(Line::new((5, 5), (60, 60), 1), red()),
        ];

        let mut expected = black_drawing();
        for command in commands.iter() {
            draw_line(&mut expected, command.line, &command.gradient);
        }

        let generator: Generator<DrawLineCommand> = commands.into_iter().collect();
        let mut drawing = black_drawing();
        let cycles = generator.apply_commands(&mut drawing)?;
        assert_eq!(cycles, generator.plan().len());
        assert!(cycles > 1);
        assert_eq!(drawing, expected);
        Ok(())
    }

    #[test]
    fn test_failures_are_collected() {
        let mut generator = Generator::<Box<dyn Command>>::new();
        generator
            .push(Box::new(DrawLineCommand::new(
                Line::new((0, 50), (399, 50), 1),
                Gradient::empty(),
            )))
            .push(Box::new(PanicCommand))
            .push(Box::new(DrawLineCommand::plain(
                Line::new((0, 200), (399, 200), 1),
                Color::WHITE,
            )))
            .push(Box::new(RogueCommand))
            .push(Box::new(DrawLineCommand::plain(
                Line::new((0, 200), (399, 200), 1),
                red(),
            )));

        let mut drawing = black_drawing();
        let result = generator.apply_commands(&mut drawing);
        let expected = ScheduleError {
            cycles: 2,
            failures: vec![
                CommandFailure {
                    index: 0,
                    round: 0,
                    error: CommandError::Gradient(GradientError::NotEnoughMarks { count: 0 }),
                },
                CommandFailure {
                    index: 1,
                    round: 0,
                    error: CommandError::Panicked("command exploded".to_string()),
                },
                CommandFailure {
                    index: 3,
                    round: 0,
                    error: CommandError::RegionViolation {
                        area: Rect::from_pixels((0, 0), (1, 1)),
                        escaped: 1,
                    },
                },
            ],
        };
        assert_eq!(result, Err(expected));

        // siblings and later rounds still run
        assert_eq!(drawing.pixel(Point::new(10, 200)), Some(red()));
        assert_eq!(drawing.pixel(Point::new(0, 0)), Some(Color::WHITE));
        // writes outside of the area are dropped
        assert_eq!(drawing.pixel(Point::new(5, 5)), Some(Color::BLACK));
    }

    #[test]
    fn test_aliased_rows_run_sequentially() -> Result<(), Error> {
        // every row of the target is stored in the same memory
        let mut data = vec![Color::BLACK; 8];
        let shape = Shape {
            width: 8,
            height: 8,
            row_stride: 0,
            col_stride: 1,
        };
        let colors: Vec<Color> = (0..8u8)
            .map(|i| Color::from_rgba8([i * 30, 0, 0, 255]))
            .collect();
        let generator: Generator<DrawLineCommand> = colors
            .iter()
            .enumerate()
            .map(|(y, color)| {
                let y = y as i32;
                DrawLineCommand::plain(Line::new((0, y), (7, y), 1), *color)
            })
            .collect();
        assert_eq!(generator.plan(), vec![(0..8).collect::<Vec<usize>>()]);

        let mut image = ImageMutRef::new(shape, &mut data);
        assert_eq!(generator.apply_commands(&mut image)?, 1);
        // commands of the batch were executed in order, the last one wins
        assert!(data.iter().all(|pixel| *pixel == colors[7]));
        Ok(())
    }

    #[test]
    fn test_partition() {
        let rects = [
            Rect::from_pixels((0, 0), (9, 9)),
            Rect::from_pixels((5, 5), (15, 15)),
            Rect::empty(),
            Rect::from_pixels((10, 0), (19, 4)),
            Rect::from_pixels((12, 12), (20, 20)),
        ];
        let (batch, deferred) = partition(0..rects.len(), |index| rects[*index]);
        let batch: Vec<_> = batch.into_iter().map(|(index, _)| index).collect();
        assert_eq!(batch, vec![0, 2, 3, 4]);
        assert_eq!(deferred, vec![1]);
    }

    #[test]
    fn test_schedule_steps() {
        let line = Line::new((0, 0), (10, 10), 1);
        let generator: Generator<DrawLineCommand> = (0..3)
            .map(|_| DrawLineCommand::plain(line, Color::WHITE))
            .collect();
        let mut schedule = generator.schedule();
        assert_eq!(schedule.pending(), 3);
        let mut rounds = Vec::new();
        while let Some(batch) = schedule.next_batch() {
            assert_eq!(batch.len(), 1);
            rounds.push(batch.round());
        }
        assert_eq!(rounds, vec![0, 1, 2]);
        assert!(schedule.is_done());
        assert_eq!(schedule.round(), 3);
    }

    #[test]
    fn test_error_display() {
        let error = ScheduleError {
            cycles: 2,
            failures: vec![CommandFailure {
                index: 3,
                round: 1,
                error: CommandError::Panicked("boom".to_string()),
            }],
        };
        assert_eq!(
            error.to_string(),
            "1 command(s) failed in 2 round(s)\n  command #3 (round 1): Command panicked: boom"
        );
    }
}
