use crate::utils::{div_round, saturate_i32};
use std::fmt;

/// Integer pixel coordinate
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point(pub [i32; 2]);

impl fmt::Debug for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Point([x, y]) = self;
        write!(f, "{},{}", x, y)
    }
}

impl Point {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self([x, y])
    }

    /// Get `x` component of the point
    #[inline]
    pub const fn x(self) -> i32 {
        self.0[0]
    }

    /// Get `y` compenent of the point
    #[inline]
    pub const fn y(self) -> i32 {
        self.0[1]
    }
}

impl From<(i32, i32)> for Point {
    #[inline]
    fn from(xy: (i32, i32)) -> Self {
        Self([xy.0, xy.1])
    }
}

impl From<[i32; 2]> for Point {
    #[inline]
    fn from(xy: [i32; 2]) -> Self {
        Self(xy)
    }
}

/// Axis aligned rectangle of pixels
///
/// Rectangle is half-open, it contains pixels with `min.x <= x < max.x` and
/// `min.y <= y < max.y`. Rectangles that only touch each other do not intersect.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rect {
    min: Point,
    max: Point,
}

impl Rect {
    /// Construct rectangle from its inclusive minimal and exclusive maximal corners
    pub const fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    /// Rectangle containing no pixels
    pub const fn empty() -> Self {
        Self::new(Point::new(0, 0), Point::new(0, 0))
    }

    /// Smallest rectangle containing both `p0` and `p1` pixels
    pub fn from_pixels(p0: impl Into<Point>, p1: impl Into<Point>) -> Self {
        let Point([x0, y0]) = p0.into();
        let Point([x1, y1]) = p1.into();
        Self {
            min: Point::new(x0.min(x1), y0.min(y1)),
            max: Point::new(
                x0.max(x1).saturating_add(1),
                y0.max(y1).saturating_add(1),
            ),
        }
    }

    /// Rectangle `[0, width) x [0, height)`
    pub fn from_size(width: usize, height: usize) -> Self {
        Self::new(
            Point::new(0, 0),
            Point::new(saturate_i32(width as i128), saturate_i32(height as i128)),
        )
    }

    /// Minimal (inclusive) corner
    #[inline]
    pub fn min(&self) -> Point {
        self.min
    }

    /// Maximal (exclusive) corner
    #[inline]
    pub fn max(&self) -> Point {
        self.max
    }

    #[inline]
    pub fn width(&self) -> usize {
        (self.max.x() as i64 - self.min.x() as i64).max(0) as usize
    }

    #[inline]
    pub fn height(&self) -> usize {
        (self.max.y() as i64 - self.min.y() as i64).max(0) as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min.x() >= self.max.x() || self.min.y() >= self.max.y()
    }

    /// Determine if the pixel is inside of the rectangle
    #[inline]
    pub fn contains(&self, point: Point) -> bool {
        let Point([x, y]) = point;
        self.min.x() <= x && x < self.max.x() && self.min.y() <= y && y < self.max.y()
    }

    /// Find intersection of two rectangles, `None` if they do not share any pixel
    pub fn intersect(&self, other: Rect) -> Option<Rect> {
        let rect = Rect::new(
            Point::new(self.min.x().max(other.min.x()), self.min.y().max(other.min.y())),
            Point::new(self.max.x().min(other.max.x()), self.max.y().min(other.max.y())),
        );
        (!rect.is_empty()).then_some(rect)
    }

    /// Determine if two rectangles share at least one pixel
    #[inline]
    pub fn intersects(&self, other: Rect) -> bool {
        self.intersect(other).is_some()
    }
}

impl Default for Rect {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Rect [{:?}]..[{:?}] w={}, h={}",
            self.min,
            self.max,
            self.width(),
            self.height()
        )
    }
}

/// Line classification used to pick rasterization algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineKind {
    /// `start.y == end.y`, including degenerate single point lines
    Horizontal,
    /// `start.x == end.x`
    Vertical,
    Diagonal,
}

/// Straight line of integer thickness
///
/// A line does not have to be inside of the drawing to take effect, only the part
/// that intersects the drawing is rendered.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Line {
    pub start: Point,
    pub end: Point,
    /// Line with thickness `<= 0` does not draw anything
    pub thickness: i32,
}

impl fmt::Debug for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Line {:?} {:?} thickness={}",
            self.start, self.end, self.thickness
        )
    }
}

impl Line {
    pub fn new(start: impl Into<Point>, end: impl Into<Point>, thickness: i32) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
            thickness,
        }
    }

    pub fn kind(&self) -> LineKind {
        if self.start.y() == self.end.y() {
            LineKind::Horizontal
        } else if self.start.x() == self.end.x() {
            LineKind::Vertical
        } else {
            LineKind::Diagonal
        }
    }

    /// Decompose line into primary (longest) and secondary axes
    pub(crate) fn skewed(&self) -> SkewedLine {
        let dist_x = (self.end.x() as i64 - self.start.x() as i64).abs();
        let dist_y = (self.end.y() as i64 - self.start.y() as i64).abs();
        let is_skewed_x = dist_x >= dist_y;
        let along = |point: Point| {
            if is_skewed_x {
                (point.x(), point.y())
            } else {
                (point.y(), point.x())
            }
        };
        let (p0, s0) = along(self.start);
        let (p1, s1) = along(self.end);
        // always walk in the direction of the growing primary axis
        let ((p0, s0), (p1, s1)) = if p0 <= p1 {
            ((p0, s0), (p1, s1))
        } else {
            ((p1, s1), (p0, s0))
        };
        SkewedLine {
            primary_start: p0,
            primary_end: p1,
            secondary_start: s0,
            secondary_end: s1,
            thickness: self.thickness,
            is_skewed_x,
        }
    }

    /// Minimal rectangle containing every pixel rasterizer can write for this line
    ///
    /// Computed from the same skewed decomposition and thickness offsets that are
    /// used by the rasterizer. Lines with non-positive thickness produce an empty
    /// rectangle.
    pub fn affected_area(&self) -> Rect {
        if self.thickness <= 0 {
            return Rect::empty();
        }
        let skewed = self.skewed();
        let (start_offset, end_offset) = thickness_offsets(skewed.thickness);
        let (secondary_min, secondary_max) = skewed.secondary_range();
        let secondary_min = secondary_min.saturating_add(start_offset);
        let secondary_max = secondary_max.saturating_add(end_offset);
        let (primary_min, primary_max) = (skewed.primary_start, skewed.primary_end);
        Rect::from_pixels(
            skewed.to_point(primary_min, secondary_min),
            skewed.to_point(primary_max, secondary_max),
        )
    }

    /// Whether two lines can touch the same pixel
    pub fn conflicts_with(&self, other: &Line) -> bool {
        self.affected_area().intersects(other.affected_area())
    }
}

/// Line expressed in terms of primary and secondary axes
///
/// Primary axis is the one with the greatest absolute delta (`x` for ties),
/// `primary_start <= primary_end` always holds, secondary values are taken at the
/// corresponding primary ends and can go in any direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SkewedLine {
    pub primary_start: i32,
    pub primary_end: i32,
    pub secondary_start: i32,
    pub secondary_end: i32,
    pub thickness: i32,
    pub is_skewed_x: bool,
}

impl SkewedLine {
    /// Secondary axis value of the line middle at `primary`
    ///
    /// Secondary axis advances proportionally to the slope, so for `45°` lines it
    /// moves exactly one pixel per primary step.
    pub fn secondary_at(&self, primary: i32) -> i32 {
        let primary_delta = self.primary_end as i128 - self.primary_start as i128;
        if primary_delta == 0 {
            return self.secondary_start;
        }
        // differences take 33 bits, their product does not fit into `i64`
        let secondary_delta = self.secondary_end as i128 - self.secondary_start as i128;
        let step = primary as i128 - self.primary_start as i128;
        saturate_i32(
            self.secondary_start as i128 + div_round(step * secondary_delta, primary_delta),
        )
    }

    /// `(min, max)` of the secondary axis values of the line middle
    pub fn secondary_range(&self) -> (i32, i32) {
        (
            self.secondary_start.min(self.secondary_end),
            self.secondary_start.max(self.secondary_end),
        )
    }

    /// `1` if secondary axis grows along the line, `-1` if it decreases, `0` if flat
    pub fn secondary_step(&self) -> i32 {
        (self.secondary_end as i64 - self.secondary_start as i64).signum() as i32
    }

    /// Convert `(primary, secondary)` pair back to the pixel coordinate
    #[inline]
    pub fn to_point(&self, primary: i32, secondary: i32) -> Point {
        if self.is_skewed_x {
            Point::new(primary, secondary)
        } else {
            Point::new(secondary, primary)
        }
    }
}

/// Offsets of the band that gives a line its thickness
///
/// Returns non-positive offset for the start and non-negative offset for the end
/// (`start += start_offset; end += end_offset`). Extra pixel of the even thickness
/// is placed on the negative side.
pub(crate) fn thickness_offsets(thickness: i32) -> (i32, i32) {
    let start_offset = -(thickness / 2);
    let mut end_offset = thickness / 2;
    if thickness % 2 == 0 {
        end_offset -= 1;
    }
    (start_offset, end_offset)
}
