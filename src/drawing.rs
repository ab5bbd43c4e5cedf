//! Pixel level access to raster targets
use crate::{Color, Image, ImageMut, Point, Rect, Shape};
use std::marker::PhantomData;

/// Raster that can be inspected pixel by pixel
pub trait Drawing {
    /// Rectangle of valid pixel coordinates
    fn bounds(&self) -> Rect;

    /// Color of the pixel, `None` if the pixel is not accessible
    fn pixel(&self, point: Point) -> Option<Color>;
}

/// Raster that can be modified pixel by pixel
pub trait DrawingMut: Drawing {
    /// Set color of the pixel, returns `false` if the pixel was not written
    fn set_pixel(&mut self, point: Point, color: Color) -> bool;

    /// Set all pixels of the `rect` clipped to the bounds
    fn fill_rect(&mut self, rect: Rect, color: Color) {
        let Some(rect) = rect.intersect(self.bounds()) else {
            return;
        };
        for y in rect.min().y()..rect.max().y() {
            for x in rect.min().x()..rect.max().x() {
                self.set_pixel(Point::new(x, y), color);
            }
        }
    }
}

/// Convert point to `(row, col)` if it is inside of the shape
#[inline]
fn point_index(shape: Shape, point: Point) -> Option<(usize, usize)> {
    let Point([x, y]) = point;
    if x < 0 || y < 0 {
        return None;
    }
    let (row, col) = (y as usize, x as usize);
    (row < shape.height && col < shape.width).then_some((row, col))
}

impl<I> Drawing for I
where
    I: Image<Pixel = Color> + ?Sized,
{
    fn bounds(&self) -> Rect {
        self.shape().bounds()
    }

    fn pixel(&self, point: Point) -> Option<Color> {
        let (row, col) = point_index(self.shape(), point)?;
        self.get(row, col).copied()
    }
}

impl<I> DrawingMut for I
where
    I: ImageMut<Pixel = Color> + ?Sized,
{
    fn set_pixel(&mut self, point: Point, color: Color) -> bool {
        let Some((row, col)) = point_index(self.shape(), point) else {
            return false;
        };
        match self.get_mut(row, col) {
            Some(pixel) => {
                *pixel = color;
                true
            }
            None => false,
        }
    }
}

/// Pixel buffer shared between concurrently executing commands
///
/// It does not provide any access by itself, it only hands out [`RegionMut`] views
/// each restricted to its own rectangle.
pub(crate) struct SharedTarget<'a> {
    data: *mut Color,
    len: usize,
    shape: Shape,
    disjoint: bool,
    _marker: PhantomData<&'a mut [Color]>,
}

// Access only happens through `RegionMut`, and live regions never share memory
unsafe impl Send for SharedTarget<'_> {}
unsafe impl Sync for SharedTarget<'_> {}

impl<'a> SharedTarget<'a> {
    pub fn new<I>(image: &'a mut I) -> Self
    where
        I: ImageMut<Pixel = Color> + ?Sized,
    {
        let shape = image.shape();
        let data = image.data_mut();
        Self {
            data: data.as_mut_ptr(),
            len: data.len(),
            shape,
            disjoint: shape.is_disjoint(data.len()),
            _marker: PhantomData,
        }
    }

    /// Whether distinct pixels are stored in distinct elements of the buffer
    ///
    /// If it is not the case, regions with disjoint areas may still alias each other.
    pub fn is_disjoint(&self) -> bool {
        self.disjoint
    }

    /// Create view that can only read and write pixels inside of `area`
    ///
    /// # Safety
    /// Regions alive at the same time must not share memory. It holds if there is
    /// only one region alive, or if the target [is disjoint](Self::is_disjoint) and
    /// areas of the regions do not intersect.
    pub unsafe fn region(&self, area: Rect) -> RegionMut<'_> {
        RegionMut {
            data: self.data,
            len: self.len,
            shape: self.shape,
            region: area.intersect(self.shape.bounds()).unwrap_or_default(),
            escaped: 0,
            _marker: PhantomData,
        }
    }
}

/// View of the shared pixel buffer restricted to a rectangle
///
/// Reports the whole buffer as its bounds so rasterization produces exactly the
/// same pixels as it would on the buffer itself. Writes outside of the region are
/// dropped and counted.
pub struct RegionMut<'a> {
    data: *mut Color,
    len: usize,
    shape: Shape,
    region: Rect,
    escaped: usize,
    _marker: PhantomData<&'a mut [Color]>,
}

// Region is the only accessor of its pixels
unsafe impl Send for RegionMut<'_> {}

impl RegionMut<'_> {
    /// Rectangle this view is allowed to access
    pub fn region(&self) -> Rect {
        self.region
    }

    /// Number of writes that were dropped because they were outside of the region
    pub fn escaped(&self) -> usize {
        self.escaped
    }

    fn offset(&self, point: Point) -> Option<usize> {
        if !self.region.contains(point) {
            return None;
        }
        let (row, col) = point_index(self.shape, point)?;
        let offset = self.shape.offset(row, col);
        (offset < self.len).then_some(offset)
    }
}

impl Drawing for RegionMut<'_> {
    fn bounds(&self) -> Rect {
        self.shape.bounds()
    }

    fn pixel(&self, point: Point) -> Option<Color> {
        let offset = self.offset(point)?;
        // offset is inside of the buffer and the region is not shared
        Some(unsafe { *self.data.add(offset) })
    }
}

impl DrawingMut for RegionMut<'_> {
    fn set_pixel(&mut self, point: Point, color: Color) -> bool {
        match self.offset(point) {
            Some(offset) => {
                // offset is inside of the buffer and the region is not shared
                unsafe { *self.data.add(offset) = color };
                true
            }
            None => {
                if self.shape.bounds().contains(point) {
                    self.escaped += 1;
                }
                false
            }
        }
    }
}
