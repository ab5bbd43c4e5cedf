//! Strided pixel buffers
//!
//! Pixel `(row, col)` of an image is stored at `row * row_stride + col * col_stride`
//! of its buffer, which covers both owned dense images and views into foreign memory.
use crate::Rect;

/// Memory layout of the image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shape {
    /// Width of the image
    pub width: usize,
    /// Height of the image
    pub height: usize,
    /// How many elements we need to skip to get to the next row.
    pub row_stride: usize,
    /// How many elements we need to skip to get to the next column.
    pub col_stride: usize,
}

impl Shape {
    /// Shape of the densely packed row-major image
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            row_stride: width,
            col_stride: 1,
        }
    }

    #[inline]
    pub fn offset(&self, row: usize, col: usize) -> usize {
        row * self.row_stride + col * self.col_stride
    }

    /// Row and column of the `n`-th pixel in row-major order
    #[inline]
    pub fn nth(&self, n: usize) -> Option<(usize, usize)> {
        if self.width == 0 {
            return None;
        }
        let row = n / self.width;
        let col = n - row * self.width;
        (row < self.height).then_some((row, col))
    }

    /// Rectangle `[0, width) x [0, height)` covered by the image
    pub fn bounds(&self) -> Rect {
        Rect::from_size(self.width, self.height)
    }

    /// Same buffer with rows and columns swapped
    pub fn transpose(&self) -> Self {
        Self {
            width: self.height,
            height: self.width,
            row_stride: self.col_stride,
            col_stride: self.row_stride,
        }
    }

    /// Whether every pixel maps to its own element of a buffer with `len` elements
    ///
    /// Accepts row-major and column-major layouts (rows or columns do not overlap)
    /// whose last pixel is inside of the buffer. Other layouts are rejected even if
    /// they happen to be disjoint.
    pub fn is_disjoint(&self, len: usize) -> bool {
        if self.width == 0 || self.height == 0 {
            return true;
        }
        let last = (self.height - 1)
            .checked_mul(self.row_stride)
            .zip((self.width - 1).checked_mul(self.col_stride))
            .and_then(|(row, col)| row.checked_add(col));
        if !matches!(last, Some(last) if last < len) {
            return false;
        }
        // number of elements spanned by a single row and a single column
        let row_span = (self.width - 1) * self.col_stride + 1;
        let col_span = (self.height - 1) * self.row_stride + 1;
        let row_major = (self.width == 1 || self.col_stride >= 1)
            && (self.height == 1 || self.row_stride >= row_span);
        let col_major = (self.height == 1 || self.row_stride >= 1)
            && (self.width == 1 || self.col_stride >= col_span);
        row_major || col_major
    }
}

/// Read access to a strided pixel buffer
pub trait Image {
    type Pixel;

    fn data(&self) -> &[Self::Pixel];

    fn shape(&self) -> Shape;

    fn width(&self) -> usize {
        self.shape().width
    }

    fn height(&self) -> usize {
        self.shape().height
    }

    fn get(&self, row: usize, col: usize) -> Option<&Self::Pixel> {
        let shape = self.shape();
        if row >= shape.height || col >= shape.width {
            return None;
        }
        self.data().get(shape.offset(row, col))
    }

    /// Borrow as a view with the same shape
    fn as_ref(&self) -> ImageRef<'_, Self::Pixel> {
        ImageRef {
            shape: self.shape(),
            data: self.data(),
        }
    }

    /// Iterate over all pixels in row-major order
    fn iter(&self) -> impl Iterator<Item = &Self::Pixel> {
        let shape = self.shape();
        let data = self.data();
        (0..shape.width * shape.height).filter_map(move |n| {
            let (row, col) = shape.nth(n)?;
            data.get(shape.offset(row, col))
        })
    }
}

/// Write access to a strided pixel buffer
pub trait ImageMut: Image {
    fn data_mut(&mut self) -> &mut [Self::Pixel];

    fn get_mut(&mut self, row: usize, col: usize) -> Option<&mut Self::Pixel> {
        let shape = self.shape();
        if row >= shape.height || col >= shape.width {
            return None;
        }
        self.data_mut().get_mut(shape.offset(row, col))
    }

    fn as_mut(&mut self) -> ImageMutRef<'_, Self::Pixel> {
        ImageMutRef {
            shape: self.shape(),
            data: self.data_mut(),
        }
    }

    /// Set every pixel of the image to `value`
    fn fill(&mut self, value: Self::Pixel)
    where
        Self::Pixel: Copy,
    {
        let shape = self.shape();
        let data = self.data_mut();
        for row in 0..shape.height {
            for col in 0..shape.width {
                data[shape.offset(row, col)] = value;
            }
        }
    }
}

/// Image that owns its pixels, images created by `new_*` are dense and row-major
#[derive(Debug, Clone, PartialEq)]
pub struct ImageOwned<P> {
    shape: Shape,
    data: Vec<P>,
}

impl<P> ImageOwned<P> {
    pub fn new(shape: Shape, data: Vec<P>) -> Self {
        Self { shape, data }
    }

    /// Note the order of arguments, `height` goes first as for matrices
    pub fn new_default(height: usize, width: usize) -> Self
    where
        P: Default,
    {
        Self::new_with(height, width, |_, _| Default::default())
    }

    /// Image of the given size with every pixel set to `value`
    pub fn new_filled(height: usize, width: usize, value: P) -> Self
    where
        P: Clone,
    {
        Self {
            shape: Shape::new(width, height),
            data: vec![value; height * width],
        }
    }

    pub fn new_with<F>(height: usize, width: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> P,
    {
        let mut data = Vec::with_capacity(height * width);
        for row in 0..height {
            for col in 0..width {
                data.push(f(row, col))
            }
        }
        Self {
            shape: Shape::new(width, height),
            data,
        }
    }

    /// Release the underlying buffer
    pub fn to_vec(self) -> Vec<P> {
        self.data
    }
}

impl<P> Image for ImageOwned<P> {
    type Pixel = P;

    fn shape(&self) -> Shape {
        self.shape
    }

    fn data(&self) -> &[Self::Pixel] {
        &self.data
    }
}

impl<P> ImageMut for ImageOwned<P> {
    fn data_mut(&mut self) -> &mut [Self::Pixel] {
        &mut self.data
    }
}

/// Shared view into a borrowed buffer, for example a transposed or padded one
#[derive(Debug, Clone, Copy)]
pub struct ImageRef<'a, P> {
    shape: Shape,
    data: &'a [P],
}

impl<'a, P> ImageRef<'a, P> {
    pub fn new(shape: Shape, data: &'a [P]) -> Self {
        Self { shape, data }
    }
}

impl<P> Image for ImageRef<'_, P> {
    type Pixel = P;

    fn shape(&self) -> Shape {
        self.shape
    }

    fn data(&self) -> &[Self::Pixel] {
        self.data
    }
}

/// Exclusive view into a borrowed buffer
///
/// Shape is not validated, several pixels may share one element of the buffer
/// (`row_stride == 0` repeats the same row).
#[derive(Debug)]
pub struct ImageMutRef<'a, P> {
    shape: Shape,
    data: &'a mut [P],
}

impl<'a, P> ImageMutRef<'a, P> {
    pub fn new(shape: Shape, data: &'a mut [P]) -> Self {
        Self { shape, data }
    }
}

impl<P> Image for ImageMutRef<'_, P> {
    type Pixel = P;

    fn shape(&self) -> Shape {
        self.shape
    }

    fn data(&self) -> &[Self::Pixel] {
        self.data
    }
}

impl<P> ImageMut for ImageMutRef<'_, P> {
    fn data_mut(&mut self) -> &mut [Self::Pixel] {
        self.data
    }
}

impl<I> Image for &I
where
    I: Image + ?Sized,
{
    type Pixel = I::Pixel;

    fn shape(&self) -> Shape {
        (*self).shape()
    }

    fn data(&self) -> &[Self::Pixel] {
        (*self).data()
    }
}

impl<I> Image for &mut I
where
    I: Image + ?Sized,
{
    type Pixel = I::Pixel;

    fn shape(&self) -> Shape {
        (**self).shape()
    }

    fn data(&self) -> &[Self::Pixel] {
        (**self).data()
    }
}

impl<I> ImageMut for &mut I
where
    I: ImageMut + ?Sized,
{
    fn data_mut(&mut self) -> &mut [Self::Pixel] {
        (**self).data_mut()
    }
}
