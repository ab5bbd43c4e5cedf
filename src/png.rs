//! PNG encoding and decoding of color images
use crate::{Color, Image, ImageOwned, Shape};
use std::{
    fmt,
    io::{Read, Write},
};

/// Decode PNG image, any 8 or 16-bit color type is converted to [`Color`]
pub fn read_png(input: impl Read) -> Result<ImageOwned<Color>, PngError> {
    let mut decoder = png::Decoder::new(input);
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
    let mut reader = decoder.read_info()?;
    let mut buffer = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buffer)?;

    let channels = match info.color_type {
        png::ColorType::Grayscale => 1,
        png::ColorType::GrayscaleAlpha => 2,
        png::ColorType::Rgb => 3,
        png::ColorType::Rgba => 4,
        color_type => return Err(PngError::UnsupportedColorType(color_type)),
    };
    let (width, height) = (info.width as usize, info.height as usize);
    let mut data = Vec::with_capacity(width * height);
    for row in buffer.chunks(info.line_size).take(height) {
        for pixel in row.chunks_exact(channels).take(width) {
            let rgba = match *pixel {
                [l] => [l, l, l, 255],
                [l, a] => [l, l, l, a],
                [r, g, b] => [r, g, b, 255],
                [r, g, b, a] => [r, g, b, a],
                _ => return Err(PngError::UnsupportedColorType(info.color_type)),
            };
            data.push(Color::from_rgba8(rgba));
        }
    }
    if data.len() != width * height {
        return Err(PngError::Truncated {
            expected: width * height,
            found: data.len(),
        });
    }
    Ok(ImageOwned::new(Shape::new(width, height), data))
}

/// Encode image as 8-bit RGBA PNG
pub fn write_png<I>(image: &I, output: impl Write) -> Result<(), PngError>
where
    I: Image<Pixel = Color> + ?Sized,
{
    let shape = image.shape();
    let mut encoder = png::Encoder::new(output, shape.width as u32, shape.height as u32);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;

    let pixels: Vec<[u8; 4]> = image.iter().map(|color| color.to_rgba8()).collect();
    writer.write_image_data(bytemuck::cast_slice(&pixels))?;
    writer.finish()?;
    Ok(())
}

#[derive(Debug)]
pub enum PngError {
    Decoding(png::DecodingError),
    Encoding(png::EncodingError),
    UnsupportedColorType(png::ColorType),
    /// Decoded frame contains less pixels than its header declares
    Truncated { expected: usize, found: usize },
}

impl fmt::Display for PngError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PngError::Decoding(error) => write!(f, "Failed to decode PNG: {}", error),
            PngError::Encoding(error) => write!(f, "Failed to encode PNG: {}", error),
            PngError::UnsupportedColorType(color_type) => {
                write!(f, "Unsupported PNG color type: {:?}", color_type)
            }
            PngError::Truncated { expected, found } => write!(
                f,
                "PNG frame is truncated, expected {} pixels found {}",
                expected, found
            ),
        }
    }
}

impl std::error::Error for PngError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PngError::Decoding(error) => Some(error),
            PngError::Encoding(error) => Some(error),
            _ => None,
        }
    }
}

impl From<png::DecodingError> for PngError {
    fn from(error: png::DecodingError) -> Self {
        Self::Decoding(error)
    }
}

impl From<png::EncodingError> for PngError {
    fn from(error: png::EncodingError) -> Self {
        Self::Encoding(error)
    }
}
