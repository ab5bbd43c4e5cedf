use bytemuck::{Pod, Zeroable};
use std::{fmt, str::FromStr};

/// Alpha premultiplied RGBA color with 16-bit channels
///
/// Equality is an exact per-channel comparison, colors produced by a flat gradient
/// must be reproduced bit for bit.
#[repr(C)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Pod, Zeroable)]
pub struct Color {
    pub r: u16,
    pub g: u16,
    pub b: u16,
    pub a: u16,
}

impl Color {
    pub const TRANSPARENT: Color = Color::new(0, 0, 0, 0);
    pub const BLACK: Color = Color::new(0, 0, 0, u16::MAX);
    pub const WHITE: Color = Color::new(u16::MAX, u16::MAX, u16::MAX, u16::MAX);

    /// Create color from already premultiplied channels
    pub const fn new(r: u16, g: u16, b: u16, a: u16) -> Self {
        Self { r, g, b, a }
    }

    pub const fn red(self) -> u16 {
        self.r
    }

    pub const fn green(self) -> u16 {
        self.g
    }

    pub const fn blue(self) -> u16 {
        self.b
    }

    pub const fn alpha(self) -> u16 {
        self.a
    }

    /// Channels in `[r, g, b, a]` order
    pub const fn channels(self) -> [u16; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub const fn from_channels([r, g, b, a]: [u16; 4]) -> Self {
        Self::new(r, g, b, a)
    }

    /// Create color from straight (not premultiplied) 8-bit RGBA
    pub fn from_rgba8([r, g, b, a]: [u8; 4]) -> Self {
        let premultiply = |c: u8| ((c as u32 * a as u32 * 257 + 127) / 255) as u16;
        Self::new(premultiply(r), premultiply(g), premultiply(b), a as u16 * 257)
    }

    /// Convert to straight (not premultiplied) 8-bit RGBA
    pub fn to_rgba8(self) -> [u8; 4] {
        if self.a == 0 {
            return [0, 0, 0, 0];
        }
        let alpha = self.a as u32;
        let unmultiply = |c: u16| ((c as u32 * 255 + alpha / 2) / alpha).min(255) as u8;
        [
            unmultiply(self.r),
            unmultiply(self.g),
            unmultiply(self.b),
            ((alpha + 128) / 257) as u8,
        ]
    }

    /// Weighted average of two colors, computed per channel
    ///
    /// `(left * left_weight + right * right_weight) / (left_weight + right_weight)`,
    /// channels that are equal in both colors are returned verbatim.
    pub fn blend(self, other: Self, left_weight: f32, right_weight: f32) -> Self {
        let total = left_weight + right_weight;
        let blend = |left: u16, right: u16| {
            if left == right || total <= 0.0 {
                return left;
            }
            let value = (left as f32 * left_weight + right as f32 * right_weight) / total;
            value.clamp(0.0, u16::MAX as f32) as u16
        };
        Self::new(
            blend(self.r, other.r),
            blend(self.g, other.g),
            blend(self.b, other.b),
            blend(self.a, other.a),
        )
    }
}

impl From<[u8; 4]> for Color {
    fn from(rgba: [u8; 4]) -> Self {
        Self::from_rgba8(rgba)
    }
}

impl From<Color> for [u8; 4] {
    fn from(color: Color) -> Self {
        color.to_rgba8()
    }
}

impl From<[u16; 4]> for Color {
    fn from(channels: [u16; 4]) -> Self {
        Self::from_channels(channels)
    }
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Color({}, r={} g={} b={} a={})",
            self, self.r, self.g, self.b, self.a
        )
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, a] = self.to_rgba8();
        write!(f, "#{:02x}{:02x}{:02x}", r, g, b)?;
        if a != 255 {
            write!(f, "{:02x}", a)?;
        }
        Ok(())
    }
}

impl FromStr for Color {
    type Err = ColorError;

    fn from_str(color: &str) -> Result<Self, Self::Err> {
        let color = color.trim();
        if !(color.starts_with('#') && (color.len() == 7 || color.len() == 9)) {
            return Err(ColorError::HexExpected);
        }
        // #RRGGBB(AA)
        let bytes: &[u8] = color[1..].as_ref();
        let digit = |byte| match byte {
            b'A'..=b'F' => Ok(byte - b'A' + 10),
            b'a'..=b'f' => Ok(byte - b'a' + 10),
            b'0'..=b'9' => Ok(byte - b'0'),
            _ => Err(ColorError::HexExpected),
        };
        let mut hex = bytes
            .chunks(2)
            .map(|pair| Ok(digit(pair[0])? << 4 | digit(pair[1])?));
        Ok(Color::from_rgba8([
            hex.next().unwrap_or(Ok(0))?,
            hex.next().unwrap_or(Ok(0))?,
            hex.next().unwrap_or(Ok(0))?,
            hex.next().unwrap_or(Ok(255))?,
        ]))
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Color {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Color {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let color = String::deserialize(deserializer)?;
        color.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorError {
    HexExpected,
}

impl fmt::Display for ColorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorError::HexExpected => {
                write!(f, "Color expected to be #RRGGBB(AA) in hexidemical format")
            }
        }
    }
}

impl std::error::Error for ColorError {}
