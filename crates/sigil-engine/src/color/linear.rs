use bytemuck::{Pod, Zeroable};

/// Linear straight-alpha RGBA color.
///
/// Layout matches a WGSL `vec4<f32>` so slices can be uploaded directly as
/// vertex data.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct LinearRgba {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
    pub alpha: f32,
}

impl LinearRgba {
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);

    /// Fully transparent black.
    pub const NONE: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    /// All channels NaN. Used as the color of strip separators.
    pub const NAN: Self = Self::new(f32::NAN, f32::NAN, f32::NAN, f32::NAN);

    #[inline]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self { red, green, blue, alpha }
    }

    #[inline]
    pub const fn rgb(red: f32, green: f32, blue: f32) -> Self {
        Self::new(red, green, blue, 1.0)
    }

    /// Creates a linear color from straight sRGB bytes (`0`–`255`).
    ///
    /// Alpha is linear in both spaces and is only rescaled.
    pub fn from_srgba_u8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::new(
            srgb_to_linear(r as f32 / 255.0),
            srgb_to_linear(g as f32 / 255.0),
            srgb_to_linear(b as f32 / 255.0),
            a as f32 / 255.0,
        )
    }

    /// Parses `#rrggbb` or `#rrggbbaa` (leading `#` optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        match hex.len() {
            6 => Some(Self::from_srgba_u8(byte(0)?, byte(2)?, byte(4)?, 255)),
            8 => Some(Self::from_srgba_u8(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => None,
        }
    }

    #[inline]
    pub const fn with_alpha(self, alpha: f32) -> Self {
        Self { alpha, ..self }
    }

    /// Component-wise linear interpolation (`t = 0` is `self`, `t = 1` is `other`).
    #[inline]
    pub fn lerp(self, other: Self, t: f32) -> Self {
        Self::new(
            self.red + (other.red - self.red) * t,
            self.green + (other.green - self.green) * t,
            self.blue + (other.blue - self.blue) * t,
            self.alpha + (other.alpha - self.alpha) * t,
        )
    }

    #[inline]
    pub const fn to_array(self) -> [f32; 4] {
        [self.red, self.green, self.blue, self.alpha]
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.red.is_finite()
            && self.green.is_finite()
            && self.blue.is_finite()
            && self.alpha.is_finite()
    }
}

impl From<[f32; 4]> for LinearRgba {
    #[inline]
    fn from([red, green, blue, alpha]: [f32; 4]) -> Self {
        Self { red, green, blue, alpha }
    }
}

impl From<LinearRgba> for [f32; 4] {
    #[inline]
    fn from(c: LinearRgba) -> Self {
        c.to_array()
    }
}

impl From<LinearRgba> for wgpu::Color {
    fn from(c: LinearRgba) -> Self {
        wgpu::Color {
            r: c.red as f64,
            g: c.green as f64,
            b: c.blue as f64,
            a: c.alpha as f64,
        }
    }
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}
