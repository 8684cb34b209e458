// SPDX-License-Identifier: GPL-3.0-or-later
use std::cmp::Ordering;
use std::convert::From;
use std::fmt;
use std::str::FromStr;

/// A type for colors specifically for finding corresponding colors that have good contrast.
/// This type uses the WCAG 2.0 definitions of "relative luminance" and "contrast ratio". These
/// definitions are not very good, but they're good enough for picking legible text colors.
///
/// This type can be formatted as a hex code using the standard formatting syntax, and parsed
/// from one (with or without the leading '#').
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color {
    red: u8,
    green: u8,
    blue: u8,
}

impl From<colorous::Color> for Color {
    fn from(other_color: colorous::Color) -> Self {
        Color {
            red: other_color.r,
            green: other_color.g,
            blue: other_color.b,
        }
    }
}

impl From<&image::Rgb<u8>> for Color {
    fn from(pixel: &image::Rgb<u8>) -> Self {
        Self::new(pixel[0], pixel[1], pixel[2])
    }
}

impl From<Color> for image::Rgb<u8> {
    fn from(color: Color) -> Self {
        image::Rgb(color.as_array())
    }
}

impl fmt::LowerHex for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{:02x}{:02x}{:02x}",
            self.red(),
            self.green(),
            self.blue()
        )
    }
}

impl FromStr for Color {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match &s.to_ascii_lowercase() as &str {
            "black" => return Ok(Self::BLACK),
            "white" => return Ok(Self::WHITE),
            _ => (),
        }
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 || !hex.is_ascii() {
            return Err("colors must be given as six hex digits");
        }
        let component = |start: usize| {
            u8::from_str_radix(&hex[start..start + 2], 16).map_err(|_| "invalid hex digit in color")
        };
        Ok(Self::new(component(0)?, component(2)?, component(4)?))
    }
}

impl Color {
    pub const BLACK: Self = Self {
        red: u8::MIN,
        green: u8::MIN,
        blue: u8::MIN,
    };

    pub const WHITE: Self = Self {
        red: u8::MAX,
        green: u8::MAX,
        blue: u8::MAX,
    };

    /// Create a new [Color] with the given 8-bit color values.
    pub fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// The 8-bit color value of the red component.
    pub fn red(&self) -> u8 {
        self.red
    }

    /// The 8-bit color value of the green component.
    pub fn green(&self) -> u8 {
        self.green
    }

    /// The 8-bit color value of the blue component.
    pub fn blue(&self) -> u8 {
        self.blue
    }

    /// The relative luminance of the color in the sRGB colorspace, as [defined by the
    /// W3C][w3c-lum].
    ///
    /// [w3c-lum]: https://www.w3.org/TR/2008/REC-WCAG20-20081211/#relativeluminancedef
    pub fn luminance(&self) -> f32 {
        let scaling_coefficients = [0.2126, 0.7152, 0.0722];
        self.as_array()
            .iter()
            .map(|c| {
                let c = *c as f32 / u8::MAX as f32;
                // NOTE: 0.03928 is an error from a draft sRGB spec from the W3C. 0.04045 is the
                // correct value.
                if c <= 0.04045 {
                    c / 12.92
                } else {
                    ((c + 0.055) / 1.055).powf(2.4)
                }
            })
            .zip(scaling_coefficients.iter())
            .map(|(c, l)| l * c)
            .sum()
    }

    /// Calculate the contrast ratio between this color and another one using the
    /// [W3C definition][w3c-contrast].
    ///
    /// [w3c-contrast]: https://www.w3.org/TR/WCAG20/#contrast-ratiodef
    pub fn contrast_ratio(&self, other: &Self) -> f32 {
        let (lighter, darker) = {
            let lum = self.luminance();
            let other_lum = other.luminance();
            if lum > other_lum {
                (lum, other_lum)
            } else {
                (other_lum, lum)
            }
        };
        (lighter + 0.05) / (darker + 0.05)
    }

    /// Treating this color as the background, return black or white, whichever has the better
    /// contrast ratio.
    pub fn foreground_color(&self) -> Self {
        self.foreground_color_custom(&[Self::WHITE, Self::BLACK])
    }

    /// Treating this color as the background, pick a color from the given colors with the highest
    /// contrast ratio.
    pub fn foreground_color_custom(&self, text_colors: &[Color]) -> Self {
        let possible_color = text_colors
            .iter()
            .map(|c| (c, self.contrast_ratio(c)))
            .max_by(|l, r| l.1.partial_cmp(&r.1).unwrap_or(Ordering::Equal));
        match possible_color {
            Some((color, _)) => *color,
            // An empty slice was given, use the defaults instead
            None => self.foreground_color(),
        }
    }

    /// The red, green, and blue components as a 3 element array.
    pub fn as_array(&self) -> [u8; 3] {
        [self.red(), self.green(), self.blue()]
    }
}
