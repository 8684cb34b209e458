// SPDX-License-Identifier: GPL-3.0-or-later
use std::fmt;
use std::str::FromStr;

use image::{Rgb, RgbImage};
use ndarray::Array2;
use serde::de::{self, Deserialize, Deserializer};

/// How normalized intensities (0-255) are turned into colors.
#[derive(Clone, Copy)]
pub(crate) enum ColorMap {
    /// The classic "jet" map, running from dark blue through cyan, yellow, and red to dark red.
    Jet,

    /// One of the [colorous] gradients.
    Gradient(colorous::Gradient),
}

impl Default for ColorMap {
    fn default() -> Self {
        Self::Jet
    }
}

impl fmt::Debug for ColorMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Jet => f.write_str("Jet"),
            Self::Gradient(gradient) => write!(f, "Gradient({:?})", gradient),
        }
    }
}

impl PartialEq for ColorMap {
    fn eq(&self, other: &Self) -> bool {
        // colorous::Gradient doesn't implement PartialEq, but the Debug output has the name.
        format!("{:?}", self) == format!("{:?}", other)
    }
}

fn jet_component(value: f32, center: f32) -> u8 {
    let intensity = (1.5 - (4.0 * value - center).abs()).max(0.0).min(1.0);
    (intensity * 255.0).round() as u8
}

impl ColorMap {
    /// The color for a single normalized intensity.
    pub(crate) fn color(&self, intensity: u8) -> Rgb<u8> {
        let value = intensity as f32 / 255.0;
        match self {
            Self::Jet => Rgb([
                jet_component(value, 3.0),
                jet_component(value, 2.0),
                jet_component(value, 1.0),
            ]),
            Self::Gradient(gradient) => Rgb(gradient.eval_continuous(value as f64).as_array()),
        }
    }

    fn lookup_table(&self) -> Vec<Rgb<u8>> {
        (0..=u8::MAX).map(|intensity| self.color(intensity)).collect()
    }
}

/// Color an intensity grid, truncating each intensity to an integer first.
pub(crate) fn colorize(intensities: &Array2<f32>, color_map: &ColorMap) -> RgbImage {
    let table = color_map.lookup_table();
    let (rows, cols) = intensities.dim();
    RgbImage::from_fn(cols as u32, rows as u32, |x, y| {
        // `as` saturates out of range floats (and maps NaN to 0), so this can't index past the
        // end of the table.
        let intensity = intensities[[y as usize, x as usize]] as u8;
        table[intensity as usize]
    })
}

impl FromStr for ColorMap {
    type Err = &'static str;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let gradient = match &name.to_uppercase().replace(" ", "_") as &str {
            "JET" => return Ok(Self::Jet),
            "BLUES" => colorous::BLUES,
            "BLUE_GREEN" => colorous::BLUE_GREEN,
            "BLUE_PURPLE" => colorous::BLUE_PURPLE,
            "BROWN_GREEN" => colorous::BROWN_GREEN,
            "CIVIDIS" => colorous::CIVIDIS,
            "COOL" => colorous::COOL,
            "CUBEHELIX" => colorous::CUBEHELIX,
            "GREENS" => colorous::GREENS,
            "GREEN_BLUE" => colorous::GREEN_BLUE,
            "GREYS" => colorous::GREYS,
            "INFERNO" => colorous::INFERNO,
            "MAGMA" => colorous::MAGMA,
            "ORANGES" => colorous::ORANGES,
            "ORANGE_RED" => colorous::ORANGE_RED,
            "PINK_GREEN" => colorous::PINK_GREEN,
            "PLASMA" => colorous::PLASMA,
            "PURPLES" => colorous::PURPLES,
            "PURPLE_BLUE" => colorous::PURPLE_BLUE,
            "PURPLE_BLUE_GREEN" => colorous::PURPLE_BLUE_GREEN,
            "PURPLE_GREEN" => colorous::PURPLE_GREEN,
            "PURPLE_ORANGE" => colorous::PURPLE_ORANGE,
            "PURPLE_RED" => colorous::PURPLE_RED,
            "RAINBOW" => colorous::RAINBOW,
            "REDS" => colorous::REDS,
            "RED_BLUE" => colorous::RED_BLUE,
            "RED_GREY" => colorous::RED_GREY,
            "RED_PURPLE" => colorous::RED_PURPLE,
            "RED_YELLOW_BLUE" => colorous::RED_YELLOW_BLUE,
            "RED_YELLOW_GREEN" => colorous::RED_YELLOW_GREEN,
            "SINEBOW" => colorous::SINEBOW,
            "SPECTRAL" => colorous::SPECTRAL,
            "TURBO" => colorous::TURBO,
            "VIRIDIS" => colorous::VIRIDIS,
            "WARM" => colorous::WARM,
            "YELLOW_GREEN" => colorous::YELLOW_GREEN,
            "YELLOW_GREEN_BLUE" => colorous::YELLOW_GREEN_BLUE,
            "YELLOW_ORANGE_BROWN" => colorous::YELLOW_ORANGE_BROWN,
            "YELLOW_ORANGE_RED" => colorous::YELLOW_ORANGE_RED,
            _ => return Err("Invalid color map name"),
        };
        Ok(Self::Gradient(gradient))
    }
}

impl<'de> Deserialize<'de> for ColorMap {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name: String = Deserialize::deserialize(deserializer)?;
        name.parse().map_err(|_| {
            de::Error::invalid_value(
                de::Unexpected::Str(&name),
                &"\"jet\" or the name of a colorous gradient",
            )
        })
    }
}
