// SPDX-License-Identifier: GPL-3.0-or-later
use std::cmp;
use std::fmt;

use num_traits::Float;
use serde::Deserialize;

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum TemperatureUnit {
    Celsius,
    Fahrenheit,
}

impl fmt::Display for TemperatureUnit {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.write_str(match self {
            TemperatureUnit::Celsius => "C",
            TemperatureUnit::Fahrenheit => "F",
        })
    }
}

/// A temperature tagged with the unit it was given in.
///
/// Thresholds can be written in either unit in the config file, but all comparisons happen in
/// Celsius as that is what the sensor reports.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(from = "DeserializedTemperature<T>")]
pub enum Temperature<T = f32>
where
    T: Float,
{
    Celsius(T),
    Fahrenheit(T),
}

impl<T> Temperature<T>
where
    T: Float,
{
    /// Get the temperature in Celsius.
    pub fn in_celsius(&self) -> T {
        match self {
            Self::Celsius(c) => *c,
            Self::Fahrenheit(f) => {
                (*f - Self::constant(32)) * Self::constant(5) / Self::constant(9)
            }
        }
    }

    /// Get the temperature in Fahrenheit.
    pub fn in_fahrenheit(&self) -> T {
        match self {
            Self::Celsius(c) => *c * Self::constant(9) / Self::constant(5) + Self::constant(32),
            Self::Fahrenheit(f) => *f,
        }
    }

    pub fn unit(&self) -> TemperatureUnit {
        match self {
            Temperature::Celsius(_) => TemperatureUnit::Celsius,
            Temperature::Fahrenheit(_) => TemperatureUnit::Fahrenheit,
        }
    }

    fn value(&self) -> T {
        match self {
            Temperature::Celsius(c) => *c,
            Temperature::Fahrenheit(f) => *f,
        }
    }

    fn constant(n: u8) -> T {
        T::from(n).expect("small integers to be representable by a float")
    }
}

impl<T> cmp::PartialEq<Self> for Temperature<T>
where
    T: Float,
{
    fn eq(&self, other: &Self) -> bool {
        // Always compare in celsius.
        self.in_celsius().eq(&other.in_celsius())
    }
}

impl<T> fmt::Display for Temperature<T>
where
    T: Float,
    T: fmt::Display,
{
    /// Format the temperature value like a numeric value. If the alternate formatting flag (`#`)
    /// is specified, the unit (ex: `C`) is also printed directly after the value. The precision
    /// is passed through to the value.
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.value().fmt(fmt)?;
        if fmt.alternate() {
            write!(fmt, "{}", self.unit())?;
        }
        Ok(())
    }
}

impl<T> From<T> for Temperature<T>
where
    T: Float,
{
    fn from(value: T) -> Self {
        Self::Celsius(value)
    }
}

// Accept either a bare number (Celsius) or a single entry map of a unit to a number.
#[derive(Copy, Clone, Debug, Deserialize)]
#[serde(untagged)]
enum DeserializedTemperature<T>
where
    T: Float,
{
    Number(T),
    Wrapped(WrappedTemperature<T>),
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum WrappedTemperature<T>
where
    T: Float,
{
    #[serde(alias = "c", alias = "C")]
    Celsius(T),

    #[serde(alias = "f", alias = "F")]
    Fahrenheit(T),
}

impl<T> From<DeserializedTemperature<T>> for Temperature<T>
where
    T: Float,
{
    fn from(maybe_wrapped: DeserializedTemperature<T>) -> Self {
        match maybe_wrapped {
            DeserializedTemperature::Number(temperature) => temperature.into(),
            DeserializedTemperature::Wrapped(WrappedTemperature::Celsius(c)) => Self::Celsius(c),
            DeserializedTemperature::Wrapped(WrappedTemperature::Fahrenheit(f)) => {
                Self::Fahrenheit(f)
            }
        }
    }
}
