// SPDX-License-Identifier: GPL-3.0-or-later
use std::fmt::Display;
use std::io::{BufRead, Write};
use std::str::FromStr;

use anyhow::{bail, Context as _};
use serde::Deserialize;
use tracing::{info, warn};

use crate::camera::RefreshRate;
use crate::temperature::Temperature;

/// Threshold values as given in the config file, any of which may be missing.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq)]
pub(crate) struct ThresholdSettings {
    #[serde(default)]
    pub(crate) max_temp: Option<Temperature>,

    #[serde(default)]
    pub(crate) min_temp: Option<Temperature>,

    #[serde(default)]
    pub(crate) refresh_rate: Option<RefreshRate>,
}

/// The fully resolved limits, fixed for the lifetime of the program.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct ThresholdConfig {
    pub(crate) max_temp: Temperature,
    pub(crate) min_temp: Temperature,
    pub(crate) refresh_rate: RefreshRate,
}

impl ThresholdSettings {
    /// Fill in any missing values by asking on `input`, with the questions written to `output`.
    pub(crate) fn resolve<R, W>(
        self,
        input: &mut R,
        output: &mut W,
    ) -> anyhow::Result<ThresholdConfig>
    where
        R: BufRead,
        W: Write,
    {
        let max_temp = match self.max_temp {
            Some(temperature) => temperature,
            None => {
                let celsius: i32 = prompt(input, output, "Maximum temperature (C)")?;
                Temperature::Celsius(celsius as f32)
            }
        };
        let min_temp = match self.min_temp {
            Some(temperature) => temperature,
            None => {
                let celsius: i32 = prompt(input, output, "Minimum temperature (C)")?;
                Temperature::Celsius(celsius as f32)
            }
        };
        let refresh_rate = match self.refresh_rate {
            Some(refresh_rate) => refresh_rate,
            None => RefreshRate::from(prompt::<i64, _, _>(
                input,
                output,
                "Refresh rate in Hz (2 or 4)",
            )?),
        };
        if max_temp.in_celsius() < min_temp.in_celsius() {
            warn!(
                max_temp = max_temp.in_celsius(),
                min_temp = min_temp.in_celsius(),
                "The maximum temperature is below the minimum, both alerts can show at once"
            );
        }
        info!(
            max_temp = max_temp.in_celsius(),
            min_temp = min_temp.in_celsius(),
            %refresh_rate,
            "Using thresholds"
        );
        Ok(ThresholdConfig {
            max_temp,
            min_temp,
            refresh_rate,
        })
    }
}

/// Ask for a value until one parses. Running out of input is an error.
fn prompt<T, R, W>(input: &mut R, output: &mut W, question: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: Display,
    R: BufRead,
    W: Write,
{
    let mut line = String::new();
    loop {
        write!(output, "{}: ", question)?;
        output.flush()?;
        line.clear();
        let read = input
            .read_line(&mut line)
            .with_context(|| format!("Unable to read {}", question))?;
        if read == 0 {
            bail!("No value given for {}", question);
        }
        let answer = line.trim();
        match answer.parse() {
            Ok(value) => return Ok(value),
            Err(err) => writeln!(output, "'{}' is not valid: {}", answer, err)?,
        }
    }
}
