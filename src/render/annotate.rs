// SPDX-License-Identifier: GPL-3.0-or-later
use std::convert::TryFrom;

use image::Rgb;
use serde::Deserialize;
use tracing::trace;

use crate::alert::Evaluation;
use crate::image_buffer::{ColorImage, TextMask};
use crate::temperature::Temperature;

use super::color::Color;
use super::font::TextRenderer;

pub(crate) const ABOVE_MAX_MESSAGE: &str = "ALERTA: TEMP. MAXIMA SUPERADA";
pub(crate) const BELOW_MIN_MESSAGE: &str = "ALERTA: TEMP. MINIMA SUPERADA";

/// Distance between labels and the edge of the image, in pixels.
const MARGIN: u32 = 15;
/// Vertical space between stacked alert lines.
const LINE_GAP: u32 = 10;

/// Where a label is drawn on the image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Placement {
    /// Along the top edge, left aligned.
    Top,

    /// Horizontally centered, with every centered label stacked around the vertical middle.
    Center,

    /// Along the bottom edge, left aligned.
    BottomLeft,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Label {
    pub(crate) text: String,
    pub(crate) placement: Placement,
}

impl Label {
    pub(crate) fn mean_temperature(mean: Temperature) -> Self {
        let fahrenheit = Temperature::Fahrenheit(mean.in_fahrenheit());
        Self {
            text: format!(
                "Temperatura media: {:#.1} ({:#.1})",
                Temperature::Celsius(mean.in_celsius()),
                fahrenheit
            ),
            placement: Placement::BottomLeft,
        }
    }

    pub(crate) fn capture(file_name: &str) -> Self {
        Self {
            text: format!("Captura: {}", file_name),
            placement: Placement::Top,
        }
    }

    fn centered(text: &str) -> Self {
        Self {
            text: text.to_string(),
            placement: Placement::Center,
        }
    }
}

/// The labels describing an evaluated frame: the mean temperature, then any alerts with the
/// maximum alert first, then the capture file name if there is one.
pub(crate) fn frame_labels(evaluation: &Evaluation, capture: Option<&str>) -> Vec<Label> {
    let mut labels = vec![Label::mean_temperature(evaluation.mean_temperature())];
    if evaluation.state.above_max() {
        labels.push(Label::centered(ABOVE_MAX_MESSAGE));
    }
    if evaluation.state.below_min() {
        labels.push(Label::centered(BELOW_MIN_MESSAGE));
    }
    if let Some(file_name) = capture {
        labels.push(Label::capture(file_name));
    }
    labels
}

/// The color text is drawn in.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(try_from = "String")]
pub(crate) enum TextColor {
    /// Always use the same color.
    Fixed(Color),

    /// Use black or white, whichever stands out more from the pixel underneath.
    Contrast,
}

impl TextColor {
    fn over(&self, background: &Rgb<u8>) -> Color {
        match self {
            Self::Fixed(color) => *color,
            Self::Contrast => Color::from(background).foreground_color(),
        }
    }
}

impl Default for TextColor {
    fn default() -> Self {
        Self::Fixed(Color::BLACK)
    }
}

impl TryFrom<String> for TextColor {
    type Error = &'static str;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.eq_ignore_ascii_case("contrast") {
            Ok(Self::Contrast)
        } else {
            value.parse().map(Self::Fixed)
        }
    }
}

/// A rendered label and where its top left corner goes.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct PlacedText {
    pub(crate) x: u32,
    pub(crate) y: u32,
    pub(crate) mask: TextMask,
}

#[cfg(test)]
impl PlacedText {
    /// Check if a pixel is covered by this label's mask.
    pub(crate) fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x
            && y >= self.y
            && x < self.x + self.mask.width()
            && y < self.y + self.mask.height()
    }
}

/// Draws labels onto images.
#[derive(Debug)]
pub(crate) struct Annotator {
    text_renderer: Box<dyn TextRenderer>,
    text_color: TextColor,
}

impl Annotator {
    pub(crate) fn new(text_renderer: Box<dyn TextRenderer>, text_color: TextColor) -> Self {
        Self {
            text_renderer,
            text_color,
        }
    }

    /// Render and position labels for an image of the given size.
    ///
    /// Labels that don't fit are clipped at the right and bottom edges.
    pub(crate) fn layout(
        &self,
        (width, height): (u32, u32),
        labels: &[Label],
    ) -> anyhow::Result<Vec<PlacedText>> {
        let masks = labels
            .iter()
            .map(|label| self.text_renderer.render_line(&label.text))
            .collect::<anyhow::Result<Vec<_>>>()?;
        let centered_height = labels
            .iter()
            .zip(masks.iter())
            .filter(|(label, _)| label.placement == Placement::Center)
            .map(|(_, mask)| mask.height())
            .fold(None, |total: Option<u32>, line_height| {
                Some(total.map_or(line_height, |total| total + LINE_GAP + line_height))
            })
            .unwrap_or(0);
        let mut next_centered_y = height.saturating_sub(centered_height) / 2;
        let placed = labels
            .iter()
            .zip(masks.into_iter())
            .map(|(label, mask)| {
                let (x, y) = match label.placement {
                    Placement::Top => (MARGIN, MARGIN),
                    Placement::BottomLeft => {
                        (MARGIN, height.saturating_sub(MARGIN + mask.height()))
                    }
                    Placement::Center => {
                        let y = next_centered_y;
                        next_centered_y += mask.height() + LINE_GAP;
                        (width.saturating_sub(mask.width()) / 2, y)
                    }
                };
                PlacedText { x, y, mask }
            })
            .collect();
        Ok(placed)
    }

    /// Draw labels onto a copy of an image. Pixels not covered by a label are left unchanged.
    pub(crate) fn annotate(
        &self,
        image: &ColorImage,
        labels: &[Label],
    ) -> anyhow::Result<ColorImage> {
        let mut annotated = image.clone();
        for placed in self.layout(image.dimensions(), labels)? {
            self.blend(&mut annotated, &placed);
        }
        trace!(count = labels.len(), "Drew labels");
        Ok(annotated)
    }

    fn blend(&self, image: &mut ColorImage, placed: &PlacedText) {
        let (width, height) = image.dimensions();
        for (mask_x, mask_y, opacity) in placed.mask.enumerate_pixels() {
            let alpha = opacity[0] as u32;
            let (x, y) = (placed.x + mask_x, placed.y + mask_y);
            if alpha == 0 || x >= width || y >= height {
                continue;
            }
            let background = image.get_pixel_mut(x, y);
            let foreground = self.text_color.over(background).as_array();
            for (channel, text_channel) in background.0.iter_mut().zip(foreground.iter()) {
                let blended =
                    (*text_channel as u32 * alpha + *channel as u32 * (255 - alpha) + 127) / 255;
                *channel = blended as u8;
            }
        }
    }
}

#[cfg(test)]
mod test {
    use std::convert::TryFrom;

    use image::{Rgb, RgbImage};

    use crate::alert::{AlertState, Evaluation};
    use crate::render::color::Color;
    use crate::render::font::BitmapFont;
    use crate::temperature::Temperature;

    use super::{
        frame_labels, Annotator, Label, Placement, TextColor, ABOVE_MAX_MESSAGE,
        BELOW_MIN_MESSAGE, MARGIN,
    };

    fn annotator(text_color: TextColor) -> Annotator {
        Annotator::new(Box::new(BitmapFont::new(21.0)), text_color)
    }

    fn texts(labels: &[Label]) -> Vec<&str> {
        labels.iter().map(|l| l.text.as_str()).collect()
    }

    #[test]
    fn mean_label_text() {
        let label = Label::mean_temperature(Temperature::Celsius(25.0));
        assert_eq!(label.text, "Temperatura media: 25.0C (77.0F)");
        assert_eq!(label.placement, Placement::BottomLeft);
        let label = Label::mean_temperature(Temperature::Celsius(20.0));
        assert_eq!(label.text, "Temperatura media: 20.0C (68.0F)");
    }

    #[test]
    fn capture_label_text() {
        let label = Label::capture("10-30-00_17-10-2026.png");
        assert_eq!(label.text, "Captura: 10-30-00_17-10-2026.png");
        assert_eq!(label.placement, Placement::Top);
    }

    #[test]
    fn labels_for_states() {
        let evaluation = |state| Evaluation { mean: 25.0, state };
        assert_eq!(
            texts(&frame_labels(&evaluation(AlertState::Normal), None)),
            vec!["Temperatura media: 25.0C (77.0F)"]
        );
        assert_eq!(
            texts(&frame_labels(&evaluation(AlertState::AboveMax), None))[1..],
            [ABOVE_MAX_MESSAGE]
        );
        assert_eq!(
            texts(&frame_labels(&evaluation(AlertState::BelowMin), None))[1..],
            [BELOW_MIN_MESSAGE]
        );
        assert_eq!(
            texts(&frame_labels(&evaluation(AlertState::Both), None))[1..],
            [ABOVE_MAX_MESSAGE, BELOW_MIN_MESSAGE]
        );
        let captured = frame_labels(&evaluation(AlertState::Normal), Some("a.png"));
        assert_eq!(captured.last(), Some(&Label::capture("a.png")));
    }

    #[test]
    fn parse_text_color() {
        assert_eq!(
            TextColor::try_from("contrast".to_string()),
            Ok(TextColor::Contrast)
        );
        assert_eq!(
            TextColor::try_from("#ff0000".to_string()),
            Ok(TextColor::Fixed(Color::new(255, 0, 0)))
        );
        assert_eq!(
            TextColor::try_from("white".to_string()),
            Ok(TextColor::Fixed(Color::WHITE))
        );
        assert!(TextColor::try_from("plaid".to_string()).is_err());
    }

    #[test]
    fn layout_positions() {
        let annotator = annotator(TextColor::default());
        let labels = vec![
            Label::mean_temperature(Temperature::Celsius(25.0)),
            Label::centered(ABOVE_MAX_MESSAGE),
            Label::centered(BELOW_MIN_MESSAGE),
            Label::capture("a.png"),
        ];
        let placed = annotator.layout((640, 480), &labels).unwrap();
        // Bottom left
        assert_eq!(placed[0].x, MARGIN);
        assert_eq!(placed[0].y + placed[0].mask.height(), 480 - MARGIN);
        // The maximum alert is above the middle, the minimum alert below it.
        assert!(placed[1].y + placed[1].mask.height() <= 240);
        assert!(placed[2].y >= 240);
        let center = placed[1].x + placed[1].mask.width() / 2;
        assert!((319..=321).contains(&center), "{}", center);
        // Top
        assert_eq!((placed[3].x, placed[3].y), (MARGIN, MARGIN));
    }

    #[test]
    fn single_alert_is_centered() {
        let annotator = annotator(TextColor::default());
        let placed = annotator
            .layout((640, 480), &[Label::centered(ABOVE_MAX_MESSAGE)])
            .unwrap();
        assert_eq!(placed[0].y, (480 - placed[0].mask.height()) / 2);
    }

    #[test]
    fn only_text_pixels_change() {
        let annotator = annotator(TextColor::default());
        let image = RgbImage::from_pixel(640, 480, Rgb([200, 30, 30]));
        let labels = frame_labels(
            &Evaluation {
                mean: 35.0,
                state: AlertState::AboveMax,
            },
            Some("a.png"),
        );
        let annotated = annotator.annotate(&image, &labels).unwrap();
        let placed = annotator.layout((640, 480), &labels).unwrap();
        let mut changed = 0;
        for (x, y, pixel) in annotated.enumerate_pixels() {
            if placed.iter().any(|p| p.contains(x, y)) {
                if *pixel == Rgb([0, 0, 0]) {
                    changed += 1;
                }
            } else {
                assert_eq!(*pixel, Rgb([200, 30, 30]), "({}, {}) changed", x, y);
            }
        }
        assert!(changed > 0);
    }

    #[test]
    fn contrast_text() {
        let annotator = annotator(TextColor::Contrast);
        let image = RgbImage::from_pixel(640, 480, Rgb([0, 0, 128]));
        let labels = vec![Label::capture("a.png")];
        let annotated = annotator.annotate(&image, &labels).unwrap();
        assert!(annotated.pixels().any(|p| *p == Rgb([255, 255, 255])));
        assert!(!annotated.pixels().any(|p| *p == Rgb([0, 0, 0])));
    }

    #[test]
    fn clipped_at_edges() {
        let annotator = annotator(TextColor::default());
        let image = RgbImage::from_pixel(40, 30, Rgb([255, 255, 255]));
        let annotated = annotator
            .annotate(&image, &[Label::centered(ABOVE_MAX_MESSAGE)])
            .unwrap();
        assert_eq!(annotated.dimensions(), (40, 30));
    }
}
