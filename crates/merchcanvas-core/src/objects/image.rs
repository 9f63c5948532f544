//! Image object payload.

use serde::{Deserialize, Serialize};

/// Natural pixel dimensions of a loaded bitmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

impl ImageDimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Display size that fits within the given maximum, preserving aspect ratio.
    ///
    /// Images already inside the limits keep their natural size; they are
    /// never scaled up. A zero-length axis places no limit on the scale.
    pub fn fit_within(&self, max_width: f64, max_height: f64) -> (f64, f64) {
        let width = self.width as f64;
        let height = self.height as f64;

        let axis_scale = |natural: f64, max: f64| if natural > 0.0 { max / natural } else { 1.0 };
        let scale = axis_scale(width, max_width)
            .min(axis_scale(height, max_height))
            .clamp(0.0, 1.0);
        (width * scale, height * scale)
    }
}

/// Image-specific fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageProps {
    /// Source reference (URL, data URI, or path).
    pub src: String,
    pub natural_width: u32,
    pub natural_height: u32,
}

impl ImageProps {
    pub fn new(src: impl Into<String>, natural: ImageDimensions) -> Self {
        Self {
            src: src.into(),
            natural_width: natural.width,
            natural_height: natural.height,
        }
    }

    pub fn natural_size(&self) -> ImageDimensions {
        ImageDimensions::new(self.natural_width, self.natural_height)
    }

    /// Natural width over natural height (1.0 for degenerate bitmaps).
    pub fn aspect_ratio(&self) -> f64 {
        if self.natural_height == 0 {
            1.0
        } else {
            self.natural_width as f64 / self.natural_height as f64
        }
    }
}

/// Optional overrides for [`ImageProps`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImagePatch {
    pub src: Option<String>,
    pub natural_size: Option<ImageDimensions>,
}

impl ImagePatch {
    pub(crate) fn apply(&self, props: &mut ImageProps) {
        if let Some(src) = &self.src {
            props.src = src.clone();
        }
        if let Some(size) = self.natural_size {
            props.natural_width = size.width;
            props.natural_height = size.height;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_within_tall_image() {
        let dims = ImageDimensions::new(500, 1000);
        let (w, h) = dims.fit_within(400.0, 400.0);
        assert!((w - 200.0).abs() < 0.01);
        assert!((h - 400.0).abs() < 0.01);
    }

    #[test]
    fn test_fit_within_only_one_axis_too_large() {
        // Width fits, height does not: both shrink by the same factor
        let dims = ImageDimensions::new(100, 800);
        let (w, h) = dims.fit_within(400.0, 400.0);
        assert!((w - 50.0).abs() < 0.01);
        assert!((h - 400.0).abs() < 0.01);
    }

    #[test]
    fn test_fit_within_never_upscales() {
        let dims = ImageDimensions::new(10, 20);
        assert_eq!(dims.fit_within(400.0, 400.0), (10.0, 20.0));
    }

    #[test]
    fn test_fit_within_degenerate_axis() {
        let dims = ImageDimensions::new(0, 5000);
        let (w, h) = dims.fit_within(240.0, 320.0);
        assert!((w - 0.0).abs() < f64::EPSILON);
        assert!((h - 320.0).abs() < 0.01);

        let dims = ImageDimensions::new(900, 0);
        let (w, h) = dims.fit_within(240.0, 320.0);
        assert!((w - 240.0).abs() < 0.01);
        assert!((h - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_aspect_ratio() {
        let props = ImageProps::new("a.png", ImageDimensions::new(300, 150));
        assert!((props.aspect_ratio() - 2.0).abs() < f64::EPSILON);
        let degenerate = ImageProps::new("b.png", ImageDimensions::new(300, 0));
        assert!((degenerate.aspect_ratio() - 1.0).abs() < f64::EPSILON);
    }
}
