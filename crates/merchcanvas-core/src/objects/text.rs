//! Text object payload.

use super::SerializableColor;
use serde::{Deserialize, Serialize};

/// Horizontal alignment of text within its box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

/// Font style options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FontStyle {
    #[default]
    Normal,
    Bold,
    Italic,
    BoldItalic,
}

impl FontStyle {
    pub fn is_bold(&self) -> bool {
        matches!(self, FontStyle::Bold | FontStyle::BoldItalic)
    }

    pub fn is_italic(&self) -> bool {
        matches!(self, FontStyle::Italic | FontStyle::BoldItalic)
    }

    /// Combine the two toggles of a style toolbar.
    pub fn from_flags(bold: bool, italic: bool) -> Self {
        match (bold, italic) {
            (false, false) => FontStyle::Normal,
            (true, false) => FontStyle::Bold,
            (false, true) => FontStyle::Italic,
            (true, true) => FontStyle::BoldItalic,
        }
    }
}

/// Text-specific fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextProps {
    pub text: String,
    pub font_family: String,
    /// Font size in pixels.
    pub font_size: f64,
    pub fill: SerializableColor,
    #[serde(default)]
    pub align: TextAlign,
    #[serde(default)]
    pub font_style: FontStyle,
}

impl TextProps {
    pub const DEFAULT_TEXT: &'static str = "Your text";
    pub const DEFAULT_FONT_FAMILY: &'static str = "Arial";
    pub const DEFAULT_FONT_SIZE: f64 = 48.0;
    pub const DEFAULT_WIDTH: f64 = 200.0;
    pub const DEFAULT_HEIGHT: f64 = 60.0;
}

impl Default for TextProps {
    fn default() -> Self {
        Self {
            text: Self::DEFAULT_TEXT.to_string(),
            font_family: Self::DEFAULT_FONT_FAMILY.to_string(),
            font_size: Self::DEFAULT_FONT_SIZE,
            fill: SerializableColor::black(),
            align: TextAlign::default(),
            font_style: FontStyle::default(),
        }
    }
}

/// Optional overrides for [`TextProps`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextPatch {
    pub text: Option<String>,
    pub font_family: Option<String>,
    pub font_size: Option<f64>,
    pub fill: Option<SerializableColor>,
    pub align: Option<TextAlign>,
    pub font_style: Option<FontStyle>,
}

impl TextPatch {
    pub(crate) fn apply(&self, props: &mut TextProps) {
        if let Some(text) = &self.text {
            props.text = text.clone();
        }
        if let Some(family) = &self.font_family {
            props.font_family = family.clone();
        }
        if let Some(size) = self.font_size {
            props.font_size = size;
        }
        if let Some(fill) = self.fill {
            props.fill = fill;
        }
        if let Some(align) = self.align {
            props.align = align;
        }
        if let Some(style) = self.font_style {
            props.font_style = style;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_style_flags() {
        assert_eq!(FontStyle::from_flags(true, true), FontStyle::BoldItalic);
        assert!(FontStyle::BoldItalic.is_bold());
        assert!(FontStyle::BoldItalic.is_italic());
        assert!(!FontStyle::Bold.is_italic());
        assert_eq!(FontStyle::from_flags(false, false), FontStyle::Normal);
    }

    #[test]
    fn test_font_style_serialization() {
        let json = serde_json::to_string(&FontStyle::BoldItalic).unwrap();
        assert_eq!(json, "\"bold-italic\"");
    }

    #[test]
    fn test_patch_only_touches_given_fields() {
        let mut props = TextProps::default();
        let patch = TextPatch {
            align: Some(TextAlign::Left),
            ..TextPatch::default()
        };
        patch.apply(&mut props);
        assert_eq!(props.align, TextAlign::Left);
        assert_eq!(props.text, TextProps::DEFAULT_TEXT);
        assert!((props.font_size - TextProps::DEFAULT_FONT_SIZE).abs() < f64::EPSILON);
    }
}
