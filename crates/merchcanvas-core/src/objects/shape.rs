//! Primitive shape payload.

use super::SerializableColor;
use serde::{Deserialize, Serialize};

/// The four primitive shapes the editor can place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Rectangle,
    Circle,
    Triangle,
    Line,
}

impl ShapeKind {
    /// Get all available shape kinds.
    pub fn all() -> &'static [ShapeKind] {
        &[
            ShapeKind::Rectangle,
            ShapeKind::Circle,
            ShapeKind::Triangle,
            ShapeKind::Line,
        ]
    }

    pub fn supports_corner_radius(&self) -> bool {
        matches!(self, ShapeKind::Rectangle)
    }
}

/// Shape-specific fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeProps {
    pub shape: ShapeKind,
    pub fill: SerializableColor,
    pub stroke: SerializableColor,
    pub stroke_width: f64,
    /// Only meaningful for rectangles.
    #[serde(default)]
    pub corner_radius: f64,
}

impl ShapeProps {
    pub const DEFAULT_WIDTH: f64 = 300.0;
    pub const DEFAULT_HEIGHT: f64 = 150.0;
    pub const DEFAULT_STROKE_WIDTH: f64 = 2.0;

    pub fn new(shape: ShapeKind) -> Self {
        Self {
            shape,
            fill: Self::default_fill(),
            stroke: SerializableColor::black(),
            stroke_width: Self::DEFAULT_STROKE_WIDTH,
            corner_radius: 0.0,
        }
    }

    /// Translucent blue used for freshly placed shapes.
    pub fn default_fill() -> SerializableColor {
        SerializableColor::new(59, 130, 246, 128)
    }

    /// Corner radius as drawn (zero for anything but rectangles).
    pub fn effective_corner_radius(&self) -> f64 {
        if self.shape.supports_corner_radius() {
            self.corner_radius
        } else {
            0.0
        }
    }
}

/// Optional overrides for [`ShapeProps`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShapePatch {
    pub fill: Option<SerializableColor>,
    pub stroke: Option<SerializableColor>,
    pub stroke_width: Option<f64>,
    pub corner_radius: Option<f64>,
}

impl ShapePatch {
    pub(crate) fn apply(&self, props: &mut ShapeProps) {
        if let Some(fill) = self.fill {
            props.fill = fill;
        }
        if let Some(stroke) = self.stroke {
            props.stroke = stroke;
        }
        if let Some(width) = self.stroke_width {
            props.stroke_width = width.max(0.0);
        }
        if let Some(radius) = self.corner_radius {
            if props.shape.supports_corner_radius() {
                props.corner_radius = radius.max(0.0);
            } else {
                log::debug!("Ignoring corner radius for {:?}", props.shape);
            }
        }
    }
}
