//! Design objects placed on a scene.
//!
//! Every object shares an [`ObjectBase`] (position, box, transform, flags) and
//! carries exactly one variant payload in [`ObjectKind`]. Mutation goes through
//! [`ObjectPatch`], whose variant part is itself tagged, so text fields can only
//! ever reach a text object.

mod image;
mod shape;
mod text;

pub use image::{ImageDimensions, ImagePatch, ImageProps};
pub use shape::{ShapeKind, ShapePatch, ShapeProps};
pub use text::{FontStyle, TextAlign, TextPatch, TextProps};

use kurbo::{Affine, Point, Rect, Vec2};
use peniko::Color;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for scene objects.
pub type ObjectId = Uuid;

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

fn one() -> f64 {
    1.0
}

fn visible_default() -> bool {
    true
}

fn first_index() -> u32 {
    1
}

/// Fields shared by every object variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectBase {
    pub(crate) id: ObjectId,
    /// Origin (top-left of the unrotated box).
    pub x: f64,
    pub y: f64,
    /// Box width before scaling (None until known).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    /// Box height before scaling (None until known).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// Rotation in degrees, clockwise about the origin.
    #[serde(default)]
    pub rotation: f64,
    #[serde(default = "one")]
    pub scale_x: f64,
    #[serde(default = "one")]
    pub scale_y: f64,
    /// Opacity in 0.0..=1.0.
    #[serde(default = "one")]
    pub opacity: f64,
    #[serde(default)]
    pub locked: bool,
    #[serde(default = "visible_default")]
    pub visible: bool,
    /// Stacking index, 1-based.
    #[serde(default = "first_index")]
    pub z_index: u32,
}

impl ObjectBase {
    /// Create a base with a fresh id and an identity transform.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            x,
            y,
            width: Some(width),
            height: Some(height),
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            opacity: 1.0,
            locked: false,
            visible: true,
            z_index: 1,
        }
    }

    /// Create a base of the given size centered in `area`.
    pub fn centered_in(area: Rect, width: f64, height: f64) -> Self {
        let x = area.x0 + (area.width() - width) / 2.0;
        let y = area.y0 + (area.height() - height) / 2.0;
        Self::new(x, y, width, height)
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Axis-aligned bounds of the scaled, rotated box.
    pub fn bounds(&self) -> Rect {
        let local = Rect::new(
            0.0,
            0.0,
            self.width.unwrap_or(0.0),
            self.height.unwrap_or(0.0),
        );
        let transform = Affine::translate(Vec2::new(self.x, self.y))
            * Affine::rotate(self.rotation.to_radians())
            * Affine::scale_non_uniform(self.scale_x, self.scale_y);
        transform.transform_rect_bbox(local)
    }
}

/// Variant payload of an object, tagged by `type` when serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ObjectKind {
    Text(TextProps),
    Image(ImageProps),
    Shape(ShapeProps),
}

impl ObjectKind {
    /// Name of the variant, as used in the serialized `type` tag.
    pub fn name(&self) -> &'static str {
        match self {
            ObjectKind::Text(_) => "text",
            ObjectKind::Image(_) => "image",
            ObjectKind::Shape(_) => "shape",
        }
    }
}

/// A drawable object: shared base plus one variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    #[serde(flatten)]
    pub base: ObjectBase,
    #[serde(flatten)]
    pub kind: ObjectKind,
}

impl SceneObject {
    pub fn new(base: ObjectBase, kind: ObjectKind) -> Self {
        Self { base, kind }
    }

    /// Default text object centered in `area`.
    pub fn text(area: Rect) -> Self {
        let base = ObjectBase::centered_in(area, TextProps::DEFAULT_WIDTH, TextProps::DEFAULT_HEIGHT);
        Self::new(base, ObjectKind::Text(TextProps::default()))
    }

    /// Image object sized from its natural dimensions and centered in `area`.
    ///
    /// Bitmaps larger than `fit_ratio` of the area along either axis are
    /// uniformly scaled down until both axes fit. An area with no extent
    /// leaves the natural size as is.
    pub fn image(area: Rect, src: impl Into<String>, natural: ImageDimensions, fit_ratio: f64) -> Self {
        let (width, height) = if area.width() > 0.0 && area.height() > 0.0 {
            natural.fit_within(area.width() * fit_ratio, area.height() * fit_ratio)
        } else {
            (natural.width as f64, natural.height as f64)
        };
        let base = ObjectBase::centered_in(area, width, height);
        Self::new(base, ObjectKind::Image(ImageProps::new(src, natural)))
    }

    /// Default shape object of the given kind centered in `area`.
    pub fn shape(area: Rect, kind: ShapeKind) -> Self {
        let base = ObjectBase::centered_in(area, ShapeProps::DEFAULT_WIDTH, ShapeProps::DEFAULT_HEIGHT);
        Self::new(base, ObjectKind::Shape(ShapeProps::new(kind)))
    }

    pub fn id(&self) -> ObjectId {
        self.base.id
    }

    pub fn bounds(&self) -> Rect {
        self.base.bounds()
    }

    pub fn is_locked(&self) -> bool {
        self.base.locked
    }

    pub fn is_visible(&self) -> bool {
        self.base.visible
    }

    /// Move the object's origin by `delta`.
    pub fn translate(&mut self, delta: Vec2) {
        self.base.x += delta.x;
        self.base.y += delta.y;
    }

    pub fn as_text(&self) -> Option<&TextProps> {
        match &self.kind {
            ObjectKind::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_image(&self) -> Option<&ImageProps> {
        match &self.kind {
            ObjectKind::Image(i) => Some(i),
            _ => None,
        }
    }

    pub fn as_shape(&self) -> Option<&ShapeProps> {
        match &self.kind {
            ObjectKind::Shape(s) => Some(s),
            _ => None,
        }
    }

    /// Merge `patch` into this object.
    ///
    /// Returns false and leaves the object untouched when the patch carries a
    /// payload for a different variant.
    pub fn apply_patch(&mut self, patch: &ObjectPatch) -> bool {
        let matches = match (&self.kind, &patch.kind) {
            (_, None) => true,
            (ObjectKind::Text(_), Some(KindPatch::Text(_)))
            | (ObjectKind::Image(_), Some(KindPatch::Image(_)))
            | (ObjectKind::Shape(_), Some(KindPatch::Shape(_))) => true,
            _ => false,
        };
        if !matches {
            log::warn!(
                "Rejected {} patch for {} object {}",
                patch.kind.as_ref().map(KindPatch::name).unwrap_or("base"),
                self.kind.name(),
                self.base.id
            );
            return false;
        }

        patch.base.apply(&mut self.base);
        match (&mut self.kind, &patch.kind) {
            (ObjectKind::Text(props), Some(KindPatch::Text(p))) => p.apply(props),
            (ObjectKind::Image(props), Some(KindPatch::Image(p))) => p.apply(props),
            (ObjectKind::Shape(props), Some(KindPatch::Shape(p))) => p.apply(props),
            _ => {}
        }
        true
    }

    /// Give the object a new unique id.
    pub fn regenerate_id(&mut self) {
        self.base.id = Uuid::new_v4();
    }
}

/// Optional overrides for the shared fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BasePatch {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub rotation: Option<f64>,
    pub scale_x: Option<f64>,
    pub scale_y: Option<f64>,
    pub opacity: Option<f64>,
    pub locked: Option<bool>,
    pub visible: Option<bool>,
}

impl BasePatch {
    pub fn position(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn apply(&self, base: &mut ObjectBase) {
        if let Some(x) = self.x {
            base.x = x;
        }
        if let Some(y) = self.y {
            base.y = y;
        }
        if let Some(width) = self.width {
            base.width = Some(width);
        }
        if let Some(height) = self.height {
            base.height = Some(height);
        }
        if let Some(rotation) = self.rotation {
            base.rotation = rotation;
        }
        if let Some(scale_x) = self.scale_x {
            base.scale_x = scale_x;
        }
        if let Some(scale_y) = self.scale_y {
            base.scale_y = scale_y;
        }
        if let Some(opacity) = self.opacity.filter(|o| o.is_finite()) {
            base.opacity = opacity.clamp(0.0, 1.0);
        }
        if let Some(locked) = self.locked {
            base.locked = locked;
        }
        if let Some(visible) = self.visible {
            base.visible = visible;
        }
    }
}

/// Variant-specific overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum KindPatch {
    Text(TextPatch),
    Image(ImagePatch),
    Shape(ShapePatch),
}

impl KindPatch {
    pub fn name(&self) -> &'static str {
        match self {
            KindPatch::Text(_) => "text",
            KindPatch::Image(_) => "image",
            KindPatch::Shape(_) => "shape",
        }
    }
}

/// A partial update for a [`SceneObject`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectPatch {
    #[serde(default)]
    pub base: BasePatch,
    #[serde(default)]
    pub kind: Option<KindPatch>,
}

impl ObjectPatch {
    pub fn base(base: BasePatch) -> Self {
        Self { base, kind: None }
    }

    pub fn position(x: f64, y: f64) -> Self {
        Self::base(BasePatch::position(x, y))
    }

    pub fn text(patch: TextPatch) -> Self {
        Self {
            base: BasePatch::default(),
            kind: Some(KindPatch::Text(patch)),
        }
    }

    pub fn image(patch: ImagePatch) -> Self {
        Self {
            base: BasePatch::default(),
            kind: Some(KindPatch::Image(patch)),
        }
    }

    pub fn shape(patch: ShapePatch) -> Self {
        Self {
            base: BasePatch::default(),
            kind: Some(KindPatch::Shape(patch)),
        }
    }

    /// Replace the shared-field part of this patch.
    pub fn with_base(mut self, base: BasePatch) -> Self {
        self.base = base;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area() -> Rect {
        Rect::new(100.0, 100.0, 400.0, 500.0)
    }

    #[test]
    fn test_text_defaults() {
        let obj = SceneObject::text(area());
        let text = obj.as_text().unwrap();
        assert_eq!(text.text, "Your text");
        assert!((text.font_size - 48.0).abs() < f64::EPSILON);
        assert_eq!(text.fill, SerializableColor::black());
        assert_eq!(text.align, TextAlign::Center);
        // 300x400 area, 200x60 box
        assert!((obj.base.x - 150.0).abs() < f64::EPSILON);
        assert!((obj.base.y - 270.0).abs() < f64::EPSILON);
        assert_eq!(obj.base.z_index, 1);
    }

    #[test]
    fn test_shape_defaults() {
        let obj = SceneObject::shape(area(), ShapeKind::Circle);
        let shape = obj.as_shape().unwrap();
        assert_eq!(shape.shape, ShapeKind::Circle);
        assert!((shape.stroke_width - 2.0).abs() < f64::EPSILON);
        assert!(shape.fill.a < 255);
        assert_eq!(obj.base.width, Some(300.0));
        assert_eq!(obj.base.height, Some(150.0));
        assert!((obj.base.x - 100.0).abs() < f64::EPSILON);
        assert!((obj.base.y - 225.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_image_downscaled_to_fit() {
        // 80% of 300x400 is 240x320
        let obj = SceneObject::image(area(), "logo.png", ImageDimensions::new(1200, 600), 0.8);
        assert!((obj.base.width.unwrap() - 240.0).abs() < 1e-9);
        assert!((obj.base.height.unwrap() - 120.0).abs() < 1e-9);
        let image = obj.as_image().unwrap();
        assert_eq!(image.natural_width, 1200);
        assert_eq!(image.natural_height, 600);
    }

    #[test]
    fn test_small_image_keeps_natural_size() {
        let obj = SceneObject::image(area(), "logo.png", ImageDimensions::new(100, 50), 0.8);
        assert_eq!(obj.base.width, Some(100.0));
        assert_eq!(obj.base.height, Some(50.0));
    }

    #[test]
    fn test_image_in_empty_area_keeps_natural_size() {
        let obj = SceneObject::image(Rect::ZERO, "logo.png", ImageDimensions::new(400, 200), 0.8);
        assert_eq!(obj.base.width, Some(400.0));
        assert_eq!(obj.base.height, Some(200.0));
    }

    #[test]
    fn test_bounds_with_scale_and_rotation() {
        let mut base = ObjectBase::new(10.0, 20.0, 50.0, 30.0);
        base.scale_x = 2.0;
        let bounds = base.bounds();
        assert!((bounds.x1 - 110.0).abs() < 1e-9);
        assert!((bounds.y1 - 50.0).abs() < 1e-9);

        base.scale_x = 1.0;
        base.rotation = 90.0;
        let bounds = base.bounds();
        // Rotated clockwise about the origin: box now extends to the left
        assert!((bounds.x0 - -20.0).abs() < 1e-9);
        assert!((bounds.x1 - 10.0).abs() < 1e-9);
        assert!((bounds.y1 - 70.0).abs() < 1e-9);
    }

    #[test]
    fn test_patch_same_variant() {
        let mut obj = SceneObject::text(area());
        let patch = ObjectPatch::text(TextPatch {
            text: Some("Hello".to_string()),
            ..TextPatch::default()
        })
        .with_base(BasePatch::position(5.0, 6.0));

        assert!(obj.apply_patch(&patch));
        assert_eq!(obj.as_text().unwrap().text, "Hello");
        assert!((obj.base.x - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_patch_cross_variant_rejected() {
        let mut obj = SceneObject::shape(area(), ShapeKind::Rectangle);
        let before = obj.clone();
        let patch = ObjectPatch::text(TextPatch {
            text: Some("nope".to_string()),
            ..TextPatch::default()
        })
        .with_base(BasePatch::position(0.0, 0.0));

        assert!(!obj.apply_patch(&patch));
        assert_eq!(obj, before);
    }

    #[test]
    fn test_opacity_is_clamped() {
        let mut obj = SceneObject::text(area());
        let patch = ObjectPatch::base(BasePatch {
            opacity: Some(3.0),
            ..BasePatch::default()
        });
        assert!(obj.apply_patch(&patch));
        assert!((obj.base.opacity - 1.0).abs() < f64::EPSILON);

        let half = ObjectPatch::base(BasePatch {
            opacity: Some(0.5),
            ..BasePatch::default()
        });
        assert!(obj.apply_patch(&half));
        let nan = ObjectPatch::base(BasePatch {
            opacity: Some(f64::NAN),
            ..BasePatch::default()
        });
        assert!(obj.apply_patch(&nan));
        assert!((obj.base.opacity - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_color_converts_through_peniko() {
        let fill = ShapeProps::default_fill();
        let color: Color = fill.into();
        assert_eq!(SerializableColor::from(color), fill);
    }

    #[test]
    fn test_serialized_type_tag() {
        let obj = SceneObject::shape(area(), ShapeKind::Triangle);
        let json = serde_json::to_value(&obj).unwrap();
        assert_eq!(json["type"], "shape");
        assert_eq!(json["shape"], "triangle");
        assert_eq!(json["zIndex"], 1);

        let back: SceneObject = serde_json::from_value(json).unwrap();
        assert_eq!(back, obj);
    }
}
