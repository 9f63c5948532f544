//! Scene, print area, and the product data a scene is built from.

use crate::objects::{ObjectId, SceneObject};
use kurbo::Rect;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Name of a product view ("front", "back", "sleeve", ...).
pub type ViewId = String;

/// Name of a product color variant.
pub type ColorId = String;

/// Rectangle where design objects may legally sit for a view.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PrintArea {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PrintArea {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn as_rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    /// True when the area has no usable extent.
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

impl From<Rect> for PrintArea {
    fn from(rect: Rect) -> Self {
        let rect = rect.abs();
        Self::new(rect.x0, rect.y0, rect.width(), rect.height())
    }
}

/// Mockup image and print area for one view of one color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductAsset {
    pub view: ViewId,
    pub image_src: String,
    pub print_area: PrintArea,
}

/// Product description handed over by the catalog when the editor opens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductData {
    pub product_id: String,
    #[serde(default)]
    pub product_name: String,
    /// Color the editor starts with.
    pub color: ColorId,
    #[serde(default)]
    pub size_range: String,
    #[serde(default)]
    pub technology: String,
    pub assets_by_color: HashMap<ColorId, Vec<ProductAsset>>,
    /// View the editor starts with.
    pub initial_view: ViewId,
}

impl ProductData {
    /// Find the asset for a (color, view) pair.
    pub fn asset(&self, color: &str, view: &str) -> Option<&ProductAsset> {
        self.assets_by_color
            .get(color)
            .and_then(|assets| assets.iter().find(|asset| asset.view == view))
    }

    /// Views available for a color, in catalog order.
    pub fn views(&self, color: &str) -> Vec<&str> {
        self.assets_by_color
            .get(color)
            .map(|assets| assets.iter().map(|asset| asset.view.as_str()).collect())
            .unwrap_or_default()
    }
}

/// Complete editable state of one print view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    pub view: ViewId,
    pub color: ColorId,
    /// Objects back to front.
    #[serde(default)]
    pub objects: Vec<SceneObject>,
    #[serde(default)]
    pub print_area: PrintArea,
    /// Mockup image for the current view and color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
}

impl Scene {
    /// Create an empty scene with no print area.
    pub fn new(view: impl Into<ViewId>, color: impl Into<ColorId>) -> Self {
        Self {
            view: view.into(),
            color: color.into(),
            objects: Vec::new(),
            print_area: PrintArea::default(),
            background: None,
        }
    }

    /// Create an empty scene from a product asset.
    pub fn from_asset(color: impl Into<ColorId>, asset: &ProductAsset) -> Self {
        let mut scene = Self::new(asset.view.clone(), color);
        scene.apply_asset(asset);
        scene
    }

    /// Take background and print area from `asset`.
    pub fn apply_asset(&mut self, asset: &ProductAsset) {
        self.print_area = asset.print_area;
        self.background = Some(asset.image_src.clone());
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn object(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.iter().find(|obj| obj.id() == id)
    }

    pub fn index_of(&self, id: ObjectId) -> Option<usize> {
        self.objects.iter().position(|obj| obj.id() == id)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn ids(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.objects.iter().map(SceneObject::id)
    }

    /// Set every stacking index to its 1-based array position.
    pub(crate) fn normalize_stacking(&mut self) {
        for (index, obj) in self.objects.iter_mut().enumerate() {
            obj.base.z_index = index as u32 + 1;
        }
    }

    /// Check that no two objects share an id.
    pub fn has_unique_ids(&self) -> bool {
        let mut seen = HashSet::with_capacity(self.objects.len());
        self.objects.iter().all(|obj| seen.insert(obj.id()))
    }

    /// Visible objects whose bounds overlap `rect`, back to front.
    pub fn objects_in_rect(&self, rect: Rect) -> Vec<ObjectId> {
        self.objects
            .iter()
            .filter(|obj| obj.is_visible())
            .filter(|obj| overlaps(rect, obj.bounds()))
            .map(SceneObject::id)
            .collect()
    }

    /// Topmost visible object containing `point`.
    pub fn object_at_point(&self, point: kurbo::Point) -> Option<ObjectId> {
        self.objects
            .iter()
            .rev()
            .filter(|obj| obj.is_visible())
            .find(|obj| obj.bounds().contains(point))
            .map(SceneObject::id)
    }
}

/// Inclusive overlap test, so zero-width boxes (lines) can still be hit.
fn overlaps(a: Rect, b: Rect) -> bool {
    a.x0 <= b.x1 && b.x0 <= a.x1 && a.y0 <= b.y1 && b.y0 <= a.y1
}
