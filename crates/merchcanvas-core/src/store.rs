//! Scene store: the single owner of design state.
//!
//! Holds the active scene, the cache of scenes for other views, the selection
//! and per-scene undo history. Every mutation builds a new [`Scene`] and swaps
//! the `Arc` in one step, so the previous value can be kept as a history
//! snapshot without copying.

use crate::config::{EditorConfig, SceneKeying, StackingPolicy};
use crate::constraint;
use crate::error::{SceneError, SceneResult};
use crate::history::History;
use crate::loader::{ImageLoader, PendingImage};
use crate::objects::{
    BasePatch, ImageDimensions, KindPatch, ObjectId, ObjectPatch, SceneObject, ShapeKind,
    ShapePatch, TextPatch,
};
use crate::render::ReadModel;
use crate::scene::{ColorId, ProductData, Scene, ViewId};
use kurbo::Vec2;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Offset applied to duplicated objects so the copy is visible.
const DUPLICATE_OFFSET: f64 = 10.0;

/// Direction for [`SceneStore::reorder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReorderDirection {
    /// One step towards the front.
    Forward,
    /// One step towards the back.
    Backward,
    /// Topmost.
    Front,
    /// Bottommost.
    Back,
}

/// Cache key for a scene. `color` is only set when scenes are kept per color.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct SceneKey {
    pub(crate) view: ViewId,
    pub(crate) color: Option<ColorId>,
}

/// A parked scene together with its own undo history.
#[derive(Debug, Clone)]
pub(crate) struct CachedScene {
    pub(crate) scene: Arc<Scene>,
    pub(crate) history: History,
}

/// Owner of the current scene, scene cache, selection and history.
#[derive(Debug, Clone)]
pub struct SceneStore {
    pub(crate) config: EditorConfig,
    pub(crate) product: Option<ProductData>,
    pub(crate) scene: Arc<Scene>,
    pub(crate) history: History,
    pub(crate) cache: HashMap<SceneKey, CachedScene>,
    pub(crate) selection: HashSet<ObjectId>,
    /// Bumped whenever the whole session is replaced; stale image loads compare against it.
    pub(crate) epoch: u64,
}

impl Default for SceneStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneStore {
    /// Create a store with an empty scene for the default view.
    pub fn new() -> Self {
        Self::with_config(EditorConfig::default())
    }

    pub fn with_config(config: EditorConfig) -> Self {
        let scene = Scene::new(config.default_view.clone(), ColorId::new());
        let history = History::new(config.max_history);
        Self {
            config,
            product: None,
            scene: Arc::new(scene),
            history,
            cache: HashMap::new(),
            selection: HashSet::new(),
            epoch: 0,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn product(&self) -> Option<&ProductData> {
        self.product.as_ref()
    }

    /// The active scene.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// The active scene as a shared snapshot.
    pub fn scene_arc(&self) -> Arc<Scene> {
        self.scene.clone()
    }

    pub fn current_view(&self) -> &str {
        &self.scene.view
    }

    pub fn current_color(&self) -> &str {
        &self.scene.color
    }

    pub fn object(&self, id: ObjectId) -> Option<&SceneObject> {
        self.scene.object(id)
    }

    /// Borrowed state for painting.
    pub fn read_model(&self) -> ReadModel<'_> {
        ReadModel {
            objects: &self.scene.objects,
            selection: &self.selection,
            print_area: self.scene.print_area,
            background: self.scene.background.as_deref(),
            marquee: None,
        }
    }

    // --- Product and view switching ---

    /// Build the first scene from the product's initial color and view.
    ///
    /// Replaces the whole session: cache, history and selection are reset.
    /// Fails without touching any state if the product has no asset for its
    /// starting (color, view).
    pub fn init_from_product(&mut self, product: ProductData) -> SceneResult<()> {
        let Some(asset) = product.asset(&product.color, &product.initial_view) else {
            let err = SceneError::AssetNotFound {
                color: product.color.clone(),
                view: product.initial_view.clone(),
            };
            log::error!("Cannot start editor for product {}: {}", product.product_id, err);
            return Err(err);
        };

        self.scene = Arc::new(Scene::from_asset(product.color.clone(), asset));
        self.cache.clear();
        self.history.clear();
        self.selection.clear();
        self.epoch += 1;
        log::info!(
            "Editor started for product {} ({} / {})",
            product.product_id,
            product.color,
            product.initial_view
        );
        self.product = Some(product);
        Ok(())
    }

    /// Switch to another view, keeping the current one in the cache.
    pub fn set_view(&mut self, view: impl Into<ViewId>) {
        let view = view.into();
        let color = self.scene.color.clone();
        self.switch_to(view, color);
    }

    /// Switch to another product color.
    ///
    /// With [`SceneKeying::PerView`] the current view keeps its objects and only
    /// the background and print area change.
    pub fn set_color(&mut self, color: impl Into<ColorId>) {
        let color = color.into();
        let view = self.scene.view.clone();
        self.switch_to(view, color);
    }

    pub(crate) fn key_for(&self, view: &str, color: &str) -> SceneKey {
        SceneKey {
            view: view.to_string(),
            color: match self.config.scene_keying {
                SceneKeying::PerView => None,
                SceneKeying::PerViewAndColor => Some(color.to_string()),
            },
        }
    }

    fn switch_to(&mut self, view: ViewId, color: ColorId) {
        self.selection.clear();
        if view == self.scene.view && color == self.scene.color {
            return;
        }

        let current_key = self.key_for(&self.scene.view, &self.scene.color);
        let target_key = self.key_for(&view, &color);

        let (mut next, history) = if current_key == target_key {
            ((*self.scene).clone(), std::mem::take(&mut self.history))
        } else {
            let parked = CachedScene {
                scene: self.scene.clone(),
                history: std::mem::take(&mut self.history),
            };
            self.cache.insert(current_key, parked);
            match self.cache.remove(&target_key) {
                Some(cached) => ((*cached.scene).clone(), cached.history),
                None => {
                    // New scenes start from the previous mockup until an asset says otherwise
                    let mut scene = Scene::new(view.clone(), color.clone());
                    scene.print_area = self.scene.print_area;
                    scene.background = self.scene.background.clone();
                    (scene, History::new(self.config.max_history))
                }
            }
        };

        next.view = view;
        next.color = color;
        match self
            .product
            .as_ref()
            .and_then(|product| product.asset(&next.color, &next.view))
        {
            Some(asset) => next.apply_asset(asset),
            None => log::warn!(
                "{}; keeping previous background and print area",
                SceneError::AssetNotFound {
                    color: next.color.clone(),
                    view: next.view.clone(),
                }
            ),
        }

        log::debug!("Switched to view '{}' color '{}'", next.view, next.color);
        self.scene = Arc::new(next);
        self.history = history;
    }

    /// The most recent scene for `view` (the active one if it is current).
    ///
    /// With per-color keying the lookup uses the current color.
    pub fn cached_scene(&self, view: &str) -> Option<&Scene> {
        if self.scene.view == view {
            return Some(self.scene.as_ref());
        }
        let key = self.key_for(view, &self.scene.color);
        self.cache.get(&key).map(|cached| cached.scene.as_ref())
    }

    /// Views that have a scene, current one included.
    pub fn scene_views(&self) -> Vec<&str> {
        let mut views: Vec<&str> = self
            .cache
            .keys()
            .map(|key| key.view.as_str())
            .chain(std::iter::once(self.scene.view.as_str()))
            .collect();
        views.sort_unstable();
        views.dedup();
        views
    }

    // --- Mutations ---

    /// Replace the current scene, recording the old one for undo.
    fn commit(&mut self, next: Scene) {
        let previous = std::mem::replace(&mut self.scene, Arc::new(next));
        self.history.record(previous);
    }

    fn insert_object(&mut self, mut obj: SceneObject) -> ObjectId {
        let id = obj.id();
        if self.config.stacking == StackingPolicy::Top {
            obj.base.z_index = self.scene.len() as u32 + 1;
        }
        let mut next = (*self.scene).clone();
        next.objects.push(obj);
        self.commit(next);
        self.selection = HashSet::from([id]);
        log::debug!("Added object {}", id);
        id
    }

    /// Add a text object with defaults merged with the given overrides.
    pub fn add_text(&mut self, base: BasePatch, text: TextPatch) -> ObjectId {
        let mut obj = SceneObject::text(self.scene.print_area.as_rect());
        obj.apply_patch(&ObjectPatch {
            base,
            kind: Some(KindPatch::Text(text)),
        });
        self.insert_object(obj)
    }

    /// Add a shape object with defaults merged with the given overrides.
    pub fn add_shape(&mut self, kind: ShapeKind, base: BasePatch, shape: ShapePatch) -> ObjectId {
        let mut obj = SceneObject::shape(self.scene.print_area.as_rect(), kind);
        obj.apply_patch(&ObjectPatch {
            base,
            kind: Some(KindPatch::Shape(shape)),
        });
        self.insert_object(obj)
    }

    /// Load an image and add it once its dimensions are known.
    ///
    /// A load failure leaves the scene unchanged. The store stays borrowed for
    /// the whole load; use [`begin_image`](Self::begin_image) and
    /// [`commit_image`](Self::commit_image) to keep editing while it runs.
    pub async fn add_image<L: ImageLoader + ?Sized>(
        &mut self,
        loader: &L,
        src: &str,
        base: BasePatch,
    ) -> SceneResult<ObjectId> {
        let pending = self.begin_image(src);
        let dims = match loader.load(src).await {
            Ok(dims) => dims,
            Err(e) => {
                log::warn!("Image {} not added: {}", src, e);
                return Err(e);
            }
        };
        self.commit_image(pending, dims, base)
    }

    /// Start an image load for the current scene.
    pub fn begin_image(&self, src: &str) -> PendingImage {
        PendingImage {
            src: src.to_string(),
            view: self.scene.view.clone(),
            color: self.scene.color.clone(),
            epoch: self.epoch,
        }
    }

    /// Finish an image load started with [`begin_image`](Self::begin_image).
    ///
    /// Results for a scene that is no longer active are discarded.
    pub fn commit_image(
        &mut self,
        pending: PendingImage,
        dims: ImageDimensions,
        base: BasePatch,
    ) -> SceneResult<ObjectId> {
        let same_scene = self.key_for(&pending.view, &pending.color)
            == self.key_for(&self.scene.view, &self.scene.color);
        if pending.epoch != self.epoch || !same_scene {
            log::info!("Discarding late image {} for view '{}'", pending.src, pending.view);
            return Err(SceneError::StaleImage { view: pending.view });
        }

        let mut obj = SceneObject::image(
            self.scene.print_area.as_rect(),
            pending.src,
            dims,
            self.config.image_fit_ratio,
        );
        obj.apply_patch(&ObjectPatch::base(base));
        Ok(self.insert_object(obj))
    }

    /// Merge `patch` into the object with `id`.
    ///
    /// Unknown ids and patches for another variant are no-ops.
    pub fn update_object(&mut self, id: ObjectId, patch: &ObjectPatch) -> bool {
        let Some(index) = self.scene.index_of(id) else {
            log::debug!("update_object: unknown id {}", id);
            return false;
        };
        let mut next = (*self.scene).clone();
        if !next.objects[index].apply_patch(patch) {
            return false;
        }
        self.commit(next);
        true
    }

    /// Delete an object and drop it from the selection. Idempotent.
    pub fn remove_object(&mut self, id: ObjectId) -> bool {
        let Some(index) = self.scene.index_of(id) else {
            return false;
        };
        let mut next = (*self.scene).clone();
        next.objects.remove(index);
        self.commit(next);
        self.selection.remove(&id);
        true
    }

    /// Delete every selected object as one undo step.
    pub fn delete_selected(&mut self) -> usize {
        if self.selection.is_empty() {
            return 0;
        }
        let mut next = (*self.scene).clone();
        let before = next.len();
        next.objects.retain(|obj| !self.selection.contains(&obj.id()));
        let removed = before - next.len();
        self.selection.clear();
        if removed > 0 {
            self.commit(next);
        }
        removed
    }

    /// Copy an object (new id, slightly offset) and select the copy.
    pub fn duplicate_object(&mut self, id: ObjectId) -> Option<ObjectId> {
        let mut copy = self.scene.object(id)?.clone();
        copy.regenerate_id();
        copy.translate(Vec2::new(DUPLICATE_OFFSET, DUPLICATE_OFFSET));
        Some(self.insert_object(copy))
    }

    /// Move an object in the stacking order and renumber every stacking index.
    pub fn reorder(&mut self, id: ObjectId, direction: ReorderDirection) -> bool {
        let Some(index) = self.scene.index_of(id) else {
            return false;
        };
        let last = self.scene.len() - 1;
        let target = match direction {
            ReorderDirection::Forward => (index + 1).min(last),
            ReorderDirection::Backward => index.saturating_sub(1),
            ReorderDirection::Front => last,
            ReorderDirection::Back => 0,
        };

        let mut next = (*self.scene).clone();
        let obj = next.objects.remove(index);
        next.objects.insert(target, obj);
        next.normalize_stacking();
        self.commit(next);
        true
    }

    /// Shift an object back inside the print area. Only records history if it moved.
    pub fn clamp_to_print_area(&mut self, id: ObjectId) -> bool {
        let Some(index) = self.scene.index_of(id) else {
            return false;
        };
        let mut next = (*self.scene).clone();
        let area = next.print_area;
        if !constraint::clamp_object(&mut next.objects[index], &area) {
            return false;
        }
        log::debug!("Clamped object {} into print area", id);
        self.commit(next);
        true
    }

    /// Commit the end of a drag or transform: merge `patch`, then clamp, as one undo step.
    pub fn apply_manipulation(&mut self, id: ObjectId, patch: &ObjectPatch) -> bool {
        let Some(index) = self.scene.index_of(id) else {
            return false;
        };
        let mut next = (*self.scene).clone();
        if !next.objects[index].apply_patch(patch) {
            return false;
        }
        let area = next.print_area;
        constraint::clamp_object(&mut next.objects[index], &area);
        self.commit(next);
        true
    }

    // --- Selection ---

    pub fn selection(&self) -> &HashSet<ObjectId> {
        &self.selection
    }

    /// Selected ids in stacking order (back to front).
    pub fn selected_ids(&self) -> Vec<ObjectId> {
        self.scene
            .ids()
            .filter(|id| self.selection.contains(id))
            .collect()
    }

    pub fn is_selected(&self, id: ObjectId) -> bool {
        self.selection.contains(&id)
    }

    /// Replace the selection. Ids not in the active scene are dropped.
    pub fn set_selection(&mut self, ids: impl IntoIterator<Item = ObjectId>) {
        self.selection = ids
            .into_iter()
            .filter(|id| self.scene.contains(*id))
            .collect();
    }

    /// Select a single object (clears previous selection).
    pub fn select(&mut self, id: ObjectId) {
        self.set_selection([id]);
    }

    /// Add to selection. Returns false if already selected or unknown.
    pub fn add_to_selection(&mut self, id: ObjectId) -> bool {
        if !self.scene.contains(id) {
            return false;
        }
        self.selection.insert(id)
    }

    pub fn remove_from_selection(&mut self, id: ObjectId) -> bool {
        self.selection.remove(&id)
    }

    /// Flip membership of `id` in the selection.
    pub fn toggle_selection(&mut self, id: ObjectId) {
        if !self.remove_from_selection(id) {
            self.add_to_selection(id);
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Select all objects.
    pub fn select_all(&mut self) {
        self.selection = self.scene.ids().collect();
    }

    // --- History ---

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Undo the last change.
    /// Returns true if undo was performed, false if nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.history.undo(self.scene.clone()) else {
            return false;
        };
        self.scene = self.rebase(previous);
        self.selection.clear();
        true
    }

    /// Redo the last undone change.
    /// Returns true if redo was performed, false if nothing to redo.
    pub fn redo(&mut self) -> bool {
        let Some(next) = self.history.redo(self.scene.clone()) else {
            return false;
        };
        self.scene = self.rebase(next);
        self.selection.clear();
        true
    }

    /// Keep the active color and mockup when restoring a snapshot taken under another color.
    fn rebase(&self, snapshot: Arc<Scene>) -> Arc<Scene> {
        let current = &self.scene;
        if snapshot.color == current.color
            && snapshot.print_area == current.print_area
            && snapshot.background == current.background
        {
            return snapshot;
        }
        let mut scene = (*snapshot).clone();
        scene.color = current.color.clone();
        scene.print_area = current.print_area;
        scene.background = current.background.clone();
        Arc::new(scene)
    }
}
