//! Selection and transform coordination between a renderer and the store.
//!
//! The renderer owns its drawing nodes; this module only keeps a non-owning
//! map from object ids to opaque handles so a host can attach transform
//! gizmos to the selected nodes. All state changes go through the
//! [`SceneStore`] passed into [`SelectionCoordinator::handle_event`].

use crate::config::MARQUEE_MIN_SIZE;
use crate::objects::{BasePatch, ObjectId, ObjectPatch};
use crate::render::{RendererEvent, Transform};
use crate::store::SceneStore;
use kurbo::{Point, Rect};
use std::collections::{HashMap, HashSet};

/// Map from object id to a renderer handle.
#[derive(Debug, Clone)]
pub struct HandleRegistry<H> {
    handles: HashMap<ObjectId, H>,
}

impl<H> Default for HandleRegistry<H> {
    fn default() -> Self {
        Self {
            handles: HashMap::new(),
        }
    }
}

impl<H: Clone> HandleRegistry<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handle, replacing any previous one for `id`.
    pub fn register(&mut self, id: ObjectId, handle: H) {
        self.handles.insert(id, handle);
    }

    pub fn unregister(&mut self, id: ObjectId) -> Option<H> {
        self.handles.remove(&id)
    }

    pub fn get(&self, id: ObjectId) -> Option<&H> {
        self.handles.get(&id)
    }

    /// Handles for the given ids. Ids without a registered handle are skipped.
    pub fn resolve<'a>(&self, ids: impl IntoIterator<Item = &'a ObjectId>) -> Vec<H> {
        ids.into_iter()
            .filter_map(|id| self.handles.get(id).cloned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

/// In-progress marquee drag.
#[derive(Debug, Clone, Copy)]
struct Marquee {
    anchor: Point,
    current: Point,
}

impl Marquee {
    fn rect(&self) -> Rect {
        Rect::from_points(self.anchor, self.current)
    }
}

/// Turns renderer events into store operations.
#[derive(Debug, Clone)]
pub struct SelectionCoordinator<H> {
    registry: HandleRegistry<H>,
    marquee: Option<Marquee>,
    min_marquee: f64,
}

impl<H: Clone> Default for SelectionCoordinator<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: Clone> SelectionCoordinator<H> {
    pub fn new() -> Self {
        Self::with_min_marquee(MARQUEE_MIN_SIZE)
    }

    /// Coordinator using the marquee threshold from the store's config.
    pub fn for_store(store: &SceneStore) -> Self {
        Self::with_min_marquee(store.config().marquee_min_size)
    }

    pub fn with_min_marquee(min_marquee: f64) -> Self {
        Self {
            registry: HandleRegistry::default(),
            marquee: None,
            min_marquee,
        }
    }

    pub fn registry(&self) -> &HandleRegistry<H> {
        &self.registry
    }

    /// Live marquee rectangle, normalized so its origin is the top-left corner.
    pub fn marquee_rect(&self) -> Option<Rect> {
        self.marquee.map(|m| m.rect())
    }

    /// Handles of the currently selected objects, for attaching a transformer.
    pub fn selected_handles(&self, store: &SceneStore) -> Vec<H> {
        self.registry.resolve(&store.selected_ids())
    }

    /// Apply one renderer event. Returns true if the store or marquee changed.
    pub fn handle_event(&mut self, store: &mut SceneStore, event: RendererEvent<H>) -> bool {
        match event {
            RendererEvent::ObjectSelected { id, additive } => {
                if store.object(id).is_none() {
                    return false;
                }
                if additive {
                    store.toggle_selection(id);
                } else {
                    store.select(id);
                }
                true
            }
            RendererEvent::ObjectDragEnded { id, position } => {
                let patch = ObjectPatch::position(position.x, position.y);
                self.manipulate(store, id, &patch)
            }
            RendererEvent::ObjectTransformEnded { id, transform } => {
                let patch = ObjectPatch::base(transform_patch(&transform));
                self.manipulate(store, id, &patch)
            }
            RendererEvent::HandleRegistered { id, handle } => {
                self.registry.register(id, handle);
                false
            }
            RendererEvent::HandleUnregistered { id } => {
                self.registry.unregister(id);
                false
            }
            RendererEvent::CanvasPointerDown { point } => {
                self.marquee = Some(Marquee {
                    anchor: point,
                    current: point,
                });
                true
            }
            RendererEvent::CanvasPointerMove { point } => match self.marquee.as_mut() {
                Some(marquee) => {
                    marquee.current = point;
                    true
                }
                None => false,
            },
            RendererEvent::CanvasPointerUp { point } => {
                let Some(mut marquee) = self.marquee.take() else {
                    return false;
                };
                marquee.current = point;
                self.finish_marquee(store, marquee.rect());
                true
            }
        }
    }

    fn manipulate(&self, store: &mut SceneStore, id: ObjectId, patch: &ObjectPatch) -> bool {
        match store.object(id) {
            Some(obj) if obj.is_locked() => {
                log::debug!("Ignoring manipulation of locked object {}", id);
                false
            }
            Some(_) => store.apply_manipulation(id, patch),
            None => false,
        }
    }

    fn finish_marquee(&self, store: &mut SceneStore, rect: Rect) {
        if rect.width() < self.min_marquee || rect.height() < self.min_marquee {
            store.clear_selection();
            return;
        }
        let hits: HashSet<ObjectId> = store.scene().objects_in_rect(rect).into_iter().collect();
        log::debug!("Marquee selected {} object(s)", hits.len());
        store.set_selection(hits);
    }
}

/// Final box from a transform gesture. Scale is baked into the size.
fn transform_patch(transform: &Transform) -> BasePatch {
    BasePatch {
        x: Some(transform.x),
        y: Some(transform.y),
        width: Some(transform.width.max(0.0)),
        height: Some(transform.height.max(0.0)),
        rotation: Some(transform.rotation),
        scale_x: Some(1.0),
        scale_y: Some(1.0),
        ..BasePatch::default()
    }
}
