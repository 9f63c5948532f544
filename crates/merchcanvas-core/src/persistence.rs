//! JSON persistence of the full design state.
//!
//! A saved design holds every scene the session has touched, the active
//! color and the active view. Product data is not saved; load a design into
//! a store that was started with [`SceneStore::init_from_product`] so view
//! switches keep finding their mockups.

use crate::config::DEFAULT_VIEW;
use crate::error::{SceneError, SceneResult};
use crate::history::History;
use crate::scene::{ColorId, Scene, ViewId};
use crate::storage::{DesignSummary, Storage};
use crate::store::{CachedScene, SceneKey, SceneStore};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use web_time::SystemTime;

/// Current persisted format version. Version 1 kept `scenes` as a map.
pub const FORMAT_VERSION: u32 = 2;

/// Serialized design state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedDesign {
    /// Format version; 0 for saves that predate versioning.
    #[serde(default)]
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    pub color: ColorId,
    /// Active view. Absent in older saves.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view: Option<ViewId>,
    /// Every scene, the active one first. Each scene carries its own view and color.
    #[serde(deserialize_with = "scenes_from_list_or_map")]
    pub scenes: Vec<Scene>,
    /// Milliseconds since the Unix epoch.
    #[serde(default)]
    pub timestamp: u64,
}

impl PersistedDesign {
    /// Listing row for this design stored under `id`.
    pub fn summary(&self, id: &str) -> DesignSummary {
        DesignSummary {
            id: id.to_string(),
            product_id: self.product_id.clone(),
            view: self.view.clone(),
            version: self.version,
            timestamp: self.timestamp,
        }
    }
}

/// Scenes as written now, or the keyed map older saves used.
#[derive(Deserialize)]
#[serde(untagged)]
enum SceneList {
    List(Vec<Scene>),
    Map(BTreeMap<String, Scene>),
}

fn scenes_from_list_or_map<'de, D>(deserializer: D) -> Result<Vec<Scene>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match SceneList::deserialize(deserializer)? {
        SceneList::List(scenes) => scenes,
        SceneList::Map(scenes) => scenes.into_values().collect(),
    })
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

/// Scenes and active key of a payload that passed validation.
struct ValidDesign {
    scenes: HashMap<SceneKey, Scene>,
    active: SceneKey,
}

impl SceneStore {
    /// Snapshot of the current session in persisted form.
    pub fn persisted(&self) -> PersistedDesign {
        let mut cached: Vec<(&SceneKey, &CachedScene)> = self.cache.iter().collect();
        cached.sort_by(|a, b| a.0.cmp(b.0));
        let scenes = std::iter::once((*self.scene).clone())
            .chain(cached.into_iter().map(|(_, c)| (*c.scene).clone()))
            .collect();

        PersistedDesign {
            version: FORMAT_VERSION,
            product_id: self.product.as_ref().map(|p| p.product_id.clone()),
            color: self.scene.color.clone(),
            view: Some(self.scene.view.clone()),
            scenes,
            timestamp: now_millis(),
        }
    }

    /// Serialize the design state to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.persisted())
    }

    /// Replace the design state from JSON.
    ///
    /// The payload is fully validated first; on any error the store is left
    /// exactly as it was. On success history and selection are cleared and
    /// pending image loads become stale.
    pub fn from_json(&mut self, json: &str) -> SceneResult<()> {
        let design: PersistedDesign = match serde_json::from_str(json) {
            Ok(design) => design,
            Err(e) => {
                log::warn!("Discarding unreadable design: {}", e);
                return Err(SceneError::MalformedState(e.to_string()));
            }
        };
        self.restore(design)
    }

    /// Replace the design state from an already parsed payload.
    pub fn restore(&mut self, design: PersistedDesign) -> SceneResult<()> {
        let valid = match self.validate(design) {
            Ok(valid) => valid,
            Err(reason) => {
                log::warn!("Discarding malformed design: {}", reason);
                return Err(SceneError::MalformedState(reason));
            }
        };

        let ValidDesign { mut scenes, active } = valid;
        let Some(scene) = scenes.remove(&active) else {
            return Err(SceneError::MalformedState("active scene missing".to_string()));
        };

        self.cache = scenes
            .into_iter()
            .map(|(key, scene)| {
                let cached = CachedScene {
                    scene: Arc::new(scene),
                    history: History::new(self.config.max_history),
                };
                (key, cached)
            })
            .collect();
        self.scene = Arc::new(scene);
        self.history.clear();
        self.selection.clear();
        self.epoch += 1;
        log::info!(
            "Loaded design: view '{}', color '{}', {} scene(s)",
            self.scene.view,
            self.scene.color,
            self.cache.len() + 1
        );
        Ok(())
    }

    fn validate(&self, design: PersistedDesign) -> Result<ValidDesign, String> {
        if design.version > FORMAT_VERSION {
            return Err(format!("unsupported format version {}", design.version));
        }
        if let (Some(saved), Some(product)) = (&design.product_id, &self.product) {
            if *saved != product.product_id {
                log::warn!(
                    "Design was saved for product {} but {} is loaded",
                    saved,
                    product.product_id
                );
            }
        }

        let view = design
            .view
            .clone()
            .unwrap_or_else(|| self.legacy_view(&design));

        let mut scenes = HashMap::with_capacity(design.scenes.len());
        for scene in design.scenes {
            if scene.view.is_empty() {
                return Err(format!("scene with color '{}' has no view", scene.color));
            }
            if !scene.has_unique_ids() {
                return Err(format!(
                    "scene '{}' ({}) has duplicate object ids",
                    scene.view, scene.color
                ));
            }
            let key = self.key_for(&scene.view, &scene.color);
            if let Some(previous) = scenes.insert(key, scene) {
                return Err(format!(
                    "more than one scene for view '{}' ({})",
                    previous.view, previous.color
                ));
            }
        }

        let active = self.key_for(&view, &design.color);
        match scenes.get_mut(&active) {
            Some(scene) => scene.color = design.color,
            None => return Err(format!("no scene for active view '{}'", view)),
        }
        Ok(ValidDesign { scenes, active })
    }

    /// Pick the active view for saves made before it was stored.
    fn legacy_view(&self, design: &PersistedDesign) -> ViewId {
        design
            .scenes
            .iter()
            .find(|scene| scene.color == design.color)
            .map(|scene| scene.view.clone())
            .or_else(|| self.product.as_ref().map(|p| p.initial_view.clone()))
            .unwrap_or_else(|| DEFAULT_VIEW.to_string())
    }

    /// Write the design under `id`.
    pub async fn save_to<S: Storage + ?Sized>(&self, storage: &S, id: &str) -> SceneResult<()> {
        storage.save(id, &self.persisted()).await?;
        log::debug!("Saved design {}", id);
        Ok(())
    }

    /// Read the design stored under `id` and load it.
    pub async fn load_from<S: Storage + ?Sized>(&mut self, storage: &S, id: &str) -> SceneResult<()> {
        let design = storage.load(id).await?;
        self.restore(design)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EditorConfig, SceneKeying};
    use crate::objects::{BasePatch, ShapeKind, ShapePatch, TextPatch};
    use crate::storage::{MemoryStorage, StorageError};
    use crate::test_support::product;

    fn store() -> SceneStore {
        let mut store = SceneStore::new();
        store.init_from_product(product()).unwrap();
        store
    }

    #[test]
    fn test_round_trip_restores_views_and_color() {
        let mut original = store();
        let front = original.add_text(BasePatch::default(), TextPatch::default());
        original.set_view("back");
        let back = original.add_shape(ShapeKind::Circle, BasePatch::default(), ShapePatch::default());
        let json = original.to_json().unwrap();

        let mut loaded = store();
        loaded.from_json(&json).unwrap();

        assert_eq!(loaded.current_view(), "back");
        assert_eq!(loaded.current_color(), "black");
        assert_eq!(loaded.scene(), original.scene());
        assert!(loaded.object(back).is_some());
        assert!(loaded.cached_scene("front").unwrap().object(front).is_some());
        assert!(!loaded.can_undo());
        assert!(loaded.selection().is_empty());

        loaded.set_view("front");
        assert!(loaded.object(front).is_some());
    }

    #[test]
    fn test_serialized_shape() {
        let store = store();
        let json: serde_json::Value = serde_json::from_str(&store.to_json().unwrap()).unwrap();
        assert_eq!(json["version"], FORMAT_VERSION);
        assert_eq!(json["productId"], "tee-01");
        assert_eq!(json["view"], "front");
        assert_eq!(json["scenes"][0]["printArea"]["width"], 300.0);
        assert!(json["timestamp"].as_u64().unwrap() > 0);
    }

    #[test]
    fn test_malformed_json_leaves_store_unchanged() {
        let mut store = store();
        let id = store.add_text(BasePatch::default(), TextPatch::default());
        let before = store.scene().clone();

        let result = store.from_json("{ not json");
        assert!(matches!(result, Err(SceneError::MalformedState(_))));
        assert_eq!(*store.scene(), before);
        assert!(store.is_selected(id));
        assert!(store.can_undo());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let mut original = store();
        original.add_text(BasePatch::default(), TextPatch::default());
        let mut design = original.persisted();
        let scene = design.scenes.iter_mut().find(|s| s.view == "front").unwrap();
        let copy = scene.objects[0].clone();
        scene.objects.push(copy);
        let json = serde_json::to_string(&design).unwrap();

        let mut target = store();
        let result = target.from_json(&json);
        assert!(matches!(result, Err(SceneError::MalformedState(_))));
        assert!(target.scene().is_empty());
    }

    #[test]
    fn test_missing_active_scene_rejected() {
        let mut design = store().persisted();
        design.view = Some("sleeve".to_string());
        let mut target = store();
        assert!(matches!(target.restore(design), Err(SceneError::MalformedState(_))));
        assert_eq!(target.current_view(), "front");
    }

    #[test]
    fn test_legacy_payload_without_view() {
        let json = r#"{
            "color": "black",
            "scenes": {
                "back": {"view": "back", "color": "black", "objects": [],
                         "printArea": {"x": 120, "y": 80, "width": 260, "height": 420}}
            }
        }"#;
        let mut store = store();
        store.from_json(json).unwrap();
        assert_eq!(store.current_view(), "back");
    }

    #[test]
    fn test_legacy_falls_back_to_initial_view() {
        let json = r#"{
            "color": "white",
            "scenes": {
                "front": {"view": "front", "color": "black", "objects": []}
            }
        }"#;
        let mut store = store();
        store.from_json(json).unwrap();
        assert_eq!(store.current_view(), "front");
        assert_eq!(store.current_color(), "white");
    }

    #[test]
    fn test_future_version_rejected() {
        let mut design = store().persisted();
        design.version = FORMAT_VERSION + 1;
        let mut target = store();
        assert!(target.restore(design).is_err());
    }

    #[test]
    fn test_load_makes_pending_images_stale() {
        let mut store = store();
        let json = store.to_json().unwrap();
        let pending = store.begin_image("logo.png");
        store.from_json(&json).unwrap();

        let result = store.commit_image(
            pending,
            crate::objects::ImageDimensions::new(10, 10),
            BasePatch::default(),
        );
        assert!(matches!(result, Err(SceneError::StaleImage { .. })));
    }

    #[test]
    fn test_per_color_keys_round_trip() {
        let config = EditorConfig {
            scene_keying: SceneKeying::PerViewAndColor,
            ..EditorConfig::default()
        };
        let mut original = SceneStore::with_config(config.clone());
        original.init_from_product(product()).unwrap();
        original.add_text(BasePatch::default(), TextPatch::default());
        original.set_color("white");

        let design = original.persisted();
        let keys: Vec<(&str, &str)> = design
            .scenes
            .iter()
            .map(|s| (s.view.as_str(), s.color.as_str()))
            .collect();
        assert_eq!(keys, vec![("front", "white"), ("front", "black")]);

        let mut loaded = SceneStore::with_config(config);
        loaded.init_from_product(product()).unwrap();
        loaded.restore(design).unwrap();
        assert!(loaded.scene().is_empty());
        loaded.set_color("black");
        assert_eq!(loaded.scene().len(), 1);
    }

    #[test]
    fn test_save_and_load_through_storage() {
        let storage = MemoryStorage::new();
        let mut original = store();
        let id = original.add_text(BasePatch::default(), TextPatch::default());
        pollster::block_on(original.save_to(&storage, "design-1")).unwrap();

        let mut loaded = store();
        pollster::block_on(loaded.load_from(&storage, "design-1")).unwrap();
        assert!(loaded.object(id).is_some());

        let missing = pollster::block_on(loaded.load_from(&storage, "nope"));
        assert!(matches!(missing, Err(SceneError::Storage(StorageError::NotFound(_)))));
    }

    #[test]
    fn test_separator_in_names_keeps_scenes_apart() {
        let config = EditorConfig {
            scene_keying: SceneKeying::PerViewAndColor,
            ..EditorConfig::default()
        };
        let design = PersistedDesign {
            version: FORMAT_VERSION,
            product_id: None,
            color: "c".to_string(),
            view: Some("a/b".to_string()),
            scenes: vec![Scene::new("a/b", "c"), Scene::new("a", "b/c")],
            timestamp: 1,
        };
        let mut first = SceneStore::with_config(config.clone());
        first.restore(design).unwrap();
        assert_eq!(first.persisted().scenes.len(), 2);

        let mut second = SceneStore::with_config(config);
        second.from_json(&first.to_json().unwrap()).unwrap();
        let scenes = second.persisted().scenes;
        assert_eq!(scenes.len(), 2);
        assert_eq!((scenes[0].view.as_str(), scenes[0].color.as_str()), ("a/b", "c"));
        assert_eq!((scenes[1].view.as_str(), scenes[1].color.as_str()), ("a", "b/c"));
    }

    #[test]
    fn test_duplicate_scene_rejected() {
        let mut design = store().persisted();
        design.scenes.push(Scene::new("front", "black"));
        let mut target = store();
        assert!(matches!(target.restore(design), Err(SceneError::MalformedState(_))));
    }

    #[test]
    fn test_summary() {
        let design = store().persisted();
        let summary = design.summary("draft");
        assert_eq!(summary.id, "draft");
        assert_eq!(summary.product_id.as_deref(), Some("tee-01"));
        assert_eq!(summary.view.as_deref(), Some("front"));
        assert_eq!(summary.version, FORMAT_VERSION);
        assert_eq!(summary.timestamp, design.timestamp);
    }
}
