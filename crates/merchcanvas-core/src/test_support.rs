//! Shared fixtures for unit tests.

use crate::error::{SceneError, SceneResult};
use crate::loader::ImageLoader;
use crate::objects::ImageDimensions;
use crate::scene::{PrintArea, ProductAsset, ProductData};
use crate::storage::BoxFuture;
use std::collections::HashMap;

fn asset(view: &str, image_src: &str, area: PrintArea) -> ProductAsset {
    ProductAsset {
        view: view.to_string(),
        image_src: image_src.to_string(),
        print_area: area,
    }
}

/// A tee offered in black (front, back) and white (front only).
pub fn product() -> ProductData {
    let mut assets_by_color = HashMap::new();
    assets_by_color.insert(
        "black".to_string(),
        vec![
            asset("front", "a.png", PrintArea::new(100.0, 100.0, 300.0, 400.0)),
            asset("back", "black-back.png", PrintArea::new(120.0, 80.0, 260.0, 420.0)),
        ],
    );
    assets_by_color.insert(
        "white".to_string(),
        vec![asset("front", "white-front.png", PrintArea::new(110.0, 90.0, 280.0, 380.0))],
    );
    ProductData {
        product_id: "tee-01".to_string(),
        product_name: "Classic Tee".to_string(),
        color: "black".to_string(),
        size_range: "S-XXL".to_string(),
        technology: "DTG".to_string(),
        assets_by_color,
        initial_view: "front".to_string(),
    }
}

/// Loader answering from a fixed table; unknown sources fail.
#[derive(Default)]
pub struct FixedImageLoader {
    sizes: HashMap<String, ImageDimensions>,
}

impl FixedImageLoader {
    pub fn with(mut self, src: &str, width: u32, height: u32) -> Self {
        self.sizes.insert(src.to_string(), ImageDimensions::new(width, height));
        self
    }
}

impl ImageLoader for FixedImageLoader {
    fn load(&self, src: &str) -> BoxFuture<'_, SceneResult<ImageDimensions>> {
        let result = self
            .sizes
            .get(src)
            .copied()
            .ok_or_else(|| SceneError::ImageLoad(format!("404: {}", src)));
        Box::pin(async move { result })
    }
}
