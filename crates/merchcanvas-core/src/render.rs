//! Contract between the scene engine and a drawing surface.
//!
//! The engine never draws. A renderer paints from a borrowed [`ReadModel`] and
//! reports user interaction back as [`RendererEvent`]s, which the
//! [`SelectionCoordinator`](crate::selection::SelectionCoordinator) applies.

use crate::objects::{ObjectId, SceneObject};
use crate::scene::PrintArea;
use kurbo::{Point, Rect};
use peniko::Color;
use std::collections::HashSet;

/// Everything needed to paint one frame.
#[derive(Debug, Clone, Copy)]
pub struct ReadModel<'a> {
    /// Objects back to front.
    pub objects: &'a [SceneObject],
    pub selection: &'a HashSet<ObjectId>,
    pub print_area: PrintArea,
    /// Mockup image source.
    pub background: Option<&'a str>,
    /// Live marquee rectangle, if a drag is in progress.
    pub marquee: Option<Rect>,
}

impl<'a> ReadModel<'a> {
    /// Set the marquee rectangle.
    pub fn with_marquee(mut self, rect: Option<Rect>) -> Self {
        self.marquee = rect;
        self
    }

    pub fn is_selected(&self, id: ObjectId) -> bool {
        self.selection.contains(&id)
    }

    /// Visible objects in paint order.
    pub fn visible_objects(&self) -> impl Iterator<Item = &'a SceneObject> {
        self.objects.iter().filter(|obj| obj.is_visible())
    }

    /// Highlight color for selection outlines and the marquee.
    pub fn selection_color(&self) -> Color {
        Color::from_rgba8(59, 130, 246, 255)
    }
}

/// Trait for drawing surfaces.
pub trait Renderer {
    /// Paint a full frame from the read model.
    fn paint(&mut self, model: &ReadModel<'_>);
}

/// Final geometry reported when a transform gesture ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Degrees, clockwise.
    pub rotation: f64,
}

/// Interaction reported by a renderer.
#[derive(Debug, Clone, PartialEq)]
pub enum RendererEvent<H> {
    /// An object was clicked. `additive` when the multi-select modifier was held.
    ObjectSelected { id: ObjectId, additive: bool },
    /// A move gesture finished at `position` (object origin).
    ObjectDragEnded { id: ObjectId, position: Point },
    /// A resize or rotate gesture finished.
    ObjectTransformEnded { id: ObjectId, transform: Transform },
    /// The renderer created a node for an object.
    HandleRegistered { id: ObjectId, handle: H },
    /// The renderer destroyed the node for an object.
    HandleUnregistered { id: ObjectId },
    /// Pointer pressed on empty canvas.
    CanvasPointerDown { point: Point },
    CanvasPointerMove { point: Point },
    CanvasPointerUp { point: Point },
}
