//! Print-area clamping.
//!
//! Clamping is a translation only: an object's size is never changed. It is
//! applied once when a drag or transform ends, never while the pointer moves.

use crate::objects::SceneObject;
use crate::scene::PrintArea;
use kurbo::{Rect, Vec2};

/// Translation that brings `bounds` fully inside `area`.
///
/// Along an axis where the box is larger than the area, the box is aligned to
/// the area's leading edge so that it spans both edges.
pub fn clamp_offset(bounds: Rect, area: Rect) -> Vec2 {
    Vec2::new(
        axis_offset(bounds.x0, bounds.x1, area.x0, area.x1),
        axis_offset(bounds.y0, bounds.y1, area.y0, area.y1),
    )
}

fn axis_offset(min: f64, max: f64, area_min: f64, area_max: f64) -> f64 {
    if max - min >= area_max - area_min || min < area_min {
        area_min - min
    } else if max > area_max {
        area_max - max
    } else {
        0.0
    }
}

/// Shift `obj` back into `area`. Returns true if it moved.
pub fn clamp_object(obj: &mut SceneObject, area: &PrintArea) -> bool {
    if area.is_empty() {
        return false;
    }
    let offset = clamp_offset(obj.bounds(), area.as_rect());
    if offset == Vec2::ZERO {
        return false;
    }
    obj.translate(offset);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::{ObjectBase, ObjectKind, ShapeKind, ShapeProps};

    fn boxed(x: f64, y: f64, w: f64, h: f64) -> SceneObject {
        SceneObject::new(
            ObjectBase::new(x, y, w, h),
            ObjectKind::Shape(ShapeProps::new(ShapeKind::Rectangle)),
        )
    }

    #[test]
    fn test_clamp_out_left_and_below() {
        let area = PrintArea::new(0.0, 0.0, 200.0, 200.0);
        let mut obj = boxed(-50.0, 300.0, 50.0, 50.0);
        assert!(clamp_object(&mut obj, &area));
        assert!((obj.base.x - 0.0).abs() < f64::EPSILON);
        assert!((obj.base.y - 150.0).abs() < f64::EPSILON);
        // Size untouched
        assert_eq!(obj.base.width, Some(50.0));
        assert_eq!(obj.base.height, Some(50.0));
    }

    #[test]
    fn test_inside_is_untouched() {
        let area = PrintArea::new(0.0, 0.0, 200.0, 200.0);
        let mut obj = boxed(10.0, 10.0, 50.0, 50.0);
        assert!(!clamp_object(&mut obj, &area));
        assert!((obj.base.x - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_larger_than_area_spans_both_edges() {
        let area = PrintArea::new(100.0, 100.0, 200.0, 200.0);
        let mut obj = boxed(250.0, 120.0, 300.0, 50.0);
        assert!(clamp_object(&mut obj, &area));
        let bounds = obj.bounds();
        assert!(bounds.x0 <= 100.0 && bounds.x1 >= 300.0);
        assert!((obj.base.x - 100.0).abs() < f64::EPSILON);
        assert!((obj.base.y - 120.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_scaled_box_is_clamped_by_scaled_size() {
        let area = PrintArea::new(0.0, 0.0, 200.0, 200.0);
        let mut obj = boxed(150.0, 0.0, 50.0, 50.0);
        obj.base.scale_x = 2.0;
        assert!(clamp_object(&mut obj, &area));
        assert!((obj.base.x - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_area_is_ignored() {
        let mut obj = boxed(-50.0, -50.0, 10.0, 10.0);
        assert!(!clamp_object(&mut obj, &PrintArea::default()));
    }

    #[test]
    fn test_offset_for_box_past_right_edge() {
        let offset = clamp_offset(Rect::new(180.0, 0.0, 220.0, 10.0), Rect::new(0.0, 0.0, 200.0, 200.0));
        assert!((offset.x - -20.0).abs() < f64::EPSILON);
        assert!((offset.y - 0.0).abs() < f64::EPSILON);
    }
}
