// src/geometry.rs
//
// Spatial proximity primitives. Everything here is pure and works in
// frame pixel coordinates. "Near" is always centre-distance based so the
// answer does not depend on box aspect ratio.

use crate::types::{BoundingBox, Point};

/// Euclidean distance between two points
pub fn distance(p1: Point, p2: Point) -> f32 {
    let dx = p1.x - p2.x;
    let dy = p1.y - p2.y;
    (dx * dx + dy * dy).sqrt()
}

/// Distance between the centres of two boxes
pub fn center_distance(box1: &BoundingBox, box2: &BoundingBox) -> f32 {
    distance(box1.center(), box2.center())
}

/// True when the box centres are strictly closer than `threshold`
pub fn is_near(box1: &BoundingBox, box2: &BoundingBox, threshold: f32) -> bool {
    center_distance(box1, box2) < threshold
}

/// Inclusive on every edge
pub fn contains_point(bbox: &BoundingBox, point: Point) -> bool {
    point.x >= bbox.x_min && point.x <= bbox.x_max && point.y >= bbox.y_min && point.y <= bbox.y_max
}

pub fn area(bbox: &BoundingBox) -> f32 {
    bbox.width().max(0.0) * bbox.height().max(0.0)
}

/// Intersection over union, 0.0 for disjoint or degenerate boxes
pub fn iou(a: &BoundingBox, b: &BoundingBox) -> f32 {
    let x1 = a.x_min.max(b.x_min);
    let y1 = a.y_min.max(b.y_min);
    let x2 = a.x_max.min(b.x_max);
    let y2 = a.y_max.min(b.y_max);

    let intersection = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
    let union = area(a) + area(b) - intersection;

    if union > 0.0 {
        intersection / union
    } else {
        0.0
    }
}
