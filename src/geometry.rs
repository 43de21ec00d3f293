//! Axis-aligned box geometry shared by the tracker and the deposit ledger.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: Point) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Axis-aligned bounding box as (x1, y1, x2, y2).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BoundingBox {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Zero-area box at a single point. Used for deposits that were inferred
    /// behaviorally and have not been confirmed visually.
    pub fn degenerate_at(point: Point) -> Self {
        Self::new(point.x, point.y, point.x, point.y)
    }

    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }

    pub fn center(&self) -> Point {
        Point::new((self.x1 + self.x2) / 2.0, (self.y1 + self.y2) / 2.0)
    }

    /// Ground-contact point: bottom edge at horizontal center.
    pub fn bottom_center(&self) -> Point {
        Point::new((self.x1 + self.x2) / 2.0, self.y2)
    }

    /// Height over width; 0 when width is not positive.
    pub fn aspect_ratio(&self) -> f32 {
        let w = self.width();
        if w > 0.0 {
            self.height() / w
        } else {
            0.0
        }
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x1 && point.x <= self.x2 && point.y >= self.y1 && point.y <= self.y2
    }

    pub fn area(&self) -> f32 {
        self.width().max(0.0) * self.height().max(0.0)
    }

    /// Intersection over union. 0 when the boxes are disjoint or the union
    /// has no area; symmetric; 1 against itself for a positive-area box.
    pub fn iou(&self, other: &BoundingBox) -> f32 {
        let ix1 = self.x1.max(other.x1);
        let iy1 = self.y1.max(other.y1);
        let ix2 = self.x2.min(other.x2);
        let iy2 = self.y2.min(other.y2);

        if ix2 < ix1 || iy2 < iy1 {
            return 0.0;
        }

        let intersection = (ix2 - ix1) * (iy2 - iy1);
        let union = self.area() + other.area() - intersection;
        if union > 0.0 {
            intersection / union
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iou_is_symmetric() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(5.0, 5.0, 15.0, 15.0);
        assert_eq!(a.iou(&b), b.iou(&a));
        assert!(a.iou(&b) > 0.0);
    }

    #[test]
    fn iou_of_box_with_itself_is_one() {
        let a = BoundingBox::new(2.0, 3.0, 12.0, 9.0);
        assert!((a.iou(&a) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn iou_of_disjoint_boxes_is_zero() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(20.0, 20.0, 30.0, 30.0);
        assert_eq!(a.iou(&b), 0.0);
    }

    #[test]
    fn iou_of_degenerate_boxes_is_zero() {
        let a = BoundingBox::degenerate_at(Point::new(5.0, 5.0));
        assert_eq!(a.iou(&a), 0.0);
        assert_eq!(a.area(), 0.0);
    }

    #[test]
    fn aspect_ratio_is_zero_for_nonpositive_width() {
        let a = BoundingBox::new(10.0, 0.0, 10.0, 20.0);
        assert_eq!(a.aspect_ratio(), 0.0);

        let b = BoundingBox::new(0.0, 0.0, 10.0, 25.0);
        assert!((b.aspect_ratio() - 2.5).abs() < 1e-6);
    }

    #[test]
    fn bottom_center_sits_on_the_bottom_edge() {
        let a = BoundingBox::new(10.0, 0.0, 30.0, 40.0);
        let ground = a.bottom_center();
        assert_eq!(ground.x, 20.0);
        assert_eq!(ground.y, 40.0);
    }
}
