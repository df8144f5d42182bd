//! Collision-area predicates shared by every broad-phase index.
//!
//! All tests treat touching boundaries as overlapping unless the method name
//! says `ignoring_edges`, in which case the interiors must intersect.

pub mod collision_detection;
pub mod polygon;

pub use polygon::Polygon;

use collision_detection::*;
use common::shapes::{Circle, LineSegment, Point, Rectangle, Shape};

#[derive(Clone, Debug)]
pub enum CollisionArea {
    Rectangle(Rectangle),
    Circle(Circle),
    Polygon(Polygon),
}

impl CollisionArea {
    pub fn bounding_box(&self) -> Rectangle {
        match self {
            CollisionArea::Rectangle(rectangle) => *rectangle,
            CollisionArea::Circle(circle) => circle.bounding_box(),
            CollisionArea::Polygon(polygon) => polygon.bounding_box(),
        }
    }

    pub fn center(&self) -> Point {
        match self {
            CollisionArea::Rectangle(rectangle) => rectangle.center(),
            CollisionArea::Circle(circle) => circle.center(),
            CollisionArea::Polygon(polygon) => polygon.bounding_box().center(),
        }
    }

    /// Moves the area by the given offset. Returns `None` only if a polygon
    /// stops being representable (non-finite coordinates).
    pub fn translated(&self, dx: f32, dy: f32) -> Option<CollisionArea> {
        match self {
            CollisionArea::Rectangle(rectangle) => Some(CollisionArea::Rectangle(Rectangle::new(
                rectangle.x + dx,
                rectangle.y + dy,
                rectangle.width,
                rectangle.height,
            ))),
            CollisionArea::Circle(circle) => Some(CollisionArea::Circle(Circle::new(
                circle.x + dx,
                circle.y + dy,
                circle.radius,
            ))),
            CollisionArea::Polygon(polygon) => polygon.translated(dx, dy).map(CollisionArea::Polygon),
        }
    }

    pub fn overlaps(&self, other: &CollisionArea) -> bool {
        match (self, other) {
            (CollisionArea::Rectangle(a), CollisionArea::Rectangle(b)) => rectangle_rectangle(a, b),
            (CollisionArea::Circle(a), CollisionArea::Circle(b)) => circle_circle(a, b),
            (CollisionArea::Circle(circle), CollisionArea::Rectangle(rectangle))
            | (CollisionArea::Rectangle(rectangle), CollisionArea::Circle(circle)) => {
                circle_rectangle(circle, rectangle)
            }
            (CollisionArea::Polygon(polygon), other) | (other, CollisionArea::Polygon(polygon)) => {
                polygon.overlaps(other)
            }
        }
    }

    pub fn overlaps_ignoring_edges(&self, other: &CollisionArea) -> bool {
        match (self, other) {
            (CollisionArea::Rectangle(a), CollisionArea::Rectangle(b)) => {
                rectangle_rectangle_ignoring_edges(a, b)
            }
            (CollisionArea::Circle(a), CollisionArea::Circle(b)) => {
                circle_circle_ignoring_edges(a, b)
            }
            (CollisionArea::Circle(circle), CollisionArea::Rectangle(rectangle))
            | (CollisionArea::Rectangle(rectangle), CollisionArea::Circle(circle)) => {
                circle_rectangle_ignoring_edges(circle, rectangle)
            }
            (CollisionArea::Polygon(polygon), other) | (other, CollisionArea::Polygon(polygon)) => {
                polygon.overlaps_ignoring_edges(other)
            }
        }
    }

    /// True if `other` lies entirely within this area (shared edges allowed).
    pub fn contains(&self, other: &CollisionArea) -> bool {
        match (self, other) {
            (CollisionArea::Rectangle(outer), CollisionArea::Rectangle(inner)) => {
                rectangle_contains_rectangle(outer, inner)
            }
            (CollisionArea::Rectangle(outer), CollisionArea::Circle(inner)) => {
                rectangle_contains_circle(outer, inner)
            }
            (CollisionArea::Circle(outer), CollisionArea::Rectangle(inner)) => {
                circle_contains_rectangle(outer, inner)
            }
            (CollisionArea::Circle(outer), CollisionArea::Circle(inner)) => {
                circle_contains_circle(outer, inner)
            }
            (CollisionArea::Rectangle(outer), CollisionArea::Polygon(inner)) => inner
                .vertices()
                .all(|vertex| outer.contains_point(vertex.x, vertex.y)),
            (CollisionArea::Circle(outer), CollisionArea::Polygon(inner)) => inner
                .vertices()
                .all(|vertex| outer.contains_point(vertex.x, vertex.y)),
            (CollisionArea::Polygon(outer), inner) => outer.contains(inner),
        }
    }

    pub fn contains_point(&self, point: Point) -> bool {
        match self {
            CollisionArea::Rectangle(rectangle) => rectangle.contains_point(point.x, point.y),
            CollisionArea::Circle(circle) => circle.contains_point(point.x, point.y),
            CollisionArea::Polygon(polygon) => polygon.contains_point(point.x, point.y),
        }
    }

    pub fn contains_point_ignoring_edges(&self, point: Point) -> bool {
        match self {
            CollisionArea::Rectangle(rectangle) => {
                rectangle.contains_point_ignoring_edges(point.x, point.y)
            }
            CollisionArea::Circle(circle) => circle.contains_point_ignoring_edges(point.x, point.y),
            CollisionArea::Polygon(polygon) => {
                polygon.contains_point_ignoring_edges(point.x, point.y)
            }
        }
    }

    pub fn intersects_line_segment(&self, segment: &LineSegment) -> bool {
        match self {
            CollisionArea::Rectangle(rectangle) => segment.intersects_rectangle(rectangle),
            CollisionArea::Circle(circle) => segment.intersects_circle(circle),
            CollisionArea::Polygon(polygon) => polygon.intersects_line_segment(segment),
        }
    }
}

impl Shape for CollisionArea {
    fn bounding_box(&self) -> Rectangle {
        CollisionArea::bounding_box(self)
    }
}

impl From<Rectangle> for CollisionArea {
    fn from(rectangle: Rectangle) -> Self {
        CollisionArea::Rectangle(rectangle)
    }
}

impl From<Circle> for CollisionArea {
    fn from(circle: Circle) -> Self {
        CollisionArea::Circle(circle)
    }
}

impl From<Polygon> for CollisionArea {
    fn from(polygon: Polygon) -> Self {
        CollisionArea::Polygon(polygon)
    }
}
