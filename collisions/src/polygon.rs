use crate::CollisionArea;
use common::shapes::{LineSegment, Point, Rectangle, Shape};
use nalgebra::{Isometry2, Point2, Vector2};
use parry2d::query::{self, PointQuery};
use parry2d::shape::{Ball, ConvexPolygon, Cuboid, Segment, Shape as ParryShape};

/// Contacts shallower than this are treated as touching edges, not overlap.
const PENETRATION_EPSILON: f32 = 1.0e-5;

/// Convex polygon collision area. Built from the convex hull of the given
/// vertices, so concave input is widened to its hull.
#[derive(Clone, Debug)]
pub struct Polygon {
    hull: ConvexPolygon,
    bounding_box: Rectangle,
}

impl Polygon {
    /// Returns `None` for non-finite input or when fewer than three
    /// non-collinear vertices remain.
    pub fn new(vertices: &[Point]) -> Option<Self> {
        if vertices.len() < 3 || vertices.iter().any(|vertex| !vertex.is_finite()) {
            return None;
        }
        let points: Vec<Point2<f32>> = vertices
            .iter()
            .map(|vertex| Point2::new(vertex.x, vertex.y))
            .collect();
        let hull = ConvexPolygon::from_convex_hull(&points)?;
        let bounding_box = hull_bounding_box(&hull);
        Some(Self { hull, bounding_box })
    }

    pub fn vertices(&self) -> impl Iterator<Item = Point> + '_ {
        self.hull
            .points()
            .iter()
            .map(|point| Point::new(point.x, point.y))
    }

    pub fn vertex_count(&self) -> usize {
        self.hull.points().len()
    }

    pub fn translated(&self, dx: f32, dy: f32) -> Option<Self> {
        let vertices: Vec<Point> = self
            .vertices()
            .map(|vertex| Point::new(vertex.x + dx, vertex.y + dy))
            .collect();
        Self::new(&vertices)
    }

    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        if !self.bounding_box.contains_point(x, y) {
            return false;
        }
        self.hull
            .contains_point(&Isometry2::identity(), &Point2::new(x, y))
    }

    pub fn contains_point_ignoring_edges(&self, x: f32, y: f32) -> bool {
        let point = Point2::new(x, y);
        let projection = self.hull.project_point(&Isometry2::identity(), &point, false);
        projection.is_inside && (projection.point - point).norm() > PENETRATION_EPSILON
    }

    pub fn overlaps(&self, other: &CollisionArea) -> bool {
        if !self.bounding_box.intersects(&other.bounding_box()) {
            return false;
        }
        with_parry_shape(other, |position, shape| {
            query::intersection_test(&Isometry2::identity(), &self.hull, position, shape)
                .unwrap_or(false)
        })
    }

    pub fn overlaps_ignoring_edges(&self, other: &CollisionArea) -> bool {
        if !self.bounding_box.intersects_ignoring_edges(&other.bounding_box()) {
            return false;
        }
        with_parry_shape(other, |position, shape| {
            matches!(
                query::contact(&Isometry2::identity(), &self.hull, position, shape, 0.0),
                Ok(Some(contact)) if contact.dist < -PENETRATION_EPSILON
            )
        })
    }

    pub fn contains(&self, other: &CollisionArea) -> bool {
        if !self.bounding_box.contains_rectangle(&other.bounding_box()) {
            return false;
        }
        match other {
            CollisionArea::Rectangle(rectangle) => rectangle
                .corners()
                .iter()
                .all(|corner| self.contains_point(corner.x, corner.y)),
            CollisionArea::Circle(circle) => {
                let center = Point2::new(circle.x, circle.y);
                let projection = self.hull.project_point(&Isometry2::identity(), &center, false);
                projection.is_inside && (projection.point - center).norm() >= circle.radius
            }
            CollisionArea::Polygon(polygon) => polygon
                .vertices()
                .all(|vertex| self.contains_point(vertex.x, vertex.y)),
        }
    }

    pub fn intersects_line_segment(&self, segment: &LineSegment) -> bool {
        if !segment.intersects_rectangle(&self.bounding_box) {
            return false;
        }
        let segment = Segment::new(
            Point2::new(segment.start.x, segment.start.y),
            Point2::new(segment.end.x, segment.end.y),
        );
        query::intersection_test(
            &Isometry2::identity(),
            &self.hull,
            &Isometry2::identity(),
            &segment,
        )
        .unwrap_or(false)
    }
}

impl Shape for Polygon {
    fn bounding_box(&self) -> Rectangle {
        self.bounding_box
    }
}

fn hull_bounding_box(hull: &ConvexPolygon) -> Rectangle {
    let mut min_x = f32::MAX;
    let mut min_y = f32::MAX;
    let mut max_x = f32::MIN;
    let mut max_y = f32::MIN;
    for point in hull.points() {
        min_x = min_x.min(point.x);
        min_y = min_y.min(point.y);
        max_x = max_x.max(point.x);
        max_y = max_y.max(point.y);
    }
    Rectangle::from_min_max(min_x, min_y, max_x, max_y)
}

// Rectangles become cuboids and circles become balls, both positioned at their centers.
fn with_parry_shape<R>(
    area: &CollisionArea,
    f: impl FnOnce(&Isometry2<f32>, &dyn ParryShape) -> R,
) -> R {
    match area {
        CollisionArea::Rectangle(rectangle) => {
            let cuboid = Cuboid::new(Vector2::new(rectangle.width * 0.5, rectangle.height * 0.5));
            f(&Isometry2::translation(rectangle.x, rectangle.y), &cuboid)
        }
        CollisionArea::Circle(circle) => {
            let ball = Ball::new(circle.radius);
            f(&Isometry2::translation(circle.x, circle.y), &ball)
        }
        CollisionArea::Polygon(polygon) => f(&Isometry2::identity(), &polygon.hull),
    }
}
