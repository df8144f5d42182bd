use collisions::CollisionArea;
use common::shapes::{LineSegment, Point, Rectangle, Shape};

/// A broad-phase query. Every index answers the same five kinds; the tree
/// variants and the grid share the pruning and matching tests below.
#[derive(Clone, Copy, Debug)]
pub enum Query<'a> {
    /// Elements touching or overlapping the area.
    OverlappingArea(&'a CollisionArea),
    /// Elements whose interior overlaps the area's interior.
    OverlappingAreaIgnoringEdges(&'a CollisionArea),
    ContainingPoint(Point),
    /// Elements that fully contain the area.
    ContainingArea(&'a CollisionArea),
    IntersectingLineSegment(LineSegment),
}

impl<'a> Query<'a> {
    pub fn bounding_box(&self) -> Rectangle {
        match self {
            Query::OverlappingArea(area)
            | Query::OverlappingAreaIgnoringEdges(area)
            | Query::ContainingArea(area) => area.bounding_box(),
            Query::ContainingPoint(point) => point.bounding_box(),
            Query::IntersectingLineSegment(segment) => segment.bounding_box(),
        }
    }

    /// Whether any element whose bounding box lies within `bounds` can match.
    pub fn may_match_within(&self, bounds: &Rectangle) -> bool {
        match self {
            Query::OverlappingArea(area) => bounds.intersects(&area.bounding_box()),
            Query::OverlappingAreaIgnoringEdges(area) => {
                bounds.intersects_ignoring_edges(&area.bounding_box())
            }
            Query::ContainingPoint(point) => bounds.contains_point(point.x, point.y),
            Query::ContainingArea(area) => bounds.contains_rectangle(&area.bounding_box()),
            Query::IntersectingLineSegment(segment) => segment.intersects_rectangle(bounds),
        }
    }

    pub fn matches_area(&self, area: &CollisionArea) -> bool {
        match self {
            Query::OverlappingArea(query) => area.overlaps(query),
            Query::OverlappingAreaIgnoringEdges(query) => area.overlaps_ignoring_edges(query),
            Query::ContainingPoint(point) => area.contains_point(*point),
            Query::ContainingArea(query) => area.contains(query),
            Query::IntersectingLineSegment(segment) => area.intersects_line_segment(segment),
        }
    }

    /// Point elements have no extent: they contain a point only if equal to
    /// it and contain an area only if the area collapses onto them.
    pub fn matches_point(&self, point: Point) -> bool {
        match self {
            Query::OverlappingArea(query) => query.contains_point(point),
            Query::OverlappingAreaIgnoringEdges(query) => {
                query.contains_point_ignoring_edges(point)
            }
            Query::ContainingPoint(query) => *query == point,
            Query::ContainingArea(query) => {
                let bounding_box = query.bounding_box();
                bounding_box.is_degenerate() && bounding_box.center() == point
            }
            Query::IntersectingLineSegment(segment) => segment.contains_point(point.x, point.y),
        }
    }
}
