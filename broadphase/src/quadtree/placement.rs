use crate::error::{BroadphaseError, BroadphaseResult};
use crate::query::Query;
use crate::validation::{validate_area, validate_point};
use collisions::CollisionArea;
use common::shapes::{Point, Rectangle, Shape};
use std::fmt::Debug;

/// Decides where a tree stores an element and how its cached bounds are
/// tested. `Regions` stores areas and keeps straddlers at the ancestor;
/// `Points` stores single points, each in exactly one quad.
pub trait Placement {
    type Bounds: Clone + Debug;

    /// Quads track the tight box of their points instead of pruning on the
    /// fixed split geometry.
    const TIGHT_BOUNDS: bool;

    fn validate(region: &Rectangle, bounds: &Self::Bounds) -> BroadphaseResult<()>;

    fn bounding_box(bounds: &Self::Bounds) -> Rectangle;

    /// Child quadrant of `region` that should hold `bounds`, or `None` if the
    /// element has to stay at the quad owning `region`.
    fn quadrant(region: &Rectangle, bounds: &Self::Bounds) -> Option<usize>;

    fn matches(query: &Query, bounds: &Self::Bounds) -> bool;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Regions;

impl Placement for Regions {
    type Bounds = CollisionArea;

    const TIGHT_BOUNDS: bool = false;

    fn validate(_region: &Rectangle, area: &CollisionArea) -> BroadphaseResult<()> {
        validate_area(area)
    }

    fn bounding_box(area: &CollisionArea) -> Rectangle {
        area.bounding_box()
    }

    fn quadrant(region: &Rectangle, area: &CollisionArea) -> Option<usize> {
        let bounding_box = area.bounding_box();
        let mut found = None;
        for index in 0..4 {
            if region.quadrant(index).contains_rectangle(&bounding_box) {
                if found.is_some() {
                    // Zero-width boxes on a split line fit two children.
                    return None;
                }
                found = Some(index);
            }
        }
        found
    }

    fn matches(query: &Query, area: &CollisionArea) -> bool {
        query.matches_area(area)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Points;

impl Placement for Points {
    type Bounds = Point;

    const TIGHT_BOUNDS: bool = true;

    fn validate(region: &Rectangle, point: &Point) -> BroadphaseResult<()> {
        validate_point(point)?;
        if !region.contains_point(point.x, point.y) {
            return Err(BroadphaseError::PointOutOfBounds {
                x: point.x,
                y: point.y,
            });
        }
        Ok(())
    }

    fn bounding_box(point: &Point) -> Rectangle {
        point.bounding_box()
    }

    fn quadrant(region: &Rectangle, point: &Point) -> Option<usize> {
        Some(region.quadrant_of(point.x, point.y))
    }

    fn matches(query: &Query, point: &Point) -> bool {
        query.matches_point(*point)
    }
}
