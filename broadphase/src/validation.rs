use crate::error::{BroadphaseError, BroadphaseResult};
use collisions::CollisionArea;
use common::shapes::{Point, Rectangle};

pub(crate) fn validate_region(region: &Rectangle) -> BroadphaseResult<()> {
    if !region.is_finite() || region.width <= 0.0 || region.height <= 0.0 {
        return Err(BroadphaseError::InvalidRegion {
            x: region.x,
            y: region.y,
            width: region.width,
            height: region.height,
        });
    }
    Ok(())
}

pub(crate) fn validate_rect_dims(width: f32, height: f32) -> BroadphaseResult<()> {
    if !(width.is_finite() && height.is_finite()) || width < 0.0 || height < 0.0 {
        return Err(BroadphaseError::InvalidRectangleDims { width, height });
    }
    Ok(())
}

pub(crate) fn validate_circle_radius(radius: f32) -> BroadphaseResult<()> {
    if !(radius.is_finite() && radius >= 0.0) {
        return Err(BroadphaseError::InvalidCircleRadius { radius });
    }
    Ok(())
}

pub(crate) fn validate_point(point: &Point) -> BroadphaseResult<()> {
    if !point.is_finite() {
        return Err(BroadphaseError::InvalidPoint {
            x: point.x,
            y: point.y,
        });
    }
    Ok(())
}

// Polygons reject non-finite vertices when they are built.
pub(crate) fn validate_area(area: &CollisionArea) -> BroadphaseResult<()> {
    match area {
        CollisionArea::Rectangle(rectangle) => {
            validate_point(&rectangle.center())?;
            validate_rect_dims(rectangle.width, rectangle.height)
        }
        CollisionArea::Circle(circle) => {
            validate_point(&circle.center())?;
            validate_circle_radius(circle.radius)
        }
        CollisionArea::Polygon(_) => Ok(()),
    }
}
