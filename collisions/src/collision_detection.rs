use common::shapes::{Circle, Rectangle};

// Check that Rectangle inner is fully contained in Rectangle outer
pub fn rectangle_contains_rectangle(outer: &Rectangle, inner: &Rectangle) -> bool {
    outer.contains_rectangle(inner)
}

pub fn rectangle_rectangle(a: &Rectangle, b: &Rectangle) -> bool {
    a.intersects(b)
}

pub fn rectangle_rectangle_ignoring_edges(a: &Rectangle, b: &Rectangle) -> bool {
    a.intersects_ignoring_edges(b)
}

pub fn circle_circle(a: &Circle, b: &Circle) -> bool {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    let distance_sq = dx * dx + dy * dy;
    let collision_distance = a.radius + b.radius;
    distance_sq <= collision_distance * collision_distance
}

pub fn circle_circle_ignoring_edges(a: &Circle, b: &Circle) -> bool {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    let distance_sq = dx * dx + dy * dy;
    let collision_distance = a.radius + b.radius;
    distance_sq < collision_distance * collision_distance
}

pub fn circle_rectangle(circle: &Circle, rectangle: &Rectangle) -> bool {
    rectangle.contains_circle(circle.x, circle.y, circle.radius)
}

pub fn circle_rectangle_ignoring_edges(circle: &Circle, rectangle: &Rectangle) -> bool {
    let half_width = rectangle.width / 2.0;
    let half_height = rectangle.height / 2.0;
    let dx = (circle.x - rectangle.x).abs();
    let dy = (circle.y - rectangle.y).abs();
    if dx >= half_width + circle.radius || dy >= half_height + circle.radius {
        return false;
    }
    if dx < half_width || dy < half_height {
        return true;
    }
    let corner_dx = dx - half_width;
    let corner_dy = dy - half_height;
    corner_dx * corner_dx + corner_dy * corner_dy < circle.radius * circle.radius
}

pub fn rectangle_contains_circle(rectangle: &Rectangle, circle: &Circle) -> bool {
    circle.x - circle.radius >= rectangle.left()
        && circle.x + circle.radius <= rectangle.right()
        && circle.y - circle.radius >= rectangle.top()
        && circle.y + circle.radius <= rectangle.bottom()
}

pub fn circle_contains_rectangle(circle: &Circle, rectangle: &Rectangle) -> bool {
    rectangle
        .corners()
        .iter()
        .all(|corner| circle.contains_point(corner.x, corner.y))
}

pub fn circle_contains_circle(outer: &Circle, inner: &Circle) -> bool {
    if inner.radius > outer.radius {
        return false;
    }
    let dx = outer.x - inner.x;
    let dy = outer.y - inner.y;
    let reach = outer.radius - inner.radius;
    dx * dx + dy * dy <= reach * reach
}
