use rand::Rng;
use std::fmt::Debug;

/// Tolerance used when deciding whether a point lies on a line segment.
pub const LINE_EPSILON: f32 = 1.0e-4;

pub trait Shape: Debug {
    fn bounding_box(&self) -> Rectangle;
}

#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn distance_sq(&self, other: &Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

impl Shape for Point {
    fn bounding_box(&self) -> Rectangle {
        Rectangle::new(self.x, self.y, 0.0, 0.0)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Circle {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
}

impl Circle {
    pub fn new(x: f32, y: f32, radius: f32) -> Self {
        Self { x, y, radius }
    }

    pub fn center(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        let dx = x - self.x;
        let dy = y - self.y;
        dx * dx + dy * dy <= self.radius * self.radius
    }

    pub fn contains_point_ignoring_edges(&self, x: f32, y: f32) -> bool {
        let dx = x - self.x;
        let dy = y - self.y;
        dx * dx + dy * dy < self.radius * self.radius
    }
}

impl Shape for Circle {
    fn bounding_box(&self) -> Rectangle {
        Rectangle::new(self.x, self.y, self.radius * 2.0, self.radius * 2.0)
    }
}

/// Axis-aligned rectangle stored by its center and size. `top` is the minimum y.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Rectangle {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rectangle {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_min_max(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
        Self {
            x: (min_x + max_x) * 0.5,
            y: (min_y + max_y) * 0.5,
            width: max_x - min_x,
            height: max_y - min_y,
        }
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn left(&self) -> f32 {
        self.x - self.width / 2.0
    }

    pub fn right(&self) -> f32 {
        self.x + self.width / 2.0
    }

    pub fn top(&self) -> f32 {
        self.y - self.height / 2.0
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height / 2.0
    }

    pub fn center(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn top_left(&self) -> (f32, f32) {
        (self.left(), self.top())
    }

    pub fn top_right(&self) -> (f32, f32) {
        (self.right(), self.top())
    }

    pub fn bottom_left(&self) -> (f32, f32) {
        (self.left(), self.bottom())
    }

    pub fn bottom_right(&self) -> (f32, f32) {
        (self.right(), self.bottom())
    }

    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.left(), self.top()),
            Point::new(self.right(), self.top()),
            Point::new(self.left(), self.bottom()),
            Point::new(self.right(), self.bottom()),
        ]
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }

    pub fn is_degenerate(&self) -> bool {
        self.width == 0.0 && self.height == 0.0
    }

    pub fn distance_to_point(&self, x: f32, y: f32) -> f32 {
        let dx = (x - self.x).abs() - self.width / 2.0;
        let dy = (y - self.y).abs() - self.height / 2.0;
        f32::max(dx, 0.0).powi(2) + f32::max(dy, 0.0).powi(2)
    }

    pub fn contains_circle(&self, x: f32, y: f32, radius: f32) -> bool {
        let dx = (x - self.x).abs();
        let dy = (y - self.y).abs();
        let half_width = self.width / 2.0;
        let half_height = self.height / 2.0;
        if dx > half_width + radius || dy > half_height + radius {
            return false;
        }
        if dx <= half_width || dy <= half_height {
            return true;
        }
        let corner_distance_sq = (dx - half_width).powi(2) + (dy - half_height).powi(2);
        corner_distance_sq <= radius.powi(2)
    }

    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        x >= self.left() && x <= self.right() && y >= self.top() && y <= self.bottom()
    }

    pub fn contains_point_ignoring_edges(&self, x: f32, y: f32) -> bool {
        x > self.left() && x < self.right() && y > self.top() && y < self.bottom()
    }

    pub fn contains_rectangle(&self, other: &Rectangle) -> bool {
        self.left() <= other.left()
            && self.right() >= other.right()
            && self.top() <= other.top()
            && self.bottom() >= other.bottom()
    }

    // Touching edges count as an intersection.
    pub fn intersects(&self, other: &Rectangle) -> bool {
        self.left() <= other.right()
            && self.right() >= other.left()
            && self.top() <= other.bottom()
            && self.bottom() >= other.top()
    }

    pub fn intersects_ignoring_edges(&self, other: &Rectangle) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    pub fn expand_to_include(&mut self, other: &Rectangle) {
        let left = f32::min(self.left(), other.left());
        let right = f32::max(self.right(), other.right());
        let top = f32::min(self.top(), other.top());
        let bottom = f32::max(self.bottom(), other.bottom());
        self.x = (left + right) / 2.0;
        self.y = (top + bottom) / 2.0;
        self.width = right - left;
        self.height = bottom - top;
    }

    /// Quadrant `index` of this rectangle: 0 = NW, 1 = NE, 2 = SW, 3 = SE.
    pub fn quadrant(&self, index: usize) -> Rectangle {
        debug_assert!(index < 4, "quadrant index {} out of range", index);
        let half_width = self.width / 2.0;
        let half_height = self.height / 2.0;
        let x = if index & 1 == 0 {
            self.x - half_width / 2.0
        } else {
            self.x + half_width / 2.0
        };
        let y = if index & 2 == 0 {
            self.y - half_height / 2.0
        } else {
            self.y + half_height / 2.0
        };
        Rectangle::new(x, y, half_width, half_height)
    }

    /// Quadrant index a point falls into. Points on a split line go east / south.
    pub fn quadrant_of(&self, x: f32, y: f32) -> usize {
        let east = if x < self.x { 0 } else { 1 };
        let south = if y < self.y { 0 } else { 2 };
        east | south
    }

    pub fn get_random_circle_coords_inside<R: Rng>(&self, radius: f32, rng: &mut R) -> (f32, f32) {
        // Increase radius by 1 in calculations to add a minimal margin.
        let radius = radius + 1.0;
        (
            self._safe_randf32(rng, self.left() + radius, self.right() - radius),
            self._safe_randf32(rng, self.top() + radius, self.bottom() - radius),
        )
    }

    pub fn get_random_rectangle_inside<R: Rng>(&self, max_size: f32, rng: &mut R) -> Rectangle {
        let width = self._safe_randf32(rng, 0.0, max_size);
        let height = self._safe_randf32(rng, 0.0, max_size);
        let x = self._safe_randf32(rng, self.left() + width / 2.0, self.right() - width / 2.0);
        let y = self._safe_randf32(rng, self.top() + height / 2.0, self.bottom() - height / 2.0);
        Rectangle::new(x, y, width, height)
    }

    fn _safe_randf32<R: Rng>(&self, rng: &mut R, min: f32, max: f32) -> f32 {
        if min >= max {
            return min;
        }
        rng.gen_range(min..=max)
    }
}

impl Shape for Rectangle {
    fn bounding_box(&self) -> Rectangle {
        *self
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct LineSegment {
    pub start: Point,
    pub end: Point,
}

impl LineSegment {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self {
            start: Point::new(x1, y1),
            end: Point::new(x2, y2),
        }
    }

    pub fn from_points(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    pub fn is_finite(&self) -> bool {
        self.start.is_finite() && self.end.is_finite()
    }

    pub fn length(&self) -> f32 {
        self.start.distance_sq(&self.end).sqrt()
    }

    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        let dx = self.end.x - self.start.x;
        let dy = self.end.y - self.start.y;
        let px = x - self.start.x;
        let py = y - self.start.y;
        let cross = dx * py - dy * px;
        if cross.abs() > LINE_EPSILON * self.length().max(1.0) {
            return false;
        }
        let dot = dx * px + dy * py;
        let length_sq = dx * dx + dy * dy;
        dot >= -LINE_EPSILON && dot <= length_sq + LINE_EPSILON
    }

    // Liang-Barsky clipping; touching an edge or corner counts.
    pub fn intersects_rectangle(&self, rect: &Rectangle) -> bool {
        let dx = self.end.x - self.start.x;
        let dy = self.end.y - self.start.y;
        let mut t0 = 0.0f32;
        let mut t1 = 1.0f32;
        let edges = [
            (-dx, self.start.x - rect.left()),
            (dx, rect.right() - self.start.x),
            (-dy, self.start.y - rect.top()),
            (dy, rect.bottom() - self.start.y),
        ];
        for (p, q) in edges {
            if p == 0.0 {
                if q < 0.0 {
                    return false;
                }
                continue;
            }
            let r = q / p;
            if p < 0.0 {
                if r > t1 {
                    return false;
                }
                if r > t0 {
                    t0 = r;
                }
            } else {
                if r < t0 {
                    return false;
                }
                if r < t1 {
                    t1 = r;
                }
            }
        }
        t0 <= t1
    }

    pub fn intersects_circle(&self, circle: &Circle) -> bool {
        let closest = self.closest_point(circle.x, circle.y);
        closest.distance_sq(&circle.center()) <= circle.radius * circle.radius
    }

    pub fn intersects_segment(&self, other: &LineSegment) -> bool {
        let d1 = orientation(&other.start, &other.end, &self.start);
        let d2 = orientation(&other.start, &other.end, &self.end);
        let d3 = orientation(&self.start, &self.end, &other.start);
        let d4 = orientation(&self.start, &self.end, &other.end);

        if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
            && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
        {
            return true;
        }

        other.contains_point(self.start.x, self.start.y)
            || other.contains_point(self.end.x, self.end.y)
            || self.contains_point(other.start.x, other.start.y)
            || self.contains_point(other.end.x, other.end.y)
    }

    pub fn closest_point(&self, x: f32, y: f32) -> Point {
        let dx = self.end.x - self.start.x;
        let dy = self.end.y - self.start.y;
        let length_sq = dx * dx + dy * dy;
        if length_sq == 0.0 {
            return self.start;
        }
        let t = (((x - self.start.x) * dx + (y - self.start.y) * dy) / length_sq).clamp(0.0, 1.0);
        Point::new(self.start.x + t * dx, self.start.y + t * dy)
    }
}

impl Shape for LineSegment {
    fn bounding_box(&self) -> Rectangle {
        Rectangle::from_min_max(
            self.start.x.min(self.end.x),
            self.start.y.min(self.end.y),
            self.start.x.max(self.end.x),
            self.start.y.max(self.end.y),
        )
    }
}

fn orientation(a: &Point, b: &Point, c: &Point) -> f32 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}
