use broadphase::shapes::{Circle, LineSegment, Point, Rectangle};
use broadphase::{
    BroadphaseError, CollisionArea, Config, PointQuadTree, Polygon, Query, RegionQuadTree,
    SpatialIndex,
};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{HashMap, HashSet};

fn rect(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> CollisionArea {
    CollisionArea::Rectangle(Rectangle::from_min_max(min_x, min_y, max_x, max_y))
}

fn region() -> Rectangle {
    Rectangle::from_min_max(0.0, 0.0, 128.0, 128.0)
}

fn config(element_limit: usize, merge_watermark: usize) -> Config {
    Config {
        element_limit,
        merge_watermark,
        ..Config::default()
    }
}

fn sorted(mut ids: Vec<u32>) -> Vec<u32> {
    ids.sort_unstable();
    ids
}

fn random_polygon(rng: &mut StdRng, bounds: &Rectangle) -> Option<CollisionArea> {
    let (x, y) = bounds.get_random_circle_coords_inside(8.0, rng);
    let vertices: Vec<Point> = (0..rng.gen_range(3..6))
        .map(|_| {
            let angle = rng.gen_range(0.0..std::f32::consts::TAU);
            let distance = rng.gen_range(1.0..8.0);
            Point::new(x + angle.cos() * distance, y + angle.sin() * distance)
        })
        .collect();
    Polygon::new(&vertices).map(CollisionArea::Polygon)
}

fn random_area(rng: &mut StdRng, bounds: &Rectangle) -> CollisionArea {
    match rng.gen_range(0..3) {
        0 => {
            let radius = rng.gen_range(0.0..8.0);
            let (x, y) = bounds.get_random_circle_coords_inside(radius, rng);
            CollisionArea::Circle(Circle::new(x, y, radius))
        }
        1 => random_polygon(rng, bounds).unwrap_or_else(|| {
            CollisionArea::Rectangle(bounds.get_random_rectangle_inside(20.0, rng))
        }),
        _ => CollisionArea::Rectangle(bounds.get_random_rectangle_inside(20.0, rng)),
    }
}

#[test]
fn test_corner_boxes_split_and_merge() {
    let mut tree = RegionQuadTree::new_with_config(region(), config(2, 1)).unwrap();
    tree.insert(0, rect(0.0, 0.0, 32.0, 32.0)).unwrap();
    tree.insert(1, rect(96.0, 0.0, 128.0, 32.0)).unwrap();
    assert_eq!(tree.total_quads(), 1);
    tree.insert(2, rect(0.0, 96.0, 32.0, 128.0)).unwrap();
    tree.insert(3, rect(96.0, 96.0, 128.0, 128.0)).unwrap();
    assert_eq!(tree.total_quads(), 4);
    assert_eq!(tree.allocated_quads(), 5);
    assert_eq!(tree.depth(), 1);
    assert!(tree.is_consistent());

    assert!(tree.remove(0));
    assert!(tree.remove(1));
    assert_eq!(tree.total_quads(), 4);
    assert!(tree.remove(2));
    assert_eq!(tree.total_quads(), 1);
    assert_eq!(tree.allocated_quads(), 1);
    assert_eq!(tree.total_merge_operations(), 1);
    assert_eq!(tree.total_elements(), 1);
    assert!(tree.is_consistent());

    assert_eq!(
        tree.elements_overlapping_area(&rect(100.0, 100.0, 110.0, 110.0)),
        vec![3]
    );
}

#[test]
fn test_round_trip_to_single_leaf() {
    let mut rng = StdRng::seed_from_u64(11);
    let mut tree = RegionQuadTree::new_with_config(region(), config(4, 2)).unwrap();
    for id in 0..40 {
        let area = CollisionArea::Rectangle(region().get_random_rectangle_inside(4.0, &mut rng));
        assert!(tree.insert(id, area).unwrap());
    }
    assert!(tree.total_quads() > 1);
    assert!(tree.is_consistent());

    for id in 2..40 {
        assert!(tree.remove(id));
        assert!(tree.is_consistent());
    }
    assert_eq!(tree.total_quads(), 1);
    assert_eq!(tree.allocated_quads(), 1);
    assert!(tree.total_merge_operations() > 0);
    assert_eq!(sorted(tree.elements()), vec![0, 1]);
}

#[test]
fn test_invalid_configuration() {
    assert_eq!(
        RegionQuadTree::new_with_config(region(), config(2, 3)).unwrap_err(),
        BroadphaseError::MergeWatermarkAboveLimit {
            merge_watermark: 3,
            element_limit: 2
        }
    );
    assert_eq!(
        RegionQuadTree::new_with_config(region(), config(0, 0)).unwrap_err(),
        BroadphaseError::InvalidElementLimit { element_limit: 0 }
    );
    assert!(matches!(
        PointQuadTree::new(Rectangle::new(0.0, 0.0, -1.0, 5.0)),
        Err(BroadphaseError::InvalidRegion { .. })
    ));
    let zero_min_size = Config {
        min_size: 0.0,
        ..Config::default()
    };
    assert_eq!(
        RegionQuadTree::new_with_config(region(), zero_min_size).unwrap_err(),
        BroadphaseError::InvalidMinSize { min_size: 0.0 }
    );
}

#[test]
fn test_usage_errors_are_not_errors() {
    let mut tree = RegionQuadTree::new(region()).unwrap();
    assert!(tree.insert(1, rect(0.0, 0.0, 1.0, 1.0)).unwrap());
    assert!(!tree.insert(1, rect(5.0, 5.0, 6.0, 6.0)).unwrap());
    assert_eq!(tree.get(1).map(|area| area.bounding_box()), Some(Rectangle::from_min_max(0.0, 0.0, 1.0, 1.0)));
    assert!(!tree.remove(2));
    assert!(!tree.relocate(2, rect(0.0, 0.0, 1.0, 1.0)).unwrap());
    assert_eq!(tree.total_elements(), 1);
}

#[test]
fn test_invalid_bounds_rejected() {
    let mut tree = RegionQuadTree::new(region()).unwrap();
    assert_eq!(
        tree.insert(1, CollisionArea::Rectangle(Rectangle::new(5.0, 5.0, -2.0, 1.0))),
        Err(BroadphaseError::InvalidRectangleDims {
            width: -2.0,
            height: 1.0
        })
    );
    assert_eq!(
        tree.insert(1, CollisionArea::Circle(Circle::new(5.0, 5.0, -1.0))),
        Err(BroadphaseError::InvalidCircleRadius { radius: -1.0 })
    );
    assert!(tree.insert(1, rect(0.0, 0.0, 1.0, 1.0)).unwrap());
    assert!(tree
        .relocate(1, CollisionArea::Circle(Circle::new(f32::NAN, 5.0, 1.0)))
        .is_err());
    assert_eq!(
        tree.get(1).map(|area| area.bounding_box()),
        Some(Rectangle::from_min_max(0.0, 0.0, 1.0, 1.0))
    );
    assert!(!tree.contains(2));
}

#[test]
fn test_edge_exclusivity() {
    let mut tree = RegionQuadTree::new(region()).unwrap();
    let left = rect(0.0, 0.0, 10.0, 10.0);
    let right = rect(10.0, 0.0, 20.0, 10.0);
    tree.insert(1, left.clone()).unwrap();
    tree.insert(2, right).unwrap();

    assert_eq!(sorted(tree.elements_overlapping_area(&left)), vec![1, 2]);
    assert_eq!(tree.elements_overlapping_area_ignoring_edges(&left), vec![1]);
}

#[test]
fn test_containment() {
    let mut tree = RegionQuadTree::new(region()).unwrap();
    tree.insert(1, rect(10.0, 10.0, 60.0, 60.0)).unwrap();
    tree.insert(2, CollisionArea::Circle(Circle::new(100.0, 100.0, 10.0)))
        .unwrap();

    assert_eq!(tree.elements_containing_area(&rect(20.0, 20.0, 30.0, 30.0)), vec![1]);
    assert!(tree
        .elements_containing_area(&rect(50.0, 50.0, 70.0, 70.0))
        .is_empty());
    assert_eq!(tree.elements_containing_point(Point::new(10.0, 10.0)), vec![1]);
    assert_eq!(tree.elements_containing_point(Point::new(105.0, 100.0)), vec![2]);
    assert!(tree
        .elements_containing_point(Point::new(108.0, 108.0))
        .is_empty());
}

#[test]
fn test_line_segment_query() {
    let mut tree = RegionQuadTree::new_with_config(region(), config(1, 0)).unwrap();
    tree.insert(1, rect(10.0, 10.0, 20.0, 20.0)).unwrap();
    tree.insert(2, rect(100.0, 10.0, 110.0, 20.0)).unwrap();
    tree.insert(3, CollisionArea::Circle(Circle::new(100.0, 100.0, 5.0)))
        .unwrap();

    let diagonal = LineSegment::new(0.0, 0.0, 128.0, 128.0);
    assert_eq!(sorted(tree.elements_intersecting_line_segment(diagonal)), vec![1, 3]);
    let across_top = LineSegment::new(0.0, 15.0, 128.0, 15.0);
    assert_eq!(sorted(tree.elements_intersecting_line_segment(across_top)), vec![1, 2]);
    assert!(tree.is_consistent());
}

#[test]
fn test_straddlers_reported_once() {
    let mut tree = RegionQuadTree::new_with_config(region(), config(2, 1)).unwrap();
    // Crosses both split lines of the root.
    tree.insert(100, rect(50.0, 50.0, 80.0, 80.0)).unwrap();
    let mut id = 0;
    for x in 0..8 {
        for y in 0..8 {
            let min_x = x as f32 * 16.0 + 2.0;
            let min_y = y as f32 * 16.0 + 2.0;
            tree.insert(id, rect(min_x, min_y, min_x + 12.0, min_y + 12.0))
                .unwrap();
            id += 1;
        }
    }
    assert!(tree.depth() >= 2);
    assert!(tree.is_consistent());

    let everything = tree.elements_overlapping_area(&rect(0.0, 0.0, 128.0, 128.0));
    let unique: HashSet<u32> = everything.iter().copied().collect();
    assert_eq!(everything.len(), unique.len());
    assert_eq!(everything.len(), 65);

    let center = tree.elements_overlapping_area(&CollisionArea::Circle(Circle::new(64.0, 64.0, 1.0)));
    assert_eq!(center, vec![100]);
}

#[test]
fn test_outside_region_stays_at_root() {
    let mut tree = RegionQuadTree::new_with_config(region(), config(1, 0)).unwrap();
    tree.insert(1, rect(200.0, 200.0, 210.0, 210.0)).unwrap();
    tree.insert(2, rect(1.0, 1.0, 2.0, 2.0)).unwrap();
    tree.insert(3, rect(120.0, 1.0, 121.0, 2.0)).unwrap();
    assert_eq!(
        tree.quad_of(1).and_then(|slot| tree.quad_region(slot)),
        Some(region())
    );
    assert_eq!(tree.elements_containing_point(Point::new(205.0, 205.0)), vec![1]);
    assert!(tree.is_consistent());
}

#[test]
fn test_max_depth_is_a_hard_stop() {
    let config = Config {
        element_limit: 2,
        merge_watermark: 1,
        max_depth: 3,
        ..Config::default()
    };
    let mut tree = RegionQuadTree::new_with_config(region(), config).unwrap();
    for id in 0..10 {
        tree.insert(id, rect(9.5, 9.5, 10.5, 10.5)).unwrap();
    }
    assert_eq!(tree.depth(), 3);
    assert_eq!(tree.total_quads(), 10);
    assert!(tree.is_consistent());
    assert_eq!(tree.elements_containing_point(Point::new(10.0, 10.0)).len(), 10);

    let leaf = tree.quad_of(0).unwrap();
    assert_eq!(
        tree.quad_region(leaf),
        Some(Rectangle::from_min_max(0.0, 0.0, 16.0, 16.0))
    );

    for id in 0..9 {
        tree.remove(id);
    }
    assert_eq!(tree.total_quads(), 1);
    assert!(tree.is_consistent());
}

#[test]
fn test_relocate() {
    let mut tree = RegionQuadTree::new_with_config(region(), config(2, 1)).unwrap();
    tree.insert(1, rect(4.0, 4.0, 8.0, 8.0)).unwrap();
    tree.insert(2, rect(100.0, 4.0, 104.0, 8.0)).unwrap();
    tree.insert(3, rect(4.0, 100.0, 8.0, 104.0)).unwrap();
    let north_west = tree.quad_of(1).unwrap();
    assert_eq!(tree.quad_region(north_west), Some(region().quadrant(0)));

    // Same quad, cached bounds updated in place.
    assert!(tree.relocate(1, rect(10.0, 10.0, 14.0, 14.0)).unwrap());
    assert_eq!(tree.quad_of(1), Some(north_west));
    assert!(tree.elements_containing_point(Point::new(5.0, 5.0)).is_empty());
    assert_eq!(tree.elements_containing_point(Point::new(12.0, 12.0)), vec![1]);

    assert!(tree
        .relocate(1, CollisionArea::Circle(Circle::new(100.0, 100.0, 3.0)))
        .unwrap());
    let south_east = tree.quad_of(1).unwrap();
    assert_eq!(tree.quad_region(south_east), Some(region().quadrant(3)));
    assert!(tree.elements_containing_point(Point::new(12.0, 12.0)).is_empty());
    assert_eq!(tree.elements_containing_point(Point::new(100.0, 100.0)), vec![1]);
    assert_eq!(tree.total_elements(), 3);
    assert!(tree.is_consistent());
}

#[test]
fn test_clear() {
    let mut tree = RegionQuadTree::new_with_config(region(), config(2, 1)).unwrap();
    for id in 0..20 {
        let offset = id as f32 * 6.0;
        tree.insert(id, rect(offset, offset, offset + 2.0, offset + 2.0))
            .unwrap();
    }
    tree.clear();
    assert_eq!(tree.total_elements(), 0);
    assert_eq!(tree.total_quads(), 1);
    assert_eq!(tree.allocated_quads(), 1);
    assert!(tree.elements().is_empty());
    assert!(tree.is_consistent());
    assert!(tree.insert(0, rect(1.0, 1.0, 2.0, 2.0)).unwrap());
}

#[test]
fn test_all_quad_regions() {
    let mut tree = RegionQuadTree::new_with_config(region(), config(2, 1)).unwrap();
    tree.insert(0, rect(0.0, 0.0, 32.0, 32.0)).unwrap();
    tree.insert(1, rect(96.0, 0.0, 128.0, 32.0)).unwrap();
    tree.insert(2, rect(0.0, 96.0, 32.0, 128.0)).unwrap();

    let mut regions = Vec::new();
    tree.all_quad_regions(&mut regions);
    assert_eq!(regions.len(), 5);
    assert!(regions.contains(&region()));
    for index in 0..4 {
        assert!(regions.contains(&region().quadrant(index)));
    }
    let stats = tree.stats();
    assert_eq!(stats.total_quads, 4);
    assert_eq!(stats.allocated_quads, 5);
    assert_eq!(stats.depth, 1);
}

#[test]
fn test_randomized_against_model() {
    let mut rng = StdRng::seed_from_u64(42);
    let bounds = region();
    let mut tree = RegionQuadTree::new_with_config(bounds, config(4, 3)).unwrap();
    let mut model: HashMap<u32, CollisionArea> = HashMap::new();
    let mut next_id = 0;

    for step in 0..3000 {
        match rng.gen_range(0..10) {
            0..=4 => {
                let area = random_area(&mut rng, &bounds);
                assert!(tree.insert(next_id, area.clone()).unwrap());
                model.insert(next_id, area);
                next_id += 1;
            }
            5..=6 => {
                if let Some(&id) = model.keys().next() {
                    assert!(tree.remove(id));
                    model.remove(&id);
                }
            }
            _ => {
                let ids: Vec<u32> = model.keys().copied().collect();
                if !ids.is_empty() {
                    let id = ids[rng.gen_range(0..ids.len())];
                    let area = random_area(&mut rng, &bounds);
                    assert!(tree.relocate(id, area.clone()).unwrap());
                    model.insert(id, area);
                }
            }
        }
        assert_eq!(tree.total_elements(), model.len());

        if step % 50 == 0 {
            assert!(tree.is_consistent(), "inconsistent at step {}", step);
            let target = random_area(&mut rng, &bounds);
            let from = Point::new(rng.gen_range(0.0..128.0), rng.gen_range(0.0..128.0));
            let to = Point::new(rng.gen_range(0.0..128.0), rng.gen_range(0.0..128.0));
            let queries = [
                Query::OverlappingArea(&target),
                Query::OverlappingAreaIgnoringEdges(&target),
                Query::ContainingArea(&target),
                Query::ContainingPoint(target.center()),
                Query::IntersectingLineSegment(LineSegment::from_points(from, to)),
            ];
            for query in queries.iter() {
                let expected: Vec<u32> = sorted(
                    model
                        .iter()
                        .filter(|(_, area)| query.matches_area(area))
                        .map(|(&id, _)| id)
                        .collect(),
                );
                assert_eq!(sorted(tree.query(query)), expected);
            }
        }
    }
}

#[test]
fn test_point_tree_tight_bounds() {
    let mut tree = PointQuadTree::new(region()).unwrap();
    tree.insert(1, Point::new(10.0, 10.0)).unwrap();
    tree.insert(2, Point::new(20.0, 30.0)).unwrap();
    tree.insert(3, Point::new(5.0, 40.0)).unwrap();
    let root = tree.quad_of(1).unwrap();
    assert_eq!(
        tree.quad_element_bounds(root),
        Some(Rectangle::from_min_max(5.0, 10.0, 20.0, 40.0))
    );

    tree.remove(3);
    assert_eq!(
        tree.quad_element_bounds(root),
        Some(Rectangle::from_min_max(10.0, 10.0, 20.0, 30.0))
    );
    tree.relocate(2, Point::new(12.0, 11.0)).unwrap();
    assert_eq!(
        tree.quad_element_bounds(root),
        Some(Rectangle::from_min_max(10.0, 10.0, 12.0, 11.0))
    );
    tree.remove(1);
    tree.remove(2);
    assert_eq!(tree.quad_element_bounds(root), None);
    assert!(tree.is_consistent());
}

#[test]
fn test_point_tree_rejects_out_of_bounds() {
    let mut tree = PointQuadTree::new(region()).unwrap();
    assert_eq!(
        tree.insert(1, Point::new(200.0, 0.0)),
        Err(BroadphaseError::PointOutOfBounds { x: 200.0, y: 0.0 })
    );
    assert!(matches!(
        tree.insert(1, Point::new(f32::NAN, 0.0)),
        Err(BroadphaseError::InvalidPoint { .. })
    ));
    assert!(tree.insert(1, Point::new(128.0, 128.0)).unwrap());
    assert_eq!(
        tree.relocate(1, Point::new(-1.0, 5.0)),
        Err(BroadphaseError::PointOutOfBounds { x: -1.0, y: 5.0 })
    );
    assert_eq!(tree.get(1), Some(&Point::new(128.0, 128.0)));
}

#[test]
fn test_point_tree_quad_of() {
    let mut tree = PointQuadTree::new_with_config(region(), config(2, 1)).unwrap();
    tree.insert(1, Point::new(10.0, 10.0)).unwrap();
    tree.insert(2, Point::new(100.0, 10.0)).unwrap();
    tree.insert(3, Point::new(10.0, 100.0)).unwrap();
    assert_eq!(tree.total_quads(), 4);

    let region_of = |tree: &PointQuadTree, id| tree.quad_of(id).and_then(|slot| tree.quad_region(slot));
    assert_eq!(region_of(&tree, 1), Some(region().quadrant(0)));
    assert_eq!(region_of(&tree, 2), Some(region().quadrant(1)));
    assert_eq!(region_of(&tree, 3), Some(region().quadrant(2)));

    // On the split lines: east and south win.
    tree.insert(4, Point::new(64.0, 64.0)).unwrap();
    assert_eq!(region_of(&tree, 4), Some(region().quadrant(3)));

    tree.relocate(1, Point::new(100.0, 100.0)).unwrap();
    assert_eq!(region_of(&tree, 1), Some(region().quadrant(3)));
    let south_east = tree.quad_of(1).unwrap();
    assert_eq!(
        tree.quad_element_bounds(south_east),
        Some(Rectangle::from_min_max(64.0, 64.0, 100.0, 100.0))
    );
    assert!(tree.is_consistent());

    // After the merge the element is owned by the root.
    assert_eq!(tree.remove_all(vec![2, 3, 4]), 3);
    assert_eq!(tree.total_quads(), 1);
    assert_eq!(region_of(&tree, 1), Some(region()));
    assert_eq!(tree.quad_of(2), None);
}

#[test]
fn test_point_tree_min_size_stop() {
    let config = Config {
        element_limit: 2,
        merge_watermark: 1,
        max_depth: 100,
        min_size: 1.0,
        ..Config::default()
    };
    let mut tree = PointQuadTree::new_with_config(region(), config).unwrap();
    for id in 0..5 {
        tree.insert(id, Point::new(3.0, 3.0)).unwrap();
    }
    assert_eq!(tree.depth(), 7);
    assert!(tree.is_consistent());
    assert_eq!(sorted(tree.elements_containing_point(Point::new(3.0, 3.0))), vec![0, 1, 2, 3, 4]);
}

#[test]
fn test_point_tree_queries() {
    let mut tree = PointQuadTree::new_with_config(region(), config(2, 1)).unwrap();
    tree.insert(1, Point::new(10.0, 10.0)).unwrap();
    tree.insert(2, Point::new(20.0, 10.0)).unwrap();
    tree.insert(3, Point::new(100.0, 100.0)).unwrap();
    tree.insert(4, Point::new(30.0, 30.0)).unwrap();

    let area = rect(10.0, 0.0, 20.0, 20.0);
    assert_eq!(sorted(tree.elements_overlapping_area(&area)), vec![1, 2]);
    assert!(tree.elements_overlapping_area_ignoring_edges(&area).is_empty());
    assert_eq!(tree.elements_containing_point(Point::new(20.0, 10.0)), vec![2]);
    assert_eq!(
        tree.elements_containing_area(&rect(100.0, 100.0, 100.0, 100.0)),
        vec![3]
    );
    let segment = LineSegment::new(0.0, 0.0, 40.0, 40.0);
    assert_eq!(sorted(tree.elements_intersecting_line_segment(segment)), vec![1, 4]);
    assert!(tree.is_consistent());
}

#[test]
fn test_point_tree_randomized_against_model() {
    let mut rng = StdRng::seed_from_u64(5);
    let bounds = Rectangle::from_min_max(-500.0, -500.0, 500.0, 500.0);
    let mut tree = PointQuadTree::new_with_config(bounds, config(6, 2)).unwrap();
    let mut model: HashMap<u32, Point> = HashMap::new();

    for step in 0..4000 {
        let id = rng.gen_range(0..300);
        let point = Point::new(rng.gen_range(-500.0..=500.0), rng.gen_range(-500.0..=500.0));
        if model.contains_key(&id) {
            if rng.gen_bool(0.4) {
                assert!(tree.remove(id));
                model.remove(&id);
            } else {
                assert!(tree.relocate(id, point).unwrap());
                model.insert(id, point);
            }
        } else {
            assert!(tree.insert(id, point).unwrap());
            model.insert(id, point);
        }
        assert_eq!(tree.total_elements(), model.len());

        if step % 100 == 0 {
            assert!(tree.is_consistent(), "inconsistent at step {}", step);
            let target = random_area(&mut rng, &bounds);
            let expected: Vec<u32> = sorted(
                model
                    .iter()
                    .filter(|(_, point)| target.contains_point(**point))
                    .map(|(&id, _)| id)
                    .collect(),
            );
            assert_eq!(sorted(tree.elements_overlapping_area(&target)), expected);
            if let Some((&id, &point)) = model.iter().next() {
                assert!(tree.elements_containing_point(point).contains(&id));
            }
        }
    }
}
