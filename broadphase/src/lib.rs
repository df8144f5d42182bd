//! Broad-phase spatial indexes: region and point quad trees, a uniform cell
//! grid and a read-write locked wrapper sharing any of them between threads.

pub mod concurrent;
pub mod elements;
pub mod error;
pub mod grid;
pub mod index;
pub mod query;
pub mod quadtree;
mod validation;

pub use collisions::{CollisionArea, Polygon};
pub use common::shapes;
pub use concurrent::{
    Concurrent, ConcurrentCellGrid, ConcurrentPointQuadTree, ConcurrentRegionQuadTree,
};
pub use error::{BroadphaseError, BroadphaseResult};
pub use grid::CellGrid;
pub use index::SpatialIndex;
pub use query::Query;
pub use quadtree::{
    Config, Placement, PointQuadTree, Points, QuadTree, QuadTreeStats, RegionQuadTree, Regions,
};
