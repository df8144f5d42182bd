use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BroadphaseError {
    InvalidRegion {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
    InvalidElementLimit { element_limit: usize },
    MergeWatermarkAboveLimit {
        merge_watermark: usize,
        element_limit: usize,
    },
    InvalidMinSize { min_size: f32 },
    InvalidCellSize { width: f32, height: f32 },
    TooManyCells { columns: f32, rows: f32 },
    InvalidRectangleDims { width: f32, height: f32 },
    InvalidCircleRadius { radius: f32 },
    InvalidPoint { x: f32, y: f32 },
    PointOutOfBounds { x: f32, y: f32 },
    AreaOutOfBounds {
        min_x: f32,
        min_y: f32,
        max_x: f32,
        max_y: f32,
    },
    LockPoisoned,
}

pub type BroadphaseResult<T> = Result<T, BroadphaseError>;

impl fmt::Display for BroadphaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BroadphaseError::InvalidRegion {
                x,
                y,
                width,
                height,
            } => {
                write!(
                    f,
                    "region must be finite with positive width/height (x: {}, y: {}, width: {}, height: {})",
                    x, y, width, height
                )
            }
            BroadphaseError::InvalidElementLimit { element_limit } => {
                write!(
                    f,
                    "element limit must be at least 1 (element_limit: {})",
                    element_limit
                )
            }
            BroadphaseError::MergeWatermarkAboveLimit {
                merge_watermark,
                element_limit,
            } => {
                write!(
                    f,
                    "merge watermark must not exceed the element limit (merge_watermark: {}, element_limit: {})",
                    merge_watermark, element_limit
                )
            }
            BroadphaseError::InvalidMinSize { min_size } => {
                write!(
                    f,
                    "minimum quad size must be finite and positive (min_size: {})",
                    min_size
                )
            }
            BroadphaseError::InvalidCellSize { width, height } => {
                write!(
                    f,
                    "cell width/height must be finite and positive (width: {}, height: {})",
                    width, height
                )
            }
            BroadphaseError::TooManyCells { columns, rows } => {
                write!(
                    f,
                    "cell grid would need more than {} cells (columns: {}, rows: {})",
                    crate::grid::MAX_CELLS,
                    columns,
                    rows
                )
            }
            BroadphaseError::InvalidRectangleDims { width, height } => {
                write!(
                    f,
                    "rectangle width/height must be finite and non-negative (width: {}, height: {})",
                    width, height
                )
            }
            BroadphaseError::InvalidCircleRadius { radius } => {
                write!(
                    f,
                    "circle radius must be finite and non-negative (radius: {})",
                    radius
                )
            }
            BroadphaseError::InvalidPoint { x, y } => {
                write!(f, "point coordinates must be finite (x: {}, y: {})", x, y)
            }
            BroadphaseError::PointOutOfBounds { x, y } => {
                write!(f, "point must lie within the tree region (x: {}, y: {})", x, y)
            }
            BroadphaseError::AreaOutOfBounds {
                min_x,
                min_y,
                max_x,
                max_y,
            } => {
                write!(
                    f,
                    "area must overlap the grid region (min_x: {}, min_y: {}, max_x: {}, max_y: {})",
                    min_x, min_y, max_x, max_y
                )
            }
            BroadphaseError::LockPoisoned => {
                write!(f, "index lock poisoned by a panic during a previous write")
            }
        }
    }
}

impl std::error::Error for BroadphaseError {}
