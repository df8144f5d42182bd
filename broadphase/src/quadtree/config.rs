#[derive(Debug, Clone)]
pub struct Config {
    /// Quad slots reserved up front; the pool grows past this on demand.
    pub pool_size: usize,
    /// A leaf holding more elements than this is subdivided.
    pub element_limit: usize,
    /// A subdivided quad whose subtree drops to this many elements is merged.
    pub merge_watermark: usize,
    pub max_depth: usize,
    /// Quads are not split once half their width or height would fall below this.
    pub min_size: f32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            pool_size: 1024,
            element_limit: 4,
            merge_watermark: 3,
            max_depth: 8,
            min_size: 1.0,
        }
    }
}
