use super::NodePosition;
use crate::config::LayoutConfig;

/// Row-major grid used once a graph is too large for the force simulation.
#[derive(Debug, Clone)]
pub struct GridLayout {
    pub padding: f64,
}

/// Columns and rows needed for `count` cells in a near-square grid.
pub fn grid_dimensions(count: usize) -> (usize, usize) {
    if count == 0 {
        return (0, 0);
    }
    let cols = (count as f64).sqrt().ceil() as usize;
    let rows = count.div_ceil(cols);
    (cols, rows)
}

impl GridLayout {
    pub fn new(config: &LayoutConfig) -> Self {
        Self {
            padding: config.padding,
        }
    }

    /// Cell centers for `count` nodes, in input order.
    pub fn place(&self, count: usize, width: f64, height: f64) -> Vec<NodePosition> {
        let (cols, rows) = grid_dimensions(count);
        if count == 0 {
            return Vec::new();
        }
        let cell_w = (width - 2.0 * self.padding) / cols as f64;
        let cell_h = (height - 2.0 * self.padding) / rows as f64;
        (0..count)
            .map(|idx| {
                let row = idx / cols;
                let col = idx % cols;
                NodePosition::new(
                    self.padding + col as f64 * cell_w + cell_w / 2.0,
                    self.padding + row as f64 * cell_h + cell_h / 2.0,
                )
            })
            .collect()
    }
}
