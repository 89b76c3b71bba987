mod force;
mod grid;

pub use force::ForceSimulator;
pub use grid::{GridLayout, grid_dimensions};

use crate::config::LayoutConfig;
use crate::ir::{GraphSnapshot, Place, Road};
use rand::Rng;
use serde::Serialize;
use std::collections::BTreeMap;

/// Pixel-space position of a place, valid for a single pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NodePosition {
    pub x: f64,
    pub y: f64,
}

impl NodePosition {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &NodePosition) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn midpoint(&self, other: &NodePosition) -> NodePosition {
        NodePosition::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

pub type Positions = BTreeMap<String, NodePosition>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutAlgorithm {
    Empty,
    Force,
    Grid,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub positions: Positions,
    pub algorithm: LayoutAlgorithm,
    pub width: f64,
    pub height: f64,
}

impl Layout {
    pub fn position(&self, name: &str) -> Option<NodePosition> {
        self.positions.get(name).copied()
    }
}

pub fn select_algorithm(node_count: usize, config: &LayoutConfig) -> LayoutAlgorithm {
    if node_count == 0 {
        LayoutAlgorithm::Empty
    } else if node_count <= config.force_threshold {
        LayoutAlgorithm::Force
    } else {
        LayoutAlgorithm::Grid
    }
}

/// Positions every place of `graph` inside a `width` x `height` viewport.
pub fn compute_layout<R: Rng>(
    graph: &GraphSnapshot,
    width: f64,
    height: f64,
    config: &LayoutConfig,
    rng: &mut R,
) -> Layout {
    let width = usable_dimension(width);
    let height = usable_dimension(height);
    let algorithm = select_algorithm(graph.places.len(), config);
    tracing::debug!(
        places = graph.places.len(),
        roads = graph.roads.len(),
        ?algorithm,
        width,
        height,
        "computing layout"
    );
    let coords = match algorithm {
        LayoutAlgorithm::Empty => Vec::new(),
        LayoutAlgorithm::Force => {
            ForceSimulator::new(config).run(&graph.places, &graph.roads, width, height, rng)
        }
        LayoutAlgorithm::Grid => GridLayout::new(config).place(graph.places.len(), width, height),
    };
    Layout {
        positions: collect_positions(&graph.places, coords),
        algorithm,
        width,
        height,
    }
}

/// Name-keyed variant of [`compute_layout`] for callers holding loose slices.
pub fn layout_places<R: Rng>(
    places: &[Place],
    roads: &[Road],
    width: f64,
    height: f64,
    config: &LayoutConfig,
    rng: &mut R,
) -> Positions {
    let width = usable_dimension(width);
    let height = usable_dimension(height);
    let coords = match select_algorithm(places.len(), config) {
        LayoutAlgorithm::Empty => Vec::new(),
        LayoutAlgorithm::Force => {
            ForceSimulator::new(config).run(places, roads, width, height, rng)
        }
        LayoutAlgorithm::Grid => GridLayout::new(config).place(places.len(), width, height),
    };
    collect_positions(places, coords)
}

fn collect_positions(places: &[Place], coords: Vec<NodePosition>) -> Positions {
    places
        .iter()
        .zip(coords)
        .map(|(place, pos)| (place.name.clone(), pos))
        .collect()
}

/// Non-finite or sub-pixel viewport sizes become 1 px.
pub(crate) fn usable_dimension(value: f64) -> f64 {
    if value.is_finite() { value.max(1.0) } else { 1.0 }
}
