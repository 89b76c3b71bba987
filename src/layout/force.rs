use std::collections::HashMap;

use rand::Rng;

use super::NodePosition;
use crate::config::LayoutConfig;
use crate::ir::{Place, Road};

/// Spring embedder: all pairs repel with `k² / d`, road endpoints attract
/// with `(d / k) * k`, and every iteration applies the damped net force
/// directly to the position.
#[derive(Debug, Clone)]
pub struct ForceSimulator {
    pub padding: f64,
    pub iterations: usize,
    pub damping: f64,
}

impl ForceSimulator {
    pub fn new(config: &LayoutConfig) -> Self {
        Self {
            padding: config.padding,
            iterations: config.iterations,
            damping: config.damping,
        }
    }

    /// Returns one position per place, index-aligned with `places`.
    pub fn run<R: Rng>(
        &self,
        places: &[Place],
        roads: &[Road],
        width: f64,
        height: f64,
        rng: &mut R,
    ) -> Vec<NodePosition> {
        if places.is_empty() {
            return Vec::new();
        }
        let k = ideal_edge_length(width, height, places.len());
        let edges = resolve_edges(places, roads);
        let mut positions = self.initial_positions(places.len(), width, height, rng);
        tracing::debug!(
            nodes = places.len(),
            edges = edges.len(),
            k,
            iterations = self.iterations,
            "running force simulation"
        );
        for _ in 0..self.iterations {
            self.step(&mut positions, &edges, width, height, k);
        }
        positions
    }

    pub fn initial_positions<R: Rng>(
        &self,
        count: usize,
        width: f64,
        height: f64,
        rng: &mut R,
    ) -> Vec<NodePosition> {
        let span_x = width - 2.0 * self.padding;
        let span_y = height - 2.0 * self.padding;
        (0..count)
            .map(|_| {
                let x = self.padding + rng.random::<f64>() * span_x;
                let y = self.padding + rng.random::<f64>() * span_y;
                NodePosition::new(
                    clamp_axis(x, self.padding, width),
                    clamp_axis(y, self.padding, height),
                )
            })
            .collect()
    }

    /// One damped-Euler iteration over `positions`. `edges` index into it.
    pub fn step(
        &self,
        positions: &mut [NodePosition],
        edges: &[(usize, usize)],
        width: f64,
        height: f64,
        k: f64,
    ) {
        let repulsion = k * k;
        let attraction = k;
        let mut forces = vec![(0.0_f64, 0.0_f64); positions.len()];

        for i in 0..positions.len() {
            for j in (i + 1)..positions.len() {
                let dx = positions[j].x - positions[i].x;
                let dy = positions[j].y - positions[i].y;
                let dist = nonzero_distance(dx, dy);
                let force = repulsion / dist;
                let fx = dx / dist * force;
                let fy = dy / dist * force;
                forces[i].0 -= fx;
                forces[i].1 -= fy;
                forces[j].0 += fx;
                forces[j].1 += fy;
            }
        }

        for &(a, b) in edges {
            let dx = positions[b].x - positions[a].x;
            let dy = positions[b].y - positions[a].y;
            let dist = nonzero_distance(dx, dy);
            let force = (dist / k) * attraction;
            let fx = dx / dist * force;
            let fy = dy / dist * force;
            forces[a].0 += fx;
            forces[a].1 += fy;
            forces[b].0 -= fx;
            forces[b].1 -= fy;
        }

        for (pos, (fx, fy)) in positions.iter_mut().zip(forces) {
            pos.x = clamp_axis(pos.x + fx * self.damping, self.padding, width);
            pos.y = clamp_axis(pos.y + fy * self.damping, self.padding, height);
        }
    }
}

pub fn ideal_edge_length(width: f64, height: f64, count: usize) -> f64 {
    (width * height / count.max(1) as f64).sqrt()
}

/// Maps roads to index pairs; roads touching an unknown place are dropped.
fn resolve_edges(places: &[Place], roads: &[Road]) -> Vec<(usize, usize)> {
    let index: HashMap<&str, usize> = places
        .iter()
        .enumerate()
        .map(|(idx, place)| (place.name.as_str(), idx))
        .collect();
    roads
        .iter()
        .filter_map(|road| {
            let from = *index.get(road.from.as_str())?;
            let to = *index.get(road.to.as_str())?;
            Some((from, to))
        })
        .collect()
}

fn nonzero_distance(dx: f64, dy: f64) -> f64 {
    let dist = (dx * dx + dy * dy).sqrt();
    if dist == 0.0 || dist.is_nan() { 1.0 } else { dist }
}

// Upper bound first so a viewport narrower than twice the padding pins to
// `padding` instead of panicking like `f64::clamp` would.
fn clamp_axis(value: f64, padding: f64, dim: f64) -> f64 {
    value.min(dim - padding).max(padding)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn sim() -> ForceSimulator {
        ForceSimulator::new(&LayoutConfig::default())
    }

    fn places(names: &[&str]) -> Vec<Place> {
        names.iter().map(|n| Place::new(*n)).collect()
    }

    fn assert_in_bounds(positions: &[NodePosition], width: f64, height: f64) {
        for pos in positions {
            assert!(pos.x >= 40.0 && pos.x <= width - 40.0, "x out of bounds: {pos:?}");
            assert!(pos.y >= 40.0 && pos.y <= height - 40.0, "y out of bounds: {pos:?}");
        }
    }

    #[test]
    fn positions_stay_inside_padding() {
        let names: Vec<String> = (0..20).map(|i| format!("N{i}")).collect();
        let places: Vec<Place> = names.iter().map(Place::new).collect();
        let roads: Vec<Road> = (0..19)
            .map(|i| Road::new(names[i].clone(), names[i + 1].clone(), 1.0))
            .collect();
        for seed in 0..16 {
            let mut rng = StdRng::seed_from_u64(seed);
            let out = sim().run(&places, &roads, 640.0, 480.0, &mut rng);
            assert_eq!(out.len(), 20);
            assert_in_bounds(&out, 640.0, 480.0);
        }
    }

    #[test]
    fn same_seed_same_layout() {
        let places = places(&["A", "B", "C"]);
        let roads = vec![Road::new("A", "B", 4.0), Road::new("B", "C", 2.0)];
        let a = sim().run(&places, &roads, 800.0, 600.0, &mut StdRng::seed_from_u64(42));
        let b = sim().run(&places, &roads, 800.0, 600.0, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn unconnected_pair_is_pushed_to_the_walls() {
        let mut positions = vec![NodePosition::new(100.0, 100.0), NodePosition::new(110.0, 100.0)];
        let k = ideal_edge_length(800.0, 600.0, 2);
        sim().step(&mut positions, &[], 800.0, 600.0, k);
        assert_eq!(positions[0].x, 40.0);
        assert_eq!(positions[1].x, 760.0);
        assert_eq!(positions[0].y, 100.0);
    }

    #[test]
    fn connected_pair_is_pulled_together() {
        let mut positions = vec![NodePosition::new(100.0, 300.0), NodePosition::new(700.0, 300.0)];
        let k = ideal_edge_length(800.0, 600.0, 2);
        sim().step(&mut positions, &[(0, 1)], 800.0, 600.0, k);
        // repulsion k²/600 = 400, attraction 600, net 200 damped by 0.9
        assert!((positions[0].x - 280.0).abs() < 1e-9);
        assert!((positions[1].x - 520.0).abs() < 1e-9);
    }

    #[test]
    fn coincident_nodes_do_not_divide_by_zero() {
        let mut positions = vec![NodePosition::new(200.0, 200.0); 3];
        let k = ideal_edge_length(800.0, 600.0, 3);
        sim().step(&mut positions, &[(0, 1), (1, 1)], 800.0, 600.0, k);
        for pos in &positions {
            assert!(pos.x.is_finite() && pos.y.is_finite());
        }
    }

    #[test]
    fn roads_to_unknown_places_are_ignored() {
        let places = places(&["A", "B"]);
        let roads = vec![Road::new("A", "Nowhere", 1.0), Road::new("B", "A", 1.0)];
        assert_eq!(resolve_edges(&places, &roads), vec![(1, 0)]);
    }

    #[test]
    fn narrow_viewport_pins_to_padding() {
        let mut rng = StdRng::seed_from_u64(5);
        let out = sim().run(&places(&["A", "B"]), &[], 50.0, 50.0, &mut rng);
        for pos in out {
            assert_eq!(pos, NodePosition::new(40.0, 40.0));
        }
    }
}
