// Spring layout for the co-occurrence network.
//
// Fruchterman–Reingold: every pair of nodes repels, every edge attracts in
// proportion to its weight, and a cooling temperature caps how far a node
// moves per iteration. Initial positions come from a seeded RNG so the same
// graph always lands in the same place.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use super::network::CooccurrenceGraph;

/// Spring layout parameters.
#[derive(Debug, Clone)]
pub struct LayoutOptions {
    pub seed: u64,
    pub iterations: usize,
    /// Optimal node distance; `1/sqrt(n)` when unset
    pub k: Option<f64>,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            seed: 42,
            iterations: 50,
            k: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodePosition {
    pub token: String,
    pub x: f64,
    pub y: f64,
}

/// Lay out a graph; positions are centered and scaled into [-1, 1].
pub fn spring_layout(graph: &CooccurrenceGraph, options: &LayoutOptions) -> Vec<NodePosition> {
    let n = graph.nodes.len();
    if n == 0 {
        return Vec::new();
    }

    let index: HashMap<&str, usize> = graph
        .nodes
        .iter()
        .enumerate()
        .map(|(i, node)| (node.token.as_str(), i))
        .collect();

    let mut adjacency = vec![vec![0.0f64; n]; n];
    for edge in &graph.edges {
        if let (Some(&a), Some(&b)) = (index.get(edge.source.as_str()), index.get(edge.target.as_str())) {
            adjacency[a][b] = edge.weight as f64;
            adjacency[b][a] = edge.weight as f64;
        }
    }

    let mut rng = StdRng::seed_from_u64(options.seed);
    let mut pos: Vec<[f64; 2]> = (0..n).map(|_| [rng.random::<f64>(), rng.random::<f64>()]).collect();

    let k = options.k.unwrap_or_else(|| (1.0 / n as f64).sqrt());

    // Initial temperature: a tenth of the layout's extent
    let extent = (0..2)
        .map(|d| {
            let (lo, hi) = pos
                .iter()
                .fold((f64::MAX, f64::MIN), |(lo, hi), p| (lo.min(p[d]), hi.max(p[d])));
            hi - lo
        })
        .fold(0.0f64, f64::max);
    let mut temperature = extent * 0.1;
    let cooling = temperature / (options.iterations as f64 + 1.0);

    for _ in 0..options.iterations {
        let mut displacement = vec![[0.0f64; 2]; n];

        for i in 0..n {
            for j in 0..n {
                if i == j {
                    continue;
                }
                let dx = pos[i][0] - pos[j][0];
                let dy = pos[i][1] - pos[j][1];
                let distance = (dx * dx + dy * dy).sqrt().max(0.01);
                // repulsion k²/d minus weighted attraction A·d²/k, along the unit vector
                let force = k * k / (distance * distance) - adjacency[i][j] * distance / k;
                displacement[i][0] += dx * force;
                displacement[i][1] += dy * force;
            }
        }

        for (p, d) in pos.iter_mut().zip(&displacement) {
            let length = (d[0] * d[0] + d[1] * d[1]).sqrt();
            let length = if length < 0.01 { 0.1 } else { length };
            p[0] += d[0] * temperature / length;
            p[1] += d[1] * temperature / length;
        }

        temperature -= cooling;
    }

    rescale(&mut pos);

    graph
        .nodes
        .iter()
        .zip(pos)
        .map(|(node, [x, y])| NodePosition {
            token: node.token.clone(),
            x,
            y,
        })
        .collect()
}

/// Center on the mean and scale so the largest coordinate is 1.
fn rescale(pos: &mut [[f64; 2]]) {
    let n = pos.len() as f64;
    for d in 0..2 {
        let mean = pos.iter().map(|p| p[d]).sum::<f64>() / n;
        for p in pos.iter_mut() {
            p[d] -= mean;
        }
    }

    let lim = pos
        .iter()
        .flat_map(|p| [p[0].abs(), p[1].abs()])
        .fold(0.0f64, f64::max);
    if lim > 0.0 {
        for p in pos.iter_mut() {
            p[0] /= lim;
            p[1] /= lim;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::network::{FrequencyBand, GraphEdge, GraphNode};

    fn triangle() -> CooccurrenceGraph {
        let node = |token: &str| GraphNode {
            token: token.to_string(),
            frequency: 3,
            degree: 2,
            band: FrequencyBand::Low,
        };
        let edge = |a: &str, b: &str| GraphEdge {
            source: a.to_string(),
            target: b.to_string(),
            weight: 1,
        };
        CooccurrenceGraph {
            threshold: 1,
            band_cutoffs: (3.0, 3.0),
            nodes: vec![node("a"), node("b"), node("c")],
            edges: vec![edge("a", "b"), edge("b", "c"), edge("a", "c")],
        }
    }

    #[test]
    fn test_layout_is_reproducible() {
        let graph = triangle();
        let options = LayoutOptions::default();
        assert_eq!(spring_layout(&graph, &options), spring_layout(&graph, &options));
    }

    #[test]
    fn test_layout_within_unit_box() {
        let positions = spring_layout(&triangle(), &LayoutOptions::default());
        assert_eq!(positions.len(), 3);
        for p in &positions {
            assert!(p.x.abs() <= 1.0 + 1e-9 && p.y.abs() <= 1.0 + 1e-9);
        }
    }

    #[test]
    fn test_different_seed_moves_nodes() {
        let graph = triangle();
        let a = spring_layout(&graph, &LayoutOptions::default());
        let b = spring_layout(
            &graph,
            &LayoutOptions {
                seed: 7,
                ..Default::default()
            },
        );
        assert_ne!(a, b);
    }
}
