//! Positions for a freshly built graph.
//!
//! Rings first (center at the origin, BFS depth `d` on radius `d * spacing`),
//! then an optional force-directed pass that untangles crossings. The renderer
//! treats the result as fixed input.

use std::collections::HashMap;
use std::f64::consts::PI;

use force_graph::{EdgeData, ForceGraph, NodeData, SimulationParameters};
use log::debug;

use super::types::{CrossReferenceGraph, Position};

const STEP_DT: f32 = 0.016;

/// Layout tuning taken from the explorer config.
#[derive(Clone, Copy, Debug)]
pub struct LayoutParams {
	/// Radius step between rings.
	pub ring_spacing: f64,
	/// Simulation ticks after the ring pass.
	pub relax_steps: u32,
}

/// `levels[d]` holds the keys first reached at depth `d`; `levels[0]` is the center.
pub fn ring_layout(levels: &[Vec<String>], ring_spacing: f64) -> HashMap<String, Position> {
	let mut positions = HashMap::new();
	for (depth, ring) in levels.iter().enumerate() {
		if depth == 0 {
			for key in ring {
				positions.insert(key.clone(), Position::ORIGIN);
			}
			continue;
		}
		let radius = depth as f64 * ring_spacing;
		// Stagger alternate rings so spokes don't line up.
		let phase = -PI / 2.0 + if depth % 2 == 0 { PI / ring.len() as f64 } else { 0.0 };
		for (i, key) in ring.iter().enumerate() {
			let angle = phase + (i as f64) * 2.0 * PI / ring.len() as f64;
			positions.insert(
				key.clone(),
				Position::new(radius * angle.cos(), radius * angle.sin()),
			);
		}
	}
	positions
}

/// Runs `steps` simulation ticks over the graph's current positions with the
/// center pinned. Nodes are seeded in `levels` order so the same graph always
/// settles the same way. Nodes that end up non-finite keep their ring position.
pub fn relax(graph: &mut CrossReferenceGraph, levels: &[Vec<String>], steps: u32) {
	if steps == 0 || graph.node_count() < 2 {
		return;
	}
	let mut sim: ForceGraph<String, ()> = ForceGraph::new(SimulationParameters {
		force_charge: 150.0,
		force_spring: 0.05,
		force_max: 100.0,
		node_speed: 3000.0,
		damping_factor: 0.9,
	});

	let mut order: Vec<&str> = levels.iter().flatten().map(String::as_str).collect();
	let mut unleveled: Vec<&str> = graph
		.nodes()
		.map(|n| n.key.as_str())
		.filter(|k| !order.contains(k))
		.collect();
	unleveled.sort_unstable();
	order.extend(unleveled);

	let mut key_to_idx = HashMap::new();
	for node in order.into_iter().filter_map(|k| graph.node(k)) {
		if key_to_idx.contains_key(&node.key) {
			continue;
		}
		let idx = sim.add_node(NodeData {
			x: node.position.x as f32,
			y: node.position.y as f32,
			mass: 10.0,
			is_anchor: node.key == graph.center,
			user_data: node.key.clone(),
		});
		key_to_idx.insert(node.key.clone(), idx);
	}
	for c in graph.connections() {
		if let (Some(&src), Some(&tgt)) = (key_to_idx.get(&c.source), key_to_idx.get(&c.target)) {
			sim.add_edge(src, tgt, EdgeData::default());
		}
	}

	for _ in 0..steps {
		sim.update(STEP_DT);
	}

	let mut settled = Vec::with_capacity(graph.node_count());
	sim.visit_nodes(|node| {
		let (x, y) = (node.x() as f64, node.y() as f64);
		if x.is_finite() && y.is_finite() {
			settled.push((node.data.user_data.clone(), Position::new(x, y)));
		}
	});
	debug!("relaxed {} of {} nodes", settled.len(), graph.node_count());
	for (key, position) in settled {
		if key == graph.center {
			continue;
		}
		if let Some(node) = graph.node_mut(&key) {
			node.position = position;
		}
	}
}

/// Ring layout followed by relaxation, written into the graph's nodes.
pub fn apply(graph: &mut CrossReferenceGraph, levels: &[Vec<String>], params: LayoutParams) {
	for (key, position) in ring_layout(levels, params.ring_spacing) {
		if let Some(node) = graph.node_mut(&key) {
			node.position = position;
		}
	}
	relax(graph, levels, params.relax_steps);
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::cross_reference::types::{
		ConnectionStrength, ConnectionType, VerseConnection, VerseNode,
	};
	use crate::scripture::VerseReference;

	fn levels() -> Vec<Vec<String>> {
		vec![
			vec!["John 3:16".into()],
			vec!["Romans 5:8".into(), "1 John 4:9".into(), "Genesis 22:2".into()],
			vec!["Romans 8:32".into()],
		]
	}

	fn graph() -> CrossReferenceGraph {
		let mut g = CrossReferenceGraph::new("John 3:16");
		for ring in levels() {
			for key in ring {
				let r = VerseReference::parse_key(&key, "engKJV").unwrap();
				g.insert_node(VerseNode::from_reference(&r, Position::ORIGIN).unwrap());
			}
		}
		for (s, t) in [
			("John 3:16", "Romans 5:8"),
			("John 3:16", "1 John 4:9"),
			("John 3:16", "Genesis 22:2"),
			("Romans 5:8", "Romans 8:32"),
		] {
			g.connect(VerseConnection {
				source: s.into(),
				target: t.into(),
				kind: ConnectionType::ThematicLink,
				strength: ConnectionStrength::Weak,
			})
			.unwrap();
		}
		g
	}

	#[test]
	fn rings_sit_at_depth_times_spacing() {
		let positions = ring_layout(&levels(), 100.0);
		assert_eq!(positions["John 3:16"], Position::ORIGIN);
		for key in ["Romans 5:8", "1 John 4:9", "Genesis 22:2"] {
			let p = positions[key];
			assert!(((p.x * p.x + p.y * p.y).sqrt() - 100.0).abs() < 1e-9);
		}
		let p = positions["Romans 8:32"];
		assert!(((p.x * p.x + p.y * p.y).sqrt() - 200.0).abs() < 1e-9);
	}

	#[test]
	fn ring_members_are_distinct() {
		let positions = ring_layout(&levels(), 100.0);
		let a = positions["Romans 5:8"];
		let b = positions["1 John 4:9"];
		assert!((a.x - b.x).abs() + (a.y - b.y).abs() > 1.0);
	}

	#[test]
	fn zero_steps_keeps_rings() {
		let mut g = graph();
		apply(
			&mut g,
			&levels(),
			LayoutParams {
				ring_spacing: 120.0,
				relax_steps: 0,
			},
		);
		let p = g.node("Romans 8:32").unwrap().position;
		assert!(((p.x * p.x + p.y * p.y).sqrt() - 240.0).abs() < 1e-9);
	}

	#[test]
	fn relax_pins_center_and_stays_finite() {
		let mut g = graph();
		apply(
			&mut g,
			&levels(),
			LayoutParams {
				ring_spacing: 120.0,
				relax_steps: 60,
			},
		);
		assert_eq!(g.center_node().unwrap().position, Position::ORIGIN);
		for node in g.nodes() {
			assert!(node.position.x.is_finite() && node.position.y.is_finite());
		}
	}

	#[test]
	fn relaxation_is_repeatable() {
		let params = LayoutParams {
			ring_spacing: 120.0,
			relax_steps: 60,
		};
		let mut first = graph();
		apply(&mut first, &levels(), params);
		for _ in 0..5 {
			let mut again = graph();
			apply(&mut again, &levels(), params);
			for node in first.nodes() {
				assert_eq!(again.node(&node.key).unwrap().position, node.position);
			}
		}
	}
}
