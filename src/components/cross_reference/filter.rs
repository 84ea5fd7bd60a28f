use std::collections::BTreeSet;

use super::types::{ConnectionType, CrossReferenceGraph};

/// Connection types currently shown. Starts with every type visible.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectionFilter {
	visible: BTreeSet<ConnectionType>,
}

impl Default for ConnectionFilter {
	fn default() -> Self {
		Self {
			visible: ConnectionType::ALL.into_iter().collect(),
		}
	}
}

impl ConnectionFilter {
	/// Adds `kind` if hidden, removes it if shown. Returns the new visibility.
	pub fn toggle(&mut self, kind: ConnectionType) -> bool {
		if !self.visible.remove(&kind) {
			self.visible.insert(kind);
			true
		} else {
			false
		}
	}

	/// Whether connections of `kind` are drawn.
	pub fn is_visible(&self, kind: ConnectionType) -> bool {
		self.visible.contains(&kind)
	}

	/// The visible set.
	pub fn visible(&self) -> &BTreeSet<ConnectionType> {
		&self.visible
	}

	/// Indices into `graph.connections()` that pass the filter, in graph order.
	pub fn apply(&self, graph: &CrossReferenceGraph) -> Vec<usize> {
		graph
			.connections()
			.iter()
			.enumerate()
			.filter(|(_, c)| self.is_visible(c.kind))
			.map(|(i, _)| i)
			.collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::cross_reference::types::{
		ConnectionStrength, Position, VerseConnection, VerseNode,
	};
	use crate::scripture::VerseReference;

	#[test]
	fn toggle_twice_restores_set() {
		for kind in ConnectionType::ALL {
			let mut filter = ConnectionFilter::default();
			let before = filter.clone();
			assert!(!filter.toggle(kind));
			assert!(!filter.is_visible(kind));
			assert!(filter.toggle(kind));
			assert_eq!(filter, before);
		}
	}

	#[test]
	fn toggle_sequences_are_involutions() {
		let mut filter = ConnectionFilter::default();
		filter.toggle(ConnectionType::Allusion);
		let before = filter.clone();
		let seq = [
			ConnectionType::ThematicLink,
			ConnectionType::Allusion,
			ConnectionType::ThematicLink,
			ConnectionType::Prophecy,
			ConnectionType::Allusion,
			ConnectionType::Prophecy,
		];
		for kind in seq {
			filter.toggle(kind);
		}
		assert_eq!(filter, before);
	}

	#[test]
	fn apply_keeps_graph_order_and_leaves_graph_alone() {
		let mut graph = CrossReferenceGraph::new("John 3:16");
		for (book, c, v) in [("John", 3, 16), ("Romans", 5, 8), ("Genesis", 22, 2)] {
			graph.insert_node(
				VerseNode::from_reference(
					&VerseReference::new("engKJV", book, c, v),
					Position::ORIGIN,
				)
				.unwrap(),
			);
		}
		for (target, kind) in [
			("Romans 5:8", ConnectionType::ThematicLink),
			("Genesis 22:2", ConnectionType::Parallel),
		] {
			graph
				.connect(VerseConnection {
					source: "John 3:16".into(),
					target: target.into(),
					kind,
					strength: ConnectionStrength::Medium,
				})
				.unwrap();
		}

		let mut filter = ConnectionFilter::default();
		assert_eq!(filter.apply(&graph), vec![0, 1]);
		filter.toggle(ConnectionType::ThematicLink);
		assert_eq!(filter.apply(&graph), vec![1]);
		assert_eq!(graph.connections().len(), 2);
	}
}
