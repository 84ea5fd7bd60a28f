use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::scripture::{Testament, VerseReference};

/// Graph construction errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum GraphError {
	/// A connection names a key with no node.
	#[error("Connection endpoint {0} is not a node in this graph")]
	DanglingEndpoint(String),
}

/// Layout coordinates, center verse at the origin.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
	/// Rightward.
	pub x: f64,
	/// Downward, as on the canvas.
	pub y: f64,
}

impl Position {
	/// Where the center verse sits.
	pub const ORIGIN: Position = Position { x: 0.0, y: 0.0 };

	/// Position at `(x, y)`.
	pub fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}
}

/// How two verses relate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ConnectionType {
	/// One passage quotes the other.
	DirectQuote,
	/// Prophecy and its fulfillment.
	Prophecy,
	/// The same event or saying told twice.
	Parallel,
	/// Indirect reference.
	Allusion,
	/// Shared theme only. Drawn dashed.
	ThematicLink,
}

impl ConnectionType {
	/// Every type, in filter-chip order.
	pub const ALL: [ConnectionType; 5] = [
		ConnectionType::DirectQuote,
		ConnectionType::Prophecy,
		ConnectionType::Parallel,
		ConnectionType::Allusion,
		ConnectionType::ThematicLink,
	];

	/// Chip and details-panel text.
	pub fn label(self) -> &'static str {
		match self {
			ConnectionType::DirectQuote => "Quotation",
			ConnectionType::Prophecy => "Prophecy",
			ConnectionType::Parallel => "Parallel",
			ConnectionType::Allusion => "Allusion",
			ConnectionType::ThematicLink => "Thematic",
		}
	}

	/// Thematic links are drawn dashed, everything else solid.
	pub fn is_dashed(self) -> bool {
		self == ConnectionType::ThematicLink
	}

	/// CSS hex color for lines and chips.
	pub fn color(self) -> &'static str {
		match self {
			ConnectionType::DirectQuote => "#e07a5f",
			ConnectionType::Prophecy => "#9d79bc",
			ConnectionType::Parallel => "#3d9970",
			ConnectionType::Allusion => "#f2cc8f",
			ConnectionType::ThematicLink => "#81b1d9",
		}
	}
}

/// Visual prominence of a connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ConnectionStrength {
	/// Thin and faint.
	Weak,
	/// Default weight.
	Medium,
	/// Thick and nearly opaque.
	Strong,
}

impl ConnectionStrength {
	/// Stroke width in pixels at zoom 1.
	pub fn line_width(self) -> f64 {
		match self {
			ConnectionStrength::Weak => 1.0,
			ConnectionStrength::Medium => 2.0,
			ConnectionStrength::Strong => 3.0,
		}
	}

	/// Stroke alpha.
	pub fn opacity(self) -> f64 {
		match self {
			ConnectionStrength::Weak => 0.35,
			ConnectionStrength::Medium => 0.6,
			ConnectionStrength::Strong => 0.9,
		}
	}
}

/// One verse in a snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VerseNode {
	/// Unique display key, e.g. `"John 3:16"`.
	pub key: String,
	/// Canonical book name.
	pub book: String,
	/// Chapter number, from 1.
	pub chapter: u32,
	/// Verse number, from 1.
	pub verse: u32,
	/// Derived from the book; drives the node color.
	pub testament: Testament,
	/// Layout position, fixed once the snapshot is built.
	pub position: Position,
}

impl VerseNode {
	/// `None` when the book is not in the catalog.
	pub fn from_reference(reference: &VerseReference, position: Position) -> Option<Self> {
		Some(Self {
			key: reference.key(),
			book: reference.book.clone(),
			chapter: reference.chapter,
			verse: reference.verse,
			testament: reference.testament()?,
			position,
		})
	}
}

/// A typed edge between two node keys.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VerseConnection {
	/// Key of the referencing verse.
	pub source: String,
	/// Key of the referenced verse.
	pub target: String,
	/// Relationship type, the filter key.
	pub kind: ConnectionType,
	/// Line weight.
	pub strength: ConnectionStrength,
}

impl VerseConnection {
	/// Whether `key` is either endpoint.
	pub fn touches(&self, key: &str) -> bool {
		self.source == key || self.target == key
	}

	/// The endpoint opposite `key`, if `key` is one of them.
	pub fn other_end(&self, key: &str) -> Option<&str> {
		if self.source == key {
			Some(&self.target)
		} else if self.target == key {
			Some(&self.source)
		} else {
			None
		}
	}
}

/// One immutable snapshot produced by a graph source.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CrossReferenceGraph {
	/// Key of the verse the graph was built around.
	pub center: String,
	nodes: HashMap<String, VerseNode>,
	connections: Vec<VerseConnection>,
}

impl CrossReferenceGraph {
	/// Empty graph around `center`. Insert the center node yourself.
	pub fn new(center: impl Into<String>) -> Self {
		Self {
			center: center.into(),
			..Default::default()
		}
	}

	/// Inserts or replaces the node under its key.
	pub fn insert_node(&mut self, node: VerseNode) {
		self.nodes.insert(node.key.clone(), node);
	}

	/// Adds an edge. Both endpoints must already be nodes.
	pub fn connect(&mut self, connection: VerseConnection) -> Result<(), GraphError> {
		for end in [&connection.source, &connection.target] {
			if !self.nodes.contains_key(end) {
				return Err(GraphError::DanglingEndpoint(end.clone()));
			}
		}
		self.connections.push(connection);
		Ok(())
	}

	/// No nodes at all, not even the center.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Node by key.
	pub fn node(&self, key: &str) -> Option<&VerseNode> {
		self.nodes.get(key)
	}

	/// Mutable node by key, for layout.
	pub fn node_mut(&mut self, key: &str) -> Option<&mut VerseNode> {
		self.nodes.get_mut(key)
	}

	/// The node under [`CrossReferenceGraph::center`].
	pub fn center_node(&self) -> Option<&VerseNode> {
		self.nodes.get(&self.center)
	}

	/// Nodes in no particular order.
	pub fn nodes(&self) -> impl Iterator<Item = &VerseNode> {
		self.nodes.values()
	}

	/// Number of nodes, center included.
	pub fn node_count(&self) -> usize {
		self.nodes.len()
	}

	/// Connections in insertion order. Indices are stable for the snapshot.
	pub fn connections(&self) -> &[VerseConnection] {
		&self.connections
	}

	/// Keys joined to `key` by any connection, in either direction.
	pub fn neighbors<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
		self.connections.iter().filter_map(move |c| c.other_end(key))
	}

	/// Types present in this snapshot, in declaration order.
	pub fn connection_types(&self) -> BTreeSet<ConnectionType> {
		self.connections.iter().map(|c| c.kind).collect()
	}
}
