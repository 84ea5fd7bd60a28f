//! Where graphs come from.
//!
//! The explorer only sees [`GraphSource`]. [`InMemoryCrossReferences`] is the
//! built-in implementation: a flat table of cross-references walked
//! breadth-first from the requested center.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use log::{debug, warn};
use thiserror::Error;

use super::layout::{self, LayoutParams};
use super::types::{
	ConnectionStrength, ConnectionType, CrossReferenceGraph, GraphError, Position,
	VerseConnection, VerseNode,
};
use crate::config::ExplorerConfig;
use crate::scripture::{BookCatalog, VerseReference};

/// Why a build produced no graph. The explorer shows these as the empty state.
#[derive(Error, Debug)]
pub enum BuildError {
	/// Center (or a table row) names a book outside the catalog.
	#[error("Unknown book: {0}")]
	UnknownBook(String),

	/// The source produced a connection without both endpoints.
	#[error("Inconsistent graph: {0}")]
	Graph(#[from] GraphError),

	/// Backing store could not be reached.
	#[error("Cross-reference source unavailable: {0}")]
	Unavailable(String),
}

/// Builds the graph around a center verse. May suspend while fetching.
#[async_trait]
pub trait GraphSource: Send + Sync {
	/// Snapshot of everything within `depth` hops of `center`, laid out.
	async fn build_graph(
		&self,
		center: &VerseReference,
		depth: u32,
	) -> Result<CrossReferenceGraph, BuildError>;
}

/// One row of the cross-reference table; `from`/`to` are verse keys.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CrossReferenceEntry {
	/// Referencing verse.
	pub from: String,
	/// Referenced verse.
	pub to: String,
	/// Relationship type.
	pub kind: ConnectionType,
	/// Line weight.
	pub strength: ConnectionStrength,
}

impl CrossReferenceEntry {
	/// Row from `from` to `to`. Keys are canonicalized when the table is loaded.
	pub fn new(
		from: &str,
		to: &str,
		kind: ConnectionType,
		strength: ConnectionStrength,
	) -> Self {
		Self {
			from: from.into(),
			to: to.into(),
			kind,
			strength,
		}
	}
}

/// [`GraphSource`] over an in-memory table.
pub struct InMemoryCrossReferences {
	entries: Vec<CrossReferenceEntry>,
	adjacency: HashMap<String, Vec<String>>,
	max_nodes: usize,
	layout: LayoutParams,
}

impl InMemoryCrossReferences {
	/// Entries whose keys don't name a catalog verse are dropped; the rest are
	/// stored with canonical keys.
	pub fn new(entries: Vec<CrossReferenceEntry>, config: &ExplorerConfig) -> Self {
		let mut kept = Vec::with_capacity(entries.len());
		for entry in entries {
			match (canonical_key(&entry.from), canonical_key(&entry.to)) {
				(Some(from), Some(to)) if from != to => kept.push(CrossReferenceEntry {
					from,
					to,
					..entry
				}),
				_ => warn!("dropping cross-reference {} -> {}", entry.from, entry.to),
			}
		}

		let mut adjacency: HashMap<String, Vec<String>> = HashMap::new();
		for entry in &kept {
			adjacency
				.entry(entry.from.clone())
				.or_default()
				.push(entry.to.clone());
			adjacency
				.entry(entry.to.clone())
				.or_default()
				.push(entry.from.clone());
		}

		Self {
			entries: kept,
			adjacency,
			max_nodes: config.max_nodes.max(1),
			layout: LayoutParams {
				ring_spacing: config.ring_spacing,
				relax_steps: config.relax_steps,
			},
		}
	}

	/// Rows kept after canonicalization.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// No usable rows.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Breadth-first walk from `center`, stopping at `depth` hops or the node
	/// cap. Depth 0 yields the center alone.
	pub fn build(
		&self,
		center: &VerseReference,
		depth: u32,
	) -> Result<CrossReferenceGraph, BuildError> {
		let book = BookCatalog::lookup(&center.book)
			.ok_or_else(|| BuildError::UnknownBook(center.book.clone()))?;
		let center = center.sibling(book.name, center.chapter, center.verse);
		let center_key = center.key();

		let mut visited: HashSet<String> = HashSet::from([center_key.clone()]);
		let mut levels = vec![vec![center_key.clone()]];
		for _ in 0..depth {
			let frontier = levels.last().cloned().unwrap_or_default();
			let mut next = Vec::new();
			let mut full = false;
			'frontier: for key in &frontier {
				for neighbor in self.adjacency.get(key).into_iter().flatten() {
					if visited.len() >= self.max_nodes {
						full = true;
						break 'frontier;
					}
					if visited.insert(neighbor.clone()) {
						next.push(neighbor.clone());
					}
				}
			}
			let exhausted = next.is_empty();
			if !exhausted {
				levels.push(next);
			}
			if full || exhausted {
				break;
			}
		}

		let mut graph = CrossReferenceGraph::new(center_key);
		for key in levels.iter().flatten() {
			let node = VerseReference::parse_key(key, &center.translation)
				.and_then(|r| VerseNode::from_reference(&r, Position::ORIGIN))
				.ok_or_else(|| BuildError::UnknownBook(key.clone()))?;
			graph.insert_node(node);
		}

		let mut seen = HashSet::new();
		for entry in &self.entries {
			if !(visited.contains(&entry.from) && visited.contains(&entry.to)) {
				continue;
			}
			if !seen.insert((&entry.from, &entry.to, entry.kind)) {
				continue;
			}
			graph.connect(VerseConnection {
				source: entry.from.clone(),
				target: entry.to.clone(),
				kind: entry.kind,
				strength: entry.strength,
			})?;
		}

		layout::apply(&mut graph, &levels, self.layout);
		debug!(
			"built graph around {} at depth {}: {} nodes, {} connections",
			graph.center,
			depth,
			graph.node_count(),
			graph.connections().len()
		);
		Ok(graph)
	}
}

#[async_trait]
impl GraphSource for InMemoryCrossReferences {
	async fn build_graph(
		&self,
		center: &VerseReference,
		depth: u32,
	) -> Result<CrossReferenceGraph, BuildError> {
		self.build(center, depth)
	}
}

fn canonical_key(key: &str) -> Option<String> {
	VerseReference::parse_key(key, "").map(|r| r.key())
}

/// A small built-in table so the explorer works without a backend.
pub fn sample_cross_references() -> Vec<CrossReferenceEntry> {
	use ConnectionStrength::*;
	use ConnectionType::*;

	[
		("John 3:16", "Romans 5:8", ThematicLink, Strong),
		("John 3:16", "1 John 4:9", Parallel, Strong),
		("John 3:16", "Genesis 22:2", Allusion, Medium),
		("John 3:16", "John 3:14", ThematicLink, Medium),
		("John 3:14", "Numbers 21:9", Allusion, Strong),
		("Romans 5:8", "Romans 8:32", ThematicLink, Medium),
		("Romans 8:32", "Genesis 22:16", Allusion, Medium),
		("Isaiah 53:5", "1 Peter 2:24", DirectQuote, Strong),
		("Isaiah 53:7", "Acts 8:32", DirectQuote, Strong),
		("Isaiah 53:5", "Isaiah 53:7", ThematicLink, Medium),
		("Isaiah 53:5", "Romans 4:25", Allusion, Medium),
		("Isaiah 53:5", "Romans 5:8", ThematicLink, Weak),
		("Genesis 1:1", "John 1:1", Parallel, Strong),
		("Genesis 1:1", "Hebrews 11:3", ThematicLink, Medium),
		("Genesis 1:1", "Psalms 33:6", ThematicLink, Medium),
		("John 1:1", "John 1:14", ThematicLink, Medium),
		("John 1:14", "John 3:16", ThematicLink, Weak),
		("Psalms 23:1", "John 10:11", ThematicLink, Strong),
		("Ezekiel 34:23", "John 10:11", Prophecy, Strong),
		("Isaiah 40:11", "John 10:11", ThematicLink, Medium),
		("Psalms 23:1", "Isaiah 40:11", ThematicLink, Medium),
		("Isaiah 7:14", "Matthew 1:23", DirectQuote, Strong),
		("Micah 5:2", "Matthew 2:6", Prophecy, Strong),
		("Matthew 1:23", "Luke 1:31", Parallel, Medium),
		("Matthew 3:17", "Mark 1:11", Parallel, Strong),
		("Matthew 3:17", "Luke 3:22", Parallel, Strong),
		("Matthew 3:17", "Psalms 2:7", DirectQuote, Medium),
		("Matthew 3:17", "Isaiah 42:1", Allusion, Medium),
		("Isaiah 42:1", "Matthew 12:18", DirectQuote, Strong),
	]
	.into_iter()
	.map(|(from, to, kind, strength)| CrossReferenceEntry::new(from, to, kind, strength))
	.collect()
}
