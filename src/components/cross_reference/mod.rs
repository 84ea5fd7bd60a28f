//! Canvas explorer for the cross-reference graph of one verse, plus the
//! graph model and sources it draws from.

mod component;
mod filter;
mod layout;
mod render;
mod source;
mod state;
mod types;

pub use component::CrossReferenceExplorer;
pub use filter::ConnectionFilter;
pub use source::{
	BuildError, CrossReferenceEntry, GraphSource, InMemoryCrossReferences, sample_cross_references,
};
pub use types::{
	ConnectionStrength, ConnectionType, CrossReferenceGraph, GraphError, Position,
	VerseConnection, VerseNode,
};
