//! Export/import of conversation history.
//!
//! The export is a single JSON document:
//!
//! ```json
//! { "version": 1, "exported_at": "...", "conversations": [ ... ] }
//! ```
//!
//! Import skips any conversation whose `id` is already present, including
//! repeats inside the imported document itself.

use std::collections::HashSet;
use std::fmt::Write as _;

use chrono::{DateTime, NaiveDate, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::model::Conversation;

/// Format version written by [`ConversationArchive::export_json`].
pub const EXPORT_VERSION: u32 = 1;

/// Import/export failures.
#[derive(Error, Debug)]
pub enum TransferError {
	/// Not a valid export document.
	#[error("Could not read conversation file: {0}")]
	Parse(#[from] serde_json::Error),

	/// Written by an incompatible version.
	#[error("Unsupported export version {found}")]
	Version {
		/// Version found in the document.
		found: u32,
	},
}

/// On-disk export format.
#[derive(Debug, Serialize, Deserialize)]
pub struct ExportDocument {
	/// Always [`EXPORT_VERSION`] when written.
	pub version: u32,
	/// When the export was made.
	pub exported_at: DateTime<Utc>,
	/// Every conversation in the archive.
	pub conversations: Vec<Conversation>,
}

/// Outcome of an import.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ImportSummary {
	/// Conversations added.
	pub imported: usize,
	/// Conversations whose id was already present.
	pub skipped: usize,
}

/// The user's conversation history.
#[derive(Clone, Debug, Default)]
pub struct ConversationArchive {
	conversations: Vec<Conversation>,
}

impl ConversationArchive {
	/// Archive holding `conversations` as given.
	pub fn new(conversations: Vec<Conversation>) -> Self {
		Self { conversations }
	}

	/// Conversations in insertion order.
	pub fn conversations(&self) -> &[Conversation] {
		&self.conversations
	}

	/// Number of conversations.
	pub fn len(&self) -> usize {
		self.conversations.len()
	}

	/// No conversations.
	pub fn is_empty(&self) -> bool {
		self.conversations.is_empty()
	}

	/// Conversation by id.
	pub fn get(&self, id: uuid::Uuid) -> Option<&Conversation> {
		self.conversations.iter().find(|c| c.id == id)
	}

	/// Pretty-printed export document.
	pub fn export_json(&self, exported_at: DateTime<Utc>) -> Result<String, TransferError> {
		let doc = ExportDocument {
			version: EXPORT_VERSION,
			exported_at,
			conversations: self.conversations.clone(),
		};
		Ok(serde_json::to_string_pretty(&doc)?)
	}

	/// Merges an exported document. Nothing is added if the document is
	/// invalid.
	pub fn import_json(&mut self, text: &str) -> Result<ImportSummary, TransferError> {
		let doc: ExportDocument = serde_json::from_str(text)?;
		if doc.version != EXPORT_VERSION {
			warn!("rejecting conversation import with version {}", doc.version);
			return Err(TransferError::Version { found: doc.version });
		}

		let mut known: HashSet<_> = self.conversations.iter().map(|c| c.id).collect();
		let mut summary = ImportSummary::default();
		for conversation in doc.conversations {
			if known.insert(conversation.id) {
				self.conversations.push(conversation);
				summary.imported += 1;
			} else {
				summary.skipped += 1;
			}
		}
		info!(
			"imported {} conversations, skipped {} duplicates",
			summary.imported, summary.skipped
		);
		Ok(summary)
	}
}

/// Suggested file name for an export made on `date`.
pub fn export_file_name(date: NaiveDate) -> String {
	format!("conversations-{}.json", date.format("%Y-%m-%d"))
}

/// Plain-text rendering of one conversation for the clipboard.
pub fn transcript(conversation: &Conversation) -> String {
	let mut out = String::new();
	let _ = writeln!(out, "{}", conversation.title);
	let _ = writeln!(
		out,
		"Started {}",
		conversation.created_at.format("%Y-%m-%d %H:%M UTC")
	);
	for message in &conversation.messages {
		let _ = write!(
			out,
			"\n{} ({}):\n{}\n",
			message.role.label(),
			message.timestamp.format("%H:%M"),
			message.content.trim_end()
		);
	}
	out
}
