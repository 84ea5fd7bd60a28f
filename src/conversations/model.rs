//! Conversation history records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who wrote a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
	/// The person using the app.
	User,
	/// The AI assistant.
	Assistant,
}

impl MessageRole {
	/// Speaker name in transcripts.
	pub fn label(self) -> &'static str {
		match self {
			MessageRole::User => "You",
			MessageRole::Assistant => "Assistant",
		}
	}
}

/// One message in a conversation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
	/// Unique per message.
	pub id: Uuid,
	/// Author.
	pub role: MessageRole,
	/// Message text as shown.
	pub content: String,
	/// When it was sent.
	pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
	/// New message with a fresh id.
	pub fn new(role: MessageRole, content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
		Self {
			id: Uuid::new_v4(),
			role,
			content: content.into(),
			timestamp,
		}
	}
}

/// A chat thread with the assistant. `id` is the identity used for dedup on
/// import.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
	/// Stable identity across export and import.
	pub id: Uuid,
	/// Display title.
	pub title: String,
	/// When the thread was started.
	pub created_at: DateTime<Utc>,
	/// Timestamp of the latest message, or `created_at` if none.
	pub updated_at: DateTime<Utc>,
	/// Messages in send order.
	#[serde(default)]
	pub messages: Vec<ChatMessage>,
}

impl Conversation {
	/// Empty conversation with a fresh id.
	pub fn new(title: impl Into<String>, created_at: DateTime<Utc>) -> Self {
		Self {
			id: Uuid::new_v4(),
			title: title.into(),
			created_at,
			updated_at: created_at,
			messages: Vec::new(),
		}
	}

	/// Appends and bumps `updated_at` if the message is newer.
	pub fn push(&mut self, message: ChatMessage) {
		if message.timestamp > self.updated_at {
			self.updated_at = message.timestamp;
		}
		self.messages.push(message);
	}
}
