//! Chat history export/import and clipboard transcripts.

pub mod archive;
pub mod model;

pub use archive::{
	ConversationArchive, EXPORT_VERSION, ExportDocument, ImportSummary, TransferError,
	export_file_name, transcript,
};
pub use model::{ChatMessage, Conversation, MessageRole};
