//! Verse references, the book catalog and deep links.

pub mod deeplink;
pub mod reference;

pub use deeplink::{DeepLinkError, DeepLinkParser};
pub use reference::{Book, BookCatalog, Testament, VerseReference};
