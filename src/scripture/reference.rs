//! Books and verse references.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Old/New Testament classification of a book.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Testament {
	/// Genesis through Malachi.
	Old,
	/// Matthew through Revelation.
	New,
}

impl Testament {
	/// Display name.
	pub fn label(self) -> &'static str {
		match self {
			Testament::Old => "Old Testament",
			Testament::New => "New Testament",
		}
	}
}

const OLD_TESTAMENT: &[&str] = &[
	"Genesis", "Exodus", "Leviticus", "Numbers", "Deuteronomy", "Joshua", "Judges", "Ruth",
	"1 Samuel", "2 Samuel", "1 Kings", "2 Kings", "1 Chronicles", "2 Chronicles", "Ezra",
	"Nehemiah", "Esther", "Job", "Psalms", "Proverbs", "Ecclesiastes", "Song of Solomon",
	"Isaiah", "Jeremiah", "Lamentations", "Ezekiel", "Daniel", "Hosea", "Joel", "Amos",
	"Obadiah", "Jonah", "Micah", "Nahum", "Habakkuk", "Zephaniah", "Haggai", "Zechariah",
	"Malachi",
];

const NEW_TESTAMENT: &[&str] = &[
	"Matthew", "Mark", "Luke", "John", "Acts", "Romans", "1 Corinthians", "2 Corinthians",
	"Galatians", "Ephesians", "Philippians", "Colossians", "1 Thessalonians",
	"2 Thessalonians", "1 Timothy", "2 Timothy", "Titus", "Philemon", "Hebrews", "James",
	"1 Peter", "2 Peter", "1 John", "2 John", "3 John", "Jude", "Revelation",
];

/// A canonical book entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Book {
	/// Canonical name, e.g. `"1 John"`.
	pub name: &'static str,
	/// Which testament the book belongs to.
	pub testament: Testament,
}

/// The 66-book Protestant canon, in canon order.
pub struct BookCatalog;

impl BookCatalog {
	/// All books in canon order.
	pub fn books() -> impl Iterator<Item = Book> {
		OLD_TESTAMENT
			.iter()
			.map(|&name| Book {
				name,
				testament: Testament::Old,
			})
			.chain(NEW_TESTAMENT.iter().map(|&name| Book {
				name,
				testament: Testament::New,
			}))
	}

	/// Case-insensitive lookup. Collapses runs of whitespace so "1  john" matches.
	pub fn lookup(name: &str) -> Option<Book> {
		let wanted = name.split_whitespace().collect::<Vec<_>>().join(" ");
		if wanted.is_empty() {
			return None;
		}
		Self::books().find(|b| b.name.eq_ignore_ascii_case(&wanted))
	}

	/// Testament of the named book, if it is in the catalog.
	pub fn testament_of(name: &str) -> Option<Testament> {
		Self::lookup(name).map(|b| b.testament)
	}
}

/// (translation, book, chapter, verse) identifying a single verse.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VerseReference {
	/// Translation id, e.g. `"engKJV"`.
	pub translation: String,
	/// Book name, canonical once it has been through [`BookCatalog::lookup`].
	pub book: String,
	/// Chapter number, from 1.
	pub chapter: u32,
	/// Verse number, from 1.
	pub verse: u32,
}

impl VerseReference {
	/// Reference as given. Nothing is validated here.
	pub fn new(
		translation: impl Into<String>,
		book: impl Into<String>,
		chapter: u32,
		verse: u32,
	) -> Self {
		Self {
			translation: translation.into(),
			book: book.into(),
			chapter,
			verse,
		}
	}

	/// Translation-free key, unique per verse within a graph: `"John 3:16"`.
	pub fn key(&self) -> String {
		format!("{} {}:{}", self.book, self.chapter, self.verse)
	}

	/// `None` when the book is not in the catalog.
	pub fn testament(&self) -> Option<Testament> {
		BookCatalog::testament_of(&self.book)
	}

	/// Parses a key produced by [`VerseReference::key`]. The book may contain
	/// spaces and leading digits, so the split happens on the last space.
	pub fn parse_key(key: &str, translation: &str) -> Option<Self> {
		let (book, location) = key.trim().rsplit_once(' ')?;
		let (chapter, verse) = location.split_once(':')?;
		let book = BookCatalog::lookup(book)?;
		Some(Self::new(
			translation,
			book.name,
			chapter.parse().ok()?,
			verse.parse().ok()?,
		))
	}

	/// Same verse in the same translation, different location.
	pub fn sibling(&self, book: &str, chapter: u32, verse: u32) -> Self {
		Self::new(self.translation.clone(), book, chapter, verse)
	}
}

impl fmt::Display for VerseReference {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} {}:{}", self.book, self.chapter, self.verse)
	}
}
