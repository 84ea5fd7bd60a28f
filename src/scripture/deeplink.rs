//! `app://verse/{book}/{chapter}/{verse}?translation={id}` deep links.
//!
//! Parsing fails closed: anything that is not exactly that shape yields an
//! error and [`DeepLinkParser::handle`] reports `false` without navigating.

use log::debug;
use percent_encoding::percent_decode_str;
use thiserror::Error;
use url::{Url, form_urlencoded};

use super::reference::{BookCatalog, VerseReference};
use crate::config::ExplorerConfig;

const VERSE_HOST: &str = "verse";

/// Why a link was rejected.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DeepLinkError {
	/// Not parseable as a URL at all.
	#[error("Not a URL: {0}")]
	Malformed(String),

	/// Scheme other than the configured one.
	#[error("Unexpected scheme: {0}")]
	Scheme(String),

	/// Host other than `verse`.
	#[error("Unexpected host: {0:?}")]
	Host(Option<String>),

	/// Path is not exactly three segments.
	#[error("Expected book/chapter/verse, got {0} path segments")]
	SegmentCount(usize),

	/// Chapter or verse is not a positive integer.
	#[error("Not a positive number: {0:?}")]
	Number(String),

	/// Book segment does not decode to a catalog book.
	#[error("Unknown book: {0:?}")]
	UnknownBook(String),
}

/// Parses and builds verse deep links for one scheme.
#[derive(Clone, Debug)]
pub struct DeepLinkParser {
	scheme: String,
	default_translation: String,
}

impl DeepLinkParser {
	/// `scheme` is matched case-insensitively.
	pub fn new(scheme: impl Into<String>, default_translation: impl Into<String>) -> Self {
		Self {
			scheme: scheme.into().to_ascii_lowercase(),
			default_translation: default_translation.into(),
		}
	}

	/// Parser for the configured scheme and default translation.
	pub fn from_config(config: &ExplorerConfig) -> Self {
		Self::new(&config.deep_link_scheme, &config.default_translation)
	}

	/// Parses a full `scheme://verse/{book}/{chapter}/{verse}` link.
	pub fn parse(&self, link: &str) -> Result<VerseReference, DeepLinkError> {
		let url = Url::parse(link.trim()).map_err(|e| DeepLinkError::Malformed(e.to_string()))?;
		if url.scheme() != self.scheme {
			return Err(DeepLinkError::Scheme(url.scheme().to_string()));
		}
		match url.host_str() {
			Some(host) if host.eq_ignore_ascii_case(VERSE_HOST) => {}
			other => return Err(DeepLinkError::Host(other.map(str::to_string))),
		}

		let segments: Vec<&str> = url.path_segments().map(Iterator::collect).unwrap_or_default();
		let [book, chapter, verse] = segments.as_slice() else {
			return Err(DeepLinkError::SegmentCount(segments.len()));
		};
		let translation = url
			.query_pairs()
			.find(|(k, _)| k == "translation")
			.map(|(_, v)| v.into_owned());

		self.resolve(book, chapter, verse, translation.as_deref())
	}

	/// Builds a reference from already-split components (router params take
	/// this path). The book may still be percent-encoded. An empty or missing
	/// translation falls back to the default.
	pub fn resolve(
		&self,
		book: &str,
		chapter: &str,
		verse: &str,
		translation: Option<&str>,
	) -> Result<VerseReference, DeepLinkError> {
		let book = decode_segment(book)?;
		let book = BookCatalog::lookup(&book).ok_or(DeepLinkError::UnknownBook(book))?;
		let translation = translation
			.map(str::trim)
			.filter(|t| !t.is_empty())
			.unwrap_or(self.default_translation.as_str());
		Ok(VerseReference::new(
			translation,
			book.name,
			positive(chapter)?,
			positive(verse)?,
		))
	}

	/// Parses `link` and hands the reference to `navigate`. Malformed links are
	/// ignored.
	pub fn handle(&self, link: &str, navigate: impl FnOnce(VerseReference)) -> bool {
		match self.parse(link) {
			Ok(reference) => {
				navigate(reference);
				true
			}
			Err(err) => {
				debug!("ignoring deep link {link:?}: {err}");
				false
			}
		}
	}

	/// Lowercased scheme this parser accepts.
	pub fn scheme(&self) -> &str {
		&self.scheme
	}

	/// Link that [`DeepLinkParser::parse`] maps back to `reference`.
	pub fn to_link(&self, reference: &VerseReference) -> String {
		let translation: String =
			form_urlencoded::byte_serialize(reference.translation.as_bytes()).collect();
		format!(
			"{}://{}/{}/{}/{}?translation={}",
			self.scheme,
			VERSE_HOST,
			reference.book.replace(' ', "%20"),
			reference.chapter,
			reference.verse,
			translation
		)
	}
}

// Plain percent-decoding: '+', '&' and '=' stay literal, so they never match a
// book.
fn decode_segment(segment: &str) -> Result<String, DeepLinkError> {
	percent_decode_str(segment)
		.decode_utf8()
		.map(|book| book.into_owned())
		.map_err(|_| DeepLinkError::UnknownBook(segment.to_string()))
}

fn positive(segment: &str) -> Result<u32, DeepLinkError> {
	let digits_only = !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit());
	match segment.parse::<u32>() {
		Ok(n) if digits_only && n > 0 => Ok(n),
		_ => Err(DeepLinkError::Number(segment.to_string())),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn parser() -> DeepLinkParser {
		DeepLinkParser::new("app", "engKJV")
	}

	#[test]
	fn parses_full_link() {
		let r = parser()
			.parse("app://verse/John/3/16?translation=engKJV")
			.unwrap();
		assert_eq!(r, VerseReference::new("engKJV", "John", 3, 16));
	}

	#[test]
	fn missing_translation_uses_default() {
		let r = DeepLinkParser::new("app", "engWEB")
			.parse("app://verse/Genesis/1/1")
			.unwrap();
		assert_eq!(r.translation, "engWEB");
	}

	#[test]
	fn decodes_and_canonicalizes_book() {
		let r = parser().parse("app://verse/1%20john/4/8").unwrap();
		assert_eq!(r.book, "1 John");
		let r = parser().parse("app://verse/song%20of%20solomon/2/1").unwrap();
		assert_eq!(r.book, "Song of Solomon");
	}

	#[test]
	fn book_segment_is_not_form_decoded() {
		for (link, book) in [
			("app://verse/John=anything/3/16", "John=anything"),
			("app://verse/John&Romans/3/16", "John&Romans"),
			("app://verse/1+John/4/8", "1+John"),
		] {
			assert_eq!(
				parser().parse(link),
				Err(DeepLinkError::UnknownBook(book.into())),
				"{link} should fail"
			);
		}
	}

	#[test]
	fn invalid_utf8_book_fails() {
		assert!(matches!(
			parser().parse("app://verse/Jo%FFhn/3/16"),
			Err(DeepLinkError::UnknownBook(_))
		));
		assert!(matches!(
			parser().resolve("%C3%28", "1", "1", None),
			Err(DeepLinkError::UnknownBook(_))
		));
	}

	#[test]
	fn missing_verse_fails() {
		assert_eq!(
			parser().parse("app://verse/John/3"),
			Err(DeepLinkError::SegmentCount(2))
		);
	}

	#[test]
	fn extra_segments_fail() {
		assert!(matches!(
			parser().parse("app://verse/John/3/16/17"),
			Err(DeepLinkError::SegmentCount(4))
		));
		assert!(matches!(
			parser().parse("app://verse/John/3/16/"),
			Err(DeepLinkError::SegmentCount(4))
		));
	}

	#[test]
	fn non_numeric_or_zero_fails() {
		for link in [
			"app://verse/John/three/16",
			"app://verse/John/3/16a",
			"app://verse/John/+3/16",
			"app://verse/John/0/16",
			"app://verse/John/3/0",
		] {
			assert!(
				matches!(parser().parse(link), Err(DeepLinkError::Number(_))),
				"{link} should fail"
			);
		}
	}

	#[test]
	fn wrong_scheme_host_or_book_fails() {
		assert!(matches!(
			parser().parse("https://verse/John/3/16"),
			Err(DeepLinkError::Scheme(_))
		));
		assert!(matches!(
			parser().parse("app://chapter/John/3/16"),
			Err(DeepLinkError::Host(_))
		));
		assert!(matches!(
			parser().parse("app://verse/Hezekiah/3/16"),
			Err(DeepLinkError::UnknownBook(_))
		));
		assert!(matches!(
			parser().parse("not a link"),
			Err(DeepLinkError::Malformed(_))
		));
	}

	#[test]
	fn handle_only_navigates_on_success() {
		let mut seen = None;
		assert!(parser().handle("app://verse/John/3/16", |r| seen = Some(r)));
		assert_eq!(seen.as_ref().map(|r| r.verse), Some(16));

		let mut called = false;
		assert!(!parser().handle("app://verse/John/3", |_| called = true));
		assert!(!called);
	}

	#[test]
	fn to_link_parses_back() {
		let p = parser();
		let r = VerseReference::new("engKJV", "2 Corinthians", 5, 17);
		let link = p.to_link(&r);
		assert_eq!(link, "app://verse/2%20Corinthians/5/17?translation=engKJV");
		assert_eq!(p.parse(&link).unwrap(), r);
	}
}
