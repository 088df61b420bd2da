//! Index facets: the independently embedded text units derived from one object.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::content::SearchContent;

const KEYWORDS_SUFFIX: &str = "_keywords";
const QUESTION_INFIX: &str = "_question_";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FacetKind {
	Main,
	Keywords,
	Question { ordinal: u32 },
}
impl FacetKind {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Main => "main",
			Self::Keywords => "keywords",
			Self::Question { .. } => "question",
		}
	}

	pub fn ordinal(&self) -> Option<u32> {
		match self {
			Self::Question { ordinal } => Some(*ordinal),
			_ => None,
		}
	}
}

/// Identity of one facet.
///
/// The textual form is `"<id>"`, `"<id>_keywords"` or `"<id>_question_<n>"`. Parsing accepts
/// only what [`fmt::Display`] produces, so the two directions are inverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FacetId {
	pub object_id: i64,
	#[serde(flatten)]
	pub kind: FacetKind,
}
impl FacetId {
	pub fn main(object_id: i64) -> Self {
		Self { object_id, kind: FacetKind::Main }
	}

	pub fn keywords(object_id: i64) -> Self {
		Self { object_id, kind: FacetKind::Keywords }
	}

	pub fn question(object_id: i64, ordinal: u32) -> Self {
		Self { object_id, kind: FacetKind::Question { ordinal } }
	}

	pub fn encode(&self) -> String {
		self.to_string()
	}

	pub fn decode(raw: &str) -> Option<Self> {
		if let Some(object) = raw.strip_suffix(KEYWORDS_SUFFIX) {
			return parse_canonical::<i64>(object).map(Self::keywords);
		}
		if let Some((object, ordinal)) = raw.split_once(QUESTION_INFIX) {
			let object_id = parse_canonical::<i64>(object)?;
			let ordinal = parse_canonical::<u32>(ordinal)?;

			return Some(Self::question(object_id, ordinal));
		}

		parse_canonical::<i64>(raw).map(Self::main)
	}
}
impl fmt::Display for FacetId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.kind {
			FacetKind::Main => write!(f, "{}", self.object_id),
			FacetKind::Keywords => write!(f, "{}{KEYWORDS_SUFFIX}", self.object_id),
			FacetKind::Question { ordinal } =>
				write!(f, "{}{QUESTION_INFIX}{ordinal}", self.object_id),
		}
	}
}
impl FromStr for FacetId {
	type Err = crate::Error;

	fn from_str(raw: &str) -> crate::Result<Self> {
		Self::decode(raw).ok_or_else(|| crate::Error::InvalidContent {
			message: format!("Malformed facet id {raw:?}."),
		})
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facet {
	pub id: FacetId,
	pub content: String,
}
impl Facet {
	pub fn object_id(&self) -> i64 {
		self.id.object_id
	}

	pub fn kind(&self) -> FacetKind {
		self.id.kind
	}
}

/// Splits one object's search content into its `main`, `keywords` and per-question facets, in
/// that order.
pub fn decompose(object_id: i64, content: &SearchContent) -> Vec<Facet> {
	let mut facets = Vec::with_capacity(content.questions.len() + 2);

	facets.push(Facet { id: FacetId::main(object_id), content: main_content(content) });
	facets.push(Facet { id: FacetId::keywords(object_id), content: content.keywords.clone() });

	for (ordinal, question) in content.questions.iter().enumerate() {
		facets.push(Facet {
			id: FacetId::question(object_id, ordinal as u32),
			content: question.clone(),
		});
	}

	facets
}

/// Fixed layout of the combined facet. Stored content is compared against this form, so the
/// labels and line order must not change.
pub fn main_content(content: &SearchContent) -> String {
	let mut out = format!(
		"{}\nkeywords: {}\nscenario: {}",
		content.digest, content.keywords, content.scenario
	);

	for question in &content.questions {
		out.push_str("\nquestion: ");
		out.push_str(question);
	}

	out
}

fn parse_canonical<T>(raw: &str) -> Option<T>
where
	T: FromStr + ToString,
{
	let value = raw.parse::<T>().ok()?;

	(value.to_string() == raw).then_some(value)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn content(questions: &[&str]) -> SearchContent {
		SearchContent {
			name: "Order receipt".to_string(),
			digest: "A takeout order receipt captured at 2024-05-01 12:00.".to_string(),
			folder_id: 3,
			keywords: "receipt,takeout,noodles".to_string(),
			questions: questions.iter().map(|question| question.to_string()).collect(),
			scenario: "Checking a food delivery order".to_string(),
			from_site: "Meituan".to_string(),
			origin_content: "Order delivered".to_string(),
		}
	}

	#[test]
	fn decompose_yields_two_plus_question_count() {
		for questions in [&[][..], &["where is my receipt"][..], &["a", "b", "c", "d"][..]] {
			let facets = decompose(11, &content(questions));

			assert_eq!(facets.len(), questions.len() + 2);
			assert_eq!(facets.iter().filter(|facet| facet.kind() == FacetKind::Main).count(), 1);
			assert_eq!(
				facets.iter().filter(|facet| facet.kind() == FacetKind::Keywords).count(),
				1
			);
			assert!(facets.iter().all(|facet| facet.object_id() == 11));
		}
	}

	#[test]
	fn decompose_is_deterministic() {
		let input = content(&["what did I order", "noodle receipt"]);
		let first = decompose(5, &input);
		let second = decompose(5, &input);

		assert_eq!(first, second);
		assert_eq!(
			first.iter().map(|facet| facet.id.encode()).collect::<Vec<_>>(),
			vec!["5", "5_keywords", "5_question_0", "5_question_1"]
		);
	}

	#[test]
	fn main_content_follows_fixed_template() {
		let text = main_content(&content(&["what did I order", "noodle receipt"]));

		assert_eq!(
			text,
			"A takeout order receipt captured at 2024-05-01 12:00.\n\
			 keywords: receipt,takeout,noodles\n\
			 scenario: Checking a food delivery order\n\
			 question: what did I order\n\
			 question: noodle receipt"
		);
	}

	#[test]
	fn facet_ids_round_trip() {
		for id in [FacetId::main(7), FacetId::keywords(7), FacetId::question(7, 12)] {
			assert_eq!(FacetId::decode(&id.encode()), Some(id));
		}
	}

	#[test]
	fn non_canonical_ids_are_rejected() {
		for raw in [
			"",
			"abc",
			"007",
			"+7",
			"7_",
			"7_keyword",
			"7_keywords_extra",
			"7_question_",
			"7_question_01",
			"7_question_-1",
			"_keywords",
			"7_question_1_question_2",
		] {
			assert_eq!(FacetId::decode(raw), None, "{raw:?} should not decode");
		}
	}

	#[test]
	fn from_str_reports_malformed_ids() {
		assert!("9_question_3".parse::<FacetId>().is_ok());
		assert!("nine".parse::<FacetId>().is_err());
	}
}
