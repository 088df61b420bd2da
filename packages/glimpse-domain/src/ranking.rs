use std::{cmp::Ordering, collections::HashMap};

use serde::{Deserialize, Serialize};

use crate::facet::FacetId;

/// One raw answer from the vector store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacetHit {
	pub facet_id: String,
	pub similarity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObjectScore {
	pub object_id: i64,
	pub similarity: f32,
}

/// Result sizes for one query against a store holding `available` facets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchPlan {
	pub effective_limit: usize,
	pub fetch: usize,
}
impl FetchPlan {
	/// `None` when the store is empty and must not be queried.
	pub fn new(limit: usize, available: usize, overfetch_multiplier: usize) -> Option<Self> {
		if available == 0 || limit == 0 {
			return None;
		}

		let effective_limit = limit.min(available);
		let fetch = effective_limit.saturating_mul(overfetch_multiplier.max(1)).min(available);

		Some(Self { effective_limit, fetch })
	}
}

/// Collapses facet hits to one score per object, keeping the best similarity.
///
/// Objects keep the position of their first hit. Ids that do not decode are skipped.
pub fn dedup_by_object(hits: &[FacetHit]) -> Vec<ObjectScore> {
	let mut out: Vec<ObjectScore> = Vec::with_capacity(hits.len());
	let mut positions = HashMap::with_capacity(hits.len());

	for hit in hits {
		let Some(facet_id) = FacetId::decode(&hit.facet_id) else {
			tracing::debug!(facet_id = %hit.facet_id, "Skipping hit with malformed facet id.");

			continue;
		};

		match positions.get(&facet_id.object_id) {
			Some(&position) => {
				let entry: &mut ObjectScore = &mut out[position];

				if cmp_similarity_desc(hit.similarity, entry.similarity) == Ordering::Less {
					entry.similarity = hit.similarity;
				}
			},
			None => {
				positions.insert(facet_id.object_id, out.len());
				out.push(ObjectScore { object_id: facet_id.object_id, similarity: hit.similarity });
			},
		}
	}

	out
}

/// Stable sort by similarity, highest first. Equal scores keep their input order; NaN sorts last.
pub fn rank<T, F>(items: &mut [T], similarity: F)
where
	F: Fn(&T) -> f32,
{
	items.sort_by(|a, b| cmp_similarity_desc(similarity(a), similarity(b)));
}

pub fn cmp_similarity_desc(a: f32, b: f32) -> Ordering {
	match (a.is_nan(), b.is_nan()) {
		(true, true) => Ordering::Equal,
		(true, false) => Ordering::Greater,
		(false, true) => Ordering::Less,
		(false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn hit(facet_id: &str, similarity: f32) -> FacetHit {
		FacetHit { facet_id: facet_id.to_string(), similarity }
	}

	#[test]
	fn empty_store_has_no_plan() {
		assert_eq!(FetchPlan::new(3, 0, 3), None);
	}

	#[test]
	fn plan_clamps_to_available() {
		assert_eq!(FetchPlan::new(3, 100, 3), Some(FetchPlan { effective_limit: 3, fetch: 9 }));
		assert_eq!(FetchPlan::new(3, 7, 3), Some(FetchPlan { effective_limit: 3, fetch: 7 }));
		assert_eq!(FetchPlan::new(10, 4, 3), Some(FetchPlan { effective_limit: 4, fetch: 4 }));
		assert_eq!(FetchPlan::new(5, 50, 1), Some(FetchPlan { effective_limit: 5, fetch: 5 }));
		assert_eq!(
			FetchPlan::new(usize::MAX, usize::MAX, 3),
			Some(FetchPlan { effective_limit: usize::MAX, fetch: usize::MAX })
		);
	}

	#[test]
	fn dedup_keeps_best_similarity_per_object() {
		let scores = dedup_by_object(&[
			hit("7", 0.5),
			hit("7_keywords", 0.9),
			hit("7_question_0", 0.3),
		]);

		assert_eq!(scores, vec![ObjectScore { object_id: 7, similarity: 0.9 }]);
	}

	#[test]
	fn dedup_skips_malformed_ids_and_keeps_first_seen_order() {
		let scores = dedup_by_object(&[
			hit("3_question_1", 0.8),
			hit("legacy-entry", 0.99),
			hit("5", 0.7),
			hit("3", 0.6),
			hit("5_keywords", 0.75),
		]);

		assert_eq!(
			scores,
			vec![
				ObjectScore { object_id: 3, similarity: 0.8 },
				ObjectScore { object_id: 5, similarity: 0.75 },
			]
		);
	}

	#[test]
	fn rank_orders_by_similarity_descending() {
		let mut scores = vec![
			ObjectScore { object_id: 1, similarity: 0.9 },
			ObjectScore { object_id: 2, similarity: 0.4 },
			ObjectScore { object_id: 3, similarity: 0.7 },
		];

		rank(&mut scores, |score| score.similarity);

		assert_eq!(scores.iter().map(|score| score.similarity).collect::<Vec<_>>(), vec![
			0.9, 0.7, 0.4
		]);
	}

	#[test]
	fn rank_is_stable_and_puts_nan_last() {
		let mut scores = vec![
			ObjectScore { object_id: 1, similarity: f32::NAN },
			ObjectScore { object_id: 2, similarity: 0.5 },
			ObjectScore { object_id: 3, similarity: 0.5 },
		];

		rank(&mut scores, |score| score.similarity);

		assert_eq!(scores.iter().map(|score| score.object_id).collect::<Vec<_>>(), vec![2, 3, 1]);
	}
}
