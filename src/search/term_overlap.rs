//! Term-overlap scoring: count query-term occurrences in each description.

use crate::{
    data::SceneDataset,
    search::{Result, ResultSet, ScoredRecord, query_terms, sort_descending},
};

/// Rank every record by the summed occurrence count of the query terms in
/// its lowercased description.
///
/// Counting is at the substring level: "river" matches inside "riverbank".
/// That is the established matching behaviour for this dataset and callers
/// depend on it, so it must not be tightened to token-boundary matching.
pub(crate) fn rank(query: &str, dataset: &SceneDataset) -> Result<ResultSet> {
    let terms = query_terms(query)?;

    let mut results: ResultSet = dataset
        .records()
        .iter()
        .filter_map(|record| {
            let description = record.description_from_model.to_lowercase();
            let count: usize = terms
                .iter()
                .map(|term| description.matches(term.as_str()).count())
                .sum();
            (count > 0).then(|| ScoredRecord {
                record: record.clone(),
                relevance: count as f64,
            })
        })
        .collect();

    sort_descending(&mut results);
    Ok(results)
}
