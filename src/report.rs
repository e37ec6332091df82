use serde::Serialize;

use crate::scanner::FunctionRecord;

/// Statistics over the min-size-filtered set (not the top-N slice).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub average: f64,
    pub max: u32,
    pub min: u32,
}

impl Summary {
    pub fn compute(records: &[FunctionRecord]) -> Self {
        if records.is_empty() {
            return Summary { count: 0, average: 0.0, max: 0, min: 0 };
        }
        let total: u64 = records.iter().map(|r| u64::from(r.size)).sum();
        Summary {
            count: records.len(),
            average: total as f64 / records.len() as f64,
            max: records.iter().map(|r| r.size).max().unwrap_or(0),
            min: records.iter().map(|r| r.size).min().unwrap_or(0),
        }
    }
}

/// One repository's final output: summary over the filtered set plus the
/// top-N records. Both writers consume this, so their statistics agree.
#[derive(Debug, Clone, Serialize)]
pub struct RepoReport {
    #[serde(skip)]
    pub name: String,
    pub summary: Summary,
    pub functions: Vec<FunctionRecord>,
}

/// Drops records below `min_size`, computes the summary over what remains,
/// then keeps the top-N by size descending. The sort is stable, so ties
/// keep discovery order.
pub fn build_report(
    name: String,
    functions: Vec<FunctionRecord>,
    min_size: u32,
    top_n: usize,
) -> RepoReport {
    let mut filtered: Vec<FunctionRecord> =
        functions.into_iter().filter(|f| f.size >= min_size).collect();
    let summary = Summary::compute(&filtered);
    filtered.sort_by(|a, b| b.size.cmp(&a.size));
    filtered.truncate(top_n);
    RepoReport { name, summary, functions: filtered }
}
