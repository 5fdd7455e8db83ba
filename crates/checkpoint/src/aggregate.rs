//! Folding partial records into logical checkpoints.

use crate::models::{AggregatedCheckpoint, CheckpointFilter, CheckpointRecord};
use std::collections::BTreeMap;

/// Fold every record sharing an id into one checkpoint.
///
/// `processed` is the union of all partial sets and `last_update` is the
/// maximum. Records are expected to agree on category and source; when they
/// don't, the first record seen wins and the divergence is logged.
///
/// Returns `None` when there are no records at all.
pub fn aggregate(records: impl IntoIterator<Item = CheckpointRecord>) -> Option<AggregatedCheckpoint> {
    let mut records = records.into_iter();
    let mut checkpoint = AggregatedCheckpoint::from(records.next()?);
    for record in records {
        absorb(&mut checkpoint, record);
    }
    Some(checkpoint)
}

fn absorb(checkpoint: &mut AggregatedCheckpoint, record: CheckpointRecord) {
    if record.id != checkpoint.id || record.category != checkpoint.category || record.source != checkpoint.source {
        tracing::warn!(
            id = %checkpoint.id,
            category = %checkpoint.category,
            source = %checkpoint.source,
            divergent_id = %record.id,
            divergent_category = %record.category,
            divergent_source = %record.source,
            "checkpoint record disagrees with earlier records; keeping the first",
        );
    }
    checkpoint.processed.extend(record.processed);
    if record.last_update > checkpoint.last_update {
        checkpoint.last_update = record.last_update;
    }
}

/// Select the records matching `filter`, then aggregate them per distinct
/// (id, category, source) triple.
///
/// Results are ordered most recently updated first; ties are broken by id so
/// the output is deterministic.
pub fn aggregate_with_filter(
    records: impl IntoIterator<Item = CheckpointRecord>,
    filter: &CheckpointFilter,
) -> Vec<AggregatedCheckpoint> {
    let mut groups: BTreeMap<(String, _, String), Vec<CheckpointRecord>> = BTreeMap::new();
    for record in records.into_iter().filter(|r| filter.matches(r)) {
        groups
            .entry((record.id.clone(), record.category, record.source.clone()))
            .or_default()
            .push(record);
    }
    let mut checkpoints: Vec<_> = groups.into_values().filter_map(aggregate).collect();
    checkpoints.sort_by(|a, b| b.last_update.cmp(&a.last_update).then_with(|| a.id.cmp(&b.id)));
    checkpoints
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;
    use rstest::rstest;
    use std::collections::BTreeSet;
    use time::UtcDateTime;

    fn at(seconds: i64) -> UtcDateTime {
        UtcDateTime::from_unix_timestamp(1_700_000_000 + seconds).unwrap()
    }

    fn record(id: &str, keys: &[&str], seconds: i64) -> CheckpointRecord {
        CheckpointRecord::new(id, Category::ByDirectory, "local:photos", keys.iter().copied())
            .with_last_update(at(seconds))
    }

    fn keys(keys: &[&str]) -> BTreeSet<String> {
        keys.iter().map(|k| k.to_string()).collect()
    }

    #[test]
    fn test_aggregate_of_nothing_is_none() {
        assert!(aggregate(Vec::new()).is_none());
    }

    #[test]
    fn test_aggregate_unions_processed_and_keeps_latest_update() {
        let checkpoint = aggregate(vec![
            record("job", &["a", "b"], 10),
            record("job", &["b", "c"], 30),
            record("job", &[], 20),
        ])
        .unwrap();
        assert_eq!(checkpoint.processed, keys(&["a", "b", "c"]));
        assert_eq!(checkpoint.last_update, at(30));
        assert_eq!(checkpoint.id, "job");
    }

    #[rstest]
    #[case([0, 1, 2])]
    #[case([0, 2, 1])]
    #[case([1, 0, 2])]
    #[case([1, 2, 0])]
    #[case([2, 0, 1])]
    #[case([2, 1, 0])]
    fn test_aggregate_is_order_independent(#[case] order: [usize; 3]) {
        let records = [
            record("job", &["a"], 5),
            record("job", &["b", "c"], 15),
            record("job", &["a", "d"], 10),
        ];
        let checkpoint = aggregate(order.map(|i| records[i].clone())).unwrap();
        assert_eq!(checkpoint.processed, keys(&["a", "b", "c", "d"]));
        assert_eq!(checkpoint.last_update, at(15));
    }

    #[test]
    fn test_aggregate_is_idempotent_over_repeated_records() {
        let once = aggregate(vec![record("job", &["a", "b"], 1)]).unwrap();
        let twice = aggregate(vec![record("job", &["a", "b"], 1), record("job", &["a", "b"], 1)]).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_divergent_source_keeps_the_first() {
        let mut other = record("job", &["z"], 1);
        other.source = "local:elsewhere".to_string();
        let checkpoint = aggregate(vec![record("job", &["a"], 0), other]).unwrap();
        assert_eq!(checkpoint.source, "local:photos");
        assert_eq!(checkpoint.processed, keys(&["a", "z"]));
    }

    #[test]
    fn test_aggregate_with_filter_groups_and_orders() {
        let mut by_id = record("merge", &["1"], 50);
        by_id.category = Category::ById;
        by_id.source = "dupes.csv".to_string();
        let records = vec![
            record("older", &["a"], 10),
            record("newer", &["x"], 5),
            by_id,
            record("newer", &["y"], 40),
            record("older", &["b"], 20),
        ];

        let all = aggregate_with_filter(records.clone(), &CheckpointFilter::default());
        let ids: Vec<_> = all.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["merge", "newer", "older"]);
        assert_eq!(all[1].processed, keys(&["x", "y"]));

        let directories = aggregate_with_filter(records, &CheckpointFilter::default().category(Category::ByDirectory));
        let ids: Vec<_> = directories.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["newer", "older"]);
    }

    #[test]
    fn test_aggregate_with_filter_breaks_ties_by_id() {
        let records = vec![record("b", &["1"], 0), record("a", &["1"], 0)];
        let ids: Vec<_> = aggregate_with_filter(records, &CheckpointFilter::default())
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, ["a", "b"]);
    }
}
