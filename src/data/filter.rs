use crate::config::Subgroup;

use super::model::{Dataset, NumericColumn, Record};

// ---------------------------------------------------------------------------
// Subgroup predicates: product + operation equality
// ---------------------------------------------------------------------------

impl Subgroup {
    /// Whether `record` belongs to this subgroup.
    pub fn matches(&self, record: &Record) -> bool {
        record.product == self.product && record.operation == self.operation
    }
}

/// Records of `dataset` in `group`, in file order.
pub fn subgroup_records<'a>(
    dataset: &'a Dataset,
    group: &'a Subgroup,
) -> impl Iterator<Item = &'a Record> + 'a {
    dataset.records().iter().filter(move |r| group.matches(r))
}

/// One numeric column of the records in `group`.
pub fn subgroup_values(dataset: &Dataset, group: &Subgroup, column: NumericColumn) -> Vec<f64> {
    subgroup_records(dataset, group)
        .map(|r| column.value(r))
        .collect()
}

/// Values of `column` above `threshold`, with their row indices.
pub fn rows_above(dataset: &Dataset, column: NumericColumn, threshold: f64) -> Vec<(usize, f64)> {
    dataset
        .records()
        .iter()
        .enumerate()
        .map(|(i, r)| (i, column.value(r)))
        .filter(|&(_, v)| v > threshold)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::CleaningStats;

    fn record(product: &str, operation: &str, volume: f64) -> Record {
        Record {
            year: 2020,
            product: product.into(),
            operation: operation.into(),
            volume,
            expenditure: 1.0,
            extra: Vec::new(),
        }
    }

    #[test]
    fn subgroup_needs_both_fields_to_match() {
        let ds = Dataset::new(
            vec![
                record("GASOLINA A", "EXPORTAÇÃO", 1.0),
                record("GASOLINA A", "IMPORTAÇÃO", 2.0),
                record("ÓLEO DIESEL", "EXPORTAÇÃO", 3.0),
                record("GASOLINA A", "EXPORTAÇÃO", 4.0),
            ],
            Vec::new(),
            CleaningStats::default(),
        );
        let group = Subgroup::new("GASOLINA A", "EXPORTAÇÃO");
        assert_eq!(
            subgroup_values(&ds, &group, NumericColumn::Volume),
            vec![1.0, 4.0]
        );
    }

    #[test]
    fn rows_above_is_strict() {
        let ds = Dataset::new(
            vec![record("A", "X", 5.0), record("A", "X", 6.0)],
            Vec::new(),
            CleaningStats::default(),
        );
        assert_eq!(rows_above(&ds, NumericColumn::Volume, 5.0), vec![(1, 6.0)]);
    }
}
