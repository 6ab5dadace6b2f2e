//! Group totals and arg-max lookups.
//!
//! "Region with the most of waste type X" composes as
//! `filter` by type, then [`sum_by_group`] by region, then [`argmax_group`];
//! [`top_group_for`] packages that chain.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::{
    data::{GroupKey, WasteRecord, format_number},
    error::PipelineError,
    filter::Selection,
};

/// Summed quantity per group key, iterated in key order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct GroupAggregate {
    totals: BTreeMap<String, f64>,
}

impl GroupAggregate {
    pub fn get(&self, key: &str) -> Option<f64> {
        self.totals.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.totals.iter().map(|(key, total)| (key.as_str(), *total))
    }

    pub fn grand_total(&self) -> f64 {
        self.totals.values().sum()
    }

    /// Largest total first; equal totals keep key order.
    pub fn ranked(&self) -> Vec<(&str, f64)> {
        let mut ranked = self.iter().collect::<Vec<_>>();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }

    pub fn render_rows(&self) -> Vec<Vec<String>> {
        self.ranked()
            .into_iter()
            .map(|(key, total)| vec![key.to_string(), format_number(total)])
            .collect()
    }
}

impl FromIterator<(String, f64)> for GroupAggregate {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        let mut quantities = BTreeMap::<String, Vec<f64>>::new();
        for (key, quantity) in iter {
            quantities.entry(key).or_default().push(quantity);
        }
        // Summing in sorted order keeps totals independent of record order.
        let totals = quantities
            .into_iter()
            .map(|(key, mut values)| {
                values.sort_by(f64::total_cmp);
                (key, values.into_iter().sum::<f64>())
            })
            .collect();
        Self { totals }
    }
}

pub fn sum_by_group(records: &[WasteRecord], key: GroupKey) -> GroupAggregate {
    records
        .iter()
        .map(|record| (key.of(record).to_string(), record.quantity))
        .collect()
}

/// Key with the largest total. Ties go to the smallest key, so the answer
/// does not depend on the order records arrived in.
pub fn argmax_group(aggregate: &GroupAggregate) -> Result<(String, f64), PipelineError> {
    let mut best: Option<(&str, f64)> = None;
    for (key, total) in aggregate.iter() {
        match best {
            Some((_, current)) if total <= current => {}
            _ => best = Some((key, total)),
        }
    }
    best.map(|(key, total)| (key.to_string(), total))
        .ok_or(PipelineError::EmptyGroup)
}

/// The `key` group holding the most of `waste_type`.
pub fn top_group_for(
    records: &[WasteRecord],
    waste_type: &str,
    key: GroupKey,
) -> Result<(String, f64), PipelineError> {
    let selection = Selection::waste_type(waste_type);
    let matching = crate::filter::filter_selection(records, &selection);
    argmax_group(&sum_by_group(&matching, key))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<WasteRecord> {
        vec![
            WasteRecord::new("LIMA", "QRESIDUOS_2019", 10.0),
            WasteRecord::new("CUSCO", "QRESIDUOS_2019", 5.0),
            WasteRecord::new("CUSCO", "QRESIDUOS_2020", 7.0),
        ]
    }

    #[test]
    fn sums_by_region_and_type() {
        let by_region = sum_by_group(&sample(), GroupKey::Region);
        assert_eq!(by_region.get("LIMA"), Some(10.0));
        assert_eq!(by_region.get("CUSCO"), Some(12.0));
        assert_eq!(by_region.len(), 2);

        let by_type = sum_by_group(&sample(), GroupKey::WasteType);
        assert_eq!(by_type.get("QRESIDUOS_2019"), Some(15.0));
        assert_eq!(by_type.get("QRESIDUOS_2020"), Some(7.0));
        assert_eq!(by_type.grand_total(), 22.0);
    }

    #[test]
    fn argmax_picks_largest_total() {
        let by_region = sum_by_group(&sample(), GroupKey::Region);
        assert_eq!(argmax_group(&by_region).unwrap(), ("CUSCO".to_string(), 12.0));
    }

    #[test]
    fn argmax_ties_resolve_to_smallest_key() {
        let records = vec![
            WasteRecord::new("PUNO", "QRESIDUOS_DOM", 4.0),
            WasteRecord::new("AREQUIPA", "QRESIDUOS_DOM", 4.0),
        ];
        let aggregate = sum_by_group(&records, GroupKey::Region);
        assert_eq!(argmax_group(&aggregate).unwrap().0, "AREQUIPA");
    }

    #[test]
    fn totals_do_not_depend_on_record_order() {
        let mut records = vec![
            WasteRecord::new("AREQUIPA", "QRESIDUOS_DOM", 0.6),
            WasteRecord::new("PUNO", "QRESIDUOS_DOM", 0.1),
            WasteRecord::new("PUNO", "QRESIDUOS_DOM", 0.2),
            WasteRecord::new("PUNO", "QRESIDUOS_DOM", 0.3),
        ];
        let forward = sum_by_group(&records, GroupKey::Region);
        records[1..].reverse();
        let reversed = sum_by_group(&records, GroupKey::Region);
        assert_eq!(forward, reversed);
        assert_eq!(argmax_group(&forward), argmax_group(&reversed));
    }

    #[test]
    fn argmax_of_empty_aggregate_fails() {
        assert_eq!(
            argmax_group(&GroupAggregate::default()),
            Err(PipelineError::EmptyGroup)
        );
    }

    #[test]
    fn top_group_for_filters_by_type_first() {
        let records = sample();
        assert_eq!(
            top_group_for(&records, "QRESIDUOS_2019", GroupKey::Region).unwrap(),
            ("LIMA".to_string(), 10.0)
        );
        assert_eq!(
            top_group_for(&records, "QRESIDUOS_2021", GroupKey::Region),
            Err(PipelineError::EmptyGroup)
        );
    }

    #[test]
    fn ranked_orders_by_total_descending() {
        let aggregate = sum_by_group(&sample(), GroupKey::Region);
        assert_eq!(aggregate.ranked(), vec![("CUSCO", 12.0), ("LIMA", 10.0)]);
        assert_eq!(aggregate.render_rows()[0], vec!["CUSCO", "12"]);
    }
}
