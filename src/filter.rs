use itertools::Itertools;

use crate::data::{GroupKey, WasteRecord};

/// Requested (waste type, region) pair. `None` leaves that field
/// unconstrained. Matching is exact and case-sensitive since values come
/// verbatim from the source data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub waste_type: Option<String>,
    pub region: Option<String>,
}

impl Selection {
    pub fn new(waste_type: Option<String>, region: Option<String>) -> Self {
        Self { waste_type, region }
    }

    pub fn pair(waste_type: &str, region: &str) -> Self {
        Self::new(Some(waste_type.to_string()), Some(region.to_string()))
    }

    pub fn waste_type(waste_type: &str) -> Self {
        Self::new(Some(waste_type.to_string()), None)
    }

    pub fn region(region: &str) -> Self {
        Self::new(None, Some(region.to_string()))
    }

    pub fn matches(&self, record: &WasteRecord) -> bool {
        self.waste_type
            .as_deref()
            .is_none_or(|wanted| record.waste_type == wanted)
            && self
                .region
                .as_deref()
                .is_none_or(|wanted| record.region == wanted)
    }

    pub fn describe(&self) -> String {
        match (&self.waste_type, &self.region) {
            (None, None) => "all records".to_string(),
            (Some(waste_type), None) => format!("waste type '{waste_type}'"),
            (None, Some(region)) => format!("region '{region}'"),
            (Some(waste_type), Some(region)) => {
                format!("waste type '{waste_type}' in region '{region}'")
            }
        }
    }
}

/// Records matching both `waste_type` and `region`. No match is an empty set.
pub fn filter(records: &[WasteRecord], waste_type: &str, region: &str) -> Vec<WasteRecord> {
    filter_selection(records, &Selection::pair(waste_type, region))
}

pub fn filter_selection(records: &[WasteRecord], selection: &Selection) -> Vec<WasteRecord> {
    records
        .iter()
        .filter(|record| selection.matches(record))
        .cloned()
        .collect()
}

/// Distinct values of `key`, in order of first appearance.
pub fn distinct(records: &[WasteRecord], key: GroupKey) -> Vec<String> {
    records
        .iter()
        .map(|record| key.of(record))
        .unique()
        .map(str::to_string)
        .collect()
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
    fn filter_requires_both_fields() {
        let matched = filter(&sample(), "QRESIDUOS_2019", "CUSCO");
        assert_eq!(matched, vec![WasteRecord::new("CUSCO", "QRESIDUOS_2019", 5.0)]);
    }

    #[test]
    fn filter_is_case_sensitive_and_may_be_empty() {
        assert!(filter(&sample(), "QRESIDUOS_2019", "Cusco").is_empty());
        assert!(filter(&sample(), "qresiduos_2019", "CUSCO").is_empty());
    }

    #[test]
    fn partial_selections_leave_fields_open() {
        assert_eq!(filter_selection(&sample(), &Selection::region("CUSCO")).len(), 2);
        assert_eq!(
            filter_selection(&sample(), &Selection::waste_type("QRESIDUOS_2019")).len(),
            2
        );
        assert_eq!(filter_selection(&sample(), &Selection::default()).len(), 3);
    }

    #[test]
    fn distinct_keeps_first_seen_order() {
        assert_eq!(distinct(&sample(), GroupKey::Region), vec!["LIMA", "CUSCO"]);
        assert_eq!(
            distinct(&sample(), GroupKey::WasteType),
            vec!["QRESIDUOS_2019", "QRESIDUOS_2020"]
        );
    }

    #[test]
    fn describe_names_the_constraints() {
        assert_eq!(Selection::default().describe(), "all records");
        assert_eq!(
            Selection::pair("QRESIDUOS_DOM", "LIMA").describe(),
            "waste type 'QRESIDUOS_DOM' in region 'LIMA'"
        );
    }
}
