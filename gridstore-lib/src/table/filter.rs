//! Quick and advanced filtering

use std::borrow::Cow;

use super::Table;
use crate::model::AdvancedFilter;
use crate::model::QuickFilter;
use crate::model::Record;
use crate::model::Value;

impl Table {
    /// Applies the quick filter, then the advanced filters.
    pub fn filter_data(&self, data: &[Record]) -> Vec<Record> {
        let quick = match &self.filter_value {
            Some(value) => self.quick_filter_data(data, value),
            None => data.to_vec(),
        };
        match &self.advanced_filters {
            Some(filters) => advanced_filter_data(&quick, filters),
            None => quick,
        }
    }

    /// Keeps records matching `value` in at least one quick-filter column.
    ///
    /// A `"label:text"` value only looks at columns whose header label equals
    /// `label` (case-insensitive) and requires the cell to equal `text`.
    /// With no candidate columns the input is returned unchanged.
    pub fn quick_filter_data(&self, data: &[Record], value: &Value) -> Vec<Record> {
        let Some(filter) = QuickFilter::parse(value) else {
            return data.to_vec();
        };

        let candidates: Vec<&str> = self
            .cols
            .iter()
            .filter(|col| col.quick_filter && filter.selects(col.header_label.as_deref()))
            .map(|col| col.data_property.as_str())
            .collect();
        if candidates.is_empty() {
            log::debug!("[table] {} quick filter has no candidate columns", self.id);
            return data.to_vec();
        }

        data.iter()
            .filter(|record| {
                candidates
                    .iter()
                    .any(|property| filter.matches(record.value(property)))
            })
            .cloned()
            .collect()
    }
}

/// Applies advanced filters to `data`.
///
/// An unchecked filter that fires hides the record, unless a checked filter
/// has already overridden it; a checked filter that fires shows the record
/// and tags it with the filter's property. Tags are rebuilt on every pass, so
/// applying the same filters twice gives the same result.
pub fn advanced_filter_data(data: &[Record], filters: &[AdvancedFilter]) -> Vec<Record> {
    data.iter()
        .filter_map(|item| {
            let mut current = if item.shown_by_advanced_filters.is_empty() {
                Cow::Borrowed(item)
            } else {
                let mut fresh = item.clone();
                fresh.shown_by_advanced_filters.clear();
                Cow::Owned(fresh)
            };
            let mut shown = true;

            for filter in filters {
                if !filter.fires(current.value(&filter.data_property)) {
                    continue;
                }
                if filter.checked {
                    current = Cow::Owned(current.with_override(&filter.data_property));
                    shown = true;
                } else if current.shown_by_advanced_filters.is_empty() {
                    shown = false;
                }
            }

            shown.then(|| current.into_owned())
        })
        .collect()
}
