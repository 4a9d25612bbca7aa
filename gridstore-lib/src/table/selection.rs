//! Row selection

use super::Table;
use crate::model::Record;

impl Table {
    /// Selects every filtered record, or deselects them when `deselect` is set.
    pub fn update_bulk_selection(&mut self, deselect: bool) {
        let Some(property) = self.selection_property() else {
            return;
        };
        let filtered = self.get_filtered_data();
        for record in filtered {
            let Some(key) = selection_key(&record, &property) else {
                continue;
            };
            if deselect {
                self.selected_items.remove(&key);
            } else {
                self.selected_items.insert(key, record);
            }
        }
    }

    /// Toggles selection of the displayed row at `row_index`.
    pub fn update_row_selection(&mut self, row_index: usize) {
        let Some(property) = self.selection_property() else {
            return;
        };
        let Some(record) = self.get_data().into_iter().nth(row_index) else {
            log::warn!("[table] {} row {} is not displayed", self.id, row_index);
            return;
        };
        let Some(key) = selection_key(&record, &property) else {
            return;
        };
        if self.selected_items.remove(&key).is_none() {
            self.selected_items.insert(key, record);
        }
    }

    fn selection_property(&self) -> Option<String> {
        let property = self.select_data_property.clone();
        if property.is_none() {
            log::warn!("[table] {} has no select column", self.id);
        }
        property
    }
}

/// Selection key of a record; records without a key value cannot be selected.
fn selection_key(record: &Record, property: &str) -> Option<String> {
    let value = record.value(property);
    if value.is_null() {
        log::debug!("[table] record has no {} to select by", property);
        return None;
    }
    Some(value.to_display_string())
}
