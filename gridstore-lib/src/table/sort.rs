//! Sorting

use std::cmp::Ordering;

use super::Table;
use super::ingest::parse_timestamp;
use crate::model::DataType;
use crate::model::SortDirection;
use crate::model::Value;

impl Table {
    /// Sorts the raw records by column `col_index` in `direction`.
    ///
    /// Records the column as the sort column with its new direction and
    /// moves pagination back to the first page. The sort is stable.
    pub fn sort_data(&mut self, col_index: usize, direction: SortDirection) {
        let Some(col) = self.cols.get_mut(col_index) else {
            log::warn!(
                "[table] {} sort column {} out of range ({} columns)",
                self.id,
                col_index,
                self.cols.len()
            );
            return;
        };
        col.sort_direction = Some(direction);
        let key = col.sort_key();
        let data_type = col.data_type;
        let default_direction = col.default_sort_direction();

        self.sort_col_index = Some(col_index);
        if let Some(pagination) = &mut self.pagination {
            pagination.reset();
        }

        if let Some(data) = &mut self.data {
            data.sort_by(|a, b| {
                compare_cells(
                    a.value(&key),
                    b.value(&key),
                    data_type,
                    direction,
                    default_direction,
                )
            });
        }
    }
}

/// Orders two cell values of a column.
///
/// Nulls are placed after present values while the column is in its default
/// direction and before them otherwise; two nulls are equal. Present values
/// compare by `data_type` and the result is reversed for descending order.
pub fn compare_cells(
    a: &Value,
    b: &Value,
    data_type: DataType,
    direction: SortDirection,
    default_direction: Option<SortDirection>,
) -> Ordering {
    let nulls_last = default_direction == Some(direction);
    match (a.is_null(), b.is_null()) {
        (true, true) => return Ordering::Equal,
        (true, false) => {
            return if nulls_last { Ordering::Greater } else { Ordering::Less };
        }
        (false, true) => {
            return if nulls_last { Ordering::Less } else { Ordering::Greater };
        }
        (false, false) => {}
    }

    let ordering = match data_type {
        DataType::String => a
            .to_display_string()
            .to_lowercase()
            .cmp(&b.to_display_string().to_lowercase()),
        DataType::Percent => match (percent_value(a), percent_value(b)) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            _ => a.compare(b),
        },
        DataType::Time | DataType::Status => match (parse_timestamp(a), parse_timestamp(b)) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => a.compare(b),
        },
        DataType::Number | DataType::Select => a.compare(b),
    };

    match direction {
        SortDirection::Ascending => ordering,
        SortDirection::Descending => ordering.reverse(),
    }
}

fn percent_value(value: &Value) -> Option<f64> {
    match value {
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse().ok(),
        other => other.as_f64(),
    }
}
