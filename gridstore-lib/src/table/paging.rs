//! Pagination

use super::Table;
use crate::model::PageDirection;
use crate::model::Record;

impl Table {
    /// Moves the cursor one page left or right.
    pub fn paginate(&mut self, direction: PageDirection) {
        match &mut self.pagination {
            Some(pagination) => pagination.step(direction),
            None => log::debug!("[table] {} has no pagination", self.id),
        }
    }

    /// Moves the cursor back to the first page.
    pub fn reset_pagination(&mut self) {
        if let Some(pagination) = &mut self.pagination {
            pagination.reset();
        }
    }

    /// Returns the current page of `data`. Without pagination, all of it.
    pub fn slice_data(&self, data: &[Record]) -> Vec<Record> {
        match &self.pagination {
            Some(pagination) => pagination.slice(data).to_vec(),
            None => data.to_vec(),
        }
    }

    pub(super) fn reset_pagination_if_moved(&mut self) {
        if self.pagination.as_ref().is_some_and(|p| p.cursor != 0) {
            self.reset_pagination();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    #[test]
    fn test_pages_cover_filtered_data() {
        let mut table = table(people().with_page_size(2));
        table.on_data_received(people_payload());

        let mut seen = Vec::new();
        loop {
            let page = table.get_data();
            if page.is_empty() {
                break;
            }
            assert!(page.len() <= 2);
            seen.extend(names(&page));
            table.paginate(PageDirection::Right);
        }
        assert_eq!(seen, names(&table.get_filtered_data()));
        assert_eq!(table.get_pagination_data().unwrap().cursor, 6);
    }

    #[test]
    fn test_left_from_first_page_stays() {
        let mut table = table(people().with_page_size(2));
        table.on_data_received(people_payload());
        table.paginate(PageDirection::Left);
        assert_eq!(table.get_pagination_data().unwrap().cursor, 0);
        assert_eq!(names(&table.get_data()), ["Bob", "alice"]);
    }

    #[test]
    fn test_paginate_without_pagination_is_noop() {
        let mut table = table(people());
        table.on_data_received(people_payload());
        table.paginate(PageDirection::Right);
        assert_eq!(table.get_data().len(), 5);
    }

    #[test]
    fn test_last_page_is_partial() {
        let mut table = table(people().with_page_size(2));
        table.on_data_received(people_payload());
        table.paginate(PageDirection::Right);
        table.paginate(PageDirection::Right);
        assert_eq!(names(&table.get_data()), ["dave"]);
        assert_eq!(table.get_data_count(), 5);
    }
}
