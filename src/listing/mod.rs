//! Client-side list views: search, status filter, pagination and the
//! business dashboard loader.

pub mod dashboard;
pub mod mount;
pub mod search;

use zendulge_domain::{Activatable, Searchable};

pub use dashboard::{load_dashboard, Dashboard, DashboardSummary};
pub use mount::{Mount, MountToken};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Inactive,
}

impl StatusFilter {
    pub fn accepts<T: Activatable + ?Sized>(self, record: &T) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => record.is_active(),
            StatusFilter::Inactive => !record.is_active(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub search: String,
    pub status: StatusFilter,
    /// 1-based.
    pub page: usize,
    pub page_size: usize,
}

impl ListQuery {
    pub fn new(page_size: usize) -> Self {
        Self {
            search: String::new(),
            status: StatusFilter::All,
            page: 1,
            page_size,
        }
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self.page = 1;
        self
    }

    pub fn with_status(mut self, status: StatusFilter) -> Self {
        self.status = status;
        self.page = 1;
        self
    }

    pub fn with_page(mut self, page: usize) -> Self {
        self.page = page;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page actually shown after clamping.
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }
}

/// Slices `items` into one page. Out-of-range pages clamp to the first or
/// last page; an empty list still reports one page.
pub fn paginate<T>(items: Vec<T>, page: usize, page_size: usize) -> Page<T> {
    let page_size = page_size.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(page_size).max(1);
    let page = page.clamp(1, total_pages);
    let items = items
        .into_iter()
        .skip((page - 1) * page_size)
        .take(page_size)
        .collect();
    Page {
        items,
        page,
        total_pages,
        total_items,
    }
}

/// Filters, searches and paginates `records` in their given order.
pub fn apply<T>(records: &[T], query: &ListQuery) -> Page<T>
where
    T: Searchable + Activatable + Clone,
{
    let filtered: Vec<T> = records
        .iter()
        .filter(|record| query.status.accepts(*record))
        .filter(|record| search::matches(*record, &query.search))
        .cloned()
        .collect();
    paginate(filtered, query.page, query.page_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        name: String,
        active: bool,
    }

    impl Searchable for Row {
        fn search_terms(&self) -> Vec<&str> {
            vec![&self.name]
        }
    }

    impl Activatable for Row {
        fn is_active(&self) -> bool {
            self.active
        }
    }

    fn rows() -> Vec<Row> {
        (1..=25)
            .map(|idx| Row {
                name: format!("Massage {}", idx),
                active: idx % 5 != 0,
            })
            .collect()
    }

    #[test]
    fn pagination_clamps_to_bounds() {
        let page = paginate((1..=25).collect::<Vec<_>>(), 9, 10);
        assert_eq!(page.page, 3);
        assert_eq!(page.items, vec![21, 22, 23, 24, 25]);
        assert!(!page.has_next());

        let page = paginate((1..=25).collect::<Vec<_>>(), 0, 10);
        assert_eq!(page.page, 1);
        assert!(!page.has_prev());

        let empty = paginate(Vec::<u8>::new(), 4, 10);
        assert_eq!((empty.page, empty.total_pages), (1, 1));
    }

    #[test]
    fn apply_filters_before_paginating() {
        let query = ListQuery::new(12).with_status(StatusFilter::Inactive);
        let page = apply(&rows(), &query);
        assert_eq!(page.total_items, 5);
        assert!(page.items.iter().all(|row| !row.active));

        let query = ListQuery::new(12).with_search("massage 2").with_page(3);
        let page = apply(&rows(), &query);
        assert_eq!(page.page, 1);
        // 2, 12 and 20..=25
        assert_eq!(page.total_items, 8);
    }
}
