//! Search, sort and pagination over stored records, as the dashboard tables
//! apply them.

use crate::ids::sequence_number;
use crate::record::ValidatedRecord;

use std::cmp::Ordering;

pub const DEFAULT_PAGE_SIZE: usize = 25;
pub const MAX_PAGE_SIZE: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Id,
    Date,
    Amount,
    ShopId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableQuery {
    pub search: Option<String>,
    pub sort: Option<(SortKey, Direction)>,
    /// 1-based.
    pub page: usize,
    pub page_size: usize,
}

impl Default for TableQuery {
    fn default() -> Self {
        Self {
            search: None,
            sort: None,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page<'a> {
    pub items: Vec<&'a ValidatedRecord>,
    /// Matches before pagination.
    pub total: usize,
    pub page: usize,
    pub total_pages: usize,
}

impl TableQuery {
    pub fn run<'a>(&self, records: &'a [ValidatedRecord]) -> Page<'a> {
        let needle = self
            .search
            .as_deref()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());

        let mut matches: Vec<&ValidatedRecord> = records
            .iter()
            .filter(|record| match &needle {
                Some(needle) => record
                    .search_fields()
                    .iter()
                    .any(|field| field.to_lowercase().contains(needle.as_str())),
                None => true,
            })
            .collect();

        if let Some((key, direction)) = self.sort {
            matches.sort_by(|a, b| {
                let ordering = compare(a, b, key);
                match direction {
                    Direction::Ascending => ordering,
                    Direction::Descending => ordering.reverse(),
                }
            });
        }

        let page_size = self.page_size.clamp(1, MAX_PAGE_SIZE);
        let total = matches.len();
        let total_pages = total.div_ceil(page_size).max(1);
        let page = self.page.clamp(1, total_pages);

        let items = matches
            .into_iter()
            .skip((page - 1) * page_size)
            .take(page_size)
            .collect();

        Page {
            items,
            total,
            page,
            total_pages,
        }
    }
}

fn compare(a: &ValidatedRecord, b: &ValidatedRecord, key: SortKey) -> Ordering {
    match key {
        SortKey::Id => {
            let prefix = a.kind().id_prefix();
            sequence_number(prefix, a.id())
                .cmp(&sequence_number(prefix, b.id()))
                .then_with(|| a.id().cmp(b.id()))
        }
        SortKey::Date => a.date().cmp(&b.date()),
        SortKey::Amount => a.amount().cmp(&b.amount()),
        SortKey::ShopId => a.shop_id().cmp(&b.shop_id()),
    }
}
