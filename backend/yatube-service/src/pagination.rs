/// Page-number pagination for post listings.
///
/// `?page=` values that are not integers resolve to the first page, values
/// outside the valid range resolve to the last page. An empty listing still has
/// one (empty) page.
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    pub total: i64,
    pub per_page: i64,
}

impl Paginator {
    pub fn new(total: i64, per_page: i64) -> Self {
        Self {
            total: total.max(0),
            per_page: per_page.max(1),
        }
    }

    pub fn num_pages(&self) -> i64 {
        if self.total == 0 {
            1
        } else {
            (self.total + self.per_page - 1) / self.per_page
        }
    }

    /// Resolve a raw `?page=` value to a valid page number.
    pub fn resolve(&self, raw: Option<&str>) -> i64 {
        let requested = match raw.map(str::trim).map(str::parse::<i64>) {
            Some(Ok(n)) => n,
            _ => return 1,
        };

        if requested < 1 || requested > self.num_pages() {
            self.num_pages()
        } else {
            requested
        }
    }

    pub fn offset(&self, number: i64) -> i64 {
        (number - 1) * self.per_page
    }

    pub fn page<T>(&self, number: i64, items: Vec<T>) -> Page<T> {
        Page {
            items,
            number,
            num_pages: self.num_pages(),
            total: self.total,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: i64,
    pub num_pages: i64,
    pub total: i64,
}

impl<T> Page<T> {
    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn has_other_pages(&self) -> bool {
        self.num_pages > 1
    }

    pub fn previous_page_number(&self) -> i64 {
        (self.number - 1).max(1)
    }

    pub fn next_page_number(&self) -> i64 {
        (self.number + 1).min(self.num_pages)
    }

    pub fn page_range(&self) -> Vec<i64> {
        (1..=self.num_pages).collect()
    }

    pub fn is_current(&self, number: &i64) -> bool {
        *number == self.number
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
