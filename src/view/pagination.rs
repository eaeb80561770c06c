/// Page arithmetic for the table footer.
///
/// Navigation always lands inside `[1, max(page_count, 1)]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    count: u64,
    page_size: u32,
    page: u32,
}

impl Pagination {
    pub fn new(count: u64, page_size: u32, page: u32) -> Self {
        let mut pagination = Self {
            count,
            page_size: page_size.max(1),
            page: 1,
        };
        pagination.page = pagination.clamp(page);
        pagination
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    /// `ceil(count / page_size)`; zero for an empty collection.
    pub fn page_count(&self) -> u32 {
        let pages = self.count.div_ceil(u64::from(self.page_size));
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    pub fn last_page(&self) -> u32 {
        self.page_count().max(1)
    }

    pub fn clamp(&self, page: u32) -> u32 {
        page.clamp(1, self.last_page())
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.page_count()
    }

    pub fn go_to(&mut self, page: u32) -> u32 {
        self.page = self.clamp(page);
        self.page
    }

    pub fn next(&mut self) -> u32 {
        self.go_to(self.page.saturating_add(1))
    }

    pub fn prev(&mut self) -> u32 {
        self.go_to(self.page.saturating_sub(1))
    }

    /// New total from the server; the current page is re-clamped.
    pub fn with_count(self, count: u64) -> Self {
        Self::new(count, self.page_size, self.page)
    }

    pub fn skip(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.page_size)
    }

    /// Rows expected on the current page.
    pub fn items_on_page(&self) -> u64 {
        self.count
            .saturating_sub(self.skip())
            .min(u64::from(self.page_size))
    }
}
