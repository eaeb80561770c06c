use super::pagination::Pagination;
use crate::cache::{QueryCache, QuerySnapshot, Subscription};
use crate::core::{PageKey, Restaurant, Result};
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

pub const EMPTY_TITLE: &str = "You don't have any restaurants yet";
pub const EMPTY_DESCRIPTION: &str = "Add a new restaurant to get started";
pub const MISSING_CELL: &str = "N/A";

pub const COLUMNS: [&str; 6] = [
    "ID",
    "Name",
    "Revo Tenant",
    "Revo Client Key",
    "Revo API Key",
    "Actions",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub text: String,
    /// Rendered greyed out
    pub muted: bool,
}

impl Cell {
    fn optional(value: Option<&str>) -> Self {
        match value {
            Some(text) if !text.is_empty() => Self {
                text: text.to_string(),
                muted: false,
            },
            _ => Self {
                text: MISSING_CELL.to_string(),
                muted: true,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestaurantRow {
    pub id: String,
    pub name: String,
    pub revo_tenant: Cell,
    pub revo_client_key: Cell,
    pub revo_api_key: Cell,
}

impl From<&Restaurant> for RestaurantRow {
    fn from(restaurant: &Restaurant) -> Self {
        Self {
            id: restaurant.id.clone(),
            name: restaurant.name.clone(),
            revo_tenant: Cell::optional(restaurant.revo_tenant.as_deref()),
            revo_client_key: Cell::optional(restaurant.revo_client_key.as_deref()),
            revo_api_key: Cell::optional(restaurant.revo_api_key.as_deref()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationView {
    pub page: u32,
    pub page_count: u32,
    pub has_prev: bool,
    pub has_next: bool,
}

impl From<Pagination> for PaginationView {
    fn from(pagination: Pagination) -> Self {
        Self {
            page: pagination.page(),
            page_count: pagination.page_count(),
            has_prev: pagination.has_prev(),
            has_next: pagination.has_next(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableView {
    /// Skeleton rows while the first page loads
    Loading { skeleton_rows: usize },
    Empty {
        title: &'static str,
        description: &'static str,
    },
    Table {
        rows: Vec<RestaurantRow>,
        /// Placeholder data from another page or an invalidated entry
        dimmed: bool,
        pagination: PaginationView,
    },
}

impl TableView {
    pub fn rows(&self) -> &[RestaurantRow] {
        match self {
            TableView::Table { rows, .. } => rows,
            _ => &[],
        }
    }

    pub fn pagination(&self) -> Option<PaginationView> {
        match self {
            TableView::Table { pagination, .. } => Some(*pagination),
            _ => None,
        }
    }

    pub fn is_empty_state(&self) -> bool {
        matches!(self, TableView::Empty { .. })
    }
}

/// Turns a cache snapshot into what the table shows.
///
/// Zero rows means the empty state, whatever the reported count. Never more
/// than `page_size` rows.
pub fn render_table(snapshot: &QuerySnapshot, page_size: u32) -> TableView {
    if snapshot.is_loading {
        return TableView::Loading {
            skeleton_rows: page_size as usize,
        };
    }

    let (items, count) = match &snapshot.page {
        Some(page) => (page.items.as_slice(), page.total_count),
        None => (&[][..], 0),
    };

    let rows: Vec<RestaurantRow> = items
        .iter()
        .take(page_size as usize)
        .map(RestaurantRow::from)
        .collect();

    if rows.is_empty() {
        return TableView::Empty {
            title: EMPTY_TITLE,
            description: EMPTY_DESCRIPTION,
        };
    }

    TableView::Table {
        rows,
        dimmed: snapshot.is_placeholder,
        pagination: Pagination::new(count, page_size, snapshot.key.page()).into(),
    }
}

impl fmt::Display for TableView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableView::Loading { skeleton_rows } => {
                writeln!(f, "{}", COLUMNS[..5].join(" | "))?;
                for _ in 0..*skeleton_rows {
                    writeln!(f, "...")?;
                }
                Ok(())
            }
            TableView::Empty { title, description } => {
                writeln!(f, "{title}")?;
                writeln!(f, "{description}")
            }
            TableView::Table {
                rows,
                dimmed,
                pagination,
            } => {
                writeln!(f, "{}", COLUMNS[..5].join(" | "))?;
                for row in rows {
                    writeln!(
                        f,
                        "{} | {} | {} | {} | {}",
                        row.id,
                        row.name,
                        row.revo_tenant.text,
                        row.revo_client_key.text,
                        row.revo_api_key.text
                    )?;
                }
                write!(f, "Page {} of {}", pagination.page, pagination.page_count)?;
                if *dimmed {
                    write!(f, " (refreshing)")?;
                }
                writeln!(f)
            }
        }
    }
}

/// The mounted restaurants table.
///
/// While mounted it holds a cache subscription for its current page key and
/// keeps the latest snapshot; changing page swaps the subscription.
pub struct RestaurantsTable {
    cache: QueryCache,
    page_size: u32,
    page: u32,
    latest: Arc<Mutex<QuerySnapshot>>,
    subscription: Option<Subscription>,
}

impl RestaurantsTable {
    pub fn new(cache: QueryCache, page_size: u32) -> Self {
        let key = PageKey::clamped(1, page_size);

        Self {
            cache,
            page_size: key.page_size(),
            page: key.page(),
            latest: Arc::new(Mutex::new(QuerySnapshot::empty(key))),
            subscription: None,
        }
    }

    pub fn key(&self) -> PageKey {
        PageKey::clamped(self.page, self.page_size)
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn mount(&mut self) {
        let latest = self.latest.clone();
        let subscription = self.cache.subscribe(self.key(), move |snapshot| {
            *latest.lock().unwrap_or_else(PoisonError::into_inner) = snapshot.clone();
        });
        self.subscription = Some(subscription);
    }

    pub fn unmount(&mut self) {
        self.subscription = None;
    }

    pub fn is_mounted(&self) -> bool {
        self.subscription.is_some()
    }

    /// Fetch the current page through the cache.
    pub async fn load(&self) -> Result<()> {
        self.cache.fetch_key(self.key()).await.map(|_| ())
    }

    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.snapshot().total_count(), self.page_size, self.page)
    }

    /// Navigate, clamped to the known page range, then load the new page.
    pub async fn set_page(&mut self, page: u32) -> Result<()> {
        let target = self.pagination().clamp(page);
        if target != self.page {
            self.page = target;
            if self.is_mounted() {
                self.mount();
            }
        }
        self.load().await
    }

    pub async fn next_page(&mut self) -> Result<()> {
        let target = self.page.saturating_add(1);
        self.set_page(target).await
    }

    pub async fn prev_page(&mut self) -> Result<()> {
        let target = self.page.saturating_sub(1);
        self.set_page(target).await
    }

    pub fn snapshot(&self) -> QuerySnapshot {
        if self.is_mounted() {
            self.latest
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        } else {
            self.cache.snapshot(self.key())
        }
    }

    pub fn render(&self) -> TableView {
        render_table(&self.snapshot(), self.page_size)
    }
}
