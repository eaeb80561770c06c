//! Table view model and pagination control.

mod pagination;
mod table;

pub use pagination::Pagination;
pub use table::{
    COLUMNS, Cell, EMPTY_DESCRIPTION, EMPTY_TITLE, MISSING_CELL, PaginationView, RestaurantRow,
    RestaurantsTable, TableView, render_table,
};
