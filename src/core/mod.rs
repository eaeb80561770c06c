pub mod error;
pub mod types;

pub use error::{ClientError, GENERIC_ERROR_MESSAGE, Result};
pub use types::{
    Message, Page, PageKey, Restaurant, RestaurantCreate, RestaurantUpdate, RestaurantsPublic,
};
