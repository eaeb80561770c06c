use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use super::{ClientError, Result};

/// A restaurant record as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Restaurant {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub revo_tenant: Option<String>,
    #[serde(default)]
    pub revo_client_key: Option<String>,
    #[serde(default)]
    pub revo_api_key: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestaurantCreate {
    pub name: String,
    #[serde(default)]
    pub revo_tenant: Option<String>,
    #[serde(default)]
    pub revo_client_key: Option<String>,
    #[serde(default)]
    pub revo_api_key: Option<String>,
}

impl RestaurantCreate {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn revo_tenant(mut self, tenant: impl Into<String>) -> Self {
        self.revo_tenant = Some(tenant.into());
        self
    }

    pub fn revo_client_key(mut self, key: impl Into<String>) -> Self {
        self.revo_client_key = Some(key.into());
        self
    }

    pub fn revo_api_key(mut self, key: impl Into<String>) -> Self {
        self.revo_api_key = Some(key.into());
        self
    }
}

/// Partial update.
///
/// Absent fields are left untouched. For the optional attributes an explicit
/// `null` (`Some(None)`) clears the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestaurantUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub revo_tenant: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub revo_client_key: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub revo_api_key: Option<Option<String>>,
}

/// A field that is present in the body, `null` included. Missing fields
/// never reach this and fall back to `None` through `default`.
fn present<'de, D, T>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl RestaurantUpdate {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn revo_tenant(mut self, tenant: impl Into<String>) -> Self {
        self.revo_tenant = Some(Some(tenant.into()));
        self
    }

    pub fn revo_client_key(mut self, key: impl Into<String>) -> Self {
        self.revo_client_key = Some(Some(key.into()));
        self
    }

    pub fn revo_api_key(mut self, key: impl Into<String>) -> Self {
        self.revo_api_key = Some(Some(key.into()));
        self
    }

    pub fn clear_revo_tenant(mut self) -> Self {
        self.revo_tenant = Some(None);
        self
    }

    pub fn clear_revo_client_key(mut self) -> Self {
        self.revo_client_key = Some(None);
        self
    }

    pub fn clear_revo_api_key(mut self) -> Self {
        self.revo_api_key = Some(None);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.revo_tenant.is_none()
            && self.revo_client_key.is_none()
            && self.revo_api_key.is_none()
    }
}

/// List response body: one slice of the collection plus the full count.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestaurantsPublic {
    pub data: Vec<Restaurant>,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}

impl Message {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Cache key for one page of the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageKey {
    page: u32,
    page_size: u32,
}

impl PageKey {
    pub fn new(page: u32, page_size: u32) -> Result<Self> {
        if page == 0 {
            return Err(ClientError::validation("page", "page numbers start at 1"));
        }
        if page_size == 0 {
            return Err(ClientError::validation("page_size", "page size must be > 0"));
        }
        Ok(Self { page, page_size })
    }

    /// Raises zero page numbers and sizes to 1 instead of failing.
    pub fn clamped(page: u32, page_size: u32) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.max(1),
        }
    }

    /// 1-based page number
    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn skip(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size)
    }

    pub fn limit(&self) -> u64 {
        u64::from(self.page_size)
    }
}

impl fmt::Display for PageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "page {} (size {})", self.page, self.page_size)
    }
}

/// A resolved page. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub items: Vec<Restaurant>,
    pub total_count: u64,
    pub page_number: u32,
    pub page_size: u32,
}

impl Page {
    /// Builds a page from a list response, dropping anything past `page_size`.
    pub fn from_response(key: PageKey, response: RestaurantsPublic) -> Self {
        let mut items = response.data;
        if items.len() > key.page_size as usize {
            tracing::warn!(
                key = %key,
                returned = items.len(),
                "server returned more rows than requested, truncating"
            );
            items.truncate(key.page_size as usize);
        }

        Self {
            items,
            total_count: response.count,
            page_number: key.page,
            page_size: key.page_size,
        }
    }

    pub fn key(&self) -> PageKey {
        PageKey {
            page: self.page_number,
            page_size: self.page_size,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}
