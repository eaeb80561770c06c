use crate::core::{Restaurant, RestaurantCreate, RestaurantUpdate};
use std::collections::BTreeMap;

pub const NAME_REQUIRED_MESSAGE: &str = "Name is required.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FormField {
    Name,
    RevoTenant,
    RevoClientKey,
    RevoApiKey,
}

impl FormField {
    pub const ALL: [FormField; 4] = [
        FormField::Name,
        FormField::RevoTenant,
        FormField::RevoClientKey,
        FormField::RevoApiKey,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            FormField::Name => "name",
            FormField::RevoTenant => "revo_tenant",
            FormField::RevoClientKey => "revo_client_key",
            FormField::RevoApiKey => "revo_api_key",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FormField::Name => "Name",
            FormField::RevoTenant => "Revo Tenant",
            FormField::RevoClientKey => "Revo Client Key",
            FormField::RevoApiKey => "Revo API Key",
        }
    }

    pub fn is_required(&self) -> bool {
        matches!(self, FormField::Name)
    }
}

/// Inline error text per field.
pub type FieldErrors = BTreeMap<FormField, String>;

/// Raw text of the restaurant form, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestaurantForm {
    pub name: String,
    pub revo_tenant: String,
    pub revo_client_key: String,
    pub revo_api_key: String,
}

impl RestaurantForm {
    pub fn from_restaurant(restaurant: &Restaurant) -> Self {
        Self {
            name: restaurant.name.clone(),
            revo_tenant: restaurant.revo_tenant.clone().unwrap_or_default(),
            revo_client_key: restaurant.revo_client_key.clone().unwrap_or_default(),
            revo_api_key: restaurant.revo_api_key.clone().unwrap_or_default(),
        }
    }

    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::Name => &self.name,
            FormField::RevoTenant => &self.revo_tenant,
            FormField::RevoClientKey => &self.revo_client_key,
            FormField::RevoApiKey => &self.revo_api_key,
        }
    }

    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        let slot = match field {
            FormField::Name => &mut self.name,
            FormField::RevoTenant => &mut self.revo_tenant,
            FormField::RevoClientKey => &mut self.revo_client_key,
            FormField::RevoApiKey => &mut self.revo_api_key,
        };
        *slot = value.into();
    }

    pub fn validate_field(&self, field: FormField) -> Option<String> {
        if field.is_required() && self.get(field).trim().is_empty() {
            return Some(NAME_REQUIRED_MESSAGE.to_string());
        }
        None
    }

    pub fn validate(&self) -> FieldErrors {
        FormField::ALL
            .into_iter()
            .filter_map(|field| self.validate_field(field).map(|msg| (field, msg)))
            .collect()
    }

    /// Blank optional fields are sent as null.
    pub fn to_create(&self) -> RestaurantCreate {
        RestaurantCreate {
            name: self.name.trim().to_string(),
            revo_tenant: non_blank(&self.revo_tenant),
            revo_client_key: non_blank(&self.revo_client_key),
            revo_api_key: non_blank(&self.revo_api_key),
        }
    }

    /// Every field is sent; an emptied optional field goes out as null and
    /// clears the stored value.
    pub fn to_update(&self) -> RestaurantUpdate {
        RestaurantUpdate {
            name: Some(self.name.trim().to_string()),
            revo_tenant: Some(non_blank(&self.revo_tenant)),
            revo_client_key: Some(non_blank(&self.revo_client_key)),
            revo_api_key: Some(non_blank(&self.revo_api_key)),
        }
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_form_reports_name_only() {
        let errors = RestaurantForm::default().validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get(&FormField::Name).unwrap(), NAME_REQUIRED_MESSAGE);
    }

    #[test]
    fn test_to_create_drops_blank_optionals() {
        let mut form = RestaurantForm::default();
        form.set(FormField::Name, "  Pizzeria ");
        form.set(FormField::RevoTenant, "pizzeria");
        form.set(FormField::RevoApiKey, "   ");

        let payload = form.to_create();
        assert_eq!(payload.name, "Pizzeria");
        assert_eq!(payload.revo_tenant.as_deref(), Some("pizzeria"));
        assert_eq!(payload.revo_client_key, None);
        assert_eq!(payload.revo_api_key, None);
    }

    #[test]
    fn test_from_restaurant_round_trips_into_update() {
        let restaurant = Restaurant {
            id: "r1".to_string(),
            name: "Trattoria".to_string(),
            revo_tenant: Some("tenant".to_string()),
            revo_client_key: None,
            revo_api_key: Some("key".to_string()),
        };

        let form = RestaurantForm::from_restaurant(&restaurant);
        assert_eq!(form.get(FormField::RevoClientKey), "");

        let update = form.to_update();
        assert_eq!(update.name.as_deref(), Some("Trattoria"));
        assert_eq!(update.revo_client_key, Some(None));
        assert_eq!(update.revo_api_key, Some(Some("key".to_string())));
    }
}
