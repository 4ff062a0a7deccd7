//! Location reference data used by request forms and filters.

use serde::{Deserialize, Serialize};

/// A city served by the business.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

/// A street within a city.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Street {
    pub id: i64,
    pub name: String,
    pub city_id: i64,
    #[serde(default)]
    pub postal_code: Option<String>,
}

/// Value/label pair for drop-down lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl From<&City> for SelectOption {
    fn from(city: &City) -> Self {
        Self {
            value: city.name.clone(),
            label: city.name.clone(),
        }
    }
}

impl From<&Street> for SelectOption {
    fn from(street: &Street) -> Self {
        Self {
            value: street.name.clone(),
            label: street.name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_city_deserialize_optional_fields() {
        let city: City = serde_json::from_str(r#"{"id":1,"name":"Moscow"}"#).unwrap();
        assert_eq!(city.name, "Moscow");
        assert_eq!(city.region, None);
    }

    #[test]
    fn test_street_deserialize() {
        let street: Street =
            serde_json::from_str(r#"{"id":3,"name":"Arbat","city_id":1,"postal_code":"119002"}"#)
                .unwrap();
        assert_eq!(street.city_id, 1);
        assert_eq!(street.postal_code.as_deref(), Some("119002"));
    }

    #[test]
    fn test_select_option_from_city() {
        let city = City {
            id: 2,
            name: "Kazan".to_string(),
            region: None,
            country: None,
        };
        let option = SelectOption::from(&city);
        assert_eq!(option.value, "Kazan");
        assert_eq!(option.label, "Kazan");
    }
}
