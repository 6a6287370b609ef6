use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::DraftError;

/// Form fields of a property draft. `images` is the plain text field kept
/// for records managed outside the upload widgets; it is only persisted when
/// no files were uploaded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PropertyFields {
    pub name: Option<String>,
    pub area_id: Option<Uuid>,
    pub address_id: Option<Uuid>,
    pub plus_code: Option<String>,
    pub description: String,
    pub images: String,
}

impl PropertyFields {
    /// Presence validation, first failure wins. Runs before anything touches
    /// the network or the database.
    pub fn validate(&self) -> Result<(), DraftError> {
        if self.area_id.is_none() {
            return Err(DraftError::MissingField("Please select an area."));
        }
        if self.address_id.is_none() {
            return Err(DraftError::MissingField("Please select an address."));
        }
        if self.description.trim().is_empty() {
            return Err(DraftError::MissingField(
                "Please enter a description for the property.",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UnitFields {
    pub property_id: Option<Uuid>,
    pub unit_name: String,
    pub monthly_price: Option<f64>,
    pub available: bool,
    pub description: String,
    pub images: String,
}

impl Default for UnitFields {
    fn default() -> Self {
        Self {
            property_id: None,
            unit_name: String::new(),
            monthly_price: None,
            available: true,
            description: String::new(),
            images: String::new(),
        }
    }
}

impl UnitFields {
    pub fn validate(&self) -> Result<(), DraftError> {
        if self.unit_name.trim().is_empty() {
            return Err(DraftError::MissingField("Please enter a unit name."));
        }
        if self.property_id.is_none() {
            return Err(DraftError::MissingField("Please select a property."));
        }
        if self.monthly_price.is_none() {
            return Err(DraftError::MissingField("Please enter a monthly price."));
        }
        if self.description.trim().is_empty() {
            return Err(DraftError::MissingField(
                "Please enter a description for the unit.",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_validation_reports_first_missing_field() {
        let mut fields = PropertyFields::default();
        assert_eq!(
            fields.validate().unwrap_err().to_string(),
            "Please select an area."
        );
        fields.area_id = Some(Uuid::new_v4());
        assert_eq!(
            fields.validate().unwrap_err().to_string(),
            "Please select an address."
        );
        fields.address_id = Some(Uuid::new_v4());
        let err = fields.validate().unwrap_err().to_string();
        assert!(err.contains("description"), "{err}");
        fields.description = "Two bed flat over the bakery".to_string();
        assert!(fields.validate().is_ok());
    }

    #[test]
    fn whitespace_description_is_still_missing() {
        let fields = PropertyFields {
            area_id: Some(Uuid::new_v4()),
            address_id: Some(Uuid::new_v4()),
            description: "   ".to_string(),
            ..Default::default()
        };
        assert_eq!(
            fields.validate().unwrap_err(),
            DraftError::MissingField("Please enter a description for the property.")
        );
    }

    #[test]
    fn unit_validation_order_matches_the_form() {
        let mut fields = UnitFields::default();
        assert_eq!(
            fields.validate().unwrap_err().to_string(),
            "Please enter a unit name."
        );
        fields.unit_name = "Room 3".to_string();
        assert_eq!(
            fields.validate().unwrap_err().to_string(),
            "Please select a property."
        );
        fields.property_id = Some(Uuid::new_v4());
        assert_eq!(
            fields.validate().unwrap_err().to_string(),
            "Please enter a monthly price."
        );
        fields.monthly_price = Some(725.0);
        assert_eq!(
            fields.validate().unwrap_err().to_string(),
            "Please enter a description for the unit."
        );
        fields.description = "Ensuite double".to_string();
        assert!(fields.validate().is_ok());
    }
}
