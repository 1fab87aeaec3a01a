use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Address, Geo, UserPayload, UserRecord, DEFAULT_COORDINATE};

/// Names of the editable fields, in form order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormField {
    Name,
    Email,
    Phone,
    Company,
    Website,
    Street,
    Suite,
    City,
    Zipcode,
    Lat,
    Lng,
}

impl FormField {
    pub const ALL: [FormField; 11] = [
        FormField::Name,
        FormField::Email,
        FormField::Phone,
        FormField::Company,
        FormField::Website,
        FormField::Street,
        FormField::Suite,
        FormField::City,
        FormField::Zipcode,
        FormField::Lat,
        FormField::Lng,
    ];

    /// Key used for this field in error maps and `field=value` input.
    pub fn as_str(&self) -> &'static str {
        match self {
            FormField::Name => "name",
            FormField::Email => "email",
            FormField::Phone => "phone",
            FormField::Company => "company",
            FormField::Website => "website",
            FormField::Street => "street",
            FormField::Suite => "suite",
            FormField::City => "city",
            FormField::Zipcode => "zipcode",
            FormField::Lat => "lat",
            FormField::Lng => "lng",
        }
    }

    /// Human-readable label used in messages.
    pub fn label(&self) -> &'static str {
        match self {
            FormField::Name => "Name",
            FormField::Email => "Email",
            FormField::Phone => "Phone",
            FormField::Company => "Company",
            FormField::Website => "Website",
            FormField::Street => "Street",
            FormField::Suite => "Suite",
            FormField::City => "City",
            FormField::Zipcode => "Zip code",
            FormField::Lat => "Latitude",
            FormField::Lng => "Longitude",
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown form field: {0}")]
pub struct UnknownField(pub String);

impl FromStr for FormField {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        FormField::ALL
            .iter()
            .copied()
            .find(|field| field.as_str() == key)
            .ok_or_else(|| UnknownField(s.to_string()))
    }
}

/// One string per leaf of `UserRecord` (except the id).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormState {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    pub website: String,
    pub street: String,
    pub suite: String,
    pub city: String,
    pub zipcode: String,
    pub lat: String,
    pub lng: String,
}

impl FormState {
    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::Name => &self.name,
            FormField::Email => &self.email,
            FormField::Phone => &self.phone,
            FormField::Company => &self.company,
            FormField::Website => &self.website,
            FormField::Street => &self.street,
            FormField::Suite => &self.suite,
            FormField::City => &self.city,
            FormField::Zipcode => &self.zipcode,
            FormField::Lat => &self.lat,
            FormField::Lng => &self.lng,
        }
    }

    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        let slot = match field {
            FormField::Name => &mut self.name,
            FormField::Email => &mut self.email,
            FormField::Phone => &mut self.phone,
            FormField::Company => &mut self.company,
            FormField::Website => &mut self.website,
            FormField::Street => &mut self.street,
            FormField::Suite => &mut self.suite,
            FormField::City => &mut self.city,
            FormField::Zipcode => &mut self.zipcode,
            FormField::Lat => &mut self.lat,
            FormField::Lng => &mut self.lng,
        };
        *slot = value.into();
    }
}

/// Flatten a record into form state. `None` gives the blank creation form.
pub fn to_form_state(record: Option<&UserRecord>) -> FormState {
    let Some(user) = record else {
        return FormState::default();
    };

    FormState {
        name: user.name.clone(),
        email: user.email.clone(),
        phone: user.phone.clone(),
        company: user.company.clone(),
        website: user.website.clone().unwrap_or_default(),
        street: user.address.street.clone(),
        suite: user.address.suite.clone().unwrap_or_default(),
        city: user.address.city.clone(),
        zipcode: user.address.zipcode.clone(),
        lat: user.address.geo.lat.clone(),
        lng: user.address.geo.lng.clone(),
    }
}

/// Re-nest form state into the wire shape.
///
/// Blank coordinates become `"0.0"`; blank website/suite are omitted.
/// Required fields are copied as-is, they are checked by `validate`.
pub fn to_wire_payload(form: &FormState) -> UserPayload {
    UserPayload {
        name: form.name.clone(),
        email: form.email.clone(),
        phone: form.phone.clone(),
        company: form.company.clone(),
        website: non_empty(&form.website),
        address: Address {
            street: form.street.clone(),
            suite: non_empty(&form.suite),
            city: form.city.clone(),
            zipcode: form.zipcode.clone(),
            geo: Geo {
                lat: coordinate_or_default(&form.lat),
                lng: coordinate_or_default(&form.lng),
            },
        },
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn coordinate_or_default(value: &str) -> String {
    if value.is_empty() {
        DEFAULT_COORDINATE.to_string()
    } else {
        value.to_string()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn leanne() -> UserRecord {
        UserRecord {
            id: "1".to_string(),
            name: "Leanne Graham".to_string(),
            email: "sincere@april.biz".to_string(),
            phone: "1-770-736-8031".to_string(),
            company: "Romaguera-Crona".to_string(),
            website: Some("hildegard.org".to_string()),
            address: Address {
                street: "Kulas Light".to_string(),
                suite: Some("Apt. 556".to_string()),
                city: "Gwenborough".to_string(),
                zipcode: "92998-3874".to_string(),
                geo: Geo {
                    lat: "-37.3159".to_string(),
                    lng: "81.1496".to_string(),
                },
            },
        }
    }

    #[test]
    fn test_blank_form_for_creation() {
        let form = to_form_state(None);
        for field in FormField::ALL {
            assert_eq!(form.get(field), "", "field {} should be blank", field);
        }
    }

    #[test]
    fn test_flatten_record() {
        let form = to_form_state(Some(&leanne()));
        assert_eq!(form.name, "Leanne Graham");
        assert_eq!(form.website, "hildegard.org");
        assert_eq!(form.street, "Kulas Light");
        assert_eq!(form.suite, "Apt. 556");
        assert_eq!(form.zipcode, "92998-3874");
        assert_eq!(form.lat, "-37.3159");
        assert_eq!(form.lng, "81.1496");
    }

    #[test]
    fn test_flatten_missing_optionals() {
        let mut user = leanne();
        user.website = None;
        user.address.suite = None;
        user.address.geo = Geo::default();

        let form = to_form_state(Some(&user));
        assert_eq!(form.website, "");
        assert_eq!(form.suite, "");
        assert_eq!(form.lat, "0.0");
        assert_eq!(form.lng, "0.0");
    }

    #[test]
    fn test_round_trip_full_record() {
        let user = leanne();
        let payload = to_wire_payload(&to_form_state(Some(&user)));
        assert_eq!(payload, user.to_payload());
        assert_eq!(payload.with_id(user.id.clone()), user);
    }

    #[test]
    fn test_round_trip_without_optionals() {
        let mut user = leanne();
        user.website = None;
        user.address.suite = None;
        let payload = to_wire_payload(&to_form_state(Some(&user)));
        assert_eq!(payload, user.to_payload());
    }

    #[test]
    fn test_blank_coordinates_default() {
        let mut form = to_form_state(Some(&leanne()));
        form.lat.clear();
        form.lng.clear();
        let payload = to_wire_payload(&form);
        assert_eq!(payload.address.geo.lat, "0.0");
        assert_eq!(payload.address.geo.lng, "0.0");
    }

    #[test]
    fn test_required_fields_are_not_invented() {
        let payload = to_wire_payload(&FormState::default());
        assert_eq!(payload.name, "");
        assert_eq!(payload.company, "");
        assert_eq!(payload.website, None);
    }

    #[test]
    fn test_field_names_parse() {
        assert_eq!("zipcode".parse::<FormField>(), Ok(FormField::Zipcode));
        assert_eq!(" Email ".parse::<FormField>(), Ok(FormField::Email));
        assert!("geo".parse::<FormField>().is_err());
        for field in FormField::ALL {
            assert_eq!(field.as_str().parse::<FormField>(), Ok(field));
        }
    }

    #[test]
    fn test_get_set_cover_every_field() {
        let mut form = FormState::default();
        for field in FormField::ALL {
            form.set(field, field.label());
        }
        for field in FormField::ALL {
            assert_eq!(form.get(field), field.label());
        }
    }
}
