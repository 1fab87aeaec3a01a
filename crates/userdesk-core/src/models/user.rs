use serde::{Deserialize, Deserializer, Serialize};

/// Value stored for a coordinate the client or server left blank.
pub const DEFAULT_COORDINATE: &str = "0.0";

/// A user as stored by the remote collection.
///
/// The server names the identifier `_id`; `id` is accepted too so records
/// from plain REST fixtures decode as well.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "deserialize_optional_text")]
    pub website: Option<String>,
    pub address: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub street: String,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "deserialize_optional_text")]
    pub suite: Option<String>,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub zipcode: String,
    #[serde(default)]
    pub geo: Geo,
}

/// Coordinates are kept as the exact decimal text the server sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Geo {
    #[serde(default = "default_coordinate", deserialize_with = "deserialize_coordinate")]
    pub lat: String,
    #[serde(default = "default_coordinate", deserialize_with = "deserialize_coordinate")]
    pub lng: String,
}

impl Default for Geo {
    fn default() -> Self {
        Self {
            lat: default_coordinate(),
            lng: default_coordinate(),
        }
    }
}

fn default_coordinate() -> String {
    DEFAULT_COORDINATE.to_string()
}

/// Accepts a string or a bare JSON number. Blank or null means the default.
fn deserialize_coordinate<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de;

    struct CoordinateVisitor;

    impl<'de> de::Visitor<'de> for CoordinateVisitor {
        type Value = String;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a decimal coordinate as string or number")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E> {
            if v.trim().is_empty() {
                Ok(default_coordinate())
            } else {
                Ok(v.to_string())
            }
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E> {
            Ok(v.to_string())
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E> {
            Ok(v.to_string())
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E> {
            Ok(v.to_string())
        }

        fn visit_none<E>(self) -> Result<Self::Value, E> {
            Ok(default_coordinate())
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E> {
            Ok(default_coordinate())
        }
    }

    deserializer.deserialize_any(CoordinateVisitor)
}

/// Older records carry `""` where a value was never entered.
fn deserialize_optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

impl UserRecord {
    /// The record without its identifier, as it would be sent back.
    pub fn to_payload(&self) -> UserPayload {
        UserPayload {
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            company: self.company.clone(),
            website: self.website.clone(),
            address: self.address.clone(),
        }
    }

    /// "street, suite" with the suite only when present
    pub fn street_line(&self) -> String {
        match self.address.suite.as_deref() {
            Some(suite) if !self.address.street.is_empty() => {
                format!("{}, {}", self.address.street, suite)
            }
            Some(suite) => suite.to_string(),
            None => self.address.street.clone(),
        }
    }

    /// "city, zipcode", dropping whichever part is blank
    pub fn city_line(&self) -> String {
        match (self.address.city.is_empty(), self.address.zipcode.is_empty()) {
            (false, false) => format!("{}, {}", self.address.city, self.address.zipcode),
            (false, true) => self.address.city.clone(),
            (true, false) => self.address.zipcode.clone(),
            (true, true) => String::new(),
        }
    }
}

/// A user record without the server-assigned id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPayload {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    pub address: Address,
}

impl UserPayload {
    /// Attach a server-assigned id.
    pub fn with_id(self, id: impl Into<String>) -> UserRecord {
        UserRecord {
            id: id.into(),
            name: self.name,
            email: self.email,
            phone: self.phone,
            company: self.company,
            website: self.website,
            address: self.address,
        }
    }
}

/// Body of `POST /users`. Only built from a validated form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CreatePayload(UserPayload);

impl CreatePayload {
    pub(crate) fn new(user: UserPayload) -> Self {
        Self(user)
    }

    pub fn user(&self) -> &UserPayload {
        &self.0
    }
}

/// Target id plus body of `PUT /users/{id}`. Only built from a validated form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatePayload {
    id: String,
    user: UserPayload,
}

impl UpdatePayload {
    pub(crate) fn new(id: impl Into<String>, user: UserPayload) -> Self {
        Self { id: id.into(), user }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn user(&self) -> &UserPayload {
        &self.user
    }
}

// ============================================================================
// Tests
// ============================================================================
