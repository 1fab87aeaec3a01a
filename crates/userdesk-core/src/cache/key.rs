use std::fmt;

/// Root segment shared by every key of the users collection.
const USERS_SEGMENT: &str = "users";

/// Identifies one cached fetch.
///
/// Keys are independent: `Users` and `User(id)` never invalidate each other.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum QueryKey {
    /// `["users"]`, the full collection
    Users,
    /// `["users", id]`, a single record
    User(String),
}

impl QueryKey {
    pub fn users() -> Self {
        QueryKey::Users
    }

    pub fn user(id: impl Into<String>) -> Self {
        QueryKey::User(id.into())
    }

    /// The key as an ordered tuple of segments.
    pub fn segments(&self) -> Vec<&str> {
        match self {
            QueryKey::Users => vec![USERS_SEGMENT],
            QueryKey::User(id) => vec![USERS_SEGMENT, id.as_str()],
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, segment) in self.segments().iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{:?}", segment)?;
        }
        write!(f, "]")
    }
}
