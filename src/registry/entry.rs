//! User record types

use std::fmt;

use serde::de::{self, Deserializer, IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Serialize};

/// Identifier assigned to a user by the registry
///
/// Signed so that any integer path segment can be looked up; only positive
/// values are ever assigned.
pub type UserId = i64;

/// A registered user
///
/// Serializes as `{"name": "..."}`. Decoding is lenient the way HTTP clients
/// of this API expect: the `name` key matches in any letter case, unknown
/// keys are skipped, and a missing or `null` name (or a bare `null` body)
/// decodes as an empty string so that it fails the same validation as `""`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct User {
    /// Display name, never empty once stored
    pub name: String,
}

impl User {
    /// Create a new user record
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Decode the first JSON value in `body`, ignoring anything after it
    pub fn from_json(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::Deserializer::from_slice(body)
            .into_iter::<User>()
            .next()
            .unwrap_or_else(|| Err(de::Error::custom("EOF")))
    }
}

impl<'de> Deserialize<'de> for User {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(UserVisitor)
    }
}

struct UserVisitor;

impl<'de> Visitor<'de> for UserVisitor {
    type Value = User;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "an object with a string 'name'")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(User::default())
    }

    fn visit_map<M>(self, mut map: M) -> Result<Self::Value, M::Error>
    where
        M: MapAccess<'de>,
    {
        let mut user = User::default();

        while let Some(key) = map.next_key::<String>()? {
            if key.eq_ignore_ascii_case("name") {
                // Later keys win; null leaves the current value alone
                if let Some(name) = map.next_value::<Option<String>>()? {
                    user.name = name;
                }
            } else {
                map.next_value::<IgnoredAny>()?;
            }
        }

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize() {
        let json = serde_json::to_string(&User::new("Alice")).unwrap();
        assert_eq!(json, r#"{"name":"Alice"}"#);
    }

    #[test]
    fn test_deserialize_ignores_unknown_fields() {
        let user = User::from_json(br#"{"name":"Bob","age":42,"tags":[1,{"a":null}]}"#).unwrap();
        assert_eq!(user, User::new("Bob"));
    }

    #[test]
    fn test_deserialize_name_any_case() {
        for body in [r#"{"Name":"Alice"}"#, r#"{"NAME":"Alice"}"#, r#"{"nAmE":"Alice"}"#] {
            assert_eq!(User::from_json(body.as_bytes()).unwrap(), User::new("Alice"));
        }

        let user = User::from_json(br#"{"name":"Alice","Name":"Bob"}"#).unwrap();
        assert_eq!(user.name, "Bob");
    }

    #[test]
    fn test_deserialize_missing_or_null_name() {
        for body in ["{}", r#"{"name":null}"#, "null"] {
            let user = User::from_json(body.as_bytes()).unwrap();
            assert!(user.name.is_empty(), "body {:?}", body);
        }

        let user = User::from_json(br#"{"name":"Al","name":null}"#).unwrap();
        assert_eq!(user.name, "Al");
    }

    #[test]
    fn test_deserialize_trailing_data_ignored() {
        let user = User::from_json(b"{\"name\":\"Eve\"}\n{\"name\":\"Mallory\"} junk").unwrap();
        assert_eq!(user, User::new("Eve"));
    }

    #[test]
    fn test_deserialize_rejects() {
        for body in ["", "   ", "not json", r#"{"name":5}"#, r#"["Alice"]"#, r#""Alice""#, "{"] {
            assert!(User::from_json(body.as_bytes()).is_err(), "body {:?}", body);
        }
        assert_eq!(User::from_json(b"").unwrap_err().to_string(), "EOF");
    }
}
