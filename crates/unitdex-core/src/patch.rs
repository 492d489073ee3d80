//! Serde helper for partial-update shapes.
//!
//! A nullable field in a patch has three states: absent (leave unchanged),
//! explicit `null` (clear), or a value (replace). Plain `Option<T>` collapses
//! the first two, so nullable patch fields use `Option<Option<T>>` with
//! `#[serde(default, deserialize_with = "crate::patch::nullable")]`.

use serde::{Deserialize, Deserializer};

/// Deserialize a present field (including `null`) as `Some(..)`.
///
/// Absent fields never reach this function; `#[serde(default)]` leaves them
/// as `None`.
pub fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "super::nullable")]
        note: Option<Option<String>>,
    }

    #[test]
    fn distinguishes_absent_null_and_value() {
        let absent: Probe = serde_json::from_str("{}").unwrap();
        let null: Probe = serde_json::from_str(r#"{"note":null}"#).unwrap();
        let value: Probe = serde_json::from_str(r#"{"note":"hi"}"#).unwrap();
        assert_eq!(absent.note, None);
        assert_eq!(null.note, Some(None));
        assert_eq!(value.note, Some(Some("hi".to_string())));
    }
}
