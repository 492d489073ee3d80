//! # Field-by-Field Body Reading
//!
//! Request bodies arrive as a JSON object and each field is converted on its
//! own. A wrong type or an unknown enum value on one field is recorded as a
//! [`FieldViolation`] in the same [`Validator`] pass that later checks the
//! rules of every other field, so nothing is hidden behind the first bad value.

use serde::de::DeserializeOwned;
use serde_json::{Map, Number, Value};

use crate::error::FieldViolation;
use crate::validate::Validator;

/// A JSON object whose fields are taken one at a time.
///
/// Fields that are never taken are ignored.
#[derive(Debug, Default)]
pub struct Fields {
    map: Map<String, Value>,
}

impl From<Map<String, Value>> for Fields {
    fn from(map: Map<String, Value>) -> Self {
        Self { map }
    }
}

impl Fields {
    /// Take a field. Absent and `null` both yield `None`; a value that does
    /// not convert is recorded on `v` and also yields `None`.
    pub fn take<T: DeserializeOwned>(&mut self, v: &mut Validator, field: &str) -> Option<T> {
        match self.map.remove(field) {
            None | Some(Value::Null) => None,
            Some(value) => convert(v, field, value),
        }
    }

    /// Take a clearable field: absent is `None`, `null` is `Some(None)`.
    pub fn take_nullable<T: DeserializeOwned>(
        &mut self,
        v: &mut Validator,
        field: &str,
    ) -> Option<Option<T>> {
        match self.map.remove(field) {
            None => None,
            Some(Value::Null) => Some(None),
            Some(value) => convert(v, field, value).map(Some),
        }
    }

    /// Take an integer field. Whole-valued floats such as `45.0` are accepted.
    pub fn take_int(&mut self, v: &mut Validator, field: &str) -> Option<i64> {
        match self.map.remove(field) {
            None | Some(Value::Null) => None,
            Some(Value::Number(n)) => {
                let whole = whole_number(&n);
                if whole.is_none() {
                    v.push(FieldViolation::new(
                        field,
                        "type",
                        format!("expected a whole number, got {n}"),
                    ));
                }
                whole
            }
            Some(other) => {
                v.push(FieldViolation::new(
                    field,
                    "type",
                    format!("expected a whole number, got {}", kind(&other)),
                ));
                None
            }
        }
    }
}

fn convert<T: DeserializeOwned>(v: &mut Validator, field: &str, value: Value) -> Option<T> {
    match serde_json::from_value(value) {
        Ok(t) => Some(t),
        Err(e) => {
            let message = e.to_string();
            let rule = if message.contains("unknown variant") {
                "enum"
            } else {
                "type"
            };
            v.push(FieldViolation::new(field, rule, message));
            None
        }
    }
}

fn whole_number(n: &Number) -> Option<i64> {
    if let Some(i) = n.as_i64() {
        return Some(i);
    }
    let f = n.as_f64()?;
    // `i64::MAX as f64` rounds up to 2^63, hence the exclusive upper bound.
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::Race;
    use serde_json::json;

    fn fields(value: Value) -> Fields {
        match value {
            Value::Object(map) => Fields::from(map),
            other => panic!("not an object: {other}"),
        }
    }

    #[test]
    fn absent_and_null_are_none() {
        let mut v = Validator::new();
        let mut f = fields(json!({"race": null}));
        assert_eq!(f.take::<Race>(&mut v, "race"), None);
        assert_eq!(f.take::<Race>(&mut v, "missing"), None);
        assert!(v.is_clean());
    }

    #[test]
    fn nullable_distinguishes_null_from_absent() {
        let mut v = Validator::new();
        let mut f = fields(json!({"description": null}));
        assert_eq!(f.take_nullable::<String>(&mut v, "description"), Some(None));
        assert_eq!(f.take_nullable::<String>(&mut v, "other"), None);
        assert!(v.is_clean());
    }

    #[test]
    fn bad_values_are_recorded_per_field() {
        let mut v = Validator::new();
        let mut f = fields(json!({"race": "elf", "name": 7, "armor": "thick"}));
        assert_eq!(f.take::<Race>(&mut v, "race"), None);
        assert_eq!(f.take::<String>(&mut v, "name"), None);
        assert_eq!(f.take_int(&mut v, "armor"), None);

        let errs = v.finish().unwrap_err();
        let rules: Vec<(&str, &str)> = errs
            .violations()
            .iter()
            .map(|x| (x.field.as_str(), x.rule.as_str()))
            .collect();
        assert_eq!(rules, vec![("race", "enum"), ("name", "type"), ("armor", "type")]);
    }

    #[test]
    fn whole_floats_are_integers() {
        let mut v = Validator::new();
        let mut f = fields(json!({"a": 45.0, "b": -3, "c": 4.5, "d": 1e300}));
        assert_eq!(f.take_int(&mut v, "a"), Some(45));
        assert_eq!(f.take_int(&mut v, "b"), Some(-3));
        assert_eq!(f.take_int(&mut v, "c"), None);
        assert_eq!(f.take_int(&mut v, "d"), None);
        assert_eq!(v.finish().unwrap_err().violations().len(), 2);
    }
}
