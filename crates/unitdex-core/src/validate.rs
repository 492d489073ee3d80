//! # Field Rules & Validator
//!
//! Constraints are declared as data: each field of a shape owns a
//! `&'static [Rule]` constant, and the per-resource `FIELD_RULES` tables list
//! those constants by wire name. The [`Validator`] walks a shape field by
//! field, records every violation, and only fails once all fields have been
//! checked.
//!
//! The same rule constants feed the OpenAPI annotations on the shapes, so the
//! published bounds and the enforced bounds come from one declaration.

use std::cmp::Ordering;

use crate::decimal::Decimal;
use crate::error::{FieldViolation, ValidationErrors};

/// A single declarative constraint on a field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// String length, in characters, must be at least this.
    MinLength(usize),
    /// String length, in characters, must be at most this.
    MaxLength(usize),
    /// Number must be strictly greater than this.
    Gt(i64),
    /// Number must be greater than or equal to this.
    Ge(i64),
    /// Number must be less than or equal to this.
    Le(i64),
    /// Decimal must have at most this many fractional digits.
    MaxDecimalPlaces(u32),
}

impl Rule {
    /// Machine-readable rule code used in violation reports.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MinLength(_) => "min_length",
            Self::MaxLength(_) => "max_length",
            Self::Gt(_) => "greater_than",
            Self::Ge(_) => "greater_or_equal",
            Self::Le(_) => "less_or_equal",
            Self::MaxDecimalPlaces(_) => "decimal_places",
        }
    }

    /// The matching JSON Schema keyword and bound, where one exists.
    pub fn json_schema_keyword(&self) -> Option<(&'static str, i64)> {
        match *self {
            Self::MinLength(n) => Some(("minLength", n as i64)),
            Self::MaxLength(n) => Some(("maxLength", n as i64)),
            Self::Gt(n) => Some(("exclusiveMinimum", n)),
            Self::Ge(n) => Some(("minimum", n)),
            Self::Le(n) => Some(("maximum", n)),
            Self::MaxDecimalPlaces(_) => None,
        }
    }

    fn message(&self) -> String {
        match self {
            Self::MinLength(1) => "must not be empty".to_string(),
            Self::MinLength(n) => format!("must be at least {n} characters"),
            Self::MaxLength(n) => format!("must be at most {n} characters"),
            Self::Gt(n) => format!("must be greater than {n}"),
            Self::Ge(n) => format!("must be greater than or equal to {n}"),
            Self::Le(n) => format!("must be less than or equal to {n}"),
            Self::MaxDecimalPlaces(n) => format!("must have at most {n} decimal places"),
        }
    }
}

/// A value that can be checked against [`Rule`]s.
///
/// Rules that do not apply to a value's kind (a length rule on a number, say)
/// are never violated.
pub trait Checked {
    /// Whether this value breaks `rule`.
    fn violates(&self, rule: &Rule) -> bool;
}

impl Checked for str {
    fn violates(&self, rule: &Rule) -> bool {
        let len = self.chars().count();
        match *rule {
            Rule::MinLength(n) => len < n,
            Rule::MaxLength(n) => len > n,
            _ => false,
        }
    }
}

impl Checked for String {
    fn violates(&self, rule: &Rule) -> bool {
        self.as_str().violates(rule)
    }
}

impl Checked for i64 {
    fn violates(&self, rule: &Rule) -> bool {
        match *rule {
            Rule::Gt(n) => *self <= n,
            Rule::Ge(n) => *self < n,
            Rule::Le(n) => *self > n,
            _ => false,
        }
    }
}

impl Checked for Decimal {
    fn violates(&self, rule: &Rule) -> bool {
        match *rule {
            Rule::Gt(n) => self.cmp_int(n) != Ordering::Greater,
            Rule::Ge(n) => self.cmp_int(n) == Ordering::Less,
            Rule::Le(n) => self.cmp_int(n) == Ordering::Greater,
            Rule::MaxDecimalPlaces(n) => self.fractional_digits() > n,
            _ => false,
        }
    }
}

/// Trait for shapes that check their declared field rules.
pub trait Validate {
    /// Check every field, reporting all violations together.
    fn validate(&self) -> Result<(), ValidationErrors>;
}

/// Collects violations across the fields of one shape.
#[derive(Debug, Default)]
pub struct Validator {
    violations: Vec<FieldViolation>,
}

impl Validator {
    /// Start an empty validation pass.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check `value` against every rule in `rules`.
    pub fn check<V: Checked + ?Sized>(&mut self, field: &str, value: &V, rules: &[Rule]) -> &mut Self {
        for rule in rules {
            if value.violates(rule) {
                self.violations
                    .push(FieldViolation::new(field, rule.code(), rule.message()));
            }
        }
        self
    }

    /// Check an optional value; `None` always passes.
    pub fn check_opt<V: Checked + ?Sized>(
        &mut self,
        field: &str,
        value: Option<&V>,
        rules: &[Rule],
    ) -> &mut Self {
        if let Some(value) = value {
            self.check(field, value, rules);
        }
        self
    }

    /// Take a required value, recording a `missing` violation when absent.
    ///
    /// A field that already has a violation (a value of the wrong type, say)
    /// is not reported again as missing.
    pub fn require<T>(&mut self, field: &str, value: Option<T>) -> Option<T> {
        if value.is_none() && !self.violations.iter().any(|v| v.field == field) {
            self.violations.push(FieldViolation::missing(field));
        }
        value
    }

    /// Record an already-built violation.
    pub fn push(&mut self, violation: FieldViolation) -> &mut Self {
        self.violations.push(violation);
        self
    }

    /// Whether no violation has been recorded so far.
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    /// Give up on the pass, returning whatever has been recorded.
    pub fn into_errors(self) -> ValidationErrors {
        ValidationErrors(self.violations)
    }

    /// Finish the pass.
    pub fn finish(self) -> Result<(), ValidationErrors> {
        if self.violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(self.violations))
        }
    }
}
