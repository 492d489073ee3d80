//! # unitdex-core: Schema Layer for unitdex
//!
//! Declares the Unit and Skill resources independently of any web framework:
//! record shapes, closed categorical enums, exact decimals, and the field
//! rules every shape is checked against.
//!
//! ## Design Principles
//!
//! 1. **Three shapes per resource.** `*Create` for creation input, `*Patch`
//!    for partial updates, and the read record ([`Unit`], [`Skill`]) for every
//!    response.
//!
//! 2. **Rules are data.** Field constraints are [`Rule`] constants checked by
//!    the [`Validator`], which reports every violation rather than the first.
//!
//! 3. **Closed enums.** [`Race`], [`UnitType`], [`SkillCategory`] and
//!    [`TargetType`] are exhaustive enums, never free-form strings.
//!
//! 4. **Exact decimals.** Fractional-digit limits are checked on
//!    [`Decimal`] values, not on `f64` approximations.

pub mod decimal;
pub mod error;
pub mod fields;
pub mod patch;
pub mod skill;
pub mod unit;
pub mod validate;

pub use decimal::Decimal;
pub use error::{DecimalError, FieldViolation, ValidationErrors};
pub use fields::Fields;
pub use skill::{Skill, SkillCategory, SkillCreate, SkillFilter, SkillPatch, TargetType};
pub use unit::{Race, Unit, UnitCreate, UnitFilter, UnitPatch, UnitType};
pub use validate::{Checked, Rule, Validate, Validator};
