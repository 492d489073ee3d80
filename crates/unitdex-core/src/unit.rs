//! # Unit Records
//!
//! The three shapes of the Unit resource:
//!
//! - [`UnitCreate`]: creation input; every field required except the
//!   defaulted combat stats, `gas_cost` and `description`.
//! - [`UnitPatch`]: partial-update input; every field optional.
//! - [`Unit`]: the stored and returned record, with server-assigned
//!   `id` and timestamps.
//!
//! No two live units may share the same `(name, race)` pair; see
//! [`Unit::identity_key`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::decimal::Decimal;
use crate::error::ValidationErrors;
use crate::fields::Fields;
use crate::validate::{Rule, Validate, Validator};

// -- Categorical fields -------------------------------------------------------

/// Playable race.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Race {
    Protoss,
    Terran,
    Zerg,
}

impl Race {
    /// Every race, in declaration order.
    pub fn all() -> &'static [Race] {
        &[Self::Protoss, Self::Terran, Self::Zerg]
    }

    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Protoss => "protoss",
            Self::Terran => "terran",
            Self::Zerg => "zerg",
        }
    }
}

impl std::fmt::Display for Race {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role classification of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum UnitType {
    #[serde(rename = "worker")]
    Worker,
    #[serde(rename = "basic")]
    BasicCombat,
    #[serde(rename = "advanced")]
    AdvancedCombat,
    #[serde(rename = "support")]
    Support,
    #[serde(rename = "hero")]
    Hero,
}

impl UnitType {
    /// Every unit type, in declaration order.
    pub fn all() -> &'static [UnitType] {
        &[
            Self::Worker,
            Self::BasicCombat,
            Self::AdvancedCombat,
            Self::Support,
            Self::Hero,
        ]
    }

    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Worker => "worker",
            Self::BasicCombat => "basic",
            Self::AdvancedCombat => "advanced",
            Self::Support => "support",
            Self::Hero => "hero",
        }
    }
}

impl std::fmt::Display for UnitType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// -- Field rules --------------------------------------------------------------

/// Constraint declarations for each Unit field.
pub mod rules {
    use crate::validate::Rule;

    pub const NAME: &[Rule] = &[Rule::MinLength(1), Rule::MaxLength(50)];
    pub const HIT_POINTS: &[Rule] = &[Rule::Gt(0)];
    pub const SHIELDS: &[Rule] = &[Rule::Ge(0)];
    pub const ATTACK_DAMAGE: &[Rule] = &[Rule::Ge(0)];
    pub const ARMOR: &[Rule] = &[Rule::Ge(0)];
    pub const MOVEMENT_SPEED: &[Rule] = &[Rule::Gt(0), Rule::MaxDecimalPlaces(2)];
    pub const MINERAL_COST: &[Rule] = &[Rule::Ge(0)];
    pub const GAS_COST: &[Rule] = &[Rule::Ge(0)];
    pub const SUPPLY_COST: &[Rule] = &[Rule::Gt(0)];
    pub const BUILD_TIME: &[Rule] = &[Rule::Gt(0)];
    pub const DESCRIPTION: &[Rule] = &[Rule::MaxLength(500)];
}

/// Constrained Unit fields by wire name.
pub const FIELD_RULES: &[(&str, &[Rule])] = &[
    ("name", rules::NAME),
    ("hit_points", rules::HIT_POINTS),
    ("shields", rules::SHIELDS),
    ("attack_damage", rules::ATTACK_DAMAGE),
    ("armor", rules::ARMOR),
    ("movement_speed", rules::MOVEMENT_SPEED),
    ("mineral_cost", rules::MINERAL_COST),
    ("gas_cost", rules::GAS_COST),
    ("supply_cost", rules::SUPPLY_COST),
    ("build_time", rules::BUILD_TIME),
    ("description", rules::DESCRIPTION),
];

// -- Shapes -------------------------------------------------------------------

/// Unit creation payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UnitCreate {
    /// Unit name (e.g., Marine, Zealot, Zergling).
    #[schema(min_length = 1, max_length = 50, example = "Marine")]
    pub name: String,
    /// Unit race.
    pub race: Race,
    /// Unit type classification.
    pub unit_type: UnitType,
    /// Maximum hit points.
    #[schema(exclusive_minimum = 0, example = 40)]
    pub hit_points: i64,
    /// Shield points (Protoss units only).
    #[serde(default)]
    #[schema(minimum = 0, example = 0)]
    pub shields: i64,
    /// Base attack damage.
    #[serde(default)]
    #[schema(minimum = 0, example = 6)]
    pub attack_damage: i64,
    /// Armor value for damage reduction.
    #[serde(default)]
    #[schema(minimum = 0, example = 0)]
    pub armor: i64,
    /// Movement speed in game units per second, at most two decimal places.
    #[schema(value_type = f64, exclusive_minimum = 0, multiple_of = 0.01, example = 2.25)]
    pub movement_speed: Decimal,
    /// Mineral cost to produce this unit.
    #[schema(minimum = 0, example = 50)]
    pub mineral_cost: i64,
    /// Vespene gas cost to produce this unit.
    #[serde(default)]
    #[schema(minimum = 0, example = 0)]
    pub gas_cost: i64,
    /// Supply (population) cost.
    #[schema(exclusive_minimum = 0, example = 1)]
    pub supply_cost: i64,
    /// Build time in seconds.
    #[schema(exclusive_minimum = 0, example = 18)]
    pub build_time: i64,
    /// Unit description and lore.
    #[serde(default)]
    #[schema(max_length = 500, example = "Versatile Terran infantry armed with a C-14 rifle")]
    pub description: Option<String>,
}

impl Validate for UnitCreate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.check("name", &self.name, rules::NAME)
            .check("hit_points", &self.hit_points, rules::HIT_POINTS)
            .check("shields", &self.shields, rules::SHIELDS)
            .check("attack_damage", &self.attack_damage, rules::ATTACK_DAMAGE)
            .check("armor", &self.armor, rules::ARMOR)
            .check("movement_speed", &self.movement_speed, rules::MOVEMENT_SPEED)
            .check("mineral_cost", &self.mineral_cost, rules::MINERAL_COST)
            .check("gas_cost", &self.gas_cost, rules::GAS_COST)
            .check("supply_cost", &self.supply_cost, rules::SUPPLY_COST)
            .check("build_time", &self.build_time, rules::BUILD_TIME)
            .check_opt("description", self.description.as_ref(), rules::DESCRIPTION);
        v.finish()
    }
}

/// Unit partial-update payload.
///
/// Only supplied fields change. `description: null` clears the description;
/// `null` on any other field is treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, ToSchema)]
pub struct UnitPatch {
    #[schema(min_length = 1, max_length = 50)]
    pub name: Option<String>,
    pub race: Option<Race>,
    pub unit_type: Option<UnitType>,
    #[schema(exclusive_minimum = 0)]
    pub hit_points: Option<i64>,
    #[schema(minimum = 0)]
    pub shields: Option<i64>,
    #[schema(minimum = 0)]
    pub attack_damage: Option<i64>,
    #[schema(minimum = 0)]
    pub armor: Option<i64>,
    #[schema(value_type = Option<f64>, exclusive_minimum = 0, multiple_of = 0.01)]
    pub movement_speed: Option<Decimal>,
    #[schema(minimum = 0)]
    pub mineral_cost: Option<i64>,
    #[schema(minimum = 0)]
    pub gas_cost: Option<i64>,
    #[schema(exclusive_minimum = 0)]
    pub supply_cost: Option<i64>,
    #[schema(exclusive_minimum = 0)]
    pub build_time: Option<i64>,
    #[serde(default, deserialize_with = "crate::patch::nullable")]
    #[schema(value_type = Option<String>, max_length = 500)]
    pub description: Option<Option<String>>,
}

impl UnitPatch {
    /// Read every known field, recording values that do not convert.
    fn read(body: Map<String, Value>, v: &mut Validator) -> Self {
        let mut f = Fields::from(body);
        Self {
            name: f.take(v, "name"),
            race: f.take(v, "race"),
            unit_type: f.take(v, "unit_type"),
            hit_points: f.take_int(v, "hit_points"),
            shields: f.take_int(v, "shields"),
            attack_damage: f.take_int(v, "attack_damage"),
            armor: f.take_int(v, "armor"),
            movement_speed: f.take(v, "movement_speed"),
            mineral_cost: f.take_int(v, "mineral_cost"),
            gas_cost: f.take_int(v, "gas_cost"),
            supply_cost: f.take_int(v, "supply_cost"),
            build_time: f.take_int(v, "build_time"),
            description: f.take_nullable(v, "description"),
        }
    }

    /// Parse a partial-update body, reporting wrong types and rule
    /// violations of every supplied field together.
    pub fn from_json(body: Map<String, Value>) -> Result<Self, ValidationErrors> {
        let mut v = Validator::new();
        let patch = Self::read(body, &mut v);
        patch.check_supplied(&mut v);
        v.finish()?;
        Ok(patch)
    }

    /// Check the rules of every supplied field.
    fn check_supplied(&self, v: &mut Validator) {
        v.check_opt("name", self.name.as_ref(), rules::NAME)
            .check_opt("hit_points", self.hit_points.as_ref(), rules::HIT_POINTS)
            .check_opt("shields", self.shields.as_ref(), rules::SHIELDS)
            .check_opt("attack_damage", self.attack_damage.as_ref(), rules::ATTACK_DAMAGE)
            .check_opt("armor", self.armor.as_ref(), rules::ARMOR)
            .check_opt("movement_speed", self.movement_speed.as_ref(), rules::MOVEMENT_SPEED)
            .check_opt("mineral_cost", self.mineral_cost.as_ref(), rules::MINERAL_COST)
            .check_opt("gas_cost", self.gas_cost.as_ref(), rules::GAS_COST)
            .check_opt("supply_cost", self.supply_cost.as_ref(), rules::SUPPLY_COST)
            .check_opt("build_time", self.build_time.as_ref(), rules::BUILD_TIME)
            .check_opt(
                "description",
                self.description.as_ref().and_then(Option::as_ref),
                rules::DESCRIPTION,
            );
    }

    /// Overwrite the supplied fields of `target`.
    pub fn apply_to(self, target: &mut UnitCreate) {
        if let Some(name) = self.name {
            target.name = name;
        }
        if let Some(race) = self.race {
            target.race = race;
        }
        if let Some(unit_type) = self.unit_type {
            target.unit_type = unit_type;
        }
        if let Some(hit_points) = self.hit_points {
            target.hit_points = hit_points;
        }
        if let Some(shields) = self.shields {
            target.shields = shields;
        }
        if let Some(attack_damage) = self.attack_damage {
            target.attack_damage = attack_damage;
        }
        if let Some(armor) = self.armor {
            target.armor = armor;
        }
        if let Some(movement_speed) = self.movement_speed {
            target.movement_speed = movement_speed;
        }
        if let Some(mineral_cost) = self.mineral_cost {
            target.mineral_cost = mineral_cost;
        }
        if let Some(gas_cost) = self.gas_cost {
            target.gas_cost = gas_cost;
        }
        if let Some(supply_cost) = self.supply_cost {
            target.supply_cost = supply_cost;
        }
        if let Some(build_time) = self.build_time {
            target.build_time = build_time;
        }
        if let Some(description) = self.description {
            target.description = description;
        }
    }
}

impl Validate for UnitPatch {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        self.check_supplied(&mut v);
        v.finish()
    }
}

/// Promote a loosely-typed body to a creation payload.
///
/// Reports missing required fields and rule violations of supplied fields
/// together.
impl TryFrom<UnitPatch> for UnitCreate {
    type Error = ValidationErrors;

    fn try_from(p: UnitPatch) -> Result<Self, Self::Error> {
        UnitCreate::promote(p, Validator::new())
    }
}

impl UnitCreate {
    /// Parse a creation body. Wrong types, missing required fields and rule
    /// violations are all reported in one error.
    pub fn from_json(body: Map<String, Value>) -> Result<Self, ValidationErrors> {
        let mut v = Validator::new();
        let patch = UnitPatch::read(body, &mut v);
        Self::promote(patch, v)
    }

    fn promote(p: UnitPatch, mut v: Validator) -> Result<Self, ValidationErrors> {
        p.check_supplied(&mut v);
        let name = v.require("name", p.name);
        let race = v.require("race", p.race);
        let unit_type = v.require("unit_type", p.unit_type);
        let hit_points = v.require("hit_points", p.hit_points);
        let movement_speed = v.require("movement_speed", p.movement_speed);
        let mineral_cost = v.require("mineral_cost", p.mineral_cost);
        let supply_cost = v.require("supply_cost", p.supply_cost);
        let build_time = v.require("build_time", p.build_time);

        let (
            Some(name),
            Some(race),
            Some(unit_type),
            Some(hit_points),
            Some(movement_speed),
            Some(mineral_cost),
            Some(supply_cost),
            Some(build_time),
        ) = (
            name,
            race,
            unit_type,
            hit_points,
            movement_speed,
            mineral_cost,
            supply_cost,
            build_time,
        )
        else {
            return Err(v.into_errors());
        };
        v.finish()?;

        Ok(UnitCreate {
            name,
            race,
            unit_type,
            hit_points,
            shields: p.shields.unwrap_or(0),
            attack_damage: p.attack_damage.unwrap_or(0),
            armor: p.armor.unwrap_or(0),
            movement_speed,
            mineral_cost,
            gas_cost: p.gas_cost.unwrap_or(0),
            supply_cost,
            build_time,
            description: p.description.flatten(),
        })
    }
}

/// A stored unit, as returned by every endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Unit {
    /// Server-generated unit ID.
    pub id: Uuid,
    pub name: String,
    pub race: Race,
    pub unit_type: UnitType,
    pub hit_points: i64,
    pub shields: i64,
    pub attack_damage: i64,
    pub armor: i64,
    #[schema(value_type = f64)]
    pub movement_speed: Decimal,
    pub mineral_cost: i64,
    pub gas_cost: i64,
    pub supply_cost: i64,
    pub build_time: i64,
    pub description: Option<String>,
    /// Creation timestamp (UTC).
    pub created_at: DateTime<Utc>,
    /// Last update timestamp (UTC).
    pub updated_at: DateTime<Utc>,
}

impl Unit {
    /// Materialize a validated creation payload under `id`.
    pub fn new(id: Uuid, attrs: UnitCreate, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: attrs.name,
            race: attrs.race,
            unit_type: attrs.unit_type,
            hit_points: attrs.hit_points,
            shields: attrs.shields,
            attack_damage: attrs.attack_damage,
            armor: attrs.armor,
            movement_speed: attrs.movement_speed,
            mineral_cost: attrs.mineral_cost,
            gas_cost: attrs.gas_cost,
            supply_cost: attrs.supply_cost,
            build_time: attrs.build_time,
            description: attrs.description,
            created_at: now,
            updated_at: now,
        }
    }

    /// The client-controlled fields of this record.
    pub fn attributes(&self) -> UnitCreate {
        UnitCreate {
            name: self.name.clone(),
            race: self.race,
            unit_type: self.unit_type,
            hit_points: self.hit_points,
            shields: self.shields,
            attack_damage: self.attack_damage,
            armor: self.armor,
            movement_speed: self.movement_speed,
            mineral_cost: self.mineral_cost,
            gas_cost: self.gas_cost,
            supply_cost: self.supply_cost,
            build_time: self.build_time,
            description: self.description.clone(),
        }
    }

    /// Merge `patch` onto a copy of this record and re-validate the result.
    ///
    /// `id` and `created_at` are carried over; `updated_at` becomes `now`.
    /// `self` is never modified, so a rejected patch leaves it intact.
    pub fn patched(&self, patch: UnitPatch, now: DateTime<Utc>) -> Result<Unit, ValidationErrors> {
        let mut attrs = self.attributes();
        patch.apply_to(&mut attrs);
        attrs.validate()?;
        let mut merged = Unit::new(self.id, attrs, self.created_at);
        merged.updated_at = now;
        Ok(merged)
    }

    /// Uniqueness key among live units.
    pub fn identity_key(&self) -> (String, Race) {
        (self.name.clone(), self.race)
    }

    /// Message reported when another live unit already holds this key.
    pub fn duplicate_message(&self) -> String {
        format!("{} unit with name '{}' already exists", self.race, self.name)
    }
}

// -- Filtering ----------------------------------------------------------------

/// Query filters for listing units. All supplied filters must match.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UnitFilter {
    /// Filter by race.
    pub race: Option<Race>,
    /// Filter by unit type.
    pub unit_type: Option<UnitType>,
    /// Case-insensitive substring match on the unit name.
    pub name: Option<String>,
    /// Minimum mineral cost (inclusive).
    pub min_cost: Option<i64>,
    /// Maximum mineral cost (inclusive).
    pub max_cost: Option<i64>,
}

impl UnitFilter {
    /// Whether `unit` passes every supplied filter.
    pub fn matches(&self, unit: &Unit) -> bool {
        if self.race.is_some_and(|race| unit.race != race) {
            return false;
        }
        if self.unit_type.is_some_and(|ty| unit.unit_type != ty) {
            return false;
        }
        if let Some(ref needle) = self.name {
            if !unit.name.to_lowercase().contains(&needle.to_lowercase()) {
                return false;
            }
        }
        if self.min_cost.is_some_and(|min| unit.mineral_cost < min) {
            return false;
        }
        if self.max_cost.is_some_and(|max| unit.mineral_cost > max) {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn marine() -> UnitCreate {
        UnitCreate {
            name: "Marine".to_string(),
            race: Race::Terran,
            unit_type: UnitType::BasicCombat,
            hit_points: 45,
            shields: 0,
            attack_damage: 6,
            armor: 0,
            movement_speed: "3.15".parse().unwrap(),
            mineral_cost: 50,
            gas_cost: 0,
            supply_cost: 1,
            build_time: 18,
            description: None,
        }
    }

    fn stored_marine() -> Unit {
        Unit::new(Uuid::new_v4(), marine(), Utc::now())
    }

    #[test]
    fn enums_use_wire_names() {
        assert_eq!(serde_json::to_value(Race::Protoss).unwrap(), json!("protoss"));
        assert_eq!(serde_json::to_value(UnitType::BasicCombat).unwrap(), json!("basic"));
        let t: UnitType = serde_json::from_value(json!("advanced")).unwrap();
        assert_eq!(t, UnitType::AdvancedCombat);
        for ty in UnitType::all() {
            assert_eq!(serde_json::to_value(ty).unwrap(), json!(ty.as_str()));
        }
        assert!(serde_json::from_value::<Race>(json!("Protoss")).is_err());
    }

    #[test]
    fn valid_create_passes() {
        assert!(marine().validate().is_ok());
    }

    #[test]
    fn create_defaults_fill_in() {
        let patch: UnitPatch = serde_json::from_value(json!({
            "name": "Zealot",
            "race": "protoss",
            "unit_type": "basic",
            "hit_points": 100,
            "movement_speed": 2.25,
            "mineral_cost": 100,
            "supply_cost": 2,
            "build_time": 27
        }))
        .unwrap();
        let create = UnitCreate::try_from(patch).unwrap();
        assert_eq!(create.shields, 0);
        assert_eq!(create.attack_damage, 0);
        assert_eq!(create.armor, 0);
        assert_eq!(create.gas_cost, 0);
        assert_eq!(create.description, None);
    }

    #[test]
    fn create_reports_missing_and_invalid_together() {
        let patch: UnitPatch = serde_json::from_value(json!({
            "name": "",
            "race": "zerg",
            "hit_points": 0,
            "movement_speed": 2.255,
            "mineral_cost": -1
        }))
        .unwrap();
        let err = UnitCreate::try_from(patch).unwrap_err();
        for field in [
            "name",
            "hit_points",
            "movement_speed",
            "mineral_cost",
            "unit_type",
            "supply_cost",
            "build_time",
        ] {
            assert!(err.has_field(field), "missing violation for {field}: {err}");
        }
        assert!(!err.has_field("race"));
    }

    fn object(value: serde_json::Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    #[test]
    fn from_json_reports_type_errors_with_rule_violations() {
        let err = UnitCreate::from_json(object(json!({
            "name": "",
            "race": "elf",
            "unit_type": "basic",
            "hit_points": -5,
            "movement_speed": 2.255,
            "mineral_cost": -1,
            "supply_cost": 0,
            "build_time": 0,
            "armor": "heavy"
        })))
        .unwrap_err();

        for field in [
            "name",
            "race",
            "hit_points",
            "movement_speed",
            "mineral_cost",
            "supply_cost",
            "build_time",
            "armor",
        ] {
            assert!(err.has_field(field), "missing violation for {field}: {err}");
        }
        let race: Vec<_> = err.violations().iter().filter(|v| v.field == "race").collect();
        assert_eq!(race.len(), 1);
        assert_eq!(race[0].rule, "enum");
    }

    #[test]
    fn from_json_accepts_whole_floats_for_integers() {
        let create = UnitCreate::from_json(object(json!({
            "name": "Marine",
            "race": "terran",
            "unit_type": "basic",
            "hit_points": 45.0,
            "movement_speed": 3.15,
            "mineral_cost": 50,
            "supply_cost": 1,
            "build_time": 18.0
        })))
        .unwrap();
        assert_eq!(create.hit_points, 45);
        assert_eq!(create.build_time, 18);
    }

    #[test]
    fn patch_from_json_keeps_explicit_null() {
        let patch = UnitPatch::from_json(object(json!({"description": null, "armor": 2}))).unwrap();
        assert_eq!(patch.description, Some(None));
        assert_eq!(patch.armor, Some(2));

        let err = UnitPatch::from_json(object(json!({"race": "elf", "armor": -1}))).unwrap_err();
        assert!(err.has_field("race") && err.has_field("armor"));
    }

    #[test]
    fn description_length_is_bounded() {
        let mut unit = marine();
        unit.description = Some("x".repeat(501));
        let err = unit.validate().unwrap_err();
        assert_eq!(err.violations().len(), 1);
        assert_eq!(err.violations()[0].rule, "max_length");
        unit.description = Some("x".repeat(500));
        assert!(unit.validate().is_ok());
    }

    #[test]
    fn patch_changes_only_supplied_fields() {
        let unit = stored_marine();
        let patch: UnitPatch = serde_json::from_value(json!({"hit_points": 55})).unwrap();
        let later = unit.updated_at + chrono::Duration::seconds(5);
        let merged = unit.patched(patch, later).unwrap();

        assert_eq!(merged.hit_points, 55);
        assert_eq!(merged.id, unit.id);
        assert_eq!(merged.created_at, unit.created_at);
        assert_eq!(merged.updated_at, later);
        let mut expected = unit.attributes();
        expected.hit_points = 55;
        assert_eq!(merged.attributes(), expected);
    }

    #[test]
    fn patch_out_of_bounds_is_rejected() {
        let unit = stored_marine();
        let patch: UnitPatch = serde_json::from_value(json!({"hit_points": -5})).unwrap();
        let err = unit.patched(patch, Utc::now()).unwrap_err();
        assert!(err.has_field("hit_points"));
        assert_eq!(unit.hit_points, 45);
    }

    #[test]
    fn patch_null_description_clears_it() {
        let mut attrs = marine();
        attrs.description = Some("rifleman".to_string());
        let unit = Unit::new(Uuid::new_v4(), attrs, Utc::now());

        let keep: UnitPatch = serde_json::from_value(json!({"armor": 1})).unwrap();
        assert_eq!(
            unit.patched(keep, Utc::now()).unwrap().description.as_deref(),
            Some("rifleman")
        );

        let clear: UnitPatch = serde_json::from_value(json!({"description": null})).unwrap();
        assert_eq!(unit.patched(clear, Utc::now()).unwrap().description, None);
    }

    #[test]
    fn patch_validate_checks_supplied_only() {
        let ok: UnitPatch = serde_json::from_value(json!({"armor": 2})).unwrap();
        assert!(ok.validate().is_ok());
        let bad: UnitPatch = serde_json::from_value(json!({"armor": -2, "name": ""})).unwrap();
        assert_eq!(bad.validate().unwrap_err().violations().len(), 2);
    }

    #[test]
    fn identity_key_and_message() {
        let unit = stored_marine();
        assert_eq!(unit.identity_key(), ("Marine".to_string(), Race::Terran));
        assert_eq!(
            unit.duplicate_message(),
            "terran unit with name 'Marine' already exists"
        );
    }

    #[test]
    fn filter_combines_with_and() {
        let unit = stored_marine();
        assert!(UnitFilter::default().matches(&unit));

        let terran = UnitFilter {
            race: Some(Race::Terran),
            ..Default::default()
        };
        assert!(terran.matches(&unit));

        let terran_worker = UnitFilter {
            race: Some(Race::Terran),
            unit_type: Some(UnitType::Worker),
            ..Default::default()
        };
        assert!(!terran_worker.matches(&unit));

        let by_name = UnitFilter {
            name: Some("ARI".to_string()),
            min_cost: Some(50),
            max_cost: Some(50),
            ..Default::default()
        };
        assert!(by_name.matches(&unit));

        let too_cheap = UnitFilter {
            max_cost: Some(49),
            ..Default::default()
        };
        assert!(!too_cheap.matches(&unit));
    }

    #[test]
    fn read_shape_round_trips_through_json() {
        let unit = stored_marine();
        let json = serde_json::to_value(&unit).unwrap();
        assert_eq!(json["movement_speed"], json!(3.15));
        assert_eq!(json["unit_type"], json!("basic"));
        let back: Unit = serde_json::from_value(json).unwrap();
        assert_eq!(back, unit);
    }
}
