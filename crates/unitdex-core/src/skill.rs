//! # Skill Records
//!
//! Create, patch and read shapes for the Skill resource. Skill names are
//! unique among live skills regardless of category.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::decimal::Decimal;
use crate::error::ValidationErrors;
use crate::fields::Fields;
use crate::validate::{Rule, Validate, Validator};

/// Tactical classification of a skill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SkillCategory {
    Offensive,
    Defensive,
    Utility,
    Buff,
    Debuff,
    Summon,
}

impl SkillCategory {
    /// Every category, in declaration order.
    pub fn all() -> &'static [SkillCategory] {
        &[
            Self::Offensive,
            Self::Defensive,
            Self::Utility,
            Self::Buff,
            Self::Debuff,
            Self::Summon,
        ]
    }

    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Offensive => "offensive",
            Self::Defensive => "defensive",
            Self::Utility => "utility",
            Self::Buff => "buff",
            Self::Debuff => "debuff",
            Self::Summon => "summon",
        }
    }
}

impl std::fmt::Display for SkillCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a skill can be cast on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    /// The caster itself.
    #[serde(rename = "self")]
    Caster,
    SingleEnemy,
    SingleAlly,
    AreaEnemy,
    AreaAlly,
    GroundTarget,
}

impl TargetType {
    /// Every target type, in declaration order.
    pub fn all() -> &'static [TargetType] {
        &[
            Self::Caster,
            Self::SingleEnemy,
            Self::SingleAlly,
            Self::AreaEnemy,
            Self::AreaAlly,
            Self::GroundTarget,
        ]
    }

    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Caster => "self",
            Self::SingleEnemy => "single_enemy",
            Self::SingleAlly => "single_ally",
            Self::AreaEnemy => "area_enemy",
            Self::AreaAlly => "area_ally",
            Self::GroundTarget => "ground_target",
        }
    }
}

impl std::fmt::Display for TargetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Constraint declarations for each Skill field.
pub mod rules {
    use crate::validate::Rule;

    pub const NAME: &[Rule] = &[Rule::MinLength(1), Rule::MaxLength(100)];
    pub const ENERGY_COST: &[Rule] = &[Rule::Ge(0)];
    pub const COOLDOWN: &[Rule] = &[Rule::Ge(0), Rule::MaxDecimalPlaces(1)];
    pub const CAST_RANGE: &[Rule] = &[Rule::Ge(0)];
    pub const AREA_OF_EFFECT: &[Rule] = &[Rule::Ge(0)];
    pub const BASE_DAMAGE: &[Rule] = &[Rule::Ge(0)];
    pub const DURATION: &[Rule] = &[Rule::Ge(0), Rule::MaxDecimalPlaces(1)];
    pub const UPGRADE_LEVEL: &[Rule] = &[Rule::Ge(1), Rule::Le(5)];
    pub const PREREQUISITES: &[Rule] = &[Rule::MaxLength(200)];
    pub const DESCRIPTION: &[Rule] = &[Rule::MaxLength(1000)];
}

/// Constrained Skill fields by wire name.
pub const FIELD_RULES: &[(&str, &[Rule])] = &[
    ("name", rules::NAME),
    ("energy_cost", rules::ENERGY_COST),
    ("cooldown", rules::COOLDOWN),
    ("cast_range", rules::CAST_RANGE),
    ("area_of_effect", rules::AREA_OF_EFFECT),
    ("base_damage", rules::BASE_DAMAGE),
    ("duration", rules::DURATION),
    ("upgrade_level", rules::UPGRADE_LEVEL),
    ("prerequisites", rules::PREREQUISITES),
    ("description", rules::DESCRIPTION),
];

const DEFAULT_UPGRADE_LEVEL: i64 = 1;

fn default_upgrade_level() -> i64 {
    DEFAULT_UPGRADE_LEVEL
}

/// Skill creation payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SkillCreate {
    /// Skill name (e.g., Psionic Storm, Stim Pack, Plague).
    #[schema(min_length = 1, max_length = 100, example = "Psionic Storm")]
    pub name: String,
    pub category: SkillCategory,
    pub target_type: TargetType,
    /// Energy cost to cast.
    #[schema(minimum = 0, example = 75)]
    pub energy_cost: i64,
    /// Cooldown in seconds, at most one decimal place.
    #[schema(value_type = f64, minimum = 0, multiple_of = 0.1, example = 4.0)]
    pub cooldown: Decimal,
    /// Maximum casting range.
    #[schema(minimum = 0, example = 9)]
    pub cast_range: i64,
    /// Area of effect radius (0 for single target).
    #[serde(default)]
    #[schema(minimum = 0, example = 3)]
    pub area_of_effect: i64,
    /// Base damage (0 for non-damage skills).
    #[serde(default)]
    #[schema(minimum = 0, example = 80)]
    pub base_damage: i64,
    /// Effect duration in seconds (0 for instant effects).
    #[serde(default)]
    #[schema(value_type = f64, minimum = 0, multiple_of = 0.1, example = 4.0)]
    pub duration: Decimal,
    /// Upgrade level.
    #[serde(default = "default_upgrade_level")]
    #[schema(minimum = 1, maximum = 5, example = 1)]
    pub upgrade_level: i64,
    /// Required buildings or upgrades, comma separated.
    #[serde(default)]
    #[schema(max_length = 200, example = "Templar Archives")]
    pub prerequisites: Option<String>,
    /// Detailed skill description.
    #[serde(default)]
    #[schema(max_length = 1000)]
    pub description: Option<String>,
}

impl Validate for SkillCreate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.check("name", &self.name, rules::NAME)
            .check("energy_cost", &self.energy_cost, rules::ENERGY_COST)
            .check("cooldown", &self.cooldown, rules::COOLDOWN)
            .check("cast_range", &self.cast_range, rules::CAST_RANGE)
            .check("area_of_effect", &self.area_of_effect, rules::AREA_OF_EFFECT)
            .check("base_damage", &self.base_damage, rules::BASE_DAMAGE)
            .check("duration", &self.duration, rules::DURATION)
            .check("upgrade_level", &self.upgrade_level, rules::UPGRADE_LEVEL)
            .check_opt("prerequisites", self.prerequisites.as_ref(), rules::PREREQUISITES)
            .check_opt("description", self.description.as_ref(), rules::DESCRIPTION);
        v.finish()
    }
}

/// Skill partial-update payload.
///
/// `prerequisites: null` and `description: null` clear those fields; `null`
/// elsewhere is treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, ToSchema)]
pub struct SkillPatch {
    #[schema(min_length = 1, max_length = 100)]
    pub name: Option<String>,
    pub category: Option<SkillCategory>,
    pub target_type: Option<TargetType>,
    #[schema(minimum = 0)]
    pub energy_cost: Option<i64>,
    #[schema(value_type = Option<f64>, minimum = 0, multiple_of = 0.1)]
    pub cooldown: Option<Decimal>,
    #[schema(minimum = 0)]
    pub cast_range: Option<i64>,
    #[schema(minimum = 0)]
    pub area_of_effect: Option<i64>,
    #[schema(minimum = 0)]
    pub base_damage: Option<i64>,
    #[schema(value_type = Option<f64>, minimum = 0, multiple_of = 0.1)]
    pub duration: Option<Decimal>,
    #[schema(minimum = 1, maximum = 5)]
    pub upgrade_level: Option<i64>,
    #[serde(default, deserialize_with = "crate::patch::nullable")]
    #[schema(value_type = Option<String>, max_length = 200)]
    pub prerequisites: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::patch::nullable")]
    #[schema(value_type = Option<String>, max_length = 1000)]
    pub description: Option<Option<String>>,
}

impl SkillPatch {
    fn read(body: Map<String, Value>, v: &mut Validator) -> Self {
        let mut f = Fields::from(body);
        Self {
            name: f.take(v, "name"),
            category: f.take(v, "category"),
            target_type: f.take(v, "target_type"),
            energy_cost: f.take_int(v, "energy_cost"),
            cooldown: f.take(v, "cooldown"),
            cast_range: f.take_int(v, "cast_range"),
            area_of_effect: f.take_int(v, "area_of_effect"),
            base_damage: f.take_int(v, "base_damage"),
            duration: f.take(v, "duration"),
            upgrade_level: f.take_int(v, "upgrade_level"),
            prerequisites: f.take_nullable(v, "prerequisites"),
            description: f.take_nullable(v, "description"),
        }
    }

    /// Parse a partial-update body, reporting every bad field at once.
    pub fn from_json(body: Map<String, Value>) -> Result<Self, ValidationErrors> {
        let mut v = Validator::new();
        let patch = Self::read(body, &mut v);
        patch.check_supplied(&mut v);
        v.finish()?;
        Ok(patch)
    }

    fn check_supplied(&self, v: &mut Validator) {
        v.check_opt("name", self.name.as_ref(), rules::NAME)
            .check_opt("energy_cost", self.energy_cost.as_ref(), rules::ENERGY_COST)
            .check_opt("cooldown", self.cooldown.as_ref(), rules::COOLDOWN)
            .check_opt("cast_range", self.cast_range.as_ref(), rules::CAST_RANGE)
            .check_opt("area_of_effect", self.area_of_effect.as_ref(), rules::AREA_OF_EFFECT)
            .check_opt("base_damage", self.base_damage.as_ref(), rules::BASE_DAMAGE)
            .check_opt("duration", self.duration.as_ref(), rules::DURATION)
            .check_opt("upgrade_level", self.upgrade_level.as_ref(), rules::UPGRADE_LEVEL)
            .check_opt(
                "prerequisites",
                self.prerequisites.as_ref().and_then(Option::as_ref),
                rules::PREREQUISITES,
            )
            .check_opt(
                "description",
                self.description.as_ref().and_then(Option::as_ref),
                rules::DESCRIPTION,
            );
    }

    /// Overwrite the supplied fields of `target`.
    pub fn apply_to(self, target: &mut SkillCreate) {
        if let Some(name) = self.name {
            target.name = name;
        }
        if let Some(category) = self.category {
            target.category = category;
        }
        if let Some(target_type) = self.target_type {
            target.target_type = target_type;
        }
        if let Some(energy_cost) = self.energy_cost {
            target.energy_cost = energy_cost;
        }
        if let Some(cooldown) = self.cooldown {
            target.cooldown = cooldown;
        }
        if let Some(cast_range) = self.cast_range {
            target.cast_range = cast_range;
        }
        if let Some(area_of_effect) = self.area_of_effect {
            target.area_of_effect = area_of_effect;
        }
        if let Some(base_damage) = self.base_damage {
            target.base_damage = base_damage;
        }
        if let Some(duration) = self.duration {
            target.duration = duration;
        }
        if let Some(upgrade_level) = self.upgrade_level {
            target.upgrade_level = upgrade_level;
        }
        if let Some(prerequisites) = self.prerequisites {
            target.prerequisites = prerequisites;
        }
        if let Some(description) = self.description {
            target.description = description;
        }
    }
}

impl Validate for SkillPatch {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        self.check_supplied(&mut v);
        v.finish()
    }
}

impl TryFrom<SkillPatch> for SkillCreate {
    type Error = ValidationErrors;

    fn try_from(p: SkillPatch) -> Result<Self, Self::Error> {
        SkillCreate::promote(p, Validator::new())
    }
}

impl SkillCreate {
    /// Parse a creation body. Wrong types, missing required fields and rule
    /// violations are all reported in one error.
    pub fn from_json(body: Map<String, Value>) -> Result<Self, ValidationErrors> {
        let mut v = Validator::new();
        let patch = SkillPatch::read(body, &mut v);
        Self::promote(patch, v)
    }

    fn promote(p: SkillPatch, mut v: Validator) -> Result<Self, ValidationErrors> {
        p.check_supplied(&mut v);
        let name = v.require("name", p.name);
        let category = v.require("category", p.category);
        let target_type = v.require("target_type", p.target_type);
        let energy_cost = v.require("energy_cost", p.energy_cost);
        let cooldown = v.require("cooldown", p.cooldown);
        let cast_range = v.require("cast_range", p.cast_range);

        let (
            Some(name),
            Some(category),
            Some(target_type),
            Some(energy_cost),
            Some(cooldown),
            Some(cast_range),
        ) = (name, category, target_type, energy_cost, cooldown, cast_range)
        else {
            return Err(v.into_errors());
        };
        v.finish()?;

        Ok(SkillCreate {
            name,
            category,
            target_type,
            energy_cost,
            cooldown,
            cast_range,
            area_of_effect: p.area_of_effect.unwrap_or(0),
            base_damage: p.base_damage.unwrap_or(0),
            duration: p.duration.unwrap_or(Decimal::ZERO),
            upgrade_level: p.upgrade_level.unwrap_or(DEFAULT_UPGRADE_LEVEL),
            prerequisites: p.prerequisites.flatten(),
            description: p.description.flatten(),
        })
    }
}

/// A stored skill, as returned by every endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Skill {
    /// Server-generated skill ID.
    pub id: Uuid,
    pub name: String,
    pub category: SkillCategory,
    pub target_type: TargetType,
    pub energy_cost: i64,
    #[schema(value_type = f64)]
    pub cooldown: Decimal,
    pub cast_range: i64,
    pub area_of_effect: i64,
    pub base_damage: i64,
    #[schema(value_type = f64)]
    pub duration: Decimal,
    pub upgrade_level: i64,
    pub prerequisites: Option<String>,
    pub description: Option<String>,
    /// Creation timestamp (UTC).
    pub created_at: DateTime<Utc>,
    /// Last update timestamp (UTC).
    pub updated_at: DateTime<Utc>,
}

impl Skill {
    /// Materialize a validated creation payload under `id`.
    pub fn new(id: Uuid, attrs: SkillCreate, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: attrs.name,
            category: attrs.category,
            target_type: attrs.target_type,
            energy_cost: attrs.energy_cost,
            cooldown: attrs.cooldown,
            cast_range: attrs.cast_range,
            area_of_effect: attrs.area_of_effect,
            base_damage: attrs.base_damage,
            duration: attrs.duration,
            upgrade_level: attrs.upgrade_level,
            prerequisites: attrs.prerequisites,
            description: attrs.description,
            created_at: now,
            updated_at: now,
        }
    }

    /// The client-controlled fields of this record.
    pub fn attributes(&self) -> SkillCreate {
        SkillCreate {
            name: self.name.clone(),
            category: self.category,
            target_type: self.target_type,
            energy_cost: self.energy_cost,
            cooldown: self.cooldown,
            cast_range: self.cast_range,
            area_of_effect: self.area_of_effect,
            base_damage: self.base_damage,
            duration: self.duration,
            upgrade_level: self.upgrade_level,
            prerequisites: self.prerequisites.clone(),
            description: self.description.clone(),
        }
    }

    /// Merge `patch` onto a copy of this record and re-validate the result.
    pub fn patched(&self, patch: SkillPatch, now: DateTime<Utc>) -> Result<Skill, ValidationErrors> {
        let mut attrs = self.attributes();
        patch.apply_to(&mut attrs);
        attrs.validate()?;
        let mut merged = Skill::new(self.id, attrs, self.created_at);
        merged.updated_at = now;
        Ok(merged)
    }

    /// Uniqueness key among live skills.
    pub fn identity_key(&self) -> String {
        self.name.clone()
    }

    /// Message reported when another live skill already holds this key.
    pub fn duplicate_message(&self) -> String {
        format!("Skill with name '{}' already exists", self.name)
    }
}

/// Query filters for listing skills. All supplied filters must match.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SkillFilter {
    /// Filter by skill category.
    pub category: Option<SkillCategory>,
    /// Filter by target type.
    pub target_type: Option<TargetType>,
    /// Case-insensitive substring match on the skill name.
    pub name: Option<String>,
    /// Minimum base damage (inclusive).
    pub min_damage: Option<i64>,
    /// Maximum energy cost (inclusive).
    pub max_energy: Option<i64>,
    /// Exact upgrade level.
    pub upgrade_level: Option<i64>,
}

impl SkillFilter {
    /// Whether `skill` passes every supplied filter.
    pub fn matches(&self, skill: &Skill) -> bool {
        if self.category.is_some_and(|c| skill.category != c) {
            return false;
        }
        if self.target_type.is_some_and(|t| skill.target_type != t) {
            return false;
        }
        if let Some(ref needle) = self.name {
            if !skill.name.to_lowercase().contains(&needle.to_lowercase()) {
                return false;
            }
        }
        if self.min_damage.is_some_and(|min| skill.base_damage < min) {
            return false;
        }
        if self.max_energy.is_some_and(|max| skill.energy_cost > max) {
            return false;
        }
        if self.upgrade_level.is_some_and(|lvl| skill.upgrade_level != lvl) {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn storm_patch() -> SkillPatch {
        serde_json::from_value(json!({
            "name": "Psionic Storm",
            "category": "offensive",
            "target_type": "area_enemy",
            "energy_cost": 75,
            "cooldown": 4.0,
            "cast_range": 9
        }))
        .unwrap()
    }

    #[test]
    fn from_json_reports_every_bad_field() {
        let Value::Object(body) = json!({
            "name": "Psionic Storm",
            "category": "arcane",
            "target_type": 3,
            "energy_cost": 75.5,
            "cooldown": 1.25,
            "cast_range": 9,
            "upgrade_level": 6
        }) else {
            unreachable!()
        };
        let err = SkillCreate::from_json(body).unwrap_err();
        for field in ["category", "target_type", "energy_cost", "cooldown", "upgrade_level"] {
            assert!(err.has_field(field), "missing violation for {field}: {err}");
        }
        assert!(!err.violations().iter().any(|v| v.rule == "missing"));
    }

    fn storm() -> Skill {
        let create = SkillCreate::try_from(storm_patch()).unwrap();
        Skill::new(Uuid::new_v4(), create, Utc::now())
    }

    #[test]
    fn target_type_self_wire_name() {
        assert_eq!(serde_json::to_value(TargetType::Caster).unwrap(), json!("self"));
        let t: TargetType = serde_json::from_value(json!("ground_target")).unwrap();
        assert_eq!(t, TargetType::GroundTarget);
        for t in TargetType::all() {
            assert_eq!(serde_json::to_value(t).unwrap(), json!(t.as_str()));
        }
        for c in SkillCategory::all() {
            assert_eq!(serde_json::to_value(c).unwrap(), json!(c.as_str()));
        }
    }

    #[test]
    fn defaults_fill_in() {
        let skill = storm();
        assert_eq!(skill.area_of_effect, 0);
        assert_eq!(skill.base_damage, 0);
        assert_eq!(skill.duration, Decimal::ZERO);
        assert_eq!(skill.upgrade_level, 1);
        assert_eq!(skill.prerequisites, None);
    }

    #[test]
    fn upgrade_level_bounds() {
        let mut create = storm().attributes();
        create.upgrade_level = 5;
        assert!(create.validate().is_ok());
        create.upgrade_level = 6;
        assert!(create.validate().unwrap_err().has_field("upgrade_level"));
        create.upgrade_level = 0;
        assert!(create.validate().unwrap_err().has_field("upgrade_level"));
    }

    #[test]
    fn cooldown_allows_one_decimal_place() {
        let mut create = storm().attributes();
        create.cooldown = "1.5".parse().unwrap();
        assert!(create.validate().is_ok());
        create.cooldown = "1.25".parse().unwrap();
        let err = create.validate().unwrap_err();
        assert_eq!(err.violations()[0].field, "cooldown");
        assert_eq!(err.violations()[0].rule, "decimal_places");
    }

    #[test]
    fn missing_required_fields_are_all_reported() {
        let patch: SkillPatch = serde_json::from_value(json!({"name": "Stim Pack"})).unwrap();
        let err = SkillCreate::try_from(patch).unwrap_err();
        for field in ["category", "target_type", "energy_cost", "cooldown", "cast_range"] {
            assert!(err.has_field(field), "{field} not reported: {err}");
        }
        assert_eq!(err.violations().len(), 5);
    }

    #[test]
    fn patch_clears_prerequisites_only_when_null() {
        let mut attrs = storm().attributes();
        attrs.prerequisites = Some("Templar Archives".to_string());
        let skill = Skill::new(Uuid::new_v4(), attrs, Utc::now());

        let rename: SkillPatch = serde_json::from_value(json!({"base_damage": 80})).unwrap();
        let merged = skill.patched(rename, Utc::now()).unwrap();
        assert_eq!(merged.prerequisites.as_deref(), Some("Templar Archives"));
        assert_eq!(merged.base_damage, 80);

        let clear: SkillPatch = serde_json::from_value(json!({"prerequisites": null})).unwrap();
        assert_eq!(skill.patched(clear, Utc::now()).unwrap().prerequisites, None);
    }

    #[test]
    fn patch_rejects_out_of_range_merge() {
        let skill = storm();
        let patch: SkillPatch = serde_json::from_value(json!({"upgrade_level": 9})).unwrap();
        assert!(skill.patched(patch, Utc::now()).is_err());
    }

    #[test]
    fn duplicate_message_names_the_skill() {
        assert_eq!(
            storm().duplicate_message(),
            "Skill with name 'Psionic Storm' already exists"
        );
        assert_eq!(storm().identity_key(), "Psionic Storm");
    }

    #[test]
    fn filter_matches() {
        let skill = storm();
        let f = SkillFilter {
            category: Some(SkillCategory::Offensive),
            target_type: Some(TargetType::AreaEnemy),
            name: Some("storm".to_string()),
            max_energy: Some(75),
            upgrade_level: Some(1),
            ..Default::default()
        };
        assert!(f.matches(&skill));

        let f = SkillFilter {
            min_damage: Some(1),
            ..Default::default()
        };
        assert!(!f.matches(&skill));

        let f = SkillFilter {
            category: Some(SkillCategory::Buff),
            ..Default::default()
        };
        assert!(!f.matches(&skill));
    }
}
