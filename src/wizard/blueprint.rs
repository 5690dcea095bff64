//! Definitions of the marketplace forms

use super::cascade::FieldDependency;
use super::schema::Schema;
use super::step::StepKind;
use crate::marketplace::Mutation;
use crate::state::{EntityType, FieldMap, FieldValue, FormValues, Operation, TaxonomyLevel};
use crate::submission::{FieldPlan, FieldSpec};

const SERVICE_DEPENDENCIES: &[FieldDependency] = &[
    FieldDependency {
        parent: "category",
        children: &["subcategory", "tags"],
    },
    FieldDependency {
        parent: "subcategory",
        children: &["subdivision", "tags"],
    },
    FieldDependency {
        parent: "subscription",
        children: &["subscription_period"],
    },
];

/// Maximum number of add-ons per service
pub const MAX_ADDONS: usize = 3;
/// Maximum number of media files per service
pub const MAX_MEDIA: usize = 10;

/// Which form a wizard drives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Blueprint {
    ServiceListing {
        operation: Operation,
    },
    ProfileOnboarding,
    TaxonomyItem {
        level: TaxonomyLevel,
        operation: Operation,
    },
}

impl Blueprint {
    /// Blueprint for an entity kind and operation, as recorded in drafts
    pub fn for_entity(entity_type: EntityType, operation: Operation) -> Self {
        match entity_type {
            EntityType::Service => Blueprint::ServiceListing { operation },
            EntityType::Profile => Blueprint::ProfileOnboarding,
            EntityType::Category => Blueprint::TaxonomyItem {
                level: TaxonomyLevel::Category,
                operation,
            },
            EntityType::Subcategory => Blueprint::TaxonomyItem {
                level: TaxonomyLevel::Subcategory,
                operation,
            },
            EntityType::Subdivision => Blueprint::TaxonomyItem {
                level: TaxonomyLevel::Subdivision,
                operation,
            },
        }
    }

    pub fn title(&self) -> String {
        match self {
            Blueprint::ServiceListing {
                operation: Operation::Create,
            } => "New service".to_string(),
            Blueprint::ServiceListing {
                operation: Operation::Update,
            } => "Edit service".to_string(),
            Blueprint::ProfileOnboarding => "Profile onboarding".to_string(),
            Blueprint::TaxonomyItem { level, operation } => match operation {
                Operation::Create => format!("New {}", level.entity_type()),
                Operation::Update => format!("Edit {}", level.entity_type()),
            },
        }
    }

    pub fn entity_type(&self) -> EntityType {
        match self {
            Blueprint::ServiceListing { .. } => EntityType::Service,
            Blueprint::ProfileOnboarding => EntityType::Profile,
            Blueprint::TaxonomyItem { level, .. } => level.entity_type(),
        }
    }

    pub fn operation(&self) -> Operation {
        match self {
            Blueprint::ServiceListing { operation } => *operation,
            Blueprint::ProfileOnboarding => Operation::Create,
            Blueprint::TaxonomyItem { operation, .. } => *operation,
        }
    }

    pub fn total_steps(&self) -> usize {
        match self {
            Blueprint::ServiceListing { .. } => 6,
            Blueprint::ProfileOnboarding => 3,
            Blueprint::TaxonomyItem { .. } => 1,
        }
    }

    /// Kind of the 1-based `step` for the current values
    pub fn step_kind(&self, step: usize, values: &FormValues) -> Option<StepKind> {
        let kind = match (self, step) {
            (Blueprint::ServiceListing { .. }, 1) => StepKind::ProfileSelect,
            (Blueprint::ServiceListing { .. }, 2) => {
                if values.flag("online") {
                    StepKind::PresenceOnline
                } else {
                    StepKind::OnsiteOnbase {
                        onsite: values.flag("onsite"),
                        onbase: values.flag("onbase"),
                    }
                }
            }
            (Blueprint::ServiceListing { .. }, 3) => StepKind::Details,
            (Blueprint::ServiceListing { .. }, 4) => StepKind::OneoffSubscription {
                subscription: values.flag("subscription"),
            },
            (Blueprint::ServiceListing { .. }, 5) => StepKind::Addons {
                max_items: MAX_ADDONS,
            },
            (Blueprint::ServiceListing { .. }, 6) => StepKind::Media {
                field: "media",
                max_files: MAX_MEDIA,
            },
            (Blueprint::ProfileOnboarding, 1) => StepKind::ProfileBasics,
            (Blueprint::ProfileOnboarding, 2) => StepKind::ProfileContact,
            (Blueprint::ProfileOnboarding, 3) => StepKind::Media {
                field: "avatar",
                max_files: 1,
            },
            (Blueprint::TaxonomyItem { level, .. }, 1) => StepKind::TaxonomyEntry { level: *level },
            _ => return None,
        };
        Some(kind)
    }

    /// Full-entity schema: every step schema for the given values
    pub fn canonical_schema(&self, values: &FormValues) -> Schema {
        (1..=self.total_steps())
            .filter_map(|step| self.step_kind(step, values))
            .fold(Schema::new(), |schema, kind| schema.merge(kind.schema()))
    }

    /// Fields that must still hold a value when the form is submitted
    pub fn required_at_submit(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Blueprint::ServiceListing { .. } => &[("profile", "Profile")],
            Blueprint::ProfileOnboarding => &[("display_name", "Display name"), ("email", "Email")],
            Blueprint::TaxonomyItem { .. } => &[],
        }
    }

    pub fn dependencies(&self) -> &'static [FieldDependency] {
        match self {
            Blueprint::ServiceListing { .. } => SERVICE_DEPENDENCIES,
            Blueprint::ProfileOnboarding | Blueprint::TaxonomyItem { .. } => &[],
        }
    }

    /// Field holding media to upload before submission, if any
    pub fn asset_field(&self) -> Option<&'static str> {
        match self {
            Blueprint::ServiceListing { .. } => Some("media"),
            Blueprint::ProfileOnboarding => Some("avatar"),
            Blueprint::TaxonomyItem { .. } => None,
        }
    }

    pub fn field_plan(&self) -> FieldPlan {
        let plan = match self {
            Blueprint::ServiceListing { .. } => FieldPlan::new(vec![
                FieldSpec::text("profile"),
                FieldSpec::boolean("online"),
                FieldSpec::boolean("onsite"),
                FieldSpec::boolean("onbase"),
                FieldSpec::text("coverage_area").skip_empty(),
                FieldSpec::text("address").skip_empty(),
                FieldSpec::text("title"),
                FieldSpec::text("description"),
                FieldSpec::text("category"),
                FieldSpec::text("subcategory"),
                FieldSpec::text("subdivision"),
                FieldSpec::json("tags"),
                FieldSpec::boolean("subscription"),
                FieldSpec::number("price"),
                FieldSpec::text("subscription_period").skip_empty(),
                FieldSpec::json("addons"),
                FieldSpec::json("media"),
                FieldSpec::boolean("published"),
            ]),
            Blueprint::ProfileOnboarding => FieldPlan::new(vec![
                FieldSpec::text("display_name"),
                FieldSpec::text("tagline"),
                FieldSpec::text("bio").skip_empty(),
                FieldSpec::text("email"),
                FieldSpec::text("phone").skip_empty(),
                FieldSpec::text("website").skip_empty(),
                FieldSpec::json("avatar").skip_empty(),
            ]),
            Blueprint::TaxonomyItem { .. } => FieldPlan::new(vec![
                FieldSpec::text("label"),
                FieldSpec::text("slug"),
                FieldSpec::text("parent").skip_empty(),
            ]),
        };
        match self.operation() {
            Operation::Create => plan,
            Operation::Update => plan.partial(),
        }
    }

    pub fn mutation(&self) -> Mutation {
        match self {
            Blueprint::ServiceListing {
                operation: Operation::Create,
            } => Mutation::CreateService,
            Blueprint::ServiceListing {
                operation: Operation::Update,
            } => Mutation::UpdateService,
            Blueprint::ProfileOnboarding => Mutation::CreateProfile,
            Blueprint::TaxonomyItem {
                level,
                operation: Operation::Create,
            } => Mutation::CreateTaxonomy(*level),
            Blueprint::TaxonomyItem {
                level,
                operation: Operation::Update,
            } => Mutation::UpdateTaxonomy(*level),
        }
    }

    /// Whether a successful submission also records a local draft
    pub fn records_drafts(&self) -> bool {
        matches!(
            self,
            Blueprint::TaxonomyItem {
                operation: Operation::Update,
                ..
            }
        )
    }

    /// Whether changed taxonomy or profiles require reloading pickers
    pub fn refreshes_catalog(&self) -> bool {
        matches!(
            self,
            Blueprint::TaxonomyItem { .. } | Blueprint::ProfileOnboarding
        )
    }

    pub fn initial_values(&self) -> FieldMap {
        let text = |name: &str| (name.to_string(), FieldValue::Text(String::new()));
        let flag = |name: &str, value: bool| (name.to_string(), FieldValue::Flag(value));
        let choice = |name: &str| (name.to_string(), FieldValue::Choice(None));

        match self {
            Blueprint::ServiceListing { .. } => FieldMap::from([
                choice("profile"),
                flag("online", true),
                flag("onsite", false),
                flag("onbase", false),
                text("coverage_area"),
                text("address"),
                text("title"),
                text("description"),
                choice("category"),
                choice("subcategory"),
                choice("subdivision"),
                ("tags".to_string(), FieldValue::Tags(Vec::new())),
                flag("subscription", false),
                text("price"),
                choice("subscription_period"),
                ("addons".to_string(), FieldValue::Items(Vec::new())),
                ("media".to_string(), FieldValue::Assets(Vec::new())),
                flag("published", false),
            ]),
            Blueprint::ProfileOnboarding => FieldMap::from([
                text("display_name"),
                text("tagline"),
                text("bio"),
                text("email"),
                text("phone"),
                text("website"),
                ("avatar".to_string(), FieldValue::Assets(Vec::new())),
            ]),
            Blueprint::TaxonomyItem { .. } => {
                FieldMap::from([text("label"), text("slug"), choice("parent")])
            }
        }
    }

    /// Empty add-on item
    pub fn new_addon() -> FieldMap {
        FieldMap::from([
            ("title".to_string(), FieldValue::Text(String::new())),
            ("description".to_string(), FieldValue::Text(String::new())),
            ("price".to_string(), FieldValue::Text(String::new())),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SERVICE: Blueprint = Blueprint::ServiceListing {
        operation: Operation::Create,
    };

    fn service_values() -> FormValues {
        FormValues::new(SERVICE.initial_values())
    }

    #[test]
    fn test_every_step_resolves() {
        for blueprint in [
            SERVICE,
            Blueprint::ProfileOnboarding,
            Blueprint::TaxonomyItem {
                level: TaxonomyLevel::Subcategory,
                operation: Operation::Create,
            },
        ] {
            let values = FormValues::new(blueprint.initial_values());
            for step in 1..=blueprint.total_steps() {
                assert!(blueprint.step_kind(step, &values).is_some());
            }
            assert!(blueprint.step_kind(0, &values).is_none());
            assert!(blueprint.step_kind(blueprint.total_steps() + 1, &values).is_none());
        }
    }

    #[test]
    fn test_presence_step_follows_online_flag() {
        let mut values = service_values();
        assert_eq!(SERVICE.step_kind(2, &values), Some(StepKind::PresenceOnline));
        values.set_path("online", FieldValue::Flag(false));
        values.set_path("onbase", FieldValue::Flag(true));
        assert_eq!(
            SERVICE.step_kind(2, &values),
            Some(StepKind::OnsiteOnbase {
                onsite: false,
                onbase: true
            })
        );
    }

    #[test]
    fn test_canonical_schema_spans_all_steps() {
        let schema = SERVICE.canonical_schema(&service_values());
        let fields: Vec<&str> = schema.field_names().collect();
        for expected in ["profile", "title", "price", "addons", "media"] {
            assert!(fields.contains(&expected), "missing {expected}");
        }
    }

    #[test]
    fn test_update_plan_is_partial() {
        let plan = Blueprint::ServiceListing {
            operation: Operation::Update,
        }
        .field_plan();
        assert!(plan.fields().iter().all(|f| f.skip_empty));
        assert!(SERVICE.field_plan().fields().iter().any(|f| !f.skip_empty));
    }

    #[test]
    fn test_plan_covers_initial_values() {
        for blueprint in [SERVICE, Blueprint::ProfileOnboarding] {
            let initial = blueprint.initial_values();
            for spec in blueprint.field_plan().fields() {
                assert!(initial.contains_key(spec.name), "{} not initialised", spec.name);
            }
        }
    }

    #[test]
    fn test_only_taxonomy_edits_record_drafts() {
        assert!(!SERVICE.records_drafts());
        assert!(Blueprint::TaxonomyItem {
            level: TaxonomyLevel::Category,
            operation: Operation::Update
        }
        .records_drafts());
        assert!(!Blueprint::TaxonomyItem {
            level: TaxonomyLevel::Category,
            operation: Operation::Create
        }
        .records_drafts());
    }

    #[test]
    fn test_for_entity_matches_entity_type() {
        for blueprint in [
            SERVICE,
            Blueprint::ProfileOnboarding,
            Blueprint::TaxonomyItem {
                level: TaxonomyLevel::Subcategory,
                operation: Operation::Update,
            },
        ] {
            assert_eq!(
                Blueprint::for_entity(blueprint.entity_type(), blueprint.operation()),
                blueprint
            );
        }
    }

    #[test]
    fn test_titles() {
        assert_eq!(SERVICE.title(), "New service");
        assert_eq!(
            Blueprint::TaxonomyItem {
                level: TaxonomyLevel::Subdivision,
                operation: Operation::Update
            }
            .title(),
            "Edit subdivision"
        );
    }
}
