//! Step kinds of the wizards and their schemas

use super::schema::{Rule, Schema};
use crate::state::{FieldBinding, FormValues, TaxonomyLevel, WidgetKind};

/// Kind of a wizard step, carrying only the data the step needs.
///
/// Schemas, titles and bindings are all resolved through one exhaustive
/// match per concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    ProfileSelect,
    PresenceOnline,
    OnsiteOnbase { onsite: bool, onbase: bool },
    OneoffSubscription { subscription: bool },
    Details,
    Addons { max_items: usize },
    Media { field: &'static str, max_files: usize },
    ProfileBasics,
    ProfileContact,
    TaxonomyEntry { level: TaxonomyLevel },
}

impl StepKind {
    pub fn title(&self) -> &'static str {
        match self {
            StepKind::ProfileSelect => "Profile",
            StepKind::PresenceOnline => "Presence: online",
            StepKind::OnsiteOnbase { .. } => "Presence: on-site / on-base",
            StepKind::OneoffSubscription { .. } => "Pricing",
            StepKind::Details => "Details",
            StepKind::Addons { .. } => "Add-ons",
            StepKind::Media { .. } => "Media",
            StepKind::ProfileBasics => "About you",
            StepKind::ProfileContact => "Contact",
            StepKind::TaxonomyEntry { level } => level.label(),
        }
    }

    /// Optional steps are valid when the user entered nothing
    pub fn is_optional(&self) -> bool {
        matches!(self, StepKind::Addons { .. } | StepKind::Media { .. })
    }

    /// Fields whose emptiness makes an optional step trivially valid
    pub fn content_fields(&self) -> Vec<&'static str> {
        match self {
            StepKind::Addons { .. } => vec!["addons"],
            StepKind::Media { field, .. } => vec![*field],
            _ => Vec::new(),
        }
    }

    /// Fields this step owns; their errors are cleared when it validates
    pub fn fields(&self) -> Vec<&'static str> {
        match self {
            StepKind::PresenceOnline => vec!["online"],
            StepKind::OnsiteOnbase { .. } => {
                vec!["online", "onsite", "onbase", "coverage_area", "address"]
            }
            StepKind::OneoffSubscription { .. } => {
                vec!["subscription", "price", "subscription_period"]
            }
            _ => self.schema().field_names().collect(),
        }
    }

    pub fn schema(&self) -> Schema {
        match self {
            StepKind::ProfileSelect => {
                Schema::new().field("profile", "Profile", vec![Rule::Required])
            }
            StepKind::PresenceOnline => Schema::new(),
            StepKind::OnsiteOnbase { onsite, onbase } => {
                let mut schema = Schema::new();
                if !onsite && !onbase {
                    schema = schema.field(
                        "onsite",
                        "On-site or on-base presence",
                        vec![Rule::Required],
                    );
                }
                if *onsite {
                    schema = schema.field(
                        "coverage_area",
                        "Coverage area",
                        vec![Rule::Required, Rule::MinLength(2)],
                    );
                }
                if *onbase {
                    schema = schema.field(
                        "address",
                        "Address",
                        vec![Rule::Required, Rule::MinLength(5)],
                    );
                }
                schema
            }
            StepKind::OneoffSubscription { subscription } => {
                let schema =
                    Schema::new().field("price", "Price", vec![Rule::Required, Rule::Positive]);
                if *subscription {
                    schema.field(
                        "subscription_period",
                        "Subscription period",
                        vec![Rule::Required],
                    )
                } else {
                    schema
                }
            }
            StepKind::Details => Schema::new()
                .field(
                    "title",
                    "Title",
                    vec![Rule::Required, Rule::MinLength(10), Rule::MaxLength(100)],
                )
                .field(
                    "description",
                    "Description",
                    vec![Rule::Required, Rule::MinLength(80), Rule::MaxLength(5000)],
                )
                .field("category", "Category", vec![Rule::Required])
                .field("subcategory", "Subcategory", vec![Rule::Required])
                .field("subdivision", "Subdivision", vec![Rule::Required])
                .field("tags", "Tags", vec![Rule::MaxItems(10)]),
            StepKind::Addons { max_items } => Schema::new().field(
                "addons",
                "Add-ons",
                vec![Rule::MaxItems(*max_items), Rule::Each(addon_schema())],
            ),
            StepKind::Media { field, max_files } => {
                Schema::new().field(*field, "Media", vec![Rule::MaxItems(*max_files)])
            }
            StepKind::ProfileBasics => Schema::new()
                .field(
                    "display_name",
                    "Display name",
                    vec![Rule::Required, Rule::MinLength(3), Rule::MaxLength(80)],
                )
                .field(
                    "tagline",
                    "Tagline",
                    vec![Rule::Required, Rule::MinLength(10), Rule::MaxLength(120)],
                )
                .field("bio", "Bio", vec![Rule::MinLength(80), Rule::MaxLength(5000)]),
            StepKind::ProfileContact => Schema::new()
                .field("email", "Email", vec![Rule::Required, Rule::Email])
                .field("phone", "Phone", vec![Rule::MinLength(10), Rule::MaxLength(20)])
                .field("website", "Website", vec![Rule::Url]),
            StepKind::TaxonomyEntry { level } => {
                let schema = Schema::new()
                    .field(
                        "label",
                        "Label",
                        vec![Rule::Required, Rule::MinLength(2), Rule::MaxLength(80)],
                    )
                    .field(
                        "slug",
                        "Slug",
                        vec![Rule::Required, Rule::MinLength(2), Rule::Slug],
                    );
                match level.parent_level() {
                    Some(parent) => schema.field("parent", parent.label(), vec![Rule::Required]),
                    None => schema,
                }
            }
        }
    }

    /// Visible inputs of the step for the current values
    pub fn bindings(&self, values: &FormValues) -> Vec<FieldBinding> {
        match self {
            StepKind::ProfileSelect => {
                vec![FieldBinding::new("profile", "Profile", WidgetKind::Select)]
            }
            StepKind::PresenceOnline => {
                vec![FieldBinding::new("online", "Delivered online", WidgetKind::Toggle)]
            }
            StepKind::OnsiteOnbase { onsite, onbase } => {
                let mut bindings = vec![
                    FieldBinding::new("online", "Delivered online", WidgetKind::Toggle),
                    FieldBinding::new("onsite", "At the client's place", WidgetKind::Toggle),
                    FieldBinding::new("onbase", "At my place", WidgetKind::Toggle),
                ];
                if *onsite {
                    bindings.push(FieldBinding::text("coverage_area", "Coverage area"));
                }
                if *onbase {
                    bindings.push(FieldBinding::text("address", "Address"));
                }
                bindings
            }
            StepKind::OneoffSubscription { subscription } => {
                let mut bindings = vec![
                    FieldBinding::new("subscription", "Subscription", WidgetKind::Toggle),
                    FieldBinding::new("price", "Price", WidgetKind::NumberInput),
                ];
                if *subscription {
                    bindings.push(FieldBinding::new(
                        "subscription_period",
                        "Billing period",
                        WidgetKind::Select,
                    ));
                }
                bindings
            }
            StepKind::Details => vec![
                FieldBinding::text("title", "Title"),
                FieldBinding::multiline("description", "Description"),
                FieldBinding::new("category", "Category", WidgetKind::Select),
                FieldBinding::new("subcategory", "Subcategory", WidgetKind::Select),
                FieldBinding::new("subdivision", "Subdivision", WidgetKind::Select),
                FieldBinding::new("tags", "Tags (comma separated)", WidgetKind::TagInput),
            ],
            StepKind::Addons { .. } => (0..values.item_count("addons"))
                .flat_map(|i| {
                    let n = i + 1;
                    [
                        FieldBinding::text(
                            &format!("addons.{i}.title"),
                            &format!("Add-on {n} title"),
                        ),
                        FieldBinding::text(
                            &format!("addons.{i}.description"),
                            &format!("Add-on {n} description"),
                        ),
                        FieldBinding::new(
                            format!("addons.{i}.price"),
                            format!("Add-on {n} price"),
                            WidgetKind::NumberInput,
                        ),
                    ]
                })
                .collect(),
            StepKind::Media { field, .. } => {
                vec![FieldBinding::new(*field, "Media files", WidgetKind::AssetInput)]
            }
            StepKind::ProfileBasics => vec![
                FieldBinding::text("display_name", "Display name"),
                FieldBinding::text("tagline", "Tagline"),
                FieldBinding::multiline("bio", "Bio"),
            ],
            StepKind::ProfileContact => vec![
                FieldBinding::text("email", "Email"),
                FieldBinding::text("phone", "Phone"),
                FieldBinding::text("website", "Website"),
            ],
            StepKind::TaxonomyEntry { level } => {
                let mut bindings = vec![
                    FieldBinding::text("label", "Label"),
                    FieldBinding::text("slug", "Slug"),
                ];
                if let Some(parent) = level.parent_level() {
                    bindings.push(FieldBinding::new("parent", parent.label(), WidgetKind::Select));
                }
                bindings
            }
        }
    }
}

/// Schema every started add-on item must satisfy
pub fn addon_schema() -> Schema {
    Schema::new()
        .field("title", "Title", vec![Rule::Required, Rule::MinLength(3)])
        .field(
            "description",
            "Description",
            vec![Rule::Required, Rule::MinLength(10)],
        )
        .field("price", "Price", vec![Rule::Required, Rule::Positive])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{FieldMap, FieldValue};

    fn addon_values(count: usize) -> FormValues {
        let mut map = FieldMap::new();
        map.insert("addons".to_string(), FieldValue::Items(vec![FieldMap::new(); count]));
        FormValues::new(map)
    }

    #[test]
    fn test_optional_kinds() {
        assert!(StepKind::Addons { max_items: 3 }.is_optional());
        assert!(StepKind::Media { field: "media", max_files: 10 }.is_optional());
        assert!(!StepKind::Details.is_optional());
        assert!(!StepKind::ProfileSelect.is_optional());
    }

    #[test]
    fn test_onsite_onbase_schema_depends_on_flags() {
        let neither = StepKind::OnsiteOnbase { onsite: false, onbase: false }.schema();
        assert_eq!(neither.field_names().collect::<Vec<_>>(), vec!["onsite"]);
        let both = StepKind::OnsiteOnbase { onsite: true, onbase: true }.schema();
        assert_eq!(
            both.field_names().collect::<Vec<_>>(),
            vec!["coverage_area", "address"]
        );
    }

    #[test]
    fn test_subscription_requires_period() {
        let oneoff = StepKind::OneoffSubscription { subscription: false }.schema();
        assert_eq!(oneoff.field_names().count(), 1);
        let subscription = StepKind::OneoffSubscription { subscription: true }.schema();
        assert!(subscription.field_names().any(|f| f == "subscription_period"));
    }

    #[test]
    fn test_category_level_has_no_parent() {
        let category = StepKind::TaxonomyEntry { level: TaxonomyLevel::Category };
        assert!(!category.schema().field_names().any(|f| f == "parent"));
        let sub = StepKind::TaxonomyEntry { level: TaxonomyLevel::Subcategory };
        assert!(sub.schema().field_names().any(|f| f == "parent"));
        assert_eq!(sub.bindings(&FormValues::default()).len(), 3);
    }

    #[test]
    fn test_addon_bindings_per_item() {
        let kind = StepKind::Addons { max_items: 3 };
        assert!(kind.bindings(&addon_values(0)).is_empty());
        let bindings = kind.bindings(&addon_values(2));
        assert_eq!(bindings.len(), 6);
        assert_eq!(bindings[3].path, "addons.1.title");
        assert_eq!(bindings[5].widget, WidgetKind::NumberInput);
    }

    #[test]
    fn test_presence_fields_cover_all_toggles() {
        let kind = StepKind::OnsiteOnbase { onsite: false, onbase: false };
        assert!(kind.fields().contains(&"coverage_area"));
    }
}
