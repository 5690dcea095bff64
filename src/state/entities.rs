//! Marketplace entity definitions shared by forms, drafts and the API client

use super::forms::{Asset, Choice, FieldMap, FieldValue, UploadedAsset};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of entity a form creates or edits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Service,
    Profile,
    Category,
    Subcategory,
    Subdivision,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Service => "service",
            Self::Profile => "profile",
            Self::Category => "category",
            Self::Subcategory => "subcategory",
            Self::Subdivision => "subdivision",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a form creates a new entity or updates an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Create,
    Update,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Level of a taxonomy node (category > subcategory > subdivision)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxonomyLevel {
    Category,
    Subcategory,
    Subdivision,
}

impl TaxonomyLevel {
    /// The level a node of this level hangs from, if any
    pub fn parent_level(&self) -> Option<TaxonomyLevel> {
        match self {
            Self::Category => None,
            Self::Subcategory => Some(Self::Category),
            Self::Subdivision => Some(Self::Subcategory),
        }
    }

    pub fn entity_type(&self) -> EntityType {
        match self {
            Self::Category => EntityType::Category,
            Self::Subcategory => EntityType::Subcategory,
            Self::Subdivision => EntityType::Subdivision,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Category => "Category",
            Self::Subcategory => "Subcategory",
            Self::Subdivision => "Subdivision",
        }
    }
}

/// Profile summary used by the profile picker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub published: bool,
}

/// A node of the service taxonomy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxonomyNode {
    pub id: String,
    pub label: String,
    pub slug: String,
    pub level: TaxonomyLevel,
    #[serde(default)]
    pub parent_id: Option<String>,
}

impl TaxonomyNode {
    pub fn as_choice(&self) -> Choice {
        Choice::new(&self.id, &self.label)
    }

    /// Form values for editing this node
    pub fn to_field_map(&self, parent: Option<&TaxonomyNode>) -> FieldMap {
        let mut map = FieldMap::new();
        map.insert("label".into(), FieldValue::Text(self.label.clone()));
        map.insert("slug".into(), FieldValue::Text(self.slug.clone()));
        map.insert(
            "parent".into(),
            FieldValue::Choice(parent.map(TaxonomyNode::as_choice)),
        );
        map
    }
}

/// Reference to a taxonomy node embedded in a service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxonomyRef {
    pub id: String,
    pub label: String,
}

/// Where a service is delivered
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coverage {
    #[serde(default)]
    pub online: bool,
    #[serde(default)]
    pub onsite: bool,
    #[serde(default)]
    pub onbase: bool,
    pub area: Option<String>,
    pub address: Option<String>,
}

/// Stored image descriptor as returned by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRef {
    pub url: String,
    pub public_id: String,
    pub resource_type: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl ImageRef {
    fn to_asset(&self) -> Asset {
        Asset::Uploaded(UploadedAsset {
            url: self.url.clone(),
            public_id: self.public_id.clone(),
            resource_type: self
                .resource_type
                .clone()
                .unwrap_or_else(|| "image".to_string()),
            width: self.width,
            height: self.height,
        })
    }
}

/// Publication state of a service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Visibility {
    #[serde(default)]
    pub published: bool,
}

/// Add-on line item of a service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddonSnapshot {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
}

/// A service as fetched from the backend for editing.
///
/// Every nested structure the backend may omit is an `Option`; they are all
/// resolved in [`ServiceSnapshot::to_field_map`] before reaching the form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceSnapshot {
    pub id: String,
    pub profile: Option<TaxonomyRef>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: Option<TaxonomyRef>,
    pub subcategory: Option<TaxonomyRef>,
    pub subdivision: Option<TaxonomyRef>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub price: Option<f64>,
    pub subscription_period: Option<String>,
    pub coverage: Option<Coverage>,
    pub image: Option<ImageRef>,
    #[serde(default)]
    pub gallery: Vec<ImageRef>,
    pub visibility: Option<Visibility>,
    #[serde(default)]
    pub addons: Vec<AddonSnapshot>,
}

impl ServiceSnapshot {
    /// Convert into form values, resolving every optional nested structure
    pub fn to_field_map(&self) -> FieldMap {
        let mut map = FieldMap::new();
        let choice = |r: &Option<TaxonomyRef>| {
            FieldValue::Choice(r.as_ref().map(|r| Choice::new(&r.id, &r.label)))
        };

        map.insert("profile".into(), choice(&self.profile));
        map.insert("title".into(), FieldValue::Text(self.title.clone()));
        map.insert(
            "description".into(),
            FieldValue::Text(self.description.clone()),
        );
        map.insert("category".into(), choice(&self.category));
        map.insert("subcategory".into(), choice(&self.subcategory));
        map.insert("subdivision".into(), choice(&self.subdivision));
        map.insert("tags".into(), FieldValue::Tags(self.tags.clone()));
        map.insert(
            "price".into(),
            FieldValue::Text(self.price.map(format_amount).unwrap_or_default()),
        );

        match &self.subscription_period {
            Some(period) => {
                map.insert("subscription".into(), FieldValue::Flag(true));
                map.insert(
                    "subscription_period".into(),
                    FieldValue::Choice(Some(Choice::new(period, &capitalize(period)))),
                );
            }
            None => {
                map.insert("subscription".into(), FieldValue::Flag(false));
                map.insert("subscription_period".into(), FieldValue::Choice(None));
            }
        }

        let (online, onsite, onbase, area, address) = match &self.coverage {
            Some(c) => (
                c.online,
                c.onsite,
                c.onbase,
                c.area.clone().unwrap_or_default(),
                c.address.clone().unwrap_or_default(),
            ),
            None => (true, false, false, String::new(), String::new()),
        };
        map.insert("online".into(), FieldValue::Flag(online));
        map.insert("onsite".into(), FieldValue::Flag(onsite));
        map.insert("onbase".into(), FieldValue::Flag(onbase));
        map.insert("coverage_area".into(), FieldValue::Text(area));
        map.insert("address".into(), FieldValue::Text(address));

        let mut media: Vec<Asset> = match &self.image {
            Some(image) => vec![image.to_asset()],
            None => Vec::new(),
        };
        media.extend(self.gallery.iter().map(ImageRef::to_asset));
        map.insert("media".into(), FieldValue::Assets(media));

        let published = match &self.visibility {
            Some(v) => v.published,
            None => false,
        };
        map.insert("published".into(), FieldValue::Flag(published));

        let addons = self
            .addons
            .iter()
            .map(|addon| {
                let mut item = FieldMap::new();
                item.insert("title".into(), FieldValue::Text(addon.title.clone()));
                item.insert(
                    "description".into(),
                    FieldValue::Text(addon.description.clone()),
                );
                item.insert("price".into(), FieldValue::Text(format_amount(addon.price)));
                item
            })
            .collect();
        map.insert("addons".into(), FieldValue::Items(addons));

        map
    }
}

/// Format an amount without a trailing `.0` for whole numbers
pub fn format_amount(amount: f64) -> String {
    if amount.fract() == 0.0 {
        format!("{amount:.0}")
    } else {
        amount.to_string()
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
