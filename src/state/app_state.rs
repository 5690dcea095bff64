//! Application state definitions

use super::entities::{ProfileSummary, TaxonomyLevel, TaxonomyNode};
use super::forms::{Choice, FieldBinding};
use crate::draft::{Draft, DraftKey};
use crate::wizard::{Blueprint, Wizard};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// How long a notification stays in the status bar
const NOTIFICATION_TTL: Duration = Duration::from_secs(5);

const SUBSCRIPTION_PERIODS: &[(&str, &str)] =
    &[("weekly", "Weekly"), ("monthly", "Monthly"), ("yearly", "Yearly")];

/// Current view in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Home,
    Wizard,
}

/// Entries of the home menu
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HomeAction {
    NewService,
    EditService,
    NewProfile,
    NewTaxonomy(TaxonomyLevel),
    EditTaxonomy(String),
    ResumeDraft(DraftKey),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

/// Toast shown in the status bar
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    pub created_at: Instant,
}

impl Notification {
    fn new(level: NotificationLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            created_at: Instant::now(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Error, message)
    }

    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() >= NOTIFICATION_TTL
    }
}

/// Reference data backing the select fields
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub profiles: Vec<ProfileSummary>,
    pub taxonomy: Vec<TaxonomyNode>,
}

impl Catalog {
    pub fn node(&self, id: &str) -> Option<&TaxonomyNode> {
        self.taxonomy.iter().find(|n| n.id == id)
    }

    fn nodes_at(&self, level: TaxonomyLevel, parent: Option<&str>) -> Vec<Choice> {
        self.taxonomy
            .iter()
            .filter(|n| n.level == level)
            .filter(|n| match parent {
                Some(parent) => n.parent_id.as_deref() == Some(parent),
                None => true,
            })
            .map(TaxonomyNode::as_choice)
            .collect()
    }

    /// Options of the select field at `path` given the wizard's values.
    ///
    /// Dependent pickers only list children of the selected parent and are
    /// empty until one is chosen.
    pub fn options_for(&self, path: &str, wizard: &Wizard) -> Vec<Choice> {
        let selected = |field: &str| {
            wizard
                .form()
                .get(field)
                .and_then(|v| v.as_choice())
                .map(|c| c.id.clone())
        };

        match (wizard.blueprint(), path) {
            (Blueprint::ServiceListing { .. }, "profile") => self
                .profiles
                .iter()
                .map(|p| Choice::new(&p.id, &p.display_name))
                .collect(),
            (Blueprint::ServiceListing { .. }, "category") => {
                self.nodes_at(TaxonomyLevel::Category, None)
            }
            (Blueprint::ServiceListing { .. }, "subcategory") => match selected("category") {
                Some(parent) => self.nodes_at(TaxonomyLevel::Subcategory, Some(&parent)),
                None => Vec::new(),
            },
            (Blueprint::ServiceListing { .. }, "subdivision") => match selected("subcategory") {
                Some(parent) => self.nodes_at(TaxonomyLevel::Subdivision, Some(&parent)),
                None => Vec::new(),
            },
            (Blueprint::ServiceListing { .. }, "subscription_period") => SUBSCRIPTION_PERIODS
                .iter()
                .map(|(id, label)| Choice::new(id, label))
                .collect(),
            (Blueprint::TaxonomyItem { level, .. }, "parent") => match level.parent_level() {
                Some(parent_level) => self.nodes_at(parent_level, None),
                None => Vec::new(),
            },
            _ => Vec::new(),
        }
    }
}

/// Main application state
#[derive(Default)]
pub struct AppState {
    // Navigation
    pub current_view: View,
    pub home_index: usize,

    // Data
    pub catalog: Catalog,
    pub drafts: Vec<Draft>,
    pub backend_connected: bool,

    // Wizard
    pub wizard: Option<Wizard>,
    pub active_field: usize,
    /// Path typed into an asset field before it is queued
    pub asset_path_input: String,
    /// Service id typed on the home view, when prompting for one
    pub service_id_input: Option<String>,

    // Feedback
    pub notification: Option<Notification>,
    error_queue: VecDeque<String>,
}

impl AppState {
    /// Home menu entries with their labels
    pub fn home_actions(&self) -> Vec<(HomeAction, String)> {
        let mut actions = vec![
            (HomeAction::NewService, "New service".to_string()),
            (HomeAction::EditService, "Edit service by id".to_string()),
            (HomeAction::NewProfile, "New profile".to_string()),
        ];
        for level in [
            TaxonomyLevel::Category,
            TaxonomyLevel::Subcategory,
            TaxonomyLevel::Subdivision,
        ] {
            actions.push((
                HomeAction::NewTaxonomy(level),
                format!("New {}", level.entity_type()),
            ));
        }
        for node in &self.catalog.taxonomy {
            actions.push((
                HomeAction::EditTaxonomy(node.id.clone()),
                format!("Edit {}: {}", node.level.entity_type(), node.label),
            ));
        }
        for draft in &self.drafts {
            actions.push((
                HomeAction::ResumeDraft(draft.key()),
                format!("Resume draft {}", draft.key()),
            ));
        }
        actions
    }

    pub fn move_selection_down(&mut self, max: usize) {
        if max > 0 && self.home_index < max - 1 {
            self.home_index += 1;
        }
    }

    pub fn move_selection_up(&mut self) {
        if self.home_index > 0 {
            self.home_index -= 1;
        }
    }

    /// Enter a wizard
    pub fn open_wizard(&mut self, wizard: Wizard) {
        self.wizard = Some(wizard);
        self.active_field = 0;
        self.asset_path_input.clear();
        self.current_view = View::Wizard;
    }

    /// Leave the wizard for the home view
    pub fn close_wizard(&mut self) {
        self.wizard = None;
        self.active_field = 0;
        self.asset_path_input.clear();
        self.current_view = View::Home;
    }

    /// Inputs of the current step
    pub fn bindings(&self) -> Vec<FieldBinding> {
        self.wizard.as_ref().map(Wizard::bindings).unwrap_or_default()
    }

    pub fn active_binding(&self) -> Option<FieldBinding> {
        self.bindings().into_iter().nth(self.active_field)
    }

    pub fn next_field(&mut self) {
        let count = self.bindings().len();
        if count > 0 {
            self.active_field = (self.active_field + 1) % count;
        }
    }

    pub fn prev_field(&mut self) {
        let count = self.bindings().len();
        if count == 0 {
            return;
        }
        if self.active_field == 0 {
            self.active_field = count - 1;
        } else {
            self.active_field -= 1;
        }
    }

    /// Keep the focus within the current step's inputs
    pub fn clamp_active_field(&mut self) {
        let count = self.bindings().len();
        if self.active_field >= count {
            self.active_field = count.saturating_sub(1);
        }
    }

    pub fn notify(&mut self, notification: Notification) {
        self.notification = Some(notification);
    }

    /// Drop the notification once it expired
    pub fn expire_notification(&mut self) {
        if self.notification.as_ref().is_some_and(Notification::is_expired) {
            self.notification = None;
        }
    }

    pub fn push_error(&mut self, message: String) {
        self.error_queue.push_back(message);
    }

    pub fn has_errors(&self) -> bool {
        !self.error_queue.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.error_queue.len()
    }

    pub fn current_error(&self) -> Option<&str> {
        self.error_queue.front().map(String::as_str)
    }

    pub fn dismiss_error(&mut self) {
        self.error_queue.pop_front();
    }
}
