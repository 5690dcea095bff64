//! Application state and core logic

use crate::config::WizardConfig;
use crate::draft::{Draft, DraftAdapter, DraftKey, JsonDraftStore, MemoryDraftStore};
use crate::error::WizardError;
use crate::marketplace::{MarketplaceApi, MarketplaceClient};
use crate::platform::is_command;
use crate::state::{
    AppState, FieldBinding, FieldValue, FormValues, HomeAction, Notification, Operation, View,
    WidgetKind,
};
use crate::submission::{self, reconcile, Reconciliation};
use crate::wizard::{Blueprint, StepKind, Wizard};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Main application struct
pub struct App {
    /// Current application state
    pub state: AppState,
    /// Marketplace backend and asset store
    api: Box<dyn MarketplaceApi>,
    /// Local draft persistence
    drafts: DraftAdapter,
    config: WizardConfig,
    /// Whether the app should quit
    quit: bool,
}

impl App {
    /// Create a new App instance
    pub async fn new(config: WizardConfig) -> Result<Self> {
        let api = MarketplaceClient::new(&config)?;

        let drafts_path = config.drafts_path();
        let drafts = match JsonDraftStore::open(&drafts_path) {
            Ok(store) => DraftAdapter::new(Box::new(store)),
            Err(e) => {
                tracing::warn!(
                    "Cannot open drafts at {}: {e}; drafts are kept in memory",
                    drafts_path.display()
                );
                DraftAdapter::new(Box::new(MemoryDraftStore::new()))
            }
        };

        Ok(Self::with_parts(Box::new(api), drafts, config).await)
    }

    /// Assemble the app from its collaborators and load the home data
    pub async fn with_parts(
        api: Box<dyn MarketplaceApi>,
        drafts: DraftAdapter,
        config: WizardConfig,
    ) -> Self {
        let mut app = Self {
            state: AppState::default(),
            api,
            drafts,
            config,
            quit: false,
        };

        app.state.backend_connected = app.api.check_connection().await;
        if app.state.backend_connected {
            app.refresh_catalog().await;
        } else {
            tracing::warn!("Marketplace backend is not reachable");
        }
        app.refresh_drafts();
        app
    }

    /// Check if app should quit
    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Push an error message to the error queue for display
    pub fn push_error(&mut self, message: impl Into<String>) {
        self.state.push_error(message.into());
    }

    /// Reload profiles and taxonomy backing the pickers
    pub async fn refresh_catalog(&mut self) {
        match self.api.list_profiles().await {
            Ok(profiles) => self.state.catalog.profiles = profiles,
            Err(e) => {
                tracing::warn!("Failed to load profiles: {e:#}");
                self.state
                    .notify(Notification::error("Could not load profiles"));
            }
        }
        match self.api.list_taxonomy().await {
            Ok(taxonomy) => self.state.catalog.taxonomy = taxonomy,
            Err(e) => {
                tracing::warn!("Failed to load taxonomy: {e:#}");
                self.state
                    .notify(Notification::error("Could not load categories"));
            }
        }
    }

    pub fn refresh_drafts(&mut self) {
        match self.drafts.list() {
            Ok(drafts) => self.state.drafts = drafts,
            Err(e) => tracing::warn!("Failed to list drafts: {e}"),
        }
        let count = self.state.home_actions().len();
        if self.state.home_index >= count {
            self.state.home_index = count.saturating_sub(1);
        }
    }

    /// Handle keyboard input
    pub async fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        // Handle error dialog dismissal first (modal)
        if self.state.has_errors() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                self.state.dismiss_error();
            }
            return Ok(());
        }

        match self.state.current_view {
            View::Home => self.handle_home_key(key).await?,
            View::Wizard => self.handle_wizard_key(key).await?,
        }
        Ok(())
    }

    async fn handle_home_key(&mut self, key: KeyEvent) -> Result<()> {
        if let Some(input) = self.state.service_id_input.as_mut() {
            match key.code {
                KeyCode::Esc => self.state.service_id_input = None,
                KeyCode::Enter => {
                    let id = input.trim().to_string();
                    self.state.service_id_input = None;
                    if !id.is_empty() {
                        self.open_service_edit(&id).await;
                    }
                }
                KeyCode::Backspace => {
                    input.pop();
                }
                KeyCode::Char(c) => input.push(c),
                _ => {}
            }
            return Ok(());
        }

        let count = self.state.home_actions().len();
        match key.code {
            KeyCode::Char('q') => self.quit = true,
            KeyCode::Char('j') | KeyCode::Down => self.state.move_selection_down(count),
            KeyCode::Char('k') | KeyCode::Up => self.state.move_selection_up(),
            KeyCode::Char('r') => {
                self.state.backend_connected = self.api.check_connection().await;
                if self.state.backend_connected {
                    self.refresh_catalog().await;
                }
                self.refresh_drafts();
            }
            KeyCode::Enter => {
                let selected = self
                    .state
                    .home_actions()
                    .into_iter()
                    .nth(self.state.home_index);
                if let Some((action, _)) = selected {
                    self.activate(action).await;
                }
            }
            _ => {}
        }
        Ok(())
    }

    async fn activate(&mut self, action: HomeAction) {
        match action {
            HomeAction::NewService => self.state.open_wizard(Wizard::new(Blueprint::ServiceListing {
                operation: Operation::Create,
            })),
            HomeAction::EditService => self.state.service_id_input = Some(String::new()),
            HomeAction::NewProfile => self
                .state
                .open_wizard(Wizard::new(Blueprint::ProfileOnboarding)),
            HomeAction::NewTaxonomy(level) => {
                self.state.open_wizard(Wizard::new(Blueprint::TaxonomyItem {
                    level,
                    operation: Operation::Create,
                }))
            }
            HomeAction::EditTaxonomy(id) => {
                let Some(node) = self.state.catalog.node(&id).cloned() else {
                    self.state
                        .notify(Notification::error(format!("Unknown taxonomy node {id}")));
                    return;
                };
                let parent = node
                    .parent_id
                    .as_deref()
                    .and_then(|parent| self.state.catalog.node(parent));
                let values = node.to_field_map(parent);
                let blueprint = Blueprint::TaxonomyItem {
                    level: node.level,
                    operation: Operation::Update,
                };
                self.state
                    .open_wizard(Wizard::for_target(blueprint, &node.id, values));
            }
            HomeAction::ResumeDraft(key) => match self.drafts.load(&key) {
                Ok(Some(draft)) => self.state.open_wizard(Wizard::from_draft(&draft)),
                Ok(None) => {
                    self.state
                        .notify(Notification::error(format!("Draft {key} no longer exists")));
                    self.refresh_drafts();
                }
                Err(e) => {
                    tracing::error!("Failed to load draft {key}: {e}");
                    self.push_error(e.user_message());
                }
            },
        }
    }

    async fn open_service_edit(&mut self, id: &str) {
        match self.api.fetch_service(id).await {
            Ok(snapshot) => {
                let blueprint = Blueprint::ServiceListing {
                    operation: Operation::Update,
                };
                let values = snapshot.to_field_map();
                self.state
                    .open_wizard(Wizard::for_target(blueprint, snapshot.id, values));
            }
            Err(e) => {
                tracing::warn!("Failed to fetch service {id}: {e:#}");
                self.push_error(format!("Could not load service {id}"));
            }
        }
    }

    async fn handle_wizard_key(&mut self, key: KeyEvent) -> Result<()> {
        if is_command(key.modifiers) {
            match key.code {
                KeyCode::Char('s') => self.start_submit(),
                KeyCode::Char('d') => self.save_draft(),
                KeyCode::Char('n') => self.advance(),
                KeyCode::Char('p') => {
                    if let Some(wizard) = self.state.wizard.as_mut() {
                        if wizard.retreat() {
                            self.state.active_field = 0;
                        }
                    }
                }
                KeyCode::Char('a') => self.add_addon(),
                KeyCode::Char('x') => {
                    if let Some(wizard) = self.state.wizard.as_mut() {
                        wizard.remove_last_item("addons");
                    }
                }
                _ => {}
            }
            self.state.clamp_active_field();
            return Ok(());
        }

        if key.modifiers.contains(KeyModifiers::ALT) {
            if let KeyCode::Char(c) = key.code {
                if let Some(step) = c.to_digit(10) {
                    self.jump(step as usize);
                }
            }
            return Ok(());
        }

        let binding = self.state.active_binding();
        let widget = binding.as_ref().map(|b| b.widget);
        let multiline = binding.as_ref().is_some_and(FieldBinding::is_multiline);
        match key.code {
            KeyCode::Esc => {
                let discarded = self
                    .state
                    .wizard
                    .as_ref()
                    .map(|w| w.form().dirty_fields().len())
                    .unwrap_or_default();
                self.state.close_wizard();
                if discarded > 0 {
                    self.state.notify(Notification::info(format!(
                        "Discarded changes to {discarded} field(s)"
                    )));
                }
            }
            KeyCode::Tab | KeyCode::Down => {
                self.state.asset_path_input.clear();
                self.state.next_field();
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.state.asset_path_input.clear();
                self.state.prev_field();
            }
            KeyCode::Left if widget == Some(WidgetKind::Select) => self.cycle_choice(false),
            KeyCode::Right if widget == Some(WidgetKind::Select) => self.cycle_choice(true),
            KeyCode::Char(' ') if widget == Some(WidgetKind::Toggle) => self.toggle_active(),
            KeyCode::Enter => match widget {
                Some(WidgetKind::AssetInput) => self.queue_typed_asset(),
                Some(WidgetKind::TextInput { .. }) if multiline => self.type_char('\n'),
                Some(WidgetKind::Toggle) => self.toggle_active(),
                Some(WidgetKind::Select) => self.cycle_choice(true),
                _ => self.state.next_field(),
            },
            KeyCode::Backspace => self.backspace(),
            KeyCode::Char(c) => match widget {
                Some(WidgetKind::AssetInput) => self.state.asset_path_input.push(c),
                Some(WidgetKind::NumberInput) if !(c.is_ascii_digit() || c == '.') => {}
                Some(w) if w.accepts_text() => self.type_char(c),
                _ => {}
            },
            _ => {}
        }
        self.state.clamp_active_field();
        Ok(())
    }

    fn advance(&mut self) {
        let Some(wizard) = self.state.wizard.as_mut() else {
            return;
        };
        match wizard.advance() {
            Ok(_) => self.state.active_field = 0,
            Err(rejection) => self
                .state
                .notify(Notification::error(rejection.summary())),
        }
    }

    fn jump(&mut self, step: usize) {
        let Some(wizard) = self.state.wizard.as_mut() else {
            return;
        };
        if wizard.jump(step) {
            self.state.active_field = 0;
        } else {
            self.state.notify(Notification::info(format!(
                "Complete the earlier steps before step {step}"
            )));
        }
    }

    fn add_addon(&mut self) {
        let Some(wizard) = self.state.wizard.as_mut() else {
            return;
        };
        if !matches!(wizard.current_kind(), Some(StepKind::Addons { .. })) {
            self.state
                .notify(Notification::info("Add-ons are edited on the add-ons step"));
            return;
        }
        if let Some(index) = wizard.add_item("addons") {
            self.state.active_field = index * 3;
        }
    }

    /// Select the next or previous option of the focused picker
    fn cycle_choice(&mut self, forward: bool) {
        let (Some(binding), Some(wizard)) =
            (self.state.active_binding(), self.state.wizard.as_ref())
        else {
            return;
        };
        let options = self.state.catalog.options_for(&binding.path, wizard);
        if options.is_empty() {
            self.state.notify(Notification::info(format!(
                "No options for {}",
                binding.label
            )));
            return;
        }

        let current = wizard
            .form()
            .get_path(&binding.path)
            .and_then(FieldValue::as_choice)
            .and_then(|c| options.iter().position(|o| o.id == c.id));
        let len = options.len();
        let next = match (current, forward) {
            (None, true) => 0,
            (None, false) => len - 1,
            (Some(i), true) => (i + 1) % len,
            (Some(i), false) => (i + len - 1) % len,
        };
        let choice = options[next].clone();
        self.set_active_value(&binding.path, FieldValue::Choice(Some(choice)));
    }

    fn set_active_value(&mut self, path: &str, value: FieldValue) {
        let Some(wizard) = self.state.wizard.as_mut() else {
            return;
        };
        let cleared = wizard.set_field(path, value);
        if cleared.is_empty() {
            return;
        }
        let was = wizard
            .form()
            .previous_label(path)
            .map(|label| format!(" (was {label})"))
            .unwrap_or_default();
        let message = format!("Changed {path}{was}, cleared {}", cleared.join(", "));
        self.state.notify(Notification::info(message));
    }

    fn toggle_active(&mut self) {
        let Some(binding) = self.state.active_binding() else {
            return;
        };
        if let Some(wizard) = self.state.wizard.as_mut() {
            wizard.update_field(&binding.path, FieldValue::toggle);
        }
    }

    fn type_char(&mut self, c: char) {
        let Some(binding) = self.state.active_binding() else {
            return;
        };
        if let Some(wizard) = self.state.wizard.as_mut() {
            wizard.update_field(&binding.path, |value| value.push_char(c));
        }
    }

    fn backspace(&mut self) {
        let Some(binding) = self.state.active_binding() else {
            return;
        };
        if binding.widget == WidgetKind::AssetInput && !self.state.asset_path_input.is_empty() {
            self.state.asset_path_input.pop();
            return;
        }
        if let Some(wizard) = self.state.wizard.as_mut() {
            wizard.update_field(&binding.path, FieldValue::pop_char);
        }
    }

    fn queue_typed_asset(&mut self) {
        let path = self.state.asset_path_input.trim().to_string();
        let Some(binding) = self.state.active_binding() else {
            return;
        };
        if path.is_empty() {
            return;
        }
        let Some(wizard) = self.state.wizard.as_mut() else {
            return;
        };
        if wizard.queue_asset(binding.field(), &path) {
            self.state.asset_path_input.clear();
            self.state
                .notify(Notification::info(format!("Attached {path}, uploaded on submit")));
        }
    }

    /// Save the wizard's values as a local draft
    fn save_draft(&mut self) {
        let Some(wizard) = self.state.wizard.as_mut() else {
            return;
        };
        let schema = wizard.blueprint().canonical_schema(wizard.form());
        let result = self.drafts.save(wizard.to_draft(), &schema);
        if let Err(WizardError::DraftRejected(errors)) = &result {
            for error in errors {
                wizard.form_mut().set_error(&error.path, &error.message);
            }
        }

        match result {
            Ok(key) => {
                self.state
                    .notify(Notification::success(format!("Draft saved ({key})")));
                self.refresh_drafts();
            }
            Err(e @ WizardError::DraftRejected(_)) => {
                self.state.notify(Notification::error(e.user_message()));
            }
            Err(e) => {
                tracing::error!("Failed to save draft: {e}");
                self.push_error(e.user_message());
            }
        }
    }

    /// Check the form and enter the submitting state. The submission itself
    /// runs from `run_pending_submit`, after the overlay has been drawn.
    fn start_submit(&mut self) {
        let Some(wizard) = self.state.wizard.as_mut() else {
            return;
        };
        let started = wizard.check_submit().and_then(|()| wizard.begin_submit());
        if let Err(e) = started {
            self.report_submit_error(e);
        }
    }

    /// Whether a submission has been started and waits to be sent
    pub fn has_pending_submit(&self) -> bool {
        self.state.wizard.as_ref().is_some_and(Wizard::is_pending)
    }

    pub async fn run_pending_submit(&mut self) {
        if self.has_pending_submit() {
            self.submit_wizard().await;
        }
    }

    async fn submit_wizard(&mut self) {
        let Some(wizard) = self.state.wizard.as_mut() else {
            return;
        };
        let resumed = wizard.resumed_draft().cloned();

        let outcome = match submission::submit(wizard, self.api.as_ref()).await {
            Ok(result) => reconcile(&result, wizard, self.config.record_drafts_on_success()),
            Err(e) => {
                self.report_submit_error(e);
                return;
            }
        };
        self.apply_reconciliation(outcome, resumed.as_ref()).await;
    }

    fn report_submit_error(&mut self, error: WizardError) {
        match error {
            WizardError::StepRejected(rejection) => {
                if let Some(wizard) = self.state.wizard.as_mut() {
                    wizard.jump(rejection.step);
                }
                self.state.active_field = 0;
                self.state
                    .notify(Notification::error(rejection.summary()));
            }
            WizardError::Unexpected(_) | WizardError::DraftStore(_) | WizardError::Marshal(_) => {
                tracing::error!("Submission failed: {error}");
                self.push_error(error.user_message());
            }
            other => self.state.notify(Notification::error(other.user_message())),
        }
    }

    async fn apply_reconciliation(&mut self, outcome: Reconciliation, resumed: Option<&DraftKey>) {
        if let Some(key) = resumed.filter(|_| outcome.navigate_home) {
            // A resumed draft is spent once its values reach the backend
            if let Err(e) = self.drafts.discard(key) {
                tracing::warn!("Failed to discard draft {key}: {e}");
            }
        }
        if let Some(draft) = outcome.draft {
            self.record_draft(draft);
        }

        self.state.notify(outcome.notification);
        if outcome.navigate_home {
            self.state.close_wizard();
        }
        if outcome.refresh_catalog {
            self.refresh_catalog().await;
        }
        self.refresh_drafts();
    }

    fn record_draft(&mut self, draft: Draft) {
        let blueprint = Blueprint::for_entity(draft.entity_type, draft.operation);
        let schema = blueprint.canonical_schema(&FormValues::new(draft.payload.clone()));
        if let Err(e) = self.drafts.save(draft, &schema) {
            tracing::warn!("Draft not recorded after submission: {e}");
        }
    }
}
