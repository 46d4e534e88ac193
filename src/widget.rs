//! Application state and event handlers.
//!
//! `Widget` owns every piece of shared state and is driven one event at a
//! time through `&mut self`, so handlers run to completion without
//! interleaving. Each handler re-renders the grid and tray from the current
//! state and, when a page path is configured, rewrites the page snapshot.

use std::future::Future;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use advisor_core::assistant::{routine_request, AssistantClient};
use advisor_core::catalog::CatalogLoader;
use advisor_core::config::AppConfig;
use advisor_core::error::Result;
use advisor_core::filter::FilterState;
use advisor_core::selection::{SelectionChange, SelectionStore};
use advisor_core::storage::{JsonFileStore, KeyValueStore, SELECTED_CATEGORY_KEY};
use advisor_core::types::{Product, Sender, Transcript};
use advisor_render::html::{self, PageView};
use advisor_render::locale::{self, Direction};
use advisor_render::modal::{Modal, ModalClick};
use tracing::{debug, error, info, warn};

pub const TYPING: &str = "Typing...";
pub const EMPTY_SELECTION_GUIDANCE: &str = "No products selected yet. Please select products from \
    the grid above to create your personalized routine.";
pub const FOLLOW_UP: &str =
    "Would you like me to modify this routine or explain any specific steps in more detail?";
pub const ROUTINE_ERROR: &str = "Sorry, there was an error generating your routine. Please try \
    again or ask me specific questions about your selected products.";

/// Transient message shown while a routine is being generated.
pub fn generating_message(count: usize) -> String {
    format!(
        "Generating your personalized routine with {} selected product{}...",
        count,
        if count > 1 { "s" } else { "" }
    )
}

/// Knobs that do not belong to any single component.
#[derive(Debug, Clone)]
pub struct WidgetOptions {
    pub follow_up_delay: Duration,
    pub language: Option<String>,
    pub page_path: Option<PathBuf>,
}

impl Default for WidgetOptions {
    fn default() -> Self {
        Self {
            follow_up_delay: Duration::from_millis(1000),
            language: None,
            page_path: None,
        }
    }
}

/// What `generate_routine` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutineOutcome {
    /// Nothing selected; guidance shown, no request made.
    NothingSelected,
    /// Routine shown and a follow-up scheduled.
    Generated,
    /// Request failed; error shown, no follow-up.
    Failed,
}

pub struct Widget {
    catalog: CatalogLoader,
    assistant: AssistantClient,
    storage: Box<dyn KeyValueStore>,
    selection: SelectionStore,
    filter: FilterState,
    transcript: Transcript,
    modal: Modal,
    grid: String,
    tray: String,
    follow_up_delay: Duration,
    follow_up_due: Option<Instant>,
    language: String,
    direction: Direction,
    page_path: Option<PathBuf>,
}

impl Widget {
    /// Assemble the widget and rehydrate the selection from storage.
    pub fn new(
        catalog: CatalogLoader,
        assistant: AssistantClient,
        storage: Box<dyn KeyValueStore>,
        options: WidgetOptions,
    ) -> Self {
        let selection = SelectionStore::rehydrate(storage.as_ref());
        let (language, direction) = locale::detect(options.language.as_deref());
        let mut widget = Self {
            catalog,
            assistant,
            storage,
            selection,
            filter: FilterState::default(),
            transcript: Transcript::new(),
            modal: Modal::new(),
            grid: String::new(),
            tray: String::new(),
            follow_up_delay: options.follow_up_delay,
            follow_up_due: None,
            language,
            direction,
            page_path: options.page_path,
        };
        widget.refresh();
        widget
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let catalog = CatalogLoader::from_config(&config.catalog)?;
        let assistant = AssistantClient::new(&config.assistant)?;
        let storage = Box::new(JsonFileStore::open(config.storage_path()));
        let options = WidgetOptions {
            follow_up_delay: Duration::from_millis(config.assistant.follow_up_delay_ms),
            language: config.ui.language.clone(),
            page_path: config.ui.page_path.clone(),
        };
        Ok(Self::new(catalog, assistant, storage, options))
    }

    /// Startup: restore the persisted category, which filters the grid with
    /// no further input.
    pub async fn start(&mut self) -> Result<()> {
        let stored = match self.storage.get(SELECTED_CATEGORY_KEY) {
            Ok(value) => value.filter(|c| !c.is_empty()),
            Err(e) => {
                warn!("Could not read stored category: {}", e);
                None
            }
        };
        if let Some(category) = stored {
            info!("Restoring category '{}'", category);
            self.set_category(&category).await?;
        }
        Ok(())
    }

    /// Fetch the catalog without touching the filter.
    pub async fn load_catalog(&mut self) -> Result<()> {
        self.catalog.load().await?;
        Ok(())
    }

    // ── Filter events ───────────────────────────────────────────────────

    pub async fn set_category(&mut self, category: &str) -> Result<()> {
        self.catalog.load().await?;
        if let Err(e) = self.storage.set(SELECTED_CATEGORY_KEY, category) {
            error!("Error saving selected category to storage: {}", e);
        }
        self.filter.category = category.to_string();
        self.filter.applied = true;
        self.refresh();
        Ok(())
    }

    pub async fn set_search(&mut self, term: &str) -> Result<()> {
        self.catalog.load().await?;
        self.filter.term = term.to_string();
        self.filter.applied = true;
        self.refresh();
        Ok(())
    }

    // ── Selection events ────────────────────────────────────────────────

    pub async fn toggle(&mut self, id: &str) -> Result<SelectionChange> {
        let products = self.catalog.load().await?;
        let change = self.selection.toggle(id, products);
        if change.is_mutation() {
            debug!("Selection {:?}: {}", change, id);
            self.selection.persist(self.storage.as_mut());
            self.refresh();
        }
        Ok(change)
    }

    pub fn remove(&mut self, id: &str) -> SelectionChange {
        let change = self.selection.remove(id);
        if change.is_mutation() {
            self.selection.persist(self.storage.as_mut());
            self.refresh();
        }
        change
    }

    // ── Details overlay ─────────────────────────────────────────────────

    /// Open the overlay for `id`. Unknown ids leave it untouched.
    pub async fn open_details(&mut self, id: &str) -> Result<bool> {
        let products = self.catalog.load().await?;
        let Some(product) = products.iter().find(|p| p.id.matches(id)) else {
            return Ok(false);
        };
        self.modal.open(product);
        self.refresh();
        Ok(true)
    }

    pub fn close_details(&mut self) {
        self.modal.close();
        self.refresh();
    }

    pub fn click_details(&mut self, target: ModalClick) {
        self.modal.click(target);
        self.refresh();
    }

    // ── Assistant ───────────────────────────────────────────────────────

    /// Send a free-text question. Blank input is ignored.
    pub async fn submit_chat(&mut self, input: &str) {
        let message = input.trim();
        if message.is_empty() {
            return;
        }
        self.transcript.push(Sender::User, message);
        self.transcript.push(Sender::Bot, TYPING);
        self.refresh();

        let reply = self.assistant.ask(message, self.selection.products()).await;

        self.transcript.remove_last();
        self.transcript.push(Sender::Bot, reply);
        self.refresh();
    }

    /// Ask for a full routine over the selection. A successful routine
    /// schedules the follow-up prompt `follow_up_delay` from now.
    pub async fn generate_routine(&mut self) -> RoutineOutcome {
        if self.selection.is_empty() {
            self.transcript.push(Sender::Bot, EMPTY_SELECTION_GUIDANCE);
            self.refresh();
            return RoutineOutcome::NothingSelected;
        }

        self.transcript
            .push(Sender::Bot, generating_message(self.selection.len()));
        self.refresh();

        let request = routine_request(self.selection.products());
        let result = self
            .assistant
            .request(&request, self.selection.products())
            .await;

        self.transcript.remove_last();
        let outcome = match result {
            Ok(routine) => {
                self.transcript.push(Sender::Bot, routine);
                self.follow_up_due = Some(Instant::now() + self.follow_up_delay);
                RoutineOutcome::Generated
            }
            Err(e) => {
                error!("Error generating routine: {}", e);
                self.transcript.push(Sender::Bot, ROUTINE_ERROR);
                RoutineOutcome::Failed
            }
        };
        self.refresh();
        outcome
    }

    /// When the pending follow-up is due.
    pub fn follow_up_due(&self) -> Option<Instant> {
        self.follow_up_due
    }

    /// Append the follow-up prompt if it is due at `now`.
    pub fn deliver_follow_up(&mut self, now: Instant) -> bool {
        match self.follow_up_due {
            Some(due) if due <= now => {
                self.follow_up_due = None;
                self.transcript.push(Sender::Bot, FOLLOW_UP);
                self.refresh();
                true
            }
            _ => false,
        }
    }

    /// Drive `pending` to completion, delivering the follow-up if it falls
    /// due first. `on_follow_up` runs after each delivery.
    pub async fn wait_with_follow_up<F, T>(
        &mut self,
        pending: F,
        mut on_follow_up: impl FnMut(&Widget),
    ) -> T
    where
        F: Future<Output = T>,
    {
        tokio::pin!(pending);
        loop {
            let Some(due) = self.follow_up_due else {
                return pending.await;
            };
            tokio::select! {
                output = &mut pending => return output,
                _ = tokio::time::sleep_until(tokio::time::Instant::from_std(due)) => {
                    if self.deliver_follow_up(Instant::now()) {
                        on_follow_up(&*self);
                    }
                }
            }
        }
    }

    // ── Views ───────────────────────────────────────────────────────────

    pub fn grid(&self) -> &str {
        &self.grid
    }

    pub fn tray(&self) -> &str {
        &self.tray
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn selection(&self) -> &SelectionStore {
        &self.selection
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn modal(&self) -> &Modal {
        &self.modal
    }

    pub fn categories(&self) -> Vec<&str> {
        self.catalog.categories()
    }

    /// Look up a loaded catalog product.
    pub fn product(&self, id: &str) -> Option<&Product> {
        self.catalog
            .cached()
            .unwrap_or_default()
            .iter()
            .find(|p| p.id.matches(id))
    }

    /// Products the grid currently shows; None while the grid still shows
    /// the "choose a category" placeholder.
    pub fn visible_products(&self) -> Option<Vec<Product>> {
        if !self.filter.applied {
            return None;
        }
        Some(self.filter.apply(self.catalog.cached().unwrap_or_default()))
    }

    pub fn render_page(&self) -> String {
        let categories = self.catalog.categories();
        html::render_page(&PageView {
            lang: &self.language,
            direction: self.direction,
            categories: &categories,
            filter: &self.filter,
            grid: &self.grid,
            tray: &self.tray,
            transcript: &self.transcript,
            modal: self.modal.content(),
            modal_created: self.modal.is_created(),
        })
    }

    /// Re-project grid and tray from state and publish the page.
    fn refresh(&mut self) {
        let catalog = self.catalog.cached().unwrap_or_default();
        self.grid = html::render_filtered_grid(catalog, &self.filter, &self.selection);
        self.tray = html::render_tray(&self.selection);

        if let Some(path) = &self.page_path {
            if let Err(e) = std::fs::write(path, self.render_page()) {
                warn!("Failed to write page to {}: {}", path.display(), e);
            }
        }
    }
}
