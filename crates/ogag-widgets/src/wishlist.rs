//! Wishlist persisted to local storage, plus the toggle buttons that drive it.

use std::time::Duration;

use ogag_core::{
    Document, EventBus, NodeId, Selector, Storage, StructuredLogger, SubscriptionId,
};
use serde::Serialize;

use crate::announcements::Announcer;
use crate::settings::{Messages, ThemeSettings, WishlistSettings};

/// What changed in a [`WishlistUpdated`] event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WishlistAction {
    Add,
    Remove,
    Clear,
}

/// Emitted after every successful mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WishlistUpdated {
    pub action: WishlistAction,
    /// `None` for [`WishlistAction::Clear`].
    pub handle: Option<String>,
    /// The list after the change.
    pub wishlist: Vec<String>,
}

/// Deduplicated product handles, saved after every mutation.
///
/// Unreadable stored data starts an empty list. Save failures are logged and
/// the in-memory list stays authoritative for the page.
#[derive(Debug)]
pub struct WishlistManager<S: Storage> {
    storage: S,
    key: String,
    items: Vec<String>,
    updated: EventBus<WishlistUpdated>,
    logger: StructuredLogger,
}

impl<S: Storage> WishlistManager<S> {
    pub fn load(storage: S, settings: &WishlistSettings, logger: &StructuredLogger) -> Self {
        let logger = logger.child("wishlist");
        let stored = match storage.get_json::<Vec<String>>(&settings.storage_key) {
            Ok(stored) => stored.unwrap_or_default(),
            Err(e) => {
                logger
                    .error_builder("Error loading wishlist")
                    .field("key", settings.storage_key.as_str())
                    .field("error", e.to_string())
                    .emit();
                Vec::new()
            }
        };

        let mut items: Vec<String> = Vec::with_capacity(stored.len());
        for handle in stored {
            if !items.contains(&handle) {
                items.push(handle);
            }
        }

        Self {
            storage,
            key: settings.storage_key.clone(),
            items,
            updated: EventBus::new(),
            logger,
        }
    }

    /// Subscribe to [`WishlistUpdated`].
    pub fn on_update(&mut self, handler: impl FnMut(&WishlistUpdated) + 'static) -> SubscriptionId {
        self.updated.subscribe(handler)
    }

    pub fn off_update(&mut self, id: SubscriptionId) -> bool {
        self.updated.unsubscribe(id)
    }

    pub fn is_in_wishlist(&self, handle: &str) -> bool {
        self.items.iter().any(|h| h == handle)
    }

    pub fn count(&self) -> usize {
        self.items.len()
    }

    /// A copy of the handles, oldest first.
    pub fn items(&self) -> Vec<String> {
        self.items.clone()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Returns false if the handle was already present.
    pub fn add(&mut self, handle: &str) -> bool {
        if self.is_in_wishlist(handle) {
            return false;
        }
        self.items.push(handle.to_string());
        self.save();
        self.dispatch(WishlistAction::Add, Some(handle));
        true
    }

    /// Returns false if the handle was absent.
    pub fn remove(&mut self, handle: &str) -> bool {
        let Some(index) = self.items.iter().position(|h| h == handle) else {
            return false;
        };
        self.items.remove(index);
        self.save();
        self.dispatch(WishlistAction::Remove, Some(handle));
        true
    }

    /// Flip membership and return the new state.
    pub fn toggle(&mut self, handle: &str) -> bool {
        if self.is_in_wishlist(handle) {
            self.remove(handle);
            false
        } else {
            self.add(handle);
            true
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.save();
        self.dispatch(WishlistAction::Clear, None);
    }

    fn save(&mut self) {
        if let Err(e) = self.storage.set_json(&self.key, &self.items) {
            self.logger
                .error_builder("Error saving wishlist")
                .field("key", self.key.as_str())
                .field("error", e.to_string())
                .emit();
        }
    }

    fn dispatch(&mut self, action: WishlistAction, handle: Option<&str>) {
        self.updated.emit(&WishlistUpdated {
            action,
            handle: handle.map(String::from),
            wishlist: self.items.clone(),
        });
    }
}

/// `[data-wishlist-toggle]` buttons.
#[derive(Debug, Clone)]
pub struct WishlistButtons {
    messages: Messages,
    reset_delay: Duration,
    logger: StructuredLogger,
}

impl WishlistButtons {
    pub fn new(settings: &ThemeSettings, logger: &StructuredLogger) -> Self {
        Self {
            messages: settings.messages.clone(),
            reset_delay: Duration::from_millis(settings.wishlist.button_reset_ms),
            logger: logger.child("wishlist"),
        }
    }

    /// How long after a click the host should call
    /// [`WishlistButtons::finish_loading`].
    pub fn reset_delay(&self) -> Duration {
        self.reset_delay
    }

    /// Handle a click on `target`. Returns the new membership, or `None`
    /// when the click was not on a usable toggle button.
    ///
    /// The button stays `data-loading` and disabled until
    /// [`WishlistButtons::finish_loading`].
    pub fn handle_click<S: Storage>(
        &self,
        doc: &mut Document,
        target: NodeId,
        wishlist: &mut WishlistManager<S>,
        announcer: Option<&mut Announcer>,
    ) -> Option<bool> {
        let button = doc.closest(target, &Selector::attr("data-wishlist-toggle"))?;
        let Some(handle) = doc.element(button).data("product-handle").map(String::from) else {
            self.logger.error("Wishlist button missing product handle");
            return None;
        };

        let el = doc.element_mut(button);
        el.set_attr("data-loading", "");
        el.set_disabled(true);

        // Looked up before removal so the card is still labelled.
        let title = product_title(doc, &handle);
        let now_in = wishlist.toggle(&handle);

        if let Some(announcer) = announcer {
            if now_in {
                announcer.product_added_to_wishlist(doc, &title);
            } else {
                announcer.product_removed_from_wishlist(doc, &title);
            }
        }

        self.update_all(doc, wishlist);
        Some(now_in)
    }

    /// Clear the loading state set by a click.
    pub fn finish_loading(&self, doc: &mut Document, button: NodeId) {
        let el = doc.element_mut(button);
        el.remove_attr("data-loading");
        el.set_disabled(false);
    }

    /// Sync every toggle button with the wishlist.
    pub fn update_all<S: Storage>(&self, doc: &mut Document, wishlist: &WishlistManager<S>) {
        for button in doc.find_all(&Selector::attr("data-wishlist-toggle")) {
            let Some(handle) = doc.element(button).data("product-handle") else {
                continue;
            };
            let active = wishlist.is_in_wishlist(handle);
            self.update_button(doc, button, active);
        }
    }

    fn update_button(&self, doc: &mut Document, button: NodeId, active: bool) {
        let el = doc.element_mut(button);
        el.toggle_class("wishlist-button--active", active);
        let title = el.data("product-title").unwrap_or("product").to_string();
        let action = if active {
            &self.messages.remove_from_wishlist
        } else {
            &self.messages.add_to_wishlist
        };
        el.set_attr("aria-label", format!("{}: {}", action, title));
    }
}

/// Product title for announcements: a toggle's `data-product-title`, then a
/// title element inside the product's card, then the handle title-cased.
pub fn product_title(doc: &Document, handle: &str) -> String {
    let with_handle = doc.find_all(&Selector::attr_eq("data-product-handle", handle));

    let from_button = with_handle
        .iter()
        .map(|id| doc.element(*id))
        .filter(|el| el.has_attr("data-wishlist-toggle"))
        .find_map(|el| el.data("product-title").filter(|t| !t.is_empty()));
    if let Some(title) = from_button {
        return title.to_string();
    }

    let title_selectors = [
        Selector::class("product-card__title"),
        Selector::class("product__title"),
        Selector::tag("h1"),
        Selector::tag("h2"),
    ];
    if let Some(card) = with_handle
        .iter()
        .find(|id| !doc.element(**id).has_attr("data-wishlist-toggle"))
    {
        if let Some(title_el) = doc.query_any(*card, &title_selectors).first() {
            let title = doc.text_content(*title_el);
            if !title.is_empty() {
                return title;
            }
        }
    }

    title_case_handle(handle)
}

/// `gold-hoop-earrings` becomes `Gold Hoop Earrings`.
fn title_case_handle(handle: &str) -> String {
    let mut out = String::with_capacity(handle.len());
    let mut at_word_start = true;
    for c in handle.chars() {
        let c = if c == '-' { ' ' } else { c };
        if at_word_start && c.is_alphanumeric() {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        at_word_start = !(c.is_alphanumeric() || c == '_');
    }
    out
}
