//! The quick view modal.
//!
//! Markup contract: `#quick-view-modal` containing `#quick-view-loading`,
//! `#quick-view-content` and `#quick-view-form`. The content fills
//! `#quick-view-title`, `#quick-view-price`, `#quick-view-description`,
//! `#quick-view-image` and `#quick-view-variants` when present.
//!
//! Timers belong to the host: after [`QuickView::notification_delay`] it
//! calls [`QuickView::dismiss_notification`], and after a rejected submit it
//! waits [`QuickView::error_reset_delay`] before
//! [`QuickView::reset_submit_button`].

use std::time::Duration;

use ogag_core::{fetch_json, Document, FetchRequest, Fetcher, NodeId, Selector, StructuredLogger};
use serde_json::Value;

use super::product::{PriceDisplay, QuickViewProduct};
use crate::error::WidgetError;
use crate::focus_trap::{FocusTrap, FocusTrapOptions, KeyEvent, KeyOutcome};
use crate::money::Currency;
use crate::settings::{Messages, QuickViewSettings, ThemeSettings};

const CART_ADD_URL: &str = "/cart/add.js";

/// Result of an add-to-cart submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartOutcome {
    /// The cart accepted the item; the modal closed.
    Added,
    /// The cart answered without accepting the item.
    Rejected,
    /// The request never completed.
    Failed,
    /// No product is open.
    Skipped,
}

pub struct QuickView {
    modal: NodeId,
    loading: NodeId,
    content: NodeId,
    form: NodeId,
    trap: FocusTrap,
    product: Option<QuickViewProduct>,
    trigger: Option<NodeId>,
    error: Option<NodeId>,
    notification: Option<NodeId>,
    settings: QuickViewSettings,
    currency: Currency,
    messages: Messages,
    logger: StructuredLogger,
}

impl QuickView {
    /// Bind to the modal markup.
    pub fn attach(
        doc: &Document,
        settings: &ThemeSettings,
        logger: &StructuredLogger,
    ) -> Result<Self, WidgetError> {
        let by_id = |id: &str| {
            doc.get_element_by_id(id)
                .ok_or_else(|| WidgetError::MissingElement(format!("#{}", id)))
        };
        let modal = by_id("quick-view-modal")?;

        Ok(Self {
            modal,
            loading: by_id("quick-view-loading")?,
            content: by_id("quick-view-content")?,
            form: by_id("quick-view-form")?,
            trap: FocusTrap::new(modal, FocusTrapOptions::default()),
            product: None,
            trigger: None,
            error: None,
            notification: None,
            settings: settings.quick_view.clone(),
            currency: settings.currency,
            messages: settings.messages.clone(),
            logger: logger.child("quick-view"),
        })
    }

    pub fn is_open(&self) -> bool {
        self.trap.is_active()
    }

    pub fn product(&self) -> Option<&QuickViewProduct> {
        self.product.as_ref()
    }

    pub fn trap(&self) -> &FocusTrap {
        &self.trap
    }

    /// How long the "added to cart" notification stays up.
    pub fn notification_delay(&self) -> Duration {
        Duration::from_millis(self.settings.notification_ms)
    }

    /// How long the add button keeps its error label after a rejection.
    pub fn error_reset_delay(&self) -> Duration {
        Duration::from_millis(self.settings.error_reset_ms)
    }

    /// The open notification, until dismissed.
    pub fn notification(&self) -> Option<NodeId> {
        self.notification
    }

    /// A click on `target`. Opens the modal when it is inside a
    /// `[data-quick-view]` trigger; returns the product handle.
    pub async fn handle_click(
        &mut self,
        doc: &mut Document,
        fetcher: &dyn Fetcher,
        target: NodeId,
    ) -> Option<String> {
        let trigger = doc.closest(target, &Selector::attr("data-quick-view"))?;
        let handle = doc.element(trigger).data("quick-view")?.to_string();
        // Failures are rendered inline.
        let _ = self.open(doc, fetcher, &handle, Some(trigger)).await;
        Some(handle)
    }

    /// Show the modal in its loading state, fetch the product and render it.
    pub async fn open(
        &mut self,
        doc: &mut Document,
        fetcher: &dyn Fetcher,
        handle: &str,
        trigger: Option<NodeId>,
    ) -> Result<(), WidgetError> {
        self.trigger = trigger;
        self.clear_error(doc);
        doc.element_mut(self.modal).set_attr("aria-hidden", "false");
        doc.element_mut(self.loading).set_style("display", "flex");
        doc.element_mut(self.content).set_style("display", "none");
        let body = doc.body();
        doc.element_mut(body).set_style("overflow", "hidden");

        let url = format!("/products/{}.js", handle);
        let result = fetch_json::<QuickViewProduct>(fetcher, FetchRequest::get(url)).await;
        doc.element_mut(self.loading).set_style("display", "none");

        match result {
            Ok(product) => {
                self.render_product(doc, &product);
                self.product = Some(product);
                doc.element_mut(self.content).set_style("display", "grid");
                self.engage_trap(doc);
                Ok(())
            }
            Err(e) => {
                self.logger
                    .error_builder("Error loading product")
                    .field("handle", handle)
                    .field("error", e.to_string())
                    .emit();
                self.product = None;
                self.show_error(doc);
                self.engage_trap(doc);
                Err(e.into())
            }
        }
    }

    fn engage_trap(&mut self, doc: &mut Document) {
        if self.trap.is_active() {
            self.trap.refresh(doc);
        } else {
            self.trap.activate(doc, self.trigger);
        }
    }

    fn show_error(&mut self, doc: &mut Document) {
        let error = doc.append_element(
            self.modal,
            "div",
            &[("class", "quick-view__error"), ("role", "alert")],
        );
        doc.element_mut(error).set_text(self.messages.quick_view_error.as_str());
        self.error = Some(error);
    }

    fn clear_error(&mut self, doc: &mut Document) {
        if let Some(error) = self.error.take() {
            doc.remove(error);
        }
    }

    fn render_product(&self, doc: &mut Document, product: &QuickViewProduct) {
        if let Some(title) = doc.get_element_by_id("quick-view-title") {
            doc.element_mut(title).set_text(product.title.as_str());
        }

        self.render_price(doc, product.price_display(self.currency));

        if let Some(description) = doc.get_element_by_id("quick-view-description") {
            doc.element_mut(description)
                .set_inner_html(product.description.clone().unwrap_or_default());
        }

        if let (Some(image), Some(src)) = (doc.get_element_by_id("quick-view-image"), product.image()) {
            let el = doc.element_mut(image);
            el.set_attr("src", src);
            el.set_attr("alt", product.title.as_str());
        }

        self.render_variants(doc, product);
    }

    fn render_price(&self, doc: &mut Document, display: PriceDisplay) {
        let Some(price) = doc.get_element_by_id("quick-view-price") else {
            return;
        };
        doc.clear_children(price);
        match display.compare_at {
            Some(compare_at) => {
                let sale = doc.append_element(price, "span", &[("class", "price price--sale")]);
                doc.element_mut(sale).set_text(display.price.display());
                let compare = doc.append_element(price, "span", &[("class", "price price--compare")]);
                doc.element_mut(compare).set_text(compare_at.display());
            }
            None => {
                let regular = doc.append_element(price, "span", &[("class", "price")]);
                doc.element_mut(regular).set_text(display.price.display());
            }
        }
    }

    fn render_variants(&self, doc: &mut Document, product: &QuickViewProduct) {
        let container = doc.get_element_by_id("quick-view-variants").unwrap_or(self.form);
        if container == self.form {
            for stale in doc.query_all(container, &Selector::class("product-option")) {
                doc.remove(stale);
            }
        } else {
            doc.clear_children(container);
        }

        if product.variants.len() > 1 {
            for group in product.option_groups() {
                let select_id = format!("quick-view-option-{}", group.index + 1);
                let wrapper = doc.append_element(container, "div", &[("class", "product-option")]);
                let label = doc.append_element(wrapper, "label", &[("for", select_id.as_str())]);
                doc.element_mut(label).set_text(group.name.as_str());

                let index = group.index.to_string();
                let select = doc.append_element(
                    wrapper,
                    "select",
                    &[
                        ("id", select_id.as_str()),
                        ("data-option-name", group.name.as_str()),
                        ("data-option-index", index.as_str()),
                    ],
                );
                for value in &group.values {
                    let option = doc.append_element(select, "option", &[("value", value.as_str())]);
                    doc.element_mut(option).set_text(value.as_str());
                }
                if let Some(first) = group.values.first() {
                    doc.element_mut(select).set_value(first.as_str());
                }
            }
        }

        if let Some(first) = product.variants.first() {
            self.set_variant_id(doc, first.id);
        }
    }

    fn set_variant_id(&self, doc: &mut Document, variant_id: u64) {
        let input = match doc.query(self.form, &Selector::tag("input").with_attr_eq("name", "id")) {
            Some(input) => input,
            None => doc.append_element(
                self.form,
                "input",
                &[("type", "hidden"), ("name", "id")],
            ),
        };
        doc.element_mut(input).set_value(variant_id.to_string());
    }

    /// An option select changed. Updates the variant id and price when the
    /// selection names a variant; returns its id.
    pub fn on_variant_change(&mut self, doc: &mut Document) -> Option<u64> {
        let product = self.product.as_ref()?;

        let selects = doc.query_all(self.form, &Selector::tag("select").with_attr("data-option-index"));
        let mut selected: [Option<&str>; 3] = [None; 3];
        for select in &selects {
            let el = doc.element(*select);
            if let Some(index) = el.data("option-index").and_then(|i| i.parse::<usize>().ok()) {
                if index < selected.len() {
                    selected[index] = Some(el.value());
                }
            }
        }

        let variant = product.find_variant(&selected)?.clone();
        self.set_variant_id(doc, variant.id);
        self.render_price(doc, variant.price_display(self.currency));
        Some(variant.id)
    }

    /// A click on a `[data-quantity-change]` button. Returns the new quantity.
    pub fn handle_quantity_click(&self, doc: &mut Document, target: NodeId) -> Option<u32> {
        let button = doc.closest(target, &Selector::attr("data-quantity-change"))?;
        let delta = doc
            .element(button)
            .data("quantity-change")
            .and_then(|d| d.trim().parse::<i64>().ok())?;
        self.change_quantity(doc, delta)
    }

    /// Step the quantity input by `delta`, clamped to `1..=max_quantity`.
    /// Whatever was typed is brought into range first; unparseable input
    /// counts as 1.
    pub fn change_quantity(&self, doc: &mut Document, delta: i64) -> Option<u32> {
        let input = doc.get_element_by_id("quick-view-quantity-input")?;
        let max = i64::from(self.settings.max_quantity.max(1));
        let current = doc
            .element(input)
            .value()
            .trim()
            .parse::<i64>()
            .unwrap_or(1)
            .clamp(1, max);
        let next = current.saturating_add(delta).clamp(1, max);
        doc.element_mut(input).set_value(next.to_string());
        Some(next as u32)
    }

    fn submit_button(&self, doc: &Document) -> Option<NodeId> {
        doc.query(self.form, &Selector::tag("button").with_attr_eq("type", "submit"))
            .or_else(|| doc.query(self.form, &Selector::tag("button")))
    }

    /// Named, enabled controls of the form in document order.
    pub fn form_data(&self, doc: &Document) -> Vec<(String, String)> {
        doc.descendants(self.form)
            .into_iter()
            .map(|id| doc.element(id))
            .filter(|el| matches!(el.tag(), "input" | "select" | "textarea") && !el.disabled())
            .filter(|el| {
                !matches!(el.attr("type"), Some("checkbox") | Some("radio")) || el.checked()
            })
            .filter_map(|el| {
                let name = el.attr("name")?;
                Some((name.to_string(), el.value().to_string()))
            })
            .collect()
    }

    /// Post the form to the cart.
    pub async fn submit(&mut self, doc: &mut Document, fetcher: &dyn Fetcher) -> CartOutcome {
        if self.product.is_none() {
            return CartOutcome::Skipped;
        }
        let button = self.submit_button(doc);
        if let Some(button) = button {
            let el = doc.element_mut(button);
            el.set_disabled(true);
            el.set_text(self.messages.adding_to_cart.as_str());
        }

        let request = FetchRequest::post_form(CART_ADD_URL, self.form_data(doc))
            .with_header("X-Requested-With", "XMLHttpRequest");

        match fetcher.fetch(request).await {
            Ok(response) => {
                let accepted = response
                    .json::<Value>()
                    .map(|body| cart_accepted(&body))
                    .unwrap_or(false);
                if accepted {
                    self.reset_submit_button(doc);
                    self.close(doc);
                    self.show_notification(doc);
                    CartOutcome::Added
                } else {
                    self.logger
                        .warn_builder("Add to cart rejected")
                        .field_i64("status", i64::from(response.status))
                        .emit();
                    if let Some(button) = button {
                        doc.element_mut(button)
                            .set_text(self.messages.add_to_cart_error.as_str());
                    }
                    CartOutcome::Rejected
                }
            }
            Err(e) => {
                self.logger
                    .error_builder("Error adding to cart")
                    .field("error", e.to_string())
                    .emit();
                self.reset_submit_button(doc);
                CartOutcome::Failed
            }
        }
    }

    /// Restore the add button's label and enable it.
    pub fn reset_submit_button(&self, doc: &mut Document) {
        if let Some(button) = self.submit_button(doc) {
            let el = doc.element_mut(button);
            el.set_disabled(false);
            el.set_text(self.messages.add_to_cart.as_str());
        }
    }

    fn show_notification(&mut self, doc: &mut Document) {
        self.dismiss_notification(doc);
        let body = doc.body();
        let notification = doc.append_element(
            body,
            "div",
            &[("class", "cart-notification"), ("role", "status")],
        );
        doc.element_mut(notification)
            .set_text(self.messages.added_to_cart_notification.as_str());
        self.notification = Some(notification);
    }

    pub fn dismiss_notification(&mut self, doc: &mut Document) {
        if let Some(notification) = self.notification.take() {
            doc.remove(notification);
        }
    }

    /// Hide the modal and hand focus back to the trigger.
    pub fn close(&mut self, doc: &mut Document) {
        doc.element_mut(self.modal).set_attr("aria-hidden", "true");
        let body = doc.body();
        doc.element_mut(body).set_style("overflow", "");

        if self.trap.is_active() {
            self.trap.deactivate(doc);
        } else if let Some(trigger) = self.trigger {
            if doc.is_connected(trigger) {
                doc.focus(trigger);
            }
        }
        self.trigger = None;
    }

    /// Keydown while the modal is open. Escape closes unless a listener on
    /// the trap prevented it.
    pub fn handle_key(&mut self, doc: &mut Document, event: &KeyEvent) -> KeyOutcome {
        let outcome = self.trap.handle_key(doc, event);
        if let KeyOutcome::Escape {
            default_prevented: false,
        } = outcome
        {
            self.close(doc);
        }
        outcome
    }

    pub fn handle_focus_in(&self, doc: &mut Document, target: NodeId) -> bool {
        self.trap.handle_focus_in(doc, target)
    }

    /// Subscribe to the trap's escape notification.
    pub fn trap_mut(&mut self) -> &mut FocusTrap {
        &mut self.trap
    }
}

/// `/cart/add.js` answers with the added line item, a list of items, or a
/// `status` object.
fn cart_accepted(body: &Value) -> bool {
    body.get("status").and_then(Value::as_str) == Some("success")
        || body.get("items").is_some()
        || body.get("variant_id").is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use http::Method;
    use ogag_core::{LogLevel, StaticFetcher};

    const PRODUCT: &str = r#"{
        "id": 123, "title": "Test Product", "price": 2999, "compare_at_price": 3999,
        "description": "<p>Solid gold.</p>", "featured_image": "/cdn/test.jpg",
        "variants": [{"id": 456, "option1": "Default", "price": 2999, "compare_at_price": 3999}]
    }"#;

    const RING: &str = r#"{
        "title": "Stacking Ring", "price": 2999, "images": ["/cdn/ring.jpg"],
        "options": ["Size", "Metal"],
        "variants": [
            {"id": 1, "option1": "6", "option2": "Gold", "price": 2999},
            {"id": 2, "option1": "7", "option2": "Gold", "price": 3199},
            {"id": 3, "option1": "6", "option2": "Silver", "price": 1999}
        ]
    }"#;

    struct Page {
        doc: Document,
        trigger: NodeId,
        button: NodeId,
    }

    fn page() -> Page {
        let mut doc = Document::new();
        let body = doc.body();
        let trigger = doc.append_element(body, "button", &[("data-quick-view", "test-product")]);
        let modal = doc.append_element(body, "div", &[("id", "quick-view-modal"), ("aria-hidden", "true")]);
        doc.append_element(modal, "div", &[("id", "quick-view-loading")]);
        let content = doc.append_element(modal, "div", &[("id", "quick-view-content")]);
        doc.append_element(content, "h2", &[("id", "quick-view-title")]);
        doc.append_element(content, "div", &[("id", "quick-view-price")]);
        doc.append_element(content, "div", &[("id", "quick-view-description")]);
        doc.append_element(content, "img", &[("id", "quick-view-image")]);
        let form = doc.append_element(content, "form", &[("id", "quick-view-form")]);
        doc.append_element(form, "div", &[("id", "quick-view-variants")]);
        let qty = doc.append_element(form, "input", &[("id", "quick-view-quantity-input"), ("name", "quantity")]);
        doc.element_mut(qty).set_value("1");
        let button = doc.append_element(form, "button", &[("type", "submit")]);
        doc.element_mut(button).set_text("Add to Cart");
        Page { doc, trigger, button }
    }

    fn quick_view(doc: &Document) -> QuickView {
        let logger = StructuredLogger::capturing("test").0;
        QuickView::attach(doc, &ThemeSettings::default(), &logger).unwrap()
    }

    fn text_of(doc: &Document, id: &str) -> String {
        doc.text_content(doc.get_element_by_id(id).unwrap())
    }

    #[test]
    fn test_attach_requires_markup() {
        let doc = Document::new();
        let logger = StructuredLogger::capturing("test").0;
        let err = QuickView::attach(&doc, &ThemeSettings::default(), &logger).err().unwrap();
        assert!(matches!(err, WidgetError::MissingElement(ref id) if id == "#quick-view-modal"));
    }

    #[test]
    fn test_click_opens_and_renders() {
        let Page { mut doc, trigger, .. } = page();
        let mut view = quick_view(&doc);
        let fetcher = StaticFetcher::new().with_response(Method::GET, "/products/test-product.js", 200, PRODUCT);

        let handle = block_on(view.handle_click(&mut doc, &fetcher, trigger));
        assert_eq!(handle.as_deref(), Some("test-product"));
        assert!(view.is_open());

        let modal = doc.get_element_by_id("quick-view-modal").unwrap();
        assert_eq!(doc.element(modal).attr("aria-hidden"), Some("false"));
        assert_eq!(doc.element(doc.body()).style("overflow"), Some("hidden"));
        let content = doc.get_element_by_id("quick-view-content").unwrap();
        assert_eq!(doc.element(content).style("display"), Some("grid"));
        let loading = doc.get_element_by_id("quick-view-loading").unwrap();
        assert_eq!(doc.element(loading).style("display"), Some("none"));

        assert_eq!(text_of(&doc, "quick-view-title"), "Test Product");
        let price = doc.get_element_by_id("quick-view-price").unwrap();
        let sale = doc.query(price, &Selector::class("price--sale")).unwrap();
        let compare = doc.query(price, &Selector::class("price--compare")).unwrap();
        assert_eq!(doc.text_content(sale), "$29.99");
        assert_eq!(doc.text_content(compare), "$39.99");

        let image = doc.element(doc.get_element_by_id("quick-view-image").unwrap());
        assert_eq!(image.attr("src"), Some("/cdn/test.jpg"));
        assert_eq!(image.attr("alt"), Some("Test Product"));

        let description = doc.element(doc.get_element_by_id("quick-view-description").unwrap());
        assert_eq!(description.inner_html(), Some("<p>Solid gold.</p>"));

        // Single variant: no selects, only the hidden id.
        let form = doc.get_element_by_id("quick-view-form").unwrap();
        assert!(doc.query(form, &Selector::tag("select")).is_none());
        let id = doc.query(form, &Selector::tag("input").with_attr_eq("name", "id")).unwrap();
        assert_eq!(doc.element(id).value(), "456");
    }

    #[test]
    fn test_fetch_failure_shows_inline_error() {
        let Page { mut doc, trigger, .. } = page();
        let logger_pair = StructuredLogger::capturing("test");
        let mut view = QuickView::attach(&doc, &ThemeSettings::default(), &logger_pair.0).unwrap();
        let fetcher = StaticFetcher::new();

        let result = block_on(view.open(&mut doc, &fetcher, "missing", Some(trigger)));
        assert!(matches!(result, Err(WidgetError::Fetch(_))));
        assert!(view.product().is_none());

        let error = doc.find(&Selector::class("quick-view__error")).unwrap();
        assert_eq!(doc.text_content(error), Messages::default().quick_view_error);
        assert!(logger_pair.1.contains(LogLevel::Error, "Error loading product"));
        assert_eq!(fetcher.requests().len(), 1);

        // Reopening clears the previous error.
        let fetcher = StaticFetcher::new().with_response(Method::GET, "/products/test-product.js", 200, PRODUCT);
        block_on(view.open(&mut doc, &fetcher, "test-product", Some(trigger))).unwrap();
        assert!(doc.find(&Selector::class("quick-view__error")).is_none());
    }

    #[test]
    fn test_variant_selection_updates_id_and_price() {
        let Page { mut doc, trigger, .. } = page();
        let mut view = quick_view(&doc);
        let fetcher = StaticFetcher::new().with_response(Method::GET, "/products/ring.js", 200, RING);
        block_on(view.open(&mut doc, &fetcher, "ring", Some(trigger))).unwrap();

        let form = doc.get_element_by_id("quick-view-form").unwrap();
        let selects = doc.query_all(form, &Selector::tag("select"));
        assert_eq!(selects.len(), 2);
        assert_eq!(doc.element(selects[0]).attr("data-option-name"), Some("Size"));
        assert_eq!(doc.element(selects[1]).value(), "Gold");

        doc.element_mut(selects[1]).set_value("Silver");
        assert_eq!(view.on_variant_change(&mut doc), Some(3));
        let id = doc.query(form, &Selector::tag("input").with_attr_eq("name", "id")).unwrap();
        assert_eq!(doc.element(id).value(), "3");
        assert_eq!(text_of(&doc, "quick-view-price"), "$19.99");

        doc.element_mut(selects[0]).set_value("7");
        assert_eq!(view.on_variant_change(&mut doc), None);
        assert_eq!(doc.element(id).value(), "3");
    }

    #[test]
    fn test_quantity_is_clamped() {
        let Page { mut doc, .. } = page();
        let view = quick_view(&doc);
        let form = doc.get_element_by_id("quick-view-form").unwrap();
        let minus = doc.append_element(form, "button", &[("type", "button"), ("data-quantity-change", "-1")]);
        let plus = doc.append_element(form, "button", &[("type", "button"), ("data-quantity-change", "1")]);

        assert_eq!(view.handle_quantity_click(&mut doc, minus), Some(1));
        assert_eq!(view.handle_quantity_click(&mut doc, plus), Some(2));
        assert_eq!(view.change_quantity(&mut doc, 500), Some(99));
        assert_eq!(view.change_quantity(&mut doc, 1), Some(99));
    }

    #[test]
    fn test_quantity_input_edges() {
        let Page { mut doc, .. } = page();
        let view = quick_view(&doc);
        let input = doc.get_element_by_id("quick-view-quantity-input").unwrap();

        doc.element_mut(input).set_value(i64::MAX.to_string());
        assert_eq!(view.change_quantity(&mut doc, 1), Some(99));
        assert_eq!(doc.element(input).value(), "99");

        doc.element_mut(input).set_value("-5");
        assert_eq!(view.change_quantity(&mut doc, 1), Some(2));

        doc.element_mut(input).set_value("two");
        assert_eq!(view.change_quantity(&mut doc, -1), Some(1));
        assert_eq!(view.change_quantity(&mut doc, i64::MIN), Some(1));
        assert_eq!(view.change_quantity(&mut doc, i64::MAX), Some(99));
    }

    #[test]
    fn test_reopen_replaces_variant_selects() {
        for dedicated_container in [true, false] {
            let Page { mut doc, trigger, .. } = page();
            if !dedicated_container {
                let variants = doc.get_element_by_id("quick-view-variants").unwrap();
                doc.remove(variants);
            }
            let mut view = quick_view(&doc);
            let fetcher = StaticFetcher::new().with_response(Method::GET, "/products/ring.js", 200, RING);

            block_on(view.open(&mut doc, &fetcher, "ring", Some(trigger))).unwrap();
            view.close(&mut doc);
            block_on(view.open(&mut doc, &fetcher, "ring", Some(trigger))).unwrap();

            let form = doc.get_element_by_id("quick-view-form").unwrap();
            let selects = doc.query_all(form, &Selector::tag("select"));
            assert_eq!(selects.len(), 2);
            assert_eq!(doc.query_all(form, &Selector::class("product-option")).len(), 2);
            assert_eq!(
                doc.query_all(form, &Selector::tag("input").with_attr_eq("name", "id")).len(),
                1
            );

            doc.element_mut(selects[0]).set_value("7");
            assert_eq!(view.on_variant_change(&mut doc), Some(2));
        }
    }

    #[test]
    fn test_timer_delays_follow_settings() {
        let Page { doc, .. } = page();
        let view = quick_view(&doc);
        assert_eq!(view.notification_delay(), Duration::from_millis(3000));
        assert_eq!(view.error_reset_delay(), Duration::from_millis(2000));

        let mut settings = ThemeSettings::default();
        settings.quick_view.notification_ms = 1500;
        settings.quick_view.error_reset_ms = 500;
        let logger = StructuredLogger::capturing("test").0;
        let view = QuickView::attach(&doc, &settings, &logger).unwrap();
        assert_eq!(view.notification_delay(), Duration::from_millis(1500));
        assert_eq!(view.error_reset_delay(), Duration::from_millis(500));
    }

    #[test]
    fn test_add_to_cart_success() {
        let Page { mut doc, trigger, button } = page();
        let mut view = quick_view(&doc);
        let fetcher = StaticFetcher::new()
            .with_response(Method::GET, "/products/test-product.js", 200, PRODUCT)
            .with_response(Method::POST, "/cart/add.js", 200, r#"{"status":"success"}"#);
        block_on(view.open(&mut doc, &fetcher, "test-product", Some(trigger))).unwrap();
        view.change_quantity(&mut doc, 1);

        assert_eq!(block_on(view.submit(&mut doc, &fetcher)), CartOutcome::Added);

        let post = fetcher.requests().pop().unwrap();
        assert_eq!(post.method, Method::POST);
        assert!(post.headers.contains(&("X-Requested-With".to_string(), "XMLHttpRequest".to_string())));
        assert_eq!(
            post.form,
            vec![
                ("quantity".to_string(), "2".to_string()),
                ("id".to_string(), "456".to_string()),
            ]
        );

        assert!(!view.is_open());
        assert_eq!(doc.active_element(), Some(trigger));
        assert!(!doc.element(button).disabled());
        let notification = view.notification().unwrap();
        assert_eq!(doc.text_content(notification), "Item added to cart!");

        view.dismiss_notification(&mut doc);
        assert!(!doc.is_connected(notification));
    }

    #[test]
    fn test_add_to_cart_rejected_then_reset() {
        let Page { mut doc, trigger, button } = page();
        let mut view = quick_view(&doc);
        let fetcher = StaticFetcher::new()
            .with_response(Method::GET, "/products/test-product.js", 200, PRODUCT)
            .with_response(Method::POST, "/cart/add.js", 422, r#"{"status":422,"message":"Sold out"}"#);
        block_on(view.open(&mut doc, &fetcher, "test-product", Some(trigger))).unwrap();

        assert_eq!(block_on(view.submit(&mut doc, &fetcher)), CartOutcome::Rejected);
        assert!(view.is_open());
        assert_eq!(doc.element(button).text(), "Error - Try Again");
        assert!(doc.element(button).disabled());

        view.reset_submit_button(&mut doc);
        assert_eq!(doc.element(button).text(), "Add to Cart");
        assert!(!doc.element(button).disabled());
    }

    #[test]
    fn test_add_to_cart_transport_failure() {
        let Page { mut doc, trigger, button } = page();
        let mut view = quick_view(&doc);
        let fetcher = StaticFetcher::new()
            .with_response(Method::GET, "/products/test-product.js", 200, PRODUCT)
            .with_failure(Method::POST, "/cart/add.js", "offline");
        block_on(view.open(&mut doc, &fetcher, "test-product", Some(trigger))).unwrap();

        assert_eq!(block_on(view.submit(&mut doc, &fetcher)), CartOutcome::Failed);
        assert_eq!(doc.element(button).text(), "Add to Cart");
        assert!(!doc.element(button).disabled());
    }

    #[test]
    fn test_escape_closes_and_restores_focus() {
        let Page { mut doc, trigger, .. } = page();
        let mut view = quick_view(&doc);
        let fetcher = StaticFetcher::new().with_response(Method::GET, "/products/test-product.js", 200, PRODUCT);
        block_on(view.open(&mut doc, &fetcher, "test-product", Some(trigger))).unwrap();

        let outcome = view.handle_key(&mut doc, &KeyEvent::escape());
        assert_eq!(outcome, KeyOutcome::Escape { default_prevented: false });
        assert!(!view.is_open());
        let modal = doc.get_element_by_id("quick-view-modal").unwrap();
        assert_eq!(doc.element(modal).attr("aria-hidden"), Some("true"));
        assert_eq!(doc.element(doc.body()).style("overflow"), None);
        assert_eq!(doc.active_element(), Some(trigger));
    }

    #[test]
    fn test_prevented_escape_keeps_modal_open() {
        let Page { mut doc, trigger, .. } = page();
        let mut view = quick_view(&doc);
        let fetcher = StaticFetcher::new().with_response(Method::GET, "/products/test-product.js", 200, PRODUCT);
        block_on(view.open(&mut doc, &fetcher, "test-product", Some(trigger))).unwrap();
        view.trap_mut().on_escape(|escape| escape.prevent_default());

        view.handle_key(&mut doc, &KeyEvent::escape());
        assert!(view.is_open());
    }

    #[test]
    fn test_submit_without_product_is_skipped() {
        let Page { mut doc, .. } = page();
        let mut view = quick_view(&doc);
        let fetcher = StaticFetcher::new();
        assert_eq!(block_on(view.submit(&mut doc, &fetcher)), CartOutcome::Skipped);
        assert!(fetcher.requests().is_empty());
    }
}
