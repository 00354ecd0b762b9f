//! The collection filter widget: control handlers, URL sync and render pass.

use ogag_core::{Document, EventBus, Location, NodeId, Selector, StructuredLogger, SubscriptionId};
use serde::Serialize;

use super::predicate::{matches, ProductCard};
use super::state::{parse_price, Availability, FilterState, FilterUpdate};
use crate::settings::Messages;

/// Emitted after every render pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FiltersChanged {
    pub filters: FilterState,
    pub filter_count: usize,
    pub visible_count: usize,
}

/// Filters the product cards of a collection page.
///
/// Control handlers update the state, rewrite the URL with a history replace
/// and re-run the render pass. Missing controls and displays are skipped.
#[derive(Debug)]
pub struct CollectionFilters {
    state: FilterState,
    messages: Messages,
    changed: EventBus<FiltersChanged>,
    logger: StructuredLogger,
}

impl CollectionFilters {
    /// Whether the page has a `[data-collection-filters]` container.
    pub fn is_collection_page(doc: &Document) -> bool {
        doc.find(&Selector::attr("data-collection-filters")).is_some()
    }

    /// Read the state from the URL, sync the controls and render.
    pub fn init(
        doc: &mut Document,
        location: &mut Location,
        messages: Messages,
        logger: &StructuredLogger,
    ) -> Self {
        let mut filters = Self {
            state: FilterState::from_query(location.query()),
            messages,
            changed: EventBus::new(),
            logger: logger.child("collection-filters"),
        };
        filters
            .logger
            .debug_builder("Filters initialised from URL")
            .field_i64("active", filters.state.active_count() as i64)
            .emit();
        filters.sync_controls(doc);
        filters.apply(doc);
        filters
    }

    /// Subscribe to [`FiltersChanged`].
    pub fn on_change(&mut self, handler: impl FnMut(&FiltersChanged) + 'static) -> SubscriptionId {
        self.changed.subscribe(handler)
    }

    pub fn off_change(&mut self, id: SubscriptionId) -> bool {
        self.changed.unsubscribe(id)
    }

    /// A copy of the active filters.
    pub fn active_filters(&self) -> FilterState {
        self.state.clone()
    }

    pub fn active_filter_count(&self) -> usize {
        self.state.active_count()
    }

    /// Tag checkbox changed.
    pub fn toggle_tag(&mut self, doc: &mut Document, location: &mut Location, tag: &str, checked: bool) {
        if checked {
            self.state.add_tag(tag);
        } else {
            self.state.remove_tag(tag);
        }
        self.commit(doc, location);
    }

    /// Metal checkbox changed.
    pub fn toggle_metal(&mut self, doc: &mut Document, location: &mut Location, metal: &str, checked: bool) {
        if checked {
            self.state.add_metal(metal);
        } else {
            self.state.remove_metal(metal);
        }
        self.commit(doc, location);
    }

    /// Set both price bounds.
    pub fn set_price(
        &mut self,
        doc: &mut Document,
        location: &mut Location,
        min: Option<f64>,
        max: Option<f64>,
    ) {
        self.state.price_min = min;
        self.state.price_max = max;
        self.commit(doc, location);
    }

    /// A price input changed: read both `[data-price-min]` and `[data-price-max]`.
    pub fn on_price_input(&mut self, doc: &mut Document, location: &mut Location) {
        let min = read_price_input(doc, "data-price-min");
        let max = read_price_input(doc, "data-price-max");
        self.set_price(doc, location, min, max);
    }

    /// Availability checkbox changed.
    pub fn set_availability(&mut self, doc: &mut Document, location: &mut Location, in_stock: bool) {
        self.state.availability = in_stock.then_some(Availability::InStock);
        self.commit(doc, location);
    }

    /// Reset every criterion and every control.
    pub fn clear_all(&mut self, doc: &mut Document, location: &mut Location) {
        self.state = FilterState::new();

        for checkbox in self.checkboxes(doc) {
            doc.element_mut(checkbox).set_checked(false);
        }
        for input in doc.query_any(
            doc.root(),
            &[Selector::attr("data-price-min"), Selector::attr("data-price-max")],
        ) {
            doc.element_mut(input).set_value("");
        }

        self.logger.info("All filters cleared");
        self.commit(doc, location);
    }

    /// Sort select changed. Only the `sort` parameter is written.
    pub fn set_sort(&mut self, location: &mut Location, sort: &str) {
        let mut query = location.query().clone();
        query.set("sort", sort);
        location.replace_query(query);
    }

    /// Merge `update` into the state, then sync controls, URL and grid.
    pub fn set_filters(&mut self, doc: &mut Document, location: &mut Location, update: FilterUpdate) {
        self.state.merge(update);
        self.sync_controls(doc);
        self.commit(doc, location);
    }

    fn commit(&mut self, doc: &mut Document, location: &mut Location) {
        self.write_url(location);
        self.apply(doc);
    }

    fn write_url(&self, location: &mut Location) {
        let mut query = location.query().clone();
        self.state.write_query(&mut query);
        location.replace_query(query);
    }

    /// Show matching cards, hide the rest, update the displays and notify.
    /// Returns the number of visible cards.
    pub fn apply(&mut self, doc: &mut Document) -> usize {
        let cards = doc.find_all(&Selector::attr("data-product-card"));
        let mut visible = 0;
        for card in &cards {
            let product = ProductCard::from_element(doc.element(*card));
            let show = matches(&product, &self.state);
            doc.element_mut(*card)
                .set_style("display", if show { "" } else { "none" });
            if show {
                visible += 1;
            }
        }

        self.render_results_count(doc, visible);
        self.render_no_results(doc, visible == 0);
        self.render_filter_count(doc);
        self.render_clear_button(doc);

        self.logger
            .debug_builder("Filters applied")
            .field_i64("cards", cards.len() as i64)
            .field_i64("visible", visible as i64)
            .field_i64("active", self.state.active_count() as i64)
            .emit();

        self.changed.emit(&FiltersChanged {
            filters: self.state.clone(),
            filter_count: self.state.active_count(),
            visible_count: visible,
        });
        visible
    }

    fn render_results_count(&self, doc: &mut Document, visible: usize) {
        if let Some(label) = doc.find(&Selector::attr("data-results-count")) {
            let text = if visible == 1 {
                self.messages.results_count_singular.clone()
            } else {
                Messages::format(&self.messages.results_count, &[("count", &visible.to_string())])
            };
            doc.element_mut(label).set_text(text);
        }
    }

    fn render_no_results(&self, doc: &mut Document, empty: bool) {
        if let Some(banner) = doc.find(&Selector::attr("data-no-results")) {
            let el = doc.element_mut(banner);
            if empty {
                el.remove_attr("hidden");
            } else {
                el.set_attr("hidden", "");
            }
        }
    }

    fn render_filter_count(&self, doc: &mut Document) {
        if let Some(count) = doc.find(&Selector::attr("data-filters-count")) {
            let n = self.state.active_count();
            let text = if n > 0 { format!("({})", n) } else { String::new() };
            doc.element_mut(count).set_text(text);
        }
    }

    fn render_clear_button(&self, doc: &mut Document) {
        if let Some(button) = doc.find(&Selector::attr("data-clear-filters")) {
            let display = if self.state.is_empty() { "none" } else { "block" };
            doc.element_mut(button).set_style("display", display);
        }
    }

    /// Tag, availability and metal checkboxes.
    fn checkboxes(&self, doc: &Document) -> Vec<NodeId> {
        let mut boxes = doc.query_any(
            doc.root(),
            &[
                Selector::attr("data-tag-checkbox"),
                Selector::attr("data-availability-filter"),
            ],
        );
        boxes.extend(self.metal_checkboxes(doc));
        boxes
    }

    fn metal_checkboxes(&self, doc: &Document) -> Vec<NodeId> {
        doc.find_all(&Selector::attr("data-metal-filter"))
            .into_iter()
            .flat_map(|group| {
                doc.query_all(group, &Selector::tag("input").with_attr_eq("type", "checkbox"))
            })
            .collect()
    }

    /// Make checkbox and price input state reflect the filter state.
    fn sync_controls(&self, doc: &mut Document) {
        for checkbox in doc.find_all(&Selector::attr("data-tag-checkbox")) {
            let on = doc
                .element(checkbox)
                .attr("value")
                .is_some_and(|v| self.state.tags.iter().any(|t| t == v));
            doc.element_mut(checkbox).set_checked(on);
        }

        for checkbox in self.metal_checkboxes(doc) {
            let on = doc
                .element(checkbox)
                .attr("value")
                .is_some_and(|v| self.state.metal.iter().any(|m| m == v));
            doc.element_mut(checkbox).set_checked(on);
        }

        if let Some(checkbox) = doc.find(&Selector::attr("data-availability-filter")) {
            doc.element_mut(checkbox)
                .set_checked(self.state.availability.is_some());
        }

        for (attr, bound) in [
            ("data-price-min", self.state.price_min),
            ("data-price-max", self.state.price_max),
        ] {
            if let Some(input) = doc.find(&Selector::attr(attr)) {
                let value = bound.map(|v| v.to_string()).unwrap_or_default();
                doc.element_mut(input).set_value(value);
            }
        }
    }
}

fn read_price_input(doc: &Document, attr: &str) -> Option<f64> {
    doc.find(&Selector::attr(attr))
        .and_then(|input| parse_price(doc.element(input).value()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Page {
        doc: Document,
        location: Location,
        cards: Vec<NodeId>,
    }

    fn page(url: &str) -> Page {
        let mut doc = Document::new();
        let body = doc.body();
        let aside = doc.append_element(body, "aside", &[("data-collection-filters", "")]);
        doc.append_element(aside, "input", &[("type", "checkbox"), ("data-tag-checkbox", ""), ("value", "gold")]);
        doc.append_element(aside, "input", &[("type", "checkbox"), ("data-tag-checkbox", ""), ("value", "silver")]);
        doc.append_element(aside, "input", &[("data-price-min", "")]);
        doc.append_element(aside, "input", &[("data-price-max", "")]);
        doc.append_element(aside, "input", &[("type", "checkbox"), ("data-availability-filter", "")]);
        let metals = doc.append_element(aside, "fieldset", &[("data-metal-filter", "")]);
        doc.append_element(metals, "input", &[("type", "checkbox"), ("value", "platinum")]);
        doc.append_element(aside, "span", &[("data-filters-count", "")]);
        doc.append_element(aside, "button", &[("data-clear-filters", "")]);

        let grid = doc.append_element(body, "div", &[]);
        doc.append_element(grid, "p", &[("data-results-count", "")]);
        doc.append_element(grid, "p", &[("data-no-results", ""), ("hidden", "")]);
        let mut cards = Vec::new();
        for (id, tags, price, available) in [
            ("1", "gold,rings", "120", "true"),
            ("2", "silver,necklaces", "80", "false"),
            ("3", "gold,bracelets", "200", "true"),
        ] {
            cards.push(doc.append_element(
                grid,
                "div",
                &[
                    ("data-product-card", ""),
                    ("data-product-id", id),
                    ("data-product-tags", tags),
                    ("data-product-price", price),
                    ("data-product-available", available),
                ],
            ));
        }

        Page {
            doc,
            location: Location::parse(url),
            cards,
        }
    }

    fn init(p: &mut Page) -> CollectionFilters {
        let logger = StructuredLogger::capturing("test").0;
        CollectionFilters::init(&mut p.doc, &mut p.location, Messages::default(), &logger)
    }

    fn shown(p: &Page) -> Vec<bool> {
        p.cards
            .iter()
            .map(|c| p.doc.element(*c).style("display") != Some("none"))
            .collect()
    }

    fn text(p: &Page, attr: &str) -> String {
        let id = p.doc.find(&Selector::attr(attr)).unwrap();
        p.doc.element(id).text().to_string()
    }

    #[test]
    fn test_init_reads_url_and_syncs_controls() {
        let mut p = page("/collections/all?tag=gold&price_max=150&availability=in-stock");
        let filters = init(&mut p);

        assert_eq!(shown(&p), vec![true, false, false]);
        assert_eq!(filters.active_filter_count(), 3);
        assert_eq!(text(&p, "data-filters-count"), "(3)");
        assert_eq!(text(&p, "data-results-count"), "1 product");

        let gold = p.doc.find(&Selector::attr_eq("value", "gold")).unwrap();
        assert!(p.doc.element(gold).checked());
        let max = p.doc.find(&Selector::attr("data-price-max")).unwrap();
        assert_eq!(p.doc.element(max).value(), "150");
        assert!(p.location.replaced_urls().is_empty());
    }

    #[test]
    fn test_toggle_tag_renders_and_writes_url() {
        let mut p = page("/collections/all?sort=price");
        let mut filters = init(&mut p);
        assert_eq!(text(&p, "data-results-count"), "3 products");

        filters.toggle_tag(&mut p.doc, &mut p.location, "gold", true);

        assert_eq!(shown(&p), vec![true, false, true]);
        assert_eq!(text(&p, "data-results-count"), "2 products");
        assert_eq!(p.location.href(), "/collections/all?sort=price&tag=gold");
        let clear = p.doc.find(&Selector::attr("data-clear-filters")).unwrap();
        assert_eq!(p.doc.element(clear).style("display"), Some("block"));
    }

    #[test]
    fn test_no_results_banner() {
        let mut p = page("/collections/all");
        let mut filters = init(&mut p);
        let banner = p.doc.find(&Selector::attr("data-no-results")).unwrap();
        assert!(p.doc.element(banner).has_attr("hidden"));

        filters.set_price(&mut p.doc, &mut p.location, Some(500.0), None);
        assert!(!p.doc.element(banner).has_attr("hidden"));
        assert_eq!(text(&p, "data-results-count"), "0 products");
    }

    #[test]
    fn test_price_input_and_clear_all() {
        let mut p = page("/collections/all");
        let mut filters = init(&mut p);

        let min = p.doc.find(&Selector::attr("data-price-min")).unwrap();
        p.doc.element_mut(min).set_value("100");
        filters.on_price_input(&mut p.doc, &mut p.location);
        filters.toggle_metal(&mut p.doc, &mut p.location, "platinum", true);
        filters.set_availability(&mut p.doc, &mut p.location, true);
        assert_eq!(filters.active_filter_count(), 3);

        filters.clear_all(&mut p.doc, &mut p.location);

        assert_eq!(filters.active_filters(), FilterState::new());
        assert_eq!(shown(&p), vec![true, true, true]);
        assert_eq!(p.doc.element(min).value(), "");
        assert_eq!(text(&p, "data-filters-count"), "");
        assert_eq!(p.location.href(), "/collections/all");
        let clear = p.doc.find(&Selector::attr("data-clear-filters")).unwrap();
        assert_eq!(p.doc.element(clear).style("display"), Some("none"));
    }

    #[test]
    fn test_set_sort_only_touches_sort() {
        let mut p = page("/collections/all?tag=gold");
        let mut filters = init(&mut p);
        filters.set_sort(&mut p.location, "price-descending");
        assert_eq!(p.location.href(), "/collections/all?tag=gold&sort=price-descending");
        assert_eq!(shown(&p), vec![true, false, true]);
    }

    #[test]
    fn test_set_filters_merges_and_syncs() {
        let mut p = page("/collections/all?tag=gold");
        let mut filters = init(&mut p);

        filters.set_filters(
            &mut p.doc,
            &mut p.location,
            FilterUpdate::new().tags(["silver"]).metal(["platinum"]),
        );

        let gold = p.doc.find(&Selector::attr_eq("value", "gold")).unwrap();
        let silver = p.doc.find(&Selector::attr_eq("value", "silver")).unwrap();
        let platinum = p.doc.find(&Selector::attr_eq("value", "platinum")).unwrap();
        assert!(!p.doc.element(gold).checked());
        assert!(p.doc.element(silver).checked());
        assert!(p.doc.element(platinum).checked());
        assert_eq!(p.location.href(), "/collections/all?tag=silver&metal=platinum");
    }

    #[test]
    fn test_change_events() {
        let mut p = page("/collections/all");
        let mut filters = init(&mut p);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        filters.on_change(move |e: &FiltersChanged| sink.borrow_mut().push((e.filter_count, e.visible_count)));

        filters.toggle_tag(&mut p.doc, &mut p.location, "silver", true);
        filters.toggle_tag(&mut p.doc, &mut p.location, "silver", false);

        assert_eq!(*seen.borrow(), vec![(1, 1), (0, 3)]);
    }

    #[test]
    fn test_missing_displays_are_ignored() {
        let mut doc = Document::new();
        let mut location = Location::parse("/collections/all?tag=gold");
        let logger = StructuredLogger::capturing("test").0;
        let mut filters = CollectionFilters::init(&mut doc, &mut location, Messages::default(), &logger);
        assert_eq!(filters.apply(&mut doc), 0);
        assert!(!CollectionFilters::is_collection_page(&doc));
    }
}
