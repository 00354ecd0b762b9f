//! Screen reader announcements through a shared live region.

use std::time::Duration;

use ogag_core::{Document, NodeId, StructuredLogger};

use crate::settings::Messages;

/// How long an assertive announcement keeps the region assertive.
pub const PRIORITY_RESET_DELAY: Duration = Duration::from_secs(1);

/// `aria-live` politeness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Politeness {
    #[default]
    Polite,
    Assertive,
}

impl Politeness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Politeness::Polite => "polite",
            Politeness::Assertive => "assertive",
        }
    }
}

/// Owner of the `#announcements` live region.
#[derive(Debug, Clone)]
pub struct Announcer {
    region: NodeId,
    messages: Messages,
    reset_pending: bool,
    logger: StructuredLogger,
}

impl Announcer {
    /// Use the page's `#announcements` element, creating it as the first
    /// child of `body` if the theme did not render one.
    pub fn attach(doc: &mut Document, messages: Messages, logger: &StructuredLogger) -> Self {
        let logger = logger.child("announcements");
        let region = match doc.get_element_by_id("announcements") {
            Some(region) => region,
            None => {
                logger.warn("Announcements element not found. Creating one...");
                let region = doc.create_element("div");
                let el = doc.element_mut(region);
                el.set_attr("id", "announcements");
                el.set_attr("aria-live", "polite");
                el.set_attr("aria-atomic", "true");
                el.add_class("sr-only");
                let body = doc.body();
                doc.prepend_child(body, region);
                region
            }
        };

        Self {
            region,
            messages,
            reset_pending: false,
            logger,
        }
    }

    pub fn region(&self) -> NodeId {
        self.region
    }

    pub fn messages(&self) -> &Messages {
        &self.messages
    }

    /// Text currently in the live region.
    pub fn current<'d>(&self, doc: &'d Document) -> &'d str {
        doc.element(self.region).text()
    }

    /// Whether a priority reset is waiting for [`Announcer::tick`].
    pub fn reset_pending(&self) -> bool {
        self.reset_pending
    }

    /// Replace the live region text. Non-polite messages switch `aria-live`
    /// until the host calls [`Announcer::tick`] after [`PRIORITY_RESET_DELAY`].
    pub fn announce(&mut self, doc: &mut Document, message: &str, priority: Politeness) {
        if !doc.is_connected(self.region) {
            self.logger.debug("Live region detached; announcement dropped");
            return;
        }

        let el = doc.element_mut(self.region);
        // Clearing first makes repeated identical messages re-announce.
        el.set_text("");
        if priority != Politeness::Polite {
            el.set_attr("aria-live", priority.as_str());
            self.reset_pending = true;
        }
        el.set_text(message);
    }

    /// Restore polite announcements after an assertive one.
    pub fn tick(&mut self, doc: &mut Document) {
        if self.reset_pending {
            doc.element_mut(self.region)
                .set_attr("aria-live", Politeness::Polite.as_str());
            self.reset_pending = false;
        }
    }

    pub fn product_added_to_cart(&mut self, doc: &mut Document, product: &str, quantity: u32) {
        let message = if quantity == 1 {
            Messages::format(&self.messages.product_added_to_cart, &[("product", product)])
        } else {
            Messages::format(
                &self.messages.products_added_to_cart,
                &[("count", &quantity.to_string()), ("product", product)],
            )
        };
        self.announce(doc, &message, Politeness::Polite);
    }

    pub fn product_added_to_wishlist(&mut self, doc: &mut Document, product: &str) {
        let message = Messages::format(&self.messages.product_added_to_wishlist, &[("product", product)]);
        self.announce(doc, &message, Politeness::Polite);
    }

    pub fn product_removed_from_wishlist(&mut self, doc: &mut Document, product: &str) {
        let message = Messages::format(
            &self.messages.product_removed_from_wishlist,
            &[("product", product)],
        );
        self.announce(doc, &message, Politeness::Polite);
    }

    pub fn cart_updated(&mut self, doc: &mut Document) {
        let message = self.messages.cart_updated.clone();
        self.announce(doc, &message, Politeness::Polite);
    }

    pub fn filter_applied(&mut self, doc: &mut Document, filter: &str, count: usize) {
        let message = if count == 1 {
            Messages::format(&self.messages.filter_applied_singular, &[("filter", filter)])
        } else {
            Messages::format(&self.messages.filters_applied, &[("count", &count.to_string())])
        };
        self.announce(doc, &message, Politeness::Polite);
    }

    pub fn search_results_found(&mut self, doc: &mut Document, count: usize, query: &str) {
        let message = if count == 1 {
            Messages::format(&self.messages.search_result_found, &[("query", query)])
        } else {
            Messages::format(
                &self.messages.search_results_found,
                &[("count", &count.to_string()), ("query", query)],
            )
        };
        self.announce(doc, &message, Politeness::Polite);
    }

    /// Announce an error assertively.
    pub fn error(&mut self, doc: &mut Document, message: &str) {
        self.announce(doc, message, Politeness::Assertive);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ogag_core::LogLevel;

    fn setup() -> (Document, Announcer) {
        let mut doc = Document::new();
        let logger = StructuredLogger::capturing("test").0;
        let announcer = Announcer::attach(&mut doc, Messages::default(), &logger);
        (doc, announcer)
    }

    #[test]
    fn test_creates_region_when_missing() {
        let mut doc = Document::new();
        let body = doc.body();
        doc.append_element(body, "main", &[]);
        let (logger, capture) = StructuredLogger::capturing("test");

        let announcer = Announcer::attach(&mut doc, Messages::default(), &logger);

        let region = doc.element(announcer.region());
        assert_eq!(region.attr("aria-live"), Some("polite"));
        assert_eq!(region.attr("aria-atomic"), Some("true"));
        assert!(region.has_class("sr-only"));
        assert_eq!(doc.element(body).children()[0], announcer.region());
        assert!(capture.contains(LogLevel::Warn, "not found"));
    }

    #[test]
    fn test_reuses_existing_region() {
        let mut doc = Document::new();
        let body = doc.body();
        let existing = doc.append_element(body, "div", &[("id", "announcements")]);
        let logger = StructuredLogger::capturing("test").0;

        let announcer = Announcer::attach(&mut doc, Messages::default(), &logger);
        assert_eq!(announcer.region(), existing);
    }

    #[test]
    fn test_assertive_then_reset() {
        let (mut doc, mut announcer) = setup();
        announcer.error(&mut doc, "Payment failed");

        assert_eq!(announcer.current(&doc), "Payment failed");
        assert_eq!(doc.element(announcer.region()).attr("aria-live"), Some("assertive"));
        assert!(announcer.reset_pending());

        announcer.tick(&mut doc);
        assert_eq!(doc.element(announcer.region()).attr("aria-live"), Some("polite"));
        assert!(!announcer.reset_pending());
    }

    #[test]
    fn test_convenience_messages() {
        let (mut doc, mut announcer) = setup();

        announcer.product_added_to_cart(&mut doc, "Gold Hoop", 1);
        assert_eq!(announcer.current(&doc), "Gold Hoop added to cart");

        announcer.product_added_to_cart(&mut doc, "Gold Hoop", 3);
        assert_eq!(announcer.current(&doc), "3 of Gold Hoop added to cart");

        announcer.filter_applied(&mut doc, "Gold", 1);
        assert_eq!(announcer.current(&doc), "Gold filter applied");

        announcer.filter_applied(&mut doc, "Gold", 4);
        assert_eq!(announcer.current(&doc), "4 filters applied");

        announcer.search_results_found(&mut doc, 1, "ring");
        assert_eq!(announcer.current(&doc), "1 result found for ring");

        announcer.search_results_found(&mut doc, 12, "ring");
        assert_eq!(announcer.current(&doc), "12 results found for ring");

        announcer.cart_updated(&mut doc);
        assert_eq!(announcer.current(&doc), "Cart updated");
    }

    #[test]
    fn test_detached_region_is_ignored() {
        let (mut doc, mut announcer) = setup();
        doc.remove(announcer.region());
        announcer.announce(&mut doc, "hello", Politeness::Polite);
        assert_eq!(announcer.current(&doc), "");
    }
}
