//! Skip links: revealed only when their landmark exists.

use ogag_core::{Document, NodeId, Selector, StructuredLogger};

use crate::announcements::{Announcer, Politeness};
use crate::settings::Messages;

#[derive(Debug, Clone)]
pub struct SkipLinks {
    active: Vec<NodeId>,
    messages: Messages,
}

impl SkipLinks {
    /// Reveal every `[data-skip-target]` link whose target id is on the page.
    pub fn init(doc: &mut Document, messages: Messages, logger: &StructuredLogger) -> Self {
        let logger = logger.child("skip-links");
        let mut active = Vec::new();

        for link in doc.find_all(&Selector::attr("data-skip-target")) {
            let target = doc.element(link).data("skip-target").unwrap_or_default();
            if doc.get_element_by_id(target).is_some() {
                doc.element_mut(link).remove_class("sr-only");
                active.push(link);
            } else {
                logger
                    .debug_builder("Skip link target missing")
                    .field("target", target)
                    .emit();
            }
        }

        Self { active, messages }
    }

    /// Links that were revealed.
    pub fn links(&self) -> &[NodeId] {
        &self.active
    }

    /// A click landed on `target`. Announces the navigation when it was an
    /// active skip link.
    pub fn handle_click(&self, doc: &mut Document, target: NodeId, announcer: &mut Announcer) -> bool {
        let Some(link) = doc.closest(target, &Selector::attr("data-skip-target")) else {
            return false;
        };
        if !self.active.contains(&link) {
            return false;
        }
        let text = doc.text_content(link);
        let message = Messages::format(&self.messages.skip_link_activated, &[("link", &text)]);
        announcer.announce(doc, &message, Politeness::Polite);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reveals_links_with_targets() {
        let mut doc = Document::new();
        let body = doc.body();
        let to_main = doc.append_element(
            body,
            "a",
            &[("href", "#MainContent"), ("data-skip-target", "MainContent"), ("class", "sr-only skip-link")],
        );
        let to_missing = doc.append_element(
            body,
            "a",
            &[("href", "#Footer"), ("data-skip-target", "Footer"), ("class", "sr-only skip-link")],
        );
        doc.append_element(body, "main", &[("id", "MainContent")]);
        let logger = StructuredLogger::capturing("test").0;

        let links = SkipLinks::init(&mut doc, Messages::default(), &logger);

        assert_eq!(links.links(), &[to_main]);
        assert!(!doc.element(to_main).has_class("sr-only"));
        assert!(doc.element(to_missing).has_class("sr-only"));
    }

    #[test]
    fn test_click_announces() {
        let mut doc = Document::new();
        let body = doc.body();
        let link = doc.append_element(body, "a", &[("data-skip-target", "MainContent")]);
        doc.element_mut(link).set_text("  Skip to content ");
        let inactive = doc.append_element(body, "a", &[("data-skip-target", "Nowhere")]);
        doc.append_element(body, "main", &[("id", "MainContent")]);
        let logger = StructuredLogger::capturing("test").0;
        let mut announcer = Announcer::attach(&mut doc, Messages::default(), &logger);
        let links = SkipLinks::init(&mut doc, Messages::default(), &logger);

        assert!(!links.handle_click(&mut doc, inactive, &mut announcer));
        assert!(links.handle_click(&mut doc, link, &mut announcer));
        assert_eq!(announcer.current(&doc), "Skip to content navigation activated");
    }
}
