//! Deferred loading of media carrying `data-src`.
//!
//! The host owns the intersection observer. It observes [`LazyLoader::observed`]
//! with [`LazyOptions::root_margin`] and [`LazyOptions::threshold`], reports
//! entries through [`LazyLoader::on_intersection`], and forwards media
//! `load`/`error` events to [`LazyLoader::on_load`] and [`LazyLoader::on_error`].

use ogag_core::{Document, NodeId, Selector, StructuredLogger};

use crate::settings::LazyLoadSettings;

const LAZY_TAGS: [&str; 3] = ["img", "video", "iframe"];

/// Observer options.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LazyOptions {
    pub root_margin_px: u32,
    pub threshold: f64,
}

impl LazyOptions {
    /// CSS margin string for the observer.
    pub fn root_margin(&self) -> String {
        format!("{}px", self.root_margin_px)
    }
}

impl Default for LazyOptions {
    fn default() -> Self {
        LazyLoadSettings::default().into()
    }
}

impl From<LazyLoadSettings> for LazyOptions {
    fn from(settings: LazyLoadSettings) -> Self {
        Self {
            root_margin_px: settings.root_margin_px,
            threshold: settings.threshold,
        }
    }
}

#[derive(Debug)]
pub struct LazyLoader {
    options: LazyOptions,
    observer: bool,
    observed: Vec<NodeId>,
    logger: StructuredLogger,
}

impl LazyLoader {
    /// Start observing. Without observer support every `[data-src]` element
    /// is loaded immediately.
    pub fn init(
        doc: &mut Document,
        options: LazyOptions,
        observer_supported: bool,
        logger: &StructuredLogger,
    ) -> Self {
        let mut loader = Self {
            options,
            observer: observer_supported,
            observed: Vec::new(),
            logger: logger.child("lazyload"),
        };
        if observer_supported {
            loader.observe_lazy_elements(doc);
        } else {
            loader.load_all(doc);
        }
        loader
    }

    pub fn options(&self) -> LazyOptions {
        self.options
    }

    /// Elements the observer should watch.
    pub fn observed(&self) -> &[NodeId] {
        &self.observed
    }

    fn observe_lazy_elements(&mut self, doc: &Document) {
        let selectors: Vec<Selector> = LAZY_TAGS
            .iter()
            .map(|tag| Selector::tag(tag).with_attr("data-src"))
            .collect();
        self.observed = doc.query_any(doc.root(), &selectors);
        self.logger
            .debug_builder("Observing lazy elements")
            .field_i64("count", self.observed.len() as i64)
            .emit();
    }

    fn unobserve(&mut self, id: NodeId) {
        self.observed.retain(|o| *o != id);
    }

    /// An observer entry for `target`. Intersecting elements load once.
    pub fn on_intersection(&mut self, doc: &mut Document, target: NodeId, is_intersecting: bool) {
        if !is_intersecting || !self.observed.contains(&target) {
            return;
        }
        self.load_element(doc, target);
        self.unobserve(target);
    }

    /// Load `target` right away, whether or not it is observed.
    pub fn load_now(&mut self, doc: &mut Document, target: NodeId) {
        self.unobserve(target);
        self.load_element(doc, target);
    }

    /// Re-scan the page after dynamic content changes.
    pub fn refresh(&mut self, doc: &Document) {
        if self.observer {
            self.observe_lazy_elements(doc);
        }
    }

    /// Load every `[data-src]` element.
    pub fn load_all(&mut self, doc: &mut Document) {
        for id in doc.find_all(&Selector::attr("data-src")) {
            self.load_element(doc, id);
        }
        self.observed.clear();
    }

    fn load_element(&self, doc: &mut Document, id: NodeId) {
        let el = doc.element_mut(id);
        let Some(src) = el.remove_attr("data-src") else {
            return;
        };
        el.set_attr("src", src);

        if LAZY_TAGS.contains(&el.tag()) {
            // Media settles in on_load / on_error.
            el.add_class("lazy-loading");
        } else {
            el.remove_class("lazy");
            el.add_class("lazy-loaded");
        }
    }

    /// Media finished loading.
    pub fn on_load(&self, doc: &mut Document, target: NodeId) {
        let el = doc.element_mut(target);
        el.remove_class("lazy-loading");
        el.add_class("lazy-loaded");
    }

    /// Media failed to load.
    pub fn on_error(&self, doc: &mut Document, target: NodeId) {
        let el = doc.element_mut(target);
        el.remove_class("lazy-loading");
        el.add_class("lazy-error");

        let kind = match el.tag() {
            "img" => "image",
            "video" => "video",
            "iframe" => "iframe",
            _ => "element",
        };
        self.logger
            .warn_builder(format!("Failed to load lazy {}", kind))
            .field("src", el.attr("src").unwrap_or_default())
            .emit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ogag_core::LogLevel;

    fn page() -> (Document, Vec<NodeId>) {
        let mut doc = Document::new();
        let body = doc.body();
        let img = doc.append_element(body, "img", &[("data-src", "/cdn/ring.jpg")]);
        let video = doc.append_element(body, "video", &[("data-src", "/cdn/spin.mp4")]);
        let iframe = doc.append_element(body, "iframe", &[("data-src", "https://player.example/1")]);
        let div = doc.append_element(body, "div", &[("data-src", "/cdn/bg.jpg"), ("class", "lazy")]);
        let eager = doc.append_element(body, "img", &[("src", "/cdn/logo.svg")]);
        (doc, vec![img, video, iframe, div, eager])
    }

    #[test]
    fn test_observes_media_only() {
        let (mut doc, ids) = page();
        let logger = StructuredLogger::capturing("test").0;
        let loader = LazyLoader::init(&mut doc, LazyOptions::default(), true, &logger);

        assert_eq!(loader.observed(), &ids[..3]);
        assert_eq!(loader.options().root_margin(), "100px");
        assert_eq!(loader.options().threshold, 0.1);
        assert!(doc.element(ids[0]).attr("src").is_none());
    }

    #[test]
    fn test_intersection_loads_once() {
        let (mut doc, ids) = page();
        let logger = StructuredLogger::capturing("test").0;
        let mut loader = LazyLoader::init(&mut doc, LazyOptions::default(), true, &logger);

        loader.on_intersection(&mut doc, ids[0], false);
        assert!(doc.element(ids[0]).has_attr("data-src"));

        loader.on_intersection(&mut doc, ids[0], true);
        let img = doc.element(ids[0]);
        assert_eq!(img.attr("src"), Some("/cdn/ring.jpg"));
        assert!(!img.has_attr("data-src"));
        assert!(img.has_class("lazy-loading"));
        assert!(!loader.observed().contains(&ids[0]));

        loader.on_load(&mut doc, ids[0]);
        assert!(doc.element(ids[0]).has_class("lazy-loaded"));
        assert!(!doc.element(ids[0]).has_class("lazy-loading"));
    }

    #[test]
    fn test_error_is_logged() {
        let (mut doc, ids) = page();
        let (logger, capture) = StructuredLogger::capturing("test");
        let mut loader = LazyLoader::init(&mut doc, LazyOptions::default(), true, &logger);

        loader.load_now(&mut doc, ids[1]);
        loader.on_error(&mut doc, ids[1]);

        assert!(doc.element(ids[1]).has_class("lazy-error"));
        let warnings = capture.at(LogLevel::Warn);
        assert_eq!(warnings[0].message, "Failed to load lazy video");
        assert_eq!(warnings[0].fields["src"], serde_json::json!("/cdn/spin.mp4"));
    }

    #[test]
    fn test_fallback_loads_everything() {
        let (mut doc, ids) = page();
        let logger = StructuredLogger::capturing("test").0;
        let loader = LazyLoader::init(&mut doc, LazyOptions::default(), false, &logger);

        assert!(loader.observed().is_empty());
        for id in &ids[..4] {
            assert!(!doc.element(*id).has_attr("data-src"));
        }
        let div = doc.element(ids[3]);
        assert!(div.has_class("lazy-loaded"));
        assert!(!div.has_class("lazy"));
        assert_eq!(doc.element(ids[4]).attr("src"), Some("/cdn/logo.svg"));
    }

    #[test]
    fn test_refresh_picks_up_new_media() {
        let (mut doc, _) = page();
        let logger = StructuredLogger::capturing("test").0;
        let mut loader = LazyLoader::init(&mut doc, LazyOptions::default(), true, &logger);
        let body = doc.body();
        let added = doc.append_element(body, "img", &[("data-src", "/cdn/new.jpg")]);

        loader.refresh(&doc);
        assert!(loader.observed().contains(&added));
    }
}
