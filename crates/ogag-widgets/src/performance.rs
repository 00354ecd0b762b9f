//! Page-load optimisations and Core Web Vitals classification.
//!
//! The host feeds performance entries in ([`PerformanceMonitor::record_lcp`],
//! [`PerformanceMonitor::record_layout_shift`]) and reports stylesheet and
//! window `load` events. Ratings land as classes on the root element so
//! styles and analytics can key off them.

use ogag_core::{Document, NodeId, Selector, StructuredLogger};

use crate::settings::PerformanceSettings;

const HERO_CONTAINERS: [&str; 3] = ["hero", "product__gallery", "featured-product"];
const PRELOAD_CONTAINERS: [&str; 2] = ["product__image", "collection-hero"];

/// Web Vitals rating bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VitalRating {
    Good,
    NeedsImprovement,
    Poor,
}

impl VitalRating {
    fn classify(value: f64, good: f64, ok: f64) -> Self {
        if value < good {
            VitalRating::Good
        } else if value < ok {
            VitalRating::NeedsImprovement
        } else {
            VitalRating::Poor
        }
    }

    /// Class suffix: `good`, `ok` or `poor`.
    pub fn as_str(&self) -> &'static str {
        match self {
            VitalRating::Good => "good",
            VitalRating::NeedsImprovement => "ok",
            VitalRating::Poor => "poor",
        }
    }
}

#[derive(Debug)]
pub struct PerformanceMonitor {
    settings: PerformanceSettings,
    cls: f64,
    deferred: Vec<(NodeId, String)>,
    logger: StructuredLogger,
}

impl PerformanceMonitor {
    pub fn new(settings: PerformanceSettings, logger: &StructuredLogger) -> Self {
        Self {
            settings,
            cls: 0.0,
            deferred: Vec::new(),
            logger: logger.child("performance"),
        }
    }

    /// Run the load-time passes: loading state, image hints, stylesheet
    /// deferral and hero preload.
    pub fn init(&mut self, doc: &mut Document) {
        self.mark_loading(doc);
        let optimized = self.optimize_images(doc);
        let deferred = self.defer_non_critical_css(doc);
        let preloaded = self.preload_hero_image(doc).is_some();
        self.logger
            .debug_builder("Performance optimisations applied")
            .field_i64("images", optimized as i64)
            .field_i64("stylesheets", deferred as i64)
            .field_bool("hero_preload", preloaded)
            .emit();
    }

    /// Largest Contentful Paint, in milliseconds.
    pub fn record_lcp(&self, doc: &mut Document, lcp_ms: f64) -> VitalRating {
        let rating = VitalRating::classify(lcp_ms, self.settings.lcp_good_ms, self.settings.lcp_ok_ms);
        let root = doc.root();
        doc.element_mut(root).add_class(&format!("perf-{}", rating.as_str()));
        self.logger
            .info_builder("LCP")
            .field_f64("value_ms", lcp_ms)
            .field("rating", rating.as_str())
            .emit();
        rating
    }

    /// One layout-shift entry. Shifts right after user input don't count.
    pub fn record_layout_shift(&mut self, value: f64, had_recent_input: bool) {
        if !had_recent_input {
            self.cls += value;
        }
    }

    /// Cumulative Layout Shift so far.
    pub fn cls(&self) -> f64 {
        self.cls
    }

    /// Classify the accumulated shift. Nothing is recorded while it is zero.
    pub fn finish_cls(&self, doc: &mut Document) -> Option<VitalRating> {
        if self.cls <= 0.0 {
            return None;
        }
        let rating = VitalRating::classify(self.cls, self.settings.cls_good, self.settings.cls_ok);
        let root = doc.root();
        doc.element_mut(root).add_class(&format!("cls-{}", rating.as_str()));
        self.logger
            .info_builder("CLS")
            .field_f64("value", self.cls)
            .field("rating", rating.as_str())
            .emit();
        Some(rating)
    }

    /// Add loading hints to images that have none. Existing attributes win.
    pub fn optimize_images(&self, doc: &mut Document) -> usize {
        let images = doc.find_all(&Selector::tag("img"));
        let mut optimized = 0;
        for img in images {
            if doc.element(img).has_attr("loading") {
                continue;
            }
            let in_hero = HERO_CONTAINERS
                .iter()
                .any(|class| doc.closest(img, &Selector::class(class)).is_some());

            let el = doc.element_mut(img);
            el.set_attr("loading", "lazy");
            if !el.has_attr("decoding") {
                el.set_attr("decoding", "async");
            }
            if in_hero && !el.has_attr("fetchpriority") {
                el.set_attr("fetchpriority", "high");
            }
            optimized += 1;
        }
        optimized
    }

    /// Switch stylesheets not marked `data-critical` to `media=print` until
    /// they load. Returns how many were deferred.
    pub fn defer_non_critical_css(&mut self, doc: &mut Document) -> usize {
        let links = doc.find_all(
            &Selector::tag("link")
                .with_attr_eq("rel", "stylesheet")
                .with_attr_ne("data-critical", "true"),
        );
        let mut count = 0;
        for link in links {
            if doc.element(link).has_attr("data-critical") || self.is_deferred(link) {
                continue;
            }
            let el = doc.element_mut(link);
            let media = el.attr("media").unwrap_or("all").to_string();
            el.set_attr("media", "print");
            self.deferred.push((link, media));
            count += 1;
        }
        count
    }

    fn is_deferred(&self, link: NodeId) -> bool {
        self.deferred.iter().any(|(id, _)| *id == link)
    }

    /// A deferred stylesheet loaded: restore its media.
    pub fn on_stylesheet_load(&mut self, doc: &mut Document, link: NodeId) -> bool {
        let Some(pos) = self.deferred.iter().position(|(id, _)| *id == link) else {
            return false;
        };
        let (_, media) = self.deferred.remove(pos);
        doc.element_mut(link).set_attr("media", media);
        true
    }

    /// Append a `<link rel=preload as=image>` for the first hero image in
    /// document order.
    pub fn preload_hero_image(&self, doc: &mut Document) -> Option<NodeId> {
        let containers: Vec<Selector> = PRELOAD_CONTAINERS
            .iter()
            .map(|class| Selector::class(class))
            .collect();
        let src = doc
            .find_all(&Selector::tag("img").with_attr("src"))
            .into_iter()
            .find(|img| {
                doc.element(*img)
                    .parent()
                    .is_some_and(|parent| containers.iter().any(|c| doc.closest(parent, c).is_some()))
            })
            .and_then(|img| doc.element(img).attr("src").map(str::to_string))?;

        let head = doc.head();
        let existing = doc.query(
            head,
            &Selector::tag("link")
                .with_attr_eq("rel", "preload")
                .with_attr_eq("href", &src),
        );
        if existing.is_some() {
            return existing;
        }
        Some(doc.append_element(
            head,
            "link",
            &[("rel", "preload"), ("as", "image"), ("href", src.as_str())],
        ))
    }

    /// Flag the page and every `[data-loading]` element as loading.
    pub fn mark_loading(&self, doc: &mut Document) {
        let root = doc.root();
        doc.element_mut(root).add_class("loading");
        for id in doc.find_all(&Selector::attr("data-loading")) {
            doc.element_mut(id).add_class("loading");
        }
    }

    /// Window `load`.
    pub fn mark_loaded(&self, doc: &mut Document) {
        let root = doc.root();
        let el = doc.element_mut(root);
        el.remove_class("loading");
        el.add_class("loaded");
        for id in doc.find_all(&Selector::attr("data-loading")) {
            doc.element_mut(id).remove_class("loading");
        }
    }
}
