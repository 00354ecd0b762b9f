//! Reviews widget: loads the feed once and renders summary, list and pagination.

use ogag_core::{fetch_json, Document, FetchRequest, Fetcher, NodeId, Selector, StructuredLogger};

use super::data::{Review, ReviewsDocument};
use super::pipeline::{select_page, PageInfo, RatingFilter, ReviewSort};
use crate::error::WidgetError;
use crate::settings::{Messages, ReviewsSettings};

/// Fill of a single rendered star.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StarFill {
    Full,
    Half,
    Empty,
}

impl StarFill {
    fn class(&self) -> &'static str {
        match self {
            StarFill::Full => "star star--full",
            StarFill::Half => "star star--half",
            StarFill::Empty => "star star--empty",
        }
    }
}

/// Five stars for `rating`; a fractional part of at least .5 adds a half star.
pub fn star_fill(rating: f64) -> [StarFill; 5] {
    let rating = rating.clamp(0.0, 5.0);
    let full = rating.floor() as usize;
    let half = full < 5 && rating.fract() >= 0.5;

    let mut stars = [StarFill::Empty; 5];
    for (i, star) in stars.iter_mut().enumerate() {
        if i < full {
            *star = StarFill::Full;
        } else if i == full && half {
            *star = StarFill::Half;
        }
    }
    stars
}

/// One `[data-reviews-widget]` container.
#[derive(Debug)]
pub struct ReviewsWidget {
    container: NodeId,
    source_url: String,
    per_page: usize,
    messages: Messages,
    data: Option<ReviewsDocument>,
    filter: RatingFilter,
    sort: ReviewSort,
    page: usize,
    logger: StructuredLogger,
}

impl ReviewsWidget {
    /// Every reviews container on the page.
    pub fn discover(doc: &Document) -> Vec<NodeId> {
        doc.find_all(&Selector::attr("data-reviews-widget"))
    }

    pub fn new(
        container: NodeId,
        settings: &ReviewsSettings,
        messages: Messages,
        logger: &StructuredLogger,
    ) -> Self {
        Self {
            container,
            source_url: settings.source_url.clone(),
            per_page: settings.per_page.max(1),
            messages,
            data: None,
            filter: RatingFilter::All,
            sort: ReviewSort::Newest,
            page: 1,
            logger: logger.child("reviews"),
        }
    }

    /// Fetch the feed and render. On failure the container is replaced with
    /// an inline error; there is no retry.
    pub async fn load(&mut self, doc: &mut Document, fetcher: &dyn Fetcher) -> Result<(), WidgetError> {
        let request = FetchRequest::get(self.source_url.as_str());
        match fetch_json::<ReviewsDocument>(fetcher, request).await {
            Ok(data) => {
                self.logger
                    .debug_builder("Reviews loaded")
                    .field_i64("count", data.reviews.len() as i64)
                    .emit();
                self.data = Some(data);
                self.page = 1;
                self.render(doc);
                Ok(())
            }
            Err(e) => {
                self.logger
                    .error_builder("Failed to initialize reviews widget")
                    .field("url", self.source_url.as_str())
                    .field("error", e.to_string())
                    .emit();
                self.show_error(doc);
                Err(e.into())
            }
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.data.is_some()
    }

    pub fn filter(&self) -> RatingFilter {
        self.filter
    }

    pub fn sort(&self) -> ReviewSort {
        self.sort
    }

    pub fn page(&self) -> usize {
        self.page
    }

    /// The current page of reviews and its info. Empty before loading.
    pub fn current_page(&self) -> (Vec<&Review>, PageInfo) {
        let reviews = self.data.as_ref().map_or(&[][..], |d| d.reviews.as_slice());
        select_page(reviews, self.filter, self.sort, self.page, self.per_page)
    }

    pub fn set_filter(&mut self, doc: &mut Document, filter: RatingFilter) {
        self.filter = filter;
        self.page = 1;
        self.render_list(doc);
    }

    pub fn set_sort(&mut self, doc: &mut Document, sort: ReviewSort) {
        self.sort = sort;
        self.page = 1;
        self.render_list(doc);
    }

    /// `[data-reviews-filter]` changed.
    pub fn on_filter_change(&mut self, doc: &mut Document, value: &str) {
        self.set_filter(doc, RatingFilter::from_param(value));
    }

    /// `[data-reviews-sort]` changed.
    pub fn on_sort_change(&mut self, doc: &mut Document, value: &str) {
        self.set_sort(doc, ReviewSort::from_param(value));
    }

    /// Go back one page. Returns false on the first page.
    pub fn prev_page(&mut self, doc: &mut Document) -> bool {
        let (_, info) = self.current_page();
        if !info.has_prev {
            return false;
        }
        self.page = info.page - 1;
        self.render_list(doc);
        true
    }

    /// Go forward one page. Returns false on the last page.
    pub fn next_page(&mut self, doc: &mut Document) -> bool {
        let (_, info) = self.current_page();
        if !info.has_next {
            return false;
        }
        self.page = info.page + 1;
        self.render_list(doc);
        true
    }

    fn render(&self, doc: &mut Document) {
        self.render_summary(doc);
        self.render_list(doc);
    }

    fn render_list(&self, doc: &mut Document) {
        if self.data.is_none() {
            return;
        }
        self.render_reviews(doc);
        self.render_pagination(doc);
    }

    fn find(&self, doc: &Document, attr: &str) -> Option<NodeId> {
        doc.query(self.container, &Selector::attr(attr))
    }

    fn render_summary(&self, doc: &mut Document) {
        let Some(data) = &self.data else { return };
        let rating = data.aggregate_rating.rating_value;

        if let Some(stars) = self.find(doc, "data-rating-stars") {
            render_stars(doc, stars, rating);
        }
        if let Some(value) = self.find(doc, "data-rating-value") {
            doc.element_mut(value).set_text(format!("{:.1}", rating));
        }
        if let Some(count) = self.find(doc, "data-review-count") {
            doc.element_mut(count)
                .set_text(data.aggregate_rating.review_count.to_string());
        }
    }

    fn render_reviews(&self, doc: &mut Document) {
        let Some(list) = self.find(doc, "data-reviews-list") else {
            self.logger.debug("No reviews list element");
            return;
        };
        doc.clear_children(list);

        let (items, _) = self.current_page();
        for review in items {
            self.append_review(doc, list, review);
        }
    }

    fn append_review(&self, doc: &mut Document, list: NodeId, review: &Review) {
        let item = doc.append_element(list, "div", &[("class", "review-item")]);
        let header = doc.append_element(item, "div", &[("class", "review-item__header")]);

        let author = doc.append_element(header, "div", &[("class", "review-item__author")]);
        doc.element_mut(author).set_text(review.author.name.as_str());

        let meta = doc.append_element(header, "div", &[("class", "review-item__meta")]);
        let stars = doc.append_element(meta, "div", &[("class", "review-item__rating")]);
        render_stars(doc, stars, f64::from(review.rating()));

        let time = doc.append_element(meta, "time", &[("datetime", review.date_published.as_str())]);
        let date = review
            .date()
            .map(|d| d.format("%b %-d, %Y").to_string())
            .unwrap_or_else(|| review.date_published.clone());
        doc.element_mut(time).set_text(date);

        if review.verified {
            let badge = doc.append_element(meta, "span", &[("class", "review-item__verified")]);
            doc.element_mut(badge).set_text(self.messages.verified_purchase.as_str());
        }

        let body = doc.append_element(item, "p", &[("class", "review-item__body")]);
        doc.element_mut(body).set_text(review.review_body.as_str());
    }

    fn render_pagination(&self, doc: &mut Document) {
        let Some(pagination) = self.find(doc, "data-reviews-pagination") else {
            return;
        };
        let (_, info) = self.current_page();

        if info.total_pages <= 1 {
            doc.element_mut(pagination).set_style("display", "none");
            return;
        }
        doc.element_mut(pagination).set_style("display", "flex");

        if let Some(prev) = doc.query(pagination, &Selector::attr("data-pagination-prev")) {
            doc.element_mut(prev).set_disabled(info.is_first());
        }
        if let Some(next) = doc.query(pagination, &Selector::attr("data-pagination-next")) {
            doc.element_mut(next).set_disabled(info.is_last());
        }
        if let Some(label) = doc.query(pagination, &Selector::attr("data-pagination-info")) {
            let text = Messages::format(
                &self.messages.reviews_range,
                &[
                    ("start", &info.start_item().to_string()),
                    ("end", &info.end_item().to_string()),
                    ("total", &info.total.to_string()),
                ],
            );
            doc.element_mut(label).set_text(text);
        }
    }

    fn show_error(&self, doc: &mut Document) {
        doc.clear_children(self.container);
        let error = doc.append_element(self.container, "div", &[("class", "reviews__error")]);
        let message = doc.append_element(error, "p", &[]);
        doc.element_mut(message).set_text(self.messages.reviews_error.as_str());
    }
}

fn render_stars(doc: &mut Document, container: NodeId, rating: f64) {
    doc.clear_children(container);
    for fill in star_fill(rating) {
        doc.append_element(container, "svg", &[("class", fill.class()), ("aria-hidden", "true")]);
    }
}
