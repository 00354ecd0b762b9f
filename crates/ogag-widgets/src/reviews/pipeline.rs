//! Rating filter, sort and pagination over a review list.

use std::cmp::Reverse;

use serde::{Deserialize, Serialize};

use super::data::Review;

/// Star rating filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RatingFilter {
    #[default]
    All,
    /// Exactly this many stars.
    Stars(u8),
}

impl RatingFilter {
    /// Parse a filter select value (`all`, `1`..`5`). Unknown values pass all.
    pub fn from_param(value: &str) -> Self {
        match value.trim().parse::<u8>() {
            Ok(stars) if (1..=5).contains(&stars) => RatingFilter::Stars(stars),
            _ => RatingFilter::All,
        }
    }

    pub fn accepts(&self, review: &Review) -> bool {
        match self {
            RatingFilter::All => true,
            RatingFilter::Stars(stars) => review.rating() == *stars,
        }
    }
}

/// Review ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewSort {
    #[default]
    Newest,
    Oldest,
    Highest,
    Lowest,
}

impl ReviewSort {
    /// Parse a sort select value. Unknown values fall back to newest.
    pub fn from_param(value: &str) -> Self {
        match value {
            "oldest" => ReviewSort::Oldest,
            "highest" => ReviewSort::Highest,
            "lowest" => ReviewSort::Lowest,
            _ => ReviewSort::Newest,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ReviewSort::Newest => "Newest",
            ReviewSort::Oldest => "Oldest",
            ReviewSort::Highest => "Highest Rated",
            ReviewSort::Lowest => "Lowest Rated",
        }
    }
}

/// Pagination info for one page of reviews.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    /// Current page (1-indexed).
    pub page: usize,
    pub per_page: usize,
    /// Reviews passing the filter.
    pub total: usize,
    /// At least 1, even with no reviews.
    pub total_pages: usize,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PageInfo {
    /// Build pagination info, clamping `page` into `1..=total_pages`.
    pub fn new(page: usize, per_page: usize, total: usize) -> Self {
        let per_page = per_page.max(1);
        let total_pages = total.div_ceil(per_page).max(1);
        let page = page.clamp(1, total_pages);

        Self {
            page,
            per_page,
            total,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }

    pub fn offset(&self) -> usize {
        (self.page - 1) * self.per_page
    }

    pub fn is_first(&self) -> bool {
        self.page == 1
    }

    pub fn is_last(&self) -> bool {
        self.page >= self.total_pages
    }

    /// First item on the page (1-indexed), 0 when empty.
    pub fn start_item(&self) -> usize {
        if self.total == 0 {
            0
        } else {
            self.offset() + 1
        }
    }

    pub fn end_item(&self) -> usize {
        (self.page * self.per_page).min(self.total)
    }
}

/// Apply the rating filter, then a stable sort.
pub fn filter_and_sort<'a>(reviews: &'a [Review], filter: RatingFilter, sort: ReviewSort) -> Vec<&'a Review> {
    let mut selected: Vec<&Review> = reviews.iter().filter(|r| filter.accepts(r)).collect();

    // `sort_by_key` is stable: ties keep feed order. Undated reviews sort as oldest.
    match sort {
        ReviewSort::Newest => selected.sort_by_key(|r| Reverse(r.date())),
        ReviewSort::Oldest => selected.sort_by_key(|r| r.date()),
        ReviewSort::Highest => selected.sort_by_key(|r| Reverse(r.rating())),
        ReviewSort::Lowest => selected.sort_by_key(|r| r.rating()),
    }
    selected
}

/// One page of filtered, sorted reviews plus its pagination info.
pub fn select_page<'a>(
    reviews: &'a [Review],
    filter: RatingFilter,
    sort: ReviewSort,
    page: usize,
    page_size: usize,
) -> (Vec<&'a Review>, PageInfo) {
    let selected = filter_and_sort(reviews, filter, sort);
    let info = PageInfo::new(page, page_size, selected.len());
    let items = selected
        .into_iter()
        .skip(info.offset())
        .take(info.per_page)
        .collect();
    (items, info)
}
