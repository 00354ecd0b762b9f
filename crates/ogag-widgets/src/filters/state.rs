//! Active filter criteria and their query string form.

use ogag_core::QueryParams;
use serde::{Deserialize, Serialize};

/// Query parameters owned by the filter. Anything else in the URL is kept.
pub const FILTER_PARAMS: [&str; 5] = ["tag", "price_min", "price_max", "availability", "metal"];

/// Availability filter values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Availability {
    InStock,
}

impl Availability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Availability::InStock => "in-stock",
        }
    }

    pub fn from_param(value: &str) -> Option<Self> {
        match value {
            "in-stock" => Some(Availability::InStock),
            _ => None,
        }
    }
}

/// Active filter criteria.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    /// Tag substrings, in selection order.
    pub tags: Vec<String>,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
    pub availability: Option<Availability>,
    /// Metal substrings, matched against product tags.
    pub metal: Vec<String>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the state from query parameters. Non-numeric prices are unset.
    pub fn from_query(query: &QueryParams) -> Self {
        let mut state = Self::new();
        for tag in query.get_all("tag") {
            state.add_tag(tag);
        }
        for metal in query.get_all("metal") {
            state.add_metal(metal);
        }
        state.price_min = query.get("price_min").and_then(parse_price);
        state.price_max = query.get("price_max").and_then(parse_price);
        state.availability = query.get("availability").and_then(Availability::from_param);
        state
    }

    /// Replace the filter parameters in `query` with this state.
    pub fn write_query(&self, query: &mut QueryParams) {
        for param in FILTER_PARAMS {
            query.delete(param);
        }
        for tag in &self.tags {
            query.append("tag", tag);
        }
        if let Some(min) = self.price_min {
            query.set("price_min", &min.to_string());
        }
        if let Some(max) = self.price_max {
            query.set("price_max", &max.to_string());
        }
        if let Some(availability) = self.availability {
            query.set("availability", availability.as_str());
        }
        for metal in &self.metal {
            query.append("metal", metal);
        }
    }

    /// Add a tag. Returns false if it was already active.
    pub fn add_tag(&mut self, tag: &str) -> bool {
        insert_unique(&mut self.tags, tag)
    }

    pub fn remove_tag(&mut self, tag: &str) -> bool {
        remove_value(&mut self.tags, tag)
    }

    /// Add a metal. Returns false if it was already active.
    pub fn add_metal(&mut self, metal: &str) -> bool {
        insert_unique(&mut self.metal, metal)
    }

    pub fn remove_metal(&mut self, metal: &str) -> bool {
        remove_value(&mut self.metal, metal)
    }

    pub fn has_price(&self) -> bool {
        self.price_min.is_some() || self.price_max.is_some()
    }

    /// Number of active criteria. A price range counts once.
    pub fn active_count(&self) -> usize {
        self.tags.len()
            + self.metal.len()
            + usize::from(self.has_price())
            + usize::from(self.availability.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.active_count() == 0
    }

    /// Overwrite the fields `update` provides.
    pub fn merge(&mut self, update: FilterUpdate) {
        if let Some(tags) = update.tags {
            self.tags.clear();
            for tag in &tags {
                self.add_tag(tag);
            }
        }
        if let Some(price_min) = update.price_min {
            self.price_min = price_min;
        }
        if let Some(price_max) = update.price_max {
            self.price_max = price_max;
        }
        if let Some(availability) = update.availability {
            self.availability = availability;
        }
        if let Some(metal) = update.metal {
            self.metal.clear();
            for m in &metal {
                self.add_metal(m);
            }
        }
    }
}

/// A partial [`FilterState`] for programmatic updates. `None` leaves the
/// field alone; `Some(None)` clears an optional field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterUpdate {
    pub tags: Option<Vec<String>>,
    pub price_min: Option<Option<f64>>,
    pub price_max: Option<Option<f64>>,
    pub availability: Option<Option<Availability>>,
    pub metal: Option<Vec<String>>,
}

impl FilterUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    pub fn price(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.price_min = Some(min);
        self.price_max = Some(max);
        self
    }

    pub fn availability(mut self, availability: Option<Availability>) -> Self {
        self.availability = Some(availability);
        self
    }

    pub fn metal<I, S>(mut self, metal: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.metal = Some(metal.into_iter().map(Into::into).collect());
        self
    }
}

/// Parse a price bound. Empty, non-numeric and non-finite values are unset.
pub(crate) fn parse_price(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn insert_unique(values: &mut Vec<String>, value: &str) -> bool {
    if value.is_empty() || values.iter().any(|v| v == value) {
        return false;
    }
    values.push(value.to_string());
    true
}

fn remove_value(values: &mut Vec<String>, value: &str) -> bool {
    let before = values.len();
    values.retain(|v| v != value);
    values.len() != before
}
