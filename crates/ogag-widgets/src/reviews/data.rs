//! Reviews feed model and validation.

use std::collections::HashSet;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::WidgetError;

/// The static reviews JSON: an aggregate plus the individual reviews.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewsDocument {
    pub aggregate_rating: AggregateRating,
    #[serde(default)]
    pub reviews: Vec<Review>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateRating {
    #[serde(deserialize_with = "number_or_string")]
    pub rating_value: f64,
    #[serde(deserialize_with = "number_or_string")]
    pub review_count: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: String,
    pub author: Author,
    pub review_rating: ReviewRating,
    pub review_body: String,
    /// ISO date, `YYYY-MM-DD`.
    pub date_published: String,
    #[serde(default)]
    pub verified: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRating {
    #[serde(deserialize_with = "number_or_string")]
    pub rating_value: f64,
}

impl Review {
    /// Whole-star rating.
    pub fn rating(&self) -> u8 {
        self.review_rating.rating_value.trunc().clamp(0.0, u8::MAX as f64) as u8
    }

    /// Publication date, if it parses.
    pub fn date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date_published, "%Y-%m-%d").ok()
    }
}

impl ReviewsDocument {
    pub fn from_json(json: &str) -> Result<Self, WidgetError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Integrity checks for the feed. An empty result means it is valid.
    pub fn validate(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        let aggregate = &self.aggregate_rating;

        if !(0.0..=5.0).contains(&aggregate.rating_value) {
            issues.push(ValidationIssue::new(
                "aggregateRating.ratingValue",
                format!("must be between 0 and 5, got {}", aggregate.rating_value),
            ));
        }

        let mut seen = HashSet::new();
        for (i, review) in self.reviews.iter().enumerate() {
            let path = |field: &str| format!("reviews[{}].{}", i, field);

            if !review.id.starts_with("review-") {
                issues.push(ValidationIssue::new(path("id"), "must start with 'review-'"));
            }
            if !seen.insert(review.id.as_str()) {
                issues.push(ValidationIssue::new(path("id"), format!("duplicate id '{}'", review.id)));
            }
            if review.author.name.trim().is_empty() {
                issues.push(ValidationIssue::new(path("author.name"), "must not be empty"));
            }
            let rating = review.review_rating.rating_value;
            if rating.fract() != 0.0 || !(1.0..=5.0).contains(&rating) {
                issues.push(ValidationIssue::new(
                    path("reviewRating.ratingValue"),
                    format!("must be a whole number from 1 to 5, got {}", rating),
                ));
            }
            if review.review_body.chars().count() < 10 {
                issues.push(ValidationIssue::new(path("reviewBody"), "must be at least 10 characters"));
            }
            if review.date().is_none() {
                issues.push(ValidationIssue::new(
                    path("datePublished"),
                    format!("must be YYYY-MM-DD, got '{}'", review.date_published),
                ));
            }
        }

        let count = self.reviews.len();
        if aggregate.review_count != count as f64 {
            issues.push(ValidationIssue::new(
                "aggregateRating.reviewCount",
                format!("reports {} but the feed has {} reviews", aggregate.review_count, count),
            ));
        }

        if count > 0 {
            let total: u32 = self.reviews.iter().map(|r| u32::from(r.rating())).sum();
            let average = f64::from(total) / count as f64;
            if (average - aggregate.rating_value).abs() >= 0.01 {
                issues.push(ValidationIssue::new(
                    "aggregateRating.ratingValue",
                    format!("reports {} but the reviews average {:.2}", aggregate.rating_value, average),
                ));
            }
        }

        issues
    }
}

/// A single validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub path: String,
    pub message: String,
}

impl ValidationIssue {
    fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Accept `4.8` as well as `"4.8"`.
fn number_or_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("expected a number, got '{}'", s))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"{
        "aggregateRating": {"@type": "AggregateRating", "ratingValue": "4.5", "reviewCount": "2", "bestRating": "5"},
        "reviews": [
            {"@type": "Review", "id": "review-1", "author": {"name": "Amara"}, "reviewRating": {"ratingValue": "5"},
             "reviewBody": "Beautiful hoops, wear them daily.", "datePublished": "2024-01-15", "verified": true},
            {"@type": "Review", "id": "review-2", "author": {"name": "Jo"}, "reviewRating": {"ratingValue": 4},
             "reviewBody": "Lovely chain, clasp is a bit small.", "datePublished": "2024-02-01"}
        ]
    }"#;

    #[test]
    fn test_parse_numbers_and_strings() {
        let doc = ReviewsDocument::from_json(FEED).unwrap();
        assert_eq!(doc.aggregate_rating.rating_value, 4.5);
        assert_eq!(doc.aggregate_rating.review_count, 2.0);
        assert_eq!(doc.reviews[0].rating(), 5);
        assert_eq!(doc.reviews[1].rating(), 4);
        assert!(doc.reviews[0].verified);
        assert!(!doc.reviews[1].verified);
        assert_eq!(doc.reviews[0].date(), NaiveDate::from_ymd_opt(2024, 1, 15));
    }

    #[test]
    fn test_valid_feed() {
        let doc = ReviewsDocument::from_json(FEED).unwrap();
        assert!(doc.validate().is_empty());
    }

    #[test]
    fn test_validation_issues() {
        let mut doc = ReviewsDocument::from_json(FEED).unwrap();
        doc.reviews[1].id = "review-1".to_string();
        doc.reviews[1].review_rating.rating_value = 6.0;
        doc.reviews[1].date_published = "01/02/2024".to_string();
        doc.reviews[1].review_body = "ok".to_string();
        doc.aggregate_rating.review_count = 3.0;

        let paths: Vec<String> = doc.validate().into_iter().map(|i| i.path).collect();
        assert!(paths.contains(&"reviews[1].id".to_string()));
        assert!(paths.contains(&"reviews[1].reviewRating.ratingValue".to_string()));
        assert!(paths.contains(&"reviews[1].datePublished".to_string()));
        assert!(paths.contains(&"reviews[1].reviewBody".to_string()));
        assert!(paths.contains(&"aggregateRating.reviewCount".to_string()));
        assert!(paths.contains(&"aggregateRating.ratingValue".to_string()));
    }

    #[test]
    fn test_rejects_non_numeric_rating() {
        let json = r#"{"aggregateRating": {"ratingValue": "high", "reviewCount": 0}, "reviews": []}"#;
        assert!(matches!(ReviewsDocument::from_json(json), Err(WidgetError::InvalidData(_))));
    }
}
