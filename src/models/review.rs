use serde::{Deserialize, Serialize};

use crate::utils::format_date;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceReview {
    pub id: i64,
    /// Owning employee id
    pub employee: i64,
    #[serde(default)]
    pub employee_name: Option<String>,
    pub review_period: String,
    pub rating: i32,
    #[serde(default)]
    pub rating_display: Option<String>,
    #[serde(default)]
    pub feedback: Option<String>,
    pub review_date: String,
}

impl PerformanceReview {
    /// Server-provided rating label, with a local fallback
    pub fn rating_label(&self) -> String {
        match self.rating_display {
            Some(ref label) if !label.is_empty() => label.clone(),
            _ => rating_label(self.rating).to_string(),
        }
    }

    pub fn employee_display(&self) -> String {
        match self.employee_name {
            Some(ref name) if !name.is_empty() => name.clone(),
            _ => format!("Employee #{}", self.employee),
        }
    }

    pub fn date_display(&self) -> String {
        format_date(&self.review_date)
    }
}

pub fn rating_label(rating: i32) -> &'static str {
    match rating {
        1 => "Poor",
        2 => "Below Average",
        3 => "Average",
        4 => "Good",
        5 => "Excellent",
        _ => "Unknown",
    }
}

/// Payload for create/update requests
#[derive(Debug, Clone, Serialize)]
pub struct ReviewInput {
    pub employee: i64,
    pub review_period: String,
    pub rating: i32,
    pub feedback: Option<String>,
    pub review_date: String,
}

/// Reviews matching a period filter, fetch order preserved.
/// `None` means no filter.
pub fn filter_by_period<'a>(
    reviews: &'a [PerformanceReview],
    period: Option<&str>,
) -> Vec<&'a PerformanceReview> {
    match period {
        None => reviews.iter().collect(),
        Some(p) => reviews.iter().filter(|r| r.review_period == p).collect(),
    }
}

/// Average rating over a review set, one decimal place; "0" for an empty set
pub fn average_rating_label(reviews: &[&PerformanceReview]) -> String {
    if reviews.is_empty() {
        return "0".to_string();
    }
    let sum: i32 = reviews.iter().map(|r| r.rating).sum();
    format!("{:.1}", f64::from(sum) / reviews.len() as f64)
}

/// Counts per rating value over a review set; index 0 holds rating 1.
/// Out-of-range ratings are ignored rather than panicking.
pub fn rating_counts(reviews: &[&PerformanceReview]) -> [usize; 5] {
    let mut counts = [0usize; 5];
    for review in reviews {
        if (1..=5).contains(&review.rating) {
            counts[(review.rating - 1) as usize] += 1;
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review(id: i64, period: &str, rating: i32) -> PerformanceReview {
        PerformanceReview {
            id,
            employee: 1,
            employee_name: Some("Alice Johnson".to_string()),
            review_period: period.to_string(),
            rating,
            rating_display: None,
            feedback: None,
            review_date: "2024-03-31".to_string(),
        }
    }

    #[test]
    fn test_rating_label_fallback() {
        let mut r = review(1, "Q1 2024", 4);
        assert_eq!(r.rating_label(), "Good");
        r.rating_display = Some("Great".to_string());
        assert_eq!(r.rating_label(), "Great");
        r.rating = 9;
        r.rating_display = None;
        assert_eq!(r.rating_label(), "Unknown");
    }

    #[test]
    fn test_filter_by_period_preserves_order() {
        let reviews = vec![
            review(1, "Q1 2024", 5),
            review(2, "Q2 2024", 3),
            review(3, "Q1 2024", 4),
        ];

        let filtered = filter_by_period(&reviews, Some("Q1 2024"));
        let ids: Vec<i64> = filtered.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 3]);

        let unfiltered = filter_by_period(&reviews, None);
        assert_eq!(unfiltered.len(), 3);
    }

    #[test]
    fn test_average_rating_label() {
        let reviews = vec![review(1, "Q1 2024", 5), review(2, "Q1 2024", 3), review(3, "Q1 2024", 4)];
        let refs: Vec<&PerformanceReview> = reviews.iter().collect();
        assert_eq!(average_rating_label(&refs), "4.0");

        let empty: Vec<&PerformanceReview> = vec![];
        assert_eq!(average_rating_label(&empty), "0");
    }

    #[test]
    fn test_rating_counts() {
        let reviews = vec![
            review(1, "Q1 2024", 5),
            review(2, "Q1 2024", 5),
            review(3, "Q1 2024", 3),
            review(4, "Q1 2024", 1),
        ];
        let refs: Vec<&PerformanceReview> = reviews.iter().collect();
        assert_eq!(rating_counts(&refs), [1, 0, 1, 0, 2]);
    }
}
