use serde::{Deserialize, Serialize};

use crate::models::PerformanceReview;
use crate::utils::format_date;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub full_name: Option<String>,
    pub email: String,
    pub department: String,
    pub date_of_joining: String,
    #[serde(default)]
    pub reviews_count: i64,
    #[serde(default)]
    pub average_rating: Option<f64>,
    // Present on detail responses only; list responses omit it
    #[serde(default)]
    pub performance_reviews: Vec<PerformanceReview>,
}

impl Employee {
    pub fn full_name(&self) -> String {
        match self.full_name {
            Some(ref full) if !full.is_empty() => full.clone(),
            _ => format!("{} {}", self.first_name, self.last_name),
        }
    }

    pub fn display_name(&self) -> String {
        format!("{}, {}", self.last_name, self.first_name)
    }

    pub fn joined_display(&self) -> String {
        format_date(&self.date_of_joining)
    }

    /// Average rating for the table, "-" when the employee has no reviews
    pub fn rating_display(&self) -> String {
        self.average_rating
            .map(|r| format!("{:.1}", r))
            .unwrap_or_else(|| "-".to_string())
    }
}

/// Payload for create/update requests. The server derives everything else.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EmployeeInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub department: String,
    pub date_of_joining: String,
}

// Sorting options for the employees table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmployeeSortColumn {
    Name,
    Department,
    JoinDate,
    Reviews,
    Rating,
}

/// Five most recently joined employees, for the dashboard panel.
/// Ties keep their fetch order; unparseable dates sort last.
pub fn recent_employees(employees: &[Employee]) -> Vec<&Employee> {
    let mut sorted: Vec<&Employee> = employees.iter().collect();
    sorted.sort_by(|a, b| b.date_of_joining.cmp(&a.date_of_joining));
    sorted.into_iter().take(5).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn employee(id: i64, first: &str, last: &str, joined: &str) -> Employee {
        Employee {
            id,
            first_name: first.to_string(),
            last_name: last.to_string(),
            full_name: None,
            email: format!("{}@example.com", first.to_lowercase()),
            department: "Engineering".to_string(),
            date_of_joining: joined.to_string(),
            reviews_count: 0,
            average_rating: None,
            performance_reviews: vec![],
        }
    }

    #[test]
    fn test_full_name_falls_back_to_parts() {
        let mut e = employee(1, "Alice", "Johnson", "2023-04-01");
        assert_eq!(e.full_name(), "Alice Johnson");

        e.full_name = Some("Alice M. Johnson".to_string());
        assert_eq!(e.full_name(), "Alice M. Johnson");
    }

    #[test]
    fn test_rating_display() {
        let mut e = employee(1, "Alice", "Johnson", "2023-04-01");
        assert_eq!(e.rating_display(), "-");
        e.average_rating = Some(4.25);
        assert_eq!(e.rating_display(), "4.2");
    }

    #[test]
    fn test_recent_employees_sorted_desc_capped_at_five() {
        let employees = vec![
            employee(1, "A", "One", "2020-01-01"),
            employee(2, "B", "Two", "2024-06-15"),
            employee(3, "C", "Three", "2022-03-10"),
            employee(4, "D", "Four", "2023-11-02"),
            employee(5, "E", "Five", "2021-07-21"),
            employee(6, "F", "Six", "2024-01-30"),
        ];

        let recent = recent_employees(&employees);
        let ids: Vec<i64> = recent.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![2, 6, 4, 3, 5]);
    }

    #[test]
    fn test_list_response_defaults() {
        // List endpoints omit nested reviews; boundary defaults fill them in
        let json = r#"{
            "id": 7,
            "first_name": "Dana",
            "last_name": "Reyes",
            "full_name": "Dana Reyes",
            "email": "dana@example.com",
            "department": "Sales",
            "date_of_joining": "2022-09-01"
        }"#;
        let e: Employee = serde_json::from_str(json).expect("employee should parse");
        assert_eq!(e.reviews_count, 0);
        assert_eq!(e.average_rating, None);
        assert!(e.performance_reviews.is_empty());
    }
}
