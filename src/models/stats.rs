use serde::Deserialize;

/// List endpoints answer with either a bare array or a paginated envelope
/// carrying a `results` array. Normalized here so callers only ever see a Vec.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub enum ListResponse<T> {
    Wrapped {
        #[serde(default)]
        results: Vec<T>,
    },
    Bare(Vec<T>),
}

impl<T> ListResponse<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            ListResponse::Wrapped { results } => results,
            ListResponse::Bare(items) => items,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmployeeStats {
    #[serde(default)]
    pub total_employees: i64,
    #[serde(default)]
    pub departments: Vec<DepartmentCount>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DepartmentCount {
    pub department: String,
    pub count: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewStats {
    #[serde(default)]
    pub total_reviews: i64,
    #[serde(default)]
    pub average_rating: f64,
    #[serde(default)]
    pub rating_distribution: Vec<RatingCount>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RatingCount {
    pub rating: i32,
    pub count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Employee;

    #[test]
    fn test_list_response_bare_and_wrapped() {
        let bare = r#"[{"id":1,"first_name":"A","last_name":"B","email":"a@b.c","department":"QA","date_of_joining":"2024-01-01"}]"#;
        let wrapped = format!(r#"{{"count":1,"next":null,"previous":null,"results":{}}}"#, bare);

        let from_bare: ListResponse<Employee> =
            serde_json::from_str(bare).expect("bare list should parse");
        let from_wrapped: ListResponse<Employee> =
            serde_json::from_str(&wrapped).expect("wrapped list should parse");

        assert_eq!(from_bare.into_vec().len(), 1);
        assert_eq!(from_wrapped.into_vec().len(), 1);
    }

    #[test]
    fn test_stats_defaults() {
        let stats: ReviewStats = serde_json::from_str("{}").expect("empty stats should parse");
        assert_eq!(stats.total_reviews, 0);
        assert_eq!(stats.average_rating, 0.0);
        assert!(stats.rating_distribution.is_empty());
    }
}
