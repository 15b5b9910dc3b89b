//! Request handlers
//!
//! Every protected handler runs its role gate first, then parses the body,
//! then calls into the `League` service.

pub mod auth;
pub mod matches;
pub mod players;
pub mod teams;

use axum::{
    extract::{rejection::QueryRejection, Query},
    Json,
};
use chrono::NaiveDate;
use wicket_db::UserRole;

use crate::error::{ApiError, FieldErrors};
use crate::models::{HealthResponse, PageQuery, Paginated};

pub const ALL_ROLES: &[UserRole] = &UserRole::ALL;
pub const STAFF: &[UserRole] = &[UserRole::Admin, UserRole::Organiser];
pub const STAFF_AND_CAPTAINS: &[UserRole] =
    &[UserRole::Admin, UserRole::Organiser, UserRole::Captain];

pub const DEFAULT_PAGE_SIZE: u64 = 10;
pub const MAX_PAGE_SIZE: u64 = 100;

pub(crate) const REQUIRED: &str = "This field is required.";

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "system"
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Page number and page size requested by a list call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub page_size: u64,
}

impl PageRequest {
    pub fn from_query(query: Result<Query<PageQuery>, QueryRejection>) -> Result<Self, ApiError> {
        let Query(query) = query?;

        let page = query.page.unwrap_or(1);
        if page == 0 {
            return Err(ApiError::InvalidPage);
        }

        let page_size = match query.page_size {
            None | Some(0) => DEFAULT_PAGE_SIZE,
            Some(size) => size.min(MAX_PAGE_SIZE),
        };

        // The page's offset has to fit the database's signed 64-bit OFFSET
        let fits = (page - 1)
            .checked_mul(page_size)
            .is_some_and(|offset| offset <= i64::MAX as u64);
        if !fits {
            return Err(ApiError::InvalidPage);
        }

        Ok(Self { page, page_size })
    }

    /// Wrap one fetched page with its count and neighbour links
    pub fn paginate<T>(
        &self,
        path: &str,
        total: u64,
        results: Vec<T>,
    ) -> Result<Paginated<T>, ApiError> {
        let offset = self
            .page
            .checked_sub(1)
            .and_then(|index| index.checked_mul(self.page_size))
            .ok_or(ApiError::InvalidPage)?;
        if self.page > 1 && offset >= total {
            return Err(ApiError::InvalidPage);
        }

        let link = |page: u64| format!("{}?page={}&page_size={}", path, page, self.page_size);

        Ok(Paginated {
            count: total,
            next: (offset.saturating_add(self.page_size) < total).then(|| link(self.page + 1)),
            previous: (self.page > 1).then(|| link(self.page - 1)),
            results,
        })
    }
}

/// Collects field errors while a request body is checked
#[derive(Debug, Default)]
pub(crate) struct FieldCheck {
    errors: FieldErrors,
}

impl FieldCheck {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn required<T>(&mut self, field: &str, value: Option<T>) -> Option<T> {
        if value.is_none() {
            self.add(field, REQUIRED);
        }
        value
    }

    /// Non-blank text of at most `max` characters
    pub fn text(&mut self, field: &str, value: Option<String>, max: usize) -> Option<String> {
        let value = value?;
        if value.trim().is_empty() {
            self.add(field, "This field may not be blank.");
            return None;
        }
        if value.chars().count() > max {
            self.add(
                field,
                format!("Ensure this field has no more than {} characters.", max),
            );
            return None;
        }
        Some(value)
    }

    pub fn non_negative(&mut self, field: &str, value: Option<i32>) -> Option<i32> {
        match value {
            Some(v) if v < 0 => {
                self.add(field, "Ensure this value is greater than or equal to 0.");
                None
            }
            other => other,
        }
    }

    pub fn date(&mut self, field: &str, value: Option<String>) -> Option<NaiveDate> {
        let value = value?;
        match NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d") {
            Ok(date) => Some(date),
            Err(_) => {
                self.add(
                    field,
                    "Date has wrong format. Use one of these formats instead: YYYY-MM-DD.",
                );
                None
            }
        }
    }

    pub fn choice<T: std::str::FromStr>(&mut self, field: &str, value: Option<String>) -> Option<T> {
        let value = value?;
        match value.parse() {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                self.add(field, format!("\"{}\" is not a valid choice.", value));
                None
            }
        }
    }

    pub fn finish(self) -> Result<(), ApiError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(self.errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(page: u64, page_size: u64) -> PageRequest {
        PageRequest { page, page_size }
    }

    #[test]
    fn test_page_request_defaults_and_caps() {
        let request = PageRequest::from_query(Ok(Query(PageQuery::default()))).unwrap();
        assert_eq!(request, page(1, DEFAULT_PAGE_SIZE));

        let request = PageRequest::from_query(Ok(Query(PageQuery {
            page: Some(2),
            page_size: Some(500),
        })))
        .unwrap();
        assert_eq!(request, page(2, MAX_PAGE_SIZE));

        let err = PageRequest::from_query(Ok(Query(PageQuery {
            page: Some(0),
            page_size: None,
        })))
        .unwrap_err();
        assert!(matches!(err, ApiError::InvalidPage));

        let err = PageRequest::from_query(Ok(Query(PageQuery {
            page: Some(u64::MAX),
            page_size: None,
        })))
        .unwrap_err();
        assert!(matches!(err, ApiError::InvalidPage));
    }

    #[test]
    fn test_paginate_huge_page_is_invalid() {
        assert!(matches!(
            page(u64::MAX, 100).paginate("/api/matches/", 3, Vec::<i32>::new()),
            Err(ApiError::InvalidPage)
        ));
    }

    #[test]
    fn test_paginate_links() {
        let first = page(1, 10).paginate("/api/teams/", 25, vec![0; 10]).unwrap();
        assert_eq!(first.count, 25);
        assert_eq!(first.next.as_deref(), Some("/api/teams/?page=2&page_size=10"));
        assert_eq!(first.previous, None);

        let last = page(3, 10).paginate("/api/teams/", 25, vec![0; 5]).unwrap();
        assert_eq!(last.next, None);
        assert_eq!(last.previous.as_deref(), Some("/api/teams/?page=2&page_size=10"));

        assert!(matches!(
            page(4, 10).paginate("/api/teams/", 25, Vec::<i32>::new()),
            Err(ApiError::InvalidPage)
        ));

        let empty = page(1, 10).paginate("/api/teams/", 0, Vec::<i32>::new()).unwrap();
        assert_eq!(empty.count, 0);
        assert_eq!(empty.next, None);
    }

    #[test]
    fn test_field_check_collects_errors() {
        let mut check = FieldCheck::default();
        assert_eq!(check.required::<i32>("team1", None), None);
        assert_eq!(check.text("venue", Some("  ".to_string()), 200), None);
        assert_eq!(check.date("date", Some("12/04/2025".to_string())), None);
        assert_eq!(check.non_negative("wickets", Some(-1)), None);
        assert_eq!(check.choice::<UserRole>("category", Some("COACH".to_string())), None);

        match check.finish().unwrap_err() {
            ApiError::Validation(errors) => {
                assert_eq!(errors["team1"], vec![REQUIRED.to_string()]);
                assert_eq!(errors["category"], vec!["\"COACH\" is not a valid choice.".to_string()]);
                assert_eq!(errors.len(), 5);
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
