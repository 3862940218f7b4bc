use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ApiError;

/// Reading status of a tracked book.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookStatus {
    #[default]
    Reading,
    Completed,
    Wishlist,
}

impl BookStatus {
    pub const ALL: [BookStatus; 3] = [
        BookStatus::Reading,
        BookStatus::Completed,
        BookStatus::Wishlist,
    ];

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "reading" => Some(BookStatus::Reading),
            "completed" => Some(BookStatus::Completed),
            "wishlist" => Some(BookStatus::Wishlist),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BookStatus::Reading => "reading",
            BookStatus::Completed => "completed",
            BookStatus::Wishlist => "wishlist",
        }
    }
}

/// A tracked book as stored and as returned to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    pub id: String,
    pub title: String,
    pub author: String,
    pub status: BookStatus,
    pub created_at: DateTime<Utc>,
    pub user_id: String,
}

/// Request body for POST /books.
#[derive(Debug, Clone, Deserialize)]
pub struct BookCreate {
    pub title: Option<String>,
    pub author: Option<String>,
    pub status: Option<String>,
}

/// Validated create payload, owner and timestamps still unassigned.
#[derive(Debug, Clone)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub status: BookStatus,
}

impl BookCreate {
    pub fn validate(self) -> Result<NewBook, ApiError> {
        let title = non_empty("Title", self.title.unwrap_or_default())?;
        let author = non_empty("Author", self.author.unwrap_or_default())?;
        let status = match self.status.as_deref() {
            Some(raw) => parse_status(raw)?,
            None => BookStatus::default(),
        };

        Ok(NewBook {
            title,
            author,
            status,
        })
    }
}

/// Request body for PATCH /books/{id}; any subset of the mutable fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookUpdate {
    pub title: Option<String>,
    pub author: Option<String>,
    pub status: Option<String>,
}

impl BookUpdate {
    /// Validates the supplied fields and shapes them for the store.
    /// A payload with no recognized field is rejected rather than
    /// silently succeeding.
    pub fn validate(self) -> Result<Value, ApiError> {
        let mut changes = Map::new();

        if let Some(title) = self.title {
            let title = non_empty("Title", title)?;
            changes.insert("title".to_string(), Value::String(title));
        }
        if let Some(author) = self.author {
            let author = non_empty("Author", author)?;
            changes.insert("author".to_string(), Value::String(author));
        }
        if let Some(raw) = self.status.as_deref() {
            let status = parse_status(raw)?;
            changes.insert(
                "status".to_string(),
                Value::String(status.as_str().to_string()),
            );
        }

        if changes.is_empty() {
            return Err(ApiError::bad_request("No fields to update"));
        }

        Ok(Value::Object(changes))
    }
}

pub fn parse_status(raw: &str) -> Result<BookStatus, ApiError> {
    BookStatus::parse(raw).ok_or_else(|| {
        ApiError::bad_request(format!("Status must be one of: {}", status_list()))
    })
}

pub fn parse_status_filter(raw: &str) -> Result<BookStatus, ApiError> {
    BookStatus::parse(raw).ok_or_else(|| {
        ApiError::bad_request(format!("Status filter must be one of: {}", status_list()))
    })
}

fn status_list() -> String {
    BookStatus::ALL.map(|s| s.as_str()).join(", ")
}

fn non_empty(field: &str, value: String) -> Result<String, ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::bad_request(format!("{} must not be empty", field)));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_known_statuses_only() {
        assert_eq!(BookStatus::parse("reading"), Some(BookStatus::Reading));
        assert_eq!(BookStatus::parse("completed"), Some(BookStatus::Completed));
        assert_eq!(BookStatus::parse("wishlist"), Some(BookStatus::Wishlist));
        assert_eq!(BookStatus::parse("abandoned"), None);
        assert_eq!(BookStatus::parse("Reading"), None);
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(json!(BookStatus::Wishlist), json!("wishlist"));
    }

    #[test]
    fn create_defaults_status_to_reading() {
        let payload = BookCreate {
            title: Some("Dune".to_string()),
            author: Some("Herbert".to_string()),
            status: None,
        };
        let book = payload.validate().unwrap();
        assert_eq!(book.status, BookStatus::Reading);
    }

    #[test]
    fn create_rejects_blank_title() {
        let payload = BookCreate {
            title: Some("   ".to_string()),
            author: Some("Herbert".to_string()),
            status: None,
        };
        let err = payload.validate().unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.message(), "Title must not be empty");
    }

    #[test]
    fn create_rejects_missing_author() {
        let payload = BookCreate {
            title: Some("Dune".to_string()),
            author: None,
            status: None,
        };
        assert_eq!(payload.validate().unwrap_err().status_code(), 400);
    }

    #[test]
    fn create_rejects_unknown_status() {
        let payload = BookCreate {
            title: Some("Dune".to_string()),
            author: Some("Herbert".to_string()),
            status: Some("paused".to_string()),
        };
        let err = payload.validate().unwrap_err();
        assert_eq!(
            err.message(),
            "Status must be one of: reading, completed, wishlist"
        );
    }

    #[test]
    fn update_keeps_only_supplied_fields() {
        let payload = BookUpdate {
            title: None,
            author: None,
            status: Some("completed".to_string()),
        };
        let changes = payload.validate().unwrap();
        assert_eq!(changes, json!({ "status": "completed" }));
    }

    #[test]
    fn update_rejects_empty_payload() {
        let err = BookUpdate::default().validate().unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.message(), "No fields to update");
    }

    #[test]
    fn update_rejects_blank_author() {
        let payload = BookUpdate {
            title: None,
            author: Some(String::new()),
            status: None,
        };
        assert_eq!(
            payload.validate().unwrap_err().message(),
            "Author must not be empty"
        );
    }
}
