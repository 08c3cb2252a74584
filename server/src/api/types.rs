//! Shared API types
//!
//! Error responses and page envelopes used by every record endpoint.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::core::constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::data::{DataError, PageRequest};
use crate::domain::filters::request::{PAGE_KEY, SIZE_KEY};
use crate::domain::filters::{FilterError, FilterRequest};

/// Standard API error response
#[derive(Debug)]
pub enum ApiError {
    BadRequest { code: String, message: String },
    NotFound { code: String, message: String },
    Internal { message: String },
}

impl ApiError {
    pub fn bad_request(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BadRequest {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn not_found(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NotFound {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn unknown_record(record: &str) -> Self {
        Self::not_found(
            "RECORD_NOT_FOUND",
            format!("Unknown record type: {}", record),
        )
    }
}

impl From<FilterError> for ApiError {
    fn from(e: FilterError) -> Self {
        tracing::debug!(field = e.field(), error = %e, "Rejected filter");
        Self::bad_request(e.code(), e.to_string())
    }
}

impl From<DataError> for ApiError {
    fn from(e: DataError) -> Self {
        if let DataError::UnknownRecord(record) = &e {
            return Self::unknown_record(record);
        }
        tracing::error!(error = %e, "Data error");
        Self::internal("Record query failed")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, code, message) = match self {
            Self::BadRequest { code, message } => {
                (StatusCode::BAD_REQUEST, "bad_request", code, message)
            }
            Self::NotFound { code, message } => (StatusCode::NOT_FOUND, "not_found", code, message),
            Self::Internal { message } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "INTERNAL".to_string(),
                message,
            ),
        };
        (
            status,
            Json(serde_json::json!({
                "error": error_type,
                "code": code,
                "message": message
            })),
        )
            .into_response()
    }
}

/// Validator function for page parameter
pub fn validate_page(page: i64) -> Result<(), ValidationError> {
    if !(0..=u32::MAX as i64).contains(&page) {
        return Err(ValidationError::new("INVALID_PAGE").with_message("Page must be >= 0".into()));
    }
    Ok(())
}

/// Validator function for size parameter
pub fn validate_size(size: i64) -> Result<(), ValidationError> {
    if !(1..=MAX_PAGE_SIZE as i64).contains(&size) {
        return Err(ValidationError::new("INVALID_PAGE_SIZE")
            .with_message(format!("Size must be between 1 and {}", MAX_PAGE_SIZE).into()));
    }
    Ok(())
}

/// Paging parameters read from the reserved `page` (0-based) and `size` keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Validate)]
pub struct PageParams {
    #[validate(custom(function = "validate_page"))]
    pub page: i64,

    #[validate(custom(function = "validate_size"))]
    pub size: i64,
}

impl PageParams {
    pub fn from_request(request: &FilterRequest) -> Result<Self, ApiError> {
        let page = parse_param(request, PAGE_KEY, "INVALID_PAGE")?.unwrap_or(0);
        let size = parse_param(request, SIZE_KEY, "INVALID_PAGE_SIZE")?
            .unwrap_or(DEFAULT_PAGE_SIZE as i64);
        Ok(Self { page, size })
    }
}

impl From<PageParams> for PageRequest {
    /// Values are range-checked by `validate` first
    fn from(params: PageParams) -> Self {
        PageRequest::new(
            params.page.clamp(0, u32::MAX as i64) as u32,
            params.size.clamp(1, MAX_PAGE_SIZE as i64) as u32,
        )
    }
}

fn parse_param(request: &FilterRequest, key: &str, code: &str) -> Result<Option<i64>, ApiError> {
    request
        .first(key)
        .map(|raw| {
            raw.trim().parse::<i64>().map_err(|_| {
                ApiError::bad_request(code, format!("Invalid {} '{}': not a number", key, raw))
            })
        })
        .transpose()
}

/// Parse and validate the request's paging keys
pub fn page_request(request: &FilterRequest) -> Result<PageRequest, ApiError> {
    let params = PageParams::from_request(request)?;
    params.validate()?;
    Ok(params.into())
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let code = errors
            .field_errors()
            .values()
            .flat_map(|errs| errs.iter())
            .map(|e| e.code.to_string())
            .next()
            .unwrap_or_else(|| "VALIDATION_ERROR".to_string());
        Self::bad_request(code, format_validation_errors(&errors))
    }
}

fn format_validation_errors(errors: &ValidationErrors) -> String {
    errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{}: validation failed", field))
            })
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Page of records plus totals
#[derive(Debug, Serialize)]
pub struct PageResponse<T> {
    pub content: Vec<T>,
    pub page: u32,
    pub size: u32,
    pub total_elements: u64,
    pub total_pages: u64,
}

impl<T> PageResponse<T> {
    pub fn new(content: Vec<T>, page: PageRequest, total_elements: u64) -> Self {
        Self {
            content,
            page: page.page,
            size: page.size,
            total_elements,
            total_pages: total_elements.div_ceil(page.size as u64),
        }
    }
}
