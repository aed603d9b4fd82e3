//! Success envelopes shared by every resource (feature `axum`)

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::query::PageMeta;

pub const SUCCESS: &str = "success";

/// `{ status, data }`
#[derive(Debug, Clone, Serialize)]
pub struct DataEnvelope<T> {
    pub status: &'static str,
    pub data: T,
}

impl<T> DataEnvelope<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: SUCCESS,
            data,
        }
    }
}

/// `{ status, requestedAt, results, paginationMetaData, data }`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListEnvelope<T> {
    pub status: &'static str,
    pub requested_at: DateTime<Utc>,
    pub results: usize,
    pub pagination_meta_data: PageMeta,
    pub data: T,
}

impl<T> ListEnvelope<T> {
    pub fn success(requested_at: DateTime<Utc>, results: usize, meta: PageMeta, data: T) -> Self {
        Self {
            status: SUCCESS,
            requested_at,
            results,
            pagination_meta_data: meta,
            data,
        }
    }
}

/// `{ status, message }`
#[derive(Debug, Clone, Serialize)]
pub struct MessageEnvelope {
    pub status: &'static str,
    pub message: String,
}

impl MessageEnvelope {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: SUCCESS,
            message: message.into(),
        }
    }
}
