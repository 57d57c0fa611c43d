//! Paginated history functions exposed by the table API.
//!
//! Each row of a page repeats the total number of rows across all pages
//! in `total_count`.

use chrono::{DateTime, Utc};
use likeboost_common::rest::{Endpoint, RestMethod};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// A row that carries the listing's total row count.
pub trait PagedRow {
    fn total_count(&self) -> Option<i64>;
}

/// An RPC that returns one page of a listing.
pub trait PageQuery: Endpoint + Sized {
    type Row: PagedRow;

    /// Request for a 1-based page of `page_size` rows.
    fn page(page: u32, page_size: u32) -> Self;

    /// Rows of a decoded page
    fn rows(output: Self::Output) -> Vec<Self::Row>;
}

/// Page of manual like requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetLikeHistoryPaginated {
    pub p_page: u32,
    pub p_page_size: u32,
}

/// Page of auto-like executions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetAutoLikeHistoryPaginated {
    pub p_page: u32,
    pub p_page_size: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeHistoryEntry {
    pub id: SmolStr,
    pub uid: SmolStr,
    #[serde(default)]
    pub player_name: Option<SmolStr>,
    pub likes_added: i64,
    pub likes_before: i64,
    pub likes_after: i64,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub total_count: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoLikeHistoryEntry {
    pub id: SmolStr,
    pub uid: SmolStr,
    #[serde(default)]
    pub player_name: Option<SmolStr>,
    pub likes_added: i64,
    pub likes_before: i64,
    pub likes_after: i64,
    /// 1 when the scheduled run delivered likes, 0 when the UID had already claimed
    #[serde(default)]
    pub status: Option<i64>,
    #[serde(default)]
    pub executed_at: Option<DateTime<Utc>>,
    pub sent_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub total_count: Option<i64>,
}

impl PagedRow for LikeHistoryEntry {
    fn total_count(&self) -> Option<i64> {
        self.total_count
    }
}

impl PagedRow for AutoLikeHistoryEntry {
    fn total_count(&self) -> Option<i64> {
        self.total_count
    }
}

impl Endpoint for GetLikeHistoryPaginated {
    const PATH: &'static str = "/rest/v1/rpc/get_like_history_paginated";
    const METHOD: RestMethod = RestMethod::Post;
    type Output = Vec<LikeHistoryEntry>;
}

impl PageQuery for GetLikeHistoryPaginated {
    type Row = LikeHistoryEntry;

    fn page(page: u32, page_size: u32) -> Self {
        Self {
            p_page: page,
            p_page_size: page_size,
        }
    }

    fn rows(output: Vec<LikeHistoryEntry>) -> Vec<LikeHistoryEntry> {
        output
    }
}

impl Endpoint for GetAutoLikeHistoryPaginated {
    const PATH: &'static str = "/rest/v1/rpc/get_auto_like_history_paginated";
    const METHOD: RestMethod = RestMethod::Post;
    type Output = Vec<AutoLikeHistoryEntry>;
}

impl PageQuery for GetAutoLikeHistoryPaginated {
    type Row = AutoLikeHistoryEntry;

    fn page(page: u32, page_size: u32) -> Self {
        Self {
            p_page: page,
            p_page_size: page_size,
        }
    }

    fn rows(output: Vec<AutoLikeHistoryEntry>) -> Vec<AutoLikeHistoryEntry> {
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn page_params_are_the_body() {
        let req = GetAutoLikeHistoryPaginated::page(3, 20);
        assert_eq!(
            serde_json::from_slice::<serde_json::Value>(&req.encode_body().unwrap()).unwrap(),
            json!({"p_page": 3, "p_page_size": 20})
        );
        assert_eq!(req.query().unwrap(), None);
    }

    #[test]
    fn rows_carry_total_count() {
        let rows: Vec<LikeHistoryEntry> = serde_json::from_value(json!([{
            "id": "r1",
            "uid": "123456",
            "player_name": null,
            "likes_added": 100,
            "likes_before": 900,
            "likes_after": 1000,
            "created_at": "2025-03-01T08:00:00+00:00",
            "total_count": 41
        }]))
        .unwrap();
        assert_eq!(rows[0].total_count(), Some(41));
        assert_eq!(rows[0].player_name, None);

        let auto: AutoLikeHistoryEntry = serde_json::from_value(json!({
            "id": "h1",
            "uid": "123456",
            "player_name": "Nova",
            "likes_added": 0,
            "likes_before": 1000,
            "likes_after": 1000,
            "status": 0,
            "sent_at": "2025-03-01T05:00:02+00:00",
            "created_at": "2025-03-01T05:00:02+00:00"
        }))
        .unwrap();
        assert_eq!(auto.total_count(), None);
        assert_eq!(auto.status, Some(0));
    }
}
