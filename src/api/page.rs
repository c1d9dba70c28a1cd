use serde::Serialize;

/// Envelope for every cursor-paginated list response.
///
/// `total_count` is populated only on the first page of a filter set; clients
/// cache the value from page one. `next_cursor` is present only when another
/// page exists.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CursorPageResponse<T: Serialize> {
    pub data: Vec<T>,
    pub page_size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
    pub has_more: bool,
}
