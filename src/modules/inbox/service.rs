use std::sync::Arc;

use crate::api::error;
use crate::api::page::CursorPageResponse;
use crate::modules::inbox::model::{
    InboxFilter, InboxItemResponse, InboxQueryRequest, UnreadCountResponse,
};
use crate::modules::inbox::repository::ConversationRepository;
use crate::modules::inbox::schema::ConversationStatus;
use crate::utils::{blank_to_null, clamp_page_size, decode_cursor, encode_cursor};

#[derive(Clone)]
pub struct InboxService<R>
where
    R: ConversationRepository + Send + Sync + 'static,
{
    conversation_repo: Arc<R>,
}

impl<R> InboxService<R>
where
    R: ConversationRepository + Send + Sync + 'static,
{
    pub fn with_dependencies(conversation_repo: Arc<R>) -> Self {
        InboxService { conversation_repo }
    }

    /// Inbox: open conversations only; status is forced regardless of input.
    pub async fn get_inbox(
        &self,
        mut req: InboxQueryRequest,
    ) -> Result<CursorPageResponse<InboxItemResponse>, error::SystemError> {
        req.status = Some(ConversationStatus::Open);
        self.fetch_page(req).await
    }

    /// Message history: all conversations; status stays optional.
    pub async fn get_message_history(
        &self,
        req: InboxQueryRequest,
    ) -> Result<CursorPageResponse<InboxItemResponse>, error::SystemError> {
        self.fetch_page(req).await
    }

    pub async fn get_unread_count(
        &self,
        project_id: i64,
    ) -> Result<UnreadCountResponse, error::SystemError> {
        let unread_count = self.conversation_repo.sum_unread_by_project(project_id).await?;
        Ok(UnreadCountResponse { project_id, unread_count })
    }

    async fn fetch_page(
        &self,
        req: InboxQueryRequest,
    ) -> Result<CursorPageResponse<InboxItemResponse>, error::SystemError> {
        let size = clamp_page_size(req.size) as usize;

        let filter = InboxFilter {
            project_id: req.project_id,
            status: req.status,
            assigned_type: req.assigned_type,
            assigned_id: req.assigned_id,
            // Tri-state contract: absent and false are identical; only an
            // explicit true adds a constraint.
            unread_only: req.unread_only.unwrap_or(false),
            active_session: req.active_session.unwrap_or(false),
            search: blank_to_null(req.search),
        };

        // Fetch size+1 to detect the next page without a second query.
        let limit = (size + 1) as i64;

        let mut rows = match &req.cursor {
            None => self.conversation_repo.find_first_page(&filter, limit).await?,
            Some(cursor) => {
                let (cursor_time, cursor_id) = decode_cursor(cursor)?;
                self.conversation_repo
                    .find_next_page(&filter, cursor_time, cursor_id, limit)
                    .await?
            }
        };

        let has_more = rows.len() > size;
        if has_more {
            rows.truncate(size);
        }

        // Cursor comes from the last row actually returned, never the probe.
        let next_cursor = if has_more {
            rows.last().map(|last| encode_cursor(last.last_message_at, last.conversation_id))
        } else {
            None
        };

        // Counting is the one expensive query, first page only.
        let total_count = if req.cursor.is_none() {
            Some(self.conversation_repo.count_filtered(&filter).await?)
        } else {
            None
        };

        let data: Vec<InboxItemResponse> =
            rows.into_iter().map(InboxItemResponse::from_row).collect();

        Ok(CursorPageResponse {
            page_size: data.len(),
            data,
            total_count,
            next_cursor,
            has_more,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, Utc};

    use crate::modules::inbox::model::InboxRow;
    use crate::modules::inbox::schema::{AssignedType, ConversationEntity};

    /// In-memory stand-in mirroring the SQL ordering and filter semantics.
    struct MockConversationRepository {
        rows: Vec<InboxRow>,
    }

    impl MockConversationRepository {
        fn new(rows: Vec<InboxRow>) -> Self {
            Self { rows }
        }

        fn filtered(&self, f: &InboxFilter) -> Vec<InboxRow> {
            let now = Utc::now();
            let mut rows: Vec<InboxRow> = self
                .rows
                .iter()
                .filter(|r| f.status.is_none_or(|s| r.status == s))
                .filter(|r| f.assigned_type.is_none_or(|a| r.assigned_type == a))
                .filter(|r| f.assigned_id.is_none_or(|id| r.assigned_id == Some(id)))
                .filter(|r| !f.unread_only || r.unread_count > 0)
                .filter(|r| {
                    !f.active_session || r.conversation_open_until.is_some_and(|u| u > now)
                })
                .filter(|r| match &f.search {
                    None => true,
                    Some(s) => {
                        let s_lower = s.to_lowercase();
                        r.contact_name
                            .as_deref()
                            .is_some_and(|n| n.to_lowercase().contains(&s_lower))
                            || r.contact_phone.as_deref().is_some_and(|p| p.contains(s.as_str()))
                    }
                })
                .cloned()
                .collect();
            rows.sort_by(|a, b| {
                b.last_message_at
                    .cmp(&a.last_message_at)
                    .then(b.conversation_id.cmp(&a.conversation_id))
            });
            rows
        }
    }

    #[async_trait::async_trait]
    impl ConversationRepository for MockConversationRepository {
        async fn find_by_id(
            &self,
            _conversation_id: i64,
        ) -> Result<Option<ConversationEntity>, error::SystemError> {
            Ok(None)
        }

        async fn find_first_page(
            &self,
            filter: &InboxFilter,
            limit: i64,
        ) -> Result<Vec<InboxRow>, error::SystemError> {
            Ok(self.filtered(filter).into_iter().take(limit as usize).collect())
        }

        async fn find_next_page(
            &self,
            filter: &InboxFilter,
            cursor_time: DateTime<Utc>,
            cursor_id: i64,
            limit: i64,
        ) -> Result<Vec<InboxRow>, error::SystemError> {
            Ok(self
                .filtered(filter)
                .into_iter()
                .filter(|r| {
                    r.last_message_at < cursor_time
                        || (r.last_message_at == cursor_time && r.conversation_id < cursor_id)
                })
                .take(limit as usize)
                .collect())
        }

        async fn count_filtered(&self, filter: &InboxFilter) -> Result<i64, error::SystemError> {
            Ok(self.filtered(filter).len() as i64)
        }

        async fn sum_unread_by_project(&self, _project_id: i64) -> Result<i64, error::SystemError> {
            Ok(self
                .rows
                .iter()
                .filter(|r| r.status == ConversationStatus::Open)
                .map(|r| r.unread_count as i64)
                .sum())
        }

        async fn mark_as_read(&self, _conversation_id: i64) -> Result<u64, error::SystemError> {
            Ok(0)
        }
    }

    fn ts(millis: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(millis).unwrap()
    }

    fn row(id: i64, at_millis: i64) -> InboxRow {
        InboxRow {
            conversation_id: id,
            contact_id: id,
            waba_account_id: 1,
            status: ConversationStatus::Open,
            assigned_type: AssignedType::Unassigned,
            assigned_id: None,
            last_message_at: ts(at_millis),
            last_message_direction: None,
            last_message_preview: Some(format!("preview {id}")),
            unread_count: 0,
            conversation_open_until: None,
            last_inbound_at: None,
            last_message_id: Some(id),
            contact_name: Some(format!("Contact {id}")),
            contact_phone: Some(format!("+91900000{id:04}")),
            is_sent: Some(true),
            is_delivered: None,
            is_read: None,
            is_failed: None,
        }
    }

    fn request(project_id: i64) -> InboxQueryRequest {
        InboxQueryRequest {
            project_id,
            cursor: None,
            size: None,
            status: None,
            assigned_type: None,
            assigned_id: None,
            unread_only: None,
            active_session: None,
            search: None,
        }
    }

    fn service(rows: Vec<InboxRow>) -> InboxService<MockConversationRepository> {
        InboxService::with_dependencies(Arc::new(MockConversationRepository::new(rows)))
    }

    #[tokio::test]
    async fn pages_concatenate_without_gaps_or_duplicates() {
        // 25 rows, several sharing a timestamp to exercise the id tie-break.
        let base = 1_700_000_000_000;
        let rows: Vec<InboxRow> =
            (1..=25).map(|i| row(i, base + (i / 3) * 1_000)).collect();
        let svc = service(rows.clone());

        let expected: Vec<i64> = {
            let mut sorted = rows;
            sorted.sort_by(|a, b| {
                b.last_message_at
                    .cmp(&a.last_message_at)
                    .then(b.conversation_id.cmp(&a.conversation_id))
            });
            sorted.into_iter().map(|r| r.conversation_id).collect()
        };

        let mut collected = Vec::new();
        let mut cursor: Option<String> = None;
        let mut first = true;
        loop {
            let mut req = request(1);
            req.size = Some(10);
            req.cursor = cursor.clone();
            let page = svc.get_message_history(req).await.unwrap();

            if first {
                assert_eq!(page.total_count, Some(25));
                first = false;
            } else {
                assert_eq!(page.total_count, None);
            }

            collected.extend(page.data.iter().map(|d| d.conversation_id));
            if !page.has_more {
                assert!(page.next_cursor.is_none());
                break;
            }
            cursor = page.next_cursor;
            assert!(cursor.is_some());
        }

        assert_eq!(collected.len(), 25);
        assert_eq!(collected, expected);
    }

    #[tokio::test]
    async fn probe_row_controls_has_more() {
        let base = 1_700_000_000_000;

        // Exactly size+1 matches: first page has `size` rows and hasMore.
        let svc = service((1..=11).map(|i| row(i, base + i * 1_000)).collect());
        let mut req = request(1);
        req.size = Some(10);
        let page = svc.get_inbox(req).await.unwrap();
        assert_eq!(page.data.len(), 10);
        assert_eq!(page.page_size, 10);
        assert!(page.has_more);
        assert!(page.next_cursor.is_some());

        // Exactly size matches: no probe row survives, cursor absent.
        let svc = service((1..=10).map(|i| row(i, base + i * 1_000)).collect());
        let mut req = request(1);
        req.size = Some(10);
        let page = svc.get_inbox(req).await.unwrap();
        assert_eq!(page.data.len(), 10);
        assert!(!page.has_more);
        assert!(page.next_cursor.is_none());
        assert_eq!(page.total_count, Some(10));
    }

    #[tokio::test]
    async fn next_cursor_points_at_last_returned_row() {
        let base = 1_700_000_000_000;
        let svc = service((1..=15).map(|i| row(i, base + i * 1_000)).collect());

        let mut req = request(1);
        req.size = Some(10);
        let page = svc.get_inbox(req).await.unwrap();

        // DESC order: rows 15..6 on page one; cursor encodes row 6, not the
        // probe row 5.
        let last = page.data.last().unwrap();
        assert_eq!(last.conversation_id, 6);
        let (cursor_time, cursor_id) = decode_cursor(&page.next_cursor.unwrap()).unwrap();
        assert_eq!(cursor_id, 6);
        assert_eq!(cursor_time, ts(base + 6_000));
    }

    #[tokio::test]
    async fn unread_only_false_does_not_filter() {
        let base = 1_700_000_000_000;
        let mut rows: Vec<InboxRow> = (1..=6).map(|i| row(i, base + i * 1_000)).collect();
        for r in rows.iter_mut().take(3) {
            r.unread_count = 5;
        }
        let svc = service(rows);

        // false must mean "filter not applied": both read and unread rows.
        let mut req = request(1);
        req.unread_only = Some(false);
        let page = svc.get_inbox(req).await.unwrap();
        assert_eq!(page.data.len(), 6);

        let mut req = request(1);
        req.unread_only = None;
        let page = svc.get_inbox(req).await.unwrap();
        assert_eq!(page.data.len(), 6);

        let mut req = request(1);
        req.unread_only = Some(true);
        let page = svc.get_inbox(req).await.unwrap();
        assert_eq!(page.data.len(), 3);
        assert!(page.data.iter().all(|d| d.unread_count > 0));
    }

    #[tokio::test]
    async fn inbox_forces_open_status() {
        let base = 1_700_000_000_000;
        let mut rows: Vec<InboxRow> = (1..=4).map(|i| row(i, base + i * 1_000)).collect();
        rows[0].status = ConversationStatus::Closed;
        rows[1].status = ConversationStatus::Archived;
        let svc = service(rows);

        // Even a caller-supplied status is overridden for the inbox view.
        let mut req = request(1);
        req.status = Some(ConversationStatus::Closed);
        let page = svc.get_inbox(req).await.unwrap();
        assert_eq!(page.data.len(), 2);
        assert!(page.data.iter().all(|d| d.status == ConversationStatus::Open));

        // History honours it.
        let mut req = request(1);
        req.status = Some(ConversationStatus::Closed);
        let page = svc.get_message_history(req).await.unwrap();
        assert_eq!(page.data.len(), 1);
    }

    #[tokio::test]
    async fn active_session_filter_uses_open_until_window() {
        let base = 1_700_000_000_000;
        let mut rows: Vec<InboxRow> = (1..=3).map(|i| row(i, base + i * 1_000)).collect();
        rows[0].conversation_open_until = Some(Utc::now() + Duration::hours(12));
        rows[1].conversation_open_until = Some(Utc::now() - Duration::hours(1));
        let svc = service(rows);

        let mut req = request(1);
        req.active_session = Some(true);
        let page = svc.get_inbox(req).await.unwrap();
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].conversation_id, 1);
        assert!(page.data[0].is_session_active);
        assert!(page.data[0].session_remaining_ms.unwrap() > 0);
    }

    #[tokio::test]
    async fn search_matches_name_case_insensitively_and_phone() {
        let base = 1_700_000_000_000;
        let mut rows: Vec<InboxRow> = (1..=3).map(|i| row(i, base + i * 1_000)).collect();
        rows[0].contact_name = Some("Raj Kumar".into());
        rows[0].contact_phone = Some("+919876543210".into());
        let svc = service(rows);

        let mut req = request(1);
        req.search = Some("raj".into());
        let page = svc.get_inbox(req).await.unwrap();
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].conversation_id, 1);

        let mut req = request(1);
        req.search = Some("98765".into());
        let page = svc.get_inbox(req).await.unwrap();
        assert_eq!(page.data.len(), 1);

        // Blank search is treated as absent.
        let mut req = request(1);
        req.search = Some("   ".into());
        let page = svc.get_inbox(req).await.unwrap();
        assert_eq!(page.data.len(), 3);
    }

    #[tokio::test]
    async fn malformed_cursor_is_a_bad_request() {
        let svc = service(vec![row(1, 1_700_000_000_000)]);
        let mut req = request(1);
        req.cursor = Some("!!not-a-cursor!!".into());
        let err = svc.get_inbox(req).await.unwrap_err();
        assert!(matches!(err, error::SystemError::BadRequest(_)));
    }

    #[tokio::test]
    async fn unread_badge_sums_open_conversations() {
        let base = 1_700_000_000_000;
        let mut rows: Vec<InboxRow> = (1..=3).map(|i| row(i, base + i * 1_000)).collect();
        rows[0].unread_count = 4;
        rows[1].unread_count = 3;
        rows[1].status = ConversationStatus::Closed;
        let svc = service(rows);

        let badge = svc.get_unread_count(1).await.unwrap();
        assert_eq!(badge.unread_count, 4);
    }
}
