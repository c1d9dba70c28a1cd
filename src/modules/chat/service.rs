use std::sync::Arc;

use chrono::Utc;

use crate::api::error;
use crate::api::page::CursorPageResponse;
use crate::modules::chat::model::{
    ChatMessageResponse, ConversationDetailResponse, MarkReadResponse, MessagePageQueryRequest,
    MessageRow,
};
use crate::modules::chat::repository::{ContactRepository, MessageRepository};
use crate::modules::chat::schema::MessageType;
use crate::modules::inbox::repository::ConversationRepository;
use crate::modules::template::model::TemplateDetailResponse;
use crate::modules::template::repository::TemplateRepository;
use crate::modules::template::service::TemplateLoaderService;
use crate::utils::{clamp_page_size, decode_cursor, encode_cursor};

#[derive(Clone)]
pub struct ChatService<C, M, K, T>
where
    C: ConversationRepository + Send + Sync + 'static,
    M: MessageRepository + Send + Sync + 'static,
    K: ContactRepository + Send + Sync + 'static,
    T: TemplateRepository + Send + Sync + 'static,
{
    conversation_repo: Arc<C>,
    message_repo: Arc<M>,
    contact_repo: Arc<K>,
    template_loader: TemplateLoaderService<T>,
}

impl<C, M, K, T> ChatService<C, M, K, T>
where
    C: ConversationRepository + Send + Sync + 'static,
    M: MessageRepository + Send + Sync + 'static,
    K: ContactRepository + Send + Sync + 'static,
    T: TemplateRepository + Send + Sync + 'static,
{
    pub fn with_dependencies(
        conversation_repo: Arc<C>,
        message_repo: Arc<M>,
        contact_repo: Arc<K>,
        template_loader: TemplateLoaderService<T>,
    ) -> Self {
        ChatService { conversation_repo, message_repo, contact_repo, template_loader }
    }

    /// One page of a conversation's messages, newest first, with the
    /// conversation header, contact identity and template enrichment.
    pub async fn get_messages(
        &self,
        conversation_id: i64,
        req: MessagePageQueryRequest,
    ) -> Result<ConversationDetailResponse, error::SystemError> {
        let conversation = self
            .conversation_repo
            .find_by_id(conversation_id)
            .await?
            .ok_or_else(|| {
                error::SystemError::not_found(format!("Conversation not found: {conversation_id}"))
            })?;

        // Contact identity is decoration; losing it must not lose the page.
        let (contact_name, contact_phone) =
            match self.contact_repo.find_by_id(conversation.contact_id).await {
                Ok(Some(contact)) => (contact.display_name, contact.wa_phone_e164),
                Ok(None) => (None, None),
                Err(e) => {
                    log::warn!(
                        "Could not resolve contact {} for conversation {conversation_id}: {e}",
                        conversation.contact_id
                    );
                    (None, None)
                }
            };

        let size = clamp_page_size(req.size) as usize;
        let limit = (size + 1) as i64;

        let mut rows = match &req.cursor {
            None => self.message_repo.find_first_page(conversation_id, limit).await?,
            Some(cursor) => {
                let (cursor_time, cursor_id) = decode_cursor(cursor)?;
                self.message_repo
                    .find_next_page(conversation_id, cursor_time, cursor_id, limit)
                    .await?
            }
        };

        let has_more = rows.len() > size;
        if has_more {
            rows.truncate(size);
        }

        let next_cursor = if has_more {
            rows.last().map(|last| encode_cursor(last.created_at, last.message_id))
        } else {
            None
        };

        let total_count = if req.cursor.is_none() {
            Some(self.message_repo.count_by_conversation(conversation_id).await?)
        } else {
            None
        };

        let data = self.enrich_with_template_details(conversation.project_id, rows).await;

        let now = Utc::now();
        let until = conversation.conversation_open_until;
        let active = until.is_some_and(|u| u > now);
        let remaining_ms =
            if active { until.map(|u| u.timestamp_millis() - now.timestamp_millis()) } else { None };

        Ok(ConversationDetailResponse {
            conversation_id: conversation.id,
            contact_id: conversation.contact_id,
            status: conversation.status,
            contact_name,
            contact_phone,
            assigned_type: conversation.assigned_type,
            assigned_id: conversation.assigned_id,
            unread_count: conversation.unread_count,
            conversation_open_until: until,
            is_session_active: active,
            session_remaining_ms: remaining_ms,
            messages: CursorPageResponse {
                page_size: data.len(),
                data,
                total_count,
                next_cursor,
                has_more,
            },
        })
    }

    /// Reset the unread counter. Safe to call any number of times; only the
    /// first call on an unread conversation changes anything.
    pub async fn mark_as_read(
        &self,
        conversation_id: i64,
    ) -> Result<MarkReadResponse, error::SystemError> {
        self.conversation_repo.find_by_id(conversation_id).await?.ok_or_else(|| {
            error::SystemError::not_found(format!("Conversation not found: {conversation_id}"))
        })?;

        let rows_changed = self.conversation_repo.mark_as_read(conversation_id).await?;
        let updated = rows_changed > 0;
        log::debug!("mark_as_read conversation={conversation_id} updated={updated}");

        Ok(MarkReadResponse {
            conversation_id,
            updated,
            message: if updated { "Conversation marked as read." } else { "Already up to date." },
        })
    }

    /// Attach the full template structure to every TEMPLATE message on the
    /// page. The loader is failure-isolated: when it comes back empty the
    /// messages go out with name and language only.
    async fn enrich_with_template_details(
        &self,
        project_id: i64,
        rows: Vec<MessageRow>,
    ) -> Vec<ChatMessageResponse> {
        let mut names: Vec<String> = rows
            .iter()
            .filter(|r| r.message_type == MessageType::Template)
            .filter_map(|r| r.template_name.clone())
            .collect();
        names.sort();
        names.dedup();

        let templates = self.template_loader.load_batch(project_id, &names).await;

        rows.into_iter()
            .map(|row| {
                let template_vars = row.template_vars.clone();
                let mut dto = ChatMessageResponse::from_row(row);
                if dto.message_type == MessageType::Template {
                    if let Some(name) = &dto.template_name {
                        let language = dto.template_language.as_deref().unwrap_or("");
                        let key = format!("{name}|{language}");
                        dto.template_detail = templates.get(&key).map(|tree| {
                            TemplateDetailResponse::from_tree(tree, template_vars.as_deref())
                        });
                    }
                }
                dto
            })
            .collect()
    }
}
