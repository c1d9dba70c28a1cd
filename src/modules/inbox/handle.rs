use actix_web::{get, web};

use crate::{
    api::{error, page::CursorPageResponse},
    modules::inbox::{
        model::{InboxItemResponse, InboxQueryRequest, UnreadCountQueryRequest, UnreadCountResponse},
        repository_pg::ConversationPgRepository,
        service::InboxService,
    },
    utils::ValidatedQuery,
};

type InboxSvc = InboxService<ConversationPgRepository>;

#[get("/inbox")]
pub async fn get_inbox(
    inbox_svc: web::Data<InboxSvc>,
    query: ValidatedQuery<InboxQueryRequest>,
) -> Result<web::Json<CursorPageResponse<InboxItemResponse>>, error::Error> {
    let page = inbox_svc.get_inbox(query.0).await?;
    Ok(web::Json(page))
}

#[get("/message-history")]
pub async fn get_message_history(
    inbox_svc: web::Data<InboxSvc>,
    query: ValidatedQuery<InboxQueryRequest>,
) -> Result<web::Json<CursorPageResponse<InboxItemResponse>>, error::Error> {
    let page = inbox_svc.get_message_history(query.0).await?;
    Ok(web::Json(page))
}

#[get("/inbox/unread-count")]
pub async fn get_unread_count(
    inbox_svc: web::Data<InboxSvc>,
    query: ValidatedQuery<UnreadCountQueryRequest>,
) -> Result<web::Json<UnreadCountResponse>, error::Error> {
    let badge = inbox_svc.get_unread_count(query.0.project_id).await?;
    Ok(web::Json(badge))
}
