use actix_web::{get, post, web};

use crate::{
    api::error,
    modules::{
        chat::{
            model::{ConversationDetailResponse, MarkReadResponse, MessagePageQueryRequest},
            repository_pg::{ContactPgRepository, MessagePgRepository},
            service::ChatService,
        },
        inbox::repository_pg::ConversationPgRepository,
        template::repository_pg::TemplatePgRepository,
    },
    utils::ValidatedQuery,
};

type ChatSvc = ChatService<
    ConversationPgRepository,
    MessagePgRepository,
    ContactPgRepository,
    TemplatePgRepository,
>;

#[get("/{conversation_id}/messages")]
pub async fn get_messages(
    chat_svc: web::Data<ChatSvc>,
    path: web::Path<i64>,
    query: ValidatedQuery<MessagePageQueryRequest>,
) -> Result<web::Json<ConversationDetailResponse>, error::Error> {
    let detail = chat_svc.get_messages(path.into_inner(), query.0).await?;
    Ok(web::Json(detail))
}

#[post("/{conversation_id}/mark-read")]
pub async fn mark_as_read(
    chat_svc: web::Data<ChatSvc>,
    path: web::Path<i64>,
) -> Result<web::Json<MarkReadResponse>, error::Error> {
    let result = chat_svc.mark_as_read(path.into_inner()).await?;
    Ok(web::Json(result))
}
