use actix_web::{self, middleware::Logger, web, App, HttpServer};
use std::sync::{Arc, LazyLock};

use crate::{
    configs::connect_database,
    modules::{
        chat::{
            repository_pg::{ContactPgRepository, MessagePgRepository},
            service::ChatService,
        },
        inbox::{repository_pg::ConversationPgRepository, service::InboxService},
        template::{repository_pg::TemplatePgRepository, service::TemplateLoaderService},
    },
};

mod api;
mod configs;
mod constants;
mod modules;
mod utils;

pub static ENV: LazyLock<constants::Env> = LazyLock::new(|| {
    dotenvy::dotenv().ok();
    env_logger::init();
    log::info!("Environment variables loaded from .env file");
    constants::Env::default()
});

#[actix_web::get("/")]
async fn health_check() -> &'static str {
    "Server is running"
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let db_pool =
        connect_database().await.map_err(|_| std::io::Error::other("Database connection error"))?;

    sqlx::migrate!()
        .run(&db_pool)
        .await
        .map_err(|e| std::io::Error::other(format!("Migration error: {e}")))?;

    let conversation_repo = Arc::new(ConversationPgRepository::new(db_pool.clone()));
    let message_repo = Arc::new(MessagePgRepository::new(db_pool.clone()));
    let contact_repo = Arc::new(ContactPgRepository::new(db_pool.clone()));
    let template_repo = Arc::new(TemplatePgRepository::new(db_pool.clone()));

    let inbox_service = InboxService::with_dependencies(conversation_repo.clone());
    let template_loader = TemplateLoaderService::with_dependencies(template_repo);
    let chat_service = ChatService::with_dependencies(
        conversation_repo,
        message_repo,
        contact_repo,
        template_loader,
    );

    println!("Starting server at http://{}:{}", ENV.ip.as_str(), ENV.port);
    HttpServer::new(move || {
        let cors = actix_cors::Cors::default()
            .allowed_origin(ENV.frontend_url.as_str())
            .allow_any_method()
            .allow_any_header()
            .supports_credentials();

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .app_data(web::Data::new(inbox_service.clone()))
            .app_data(web::Data::new(chat_service.clone()))
            .app_data(web::Data::new(db_pool.clone()))
            .service(health_check)
            .service(
                web::scope("/api/chats")
                    .configure(modules::inbox::route::configure)
                    .configure(modules::chat::route::configure),
            )
    })
    .bind((ENV.ip.as_str(), ENV.port))?
    .workers(2)
    .run()
    .await
}
