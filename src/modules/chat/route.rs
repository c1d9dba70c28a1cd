use actix_web::web;

use crate::modules::chat::handle;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/conversation")
            .service(handle::get_messages)
            .service(handle::mark_as_read),
    );
}
