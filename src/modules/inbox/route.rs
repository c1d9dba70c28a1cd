use actix_web::web::ServiceConfig;

use crate::modules::inbox::handle::*;

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(get_unread_count).service(get_inbox).service(get_message_history);
}
