pub mod handlers;
pub mod types;

use actix_web::{web, Scope};

pub fn routes() -> Scope {
    web::scope("/users")
        .service(handlers::get_me)
        .service(handlers::update_preferences)
}
