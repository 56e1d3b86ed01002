pub mod handlers;

use actix_web::{web, Scope};

pub fn routes() -> Scope {
    web::scope("/news")
        .service(handlers::preview)
        .service(handlers::suggestions)
}
