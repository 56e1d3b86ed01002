use super::types::{LoginRequest, RegisterRequest};
use crate::errors::{AppError, AppResult};
use crate::models::user::{NewUser, User, UserQuery};
use crate::security::validation;
use crate::session::session_manager;
use actix_web::{post, web, HttpRequest, HttpResponse};
use serde_json::json;

use crate::RqDbPool;

#[post("/register")]
pub async fn register(
    pool: RqDbPool,
    register_req: web::Json<RegisterRequest>,
) -> AppResult<HttpResponse> {
    if let Err(e) = validation::validate_email(&register_req.email) {
        return Err(AppError::invalid_input("email", &e));
    }
    if let Some(name) = &register_req.name {
        if let Err(e) = validation::validate_display_name(name) {
            return Err(AppError::invalid_input("name", &e));
        }
    }
    if register_req.password.is_empty() || register_req.password.len() > 128 {
        return Err(AppError::invalid_input(
            "password",
            "Password must be between 1 and 128 characters",
        ));
    }

    let mut conn = pool.get().map_err(|_| AppError::ConnectionPoolError)?;

    let new_user = NewUser {
        email: register_req.email.clone(),
        name: register_req.name.clone(),
        password: register_req.password.clone(),
    };
    let user = User::create(&mut conn, &new_user)?;
    log::info!("Registered new user {} ({})", user.id, user.email);

    Ok(HttpResponse::Created().json(json!({ "message": "User registered" })))
}

#[post("/login")]
pub async fn login(pool: RqDbPool, login_req: web::Json<LoginRequest>) -> AppResult<HttpResponse> {
    // Input validation
    if let Err(e) = validation::validate_email(&login_req.email) {
        tracing::warn!(
            email = %login_req.email,
            error = %e,
            "Login attempt with invalid email format"
        );
        return Err(AppError::InvalidCredentials);
    }

    if login_req.password.is_empty() || login_req.password.len() > 128 {
        tracing::warn!(
            email = %login_req.email,
            password_length = login_req.password.len(),
            "Login attempt with invalid password length"
        );
        return Err(AppError::InvalidCredentials);
    }

    let mut conn = pool.get().map_err(|_| AppError::ConnectionPoolError)?;

    let user = match User::get(&mut conn, UserQuery::Email(&login_req.email)) {
        Some(user) => user,
        None => {
            tracing::warn!(
                email = %login_req.email,
                "Login attempt for non-existent user"
            );
            return Err(AppError::InvalidCredentials);
        }
    };

    let is_password_correct = match User::check_password(&user, &login_req.password) {
        Ok(is_correct) => is_correct,
        Err(_) => return Err(AppError::InvalidCredentials),
    };

    if !is_password_correct {
        return Err(AppError::InvalidCredentials);
    }

    // Create session and return response with session cookie
    match session_manager::create_session(&mut conn, &user) {
        Ok(response) => {
            tracing::info!(
                user_id = user.id,
                email = %user.email,
                "User login successful"
            );
            Ok(response)
        }
        Err(_) => Err(AppError::InternalError),
    }
}

#[post("/logout")]
pub async fn logout(pool: RqDbPool, req: HttpRequest) -> AppResult<HttpResponse> {
    let mut conn = pool.get().map_err(|_| AppError::ConnectionPoolError)?;

    // Extract session ID from cookie
    let session_id = match req.cookie("session_id") {
        Some(cookie) => cookie.value().to_string(),
        None => {
            tracing::warn!("Logout called without session cookie");
            return Err(AppError::SessionExpired);
        }
    };

    // Clear session and return response with cleared cookie
    match session_manager::clear_session(&mut conn, &session_id) {
        Ok(response) => Ok(response),
        Err(_) => Err(AppError::InternalError),
    }
}
