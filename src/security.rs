use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error,
};
use futures_util::future::LocalBoxFuture;
use std::{
    future::{ready, Ready},
    rc::Rc,
};

/// Security headers middleware
pub struct SecurityHeaders;

impl<S, B> Transform<S, ServiceRequest> for SecurityHeaders
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = SecurityHeadersMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SecurityHeadersMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct SecurityHeadersMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for SecurityHeadersMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();

        Box::pin(async move {
            let mut res = srv.call(req).await?;

            let headers = res.headers_mut();

            // Prevent clickjacking
            headers.insert(
                actix_web::http::header::HeaderName::from_static("x-frame-options"),
                actix_web::http::header::HeaderValue::from_static("DENY"),
            );

            // Prevent MIME type sniffing
            headers.insert(
                actix_web::http::header::HeaderName::from_static("x-content-type-options"),
                actix_web::http::header::HeaderValue::from_static("nosniff"),
            );

            // Referrer policy
            headers.insert(
                actix_web::http::header::HeaderName::from_static("referrer-policy"),
                actix_web::http::header::HeaderValue::from_static("strict-origin-when-cross-origin"),
            );

            // JSON API only - nothing should ever be embedded or executed
            headers.insert(
                actix_web::http::header::HeaderName::from_static("content-security-policy"),
                actix_web::http::header::HeaderValue::from_static(
                    "default-src 'none'; frame-ancestors 'none'",
                ),
            );

            // Only add HSTS in production (when using HTTPS)
            if cfg!(not(debug_assertions)) {
                headers.insert(
                    actix_web::http::header::HeaderName::from_static("strict-transport-security"),
                    actix_web::http::header::HeaderValue::from_static(
                        "max-age=31536000; includeSubDomains",
                    ),
                );
            }

            Ok(res)
        })
    }
}

/// Input validation utilities
pub mod validation {
    use regex::Regex;
    use std::sync::OnceLock;

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    static TOPIC_REGEX: OnceLock<Regex> = OnceLock::new();

    /// Validate email format
    pub fn validate_email(email: &str) -> Result<(), String> {
        if email.is_empty() {
            return Err("Email cannot be empty".to_string());
        }

        if email.len() > 254 {
            return Err("Email too long (max 254 characters)".to_string());
        }

        let email_regex = EMAIL_REGEX
            .get_or_init(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap());

        if !email_regex.is_match(email) {
            return Err("Invalid email format".to_string());
        }

        Ok(())
    }

    /// Validate a digest topic. Topics end up in outbound search queries and
    /// in email HTML, so keep them to plain words.
    pub fn validate_topic(topic: &str) -> Result<(), String> {
        if topic.is_empty() {
            return Err("Topic cannot be empty".to_string());
        }

        if topic.len() > 80 {
            return Err("Topic too long (max 80 characters)".to_string());
        }

        let topic_regex =
            TOPIC_REGEX.get_or_init(|| Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9 '&+.-]*$").unwrap());

        if !topic_regex.is_match(topic) {
            return Err("Topic contains invalid characters".to_string());
        }

        Ok(())
    }

    /// Validate display name
    pub fn validate_display_name(name: &str) -> Result<(), String> {
        if name.len() > 100 {
            return Err("Name too long (max 100 characters)".to_string());
        }

        // Allow most characters but prevent XSS
        if name.contains('<') || name.contains('>') || name.contains('"') || name.contains('\'') {
            return Err("Name contains invalid characters".to_string());
        }

        Ok(())
    }

    /// Validate a schedule or trigger hour
    pub fn validate_hour(hour: u32) -> Result<(), String> {
        if hour > 23 {
            return Err("Hour must be between 0 and 23".to_string());
        }
        Ok(())
    }
}

/// Rate limiting configuration for different endpoints
pub use actix_governor::{GovernorConfig, GovernorConfigBuilder};

pub fn create_rate_limiter() -> GovernorConfig<
    actix_governor::PeerIpKeyExtractor,
    actix_governor::governor::middleware::StateInformationMiddleware,
> {
    // General rate limiting for API endpoints
    GovernorConfigBuilder::default()
        .per_second(10) // Allow 10 requests per second
        .burst_size(20) // Allow bursts of 20 requests
        .use_headers() // Send rate limit info in headers
        .finish()
        .unwrap()
}

pub fn create_auth_rate_limiter() -> GovernorConfig<
    actix_governor::PeerIpKeyExtractor,
    actix_governor::governor::middleware::StateInformationMiddleware,
> {
    // Very restrictive - covers login attempts and manual digest sends
    GovernorConfigBuilder::default()
        .per_second(1) // Only 1 attempt per second
        .burst_size(3) // Small burst allowance
        .use_headers()
        .finish()
        .unwrap()
}
