use async_trait::async_trait;
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use log::{error, info};
use std::str::FromStr;

/// Outbound mail seam. Delivery reports success or failure as a bool
/// so callers can decide what a failed send means for them; the gateway
/// itself never aborts a digest run.
#[async_trait]
pub trait EmailGateway: Send + Sync {
    async fn deliver(&self, to: &str, subject: &str, html_body: &str) -> bool;
}

#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_email: String,
    pub from_name: Option<String>,
}

impl SmtpSettings {
    pub fn from_env() -> Result<Self, String> {
        let host = std::env::var("ND_SMTP_HOST").map_err(|_| "ND_SMTP_HOST must be set")?;
        let port = match std::env::var("ND_SMTP_PORT") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| format!("ND_SMTP_PORT {:?} is not a valid port", raw))?,
            Err(_) => {
                log::info!("ND_SMTP_PORT not set, using default of 587");
                587
            }
        };
        let username =
            std::env::var("ND_SMTP_USERNAME").map_err(|_| "ND_SMTP_USERNAME must be set")?;
        let password =
            std::env::var("ND_SMTP_PASSWORD").map_err(|_| "ND_SMTP_PASSWORD must be set")?;
        let from_email =
            std::env::var("ND_FROM_EMAIL").map_err(|_| "ND_FROM_EMAIL must be set")?;
        let from_name = std::env::var("ND_FROM_NAME").ok();
        Ok(SmtpSettings {
            host,
            port,
            username,
            password,
            from_email,
            from_name,
        })
    }
}

/// SMTP-backed gateway. One relay connection pool for the whole
/// service, built once at startup.
pub struct SmtpGateway {
    transport: SmtpTransport,
    from: Mailbox,
}

impl SmtpGateway {
    pub fn new(settings: &SmtpSettings) -> Result<Self, String> {
        let credentials =
            Credentials::new(settings.username.clone(), settings.password.clone());
        let transport = SmtpTransport::relay(&settings.host)
            .map_err(|e| format!("Failed to create SMTP relay: {}", e))?
            .credentials(credentials)
            .port(settings.port)
            .build();
        let from = match settings.from_name.as_ref() {
            Some(name) => Mailbox::from_str(&format!("{} <{}>", name, settings.from_email))
                .map_err(|e| format!("Invalid from address: {}", e))?,
            None => Mailbox::from_str(&settings.from_email)
                .map_err(|e| format!("Invalid from address: {}", e))?,
        };
        Ok(SmtpGateway { transport, from })
    }

    pub fn from_env() -> Result<Self, String> {
        let settings = SmtpSettings::from_env()?;
        SmtpGateway::new(&settings)
    }
}

#[async_trait]
impl EmailGateway for SmtpGateway {
    async fn deliver(&self, to: &str, subject: &str, html_body: &str) -> bool {
        let to_mailbox = match Mailbox::from_str(to) {
            Ok(mailbox) => mailbox,
            Err(e) => {
                error!("Invalid recipient address {:?}: {}", to, e);
                return false;
            }
        };

        let email = match Message::builder()
            .from(self.from.clone())
            .to(to_mailbox)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body.to_string())
        {
            Ok(email) => email,
            Err(e) => {
                error!("Failed to build email for {}: {}", to, e);
                return false;
            }
        };

        match self.transport.send(&email) {
            Ok(_) => {
                info!("Email sent successfully to {}", to);
                true
            }
            Err(e) => {
                error!("Failed to send email to {}: {}", to, e);
                false
            }
        }
    }
}
