use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct TriggerQuery {
    /// Hour to evaluate instead of the current local hour.
    pub hour: Option<u32>,
}

/// Settings for the external-scheduler trigger endpoint.
#[derive(Debug, Clone)]
pub struct CronSettings {
    pub secret: Option<String>,
}

impl CronSettings {
    pub fn from_env() -> Self {
        let secret = std::env::var("ND_CRON_SECRET").ok();
        if secret.is_none() {
            log::info!("ND_CRON_SECRET not set, cron trigger endpoint is unauthenticated");
        }
        CronSettings { secret }
    }
}
