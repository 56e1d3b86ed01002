use serde::Deserialize;

use crate::models::user::ScheduleKind;

/// Preference update payload. Every field is optional; omitted fields
/// keep their stored value.
#[derive(Debug, Deserialize)]
pub struct PreferencesRequest {
    pub name: Option<String>,
    pub topics: Option<Vec<String>>,
    pub is_subscribed: Option<bool>,
    pub good_news_only: Option<bool>,
    pub schedule_kind: Option<ScheduleKind>,
    pub schedule_hours: Option<Vec<u32>>,
}
