use crate::digest::DigestConfig;
use crate::models::user::{ScheduleKind, User};

/// Outcome of checking one subscriber against the current hour. The
/// reason is for logs only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduleDecision {
    pub due: bool,
    pub reason: &'static str,
}

impl ScheduleDecision {
    fn due(reason: &'static str) -> Self {
        ScheduleDecision { due: true, reason }
    }

    fn skip(reason: &'static str) -> Self {
        ScheduleDecision { due: false, reason }
    }
}

/// Decides whether a subscriber should receive a digest at the given
/// hour of local time. Unsubscribed users are never due, whatever their
/// stored schedule says.
pub fn evaluate(user: &User, hour: u32, config: &DigestConfig) -> ScheduleDecision {
    if !user.is_subscribed {
        return ScheduleDecision::skip("not subscribed");
    }
    match user.schedule_kind {
        ScheduleKind::Periodic => {
            if config.periodic_hours.contains(&hour) {
                ScheduleDecision::due("periodic hour")
            } else {
                ScheduleDecision::skip("outside periodic hours")
            }
        }
        ScheduleKind::Custom => {
            let hours = user.custom_hours();
            if hours.is_empty() {
                ScheduleDecision::skip("no custom hours configured")
            } else if hours.contains(&hour) {
                ScheduleDecision::due("custom hour")
            } else {
                ScheduleDecision::skip("outside custom hours")
            }
        }
    }
}
