use tokio::time::Duration;

/// How often the scheduler wakes to evaluate subscriber schedules.
/// Schedules are hour-granular, so one check per hour covers every
/// hour exactly once.
pub const CHECK_INTERVAL: Duration = Duration::from_secs(60 * 60);
