use chrono::{DateTime, TimeDelta, Utc};

/// Drop every repository whose name exactly matches an exclusion, keeping order.
pub fn filter_excluded(repositories: Vec<String>, exclusions: &[String]) -> Vec<String> {
    repositories
        .into_iter()
        .filter(|repo| !exclusions.iter().any(|excluded| excluded == repo))
        .collect()
}

/// A tag is expired once its age is strictly greater than the ttl.
pub fn is_expired(created: DateTime<Utc>, now: DateTime<Utc>, ttl: TimeDelta) -> bool {
    now.signed_duration_since(created) > ttl
}

/// Human-readable age, e.g. "8 days". Negative ages (clock skew) read as zero.
pub fn format_age(age: TimeDelta) -> String {
    let age = age.max(TimeDelta::zero());
    let days = age.num_days();
    let hours = age.num_hours();
    let minutes = age.num_minutes();
    let seconds = age.num_seconds();

    if days > 0 {
        format!("{} {}", days, if days == 1 { "day" } else { "days" })
    } else if hours > 0 {
        format!("{} {}", hours, if hours == 1 { "hour" } else { "hours" })
    } else if minutes > 0 {
        format!("{} {}", minutes, if minutes == 1 { "minute" } else { "minutes" })
    } else {
        format!("{} {}", seconds, if seconds == 1 { "second" } else { "seconds" })
    }
}
