//! Online (attendance) sessions
//!
//! Table: online_sessions

use chrono::{DateTime, Utc};
use pm_core::Id;
use serde::Serialize;
use sqlx::FromRow;

/// One login-to-logout interval of a user
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OnlineSession {
    pub id: Id,
    pub user_id: Id,
    pub organization_id: Id,
    pub login_at: DateTime<Utc>,
    pub logout_at: Option<DateTime<Utc>>,
    /// Seconds between login and logout, zero while active
    pub duration: i64,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl_entity!(OnlineSession);

impl OnlineSession {
    /// Close the session at `at`, computing its duration.
    pub fn close(&mut self, at: DateTime<Utc>) {
        self.logout_at = Some(at);
        self.duration = (at - self.login_at).num_seconds().max(0);
        self.is_active = false;
    }

    /// Whole minutes since login
    pub fn minutes_since_login(&self, now: DateTime<Utc>) -> i64 {
        (now - self.login_at).num_minutes().max(0)
    }

    /// Whole minutes this session counts towards attendance totals.
    pub fn duration_minutes(&self) -> i64 {
        self.duration / 60
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_close_computes_duration() {
        let login = Utc::now() - Duration::minutes(90);
        let mut session = OnlineSession {
            id: Id::new_v4(),
            user_id: Id::new_v4(),
            organization_id: Id::new_v4(),
            login_at: login,
            logout_at: None,
            duration: 0,
            ip_address: None,
            user_agent: None,
            is_active: true,
            created_at: login,
        };

        session.close(login + Duration::minutes(90));

        assert!(!session.is_active);
        assert_eq!(session.duration, 5400);
        assert_eq!(session.duration_minutes(), 90);
        assert_eq!(session.minutes_since_login(login + Duration::minutes(15)), 15);
    }
}
