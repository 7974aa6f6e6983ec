//! Sweeper service — background purge of expired sessions and WS tickets.
//!
//! DESIGN
//! ======
//! Validation already checks `expires_at` in SQL, so expired rows are inert;
//! the sweeper only keeps the tables from growing without bound. Failures are
//! logged and retried on the next cycle; the task never aborts the process.

use std::time::Duration;

use sqlx::PgPool;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::state::AppState;

const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 300;

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

/// Spawn the background sweeper task. Returns a handle for shutdown.
pub fn spawn_sweeper_task(state: AppState) -> JoinHandle<()> {
    let interval_secs = env_parse("SESSION_SWEEP_INTERVAL_SECS", DEFAULT_SWEEP_INTERVAL_SECS);
    info!(interval_secs, "session sweeper configured");
    tokio::spawn(async move {
        loop {
            match sweep_expired(&state.pool).await {
                Ok((sessions, tickets)) if sessions > 0 || tickets > 0 => {
                    info!(sessions, tickets, "swept expired credentials");
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(error = %e, "credential sweep failed; will retry");
                }
            }
            tokio::time::sleep(Duration::from_secs(interval_secs)).await;
        }
    })
}

/// Delete expired session and ticket rows. Returns (sessions, tickets) counts.
async fn sweep_expired(pool: &PgPool) -> Result<(u64, u64), sqlx::Error> {
    let sessions = sqlx::query("DELETE FROM sessions WHERE expires_at <= now()")
        .execute(pool)
        .await?
        .rows_affected();
    let tickets = sqlx::query("DELETE FROM ws_tickets WHERE expires_at <= now()")
        .execute(pool)
        .await?
        .rows_affected();
    Ok((sessions, tickets))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_parse_falls_back_on_missing_or_garbage() {
        assert_eq!(env_parse("FLEETDESK_TEST_UNSET_VAR", 7_u64), 7);
        // SAFETY: test-local variable name, no concurrent reader.
        unsafe { std::env::set_var("FLEETDESK_TEST_GARBAGE_VAR", "not-a-number") };
        assert_eq!(env_parse("FLEETDESK_TEST_GARBAGE_VAR", 7_u64), 7);
        unsafe { std::env::set_var("FLEETDESK_TEST_GARBAGE_VAR", "42") };
        assert_eq!(env_parse("FLEETDESK_TEST_GARBAGE_VAR", 7_u64), 42);
        unsafe { std::env::remove_var("FLEETDESK_TEST_GARBAGE_VAR") };
    }
}
