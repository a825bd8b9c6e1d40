use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

const WINDOW: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateBudgetSnapshot {
    /// Consumed request budget in current minute window.
    pub used: u32,
    /// Total budget limit in current minute window.
    pub limit: u32,
    /// Milliseconds until budget window reset.
    pub reset_in_ms: u64,
}

#[derive(Debug)]
struct Window {
    started_at: Instant,
    used: u32,
}

/// Per-minute request budget shared by every endpoint of one client.
#[derive(Debug)]
pub struct RateBudget {
    limit_per_minute: u32,
    window: Mutex<Window>,
}

impl RateBudget {
    pub fn new(limit_per_minute: u32) -> Self {
        Self {
            limit_per_minute: limit_per_minute.max(1),
            window: Mutex::new(Window {
                started_at: Instant::now(),
                used: 0,
            }),
        }
    }

    /// Reserve one unit without waiting.
    /// Returns `false` when the current minute budget is exhausted.
    pub async fn try_reserve(&self) -> bool {
        let mut window = self.window.lock().await;
        if window.started_at.elapsed() >= WINDOW {
            window.started_at = Instant::now();
            window.used = 0;
        }
        if window.used >= self.limit_per_minute {
            return false;
        }
        window.used += 1;
        true
    }

    /// Reserve one unit, sleeping until the window resets if needed.
    pub async fn acquire(&self) {
        loop {
            if self.try_reserve().await {
                return;
            }
            let wait = {
                let window = self.window.lock().await;
                WINDOW.saturating_sub(window.started_at.elapsed())
            };
            tracing::debug!(wait_ms = wait.as_millis() as u64, "Rate budget exhausted, waiting");
            tokio::time::sleep(wait.max(Duration::from_millis(1))).await;
        }
    }

    pub async fn snapshot(&self) -> RateBudgetSnapshot {
        let window = self.window.lock().await;
        RateBudgetSnapshot {
            used: window.used,
            limit: self.limit_per_minute,
            reset_in_ms: WINDOW.saturating_sub(window.started_at.elapsed()).as_millis() as u64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn budget_blocks_until_window_resets() {
        let budget = RateBudget::new(2);
        assert!(budget.try_reserve().await);
        assert!(budget.try_reserve().await);
        assert!(!budget.try_reserve().await);

        let started = Instant::now();
        budget.acquire().await;
        assert!(started.elapsed() >= Duration::from_secs(59));

        let snap = budget.snapshot().await;
        assert_eq!(snap.used, 1);
        assert_eq!(snap.limit, 2);
    }
}
