//! Periodic job runner.
//!
//! Jobs are an explicit registry of `(schedule, job-function)` pairs driven
//! by a single tick loop. Each dispatch runs on its own task behind an
//! error boundary, so one failing job can never abort the loop or the other
//! jobs. If a job's previous run is still executing when it comes due
//! again, that tick is skipped (skip-if-running) with a warning.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local, Utc};
use tracing::{error, info, warn};

use crate::state::AppState;

pub mod dau;
pub mod rankings;
pub mod trending;

fn scheduler_tick_seconds() -> u64 {
    std::env::var("REELYTICS_SCHEDULER_TICK_SECONDS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map(|v| v.clamp(10, 3600))
        .unwrap_or(60)
}

type JobFuture = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send>>;
type JobFn = Arc<dyn Fn(Arc<AppState>) -> JobFuture + Send + Sync>;

#[derive(Debug, Clone, Copy)]
pub enum JobSchedule {
    Every(Duration),
    /// Midnight on the process-local clock.
    DailyAtMidnight,
}

pub struct ScheduledJob {
    pub name: &'static str,
    pub schedule: JobSchedule,
    next_run: DateTime<Utc>,
    running: Arc<AtomicBool>,
    run: JobFn,
}

fn next_local_midnight() -> DateTime<Utc> {
    let now = Local::now();
    let tomorrow = now.date_naive() + chrono::Duration::days(1);
    tomorrow
        .and_hms_opt(0, 0, 0)
        .and_then(|naive| naive.and_local_timezone(Local).earliest())
        .map(|local| local.with_timezone(&Utc))
        .unwrap_or_else(|| Utc::now() + chrono::Duration::days(1))
}

impl ScheduledJob {
    pub fn every<F>(name: &'static str, interval: Duration, run: F) -> Self
    where
        F: Fn(Arc<AppState>) -> JobFuture + Send + Sync + 'static,
    {
        Self {
            name,
            schedule: JobSchedule::Every(interval),
            next_run: Utc::now()
                + chrono::Duration::from_std(interval).unwrap_or_else(|_| chrono::Duration::zero()),
            running: Arc::new(AtomicBool::new(false)),
            run: Arc::new(run),
        }
    }

    pub fn daily_at_midnight<F>(name: &'static str, run: F) -> Self
    where
        F: Fn(Arc<AppState>) -> JobFuture + Send + Sync + 'static,
    {
        Self {
            name,
            schedule: JobSchedule::DailyAtMidnight,
            next_run: next_local_midnight(),
            running: Arc::new(AtomicBool::new(false)),
            run: Arc::new(run),
        }
    }

    fn advance(&mut self, now: DateTime<Utc>) {
        self.next_run = match self.schedule {
            JobSchedule::Every(interval) => {
                now + chrono::Duration::from_std(interval).unwrap_or_else(|_| chrono::Duration::zero())
            }
            JobSchedule::DailyAtMidnight => next_local_midnight(),
        };
    }

    /// Dispatch one run on its own task, unless the previous run is still
    /// going. The error boundary lives inside the spawned task.
    fn dispatch(&self, state: Arc<AppState>) {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!(job = self.name, "previous run still executing, skipping tick");
            return;
        }
        let name = self.name;
        let running = Arc::clone(&self.running);
        let run = Arc::clone(&self.run);
        tokio::spawn(async move {
            if let Err(err) = run(state).await {
                error!(job = name, error = %err, "scheduled job failed");
            }
            running.store(false, Ordering::SeqCst);
        });
    }
}

/// The three background jobs of the analytics subsystem.
pub fn registry() -> Vec<ScheduledJob> {
    vec![
        ScheduledJob::every("video_scoring", Duration::from_secs(3600), |state| {
            Box::pin(rankings::run(state))
        }),
        ScheduledJob::every("trending_detection", Duration::from_secs(600), |state| {
            Box::pin(trending::run(state))
        }),
        ScheduledJob::daily_at_midnight("daily_active_users", |state| {
            Box::pin(dau::run(state))
        }),
    ]
}

pub async fn run_scheduler_loop(state: Arc<AppState>) {
    let tick = scheduler_tick_seconds();
    let mut jobs = registry();
    info!(
        tick_seconds = tick,
        jobs = jobs.len(),
        "Analytics scheduler started"
    );
    let mut interval = tokio::time::interval(Duration::from_secs(tick));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        interval.tick().await;
        let now = Utc::now();
        for job in jobs.iter_mut() {
            if now >= job.next_run {
                job.dispatch(Arc::clone(&state));
                job.advance(now);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use chrono::Timelike;
    use tokio::sync::Notify;

    use reelytics_core::config::Config;
    use reelytics_core::video::{ModerationStatus, Video, VideoVisibility};
    use reelytics_duckdb::DuckDbBackend;

    use super::*;

    fn test_config() -> Config {
        Config {
            port: 0,
            data_dir: "/tmp/reelytics-test".to_string(),
            duckdb_memory_limit: "1GB".to_string(),
            cors_origins: vec![],
            max_batch_size: 50,
        }
    }

    fn test_state() -> Arc<AppState> {
        let db = DuckDbBackend::open_in_memory().expect("in-memory DuckDB");
        Arc::new(AppState::new(db, test_config()))
    }

    async fn wait_until(mut done: impl FnMut() -> bool) {
        for _ in 0..200 {
            if done() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("condition not reached in time");
    }

    #[tokio::test]
    async fn dispatch_skips_while_previous_run_is_still_executing() {
        let state = test_state();
        let starts = Arc::new(AtomicUsize::new(0));
        let release = Arc::new(Notify::new());

        let job = {
            let starts = Arc::clone(&starts);
            let release = Arc::clone(&release);
            ScheduledJob::every(
                "slow_job",
                Duration::from_secs(3600),
                move |_state| -> JobFuture {
                    let starts = Arc::clone(&starts);
                    let release = Arc::clone(&release);
                    Box::pin(async move {
                        starts.fetch_add(1, Ordering::SeqCst);
                        release.notified().await;
                        Ok(())
                    })
                },
            )
        };

        job.dispatch(Arc::clone(&state));
        wait_until(|| starts.load(Ordering::SeqCst) == 1).await;

        // Second dispatch lands while the first run is blocked: skipped.
        job.dispatch(Arc::clone(&state));
        tokio::time::sleep(Duration::from_millis(25)).await;
        assert_eq!(starts.load(Ordering::SeqCst), 1);

        release.notify_one();
        wait_until(|| !job.running.load(Ordering::SeqCst)).await;

        // With the previous run finished the job is dispatchable again.
        job.dispatch(Arc::clone(&state));
        wait_until(|| starts.load(Ordering::SeqCst) == 2).await;
        release.notify_one();
    }

    #[tokio::test]
    async fn failing_job_clears_the_running_flag() {
        let state = test_state();
        let job = ScheduledJob::every(
            "failing_job",
            Duration::from_secs(3600),
            |_state| -> JobFuture { Box::pin(async { anyhow::bail!("storage offline") }) },
        );

        job.dispatch(Arc::clone(&state));
        wait_until(|| !job.running.load(Ordering::SeqCst)).await;

        // The error boundary must not wedge the job: it can run again.
        job.dispatch(state);
        wait_until(|| !job.running.load(Ordering::SeqCst)).await;
    }

    #[tokio::test]
    async fn scoring_job_runs_over_ready_videos() {
        let state = test_state();
        let video = Video {
            id: "vid_ready".to_string(),
            user_id: "creator_1".to_string(),
            title: Some("clip".to_string()),
            description: None,
            status: "ready".to_string(),
            visibility: VideoVisibility::Public,
            moderation_status: ModerationStatus::Approved,
            duration_seconds: 30.0,
            view_count: 0,
            like_count: 0,
            created_at: Utc::now(),
        };
        state.db.insert_video(&video).await.expect("seed video");

        rankings::run(state).await.expect("scoring pass");
    }

    #[test]
    fn next_midnight_is_the_coming_local_midnight() {
        let next = next_local_midnight();
        let local = next.with_timezone(&Local);
        assert_eq!(local.hour(), 0);
        assert_eq!(local.minute(), 0);
        assert_eq!(local.second(), 0);
        assert!(next > Utc::now());
        assert!(next <= Utc::now() + chrono::Duration::days(1));
    }

    #[test]
    fn registry_contains_the_three_background_jobs() {
        let jobs = registry();
        let names: Vec<&str> = jobs.iter().map(|j| j.name).collect();
        assert_eq!(
            names,
            vec!["video_scoring", "trending_detection", "daily_active_users"]
        );
    }
}
