//! Tests for sequential shot batches.

use spark_error::{CallError, FailureKind};
use spark_resilience::{
    BatchConfig, CANCEL_SKIP_MESSAGE, CallConfig, QUOTA_SKIP_MESSAGE, ResilientCaller, ShotBatch,
    ShotStatus,
};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

fn caller(max_retries: u32) -> ResilientCaller {
    ResilientCaller::new(
        CallConfig::builder()
            .max_retries(max_retries)
            .base_delay_seconds(10.0)
            .max_delay_seconds(10.0)
            .quota_wait_seconds(60.0)
            .consecutive_failure_threshold(2)
            .attempt_timeout_seconds(0.0)
            .build()
            .unwrap(),
    )
}

#[tokio::test(start_paused = true)]
async fn test_all_shots_complete_with_pauses_between() {
    let caller = caller(3);
    let batch = ShotBatch::new(&caller, BatchConfig::new(5.0, 3600.0));
    let start = Instant::now();

    let outcome = batch
        .run(&["shot-1", "shot-2", "shot-3"], |site, _attempt| {
            let clip = format!("clip for {}", site);
            async move { Ok::<_, CallError>(clip) }
        })
        .await;

    let summary = outcome.summary();
    assert_eq!(*summary.total(), 3);
    assert_eq!(*summary.completed(), 3);
    assert_eq!(*summary.total_retries(), 0);
    assert_eq!(*summary.success_rate(), 1.0);
    // Pause after shots 1 and 2, not after the last one
    assert_eq!(start.elapsed(), Duration::from_secs(10));

    let responses: Vec<_> = outcome
        .into_reports()
        .into_iter()
        .filter_map(|r| r.into_response())
        .collect();
    assert_eq!(responses[1], "clip for shot-2");
}

#[tokio::test(start_paused = true)]
async fn test_failed_shot_does_not_stop_batch() {
    let caller = caller(1);
    let batch = ShotBatch::new(&caller, BatchConfig::new(0.0, 3600.0));

    let outcome = batch
        .run(&["a", "b", "c"], |site, attempt| {
            let site = site.to_string();
            async move {
                match (site.as_str(), attempt) {
                    ("a", 1) => Err(CallError::from_status(500, "boom")),
                    ("b", _) => Err(CallError::from_status(400, "bad prompt")),
                    _ => Ok(site),
                }
            }
        })
        .await;

    let reports = outcome.reports();
    assert_eq!(*reports[0].status(), ShotStatus::Completed);
    assert_eq!(reports[0].retries(), 1);
    assert_eq!(*reports[1].status(), ShotStatus::Failed);
    assert_eq!(*reports[1].failure_kind(), Some(FailureKind::InvalidRequest));
    assert_eq!(*reports[2].status(), ShotStatus::Completed);

    let summary = outcome.summary();
    assert_eq!(*summary.completed(), 2);
    assert_eq!(*summary.failed(), 1);
    assert_eq!(*summary.quota_issues(), 0);
    assert_eq!(*summary.total_retries(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_quota_exhaustion_skips_remaining_shots() {
    let caller = caller(5);
    let batch = ShotBatch::new(&caller, BatchConfig::new(0.0, 3600.0));
    let invoked = Mutex::new(Vec::new());

    let outcome = batch
        .run(&["shot-1", "shot-2", "shot-3", "shot-4"], |site, _attempt| {
            invoked.lock().unwrap().push(site.to_string());
            let site = site.to_string();
            async move {
                if site == "shot-2" {
                    Err(CallError::from_status(429, "RESOURCE_EXHAUSTED"))
                } else {
                    Ok(site)
                }
            }
        })
        .await;

    let statuses: Vec<_> = outcome.reports().iter().map(|r| *r.status()).collect();
    assert_eq!(
        statuses,
        vec![
            ShotStatus::Completed,
            ShotStatus::Failed,
            ShotStatus::Skipped,
            ShotStatus::Skipped,
        ]
    );
    assert_eq!(
        outcome.reports()[3].message().as_deref(),
        Some(QUOTA_SKIP_MESSAGE)
    );
    assert_eq!(
        *invoked.lock().unwrap(),
        vec!["shot-1", "shot-2", "shot-2"]
    );

    let summary = outcome.summary();
    assert_eq!(*summary.quota_issues(), 1);
    assert_eq!(*summary.skipped(), 2);
    assert_eq!(*summary.success_rate(), 0.25);
}

#[tokio::test(start_paused = true)]
async fn test_consecutive_quota_failed_shots_close_gate() {
    // Too few attempts per shot for any single shot to reach the threshold
    let caller = ResilientCaller::new(
        CallConfig::builder()
            .max_retries(1)
            .quota_wait_seconds(60.0)
            .consecutive_failure_threshold(3)
            .attempt_timeout_seconds(0.0)
            .build()
            .unwrap(),
    );
    let batch = ShotBatch::new(&caller, BatchConfig::new(0.0, 3600.0));
    let calls = AtomicU32::new(0);

    let outcome = batch
        .run(
            &["shot-1", "shot-2", "shot-3", "shot-4", "shot-5"],
            |_site, _attempt| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err::<String, _>(CallError::from_status(429, "Too Many Requests")) }
            },
        )
        .await;

    let statuses: Vec<_> = outcome.reports().iter().map(|r| *r.status()).collect();
    assert_eq!(
        statuses,
        vec![
            ShotStatus::Failed,
            ShotStatus::Failed,
            ShotStatus::Failed,
            ShotStatus::Skipped,
            ShotStatus::Skipped,
        ]
    );
    assert_eq!(*outcome.reports()[0].attempts(), 2);
    assert_eq!(
        outcome.reports()[4].message().as_deref(),
        Some(QUOTA_SKIP_MESSAGE)
    );
    assert_eq!(calls.load(Ordering::SeqCst), 6);
    assert_eq!(*outcome.summary().quota_issues(), 3);
    assert!(!outcome.cancelled());
}

#[tokio::test(start_paused = true)]
async fn test_success_or_other_failure_resets_quota_shot_run() {
    let caller = ResilientCaller::new(
        CallConfig::builder()
            .max_retries(0)
            .consecutive_failure_threshold(2)
            .attempt_timeout_seconds(0.0)
            .build()
            .unwrap(),
    );
    let batch = ShotBatch::new(&caller, BatchConfig::new(0.0, 3600.0));

    let outcome = batch
        .run(&["q1", "ok", "q2", "bad", "q3", "q4", "after"], |site, _attempt| {
            let site = site.to_string();
            async move {
                match site.as_str() {
                    "ok" => Ok(site),
                    "bad" => Err(CallError::from_status(400, "bad prompt")),
                    _ => Err(CallError::from_status(429, "quota")),
                }
            }
        })
        .await;

    let statuses: Vec<_> = outcome.reports().iter().map(|r| *r.status()).collect();
    assert_eq!(
        statuses,
        vec![
            ShotStatus::Failed,
            ShotStatus::Completed,
            ShotStatus::Failed,
            ShotStatus::Failed,
            ShotStatus::Failed,
            ShotStatus::Failed,
            ShotStatus::Skipped,
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_quota_gate_persists_across_runs_until_reset() {
    let caller = caller(5);
    let batch = ShotBatch::new(&caller, BatchConfig::new(0.0, 30.0));
    let succeed = |site: &str, _attempt: u32| {
        let site = site.to_string();
        async move { Ok::<_, CallError>(site) }
    };

    let outcome = batch
        .run(&["shot-1", "shot-2"], |site, _attempt| {
            let site = site.to_string();
            async move {
                if site == "shot-1" {
                    Err(CallError::from_status(429, "quota"))
                } else {
                    Ok(site)
                }
            }
        })
        .await;
    assert_eq!(*outcome.reports()[1].status(), ShotStatus::Skipped);

    // A later run of the same batch still sees the closed gate
    let outcome = batch.run(&["shot-2"], succeed).await;
    assert_eq!(*outcome.reports()[0].status(), ShotStatus::Skipped);

    tokio::time::advance(Duration::from_secs(30)).await;

    let outcome = batch.run(&["shot-2"], succeed).await;
    assert_eq!(*outcome.reports()[0].status(), ShotStatus::Completed);
}

#[tokio::test(start_paused = true)]
async fn test_mocked_shots_skip_success_pause() {
    let caller = ResilientCaller::new(CallConfig::default().with_mock_mode(true));
    let batch = ShotBatch::new(&caller, BatchConfig::default());
    let start = Instant::now();

    let outcome = batch
        .run(&["shot-1", "shot-2", "shot-3"], |_site, _attempt| async {
            Err::<Vec<u8>, _>(CallError::from_status(401, "no credentials"))
        })
        .await;

    assert_eq!(*outcome.summary().completed(), 3);
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_stops_batch() {
    let caller = caller(3);
    let cancel = CancellationToken::new();
    let batch = ShotBatch::new(&caller, BatchConfig::new(5.0, 3600.0))
        .with_cancellation(cancel.clone());
    let calls = AtomicU32::new(0);

    let outcome = batch
        .run(&["shot-1", "shot-2", "shot-3"], |site, _attempt| {
            calls.fetch_add(1, Ordering::SeqCst);
            let site = site.to_string();
            let cancel = cancel.clone();
            async move {
                if site == "shot-2" {
                    cancel.cancel();
                    Err(CallError::from_status(503, "unavailable"))
                } else {
                    Ok(format!("clip for {}", site))
                }
            }
        })
        .await;

    assert!(*outcome.cancelled());
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    let reports = outcome.reports();
    assert_eq!(*reports[0].status(), ShotStatus::Completed);
    // Interrupted during its backoff wait
    assert_eq!(*reports[1].status(), ShotStatus::Skipped);
    assert_eq!(*reports[1].attempts(), 1);
    assert_eq!(reports[1].message().as_deref(), Some(CANCEL_SKIP_MESSAGE));
    assert_eq!(*reports[2].status(), ShotStatus::Skipped);
    assert_eq!(*reports[2].attempts(), 0);

    let summary = outcome.summary();
    assert_eq!(*summary.completed(), 1);
    assert_eq!(*summary.skipped(), 2);
    assert_eq!(*summary.failed(), 0);

    let clip = outcome.into_reports().swap_remove(0).into_response();
    assert_eq!(clip.as_deref(), Some("clip for shot-1"));
}

#[tokio::test(start_paused = true)]
async fn test_cancel_during_success_pause_keeps_completed_shots() {
    let caller = caller(3);
    let cancel = CancellationToken::new();
    let batch = ShotBatch::new(&caller, BatchConfig::new(5.0, 3600.0))
        .with_cancellation(cancel.clone());
    let calls = AtomicU32::new(0);
    let start = Instant::now();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(7)).await;
        trigger.cancel();
    });

    let outcome = batch
        .run(&["shot-1", "shot-2", "shot-3"], |site, _attempt| {
            calls.fetch_add(1, Ordering::SeqCst);
            let clip = format!("clip for {}", site);
            async move { Ok::<_, CallError>(clip) }
        })
        .await;

    assert!(*outcome.cancelled());
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(start.elapsed(), Duration::from_secs(7));

    let statuses: Vec<_> = outcome.reports().iter().map(|r| *r.status()).collect();
    assert_eq!(
        statuses,
        vec![
            ShotStatus::Completed,
            ShotStatus::Completed,
            ShotStatus::Skipped,
        ]
    );
    assert_eq!(*outcome.reports()[2].attempts(), 0);

    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json["cancelled"], true);
    assert_eq!(json["summary"]["completed"], 2);
    assert_eq!(json["reports"][2]["message"], CANCEL_SKIP_MESSAGE);
}

#[tokio::test]
async fn test_empty_batch() {
    let caller = caller(3);
    let batch = ShotBatch::new(&caller, BatchConfig::default());

    let outcome = batch
        .run(&[] as &[&str], |_site, _attempt| async {
            Ok::<_, CallError>(())
        })
        .await;

    assert_eq!(*outcome.summary().total(), 0);
    assert_eq!(*outcome.summary().success_rate(), 0.0);
}

#[test]
fn test_summary_serializes_to_json() {
    let summary = spark_resilience::BatchSummary::from_reports::<()>(&[]);
    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["total"], 0);
    assert_eq!(json["success_rate"], 0.0);
}
