//! Synthetic batches for exercising retry settings without any endpoint.

use spark_error::{CallError, ConfigError, FailureKind, SparkResult};
use spark_resilience::{BatchConfig, BatchOutcome, CallConfig, ShotBatch};
use tracing::{debug, instrument};

/// Shape of a synthetic batch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Simulation {
    /// Number of call sites
    pub shots: usize,
    /// Attempts each site fails before succeeding
    pub fail_first: u32,
    /// Failure kind of those attempts
    pub kind: FailureKind,
}

impl Simulation {
    /// Call site names, `shot-1` through `shot-N`.
    pub fn sites(&self) -> Vec<String> {
        (1..=self.shots).map(|n| format!("shot-{}", n)).collect()
    }

    /// Run every site through `batch`.
    ///
    /// A cancelled batch still returns the reports gathered so far.
    #[instrument(skip(batch))]
    pub async fn run(&self, batch: &ShotBatch<'_>) -> BatchOutcome<String> {
        let fail_first = self.fail_first;
        let kind = self.kind;

        batch
            .run(&self.sites(), |site, attempt| {
                let site = site.to_string();
                async move {
                    if attempt <= fail_first {
                        debug!(call_site = %site, attempt, %kind, "Simulating failure");
                        Err(CallError::new(
                            kind,
                            format!("simulated {} failure on {}", kind, site),
                        ))
                    } else {
                        Ok(format!("clip://{}", site))
                    }
                }
            })
            .await
    }
}

/// Multiply every wait in both configurations by `factor`.
///
/// The per-attempt timeout is left alone; it bounds the endpoint, not the
/// wrapper's own waits.
///
/// # Errors
///
/// Rejects a factor that is not finite and positive.
pub fn scale_delays(
    call: &CallConfig,
    batch: &BatchConfig,
    factor: f64,
) -> SparkResult<(CallConfig, BatchConfig)> {
    if !factor.is_finite() || factor <= 0.0 {
        return Err(ConfigError::invalid(
            "delay_scale",
            format!("must be a finite value > 0, got {}", factor),
        )
        .into());
    }

    let scaled = call
        .to_builder()
        .base_delay_seconds(call.base_delay_seconds() * factor)
        .max_delay_seconds(call.max_delay_seconds() * factor)
        .quota_wait_seconds(call.quota_wait_seconds() * factor)
        .quota_wait_cap_seconds(call.quota_wait_cap_seconds() * factor)
        .build()
        .map_err(|e| ConfigError::invalid("delay_scale", e.to_string()))?;

    let batch = BatchConfig::new(
        batch.success_wait_seconds() * factor,
        batch.quota_reset_interval_seconds() * factor,
    );
    batch.validate()?;

    Ok((scaled, batch))
}
