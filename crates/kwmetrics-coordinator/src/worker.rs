//! The long-lived async worker spawned on async submission, per spec §4.6.
//! Services `JobQueue` using the same fan-out as `BatchCoordinator`.

use crate::fan_out::fan_out_chunk;
use kwmetrics_ads::AdsAdapter;
use kwmetrics_cache::Cache;
use kwmetrics_queue::JobQueue;
use kwmetrics_trends::TrendsAdapter;
use std::sync::Arc;

/// Loops until the queue drains: pulls a batch, fans it out, and records
/// each keyword completed or failed. Not cancellable by callers.
pub async fn run_worker(
    queue: Arc<JobQueue>,
    cache: Arc<Cache>,
    ads: Arc<AdsAdapter>,
    trends: Arc<TrendsAdapter>,
) {
    loop {
        let batch = queue.get_next_batch().await;
        if batch.is_empty() {
            break;
        }

        tracing::info!(batch_size = batch.len(), "background worker processing batch");
        let merged = fan_out_chunk(ads.clone(), trends.clone(), batch.clone()).await;

        for keyword in &batch {
            match merged.get(keyword) {
                Some(record) if record.has_any_data() => {
                    cache.set(keyword, *record);
                    queue
                        .mark_completed(keyword.clone(), record.ads_monthly_volume, record.trends_score)
                        .await;
                }
                _ => {
                    queue.mark_failed(keyword.clone()).await;
                }
            }
        }
    }
}
