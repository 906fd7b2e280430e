//! The concurrent Ads+Trends fan-out shared by `BatchCoordinator` (spec
//! §4.5 step 5) and the async worker (spec §4.6).

use kwmetrics_core::{round_trends_score, Keyword, MetricRecord};
use kwmetrics_ads::AdsAdapter;
use kwmetrics_trends::TrendsAdapter;
use std::collections::HashMap;
use std::sync::Arc;

/// Runs both adapters concurrently over `chunk` and merges into one
/// `MetricRecord` per keyword. A panic or failure in either adapter is
/// treated as "all absent for that adapter" and logged — per-upstream
/// failures never fail the other upstream.
pub async fn fan_out_chunk(
    ads: Arc<AdsAdapter>,
    trends: Arc<TrendsAdapter>,
    chunk: Vec<Keyword>,
) -> HashMap<Keyword, MetricRecord> {
    let ads_chunk = chunk.clone();
    let ads_task = tokio::task::spawn_blocking(move || ads.get_bulk_metrics(&ads_chunk));
    let trends_task = {
        let chunk = chunk.clone();
        async move { trends.get_bulk_trends(&chunk).await }
    };

    let (ads_result, trends_result) = tokio::join!(ads_task, trends_task);

    let ads_results = ads_result.unwrap_or_else(|e| {
        tracing::error!(error = %e, "ads adapter task panicked, treating chunk as all-absent");
        chunk.iter().cloned().map(|k| (k, None)).collect()
    });
    let trends_results = trends_result;

    chunk
        .into_iter()
        .map(|keyword| {
            let ads_volume = ads_results.get(&keyword).copied().flatten();
            let trends_score = trends_results
                .get(&keyword)
                .copied()
                .flatten()
                .map(round_trends_score);
            (keyword, MetricRecord::new(ads_volume, trends_score))
        })
        .collect()
}
