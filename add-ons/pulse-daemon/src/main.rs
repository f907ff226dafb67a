//! StudyPulse poll daemon.
//!
//! A long-running host for the gamification engine: polls the dashboard's
//! productivity and study-plan endpoints on a fixed interval, drives the
//! energy engine and both milestone notifiers, and logs bridge traffic so
//! an attached companion (e.g. a browser extension) can be observed.

use pulse_core::{
    rank_of, DashboardClient, ProgressStore, PulseBridge, PulseConfig, AVATAR_MILESTONES_NS,
    LEARNING_MILESTONES_NS,
};
use pulse_skills::{
    compute_skill_progress, overall_completion_ratio, skill_taxonomy, EnergyEngine,
    MilestoneNotifier,
};
use std::{sync::Arc, time::Duration};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Floor for the poll cadence; the engine is designed around ~60s ticks.
const MIN_POLL_INTERVAL_SECS: u64 = 10;

#[tokio::main]
async fn main() {
    // Load .env file if present (before any env::var calls)
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("[pulse-daemon] .env not loaded: {} (using system environment)", e);
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = PulseConfig::load().expect("load PulseConfig");
    let poll_interval = config.poll_interval_secs.max(MIN_POLL_INTERVAL_SECS);

    let store_path = std::path::Path::new(&config.storage_path).join("pulse_progress");
    let store = Arc::new(ProgressStore::open_path(&store_path).expect("open pulse_progress"));
    let client = Arc::new(DashboardClient::from_config(&config));
    let bridge = PulseBridge::new();

    // Log outbound bridge traffic; a real companion would subscribe the same way.
    let mut bridge_rx = bridge.subscribe();
    tokio::spawn(async move {
        while let Ok(raw) = bridge_rx.recv().await {
            let message_type = serde_json::from_str::<serde_json::Value>(&raw)
                .ok()
                .and_then(|v| v.get("type").and_then(|t| t.as_str()).map(String::from))
                .unwrap_or_else(|| "unknown".to_string());
            tracing::info!(
                target: "pulse::bridge",
                message_type = %message_type,
                payload = %raw,
                "bridge message"
            );
        }
    });

    let engine = Arc::new(
        EnergyEngine::new(Arc::clone(&store), Arc::clone(&client), bridge.clone())
            .with_refetch_delay(Duration::from_secs(config.classification_refetch_delay_secs))
            .with_default_reward_minutes(config.reward_mode_default_minutes),
    );
    let learning_notifier = Arc::new(MilestoneNotifier::new(
        LEARNING_MILESTONES_NS,
        Arc::clone(&store),
    ));
    let avatar_notifier = Arc::new(MilestoneNotifier::new(
        AVATAR_MILESTONES_NS,
        Arc::clone(&store),
    ));

    tracing::info!(
        app_name = %config.app_name,
        poll_interval_secs = poll_interval,
        storage_path = %store_path.display(),
        "StudyPulse daemon started"
    );

    // Immediate first tick on mount, then the fixed-interval poll.
    engine.tick().await;

    let mut interval = tokio::time::interval(Duration::from_secs(poll_interval));
    interval.tick().await; // first tick fires immediately; already handled above

    loop {
        tokio::select! {
            _ = interval.tick() => {
                engine.tick().await;
                evaluate_milestones(&client, &learning_notifier, &avatar_notifier).await;

                let snapshot = engine.snapshot();
                let rank = rank_of(i64::from(snapshot.current_xp));
                tracing::debug!(
                    target: "pulse::energy",
                    xp = snapshot.current_xp,
                    rank = rank.title,
                    week_avg = engine.week_avg(),
                    "tick complete"
                );
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("CTRL-C received; shutting down daemon");
                break;
            }
        }
    }
}

/// Pulls study plans + per-plan chapter progress and feeds both notifiers.
/// Fetch failures are logged and skipped; notifiers only see fresh data.
async fn evaluate_milestones(
    client: &Arc<DashboardClient>,
    learning: &Arc<MilestoneNotifier>,
    avatar: &Arc<MilestoneNotifier>,
) {
    let plans = match client.fetch_study_plans().await {
        Ok(plans) => plans,
        Err(e) => {
            tracing::warn!(target: "pulse::milestones", error = %e, "study plan fetch failed");
            return;
        }
    };

    let mut chapter_progress = Vec::with_capacity(plans.len());
    for plan in &plans {
        match client.fetch_chapter_progress(plan.id).await {
            Ok(progress) => chapter_progress.push(progress),
            Err(e) => tracing::warn!(
                target: "pulse::milestones",
                plan_id = plan.id,
                error = %e,
                "chapter progress fetch failed"
            ),
        }
    }
    learning.evaluate(overall_completion_ratio(&chapter_progress));

    // Avatar stage follows the average skill completion over the taxonomy.
    let skill_progress = compute_skill_progress(&plans, skill_taxonomy());
    if !skill_progress.is_empty() {
        let avg: f64 = skill_progress
            .values()
            .map(|p| f64::from(p.completion_pct))
            .sum::<f64>()
            / skill_progress.len() as f64;
        avatar.evaluate(avg);
    }
}
