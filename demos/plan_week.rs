//! Example: generate a live weekly plan.
//!
//! Run with: `cargo run --example plan_week -- "home gardening" retirees`
//!
//! Reads `OPENAI_API_KEY` and `PERPLEXITY_API_KEY`. Set
//! `CONTENT_PLANNER_CONFIG` to a TOML file to override the provider tiers,
//! and `RUST_LOG=content_planner=debug` to watch the fallback decisions.

use anyhow::Context;
use content_planner::{ContentPlanner, PlannerConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let topic = args.next().unwrap_or_else(|| "artificial intelligence".to_string());
    let audience = args.next().unwrap_or_else(|| "marketers".to_string());

    let config = match std::env::var("CONTENT_PLANNER_CONFIG") {
        Ok(path) => {
            let source = std::fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path))?;
            PlannerConfig::from_toml_str(&source)?
        }
        Err(_) => PlannerConfig::from_env(),
    };
    let planner = ContentPlanner::from_config(&config)?;

    let health = planner.check_provider_health().await;
    for status in &health.providers {
        println!(
            "{:<12} key={} available={} {}",
            status.provider,
            status.credential_present,
            status.available,
            status.error.as_deref().unwrap_or("")
        );
    }

    let plan = planner.generate_weekly_plan(&topic, &audience).await;
    println!("\nPlan for {} ({:?}):", topic, plan.source());
    for entry in plan.ideas() {
        println!("  {:<10} {}", entry.day, entry.idea);
    }
    println!("\n{}", plan.summary());

    if let Some(first) = plan.ideas().first() {
        let day = first.day.to_string();
        let why = planner.analyze_idea(&topic, &audience, &first.idea, &day).await;
        println!("\nWhy {}: {}", day, why);

        let alternate = planner
            .generate_alternate_idea(&topic, &audience, &day, &first.idea)
            .await;
        println!("Alternative for {}: {}", day, alternate);
    }

    Ok(())
}
