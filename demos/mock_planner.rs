//! Example: exercising the planner offline with scripted backends.
//!
//! Run with: `cargo run --example mock_planner`

use content_planner::backend::MockReply;
use content_planner::{
    BackoffConfig, ContentPlanner, Event, FallbackChain, FnEventHandler, MockBackend,
    ProviderErrorKind,
};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // The primary is rate limited; the secondary answers with a list.
    let primary = MockBackend::new(
        "openai",
        vec![MockReply::rate_limited(Duration::from_secs(60))],
    );
    let secondary = MockBackend::fixed(
        "perplexity",
        "Here you go:\n['Monday: Why compost matters', 'Tuesday: Five beginner mistakes', \
         'Wednesday: Building a raised bed', 'Thursday: A balcony garden case study', \
         'Friday: Tools under $20', 'Saturday: Seasonal planting trends', \
         'Sunday: Join a seed swap']\nThe week moves from basics to community.",
    );

    let chain = FallbackChain::builder()
        .provider(Arc::new(primary))
        .provider(Arc::new(secondary))
        .backoff(BackoffConfig::standard())
        .event_handler(Arc::new(FnEventHandler(|event: Event| {
            println!("  event: {:?}", event);
        })))
        .build()?;
    let planner = ContentPlanner::new(chain);

    let plan = planner.generate_weekly_plan("home gardening", "retirees").await;
    println!("Parse strategy: {:?}", plan.source());
    for entry in plan.ideas() {
        println!("{}: {}", entry.day, entry.idea);
    }
    println!("Summary: {}", plan.summary());

    // With every tier down, operations fall back to deterministic text.
    let offline = ContentPlanner::new(
        FallbackChain::builder()
            .provider(Arc::new(MockBackend::failing("openai", ProviderErrorKind::ServerError)))
            .build()?,
    );
    let plan = offline.generate_weekly_plan("home gardening", "retirees").await;
    println!("\nOffline plan ({:?}): {}", plan.source(), plan.summary());

    Ok(())
}
