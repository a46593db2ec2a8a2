//! Analyze one uploaded clip from the command line.
//!
//! Usage: filmroom-analyze <file-name> [rubric.txt] [roster.json]
//!
//! Prints the report, updated roster and model as JSON on stdout.

use std::path::Path;

use anyhow::Context;
use filmroom_analysis::{default_rubric, init_tracing, AnalysisLogger, ClipAnalyzer};
use filmroom_gemini::GeminiClient;
use filmroom_models::Roster;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install rustls crypto provider"))?;

    dotenvy::dotenv().ok();
    init_tracing()?;

    let mut args = std::env::args().skip(1);
    let file_name = args
        .next()
        .context("usage: filmroom-analyze <file-name> [rubric.txt] [roster.json]")?;

    let rubric = match args.next() {
        Some(path) => tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("reading rubric {}", path))?,
        None => default_rubric().to_string(),
    };

    let roster = match args.next() {
        Some(path) => load_roster(Path::new(&path)).await?,
        None => Roster::new(),
    };

    let client = GeminiClient::from_env().context("creating Gemini client")?;
    info!(
        models = ?client.config().candidates.iter().map(|c| c.id.as_str()).collect::<Vec<_>>(),
        policy = client.config().fallback_policy.as_str(),
        "Starting filmroom-analyze"
    );

    let analyzer = ClipAnalyzer::new(client.into_orchestrator());
    let logger = AnalysisLogger::new("cli", &file_name);

    let analysis = analyzer
        .analyze_uploaded_clip(&file_name, &rubric, roster, &logger)
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;

    println!("{}", serde_json::to_string_pretty(&analysis)?);
    Ok(())
}

async fn load_roster(path: &Path) -> anyhow::Result<Roster> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading roster {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parsing roster {}", path.display()))
}
