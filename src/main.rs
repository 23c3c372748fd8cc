use ambience_forge::config::Config;
use ambience_forge::init;
use ambience_forge::pipeline::{AmbienceJob, run_job};
use ambience_forge::runner::SystemRunner;
use anyhow::{Context, Result};

const CONFIG_PATH: &str = "config.json";
const JOB_PATH: &str = "job.json";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cfg = Config::load_or_default(CONFIG_PATH).await?;
    init::ensure_directories(&cfg.assets_dir).await?;

    let missing = init::missing_tools(&cfg).await;
    if !missing.is_empty() {
        tracing::warn!("Missing tools: {}", missing.join(", "));
    }

    let job_text = tokio::fs::read_to_string(JOB_PATH)
        .await
        .with_context(|| format!("Failed to read job: {}", JOB_PATH))?;
    let job = AmbienceJob::from_json(&job_text).context("Failed to parse job.json")?;

    let report = run_job(&SystemRunner, &cfg, &job).await?;
    tracing::info!(
        output = %report.output.display(),
        video_loops = report.video_plan.loop_count,
        audio_loops = report.audio_plan.map(|p| p.loop_count),
        "FULLY AUTOMATED VIDEO READY"
    );
    Ok(())
}
