use anyhow::Result;
use listing_ai_rs::core::{AspectRatio, ProgressUpdate};
use listing_ai_rs::provider::{Credentials, StudioSettings};
use listing_ai_rs::providers::google::build_studio;

// Run with:
//   GEMINI_API_KEY=... cargo run -p promo-video -- "Drone shot of a villa with a pool at sunset"
// Optional:
//   ASPECT_RATIO=9:16   (default 16:9)
//   OUTPUT=promo.mp4    (default)

#[tokio::main]
async fn main() -> Result<()> {
    let prompt = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    if prompt.trim().is_empty() {
        eprintln!("usage: promo-video <prompt>");
        std::process::exit(2);
    }
    let aspect_ratio: AspectRatio = std::env::var("ASPECT_RATIO")
        .unwrap_or_else(|_| "16:9".to_string())
        .parse()?;
    let output = std::env::var("OUTPUT").unwrap_or_else(|_| "promo.mp4".to_string());

    let studio = build_studio(&StudioSettings::default(), &Credentials::None)?;
    let notifier = |update: &ProgressUpdate| eprintln!("[{:?}] {}", update.stage, update.message);

    let video = studio
        .generate_video(&prompt, aspect_ratio, &notifier)
        .await?;
    std::fs::write(&output, &video.data)?;
    println!(
        "wrote {} bytes ({}) to {}",
        video.len(),
        video.media_type.as_deref().unwrap_or("unknown type"),
        output
    );
    Ok(())
}
