//! Command-line form: one positional URL, envelope printed as pretty JSON.

use place_scout::PlaceScraper;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays pure JSON for piping.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let Some(url) = std::env::args().nth(1) else {
        eprintln!("Usage: place-scout-cli <URL>");
        std::process::exit(1);
    };

    let envelope = PlaceScraper::new().scrape(&url).await;
    println!("{}", serde_json::to_string_pretty(&envelope)?);
    Ok(())
}
