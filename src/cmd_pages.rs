//! `respsniff pages`: list open browser targets.

use anyhow::Context;

use respsniff_cdp::CdpClient;
use respsniff_config::Config;

pub(crate) async fn run(config: &Config) -> anyhow::Result<()> {
    let client = CdpClient::connect_with_timeout(
        &config.browser.endpoint,
        config.browser.request_timeout(),
    )
    .await
    .with_context(|| format!("Failed to connect to {}", config.browser.endpoint))?;

    for page in client.list_pages().await? {
        println!("{}", serde_json::to_string(&page)?);
    }
    Ok(())
}
