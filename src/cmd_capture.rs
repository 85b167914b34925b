//! `respsniff capture`: open a page and print matching responses.

use std::sync::Arc;

use anyhow::{Context, bail};
use tracing::{debug, info, warn};

use respsniff_cdp::{CdpClient, CdpTransport, PageSession};
use respsniff_config::Config;
use respsniff_core::{CaptureError, InterceptorBuilder, RawEvent, ResponseInterceptor, Transport};

use crate::cli::CaptureArgs;

/// Accept only the listed status codes.
pub(crate) fn status_filter(statuses: Vec<u16>) -> impl Fn(&RawEvent) -> bool + Send + Sync + 'static {
    move |event| statuses.contains(&event.status)
}

/// Accept responses whose MIME type contains `needle`, ignoring case.
pub(crate) fn mime_filter(needle: &str) -> impl Fn(&RawEvent) -> bool + Send + Sync + 'static {
    let needle = needle.to_lowercase();
    move |event| {
        event
            .mime_type
            .as_deref()
            .is_some_and(|mime| mime.to_lowercase().contains(&needle))
    }
}

pub(crate) fn build_interceptor(
    transport: Arc<dyn Transport>,
    config: &Config,
    args: &CaptureArgs,
) -> Result<ResponseInterceptor, CaptureError> {
    let mut builder = InterceptorBuilder::new(transport)
        .sniff_all(&config.capture.patterns)
        .config(config.capture.interceptor_config());

    if !args.status.is_empty() {
        builder = builder.filter(status_filter(args.status.clone()));
    }
    if let Some(mime) = &args.mime {
        builder = builder.filter(mime_filter(mime));
    }

    builder.start()
}

pub(crate) async fn run(config: &Config, args: CaptureArgs) -> anyhow::Result<()> {
    if config.capture.patterns.is_empty() {
        bail!("No URL patterns given; pass --pattern or set capture.patterns");
    }

    let client = CdpClient::connect_with_timeout(
        &config.browser.endpoint,
        config.browser.request_timeout(),
    )
    .await
    .with_context(|| format!("Failed to connect to {}", config.browser.endpoint))?;

    let page = match &args.target {
        Some(target_id) => client.attach_page(target_id).await?,
        None => client.new_page().await?,
    };
    let page = Arc::new(page);

    let outcome = capture(config, &args, page.clone()).await;

    if args.target.is_none() && !args.keep_open {
        if let Err(e) = client.close_page(&page).await {
            warn!("Failed to close tab {}: {}", page.target_id(), e);
        }
    }

    let received = outcome?;
    info!("Captured {} of {} responses", received, args.count);
    Ok(())
}

async fn capture(config: &Config, args: &CaptureArgs, page: Arc<PageSession>) -> anyhow::Result<usize> {
    let transport = Arc::new(CdpTransport::new(page.clone()));
    let interceptor = build_interceptor(transport, config, args)?;
    debug!("Capturing {:?} on {}", interceptor.patterns(), args.url);

    page.navigate(&args.url)
        .await
        .with_context(|| format!("Failed to navigate to {}", args.url))?;

    let options = interceptor.take_options().include_body(!args.no_body);
    let mut take = interceptor.take(args.count, options);
    let mut received = 0;

    while let Some(item) = take.next().await {
        match item {
            Ok(response) => {
                println!("{}", serde_json::to_string(&response)?);
                received += 1;
            }
            Err(CaptureError::Timeout(after)) => {
                warn!("Timed out after {:?} waiting for a settled response", after);
            }
            Err(e) => return Err(e.into()),
        }
    }

    if received < args.count {
        warn!("Capture ended with {} of {} responses", received, args.count);
    }
    Ok(received)
}
