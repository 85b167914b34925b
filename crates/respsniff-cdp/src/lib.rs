//! # respsniff CDP transport
//!
//! A Chrome DevTools Protocol client that feeds `Network.responseReceived`
//! events into a [`respsniff_core::ResponseInterceptor`].
//!
//! 1. Start Chrome with remote debugging:
//!    ```bash
//!    chrome --remote-debugging-port=9222
//!    ```
//!
//! 2. Attach a page and capture:
//!    ```rust,ignore
//!    let client = CdpClient::connect("http://localhost:9222").await?;
//!    let page = Arc::new(client.new_page().await?);
//!    let interceptor = InterceptorBuilder::new(Arc::new(CdpTransport::new(page.clone())))
//!        .sniff("*/api/*")
//!        .start()?;
//!    page.navigate("https://example.com").await?;
//!    let response = interceptor.get(interceptor.take_options()).await?;
//!    ```

mod client;
mod error;
mod protocol;
mod session;
mod transport;

pub use client::{CdpClient, DEFAULT_REQUEST_TIMEOUT};
pub use error::CdpError;
pub use protocol::*;
pub use session::{EventHandler, PageSession};
pub use transport::CdpTransport;
