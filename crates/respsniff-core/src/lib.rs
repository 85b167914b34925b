//! # respsniff core
//!
//! Capture of network responses pushed by an event-driven transport.
//!
//! A [`ResponseInterceptor`] attaches one listener to a [`Transport`], keeps
//! the notifications whose URL matches a glob pattern and passes every
//! predicate, and buffers them until the stream has been quiet for a
//! configurable period. Consumers then drain the buffer in arrival order,
//! optionally fetching each response body with bounded retries.

mod buffer;
mod config;
mod drain;
mod error;
mod pattern;
mod subscription;
mod transport;
mod types;

#[cfg(test)]
mod test_support;

pub use buffer::EventBuffer;
pub use config::{InterceptorConfig, TakeOptions};
pub use drain::{Drained, Take};
pub use error::{CaptureError, TransportError};
pub use pattern::{PatternSet, UrlPattern};
pub use subscription::{InterceptorBuilder, Predicate, ResponseInterceptor};
pub use transport::{ResponseListener, Transport};
pub use types::{BodyPayload, CapturedResponse, NO_CONTENT, RawEvent, ResponseBody};
