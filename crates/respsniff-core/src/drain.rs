//! Pull-side drain sequence with bounded body retrieval.

use std::time::Duration;

use futures::Stream;
use tracing::{debug, trace};

use crate::buffer::EventBuffer;
use crate::config::TakeOptions;
use crate::error::{CaptureError, TransportError};
use crate::transport::Transport;
use crate::types::{CapturedResponse, NO_CONTENT, ResponseBody};

/// A single-pass sequence of up to `total` captured responses.
///
/// The sequence ends early, after yielding, when:
/// - a pop times out (the error is yielded),
/// - bodies were not requested or the status is 204 (body absent),
/// - every body attempt came back blank (body absent),
/// - the transport fails while fetching a body (the error is yielded).
///
/// Callers detect early termination by comparing the number of items received
/// with the number requested.
pub struct Take<'a> {
    buffer: &'a EventBuffer,
    transport: &'a dyn Transport,
    options: TakeOptions,
    retry_interval: Duration,
    remaining: usize,
    finished: bool,
}

impl<'a> Take<'a> {
    pub(crate) fn new(
        buffer: &'a EventBuffer,
        transport: &'a dyn Transport,
        options: TakeOptions,
        retry_interval: Duration,
        total: usize,
    ) -> Self {
        Self {
            buffer,
            transport,
            options,
            retry_interval,
            remaining: total,
            finished: total == 0,
        }
    }

    /// Items the sequence may still yield.
    pub fn remaining(&self) -> usize {
        if self.finished { 0 } else { self.remaining }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Produce the next response, or `None` once the sequence has ended.
    ///
    /// Dropping the future while it waits for the buffer consumes nothing.
    pub async fn next(&mut self) -> Option<Result<CapturedResponse, CaptureError>> {
        if self.finished {
            return None;
        }

        let event = match self.buffer.pop_ready(self.options.timeout).await {
            Ok(event) => event,
            Err(e) => {
                debug!("Drain stopped: {}", e);
                self.finished = true;
                return Some(Err(e));
            }
        };

        // The slot is spent only once an event has actually been popped.
        self.remaining -= 1;
        if self.remaining == 0 {
            self.finished = true;
        }

        let status = event.status;
        let response = CapturedResponse::from_event(event);

        if !self.options.include_body || status == NO_CONTENT {
            self.finished = true;
            return Some(Ok(response));
        }

        match self.fetch_body(&response.request_id).await {
            Ok(Some(body)) => Some(Ok(response.with_body(body))),
            Ok(None) => {
                self.finished = true;
                Some(Ok(response))
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e.into()))
            }
        }
    }

    async fn fetch_body(&self, request_id: &str) -> Result<Option<ResponseBody>, TransportError> {
        let attempts = self.options.body_attempts;
        for attempt in 1..=attempts {
            match self.transport.fetch_body(request_id).await? {
                Some(payload) if !payload.is_blank() => {
                    trace!("Body for {} arrived on attempt {}", request_id, attempt);
                    return payload.decode().map(Some);
                }
                _ => trace!("Body for {} not available (attempt {}/{})", request_id, attempt, attempts),
            }
            if attempt < attempts {
                tokio::time::sleep(self.retry_interval).await;
            }
        }
        debug!("Giving up on body for {} after {} attempts", request_id, attempts);
        Ok(None)
    }

    /// Drain the whole sequence.
    pub async fn collect(mut self) -> Drained {
        let mut drained = Drained::default();
        while let Some(item) = self.next().await {
            match item {
                Ok(response) => drained.responses.push(response),
                Err(e) => drained.error = Some(e),
            }
        }
        drained
    }

    /// Adapt the sequence into a [`Stream`].
    pub fn into_stream(self) -> impl Stream<Item = Result<CapturedResponse, CaptureError>> + 'a {
        futures::stream::unfold(self, |mut take| async move {
            take.next().await.map(|item| (item, take))
        })
    }
}

/// Everything a drain produced, plus the error that ended it, if any.
#[derive(Debug, Default)]
pub struct Drained {
    pub responses: Vec<CapturedResponse>,
    pub error: Option<CaptureError>,
}

impl Drained {
    pub fn len(&self) -> usize {
        self.responses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }

    /// Whether `requested` items were produced without error.
    pub fn is_complete(&self, requested: usize) -> bool {
        self.error.is_none() && self.responses.len() == requested
    }

    pub fn timed_out(&self) -> bool {
        self.error.as_ref().is_some_and(CaptureError::is_timeout)
    }
}

#[cfg(test)]
#[path = "drain_tests.rs"]
mod tests;
