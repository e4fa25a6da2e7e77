use cogex_core::{KeyEvent, ResponseKey};
use cogex_timing::Timer;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, trace};

/// Accepted keypress within the response window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Response {
    pub key: ResponseKey,
    pub reaction_time_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verdict {
    Accept(Response),
    /// Pressed before the window opened
    Stale,
    Ignored,
    /// Pressed after the deadline
    Late,
}

fn judge(event: &KeyEvent, start_ns: u64, deadline_ns: u64) -> Verdict {
    if event.timestamp_ns < start_ns {
        return Verdict::Stale;
    }
    if event.timestamp_ns > deadline_ns {
        return Verdict::Late;
    }
    match event.key.response() {
        Some(key) => Verdict::Accept(Response {
            key,
            reaction_time_ms: (event.timestamp_ns - start_ns) / 1_000_000,
        }),
        None => Verdict::Ignored,
    }
}

/// Races the first response key against the response deadline.
///
/// The deadline future and the channel borrow both live inside one `collect`
/// call, so whichever trigger loses is dropped before the call returns and
/// cannot leak into a later window.
pub struct ResponseCollector<'a, T: Timer> {
    input: &'a mut UnboundedReceiver<KeyEvent>,
    timer: &'a T,
}

impl<'a, T: Timer> ResponseCollector<'a, T> {
    pub fn new(input: &'a mut UnboundedReceiver<KeyEvent>, timer: &'a T) -> Self {
        Self { input, timer }
    }

    /// Opens the window now
    pub async fn collect(&mut self, timeout: Duration) -> Option<Response> {
        let start = self.timer.now();
        self.collect_from(start, timeout).await
    }

    /// Opens the window at `start_ns`, which the caller sets to the stimulus onset.
    pub async fn collect_from(&mut self, start_ns: u64, timeout: Duration) -> Option<Response> {
        let deadline_ns = start_ns.saturating_add(timeout.as_nanos() as u64);
        let deadline = self.timer.sleep_until(deadline_ns);
        tokio::pin!(deadline);
        let mut input_open = true;

        loop {
            // Key branch first: an event already queued when the deadline fires wins.
            tokio::select! {
                biased;
                event = self.input.recv(), if input_open => match event {
                    Some(event) => match judge(&event, start_ns, deadline_ns) {
                        Verdict::Accept(response) => {
                            debug!(key = ?response.key, rt_ms = response.reaction_time_ms, "response accepted");
                            return Some(response);
                        }
                        Verdict::Late => {
                            debug!("response window closed before keypress");
                            return None;
                        }
                        verdict => trace!(?verdict, key = ?event.key, "key ignored"),
                    },
                    None => input_open = false,
                },
                () = &mut deadline => {
                    debug!(timeout_ms = timeout.as_millis() as u64, "response timeout");
                    return None;
                }
            }
        }
    }
}
