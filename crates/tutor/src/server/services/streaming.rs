//! Producer/consumer relay between the provider stream and the HTTP response body

use futures::channel::mpsc;
use futures::{SinkExt, StreamExt};

use super::completions::DeltaStream;
use crate::error::Result;

/// Receiving half handed to the response body
pub type RelayReceiver = mpsc::Receiver<Result<String>>;

/// Spawn a producer that forwards `source` into a channel holding one chunk.
///
/// The producer stops after forwarding the first error, or as soon as the
/// receiver is dropped (client disconnected).
pub fn relay(mut source: DeltaStream) -> RelayReceiver {
  // buffer 0 plus the single sender gives a capacity of one in-flight chunk
  let (mut sender, receiver) = mpsc::channel(0);

  tokio::spawn(async move {
    let mut forwarded = 0usize;
    while let Some(item) = source.next().await {
      let failed = match &item {
        Ok(_) => false,
        Err(e) => {
          tracing::warn!(error = %e, forwarded, "completion stream failed mid-flight");
          true
        }
      };

      if sender.send(item).await.is_err() {
        tracing::debug!(forwarded, "client went away, abandoning completion stream");
        return;
      }
      if failed {
        return;
      }
      forwarded += 1;
    }
    tracing::debug!(forwarded, "completion stream finished");
  });

  receiver
}
