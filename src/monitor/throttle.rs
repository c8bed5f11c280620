//! Latest-wins rate limiting for snapshot streams.

use futures::{Stream, ready};
use pin_project_lite::pin_project;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::time::{Interval, MissedTickBehavior, interval};

/// Adds [`throttle`](ThrottleExt::throttle) to any stream.
pub trait ThrottleExt: Stream {
    /// Emit at most once per `period`, keeping only the newest item seen
    /// since the previous emission.
    fn throttle(self, period: Duration) -> Throttle<Self>
    where
        Self: Sized,
    {
        Throttle::new(self, period)
    }
}

impl<T: Stream> ThrottleExt for T {}

pin_project! {
    /// Stream returned by [`ThrottleExt::throttle`].
    pub struct Throttle<S: Stream> {
        #[pin]
        stream: S,
        interval: Interval,
        pending: Option<S::Item>,
        done: bool,
    }
}

impl<S: Stream> Throttle<S> {
    pub fn new(stream: S, period: Duration) -> Self {
        let mut interval = interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { stream, interval, pending: None, done: false }
    }
}

impl<S: Stream> Stream for Throttle<S> {
    type Item = S::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        // Drain whatever is ready so the newest item wins
        while !*this.done {
            match this.stream.as_mut().poll_next(cx) {
                Poll::Ready(Some(item)) => *this.pending = Some(item),
                Poll::Ready(None) => *this.done = true,
                Poll::Pending => break,
            }
        }

        if this.pending.is_none() {
            return if *this.done { Poll::Ready(None) } else { Poll::Pending };
        }

        ready!(this.interval.poll_tick(cx));
        Poll::Ready(this.pending.take())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test(start_paused = true)]
    async fn keeps_only_latest_item() {
        let source = futures::stream::iter(1..=5);
        let items: Vec<_> = source.throttle(Duration::from_millis(100)).collect().await;
        assert_eq!(items, vec![5]);
    }

    #[tokio::test(start_paused = true)]
    async fn spaced_items_pass_through() {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let stream = tokio_stream::wrappers::UnboundedReceiverStream::new(rx);
        let mut throttled = Box::pin(stream.throttle(Duration::from_millis(100)));

        tx.send(1).unwrap();
        assert_eq!(throttled.next().await, Some(1));
        tx.send(2).unwrap();
        assert_eq!(throttled.next().await, Some(2));
        drop(tx);
        assert_eq!(throttled.next().await, None);
    }
}
