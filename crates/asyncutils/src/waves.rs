use futures::Stream;
use futures::future::{JoinAll, join_all};
use pin_project_lite::pin_project;
use std::pin::Pin;
use std::task::{Context, Poll, ready};

pin_project! {
    /// A [`Stream`] that drives futures in waves of at most `size`.
    ///
    /// Futures are pulled lazily from the source iterator, so nothing beyond
    /// the current wave is even constructed yet. Each item yielded by the
    /// stream is the output of one complete wave, in the same order the
    /// futures came out of the iterator (completion order inside a wave is
    /// irrelevant).
    #[must_use = "streams do nothing unless polled"]
    pub struct Waves<I: Iterator<Item = F>, F: Future> {
        source: I,
        size: usize,
        #[pin]
        wave: Option<JoinAll<F>>,
    }
}

impl<I: Iterator<Item = F>, F: Future> Waves<I, F> {
    /// A `size` of zero is treated as one (strictly sequential).
    pub fn new(source: impl IntoIterator<IntoIter = I>, size: usize) -> Self {
        Self { source: source.into_iter(), size: size.max(1), wave: None }
    }

    /// Maximum number of futures polled concurrently.
    pub fn size(&self) -> usize {
        self.size
    }
}

/// Shorthand for [`Waves::new`].
///
/// ```
/// use futures::StreamExt;
/// use shoebox_asyncutils::waves;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let mut stream = waves((1..=5).map(|n| async move { n * 10 }), 2);
/// assert_eq!(stream.next().await, Some(vec![10, 20]));
/// assert_eq!(stream.next().await, Some(vec![30, 40]));
/// assert_eq!(stream.next().await, Some(vec![50]));
/// assert_eq!(stream.next().await, None);
/// # }
/// ```
pub fn waves<I, F>(source: I, size: usize) -> Waves<I::IntoIter, F>
where
    I: IntoIterator<Item = F>,
    F: Future,
{
    Waves::new(source, size)
}

impl<I: Iterator<Item = F>, F: Future> Stream for Waves<I, F> {
    type Item = Vec<F::Output>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();
        if this.wave.is_none() {
            let next: Vec<F> = this.source.by_ref().take(*this.size).collect();
            if next.is_empty() {
                return Poll::Ready(None);
            }
            this.wave.set(Some(join_all(next)));
        }
        let Some(wave) = this.wave.as_mut().as_pin_mut() else {
            return Poll::Ready(None);
        };
        let output = ready!(wave.poll(cx));
        this.wave.set(None);
        Poll::Ready(Some(output))
    }
}
