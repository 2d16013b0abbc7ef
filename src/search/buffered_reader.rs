//! Buffered reader - decouples a batch producer from the caller's page size / 缓冲读取器
//!
//! The producer yields batches of any size; callers ask for exactly `limit`
//! items. Leftovers stay buffered for the next call.

use std::collections::VecDeque;

use async_trait::async_trait;
use futures::stream::{self, Stream, TryStreamExt};

/// Batch-oriented asynchronous producer / 批量异步生产者
#[async_trait]
pub trait BatchProducer: Send {
    type Item: Send;
    type Error: Send;

    /// Produce the next batch (possibly empty) / 读取下一批
    async fn read(&mut self) -> Result<Vec<Self::Item>, Self::Error>;

    /// True once the producer has nothing more to give / 是否已读完
    fn done(&self) -> bool;
}

/// Pull-based pagination buffer / 拉取式分页缓冲
///
/// Single consumer: `read` takes `&mut self`, so overlapping calls cannot happen.
pub struct BufferedReader<P: BatchProducer> {
    producer: P,
    buffer: VecDeque<P::Item>,
}

impl<P: BatchProducer> BufferedReader<P> {
    pub fn new(producer: P) -> Self {
        Self {
            producer,
            buffer: VecDeque::new(),
        }
    }

    /// Read up to `limit` items; `limit == 0` drains the producer / 读取最多 limit 条
    ///
    /// Returns fewer than `limit` items only when the producer is done.
    /// A producer error is returned as-is and already buffered items are kept.
    pub async fn read(&mut self, limit: usize) -> Result<Vec<P::Item>, P::Error> {
        while (limit == 0 || self.buffer.len() < limit) && !self.producer.done() {
            let batch = self.producer.read().await?;
            self.buffer.extend(batch);
        }

        let take = if limit == 0 {
            self.buffer.len()
        } else {
            limit.min(self.buffer.len())
        };
        Ok(self.buffer.drain(..take).collect())
    }

    /// Items pulled from the producer but not yet returned
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Nothing buffered and nothing left to pull
    pub fn is_exhausted(&self) -> bool {
        self.buffer.is_empty() && self.producer.done()
    }

    pub fn producer(&self) -> &P {
        &self.producer
    }

    pub fn producer_mut(&mut self) -> &mut P {
        &mut self.producer
    }

    pub fn into_inner(self) -> P {
        self.producer
    }

    /// Expose the reader as a lazy stream, pulling `page_size` items at a time / 转为流
    pub fn into_stream(self, page_size: usize) -> impl Stream<Item = Result<P::Item, P::Error>> {
        let page_size = page_size.max(1);
        stream::try_unfold(self, move |mut reader| async move {
            let page = reader.read(page_size).await?;
            if page.is_empty() {
                return Ok::<_, P::Error>(None);
            }
            Ok(Some((stream::iter(page.into_iter().map(Ok::<P::Item, P::Error>)), reader)))
        })
        .try_flatten()
    }
}
