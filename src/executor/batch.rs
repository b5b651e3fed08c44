//! Size-bounded statement accumulator.
//!
//! Collects queued statements until the running count reaches a multiple
//! of the batch size. The count is cumulative for the life of the
//! accumulator, so it doubles as the number of statements processed.

/// Default number of statements per committed batch.
pub const DEFAULT_BATCH_SIZE: usize = 50;

/// Batch accumulator for queued statements.
#[derive(Debug)]
pub struct BatchAccumulator<T> {
    batch_size: usize,
    items: Vec<T>,
    queued: usize,
}

impl<T> BatchAccumulator<T> {
    /// Create a new accumulator.
    ///
    /// # Panics
    ///
    /// Panics if `batch_size` is zero.
    pub fn new(batch_size: usize) -> Self {
        assert!(batch_size > 0, "batch size must be positive");
        Self {
            batch_size,
            items: Vec::with_capacity(batch_size),
            queued: 0,
        }
    }

    /// Add an item to the batch.
    ///
    /// Returns true if the batch is now ready to flush.
    pub fn push(&mut self, item: T) -> bool {
        self.items.push(item);
        self.queued += 1;
        self.queued % self.batch_size == 0
    }

    /// Drain the batch, returning all accumulated items.
    pub fn drain(&mut self) -> Vec<T> {
        std::mem::replace(&mut self.items, Vec::with_capacity(self.batch_size))
    }

    /// Drop every pending item without returning it.
    pub fn discard(&mut self) -> usize {
        let dropped = self.items.len();
        self.items.clear();
        dropped
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of items currently pending.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Number of items ever pushed.
    pub fn queued(&self) -> usize {
        self.queued
    }
}
