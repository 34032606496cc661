/*! Pools of reusable buffers.

Every matching attempt needs a stack of frames for its
[`MatchContext`](crate::re::context::MatchContext), and a stack of pending
alternatives for backtracking. Both grow as the attempt progresses, and
allocating them over and over for each start position is expensive, so
they are taken from a pool and returned when the attempt finishes.
 */

use std::ops::{Deref, DerefMut};
use std::sync::{Mutex, PoisonError};

use lazy_static::lazy_static;

use crate::re::context::Frame;
use crate::re::engine::Choice;

/// Maximum number of idle buffers kept by a pool.
const MAX_IDLE_BUFFERS: usize = 64;

/// Buffers with a capacity larger than this, in number of items, are
/// released instead of being returned to the pool.
const MAX_BUFFER_CAPACITY: usize = 1 << 16;

lazy_static! {
    pub(crate) static ref FRAMES: Pool<Frame> = Pool::new();
    pub(crate) static ref CHOICES: Pool<Choice> = Pool::new();
}

/// A pool of vectors.
pub(crate) struct Pool<T> {
    idle: Mutex<Vec<Vec<T>>>,
}

impl<T> Pool<T> {
    pub fn new() -> Self {
        Self { idle: Mutex::new(Vec::new()) }
    }

    /// Takes an empty vector from the pool. The vector goes back to the
    /// pool when the returned guard is dropped.
    pub fn get(&self) -> Pooled<'_, T> {
        let buf = self
            .idle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop()
            .unwrap_or_default();

        Pooled { pool: self, buf }
    }

    fn put(&self, mut buf: Vec<T>) {
        if buf.capacity() > MAX_BUFFER_CAPACITY {
            return;
        }
        buf.clear();
        let mut idle = self.idle.lock().unwrap_or_else(PoisonError::into_inner);
        if idle.len() < MAX_IDLE_BUFFERS {
            idle.push(buf);
        }
    }

    #[cfg(test)]
    fn idle(&self) -> usize {
        self.idle.lock().unwrap().len()
    }
}

/// A vector borrowed from a [`Pool`].
pub(crate) struct Pooled<'a, T> {
    pool: &'a Pool<T>,
    buf: Vec<T>,
}

impl<T> Deref for Pooled<'_, T> {
    type Target = Vec<T>;

    fn deref(&self) -> &Self::Target {
        &self.buf
    }
}

impl<T> DerefMut for Pooled<'_, T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.buf
    }
}

impl<T> Drop for Pooled<'_, T> {
    fn drop(&mut self) {
        self.pool.put(std::mem::take(&mut self.buf));
    }
}
