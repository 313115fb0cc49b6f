use crate::error::{AppError, Result};
use crossbeam::queue::ArrayQueue;
use ort::session::{builder::GraphOptimizationLevel, Session};
use std::cell::UnsafeCell;
use std::path::Path;

/// A pool of ONNX Runtime sessions for parallel embedding.
///
/// `Session::run` requires `&mut self`. Rather than serialising every query
/// behind a Mutex, the pool holds N independent sessions and hands out
/// exclusive indices through a lock-free queue.
///
/// # Safety
/// Each session index is held by at most one thread at a time; the ArrayQueue
/// guarantees this through atomic pop/push. A session is only dereferenced
/// between acquiring its index and releasing it.
pub struct SessionPool {
    sessions: Vec<UnsafeCell<Session>>,
    available: ArrayQueue<usize>,
}

/// Returns its session index to the pool on drop, including on panic.
struct SessionLease<'a> {
    pool: &'a SessionPool,
    index: usize,
}

impl Drop for SessionLease<'_> {
    fn drop(&mut self) {
        // Only indices popped from the queue are pushed back, so this cannot overflow.
        let _ = self.pool.available.push(self.index);
    }
}

impl SessionPool {
    /// Load `pool_size` sessions from one model file with Level3 optimisation.
    pub fn load(model_path: &Path, pool_size: usize, intra_threads: usize) -> Result<Self> {
        let pool_size = pool_size.max(1);

        // Read model file once
        let model_bytes = std::fs::read(model_path)
            .map_err(|e| AppError::ModelError(format!("Failed to read model file: {}", e)))?;

        let mut sessions = Vec::with_capacity(pool_size);
        let available = ArrayQueue::new(pool_size);

        for i in 0..pool_size {
            let session = Session::builder()
                .map_err(|e| AppError::ModelError(e.to_string()))?
                .with_optimization_level(GraphOptimizationLevel::Level3)
                .map_err(|e| AppError::ModelError(e.to_string()))?
                .with_intra_threads(intra_threads.max(1))
                .map_err(|e| AppError::ModelError(e.to_string()))?
                .commit_from_memory(&model_bytes)
                .map_err(|e: ort::Error| AppError::ModelError(e.to_string()))?;

            sessions.push(UnsafeCell::new(session));
            available
                .push(i)
                .map_err(|_| AppError::ModelError("Failed to initialize session pool".into()))?;
        }

        tracing::info!(
            path = %model_path.display(),
            pool_size,
            intra_threads,
            "ONNX session pool loaded"
        );

        Ok(Self {
            sessions,
            available,
        })
    }

    pub fn size(&self) -> usize {
        self.sessions.len()
    }

    /// Run `f` with exclusive access to one pooled session.
    ///
    /// Fails with `ResourceError` when every session is busy; callers bound
    /// concurrency with a semaphore sized to the pool.
    pub fn with_session<T>(&self, f: impl FnOnce(&mut Session) -> Result<T>) -> Result<T> {
        let index = self
            .available
            .pop()
            .ok_or_else(|| AppError::ResourceError("No available sessions in pool".into()))?;
        let _lease = SessionLease { pool: self, index };

        // SAFETY: `index` was popped from the queue and is not pushed back until
        // `_lease` drops, so no other thread can reach this session meanwhile.
        let session = unsafe { &mut *self.sessions[index].get() };
        f(session)
    }
}

// SAFETY: sessions are only reached through `with_session`, which hands out each
// index to one thread at a time via the lock-free queue. This is the same
// exclusion a Mutex would give, without blocking.
unsafe impl Send for SessionPool {}
unsafe impl Sync for SessionPool {}
