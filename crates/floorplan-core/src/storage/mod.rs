//! Storage abstraction for project persistence.
//!
//! The server treats storage as an opaque durable key-value store keyed by
//! project id. Listing returns summaries only.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::model::{Project, ProjectSummary};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Project not found: {0}")]
    NotFound(String),
    #[error("Invalid project id: {0:?}")]
    InvalidId(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Boxed future for storage operations, usable from multi-threaded runtimes.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Trait for project storage backends.
///
/// Implementations can keep projects in memory or on the filesystem.
pub trait ProjectStorage: Send + Sync {
    /// Save a project under its own id, replacing any previous copy.
    fn save(&self, project: &Project) -> BoxFuture<'_, StorageResult<()>>;

    /// Load a project.
    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<Project>>;

    /// Delete a project. Deleting a missing project is not an error.
    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>>;

    /// List id/name/version of every stored project.
    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<ProjectSummary>>>;

    /// Check if a project exists.
    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>>;
}

/// Simple blocking executor for tests of the synchronous backends.
#[cfg(test)]
pub(crate) fn block_on<F: Future>(f: F) -> F::Output {
    use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

    fn dummy_raw_waker() -> RawWaker {
        fn no_op(_: *const ()) {}
        fn clone(_: *const ()) -> RawWaker {
            dummy_raw_waker()
        }
        static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, no_op, no_op, no_op);
        RawWaker::new(std::ptr::null(), &VTABLE)
    }

    let waker = unsafe { Waker::from_raw(dummy_raw_waker()) };
    let mut cx = Context::from_waker(&waker);
    let mut f = std::pin::pin!(f);

    loop {
        if let Poll::Ready(result) = f.as_mut().poll(&mut cx) {
            return result;
        }
    }
}
