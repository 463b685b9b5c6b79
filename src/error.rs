use std::collections::TryReserveError;
use thiserror::Error;

/// Why a binding was not inserted.
#[derive(Error, Debug)]
pub enum InsertError {
    #[error("key is already bound")]
    DuplicateKey,
    #[error("out of memory while allocating binding: {0}")]
    OutOfMemory(#[from] TryReserveError),
}

/// A table could not be constructed.
#[derive(Error, Debug)]
pub enum TableError {
    #[error("symbol table unavailable: cannot allocate {buckets} buckets: {source}")]
    Unavailable {
        buckets: usize,
        #[source]
        source: TryReserveError,
    },
}
