use std::collections::TryReserveError;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReverseError
{
    /// The output buffer could not be reserved.
    #[error("failed to allocate {requested} bytes for the reversed sequence")]
    AllocationFailure
    {
        requested: usize,
        #[source]
        source: TryReserveError,
    },
}

impl ReverseError
{
    /// Number of bytes that were requested when the error occurred.
    pub fn requested(&self) -> usize
    {
        match *self
        {
            ReverseError::AllocationFailure { requested, .. } => requested,
        }
    }
}
