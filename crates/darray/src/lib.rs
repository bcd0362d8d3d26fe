//! Device-resident n-dimensional arrays with queue-dispatched reductions.
//!
//! The crate splits into three layers:
//!
//! - [`device`]: the [`DeviceQueue`] contract plus the plain-data types
//!   (dtypes, scalars, literals, reduction specs) that cross it.
//! - [`array`]: [`UsmArray`], a shape/stride view over a queue buffer, with
//!   zero-copy slicing and axis permutation.
//! - [`ops`]: free-function operations (creation, `sum`/`prod` reductions,
//!   comparisons) validating inputs before dispatching to the queue.

pub mod array;
pub mod device;
mod env;
pub mod ops;

pub use array::{Shape, Slice, UsmArray};
pub use device::spec::{
    DeviceQueue, DType, Kind, QueueError, QueueResult, ReduceKind, ReduceSpec, Scalar,
};
