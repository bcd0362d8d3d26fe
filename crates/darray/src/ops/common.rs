//! Shared validation helpers for array operations.

use anyhow::{ensure, Result};

use crate::array::usm_array::UsmArray;
use crate::device::spec::DeviceQueue;

/// Fails when the operands live on different queues.
pub fn ensure_same_queue<Q: DeviceQueue>(
    op: &str,
    lhs: &UsmArray<Q>,
    rhs: &UsmArray<Q>,
) -> Result<()> {
    ensure!(
        lhs.same_queue(rhs),
        "{op}: operands live on different queues ({} vs {})",
        lhs.queue().queue_name(),
        rhs.queue().queue_name()
    );
    Ok(())
}

/// Fails when the operand shapes differ.
pub fn ensure_same_shape<Q: DeviceQueue>(
    op: &str,
    lhs: &UsmArray<Q>,
    rhs: &UsmArray<Q>,
) -> Result<()> {
    ensure!(
        lhs.dims() == rhs.dims(),
        "{op}: operand shapes {:?} and {:?} differ",
        lhs.dims(),
        rhs.dims()
    );
    Ok(())
}
