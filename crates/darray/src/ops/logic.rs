//! Elementwise comparisons and truth reductions.

use anyhow::{Context, Result};

use crate::array::usm_array::UsmArray;
use crate::device::spec::{ArraySpec, DType, DeviceQueue, Scalar};
use crate::ops::common::{ensure_same_queue, ensure_same_shape};

/// Elementwise numeric equality, producing a `Bool` array.
///
/// Operands must share a queue and shape; dtypes may differ.
pub fn equal<Q: DeviceQueue>(lhs: &UsmArray<Q>, rhs: &UsmArray<Q>) -> Result<UsmArray<Q>> {
    ensure_same_queue("equal", lhs, rhs)?;
    ensure_same_shape("equal", lhs, rhs)?;
    let out_spec = ArraySpec::new(DType::Bool, lhs.shape().clone());
    let buffer = lhs
        .queue()
        .compare_equal(lhs.view(), rhs.view(), &out_spec)
        .context("comparison kernel failed")?;
    Ok(UsmArray::from_parts(
        lhs.queue(),
        DType::Bool,
        lhs.shape().clone(),
        buffer,
    ))
}

/// Whether every element of `x` is truthy. Empty arrays reduce to `true`.
pub fn all<Q: DeviceQueue>(x: &UsmArray<Q>) -> Result<bool> {
    let literal = x.to_literal()?;
    Ok(literal.scalars()?.iter().all(|s| s.to_bool()))
}

/// Whether every element of `x` numerically equals `expected`.
pub fn all_equal_scalar<Q: DeviceQueue>(x: &UsmArray<Q>, expected: Scalar) -> Result<bool> {
    let literal = x.to_literal()?;
    Ok(literal
        .scalars()?
        .iter()
        .all(|s| s.numerically_equals(expected)))
}
