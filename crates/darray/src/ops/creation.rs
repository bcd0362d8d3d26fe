//! Array constructors.

use std::sync::Arc;

use anyhow::{ensure, Result};

use crate::array::layout::Shape;
use crate::array::literal::Element;
use crate::array::usm_array::UsmArray;
use crate::device::spec::{ArrayLiteral, DType, DeviceQueue, Scalar};

/// Allocates an array of `dims` filled with `value` converted to `dtype`.
pub fn full<Q: DeviceQueue>(
    queue: &Arc<Q>,
    dims: &[usize],
    dtype: DType,
    value: Scalar,
) -> Result<UsmArray<Q>> {
    UsmArray::filled(queue, dtype, Shape::new(dims.to_vec()), value)
}

/// Allocates an array of ones.
pub fn ones<Q: DeviceQueue>(queue: &Arc<Q>, dims: &[usize], dtype: DType) -> Result<UsmArray<Q>> {
    full(queue, dims, dtype, Scalar::one_for(dtype))
}

/// Allocates an array of zeros.
pub fn zeros<Q: DeviceQueue>(queue: &Arc<Q>, dims: &[usize], dtype: DType) -> Result<UsmArray<Q>> {
    full(queue, dims, dtype, Scalar::zero_for(dtype))
}

/// Allocates an array without a defined fill value. Element contents are
/// unspecified until written.
pub fn empty<Q: DeviceQueue>(queue: &Arc<Q>, dims: &[usize], dtype: DType) -> Result<UsmArray<Q>> {
    full(queue, dims, dtype, Scalar::zero_for(dtype))
}

/// Uploads typed host data as a dense array.
pub fn asarray<Q: DeviceQueue, E: Element>(
    queue: &Arc<Q>,
    dims: &[usize],
    values: Vec<E>,
) -> Result<UsmArray<Q>> {
    let literal = ArrayLiteral::from_elements(dims, values)?;
    UsmArray::from_literal(queue, literal)
}

/// Builds the half-open integer range `start..stop` with stride `step`,
/// converted to `dtype`.
pub fn arange<Q: DeviceQueue>(
    queue: &Arc<Q>,
    start: i64,
    stop: i64,
    step: i64,
    dtype: DType,
) -> Result<UsmArray<Q>> {
    ensure!(step != 0, "arange step must be nonzero");
    let mut values = Vec::new();
    let mut current = start;
    if step > 0 {
        while current < stop {
            values.push(Scalar::Int(current));
            current += step;
        }
    } else {
        while current > stop {
            values.push(Scalar::Int(current));
            current += step;
        }
    }
    let dims = [values.len()];
    let literal = ArrayLiteral::from_scalars(dtype, &dims, &values)?;
    UsmArray::from_literal(queue, literal)
}
