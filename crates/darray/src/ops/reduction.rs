//! Sum and product reductions.

use anyhow::{bail, ensure, Context, Result};

use crate::array::layout::{normalize_axes, reduced_shape};
use crate::array::usm_array::UsmArray;
use crate::device::promote::default_reduction_dtype;
use crate::device::spec::{ArraySpec, DType, DeviceQueue, ReduceKind, ReduceSpec};
use crate::env;

fn reduce<Q: DeviceQueue>(
    kind: ReduceKind,
    x: &UsmArray<Q>,
    axes: Option<&[isize]>,
    dtype: Option<DType>,
    keepdims: bool,
) -> Result<UsmArray<Q>> {
    let rank = x.rank();
    let axes = match axes {
        Some(axes) => normalize_axes(axes, rank)?,
        None => (0..rank).collect(),
    };
    let out_dtype = match dtype {
        Some(requested) => {
            if requested == DType::Bool {
                bail!("boolean output dtype is not supported for reductions");
            }
            requested
        }
        None => default_reduction_dtype(x.dtype()),
    };
    let out_shape = reduced_shape(x.shape(), &axes, keepdims);
    let out_spec = ArraySpec::new(out_dtype, out_shape.clone());
    let spec = ReduceSpec {
        kind,
        axes,
        keepdims,
        out_dtype,
    };
    let buffer = x
        .queue()
        .reduce(x.view(), &spec, &out_spec)
        .context("reduction kernel failed")?;
    let result = UsmArray::from_parts(x.queue(), out_dtype, out_shape, buffer);
    if env::paranoid_checks_enabled() {
        let literal = result.to_literal()?;
        ensure!(
            literal.byte_len() == out_spec.byte_len(),
            "reduction produced {} bytes, expected {}",
            literal.byte_len(),
            out_spec.byte_len()
        );
    }
    Ok(result)
}

/// Sums `x` over `axes` (all axes when `None`).
///
/// Without an explicit `dtype`, boolean and signed inputs accumulate into
/// `Si64`, unsigned inputs into `Ui64`, and float/complex inputs keep their
/// dtype. The result is a fresh dense array on the input's queue; reducing
/// over every axis yields a 0-d array.
pub fn sum<Q: DeviceQueue>(
    x: &UsmArray<Q>,
    axes: Option<&[isize]>,
    dtype: Option<DType>,
    keepdims: bool,
) -> Result<UsmArray<Q>> {
    reduce(ReduceKind::Sum, x, axes, dtype, keepdims)
}

/// Multiplies `x` over `axes` (all axes when `None`).
///
/// Dtype selection matches [`sum`]; an empty reduction yields the
/// multiplicative identity.
pub fn prod<Q: DeviceQueue>(
    x: &UsmArray<Q>,
    axes: Option<&[isize]>,
    dtype: Option<DType>,
    keepdims: bool,
) -> Result<UsmArray<Q>> {
    reduce(ReduceKind::Prod, x, axes, dtype, keepdims)
}
