//! Single-threaded reference queue.
//!
//! Every kernel walks logical coordinates through the view's strided layout
//! and works on host scalars, trading speed for an implementation that is
//! easy to audit and compare other queues against.

use std::sync::Arc;

use half::f16;
use num_complex::{Complex32, Complex64};
use once_cell::sync::Lazy;

use darray::device::promote::reduction_identity;
use darray::device::spec::{
    ArrayInit, ArrayLiteral, ArraySpec, DType, DeviceQueue, Kind, QueueError, QueueResult,
    ReduceKind, ReduceSpec, Scalar, ViewRef,
};

/// Typed storage behind a [`CpuBuffer`].
///
/// `Bool` stores zero/one bytes; it is distinct from `Ui8` so dtype checks
/// stay exact.
#[derive(Debug, Clone)]
pub enum BufferData {
    Bool(Arc<[u8]>),
    Si8(Arc<[i8]>),
    Ui8(Arc<[u8]>),
    Si16(Arc<[i16]>),
    Ui16(Arc<[u16]>),
    Si32(Arc<[i32]>),
    Ui32(Arc<[u32]>),
    Si64(Arc<[i64]>),
    Ui64(Arc<[u64]>),
    F16(Arc<[f16]>),
    F32(Arc<[f32]>),
    F64(Arc<[f64]>),
    Cf32(Arc<[Complex32]>),
    Cf64(Arc<[Complex64]>),
}

impl BufferData {
    pub fn len(&self) -> usize {
        match self {
            BufferData::Bool(v) => v.len(),
            BufferData::Si8(v) => v.len(),
            BufferData::Ui8(v) => v.len(),
            BufferData::Si16(v) => v.len(),
            BufferData::Ui16(v) => v.len(),
            BufferData::Si32(v) => v.len(),
            BufferData::Ui32(v) => v.len(),
            BufferData::Si64(v) => v.len(),
            BufferData::Ui64(v) => v.len(),
            BufferData::F16(v) => v.len(),
            BufferData::F32(v) => v.len(),
            BufferData::F64(v) => v.len(),
            BufferData::Cf32(v) => v.len(),
            BufferData::Cf64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dtype(&self) -> DType {
        match self {
            BufferData::Bool(_) => DType::Bool,
            BufferData::Si8(_) => DType::Si8,
            BufferData::Ui8(_) => DType::Ui8,
            BufferData::Si16(_) => DType::Si16,
            BufferData::Ui16(_) => DType::Ui16,
            BufferData::Si32(_) => DType::Si32,
            BufferData::Ui32(_) => DType::Ui32,
            BufferData::Si64(_) => DType::Si64,
            BufferData::Ui64(_) => DType::Ui64,
            BufferData::F16(_) => DType::F16,
            BufferData::F32(_) => DType::F32,
            BufferData::F64(_) => DType::F64,
            BufferData::Cf32(_) => DType::Cf32,
            BufferData::Cf64(_) => DType::Cf64,
        }
    }

    fn from_scalars(dtype: DType, values: &[Scalar]) -> BufferData {
        match dtype {
            DType::Bool => BufferData::Bool(values.iter().map(|v| v.to_bool() as u8).collect()),
            DType::Si8 => BufferData::Si8(values.iter().map(|v| v.to_i64() as i8).collect()),
            DType::Ui8 => BufferData::Ui8(values.iter().map(|v| v.to_u64() as u8).collect()),
            DType::Si16 => BufferData::Si16(values.iter().map(|v| v.to_i64() as i16).collect()),
            DType::Ui16 => BufferData::Ui16(values.iter().map(|v| v.to_u64() as u16).collect()),
            DType::Si32 => BufferData::Si32(values.iter().map(|v| v.to_i64() as i32).collect()),
            DType::Ui32 => BufferData::Ui32(values.iter().map(|v| v.to_u64() as u32).collect()),
            DType::Si64 => BufferData::Si64(values.iter().map(|v| v.to_i64()).collect()),
            DType::Ui64 => BufferData::Ui64(values.iter().map(|v| v.to_u64()).collect()),
            DType::F16 => {
                BufferData::F16(values.iter().map(|v| f16::from_f64(v.to_f64())).collect())
            }
            DType::F32 => BufferData::F32(values.iter().map(|v| v.to_f64() as f32).collect()),
            DType::F64 => BufferData::F64(values.iter().map(|v| v.to_f64()).collect()),
            DType::Cf32 => BufferData::Cf32(
                values
                    .iter()
                    .map(|v| {
                        let (re, im) = v.to_complex();
                        Complex32::new(re as f32, im as f32)
                    })
                    .collect(),
            ),
            DType::Cf64 => BufferData::Cf64(
                values
                    .iter()
                    .map(|v| {
                        let (re, im) = v.to_complex();
                        Complex64::new(re, im)
                    })
                    .collect(),
            ),
        }
    }

    fn scalar_at(&self, index: usize) -> Scalar {
        match self {
            BufferData::Bool(v) => Scalar::Bool(v[index] != 0),
            BufferData::Si8(v) => Scalar::Int(v[index] as i64),
            BufferData::Ui8(v) => Scalar::Uint(v[index] as u64),
            BufferData::Si16(v) => Scalar::Int(v[index] as i64),
            BufferData::Ui16(v) => Scalar::Uint(v[index] as u64),
            BufferData::Si32(v) => Scalar::Int(v[index] as i64),
            BufferData::Ui32(v) => Scalar::Uint(v[index] as u64),
            BufferData::Si64(v) => Scalar::Int(v[index]),
            BufferData::Ui64(v) => Scalar::Uint(v[index]),
            BufferData::F16(v) => Scalar::Float(v[index].to_f64()),
            BufferData::F32(v) => Scalar::Float(v[index] as f64),
            BufferData::F64(v) => Scalar::Float(v[index]),
            BufferData::Cf32(v) => Scalar::Complex {
                re: v[index].re as f64,
                im: v[index].im as f64,
            },
            BufferData::Cf64(v) => Scalar::Complex {
                re: v[index].re,
                im: v[index].im,
            },
        }
    }
}

/// Buffer handle produced by [`CpuQueue`].
#[derive(Debug, Clone)]
pub struct CpuBuffer {
    dtype: DType,
    data: BufferData,
}

impl CpuBuffer {
    pub fn dtype(&self) -> DType {
        self.dtype
    }

    pub fn data(&self) -> &BufferData {
        &self.data
    }
}

/// Reference CPU queue executing every kernel eagerly on the calling thread.
#[derive(Debug, Default)]
pub struct CpuQueue;

impl CpuQueue {
    pub fn new() -> Self {
        CpuQueue
    }
}

/// Returns the process-wide default CPU queue.
///
/// Arrays materialised through this handle share one placement, so they can
/// be combined without queue-mismatch errors.
pub fn default_queue() -> Arc<CpuQueue> {
    static QUEUE: Lazy<Arc<CpuQueue>> = Lazy::new(|| Arc::new(CpuQueue::new()));
    Arc::clone(&QUEUE)
}

fn unravel_index(mut flat: usize, dims: &[usize], coords: &mut [usize]) {
    for (coord, &dim) in coords.iter_mut().zip(dims.iter()).rev() {
        *coord = flat % dim;
        flat /= dim;
    }
}

fn view_scalars(view: &ViewRef<'_, CpuBuffer>) -> Vec<Scalar> {
    let dims = view.shape.dims();
    let total = view.shape.num_elements();
    let mut coords = vec![0usize; dims.len()];
    let mut out = Vec::with_capacity(total);
    for flat in 0..total {
        unravel_index(flat, dims, &mut coords);
        out.push(view.buffer.data.scalar_at(view.layout.linear_index(&coords)));
    }
    out
}

enum Accum {
    Int(i64),
    Uint(u64),
    Float(f64),
    Complex { re: f64, im: f64 },
}

impl Accum {
    fn identity(kind: ReduceKind, out_dtype: DType) -> Accum {
        match reduction_identity(kind, out_dtype) {
            Scalar::Int(v) => Accum::Int(v),
            Scalar::Uint(v) => Accum::Uint(v),
            Scalar::Float(v) => Accum::Float(v),
            Scalar::Complex { re, im } => Accum::Complex { re, im },
            Scalar::Bool(v) => Accum::Int(v as i64),
        }
    }

    // Integer accumulators wrap on overflow, matching two's-complement
    // device arithmetic.
    fn combine(&mut self, kind: ReduceKind, value: Scalar) {
        match self {
            Accum::Int(acc) => {
                let v = value.to_i64();
                *acc = match kind {
                    ReduceKind::Sum => acc.wrapping_add(v),
                    ReduceKind::Prod => acc.wrapping_mul(v),
                };
            }
            Accum::Uint(acc) => {
                let v = value.to_u64();
                *acc = match kind {
                    ReduceKind::Sum => acc.wrapping_add(v),
                    ReduceKind::Prod => acc.wrapping_mul(v),
                };
            }
            Accum::Float(acc) => {
                let v = value.to_f64();
                *acc = match kind {
                    ReduceKind::Sum => *acc + v,
                    ReduceKind::Prod => *acc * v,
                };
            }
            Accum::Complex { re, im } => {
                let (vre, vim) = value.to_complex();
                match kind {
                    ReduceKind::Sum => {
                        *re += vre;
                        *im += vim;
                    }
                    ReduceKind::Prod => {
                        let new_re = *re * vre - *im * vim;
                        let new_im = *re * vim + *im * vre;
                        *re = new_re;
                        *im = new_im;
                    }
                }
            }
        }
    }

    fn finish(self) -> Scalar {
        match self {
            Accum::Int(v) => Scalar::Int(v),
            Accum::Uint(v) => Scalar::Uint(v),
            Accum::Float(v) => Scalar::Float(v),
            Accum::Complex { re, im } => Scalar::Complex { re, im },
        }
    }
}

fn materialize_buffer(spec: &ArraySpec, values: &[Scalar]) -> QueueResult<CpuBuffer> {
    if values.len() != spec.num_elements() {
        return Err(QueueError::spec(format!(
            "init holds {} elements, spec {:?} expects {}",
            values.len(),
            spec,
            spec.num_elements()
        )));
    }
    Ok(CpuBuffer {
        dtype: spec.dtype,
        data: BufferData::from_scalars(spec.dtype, values),
    })
}

impl DeviceQueue for CpuQueue {
    type BufferHandle = CpuBuffer;

    fn queue_name(&self) -> &str {
        "cpu-reference"
    }

    fn materialize(&self, init: ArrayInit) -> QueueResult<CpuBuffer> {
        match init {
            ArrayInit::Literal(literal) => {
                let values = literal
                    .scalars()
                    .map_err(|e| QueueError::spec(e.to_string()))?;
                materialize_buffer(&literal.spec, &values)
            }
            ArrayInit::Fill { spec, value } => {
                let values = vec![value; spec.num_elements()];
                materialize_buffer(&spec, &values)
            }
        }
    }

    fn to_literal(&self, view: ViewRef<'_, CpuBuffer>) -> QueueResult<ArrayLiteral> {
        if view.dtype != view.buffer.dtype {
            return Err(QueueError::spec(format!(
                "view dtype {:?} does not match buffer dtype {:?}",
                view.dtype, view.buffer.dtype
            )));
        }
        let values = view_scalars(&view);
        ArrayLiteral::from_scalars(view.dtype, view.shape.dims(), &values)
            .map_err(|e| QueueError::execution(e.to_string()))
    }

    fn reduce(
        &self,
        view: ViewRef<'_, CpuBuffer>,
        spec: &ReduceSpec,
        out: &ArraySpec,
    ) -> QueueResult<CpuBuffer> {
        if spec.out_dtype.kind() == Kind::Bool {
            return Err(QueueError::unimplemented(
                "reduce",
                "boolean accumulators are not supported",
            ));
        }
        if spec.out_dtype != out.dtype {
            return Err(QueueError::spec(format!(
                "reduce out dtype {:?} does not match output spec {:?}",
                spec.out_dtype, out.dtype
            )));
        }
        let dims = view.shape.dims();
        let rank = dims.len();
        for &axis in &spec.axes {
            if axis >= rank {
                return Err(QueueError::spec(format!(
                    "reduction axis {axis} out of bounds for rank {rank}"
                )));
            }
        }

        let kept_axes: Vec<usize> = (0..rank)
            .filter(|a| spec.axes.binary_search(a).is_err())
            .collect();
        let kept_dims: Vec<usize> = kept_axes.iter().map(|&a| dims[a]).collect();
        let red_dims: Vec<usize> = spec.axes.iter().map(|&a| dims[a]).collect();
        let out_count: usize = kept_dims.iter().product();
        let red_count: usize = red_dims.iter().product();
        if out.num_elements() != out_count {
            return Err(QueueError::spec(format!(
                "output spec {:?} does not hold {out_count} reduced elements",
                out
            )));
        }

        // Output flat order over kept axes matches the reduced shape's
        // row-major order, with or without keepdims.
        let mut kept_coords = vec![0usize; kept_axes.len()];
        let mut red_coords = vec![0usize; spec.axes.len()];
        let mut full_coords = vec![0usize; rank];
        let mut results = Vec::with_capacity(out_count);
        for out_flat in 0..out_count {
            unravel_index(out_flat, &kept_dims, &mut kept_coords);
            for (&axis, &coord) in kept_axes.iter().zip(kept_coords.iter()) {
                full_coords[axis] = coord;
            }
            let mut acc = Accum::identity(spec.kind, spec.out_dtype);
            for red_flat in 0..red_count {
                unravel_index(red_flat, &red_dims, &mut red_coords);
                for (&axis, &coord) in spec.axes.iter().zip(red_coords.iter()) {
                    full_coords[axis] = coord;
                }
                let value = view
                    .buffer
                    .data
                    .scalar_at(view.layout.linear_index(&full_coords));
                acc.combine(spec.kind, value);
            }
            results.push(acc.finish());
        }
        materialize_buffer(out, &results)
    }

    fn compare_equal(
        &self,
        lhs: ViewRef<'_, CpuBuffer>,
        rhs: ViewRef<'_, CpuBuffer>,
        out: &ArraySpec,
    ) -> QueueResult<CpuBuffer> {
        if lhs.shape.dims() != rhs.shape.dims() {
            return Err(QueueError::spec(format!(
                "compare_equal shapes {:?} and {:?} differ",
                lhs.shape.dims(),
                rhs.shape.dims()
            )));
        }
        if out.dtype != DType::Bool || out.shape.dims() != lhs.shape.dims() {
            return Err(QueueError::spec(format!(
                "compare_equal output spec {:?} must be Bool with shape {:?}",
                out,
                lhs.shape.dims()
            )));
        }
        let dims = lhs.shape.dims();
        let total = lhs.shape.num_elements();
        let mut coords = vec![0usize; dims.len()];
        let mut results = Vec::with_capacity(total);
        for flat in 0..total {
            unravel_index(flat, dims, &mut coords);
            let a = lhs.buffer.data.scalar_at(lhs.layout.linear_index(&coords));
            let b = rhs.buffer.data.scalar_at(rhs.layout.linear_index(&coords));
            results.push(Scalar::Bool(a.numerically_equals(b)));
        }
        materialize_buffer(out, &results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use darray::array::layout::{Layout, Shape};

    fn dense(dtype: DType, dims: &[usize], values: &[Scalar]) -> (CpuBuffer, Shape, Layout) {
        let shape = Shape::new(dims.to_vec());
        let layout = Layout::contiguous(&shape);
        let queue = CpuQueue::new();
        let literal = ArrayLiteral::from_scalars(dtype, dims, values).unwrap();
        let buffer = queue.materialize(ArrayInit::Literal(literal)).unwrap();
        (buffer, shape, layout)
    }

    #[test]
    fn full_reduction_over_strided_view_visits_every_element() {
        let values: Vec<Scalar> = (0..6).map(Scalar::Int).collect();
        let (buffer, _, _) = dense(DType::Si32, &[2, 3], &values);
        // Transposed geometry over the same buffer.
        let shape = Shape::new(vec![3, 2]);
        let layout = Layout {
            offset: 0,
            strides: vec![1, 3],
        };
        let view = ViewRef {
            buffer: &buffer,
            dtype: DType::Si32,
            shape: &shape,
            layout: &layout,
        };
        let spec = ReduceSpec {
            kind: ReduceKind::Sum,
            axes: vec![0, 1],
            keepdims: false,
            out_dtype: DType::Si64,
        };
        let out = ArraySpec::new(DType::Si64, Shape::scalar());
        let queue = CpuQueue::new();
        let result = queue.reduce(view, &spec, &out).unwrap();
        assert_eq!(result.data.scalar_at(0), Scalar::Int(15));
    }

    #[test]
    fn empty_reduction_yields_the_identity() {
        let (buffer, shape, layout) = dense(DType::F32, &[0], &[]);
        let view = ViewRef {
            buffer: &buffer,
            dtype: DType::F32,
            shape: &shape,
            layout: &layout,
        };
        let queue = CpuQueue::new();
        for (kind, expected) in [
            (ReduceKind::Sum, Scalar::Float(0.0)),
            (ReduceKind::Prod, Scalar::Float(1.0)),
        ] {
            let spec = ReduceSpec {
                kind,
                axes: vec![0],
                keepdims: false,
                out_dtype: DType::F32,
            };
            let out = ArraySpec::new(DType::F32, Shape::scalar());
            let result = queue.reduce(view, &spec, &out).unwrap();
            assert_eq!(result.data.scalar_at(0), expected);
        }
    }

    #[test]
    fn boolean_accumulator_is_rejected() {
        let (buffer, shape, layout) = dense(DType::Bool, &[4], &[Scalar::Bool(true); 4]);
        let view = ViewRef {
            buffer: &buffer,
            dtype: DType::Bool,
            shape: &shape,
            layout: &layout,
        };
        let spec = ReduceSpec {
            kind: ReduceKind::Sum,
            axes: vec![0],
            keepdims: false,
            out_dtype: DType::Bool,
        };
        let out = ArraySpec::new(DType::Bool, Shape::scalar());
        let err = CpuQueue::new().reduce(view, &spec, &out).unwrap_err();
        assert!(matches!(err, QueueError::Unimplemented { .. }));
    }
}
