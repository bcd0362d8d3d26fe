//! Device-resident n-dimensional arrays.

use std::fmt;
use std::sync::Arc;

use anyhow::{bail, ensure, Context, Result};

use crate::array::layout::{Layout, Shape, Slice};
use crate::device::spec::{ArrayInit, ArrayLiteral, ArraySpec, DType, DeviceQueue, Scalar, ViewRef};

/// An n-dimensional array whose storage lives on a device queue.
///
/// The array owns a shared buffer handle plus the logical geometry to read
/// it with. View operations (`slice_axis`, `permute_dims`, `index_axis`)
/// share the buffer and only rewrite the geometry.
pub struct UsmArray<Q: DeviceQueue> {
    queue: Arc<Q>,
    dtype: DType,
    shape: Shape,
    layout: Layout,
    buffer: Q::BufferHandle,
}

impl<Q: DeviceQueue> Clone for UsmArray<Q> {
    fn clone(&self) -> Self {
        Self {
            queue: Arc::clone(&self.queue),
            dtype: self.dtype,
            shape: self.shape.clone(),
            layout: self.layout.clone(),
            buffer: self.buffer.clone(),
        }
    }
}

impl<Q: DeviceQueue> fmt::Debug for UsmArray<Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UsmArray")
            .field("queue", &self.queue.queue_name())
            .field("dtype", &self.dtype)
            .field("dims", &self.shape.dims())
            .finish()
    }
}

impl<Q: DeviceQueue> UsmArray<Q> {
    /// Uploads a host literal onto `queue`.
    pub fn from_literal(queue: &Arc<Q>, literal: ArrayLiteral) -> Result<Self> {
        let dtype = literal.spec.dtype;
        let shape = literal.spec.shape.clone();
        let buffer = queue
            .materialize(ArrayInit::Literal(literal))
            .context("failed to materialize literal")?;
        Ok(Self::from_parts(queue, dtype, shape, buffer))
    }

    /// Allocates a dense array filled with `value` converted to `dtype`.
    pub fn filled(queue: &Arc<Q>, dtype: DType, shape: Shape, value: Scalar) -> Result<Self> {
        shape.checked_num_elements()?;
        let spec = ArraySpec::new(dtype, shape.clone());
        let buffer = queue
            .materialize(ArrayInit::Fill { spec, value })
            .context("failed to materialize fill")?;
        Ok(Self::from_parts(queue, dtype, shape, buffer))
    }

    /// Wraps an existing queue buffer in a dense array.
    pub fn from_parts(queue: &Arc<Q>, dtype: DType, shape: Shape, buffer: Q::BufferHandle) -> Self {
        let layout = Layout::contiguous(&shape);
        Self {
            queue: Arc::clone(queue),
            dtype,
            shape,
            layout,
            buffer,
        }
    }

    pub fn queue(&self) -> &Arc<Q> {
        &self.queue
    }

    pub fn dtype(&self) -> DType {
        self.dtype
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn dims(&self) -> &[usize] {
        self.shape.dims()
    }

    pub fn rank(&self) -> usize {
        self.shape.rank()
    }

    pub fn num_elements(&self) -> usize {
        self.shape.num_elements()
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Whether `other` shares this array's queue.
    pub fn same_queue(&self, other: &UsmArray<Q>) -> bool {
        Arc::ptr_eq(&self.queue, &other.queue)
    }

    /// Borrowed view handed to queue kernels.
    pub fn view(&self) -> ViewRef<'_, Q::BufferHandle> {
        ViewRef {
            buffer: &self.buffer,
            dtype: self.dtype,
            shape: &self.shape,
            layout: &self.layout,
        }
    }

    /// Gathers the array into a contiguous host literal.
    pub fn to_literal(&self) -> Result<ArrayLiteral> {
        let literal = self
            .queue
            .to_literal(self.view())
            .context("failed to read back array")?;
        Ok(literal)
    }

    /// Reads back the single element of a 0-d array.
    pub fn item(&self) -> Result<Scalar> {
        ensure!(
            self.rank() == 0,
            "item() requires a 0-d array, got shape {:?}",
            self.dims()
        );
        let literal = self.to_literal()?;
        literal.scalar_at(0)
    }

    /// Restrides one axis with `start:stop:step` semantics; zero-copy.
    pub fn slice_axis(&self, axis: usize, slice: Slice) -> Result<Self> {
        ensure!(
            axis < self.rank(),
            "axis {axis} out of bounds for rank {}",
            self.rank()
        );
        let len = self.dims()[axis];
        let (start, count) = slice.resolve(len)?;
        let mut dims = self.dims().to_vec();
        let mut layout = self.layout.clone();
        dims[axis] = count;
        if count > 0 {
            layout.offset =
                (layout.offset as isize + start as isize * layout.strides[axis]) as usize;
        }
        layout.strides[axis] *= slice.step;
        Ok(Self {
            queue: Arc::clone(&self.queue),
            dtype: self.dtype,
            shape: Shape::new(dims),
            layout,
            buffer: self.buffer.clone(),
        })
    }

    /// Selects a single index along `axis`, dropping that axis; zero-copy.
    pub fn index_axis(&self, axis: usize, index: usize) -> Result<Self> {
        ensure!(
            axis < self.rank(),
            "axis {axis} out of bounds for rank {}",
            self.rank()
        );
        let len = self.dims()[axis];
        ensure!(index < len, "index {index} out of bounds for axis of length {len}");
        let mut dims = self.dims().to_vec();
        let mut strides = self.layout.strides.clone();
        let offset =
            (self.layout.offset as isize + index as isize * strides[axis]) as usize;
        dims.remove(axis);
        strides.remove(axis);
        Ok(Self {
            queue: Arc::clone(&self.queue),
            dtype: self.dtype,
            shape: Shape::new(dims),
            layout: Layout { offset, strides },
            buffer: self.buffer.clone(),
        })
    }

    /// Reorders axes by `perm`; zero-copy.
    pub fn permute_dims(&self, perm: &[usize]) -> Result<Self> {
        ensure!(
            perm.len() == self.rank(),
            "permutation of length {} does not match rank {}",
            perm.len(),
            self.rank()
        );
        let mut seen = vec![false; perm.len()];
        for &axis in perm {
            ensure!(
                axis < perm.len(),
                "permutation entry {axis} out of bounds for rank {}",
                perm.len()
            );
            ensure!(!seen[axis], "permutation repeats axis {axis}");
            seen[axis] = true;
        }
        let dims = perm.iter().map(|&a| self.dims()[a]).collect();
        let strides = perm.iter().map(|&a| self.layout.strides[a]).collect();
        Ok(Self {
            queue: Arc::clone(&self.queue),
            dtype: self.dtype,
            shape: Shape::new(dims),
            layout: Layout {
                offset: self.layout.offset,
                strides,
            },
            buffer: self.buffer.clone(),
        })
    }

    /// Reinterprets the array with new dimensions of equal element count.
    ///
    /// Contiguous arrays reshape without copying; strided views are gathered
    /// through the queue first.
    pub fn reshape(&self, dims: &[usize]) -> Result<Self> {
        let shape = Shape::new(dims.to_vec());
        if shape.checked_num_elements()? != self.num_elements() {
            bail!(
                "cannot reshape {:?} into {:?}: element counts differ",
                self.dims(),
                dims
            );
        }
        if self.layout.is_contiguous(&self.shape) {
            return Ok(Self {
                queue: Arc::clone(&self.queue),
                dtype: self.dtype,
                shape: shape.clone(),
                layout: Layout::contiguous(&shape),
                buffer: self.buffer.clone(),
            });
        }
        let mut literal = self.to_literal()?;
        literal.spec.shape = shape;
        UsmArray::from_literal(&self.queue, literal)
    }
}
