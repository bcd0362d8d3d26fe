//! Logical geometry of device arrays: shapes, strided layouts, and the
//! axis/slice arithmetic shared by the frontend and queue kernels.

use anyhow::{bail, ensure, Result};
use serde::{Deserialize, Serialize};

/// Dimensions of an array. Rank may be zero (a scalar array).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Shape {
    dims: Vec<usize>,
}

impl Shape {
    pub fn new(dims: Vec<usize>) -> Self {
        Self { dims }
    }

    /// The 0-d shape.
    pub fn scalar() -> Self {
        Self { dims: Vec::new() }
    }

    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Product of dimensions; the empty product for rank 0 is 1.
    pub fn num_elements(&self) -> usize {
        self.dims.iter().product()
    }

    /// Overflow-checked element count.
    pub fn checked_num_elements(&self) -> Result<usize> {
        let mut total: usize = 1;
        for &dim in &self.dims {
            total = match total.checked_mul(dim) {
                Some(v) => v,
                None => bail!("shape {:?} overflows the addressable element count", self.dims),
            };
        }
        Ok(total)
    }
}

impl From<&[usize]> for Shape {
    fn from(dims: &[usize]) -> Self {
        Shape::new(dims.to_vec())
    }
}

/// Element-granular strided addressing over a linear buffer.
///
/// Strides may be negative; `offset` indexes the first logical element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Layout {
    pub offset: usize,
    pub strides: Vec<isize>,
}

impl Layout {
    /// Row-major contiguous layout for `shape` with offset zero.
    pub fn contiguous(shape: &Shape) -> Self {
        let dims = shape.dims();
        let mut strides = vec![0isize; dims.len()];
        let mut acc = 1isize;
        for (stride, &dim) in strides.iter_mut().zip(dims.iter()).rev() {
            *stride = acc;
            acc *= dim as isize;
        }
        Self { offset: 0, strides }
    }

    /// Whether the layout is the row-major contiguous layout for `shape`.
    pub fn is_contiguous(&self, shape: &Shape) -> bool {
        self.offset == 0 && self.strides == Layout::contiguous(shape).strides
    }

    /// Linear buffer index of the element at `coords`.
    ///
    /// Callers guarantee coords are in bounds for the associated shape, which
    /// keeps the signed arithmetic from going negative.
    pub fn linear_index(&self, coords: &[usize]) -> usize {
        debug_assert_eq!(coords.len(), self.strides.len());
        let mut index = self.offset as isize;
        for (&coord, &stride) in coords.iter().zip(self.strides.iter()) {
            index += coord as isize * stride;
        }
        index as usize
    }
}

/// Resolves possibly-negative axis indices against `rank`.
///
/// Output axes are unique, in-bounds, and sorted ascending.
pub fn normalize_axes(axes: &[isize], rank: usize) -> Result<Vec<usize>> {
    let mut resolved = Vec::with_capacity(axes.len());
    for &axis in axes {
        let adjusted = if axis < 0 { axis + rank as isize } else { axis };
        ensure!(
            adjusted >= 0 && (adjusted as usize) < rank,
            "axis {axis} is out of bounds for rank {rank}"
        );
        resolved.push(adjusted as usize);
    }
    resolved.sort_unstable();
    for pair in resolved.windows(2) {
        ensure!(pair[0] != pair[1], "duplicate reduction axis {}", pair[0]);
    }
    Ok(resolved)
}

/// Shape remaining after reducing `sorted_axes` out of `shape`.
///
/// With `keepdims` the reduced axes stay as size-1 dimensions.
pub fn reduced_shape(shape: &Shape, sorted_axes: &[usize], keepdims: bool) -> Shape {
    let mut dims = Vec::with_capacity(shape.rank());
    for (axis, &dim) in shape.dims().iter().enumerate() {
        if sorted_axes.binary_search(&axis).is_ok() {
            if keepdims {
                dims.push(1);
            }
        } else {
            dims.push(dim);
        }
    }
    Shape::new(dims)
}

/// One-axis slice with `start:stop:step` semantics.
///
/// `None` bounds take the direction-dependent defaults: for a positive step
/// the slice runs from the front, for a negative step from the back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slice {
    pub start: Option<isize>,
    pub stop: Option<isize>,
    pub step: isize,
}

impl Slice {
    pub fn new(start: Option<isize>, stop: Option<isize>, step: isize) -> Self {
        Self { start, stop, step }
    }

    /// Resolves the slice against an axis of length `len`.
    ///
    /// Returns `(start, count)`: the first selected index and the number of
    /// selected elements. `count` may be zero, in which case `start` must not
    /// be dereferenced.
    pub fn resolve(&self, len: usize) -> Result<(usize, usize)> {
        ensure!(self.step != 0, "slice step must be nonzero");
        let len = len as isize;
        let clamp = |bound: isize, lo: isize, hi: isize| -> isize {
            let adjusted = if bound < 0 { bound + len } else { bound };
            adjusted.max(lo).min(hi)
        };
        let (start, stop) = if self.step > 0 {
            let start = clamp(self.start.unwrap_or(0), 0, len);
            let stop = clamp(self.stop.unwrap_or(len), 0, len);
            (start, stop)
        } else {
            let start = clamp(self.start.unwrap_or(len - 1), -1, len - 1);
            let stop = clamp(self.stop.unwrap_or(-len - 1), -1, len - 1);
            (start, stop)
        };
        let count = if self.step > 0 {
            (stop - start + self.step - 1) / self.step
        } else {
            (stop - start + self.step + 1) / self.step
        };
        let count = count.max(0) as usize;
        let start = if count == 0 { 0 } else { start as usize };
        Ok((start, count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contiguous_strides_are_row_major() {
        let shape = Shape::new(vec![3, 4, 5]);
        let layout = Layout::contiguous(&shape);
        assert_eq!(layout.strides, vec![20, 5, 1]);
        assert!(layout.is_contiguous(&shape));
    }

    #[test]
    fn scalar_layout_is_contiguous() {
        let shape = Shape::scalar();
        let layout = Layout::contiguous(&shape);
        assert!(layout.strides.is_empty());
        assert_eq!(layout.linear_index(&[]), 0);
    }

    #[test]
    fn normalize_axes_handles_negatives_and_rejects_duplicates() {
        assert_eq!(normalize_axes(&[1, 2, -1], 5).unwrap(), vec![1, 2, 4]);
        assert!(normalize_axes(&[5], 5).is_err());
        assert!(normalize_axes(&[0, -5], 5).is_err());
    }

    #[test]
    fn reduced_shape_respects_keepdims() {
        let shape = Shape::new(vec![3, 4, 5, 6, 7]);
        assert_eq!(
            reduced_shape(&shape, &[1, 2, 4], false).dims(),
            &[3usize, 6]
        );
        assert_eq!(
            reduced_shape(&shape, &[1, 2, 4], true).dims(),
            &[3usize, 1, 1, 6, 1]
        );
    }

    #[test]
    fn negative_step_slice_matches_indexing_rules() {
        // a[:1:-2] over 200 elements selects 199, 197, ..., 3.
        let slice = Slice::new(None, Some(1), -2);
        let (start, count) = slice.resolve(200).unwrap();
        assert_eq!(start, 199);
        assert_eq!(count, 99);
    }

    #[test]
    fn positive_step_slice_counts_are_exact() {
        let slice = Slice::new(Some(2), Some(9), 3);
        let (start, count) = slice.resolve(10).unwrap();
        assert_eq!(start, 2);
        assert_eq!(count, 3);
    }

    #[test]
    fn empty_slice_has_zero_count() {
        let slice = Slice::new(Some(5), Some(5), 1);
        let (_, count) = slice.resolve(10).unwrap();
        assert_eq!(count, 0);
        let slice = Slice::new(Some(1), Some(5), -1);
        let (_, count) = slice.resolve(10).unwrap();
        assert_eq!(count, 0);
    }
}
