//! Naive host-side reductions used as ground truth by the conformance cases.

/// Reduces `values` (row-major over `dims`) along sorted `axes`.
///
/// Returns the reduced values in row-major order together with the reduced
/// dimensions (reduced axes dropped).
pub fn reduce_with<T: Copy>(
    values: &[T],
    dims: &[usize],
    axes: &[usize],
    identity: T,
    combine: impl Fn(T, T) -> T,
) -> (Vec<T>, Vec<usize>) {
    assert_eq!(values.len(), dims.iter().product::<usize>());
    let rank = dims.len();
    let kept_axes: Vec<usize> = (0..rank).filter(|a| !axes.contains(a)).collect();
    let kept_dims: Vec<usize> = kept_axes.iter().map(|&a| dims[a]).collect();
    let out_count: usize = kept_dims.iter().product();

    let strides: Vec<usize> = {
        let mut strides = vec![0usize; rank];
        let mut acc = 1;
        for axis in (0..rank).rev() {
            strides[axis] = acc;
            acc *= dims[axis];
        }
        strides
    };

    let mut out = vec![identity; out_count];
    let mut coords = vec![0usize; rank];
    for (flat, &value) in values.iter().enumerate() {
        let mut rem = flat;
        for axis in 0..rank {
            coords[axis] = rem / strides[axis];
            rem %= strides[axis];
        }
        let mut out_flat = 0;
        for (&axis, &dim) in kept_axes.iter().zip(kept_dims.iter()) {
            out_flat = out_flat * dim + coords[axis];
        }
        out[out_flat] = combine(out[out_flat], value);
    }
    (out, kept_dims)
}

/// Float sum along `axes`.
pub fn sum_f64(values: &[f64], dims: &[usize], axes: &[usize]) -> (Vec<f64>, Vec<usize>) {
    reduce_with(values, dims, axes, 0.0, |a, b| a + b)
}

/// Integer sum along `axes`, wrapping on overflow.
pub fn sum_i64(values: &[i64], dims: &[usize], axes: &[usize]) -> (Vec<i64>, Vec<usize>) {
    reduce_with(values, dims, axes, 0, |a, b| a.wrapping_add(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_sums_of_a_small_matrix() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let (out, dims) = sum_f64(&values, &[2, 3], &[1]);
        assert_eq!(dims, vec![2]);
        assert_eq!(out, vec![6.0, 15.0]);
    }

    #[test]
    fn full_reduction_collapses_to_one_value() {
        let values = [1i64, 2, 3, 4];
        let (out, dims) = sum_i64(&values, &[2, 2], &[0, 1]);
        assert!(dims.is_empty());
        assert_eq!(out, vec![10]);
    }
}
