//! Reduction conformance cases, generic over the queue under test.
//!
//! Each function takes a queue and asserts one behavior every conforming
//! implementation must show. Queues opt in through
//! [`define_queue_tests!`](crate::define_queue_tests).

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use darray::device::promote::default_reduction_dtype;
use darray::{ops, DType, DeviceQueue, Scalar, Slice};

use crate::host_ref;

/// Summing 100 ones yields 100 with the kind-preserving default out dtype.
pub fn sum_of_ones_preserves_kind<Q: DeviceQueue>(queue: &Arc<Q>) {
    for dtype in DType::all() {
        let x = ops::ones(queue, &[100], dtype).unwrap();
        let s = ops::sum(&x, None, None, false).unwrap();
        assert_eq!(s.dtype(), default_reduction_dtype(dtype), "input {dtype:?}");
        assert_eq!(s.rank(), 0);
        assert!(
            s.item().unwrap().numerically_equals(Scalar::Int(100)),
            "input {dtype:?} summed to {:?}",
            s.item().unwrap()
        );
    }
}

/// A reversed, strided view sums exactly its selected elements.
pub fn sum_over_reversed_stride_view<Q: DeviceQueue>(queue: &Arc<Q>) {
    let x = ops::ones(queue, &[200], DType::F32).unwrap();
    let v = x.slice_axis(0, Slice::new(None, Some(1), -2)).unwrap();
    assert_eq!(v.dims(), &[99]);
    let s = ops::sum(&v, None, None, false).unwrap();
    assert!(s.item().unwrap().numerically_equals(Scalar::Int(99)));
}

/// An explicitly requested out dtype is honored for every non-bool pairing,
/// including cross-kind ones (int to complex, complex to real).
pub fn sum_with_explicit_out_dtype<Q: DeviceQueue>(queue: &Arc<Q>) {
    for in_dtype in DType::all() {
        let x = ops::ones(queue, &[10], in_dtype).unwrap();
        for out_dtype in DType::all() {
            if out_dtype == DType::Bool {
                continue;
            }
            let s = ops::sum(&x, None, Some(out_dtype), false).unwrap();
            assert_eq!(s.dtype(), out_dtype, "input {in_dtype:?}");
            assert!(
                s.item().unwrap().numerically_equals(Scalar::Int(10)),
                "input {in_dtype:?} out {out_dtype:?}"
            );
        }
    }
}

/// A boolean out dtype is rejected.
pub fn boolean_out_dtype_is_rejected<Q: DeviceQueue>(queue: &Arc<Q>) {
    let x = ops::ones(queue, &[4], DType::Si32).unwrap();
    assert!(ops::sum(&x, None, Some(DType::Bool), false).is_err());
    assert!(ops::prod(&x, None, Some(DType::Bool), false).is_err());
}

/// Reducing a zero-element array yields a 0-d identity.
pub fn empty_reductions_yield_identities<Q: DeviceQueue>(queue: &Arc<Q>) {
    let x = ops::zeros(queue, &[0], DType::F64).unwrap();
    let s = ops::sum(&x, None, None, false).unwrap();
    assert_eq!(s.rank(), 0);
    assert_eq!(s.item().unwrap(), Scalar::Float(0.0));
    let p = ops::prod(&x, None, None, false).unwrap();
    assert_eq!(p.rank(), 0);
    assert_eq!(p.item().unwrap(), Scalar::Float(1.0));
}

/// Axis tuples (with negative entries) reduce the named axes only.
pub fn sum_over_axis_tuple<Q: DeviceQueue>(queue: &Arc<Q>) {
    let x = ops::ones(queue, &[3, 4, 5, 6, 7], DType::F32).unwrap();
    let s = ops::sum(&x, Some(&[1, 2, -1]), None, false).unwrap();
    assert_eq!(s.dims(), &[3, 6]);
    assert!(ops::all_equal_scalar(&s, Scalar::Int(140)).unwrap());

    let s = ops::sum(&x, Some(&[1, 2, -1]), None, true).unwrap();
    assert_eq!(s.dims(), &[3, 1, 1, 6, 1]);
    assert!(ops::all_equal_scalar(&s, Scalar::Int(140)).unwrap());
}

/// Reducing a 0-d array stays 0-d and on the input's queue.
pub fn scalar_sum_stays_on_queue<Q: DeviceQueue>(queue: &Arc<Q>) {
    let x = ops::ones(queue, &[], DType::F32).unwrap();
    let s = ops::sum(&x, None, None, false).unwrap();
    assert!(s.same_queue(&x));
    assert_eq!(s.rank(), 0);
    assert_eq!(s.item().unwrap(), Scalar::Float(1.0));
}

/// `keepdims` reductions of zero-size arrays keep size-1 and size-0 axes.
pub fn zero_size_keepdims_shapes<Q: DeviceQueue>(queue: &Arc<Q>) {
    let a = ops::ones(queue, &[10, 0, 10], DType::F32).unwrap();

    let s = ops::sum(&a, None, None, true).unwrap();
    assert_eq!(s.dims(), &[1, 1, 1]);
    assert!(ops::all_equal_scalar(&s, Scalar::Int(0)).unwrap());

    let s = ops::sum(&a, Some(&[0, 1]), None, true).unwrap();
    assert_eq!(s.dims(), &[1, 1, 10]);

    let s = ops::sum(&a, Some(&[1, 2]), None, true).unwrap();
    assert_eq!(s.dims(), &[10, 1, 1]);

    let s = ops::sum(&a, Some(&[0, 2]), None, true).unwrap();
    assert_eq!(s.dims(), &[1, 0, 1]);

    let row = a.index_axis(0, 0).unwrap();
    assert_eq!(row.dims(), &[0, 10]);
    let s = ops::sum(&row, None, None, true).unwrap();
    assert_eq!(s.dims(), &[1, 1]);
}

/// Different axis pairs over a symmetric array agree and count every slot.
pub fn axis_pair_sums_match_full_count<Q: DeviceQueue>(queue: &Arc<Q>) {
    let m = 5usize;
    for n in [1023usize, 1024, 1025] {
        let x = ops::ones(queue, &[m, n, m], DType::F32).unwrap();
        let s1 = ops::sum(&x, Some(&[0, 1]), None, false).unwrap();
        let s2 = ops::sum(&x, Some(&[1, 2]), None, false).unwrap();
        assert_eq!(s1.dims(), &[m]);
        assert_eq!(s2.dims(), &[m]);
        let expected = Scalar::Int((n * m) as i64);
        assert!(ops::all_equal_scalar(&s1, expected).unwrap(), "n={n}");
        assert!(ops::all_equal_scalar(&s2, expected).unwrap(), "n={n}");
    }
}

/// Axis indices refer to the view's logical axes, not buffer order.
pub fn transposed_view_reduces_logical_axes<Q: DeviceQueue>(queue: &Arc<Q>) {
    let x = ops::arange(queue, 0, 6, 1, DType::Si32)
        .unwrap()
        .reshape(&[1, 2, 3])
        .unwrap()
        .permute_dims(&[2, 1, 0])
        .unwrap();
    assert_eq!(x.dims(), &[3, 2, 1]);
    let s = ops::sum(&x, Some(&[2]), None, false).unwrap();
    assert_eq!(s.dims(), &[3, 2]);
    let expected = ops::asarray(queue, &[3, 2], vec![0i64, 3, 1, 4, 2, 5]).unwrap();
    let eq = ops::equal(&s, &expected).unwrap();
    assert!(ops::all(&eq).unwrap());
}

/// Product over a reversed stride picks up only the selected factors.
pub fn strided_prod_of_unsigned_factors<Q: DeviceQueue>(queue: &Arc<Q>) {
    let values: Vec<u32> = (0..20).map(|i| if i % 2 == 0 { 1 } else { 2 }).collect();
    let x = ops::asarray(queue, &[20], values).unwrap();
    let v = x.slice_axis(0, Slice::new(None, Some(1), -2)).unwrap();
    assert_eq!(v.dims(), &[9]);
    let p = ops::prod(&v, None, None, false).unwrap();
    assert_eq!(p.dtype(), DType::Ui64);
    assert_eq!(p.item().unwrap(), Scalar::Uint(512));
}

/// Product of an odd count of -1 factors is -1 in the widened signed dtype.
pub fn strided_prod_of_signed_factors<Q: DeviceQueue>(queue: &Arc<Q>) {
    let x = ops::full(queue, &[200], DType::Si32, Scalar::Int(-1)).unwrap();
    let v = x.slice_axis(0, Slice::new(None, Some(1), -2)).unwrap();
    assert_eq!(v.dims(), &[99]);
    let p = ops::prod(&v, None, None, false).unwrap();
    assert_eq!(p.dtype(), DType::Si64);
    assert_eq!(p.item().unwrap(), Scalar::Int(-1));
}

/// Products with complex output dtypes execute and keep the identity exact.
pub fn prod_with_complex_output<Q: DeviceQueue>(queue: &Arc<Q>) {
    for dtype in [DType::Cf32, DType::Cf64] {
        let x = ops::ones(queue, &[8], dtype).unwrap();
        let p = ops::prod(&x, None, None, false).unwrap();
        assert_eq!(p.dtype(), dtype);
        assert_eq!(p.item().unwrap(), Scalar::Complex { re: 1.0, im: 0.0 });
    }
    let x = ops::ones(queue, &[8], DType::Cf32).unwrap();
    let p = ops::prod(&x, None, Some(DType::Cf64), false).unwrap();
    assert_eq!(p.dtype(), DType::Cf64);
    assert_eq!(p.item().unwrap(), Scalar::Complex { re: 1.0, im: 0.0 });
}

/// Seeded random float sums match a naive host reduction.
pub fn randomized_float_sum_matches_host<Q: DeviceQueue>(queue: &Arc<Q>) {
    let mut rng = StdRng::seed_from_u64(0x5eed_da7a);
    let dims = [4usize, 5, 6];
    let total: usize = dims.iter().product();
    let values: Vec<f64> = (0..total).map(|_| rng.gen_range(-1.0..1.0)).collect();
    let x = ops::asarray(queue, &dims, values.clone()).unwrap();
    let s = ops::sum(&x, Some(&[0, 2]), None, false).unwrap();
    let (expected, out_dims) = host_ref::sum_f64(&values, &dims, &[0, 2]);
    assert_eq!(s.dims(), out_dims.as_slice());
    let got = s.to_literal().unwrap().to_vec::<f64>().unwrap();
    assert_eq!(got.len(), expected.len());
    for (g, e) in got.iter().zip(expected.iter()) {
        assert!((g - e).abs() <= 1e-12, "got {g}, expected {e}");
    }
}

/// Seeded random integer sums match a naive host reduction exactly.
pub fn randomized_int_sum_matches_host<Q: DeviceQueue>(queue: &Arc<Q>) {
    let mut rng = StdRng::seed_from_u64(0x5eed_1075);
    let dims = [3usize, 7, 5];
    let total: usize = dims.iter().product();
    let values: Vec<i64> = (0..total).map(|_| rng.gen_range(-1000..1000)).collect();
    let x = ops::asarray(queue, &dims, values.clone()).unwrap();
    let s = ops::sum(&x, Some(&[1]), None, false).unwrap();
    let (expected, out_dims) = host_ref::sum_i64(&values, &dims, &[1]);
    assert_eq!(s.dims(), out_dims.as_slice());
    assert_eq!(s.to_literal().unwrap().to_vec::<i64>().unwrap(), expected);
}
