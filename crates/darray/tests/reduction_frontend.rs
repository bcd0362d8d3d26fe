//! Frontend reduction semantics over the reference CPU queue.

use darray::{ops, DType, Scalar, Slice};
use darray_backend_ref_cpu::default_queue;

#[test]
fn sum_of_typed_values_is_exact() {
    let queue = default_queue();
    let x = ops::asarray(&queue, &[2, 3], vec![1i32, 2, 3, 4, 5, 6]).unwrap();
    let s = ops::sum(&x, None, None, false).unwrap();
    assert_eq!(s.dtype(), DType::Si64);
    assert_eq!(s.item().unwrap(), Scalar::Int(21));
}

#[test]
fn axis_sum_produces_per_row_totals() {
    let queue = default_queue();
    let x = ops::asarray(&queue, &[2, 3], vec![1.0f64, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
    let s = ops::sum(&x, Some(&[1]), None, false).unwrap();
    assert_eq!(s.dims(), &[2]);
    assert_eq!(
        s.to_literal().unwrap().to_vec::<f64>().unwrap(),
        vec![6.0, 15.0]
    );
}

#[test]
fn negative_axis_counts_from_the_back() {
    let queue = default_queue();
    let x = ops::ones(&queue, &[2, 3, 4], DType::Si16).unwrap();
    let s = ops::sum(&x, Some(&[-1]), None, false).unwrap();
    assert_eq!(s.dims(), &[2, 3]);
    assert!(ops::all_equal_scalar(&s, Scalar::Int(4)).unwrap());
}

#[test]
fn duplicate_axes_are_rejected() {
    let queue = default_queue();
    let x = ops::ones(&queue, &[2, 3], DType::F32).unwrap();
    assert!(ops::sum(&x, Some(&[0, -2]), None, false).is_err());
    assert!(ops::sum(&x, Some(&[2]), None, false).is_err());
}

#[test]
fn prod_multiplies_along_the_axis() {
    let queue = default_queue();
    let x = ops::asarray(&queue, &[2, 3], vec![1i64, 2, 3, 4, 5, 6]).unwrap();
    let p = ops::prod(&x, Some(&[1]), None, false).unwrap();
    assert_eq!(
        p.to_literal().unwrap().to_vec::<i64>().unwrap(),
        vec![6, 120]
    );
}

#[test]
fn prod_of_strided_view_skips_unselected_elements() {
    let queue = default_queue();
    let x = ops::arange(&queue, 1, 7, 1, DType::Si64).unwrap();
    let v = x.slice_axis(0, Slice::new(Some(0), None, 2)).unwrap();
    assert_eq!(v.dims(), &[3]);
    let p = ops::prod(&v, None, None, false).unwrap();
    // 1 * 3 * 5
    assert_eq!(p.item().unwrap(), Scalar::Int(15));
}

#[test]
fn keepdims_retains_reduced_axes_as_ones() {
    let queue = default_queue();
    let x = ops::ones(&queue, &[2, 3, 4], DType::Ui8).unwrap();
    let s = ops::sum(&x, Some(&[0, 2]), None, true).unwrap();
    assert_eq!(s.dims(), &[1, 3, 1]);
    assert_eq!(s.dtype(), DType::Ui64);
    assert!(ops::all_equal_scalar(&s, Scalar::Uint(8)).unwrap());
}

#[test]
fn explicit_narrow_out_dtype_is_honored() {
    let queue = default_queue();
    let x = ops::ones(&queue, &[7], DType::Si64).unwrap();
    let s = ops::sum(&x, None, Some(DType::Si8), false).unwrap();
    assert_eq!(s.dtype(), DType::Si8);
    assert_eq!(s.item().unwrap(), Scalar::Int(7));
}

#[test]
fn f16_accumulation_is_widened() {
    // 100 halves of 1.0 sum to exactly 100 when accumulated in f64.
    let queue = default_queue();
    let x = ops::ones(&queue, &[100], DType::F16).unwrap();
    let s = ops::sum(&x, None, None, false).unwrap();
    assert_eq!(s.dtype(), DType::F16);
    assert_eq!(s.item().unwrap(), Scalar::Float(100.0));
}

#[test]
fn complex_sum_tracks_both_parts() {
    let queue = default_queue();
    let x = ops::asarray(
        &queue,
        &[3],
        vec![
            num_complex::Complex64::new(1.0, 2.0),
            num_complex::Complex64::new(-0.5, 0.25),
            num_complex::Complex64::new(2.5, -1.25),
        ],
    )
    .unwrap();
    let s = ops::sum(&x, None, None, false).unwrap();
    assert_eq!(s.dtype(), DType::Cf64);
    assert_eq!(s.item().unwrap(), Scalar::Complex { re: 3.0, im: 1.0 });
}
