//! Zero-copy view behavior and queue placement rules.

use std::sync::Arc;

use darray::{ops, DType, Scalar, Slice};
use darray_backend_ref_cpu::{default_queue, CpuQueue};

#[test]
fn reversed_slice_reads_elements_back_to_front() {
    let queue = default_queue();
    let x = ops::arange(&queue, 0, 10, 1, DType::Si32).unwrap();
    let v = x.slice_axis(0, Slice::new(None, None, -1)).unwrap();
    assert_eq!(v.dims(), &[10]);
    assert_eq!(
        v.to_literal().unwrap().to_vec::<i32>().unwrap(),
        vec![9, 8, 7, 6, 5, 4, 3, 2, 1, 0]
    );
}

#[test]
fn slice_with_bounds_and_step_selects_expected_window() {
    let queue = default_queue();
    let x = ops::arange(&queue, 0, 10, 1, DType::Si32).unwrap();
    let v = x.slice_axis(0, Slice::new(Some(1), Some(8), 3)).unwrap();
    assert_eq!(
        v.to_literal().unwrap().to_vec::<i32>().unwrap(),
        vec![1, 4, 7]
    );
}

#[test]
fn empty_slice_produces_a_zero_size_view() {
    let queue = default_queue();
    let x = ops::arange(&queue, 0, 10, 1, DType::Si32).unwrap();
    let v = x.slice_axis(0, Slice::new(Some(4), Some(4), 1)).unwrap();
    assert_eq!(v.dims(), &[0]);
    assert!(v.to_literal().unwrap().to_vec::<i32>().unwrap().is_empty());
}

#[test]
fn permute_dims_transposes_readback_order() {
    let queue = default_queue();
    let x = ops::asarray(&queue, &[2, 3], vec![1i32, 2, 3, 4, 5, 6]).unwrap();
    let t = x.permute_dims(&[1, 0]).unwrap();
    assert_eq!(t.dims(), &[3, 2]);
    assert_eq!(
        t.to_literal().unwrap().to_vec::<i32>().unwrap(),
        vec![1, 4, 2, 5, 3, 6]
    );
    assert!(t.permute_dims(&[0, 0]).is_err());
    assert!(t.permute_dims(&[0]).is_err());
}

#[test]
fn index_axis_drops_the_indexed_dimension() {
    let queue = default_queue();
    let x = ops::asarray(&queue, &[2, 3], vec![1i32, 2, 3, 4, 5, 6]).unwrap();
    let row = x.index_axis(0, 1).unwrap();
    assert_eq!(row.dims(), &[3]);
    assert_eq!(
        row.to_literal().unwrap().to_vec::<i32>().unwrap(),
        vec![4, 5, 6]
    );
    assert!(x.index_axis(0, 2).is_err());
}

#[test]
fn reshape_of_contiguous_array_shares_semantics() {
    let queue = default_queue();
    let x = ops::arange(&queue, 0, 6, 1, DType::Si32).unwrap();
    let r = x.reshape(&[2, 3]).unwrap();
    assert_eq!(r.dims(), &[2, 3]);
    assert_eq!(
        r.to_literal().unwrap().to_vec::<i32>().unwrap(),
        vec![0, 1, 2, 3, 4, 5]
    );
    assert!(x.reshape(&[4]).is_err());
}

#[test]
fn reshape_of_strided_view_gathers_logical_order() {
    let queue = default_queue();
    let x = ops::asarray(&queue, &[2, 3], vec![1i32, 2, 3, 4, 5, 6]).unwrap();
    let t = x.permute_dims(&[1, 0]).unwrap();
    let flat = t.reshape(&[6]).unwrap();
    assert_eq!(
        flat.to_literal().unwrap().to_vec::<i32>().unwrap(),
        vec![1, 4, 2, 5, 3, 6]
    );
}

#[test]
fn item_requires_a_scalar_array() {
    let queue = default_queue();
    let x = ops::full(&queue, &[], DType::F64, Scalar::Float(2.5)).unwrap();
    assert_eq!(x.item().unwrap(), Scalar::Float(2.5));
    let y = ops::ones(&queue, &[1], DType::F64).unwrap();
    assert!(y.item().is_err());
}

#[test]
fn operations_reject_mixed_queue_operands() {
    let q1 = Arc::new(CpuQueue::new());
    let q2 = Arc::new(CpuQueue::new());
    let a = ops::ones(&q1, &[4], DType::Si32).unwrap();
    let b = ops::ones(&q2, &[4], DType::Si32).unwrap();
    assert!(ops::equal(&a, &b).is_err());

    let c = ops::ones(&q1, &[4], DType::Si32).unwrap();
    assert!(ops::equal(&a, &c).is_ok());
}

#[test]
fn default_queue_is_process_wide() {
    let q1 = default_queue();
    let q2 = default_queue();
    assert!(Arc::ptr_eq(&q1, &q2));
}
