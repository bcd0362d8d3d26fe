//! Shared conformance suite for `darray` queue implementations.
//!
//! A queue crate opts in by invoking [`define_queue_tests!`] with a module
//! name and a closure producing a fresh `Arc<Q>`:
//!
//! ```ignore
//! #[cfg(test)]
//! darray_backend_tests::define_queue_tests!(my_queue, || std::sync::Arc::new(MyQueue::new()));
//! ```

pub mod host_ref;
pub mod reduction;

/// Expands to a test module running every conformance case against the queue
/// built by `$queue_ctor`.
#[macro_export]
macro_rules! define_queue_tests {
    ($module:ident, $queue_ctor:expr) => {
        #[cfg(test)]
        mod $module {
            macro_rules! queue_case {
                ($name:ident) => {
                    #[test]
                    fn $name() {
                        let queue = ($queue_ctor)();
                        $crate::reduction::$name(&queue);
                    }
                };
            }

            queue_case!(sum_of_ones_preserves_kind);
            queue_case!(sum_over_reversed_stride_view);
            queue_case!(sum_with_explicit_out_dtype);
            queue_case!(boolean_out_dtype_is_rejected);
            queue_case!(empty_reductions_yield_identities);
            queue_case!(sum_over_axis_tuple);
            queue_case!(scalar_sum_stays_on_queue);
            queue_case!(zero_size_keepdims_shapes);
            queue_case!(axis_pair_sums_match_full_count);
            queue_case!(transposed_view_reduces_logical_axes);
            queue_case!(strided_prod_of_unsigned_factors);
            queue_case!(strided_prod_of_signed_factors);
            queue_case!(prod_with_complex_output);
            queue_case!(randomized_float_sum_matches_host);
            queue_case!(randomized_int_sum_matches_host);
        }
    };
}
