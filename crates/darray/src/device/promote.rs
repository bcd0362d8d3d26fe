//! Default accumulator dtype selection for reductions.

use crate::device::spec::{DType, Kind, ReduceKind, Scalar};

/// Returns the default output dtype when the caller does not request one.
///
/// Boolean and signed inputs widen to `Si64`, unsigned inputs widen to
/// `Ui64`, and floating/complex inputs keep their dtype.
pub fn default_reduction_dtype(input: DType) -> DType {
    match input.kind() {
        Kind::Bool | Kind::SignedInt => DType::Si64,
        Kind::UnsignedInt => DType::Ui64,
        Kind::Float | Kind::Complex => input,
    }
}

/// Returns the identity element seeding an empty reduction.
pub fn reduction_identity(kind: ReduceKind, out_dtype: DType) -> Scalar {
    match kind {
        ReduceKind::Sum => Scalar::zero_for(out_dtype),
        ReduceKind::Prod => Scalar::one_for(out_dtype),
    }
}
