//! Contract between the array frontend and queue (device) implementations.
//!
//! A queue executes kernels for the arrays bound to it. Everything a queue
//! needs to know about an operation travels through the plain-data types in
//! this module, so alternative queue implementations can be dropped in
//! without touching the frontend.

use std::sync::Arc;

use serde::{ser::SerializeStruct, Deserialize, Serialize};
use thiserror::Error;

use crate::array::layout::{Layout, Shape};

/// Enumerates scalar element types supported by device arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DType {
    Bool,
    Si8,
    Ui8,
    Si16,
    Ui16,
    Si32,
    Ui32,
    Si64,
    Ui64,
    F16,
    F32,
    F64,
    Cf32,
    Cf64,
}

/// Coarse dtype classification used by the promotion rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Kind {
    Bool,
    SignedInt,
    UnsignedInt,
    Float,
    Complex,
}

impl DType {
    /// Returns the kind classification for this dtype.
    pub fn kind(self) -> Kind {
        match self {
            DType::Bool => Kind::Bool,
            DType::Si8 | DType::Si16 | DType::Si32 | DType::Si64 => Kind::SignedInt,
            DType::Ui8 | DType::Ui16 | DType::Ui32 | DType::Ui64 => Kind::UnsignedInt,
            DType::F16 | DType::F32 | DType::F64 => Kind::Float,
            DType::Cf32 | DType::Cf64 => Kind::Complex,
        }
    }

    /// Returns `true` when the dtype is a signed integer.
    pub fn is_signed_integer(self) -> bool {
        self.kind() == Kind::SignedInt
    }

    /// Returns `true` when the dtype is an unsigned integer.
    pub fn is_unsigned_integer(self) -> bool {
        self.kind() == Kind::UnsignedInt
    }

    /// Returns `true` when the dtype is a floating-point representation.
    pub fn is_float(self) -> bool {
        self.kind() == Kind::Float
    }

    /// Returns `true` when the dtype is complex.
    pub fn is_complex(self) -> bool {
        self.kind() == Kind::Complex
    }

    /// Returns the storage size in bytes per scalar element.
    pub fn size_in_bytes(self) -> usize {
        match self {
            DType::Bool | DType::Si8 | DType::Ui8 => 1,
            DType::Si16 | DType::Ui16 | DType::F16 => 2,
            DType::Si32 | DType::Ui32 | DType::F32 => 4,
            DType::Si64 | DType::Ui64 | DType::F64 | DType::Cf32 => 8,
            DType::Cf64 => 16,
        }
    }

    /// Iterates every dtype in the closed enumeration.
    pub fn all() -> [DType; 14] {
        [
            DType::Bool,
            DType::Si8,
            DType::Ui8,
            DType::Si16,
            DType::Ui16,
            DType::Si32,
            DType::Ui32,
            DType::Si64,
            DType::Ui64,
            DType::F16,
            DType::F32,
            DType::F64,
            DType::Cf32,
            DType::Cf64,
        ]
    }
}

/// Array metadata coupling dtype and shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArraySpec {
    pub dtype: DType,
    pub shape: Shape,
}

impl ArraySpec {
    pub fn new(dtype: DType, shape: Shape) -> Self {
        Self { dtype, shape }
    }

    /// Returns total element count for the spec.
    pub fn num_elements(&self) -> usize {
        self.shape.num_elements()
    }

    /// Returns the dense byte length implied by the spec.
    pub fn byte_len(&self) -> usize {
        self.num_elements() * self.dtype.size_in_bytes()
    }
}

/// Host-side scalar value used for fills, identities, and 0-d readback.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    Complex { re: f64, im: f64 },
}

impl Scalar {
    /// Additive identity stored as the natural scalar for `dtype`.
    pub fn zero_for(dtype: DType) -> Scalar {
        match dtype.kind() {
            Kind::Bool => Scalar::Bool(false),
            Kind::SignedInt => Scalar::Int(0),
            Kind::UnsignedInt => Scalar::Uint(0),
            Kind::Float => Scalar::Float(0.0),
            Kind::Complex => Scalar::Complex { re: 0.0, im: 0.0 },
        }
    }

    /// Multiplicative identity stored as the natural scalar for `dtype`.
    pub fn one_for(dtype: DType) -> Scalar {
        match dtype.kind() {
            Kind::Bool => Scalar::Bool(true),
            Kind::SignedInt => Scalar::Int(1),
            Kind::UnsignedInt => Scalar::Uint(1),
            Kind::Float => Scalar::Float(1.0),
            Kind::Complex => Scalar::Complex { re: 1.0, im: 0.0 },
        }
    }

    /// Truthiness of the scalar (complex values are truthy when either part is).
    pub fn to_bool(self) -> bool {
        match self {
            Scalar::Bool(v) => v,
            Scalar::Int(v) => v != 0,
            Scalar::Uint(v) => v != 0,
            Scalar::Float(v) => v != 0.0,
            Scalar::Complex { re, im } => re != 0.0 || im != 0.0,
        }
    }

    /// Cast to `i64`, wrapping unsigned values and truncating floats.
    pub fn to_i64(self) -> i64 {
        match self {
            Scalar::Bool(v) => v as i64,
            Scalar::Int(v) => v,
            Scalar::Uint(v) => v as i64,
            Scalar::Float(v) => v as i64,
            Scalar::Complex { re, .. } => re as i64,
        }
    }

    /// Cast to `u64`, wrapping signed values and truncating floats.
    pub fn to_u64(self) -> u64 {
        match self {
            Scalar::Bool(v) => v as u64,
            Scalar::Int(v) => v as u64,
            Scalar::Uint(v) => v,
            Scalar::Float(v) => v as u64,
            Scalar::Complex { re, .. } => re as u64,
        }
    }

    /// Cast to `f64`, dropping the imaginary part of complex values.
    pub fn to_f64(self) -> f64 {
        match self {
            Scalar::Bool(v) => v as u8 as f64,
            Scalar::Int(v) => v as f64,
            Scalar::Uint(v) => v as f64,
            Scalar::Float(v) => v,
            Scalar::Complex { re, .. } => re,
        }
    }

    /// Cast to a `(re, im)` pair.
    pub fn to_complex(self) -> (f64, f64) {
        match self {
            Scalar::Complex { re, im } => (re, im),
            other => (other.to_f64(), 0.0),
        }
    }

    fn to_i128(self) -> i128 {
        match self {
            Scalar::Bool(v) => v as i128,
            Scalar::Int(v) => v as i128,
            Scalar::Uint(v) => v as i128,
            Scalar::Float(v) => v as i128,
            Scalar::Complex { re, .. } => re as i128,
        }
    }

    /// Numeric equality across kinds.
    ///
    /// Integer-like pairs compare exactly in `i128`; anything involving a
    /// float or complex value compares through `f64` parts.
    pub fn numerically_equals(self, other: Scalar) -> bool {
        let integer_like =
            |s: &Scalar| matches!(s, Scalar::Bool(_) | Scalar::Int(_) | Scalar::Uint(_));
        if integer_like(&self) && integer_like(&other) {
            return self.to_i128() == other.to_i128();
        }
        let (lre, lim) = self.to_complex();
        let (rre, rim) = other.to_complex();
        lre == rre && lim == rim
    }
}

/// Dense literal array payload exchanged between host and queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayLiteral {
    pub spec: ArraySpec,
    pub bytes: Arc<[u8]>,
}

impl ArrayLiteral {
    pub fn new(spec: ArraySpec, bytes: Arc<[u8]>) -> Self {
        Self { spec, bytes }
    }

    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }
}

impl Serialize for ArrayLiteral {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("ArrayLiteral", 2)?;
        state.serialize_field("spec", &self.spec)?;
        state.serialize_field("bytes", &self.bytes.as_ref())?;
        state.end()
    }
}

impl<'de> Deserialize<'de> for ArrayLiteral {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct ArrayLiteralHelper {
            spec: ArraySpec,
            bytes: Vec<u8>,
        }

        let helper = ArrayLiteralHelper::deserialize(deserializer)?;
        Ok(ArrayLiteral {
            spec: helper.spec,
            bytes: Arc::<[u8]>::from(helper.bytes),
        })
    }
}

/// Initialization payload when materialising buffers on a queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ArrayInit {
    /// Upload a dense host literal.
    Literal(ArrayLiteral),
    /// Allocate and fill with a constant converted to the spec dtype.
    Fill { spec: ArraySpec, value: Scalar },
}

/// Reduction families supported by every queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReduceKind {
    Sum,
    Prod,
}

/// Fully describes a reduction kernel launch.
///
/// `axes` are normalized: non-negative, strictly increasing, and within the
/// input rank. The frontend owns normalization; queues may reject specs that
/// violate it but are not required to re-derive anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReduceSpec {
    pub kind: ReduceKind,
    pub axes: Vec<usize>,
    pub keepdims: bool,
    pub out_dtype: DType,
}

/// Borrowed view of a device buffer plus the logical geometry to read it with.
///
/// Strides are in elements and may be negative; `layout.offset` points at the
/// first logical element.
pub struct ViewRef<'a, H> {
    pub buffer: &'a H,
    pub dtype: DType,
    pub shape: &'a Shape,
    pub layout: &'a Layout,
}

impl<H> Clone for ViewRef<'_, H> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<H> Copy for ViewRef<'_, H> {}

/// Queue error surfaced to the array frontend.
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("queue spec violation: {0}")]
    Spec(String),
    #[error("{op} is not implemented on this queue: {reason}")]
    Unimplemented { op: &'static str, reason: String },
    #[error("queue execution failure: {0}")]
    Execution(String),
}

impl QueueError {
    pub fn spec(message: impl Into<String>) -> Self {
        QueueError::Spec(message.into())
    }

    pub fn unimplemented(op: &'static str, reason: impl Into<String>) -> Self {
        QueueError::Unimplemented {
            op,
            reason: reason.into(),
        }
    }

    pub fn execution(message: impl Into<String>) -> Self {
        QueueError::Execution(message.into())
    }
}

/// Convenience alias for results returned by queue routines.
pub type QueueResult<T> = Result<T, QueueError>;

/// A handle to a compute-capable device executing array kernels.
///
/// Arrays are bound to exactly one queue for their lifetime; kernel outputs
/// are allocated on the queue that ran them. Implementations execute
/// synchronously relative to the caller.
pub trait DeviceQueue: Send + Sync {
    type BufferHandle: Clone + Send + Sync + 'static;

    /// Returns a human-readable queue identifier (e.g., `"cpu-reference"`).
    fn queue_name(&self) -> &str;

    /// Allocates a device buffer from host initialisation data.
    fn materialize(&self, init: ArrayInit) -> QueueResult<Self::BufferHandle>;

    /// Gathers a (possibly strided) view into a contiguous host literal.
    fn to_literal(&self, view: ViewRef<'_, Self::BufferHandle>) -> QueueResult<ArrayLiteral>;

    /// Runs a sum/prod reduction over the view, producing a buffer matching `out`.
    fn reduce(
        &self,
        view: ViewRef<'_, Self::BufferHandle>,
        spec: &ReduceSpec,
        out: &ArraySpec,
    ) -> QueueResult<Self::BufferHandle>;

    /// Elementwise equality of two same-shape views into a `Bool` buffer.
    fn compare_equal(
        &self,
        lhs: ViewRef<'_, Self::BufferHandle>,
        rhs: ViewRef<'_, Self::BufferHandle>,
        out: &ArraySpec,
    ) -> QueueResult<Self::BufferHandle>;
}
