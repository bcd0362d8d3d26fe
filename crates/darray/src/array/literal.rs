//! Host-side literal construction and persistence.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::sync::Arc;

use anyhow::{ensure, Result};
use half::f16;
use num_complex::{Complex32, Complex64};
use thiserror::Error;

use crate::array::layout::Shape;
use crate::device::spec::{ArrayLiteral, ArraySpec, DType, Scalar};

/// Rust element types that map onto a device dtype.
///
/// `Bool` has no `Element` impl; boolean payloads are built from [`Scalar`]
/// values and stored as `u8` zero/one bytes.
pub trait Element: Copy + bytemuck::Pod + Send + Sync + 'static {
    const DTYPE: DType;

    fn to_scalar(self) -> Scalar;
    fn from_scalar(value: Scalar) -> Self;
}

macro_rules! impl_int_element {
    ($ty:ty, $dtype:expr, $variant:ident, $cast:ident) => {
        impl Element for $ty {
            const DTYPE: DType = $dtype;

            fn to_scalar(self) -> Scalar {
                Scalar::$variant(self as _)
            }

            fn from_scalar(value: Scalar) -> Self {
                value.$cast() as $ty
            }
        }
    };
}

impl_int_element!(i8, DType::Si8, Int, to_i64);
impl_int_element!(i16, DType::Si16, Int, to_i64);
impl_int_element!(i32, DType::Si32, Int, to_i64);
impl_int_element!(i64, DType::Si64, Int, to_i64);
impl_int_element!(u8, DType::Ui8, Uint, to_u64);
impl_int_element!(u16, DType::Ui16, Uint, to_u64);
impl_int_element!(u32, DType::Ui32, Uint, to_u64);
impl_int_element!(u64, DType::Ui64, Uint, to_u64);

impl Element for f16 {
    const DTYPE: DType = DType::F16;

    fn to_scalar(self) -> Scalar {
        Scalar::Float(self.to_f64())
    }

    fn from_scalar(value: Scalar) -> Self {
        f16::from_f64(value.to_f64())
    }
}

impl Element for f32 {
    const DTYPE: DType = DType::F32;

    fn to_scalar(self) -> Scalar {
        Scalar::Float(self as f64)
    }

    fn from_scalar(value: Scalar) -> Self {
        value.to_f64() as f32
    }
}

impl Element for f64 {
    const DTYPE: DType = DType::F64;

    fn to_scalar(self) -> Scalar {
        Scalar::Float(self)
    }

    fn from_scalar(value: Scalar) -> Self {
        value.to_f64()
    }
}

impl Element for Complex32 {
    const DTYPE: DType = DType::Cf32;

    fn to_scalar(self) -> Scalar {
        Scalar::Complex {
            re: self.re as f64,
            im: self.im as f64,
        }
    }

    fn from_scalar(value: Scalar) -> Self {
        let (re, im) = value.to_complex();
        Complex32::new(re as f32, im as f32)
    }
}

impl Element for Complex64 {
    const DTYPE: DType = DType::Cf64;

    fn to_scalar(self) -> Scalar {
        Scalar::Complex {
            re: self.re,
            im: self.im,
        }
    }

    fn from_scalar(value: Scalar) -> Self {
        let (re, im) = value.to_complex();
        Complex64::new(re, im)
    }
}

/// Errors raised while persisting literals to disk.
#[derive(Debug, Error)]
pub enum LiteralIoError {
    #[error("io failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("json codec failure: {0}")]
    Json(#[from] serde_json::Error),
    #[error("binary codec failure: {0}")]
    Bincode(#[from] bincode::Error),
}

impl ArrayLiteral {
    /// Builds a dense literal from typed host elements.
    pub fn from_elements<E: Element>(dims: &[usize], values: Vec<E>) -> Result<Self> {
        let shape = Shape::new(dims.to_vec());
        ensure!(
            shape.checked_num_elements()? == values.len(),
            "shape {:?} does not match {} provided elements",
            dims,
            values.len()
        );
        let bytes: Vec<u8> = bytemuck::cast_slice(&values).to_vec();
        Ok(ArrayLiteral::new(
            ArraySpec::new(E::DTYPE, shape),
            Arc::from(bytes),
        ))
    }

    /// Builds a literal of `dtype` by converting host scalars element-wise.
    pub fn from_scalars(dtype: DType, dims: &[usize], values: &[Scalar]) -> Result<Self> {
        fn collect<E: Element>(dims: &[usize], values: &[Scalar]) -> Result<ArrayLiteral> {
            let converted: Vec<E> = values.iter().map(|&v| E::from_scalar(v)).collect();
            ArrayLiteral::from_elements(dims, converted)
        }

        match dtype {
            DType::Bool => {
                let shape = Shape::new(dims.to_vec());
                ensure!(
                    shape.checked_num_elements()? == values.len(),
                    "shape {:?} does not match {} provided elements",
                    dims,
                    values.len()
                );
                let bytes: Vec<u8> = values.iter().map(|v| v.to_bool() as u8).collect();
                Ok(ArrayLiteral::new(
                    ArraySpec::new(DType::Bool, shape),
                    Arc::from(bytes),
                ))
            }
            DType::Si8 => collect::<i8>(dims, values),
            DType::Ui8 => collect::<u8>(dims, values),
            DType::Si16 => collect::<i16>(dims, values),
            DType::Ui16 => collect::<u16>(dims, values),
            DType::Si32 => collect::<i32>(dims, values),
            DType::Ui32 => collect::<u32>(dims, values),
            DType::Si64 => collect::<i64>(dims, values),
            DType::Ui64 => collect::<u64>(dims, values),
            DType::F16 => collect::<f16>(dims, values),
            DType::F32 => collect::<f32>(dims, values),
            DType::F64 => collect::<f64>(dims, values),
            DType::Cf32 => collect::<Complex32>(dims, values),
            DType::Cf64 => collect::<Complex64>(dims, values),
        }
    }

    /// Reinterprets the payload as typed host elements.
    pub fn to_vec<E: Element>(&self) -> Result<Vec<E>> {
        ensure!(
            self.spec.dtype == E::DTYPE,
            "literal holds {:?}, requested {:?}",
            self.spec.dtype,
            E::DTYPE
        );
        ensure!(
            self.bytes.len() == self.spec.byte_len(),
            "literal byte length {} does not match spec {:?}",
            self.bytes.len(),
            self.spec
        );
        Ok(bytemuck::pod_collect_to_vec(&self.bytes))
    }

    /// Decodes the payload into host scalars regardless of dtype.
    pub fn scalars(&self) -> Result<Vec<Scalar>> {
        fn collect<E: Element>(literal: &ArrayLiteral) -> Result<Vec<Scalar>> {
            Ok(literal
                .to_vec::<E>()?
                .into_iter()
                .map(Element::to_scalar)
                .collect())
        }

        match self.spec.dtype {
            DType::Bool => {
                ensure!(
                    self.bytes.len() == self.spec.num_elements(),
                    "boolean literal byte length {} does not match spec {:?}",
                    self.bytes.len(),
                    self.spec
                );
                Ok(self.bytes.iter().map(|&b| Scalar::Bool(b != 0)).collect())
            }
            DType::Si8 => collect::<i8>(self),
            DType::Ui8 => collect::<u8>(self),
            DType::Si16 => collect::<i16>(self),
            DType::Ui16 => collect::<u16>(self),
            DType::Si32 => collect::<i32>(self),
            DType::Ui32 => collect::<u32>(self),
            DType::Si64 => collect::<i64>(self),
            DType::Ui64 => collect::<u64>(self),
            DType::F16 => collect::<f16>(self),
            DType::F32 => collect::<f32>(self),
            DType::F64 => collect::<f64>(self),
            DType::Cf32 => collect::<Complex32>(self),
            DType::Cf64 => collect::<Complex64>(self),
        }
    }

    /// Decodes a single element by flat index.
    pub fn scalar_at(&self, index: usize) -> Result<Scalar> {
        let scalars = self.scalars()?;
        ensure!(
            index < scalars.len(),
            "index {index} out of bounds for {} elements",
            scalars.len()
        );
        Ok(scalars[index])
    }

    /// Writes the literal as pretty JSON.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), LiteralIoError> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }

    /// Reads a literal previously written with [`ArrayLiteral::save_json`].
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, LiteralIoError> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    /// Writes the literal in the compact binary format.
    pub fn save_bincode(&self, path: impl AsRef<Path>) -> Result<(), LiteralIoError> {
        let file = File::create(path)?;
        bincode::serialize_into(BufWriter::new(file), self)?;
        Ok(())
    }

    /// Reads a literal previously written with [`ArrayLiteral::save_bincode`].
    pub fn load_bincode(path: impl AsRef<Path>) -> Result<Self, LiteralIoError> {
        let file = File::open(path)?;
        Ok(bincode::deserialize_from(BufReader::new(file))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_roundtrip_preserves_values() {
        let literal = ArrayLiteral::from_elements(&[2, 3], vec![1i32, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(literal.spec.dtype, DType::Si32);
        assert_eq!(literal.to_vec::<i32>().unwrap(), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn scalar_construction_converts_per_dtype() {
        let values = [Scalar::Int(1), Scalar::Int(0), Scalar::Int(5)];
        let literal = ArrayLiteral::from_scalars(DType::F32, &[3], &values).unwrap();
        assert_eq!(literal.to_vec::<f32>().unwrap(), vec![1.0, 0.0, 5.0]);

        let literal = ArrayLiteral::from_scalars(DType::Bool, &[3], &values).unwrap();
        assert_eq!(
            literal.scalars().unwrap(),
            vec![Scalar::Bool(true), Scalar::Bool(false), Scalar::Bool(true)]
        );
    }

    #[test]
    fn mismatched_dtype_readback_is_rejected() {
        let literal = ArrayLiteral::from_elements(&[2], vec![1u8, 2]).unwrap();
        assert!(literal.to_vec::<i8>().is_err());
    }

    #[test]
    fn element_count_mismatch_is_rejected() {
        assert!(ArrayLiteral::from_elements(&[4], vec![1i64, 2]).is_err());
    }
}
