//! Literal and reduce-spec serialization.

use darray::device::spec::{ArrayLiteral, ReduceKind, ReduceSpec};
use darray::DType;

#[test]
fn json_roundtrip_preserves_spec_and_payload() {
    let literal = ArrayLiteral::from_elements(&[2, 2], vec![1.5f32, -2.0, 0.0, 4.25]).unwrap();
    let encoded = serde_json::to_string(&literal).unwrap();
    let decoded: ArrayLiteral = serde_json::from_str(&encoded).unwrap();
    assert_eq!(decoded, literal);
    assert_eq!(
        decoded.to_vec::<f32>().unwrap(),
        vec![1.5, -2.0, 0.0, 4.25]
    );
}

#[test]
fn bincode_roundtrip_preserves_spec_and_payload() {
    let literal = ArrayLiteral::from_elements(&[3], vec![-1i64, 0, i64::MAX]).unwrap();
    let encoded = bincode::serialize(&literal).unwrap();
    let decoded: ArrayLiteral = bincode::deserialize(&encoded).unwrap();
    assert_eq!(decoded, literal);
}

#[test]
fn file_roundtrip_through_both_codecs() {
    let literal = ArrayLiteral::from_elements(&[4], vec![1u16, 2, 3, 4]).unwrap();
    let dir = std::env::temp_dir();
    let json_path = dir.join(format!("darray-literal-{}.json", std::process::id()));
    let bin_path = dir.join(format!("darray-literal-{}.bin", std::process::id()));

    literal.save_json(&json_path).unwrap();
    let from_json = ArrayLiteral::load_json(&json_path).unwrap();
    assert_eq!(from_json, literal);

    literal.save_bincode(&bin_path).unwrap();
    let from_bin = ArrayLiteral::load_bincode(&bin_path).unwrap();
    assert_eq!(from_bin, literal);

    let _ = std::fs::remove_file(json_path);
    let _ = std::fs::remove_file(bin_path);
}

#[test]
fn reduce_spec_roundtrips_through_json() {
    let spec = ReduceSpec {
        kind: ReduceKind::Prod,
        axes: vec![0, 2],
        keepdims: true,
        out_dtype: DType::Cf64,
    };
    let encoded = serde_json::to_string(&spec).unwrap();
    let decoded: ReduceSpec = serde_json::from_str(&encoded).unwrap();
    assert_eq!(decoded, spec);
}
