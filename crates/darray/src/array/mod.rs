pub mod layout;
pub mod literal;
pub mod usm_array;

pub use layout::{Layout, Shape, Slice};
pub use literal::{Element, LiteralIoError};
pub use usm_array::UsmArray;
