pub mod common;
pub mod creation;
pub mod logic;
pub mod reduction;

pub use creation::{arange, asarray, empty, full, ones, zeros};
pub use logic::{all, all_equal_scalar, equal};
pub use reduction::{prod, sum};
