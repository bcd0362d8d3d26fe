pub mod promote;
pub mod spec;
