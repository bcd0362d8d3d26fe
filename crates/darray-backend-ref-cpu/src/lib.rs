//! Reference CPU implementation of the `darray` queue contract.

mod cpu;

pub use cpu::{default_queue, BufferData, CpuBuffer, CpuQueue};

#[cfg(test)]
darray_backend_tests::define_queue_tests!(cpu_reference, || std::sync::Arc::new(
    crate::CpuQueue::new()
));
