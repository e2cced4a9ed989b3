//! DSP engine — sample buffers and the operations on them.
//!
//! Everything here is in-memory and synchronous. Buffers are plain values:
//! share them read-only freely, mutate them only through `&mut`.

pub mod buffer;
pub mod envelope;
pub mod filter;
pub mod mixer;
pub mod oscillator;
pub mod resample;
pub mod synth;
