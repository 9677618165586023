//! The demo programs. Each one pairs a plain scene state with the GPU resources that
//! draw it.

pub mod blackhole;
pub mod bspline;
