//! Basic scalar bound for this crate

use nalgebra::RealField;

/// Real scalar usable throughout this crate.
///
/// This crate only ever works with real-valued operators (see the module-level
/// docs for why), so a single bound covering `f32`/`f64` stands in for the
/// `Scalar + Lapack` pair the teacher crate uses for its complex-capable types.
pub trait Real: RealField + Copy {}

impl<T: RealField + Copy> Real for T {}
