//! Shared types for the clipview scene core.

mod types;

pub use types::{ComponentId, VectorError, plane_dist, vec3_from_slice};
