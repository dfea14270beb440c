use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a component within its scene.
///
/// Callers may choose their own ids; when they don't, a uuid v4 string is
/// generated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentId(pub String);

impl ComponentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ComponentId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for ComponentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Rejected vector input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VectorError {
    #[error("expected a 3-component vector, got {0} components")]
    WrongLength(usize),
}

/// Build a `Vec3` from untyped input, rejecting anything that is not exactly
/// three components long.
pub fn vec3_from_slice(values: &[f32]) -> Result<Vec3, VectorError> {
    match values {
        [x, y, z] => Ok(Vec3::new(*x, *y, *z)),
        _ => Err(VectorError::WrongLength(values.len())),
    }
}

/// Signed plane constant for the plane through `pos` with normal `dir`.
///
/// A point `p` lies on the plane when `dir.dot(p) + dist == 0`.
pub fn plane_dist(pos: Vec3, dir: Vec3) -> f32 {
    -pos.dot(dir)
}
