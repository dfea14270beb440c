//! JSON scene files.
//!
//! ```json
//! {
//!   "owners": [
//!     { "id": "model", "section_planes": [{ "id": "a", "pos": [0, 1, 0] }] }
//!   ],
//!   "section_planes": [{ "dir": [1, 0, 0], "active": false }]
//! }
//! ```

use anyhow::Context;
use clipview_kernel::{
    ComponentConfig, Owner, Scene, SceneError, SectionPlane, SectionPlaneConfig,
};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SceneFile {
    /// Groups that own section planes; destroying a group drops its planes.
    pub owners: Vec<OwnerSpec>,
    /// Planes owned directly by the scene.
    pub section_planes: Vec<PlaneSpec>,
}

#[derive(Debug, Deserialize)]
pub struct OwnerSpec {
    pub id: String,
    #[serde(default)]
    pub section_planes: Vec<PlaneSpec>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PlaneSpec {
    pub id: Option<String>,
    /// Any JSON value. Only a literal `false` deactivates the plane.
    pub active: Option<Value>,
    pub pos: Option<[f32; 3]>,
    pub dir: Option<[f32; 3]>,
}

/// Loose activation rule for untyped input: everything except `false` turns
/// the plane on.
pub fn activates(value: &Value) -> bool {
    !matches!(value, Value::Bool(false))
}

impl PlaneSpec {
    pub fn to_config(&self) -> SectionPlaneConfig {
        SectionPlaneConfig {
            id: self.id.as_deref().map(Into::into),
            active: Some(self.active.as_ref().is_none_or(activates)),
            pos: self.pos,
            dir: self.dir,
        }
    }
}

impl SceneFile {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading scene file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing scene file {}", path.display()))
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Instantiate every owner and plane into `scene`.
    pub fn build(&self, scene: &mut Scene) -> Result<Vec<SectionPlane>, SceneError> {
        let mut planes = Vec::new();
        for owner in &self.owners {
            let handle = scene.create_component(
                Owner::Scene,
                "Group",
                ComponentConfig {
                    id: Some(owner.id.as_str().into()),
                },
            )?;
            for spec in &owner.section_planes {
                planes.push(SectionPlane::new(scene, &handle, spec.to_config())?);
            }
        }
        for spec in &self.section_planes {
            planes.push(SectionPlane::new(scene, Owner::Scene, spec.to_config())?);
        }
        tracing::debug!(planes = planes.len(), owners = self.owners.len(), "scene file built");
        Ok(planes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn only_literal_false_deactivates() {
        assert!(!activates(&json!(false)));
        for v in [json!(true), json!(0), json!(null), json!({}), json!("no"), json!([])] {
            assert!(activates(&v), "{v} should activate");
        }
    }

    #[test]
    fn active_zero_builds_active_plane() {
        let file = SceneFile::parse(r#"{ "section_planes": [{ "id": "z", "active": 0 }] }"#).unwrap();
        let mut scene = Scene::new();
        let planes = file.build(&mut scene).unwrap();
        assert!(planes[0].active(&scene).unwrap());
    }

    #[test]
    fn missing_active_is_active() {
        let spec = PlaneSpec::default();
        assert_eq!(spec.to_config().active, Some(true));
    }

    #[test]
    fn builds_owned_planes() {
        let file = SceneFile::parse(
            r#"{
                "owners": [{ "id": "model", "section_planes": [
                    { "id": "a", "pos": [1, 1, 1], "dir": [-1, -1, -1] },
                    { "id": "b", "active": false }
                ]}],
                "section_planes": [{ "id": "c" }]
            }"#,
        )
        .unwrap();
        let mut scene = Scene::new();
        let planes = file.build(&mut scene).unwrap();
        assert_eq!(planes.len(), 3);
        assert_eq!(scene.section_plane_count(), 3);
        assert_eq!(planes[0].dist(&scene).unwrap(), 3.0);
        assert!(!planes[1].active(&scene).unwrap());
    }

    #[test]
    fn duplicate_ids_fail_to_build() {
        let file = SceneFile::parse(r#"{ "section_planes": [{ "id": "x" }, { "id": "x" }] }"#)
            .unwrap();
        let mut scene = Scene::new();
        assert_eq!(
            file.build(&mut scene).unwrap_err(),
            SceneError::DuplicateId("x".into())
        );
    }

    #[test]
    fn short_vectors_are_rejected() {
        assert!(SceneFile::parse(r#"{ "section_planes": [{ "pos": [1, 2] }] }"#).is_err());
    }
}
