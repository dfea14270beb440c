use bytemuck::{Pod, Zeroable};
use clipview_kernel::{Scene, SectionPlaneState};

/// GPU layout of one section plane: two vec4 slots.
///
/// `active` rides in the w of the first slot and `dist` in the w of the
/// second, so an array of these uploads without padding.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct SectionPlaneUniform {
    pub pos: [f32; 3],
    pub active: u32,
    pub dir: [f32; 3],
    pub dist: f32,
}

impl From<&SectionPlaneState> for SectionPlaneUniform {
    fn from(state: &SectionPlaneState) -> Self {
        Self {
            pos: state.pos.to_array(),
            active: u32::from(state.active),
            dir: state.dir.to_array(),
            dist: state.dist,
        }
    }
}

/// Pack every registered section plane, in id order. Inactive planes are
/// kept so that slot indices stay stable; the shader skips them.
pub fn pack_section_planes(scene: &Scene) -> Vec<SectionPlaneUniform> {
    scene
        .section_plane_states()
        .map(|(_, state)| SectionPlaneUniform::from(state))
        .collect()
}

pub fn as_bytes(uniforms: &[SectionPlaneUniform]) -> &[u8] {
    bytemuck::cast_slice(uniforms)
}
