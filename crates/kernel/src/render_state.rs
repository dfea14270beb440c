/// Packed values a draw call reads, owned by exactly one scene entity.
///
/// The owning entity writes the fields; the rendering backend only reads
/// them. Once destroyed the record is inert.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderState<T> {
    fields: T,
    destroyed: bool,
}

impl<T> RenderState<T> {
    pub fn new(initial: T) -> Self {
        Self {
            fields: initial,
            destroyed: false,
        }
    }

    pub fn get(&self) -> &T {
        &self.fields
    }

    pub fn get_mut(&mut self) -> &mut T {
        debug_assert!(!self.destroyed, "write to released render state");
        &mut self.fields
    }

    /// Release the record. Repeated calls are harmless.
    pub fn destroy(&mut self) {
        self.destroyed = true;
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stores_initial_fields() {
        let state = RenderState::new((1.0_f32, true));
        assert_eq!(*state.get(), (1.0, true));
        assert!(!state.is_destroyed());
    }

    #[test]
    fn get_mut_writes_through() {
        let mut state = RenderState::new([0.0_f32; 3]);
        state.get_mut()[1] = 5.0;
        assert_eq!(state.get(), &[0.0, 5.0, 0.0]);
    }

    #[test]
    fn destroy_marks_inert() {
        let mut state = RenderState::new(0_u32);
        state.destroy();
        state.destroy();
        assert!(state.is_destroyed());
    }
}
