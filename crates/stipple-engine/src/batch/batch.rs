use super::DrawState;

/// A contiguous run of triangles sharing one [`DrawState`].
///
/// `offset` and `element_count` are measured in triangles, not indices: the batch
/// covers indices `offset * 3 .. (offset + element_count) * 3`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Batch {
    pub layer: i32,
    /// The batch replayed after this one has identical state; replay may skip rebinding.
    pub mergeable_with_next: bool,
    pub state: DrawState,
    pub offset: u32,
    pub element_count: u32,
}

impl Batch {
    #[inline]
    pub const fn new(layer: i32, state: DrawState, offset: u32) -> Self {
        Self {
            layer,
            mergeable_with_next: false,
            state,
            offset,
            element_count: 0,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.element_count == 0
    }

    /// First triangle after this batch.
    #[inline]
    pub fn end(&self) -> u32 {
        self.offset + self.element_count
    }

    #[inline]
    pub fn shares_state(&self, other: &Batch) -> bool {
        self.state == other.state
    }
}
