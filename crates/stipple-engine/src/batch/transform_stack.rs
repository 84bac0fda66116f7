use std::ops::{Deref, DerefMut};

use crate::coords::Affine;

use super::Batcher;

/// Stack of composed CPU-side transforms applied to generator input points.
///
/// Each entry stores the full composite, so `current()` is O(1).
#[derive(Debug, Default)]
pub struct TransformStack {
    stack: Vec<Affine>,
}

impl TransformStack {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Composite of every pushed transform (identity when empty).
    #[inline]
    pub fn current(&self) -> Affine {
        self.stack.last().copied().unwrap_or(Affine::IDENTITY)
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Pushes `local` relative to the current composite (`local` applies first).
    #[inline]
    pub(crate) fn push(&mut self, local: Affine) {
        let composite = self.current() * local;
        self.stack.push(composite);
    }

    /// Pushes `absolute`, ignoring the current composite.
    #[inline]
    pub(crate) fn push_absolute(&mut self, absolute: Affine) {
        self.stack.push(absolute);
    }

    #[inline]
    pub(crate) fn pop(&mut self) {
        if self.stack.pop().is_none() {
            log::warn!("transform stack popped while empty (cleared under a live guard?)");
        }
    }

    #[inline]
    pub(crate) fn clear(&mut self) {
        self.stack.clear();
    }
}

/// Scoped transform: pops its entry from the batcher's transform stack when dropped.
///
/// Derefs to the [`Batcher`], so drawing continues through the guard:
///
/// ```no_run
/// # use stipple_engine::batch::Batcher;
/// # use stipple_engine::coords::{Affine, Rect, Vec2};
/// # use stipple_engine::paint::Color;
/// # fn demo(batcher: &mut Batcher) -> Result<(), stipple_engine::BatchError> {
/// let mut moved = batcher.push_transform(Affine::translate(Vec2::new(10.0, 0.0)));
/// moved.rect(Rect::new(0.0, 0.0, 4.0, 4.0), Color::WHITE)?;
/// # Ok(())
/// # }
/// ```
#[must_use = "the transform is popped as soon as the guard is dropped"]
pub struct TransformGuard<'a> {
    batcher: &'a mut Batcher,
}

impl<'a> TransformGuard<'a> {
    #[inline]
    pub(crate) fn new(batcher: &'a mut Batcher) -> Self {
        Self { batcher }
    }
}

impl Deref for TransformGuard<'_> {
    type Target = Batcher;

    #[inline]
    fn deref(&self) -> &Batcher {
        self.batcher
    }
}

impl DerefMut for TransformGuard<'_> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Batcher {
        self.batcher
    }
}

impl Drop for TransformGuard<'_> {
    fn drop(&mut self) {
        self.batcher.transforms.pop();
    }
}
