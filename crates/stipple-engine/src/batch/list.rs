use super::{Batch, DrawState};

/// Index of a closed batch in the [`BatchList`] arena.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct BatchId(u32);

/// Closed batches in replay order, plus the open batch still accumulating geometry.
///
/// Storage:
/// - `arena` holds closed batches in submission order, so index ranges are contiguous
/// - `order` holds arena ids in replay order: non-increasing `layer`, stable for equal layers
/// - `open` is not in the arena; it is replayed at position `cursor` and moved into the
///   arena when it closes
///
/// Performance characteristics:
/// - closing a batch is O(n) in the number of batches (`Vec::insert` on `order`);
///   batches are few compared to triangles, so this beats a linked structure in practice
/// - no per-frame allocation once warmed; `clear` keeps capacity
#[derive(Debug)]
pub struct BatchList {
    arena: Vec<Batch>,
    order: Vec<BatchId>,
    open: Batch,
    cursor: usize,
}

impl BatchList {
    pub fn new() -> Self {
        Self {
            arena: Vec::new(),
            order: Vec::new(),
            open: Batch::new(0, DrawState::default(), 0),
            cursor: 0,
        }
    }

    /// Drops every batch and reopens a default-state batch on layer 0.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.order.clear();
        self.open = Batch::new(0, DrawState::default(), 0);
        self.cursor = 0;
    }

    /// Number of closed batches.
    #[inline]
    pub fn closed_len(&self) -> usize {
        self.order.len()
    }

    /// Number of batches a replay would draw (closed batches plus a non-empty open batch).
    #[inline]
    pub fn len(&self) -> usize {
        self.order.len() + usize::from(!self.open.is_empty())
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn open(&self) -> &Batch {
        &self.open
    }

    /// Replay position of the open batch.
    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[inline]
    pub fn get(&self, id: BatchId) -> &Batch {
        &self.arena[id.0 as usize]
    }

    /// Closed batch at replay position `pos`.
    #[inline]
    pub fn at(&self, pos: usize) -> &Batch {
        self.get(self.order[pos])
    }

    /// Closed batches in replay order.
    pub fn iter_closed(&self) -> impl Iterator<Item = &Batch> + '_ {
        self.order.iter().map(move |&id| self.get(id))
    }

    /// Closed batches in submission order.
    #[inline]
    pub fn submitted(&self) -> &[Batch] {
        &self.arena
    }

    /// Grows the open batch by `triangles`.
    #[inline]
    pub fn add_elements(&mut self, triangles: u32) {
        let was_empty = self.open.is_empty();
        self.open.element_count += triangles;
        if was_empty && triangles > 0 {
            // The open batch now replays after the cursor's predecessor.
            if let Some(pos) = self.cursor.checked_sub(1) {
                self.refresh_flag(pos);
            }
        }
    }

    /// Applies a state change to the open batch.
    ///
    /// - empty open batch: mutated in place
    /// - changed state: the open batch closes and a fresh one continues from its end
    /// - unchanged state: no-op
    pub fn apply_state(&mut self, next: DrawState) {
        if self.open.is_empty() {
            self.open.state = next;
            return;
        }
        if self.open.state == next {
            return;
        }

        log::trace!(
            "batch split at triangle {} (layer {}, {} triangles)",
            self.open.end(),
            self.open.layer,
            self.open.element_count
        );

        self.close_open();
        self.open.state = next;
    }

    /// Moves the open batch to `layer`, closing it first if it holds geometry.
    ///
    /// The batch preceding the new cursor becomes mergeable once the open batch
    /// receives geometry with identical state (see [`add_elements`](Self::add_elements)).
    pub fn set_layer(&mut self, layer: i32) {
        if layer == self.open.layer {
            return;
        }

        if !self.open.is_empty() {
            self.close_open();
        }

        let at = self.insertion_index(layer);
        log::trace!("layer {} -> {layer}, insertion cursor {} -> {at}", self.open.layer, self.cursor);

        self.open.layer = layer;
        self.cursor = at;
    }

    /// First replay position whose batch layer is less than `layer`.
    #[inline]
    pub fn insertion_index(&self, layer: i32) -> usize {
        // `order` is sorted by non-increasing layer, so this is a partition point.
        self.order.partition_point(|&id| self.get(id).layer >= layer)
    }

    /// Batches in replay order with the open batch spliced in at the cursor.
    ///
    /// `mergeable_with_next` is evaluated against the batch that follows in this
    /// sequence; for closed batches it equals the stored flag.
    pub fn replay(&self) -> impl Iterator<Item = Batch> + '_ {
        let (head, tail) = self.order.split_at(self.cursor);
        let open = (!self.open.is_empty()).then_some(&self.open);

        let mut seq = head
            .iter()
            .map(move |&id| self.get(id))
            .chain(open)
            .chain(tail.iter().map(move |&id| self.get(id)))
            .peekable();

        std::iter::from_fn(move || {
            let current = seq.next()?;
            let mut batch = *current;
            batch.mergeable_with_next = seq.peek().is_some_and(|next| current.shares_state(next));
            Some(batch)
        })
    }

    /// Inserts the open batch at the cursor and opens a fresh one after it.
    fn close_open(&mut self) {
        let closed = self.open;
        let at = self.cursor;
        self.insert(at, closed);
        self.cursor += 1;
        self.open = Batch::new(closed.layer, closed.state, closed.end());

        // Neighbour flags now refer to different successors.
        if let Some(prev) = at.checked_sub(1) {
            self.refresh_flag(prev);
        }
        self.refresh_flag(at);
    }

    /// State of the batch replayed right after closed position `pos`.
    ///
    /// An empty open batch is never replayed, so it is skipped.
    fn successor_state(&self, pos: usize) -> Option<&DrawState> {
        if pos + 1 == self.cursor && !self.open.is_empty() {
            return Some(&self.open.state);
        }
        self.order.get(pos + 1).map(|&id| &self.get(id).state)
    }

    fn refresh_flag(&mut self, pos: usize) {
        let Some(&id) = self.order.get(pos) else { return };
        let shares = self.successor_state(pos) == Some(&self.get(id).state);
        self.arena[id.0 as usize].mergeable_with_next = shares;
    }

    fn insert(&mut self, at: usize, batch: Batch) {
        debug_assert!(!batch.is_empty(), "empty batches are never closed");
        debug_assert!(at == 0 || self.at(at - 1).layer >= batch.layer, "insert breaks layer order");
        debug_assert!(at == self.order.len() || self.at(at).layer <= batch.layer, "insert breaks layer order");
        debug_assert!(self.arena.last().is_none_or(|b| b.end() == batch.offset), "index ranges must be contiguous");

        let id = BatchId(self.arena.len() as u32);
        self.arena.push(batch);
        self.order.insert(at, id);
    }
}

impl Default for BatchList {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::{BlendMode, TextureId};

    fn textured(id: u32) -> DrawState {
        DrawState { texture: Some(TextureId(id)), ..DrawState::default() }
    }

    fn layers(list: &BatchList) -> Vec<i32> {
        list.replay().map(|b| b.layer).collect()
    }

    #[test]
    fn fresh_list_is_empty_on_layer_zero() {
        let list = BatchList::new();
        assert!(list.is_empty());
        assert_eq!(list.open().layer, 0);
        assert_eq!(list.cursor(), 0);
        assert_eq!(list.replay().count(), 0);
    }

    #[test]
    fn state_change_on_empty_batch_does_not_split() {
        let mut list = BatchList::new();
        list.apply_state(textured(1));
        list.apply_state(textured(2));
        assert_eq!(list.closed_len(), 0);
        assert_eq!(list.open().state, textured(2));
    }

    #[test]
    fn state_change_after_geometry_splits() {
        let mut list = BatchList::new();
        list.add_elements(2);
        list.apply_state(textured(1));
        list.add_elements(4);

        assert_eq!(list.closed_len(), 1);
        assert_eq!(list.at(0).element_count, 2);
        assert_eq!(list.open().offset, 2);
        assert_eq!(list.open().element_count, 4);
        assert_eq!(list.cursor(), 1);
    }

    #[test]
    fn unchanged_state_does_not_split() {
        let mut list = BatchList::new();
        list.add_elements(2);
        list.apply_state(DrawState::default());
        assert_eq!(list.closed_len(), 0);
    }

    #[test]
    fn split_keeps_other_fields() {
        let mut list = BatchList::new();
        list.apply_state(DrawState { blend_mode: BlendMode::Additive, ..DrawState::default() });
        list.add_elements(1);
        list.apply_state(DrawState { blend_mode: BlendMode::Additive, ..textured(3) });

        assert_eq!(list.open().state.blend_mode, BlendMode::Additive);
        assert_eq!(list.open().state.texture, Some(TextureId(3)));
    }

    #[test]
    fn higher_layers_replay_first() {
        let mut list = BatchList::new();
        list.add_elements(1); // layer 0
        list.set_layer(5);
        list.add_elements(1);
        list.set_layer(-2);
        list.add_elements(1);
        list.set_layer(3);
        list.add_elements(1);

        assert_eq!(layers(&list), vec![5, 3, 0, -2]);
    }

    #[test]
    fn set_layer_to_current_layer_is_a_no_op() {
        let mut list = BatchList::new();
        list.add_elements(1);
        list.set_layer(0);
        assert_eq!(list.closed_len(), 0);
        assert_eq!(list.open().element_count, 1);
    }

    #[test]
    fn empty_open_batch_is_not_closed_on_layer_change() {
        let mut list = BatchList::new();
        list.set_layer(4);
        list.set_layer(2);
        assert_eq!(list.closed_len(), 0);
        assert_eq!(list.open().layer, 2);
    }

    #[test]
    fn equal_layers_keep_insertion_order() {
        let mut list = BatchList::new();
        list.add_elements(1); // A @0, offset 0
        list.set_layer(1);
        list.add_elements(1); // B @1, offset 1
        list.set_layer(0);
        list.add_elements(1); // C @0, offset 2
        list.set_layer(1);
        list.add_elements(1); // D @1, offset 3

        let offsets: Vec<u32> = list.replay().map(|b| b.offset).collect();
        assert_eq!(offsets, vec![1, 3, 0, 2]);
    }

    #[test]
    fn open_batch_replays_at_the_cursor() {
        let mut list = BatchList::new();
        list.add_elements(1); // @0
        list.set_layer(9);
        list.add_elements(1); // @9, still open
        assert_eq!(list.cursor(), 0);
        assert_eq!(layers(&list), vec![9, 0]);
    }

    fn closed_flags(list: &BatchList) -> Vec<(i32, bool)> {
        list.iter_closed().map(|b| (b.layer, b.mergeable_with_next)).collect()
    }

    fn assert_flags_match_replay(list: &BatchList) {
        let replayed: Vec<Batch> = list.replay().collect();
        for closed in list.iter_closed() {
            let seen = replayed.iter().find(|b| b.offset == closed.offset).unwrap();
            assert_eq!(closed.mergeable_with_next, seen.mergeable_with_next, "batch at {}", closed.offset);
        }
    }

    #[test]
    fn set_layer_marks_state_identical_predecessor() {
        let mut list = BatchList::new();
        list.add_elements(1); // A @0
        list.set_layer(5);
        list.add_elements(1); // B @5
        list.set_layer(0);
        list.add_elements(1); // C @0, same state as A

        // A precedes the open batch and shares its state.
        let a = list.iter_closed().find(|b| b.offset == 0).unwrap();
        assert!(a.mergeable_with_next);
        assert_flags_match_replay(&list);
    }

    #[test]
    fn empty_open_batch_never_counts_as_a_successor() {
        let mut list = BatchList::new();
        list.add_elements(1); // A @0
        list.set_layer(5);
        list.add_elements(1); // B @5
        list.set_layer(0);
        list.set_layer(3);

        // Nothing is replayed after A; B is followed by A, whose layer differs but state matches.
        assert_eq!(closed_flags(&list), vec![(5, true), (0, false)]);
        assert_flags_match_replay(&list);

        list.add_elements(1); // D @3 between B and A
        assert_eq!(closed_flags(&list), vec![(5, true), (0, false)]);
        assert_flags_match_replay(&list);
    }

    #[test]
    fn in_place_state_change_keeps_predecessor_flag_exact() {
        let mut list = BatchList::new();
        list.add_elements(1); // A @0
        list.set_layer(5);
        list.add_elements(1); // B @5
        list.set_layer(0);
        list.apply_state(textured(7)); // still empty: changes in place
        assert_eq!(closed_flags(&list), vec![(5, true), (0, false)]);

        list.add_elements(1); // C @0, textured
        assert_eq!(closed_flags(&list), vec![(5, true), (0, false)]);
        assert_flags_match_replay(&list);
    }

    #[test]
    fn stored_flags_agree_with_replay_under_mixed_commands() {
        let mut list = BatchList::new();
        let script = [(2, 0), (0, 1), (2, 0), (2, 1), (1, 1), (0, 0), (1, 0), (2, 0)];
        for (i, (layer, tex)) in script.into_iter().enumerate() {
            list.set_layer(layer);
            list.apply_state(textured(tex));
            assert_flags_match_replay(&list);
            list.add_elements(i as u32 % 2 + 1);
            assert_flags_match_replay(&list);
        }
    }

    #[test]
    fn replay_flags_follow_the_real_successor() {
        let mut list = BatchList::new();
        list.add_elements(1); // A @0, default state
        list.set_layer(5);
        list.add_elements(1); // B @5
        list.set_layer(0); // marks A
        list.apply_state(textured(7)); // open batch is empty: changes in place
        list.add_elements(1); // C @0, textured

        let seq: Vec<Batch> = list.replay().collect();
        assert_eq!(seq.len(), 3);
        assert_eq!(seq[1].offset, 0);
        assert!(!seq[1].mergeable_with_next, "A must not merge into a textured batch");
    }

    #[test]
    fn replay_ranges_tile_the_triangle_range() {
        let mut list = BatchList::new();
        for (i, layer) in [3, 1, 3, 0, 2, 1, 3].into_iter().enumerate() {
            list.set_layer(layer);
            list.apply_state(textured(i as u32 % 2));
            list.add_elements(i as u32 + 1);
        }

        let mut ranges: Vec<(u32, u32)> = list.replay().map(|b| (b.offset, b.end())).collect();
        ranges.sort();
        let mut expected = 0;
        for (start, end) in ranges {
            assert_eq!(start, expected);
            expected = end;
        }
        assert_eq!(expected, (1..=7).sum::<u32>());
    }

    #[test]
    fn clear_resets_everything() {
        let mut list = BatchList::new();
        list.add_elements(1);
        list.set_layer(3);
        list.apply_state(textured(1));
        list.add_elements(1);
        list.clear();

        assert!(list.is_empty());
        assert_eq!(list.closed_len(), 0);
        assert_eq!(list.open(), &Batch::new(0, DrawState::default(), 0));
        assert_eq!(list.cursor(), 0);
    }
}
