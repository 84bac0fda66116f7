use stipple_engine::batch::{Batch, BlendMode, MaterialId, TextureId};
use stipple_engine::coords::{Affine, Rect, Vec2};
use stipple_engine::paint::Color;
use stipple_engine::render::{BackendCall, BackendError, HandleKind, RecordingBackend, RenderStats};
use stipple_engine::{BatchError, Batcher};

fn unit_rect(x: f32) -> Rect {
    Rect::new(x, 0.0, 1.0, 1.0)
}

/// Small deterministic generator so command streams are reproducible.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u32 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (self.0 >> 33) as u32
    }

    fn below(&mut self, n: u32) -> u32 {
        self.next() % n
    }
}

/// Random mix of layer, texture and blend changes with rects and triangles in between.
fn scramble(b: &mut Batcher, seed: u64, steps: usize) {
    let mut rng = Lcg(seed);
    for i in 0..steps {
        match rng.below(6) {
            0 => b.set_layer(rng.below(5) as i32 - 2),
            1 => b.set_texture(match rng.below(3) {
                0 => None,
                t => Some(TextureId(t)),
            }),
            2 => b.set_blend_mode(if rng.below(2) == 0 {
                BlendMode::Premultiplied
            } else {
                BlendMode::Additive
            }),
            3 => b
                .triangle(
                    [Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0)],
                    Color::RED,
                )
                .unwrap(),
            _ => b.rect(unit_rect(i as f32), Color::WHITE).unwrap(),
        }
    }
}

fn replayed(b: &Batcher) -> Vec<Batch> {
    b.batches().collect()
}

#[test]
fn higher_layers_replay_first_and_equal_state_neighbours_merge() {
    let mut b = Batcher::default();

    b.set_layer(0);
    b.rect(unit_rect(0.0), Color::WHITE).unwrap(); // A
    b.set_layer(5);
    b.set_texture(Some(TextureId(1)));
    b.rect(unit_rect(1.0), Color::WHITE).unwrap(); // B
    b.set_layer(0);
    b.set_texture(None);
    b.rect(unit_rect(2.0), Color::WHITE).unwrap(); // C

    let batches = replayed(&b);
    let summary: Vec<(i32, u32, u32)> = batches.iter().map(|x| (x.layer, x.offset, x.element_count)).collect();
    assert_eq!(summary, vec![(5, 2, 2), (0, 0, 2), (0, 4, 2)]);
    assert!(!batches[0].mergeable_with_next);
    assert!(batches[1].mergeable_with_next);
    assert!(!batches[2].mergeable_with_next);

    let mut backend = RecordingBackend::new();
    let stats = b.render(&mut backend, Affine::IDENTITY).unwrap();
    assert_eq!(
        stats,
        RenderStats {
            uploaded: true,
            batches: 3,
            binds: 2,
            triangles: 6,
        }
    );
    assert_eq!(backend.draws(), vec![(2, 2), (0, 2), (4, 2)]);

    let binds = backend.binds();
    assert_eq!(binds[0].texture, Some(TextureId(1)));
    assert_eq!(binds[1].texture, None);
}

#[test]
fn draws_tile_the_index_buffer_exactly_once() {
    for seed in 1..=16 {
        let mut b = Batcher::default();
        scramble(&mut b, seed, 200);

        let mut backend = RecordingBackend::new();
        let stats = b.render(&mut backend, Affine::IDENTITY).unwrap();

        let mut ranges = backend.draws();
        assert!(ranges.iter().all(|&(_, count)| count > 0), "seed {seed}: empty batch drawn");
        ranges.sort_unstable();

        let mut next = 0;
        for (offset, count) in ranges {
            assert_eq!(offset, next, "seed {seed}: gap or overlap at triangle {next}");
            next = offset + count;
        }
        assert_eq!(next as usize, b.triangle_count(), "seed {seed}");
        assert_eq!(stats.triangles as usize, b.triangle_count());
    }
}

#[test]
fn replay_order_is_layer_sorted_and_stable() {
    for seed in 1..=16 {
        let mut b = Batcher::default();
        scramble(&mut b, seed, 300);

        let batches = replayed(&b);
        assert_eq!(batches.len(), b.batch_count());
        for pair in batches.windows(2) {
            assert!(pair[0].layer >= pair[1].layer, "seed {seed}: layers out of order");
            if pair[0].layer == pair[1].layer {
                // Submission order is offset order, so ties must keep ascending offsets.
                assert!(pair[0].offset < pair[1].offset, "seed {seed}: equal layers reordered");
            }
        }
    }
}

#[test]
fn merge_flags_match_successor_state_and_gate_binds() {
    for seed in 1..=16 {
        let mut b = Batcher::default();
        scramble(&mut b, seed, 250);

        let batches = replayed(&b);
        for pair in batches.windows(2) {
            assert_eq!(pair[0].mergeable_with_next, pair[0].state == pair[1].state, "seed {seed}");
        }
        if let Some(last) = batches.last() {
            assert!(!last.mergeable_with_next);
        }
        // Flags stored on closed batches say the same as the replay.
        for closed in b.batch_list().iter_closed() {
            let seen = batches.iter().find(|x| x.offset == closed.offset).unwrap();
            assert_eq!(closed.mergeable_with_next, seen.mergeable_with_next, "seed {seed}");
        }

        let mut backend = RecordingBackend::new();
        let stats = b.render(&mut backend, Affine::IDENTITY).unwrap();
        let expected_binds = batches.iter().rev().skip(1).filter(|x| !x.mergeable_with_next).count()
            + usize::from(!batches.is_empty());
        assert_eq!(stats.binds as usize, expected_binds, "seed {seed}");
        assert_eq!(backend.binds().len(), expected_binds);

        // Every draw runs under the state of its own batch.
        let mut bound = None;
        let mut drawn = 0;
        for call in backend.calls() {
            match call {
                BackendCall::Bind(state) => bound = Some(*state),
                BackendCall::Draw { .. } => {
                    let state = bound.expect("draw before bind");
                    assert_eq!(state.texture, batches[drawn].state.texture);
                    assert_eq!(state.blend_mode, batches[drawn].state.blend_mode);
                    drawn += 1;
                }
                BackendCall::Upload { .. } => {}
            }
        }
        assert_eq!(drawn, batches.len());
    }
}

#[test]
fn state_changes_without_geometry_create_no_batches() {
    let mut b = Batcher::default();
    b.set_layer(3);
    b.set_texture(Some(TextureId(4)));
    b.set_blend_mode(BlendMode::Additive);
    b.set_layer(-1);
    b.set_material(Some(MaterialId(2)));
    assert_eq!(b.batch_count(), 0);

    b.rect(unit_rect(0.0), Color::WHITE).unwrap();
    let batches = replayed(&b);
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].layer, -1);
    assert_eq!(batches[0].state.texture, Some(TextureId(4)));
    assert_eq!(batches[0].state.material, Some(MaterialId(2)));
}

#[test]
fn repeated_identical_state_keeps_a_single_batch() {
    let mut b = Batcher::default();
    for i in 0..10 {
        b.set_texture(Some(TextureId(1)));
        b.set_layer(2);
        b.rect(unit_rect(i as f32), Color::WHITE).unwrap();
    }
    assert_eq!(b.batch_count(), 1);
    assert_eq!(replayed(&b)[0].element_count, 20);
}

#[test]
fn clear_resets_everything_and_next_render_is_silent() {
    let mut b = Batcher::default();
    b.set_layer(7);
    b.set_texture(Some(TextureId(9)));
    b.rect(unit_rect(0.0), Color::WHITE).unwrap();
    b.clear();
    b.clear();

    assert_eq!(b.vertex_count(), 0);
    assert_eq!(b.triangle_count(), 0);
    assert_eq!(b.batch_count(), 0);
    assert_eq!(b.layer(), 0);
    assert_eq!(b.state().texture, None);

    let mut backend = RecordingBackend::new();
    let stats = b.render(&mut backend, Affine::IDENTITY).unwrap();
    assert_eq!(stats, RenderStats::default());
    assert!(backend.calls().is_empty());
}

#[test]
fn quad_indices_reference_its_own_vertices() {
    let mut b = Batcher::default();
    b.triangle([Vec2::ZERO, Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0)], Color::RED)
        .unwrap();
    b.rect(Rect::new(10.0, 20.0, 30.0, 40.0), Color::BLUE).unwrap();

    let mut backend = RecordingBackend::new();
    b.render(&mut backend, Affine::IDENTITY).unwrap();

    assert_eq!(backend.vertices().len(), 7);
    assert_eq!(backend.indices().len(), 9);
    assert_eq!(backend.draw_indices(1, 1), &[3, 4, 5]);
    assert_eq!(backend.draw_indices(2, 1), &[3, 5, 6]);

    let positions: Vec<[f32; 2]> = backend.vertices()[3..].iter().map(|v| v.pos).collect();
    assert_eq!(positions, vec![[10.0, 20.0], [40.0, 20.0], [40.0, 60.0], [10.0, 60.0]]);
}

#[test]
fn unchanged_geometry_is_uploaded_once() {
    let mut b = Batcher::default();
    b.rect(unit_rect(0.0), Color::WHITE).unwrap();

    let mut backend = RecordingBackend::new();
    assert!(b.render(&mut backend, Affine::IDENTITY).unwrap().uploaded);
    assert!(!b.render(&mut backend, Affine::scale(2.0)).unwrap().uploaded);
    assert_eq!(backend.upload_count(), 1);
    assert_eq!(backend.draws(), vec![(0, 2), (0, 2)]);

    b.rect(unit_rect(1.0), Color::WHITE).unwrap();
    assert!(b.render(&mut backend, Affine::IDENTITY).unwrap().uploaded);
    assert_eq!(backend.upload_count(), 2);
}

#[test]
fn bind_transform_composes_view_after_batch_transform() {
    let mut b = Batcher::default();
    let local = Affine::translate(Vec2::new(5.0, 0.0));
    let view = Affine::scale(2.0);
    b.set_transform(local);
    b.rect(unit_rect(0.0), Color::WHITE).unwrap();

    let mut backend = RecordingBackend::new();
    b.render(&mut backend, view).unwrap();

    let bound = backend.binds()[0].transform;
    assert_eq!(bound, view * local);
    assert_eq!(bound.transform_point(Vec2::ZERO), Vec2::new(10.0, 0.0));
    // The GPU transform never touches vertex positions.
    assert_eq!(backend.vertices()[0].pos, [0.0, 0.0]);
}

#[test]
fn cpu_transform_is_baked_into_vertices() {
    let mut b = Batcher::default();
    b.with_transform(Affine::translate(Vec2::new(100.0, 50.0)), |b| {
        b.rect(unit_rect(0.0), Color::WHITE)
    })
    .unwrap();
    assert_eq!(b.transform_depth(), 0);
    assert_eq!(b.geometry().vertices()[0].pos, [100.0, 50.0]);
    assert_eq!(b.state().transform, Affine::IDENTITY);
}

#[test]
#[should_panic(expected = "transform(s) still pushed")]
fn render_with_leaked_transform_guard_panics() {
    let mut b = Batcher::default();
    std::mem::forget(b.push_transform(Affine::scale(2.0)));
    b.rect(unit_rect(0.0), Color::WHITE).unwrap();

    let mut backend = RecordingBackend::new();
    let _ = b.render(&mut backend, Affine::IDENTITY);
}

#[test]
fn disposed_texture_surfaces_as_invalid_handle() {
    let mut b = Batcher::default();
    b.rect(unit_rect(0.0), Color::WHITE).unwrap();
    b.set_texture(Some(TextureId(3)));
    b.rect(unit_rect(1.0), Color::WHITE).unwrap();

    let mut backend = RecordingBackend::new();
    backend.dispose_texture(TextureId(3));

    let err = b.render(&mut backend, Affine::IDENTITY).unwrap_err();
    assert_eq!(
        err,
        BatchError::Backend(BackendError::InvalidHandle {
            kind: HandleKind::Texture,
            id: 3,
        })
    );
    // The first batch drew before the failure; nothing after it did.
    assert_eq!(backend.draws(), vec![(0, 2)]);
}

#[test]
fn disposed_material_surfaces_as_invalid_handle() {
    let mut b = Batcher::default();
    b.set_material(Some(MaterialId(8)));
    b.rect(unit_rect(0.0), Color::WHITE).unwrap();

    let mut backend = RecordingBackend::new();
    backend.dispose_material(MaterialId(8));

    let err = b.render(&mut backend, Affine::IDENTITY).unwrap_err();
    assert!(matches!(
        err,
        BatchError::Backend(BackendError::InvalidHandle {
            kind: HandleKind::Material,
            id: 8,
        })
    ));
    assert!(backend.draws().is_empty());
}

#[test]
fn rerender_into_the_same_backend_skips_only_the_upload() {
    let mut b = Batcher::default();
    scramble(&mut b, 42, 150);

    let mut backend = RecordingBackend::new();
    b.render(&mut backend, Affine::IDENTITY).unwrap();
    let first: Vec<BackendCall> = backend.calls().to_vec();
    backend.clear_calls();
    b.render(&mut backend, Affine::IDENTITY).unwrap();

    assert!(matches!(first[0], BackendCall::Upload { .. }));
    assert_eq!(&first[1..], backend.calls());
}

#[test]
fn switching_backends_after_invalidate_uploads_again() {
    let mut b = Batcher::default();
    b.rect(unit_rect(0.0), Color::WHITE).unwrap();

    let mut first = RecordingBackend::new();
    b.render(&mut first, Affine::IDENTITY).unwrap();

    let mut second = RecordingBackend::new();
    b.invalidate_upload();
    let stats = b.render(&mut second, Affine::IDENTITY).unwrap();

    assert!(stats.uploaded);
    assert_eq!(second.upload_count(), 1);
    assert_eq!(second.draws(), vec![(0, 2)]);
    assert_eq!(second.draw_indices(0, 2), first.draw_indices(0, 2));
    assert_eq!(second.vertices(), first.vertices());
}

#[test]
fn invalidate_on_an_empty_frame_stays_silent() {
    let mut b = Batcher::default();
    b.invalidate_upload();
    let mut backend = RecordingBackend::new();
    assert_eq!(b.render(&mut backend, Affine::IDENTITY).unwrap(), RenderStats::default());
    assert!(backend.calls().is_empty());
}
