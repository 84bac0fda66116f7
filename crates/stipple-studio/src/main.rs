use anyhow::Context;
use stipple_engine::atlas::AtlasRegion;
use stipple_engine::batch::{BlendMode, Vertex};
use stipple_engine::coords::{Affine, CornerRadii, Rect, Vec2, Viewport};
use stipple_engine::device::{Gpu, GpuInit};
use stipple_engine::logging::{init_logging, LoggingConfig};
use stipple_engine::paint::{Color, ImageMode};
use stipple_engine::render::{RenderStats, WgpuBackend};
use stipple_engine::text::{FontAtlas, SpriteFont};
use stipple_engine::window::{App, AppControl, FrameCtx, Runtime, RuntimeConfig};
use stipple_engine::{BatchError, Batcher};

const FONT_PX: f32 = 18.0;

fn main() -> anyhow::Result<()> {
    init_logging(LoggingConfig::default());

    let config = RuntimeConfig {
        title: "stipple studio".to_string(),
        ..RuntimeConfig::default()
    };
    Runtime::run(config, GpuInit::default().with_env_overrides(), Studio::default())
}

/// Demo scene: layered cards, textured tiles, text, and a spinning overlay.
#[derive(Default)]
struct Studio {
    batcher: Batcher,
    backend: Option<WgpuBackend>,
    font: Option<FontAtlas>,
    checker: Option<AtlasRegion>,
    last_stats: RenderStats,
}

impl App for Studio {
    fn on_start(&mut self, gpu: &Gpu<'_>) -> anyhow::Result<()> {
        let mut backend = WgpuBackend::new(gpu.device(), gpu.queue(), gpu.surface_format(), &Vertex::LAYOUT);

        let checker = checkerboard(8, 4);
        let texture = backend
            .create_texture(8, 8, &checker)
            .context("failed to upload checkerboard")?;
        self.checker = Some(AtlasRegion::whole(texture));

        match load_font() {
            Some(bytes) => {
                let atlas = FontAtlas::build(&bytes, FONT_PX, ' '..='~', 1).context("failed to build font atlas")?;
                let texture = backend
                    .create_texture(atlas.width(), atlas.height(), atlas.pixels())
                    .context("failed to upload font atlas")?;
                self.font = Some(atlas.with_texture(texture));
            }
            None => log::warn!("no system font found; text is disabled"),
        }

        self.backend = Some(backend);
        Ok(())
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let viewport = ctx.viewport();
        let t = ctx.elapsed.as_secs_f32();

        self.batcher.clear();
        if let Err(e) = self.draw_scene(viewport, t) {
            log::error!("scene dropped: {e}");
            self.batcher.clear();
        }

        let Some(backend) = self.backend.as_mut() else {
            return AppControl::Continue;
        };
        backend.set_target(ctx.target_info());

        match self.batcher.render(backend, viewport.to_clip()) {
            Ok(stats) => self.last_stats = stats,
            Err(e) => {
                log::error!("render failed: {e}");
                return AppControl::Exit;
            }
        }

        let clear = ctx.clear_color;
        ctx.present(|encoder, view| backend.encode(encoder, view, Some(clear)))
    }
}

impl Studio {
    fn draw_scene(&mut self, viewport: Viewport, t: f32) -> Result<(), BatchError> {
        let b = &mut self.batcher;

        // Background grid. Drawn last in code but on the highest layer, so it
        // replays first and ends up underneath everything.
        b.set_layer(10);
        let grid = Color::from_hex(0x2a2a33);
        let mut x = 0.0;
        while x < viewport.width {
            b.line(Vec2::new(x, 0.0), Vec2::new(x, viewport.height), 1.0, grid)?;
            x += 32.0;
        }
        let mut y = 0.0;
        while y < viewport.height {
            b.line(Vec2::new(0.0, y), Vec2::new(viewport.width, y), 1.0, grid)?;
            y += 32.0;
        }

        // Cards interleave solid, textured and text geometry on layer 0.
        b.set_layer(0);
        for i in 0..3 {
            let card = Rect::new(40.0 + i as f32 * 260.0, 60.0, 230.0, 150.0);
            b.rounded_rect(card, CornerRadii::uniform(12.0), Color::from_hex(0x3b3b4f))?;
            b.hollow_rect(card.inset(6.0), 1.0, Color::from_hex(0x5b5b7a))?;

            if let Some(tile) = &self.checker {
                b.set_image_mode(if i == 1 { ImageMode::Wash } else { ImageMode::Normal });
                let dest = Rect::new(card.origin.x + 16.0, card.origin.y + 16.0, 64.0, 64.0);
                b.image_stretched(tile, dest, Color::from_straight(120, 200, 255, 255))?;
                b.set_image_mode(ImageMode::Normal);
            }

            if let Some(font) = &self.font {
                let at = Vec2::new(card.origin.x + 96.0, card.origin.y + 24.0);
                b.text(font, &format!("card {i}\nlayer 0"), at, Color::WHITE)?;
            }
        }

        // Clipped pulse, scissored to the middle card.
        let pulse = 20.0 + 10.0 * (t * 2.0).sin();
        b.set_scissor(Some(Rect::new(300.0, 60.0, 230.0, 150.0)));
        b.circle(Vec2::new(530.0, 210.0), pulse * 3.0, Color::from_straight(255, 120, 80, 160))?;
        b.set_scissor(None);

        // Spinning additive star on top.
        b.set_layer(-10);
        b.set_blend_mode(BlendMode::Additive);
        let center = Vec2::new(viewport.width - 120.0, viewport.height - 120.0);
        b.with_transform(Affine::translate(center) * Affine::rotate(t), |b| {
            for k in 0..5 {
                let a = k as f32 * std::f32::consts::TAU / 5.0;
                let tip = Vec2::from_angle(a) * 80.0;
                let side = Vec2::from_angle(a + 0.3) * 20.0;
                let other = Vec2::from_angle(a - 0.3) * 20.0;
                b.triangle_colors(
                    [tip, side, other],
                    [Color::from_straight(255, 220, 90, 255), Color::TRANSPARENT, Color::TRANSPARENT],
                )?;
            }
            Ok::<(), BatchError>(())
        })?;
        b.set_blend_mode(BlendMode::Premultiplied);

        if let Some(font) = &self.font {
            let s = self.last_stats;
            let hud = format!("{} batches  {} binds  {} triangles", s.batches, s.binds, s.triangles);
            let anchor = Vec2::new(viewport.width - 16.0, 16.0);
            b.text_justified(font, &hud, anchor, Vec2::new(1.0, 0.0), Color::from_hex(0xc8c8d0))?;
            log::trace!("hud width {}", font.measure_line(&hud));
        }
        Ok(())
    }
}

/// `size`×`size` RGBA checkerboard with `cell`-pixel squares.
fn checkerboard(size: u32, cell: u32) -> Vec<u8> {
    let mut pixels = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            let v = if (x / cell + y / cell) % 2 == 0 { 255 } else { 96 };
            pixels.extend_from_slice(&[v, v, v, 255]);
        }
    }
    pixels
}

fn load_font() -> Option<Vec<u8>> {
    [
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/noto/NotoSans-Regular.ttf",
        "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
        "C:\\Windows\\Fonts\\segoeui.ttf",
        "/System/Library/Fonts/Supplemental/Arial.ttf",
    ]
    .iter()
    .find_map(|p| std::fs::read(p).ok())
}
