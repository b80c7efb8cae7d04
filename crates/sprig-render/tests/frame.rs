use sprig_render::batch::{DrawCommand, Mesh, TextureDraw};
use sprig_render::coords::{ColorRgba, Matrix, Rect, Vec2};
use sprig_render::filter::{BlurFilter, Filter, GlowFilter};
use sprig_render::gpu::{BlendMode, Call, HeadlessContext, ImageId, ImageSource};
use sprig_render::logging::{LoggingConfig, init_logging};
use sprig_render::{RenderBuffer, RenderConfig, RenderContext};

const W: u32 = 320;
const H: u32 = 240;

fn stage() -> (RenderContext<HeadlessContext>, RenderBuffer) {
    init_logging(LoggingConfig::with_filter("sprig_render=trace"));
    let mut cx = RenderContext::new(HeadlessContext::new(W, H), RenderConfig::default()).unwrap();
    cx.graphics_mut().register_image(ImageId(1));
    cx.graphics_mut().register_image(ImageId(2));
    let stage = RenderBuffer::root(&mut cx, W, H).unwrap();
    (cx, stage)
}

fn sprite(stage: &mut RenderBuffer, cx: &mut RenderContext<HeadlessContext>, image: u32, x: f32, y: f32) {
    let src = Rect::new(0.0, 0.0, 16.0, 16.0);
    stage.draw_image(
        cx,
        ImageSource::Image(ImageId(image)),
        src,
        Rect::new(x, y, 16.0, 16.0),
        Vec2::new(16.0, 16.0),
    );
}

fn texture_draws(gl: &HeadlessContext) -> usize {
    gl.draws()
        .iter()
        .filter(|c| matches!(c, DrawCommand::Texture(_)))
        .count()
}

// ── whole frames ──────────────────────────────────────────────────────────

#[test]
fn sprites_sharing_a_texture_draw_once() {
    let (mut cx, mut stage) = stage();

    stage.begin_clip(&mut cx, &[Rect::new(0.0, 0.0, W as f32, H as f32)], Vec2::zero());
    for i in 0..100 {
        sprite(&mut stage, &mut cx, 1, (i % 20) as f32 * 16.0, (i / 20) as f32 * 16.0);
    }
    stage.end_clip(&mut cx);
    stage.flush(&mut cx);

    assert_eq!(texture_draws(cx.graphics()), 1);
    assert_eq!(stage.draw_calls(), 1);
    assert!(stage.commands().is_empty());
}

#[test]
fn alternating_textures_break_batches() {
    let (mut cx, mut stage) = stage();
    for i in 0..6 {
        sprite(&mut stage, &mut cx, 1 + (i % 2), 0.0, 0.0);
    }
    stage.flush(&mut cx);
    assert_eq!(texture_draws(cx.graphics()), 6);
}

#[test]
fn dirty_region_frame_masks_and_unmasks() {
    let (mut cx, mut stage) = stage();

    let dirty = [Rect::new(10.0, 10.0, 50.0, 50.0)];
    stage.begin_clip(&mut cx, &dirty, Vec2::zero());
    sprite(&mut stage, &mut cx, 1, 20.0, 20.0);
    stage.end_clip(&mut cx);
    stage.flush(&mut cx);

    let kinds: Vec<&'static str> = cx
        .graphics()
        .draws()
        .iter()
        .map(|c| match c {
            DrawCommand::Texture(_) => "texture",
            DrawCommand::Rect { .. } => "rect",
            DrawCommand::PushMask { .. } => "push",
            DrawCommand::PopMask { .. } => "pop",
            DrawCommand::Blend(_) => "blend",
        })
        .collect();
    assert_eq!(kinds, vec!["blend", "rect", "blend", "push", "texture", "pop"]);
    assert!(!stage.stencil_enabled());
}

#[test]
fn frame_finish_presents_and_resets() {
    let (mut cx, mut stage) = stage();
    sprite(&mut stage, &mut cx, 1, 0.0, 0.0);
    stage.flush(&mut cx);
    assert_eq!(stage.draw_calls(), 1);

    stage.on_render_finish(&mut cx);
    assert_eq!(stage.draw_calls(), 0);

    // copied out to the surface, then bound back to the framebuffer
    let last_bind = cx
        .graphics()
        .calls()
        .iter()
        .rev()
        .find_map(|c| match c {
            Call::BindTarget { use_framebuffer, .. } => Some(*use_framebuffer),
            _ => None,
        });
    assert_eq!(last_bind, Some(true));
}

// ── transform contract ────────────────────────────────────────────────────

#[test]
fn transform_survives_render_target_draws() {
    let (mut cx, mut stage) = stage();
    let layer = RenderBuffer::offscreen(&mut cx, 64, 64);

    stage.set_transform(Matrix::new(1.0, 0.0, 0.0, 1.0, 5.0, 5.0));
    stage.translate(2.0, 3.0);
    let before = stage.current_transform();

    let r = Rect::new(0.0, 0.0, 64.0, 64.0);
    stage.draw_image(&mut cx, layer.as_source(), r, r, r.size);
    assert_eq!(stage.current_transform(), before);

    // flipped: the first vertex (top-left of the quad) maps to the bottom edge
    let first = stage.packer().vertices()[0].pos;
    assert_eq!(first, [7.0, 72.0]);
}

#[test]
fn meshes_and_quads_share_one_flush() {
    let (mut cx, mut stage) = stage();
    let uvs = [0.0, 0.0, 1.0, 0.0, 1.0, 1.0];
    let verts = [0.0, 0.0, 16.0, 0.0, 16.0, 16.0];
    let r = Rect::new(0.0, 0.0, 16.0, 16.0);

    sprite(&mut stage, &mut cx, 1, 0.0, 0.0);
    stage.draw_mesh(
        &mut cx,
        ImageId(1),
        TextureDraw::new(r, r, r.size).with_mesh(Mesh::new(&uvs, &verts, &[0, 1, 2]), None),
    );
    stage.flush(&mut cx);

    // quad run and mesh run stay separate; both drawn from the mesh index buffer
    assert_eq!(texture_draws(cx.graphics()), 2);
    let uploads: Vec<usize> = cx
        .graphics()
        .calls()
        .iter()
        .filter_map(|c| match c {
            Call::UploadIndices(n) => Some(*n),
            _ => None,
        })
        .collect();
    assert_eq!(uploads, vec![2000 * 6, 9, 2000 * 6]);
}

// ── filters ───────────────────────────────────────────────────────────────

#[test]
fn filtered_sprite_composites_and_recycles() {
    let (mut cx, mut stage) = stage();
    stage.push_filters(vec![BlurFilter::new(4.0, 0.0).into()]);
    sprite(&mut stage, &mut cx, 1, 100.0, 100.0);
    stage.pop_filters();
    sprite(&mut stage, &mut cx, 1, 0.0, 0.0);
    stage.flush(&mut cx);

    assert_eq!(cx.pooled_buffers(), 1);
    assert_eq!(cx.current_target(), Some(stage.target_id()));
    assert!(stage.filters().is_empty());
}

#[test]
fn glow_inside_nested_layers_is_ignored() {
    let (mut cx, mut stage) = stage();
    let glow = GlowFilter::new(ColorRgba::from_rgb_u32(0xFF0000, 1.0), 4.0, 4.0);
    stage.push_filters(vec![glow.into()]);
    stage.push_filters(vec![BlurFilter::new(0.0, 2.0).into()]);
    assert_eq!(stage.filters(), vec![Filter::from(BlurFilter::new(0.0, 2.0))]);

    sprite(&mut stage, &mut cx, 1, 0.0, 0.0);
    // a lone vertical blur draws directly, no intermediates
    assert_eq!(cx.pooled_buffers(), 0);
    stage.clear_filters();
}

#[test]
fn pool_reuse_across_frames() {
    let (mut cx, mut stage) = stage();
    let glow = GlowFilter::new(ColorRgba::new(1.0, 1.0, 1.0, 1.0), 2.0, 2.0).with_offset(4.0, 45.0);

    for _ in 0..3 {
        stage.push_filters(vec![glow.into()]);
        sprite(&mut stage, &mut cx, 1, 50.0, 50.0);
        stage.pop_filters();
        stage.flush(&mut cx);
        stage.on_render_finish(&mut cx);
    }
    assert_eq!(cx.pooled_buffers(), 3);
    // root + three pooled buffers
    assert_eq!(cx.graphics().live_targets(), 4);
}

// ── failure modes ─────────────────────────────────────────────────────────

#[test]
fn lost_context_frame_is_silent_and_recovers() {
    let (mut cx, mut stage) = stage();
    cx.graphics_mut().set_context_lost(true);
    sprite(&mut stage, &mut cx, 1, 0.0, 0.0);
    stage.flush(&mut cx);
    assert_eq!(texture_draws(cx.graphics()), 0);

    cx.graphics_mut().set_context_lost(false);
    sprite(&mut stage, &mut cx, 1, 0.0, 0.0);
    stage.flush(&mut cx);
    assert_eq!(texture_draws(cx.graphics()), 1);
}

#[test]
fn blend_changes_without_drawing_collapse() {
    let (mut cx, mut stage) = stage();
    stage.set_global_composite_operation(BlendMode::Lighter);
    stage.set_global_composite_operation(BlendMode::Lighter);
    stage.set_global_composite_operation(BlendMode::DestinationIn);
    stage.set_global_composite_operation(BlendMode::Lighter);
    sprite(&mut stage, &mut cx, 1, 0.0, 0.0);

    assert_eq!(stage.commands()[0], DrawCommand::Blend(BlendMode::Lighter));
    assert_eq!(stage.commands().len(), 2);
}
