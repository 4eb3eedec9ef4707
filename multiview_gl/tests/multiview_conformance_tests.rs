//! Conformance tests for the GL_ANGLE_multiview framebuffer state
//!
//! Each test drives a WebGL-compatible context (extensions must be requested)
//! through the public entry points and checks errors, queries, completeness
//! and pixels.
//!
//! Run with: cargo test --test multiview_conformance_tests

use multiview_gl::mvgl::{
    AttachmentParameter, BlitFilter, BufferMask, Context, ContextConfig, ErrorCode,
    FramebufferTarget,
};
use multiview_gl::mvgl::framebuffer::{AttachmentPoint, FramebufferKey, FramebufferStatus, ViewLayout};
use multiview_gl::mvgl::texture::{InternalFormat, TextureKey, TextureTarget};

const MULTIVIEW: &str = "GL_ANGLE_multiview";
const FB: FramebufferTarget = FramebufferTarget::Framebuffer;
const COLOR0: AttachmentPoint = AttachmentPoint::Color(0);
const COLOR1: AttachmentPoint = AttachmentPoint::Color(1);

// ============================================================================
// TEST HELPERS
// ============================================================================

/// 128x128 context in WebGL-compatibility mode
fn webgl_context() -> Context {
    Context::new(ContextConfig {
        window_width: 128,
        window_height: 128,
        webgl_compatibility: true,
        ..ContextConfig::default()
    })
    .unwrap()
}

/// Request the multiview extension if possible; false when unavailable
fn request_multiview(ctx: &mut Context) -> bool {
    if ctx.extension_requestable(MULTIVIEW) {
        ctx.request_extension(MULTIVIEW).unwrap();
    }
    ctx.extension_enabled(MULTIVIEW)
}

fn bound_framebuffer(ctx: &mut Context) -> FramebufferKey {
    let fb = ctx.create_framebuffer();
    ctx.bind_framebuffer(FB, Some(fb)).unwrap();
    fb
}

fn texture_2d(ctx: &mut Context, format: InternalFormat, width: i32, height: i32) -> TextureKey {
    let tex = ctx.create_texture();
    ctx.bind_texture(TextureTarget::Texture2D, Some(tex)).unwrap();
    ctx.tex_image_2d(TextureTarget::Texture2D, 0, format, width, height, None).unwrap();
    tex
}

fn rgba_1x1(ctx: &mut Context) -> TextureKey {
    texture_2d(ctx, InternalFormat::Rgba8, 1, 1)
}

fn int_query(ctx: &mut Context, pname: AttachmentParameter) -> i32 {
    ctx.get_framebuffer_attachment_parameter(FB, COLOR0, pname).unwrap().as_int().unwrap()
}

fn side_by_side(
    ctx: &mut Context,
    point: AttachmentPoint,
    tex: Option<TextureKey>,
    num_views: i32,
    offsets: &[i32],
) {
    ctx.framebuffer_texture_multiview_side_by_side(FB, point, tex, 0, num_views, offsets).unwrap();
}

// ============================================================================
// STATE QUERIES
// ============================================================================

#[test]
fn test_default_state() {
    let mut ctx = webgl_context();
    assert!(request_multiview(&mut ctx));

    bound_framebuffer(&mut ctx);
    let tex = rgba_1x1(&mut ctx);
    ctx.framebuffer_texture_2d(FB, COLOR0, TextureTarget::Texture2D, Some(tex), 0).unwrap();

    assert_eq!(int_query(&mut ctx, AttachmentParameter::NumViews), 1);
    assert_eq!(int_query(&mut ctx, AttachmentParameter::BaseViewIndex), 0);
    let layout = ctx.get_framebuffer_attachment_parameter(FB, COLOR0, AttachmentParameter::MultiviewLayout)
        .unwrap();
    assert_eq!(layout.as_layout(), Some(ViewLayout::None));
    let offsets = ctx.get_framebuffer_attachment_parameter(FB, COLOR0, AttachmentParameter::ViewportOffsets)
        .unwrap();
    assert_eq!(offsets.as_ints(), Some(&[0, 0][..]));
    assert_eq!(ctx.get_error(), ErrorCode::NoError);
}

#[test]
fn test_negative_framebuffer_state_queries() {
    let mut ctx = webgl_context();
    bound_framebuffer(&mut ctx);
    let tex = rgba_1x1(&mut ctx);
    ctx.framebuffer_texture_2d(FB, COLOR0, TextureTarget::Texture2D, Some(tex), 0).unwrap();

    for pname in [
        AttachmentParameter::NumViews,
        AttachmentParameter::BaseViewIndex,
        AttachmentParameter::MultiviewLayout,
        AttachmentParameter::ViewportOffsets,
    ] {
        assert!(ctx.get_framebuffer_attachment_parameter(FB, COLOR0, pname).is_err());
        assert_eq!(ctx.get_error(), ErrorCode::InvalidEnum, "{:?}", pname);
    }
}

#[test]
fn test_modify_side_by_side_state() {
    let mut ctx = webgl_context();
    assert!(request_multiview(&mut ctx));
    bound_framebuffer(&mut ctx);
    let tex = rgba_1x1(&mut ctx);

    let offsets = [0, 0, 1, 2];
    side_by_side(&mut ctx, COLOR0, Some(tex), 2, &offsets);
    assert_eq!(ctx.get_error(), ErrorCode::NoError);

    assert_eq!(int_query(&mut ctx, AttachmentParameter::NumViews), 2);
    assert_eq!(int_query(&mut ctx, AttachmentParameter::BaseViewIndex), 0);
    let layout = ctx.get_framebuffer_attachment_parameter(FB, COLOR0, AttachmentParameter::MultiviewLayout)
        .unwrap();
    assert_eq!(layout.as_layout(), Some(ViewLayout::SideBySide));
    let internal = ctx.get_framebuffer_attachment_parameter(FB, COLOR0, AttachmentParameter::ViewportOffsets)
        .unwrap();
    assert_eq!(internal.as_ints(), Some(&offsets[..]));
    assert_eq!(ctx.get_error(), ErrorCode::NoError);
}

// ============================================================================
// ARGUMENT VALIDATION
// ============================================================================

#[test]
fn test_invalid_side_by_side_arguments() {
    let mut ctx = webgl_context();
    assert!(request_multiview(&mut ctx));
    bound_framebuffer(&mut ctx);
    let tex = rgba_1x1(&mut ctx);

    // Negative offsets
    let result = ctx.framebuffer_texture_multiview_side_by_side(FB, COLOR0, Some(tex), 0, 1, &[-1, 0]);
    assert!(result.is_err());
    assert_eq!(ctx.get_error(), ErrorCode::InvalidValue);

    // Negative number of views
    let result = ctx.framebuffer_texture_multiview_side_by_side(FB, COLOR0, Some(tex), 0, -1, &[0, 0]);
    assert!(result.is_err());
    assert_eq!(ctx.get_error(), ErrorCode::InvalidValue);
}

#[test]
fn test_invalid_layered_arguments() {
    let mut ctx = webgl_context();
    assert!(request_multiview(&mut ctx));
    bound_framebuffer(&mut ctx);

    let tex = ctx.create_texture();
    ctx.bind_texture(TextureTarget::Texture2DArray, Some(tex)).unwrap();
    ctx.tex_image_3d(TextureTarget::Texture2DArray, 0, InternalFormat::Rgba8, 1, 1, 2, None).unwrap();
    assert_eq!(ctx.get_error(), ErrorCode::NoError);

    // Negative base view index
    let result = ctx.framebuffer_texture_multiview_layered(FB, COLOR0, Some(tex), 0, -1, 1);
    assert!(result.is_err());
    assert_eq!(ctx.get_error(), ErrorCode::InvalidValue);

    // base view index + number of views exceeds MAX_ARRAY_TEXTURE_LAYERS
    let max_layers = ctx.config().max_array_texture_layers as i32;
    let result = ctx.framebuffer_texture_multiview_layered(FB, COLOR0, Some(tex), 0, max_layers, 1);
    assert!(result.is_err());
    assert_eq!(ctx.get_error(), ErrorCode::InvalidValue);
}

#[test]
fn test_extension_not_available() {
    let mut ctx = webgl_context();
    bound_framebuffer(&mut ctx);
    let tex = rgba_1x1(&mut ctx);
    assert_eq!(ctx.get_error(), ErrorCode::NoError);

    let result = ctx.framebuffer_texture_multiview_side_by_side(FB, COLOR0, Some(tex), 0, 1, &[0, 0]);
    assert!(result.is_err());
    assert_eq!(ctx.get_error(), ErrorCode::InvalidOperation);
}

// ============================================================================
// COMPLETENESS
// ============================================================================

#[test]
fn test_incomplete_view_targets_side_by_side() {
    let mut ctx = webgl_context();
    assert!(request_multiview(&mut ctx));
    bound_framebuffer(&mut ctx);
    let tex = rgba_1x1(&mut ctx);

    let offsets = [0, 0, 2, 0];
    let other_offsets = [2, 0, 4, 0];

    // Color attachment 0 stays as it is for the whole test
    side_by_side(&mut ctx, COLOR0, Some(tex), 2, &offsets);
    assert_eq!(ctx.get_error(), ErrorCode::NoError);

    // Color attachment 1
    {
        let other = rgba_1x1(&mut ctx);

        // Number of views differ
        side_by_side(&mut ctx, COLOR1, Some(other), 1, &offsets);
        assert_eq!(ctx.check_framebuffer_status(FB), FramebufferStatus::IncompleteViewTargets);

        // Viewport offsets differ
        side_by_side(&mut ctx, COLOR1, Some(other), 2, &other_offsets);
        assert_eq!(ctx.check_framebuffer_status(FB), FramebufferStatus::IncompleteViewTargets);

        // Layouts differ
        ctx.framebuffer_texture_2d(FB, COLOR1, TextureTarget::Texture2D, Some(other), 0).unwrap();
        assert_eq!(ctx.check_framebuffer_status(FB), FramebufferStatus::IncompleteViewTargets);

        // Everything matches
        side_by_side(&mut ctx, COLOR1, Some(other), 2, &offsets);
        assert_eq!(ctx.check_framebuffer_status(FB), FramebufferStatus::Complete);

        // Reset attachment 1
        side_by_side(&mut ctx, COLOR1, None, 1, &offsets);
        assert_eq!(ctx.get_error(), ErrorCode::NoError);
    }

    // Depth attachment
    {
        let depth = texture_2d(&mut ctx, InternalFormat::DepthComponent32F, 1, 1);
        let depth_point = AttachmentPoint::Depth;

        side_by_side(&mut ctx, depth_point, Some(depth), 1, &offsets);
        assert_eq!(ctx.check_framebuffer_status(FB), FramebufferStatus::IncompleteViewTargets);

        side_by_side(&mut ctx, depth_point, Some(depth), 2, &other_offsets);
        assert_eq!(ctx.check_framebuffer_status(FB), FramebufferStatus::IncompleteViewTargets);

        ctx.framebuffer_texture_2d(FB, depth_point, TextureTarget::Texture2D, Some(depth), 0).unwrap();
        assert_eq!(ctx.check_framebuffer_status(FB), FramebufferStatus::IncompleteViewTargets);

        side_by_side(&mut ctx, depth_point, Some(depth), 2, &offsets);
        assert_eq!(ctx.check_framebuffer_status(FB), FramebufferStatus::Complete);
    }
    assert_eq!(ctx.get_error(), ErrorCode::NoError);
}

// ============================================================================
// PIXEL PATHS
// ============================================================================

/// Context with a complete single-view side-by-side framebuffer bound
fn multiview_read_setup() -> (Context, FramebufferKey) {
    let mut ctx = webgl_context();
    assert!(request_multiview(&mut ctx));
    let fb = bound_framebuffer(&mut ctx);
    let tex = rgba_1x1(&mut ctx);
    side_by_side(&mut ctx, COLOR0, Some(tex), 1, &[0, 0]);
    assert_eq!(ctx.check_framebuffer_status(FB), FramebufferStatus::Complete);
    assert_eq!(ctx.get_error(), ErrorCode::NoError);
    (ctx, fb)
}

#[test]
fn test_invalid_copy_tex() {
    let (mut ctx, _) = multiview_read_setup();

    // copy_tex_image_2d and copy_tex_sub_image_2d
    {
        rgba_1x1(&mut ctx);

        assert!(ctx.copy_tex_image_2d(TextureTarget::Texture2D, 0, InternalFormat::Rgba8, 0, 0, 1, 1).is_err());
        assert_eq!(ctx.get_error(), ErrorCode::InvalidFramebufferOperation);

        assert!(ctx.copy_tex_sub_image_2d(TextureTarget::Texture2D, 0, 0, 0, 0, 0, 1, 1).is_err());
        assert_eq!(ctx.get_error(), ErrorCode::InvalidFramebufferOperation);
    }

    // copy_tex_sub_image_3d
    {
        let tex = ctx.create_texture();
        ctx.bind_texture(TextureTarget::Texture3D, Some(tex)).unwrap();
        ctx.tex_image_3d(TextureTarget::Texture3D, 0, InternalFormat::Rgba8, 1, 1, 1, None).unwrap();

        assert!(ctx.copy_tex_sub_image_3d(TextureTarget::Texture3D, 0, 0, 0, 0, 0, 0, 1, 1).is_err());
        assert_eq!(ctx.get_error(), ErrorCode::InvalidFramebufferOperation);
    }
}

#[test]
fn test_copy_tex_from_plain_framebuffer_succeeds() {
    let mut ctx = webgl_context();
    bound_framebuffer(&mut ctx);
    let tex = rgba_1x1(&mut ctx);
    ctx.framebuffer_texture_2d(FB, COLOR0, TextureTarget::Texture2D, Some(tex), 0).unwrap();

    rgba_1x1(&mut ctx);
    ctx.copy_tex_image_2d(TextureTarget::Texture2D, 0, InternalFormat::Rgba8, 0, 0, 1, 1).unwrap();
    ctx.copy_tex_sub_image_2d(TextureTarget::Texture2D, 0, 0, 0, 0, 0, 1, 1).unwrap();
    assert_eq!(ctx.get_error(), ErrorCode::NoError);
}

#[test]
fn test_invalid_blit() {
    let (mut ctx, fb) = multiview_read_setup();

    // Read framebuffer has multiview attachments
    ctx.bind_framebuffer(FramebufferTarget::Read, Some(fb)).unwrap();
    ctx.bind_framebuffer(FramebufferTarget::Draw, None).unwrap();
    assert!(ctx.blit_framebuffer([0, 0, 1, 1], [0, 0, 1, 1], BufferMask::COLOR, BlitFilter::Nearest).is_err());
    assert_eq!(ctx.get_error(), ErrorCode::InvalidFramebufferOperation);

    // Draw framebuffer has multiview attachments
    ctx.bind_framebuffer(FramebufferTarget::Read, None).unwrap();
    ctx.bind_framebuffer(FramebufferTarget::Draw, Some(fb)).unwrap();
    assert!(ctx.blit_framebuffer([0, 0, 1, 1], [0, 0, 1, 1], BufferMask::COLOR, BlitFilter::Nearest).is_err());
    assert_eq!(ctx.get_error(), ErrorCode::InvalidFramebufferOperation);
}

#[test]
fn test_invalid_read_pixels() {
    let (mut ctx, _) = multiview_read_setup();
    assert!(ctx.read_pixels(0, 0, 1, 1).is_err());
    assert_eq!(ctx.get_error(), ErrorCode::InvalidFramebufferOperation);
}

#[test]
fn test_side_by_side_clear() {
    let mut ctx = webgl_context();
    assert!(request_multiview(&mut ctx));

    let multiview_fb = bound_framebuffer(&mut ctx);
    let tex = texture_2d(&mut ctx, InternalFormat::Rgba8, 4, 2);
    side_by_side(&mut ctx, COLOR0, Some(tex), 2, &[1, 0, 3, 0]);

    // Plain framebuffer over the same texture
    let normal_fb = bound_framebuffer(&mut ctx);
    ctx.framebuffer_texture_2d(FB, COLOR0, TextureTarget::Texture2D, Some(tex), 0).unwrap();

    ctx.clear_color(0.0, 0.0, 0.0, 0.0);
    ctx.clear(BufferMask::COLOR).unwrap();

    // Per-view viewport and scissor
    ctx.bind_framebuffer(FB, Some(multiview_fb)).unwrap();
    ctx.viewport(0, 0, 1, 2).unwrap();
    ctx.scissor(0, 0, 1, 2).unwrap();

    ctx.clear_color(1.0, 0.0, 0.0, 0.0);
    ctx.clear(BufferMask::COLOR).unwrap();

    ctx.bind_framebuffer(FB, Some(normal_fb)).unwrap();
    let expected_columns: [[u8; 4]; 4] = [
        [0, 0, 0, 0],
        [255, 0, 0, 0],
        [0, 0, 0, 0],
        [255, 0, 0, 0],
    ];
    for (x, expected) in expected_columns.iter().enumerate() {
        for y in 0..2 {
            let pixel = ctx.read_pixels(x as i32, y, 1, 1).unwrap();
            assert_eq!(pixel, expected.to_vec(), "pixel ({}, {})", x, y);
        }
    }
    assert_eq!(ctx.get_error(), ErrorCode::NoError);
}

#[test]
fn test_side_by_side_clear_with_offsets_at_i32_max() {
    let mut ctx = webgl_context();
    assert!(request_multiview(&mut ctx));

    let multiview_fb = bound_framebuffer(&mut ctx);
    let tex = texture_2d(&mut ctx, InternalFormat::Rgba8, 4, 2);
    side_by_side(&mut ctx, COLOR0, Some(tex), 2, &[i32::MAX, 0, 3, i32::MAX]);
    let offsets = ctx.get_framebuffer_attachment_parameter(FB, COLOR0, AttachmentParameter::ViewportOffsets)
        .unwrap();
    assert_eq!(offsets.as_ints(), Some(&[i32::MAX, 0, 3, i32::MAX][..]));

    let normal_fb = bound_framebuffer(&mut ctx);
    ctx.framebuffer_texture_2d(FB, COLOR0, TextureTarget::Texture2D, Some(tex), 0).unwrap();

    // Both views land outside the 4x2 image
    ctx.bind_framebuffer(FB, Some(multiview_fb)).unwrap();
    ctx.viewport(0, 0, 1, 2).unwrap();
    ctx.scissor(0, 0, 1, 2).unwrap();
    ctx.clear_color(1.0, 0.0, 0.0, 0.0);
    ctx.clear(BufferMask::COLOR).unwrap();

    ctx.bind_framebuffer(FB, Some(normal_fb)).unwrap();
    assert_eq!(ctx.read_pixels(0, 0, 4, 2).unwrap(), vec![0; 32]);
    assert_eq!(ctx.get_error(), ErrorCode::NoError);
}
