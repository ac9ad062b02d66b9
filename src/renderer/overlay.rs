//! Text overlay rendered via egui on top of the arena.
//!
//! `egui_wgpu::Renderer::render()` needs a `RenderPass<'static>`, so a frame
//! goes through four phases:
//!
//!   1. `prepare()` -- paint the captions, tessellate to primitives
//!   2. `upload()`  -- upload textures and buffers (borrows the encoder)
//!   3. `paint()`   -- draw into a second pass made with `forget_lifetime()`
//!   4. `cleanup()` -- free textures egui no longer references
//!
//! Captions are positioned in viewport pixels, which are egui points since
//! the window's logical size is the viewport.

use winit::window::Window;

use super::scene::{Anchor, Caption};
use super::vertex::colors;

/// Caption font size in points
pub const TEXT_SIZE: f32 = 28.0;

pub struct TextOverlay {
    egui_ctx: egui::Context,
    egui_winit_state: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl TextOverlay {
    pub fn new(device: &wgpu::Device, surface_format: wgpu::TextureFormat, window: &Window) -> Self {
        let egui_ctx = egui::Context::default();
        let egui_winit_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui_ctx.viewport_id(),
            window,
            None,
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(
            device,
            surface_format,
            egui_wgpu::RendererOptions::default(),
        );

        Self {
            egui_ctx,
            egui_winit_state,
            egui_renderer,
        }
    }

    /// Keep egui's view of the window (size, scale factor) current
    pub fn handle_window_event(&mut self, window: &Window, event: &winit::event::WindowEvent) {
        let _ = self.egui_winit_state.on_window_event(window, event);
    }

    pub fn prepare(
        &mut self,
        window: &Window,
        captions: &[Caption],
    ) -> (Vec<egui::ClippedPrimitive>, egui::TexturesDelta) {
        let raw_input = self.egui_winit_state.take_egui_input(window);
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            let painter = ctx.layer_painter(egui::LayerId::new(
                egui::Order::Foreground,
                egui::Id::new("captions"),
            ));
            for caption in captions {
                let anchor = match caption.anchor {
                    Anchor::TopLeft => egui::Align2::LEFT_TOP,
                    Anchor::Center => egui::Align2::CENTER_CENTER,
                };
                painter.text(
                    egui::pos2(caption.pos.x, caption.pos.y),
                    anchor,
                    &caption.text,
                    egui::FontId::proportional(TEXT_SIZE),
                    text_color(),
                );
            }
        });

        self.egui_winit_state
            .handle_platform_output(window, full_output.platform_output);

        let primitives = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        (primitives, full_output.textures_delta)
    }

    /// Upload textures and update buffers. Call before creating the overlay pass.
    pub fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        primitives: &[egui::ClippedPrimitive],
        textures_delta: &egui::TexturesDelta,
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) -> Vec<wgpu::CommandBuffer> {
        for (id, image_delta) in &textures_delta.set {
            self.egui_renderer
                .update_texture(device, queue, *id, image_delta);
        }

        self.egui_renderer
            .update_buffers(device, queue, encoder, primitives, screen_descriptor)
    }

    /// Render into an existing render pass. Call after `upload()`.
    pub fn paint(
        &self,
        render_pass: &mut wgpu::RenderPass<'static>,
        primitives: &[egui::ClippedPrimitive],
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) {
        self.egui_renderer
            .render(render_pass, primitives, screen_descriptor);
    }

    pub fn cleanup(&mut self, textures_delta: &egui::TexturesDelta) {
        for id in &textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
    }
}

fn text_color() -> egui::Color32 {
    let [r, g, b, a] = colors::TEXT.map(|c| (c * 255.0).round() as u8);
    egui::Color32::from_rgba_unmultiplied(r, g, b, a)
}
