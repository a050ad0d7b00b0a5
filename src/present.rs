//! GPU pass that puts the finished CPU frame on screen.
//!
//! The output [`Canvas`] is uploaded to a texture every tick and drawn as a
//! fullscreen triangle, letterboxed so the fixed-size frame keeps its aspect
//! ratio whatever size the window surface ends up with.

use log::warn;

use crate::canvas::Canvas;
use crate::gpu::GpuContext;

/// Uniforms for the present pass.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct PresentUniforms {
    /// Clip-space scale applied to the fullscreen triangle.
    scale: [f32; 2],
    /// Padding for alignment.
    _pad: [f32; 2],
}

/// GPU resources for presenting a canvas.
pub struct Presenter {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    frame_texture: wgpu::Texture,
    frame_size: (u32, u32),
}

impl Presenter {
    /// Create a presenter for frames of `width` x `height` pixels.
    pub fn new(gpu: &GpuContext, width: u32, height: u32) -> Self {
        let device = &gpu.device;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Present Shader"),
            source: wgpu::ShaderSource::Wgsl(PRESENT_SHADER.into()),
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Present Uniforms"),
            size: std::mem::size_of::<PresentUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let frame_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Frame Texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let frame_view = frame_texture.create_view(&wgpu::TextureViewDescriptor::default());

        // Nearest filtering keeps pixels crisp when the window matches the frame.
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Frame Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Present Bind Group Layout"),
            entries: &[
                // Uniforms
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                // Frame texture
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                // Sampler
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Present Bind Group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&frame_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Present Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Present Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: gpu.config.format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Self {
            pipeline,
            uniform_buffer,
            bind_group,
            frame_texture,
            frame_size: (width, height),
        }
    }

    /// Upload `canvas` and present it to the window surface.
    ///
    /// A lost or outdated surface is reconfigured and the frame is dropped.
    pub fn present(&self, gpu: &mut GpuContext, canvas: &Canvas) {
        let (width, height) = self.frame_size;
        if canvas.size() != self.frame_size {
            warn!(
                "canvas is {:?} but presenter expects {:?}; skipping frame",
                canvas.size(),
                self.frame_size
            );
            return;
        }

        let output = match gpu.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                warn!("surface lost, reconfiguring");
                gpu.reconfigure();
                return;
            }
            Err(e) => {
                warn!("failed to get surface texture: {}", e);
                return;
            }
        };
        let screen_view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        gpu.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.frame_texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            canvas.data(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );

        let uniforms = PresentUniforms {
            scale: letterbox_scale(self.frame_size, (gpu.width(), gpu.height())),
            _pad: [0.0; 2],
        };
        gpu.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[uniforms]));

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Present Encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Present Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &screen_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.bind_group, &[]);
            pass.draw(0..3, 0..1);
        }

        gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
    }
}

/// Clip-space scale that fits a `frame` into a `surface` without distortion.
fn letterbox_scale(frame: (u32, u32), surface: (u32, u32)) -> [f32; 2] {
    let (fw, fh) = (frame.0.max(1) as f32, frame.1.max(1) as f32);
    let (sw, sh) = (surface.0.max(1) as f32, surface.1.max(1) as f32);
    let fit = (sw / fw).min(sh / fh);
    [fw * fit / sw, fh * fit / sh]
}

/// Present shader - samples the frame texture over a fullscreen triangle.
const PRESENT_SHADER: &str = r#"
struct Uniforms {
    scale: vec2f,
    _pad: vec2f,
}

struct VsOut {
    @builtin(position) pos: vec4f,
    @location(0) uv: vec2f,
}

@group(0) @binding(0) var<uniform> u: Uniforms;
@group(0) @binding(1) var frame_texture: texture_2d<f32>;
@group(0) @binding(2) var frame_sampler: sampler;

@vertex
fn vs(@builtin(vertex_index) vi: u32) -> VsOut {
    // Fullscreen triangle, uv (0,0) at the top-left corner
    let uv = vec2f(f32((vi << 1u) & 2u), f32(vi & 2u));
    var out: VsOut;
    out.pos = vec4f((uv.x * 2.0 - 1.0) * u.scale.x, (1.0 - uv.y * 2.0) * u.scale.y, 0.0, 1.0);
    out.uv = uv;
    return out;
}

@fragment
fn fs(in: VsOut) -> @location(0) vec4f {
    // Past the frame edge the triangle only covers the letterbox bars
    let color = textureSample(frame_texture, frame_sampler, in.uv);
    if (any(in.uv > vec2f(1.0))) {
        return vec4f(0.0, 0.0, 0.0, 1.0);
    }
    return color;
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shader_blacks_out_uvs_past_the_frame() {
        let fs = PRESENT_SHADER
            .split("fn fs(")
            .nth(1)
            .expect("fragment entry point");
        assert!(fs.contains("any(in.uv > vec2f(1.0))"));
        assert!(fs.contains("vec4f(0.0, 0.0, 0.0, 1.0)"));
    }

    #[test]
    fn matching_sizes_fill_the_surface() {
        assert_eq!(letterbox_scale((800, 600), (800, 600)), [1.0, 1.0]);
        assert_eq!(letterbox_scale((800, 600), (1600, 1200)), [1.0, 1.0]);
    }

    #[test]
    fn wide_surface_gets_pillarboxed() {
        let [x, y] = letterbox_scale((800, 600), (1600, 600));
        assert!((x - 0.5).abs() < 1e-6);
        assert!((y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn tall_surface_gets_letterboxed() {
        let [x, y] = letterbox_scale((800, 600), (800, 1200));
        assert!((x - 1.0).abs() < 1e-6);
        assert!((y - 0.5).abs() < 1e-6);
    }
}
