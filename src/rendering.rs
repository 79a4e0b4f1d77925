use wgpu::util::DeviceExt;

use crate::driver::Frame;
use crate::links::Link;
use crate::physics::Particle;
use crate::shaders::{Globals, LineVertex, ParticleVertex, LINE_SHADER, PARTICLE_SHADER};

/// The active colour scheme. Only the fill/stroke pair and the clear colour
/// depend on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn from_name(name: &str) -> Self {
        if name.eq_ignore_ascii_case("dark") {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Particle fill and link stroke colour: near-black ink on the light
    /// theme, white on the dark one.
    pub fn particle_color(self) -> [f32; 4] {
        match self {
            Theme::Light => [26.0 / 255.0, 26.0 / 255.0, 46.0 / 255.0, 1.0],
            Theme::Dark => [1.0, 1.0, 1.0, 1.0],
        }
    }

    pub fn clear_color(self) -> wgpu::Color {
        match self {
            Theme::Light => wgpu::Color {
                r: 0.97,
                g: 0.97,
                b: 0.98,
                a: 1.0,
            },
            Theme::Dark => wgpu::Color {
                r: 26.0 / 255.0,
                g: 26.0 / 255.0,
                b: 46.0 / 255.0,
                a: 1.0,
            },
        }
    }
}

// Two triangles per particle, expanded to the circle's bounding quad.
const QUAD_OFFSETS: [[f32; 2]; 6] = [
    [-1.0, -1.0],
    [1.0, -1.0],
    [-1.0, 1.0],
    [1.0, -1.0],
    [1.0, 1.0],
    [-1.0, 1.0],
];

pub fn particle_vertices(particles: &[Particle]) -> Vec<ParticleVertex> {
    let mut vertices = Vec::with_capacity(particles.len() * 6);
    for particle in particles {
        for offset in QUAD_OFFSETS {
            vertices.push(ParticleVertex {
                center: [particle.position.x, particle.position.y],
                offset,
                size: particle.size,
                opacity: particle.opacity,
            });
        }
    }
    vertices
}

pub fn line_vertices(links: &[Link]) -> Vec<LineVertex> {
    let mut vertices = Vec::with_capacity(links.len() * 2);
    for link in links {
        vertices.push(LineVertex {
            position: [link.a.x, link.a.y],
            opacity: link.opacity,
            _padding: 0.0,
        });
        vertices.push(LineVertex {
            position: [link.b.x, link.b.y],
            opacity: link.opacity,
            _padding: 0.0,
        });
    }
    vertices
}

/// Draws one `Frame`: every particle as a filled circle, then the proximity
/// links as alpha-blended line segments on top.
pub struct MeshRenderer {
    globals_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    particle_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,
    particle_buffer: wgpu::Buffer,
    particle_capacity: usize,
    particle_count: u32,
    line_buffer: wgpu::Buffer,
    line_capacity: usize,
    line_count: u32,
}

impl MeshRenderer {
    pub fn new(device: &wgpu::Device, surface_format: wgpu::TextureFormat) -> Self {
        let globals_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Globals Buffer"),
            contents: bytemuck::bytes_of(&Globals {
                surface_size: [1.0, 1.0],
                _padding: [0.0, 0.0],
                color: [1.0, 1.0, 1.0, 1.0],
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
            label: Some("globals_bind_group_layout"),
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
            label: Some("globals_bind_group"),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Mesh Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let particle_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Particle Shader"),
            source: wgpu::ShaderSource::Wgsl(PARTICLE_SHADER.into()),
        });

        let line_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Line Shader"),
            source: wgpu::ShaderSource::Wgsl(LINE_SHADER.into()),
        });

        let color_target = [Some(wgpu::ColorTargetState {
            format: surface_format,
            blend: Some(wgpu::BlendState::ALPHA_BLENDING),
            write_mask: wgpu::ColorWrites::ALL,
        })];

        let particle_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Particle Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &particle_shader,
                entry_point: "vs_main",
                buffers: &[ParticleVertex::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &particle_shader,
                entry_point: "fs_main",
                targets: &color_target,
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        let line_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Line Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &line_shader,
                entry_point: "vs_main",
                buffers: &[LineVertex::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &line_shader,
                entry_point: "fs_main",
                targets: &color_target,
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::LineList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        let particle_capacity = 80 * 6;
        let particle_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Particle Vertex Buffer"),
            size: (particle_capacity * std::mem::size_of::<ParticleVertex>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let line_capacity = 1024;
        let line_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Line Vertex Buffer"),
            size: (line_capacity * std::mem::size_of::<LineVertex>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            globals_buffer,
            bind_group,
            particle_pipeline,
            line_pipeline,
            particle_buffer,
            particle_capacity,
            particle_count: 0,
            line_buffer,
            line_capacity,
            line_count: 0,
        }
    }

    /// Uploads one frame's geometry and the theme colour.
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        frame: &Frame<'_>,
        theme: Theme,
    ) {
        let globals = Globals {
            surface_size: [frame.extent.x.max(1.0), frame.extent.y.max(1.0)],
            _padding: [0.0, 0.0],
            color: theme.particle_color(),
        };
        queue.write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&globals));

        let particles = particle_vertices(frame.particles);
        if particles.len() > self.particle_capacity {
            self.particle_capacity = particles.len() * 2;
            self.particle_buffer = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("Particle Vertex Buffer"),
                size: (self.particle_capacity * std::mem::size_of::<ParticleVertex>()) as u64,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
        }
        if !particles.is_empty() {
            queue.write_buffer(&self.particle_buffer, 0, bytemuck::cast_slice(&particles));
        }
        self.particle_count = particles.len() as u32;

        let lines = line_vertices(&frame.links);
        if lines.len() > self.line_capacity {
            self.line_capacity = lines.len() * 2;
            self.line_buffer = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("Line Vertex Buffer"),
                size: (self.line_capacity * std::mem::size_of::<LineVertex>()) as u64,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
        }
        if !lines.is_empty() {
            queue.write_buffer(&self.line_buffer, 0, bytemuck::cast_slice(&lines));
        }
        self.line_count = lines.len() as u32;
    }

    pub fn render<'a>(&'a self, render_pass: &mut wgpu::RenderPass<'a>) {
        render_pass.set_bind_group(0, &self.bind_group, &[]);
        if self.particle_count > 0 {
            render_pass.set_pipeline(&self.particle_pipeline);
            render_pass.set_vertex_buffer(0, self.particle_buffer.slice(..));
            render_pass.draw(0..self.particle_count, 0..1);
        }
        if self.line_count > 0 {
            render_pass.set_pipeline(&self.line_pipeline);
            render_pass.set_vertex_buffer(0, self.line_buffer.slice(..));
            render_pass.draw(0..self.line_count, 0..1);
        }
    }
}
