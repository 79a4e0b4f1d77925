use bytemuck::{Pod, Zeroable};

/// Frame-wide uniforms: surface size in pixels plus the theme colour shared
/// by particles and links. 32 bytes, uniform-buffer aligned.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Globals {
    pub surface_size: [f32; 2],
    pub _padding: [f32; 2],
    pub color: [f32; 4],
}

/// One corner of a particle quad. The quad is expanded in the vertex shader
/// from the particle centre and its radius; the fragment shader keeps only
/// the inscribed circle.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct ParticleVertex {
    pub center: [f32; 2],
    pub offset: [f32; 2],
    pub size: f32,
    pub opacity: f32,
}

impl ParticleVertex {
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
        0 => Float32x2,
        1 => Float32x2,
        2 => Float32,
        3 => Float32,
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ParticleVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// One endpoint of a connecting stroke, in pixel space.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct LineVertex {
    pub position: [f32; 2],
    pub opacity: f32,
    pub _padding: f32,
}

impl LineVertex {
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x2,
        1 => Float32,
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<LineVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

pub const PARTICLE_SHADER: &str = r#"
struct Globals {
    surface_size: vec2<f32>,
    _padding: vec2<f32>,
    color: vec4<f32>,
};

@group(0) @binding(0) var<uniform> globals: Globals;

struct VertexInput {
    @location(0) center: vec2<f32>,
    @location(1) offset: vec2<f32>,
    @location(2) size: f32,
    @location(3) opacity: f32,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) offset: vec2<f32>,
    @location(1) opacity: f32,
};

fn to_clip(pixel: vec2<f32>) -> vec4<f32> {
    let ndc = vec2<f32>(
        pixel.x / globals.surface_size.x * 2.0 - 1.0,
        1.0 - pixel.y / globals.surface_size.y * 2.0,
    );
    return vec4<f32>(ndc, 0.0, 1.0);
}

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = to_clip(in.center + in.offset * in.size);
    out.offset = in.offset;
    out.opacity = in.opacity;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    if (length(in.offset) > 1.0) {
        discard;
    }
    return vec4<f32>(globals.color.rgb, in.opacity);
}
"#;

pub const LINE_SHADER: &str = r#"
struct Globals {
    surface_size: vec2<f32>,
    _padding: vec2<f32>,
    color: vec4<f32>,
};

@group(0) @binding(0) var<uniform> globals: Globals;

struct VertexInput {
    @location(0) position: vec2<f32>,
    @location(1) opacity: f32,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) opacity: f32,
};

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    let ndc = vec2<f32>(
        in.position.x / globals.surface_size.x * 2.0 - 1.0,
        1.0 - in.position.y / globals.surface_size.y * 2.0,
    );
    var out: VertexOutput;
    out.clip_position = vec4<f32>(ndc, 0.0, 1.0);
    out.opacity = in.opacity;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return vec4<f32>(globals.color.rgb, in.opacity);
}
"#;
