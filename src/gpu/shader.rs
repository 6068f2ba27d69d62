//! Particle billboard shader and its uniform block.

use bytemuck::{Pod, Zeroable};

/// World-space half-size of a billboard per unit of the size slider.
pub const SIZE_TO_WORLD: f32 = 0.006;

/// Uniforms shared by every particle. Layout matches `Uniforms` in
/// [`PARTICLE_SHADER`].
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct ParticleUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub camera_right: [f32; 4],
    pub camera_up: [f32; 4],
    /// RGB, alpha unused.
    pub color: [f32; 4],
    /// Billboard half-size in world units.
    pub size: f32,
    pub time: f32,
    pub _padding: [f32; 2],
}

/// Each instance is one particle position; six vertices per instance form
/// a camera-facing quad. The fragment stage draws a soft disc meant for
/// additive blending.
pub const PARTICLE_SHADER: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
    camera_right: vec4<f32>,
    camera_up: vec4<f32>,
    color: vec4<f32>,
    size: f32,
    time: f32,
    _padding: vec2<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_main(
    @builtin(vertex_index) vertex_index: u32,
    @location(0) particle_pos: vec3<f32>,
) -> VertexOutput {
    var quad_vertices = array<vec2<f32>, 6>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>( 1.0, -1.0),
        vec2<f32>(-1.0,  1.0),
        vec2<f32>(-1.0,  1.0),
        vec2<f32>( 1.0, -1.0),
        vec2<f32>( 1.0,  1.0),
    );
    let quad_pos = quad_vertices[vertex_index];

    let offset = (uniforms.camera_right.xyz * quad_pos.x + uniforms.camera_up.xyz * quad_pos.y) * uniforms.size;
    let world_pos = vec4<f32>(particle_pos + offset, 1.0);

    var out: VertexOutput;
    out.clip_position = uniforms.view_proj * world_pos;
    out.uv = quad_pos;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let dist = length(in.uv);
    if dist > 1.0 {
        discard;
    }
    let falloff = 1.0 - smoothstep(0.0, 1.0, dist);
    return vec4<f32>(uniforms.color.rgb, falloff * falloff);
}
"#;
