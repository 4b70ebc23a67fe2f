use bytemuck::{Pod, Zeroable};
use gallery_core::{HoverStyle, IndicatorFrame, IndicatorIcon};
use glam::Mat4;

/// Textured plane with optional hover treatment. `params.x` selects the
/// style (0 plain, 1 outline, 2 wireframe), `params.y` is 1 once a video frame
/// has been uploaded, `params.z` is 1 for the focused plane.
pub(super) const PLANE_SHADER_SOURCE: &str = r#"
struct PlaneUniforms {
    mvp: mat4x4<f32>,
    params: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> plane: PlaneUniforms;
@group(0) @binding(1)
var video_texture: texture_2d<f32>;
@group(0) @binding(2)
var video_sampler: sampler;

struct VertexInput {
    @location(0) position: vec2<f32>,
    @location(1) uv: vec2<f32>,
};

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_main(input: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.position = plane.mvp * vec4<f32>(input.position, 0.0, 1.0);
    out.uv = input.uv;
    return out;
}

const PLACEHOLDER: vec3<f32> = vec3<f32>(0.12, 0.12, 0.14);
const OUTLINE_COLOR: vec3<f32> = vec3<f32>(1.0, 1.0, 1.0);
const WIRE_COLOR: vec3<f32> = vec3<f32>(0.35, 1.0, 0.55);

@fragment
fn fs_main(input: VertexOutput) -> @location(0) vec4<f32> {
    let uv = clamp(input.uv, vec2<f32>(0.0, 0.0), vec2<f32>(1.0, 1.0));
    let sampled = textureSample(video_texture, video_sampler, uv).rgb;
    let base = mix(PLACEHOLDER, sampled, plane.params.y);

    let width = fwidth(input.uv) * 2.0;
    let edge = min(min(uv.x, 1.0 - uv.x), min(uv.y, 1.0 - uv.y));
    let near_edge = edge < max(width.x, width.y) * 1.5;
    let style = u32(plane.params.x + 0.5);

    if style == 1u && near_edge {
        return vec4<f32>(OUTLINE_COLOR, 1.0);
    }
    if style == 2u {
        let diagonal = abs(uv.x - uv.y) < max(width.x, width.y);
        if !(near_edge || diagonal) {
            discard;
        }
        return vec4<f32>(WIRE_COLOR, 1.0);
    }
    return vec4<f32>(base, 1.0);
}
"#;

/// Play/pause glyph drawn over a translucent disc in the middle of the screen.
pub(super) const INDICATOR_SHADER_SOURCE: &str = r#"
struct IndicatorUniforms {
    // x: icon (0 play, 1 pause), y: opacity, z: width / height, w: size in NDC
    params: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> indicator: IndicatorUniforms;

struct VertexInput {
    @location(0) position: vec2<f32>,
    @location(1) uv: vec2<f32>,
};

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) local: vec2<f32>,
};

@vertex
fn vs_main(input: VertexInput) -> VertexOutput {
    let size = indicator.params.w;
    let aspect = max(indicator.params.z, 0.0001);
    var out: VertexOutput;
    out.position = vec4<f32>(input.position.x * size / aspect, input.position.y * size, 0.0, 1.0);
    out.local = input.position;
    return out;
}

fn inside_play(p: vec2<f32>) -> bool {
    // Triangle pointing right: (-0.14, -0.2), (-0.14, 0.2), (0.2, 0.0).
    if p.x < -0.14 {
        return false;
    }
    let half_height = 0.2 * (0.2 - p.x) / 0.34;
    return abs(p.y) <= half_height;
}

fn inside_pause(p: vec2<f32>) -> bool {
    let bar = abs(abs(p.x) - 0.09) < 0.05;
    return bar && abs(p.y) < 0.19;
}

@fragment
fn fs_main(input: VertexOutput) -> @location(0) vec4<f32> {
    let opacity = indicator.params.y;
    let p = input.local;
    if length(p) > 0.5 {
        discard;
    }
    var glyph = false;
    if indicator.params.x < 0.5 {
        glyph = inside_play(p);
    } else {
        glyph = inside_pause(p);
    }
    if glyph {
        return vec4<f32>(1.0, 1.0, 1.0, opacity);
    }
    return vec4<f32>(0.0, 0.0, 0.0, 0.45 * opacity);
}
"#;

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub(super) struct QuadVertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
}

/// Unit quad centred on the origin in the XY plane, facing +Z.
pub(super) const QUAD_VERTICES: [QuadVertex; 4] = [
    QuadVertex {
        position: [-0.5, 0.5],
        uv: [0.0, 0.0],
    },
    QuadVertex {
        position: [0.5, 0.5],
        uv: [1.0, 0.0],
    },
    QuadVertex {
        position: [-0.5, -0.5],
        uv: [0.0, 1.0],
    },
    QuadVertex {
        position: [0.5, -0.5],
        uv: [1.0, 1.0],
    },
];

pub(super) const QUAD_INDICES: [u16; 6] = [0, 1, 2, 2, 1, 3];

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub(super) struct PlaneUniforms {
    pub mvp: [[f32; 4]; 4],
    pub params: [f32; 4],
}

impl PlaneUniforms {
    pub fn new(mvp: Mat4, style: HoverStyle, textured: bool, selected: bool) -> Self {
        let style = match style {
            HoverStyle::Plain => 0.0,
            HoverStyle::Outline => 1.0,
            HoverStyle::Wireframe => 2.0,
        };
        Self {
            mvp: mvp.to_cols_array_2d(),
            params: [
                style,
                if textured { 1.0 } else { 0.0 },
                if selected { 1.0 } else { 0.0 },
                0.0,
            ],
        }
    }
}

/// Indicator diameter as a fraction of the window height, in NDC units.
const INDICATOR_SIZE: f32 = 0.22;

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub(super) struct IndicatorUniforms {
    pub params: [f32; 4],
}

impl IndicatorUniforms {
    pub fn new(frame: IndicatorFrame, aspect: f32) -> Self {
        let icon = match frame.icon {
            IndicatorIcon::Play => 0.0,
            IndicatorIcon::Pause => 1.0,
        };
        Self {
            params: [icon, frame.opacity, aspect, INDICATOR_SIZE],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plane_uniforms_encode_style_and_flags() {
        let uniforms = PlaneUniforms::new(Mat4::IDENTITY, HoverStyle::Wireframe, true, false);
        assert_eq!(uniforms.params, [2.0, 1.0, 0.0, 0.0]);
        assert_eq!(uniforms.mvp[3][3], 1.0);
        assert_eq!(std::mem::size_of::<PlaneUniforms>(), 80);
    }

    #[test]
    fn quad_spans_unit_square() {
        let xs: Vec<f32> = QUAD_VERTICES.iter().map(|v| v.position[0]).collect();
        assert_eq!(xs.iter().cloned().fold(f32::MIN, f32::max), 0.5);
        assert_eq!(xs.iter().cloned().fold(f32::MAX, f32::min), -0.5);
    }
}
