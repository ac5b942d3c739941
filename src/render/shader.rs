/// Shared uniform declarations, prepended to the lit and marker shaders.
const GLOBALS: &str = r#"
struct DirectionalLight {
    direction: vec4<f32>,
    ambient: vec4<f32>,
    diffuse: vec4<f32>,
    specular: vec4<f32>,
}

struct PointLight {
    position: vec4<f32>,
    ambient: vec4<f32>,
    diffuse: vec4<f32>,
    specular: vec4<f32>,
    attenuation: vec4<f32>,
}

struct SpotLight {
    position: vec4<f32>,
    direction: vec4<f32>,
    ambient: vec4<f32>,
    diffuse: vec4<f32>,
    specular: vec4<f32>,
    attenuation: vec4<f32>,
    cut_off: vec4<f32>,
}

struct GlobalUniform {
    view_proj: mat4x4<f32>,
    camera_position: vec4<f32>,
    directional: DirectionalLight,
    points: array<PointLight, 4>,
    spot: SpotLight,
}

struct ObjectUniform {
    model: mat4x4<f32>,
    normal: mat3x4<f32>,
    tint: vec4<f32>,
    material: vec4<f32>,
}

@group(0) @binding(0)
var<uniform> globals: GlobalUniform;

@group(1) @binding(0)
var<uniform> object: ObjectUniform;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
}
"#;

const PHONG_BODY: &str = r#"
@group(1) @binding(1)
var diffuse_map: texture_2d<f32>;
@group(1) @binding(2)
var specular_map: texture_2d<f32>;
@group(1) @binding(3)
var material_sampler: sampler;

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
}

@vertex
fn vs_main(input: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    let world_position = object.model * vec4<f32>(input.position, 1.0);
    out.position = globals.view_proj * world_position;
    out.world_pos = world_position.xyz;
    let normal_matrix = mat3x3<f32>(
        object.normal[0].xyz,
        object.normal[1].xyz,
        object.normal[2].xyz
    );
    out.normal = normalize(normal_matrix * input.normal);
    out.uv = input.uv;
    return out;
}

fn attenuate(factors: vec4<f32>, distance: f32) -> f32 {
    let denominator = factors.x + factors.y * distance + factors.z * distance * distance;
    return 1.0 / max(denominator, 0.0001);
}

fn shade(
    light_dir: vec3<f32>,
    normal: vec3<f32>,
    view_dir: vec3<f32>,
    ambient: vec3<f32>,
    diffuse: vec3<f32>,
    specular: vec3<f32>,
    albedo: vec3<f32>,
    gloss: vec3<f32>,
) -> vec3<f32> {
    let lambert = max(dot(normal, light_dir), 0.0);
    let reflected = reflect(-light_dir, normal);
    let highlight = pow(max(dot(view_dir, reflected), 0.0), object.material.x);
    return ambient * albedo + diffuse * lambert * albedo + specular * highlight * gloss;
}

@fragment
fn fs_main(input: VertexOutput) -> @location(0) vec4<f32> {
    let albedo = textureSample(diffuse_map, material_sampler, input.uv).rgb * object.tint.rgb;
    let gloss = textureSample(specular_map, material_sampler, input.uv).rgb;
    let normal = normalize(input.normal);
    let view_dir = normalize(globals.camera_position.xyz - input.world_pos);

    var color = vec3<f32>(0.0);

    let sun = globals.directional;
    if (sun.direction.w > 0.5) {
        color += shade(normalize(-sun.direction.xyz), normal, view_dir,
            sun.ambient.rgb, sun.diffuse.rgb, sun.specular.rgb, albedo, gloss);
    }

    for (var i = 0u; i < 4u; i = i + 1u) {
        let light = globals.points[i];
        if (light.position.w > 0.5) {
            let offset = light.position.xyz - input.world_pos;
            let strength = attenuate(light.attenuation, length(offset));
            color += strength * shade(normalize(offset), normal, view_dir,
                light.ambient.rgb, light.diffuse.rgb, light.specular.rgb, albedo, gloss);
        }
    }

    let spot = globals.spot;
    if (spot.position.w > 0.5) {
        let offset = spot.position.xyz - input.world_pos;
        let light_dir = normalize(offset);
        let theta = dot(light_dir, normalize(-spot.direction.xyz));
        let epsilon = max(spot.cut_off.x - spot.cut_off.y, 0.0001);
        let cone = clamp((theta - spot.cut_off.y) / epsilon, 0.0, 1.0);
        let strength = attenuate(spot.attenuation, length(offset));
        // Ambient is not masked by the cone.
        color += strength * spot.ambient.rgb * albedo;
        color += strength * cone * shade(light_dir, normal, view_dir,
            vec3<f32>(0.0), spot.diffuse.rgb, spot.specular.rgb, albedo, gloss);
    }

    return vec4<f32>(color, 1.0);
}
"#;

const MARKER_BODY: &str = r#"
@vertex
fn vs_main(input: VertexInput) -> @builtin(position) vec4<f32> {
    return globals.view_proj * object.model * vec4<f32>(input.position, 1.0);
}

@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return vec4<f32>(object.tint.rgb, 1.0);
}
"#;

pub(crate) const LINE_SHADER: &str = r#"
struct LineUniform {
    view_proj: mat4x4<f32>,
}

@group(0) @binding(0)
var<uniform> lines: LineUniform;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) color: vec3<f32>,
}

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) color: vec3<f32>,
}

@vertex
fn vs_main(input: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.position = lines.view_proj * vec4<f32>(input.position, 1.0);
    out.color = input.color;
    return out;
}

@fragment
fn fs_main(input: VertexOutput) -> @location(0) vec4<f32> {
    return vec4<f32>(input.color, 1.0);
}
"#;

pub(crate) fn phong_shader() -> String {
    [GLOBALS, PHONG_BODY].concat()
}

pub(crate) fn marker_shader() -> String {
    [GLOBALS, MARKER_BODY].concat()
}
