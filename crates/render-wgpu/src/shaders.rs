/// WGSL shader for proxy instances lit by the point, directional and spot lights.
///
/// Instances whose color `w` is 1 skip lighting and draw flat (the light
/// marker).
pub const SCENE_SHADER: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
    // xyz = camera position, w = shininess
    view_position: vec4<f32>,

    point_position: vec4<f32>,
    point_ambient: vec4<f32>,
    point_diffuse: vec4<f32>,
    point_specular: vec4<f32>,
    // x = constant, y = linear, z = quadratic
    point_attenuation: vec4<f32>,

    dir_direction: vec4<f32>,
    dir_ambient: vec4<f32>,
    dir_diffuse: vec4<f32>,
    dir_specular: vec4<f32>,

    spot_position: vec4<f32>,
    spot_direction: vec4<f32>,
    spot_ambient: vec4<f32>,
    spot_diffuse: vec4<f32>,
    spot_specular: vec4<f32>,
    // x = cos(inner), y = cos(outer)
    spot_cutoff: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> u: Uniforms;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct InstanceInput {
    @location(2) model_0: vec4<f32>,
    @location(3) model_1: vec4<f32>,
    @location(4) model_2: vec4<f32>,
    @location(5) model_3: vec4<f32>,
    @location(6) color: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
    @location(2) color: vec4<f32>,
};

@vertex
fn vs_main(vertex: VertexInput, instance: InstanceInput) -> VertexOutput {
    let model = mat4x4<f32>(
        instance.model_0,
        instance.model_1,
        instance.model_2,
        instance.model_3,
    );
    let world_pos = model * vec4<f32>(vertex.position, 1.0);

    var out: VertexOutput;
    out.clip_position = u.view_proj * world_pos;
    out.world_position = world_pos.xyz;
    out.world_normal = normalize((model * vec4<f32>(vertex.normal, 0.0)).xyz);
    out.color = instance.color;
    return out;
}

fn phong(
    light_dir: vec3<f32>,
    normal: vec3<f32>,
    view_dir: vec3<f32>,
    ambient: vec3<f32>,
    diffuse: vec3<f32>,
    specular: vec3<f32>,
    base: vec3<f32>,
) -> vec3<f32> {
    let diff = max(dot(normal, light_dir), 0.0);
    let reflect_dir = reflect(-light_dir, normal);
    let spec = pow(max(dot(view_dir, reflect_dir), 0.0), u.view_position.w);
    return ambient * base + diffuse * diff * base + specular * spec;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let base = in.color.rgb;
    if (in.color.w > 0.5) {
        return vec4<f32>(base, 1.0);
    }

    let normal = normalize(in.world_normal);
    let view_dir = normalize(u.view_position.xyz - in.world_position);

    var result = phong(
        normalize(-u.dir_direction.xyz), normal, view_dir,
        u.dir_ambient.rgb, u.dir_diffuse.rgb, u.dir_specular.rgb, base,
    );

    let to_point = u.point_position.xyz - in.world_position;
    let distance = length(to_point);
    let att = u.point_attenuation;
    let attenuation = 1.0 / (att.x + att.y * distance + att.z * distance * distance);
    result += attenuation * phong(
        normalize(to_point), normal, view_dir,
        u.point_ambient.rgb, u.point_diffuse.rgb, u.point_specular.rgb, base,
    );

    let to_spot = normalize(u.spot_position.xyz - in.world_position);
    let theta = dot(to_spot, normalize(-u.spot_direction.xyz));
    let epsilon = u.spot_cutoff.x - u.spot_cutoff.y;
    let intensity = clamp((theta - u.spot_cutoff.y) / epsilon, 0.0, 1.0);
    result += intensity * phong(
        to_spot, normal, view_dir,
        u.spot_ambient.rgb, u.spot_diffuse.rgb, u.spot_specular.rgb, base,
    );

    return vec4<f32>(result, 1.0);
}
"#;
