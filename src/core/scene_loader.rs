// Copyright @yucwang 2026

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::core::accelerator::Accelerator;
use crate::core::camera::{ApertureShape, Camera};
use crate::core::error::RenderError;
use crate::core::medium::VolumeMedium;
use crate::core::scene::{Scene, SceneObject};
use crate::core::shape::Shape;
use crate::core::texture::{FilterMode, Texture3D, WrapMode};
use crate::core::transfer_function::TransferFunction1D;
use crate::emitters::area::{EmissionUnit, Light};
use crate::io::vol_utils::read_vol;
use crate::math::aabb::AABB;
use crate::math::constants::{Float, Vector3f};
use crate::math::spectrum::ColorXYZ;
use crate::math::transform::Transform;
use crate::shapes::cube::Cube;
use crate::shapes::disk::Disk;
use crate::shapes::rectangle::Rectangle;
use crate::shapes::sphere::Sphere;

#[derive(Debug, thiserror::Error)]
pub enum SceneLoadError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("missing field: {0}")]
    MissingField(&'static str),

    #[error("invalid value for '{field}': {value}")]
    InvalidValue { field: String, value: String },

    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Settings from the `<render>` block. The command line overrides them.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RenderSettings {
    pub frames: Option<u32>,
    pub seed: Option<u64>,
}

pub struct SceneLoadResult {
    pub scene: Scene,
    pub settings: RenderSettings,
}

/// Loads a scene description. With `device`, the volume grid lives in
/// accelerator memory, otherwise on the host.
pub fn load_scene<P: AsRef<Path>>(path: P, device: Option<&Arc<Accelerator>>) -> Result<SceneLoadResult, SceneLoadError> {
    let path = path.as_ref();
    log::info!("Loading scene from: {}.", path.display());
    let xml = fs::read_to_string(path)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    parse_scene(&xml, base_dir, device)
}

#[derive(Debug, Default)]
struct XmlNode {
    tag: String,
    attrs: HashMap<String, String>,
    children: Vec<XmlNode>,
}

impl XmlNode {
    fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(|v| v.as_str())
    }

    fn child(&self, tag: &str) -> Option<&XmlNode> {
        self.children.iter().find(|c| c.tag == tag)
    }

    fn children_named<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a XmlNode> + 'a {
        self.children.iter().filter(move |c| c.tag == tag)
    }

    /// Value of a typed property child such as `<float name=".." value=".."/>`.
    fn property(&self, tag: &str, name: &str) -> Option<&str> {
        self.children.iter()
            .find(|c| c.tag == tag && c.attr("name") == Some(name))
            .and_then(|c| c.attr("value"))
    }

    fn float(&self, name: &str) -> Result<Option<Float>, SceneLoadError> {
        self.property("float", name).map(|v| parse_float(name, v)).transpose()
    }

    fn integer(&self, name: &str) -> Result<Option<i64>, SceneLoadError> {
        self.property("integer", name).map(|v| parse_integer(name, v)).transpose()
    }

    fn string(&self, name: &str) -> Option<&str> {
        self.property("string", name)
    }

    fn boolean(&self, name: &str) -> Result<Option<bool>, SceneLoadError> {
        self.property("boolean", name).map(|v| parse_bool(name, v)).transpose()
    }

    fn rgb(&self, name: &str) -> Result<Option<ColorXYZ>, SceneLoadError> {
        self.property("rgb", name).map(|v| parse_rgb(name, v)).transpose()
    }

    fn point(&self, name: &str) -> Result<Option<Vector3f>, SceneLoadError> {
        self.property("point", name).map(|v| parse_vec3(name, v)).transpose()
    }
}

fn read_node(e: &BytesStart<'_>, defaults: &HashMap<String, String>) -> Result<XmlNode, SceneLoadError> {
    let tag = String::from_utf8_lossy(e.name().as_ref()).to_string();
    let mut attrs = HashMap::new();
    for attr in e.attributes().flatten() {
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let value = attr.unescape_value().map_err(|err| SceneLoadError::Parse(err.to_string()))?;
        attrs.insert(key, resolve_value(&value, defaults));
    }
    Ok(XmlNode { tag, attrs, children: Vec::new() })
}

fn parse_tree(xml: &str) -> Result<XmlNode, SceneLoadError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut buf = Vec::new();

    let mut defaults: HashMap<String, String> = HashMap::new();
    let mut stack: Vec<XmlNode> = vec![XmlNode::default()];

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Eof) => break,
            Ok(Event::Start(e)) => {
                let node = read_node(&e, &defaults)?;
                stack.push(node);
            }
            Ok(Event::Empty(e)) => {
                let node = read_node(&e, &defaults)?;
                if node.tag == "default" {
                    if let (Some(k), Some(v)) = (node.attr("name"), node.attr("value")) {
                        defaults.insert(k.to_string(), v.to_string());
                    }
                }
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(node);
                }
            }
            Ok(Event::End(_)) => {
                let node = stack.pop().ok_or_else(|| SceneLoadError::Parse(String::from("unbalanced end tag")))?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(node),
                    None => return Err(SceneLoadError::Parse(String::from("unbalanced end tag"))),
                }
            }
            Err(e) => {
                return Err(SceneLoadError::Parse(e.to_string()));
            }
            _ => {}
        }

        buf.clear();
    }

    if stack.len() != 1 {
        return Err(SceneLoadError::Parse(String::from("unexpected end of document")));
    }
    let mut root = stack.pop().unwrap_or_default();
    match root.children.iter().position(|c| c.tag == "scene") {
        Some(idx) => Ok(root.children.swap_remove(idx)),
        None => Err(SceneLoadError::MissingField("scene")),
    }
}

fn parse_scene(xml: &str, base_dir: &Path, device: Option<&Arc<Accelerator>>) -> Result<SceneLoadResult, SceneLoadError> {
    let root = parse_tree(xml)?;

    let camera_node = root.child("camera").ok_or(SceneLoadError::MissingField("camera"))?;
    let mut scene = Scene::new(parse_camera(camera_node)?);

    if let Some(volume_node) = root.child("volume") {
        scene.volume = Some(parse_volume(volume_node, base_dir, device)?);
    }

    for light_node in root.children_named("light") {
        scene.add_light(parse_light(light_node)?);
    }

    for object_node in root.children_named("object") {
        let shape = parse_shape(object_node)?;
        let reflectance = object_node.rgb("reflectance")?.unwrap_or_else(|| ColorXYZ::splat(0.5));
        let mut object = SceneObject::new(shape, reflectance);
        if let Some(id) = object_node.attr("id") {
            object = object.with_name(id.to_string());
        }
        scene.add_object(object);
    }

    let mut settings = RenderSettings::default();
    if let Some(render_node) = root.child("render") {
        settings.frames = render_node.integer("frames")?.map(|v| v.max(0) as u32);
        settings.seed = render_node.integer("seed")?.map(|v| v as u64);
    }

    log::info!("Scene loaded: {} lights, {} objects, volume: {}.",
               scene.lights.len(), scene.objects.len(), scene.volume.is_some());
    Ok(SceneLoadResult { scene, settings })
}

fn parse_camera(node: &XmlNode) -> Result<Camera, SceneLoadError> {
    let lookat = node.child("transform")
        .and_then(|t| t.child("lookat"))
        .ok_or(SceneLoadError::MissingField("camera.lookat"))?;
    let origin = parse_vec3("origin", lookat.attr("origin").ok_or(SceneLoadError::MissingField("lookat.origin"))?)?;
    let target = parse_vec3("target", lookat.attr("target").ok_or(SceneLoadError::MissingField("lookat.target"))?)?;
    let up = match lookat.attr("up") {
        Some(v) => parse_vec3("up", v)?,
        None => Vector3f::y(),
    };

    let fov = node.float("fov")?.unwrap_or(45.0);
    let width = node.integer("width")?.unwrap_or(512);
    let height = node.integer("height")?.unwrap_or(512);

    let mut camera = Camera::look_at(origin, target, up, fov, width as i32, height as i32)
        .with_clip(node.float("near_clip")?.unwrap_or(0.0), node.float("far_clip")?.unwrap_or(1e4));

    let aperture_size = node.float("aperture_size")?.unwrap_or(0.0);
    let aperture_shape = match node.string("aperture_shape") {
        Some(shape) => shape.parse::<ApertureShape>()?,
        None => ApertureShape::Circular,
    };
    let blades = node.integer("aperture_blades")?.unwrap_or(6).max(0) as u32;
    let angle = node.float("aperture_angle")?.unwrap_or(0.0).to_radians();
    camera = camera.with_aperture(aperture_size, aperture_shape, blades, angle);

    if let Some(focal_distance) = node.float("focal_distance")? {
        camera = camera.with_focal_distance(focal_distance);
    }
    camera = camera.with_exposure(node.float("exposure")?.unwrap_or(1.0));

    camera.validate()?;
    Ok(camera)
}

fn parse_volume(node: &XmlNode, base_dir: &Path, device: Option<&Arc<Accelerator>>) -> Result<VolumeMedium, SceneLoadError> {
    let filename = node.string("filename").ok_or(SceneLoadError::MissingField("volume.filename"))?;
    let filename = if Path::new(filename).is_absolute() {
        filename.to_string()
    } else {
        base_dir.join(filename).to_string_lossy().to_string()
    };
    let grid = read_vol(&filename)?;

    let filter_mode = match node.string("filter") {
        None | Some("linear") | Some("trilinear") => FilterMode::Linear,
        Some("nearest") => FilterMode::Nearest,
        Some(other) => return Err(invalid("volume.filter", other)),
    };
    let wrap_mode = match node.string("wrap") {
        None | Some("clamp") => WrapMode::Clamp,
        Some("repeat") => WrapMode::Repeat,
        Some("mirror") => WrapMode::Mirror,
        Some(other) => return Err(invalid("volume.wrap", other)),
    };

    let mut texture = match device {
        Some(device) => Texture3D::new_device("Intensity", device, filter_mode),
        None => Texture3D::new_host("Intensity", filter_mode),
    };
    texture.set_wrap_mode(wrap_mode);
    grid.upload(&mut texture)?;

    let bounds = match (node.point("bbox_min")?, node.point("bbox_max")?) {
        (Some(p_min), Some(p_max)) => AABB::new(p_min, p_max),
        _ => grid.bounds,
    };

    let mut volume = VolumeMedium::new(texture, bounds);
    if let Some(density_scale) = node.float("density_scale")? {
        volume = volume.with_density_scale(density_scale);
    }
    let step_size = node.float("step_size")?.unwrap_or_else(|| volume.step_size());
    let shadow_step_size = node.float("shadow_step_size")?.unwrap_or(2.0 * step_size);
    volume = volume.with_step_sizes(step_size, shadow_step_size);

    if let Some(opacity) = node.child("opacity") {
        let mut nodes = Vec::new();
        for n in opacity.children_named("node") {
            let x = parse_float("opacity.x", n.attr("x").ok_or(SceneLoadError::MissingField("opacity.node.x"))?)?;
            let v = parse_float("opacity.value", n.attr("value").ok_or(SceneLoadError::MissingField("opacity.node.value"))?)?;
            nodes.push((x, v));
        }
        volume = volume.with_opacity(TransferFunction1D::new(nodes));
    }
    if let Some(diffuse) = node.child("diffuse") {
        let mut nodes = Vec::new();
        for n in diffuse.children_named("node") {
            let x = parse_float("diffuse.x", n.attr("x").ok_or(SceneLoadError::MissingField("diffuse.node.x"))?)?;
            let v = parse_rgb("diffuse.rgb", n.attr("rgb").ok_or(SceneLoadError::MissingField("diffuse.node.rgb"))?)?;
            nodes.push((x, v));
        }
        volume = volume.with_diffuse(TransferFunction1D::new(nodes));
    }

    Ok(volume)
}

fn parse_light(node: &XmlNode) -> Result<Light, SceneLoadError> {
    let shape = parse_shape(node)?;
    let emission = node.rgb("emission")?.unwrap_or_else(|| ColorXYZ::splat(1.0));
    let unit = match node.string("unit") {
        Some(unit) => unit.parse::<EmissionUnit>().map_err(|_| invalid("light.unit", unit))?,
        None => EmissionUnit::Radiance,
    };

    Ok(Light::new(shape, emission)
        .with_multiplier(node.float("multiplier")?.unwrap_or(1.0))
        .with_unit(unit)
        .with_one_sided(node.boolean("one_sided")?.unwrap_or(false))
        .with_visible(node.boolean("visible")?.unwrap_or(true)))
}

fn parse_shape(node: &XmlNode) -> Result<Arc<dyn Shape>, SceneLoadError> {
    let to_world = match node.child("transform") {
        Some(t) => parse_transform(t)?,
        None => Transform::default(),
    };

    let shape: Arc<dyn Shape> = match node.attr("type").unwrap_or("rectangle") {
        "rectangle" => Arc::new(Rectangle::new(to_world)),
        "disk" => Arc::new(Disk::new(to_world, node.float("inner_radius")?.unwrap_or(0.0))),
        "cube" => Arc::new(Cube::new(to_world)),
        "sphere" => {
            let center = node.point("center")?.unwrap_or_else(Vector3f::zeros);
            let radius = node.float("radius")?.unwrap_or(1.0);
            Arc::new(Sphere::new(to_world.apply_point(center), radius))
        }
        other => return Err(invalid(&format!("{}.type", node.tag), other)),
    };
    Ok(shape)
}

/// Operations apply in document order: each one is left-multiplied.
fn parse_transform(node: &XmlNode) -> Result<Transform, SceneLoadError> {
    let mut transform = Transform::default();
    for op in &node.children {
        let next = match op.tag.as_str() {
            "translate" => Transform::translate(parse_xyz(op, 0.0)?),
            "scale" => match op.attr("value") {
                Some(v) => {
                    let s = parse_float("scale.value", v)?;
                    Transform::scale(Vector3f::repeat(s))
                }
                None => Transform::scale(parse_xyz(op, 1.0)?),
            },
            "rotate" => {
                let axis = match op.attr("axis") {
                    Some(v) => parse_vec3("rotate.axis", v)?,
                    None => parse_xyz(op, 0.0)?,
                };
                let angle = parse_float("rotate.angle", op.attr("angle").ok_or(SceneLoadError::MissingField("rotate.angle"))?)?;
                Transform::rotate(axis, angle)
            }
            "lookat" => {
                let origin = parse_vec3("origin", op.attr("origin").ok_or(SceneLoadError::MissingField("lookat.origin"))?)?;
                let target = parse_vec3("target", op.attr("target").ok_or(SceneLoadError::MissingField("lookat.target"))?)?;
                let up = match op.attr("up") {
                    Some(v) => parse_vec3("up", v)?,
                    None => Vector3f::y(),
                };
                Transform::look_at(origin, target, up)
            }
            other => {
                log::warn!("Ignoring unknown transform operation <{}>.", other);
                continue;
            }
        };
        transform = next.compose(&transform);
    }
    Ok(transform)
}

fn parse_xyz(node: &XmlNode, default: Float) -> Result<Vector3f, SceneLoadError> {
    let mut v = Vector3f::repeat(default);
    for (idx, key) in ["x", "y", "z"].iter().enumerate() {
        if let Some(value) = node.attr(key) {
            v[idx] = parse_float(key, value)?;
        }
    }
    Ok(v)
}

fn resolve_value(raw: &str, defaults: &HashMap<String, String>) -> String {
    let mut out = raw.to_string();
    for (k, v) in defaults {
        out = out.replace(&format!("${}", k), v);
    }
    out
}

fn invalid(field: &str, value: &str) -> SceneLoadError {
    SceneLoadError::InvalidValue { field: field.to_string(), value: value.to_string() }
}

fn parse_float(field: &str, value: &str) -> Result<Float, SceneLoadError> {
    value.trim().parse::<Float>().map_err(|_| invalid(field, value))
}

fn parse_integer(field: &str, value: &str) -> Result<i64, SceneLoadError> {
    value.trim().parse::<i64>().map_err(|_| invalid(field, value))
}

fn parse_bool(field: &str, value: &str) -> Result<bool, SceneLoadError> {
    match value.trim() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(invalid(field, value)),
    }
}

fn parse_vec3(field: &str, value: &str) -> Result<Vector3f, SceneLoadError> {
    let parts: Vec<&str> = value.split(|c: char| c == ',' || c.is_whitespace())
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();
    match parts.as_slice() {
        [v] => Ok(Vector3f::repeat(parse_float(field, v)?)),
        [x, y, z] => Ok(Vector3f::new(parse_float(field, x)?, parse_float(field, y)?, parse_float(field, z)?)),
        _ => Err(invalid(field, value)),
    }
}

/// Linear sRGB triple, stored as XYZ.
fn parse_rgb(field: &str, value: &str) -> Result<ColorXYZ, SceneLoadError> {
    let v = parse_vec3(field, value)?;
    Ok(ColorXYZ::from_rgb(v.x, v.y, v.z))
}
