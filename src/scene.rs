use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use glam::{Mat4, Vec3};
use roxmltree::{Document, Node};
use serde::{Deserialize, Serialize};

use crate::camera::{Camera, Projection, DEFAULT_PITCH, DEFAULT_YAW};
use crate::light::{DirectionalLight, Lights, PointLight, SpotLight, MAX_POINT_LIGHTS};

/// Everything a demo needs at start-up: objects, lights and the camera pose.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub objects: Vec<SceneObject>,
    pub lights: Lights,
    pub camera: Camera,
    /// Directory relative asset paths are resolved against.
    pub base_dir: PathBuf,
}

impl Default for Scene {
    fn default() -> Self {
        Self::demo()
    }
}

impl Scene {
    /// The classic scene: ten rotated crates lit by four point lights.
    pub fn demo() -> Self {
        const POSITIONS: [Vec3; 10] = [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(2.0, 5.0, -15.0),
            Vec3::new(-1.5, -2.2, -2.5),
            Vec3::new(-3.8, -2.0, -12.3),
            Vec3::new(2.4, -0.4, -3.5),
            Vec3::new(-1.7, 3.0, -7.5),
            Vec3::new(1.3, -2.0, -2.5),
            Vec3::new(1.5, 2.0, -2.5),
            Vec3::new(1.5, 0.2, -1.5),
            Vec3::new(-1.3, 1.0, -1.5),
        ];
        let objects = POSITIONS
            .iter()
            .enumerate()
            .map(|(i, position)| {
                let angle = 20.0 * i as f32;
                SceneObject {
                    name: format!("Crate{i}"),
                    position: *position,
                    rotation: Vec3::new(1.0, 0.3, 0.5).normalize() * angle,
                    ..SceneObject::default()
                }
            })
            .collect();
        Self {
            objects,
            lights: Lights::tutorial(),
            camera: Camera::at(Vec3::new(0.0, 0.0, 3.0)),
            base_dir: PathBuf::from("."),
        }
    }

    /// Reads a scene file; relative asset paths resolve next to it.
    pub fn load(path: &Path) -> Result<Self> {
        let xml = std::fs::read_to_string(path)
            .with_context(|| format!("unable to read scene {}", path.display()))?;
        let mut scene = Self::from_xml(&xml)
            .with_context(|| format!("failed to parse scene {}", path.display()))?;
        scene.base_dir = path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Ok(scene)
    }

    /// Parses the scene XML format.
    ///
    /// ```xml
    /// <scene>
    ///   <camera><position>0 0 3</position><fov>60</fov></camera>
    ///   <directional-light><direction>0 -1 0</direction></directional-light>
    ///   <point-light><position>1 1 1</position></point-light>
    ///   <spot-light><follow-camera>true</follow-camera></spot-light>
    ///   <object><name>Crate</name><mesh>cube</mesh></object>
    /// </scene>
    /// ```
    ///
    /// Omitted elements keep their defaults. A scene with no light elements
    /// at all gets the default light set.
    pub fn from_xml(xml: &str) -> Result<Self> {
        let document = Document::parse(xml).context("invalid scene XML")?;
        let root = document.root_element();
        if !root.has_tag_name("scene") {
            bail!("root element must be <scene>, found <{}>", root.tag_name().name());
        }

        let mut objects = Vec::new();
        for node in root.children().filter(|n| n.has_tag_name("object")) {
            objects.push(parse_object(&node)?);
        }

        let camera = match child(&root, "camera") {
            Some(node) => parse_camera(&node)?,
            None => Camera::at(Vec3::new(0.0, 0.0, 3.0)),
        };

        let has_lights = root.children().any(|n| {
            n.has_tag_name("directional-light")
                || n.has_tag_name("point-light")
                || n.has_tag_name("spot-light")
        });
        let mut lights = if has_lights {
            Lights::default()
        } else {
            Lights::tutorial()
        };
        if has_lights {
            if let Some(node) = child(&root, "directional-light") {
                lights.directional = parse_directional(&node)?;
            } else {
                lights.directional.enabled = false;
            }
            for node in root.children().filter(|n| n.has_tag_name("point-light")) {
                if !lights.add_point(parse_point(&node)?) {
                    bail!("a scene supports at most {MAX_POINT_LIGHTS} point lights");
                }
            }
            if let Some(node) = child(&root, "spot-light") {
                let (spot, follow) = parse_spot(&node)?;
                lights.spot = spot;
                lights.flashlight = follow;
            } else {
                lights.spot.enabled = false;
                lights.flashlight = false;
            }
        }

        Ok(Self {
            objects,
            lights,
            camera,
            base_dir: PathBuf::from("."),
        })
    }

    /// Resolves an asset reference against the scene directory.
    pub fn resolve(&self, asset: &str) -> PathBuf {
        let path = Path::new(asset);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}

/// Geometry source of a scene object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeshSource {
    Cube,
    Quad,
    Obj(String),
}

impl MeshSource {
    pub fn parse(value: &str) -> Self {
        match value {
            "cube" => Self::Cube,
            "quad" => Self::Quad,
            path => Self::Obj(path.to_string()),
        }
    }

    pub fn key(&self) -> &str {
        match self {
            Self::Cube => "cube",
            Self::Quad => "quad",
            Self::Obj(path) => path,
        }
    }
}

/// Drawable object as described by the scene file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    pub name: String,
    pub mesh: MeshSource,
    #[serde(default)]
    pub position: Vec3,
    /// Euler angles in degrees, applied Z * Y * X.
    #[serde(default)]
    pub rotation: Vec3,
    #[serde(default = "default_scale")]
    pub scale: Vec3,
    #[serde(default = "default_tint")]
    pub tint: Vec3,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diffuse: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specular: Option<String>,
    #[serde(default = "default_shininess")]
    pub shininess: f32,
}

impl Default for SceneObject {
    fn default() -> Self {
        Self {
            name: String::new(),
            mesh: MeshSource::Cube,
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: default_scale(),
            tint: default_tint(),
            diffuse: None,
            specular: None,
            shininess: default_shininess(),
        }
    }
}

impl SceneObject {
    pub fn model_matrix(&self) -> Mat4 {
        let rotation = Mat4::from_rotation_z(self.rotation.z.to_radians())
            * Mat4::from_rotation_y(self.rotation.y.to_radians())
            * Mat4::from_rotation_x(self.rotation.x.to_radians());
        Mat4::from_translation(self.position) * rotation * Mat4::from_scale(self.scale)
    }
}

fn default_scale() -> Vec3 {
    Vec3::ONE
}

fn default_tint() -> Vec3 {
    Vec3::ONE
}

fn default_shininess() -> f32 {
    32.0
}

fn parse_object(node: &Node<'_, '_>) -> Result<SceneObject> {
    let defaults = SceneObject::default();
    let name = required_text(node, "name")?;
    let context = || format!("in object {name}");
    Ok(SceneObject {
        mesh: optional_text(node, "mesh")
            .map(|mesh| MeshSource::parse(&mesh))
            .unwrap_or(defaults.mesh),
        position: parse_vec3(optional_text(node, "position"), defaults.position)
            .with_context(context)?,
        rotation: parse_vec3(optional_text(node, "rotation"), defaults.rotation)
            .with_context(context)?,
        scale: parse_vec3(optional_text(node, "scale"), defaults.scale).with_context(context)?,
        tint: parse_vec3(optional_text(node, "tint"), defaults.tint).with_context(context)?,
        diffuse: optional_text(node, "diffuse"),
        specular: optional_text(node, "specular"),
        shininess: parse_f32(optional_text(node, "shininess"), defaults.shininess)
            .with_context(context)?
            .max(1.0),
        name,
    })
}

fn parse_camera(node: &Node<'_, '_>) -> Result<Camera> {
    let position = parse_vec3(optional_text(node, "position"), Vec3::new(0.0, 0.0, 3.0))?;
    let yaw = parse_f32(optional_text(node, "yaw"), DEFAULT_YAW)?;
    let pitch = parse_f32(optional_text(node, "pitch"), DEFAULT_PITCH)?;
    let projection = match optional_text(node, "projection").as_deref() {
        None | Some("perspective") => Projection::Perspective,
        Some("orthographic") => Projection::Orthographic,
        Some(other) => bail!("unknown projection `{other}`"),
    };
    let mut camera = Camera::new(position, Vec3::Y, yaw, pitch, projection);
    camera.set_fov(parse_f32(optional_text(node, "fov"), camera.fov())?);
    camera.movement_speed = parse_f32(optional_text(node, "speed"), camera.movement_speed)?;
    camera.mouse_sensitivity =
        parse_f32(optional_text(node, "sensitivity"), camera.mouse_sensitivity)?;
    camera.orthographic_factor = parse_f32(
        optional_text(node, "orthographic-factor"),
        camera.orthographic_factor,
    )?;
    Ok(camera)
}

fn parse_directional(node: &Node<'_, '_>) -> Result<DirectionalLight> {
    let defaults = DirectionalLight::default();
    let mut light = DirectionalLight::new(parse_vec3(
        optional_text(node, "direction"),
        defaults.direction,
    )?);
    light.ambient = parse_vec3(optional_text(node, "ambient"), defaults.ambient)?;
    light.diffuse = parse_vec3(optional_text(node, "diffuse"), defaults.diffuse)?;
    light.specular = parse_vec3(optional_text(node, "specular"), defaults.specular)?;
    light.enabled = parse_bool(optional_text(node, "enabled"), true)?;
    light.visible = parse_bool(optional_text(node, "visible"), true)?;
    Ok(light)
}

fn parse_point(node: &Node<'_, '_>) -> Result<PointLight> {
    let defaults = PointLight::default();
    Ok(PointLight {
        position: parse_vec3(optional_text(node, "position"), defaults.position)?,
        constant: parse_f32(optional_text(node, "constant"), defaults.constant)?,
        linear: parse_f32(optional_text(node, "linear"), defaults.linear)?,
        quadratic: parse_f32(optional_text(node, "quadratic"), defaults.quadratic)?,
        ambient: parse_vec3(optional_text(node, "ambient"), defaults.ambient)?,
        diffuse: parse_vec3(optional_text(node, "diffuse"), defaults.diffuse)?,
        specular: parse_vec3(optional_text(node, "specular"), defaults.specular)?,
        enabled: parse_bool(optional_text(node, "enabled"), true)?,
        visible: parse_bool(optional_text(node, "visible"), true)?,
    })
}

fn parse_spot(node: &Node<'_, '_>) -> Result<(SpotLight, bool)> {
    let defaults = SpotLight::default();
    let mut light = SpotLight::new(
        parse_vec3(optional_text(node, "position"), defaults.position)?,
        parse_vec3(optional_text(node, "direction"), defaults.direction)?,
    );
    light.set_cut_off_degrees(
        parse_f32(
            optional_text(node, "inner-cut-off"),
            SpotLight::DEFAULT_INNER_CUT_OFF_DEGREES,
        )?,
        parse_f32(
            optional_text(node, "outer-cut-off"),
            SpotLight::DEFAULT_OUTER_CUT_OFF_DEGREES,
        )?,
    );
    light.constant = parse_f32(optional_text(node, "constant"), defaults.constant)?;
    light.linear = parse_f32(optional_text(node, "linear"), defaults.linear)?;
    light.quadratic = parse_f32(optional_text(node, "quadratic"), defaults.quadratic)?;
    light.ambient = parse_vec3(optional_text(node, "ambient"), defaults.ambient)?;
    light.diffuse = parse_vec3(optional_text(node, "diffuse"), defaults.diffuse)?;
    light.specular = parse_vec3(optional_text(node, "specular"), defaults.specular)?;
    light.enabled = parse_bool(optional_text(node, "enabled"), true)?;
    light.visible = parse_bool(optional_text(node, "visible"), true)?;
    let follow = parse_bool(optional_text(node, "follow-camera"), false)?;
    Ok((light, follow))
}

fn child<'a, 'input>(node: &Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| n.has_tag_name(tag))
}

fn required_text(node: &Node<'_, '_>, tag: &str) -> Result<String> {
    optional_text(node, tag).ok_or_else(|| anyhow!("<{tag}> tag is missing"))
}

fn optional_text(node: &Node<'_, '_>, tag: &str) -> Option<String> {
    child(node, tag)
        .and_then(|child| child.text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(|text| text.to_string())
}

fn parse_vec3(value: Option<String>, default: Vec3) -> Result<Vec3> {
    let Some(value) = value else {
        return Ok(default);
    };
    let components = value
        .split_whitespace()
        .map(|component| {
            component
                .parse::<f32>()
                .with_context(|| format!("invalid vector component `{component}`"))
        })
        .collect::<Result<Vec<_>>>()?;
    match components.as_slice() {
        [x, y, z] if !(x.is_finite() && y.is_finite() && z.is_finite()) => {
            Err(anyhow!("vector `{value}` must have finite components"))
        }
        [x, y, z] => Ok(Vec3::new(*x, *y, *z)),
        other => Err(anyhow!(
            "vector `{value}` needs 3 components, found {}",
            other.len()
        )),
    }
}

fn parse_f32(value: Option<String>, default: f32) -> Result<f32> {
    match value {
        Some(value) => {
            let parsed = value
                .parse::<f32>()
                .map_err(|err| anyhow!("failed to parse float `{value}`: {err}"))?;
            if !parsed.is_finite() {
                return Err(anyhow!("float `{value}` must be finite"));
            }
            Ok(parsed)
        }
        None => Ok(default),
    }
}

fn parse_bool(value: Option<String>, default: bool) -> Result<bool> {
    match value.as_deref() {
        None => Ok(default),
        Some("true" | "1" | "yes") => Ok(true),
        Some("false" | "0" | "no") => Ok(false),
        Some(other) => Err(anyhow!("failed to parse boolean `{other}`")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
    <scene>
        <camera>
            <position>0 1 5</position>
            <fov>60</fov>
            <projection>orthographic</projection>
        </camera>
        <directional-light>
            <direction>0 -2 0</direction>
            <diffuse>0.2 0.3 0.4</diffuse>
        </directional-light>
        <point-light>
            <position>1 2 3</position>
            <linear>0.5</linear>
        </point-light>
        <spot-light>
            <inner-cut-off>10</inner-cut-off>
            <outer-cut-off>20</outer-cut-off>
            <follow-camera>true</follow-camera>
        </spot-light>
        <object>
            <name>Teapot</name>
            <mesh>models/teapot.obj</mesh>
            <position>0 5 0</position>
            <diffuse>textures/teapot.png</diffuse>
            <shininess>64</shininess>
        </object>
        <object>
            <name>Floor</name>
            <mesh>quad</mesh>
            <scale>10 10 1</scale>
        </object>
    </scene>
    "#;

    #[test]
    fn parse_scene_populates_objects_and_lights() {
        let scene = Scene::from_xml(SAMPLE).unwrap();
        assert_eq!(scene.objects.len(), 2);
        let teapot = &scene.objects[0];
        assert_eq!(teapot.mesh, MeshSource::Obj("models/teapot.obj".into()));
        assert_eq!(teapot.position, Vec3::new(0.0, 5.0, 0.0));
        assert_eq!(teapot.diffuse.as_deref(), Some("textures/teapot.png"));
        assert_eq!(teapot.shininess, 64.0);
        assert_eq!(scene.objects[1].mesh, MeshSource::Quad);
        assert_eq!(scene.objects[1].scale, Vec3::new(10.0, 10.0, 1.0));

        assert_eq!(scene.lights.directional.direction, Vec3::NEG_Y);
        assert_eq!(scene.lights.directional.diffuse, Vec3::new(0.2, 0.3, 0.4));
        assert_eq!(scene.lights.points.len(), 1);
        assert_eq!(scene.lights.points[0].linear, 0.5);
        assert!(scene.lights.flashlight);
        assert!((scene.lights.spot.outer_cut_off_degrees() - 20.0).abs() < 1e-3);
    }

    #[test]
    fn camera_settings_are_applied() {
        let scene = Scene::from_xml(SAMPLE).unwrap();
        assert_eq!(scene.camera.position, Vec3::new(0.0, 1.0, 5.0));
        assert_eq!(scene.camera.fov(), 60.0);
        assert_eq!(scene.camera.projection, Projection::Orthographic);
    }

    #[test]
    fn scene_without_lights_gets_tutorial_set() {
        let scene = Scene::from_xml("<scene><object><name>A</name></object></scene>").unwrap();
        assert_eq!(scene.lights.points.len(), MAX_POINT_LIGHTS);
        assert_eq!(scene.objects[0].mesh, MeshSource::Cube);
    }

    #[test]
    fn omitted_light_kinds_are_disabled() {
        let scene = Scene::from_xml(
            "<scene><point-light><position>0 0 0</position></point-light></scene>",
        )
        .unwrap();
        assert!(!scene.lights.directional.enabled);
        assert!(!scene.lights.spot.enabled);
        assert!(!scene.lights.flashlight);
    }

    #[test]
    fn missing_name_is_an_error() {
        let bad = "<scene><object><mesh>cube</mesh></object></scene>";
        assert!(Scene::from_xml(bad).is_err());
    }

    #[test]
    fn too_many_point_lights_is_an_error() {
        let lights = "<point-light/>".repeat(MAX_POINT_LIGHTS + 1);
        let xml = format!("<scene>{lights}</scene>");
        assert!(Scene::from_xml(&xml).is_err());
    }

    #[test]
    fn short_vector_is_an_error() {
        let bad = "<scene><object><name>A</name><position>1 2</position></object></scene>";
        assert!(Scene::from_xml(bad).is_err());
    }

    #[test]
    fn non_finite_numbers_are_rejected() {
        for bad in [
            "<scene><camera><fov>NaN</fov></camera></scene>",
            "<scene><camera><yaw>inf</yaw></camera></scene>",
            "<scene><camera><pitch>-inf</pitch></camera></scene>",
            "<scene><point-light><position>0 NaN 0</position></point-light></scene>",
        ] {
            let err = Scene::from_xml(bad).unwrap_err();
            assert!(format!("{err:#}").contains("finite"), "{bad}: {err:#}");
        }
    }

    #[test]
    fn assets_resolve_next_to_scene_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.xml");
        std::fs::write(&path, SAMPLE).unwrap();
        let scene = Scene::load(&path).unwrap();
        assert_eq!(scene.resolve("models/teapot.obj"), dir.path().join("models/teapot.obj"));
    }

    #[test]
    fn demo_has_ten_crates() {
        let scene = Scene::demo();
        assert_eq!(scene.objects.len(), 10);
        assert!(scene.objects.iter().all(|o| o.mesh == MeshSource::Cube));
    }
}
