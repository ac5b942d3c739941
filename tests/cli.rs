use assert_cmd::prelude::*;
use predicates::str::contains;
use std::io::Write;
use std::process::Command;
use tempfile::NamedTempFile;

fn write_scene(xml: &str) -> NamedTempFile {
    let mut tmp = tempfile::Builder::new()
        .suffix(".xml")
        .tempfile()
        .expect("temp scene");
    tmp.write_all(xml.as_bytes()).expect("write scene");
    tmp
}

fn phong_lab() -> Command {
    Command::cargo_bin("phong-lab").expect("binary exists")
}

#[test]
fn summary_lists_scene_file_contents() {
    let scene = write_scene(
        r#"<scene>
  <camera>
    <position>0 1 5</position>
    <fov>60</fov>
  </camera>
  <point-light>
    <position>1 2 3</position>
  </point-light>
  <object>
    <name>Crate</name>
    <position>1 0 -2</position>
  </object>
  <object>
    <name>Floor</name>
    <mesh>quad</mesh>
  </object>
</scene>
"#,
    );
    let mut cmd = phong_lab();
    cmd.arg(scene.path()).arg("--summary-only");
    cmd.assert()
        .success()
        .stdout(contains("Loaded scene with 2 objects (1 point lights)"))
        .stdout(contains(" - Crate [cube] pos=(1.00, 0.00, -2.00)"))
        .stdout(contains(" - Floor [quad]"))
        .stdout(contains("Camera: pos=(0.00, 1.00, 5.00) yaw=-90.0 pitch=0.0 fov=60.0"))
        .stdout(contains("Point light 0: pos=(1.00, 2.00, 3.00) enabled=true"))
        .stdout(contains("Projection blend: perspective -> orthographic in"));
}

#[test]
fn summary_without_scene_uses_demo() {
    let mut cmd = phong_lab();
    cmd.arg("--summary-only");
    cmd.assert()
        .success()
        .stdout(contains("Loaded scene with 10 objects (4 point lights)"))
        .stdout(contains(" - Crate9 [cube]"))
        .stdout(contains("flashlight=true"));
}

#[test]
fn orthographic_scene_blends_back_to_perspective() {
    let scene = write_scene(
        "<scene><camera><projection>orthographic</projection></camera></scene>",
    );
    let mut cmd = phong_lab();
    cmd.arg(scene.path()).arg("--summary-only");
    cmd.assert()
        .success()
        .stdout(contains("projection=orthographic"))
        .stdout(contains("Projection blend: orthographic -> perspective in"));
}

#[test]
fn unknown_flag_is_rejected() {
    let mut cmd = phong_lab();
    cmd.arg("--bogus");
    cmd.assert()
        .failure()
        .stderr(contains("Unknown argument: --bogus"))
        .stderr(contains("Usage: phong-lab"));
}

#[test]
fn missing_scene_file_is_reported() {
    let mut cmd = phong_lab();
    cmd.arg("definitely/not/here.xml").arg("--summary-only");
    cmd.assert()
        .failure()
        .stderr(contains("unable to read scene"));
}

#[test]
fn malformed_scene_is_reported() {
    let scene = write_scene("<scene><object><mesh>cube</mesh></object></scene>");
    let mut cmd = phong_lab();
    cmd.arg(scene.path()).arg("--summary-only");
    cmd.assert()
        .failure()
        .stderr(contains("failed to parse scene"))
        .stderr(contains("<name> tag is missing"));
}
