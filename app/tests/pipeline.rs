use std::{fs, path::Path, process::Command};

use camera_model::{CameraConfig, CameraExtrinsics, IntrinsicsConfig, RigConfig};
use rigcal::{
    config::save_config,
    dataset::{Dataset, LIDAR_DIR, REFERENCE_PORT},
    service::CalibrationService,
};

fn write_binary_frame(root: &Path, frame: &str, points: &[[f32; 4]]) {
    let dir = root.join(LIDAR_DIR);
    fs::create_dir_all(&dir).unwrap();

    let mut bytes = format!(
        "# .PCD v0.7\nVERSION 0.7\nFIELDS x y z intensity\nSIZE 4 4 4 4\nTYPE F F F F\nCOUNT 1 1 1 1\nWIDTH {n}\nHEIGHT 1\nVIEWPOINT 0 0 0 1 0 0 0\nPOINTS {n}\nDATA binary\n",
        n = points.len()
    )
    .into_bytes();
    for point in points {
        for value in point {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
    }
    fs::write(dir.join(format!("{frame}.pcd")), bytes).unwrap();
}

fn make_dataset(root: &Path) {
    let port = root.join(REFERENCE_PORT);
    fs::create_dir_all(&port).unwrap();
    for frame in ["000001", "000002", "000005"] {
        fs::write(port.join(format!("{frame}.jpg")), b"").unwrap();
    }
    write_binary_frame(
        root,
        "000001",
        &[
            [10.0, 0.0, 0.0, 7.0],
            [-10.0, 0.0, 0.0, 7.0],
            [5.0, 1.0, 1.5, 7.0],
        ],
    );
}

/// Front camera looking along sensor +X, optical axis mapped with roll 90, pitch -90.
fn rig() -> RigConfig {
    let mut rig = RigConfig::default();
    rig.cameras.insert(
        "port_1".to_string(),
        CameraConfig {
            intrinsic: IntrinsicsConfig {
                fx: Some(1000.0),
                fy: Some(1000.0),
                cx: Some(960.0),
                cy: Some(640.0),
                ..Default::default()
            },
            extrinsic: CameraExtrinsics {
                roll: 90.0,
                pitch: -90.0,
                ..Default::default()
            },
        },
    );
    rig.cameras.insert(
        "port_2".to_string(),
        CameraConfig {
            intrinsic: IntrinsicsConfig {
                fx: Some(1000.0),
                ..Default::default()
            },
            extrinsic: CameraExtrinsics::default(),
        },
    );
    rig
}

#[test]
fn overlay_through_service() {
    let dir = tempfile::tempdir().unwrap();
    make_dataset(dir.path());

    let dataset = Dataset::open(dir.path()).unwrap();
    assert_eq!(dataset.frames().unwrap(), vec!["000001", "000002", "000005"]);
    assert_eq!(dataset.gaps().unwrap(), vec![(3, 4)]);

    let service = CalibrationService::new(dataset, rig(), 30_000);
    let overlay = service.overlay("000001").unwrap();
    assert_eq!(overlay.len(), 2);

    let front = overlay[0].result.as_ref().unwrap();
    assert_eq!(front.valid, vec![true, false, true]);
    assert_eq!(front.points.len(), 2);
    assert!((front.points[0].u - 960.0).abs() < 1e-6);
    assert!((front.points[0].v - 640.0).abs() < 1e-6);
    assert_eq!(front.points[1].height, 1.5);
    assert_eq!(front.points[1].color, [0, 255, 0]);

    assert!(overlay[1].result.is_err());
}

#[test]
fn cli_points_and_project() {
    let dir = tempfile::tempdir().unwrap();
    make_dataset(dir.path());
    let config = dir.path().join("config.json");
    save_config(&config, &rig()).unwrap();

    let out = Command::new(env!("CARGO_BIN_EXE_rigcal"))
        .arg("points")
        .arg("--dataset")
        .arg(dir.path())
        .args(["--frame", "000001", "--max-points", "2"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let json: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(
        json,
        serde_json::json!({"points": [[10.0, 0.0, 0.0], [5.0, 1.0, 1.5]]})
    );

    let overlay_path = dir.path().join("overlay.json");
    let status = Command::new(env!("CARGO_BIN_EXE_rigcal"))
        .arg("project")
        .arg("--dataset")
        .arg(dir.path())
        .arg("--config")
        .arg(&config)
        .arg("--output")
        .arg(&overlay_path)
        .args(["--frame", "000001"])
        .status()
        .unwrap();
    assert!(status.success());
    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&overlay_path).unwrap()).unwrap();
    assert_eq!(json["frame"], "000001");
    assert_eq!(json["cameras"]["port_1"]["points"].as_array().unwrap().len(), 2);
    assert!(json["cameras"]["port_2"]["error"]
        .as_str()
        .unwrap()
        .contains("port_2"));
}

#[test]
fn cli_missing_frame_fails() {
    let dir = tempfile::tempdir().unwrap();
    make_dataset(dir.path());

    let status = Command::new(env!("CARGO_BIN_EXE_rigcal"))
        .arg("points")
        .arg("--dataset")
        .arg(dir.path())
        .args(["--frame", "000002"])
        .status()
        .unwrap();
    assert!(!status.success());
}
