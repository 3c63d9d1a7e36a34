//! Section plane tests: manager scenarios and `bimtk section`

mod common;

use bimtk::core::config::SectionConfig;
use bimtk::core::geometry::{Point, Vector};
use bimtk::core::scene::{InMemoryViewport, SceneObject};
use bimtk::core::section::SectionPlaneManager;
use bimtk::entities::section_plane::{ClipPlane, SectionAxis};
use common::{bimtk, json_output, write_file};
use predicates::prelude::*;
use tempfile::TempDir;

// ============================================================================
// Manager scenarios
// ============================================================================

#[test]
fn test_box_section_clips_outside() {
    let mut vp = InMemoryViewport::new();
    let mut mgr = SectionPlaneManager::new(SectionConfig::default());

    // keep 0 <= x <= 2
    let low = mgr.create_plane(&mut vp, SectionAxis::X, 0.0, Some("Low")).unwrap();
    let high = mgr.create_plane(&mut vp, SectionAxis::X, 2.0, Some("High")).unwrap();
    assert!(mgr.invert_plane(&mut vp, &high.id));

    assert_eq!(vp.clipping_planes().len(), 2);
    assert!(vp.is_point_visible(&Point::new(1.0, 5.0, 5.0)));
    assert!(!vp.is_point_visible(&Point::new(-0.5, 0.0, 0.0)));
    assert!(!vp.is_point_visible(&Point::new(2.5, 0.0, 0.0)));

    // disabling one side opens it up
    mgr.toggle_plane(&mut vp, &low.id);
    assert!(vp.is_point_visible(&Point::new(-0.5, 0.0, 0.0)));
    assert_eq!(mgr.active(), Some(&high.id));
}

#[test]
fn test_capacity_then_delete_frees_slot() {
    let mut vp = InMemoryViewport::new();
    let mut mgr = SectionPlaneManager::new(SectionConfig {
        max_planes: 2,
        ..SectionConfig::default()
    });

    let first = mgr.create_plane(&mut vp, SectionAxis::Z, 1.0, None).unwrap();
    mgr.create_plane(&mut vp, SectionAxis::Y, 1.0, None).unwrap();
    assert!(mgr.is_full());
    assert!(mgr.create_plane(&mut vp, SectionAxis::X, 1.0, None).is_none());
    assert_eq!(mgr.planes().len(), 2);

    assert!(mgr.delete_plane(&mut vp, &first.id));
    let third = mgr.create_plane(&mut vp, SectionAxis::X, 1.0, None).unwrap();
    assert_eq!(third.name, "X Plane");
    assert_eq!(vp.clipping_planes().len(), 2);
}

#[test]
fn test_helpers_follow_plane_state() {
    let mut vp = InMemoryViewport::new();
    let mut mgr = SectionPlaneManager::new(SectionConfig::default());

    let plane = mgr.create_plane(&mut vp, SectionAxis::Z, 3.0, None).unwrap();
    let handle = mgr.create_plane_helper(&mut vp, &plane.id, 5.0).unwrap();

    mgr.update_plane_position(&mut vp, &plane.id, 4.0);
    match &vp.get(handle).unwrap().object {
        SceneObject::PlaneHelper { plane, size, .. } => {
            assert_eq!(*plane, ClipPlane::new(Vector::z(), -4.0));
            assert_eq!(*size, 5.0);
        }
        other => panic!("unexpected object: {:?}", other),
    }

    mgr.toggle_helpers(&mut vp);
    assert!(!vp.get(handle).unwrap().visible);

    // helpers built while hidden start hidden
    let other = mgr.create_plane(&mut vp, SectionAxis::X, 0.0, None).unwrap();
    let hidden = mgr.create_plane_helper(&mut vp, &other.id, 5.0).unwrap();
    assert!(!vp.get(hidden).unwrap().visible);

    mgr.clear_planes(&mut vp);
    assert_eq!(vp.live_count(), 0);
    assert!(vp.clipping_planes().is_empty());
}

#[test]
fn test_custom_plane_equation() {
    let mut vp = InMemoryViewport::new();
    let mut mgr = SectionPlaneManager::new(SectionConfig::default());

    let plane = mgr.create_plane(&mut vp, SectionAxis::Custom, 7.0, None).unwrap();
    assert_eq!(vp.clipping_planes(), &[ClipPlane::new(Vector::x(), 0.0)]);

    // zero normal leaves the plane untouched
    assert!(!mgr.update_plane_normal(&mut vp, &plane.id, Vector::zeros(), 1.0));
    assert_eq!(mgr.get(&plane.id).unwrap().normal, Vector::x());

    assert!(mgr.update_plane_normal(&mut vp, &plane.id, Vector::new(0.0, 3.0, 0.0), -1.5));
    assert!(vp.is_point_visible(&Point::new(0.0, 2.0, 0.0)));
    assert!(!vp.is_point_visible(&Point::new(0.0, 0.0, 0.0)));
}

// ============================================================================
// bimtk section
// ============================================================================

#[test]
fn test_section_reports_visible_points() {
    let json = json_output(bimtk().args([
        "section", "--plane", "z=1", "--point", "0,0,2", "--point", "0,0,0", "-o", "json",
    ]));

    assert_eq!(json["planes"][0]["axis"], "Z");
    assert_eq!(json["planes"][0]["name"], "Z Plane");
    assert_eq!(json["clipping"][0]["constant"], -1.0);
    assert_eq!(json["points"][0]["visible"], true);
    assert_eq!(json["points"][1]["visible"], false);
}

#[test]
fn test_section_inverted_and_disabled_flags() {
    let json = json_output(bimtk().args([
        "section", "-p", "z=1:inv", "--point", "0,0,2", "--point", "0,0,0", "-o", "json",
    ]));
    assert_eq!(json["clipping"][0]["constant"], 1.0);
    assert_eq!(json["points"][0]["visible"], false);
    assert_eq!(json["points"][1]["visible"], true);

    let json = json_output(bimtk().args([
        "section", "-p", "z=1:off", "--point", "0,0,0", "-o", "json",
    ]));
    assert!(json["clipping"].as_array().unwrap().is_empty());
    assert_eq!(json["planes"][0]["enabled"], false);
    assert_eq!(json["points"][0]["visible"], true);
}

#[test]
fn test_section_custom_plane_with_negative_point() {
    let json = json_output(bimtk().args([
        "section", "-p", "custom=0,0,2,-1", "--point", "0,0,-1", "--point", "0,0,3", "-o", "json",
    ]));
    assert_eq!(json["planes"][0]["axis"], "custom");
    assert_eq!(json["points"][0]["visible"], false);
    assert_eq!(json["points"][1]["visible"], true);
}

#[test]
fn test_section_table_output() {
    bimtk()
        .args(["section", "-p", "x=0", "--point", "1,0,0", "--point", "-1,0,0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("X Plane"))
        .stdout(predicate::str::contains("visible"))
        .stdout(predicate::str::contains("clipped"));
}

#[test]
fn test_section_tsv_output() {
    bimtk()
        .args(["section", "-p", "x=0", "--point", "1,0,0", "--point", "-1,0,0", "-o", "tsv"])
        .assert()
        .success()
        .stdout("x\ty\tz\tvisible\n1\t0\t0\ttrue\n-1\t0\t0\tfalse\n");
}

#[test]
fn test_section_limit_warns() {
    bimtk()
        .args(["section", "-p", "x=0", "-p", "y=0", "--max-planes", "1", "-o", "json"])
        .assert()
        .success()
        .stderr(predicate::str::contains("1 plane(s) skipped"));
}

#[test]
fn test_section_limit_from_config() {
    let tmp = TempDir::new().unwrap();
    let config = write_file(&tmp, "bimtk.yaml", "section:\n  max_planes: 1\n");

    let output = bimtk()
        .args(["section", "-p", "x=0", "-p", "y=0", "-o", "json", "--config"])
        .arg(&config)
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["planes"].as_array().unwrap().len(), 1);
}

#[test]
fn test_section_zero_limit_rejected() {
    bimtk()
        .args(["section", "-p", "x=0", "--max-planes", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least 1"));
}

#[test]
fn test_section_bad_plane_rejected() {
    bimtk()
        .args(["section", "-p", "w=1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid section axis"));
}

#[test]
fn test_section_requires_a_plane() {
    bimtk().args(["section"]).assert().failure();
}
