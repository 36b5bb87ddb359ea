use anyhow::Result;
use nalgebra::Vector3;
use tracing_subscriber::EnvFilter;

use focus_track::geometry::transform::{rotation_x, translation, translation_transform};
use focus_track::geometry::Transform;
use focus_track::scene::{RayHit, SceneGraph, ScriptedScene, SurfaceAlignment, SurfaceKind};
use focus_track::tracking::NodeTracker;

use std::f64::consts::FRAC_PI_2;

/// Scripted session: a camera pans above a detected floor plane while the
/// tracked node follows the surface with damped scale/rotation effects.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let frames: usize = std::env::args()
        .nth(1)
        .map(|s| s.parse())
        .transpose()?
        .unwrap_or(120);
    let dt = 1.0 / 60.0;

    let mut scene = ScriptedScene::new();
    let tracked = scene.add_node(Transform::identity());
    let camera = scene.add_node(Transform::identity());

    // floor plane one meter below the camera path
    let mut caster = ScriptedScene::new();
    caster.set_hits(vec![RayHit {
        world_transform: translation_transform(Vector3::new(0.0, -1.0, 0.0)),
        alignment: SurfaceAlignment::Horizontal,
        kind: SurfaceKind::Plane,
    }]);

    let mut tracker = NodeTracker::new();
    tracker.set_tracked_node(Some(tracked));
    tracker.set_tracking_node(Some(camera));

    println!("Running {} frames at {:.1} Hz", frames, 1.0 / dt);

    for i in 0..frames {
        let time = i as f64 * dt;

        // pan the camera in a slow arc, pitched straight down at the floor
        let sweep = 0.3 * (0.8 * time).sin();
        let position = Vector3::new(sweep.sin(), 1.0, 0.3 + 0.1 * sweep.cos());
        scene.set_node_transform(
            camera,
            translation_transform(position) * rotation_x(-FRAC_PI_2),
        );

        tracker.update_at(&mut scene, &caster, time);

        if i % 12 == 0 {
            let angles = tracker.angle_tracker();
            let pose = scene.node_transform(tracked);
            println!(
                "t={:5.2}s angleX={:+.3} angleY={:+.3} wX={:+.3} wY={:+.3} pos={:?}",
                time,
                angles.angle_x(),
                angles.angle_y(),
                angles.angular_velocity_x(),
                angles.angular_velocity_y(),
                pose.map(|p| {
                    let t = translation(&p);
                    (t.x, t.y, t.z)
                }),
            );
        }
    }

    println!("Done! Processed {} frames", frames);
    Ok(())
}
