//! Headless frame loop: one spinning entity driven by a behavior component,
//! dispatched on both schedules.
//!
//! Run with `RUST_LOG=debug cargo run --example frame_loop`.

use std::any::Any;
use std::time::Duration;

use fafnir::prelude::*;

/// Rotates its entity's transform at a fixed angular velocity.
struct Spin {
    radians_per_second: f32,
}

impl Component for Spin {
    fn component_id(&self) -> ComponentId {
        ComponentId("spin")
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn as_behavior_mut(&mut self) -> Option<&mut dyn Behavior> {
        Some(self)
    }
}

impl Behavior for Spin {
    fn on_start(&mut self, ctx: &mut BehaviorContext<'_>) {
        log::info!("spin attached to {}", ctx.entity);
    }

    fn on_update(&mut self, ctx: &mut BehaviorContext<'_>, dt: f32) {
        if let Ok(transform) = ctx.scene.component_mut::<Transform>(ctx.entity) {
            transform.rotation += self.radians_per_second * dt;
        }
    }

    fn on_fixed_update(&mut self, ctx: &mut BehaviorContext<'_>) {
        // A physics-rate hook would integrate velocities here.
        let _ = ctx;
    }
}

fn main() {
    env_logger::init();

    let mut scene = Scene::with_behavior("demo");
    let spinner = scene.add_entity();
    scene
        .add_component(spinner, Transform::default())
        .expect("fresh entity");
    scene
        .add_component(spinner, Spin { radians_per_second: std::f32::consts::TAU })
        .expect("fresh entity");

    let assets = AssetStore::new();
    let mut scheduler = Scheduler::new(Duration::from_millis(10))
        .with_fixed(BehaviorSystem)
        .with_variable(BehaviorSystem);

    let mut time = Time::new();
    for _frame in 0..120 {
        time.update();
        scheduler.advance(&mut scene, &assets, time.delta());
        std::thread::sleep(Duration::from_millis(8));
    }

    let transform = scene.component::<Transform>(spinner).expect("still alive");
    log::info!(
        "after {} frames ({:.2}s): rotation = {:.3} rad",
        time.frame_count(),
        time.elapsed().as_secs_f32(),
        transform.rotation
    );
}
