//! # Scheduler — Dual-Rate System Execution
//!
//! Two independent schedules drive the simulation:
//!
//! - the **fixed-step schedule** runs `floor(accumulated / fixed_delta)` times
//!   per frame with a constant delta (time-accumulator pattern; leftover time
//!   carries to the next frame), giving physics-like systems a stable step;
//! - the **variable-step schedule** runs exactly once per frame with the
//!   actual elapsed wall time.
//!
//! Within each schedule, systems execute strictly in registration order. That
//! order is a correctness contract (a behavior system must run before whatever
//! consumes its output), so the scheduler never reorders or parallelizes.
//!
//! The accumulator is a [`Duration`], so the pass count is integer-exact:
//! frame deltas summing to `5 * fixed_delta` produce exactly 5 fixed passes
//! no matter how they are distributed across frames.
//!
//! A panic from a system aborts the tick. The scheduler logs the offending
//! system's name and phase and rethrows; a misbehaving system is a defect,
//! not a recoverable condition.

use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;

use crate::asset::AssetStore;
use crate::ecs::{BehaviorContext, Scene};

/// A system on the fixed-step schedule. By contract the elapsed time is
/// always the scheduler's fixed delta, so none is passed.
pub trait FixedSystem: Send {
    fn fixed_update(&mut self, scene: &mut Scene, assets: &AssetStore);
}

/// A system on the variable-step schedule. `dt` is the actual elapsed wall
/// time for the frame, in seconds.
pub trait VariableSystem: Send {
    fn update(&mut self, scene: &mut Scene, assets: &AssetStore, dt: f32);
}

struct FixedEntry {
    name: &'static str,
    system: Box<dyn FixedSystem>,
}

struct VariableEntry {
    name: &'static str,
    system: Box<dyn VariableSystem>,
}

/// Drives the fixed-step and variable-step schedules over a scene.
///
/// Systems are wired in explicitly at construction; there is no global
/// registry. Registration order is execution order.
pub struct Scheduler {
    fixed_delta: Duration,
    accumulator: Duration,
    fixed: Vec<FixedEntry>,
    variable: Vec<VariableEntry>,
    tick: u64,
}

impl Scheduler {
    /// Create a scheduler with the given fixed simulation delta.
    ///
    /// # Panics
    ///
    /// Panics if `fixed_delta` is zero (the accumulator loop would never
    /// terminate).
    pub fn new(fixed_delta: Duration) -> Self {
        assert!(!fixed_delta.is_zero(), "fixed_delta must be non-zero");
        Self {
            fixed_delta,
            accumulator: Duration::ZERO,
            fixed: Vec::new(),
            variable: Vec::new(),
            tick: 0,
        }
    }

    /// Register a system on the fixed-step schedule (builder form).
    pub fn with_fixed<S: FixedSystem + 'static>(mut self, system: S) -> Self {
        self.add_fixed(system);
        self
    }

    /// Register a system on the variable-step schedule (builder form).
    pub fn with_variable<S: VariableSystem + 'static>(mut self, system: S) -> Self {
        self.add_variable(system);
        self
    }

    /// Register a system on the fixed-step schedule.
    pub fn add_fixed<S: FixedSystem + 'static>(&mut self, system: S) {
        self.fixed.push(FixedEntry {
            name: std::any::type_name::<S>(),
            system: Box::new(system),
        });
    }

    /// Register a system on the variable-step schedule.
    pub fn add_variable<S: VariableSystem + 'static>(&mut self, system: S) {
        self.variable.push(VariableEntry {
            name: std::any::type_name::<S>(),
            system: Box::new(system),
        });
    }

    /// The constant delta of the fixed-step schedule.
    pub fn fixed_delta(&self) -> Duration {
        self.fixed_delta
    }

    /// Number of frames advanced so far.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Advance one frame: accumulate `frame_delta`, run every due fixed-step
    /// pass, then run the variable-step schedule exactly once.
    pub fn advance(&mut self, scene: &mut Scene, assets: &AssetStore, frame_delta: Duration) {
        self.accumulator += frame_delta;

        while self.accumulator >= self.fixed_delta {
            self.accumulator -= self.fixed_delta;
            for entry in &mut self.fixed {
                let system = &mut entry.system;
                run_guarded(entry.name, "fixed", || {
                    system.fixed_update(scene, assets);
                });
            }
        }

        let dt = frame_delta.as_secs_f32();
        for entry in &mut self.variable {
            let system = &mut entry.system;
            run_guarded(entry.name, "variable", || {
                system.update(scene, assets, dt);
            });
        }

        self.tick += 1;
    }
}

/// Run one system pass, logging the system's identity and phase if it
/// panics. The panic is rethrown unchanged; the tick aborts.
fn run_guarded(name: &str, phase: &str, pass: impl FnOnce()) {
    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(pass)) {
        log::error!("system `{name}` panicked during {phase} update; aborting tick");
        panic::resume_unwind(payload);
    }
}

// ── Behavior dispatch ────────────────────────────────────────────────────

enum Phase {
    Fixed,
    Variable(f32),
}

/// Dispatches [`Behavior`](crate::ecs::Behavior) hooks over every entity.
///
/// Register one instance on each schedule. Per pass it snapshots the entity
/// list, visits each live entity's component slots, runs `on_start` exactly
/// once per component instance (before the per-tick hook, in the same visit),
/// then the hook for the current phase. Components attached by an earlier
/// system in the same tick are started in that tick's pass; components
/// attached during their own entity's visit wait for the next pass.
pub struct BehaviorSystem;

impl FixedSystem for BehaviorSystem {
    fn fixed_update(&mut self, scene: &mut Scene, assets: &AssetStore) {
        dispatch_behaviors(scene, assets, Phase::Fixed);
    }
}

impl VariableSystem for BehaviorSystem {
    fn update(&mut self, scene: &mut Scene, assets: &AssetStore, dt: f32) {
        dispatch_behaviors(scene, assets, Phase::Variable(dt));
    }
}

fn dispatch_behaviors(scene: &mut Scene, assets: &AssetStore, phase: Phase) {
    for entity in scene.snapshot() {
        if !scene.contains(entity) {
            // Removed earlier in this pass or by a previous system.
            continue;
        }
        for slot_id in scene.slot_ids(entity) {
            let Some((mut component, started)) = scene.take_slot(entity, slot_id) else {
                continue;
            };
            let mut now_started = started;
            if let Some(behavior) = component.as_behavior_mut() {
                let mut ctx = BehaviorContext {
                    scene: &mut *scene,
                    entity,
                    assets,
                };
                if !started {
                    behavior.on_start(&mut ctx);
                    now_started = true;
                }
                match phase {
                    Phase::Fixed => behavior.on_fixed_update(&mut ctx),
                    Phase::Variable(dt) => behavior.on_update(&mut ctx, dt),
                }
            }
            scene.restore_slot(entity, slot_id, component, now_started);
            if !scene.contains(entity) {
                // The behavior removed its own entity; stop visiting it.
                break;
            }
        }
    }
}
