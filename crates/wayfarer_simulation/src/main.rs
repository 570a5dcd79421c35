//! Headless симуляция Wayfarer
//!
//! Wanderer'ы бродят, один умирает, мир сохраняется и восстанавливается.

use bevy::prelude::*;
use wayfarer_simulation::logger;
use wayfarer_simulation::{
    capture_world, create_headless_app, restore_world, run_fixed_tick, spawn_mover, Health,
    SaveError, SaveFile, SimulationConfig, SimulationPlugin, Wanderer,
};

const WANDERER_COUNT: usize = 4;

fn main() -> Result<(), SaveError> {
    let config = SimulationConfig::default();
    let mut app = create_headless_app(config.seed);
    app.add_plugins(SimulationPlugin::with_config(config.clone()));

    logger::log_info(&format!(
        "Starting Wayfarer headless simulation (seed: {}, {} Hz)",
        config.seed, config.tick_hz
    ));

    let mut wanderers = Vec::with_capacity(WANDERER_COUNT);
    {
        let mut commands = app.world_mut().commands();
        for i in 0..WANDERER_COUNT {
            let home = Vec3::new(i as f32 * 10.0, 0.0, 0.0);
            let entity = spawn_mover(&mut commands, &config, format!("wanderer-{}", i), home);
            commands.entity(entity).insert(Wanderer { home, radius: 6.0 });
            wanderers.push(entity);
        }
    }
    app.world_mut().flush();

    for tick in 0..300 {
        run_fixed_tick(&mut app);

        if tick % 100 == 0 {
            logger::log_info(&format!("Tick {}: {} movers", tick, wanderers.len()));
        }
    }

    let save_path = std::env::temp_dir().join("wayfarer_save.json");
    capture_world(app.world_mut())?
        .write_to_path(&save_path)
        .inspect_err(|err| logger::log_error(&format!("Save failed: {}", err)))?;
    logger::log_info(&format!("Saved to {}", save_path.display()));

    if let Some(mut health) = app.world_mut().get_mut::<Health>(wanderers[0]) {
        health.take_damage(u32::MAX);
    }

    for _ in 0..120 {
        run_fixed_tick(&mut app);
    }

    let save = SaveFile::read_from_path(&save_path)
        .inspect_err(|err| logger::log_error(&format!("Load failed: {}", err)))?;
    let report = restore_world(app.world_mut(), &save);
    logger::log_info(&format!("Restored: {:?}", report));

    logger::log_info("Simulation complete!");
    Ok(())
}
