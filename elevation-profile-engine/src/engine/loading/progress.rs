use bevy::prelude::*;

#[derive(Resource, Default, Debug)]
pub struct LoadingProgress {
    pub settings_loaded: bool,
    /// Settings file missing or malformed; defaults stay in force.
    pub settings_failed: bool,
    pub scene_spawned: bool,
}

impl LoadingProgress {
    /// True once the settings file has either loaded or definitively failed.
    pub fn settings_resolved(&self) -> bool {
        self.settings_loaded || self.settings_failed
    }

    pub fn stage(&self) -> &'static str {
        match (self.settings_resolved(), self.scene_spawned) {
            (false, _) => "loading_settings",
            (true, false) => "spawning_scene",
            (true, true) => "ready",
        }
    }
}
