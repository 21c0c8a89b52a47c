use bevy::asset::LoadState;
use bevy::prelude::*;

use crate::engine::assets::profile_settings::ProfileSettings;
use crate::engine::loading::progress::LoadingProgress;

/// Settings file, relative to the asset root.
pub const SETTINGS_PATH: &str = "config/settings.profile.json";

#[derive(Resource, Default)]
pub struct SettingsLoader {
    handle: Option<Handle<ProfileSettings>>,
}

// Start the loading process
pub fn start_loading(mut settings_loader: ResMut<SettingsLoader>, asset_server: Res<AssetServer>) {
    info!("Loading settings from: {}", SETTINGS_PATH);
    settings_loader.handle = Some(asset_server.load(SETTINGS_PATH));
}

/// Replace the default settings once the file is in, or keep them if it failed.
pub fn load_settings_system(
    mut loading_progress: ResMut<LoadingProgress>,
    settings_loader: Res<SettingsLoader>,
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    settings_assets: Res<Assets<ProfileSettings>>,
) {
    if loading_progress.settings_resolved() {
        return;
    }
    let Some(ref handle) = settings_loader.handle else {
        return;
    };

    if let Some(settings) = settings_assets.get(handle) {
        match settings.validate() {
            Ok(()) => {
                info!("✓ Settings loaded: {:?}", settings.sampling);
                commands.insert_resource(settings.clone());
                loading_progress.settings_loaded = true;
            }
            Err(err) => {
                warn!("Settings rejected, keeping defaults: {}", err);
                loading_progress.settings_failed = true;
            }
        }
    } else if let Some(LoadState::Failed(err)) = asset_server.get_load_state(handle) {
        warn!("Settings unavailable, keeping defaults: {}", err);
        loading_progress.settings_failed = true;
    }
}
