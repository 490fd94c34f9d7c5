use bevy_log::info;
use ocean::{OceanConfig, WavePreset};
use ron::de::from_str;
use std::fs;
use std::path::Path;

/// Reads an [`OceanConfig`] from a RON file.
///
/// Without a path, or when the file does not exist, the configuration is
/// built from `preset`. Fields missing from the file take their defaults.
pub fn load_ocean_config(
    path: Option<&Path>,
    preset: WavePreset,
) -> Result<OceanConfig, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        info!("No ocean configuration given, using the {:?} preset", preset);
        return Ok(OceanConfig::from_preset(preset));
    };

    if !path.exists() {
        info!(
            "Ocean configuration not found: {}. Using the {:?} preset.",
            path.display(),
            preset
        );
        return Ok(OceanConfig::from_preset(preset));
    }

    let contents: String = fs::read_to_string(path)?;
    let config: OceanConfig = from_str(&contents)?;

    info!(
        "Loaded ocean configuration from disk: {} ({} waves, {} sample slots)",
        path.display(),
        config.waves.len(),
        config.sampler.capacity
    );

    Ok(config)
}
