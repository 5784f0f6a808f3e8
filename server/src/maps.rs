use model::MapConfig;

/// Radar calibration data for the maps the viewer knows how to draw.
///
/// Configs are read once at startup from `<maps dir>/configs/*.json`, radar
/// images live next to them under `<maps dir>/radars/`. A broken config file
/// is logged and skipped, it never takes the server down.
pub struct MapRegistry {
    maps: std::collections::HashMap<String, MapConfig>,
    radar_dir: std::path::PathBuf,
}

impl MapRegistry {
    pub fn load(maps_dir: &std::path::Path) -> Self {
        let mut maps = std::collections::HashMap::new();

        let configs_dir = maps_dir.join("configs");
        match std::fs::read_dir(&configs_dir) {
            Ok(entries) => {
                for entry in entries.flatten() {
                    let path = entry.path();
                    if path.extension().map(|ext| ext != "json").unwrap_or(true) {
                        continue;
                    }
                    match load_config(&path) {
                        Ok(config) => {
                            maps.insert(config.name.clone(), config);
                        }
                        Err(err) => {
                            tracing::warn!("Skipping map config {}: {}", path.display(), err);
                        }
                    }
                }
            }
            Err(err) => {
                tracing::warn!("No map configs under {}: {}", configs_dir.display(), err);
            }
        }

        Self {
            maps,
            radar_dir: maps_dir.join("radars"),
        }
    }

    pub fn get(&self, name: &str) -> Option<&MapConfig> {
        self.maps.get(name)
    }

    pub fn all(&self) -> Vec<MapConfig> {
        let mut configs: Vec<_> = self.maps.values().cloned().collect();
        configs.sort_unstable_by(|a, b| a.name.cmp(&b.name));
        configs
    }

    pub fn len(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }

    pub fn radar_path(&self, radar_file: &str) -> std::path::PathBuf {
        self.radar_dir.join(radar_file)
    }
}

fn load_config(path: &std::path::Path) -> Result<MapConfig, String> {
    let content = std::fs::read(path).map_err(|err| format!("reading: {}", err))?;
    let mut config: MapConfig =
        serde_json::from_slice(&content).map_err(|err| format!("decoding: {}", err))?;

    if config.name.is_empty() {
        config.name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
    }
    if config.radar_width == 0 {
        config.radar_width = 1024;
    }
    if config.radar_height == 0 {
        config.radar_height = 1024;
    }

    Ok(config)
}
