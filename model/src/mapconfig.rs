// Radar calibration for one map, matching the JSON shipped under
// assets/maps/configs/. posX/posY/scale translate world coordinates into
// radar-image pixels.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MapConfig {
    pub name: String,
    pub display_name: String,
    pub pos_x: f64,
    pub pos_y: f64,
    pub scale: f64,
    pub radar_file: String,
    pub lower_radar_file: Option<String>,
    pub radar_width: u32,
    pub radar_height: u32,
}
