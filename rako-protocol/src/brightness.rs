//! Scene to brightness conversion

/// Brightness implied by a scene number.
///
/// Scenes 1–4 are the bridge's standard presets (full, 75%, 50%, 25%); scene 0
/// is off. Higher scene numbers have no fixed level and count as fully on.
pub fn scene_to_brightness(scene: u8) -> u8 {
    match scene {
        0 => 0,
        1 => 255,
        2 => 192,
        3 => 128,
        4 => 64,
        _ => 255,
    }
}
