use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct LinkConfig {
    pub gcs_system_id: u8,
    pub gcs_component_id: u8,
    /// Vehicle target used for outbound commands until the first inbound
    /// message reveals the real identity.
    pub default_target_system: u8,
    pub default_target_component: u8,
    /// Baud rate applied when the device descriptor names a serial port.
    pub serial_baud: u32,
    /// Pause between dispatch cycles.
    pub cycle_interval: Duration,
    pub heartbeat_interval: Duration,
    /// Link is considered lost after `heartbeat_timeout_multiplier *
    /// heartbeat_interval` without an inbound heartbeat. Zero disables the
    /// timeout.
    pub heartbeat_timeout_multiplier: u32,
    /// Directory where reconstructed images and their info sidecars land.
    pub image_dir: PathBuf,
    /// Check debug self-test payloads against the known-good pattern.
    pub verify_debug_payload: bool,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            gcs_system_id: 255,
            gcs_component_id: 190,
            default_target_system: 1,
            default_target_component: 1,
            serial_baud: 57600,
            cycle_interval: Duration::from_millis(2),
            heartbeat_interval: Duration::from_secs(1),
            heartbeat_timeout_multiplier: 5,
            image_dir: PathBuf::from("received-images"),
            verify_debug_payload: false,
        }
    }
}
