//! Typed configuration record and field value types.
//!
//! # Design
//! - `PadProfile` is a flat aggregate of independently-named tunables; cloning
//!   it is the snapshot operation, so every field is an owned value.
//! - Constants and derived properties live on the type but are never merge
//!   targets; only the fields enumerated in `schema.rs` are writable.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Result, anyhow};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Milliseconds represented by one unit of [`PadProfile::idle_timeout`].
pub const IDLE_TIMEOUT_MULTIPLIER: u64 = 60_000;

/// Milliseconds represented by one unit of [`PadProfile::rumble_latency`].
pub const LATENCY_MULTIPLIER: u64 = 16;

/// Fixed Bluetooth link key shared with the pairing subsystem.
const LINK_KEY: [u8; 16] = [
    0x56, 0xE8, 0x81, 0x38, 0x08, 0x06, 0x51, 0x41, 0xC0, 0x7F, 0x12, 0xAA, 0xD9, 0x66, 0x3C, 0xCE,
];

static INSTALL_DIR: Lazy<PathBuf> = Lazy::new(|| {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
});

/// Root directory of the padkit installation, resolved once at process start
/// from the running executable's location. Never configurable.
#[must_use]
pub fn install_dir() -> &'static Path {
    &INSTALL_DIR
}

/// DS4 input update interval, restricted to the intervals the pad firmware
/// accepts. The `u8` wire discriminants are the values written into the HID
/// configuration report.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum UpdateRate {
    /// Shortest supported update interval.
    Fastest,
    /// Default interval for Bluetooth operation.
    #[default]
    Fast,
    /// Conservative interval for congested links.
    Normal,
    /// Longest supported update interval.
    Slow,
}

impl UpdateRate {
    /// Wire discriminant written into the HID configuration report.
    #[must_use]
    pub const fn wire(self) -> u8 {
        match self {
            Self::Fastest => 0x80,
            Self::Fast => 0xA0,
            Self::Normal => 0xB0,
            Self::Slow => 0xD0,
        }
    }

    /// Decode a wire discriminant, returning `None` for undefined values.
    #[must_use]
    pub const fn from_wire(raw: u8) -> Option<Self> {
        match raw {
            0x80 => Some(Self::Fastest),
            0xA0 => Some(Self::Fast),
            0xB0 => Some(Self::Normal),
            0xD0 => Some(Self::Slow),
            _ => None,
        }
    }
}

/// OS scheduling class applied to the background service process.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProcessPriority {
    /// Lowest scheduling class.
    Idle,
    /// Below-normal scheduling class.
    BelowNormal,
    /// Default scheduling class.
    #[default]
    Normal,
    /// Above-normal scheduling class.
    AboveNormal,
    /// High scheduling class.
    High,
    /// Real-time scheduling class.
    RealTime,
}

impl ProcessPriority {
    /// Render the priority as its lowercase string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::BelowNormal => "below_normal",
            Self::Normal => "normal",
            Self::AboveNormal => "above_normal",
            Self::High => "high",
            Self::RealTime => "real_time",
        }
    }
}

impl FromStr for ProcessPriority {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "idle" => Ok(Self::Idle),
            "below_normal" => Ok(Self::BelowNormal),
            "normal" => Ok(Self::Normal),
            "above_normal" => Ok(Self::AboveNormal),
            "high" => Ok(Self::High),
            "real_time" => Ok(Self::RealTime),
            other => Err(anyhow!("invalid process priority '{other}'")),
        }
    }
}

/// Packed `0x00RRGGBB` light bar color.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(transparent)]
pub struct LightBarColor(pub u32);

impl LightBarColor {
    /// Pack individual channel values into a color.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self(((red as u32) << 16) | ((green as u32) << 8) | blue as u32)
    }

    /// Red channel value.
    #[must_use]
    pub const fn red(self) -> u8 {
        (self.0 >> 16) as u8
    }

    /// Green channel value.
    #[must_use]
    pub const fn green(self) -> u8 {
        (self.0 >> 8) as u8
    }

    /// Blue channel value.
    #[must_use]
    pub const fn blue(self) -> u8 {
        self.0 as u8
    }
}

/// The configuration record: every runtime-tunable setting of the driver
/// service, as one flat aggregate.
///
/// A clone of a `PadProfile` is a fully independent snapshot; mutating it is
/// never visible through any other instance until the copy is merged back via
/// [`crate::ConfigStore::submit`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PadProfile {
    /// Invert the left stick X axis.
    pub flip_lx: bool,
    /// Invert the left stick Y axis.
    pub flip_ly: bool,
    /// Invert the right stick X axis.
    pub flip_rx: bool,
    /// Invert the right stick Y axis.
    pub flip_ry: bool,
    /// Suppress force-feedback output entirely.
    pub disable_rumble: bool,
    /// Exchange the L2/R2 trigger assignments.
    pub swap_triggers: bool,
    /// Minutes of inactivity before a pad is disconnected; `0` disables.
    pub idle_timeout: u32,
    /// Rumble command latency in [`LATENCY_MULTIPLIER`] units.
    pub rumble_latency: u32,
    /// Left analog stick deadzone radius.
    pub dead_zone_left: u8,
    /// Right analog stick deadzone radius.
    pub dead_zone_right: u8,
    /// Suppress the native HID input feed while the virtual pad is active.
    pub disable_native_feed: bool,
    /// Disable Bluetooth Secure Simple Pairing.
    pub disable_ssp: bool,
    /// Process HID reports off the polling thread.
    pub async_hid_processing: bool,
    /// DS4 light bar brightness; `0` turns the light bar off.
    pub light_bar_brightness: u8,
    /// Virtual bus identifier the service attaches pads to.
    pub bus_id: u32,
    /// Re-pair DS4 pads on every wired connect.
    pub repair_bluetooth: bool,
    /// Surface pad battery state in the notification overlay.
    pub show_battery_info: bool,
    /// Light bar color while the battery is full.
    pub color_full: LightBarColor,
    /// Light bar color while the battery is high.
    pub color_high: LightBarColor,
    /// Light bar color while the battery is at medium charge.
    pub color_medium: LightBarColor,
    /// Light bar color while the battery is low.
    pub color_low: LightBarColor,
    /// Light bar color while the battery is nearly exhausted.
    pub color_dying: LightBarColor,
    /// DS4 input update interval.
    pub update_rate: UpdateRate,
    /// Enable per-pad mapping profiles.
    pub profiles_enabled: bool,
    /// Reinstall the Bluetooth host driver on service start.
    pub force_bluetooth_driver_reinstall: bool,
    /// Reinstall the DS3 function driver on service start.
    pub force_ds3_driver_reinstall: bool,
    /// Reinstall the DS4 function driver on service start.
    pub force_ds4_driver_reinstall: bool,
    /// Skip virtual bus bring-up entirely.
    pub disable_virtual_bus: bool,
    /// Force-unplug every virtual pad when the service stops.
    pub always_unplug_virtual_bus: bool,
    /// Hold the first pad slot for a wired pad.
    pub reserve_pad_slot: bool,
    /// OS scheduling class of the background service process.
    pub service_priority: ProcessPriority,
    /// DS3 LED flash period in milliseconds.
    pub led_flash_period: u32,
    /// DS3 LED pattern selector.
    pub led_function: u8,
    /// Flash the pad-ID LEDs while the battery is charging.
    pub flash_leds_while_charging: bool,
    /// DS3 custom LED states, one per pad-ID LED.
    pub custom_leds: [bool; 4],
    /// PCSX2 installation root, when the pressure-sensitivity patch is used.
    pub pcsx2_root_path: Option<PathBuf>,
    /// Apply the PCSX2 pressure-sensitivity patch.
    pub pressure_sensitivity_mod: bool,
}

impl PadProfile {
    /// Fixed Bluetooth link key shared with the pairing subsystem.
    ///
    /// The key is a process-lifetime constant: every snapshot observes the
    /// same bytes, and callers can only mutate their own copies of it.
    #[must_use]
    pub const fn link_key() -> &'static [u8; 16] {
        &LINK_KEY
    }

    /// Whether the DS4 light bar is switched off.
    #[must_use]
    pub const fn light_bar_disabled(&self) -> bool {
        self.light_bar_brightness == 0
    }

    /// Whether idle pads are disconnected at all.
    #[must_use]
    pub const fn idle_disconnect_enabled(&self) -> bool {
        self.idle_timeout != 0
    }

    /// Effective idle timeout, or `None` when idle disconnect is disabled.
    #[must_use]
    pub fn idle_timeout_duration(&self) -> Option<Duration> {
        self.idle_disconnect_enabled()
            .then(|| Duration::from_millis(u64::from(self.idle_timeout) * IDLE_TIMEOUT_MULTIPLIER))
    }

    /// Effective rumble command latency.
    #[must_use]
    pub fn rumble_latency_duration(&self) -> Duration {
        Duration::from_millis(u64::from(self.rumble_latency) * LATENCY_MULTIPLIER)
    }

    /// Store an update rate received as a wire discriminant.
    ///
    /// Undefined values are ignored: the stored rate is left unchanged and
    /// `false` is returned. This mirrors the device protocol, where unknown
    /// interval codes must not clobber a working configuration.
    pub fn set_update_rate_wire(&mut self, raw: u8) -> bool {
        match UpdateRate::from_wire(raw) {
            Some(rate) => {
                self.update_rate = rate;
                true
            }
            None => false,
        }
    }
}

impl Default for PadProfile {
    fn default() -> Self {
        Self {
            flip_lx: false,
            flip_ly: false,
            flip_rx: false,
            flip_ry: false,
            disable_rumble: false,
            swap_triggers: false,
            idle_timeout: 10,
            rumble_latency: 8,
            dead_zone_left: 0,
            dead_zone_right: 0,
            disable_native_feed: false,
            disable_ssp: false,
            async_hid_processing: true,
            light_bar_brightness: 128,
            bus_id: 0,
            repair_bluetooth: false,
            show_battery_info: false,
            color_full: LightBarColor::from_rgb(0x00, 0xFF, 0x00),
            color_high: LightBarColor::from_rgb(0x80, 0xFF, 0x00),
            color_medium: LightBarColor::from_rgb(0xFF, 0xFF, 0x00),
            color_low: LightBarColor::from_rgb(0xFF, 0x80, 0x00),
            color_dying: LightBarColor::from_rgb(0xFF, 0x00, 0x00),
            update_rate: UpdateRate::Fast,
            profiles_enabled: false,
            force_bluetooth_driver_reinstall: false,
            force_ds3_driver_reinstall: false,
            force_ds4_driver_reinstall: false,
            disable_virtual_bus: false,
            always_unplug_virtual_bus: false,
            reserve_pad_slot: false,
            service_priority: ProcessPriority::Normal,
            led_flash_period: 500,
            led_function: 0,
            flash_leds_while_charging: false,
            custom_leds: [false; 4],
            pcsx2_root_path: None,
            pressure_sensitivity_mod: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_rate_wire_round_trips_defined_values() {
        for rate in [
            UpdateRate::Fastest,
            UpdateRate::Fast,
            UpdateRate::Normal,
            UpdateRate::Slow,
        ] {
            assert_eq!(UpdateRate::from_wire(rate.wire()), Some(rate));
        }
        assert_eq!(UpdateRate::from_wire(0x00), None);
        assert_eq!(UpdateRate::from_wire(0xFF), None);
    }

    #[test]
    fn undefined_wire_rate_is_ignored() {
        let mut profile = PadProfile::default();
        let before = profile.update_rate;
        assert!(!profile.set_update_rate_wire(0x42));
        assert_eq!(profile.update_rate, before);

        assert!(profile.set_update_rate_wire(UpdateRate::Slow.wire()));
        assert_eq!(profile.update_rate, UpdateRate::Slow);
    }

    #[test]
    fn derived_light_bar_state_follows_brightness() {
        let off = PadProfile {
            light_bar_brightness: 0,
            ..PadProfile::default()
        };
        assert!(off.light_bar_disabled());

        let dim = PadProfile {
            light_bar_brightness: 1,
            ..PadProfile::default()
        };
        assert!(!dim.light_bar_disabled());
    }

    #[test]
    fn derived_idle_disconnect_follows_timeout() {
        let disabled = PadProfile {
            idle_timeout: 0,
            ..PadProfile::default()
        };
        assert!(!disabled.idle_disconnect_enabled());
        assert_eq!(disabled.idle_timeout_duration(), None);

        let enabled = PadProfile {
            idle_timeout: 5,
            ..PadProfile::default()
        };
        assert!(enabled.idle_disconnect_enabled());
        assert_eq!(
            enabled.idle_timeout_duration(),
            Some(Duration::from_millis(5 * IDLE_TIMEOUT_MULTIPLIER))
        );
    }

    #[test]
    fn rumble_latency_scales_by_multiplier() {
        let profile = PadProfile {
            rumble_latency: 8,
            ..PadProfile::default()
        };
        assert_eq!(
            profile.rumble_latency_duration(),
            Duration::from_millis(8 * LATENCY_MULTIPLIER)
        );
    }

    #[test]
    fn light_bar_color_packs_channels() {
        let color = LightBarColor::from_rgb(0x12, 0x34, 0x56);
        assert_eq!(color.0, 0x0012_3456);
        assert_eq!(color.red(), 0x12);
        assert_eq!(color.green(), 0x34);
        assert_eq!(color.blue(), 0x56);
    }

    #[test]
    fn process_priority_parses_and_formats() {
        assert_eq!(
            "real_time".parse::<ProcessPriority>().unwrap(),
            ProcessPriority::RealTime
        );
        assert_eq!(ProcessPriority::BelowNormal.as_str(), "below_normal");
        assert!("turbo".parse::<ProcessPriority>().is_err());
    }

    #[test]
    fn partial_settings_document_fills_defaults() {
        let profile: PadProfile =
            serde_json::from_str(r#"{ "swap_triggers": true, "idle_timeout": 0 }"#).unwrap();
        assert!(profile.swap_triggers);
        assert_eq!(profile.idle_timeout, 0);
        assert_eq!(profile.rumble_latency, PadProfile::default().rumble_latency);
    }
}
