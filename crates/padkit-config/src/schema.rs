//! Statically enumerated schema of writable configuration fields.
//!
//! # Design
//! - One `FieldDef` per tunable, built at compile time; the merge loop in
//!   `store.rs` and the generic settings surfaces iterate this table instead
//!   of reflecting over the record.
//! - Derived properties and canonical constants have no entry, so a submit
//!   can never touch them.
//! - Table order is the merge order.

use serde_json::{Value, json};

use crate::model::PadProfile;

/// Accessor pair for a single writable field.
pub struct FieldDef {
    /// Stable field name, matching the serialized form of [`PadProfile`].
    pub name: &'static str,
    /// Read the field from a profile as a uniform JSON value.
    pub get: fn(&PadProfile) -> Value,
    /// Copy the field value from `src` into `dst`.
    pub apply: fn(src: &PadProfile, dst: &mut PadProfile),
}

macro_rules! field {
    ($name:ident) => {
        FieldDef {
            name: stringify!($name),
            get: |profile| json!(profile.$name),
            apply: |src, dst| dst.$name = src.$name,
        }
    };
    (clone $name:ident) => {
        FieldDef {
            name: stringify!($name),
            get: |profile| json!(profile.$name),
            apply: |src, dst| dst.$name.clone_from(&src.$name),
        }
    };
}

/// Every writable field of [`PadProfile`], in merge order.
pub static WRITABLE_FIELDS: &[FieldDef] = &[
    field!(flip_lx),
    field!(flip_ly),
    field!(flip_rx),
    field!(flip_ry),
    field!(disable_rumble),
    field!(swap_triggers),
    field!(idle_timeout),
    field!(rumble_latency),
    field!(dead_zone_left),
    field!(dead_zone_right),
    field!(disable_native_feed),
    field!(disable_ssp),
    field!(async_hid_processing),
    field!(light_bar_brightness),
    field!(bus_id),
    field!(repair_bluetooth),
    field!(show_battery_info),
    field!(color_full),
    field!(color_high),
    field!(color_medium),
    field!(color_low),
    field!(color_dying),
    field!(update_rate),
    field!(profiles_enabled),
    field!(force_bluetooth_driver_reinstall),
    field!(force_ds3_driver_reinstall),
    field!(force_ds4_driver_reinstall),
    field!(disable_virtual_bus),
    field!(always_unplug_virtual_bus),
    field!(reserve_pad_slot),
    field!(service_priority),
    field!(led_flash_period),
    field!(led_function),
    field!(flash_leds_while_charging),
    field!(custom_leds),
    field!(clone pcsx2_root_path),
    field!(pressure_sensitivity_mod),
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn table_covers_every_serialized_field_exactly_once() {
        let serialized = serde_json::to_value(PadProfile::default()).unwrap();
        let Value::Object(map) = serialized else {
            panic!("profile must serialize to an object");
        };
        let record_fields: BTreeSet<&str> = map.keys().map(String::as_str).collect();
        let table_fields: BTreeSet<&str> = WRITABLE_FIELDS.iter().map(|def| def.name).collect();

        assert_eq!(table_fields, record_fields);
        assert_eq!(WRITABLE_FIELDS.len(), record_fields.len());
    }

    #[test]
    fn getter_matches_serialized_representation() {
        let profile = PadProfile::default();
        let serialized = serde_json::to_value(&profile).unwrap();
        for def in WRITABLE_FIELDS {
            assert_eq!(
                &(def.get)(&profile),
                &serialized[def.name],
                "getter for '{}' disagrees with serde",
                def.name
            );
        }
    }

    #[test]
    fn apply_copies_a_single_field() {
        let mut src = PadProfile::default();
        src.set_update_rate_wire(crate::model::UpdateRate::Slow.wire());
        let mut dst = PadProfile::default();

        let def = WRITABLE_FIELDS
            .iter()
            .find(|def| def.name == "update_rate")
            .unwrap();
        (def.apply)(&src, &mut dst);
        assert_eq!(dst.update_rate, src.update_rate);
        assert_eq!(dst.flip_lx, PadProfile::default().flip_lx);
    }
}
