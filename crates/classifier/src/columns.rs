//! Per-Machine-Type Feature Columns
//!
//! Each persisted model was trained on exactly one ordered column list; the
//! matrix fed to it must reproduce that list verbatim. The asymmetry between
//! valve and the other machine types is an artifact of how the models were
//! trained, kept here as data rather than re-derived logic. Reordering or
//! extending a list silently invalidates predictions.

use archive_index::MachineType;

/// Columns for fan, slider and pump models
const COMMON_COLUMNS: [&str; 15] = [
    "T_rms_mean",
    "T_rms_std",
    "T_zcr_mean",
    "F_mel_mean",
    "F_mel_std",
    "F_mel_rms_mean",
    "F_mel_rms_std",
    "F_mfcc_mean",
    "F_mfcc_std",
    "F_flatness_mean",
    "F_bandwidth_mean",
    "F_bandwidth_std",
    "F_contrast_mean",
    "F_rolloff_mean",
    "F_rolloff_std",
];

/// Columns for the valve model: the full schema including the three
/// std-deviation columns the other models omit
const VALVE_COLUMNS: [&str; 18] = [
    "T_rms_mean",
    "T_rms_std",
    "T_zcr_mean",
    "T_zcr_std",
    "F_mel_mean",
    "F_mel_std",
    "F_mel_rms_mean",
    "F_mel_rms_std",
    "F_mfcc_mean",
    "F_mfcc_std",
    "F_flatness_mean",
    "F_flatness_std",
    "F_bandwidth_mean",
    "F_bandwidth_std",
    "F_contrast_mean",
    "F_contrast_std",
    "F_rolloff_mean",
    "F_rolloff_std",
];

/// Ordered feature columns for a machine type's model
pub fn selected_features(machine: MachineType) -> &'static [&'static str] {
    match machine {
        MachineType::Valve => &VALVE_COLUMNS,
        _ => &COMMON_COLUMNS,
    }
}
