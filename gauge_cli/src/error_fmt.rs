//! Human-readable error descriptions and structured JSON error formatting.

/// Map an eyre::Report to a human-readable explanation with likely causes
/// and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    use gauge_core::error::{BuildError, GaugeError};

    // Typed matches first
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Missing or out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun."
            ),
        };
    }

    if let Some(ge) = err.downcast_ref::<GaugeError>() {
        return match ge {
            GaugeError::Sensor(msg) => format!(
                "What happened: Fuel sender read failed ({msg}).\nLikely causes: ADC not wired correctly, wrong SPI channel, or no power to the divider.\nHow to fix: Check sensor.channel in the config and the sender wiring."
            ),
            GaugeError::Display(msg) => format!(
                "What happened: Display render failed ({msg}).\nLikely causes: Cluster unplugged or its output stream closed.\nHow to fix: Check the display connection, then restart the gauge."
            ),
            GaugeError::Config(msg) => format!(
                "What happened: Configuration is invalid ({msg}).\nLikely causes: Malformed TOML or out-of-range values.\nHow to fix: Edit the config file and try again."
            ),
        };
    }

    // Calibration CSV header special-case
    let msg = err.to_string();
    if msg.to_ascii_lowercase().contains("calibration csv must have headers") {
        return "Invalid headers in calibration CSV. Expected 'raw,gallons'.".to_string();
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.chain().nth(1) {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Map typed errors to stable exit codes; everything else returns 1.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    use gauge_core::error::{BuildError, GaugeError};
    if let Some(ge) = err.downcast_ref::<GaugeError>() {
        return match ge {
            GaugeError::Config(_) => 2,
            GaugeError::Sensor(_) => 3,
            GaugeError::Display(_) => 4,
        };
    }
    if err.downcast_ref::<BuildError>().is_some() {
        return 2;
    }
    1
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use gauge_core::error::GaugeError;
    use serde_json::json;

    let reason = match err.downcast_ref::<GaugeError>() {
        Some(GaugeError::Sensor(_)) => "Sensor",
        Some(GaugeError::Display(_)) => "Display",
        Some(GaugeError::Config(_)) => "Config",
        None => "Error",
    };
    json!({ "reason": reason, "message": humanize(err) }).to_string()
}
