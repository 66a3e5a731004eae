//! Human-readable error descriptions and structured JSON error formatting.

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    use fatigue_core::error::{BuildError, MonitorError, PlanError};

    // Typed matches first
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingAcquisition => {
                "What happened: No acquisition device was provided to the monitor.\nLikely causes: The DAQ failed to open or was not wired into the builder.\nHow to fix: Check devices.daq_port and that the device is in CDC mode.".to_string()
            }
            BuildError::MissingActuator => {
                "What happened: No actuator link was provided to the monitor.\nLikely causes: The limit-switch controller failed to open.\nHow to fix: Check devices.actuator_port and the USB cable.".to_string()
            }
            BuildError::MissingSink => {
                "What happened: No record file was provided to the monitor.\nLikely causes: The output file could not be created.\nHow to fix: Pass a writable path with --output.".to_string()
            }
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Out-of-range values in the TOML or on the command line.\nHow to fix: Edit the config file or the override flags, then rerun."
            ),
        };
    }

    if let Some(pe) = err.downcast_ref::<PlanError>() {
        return match pe {
            PlanError::ExceedsTravel { target_mm, max_mm } => format!(
                "What happened: The stretch target of {target_mm} mm is beyond the machine travel of {max_mm} mm.\nLikely causes: Stretch percentage or clamp offset too large for this sample.\nHow to fix: Lower --stretch-pct or --offset-mm (or motion.* in the config). No program was written."
            ),
            PlanError::Invalid(msg) => format!(
                "What happened: Invalid motion parameters ({msg}).\nLikely causes: Zero cycles or feed rates in [motion].\nHow to fix: Edit the config or the override flags, then rerun."
            ),
        };
    }

    if let Some(me) = err.downcast_ref::<MonitorError>() {
        return match me {
            MonitorError::AckTimeout { waited_ms } => format!(
                "What happened: The actuator did not acknowledge the stop command within {waited_ms} ms.\nLikely causes: Controller unpowered, wrong actuator port, or firmware not answering.\nHow to fix: STOP THE MACHINE MANUALLY, then check devices.actuator_port and the controller. Raise safety.ack_timeout_ms if the controller is slow."
            ),
            MonitorError::Interrupted => {
                "What happened: The run was interrupted by the operator.\nLikely causes: Ctrl-C was pressed.\nHow to fix: Make sure the actuator is stopped; the record file holds every sample up to the interruption.".to_string()
            }
            MonitorError::Timeout => {
                "What happened: A device read timed out.\nLikely causes: Cable unplugged or the device stopped streaming.\nHow to fix: Check the USB connections and rerun.".to_string()
            }
            MonitorError::Persist(msg) => format!(
                "What happened: The record file could not be written ({msg}).\nLikely causes: Missing directory, permissions, or a full disk.\nHow to fix: Choose another --output path."
            ),
            other => format!(
                "What happened: {other}.\nLikely causes: See logs.\nHow to fix: Re-run with --log-level=debug or set RUST_LOG for more detail."
            ),
        };
    }

    // String-based heuristics for errors coming from init or config
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.contains("open acquisition device") || lower.contains("open actuator") {
        return "What happened: Failed to open a serial device.\nLikely causes: Wrong port name, device unplugged, or insufficient permissions.\nHow to fix: Fix [devices] in the config; on Linux add your user to the dialout group.".to_string();
    }

    if lower.contains("read config") {
        return format!(
            "What happened: The config file could not be read.\nLikely causes: Wrong --config path.\nHow to fix: Point --config at a TOML file (see etc/fatigue.toml). Original: {msg}"
        );
    }

    if lower.contains("parse config") || lower.contains("invalid config") {
        let cause = err.root_cause().to_string();
        return format!(
            "What happened: Configuration is invalid ({cause}).\nLikely causes: Missing [devices] ports or out-of-range values.\nHow to fix: Edit the TOML config and try again."
        );
    }

    // Calibration CSV header special-case
    if lower.contains("calibration csv must have headers") {
        return "Invalid headers in calibration CSV. Expected 'raw,physical'.".to_string();
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable process exit codes; anything unclassified is 1.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    use fatigue_core::error::{MonitorError, PlanError};
    match err.downcast_ref::<MonitorError>() {
        Some(MonitorError::AckTimeout { .. }) => return 3,
        Some(MonitorError::Interrupted) => return 4,
        _ => {}
    }
    if let Some(PlanError::ExceedsTravel { .. }) = err.downcast_ref::<PlanError>() {
        return 5;
    }
    1
}

/// Short machine-readable name for the error class.
pub fn reason_name(err: &eyre::Report) -> &'static str {
    use fatigue_core::error::{BuildError, MonitorError, PlanError};
    if let Some(me) = err.downcast_ref::<MonitorError>() {
        return match me {
            MonitorError::AckTimeout { .. } => "AckTimeout",
            MonitorError::Interrupted => "Interrupted",
            MonitorError::Timeout => "Timeout",
            MonitorError::Hardware(_) => "Hardware",
            MonitorError::Config(_) => "Config",
            MonitorError::Decode(_) => "Decode",
            MonitorError::Persist(_) => "Persist",
            MonitorError::State(_) => "State",
        };
    }
    if let Some(pe) = err.downcast_ref::<PlanError>() {
        return match pe {
            PlanError::ExceedsTravel { .. } => "ExceedsTravel",
            PlanError::Invalid(_) => "InvalidPlan",
        };
    }
    if err.downcast_ref::<BuildError>().is_some() {
        return "Build";
    }
    "Error"
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use fatigue_core::error::{MonitorError, PlanError};
    use serde_json::json;

    let details = match (
        err.downcast_ref::<MonitorError>(),
        err.downcast_ref::<PlanError>(),
    ) {
        (Some(MonitorError::AckTimeout { waited_ms }), _) => Some(json!({ "waited_ms": waited_ms })),
        (_, Some(PlanError::ExceedsTravel { target_mm, max_mm })) => {
            Some(json!({ "target_mm": target_mm, "max_mm": max_mm }))
        }
        _ => None,
    };

    let mut obj = json!({
        "reason": reason_name(err),
        "exit_code": exit_code_for_error(err),
        "message": humanize(err),
    });
    if let Some(d) = details {
        obj["details"] = d;
    }
    obj.to_string()
}
