#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Parse and validation errors are fine; panics are not.
    if let Ok(cfg) = toml::from_str::<fatigue_config::Config>(data) {
        if cfg.validate().is_ok() {
            // a validated config must map cleanly onto runtime types
            let _ = fatigue_core::CalibrationCurve::try_from(cfg.calibration.resistance)
                .expect("validated resistance curve");
            let _ = fatigue_core::CalibrationCurve::try_from(cfg.calibration.stretch)
                .expect("validated stretch curve");
            let _: fatigue_core::AcquisitionCfg = (&cfg.acquisition).into();
        }
    }
});
