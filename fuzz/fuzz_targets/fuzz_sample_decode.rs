#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    if let Ok(s) = fatigue_core::Sample::parse(data, ',') {
        assert!(s.resistance_raw.is_finite() && s.stretch_raw.is_finite());
    }
});
