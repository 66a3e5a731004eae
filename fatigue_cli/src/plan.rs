//! `fatigue plan`: motion program generation.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use eyre::WrapErr;
use fatigue_core::{MotionCfg, MotionPlan};

#[derive(Debug, Clone, Copy, Default)]
pub struct PlanOverrides {
    pub cycles: Option<u32>,
    pub stretch_pct: Option<f64>,
    pub offset_mm: Option<f64>,
}

pub fn motion_cfg(cfg: &fatigue_config::Config, ov: PlanOverrides) -> MotionCfg {
    let mut m: MotionCfg = (&cfg.motion).into();
    if let Some(c) = ov.cycles {
        m.cycles = c;
    }
    if let Some(p) = ov.stretch_pct {
        m.stretch_pct = p;
    }
    if let Some(o) = ov.offset_mm {
        m.offset_mm = o;
    }
    m
}

/// Compute the plan and write the program; nothing is written when the plan is refused.
pub fn run_plan(
    cfg: &fatigue_config::Config,
    ov: PlanOverrides,
    output: Option<&Path>,
) -> eyre::Result<MotionPlan> {
    let plan = MotionPlan::compute(&motion_cfg(cfg, ov))?;
    tracing::info!(
        original_length_mm = plan.original_length_mm,
        target_mm = plan.target_mm,
        cycles = plan.cycles,
        estimated = %plan.estimated_duration(),
        "motion plan"
    );
    match output {
        Some(path) => {
            let file = File::create(path)
                .wrap_err_with(|| format!("create program file {}", path.display()))?;
            let mut w = BufWriter::new(file);
            plan.write_program(&mut w)
                .wrap_err_with(|| format!("write program file {}", path.display()))?;
        }
        None => {
            let stdout = std::io::stdout();
            let mut w = stdout.lock();
            plan.write_program(&mut w).wrap_err("write program to stdout")?;
            w.flush()?;
        }
    }
    Ok(plan)
}

pub fn plan_json(plan: &MotionPlan) -> serde_json::Value {
    serde_json::json!({
        "original_length_mm": plan.original_length_mm,
        "base_mm": plan.base_mm,
        "target_mm": plan.target_mm,
        "stretch_pct": plan.stretch_pct,
        "cycles": plan.cycles,
        "estimated_minutes": plan.estimated_minutes(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> fatigue_config::Config {
        fatigue_config::load_toml("[devices]\ndaq_port = \"a\"\nactuator_port = \"b\"\n").unwrap()
    }

    #[test]
    fn overrides_replace_config_values() {
        let m = motion_cfg(
            &cfg(),
            PlanOverrides {
                cycles: Some(3),
                stretch_pct: Some(10.0),
                offset_mm: None,
            },
        );
        assert_eq!(m.cycles, 3);
        assert_eq!(m.stretch_pct, 10.0);
        assert_eq!(m.offset_mm, 17.0);
    }

    #[test]
    fn refused_plan_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("prog.gcode");
        let err = run_plan(
            &cfg(),
            PlanOverrides {
                stretch_pct: Some(100.0),
                offset_mm: Some(90.0),
                ..PlanOverrides::default()
            },
            Some(&out),
        )
        .unwrap_err();
        assert!(err.downcast_ref::<fatigue_core::PlanError>().is_some());
        assert!(!out.exists());
    }

    #[test]
    fn nan_offset_override_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("prog.gcode");
        let err = run_plan(
            &cfg(),
            PlanOverrides {
                offset_mm: Some(f64::NAN),
                ..PlanOverrides::default()
            },
            Some(&out),
        )
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<fatigue_core::PlanError>(),
            Some(fatigue_core::PlanError::Invalid(_))
        ));
        assert!(!out.exists());
    }
}
