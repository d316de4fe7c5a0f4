//! Command execution: collaborator assembly and gauge driving.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use eyre::WrapErr;
use gauge_core::error::Result;
use gauge_core::runner::{self, RunCfg};
use gauge_core::{FilterCfg, FuelCurve, FuelGauge, GaugeBuilder, MeterScale, SchedulerCfg, TickStatus};
use gauge_hardware::{ConsoleDisplay, LineDiagnostics};
use gauge_traits::{FuelDisplay, FuelSensor};

/// Pick the sender front-end for this build.
#[cfg(feature = "hardware")]
fn make_sensor(cfg: &gauge_config::Config, _start_gallons: f32) -> Result<Box<dyn FuelSensor>> {
    use gauge_hardware::mcp3008::{Bus, Mcp3008, SlaveSelect};
    let adc = Mcp3008::new(Bus::Spi0, SlaveSelect::Ss0, cfg.sensor.channel)
        .wrap_err("open mcp3008")?;
    Ok(Box::new(adc))
}

#[cfg(not(feature = "hardware"))]
fn make_sensor(_cfg: &gauge_config::Config, start_gallons: f32) -> Result<Box<dyn FuelSensor>> {
    Ok(Box::new(gauge_hardware::SimulatedSender::new(start_gallons)))
}

fn assemble(
    cfg: &gauge_config::Config,
    sensor: Box<dyn FuelSensor>,
    display: impl FuelDisplay,
    diag: bool,
) -> Result<FuelGauge<Box<dyn FuelSensor>, impl FuelDisplay>> {
    let mut builder = GaugeBuilder::new()
        .with_sensor(sensor)
        .with_display(display)
        .with_curve(FuelCurve::from(&cfg.calibration))
        .with_filter(FilterCfg::from(&cfg.filter))
        .with_scheduler(SchedulerCfg::from(&cfg.scheduler))
        .with_meter(MeterScale::from(&cfg.meter));
    if diag {
        builder = builder.with_diagnostics(Box::new(LineDiagnostics::stderr()));
    }
    builder.build()
}

fn console_display(cfg: &gauge_config::Config) -> ConsoleDisplay<std::io::Stdout> {
    ConsoleDisplay::stdout()
        .with_cells(cfg.meter.segments)
        .with_stats_format(cfg.display.stats_width, cfg.display.stats_decimals)
}

pub fn cmd_run(
    cfg: &gauge_config::Config,
    samples: Option<u64>,
    start_gallons: f32,
    diag: bool,
) -> Result<()> {
    let sensor = make_sensor(cfg, start_gallons)?;
    let mut gauge = assemble(cfg, sensor, console_display(cfg), diag)?;

    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let flag = shutdown.clone();
        ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed))
            .wrap_err("install ctrl-c handler")?;
    }

    let run_cfg = RunCfg {
        poll_ms: cfg.runner.poll_ms,
        max_samples: samples,
    };
    let rendered = runner::run(&mut gauge, &run_cfg, &shutdown)?;
    tracing::info!(rendered, "run finished");
    Ok(())
}

pub fn cmd_sample(
    cfg: &gauge_config::Config,
    count: u32,
    start_gallons: f32,
    json: bool,
) -> Result<()> {
    let sensor = make_sensor(cfg, start_gallons)?;
    let mut gauge = assemble(cfg, sensor, console_display(cfg), false)?;

    // Drive scheduler time directly instead of sleeping through the real
    // cadence; the pipeline behaves exactly as it would on the vehicle.
    let step = cfg.scheduler.startup_interval_ms.max(1);
    let mut now_ms = step;
    let mut taken = 0u32;
    while taken < count {
        if let TickStatus::Rendered(report) = gauge.tick_at(now_ms)? {
            taken += 1;
            if json {
                println!(
                    "{}",
                    serde_json::json!({
                        "at_ms": report.at_ms,
                        "raw": report.raw,
                        "ohms": report.ohms,
                        "gallons": report.gallons,
                        "segments": report.segments,
                    })
                );
            }
        }
        now_ms = now_ms.wrapping_add(step);
    }
    Ok(())
}

pub fn cmd_fit(csv: &Path, json: bool) -> Result<()> {
    let fit = gauge_config::load_calibration_csv(csv)?;
    let curve: gauge_core::DirectCurve = (&fit).into();
    if json {
        println!(
            "{}",
            serde_json::json!({
                "intercept_g": fit.intercept_g,
                "slope_g_per_count": fit.slope_g_per_count,
            })
        );
    } else {
        println!(
            "fitted direct curve: gallons = {:.4} {} {:.6} * raw",
            fit.intercept_g,
            if fit.slope_g_per_count < 0.0 { "-" } else { "+" },
            fit.slope_g_per_count.abs()
        );
        println!("spot check: raw 300 reads {:.2} gal", curve.gallons(300.0));
    }
    Ok(())
}
