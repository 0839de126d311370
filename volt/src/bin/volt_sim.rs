//! Simulated autonomous routine
//!
//! Drives a simulated two-attachment robot through a short routine using the
//! execution loop, then prints the tracer's running listing.
//!
//! Run with: cargo run --bin volt-sim -- --max-ticks 2000 --trace-out trace.jsonl

use anyhow::Context;
use clap::Parser;
use colored::*;
use parking_lot::Mutex;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use volt::prelude::*;
use volt::{JsonLinesSink, LogSink};

#[derive(Parser)]
#[command(name = "volt-sim")]
#[command(about = "Run a demo autonomous routine against a simulated robot")]
#[command(version)]
struct Cli {
    /// Loop configuration file (.toml, .yaml or .yml)
    #[arg(short = 'c', long = "config", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Write previews and tick packets as JSON lines to this file
    #[arg(short = 't', long = "trace-out", value_name = "PATH")]
    trace_out: Option<PathBuf>,

    /// Cancel the routine after this many ticks per step
    #[arg(short = 'm', long = "max-ticks", value_name = "N")]
    max_ticks: Option<u64>,
}

/// Field position in inches, heading in degrees
#[derive(Debug, Clone, Copy, Default)]
struct Pose {
    x: f64,
    y: f64,
    heading: f64,
}

/// Drivetrain moving a fixed distance per tick
struct SimDrive {
    pose: Mutex<Pose>,
    inches_per_tick: f64,
}

/// Linear lift with a shared busy flag
struct SimLift {
    height: Mutex<f64>,
    busy: Arc<AtomicBool>,
    inches_per_tick: f64,
}

struct SimBot {
    drive: Arc<SimDrive>,
    lift: Arc<SimLift>,
}

impl SimBot {
    fn new() -> Self {
        Self {
            drive: Arc::new(SimDrive {
                pose: Mutex::new(Pose::default()),
                inches_per_tick: 0.5,
            }),
            lift: Arc::new(SimLift {
                height: Mutex::new(0.0),
                busy: Arc::new(AtomicBool::new(false)),
                inches_per_tick: 0.25,
            }),
        }
    }

    fn drive_to(&self, x: f64, y: f64) -> DriveTo {
        DriveTo {
            drive: self.drive.clone(),
            start: *self.drive.pose.lock(),
            target: (x, y),
        }
    }

    fn lift_to(&self, target: f64) -> ControlAction {
        let lift = self.lift.clone();
        ControlAction::new("Lift", move |packet| {
            let mut height = lift.height.lock();
            let step = (target - *height).clamp(-lift.inches_per_tick, lift.inches_per_tick);
            *height += step;
            packet.put("lift/height", *height);
            Ok((target - *height).abs() < 1e-9)
        })
        .on_init(move || log::debug!("Lift moving to {:.1}in", target))
        .with_running_flag(self.lift.busy.clone())
    }
}

impl Robot for SimBot {
    fn name(&self) -> &str {
        "simbot"
    }

    fn update(&mut self, telemetry: &mut dyn Telemetry) {
        let pose = *self.drive.pose.lock();
        telemetry.add_data("Pose", &format!("({:.1}, {:.1}) @ {:.0}°", pose.x, pose.y, pose.heading));
        telemetry.add_data("Lift", &format!("{:.2}in", *self.lift.height.lock()));
        telemetry.add_data("Lift busy", &self.lift.busy.load(Ordering::SeqCst));
    }

    fn stop(&mut self) {
        self.lift.busy.store(false, Ordering::SeqCst);
        log::info!("Simulated robot stopped");
    }
}

/// Straight-line drive to a field point
struct DriveTo {
    drive: Arc<SimDrive>,
    start: Pose,
    target: (f64, f64),
}

impl Action for DriveTo {
    fn advance(&mut self, packet: &mut TelemetryPacket) -> VoltResult<Status> {
        let mut pose = self.drive.pose.lock();
        let (dx, dy) = (self.target.0 - pose.x, self.target.1 - pose.y);
        let distance = dx.hypot(dy);

        if distance > self.drive.inches_per_tick {
            let scale = self.drive.inches_per_tick / distance;
            pose.x += dx * scale;
            pose.y += dy * scale;
            pose.heading = dy.atan2(dx).to_degrees();
        } else {
            pose.x = self.target.0;
            pose.y = self.target.1;
        }

        packet.put("drive/x", pose.x);
        packet.put("drive/y", pose.y);
        packet
            .field_overlay()
            .set_fill("#3F51B5")
            .fill_circle(pose.x, pose.y, 9.0);

        Ok(Status::running_if(distance > self.drive.inches_per_tick))
    }

    fn preview(&self, canvas: &mut Canvas) {
        canvas
            .set_stroke("#4CAF50")
            .set_stroke_width(1)
            .stroke_line(self.start.x, self.start.y, self.target.0, self.target.1);
    }

    fn name(&self) -> &str {
        "DriveTo"
    }
}

fn registry() -> ActionRegistry {
    let mut registry = ActionRegistry::new();
    registry.register(
        ActionDescriptor::new("wait", "Wait", "Pause the routine", "timing").with_parameter(
            ActionParameter::new("seconds", ParamKind::Number, "Seconds to wait")
                .optional(0.1)
                .range(0.0, 15.0),
        ),
        |params| Ok(Box::new(WaitAction::from_secs_f64(params.get_f64("seconds", 0.1)))),
    );
    registry
}

fn load_config(cli: &Cli) -> anyhow::Result<LoopConfig> {
    let mut config = match &cli.config {
        Some(path) => LoopConfig::from_file(path)
            .with_context(|| format!("Failed to load loop config from {}", path.display()))?,
        None => LoopConfig::standard(),
    };
    config.name = "volt-sim".to_string();
    if let Some(max_ticks) = cli.max_ticks {
        config = config.with_max_ticks(max_ticks);
    }
    config.validate()?;
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let tracer = ActionTracer::new(config.tracer_capacity);

    let mut exec = ExecutionLoop::new()
        .with_config(config)
        .with_tracer(tracer.clone());
    exec = match &cli.trace_out {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create trace file {}", path.display()))?;
            tracing::info!("Writing diagnostics to {}", path.display());
            exec.with_sink(JsonLinesSink::new(BufWriter::new(file)))
        }
        None => exec.with_sink(LogSink),
    };
    exec.cancellation_token().install_ctrlc_handler()?;

    let registry = Arc::new(registry());
    let wait_params = ActionParams::new().with("seconds", 0.25)?;

    let mut auto = AutonomousMode::new(SimBot::new()).with_loop(exec);
    let step_tracer = tracer.clone();
    auto.then(move |bot: &SimBot| -> Box<dyn Action> {
        Box::new(traced_volt_action(bot, &step_tracer, |b| {
            b.parallel(|p| {
                let drive = p.robot().drive_to(24.0, 0.0);
                let lift = p.robot().lift_to(6.0);
                p.include(drive).include(lift);
            });
            b.instant(|| log::info!("Scoring preload"));
        }))
    });
    let step_registry = registry.clone();
    auto.then(move |_bot: &SimBot| -> Box<dyn Action> {
        match step_registry.create("wait", &wait_params) {
            Ok(action) => action,
            Err(e) => {
                log::warn!("Falling back to default wait: {}", e);
                Box::new(WaitAction::from_secs_f64(0.1))
            }
        }
    });
    let step_tracer = tracer.clone();
    auto.then(move |bot: &SimBot| -> Box<dyn Action> {
        Box::new(traced_volt_action(bot, &step_tracer, |b| {
            b.sequence(|s| {
                let drive = s.robot().drive_to(24.0, 24.0);
                s.include(drive);
            });
            b.parallel(|p| {
                let drive = p.robot().drive_to(0.0, 0.0);
                let lift = p.robot().lift_to(0.0);
                p.include(drive).include(lift);
            });
        }))
    });

    println!("{}", format!("VOLT simulator v{}", volt::version()).bold());
    let report = auto.execute()?;

    let status = match report.outcome {
        RunOutcome::Completed => "completed".green(),
        RunOutcome::Cancelled => "cancelled".yellow(),
    };
    println!(
        "Routine {} after {} ticks across {} steps",
        status,
        report.total_ticks(),
        report.runs.len()
    );
    for line in auto.telemetry().last_frame() {
        println!("  {}", line);
    }
    tracer.print_running();

    Ok(())
}
