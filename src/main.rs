use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::Parser;
use log::{error, info, warn};

use stepper_loadtest::hal::{
    ChannelInput, LogSink, OperatorChannel, OperatorReply, SharedLoadCell, StdDelay,
};
use stepper_loadtest::sampling::{Mailbox, SamplingConsumer};
use stepper_loadtest::sim::{SimActuator, SimLoadCell, VirtualClock};
use stepper_loadtest::{
    load_config, MotionController, Program, ProgramExecutor, SharedCalibration, StartGate,
};

/// Run a load test program on simulated hardware
#[derive(Parser, Debug)]
#[command(author, version, about = "Stepper load test sequencer")]
struct Args {
    /// Bench configuration file (TOML)
    config: PathBuf,

    /// Start without waiting for the operator
    #[arg(long)]
    autostart: bool,

    /// Second operator input, read line by line (e.g. a FIFO)
    #[arg(long)]
    operator_pipe: Option<PathBuf>,

    /// Step as fast as possible instead of in real time
    #[arg(long)]
    fast: bool,

    /// Raw counts of the unloaded simulated cell
    #[arg(long, default_value_t = 8000)]
    zero_counts: i32,

    /// Raw counts per load unit of the simulated cell
    #[arg(long, default_value_t = 42.0)]
    counts_per_unit: f32,

    /// Load added per actuator step by the simulated spring
    #[arg(long, default_value_t = 0.01)]
    load_per_step: f32,
}

/// Flags shared by every operator line reader.
#[derive(Clone)]
struct LineGate {
    /// Set once the program is running.
    started: Arc<AtomicBool>,
    /// Raised by the first line read before the run starts.
    start_request: Arc<AtomicBool>,
}

/// Forward operator lines to `tx` once the run has started. Before that,
/// any line raises the start request.
fn forward_lines<R: BufRead>(name: &str, reader: R, gate: &LineGate, tx: &Sender<OperatorReply>) {
    for line in reader.lines() {
        let Ok(line) = line else { break };
        if !gate.started.load(Ordering::Acquire) {
            gate.start_request.store(true, Ordering::Release);
            continue;
        }
        match OperatorReply::parse_line(&line) {
            Some(reply) => {
                if tx.send(reply).is_err() {
                    break;
                }
            }
            None => warn!(
                "{}: ignoring {:?}, expected a number or an empty line",
                name, line
            ),
        }
    }
    info!("{}: operator input closed", name);
}

fn spawn_reader<F>(name: &'static str, gate: LineGate, open: F) -> ChannelInput
where
    F: FnOnce() -> std::io::Result<Box<dyn BufRead>> + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    let spawned = thread::Builder::new()
        .name(name.into())
        .spawn(move || match open() {
            Ok(reader) => forward_lines(name, reader, &gate, &tx),
            Err(e) => error!("{}: cannot open operator input: {}", name, e),
        });
    if let Err(e) = spawned {
        error!("{} reader not started: {}", name, e);
    }
    ChannelInput::new(rx)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = load_config(&args.config)?;
    let program = Program::parse(config.program_lines());
    info!(
        "loaded {} program lines from {}",
        program.len(),
        args.config.display()
    );

    let calibration = SharedCalibration::new(config.calibration);
    let mailbox = Arc::new(Mailbox::new());
    let clock = VirtualClock::new();
    let cell = SimLoadCell::new(args.zero_counts, args.counts_per_unit);
    let actuator = SimActuator::new(clock.clone())
        .with_pacing(!args.fast)
        .with_spring(cell.clone(), args.load_per_step);
    let sensor = SharedLoadCell::new(cell);

    let consumer = SamplingConsumer::new(
        Arc::clone(&mailbox),
        sensor.clone(),
        LogSink,
        clock.clone(),
        calibration.clone(),
    )
    .readings_per_sample(config.sampling.readings_per_sample)
    .poll_interval(Duration::from_micros(config.sampling.poll_interval_us))
    .spawn();

    let gate = LineGate {
        started: Arc::new(AtomicBool::new(false)),
        start_request: Arc::new(AtomicBool::new(false)),
    };
    let mut operator = OperatorChannel::new(config.procedure.input_poll_ms).with_source(
        spawn_reader("stdin", gate.clone(), || {
            Ok(Box::new(BufReader::new(std::io::stdin())) as Box<dyn BufRead>)
        }),
    );
    if let Some(path) = args.operator_pipe.clone() {
        operator = operator.with_source(spawn_reader("operator-pipe", gate.clone(), move || {
            Ok(Box::new(BufReader::new(File::open(path)?)) as Box<dyn BufRead>)
        }));
    }

    let autostart = Arc::new(AtomicBool::new(args.autostart || config.autostart));
    if !autostart.load(Ordering::Acquire) {
        info!("press enter to start");
    }
    StartGate::new(config.procedure.input_poll_ms)
        .with_trigger(autostart)
        .with_trigger(Arc::clone(&gate.start_request))
        .wait(&mut StdDelay);
    gate.started.store(true, Ordering::Release);

    let motion = MotionController::new(actuator, clock, Arc::clone(&mailbox));
    let mut executor = ProgramExecutor::new(motion, sensor, operator, StdDelay, calibration)
        .with_procedure(config.procedure);
    let report = executor.run(&program);

    let delivered = consumer.stop().map(|c| c.delivered()).unwrap_or(0);
    let stats = mailbox.stats();
    info!(
        "run report: {} executed, {} skipped, {} moves, {} samples requested",
        report.executed, report.skipped, report.moves, report.samples_requested
    );
    info!(
        "sampling: {} delivered, {} overwritten",
        delivered, stats.overwritten
    );
    Ok(())
}
