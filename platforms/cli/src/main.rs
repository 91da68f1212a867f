use clap::Parser;
use std::path::PathBuf;
use tapewright::{
    CancellationToken, ProgramLoader, ProgramManager, ProgramSource, RunConfig, RunOutcome,
    Renderer, Runner, Snapshot, Speed, TuringMachine, TuringMachineError,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[clap(author, version, about, long_about = None, arg_required_else_help = true)]
struct Cli {
    /// The program file to execute
    #[clap(short, long, conflicts_with = "builtin")]
    program: Option<PathBuf>,

    /// Run one of the bundled programs by name
    #[clap(short, long)]
    builtin: Option<String>,

    /// List the bundled programs and exit
    #[clap(long)]
    list: bool,

    /// The initial tape. Defaults to the program's $INITIAL_TAPE directive
    #[clap(short, long)]
    input: Option<String>,

    /// Execute steps in batches without the per-step delay
    #[clap(short, long)]
    full_speed: bool,

    /// Print the machine after every tick
    #[clap(short = 'd', long)]
    debug: bool,

    /// Print every tick as a JSON line
    #[clap(long, conflicts_with = "debug")]
    json: bool,

    /// Pause the run once this many steps have been executed
    #[clap(short, long)]
    max_steps: Option<usize>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[clap(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, PartialEq)]
enum Output {
    Quiet,
    Text,
    Json,
}

/// Prints snapshots to stdout and enforces the step limit.
struct Printer {
    output: Output,
    max_steps: Option<usize>,
    token: CancellationToken,
}

impl Renderer for Printer {
    fn render(&mut self, snapshot: &Snapshot) {
        match self.output {
            Output::Quiet => {}
            Output::Text => println!(
                "Step: {}, State: {}, Head: {}, Tape: {}",
                snapshot.step_count,
                snapshot.state,
                snapshot.head,
                snapshot.tape_line()
            ),
            Output::Json => match serde_json::to_string(snapshot) {
                Ok(line) => println!("{line}"),
                Err(e) => tracing::error!("failed to serialize snapshot: {e}"),
            },
        }

        if self
            .max_steps
            .is_some_and(|max_steps| snapshot.step_count >= max_steps)
        {
            self.token.cancel();
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.list {
        for name in ProgramManager::list_names() {
            println!("{name}");
        }
        return;
    }

    let source = match load_source(&cli) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let initial_tape = cli
        .input
        .clone()
        .unwrap_or_else(|| source.initial_tape().to_string());
    let mut machine = TuringMachine::new(source.text, &initial_tape);

    let output = if cli.json {
        Output::Json
    } else if cli.debug {
        Output::Text
    } else {
        Output::Quiet
    };

    // Only a visible trace is worth slowing down for
    let config = if output == Output::Text {
        RunConfig::default()
    } else {
        RunConfig {
            normal_interval_ms: 0,
            full_interval_ms: 0,
            ..RunConfig::default()
        }
    };

    let mut runner = Runner::new(config);
    if cli.full_speed {
        runner.set_speed(Speed::Full);
    }

    let mut printer = Printer {
        output,
        max_steps: cli.max_steps,
        token: runner.token(),
    };

    if output != Output::Quiet {
        printer.render(&Snapshot::capture(&machine));
    }

    let outcome = if cli.max_steps == Some(0) {
        RunOutcome::Paused
    } else {
        runner.run(&mut machine, &mut printer)
    };

    if output == Output::Json {
        return;
    }

    if output == Output::Text {
        match outcome {
            RunOutcome::Halted => println!("\n{}", machine.status()),
            RunOutcome::Paused => println!("\nStopped after {} steps.", machine.step_count()),
        }
        println!(
            "State: {}, Steps: {}, Head: {}",
            machine.state(),
            machine.step_count(),
            machine.head()
        );
        println!("\nFinal tape:");
    } else if outcome == RunOutcome::Paused {
        eprintln!("Stopped after {} steps.", machine.step_count());
    }

    println!("{}", machine.tape());
}

/// Picks the program source from the command line.
fn load_source(cli: &Cli) -> Result<ProgramSource, TuringMachineError> {
    match (&cli.program, &cli.builtin) {
        (Some(path), _) => ProgramLoader::load_program(path),
        (None, Some(name)) => ProgramManager::get_by_name(name).cloned(),
        (None, None) => Err(TuringMachineError::ValidationError(
            "either --program or --builtin is required".to_string(),
        )),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();
}
