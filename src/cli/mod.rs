// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses arguments with clap and hands off to Layer 2.
//
//   1. `evaluate` — score the best checkpoint on a dataset file
//   2. `init`     — write a config and an untrained checkpoint
//
// The backend is chosen here: Wgpu unless `--cpu` is given.

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, EvaluateArgs, InitArgs};

use crate::application::{
    evaluate_use_case::EvaluateUseCase, init_use_case::InitUseCase, CpuBackend, GpuBackend,
};
use crate::domain::report::EvalReport;

#[derive(Parser, Debug)]
#[command(
    name = "har-eval",
    version = "0.1.0",
    about = "Evaluate an Attend-and-Discriminate activity recognition model."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Evaluate(args) => run_evaluate(&args),
            Commands::Init(args)     => run_init(&args),
        }
    }
}

fn run_evaluate(args: &EvaluateArgs) -> Result<()> {
    let use_case = EvaluateUseCase::new(args.into());

    let report = if args.cpu {
        use_case.execute::<CpuBackend>(&Default::default())?
    } else {
        use_case.execute::<GpuBackend>(&Default::default())?
    };

    print_report(&report);
    Ok(())
}

fn run_init(args: &InitArgs) -> Result<()> {
    let use_case = InitUseCase::new(&args.checkpoint_dir, args.into(), args.seed);

    let path = if args.cpu {
        use_case.execute::<CpuBackend>(&Default::default())?
    } else {
        use_case.execute::<GpuBackend>(&Default::default())?
    };

    println!("Checkpoint written to {}", path.display());
    Ok(())
}

fn print_report(report: &EvalReport) {
    println!("\n{} split", report.split);
    println!("  loss         {:.4}", report.loss);
    println!("  accuracy     {:.2}%", 100.0 * report.accuracy);
    println!("  f1 (macro)   {:.2}%", 100.0 * report.f1_macro);
    println!("  f1 (weight.) {:.2}%", 100.0 * report.f1_weighted);
    println!("  predictions  {}", report.predictions.len());
    println!("  elapsed      {}", report.elapsed_hms());
}
