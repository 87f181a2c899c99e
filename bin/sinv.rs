use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, ValueEnum};
use sparse_inverse::{
    MatrixMarketLoader, OrderingMethod, SinvConfig, SinvError, init_logger_with_level,
    load_matrix, sinv_with_config,
};
use tracing::{Level, error, info};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Ordering {
    /// Approximate minimum degree
    Amd,
    /// Keep the file's variable order
    Natural,
}

#[derive(Parser)]
#[command(name = "sinv")]
#[command(about = "Sparse inverse of a symmetric positive definite Matrix Market matrix")]
struct Args {
    /// Matrix Market file (.mtx); only the lower triangle is used
    input: PathBuf,

    /// Fill-reducing ordering used by the factorization
    #[arg(short, long, value_enum, default_value = "amd")]
    ordering: Ordering,

    /// Optional path to save the sparse inverse (symmetric Matrix Market)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Finish the factorization past a failed pivot and report the minor
    #[arg(long)]
    diagnostics: bool,

    /// Number of marginal variances to print
    #[arg(long, default_value = "10")]
    show: usize,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();
    init_logger_with_level(if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    });

    if let Err(e) = run(&args) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let start = Instant::now();
    let a = load_matrix(&args.input).map_err(SinvError::from)?;
    info!(
        "Loaded {}: {}x{}, {} nonzeros ({:.1}ms)",
        args.input.display(),
        a.nrows(),
        a.ncols(),
        a.nnz(),
        start.elapsed().as_secs_f64() * 1000.0
    );

    let ordering = match args.ordering {
        Ordering::Amd => OrderingMethod::Amd,
        Ordering::Natural => OrderingMethod::Natural,
    };
    let config = SinvConfig::new()
        .with_ordering(ordering)
        .with_extended_diagnostics(args.diagnostics);

    let start = Instant::now();
    let result = sinv_with_config(&a, &config)?;
    let elapsed = start.elapsed();

    let fill_ratio = if a.nnz() > 0 {
        result.nnz() as f64 / a.nnz() as f64
    } else {
        1.0
    };
    info!(
        "Sparse inverse: n = {}, nnz(Z) = {}, fill ratio = {:.2}, time = {:.3}ms",
        result.dim(),
        result.nnz(),
        fill_ratio,
        elapsed.as_secs_f64() * 1000.0
    );
    if let Some(minor) = result.minor {
        info!("Minor: {}", minor);
    }
    if let Some(perm) = &result.perm {
        info!("Permutation head: {:?}", &perm[..perm.len().min(args.show)]);
    }

    for (i, variance) in result
        .marginal_variances()
        .iter()
        .enumerate()
        .take(args.show)
    {
        info!("var[{}] = {:.6e}", i, variance);
    }

    if let Some(output) = &args.output {
        MatrixMarketLoader::write(&result.z, output, true)?;
        info!("Sparse inverse written to {}", output.display());
    }

    Ok(())
}
