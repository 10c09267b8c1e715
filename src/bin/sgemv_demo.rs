use anyhow::Result;
use clap::Parser;
use log::info;
use qvec::kernel::{sgemv_reference, BiasMode, Kernel, LayerWeights, MatVec, SparseLayerWeights, SPARSE_BLOCK};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(author, version, about = "Time sgemv kernel variants against the float reference", long_about = None)]
struct Args {
    /// Output rows of the test layer
    #[arg(long, default_value_t = 1024)]
    rows: usize,

    /// Input columns of the test layer
    #[arg(long, default_value_t = 512)]
    cols: usize,

    /// Kernel calls per timed variant
    #[arg(long, default_value_t = 200)]
    iters: usize,

    /// Fraction of 4x4 blocks kept in the sparse layer
    #[arg(long, default_value_t = 0.25)]
    density: f64,

    /// RNG seed
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut rng = SmallRng::seed_from_u64(args.seed);
    let weights: Vec<f32> = (0..args.rows * args.cols).map(|_| rng.gen_range(-0.25..0.25)).collect();
    let bias: Vec<f32> = (0..args.rows).map(|_| rng.gen_range(-0.1..0.1)).collect();
    let x: Vec<f32> = (0..args.cols).map(|_| rng.gen_range(-1.0..1.0)).collect();

    let dense = LayerWeights::from_float(args.rows, args.cols, weights.clone(), bias.clone())?;

    // Sparse copy: drop blocks at random, keep the survivors verbatim.
    let mut sparse_w = weights;
    for r0 in (0..args.rows).step_by(SPARSE_BLOCK) {
        for c0 in (0..args.cols).step_by(SPARSE_BLOCK) {
            if rng.gen_bool(args.density) {
                continue;
            }
            for r in 0..SPARSE_BLOCK {
                for c in 0..SPARSE_BLOCK {
                    sparse_w[(r0 + r) * args.cols + c0 + c] = 0.0;
                }
            }
        }
    }
    let sparse_dense = LayerWeights::from_float(args.rows, args.cols, sparse_w, bias)?;
    let sparse = SparseLayerWeights::from_dense(&sparse_dense)?;
    info!(
        "layer {}x{}, sparse layer keeps {} of {} blocks",
        args.rows,
        args.cols,
        sparse.nb_blocks(),
        (args.rows / SPARSE_BLOCK) * (args.cols / SPARSE_BLOCK)
    );

    let mut reference = vec![0f32; args.rows];
    sgemv_reference(&mut reference, &dense, &x);

    let variants = [
        (MatVec::DotProd, BiasMode::Signed, "dot/signed"),
        (MatVec::DotProd, BiasMode::SignedUnsigned, "dot/su"),
        (MatVec::Mac, BiasMode::Signed, "mac/signed"),
        (MatVec::Mac, BiasMode::SignedUnsigned, "mac/su"),
    ];
    let mut out = vec![0f32; args.rows];
    for (matvec, bias_mode, name) in variants {
        let mut kernel = Kernel::new(matvec, bias_mode);
        let start = Instant::now();
        for _ in 0..args.iters {
            kernel.sgemv(&mut out, &dense, &x)?;
        }
        let elapsed = start.elapsed();
        let max_err = out
            .iter()
            .zip(&reference)
            .map(|(a, b)| (a - b).abs())
            .fold(0f32, f32::max);
        println!(
            "{:<12} {:>8.1} us/call   max err vs reference {:.6}",
            name,
            elapsed.as_secs_f64() * 1e6 / args.iters as f64,
            max_err
        );

        let start = Instant::now();
        for _ in 0..args.iters {
            kernel.sparse_sgemv(&mut out, &sparse, &x)?;
        }
        let elapsed = start.elapsed();
        println!(
            "{:<12} {:>8.1} us/call   (sparse)",
            name,
            elapsed.as_secs_f64() * 1e6 / args.iters as f64
        );
    }
    Ok(())
}
