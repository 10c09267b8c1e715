use qvec::kernel::{sgemv_reference, BiasMode, Kernel, LayerWeights, MatVec};

const ROWS: usize = 48;
const COLS: usize = 64;

// Worst-case per-term quantization error times COLS, with headroom.
const TOL: f32 = 0.35;

fn lcg(seed: &mut u64) -> f32 {
    *seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
    // map high bits to [-1, 1)
    ((*seed >> 33) as f32 / (1u64 << 31) as f32) * 2.0 - 1.0
}

fn test_layer(seed: u64) -> (LayerWeights, Vec<f32>) {
    let mut s = seed;
    let weights: Vec<f32> = (0..ROWS * COLS).map(|_| lcg(&mut s) * 0.25).collect();
    let bias: Vec<f32> = (0..ROWS).map(|_| lcg(&mut s) * 0.1).collect();
    let x: Vec<f32> = (0..COLS).map(|_| lcg(&mut s)).collect();
    (LayerWeights::from_float(ROWS, COLS, weights, bias).unwrap(), x)
}

fn run(matvec: MatVec, bias: BiasMode, layer: &LayerWeights, x: &[f32]) -> Vec<f32> {
    let mut kernel = Kernel::new(matvec, bias);
    let mut out = vec![0f32; layer.rows];
    kernel.sgemv(&mut out, layer, x).unwrap();
    out
}

fn max_abs_diff(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(p, q)| (p - q).abs()).fold(0f32, f32::max)
}

const ALL_VARIANTS: [(MatVec, BiasMode); 4] = [
    (MatVec::DotProd, BiasMode::Signed),
    (MatVec::DotProd, BiasMode::SignedUnsigned),
    (MatVec::Mac, BiasMode::Signed),
    (MatVec::Mac, BiasMode::SignedUnsigned),
];

#[test]
fn all_four_variants_track_the_float_reference() {
    let (layer, x) = test_layer(0x1234_5678_9abc_def0);
    let mut reference = vec![0f32; ROWS];
    sgemv_reference(&mut reference, &layer, &x);

    for (matvec, bias) in ALL_VARIANTS {
        let out = run(matvec, bias, &layer, &x);
        let err = max_abs_diff(&out, &reference);
        assert!(
            err <= TOL,
            "{:?}/{:?} drifted {} from reference (tol {})",
            matvec,
            bias,
            err,
            TOL
        );
    }
}

#[test]
fn variants_agree_with_each_other_within_tolerance() {
    // Toggling a strategy changes implementation, not the math.
    let (layer, x) = test_layer(0x0dd0_feed_beef_cafe);
    let baseline = run(MatVec::DotProd, BiasMode::Signed, &layer, &x);
    for (matvec, bias) in ALL_VARIANTS {
        let out = run(matvec, bias, &layer, &x);
        let err = max_abs_diff(&out, &baseline);
        assert!(err <= 2.0 * TOL, "{:?}/{:?} drifted {} from baseline", matvec, bias, err);
    }
}

#[test]
fn su_bias_correction_cancels_the_unsigned_offset() {
    // A constant zero input exposes an uncorrected +128 offset directly:
    // every accumulator term degenerates to 128 * w.
    let weights = vec![0.2f32; 8 * 16];
    let bias = vec![0.05f32; 8];
    let layer = LayerWeights::from_float(8, 16, weights, bias).unwrap();
    let x = vec![0f32; 16];

    let out = run(MatVec::DotProd, BiasMode::SignedUnsigned, &layer, &x);
    for &v in &out {
        assert!((v - 0.05).abs() <= 1e-3, "offset leaked into output: {}", v);
    }
}

#[test]
fn repeated_calls_are_deterministic() {
    let (layer, x) = test_layer(7);
    let mut kernel = Kernel::new(MatVec::DotProd, BiasMode::SignedUnsigned);
    let mut a = vec![0f32; ROWS];
    let mut b = vec![0f32; ROWS];
    kernel.sgemv(&mut a, &layer, &x).unwrap();
    kernel.sgemv(&mut b, &layer, &x).unwrap();
    assert_eq!(a, b);
}

#[test]
fn identity_like_layer_recovers_scaled_input() {
    // Diagonal layer: out[j] ~= 0.5 * x[j] under every variant.
    let n = 16;
    let mut weights = vec![0f32; n * n];
    for j in 0..n {
        weights[j * n + j] = 0.5;
    }
    let layer = LayerWeights::from_float(n, n, weights, vec![0.0; n]).unwrap();
    let x: Vec<f32> = (0..n).map(|i| (i as f32 / n as f32) - 0.5).collect();

    for (matvec, bias) in ALL_VARIANTS {
        let out = run(matvec, bias, &layer, &x);
        for j in 0..n {
            assert!(
                (out[j] - 0.5 * x[j]).abs() <= 0.02,
                "{:?}/{:?} out[{}] = {} vs {}",
                matvec,
                bias,
                j,
                out[j],
                0.5 * x[j]
            );
        }
    }
}
