//! Common test utilities
#![allow(dead_code)]

use batrix::batch::BatchedMatrix;
use batrix::dtype::{Complex64, Complex128, Scalar};
use batrix::ops::{Diag, Side, Transpose, Uplo};
use batrix::runtime::Runtime;
use batrix::runtime::cpu::{CpuClient, CpuDevice, CpuRuntime};
use batrix::trsm::TrsmOp;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Create a CPU client and device for testing
pub fn create_cpu_client() -> (CpuClient, CpuDevice) {
    let device = CpuDevice::new();
    let client = CpuRuntime::default_client(&device);
    (client, device)
}

/// Assert two f64 slices are close within tolerance
///
/// Uses the formula: |a - b| <= atol + rtol * |b|
pub fn assert_allclose_f64(a: &[f64], b: &[f64], rtol: f64, atol: f64, msg: &str) {
    assert_eq!(a.len(), b.len(), "{}: length mismatch", msg);
    for (i, (x, y)) in a.iter().zip(b.iter()).enumerate() {
        let diff = (x - y).abs();
        let tol = atol + rtol * y.abs();
        assert!(
            diff <= tol,
            "{}: element {} differs: {} vs {} (diff={}, tol={})",
            msg,
            i,
            x,
            y,
            diff,
            tol
        );
    }
}

/// Assert two f32 slices are close within tolerance
pub fn assert_allclose_f32(a: &[f32], b: &[f32], rtol: f32, atol: f32, msg: &str) {
    assert_eq!(a.len(), b.len(), "{}: length mismatch", msg);
    for (i, (x, y)) in a.iter().zip(b.iter()).enumerate() {
        let diff = (x - y).abs();
        let tol = atol + rtol * y.abs();
        assert!(
            diff <= tol,
            "{}: element {} differs: {} vs {} (diff={}, tol={})",
            msg,
            i,
            x,
            y,
            diff,
            tol
        );
    }
}

/// Scalars the random generators can draw
pub trait TestScalar: Scalar {
    /// Uniform in [-1, 1] (per component)
    fn random(rng: &mut StdRng) -> Self;
    /// Magnitude in [1, 2] with a random sign or phase
    fn random_pivot(rng: &mut StdRng) -> Self;
    /// A value no solve should ever read
    fn poison() -> Self;
}

impl TestScalar for f64 {
    fn random(rng: &mut StdRng) -> Self {
        rng.random_range(-1.0..=1.0)
    }
    fn random_pivot(rng: &mut StdRng) -> Self {
        let m: f64 = rng.random_range(1.0..=2.0);
        if rng.random_bool(0.5) { m } else { -m }
    }
    fn poison() -> Self {
        f64::NAN
    }
}

impl TestScalar for f32 {
    fn random(rng: &mut StdRng) -> Self {
        rng.random_range(-1.0..=1.0)
    }
    fn random_pivot(rng: &mut StdRng) -> Self {
        let m: f32 = rng.random_range(1.0..=2.0);
        if rng.random_bool(0.5) { m } else { -m }
    }
    fn poison() -> Self {
        f32::NAN
    }
}

impl TestScalar for Complex128 {
    fn random(rng: &mut StdRng) -> Self {
        Complex128::new(rng.random_range(-1.0..=1.0), rng.random_range(-1.0..=1.0))
    }
    fn random_pivot(rng: &mut StdRng) -> Self {
        let m: f64 = rng.random_range(1.0..=2.0);
        let phase: f64 = rng.random_range(0.0..std::f64::consts::TAU);
        Complex128::new(m * phase.cos(), m * phase.sin())
    }
    fn poison() -> Self {
        Complex128::new(f64::NAN, f64::NAN)
    }
}

impl TestScalar for Complex64 {
    fn random(rng: &mut StdRng) -> Self {
        Complex64::new(rng.random_range(-1.0..=1.0), rng.random_range(-1.0..=1.0))
    }
    fn random_pivot(rng: &mut StdRng) -> Self {
        let m: f32 = rng.random_range(1.0..=2.0);
        let phase: f32 = rng.random_range(0.0..std::f32::consts::TAU);
        Complex64::new(m * phase.cos(), m * phase.sin())
    }
    fn poison() -> Self {
        Complex64::new(f32::NAN, f32::NAN)
    }
}

fn in_triangle(uplo: Uplo, i: usize, j: usize) -> bool {
    match uplo {
        Uplo::Lower => i >= j,
        Uplo::Upper => i <= j,
    }
}

/// Packed `k x k` well-conditioned triangular matrix
///
/// Off-diagonal entries are scaled by `1/k` so the diagonal dominates.
/// Entries outside the triangle, and the diagonal when `diag` is unit,
/// hold [`TestScalar::poison`].
pub fn random_triangular<T: TestScalar>(
    rng: &mut StdRng,
    k: usize,
    uplo: Uplo,
    diag: Diag,
) -> Vec<T> {
    let scale = T::from_f64(1.0 / k.max(1) as f64);
    let mut a = vec![T::poison(); k * k];
    for j in 0..k {
        for i in 0..k {
            if i == j {
                if !diag.is_unit() {
                    a[i + j * k] = T::random_pivot(rng);
                }
            } else if in_triangle(uplo, i, j) {
                a[i + j * k] = T::random(rng) * scale;
            }
        }
    }
    a
}

/// Packed `rows x cols` matrix with entries in [-1, 1]
pub fn random_dense<T: TestScalar>(rng: &mut StdRng, rows: usize, cols: usize) -> Vec<T> {
    (0..rows * cols).map(|_| T::random(rng)).collect()
}

/// Seeded generator
pub fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// `op(A)` entry `(i, j)` of a packed triangular operand, reading only the
/// stored triangle
fn op_entry<T: Scalar>(a: &[T], k: usize, op: &TrsmOp<T>, i: usize, j: usize) -> T {
    let (r, c) = if op.trans.is_transposed() { (j, i) } else { (i, j) };
    let v = if r == c && op.diag.is_unit() {
        T::one()
    } else if in_triangle(op.uplo, r, c) {
        a[r + c * k]
    } else {
        T::zero()
    };
    if op.trans == Transpose::ConjTrans { v.conj() } else { v }
}

/// Normwise backward error of a solution
///
/// `max|op(A) X - alpha B| / (k * max|A| * max|X| + |alpha| * max|B|)`
/// for `Side::Left`, mirrored for `Side::Right`.
pub fn backward_error<T: Scalar>(op: &TrsmOp<T>, a: &[T], b: &[T], x: &[T]) -> f64 {
    let (m, n, k) = (op.m, op.n, op.k());
    let max_abs = |v: &[T]| {
        v.iter()
            .filter(|e| e.is_finite_val())
            .fold(0.0f64, |acc, e| acc.max(e.modulus()))
    };

    let mut worst = 0.0f64;
    for j in 0..n {
        for i in 0..m {
            let mut s = T::zero();
            for p in 0..k {
                s = s + match op.side {
                    Side::Left => op_entry(a, k, op, i, p) * x[p + j * m],
                    Side::Right => x[i + p * m] * op_entry(a, k, op, p, j),
                };
            }
            let r = s - op.alpha * b[i + j * m];
            if !r.is_finite_val() {
                return f64::INFINITY;
            }
            worst = worst.max(r.modulus());
        }
    }

    let denom = k as f64 * max_abs(a) * max_abs(x) + op.alpha.modulus() * max_abs(b);
    if denom == 0.0 { worst } else { worst / denom }
}

/// Host data and device batches for one randomized problem
pub struct Problem<T: TestScalar> {
    pub op: TrsmOp<T>,
    pub a_host: Vec<Vec<T>>,
    pub b_host: Vec<Vec<T>>,
    pub a: BatchedMatrix<CpuRuntime, T>,
    pub b: BatchedMatrix<CpuRuntime, T>,
}

impl<T: TestScalar> Problem<T> {
    /// Random operands for `batch` instances of `op`
    pub fn random(client: &CpuClient, op: TrsmOp<T>, batch: usize, seed: u64) -> Self {
        let mut rng = rng(seed);
        let k = op.k();
        let a_host: Vec<Vec<T>> = (0..batch)
            .map(|_| random_triangular(&mut rng, k, op.uplo, op.diag))
            .collect();
        let b_host: Vec<Vec<T>> = (0..batch).map(|_| random_dense(&mut rng, op.m, op.n)).collect();

        let a = BatchedMatrix::from_instances(client, k, k, k.max(1), &a_host).unwrap();
        let b = BatchedMatrix::from_instances(client, op.m, op.n, op.m.max(1), &b_host).unwrap();
        Self {
            op,
            a_host,
            b_host,
            a,
            b,
        }
    }

    /// Check every instance of a solution against the host data
    pub fn assert_solved(&self, x: &BatchedMatrix<CpuRuntime, T>, tol_eps: f64, msg: &str) {
        let tol = tol_eps * T::epsilon();
        for (i, inst) in x.to_instances().unwrap().iter().enumerate() {
            let err = backward_error(&self.op, &self.a_host[i], &self.b_host[i], inst);
            assert!(err <= tol, "{msg}: instance {i} backward error {err:e} > {tol:e}");
        }
    }
}

/// Every (side, uplo, trans) combination for the given transposes
pub fn variants(transposes: &[Transpose]) -> Vec<(Side, Uplo, Transpose)> {
    let mut out = Vec::new();
    for side in [Side::Left, Side::Right] {
        for uplo in [Uplo::Lower, Uplo::Upper] {
            for &trans in transposes {
                out.push((side, uplo, trans));
            }
        }
    }
    out
}
