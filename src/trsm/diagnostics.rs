//! Opt-in checks the solve itself never performs

use crate::batch::BatchedMatrix;
use crate::dtype::Scalar;
use crate::error::{Error, Result};
use crate::ops::Diag;
use crate::runtime::Runtime;

/// First zero or non-finite diagonal entry of each instance's leading
/// `k x k` triangle
///
/// The blocked solve inverts diagonal blocks without pivoting and does not
/// report singular instances. Callers that need a hard guarantee can run
/// this beforehand; it reads the operand back to the host and enqueues
/// nothing. With `Diag::Unit` the stored diagonal is ignored and every
/// instance reports `None`.
pub fn find_singular_diagonals<R: Runtime, T: Scalar>(
    diag: Diag,
    k: usize,
    a: &BatchedMatrix<R, T>,
) -> Result<Vec<Option<usize>>> {
    if k > a.rows().min(a.cols()) {
        return Err(Error::invalid_argument(
            3,
            "a",
            format!("{}x{} matrix cannot hold {k}x{k}", a.rows(), a.cols()),
        ));
    }
    if diag.is_unit() {
        return Ok(vec![None; a.batch_count()]);
    }

    let rows = a.rows();
    Ok(a.to_instances()?
        .iter()
        .map(|inst| {
            (0..k).find(|&i| {
                let d = inst[i + i * rows];
                d.modulus() == 0.0 || !d.is_finite_val()
            })
        })
        .collect())
}
