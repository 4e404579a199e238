//! Batch-level properties: instance independence and parallel determinism

mod common;

use batrix::batch::BatchedMatrix;
use batrix::ops::{Diag, Side, Transpose, Uplo};
use batrix::runtime::cpu::{CpuClient, CpuDevice, CpuRuntime, ParallelismConfig};
use batrix::trsm::{TRSM_NB, TrsmOp, trsm};
use common::{Problem, create_cpu_client};

type Batch = BatchedMatrix<CpuRuntime, f64>;

fn solve(client: &CpuClient, op: &TrsmOp<f64>, a: &Batch, b_host: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let mut b = Batch::from_instances(client, op.m, op.n, op.m, b_host).unwrap();
    trsm(client, op, a, &mut b).unwrap();
    b.to_instances().unwrap()
}

#[test]
fn test_permuted_batch_gives_permuted_results() {
    let (client, _) = create_cpu_client();
    let op = TrsmOp::new(
        Side::Right,
        Uplo::Lower,
        Transpose::Trans,
        Diag::NonUnit,
        4,
        TRSM_NB + 5,
        1.0,
    );
    let p = Problem::random(&client, op, 5, 21);
    let reference = solve(&client, &op, &p.a, &p.b_host);

    let order = [3, 0, 4, 2, 1];
    let a_perm = p.a.with_pointer_order(&client, &order).unwrap();
    let b_perm: Vec<Vec<f64>> = order.iter().map(|&i| p.b_host[i].clone()).collect();
    let permuted = solve(&client, &op, &a_perm, &b_perm);

    for (slot, &src) in order.iter().enumerate() {
        assert_eq!(permuted[slot], reference[src], "slot {slot} (instance {src})");
    }
}

#[test]
fn test_other_instances_do_not_leak() {
    let (client, _) = create_cpu_client();
    let op = TrsmOp::new(
        Side::Left,
        Uplo::Upper,
        Transpose::NoTrans,
        Diag::NonUnit,
        TRSM_NB + 1,
        3,
        1.0,
    );
    let p = Problem::random(&client, op, 3, 22);
    let reference = solve(&client, &op, &p.a, &p.b_host);

    // poison instances 0 and 2 entirely
    let k = op.k();
    let mut a_host = p.a_host.clone();
    a_host[0] = vec![f64::NAN; k * k];
    a_host[2] = vec![0.0; k * k];
    let mut b_host = p.b_host.clone();
    b_host[0] = vec![f64::INFINITY; op.m * op.n];
    let a = Batch::from_instances(&client, k, k, k, &a_host).unwrap();

    let results = solve(&client, &op, &a, &b_host);
    assert_eq!(results[1], reference[1]);
    assert!(results[0].iter().all(|v| !v.is_finite()));
}

#[test]
fn test_thread_count_does_not_change_results() {
    let device = CpuDevice::new();
    let serial = CpuClient::new(device.clone())
        .with_parallelism(ParallelismConfig {
            num_threads: Some(1),
            min_batch_len: usize::MAX,
        })
        .unwrap();
    let parallel = CpuClient::new(device)
        .with_parallelism(ParallelismConfig {
            num_threads: Some(4),
            min_batch_len: 2,
        })
        .unwrap();
    assert_eq!(parallel.parallelism().num_threads, Some(4));

    let op = TrsmOp::new(
        Side::Left,
        Uplo::Lower,
        Transpose::NoTrans,
        Diag::Unit,
        TRSM_NB * 2,
        2,
        -3.0,
    );
    let p = Problem::random(&serial, op, 8, 23);
    let a_par = Batch::from_instances(&parallel, op.k(), op.k(), op.k(), &p.a_host).unwrap();

    let one = solve(&serial, &op, &p.a, &p.b_host);
    let many = solve(&parallel, &op, &a_par, &p.b_host);
    assert_eq!(one, many);
    let solved = Batch::from_instances(&serial, op.m, op.n, op.m, &one).unwrap();
    p.assert_solved(&solved, 100.0, "serial");
}

#[test]
fn test_single_instance_batch() {
    let (client, _) = create_cpu_client();
    let op = TrsmOp::new(Side::Right, Uplo::Upper, Transpose::Trans, Diag::NonUnit, 6, 9, 0.5);
    let p = Problem::random(&client, op, 1, 24);
    let mut b = p.b.try_clone(&client).unwrap();
    trsm(&client, &op, &p.a, &mut b).unwrap();
    p.assert_solved(&b, 100.0, "batch of one");
}
