//! Failed runs and rejected input.

mod common;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use dvfs_simulator::*;

/// Two tasks waiting on each other can never become ready. The run must
/// stop right away instead of spinning until the horizon.
#[test]
fn test_dependency_cycle_is_deadlock() {
    common::setup_test();
    let scenario = Scenario::builder()
        .task(TaskDef::new(TaskId(1), 0.0, 5.0, 1.0).unwrap().after(&[TaskId(2)]))
        .task(TaskDef::new(TaskId(2), 0.0, 5.0, 1.0).unwrap().after(&[TaskId(1)]))
        .build()
        .unwrap();

    let result = Simulator::new().run(&scenario);
    result.dump();

    assert!(!result.success());
    assert_eq!(result.exit_kind(), &ExitKind::Deadlock);
    assert_eq!(result.end_time(), 0.0);
    assert!(result.schedule().is_empty());
    let ids: Vec<TaskId> = result.residuals().iter().map(|r| r.task_id).collect();
    assert_eq!(ids, vec![TaskId(1), TaskId(2)]);
}

/// Independent work still runs; the deadlock is reported once nothing
/// else can happen.
#[test]
fn test_deadlock_after_other_work() {
    common::setup_test();
    let scenario = Scenario::builder()
        .add_task(0.0, 2.0, 2.0)
        .task(TaskDef::new(TaskId(2), 0.0, 9.0, 1.0).unwrap().after(&[TaskId(3)]))
        .task(TaskDef::new(TaskId(3), 3.0, 9.0, 1.0).unwrap().after(&[TaskId(2)]))
        .build()
        .unwrap();

    let result = Simulator::new().run(&scenario);

    assert_eq!(result.exit_kind(), &ExitKind::Deadlock);
    assert_eq!(common::run_order(&result), vec![1, 1]);
    // Idles to the last release before giving up.
    assert_eq!(result.end_time(), 3.0);
    assert_eq!(result.residuals().len(), 2);
}

#[test]
fn test_release_after_horizon_is_horizon_exceeded() {
    common::setup_test();
    let scenario = Scenario::builder()
        .add_task(20.0, 30.0, 1.0)
        .horizon(10.0)
        .build()
        .unwrap();

    let result = Simulator::new().run(&scenario);

    assert_eq!(result.exit_kind(), &ExitKind::HorizonExceeded);
    assert!(result.schedule().is_empty());
    assert_eq!(result.residuals()[0].remaining, 1.0);
}

/// Whenever the flag is raised, the cancelled schedule is a prefix of the
/// uncancelled one.
#[test]
fn test_cancelled_run_is_prefix_of_full_run() {
    common::setup_test();
    let scenario = Scenario::builder()
        .add_task(0.0, 400.0, 300.0)
        .add_task(0.0, 500.0, 200.0)
        .dt(0.01)
        .build()
        .unwrap();
    let full = Simulator::new().run(&scenario);
    assert!(full.success());

    let flag = Arc::new(AtomicBool::new(false));
    let raiser = {
        let flag = flag.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(5));
            flag.store(true, Ordering::Relaxed);
        })
    };
    let partial = Simulator::new().with_cancel(flag).run(&scenario);
    raiser.join().unwrap();

    let n = partial.schedule().len();
    assert_eq!(partial.schedule(), &full.schedule()[..n]);
    if partial.exit_kind() == &ExitKind::Cancelled {
        assert!(!partial.success());
        assert!(!partial.residuals().is_empty());
    }
}

#[test]
fn test_invalid_definitions_are_rejected() {
    common::setup_test();
    let params = ProcessorParams::default();
    let one = |r, d, w| {
        vec![TaskDef {
            id: TaskId(1),
            release: r,
            deadline: d,
            workload: w,
            dependencies: Vec::new(),
        }]
    };

    let cases = [
        (one(0.0, 4.0, 0.0), "workload"),
        (one(0.0, 4.0, -2.0), "workload"),
        (one(4.0, 4.0, 1.0), "deadline"),
        (one(-1.0, 4.0, 1.0), "release"),
        (one(0.0, f64::INFINITY, 1.0), "finite"),
    ];
    for (tasks, what) in cases {
        let err = run_simulation(&tasks, &params).unwrap_err();
        assert!(matches!(err, SimError::Task(_)), "{err}");
        assert!(err.to_string().contains(what), "{err}");
    }
}

#[test]
fn test_invalid_task_sets_are_rejected() {
    common::setup_test();
    let a = TaskDef::new(TaskId(1), 0.0, 4.0, 1.0).unwrap();
    let b = TaskDef::new(TaskId(1), 1.0, 5.0, 1.0).unwrap();
    let err = Scenario::new(vec![a.clone(), b], ProcessorParams::default()).unwrap_err();
    assert_eq!(err, SimError::Task(TaskError::DuplicateId(TaskId(1))));

    let c = TaskDef::new(TaskId(2), 0.0, 4.0, 1.0).unwrap().after(&[TaskId(9)]);
    let err = Scenario::new(vec![a, c], ProcessorParams::default()).unwrap_err();
    assert_eq!(
        err,
        SimError::Task(TaskError::UnknownDependency {
            id: TaskId(2),
            dep: TaskId(9)
        })
    );
}

#[test]
fn test_invalid_params_are_rejected() {
    common::setup_test();
    let tasks = vec![TaskDef::new(TaskId(1), 0.0, 4.0, 1.0).unwrap()];
    let params = ProcessorParams {
        f_min: 3.0,
        f_max: 2.0,
        ..ProcessorParams::default()
    };
    let err = run_simulation(&tasks, &params).unwrap_err();
    assert!(matches!(err, SimError::Params(ParamError { name: "f_max", .. })));
}

/// A rejected scenario never mutates the caller's definitions, and a
/// successful run does not either.
#[test]
fn test_definitions_survive_runs() {
    common::setup_test();
    let tasks = parse_tasks("0,4,8\n1,3,2\n").unwrap();
    let before = tasks.clone();
    run_simulation(&tasks, &ProcessorParams::default()).unwrap();
    run_simulation(&tasks, &ProcessorParams::default()).unwrap();
    assert_eq!(tasks, before);
}
