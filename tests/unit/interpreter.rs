use super::*;
use crate::render::recording::{RecordingSurface, SurfaceOp};

fn stream() -> Vec<RecordStore> {
    vec![
        RecordStore::from_params(opcode::SAVE_DC, vec![]),
        RecordStore::from_params(opcode::RESTORE_DC, vec![5]),
        RecordStore::from_params(0x9999, vec![1, 2]),
        RecordStore::from_params(opcode::RECTANGLE, vec![10, 10, 0, 0]),
        RecordStore::from_params(opcode::EOF, vec![]),
        RecordStore::from_params(opcode::RECTANGLE, vec![20, 20, 0, 0]),
    ]
}

#[test]
fn failures_are_collected_and_replay_continues() {
    let mut surface = RecordingSurface::new();
    let report = Interpreter::new(ReplaySettings::default())
        .run(&stream(), &mut surface)
        .unwrap();

    assert_eq!(report.records, 5, "EOF is visited, nothing after it");
    assert_eq!(report.replayed, 3);
    assert_eq!(report.unknown, 1);
    assert!(!report.is_clean());
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].index, 1);
    assert_eq!(report.failures[0].opcode, opcode::RESTORE_DC);
    assert!(matches!(
        report.failures[0].error,
        WmfError::DcStackUnderflow { requested: 5, depth: 1 }
    ));
    assert_eq!(surface.ops().len(), 2);
}

#[test]
fn stop_policy_returns_the_first_failure() {
    let settings = ReplaySettings {
        on_error: ErrorPolicy::Stop,
        ..ReplaySettings::default()
    };
    let mut surface = RecordingSurface::new();
    let err = Interpreter::new(settings)
        .run(&stream(), &mut surface)
        .unwrap_err();
    assert!(matches!(err, WmfError::DcStackUnderflow { .. }));
    assert!(surface.ops().is_empty());
}

#[test]
fn record_limit_cuts_the_stream() {
    let settings = ReplaySettings {
        max_records: Some(1),
        ..ReplaySettings::default()
    };
    let mut surface = RecordingSurface::new();
    let report = Interpreter::new(settings)
        .run(&stream(), &mut surface)
        .unwrap();
    assert_eq!(report.records, 1);
    assert!(report.is_clean());
}

#[test]
fn interpreter_scale_reaches_every_command() {
    let records = vec![RecordStore::from_params(opcode::RECTANGLE, vec![10, 10, 0, 0])];
    let mut surface = RecordingSurface::new();
    Interpreter::new(ReplaySettings::default())
        .with_scale(2.0, 3.0)
        .run(&records, &mut surface)
        .unwrap();
    let SurfaceOp::Fill { path, .. } = &surface.ops()[0] else {
        panic!("expected a fill");
    };
    assert_eq!(
        kurbo::Shape::bounding_box(path),
        kurbo::Rect::new(0.0, 0.0, 20.0, 30.0)
    );
}

#[test]
fn caller_context_survives_the_run() {
    let records = vec![
        RecordStore::from_params(opcode::SAVE_DC, vec![]),
        RecordStore::from_params(opcode::SET_BK_MODE, vec![1]),
    ];
    let mut ctx = ReplayContext::new();
    let mut surface = RecordingSurface::new();
    Interpreter::new(ReplaySettings::default())
        .run_with(&mut ctx, &records, &mut surface)
        .unwrap();
    assert_eq!(ctx.depth(), 1);
    assert_eq!(ctx.dc().bk_mode, 1);
}
