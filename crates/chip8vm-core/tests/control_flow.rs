use chip8vm_core::{Engine, EngineConfig, EngineError, PROGRAM_ORIGIN, STACK_DEPTH};

fn engine_with(program: &[u8]) -> Engine {
    let mut engine = Engine::new(EngineConfig::default().with_rng_seed(1)).unwrap();
    engine.load_program(program).unwrap();
    engine
}

#[test]
fn skip_equal_jumps_over_junk_instruction() {
    let mut engine = engine_with(&[
        0x60, 0x09, // V0 = 0x09
        0x30, 0x09, // skip next if V0 == 0x09
        0x60, 0xEE, // junk: V0 = 0xEE
        0x60, 0x42, // V0 = 0x42
    ]);
    engine.step().unwrap();
    engine.step().unwrap();
    assert_eq!(engine.program_counter(), PROGRAM_ORIGIN + 6);

    engine.step().unwrap();
    assert_eq!(engine.data_register(0).unwrap(), 0x42);
    assert_eq!(engine.program_counter(), PROGRAM_ORIGIN + 8);
}

#[test]
fn skip_equal_miss_advances_by_two() {
    let mut engine = engine_with(&[
        0x60, 0x08, // V0 = 0x08
        0x30, 0x09, // skip next if V0 == 0x09
    ]);
    engine.step().unwrap();
    engine.step().unwrap();
    assert_eq!(engine.program_counter(), PROGRAM_ORIGIN + 4);
}

#[test]
fn skip_not_equal_immediate() {
    let mut engine = engine_with(&[
        0x61, 0x01, // V1 = 1
        0x41, 0x02, // skip next if V1 != 2
    ]);
    engine.step().unwrap();
    engine.step().unwrap();
    assert_eq!(engine.program_counter(), PROGRAM_ORIGIN + 6);
}

#[test]
fn skip_equal_registers() {
    let mut engine = engine_with(&[
        0x61, 0x05, // V1 = 5
        0x62, 0x05, // V2 = 5
        0x51, 0x20, // skip next if V1 == V2
    ]);
    for _ in 0..3 {
        engine.step().unwrap();
    }
    assert_eq!(engine.program_counter(), PROGRAM_ORIGIN + 8);
}

#[test]
fn jump_sets_counter_to_low_twelve_bits() {
    let mut engine = engine_with(&[0x1A, 0xBC]);
    engine.step().unwrap();
    assert_eq!(engine.program_counter(), 0xABC);
}

#[test]
fn jump_with_offset_adds_v0() {
    let mut engine = engine_with(&[
        0x60, 0x10, // V0 = 0x10
        0xB3, 0x00, // jump to 0x300 + V0
    ]);
    engine.step().unwrap();
    engine.step().unwrap();
    assert_eq!(engine.program_counter(), 0x310);
}

#[test]
fn call_pushes_pre_call_counter() {
    let mut engine = engine_with(&[0x23, 0x00]);
    engine.step().unwrap();
    assert_eq!(engine.stack()[0], PROGRAM_ORIGIN);
    assert_eq!(engine.stack_pointer(), 1);
    assert_eq!(engine.program_counter(), 0x300);
}

#[test]
fn subroutine_returns_past_the_call() {
    let mut engine = engine_with(&[
        0x23, 0x00, // call 0x300
        0x61, 0x02, // V1 = 2
    ]);
    engine.load_program_at(&[0x60, 0x01, 0x00, 0xEE], 0x300).unwrap();

    for _ in 0..4 {
        engine.step().unwrap();
    }
    assert_eq!(engine.data_register(0).unwrap(), 1);
    assert_eq!(engine.data_register(1).unwrap(), 2);
    assert_eq!(engine.stack_pointer(), 0);
    assert_eq!(engine.program_counter(), PROGRAM_ORIGIN + 4);
}

#[test]
fn recursive_call_overflows_the_stack() {
    // 0x200: call 0x200
    let mut engine = engine_with(&[0x22, 0x00]);
    for _ in 0..STACK_DEPTH {
        engine.step().unwrap();
    }
    let err = engine.step().unwrap_err();
    assert_eq!(
        err,
        EngineError::StackOverflow {
            pc: PROGRAM_ORIGIN,
            depth: STACK_DEPTH
        }
    );
    assert_eq!(engine.stack_pointer(), STACK_DEPTH);
    // The faulting call did not move the counter.
    assert_eq!(engine.program_counter(), PROGRAM_ORIGIN);
}

#[test]
fn return_without_call_underflows() {
    let mut engine = engine_with(&[0x00, 0xEE]);
    let err = engine.step().unwrap_err();
    assert_eq!(err, EngineError::StackUnderflow { pc: PROGRAM_ORIGIN });
}

#[test]
fn unsupported_families_are_no_ops() {
    let mut engine = engine_with(&[
        0xE0, 0x9E, // skip if key V0 pressed
        0xF0, 0x07, // V0 = delay timer
        0xF1, 0x29, // I = font sprite for V1
        0xF2, 0x33, // BCD of V2
        0xF3, 0x55, // store V0..V3
        0xF4, 0x1E, // I += V4
    ]);
    let before = engine.state().clone();
    for _ in 0..6 {
        engine.step().unwrap();
    }
    assert_eq!(engine.program_counter(), PROGRAM_ORIGIN + 12);
    assert_eq!(engine.data_registers(), before.data_registers());
    assert_eq!(engine.address_register(), before.address_register());
    assert_eq!(engine.memory(), before.memory());
}
