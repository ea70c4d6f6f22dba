//! The logger writing into arena scratch instead of a caller buffer.

use sluice_arena::Arena;
use sluice_log::{LogCursor, Logger};

#[test]
fn logger_writes_into_arena_span() {
    let mut arena = Arena::new(256);
    let dst = arena.alloc_bytes(64, 1).unwrap();
    let mut cursor = LogCursor::default();
    Logger::new(dst, &mut cursor)
        .int("ts", -5)
        .str("type", "order")
        .msg("processed");
    assert!(!cursor.is_truncated());
    assert_eq!(cursor.len(), "ts=-5 type=order msg=processed\n".len());
    assert_eq!(arena.used(), 64);
}

#[test]
fn arena_span_bounds_the_record() {
    let mut arena = Arena::new(256);
    let dst = arena.alloc_bytes(12, 1).unwrap();
    let mut cursor = LogCursor::default();
    let mut logger = Logger::new(dst, &mut cursor);
    logger.str("type", "order").uint("uid", 12345);
    assert_eq!(logger.bytes(), b"type=order ");
    assert!(logger.is_truncated());
}

#[test]
fn scratch_log_is_gone_after_reset() {
    let mut arena = Arena::new(64);
    {
        let dst = arena.alloc_bytes(32, 1).unwrap();
        let mut cursor = LogCursor::default();
        Logger::new(dst, &mut cursor).msg("first");
    }
    arena.reset();
    let dst = arena.alloc_bytes(32, 1).unwrap();
    assert!(dst.iter().all(|&b| b == 0));
}
