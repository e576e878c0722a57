//! File service and local storage driven by a guest.

mod common;

use canopy_sandbox::{BridgeConfig, GuestInstance};

use common::*;

const PAYLOAD: [u32; 2] = [0x0403_0201, 0x0807_0605];

/// Guest whose `main` is `main_body`. Data: path "saves/slot.bin" at word
/// 200, key "best" at 220, path "../escape.bin" at 230, path "missing.bin"
/// at 250, a path holding a lone surrogate at 270 and `PAYLOAD` at 300. Results go to word 0 (and 1) with output
/// buffers at 16 and 40.
fn storage_guest(main_body: &str) -> String {
    guest(
        r#"
        (import "env" "write_file" (func $write (param i32 i32 i32)))
        (import "env" "read_file" (func $read (param i32 i32 i32) (result i32)))
        (import "env" "set_local_storage_item" (func $set (param i32 i32 i32)))
        (import "env" "get_local_storage_item" (func $get (param i32 i32 i32) (result i32)))
        (import "env" "remove_local_storage_item" (func $remove (param i32)))
        (import "env" "clear_local_storage" (func $clear))
        "#,
        &format!(
            r#"
            {}
            {}
            {}
            {}
            {}
            {}
            (func (export "initialize"))
            (func (export "main") {main_body})
            "#,
            string_at(200, "saves/slot.bin"),
            string_at(220, "best"),
            string_at(230, "../escape.bin"),
            string_at(250, "missing.bin"),
            words_at(270, &[1, 0, 0xD800]),
            words_at(300, &PAYLOAD),
        ),
    )
}

fn launch_in(dir: &tempfile::TempDir, main_body: &str) -> (GuestInstance, Handles) {
    let config = BridgeConfig {
        file_root: dir.path().to_path_buf(),
        ..BridgeConfig::default()
    };
    launch_with(&storage_guest(main_body), config)
}

#[test]
fn test_write_then_read_file() {
    let dir = tempfile::tempdir().unwrap();
    let (mut guest, _) = launch_in(
        &dir,
        r#"
        (call $write (i32.const 200) (i32.const 300) (i32.const 2))
        (i32.store (i32.const 0) (call $read (i32.const 200) (i32.const 16) (i32.const 32)))
        "#,
    );
    guest.run_main().unwrap();

    let on_disk = std::fs::read(dir.path().join("saves/slot.bin")).unwrap();
    assert_eq!(on_disk, vec![1, 2, 3, 4, 5, 6, 7, 8]);
    assert_eq!(guest.read_words(0, 1).unwrap(), vec![3]);
    assert_eq!(guest.read_words(16, 3).unwrap(), vec![2, PAYLOAD[0], PAYLOAD[1]]);
}

#[test]
fn test_missing_file_reads_empty() {
    let dir = tempfile::tempdir().unwrap();
    let (mut guest, _) = launch_in(
        &dir,
        r#"(i32.store (i32.const 0) (call $read (i32.const 250) (i32.const 16) (i32.const 32)))"#,
    );
    guest.run_main().unwrap();
    assert_eq!(guest.read_words(0, 1).unwrap(), vec![1]);
    assert_eq!(guest.read_words(16, 1).unwrap(), vec![0]);
}

#[test]
fn test_malformed_path_reads_empty() {
    let dir = tempfile::tempdir().unwrap();
    let (mut guest, _) = launch_in(
        &dir,
        &format!(
            r#"
            (i32.store (i32.const {buffer}) (i32.const 99))
            (call $write (i32.const 270) (i32.const 300) (i32.const 2))
            (i32.store (i32.const 0) (call $read (i32.const 270) (i32.const 16) (i32.const 32)))
            "#,
            buffer = byte(16),
        ),
    );
    guest.run_main().unwrap();
    assert_eq!(guest.read_words(0, 1).unwrap(), vec![1]);
    assert_eq!(guest.read_words(16, 1).unwrap(), vec![0]);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_escaping_path_refused() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("root");
    std::fs::create_dir(&root).unwrap();
    let config = BridgeConfig {
        file_root: root,
        ..BridgeConfig::default()
    };
    let (mut guest, _) = launch_with(
        &storage_guest(
            r#"
            (call $write (i32.const 230) (i32.const 300) (i32.const 2))
            (i32.store (i32.const 0) (call $read (i32.const 230) (i32.const 16) (i32.const 32)))
            "#,
        ),
        config,
    );
    guest.run_main().unwrap();
    assert!(!dir.path().join("escape.bin").exists());
    assert_eq!(guest.read_words(0, 1).unwrap(), vec![1]);
}

#[test]
fn test_file_too_large_for_buffer_traps() {
    let dir = tempfile::tempdir().unwrap();
    let (mut guest, _) = launch_in(
        &dir,
        r#"
        (call $write (i32.const 200) (i32.const 300) (i32.const 2))
        (drop (call $read (i32.const 200) (i32.const 16) (i32.const 2)))
        "#,
    );
    assert!(matches!(
        guest.run_main(),
        Err(canopy_sandbox::SandboxError::WireFault(_))
    ));
}

#[test]
fn test_local_storage_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let (mut guest, handles) = launch_in(
        &dir,
        r#"
        (call $set (i32.const 220) (i32.const 300) (i32.const 2))
        (i32.store (i32.const 4) (call $get (i32.const 220) (i32.const 40) (i32.const 8)))
        "#,
    );
    guest.run_main().unwrap();

    assert_eq!(guest.read_words(1, 1).unwrap(), vec![2]);
    assert_eq!(guest.read_words(40, 2).unwrap(), PAYLOAD.to_vec());
    let stored = handles.store.snapshot();
    assert!(stored.contains_key("best"));
    assert!(stored["best"].chars().all(|c| c.is_ascii_graphic()));
}

#[test]
fn test_local_storage_remove_and_clear() {
    let dir = tempfile::tempdir().unwrap();
    let (mut guest, handles) = launch_in(
        &dir,
        r#"
        (call $set (i32.const 220) (i32.const 300) (i32.const 2))
        (call $set (i32.const 200) (i32.const 300) (i32.const 1))
        (call $remove (i32.const 220))
        (i32.store (i32.const 4) (call $get (i32.const 220) (i32.const 40) (i32.const 8)))
        "#,
    );
    guest.run_main().unwrap();
    assert_eq!(guest.read_words(1, 1).unwrap(), vec![0]);
    assert_eq!(handles.store.len(), 1);

    let (mut guest, handles) = launch_in(
        &dir,
        r#"
        (call $set (i32.const 220) (i32.const 300) (i32.const 2))
        (call $clear)
        "#,
    );
    guest.run_main().unwrap();
    assert!(handles.store.is_empty());
}
