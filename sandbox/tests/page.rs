//! Page utilities: prompts, location, key names, console timers and traces.

mod common;

use canopy_sandbox::BridgeConfig;

use common::*;

const PAGE_IMPORTS: &str = r#"
    (import "env" "prompt" (func $prompt (param i32 i32)))
    (import "env" "get_href" (func $href (param i32)))
    (import "env" "get_hostname" (func $hostname (param i32)))
    (import "env" "get_protocol" (func $protocol (param i32)))
    (import "env" "get_key_value" (func $key (param i32 i32)))
    (import "env" "trace" (func $trace (param i32)))
    (import "env" "time_start" (func $time_start (param i32)))
    (import "env" "time_end" (func $time_end (param i32)))
"#;

/// Guest whose `main` is `main_body`. Data: "Your name?" at word 200,
/// "load" at 220 and "here" at 230. Outputs go to words 16, 60 and 100.
fn page_guest(main_body: &str) -> String {
    guest(
        PAGE_IMPORTS,
        &format!(
            r#"
            {}
            {}
            {}
            (func (export "initialize"))
            (func (export "main") {main_body})
            "#,
            string_at(200, "Your name?"),
            string_at(220, "load"),
            string_at(230, "here"),
        ),
    )
}

#[test]
fn test_prompt_answer_and_dismissal() {
    let (mut guest, handles) = launch(&page_guest(
        r#"
        (call $prompt (i32.const 200) (i32.const 16))
        (call $prompt (i32.const 200) (i32.const 60))
        "#,
    ));
    handles.prompter.answer("Ada");
    handles.prompter.dismiss();
    guest.run_main().unwrap();

    assert_eq!(guest.read_words(16, 5).unwrap(), string_words("Ada"));
    assert_eq!(guest.read_words(60, 1).unwrap(), vec![0]);
    assert_eq!(handles.prompter.asked(), vec!["Your name?", "Your name?"]);
}

#[test]
fn test_location_parts() {
    let config = BridgeConfig {
        location: "https://play.example.com/lobby".to_string(),
        ..BridgeConfig::default()
    };
    let (mut guest, _) = launch_with(
        &page_guest(
            r#"
            (call $href (i32.const 16))
            (call $hostname (i32.const 60))
            (call $protocol (i32.const 100))
            "#,
        ),
        config,
    );
    guest.run_main().unwrap();

    let href = "https://play.example.com/lobby";
    assert_eq!(
        guest.read_words(16, href.len() + 2).unwrap(),
        string_words(href)
    );
    assert_eq!(guest.read_words(60, 18).unwrap(), string_words("play.example.com"));
    assert_eq!(guest.read_words(100, 8).unwrap(), string_words("https:"));
}

#[test]
fn test_key_values() {
    // 28 is KeyQ, 54 is ShiftLeft.
    let (mut guest, _) = launch(&page_guest(
        r#"
        (call $key (i32.const 28) (i32.const 16))
        (call $key (i32.const 54) (i32.const 60))
        (call $key (i32.const 999) (i32.const 100))
        "#,
    ));
    guest.run_main().unwrap();

    assert_eq!(guest.read_words(16, 3).unwrap(), string_words("Q"));
    assert_eq!(guest.read_words(60, 11).unwrap(), string_words("SHIFTLEFT"));
    assert_eq!(guest.read_words(100, 1).unwrap(), vec![0]);
}

#[test]
fn test_timers_and_trace() {
    let (mut guest, _) = launch(&page_guest(
        r#"
        (call $time_start (i32.const 220))
        (call $trace (i32.const 230))
        (call $time_end (i32.const 220))
        (call $time_end (i32.const 220))
        "#,
    ));
    guest.run_main().unwrap();

    let logs: Vec<&str> = guest.host().guest_logs().collect();
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0], "here");
    assert!(logs[1].starts_with("load: ") && logs[1].ends_with("ms"), "{}", logs[1]);
    assert_eq!(guest.host().console.running(), 0);
}

#[test]
fn test_reply_outside_memory_is_wire_fault() {
    let (mut guest, handles) = launch(&page_guest(
        r#"(call $prompt (i32.const 200) (i32.const 16383))"#,
    ));
    handles.prompter.answer("too long to fit");
    assert!(matches!(
        guest.run_main(),
        Err(canopy_sandbox::SandboxError::WireFault(_))
    ));
}
