//! Integration tests for the process runner
//!
//! These spawn real `/bin/sh` children to verify limit inheritance and the
//! classification of signal-terminated processes.

use toolchain_harness::exec::{execute, Termination};

fn shell(command: &str, timeout: u64) -> Termination {
    execute(command, None, timeout, true, true).expect("execute failed")
}

#[test]
fn test_exit_code_is_returned() {
    match shell("echo out; echo err >&2; exit 3", 5) {
        Termination::Exited(output) => {
            assert_eq!(output.stdout, b"out\n");
            assert_eq!(output.stderr, b"err\n");
            assert_eq!(output.returncode, 3);
        }
        other => panic!("unexpected termination: {:?}", other),
    }
}

#[test]
fn test_signal_becomes_sigkill_condition() {
    match shell("echo partial; kill -SEGV $$", 5) {
        Termination::Signaled(sigkill) => {
            assert_eq!(sigkill.retcode, -11);
            assert_eq!(sigkill.name, "SIGSEGV");
            assert_eq!(sigkill.stdout, b"partial\n");
        }
        other => panic!("unexpected termination: {:?}", other),
    }
}

#[test]
fn test_shell_reported_signal_is_folded() {
    // Either the inner shell is exec'd and dies directly, or the outer shell
    // reports 128 + 9; both come back as SIGKILL.
    match shell("sh -c 'kill -KILL $$'", 5) {
        Termination::Signaled(sigkill) => {
            assert_eq!(sigkill.retcode, -9);
            assert_eq!(sigkill.name, "SIGKILL");
        }
        other => panic!("unexpected termination: {:?}", other),
    }
}

#[test]
fn test_core_dumps_disabled_in_child() {
    match shell("ulimit -c", 5) {
        Termination::Exited(output) => assert_eq!(output.stdout, b"0\n"),
        other => panic!("unexpected termination: {:?}", other),
    }
}

#[test]
fn test_cpu_limit_terminates_runaway_child() {
    match shell("while :; do :; done", 1) {
        Termination::Signaled(sigkill) => {
            assert!(
                sigkill.name == "SIGXCPU" || sigkill.name == "SIGKILL",
                "unexpected signal {}",
                sigkill.name
            );
        }
        other => panic!("unexpected termination: {:?}", other),
    }
}

#[test]
fn test_replaced_environment() {
    let vars = vec![("HARNESS_MARKER".to_string(), "42".to_string())];
    match execute("/usr/bin/env", Some(&vars), 5, false, true).unwrap() {
        Termination::Exited(output) => {
            assert_eq!(String::from_utf8_lossy(&output.stdout), "HARNESS_MARKER=42\n");
        }
        other => panic!("unexpected termination: {:?}", other),
    }
}
