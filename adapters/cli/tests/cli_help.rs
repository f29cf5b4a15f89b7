use std::process::Command;

#[test]
fn help_lists_session_flags() {
    let output = Command::new(env!("CARGO_BIN_EXE_last-protocol"))
        .arg("--help")
        .output()
        .expect("failed to run last-protocol --help");

    assert!(output.status.success());
    let help = String::from_utf8_lossy(&output.stdout);
    for flag in ["--config", "--seed", "--name"] {
        assert!(help.contains(flag), "help should mention {flag}");
    }
}
