use std::path::Path;
use std::process::{Command, Output};
use std::str;

/// CLI interface tests
#[cfg(test)]
mod cli_tests {
    use super::*;

    fn cdcbridge(args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_cdcbridge"))
            .args(args)
            .output()
            .expect("Failed to execute command")
    }

    fn config_file(dir: &Path) -> String {
        let path = dir.join("config.toml");
        std::fs::write(&path, "[device]\nvendor_id = \"1A86\"\n").unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn test_cli_help() {
        let output = cdcbridge(&["--help"]);
        let stdout = str::from_utf8(&output.stdout).expect("Invalid UTF-8");

        assert!(output.status.success());
        assert!(stdout.contains("Reads JSON telemetry from a USB serial device"));
        assert!(stdout.contains("Usage:"));
        assert!(stdout.contains("Commands:"));
        for command in ["run", "list", "decode", "config", "version"] {
            assert!(stdout.contains(command), "help is missing {}", command);
        }
    }

    #[test]
    fn test_cli_short_help_uses_about() {
        let output = cdcbridge(&["-h"]);
        let stdout = str::from_utf8(&output.stdout).expect("Invalid UTF-8");

        assert!(output.status.success());
        assert!(stdout.contains("USB CDC telemetry bridge"));
    }

    #[test]
    fn test_cli_version() {
        let output = cdcbridge(&["-q", "version"]);
        let stdout = str::from_utf8(&output.stdout).expect("Invalid UTF-8");

        assert!(output.status.success());
        assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn test_cli_run_help() {
        let output = cdcbridge(&["run", "--help"]);
        let stdout = str::from_utf8(&output.stdout).expect("Invalid UTF-8");

        assert!(stdout.contains("--vid"));
        assert!(stdout.contains("--registry-file"));
        assert!(stdout.contains("--dry-run"));
    }

    #[test]
    fn test_cli_decode_capture() {
        let temp_dir = tempfile::tempdir().unwrap();
        let capture = temp_dir.path().join("capture.bin");
        std::fs::write(
            &capture,
            "--- WaKu-ctl Ready ---\r\n{\"client_id\":\"AABB\",\"event\":\"usb_stream\",\"units\":\"\",\"data\":{\"temperature1\":20.6,\"FAN_0\":1500}}\r\n",
        )
        .unwrap();
        let config = config_file(temp_dir.path());

        let output = cdcbridge(&["-q", "--config", &config, "decode", &capture.to_string_lossy()]);
        let stdout = str::from_utf8(&output.stdout).expect("Invalid UTF-8");

        assert!(output.status.success());
        assert!(stdout.contains("[AABB] usb_stream Temp0=21°C"));
        assert!(stdout.contains("Fan0=1500RPM"));
    }

    #[test]
    fn test_cli_decode_missing_file_fails() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = config_file(temp_dir.path());
        let missing = temp_dir.path().join("missing.bin");

        let output = cdcbridge(&["-q", "--config", &config, "decode", &missing.to_string_lossy()]);
        assert!(!output.status.success());
    }

    #[test]
    fn test_cli_decode_rejects_capture_without_valid_frames() {
        let temp_dir = tempfile::tempdir().unwrap();
        let capture = temp_dir.path().join("garbage.bin");
        std::fs::write(&capture, "boot\r\n{bad}\r\n{\"data\":{\"FAN_0\":-1}}\r\n").unwrap();
        let config = config_file(temp_dir.path());

        let output = cdcbridge(&["-q", "--config", &config, "decode", &capture.to_string_lossy()]);
        let stderr = str::from_utf8(&output.stderr).expect("Invalid UTF-8");

        assert!(!output.status.success());
        assert!(stderr.contains("malformed telemetry frame"));
    }

    #[test]
    fn test_cli_config_show_json() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = config_file(temp_dir.path());

        let output = cdcbridge(&["-q", "--config", &config, "--output", "json", "config", "show"]);
        let stdout = str::from_utf8(&output.stdout).expect("Invalid UTF-8");

        assert!(output.status.success());
        let shown: serde_json::Value = serde_json::from_str(stdout).unwrap();
        assert_eq!(shown["device"]["vendor_id"], "1A86");
        assert_eq!(shown["device"]["product_id"], "82E5");
    }

    #[test]
    fn test_cli_config_init() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = config_file(temp_dir.path());
        let project = temp_dir.path().join("project");
        std::fs::create_dir(&project).unwrap();

        let output = cdcbridge(&[
            "-q",
            "--config",
            &config,
            "config",
            "init",
            &project.to_string_lossy(),
        ]);

        assert!(output.status.success());
        assert!(project.join(".cdcbridge").join("config.toml").exists());
    }

    #[test]
    fn test_cli_invalid_command() {
        let output = cdcbridge(&["invalid-command"]);
        assert!(!output.status.success());
    }

    #[test]
    fn test_cli_verbose_and_quiet_flags() {
        for flag in ["-v", "-q"] {
            let output = cdcbridge(&[flag, "--help"]);
            let stderr = str::from_utf8(&output.stderr).expect("Invalid UTF-8");
            assert!(!stderr.contains("unexpected argument"));
        }
    }
}
