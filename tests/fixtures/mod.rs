//! Shared test fixtures for CLI tests.
#![allow(dead_code)] // Not every test file uses every fixture

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Key definitions used by every test environment.
pub const TEST_HEADER: &str = "\
#ifndef _INPUT_EVENT_CODES_H
#define _INPUT_EVENT_CODES_H

#define KEY_RESERVED\t\t0
#define KEY_Y\t\t\t21
#define KEY_I\t\t\t23
#define KEY_A\t\t\t30
#define KEY_H\t\t\t35
#define KEY_LEFTSHIFT\t\t42
#define KEY_X\t\t\t45
#define KEY_C\t\t\t46
#define KEY_B\t\t\t48

#define KEY_MAX\t\t\t0x2ff
#define KEY_CNT\t\t\t(KEY_MAX+1)

#endif
";

/// Path to the keymac binary
pub fn keymac_bin() -> &'static str {
    env!("CARGO_BIN_EXE_keymac")
}

/// An isolated set of files standing in for the kernel module and config.
pub struct TestEnv {
    pub dir: TempDir,
    pub kernel_file: PathBuf,
    pub store_file: PathBuf,
    pub key_catalog: PathBuf,
    pub config_dir: PathBuf,
}

impl TestEnv {
    /// Creates an environment whose kernel file holds `kernel_content`.
    pub fn new(kernel_content: &str) -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let kernel_file = dir.path().join("keymac_proc");
        let store_file = dir.path().join("macros.txt");
        let key_catalog = dir.path().join("input-event-codes.h");
        let config_dir = dir.path().join("config");

        fs::write(&kernel_file, kernel_content).expect("Failed to write kernel file");
        fs::write(&key_catalog, TEST_HEADER).expect("Failed to write key catalog");

        Self {
            dir,
            kernel_file,
            store_file,
            key_catalog,
            config_dir,
        }
    }

    /// Creates an environment with no kernel file (module not loaded).
    pub fn without_kernel() -> Self {
        let env = Self::new("");
        fs::remove_file(&env.kernel_file).expect("Failed to remove kernel file");
        env
    }

    /// Builds a command with every path pointed into the temp dir.
    pub fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(keymac_bin());
        cmd.env("KEYMAC_CONFIG_DIR", &self.config_dir)
            .env_remove("RUST_LOG")
            .args(args)
            .arg("--kernel-file")
            .arg(&self.kernel_file)
            .arg("--store-file")
            .arg(&self.store_file)
            .arg("--key-catalog")
            .arg(&self.key_catalog);
        cmd
    }

    /// Runs a command and returns its output.
    pub fn run(&self, args: &[&str]) -> Output {
        self.command(args)
            .output()
            .expect("Failed to execute command")
    }

    /// Current content of the kernel file.
    pub fn kernel_content(&self) -> String {
        read(&self.kernel_file)
    }

    /// Current content of the store file.
    pub fn store_content(&self) -> String {
        read(&self.store_file)
    }
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).expect("Failed to read file")
}

/// Stdout as a string.
pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Stderr as a string.
pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}
