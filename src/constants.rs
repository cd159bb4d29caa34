//! Application-wide constants.
//!
//! Names and default locations shared by the CLI, configuration and sync
//! channel.

/// The display name of the application.
pub const APP_NAME: &str = "KeyMac";

/// The binary name of the application (used in command examples).
pub const APP_BINARY_NAME: &str = "keymac";

/// Directory name under the platform config directory.
pub const CONFIG_DIR_NAME: &str = "keymac";

/// Environment variable that overrides the config directory.
pub const CONFIG_DIR_ENV: &str = "KEYMAC_CONFIG_DIR";

/// Control file created by the KeyMac kernel module.
pub const DEFAULT_KERNEL_FILE: &str = "/proc/keymac_proc";

/// Linux header listing key codes and names.
pub const DEFAULT_KEY_CATALOG: &str = "/usr/include/linux/input-event-codes.h";

/// File name of the durable macro store inside the config directory.
pub const DEFAULT_STORE_FILE_NAME: &str = "macros.txt";

/// Key placed in new output slots.
pub const DEFAULT_SLOT_KEY: &str = "KEY_A";

/// Number of macro slots in the kernel module.
pub const KERNEL_MAX_MACROS: usize = 10;

/// Size of the kernel module's write buffer.
pub const KERNEL_MAX_PAYLOAD_BYTES: usize = 1000;
