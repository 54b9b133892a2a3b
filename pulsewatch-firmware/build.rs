//! Build script for pulsewatch-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates monitor.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Keys accepted in the [flow] and [temperature] sections
const CHANNEL_KEYS: &[&str] = &["max_value", "min_value", "fault_threshold", "max_frequency_hz"];

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate monitor.toml configuration at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=monitor.toml");

    let config_path = Path::new("monitor.toml");
    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => fail("Failed to read monitor.toml", &[e.to_string()]),
    };

    let config: toml::Value = match toml::from_str(&content) {
        Ok(value) => value,
        Err(e) => fail(
            "Invalid TOML syntax in monitor.toml",
            &e.to_string().lines().map(str::to_string).collect::<Vec<_>>(),
        ),
    };

    let mut errors = Vec::new();

    let Some(root) = config.as_table() else {
        fail("monitor.toml must be a table", &[]);
    };

    for (key, value) in root {
        match key.as_str() {
            "grace_period_us" => match value.as_integer() {
                Some(us) if us > 0 && us <= i64::from(u32::MAX) => {}
                _ => errors.push("grace_period_us must be an integer in 1..=4294967295".to_string()),
            },
            "flow" | "temperature" => validate_channel(key, value, &mut errors),
            other => errors.push(format!("unknown key or section '{}'", other)),
        }
    }

    if !errors.is_empty() {
        fail("Invalid values in monitor.toml", &errors);
    }

    println!("cargo:warning=monitor.toml validated successfully");
}

/// Validate a [flow] or [temperature] section
fn validate_channel(name: &str, value: &toml::Value, errors: &mut Vec<String>) {
    let Some(table) = value.as_table() else {
        errors.push(format!("[{}] must be a table", name));
        return;
    };

    for (key, value) in table {
        if !CHANNEL_KEYS.contains(&key.as_str()) {
            errors.push(format!("[{}] unknown key '{}'", name, key));
            continue;
        }

        let number = match value {
            toml::Value::Float(f) => *f,
            toml::Value::Integer(i) => *i as f64,
            _ => {
                errors.push(format!("[{}] {} must be a number", name, key));
                continue;
            }
        };

        if !number.is_finite() {
            errors.push(format!("[{}] {} must be finite", name, key));
        } else if key == "max_frequency_hz" && number <= 0.0 {
            errors.push(format!("[{}] max_frequency_hz must be positive", name));
        }
    }
}

/// Abort the build with a boxed error message
fn fail(title: &str, lines: &[String]) -> ! {
    let body = lines
        .iter()
        .map(|line| {
            let truncated = if line.chars().count() > 62 {
                format!("{}...", line.chars().take(59).collect::<String>())
            } else {
                line.to_string()
            };
            format!("║  • {:<62} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n");

    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title, body
    );
}
