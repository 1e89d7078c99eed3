//! Print-config command.

use crate::config::Settings;

/// Display the effective configuration as TOML.
pub fn run_print_config(settings: &Settings) {
    match settings.to_toml() {
        Ok(toml_str) => println!("{toml_str}"),
        Err(e) => {
            eprintln!("Error displaying config: {e}");
            std::process::exit(1);
        }
    }
}
