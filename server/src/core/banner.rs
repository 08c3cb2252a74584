//! Startup banner and URL display

use super::config::{AppConfig, is_all_interfaces};
use super::constants::APP_NAME;

/// Label column width
const W: usize = 12;

/// Print the startup banner with endpoint URLs
pub fn print_banner(config: &AppConfig, records: &[&str]) {
    let host = config.server.host.as_str();
    let port = config.server.port;
    // Use localhost for display when binding to all interfaces
    let display_host = if is_all_interfaces(host) {
        "localhost"
    } else {
        host
    };
    let base = format!("http://{}:{}/api/v1/records", display_host, port);

    println!();
    println!(
        "  \x1b[1m\x1b[36m{}\x1b[0m \x1b[90mv{}\x1b[0m",
        APP_NAME,
        env!("CARGO_PKG_VERSION")
    );
    println!();

    for record in records {
        println!(
            "  \x1b[32m➜\x1b[0m  \x1b[1m{:<W$}\x1b[0m \x1b[36m{}/{}\x1b[0m",
            format!("{}:", record),
            base,
            record
        );
    }

    if host == "127.0.0.1" || host == "localhost" {
        println!(
            "  \x1b[90m➜  {:<W$} use --host 0.0.0.0 to expose\x1b[0m",
            "Network:"
        );
    }
    println!(
        "  \x1b[90m➜  {:<W$} {}\x1b[0m",
        "Filters:", config.filters
    );
    println!(
        "  \x1b[90m➜  {:<W$} {}\x1b[0m",
        "SQL:", config.sql.dialect
    );

    println!();
}
