use std::fmt::Display;
use std::io::{self, IsTerminal};
use std::sync::OnceLock;

const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const GREEN: &str = "\x1b[32m";
const RESET: &str = "\x1b[0m";

/// Target of the events mirroring console lines. Already on stdout, so the
/// stderr log layer skips them.
pub const TARGET: &str = "zabwrap::console";

fn color_enabled() -> bool {
    static ENABLED: OnceLock<bool> = OnceLock::new();
    *ENABLED.get_or_init(|| std::env::var_os("NO_COLOR").is_none() && io::stdout().is_terminal())
}

fn paint(color: &str, text: &str) -> String {
    if color_enabled() {
        format!("{}{}{}", color, text, RESET)
    } else {
        text.to_string()
    }
}

pub fn error(msg: impl Display) {
    let msg = msg.to_string();
    println!("{}", paint(RED, &msg));
    tracing::error!(target: TARGET, "{}", msg);
}

pub fn warn(msg: impl Display) {
    let msg = msg.to_string();
    println!("{}", paint(YELLOW, &msg));
    tracing::warn!(target: TARGET, "{}", msg);
}

pub fn ok(msg: impl Display) {
    let msg = msg.to_string();
    println!("{}", paint(GREEN, &msg));
    tracing::info!(target: TARGET, "{}", msg);
}

pub fn info(msg: impl Display) {
    let msg = msg.to_string();
    println!("{}", msg);
    tracing::info!(target: TARGET, "{}", msg);
}

/// `Label:value` pairs with green labels, e.g. the dry-run command echo.
pub fn labeled(pairs: &[(&str, &str)]) {
    let shown: Vec<String> = pairs
        .iter()
        .map(|(label, value)| format!("{}{}", paint(GREEN, &format!("{}:", label)), value))
        .collect();
    println!("{}", shown.join(" "));
    let plain: Vec<String> = pairs
        .iter()
        .map(|(label, value)| format!("{}:{}", label, value))
        .collect();
    tracing::info!(target: TARGET, "{}", plain.join(" "));
}

/// Captured child output, passed through untouched.
pub fn passthrough(text: &str) {
    let text = text.trim_end();
    if !text.is_empty() {
        println!("{}", text);
    }
}
