use std::time::Duration;

use crate::config::model::Metrics;
use crate::error::Result;
use crate::util::command::{CommandLine, Runner};

/// Drops characters that would break the sender's key/value framing.
pub fn sanitize(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, '\n' | '\r' | '"' | '\'' | '\\'))
        .collect()
}

pub fn key_for(cfg: &Metrics, selector: &str) -> String {
    format!("{}[{}]", cfg.key_prefix, sanitize(selector))
}

pub fn sender_command(cfg: &Metrics, key: &str, value: &str) -> CommandLine {
    let mut line = CommandLine::new(&cfg.sender)
        .arg("-z")
        .arg(&cfg.server)
        .arg("-p")
        .arg(cfg.port.to_string())
        .arg("-s")
        .arg(&cfg.host);
    if let (Some(identity), Some(file)) = (&cfg.psk_identity, &cfg.psk_file) {
        line = line
            .args(["--tls-connect", "psk", "--tls-psk-identity"])
            .arg(identity)
            .arg("--tls-psk-file")
            .arg(file.to_string_lossy());
    }
    line.arg("-k")
        .arg(sanitize(key))
        .arg("-o")
        .arg(sanitize(value))
}

pub fn send<R: Runner + ?Sized>(
    runner: &R,
    cfg: &Metrics,
    timeout: Duration,
    key: &str,
    value: &str,
) -> Result<()> {
    let line = sender_command(cfg, key, value);
    let output = runner.run(&line, timeout)?;
    output.check(&cfg.sender)?;
    Ok(())
}
