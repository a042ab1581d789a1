use chrono::Local;

use crate::backup::autobackup::{Invocation, Outcome};

// ZFS caps user property values at 8 KiB; stay well under it.
const MAX_MESSAGE_BYTES: usize = 1024;

pub fn timestamp() -> String {
    Local::now().format("%Y-%m-%dT%H:%M:%S%:z").to_string()
}

pub fn message(invocation: &Invocation, outcome: &Outcome) -> String {
    let text = match outcome {
        Outcome::DryRun => format!("no backup performed for {}", invocation.describe()),
        Outcome::Succeeded => format!("backup {} completed", invocation.describe()),
        Outcome::Failed(err) => format!("backup {} failed: {}", invocation.describe(), err),
    };
    one_line(&text, MAX_MESSAGE_BYTES)
}

/// Value written to the last-status tag: `<word> <timestamp> <message>`.
pub fn status_value(outcome: &Outcome, timestamp: &str, message: &str) -> String {
    format!("{} {} {}", outcome.word(), timestamp, message)
}

fn one_line(text: &str, max: usize) -> String {
    let mut line = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if line.len() > max {
        let mut cut = max;
        while !line.is_char_boundary(cut) {
            cut -= 1;
        }
        line.truncate(cut);
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::destination::Destination;

    fn inv() -> Invocation {
        Invocation::remote(
            "pool-a",
            Destination { host: "h1".into(), path: "data/a".into() },
            "650,1h10d,1d1y",
            false,
        )
    }

    #[test]
    fn value_starts_with_status_word() {
        let ts = "2026-10-19T02:00:00+00:00";
        let msg = message(&inv(), &Outcome::DryRun);
        let value = status_value(&Outcome::DryRun, ts, &msg);
        assert_eq!(
            value,
            "dry-run 2026-10-19T02:00:00+00:00 no backup performed for pool-a -> h1:data/a"
        );
        assert!(status_value(&Outcome::Succeeded, ts, "x").starts_with("success "));
        assert!(status_value(&Outcome::Failed("e".into()), ts, "x").starts_with("failed "));
    }

    #[test]
    fn failure_message_is_one_bounded_line() {
        let err = format!("ssh failed\n{}\n", "é".repeat(2000));
        let msg = message(&inv(), &Outcome::Failed(err));
        assert!(!msg.contains('\n'));
        assert!(msg.len() <= MAX_MESSAGE_BYTES);
        assert!(msg.starts_with("backup pool-a -> h1:data/a failed: ssh failed"));
    }

    #[test]
    fn timestamp_is_iso8601() {
        let ts = timestamp();
        assert_eq!(&ts[4..5], "-");
        assert_eq!(&ts[10..11], "T");
        assert_eq!(ts.len(), "2026-10-19T02:00:00+00:00".len());
    }
}
