//! Line-oriented presence ingestion tool.
//!
//! Reads one JSON event per stdin line, resolves it against the configured
//! store and prints the resulting snapshot as one JSON line on stdout.
//! Configuration comes from `PRESENCE_*` environment variables.

use log::warn;
use presence_core::{
    core_version, init_logging, IngestOutcome, PresenceConfig, PresenceEvent, PresenceService,
    SqlitePresenceStore,
};
use std::io::{self, BufRead, Write};
use std::process::ExitCode;

fn main() -> ExitCode {
    eprintln!("presence_core version={}", core_version());

    let config = match PresenceConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Some(log_dir) = config.log_dir.as_deref() {
        if let Err(err) = init_logging(&config.log_level, log_dir) {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    }

    let store = match SqlitePresenceStore::open_optional(config.db_path.as_deref()) {
        Ok(store) => store,
        Err(err) => {
            eprintln!("error: failed to open presence store: {err}");
            return ExitCode::FAILURE;
        }
    };
    let service = match PresenceService::from_config(store, &config) {
        Ok(service) => service,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    match run(&service, io::stdin().lock(), io::stdout().lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(
    service: &PresenceService<SqlitePresenceStore>,
    input: impl BufRead,
    mut output: impl Write,
) -> io::Result<()> {
    for (idx, line) in input.lines().enumerate() {
        let line = line?;
        let line_no = idx + 1;
        if line.trim().is_empty() {
            continue;
        }

        let event: PresenceEvent = match serde_json::from_str(&line) {
            Ok(event) => event,
            Err(err) => {
                warn!("event=cli_ingest module=cli status=skipped line={line_no} error_code=bad_json");
                eprintln!("line {line_no}: invalid event json: {err}");
                continue;
            }
        };

        match service.ingest_event(event) {
            Ok(outcome) => write_outcome(&mut output, &outcome)?,
            Err(err) => eprintln!("line {line_no}: {err}"),
        }
    }
    output.flush()
}

fn write_outcome(output: &mut impl Write, outcome: &IngestOutcome) -> io::Result<()> {
    let line = serde_json::json!({
        "event_id": outcome.event_id(),
        "duplicate": outcome.is_duplicate(),
        "snapshot": outcome.snapshot(),
    });
    writeln!(output, "{line}")
}

#[cfg(test)]
mod tests {
    use super::run;
    use presence_core::{PresenceService, SqlitePresenceStore};

    #[test]
    fn run_prints_one_line_per_valid_event() {
        let service = PresenceService::new(SqlitePresenceStore::open_in_memory().unwrap());
        let input = concat!(
            r#"{"id": "e1", "person_id": 1, "ts": 100, "source": "mobile", "type": "panic"}"#,
            "\n",
            "not json\n",
            "\n",
            r#"{"id": "e1", "person_id": 1, "ts": 100, "source": "mobile", "type": "panic"}"#,
            "\n",
        );
        let mut output = Vec::new();
        run(&service, input.as_bytes(), &mut output).unwrap();

        let text = String::from_utf8(output).unwrap();
        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["duplicate"], false);
        assert_eq!(lines[0]["snapshot"]["status"], "EMERGENCY");
        assert_eq!(lines[0]["snapshot"]["priority_label"], "EMERGENCY");
        assert_eq!(lines[1]["duplicate"], true);
    }
}
