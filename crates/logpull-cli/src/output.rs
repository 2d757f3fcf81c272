use std::io::Write;

use serde_json::Value;

use crate::error::CliError;

/// Write the command report to stdout as a single JSON document.
pub fn render(report: &Value, pretty: bool) -> Result<(), CliError> {
    let rendered = if pretty {
        serde_json::to_string_pretty(report)?
    } else {
        serde_json::to_string(report)?
    };

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{rendered}")?;
    handle.flush()?;
    Ok(())
}
