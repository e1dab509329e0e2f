pub(crate) mod issue;
pub(crate) mod meta;
pub(crate) mod project;
pub(crate) mod pull;

use console::style;
use forgekit::AdapterError;
use serde::Serialize;

pub(crate) type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Print `value` as pretty JSON on stdout.
pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print the result of an adapter call.
///
/// Capability gaps are reported as a notice instead of a failure.
pub(crate) fn report<T: Serialize>(result: Result<T, AdapterError>) -> CliResult {
    match result {
        Ok(value) => print_json(&value),
        Err(e) if e.is_not_supported() => {
            eprintln!("{} {}", style("note:").yellow().bold(), e);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
