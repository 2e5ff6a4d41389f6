use std::io;

use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::error::Result;
use crate::types::Discussion;

/// Write the discussions as a pretty-printed JSON array with 4-space
/// indentation, matching the API's camelCase field names.
pub fn write_pretty_json<W: io::Write>(writer: W, discussions: &[Discussion]) -> Result<()> {
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(writer, formatter);
    discussions.serialize(&mut serializer)?;
    Ok(())
}
