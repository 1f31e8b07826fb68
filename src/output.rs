use crate::error::QrisError;
use log::debug;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Render the payload as pretty-printed JSON and write it to `path`, or to
/// stdout when no path is given. Non-ASCII text is written as-is.
pub fn write_json(payload: &Value, path: Option<&Path>) -> Result<(), QrisError> {
    let rendered = serde_json::to_string_pretty(payload)?;
    match path {
        Some(path) => {
            fs::write(path, &rendered).map_err(|source| QrisError::Output {
                path: path.to_path_buf(),
                source,
            })?;
            debug!("Wrote {} bytes to {}", rendered.len(), path.display());
            println!("Saved response to {}", path.display());
        }
        None => println!("{rendered}"),
    }
    Ok(())
}
