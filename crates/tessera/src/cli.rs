//! Shared logic for the command-line wrappers.

use std::fs::File;
use std::io::{self, BufReader, Write};

use serde_json::Value;
use thiserror::Error;

use crate::apply::apply_patch;
use crate::diff::diff;
use crate::error::DiffError;
use crate::patch::Patch;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Diff(#[from] DiffError),
}

fn read_json_file(path: &str) -> Result<Value, CliError> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

/// `diff LEFT.json RIGHT.json`: write the patch between the two documents
/// as JSON.
pub fn run_diff(left_path: &str, right_path: &str, out: &mut dyn Write) -> Result<(), CliError> {
    let left = read_json_file(left_path)?;
    let right = read_json_file(right_path)?;
    let patch = diff(&left, &right)?;
    serde_json::to_writer(&mut *out, &patch)?;
    out.write_all(b"\n")?;
    Ok(())
}

/// `patch ORIGINAL.json PATCH.json`: apply a patch to a document and write
/// the result as JSON.
pub fn run_patch(doc_path: &str, patch_path: &str, out: &mut dyn Write) -> Result<(), CliError> {
    let doc = read_json_file(doc_path)?;
    let file = File::open(patch_path)?;
    let patch: Patch = serde_json::from_reader(BufReader::new(file))?;
    let result = apply_patch(&doc, &patch);
    serde_json::to_writer(&mut *out, &result)?;
    out.write_all(b"\n")?;
    Ok(())
}
