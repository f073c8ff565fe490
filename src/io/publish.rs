//! Write run outputs as JSON documents.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::pipeline::RunOutput;

/// Destination of each published document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub combined: PathBuf,
    pub year_over_year: PathBuf,
    pub month_over_month: PathBuf,
}

impl Default for OutputPaths {
    fn default() -> Self {
        Self {
            combined: PathBuf::from("data_combined.json"),
            year_over_year: PathBuf::from("yoy_change.json"),
            month_over_month: PathBuf::from("mom_change.json"),
        }
    }
}

/// Pretty-print `value` as JSON into `writer`.
pub fn to_writer<W: Write, T: Serialize + ?Sized>(mut writer: W, value: &T) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.write_all(b"\n")?;
    writer.flush()
}

/// Pretty-print `value` as JSON to the file at `path`, replacing it.
///
/// The document is written next to `path` first and renamed into place, so
/// a failed write leaves any previous file intact.
pub fn write_json<P: AsRef<Path>, T: Serialize + ?Sized>(path: P, value: &T) -> io::Result<()> {
    let path = path.as_ref();
    let staged = stage(path, value)?;
    fs::rename(&staged, path)
}

/// Write the combined, year-over-year and month-over-month documents.
///
/// All three are staged before any is renamed into place: if one cannot be
/// written, none of the existing outputs is replaced.
pub fn publish_outputs(output: &RunOutput, paths: &OutputPaths) -> io::Result<()> {
    let mut staged = Vec::with_capacity(3);
    if let Err(error) = stage_all(output, paths, &mut staged) {
        for (temp, _) in &staged {
            let _ = fs::remove_file(temp);
        }
        return Err(error);
    }

    for (temp, path) in &staged {
        fs::rename(temp, path)?;
    }
    info!(
        combined = %paths.combined.display(),
        year_over_year = %paths.year_over_year.display(),
        month_over_month = %paths.month_over_month.display(),
        "outputs written"
    );
    Ok(())
}

fn stage_all<'a>(
    output: &RunOutput,
    paths: &'a OutputPaths,
    staged: &mut Vec<(PathBuf, &'a PathBuf)>,
) -> io::Result<()> {
    staged.push((stage(&paths.combined, &output.combined)?, &paths.combined));
    staged.push((
        stage(&paths.year_over_year, &output.year_over_year)?,
        &paths.year_over_year,
    ));
    staged.push((
        stage(&paths.month_over_month, &output.month_over_month)?,
        &paths.month_over_month,
    ));
    Ok(())
}

/// Sibling of `path` that a document is staged in before the rename.
fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn stage<T: Serialize + ?Sized>(path: &Path, value: &T) -> io::Result<PathBuf> {
    let temp = staging_path(path);
    let written = File::create(&temp).and_then(|file| to_writer(BufWriter::new(file), value));
    if let Err(error) = written {
        let _ = fs::remove_file(&temp);
        return Err(error);
    }
    Ok(temp)
}
