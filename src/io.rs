//! Status output and file writing.

use indicatif::{ProgressBar, ProgressStyle};
use lazy_static::lazy_static;

#[cfg(feature = "json")]
use serde::Serialize;
#[cfg(feature = "json")]
use std::{fs, io, path};

lazy_static! {
    static ref DEFAULT_PROGRESS_STYLE: ProgressStyle =
        ProgressStyle::with_template("Progress: {bar:40}  {percent}% | ETA: {eta}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
}

/// Whether or not to print non-critical status messages.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verbose {
    Yes,
    No,
}

impl Verbose {
    pub fn is_yes(&self) -> bool {
        match self {
            Verbose::Yes => true,
            Verbose::No => false,
        }
    }

    /// Creates a progress bar for `length` items, hidden unless verbose.
    pub fn create_progress_bar(&self, length: usize) -> ProgressBar {
        if self.is_yes() {
            ProgressBar::new(length as u64).with_style(DEFAULT_PROGRESS_STYLE.clone())
        } else {
            ProgressBar::hidden()
        }
    }
}

impl From<bool> for Verbose {
    fn from(is_verbose: bool) -> Self {
        if is_verbose {
            Verbose::Yes
        } else {
            Verbose::No
        }
    }
}

/// Serializes the given data as pretty-printed JSON and saves it at the given path.
#[cfg(feature = "json")]
pub fn save_data_as_json<T: Serialize>(file_path: &path::Path, data: &T) -> io::Result<()> {
    let file = fs::File::create(file_path)?;
    write_data_as_json(io::BufWriter::new(file), data)
}

/// Serializes the given data as pretty-printed JSON into the given writer.
#[cfg(feature = "json")]
pub fn write_data_as_json<W: io::Write, T: Serialize>(mut writer: W, data: &T) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut writer, data)?;
    writer.write_all(b"\n")?;
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_progress_bars_are_hidden() {
        assert!(Verbose::No.create_progress_bar(10).is_hidden());
        assert_eq!(Verbose::from(true), Verbose::Yes);
    }

    #[cfg(feature = "json")]
    #[test]
    fn json_writing_works() {
        let mut buffer = Vec::new();
        write_data_as_json(&mut buffer, &vec![1, 2]).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(
            serde_json::from_str::<Vec<i32>>(&text).unwrap(),
            vec![1, 2]
        );
    }
}
