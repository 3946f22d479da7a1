//! Reads and writes the trainer options. Only the options are stored. The progress of a session
//! lives in memory.

use anyhow::{Context, Result};
use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::PathBuf,
};
use tracing::debug;

use crate::{data::TrainerOptions, error::OptionsManagerError};

/// The default name of the file containing the trainer options.
pub const OPTIONS_FILE_NAME: &str = "trainer_options.json";

/// A trait for reading and writing the trainer options.
pub trait OptionsManager {
    /// Returns the stored options.
    fn get_options(&self) -> Result<TrainerOptions, OptionsManagerError>;

    /// Replaces the stored options.
    fn set_options(&mut self, options: &TrainerOptions) -> Result<(), OptionsManagerError>;
}

/// An options manager backed by a JSON file. Fields missing from the file take their default
/// values.
pub struct LocalOptionsManager {
    /// The path to the options file.
    pub path: PathBuf,
}

impl LocalOptionsManager {
    fn read_options(&self) -> Result<TrainerOptions> {
        let file = File::open(&self.path)
            .with_context(|| format!("cannot open options file {}", self.path.display()))?;
        serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("cannot parse options file {}", self.path.display()))
    }

    fn write_options(&self, options: &TrainerOptions) -> Result<()> {
        let file = File::create(&self.path)
            .with_context(|| format!("cannot create options file {}", self.path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), options)
            .with_context(|| format!("cannot write options to {}", self.path.display()))
    }

    /// Returns the stored options, or the default options if the file does not exist yet.
    pub fn get_or_default(&self) -> Result<TrainerOptions, OptionsManagerError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "options file not found, using defaults");
            return Ok(TrainerOptions::default());
        }
        self.get_options()
    }
}

impl OptionsManager for LocalOptionsManager {
    fn get_options(&self) -> Result<TrainerOptions, OptionsManagerError> {
        self.read_options().map_err(OptionsManagerError::GetOptions)
    }

    fn set_options(&mut self, options: &TrainerOptions) -> Result<(), OptionsManagerError> {
        self.write_options(options)
            .map_err(OptionsManagerError::SetOptions)
    }
}
