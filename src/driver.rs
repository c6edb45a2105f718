//! The greeting loop.
//!
//! A [`Driver`] draws one [`RandomSample`], then walks the indices
//! `0..iterations` in ascending order. Each index `i` becomes the user name
//! `"{prefix}{i}"`, is greeted, is stored in a [`Dummy`], and produces one
//! output line of the form `"{greeting} {value}"`. With the default
//! configuration that is exactly:
//!
//! ```text
//! Hello, User0! 0
//! Hello, User1! 1
//! Hello, User2! 2
//! ```
//!
//! The sample is only logged in text mode. In JSON mode the whole
//! [`RunReport`], sample included, is written instead of the lines.

use crate::config::{DriverConfig, SampleConfig};
use crate::dummy::Dummy;
use crate::greeting::greet;
use crate::sample::RandomSample;
use anyhow::{Context, Result};
use clap::ValueEnum;
use rand::Rng;
use serde::Serialize;
use std::fmt;
use std::io::Write;
use tracing::{debug, info};

/// How a run is written to the output stream
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// One greeting paired with the value held for that iteration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunLine {
    pub name: String,
    pub greeting: String,
    pub value: u32,
}

impl RunLine {
    fn new(name: String, holder: &Dummy<u32>) -> Self {
        Self {
            greeting: greet(&name),
            name,
            value: *holder.value(),
        }
    }
}

impl fmt::Display for RunLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.greeting, self.value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub sample: RandomSample,
    pub lines: Vec<RunLine>,
}

#[derive(Debug, Clone, Default)]
pub struct Driver {
    config: DriverConfig,
    sample: SampleConfig,
    format: OutputFormat,
}

impl Driver {
    pub fn new(config: DriverConfig, sample: SampleConfig) -> Self {
        Self {
            config,
            sample,
            format: OutputFormat::default(),
        }
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Run the loop with the thread-local generator, writing to `out`
    pub fn run<W: Write>(&self, out: &mut W) -> Result<RunReport> {
        self.run_with_rng(&mut rand::thread_rng(), out)
    }

    pub fn run_with_rng<R, W>(&self, rng: &mut R, out: &mut W) -> Result<RunReport>
    where
        R: Rng + ?Sized,
        W: Write,
    {
        let sample = RandomSample::draw_with(rng, &self.sample);
        debug!("Sample {:?} sums to {}", sample.values(), sample.sum());

        let mut lines = Vec::new();
        for i in 0..self.config.iterations {
            let line = RunLine::new(self.user_name(i), &Dummy::new(i));
            debug!(iteration = i, "{}", line.greeting);
            if self.format == OutputFormat::Text {
                writeln!(out, "{}", line).context("Failed to write greeting")?;
            }
            lines.push(line);
        }

        let report = RunReport { sample, lines };
        if self.format == OutputFormat::Json {
            serde_json::to_writer_pretty(&mut *out, &report)
                .context("Failed to write JSON report")?;
            writeln!(out).context("Failed to write JSON report")?;
        }
        out.flush().context("Failed to flush output")?;

        info!("Greeted {} users", report.lines.len());
        Ok(report)
    }

    fn user_name(&self, index: u32) -> String {
        format!("{}{}", self.config.name_prefix, index)
    }
}
