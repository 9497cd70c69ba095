//! Configuration for a [`StreamPool`](crate::StreamPool).
//!
//! A pool is described by its ordered file list, its optional pipe list and
//! the cap on concurrently open regular files. Nothing is opened or checked on
//! disk here; validation is purely structural.

use std::path::PathBuf;

use crate::error::{Result, StreamPoolError};

/// Default cap on simultaneously open regular files.
pub const DEFAULT_CONCURRENT_FILES: usize = 1;

/// Sources and limits for a stream pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    /// Regular files, consumed once each in this order
    pub paths: Vec<PathBuf>,
    /// Named pipes fed by generator processes, recycled after each use
    pub pipes: Vec<PathBuf>,
    /// Maximum number of regular files open at the same time
    pub concurrent_files: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            paths: Vec::new(),
            pipes: Vec::new(),
            concurrent_files: DEFAULT_CONCURRENT_FILES,
        }
    }
}

impl PoolConfig {
    /// Configuration reading only regular files.
    pub fn files<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Configuration reading only named pipes.
    ///
    /// The file cap is zero since there are no files to open.
    pub fn pipes<I, P>(pipes: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            pipes: pipes.into_iter().map(Into::into).collect(),
            concurrent_files: 0,
            ..Self::default()
        }
    }

    /// Check the configuration for structural problems.
    ///
    /// A zero file cap is only accepted when there are no files to read,
    /// otherwise those files could never be handed out.
    pub fn validate(&self) -> Result<()> {
        if self.concurrent_files == 0 && !self.paths.is_empty() {
            return Err(StreamPoolError::invalid_config(format!(
                "concurrent_files is 0 but {} file path(s) are configured",
                self.paths.len()
            )));
        }

        if let Some(empty) = self
            .paths
            .iter()
            .chain(self.pipes.iter())
            .find(|p| p.as_os_str().is_empty())
        {
            return Err(StreamPoolError::invalid_config(format!(
                "empty source path {:?}",
                empty
            )));
        }

        Ok(())
    }
}

/// Fluent builder for [`PoolConfig`].
///
/// ```rust
/// use stream_pool::ConfigBuilder;
///
/// let config = ConfigBuilder::new()
///     .path("reads_1.fastq")
///     .path("reads_2.fastq")
///     .pipe("/tmp/generator_0")
///     .concurrent_files(2)
///     .build()
///     .unwrap();
/// assert_eq!(config.paths.len(), 2);
/// assert_eq!(config.concurrent_files, 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    config: PoolConfig,
}

impl ConfigBuilder {
    /// Create a builder starting from [`PoolConfig::default`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one regular file.
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.paths.push(path.into());
        self
    }

    /// Append several regular files, keeping their order.
    pub fn paths<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.config.paths.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Append one named pipe.
    pub fn pipe(mut self, pipe: impl Into<PathBuf>) -> Self {
        self.config.pipes.push(pipe.into());
        self
    }

    /// Append several named pipes, keeping their order.
    pub fn pipes<I, P>(mut self, pipes: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.config.pipes.extend(pipes.into_iter().map(Into::into));
        self
    }

    /// Set the cap on concurrently open regular files.
    pub fn concurrent_files(mut self, concurrent_files: usize) -> Self {
        self.config.concurrent_files = concurrent_files;
        self
    }

    /// Validate and return the configuration.
    pub fn build(self) -> Result<PoolConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
