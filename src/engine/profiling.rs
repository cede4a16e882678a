//! Sampling profiler
//!
//! Accumulates timings while a run progresses and appends a sample every
//! `sample_rate` processed entries to `<directory>/<name>-<category>.csv`.

use super::monitor;
use super::{ProfilingCategory, ProfilingConfig};
use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::time::Duration;

const RECORDED_CATEGORIES: [ProfilingCategory; 4] = [
    ProfilingCategory::Memory,
    ProfilingCategory::Parsers,
    ProfilingCategory::Processing,
    ProfilingCategory::Serializers,
];

pub struct Profiler {
    name: String,
    directory: PathBuf,
    category: ProfilingCategory,
    sample_rate: u64,
    processed: u64,
    sample: u64,
    parser_totals: BTreeMap<String, Duration>,
    processing_total: Duration,
    serializer_total: Duration,
    writers: HashMap<ProfilingCategory, BufWriter<File>>,
}

impl Profiler {
    /// Creates a profiler, or `None` when profiling is disabled
    pub fn new(config: &ProfilingConfig, name: &str) -> io::Result<Option<Self>> {
        if !config.enabled {
            return Ok(None);
        }

        let directory = config
            .directory
            .clone()
            .unwrap_or_else(|| PathBuf::from("."));
        fs::create_dir_all(&directory)?;

        Ok(Some(Self {
            name: name.to_string(),
            directory,
            category: config.category,
            sample_rate: u64::from(config.sample_rate.max(1)),
            processed: 0,
            sample: 0,
            parser_totals: BTreeMap::new(),
            processing_total: Duration::ZERO,
            serializer_total: Duration::ZERO,
            writers: HashMap::new(),
        }))
    }

    pub fn record_parser(&mut self, parser: &str, elapsed: Duration) {
        *self.parser_totals.entry(parser.to_string()).or_default() += elapsed;
    }

    pub fn record_processing(&mut self, elapsed: Duration) {
        self.processing_total += elapsed;
    }

    pub fn record_serializer(&mut self, elapsed: Duration) {
        self.serializer_total += elapsed;
    }

    /// Counts a processed entry and writes a sample when one is due
    pub fn entry_processed(&mut self) -> io::Result<()> {
        self.processed += 1;
        if self.processed % self.sample_rate == 0 {
            self.write_sample()?;
        }
        Ok(())
    }

    /// Writes the trailing sample and flushes every file
    pub fn finish(mut self) -> io::Result<()> {
        if self.processed % self.sample_rate != 0 {
            self.write_sample()?;
        }
        for writer in self.writers.values_mut() {
            writer.flush()?;
        }
        Ok(())
    }

    fn writer(&mut self, category: ProfilingCategory) -> io::Result<&mut BufWriter<File>> {
        if !self.writers.contains_key(&category) {
            let path = self
                .directory
                .join(format!("{}-{}.csv", self.name, category.name()));
            let is_new = !path.exists();
            let file = OpenOptions::new().create(true).append(true).open(&path)?;
            let mut writer = BufWriter::new(file);
            if is_new {
                writeln!(writer, "sample,name,value")?;
            }
            self.writers.insert(category, writer);
        }
        self.writers
            .get_mut(&category)
            .ok_or_else(|| io::Error::other("profiling writer missing"))
    }

    fn write_sample(&mut self) -> io::Result<()> {
        self.sample += 1;
        let sample = self.sample;

        for category in RECORDED_CATEGORIES {
            if !self.category.includes(category) {
                continue;
            }

            let rows: Vec<(String, u128)> = match category {
                ProfilingCategory::Parsers => self
                    .parser_totals
                    .iter()
                    .map(|(name, total)| (name.clone(), total.as_micros()))
                    .collect(),
                ProfilingCategory::Processing => {
                    vec![("entries".to_string(), self.processing_total.as_micros())]
                }
                ProfilingCategory::Serializers => {
                    vec![("storage".to_string(), self.serializer_total.as_micros())]
                }
                ProfilingCategory::Memory => monitor::resident_memory()
                    .map(|bytes| vec![("resident_memory".to_string(), u128::from(bytes))])
                    .unwrap_or_default(),
                ProfilingCategory::All => Vec::new(),
            };

            let writer = self.writer(category)?;
            for (name, value) in rows {
                writeln!(writer, "{},{},{}", sample, name, value)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_disabled_profiler_is_none() {
        let profiler = Profiler::new(&ProfilingConfig::default(), "single").unwrap();
        assert!(profiler.is_none());
    }

    #[test]
    fn test_samples_every_sample_rate_entries() {
        let dir = tempdir().unwrap();
        let config = ProfilingConfig {
            enabled: true,
            directory: Some(dir.path().to_path_buf()),
            sample_rate: 2,
            category: ProfilingCategory::Parsers,
        };
        let mut profiler = Profiler::new(&config, "single").unwrap().unwrap();

        for _ in 0..5 {
            profiler.record_parser("filestat", Duration::from_micros(10));
            profiler.entry_processed().unwrap();
        }
        profiler.finish().unwrap();

        let content = fs::read_to_string(dir.path().join("single-parsers.csv")).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines[0], "sample,name,value");
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[3], "3,filestat,50");
        assert!(!dir.path().join("single-processing.csv").exists());
    }
}
