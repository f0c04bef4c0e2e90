//! Converting many save files at once.
//!
//! Every file is converted independently of the others; a failing file only affects its own
//! outcome. Files are handed to a pool of worker threads through a channel and the outcomes are
//! put back into input order.


use std::fmt;
use std::thread;

use crossbeam::channel;
use tracing::debug;

use crate::{convert, ConversionError, ConversionResult};


/// A save file as read by the caller.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct RawFile {
    pub name: String,
    pub data: Vec<u8>,
}
impl RawFile {
    pub fn new<N: Into<String>, D: Into<Vec<u8>>>(name: N, data: D) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }
}


/// The outcome of converting one file of a batch.
#[derive(Debug)]
pub struct FileOutcome {
    pub name: String,
    pub result: Result<ConversionResult, ConversionError>,
}
impl FileOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    pub fn output_file_name(&self) -> Option<String> {
        self.result
            .as_ref()
            .ok()
            .map(|r| r.output_file_name(&self.name))
    }
}
impl fmt::Display for FileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.result {
            Ok(result)
                => write!(f, "{} \u{2192} {} ({})", self.name, result.output_file_name(&self.name), result.format.label()),
            Err(e)
                => write!(f, "{}: {}", self.name, e),
        }
    }
}


#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct BatchOptions {
    pub worker_count: usize,
}
impl BatchOptions {
    pub fn sequential() -> Self {
        Self::with_worker_count(1)
    }

    pub fn with_worker_count(worker_count: usize) -> Self {
        Self {
            worker_count: worker_count.max(1),
        }
    }
}
impl Default for BatchOptions {
    fn default() -> Self {
        Self::with_worker_count(num_cpus::get())
    }
}


fn convert_one(file: RawFile) -> FileOutcome {
    let result = convert(&file.data, &file.name);
    FileOutcome {
        name: file.name,
        result,
    }
}


/// Converts all `files`, returning one outcome per file in the same order.
pub fn convert_batch(files: Vec<RawFile>, options: &BatchOptions) -> Vec<FileOutcome> {
    let file_count = files.len();
    let worker_count = options.worker_count.clamp(1, file_count.max(1));
    if worker_count == 1 {
        return files.into_iter().map(convert_one).collect();
    }

    let (job_sender, job_receiver) = channel::unbounded();
    for job in files.into_iter().enumerate() {
        // the receiver is still alive, so this cannot fail
        let _ = job_sender.send(job);
    }
    drop(job_sender);

    let (outcome_sender, outcome_receiver) = channel::unbounded();
    thread::scope(|scope| {
        for worker_index in 0..worker_count {
            let jobs = job_receiver.clone();
            let outcomes = outcome_sender.clone();
            scope.spawn(move || {
                while let Ok((index, file)) = jobs.recv() {
                    debug!("worker {} converting file {} ({:?})", worker_index, index, file.name);
                    let _ = outcomes.send((index, convert_one(file)));
                }
                debug!("worker {} done", worker_index);
            });
        }
    });
    drop(outcome_sender);

    let mut slots: Vec<Option<FileOutcome>> = (0..file_count).map(|_| None).collect();
    for (index, outcome) in outcome_receiver.iter() {
        slots[index] = Some(outcome);
    }
    slots.into_iter().flatten().collect()
}


#[cfg(test)]
mod tests {
    use super::{convert_batch, BatchOptions, RawFile};
    use crate::{ConversionError, FormatTag};
    use flate2::Compression;
    use flate2::write::ZlibEncoder;
    use std::io::Write;
    use tracing_test::traced_test;

    fn save_file(name: &str, header: &[u8], payload: &[u8]) -> RawFile {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::fast());
        encoder.write_all(payload).unwrap();
        let mut data = header.to_vec();
        data.extend_from_slice(&encoder.finish().unwrap());
        RawFile::new(name, data)
    }

    fn mixed_batch() -> Vec<RawFile> {
        let mut files = Vec::new();
        for i in 0..24 {
            let payload = format!("{{\"slot\":{}}}", i);
            let file = match i % 4 {
                0 => save_file(&format!("slot{}.sav", i), b"ZB", payload.as_bytes()),
                1 => save_file(&format!("slot{}MP", i), b"MP", payload.as_bytes()),
                2 => RawFile::new(format!("slot{}.sav", i), b"ZB garbage".to_vec()),
                _ => RawFile::new(format!("slot{}.sav", i), b"Z".to_vec()),
            };
            files.push(file);
        }
        files
    }

    #[test]
    #[traced_test]
    fn test_order_and_isolation() {
        let outcomes = convert_batch(mixed_batch(), &BatchOptions::with_worker_count(4));
        assert_eq!(outcomes.len(), 24);
        for (i, outcome) in outcomes.iter().enumerate() {
            match i % 4 {
                0 => {
                    assert_eq!(outcome.name, format!("slot{}.sav", i));
                    let result = outcome.result.as_ref().unwrap();
                    assert_eq!(result.format, FormatTag::StandardJson);
                    assert_eq!(result.data, format!("{{\"slot\":{}}}", i).into_bytes());
                },
                1 => {
                    assert_eq!(outcome.output_file_name(), Some(format!("slot{}.mp", i)));
                    assert!(outcome.result.as_ref().unwrap().is_legacy_variant);
                },
                2 => assert!(matches!(outcome.result, Err(ConversionError::Decompression(_)))),
                _ => assert!(matches!(outcome.result, Err(ConversionError::TooSmall { length: 1 }))),
            }
        }
    }

    #[test]
    fn test_sequential_matches_parallel() {
        let sequential = convert_batch(mixed_batch(), &BatchOptions::sequential());
        let parallel = convert_batch(mixed_batch(), &BatchOptions::default());
        assert_eq!(sequential.len(), parallel.len());
        for (s, p) in sequential.iter().zip(parallel.iter()) {
            assert_eq!(s.to_string(), p.to_string());
            assert_eq!(s.result.as_ref().ok(), p.result.as_ref().ok());
        }
    }

    #[test]
    fn test_empty_batch() {
        assert!(convert_batch(Vec::new(), &BatchOptions::default()).is_empty());
    }

    #[test]
    fn test_report_lines() {
        let outcomes = convert_batch(
            vec![
                save_file("save1.dat", b"ZB", b"{}"),
                save_file("save2MP", b"MP", b"\x80"),
                RawFile::new("broken", b"".to_vec()),
            ],
            &BatchOptions::sequential(),
        );
        assert_eq!(outcomes[0].to_string(), "save1.dat \u{2192} save1.dat.json (JSON)");
        assert_eq!(outcomes[1].to_string(), "save2MP \u{2192} save2.mp (MP - UNSUPPORTED)");
        assert!(outcomes[2].to_string().starts_with("broken: file too small"));
        assert!(!outcomes[2].is_success());
    }
}
