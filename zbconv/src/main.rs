mod delivery;
mod queue;


use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;
use zbsave::{BatchOptions, FileOutcome, Header, RawFile};
use zbsave::naming::{format_file_size, is_risky_file_name, output_file_name};

use crate::delivery::{deliver, read_input, Error};
use crate::queue::{InputQueue, QueuedFile};


#[derive(Parser)]
enum ProgMode {
    /// Converts save files and writes the results.
    Convert(ConvertArgs),

    /// Shows how save files would be converted without converting them.
    Inspect(InputFilesArgs),
}

#[derive(Parser)]
struct ConvertArgs {
    /// Directory to write converted files into; defaults to the directory of each input file.
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Also convert files that look like legacy MP saves.
    #[arg(long)]
    pub accept_unsupported: bool,

    /// Number of files to convert in parallel; defaults to the number of CPUs.
    #[arg(short, long, conflicts_with = "sequential")]
    pub jobs: Option<usize>,

    /// Convert one file after the other.
    #[arg(long)]
    pub sequential: bool,

    #[arg(required = true)]
    pub input_files: Vec<PathBuf>,
}

#[derive(Parser)]
struct InputFilesArgs {
    #[arg(required = true)]
    pub input_files: Vec<PathBuf>,
}


fn report_failure(name: &str, error: &Error) {
    println!("{}", failure_line(name, error));
}

fn failure_line(name: &str, error: &Error) -> String {
    format!("{}: {}", name, error)
}


/// The report lines of a conversion run, in queue order.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
struct Report {
    pub lines: Vec<String>,
    pub any_failed: bool,
}
impl Report {
    fn succeeded(&mut self, line: String) {
        self.lines.push(line);
    }

    fn failed(&mut self, line: String) {
        self.lines.push(line);
        self.any_failed = true;
    }
}


/// Refuses a queue holding probable legacy saves unless they have been accepted, returning
/// their names.
fn check_risky(queue: &InputQueue, accept_unsupported: bool) -> Result<(), Vec<&str>> {
    let risky_names = queue.risky_names();
    if risky_names.is_empty() || accept_unsupported {
        Ok(())
    } else {
        Err(risky_names)
    }
}


/// Reads, converts and writes out every queued file.
///
/// Without an `output_dir`, each converted file lands next to its input. A file that fails at
/// any stage is reported and skipped; the others are still converted.
fn convert_queue(queue: &InputQueue, options: &BatchOptions, output_dir: Option<&Path>) -> Report {
    let mut report = Report::default();
    let mut raw_files = Vec::with_capacity(queue.files().len());
    let mut read_files: Vec<&QueuedFile> = Vec::with_capacity(queue.files().len());
    for queued in queue.files() {
        match read_input(&queued.path) {
            Ok(data) => {
                debug!("read {} ({})", queued.path.display(), format_file_size(data.len() as u64));
                raw_files.push(RawFile::new(queued.name.clone(), data));
                read_files.push(queued);
            },
            Err(e) => report.failed(failure_line(&queued.name, &e)),
        }
    }

    info!("converting {} files with up to {} workers", raw_files.len(), options.worker_count);
    let outcomes = zbsave::convert_batch(raw_files, options);

    for (queued, outcome) in read_files.into_iter().zip(outcomes) {
        deliver_outcome(queued, &outcome, output_dir, &mut report);
    }
    report
}

/// Writes out and reports one outcome.
fn deliver_outcome(queued: &QueuedFile, outcome: &FileOutcome, output_dir: Option<&Path>, report: &mut Report) {
    let result = match &outcome.result {
        Ok(result) => result,
        Err(_) => {
            report.failed(outcome.to_string());
            return;
        },
    };

    let output_dir = output_dir
        .or_else(|| queued.path.parent())
        .unwrap_or_else(|| Path::new("."));
    if let Err(e) = deliver(result, &outcome.name, output_dir) {
        report.failed(failure_line(&outcome.name, &e));
        return;
    }

    if result.is_legacy_variant {
        warn!(
            "{} was converted as a legacy MP save{}; the output may not be usable",
            outcome.name,
            if result.decompressed { "" } else { " without decompression" },
        );
    }
    report.succeeded(outcome.to_string());
}


fn run_convert(args: ConvertArgs) -> ExitCode {
    let queue: InputQueue = args.input_files.iter().collect();

    if let Err(risky_names) = check_risky(&queue, args.accept_unsupported) {
        error!("legacy MP saves are not fully supported; their output may be unusable");
        for name in &risky_names {
            eprintln!("  {}", name);
        }
        eprintln!("pass --accept-unsupported to convert them anyway; nothing was converted");
        return ExitCode::FAILURE;
    }

    let options = if args.sequential {
        BatchOptions::sequential()
    } else if let Some(jobs) = args.jobs {
        BatchOptions::with_worker_count(jobs)
    } else {
        BatchOptions::default()
    };
    let report = convert_queue(&queue, &options, args.output_dir.as_deref());
    for line in &report.lines {
        println!("{}", line);
    }

    if report.any_failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}


fn run_inspect(args: InputFilesArgs) -> ExitCode {
    let mut any_failed = false;
    for path in &args.input_files {
        let name = crate::queue::file_name_of(path);
        let data = match read_input(path) {
            Ok(d) => d,
            Err(e) => {
                any_failed = true;
                report_failure(&name, &e);
                continue;
            },
        };

        let size = format_file_size(data.len() as u64);
        let header = match Header::read(&data) {
            Ok(h) => h,
            Err(e) => {
                any_failed = true;
                report_failure(&name, &Error::from(e));
                continue;
            },
        };
        let format = header.format(&name);
        println!(
            "{} ({}): header {}{}, format {}, output {} as {}{}",
            name,
            size,
            header,
            if header.is_recognized() { "" } else { " (unrecognized)" },
            format.label(),
            output_file_name(&name, format),
            format.delivery().media_type(),
            if is_risky_file_name(&name) { ", risky" } else { "" },
        );
    }

    if any_failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}


fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .with_writer(std::io::stderr)
        .init();

    let mode = ProgMode::parse();
    match mode {
        ProgMode::Convert(args) => run_convert(args),
        ProgMode::Inspect(args) => run_inspect(args),
    }
}


#[cfg(test)]
mod tests {
    use super::{check_risky, convert_queue};
    use crate::queue::InputQueue;
    use flate2::Compression;
    use flate2::write::ZlibEncoder;
    use std::io::Write;
    use std::path::Path;
    use zbsave::BatchOptions;

    fn standard_save(json: &[u8]) -> Vec<u8> {
        let mut encoder = ZlibEncoder::new(b"ZB".to_vec(), Compression::default());
        encoder.write_all(json).unwrap();
        encoder.finish().unwrap()
    }

    fn dir_entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir).unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_risky_batch_refused() {
        let queue: InputQueue = ["save1.dat", "save2MP", "save3.mp"].into_iter().collect();
        assert_eq!(check_risky(&queue, false), Err(vec!["save2MP", "save3.mp"]));
        assert_eq!(check_risky(&queue, true), Ok(()));

        let safe: InputQueue = ["save1.dat", "save4.MP.bak"].into_iter().collect();
        assert_eq!(check_risky(&safe, false), Ok(()));
    }

    #[test]
    fn test_output_next_to_input() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("save1.dat");
        std::fs::write(&input, standard_save(b"{\"level\":3}")).unwrap();

        let queue: InputQueue = [&input].into_iter().collect();
        let report = convert_queue(&queue, &BatchOptions::sequential(), None);
        assert!(!report.any_failed);
        assert_eq!(report.lines, ["save1.dat \u{2192} save1.dat.json (JSON)"]);
        assert_eq!(std::fs::read(dir.path().join("save1.dat.json")).unwrap(), b"{\"level\":3}");
    }

    #[test]
    fn test_failed_conversion_writes_nothing() {
        let input_dir = tempfile::tempdir().unwrap();
        let output_dir = tempfile::tempdir().unwrap();
        let broken = input_dir.path().join("broken.sav");
        let good = input_dir.path().join("good.sav");
        std::fs::write(&broken, b"ZBthis is not zlib").unwrap();
        std::fs::write(&good, standard_save(b"{}")).unwrap();

        let queue: InputQueue = [&broken, &good].into_iter().collect();
        let report = convert_queue(&queue, &BatchOptions::default(), Some(output_dir.path()));
        assert!(report.any_failed);
        assert_eq!(report.lines.len(), 2);
        assert!(report.lines[0].starts_with("broken.sav: failed to decompress: "));
        assert_eq!(report.lines[1], "good.sav \u{2192} good.sav.json (JSON)");
        assert_eq!(dir_entries(output_dir.path()), ["good.sav.json"]);
    }

    #[test]
    fn test_unreadable_input_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.sav");
        let good = dir.path().join("good.sav");
        std::fs::write(&good, standard_save(b"{}")).unwrap();

        let queue: InputQueue = [&missing, &good].into_iter().collect();
        let report = convert_queue(&queue, &BatchOptions::sequential(), None);
        assert!(report.any_failed);
        assert!(report.lines[0].starts_with("missing.sav: I/O error on "));
        assert_eq!(report.lines[1], "good.sav \u{2192} good.sav.json (JSON)");
    }

    #[test]
    fn test_unwritable_output_fails() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("save1.dat");
        std::fs::write(&input, standard_save(b"{}")).unwrap();
        let nowhere = dir.path().join("does-not-exist");

        let queue: InputQueue = [&input].into_iter().collect();
        let report = convert_queue(&queue, &BatchOptions::sequential(), Some(&nowhere));
        assert!(report.any_failed);
        assert_eq!(report.lines.len(), 1);
        assert!(report.lines[0].starts_with("save1.dat: I/O error on "));
        assert!(!nowhere.exists());
    }
}
