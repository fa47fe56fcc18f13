mod tone;

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use pcm_capture_core::models::recording_info::format_duration;
use pcm_capture_core::storage::metadata;
use pcm_capture_core::{
    convert_recording, CaptureError, CaptureSource, ConversionResult, LocalStorage, PcmFileRecorder, PcmFormat,
    RecorderConfiguration, RecordingMetadata,
};

use tone::ToneSource;

const USAGE: &str = "usage:
  pcm-capture-demo record <dir> [seconds]   record a 440 Hz tone, then convert it to WAV
  pcm-capture-demo convert <file.pcm>       convert a recording to WAV next to it";

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let result = match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        ["record", dir] => record(Path::new(dir), 3),
        ["record", dir, seconds] => match seconds.parse() {
            Ok(seconds) => record(Path::new(dir), seconds),
            Err(_) => Err(CaptureError::InvalidInput(format!("not a number of seconds: {}", seconds))),
        },
        ["convert", file] => convert(Path::new(file)),
        _ => {
            eprintln!("{}", USAGE);
            return ExitCode::from(2);
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn record(dir: &Path, seconds: u64) -> Result<(), CaptureError> {
    let recorder = Arc::new(PcmFileRecorder::new(
        Arc::new(LocalStorage::new(dir)),
        RecorderConfiguration::default(),
    )?);
    let mut source = ToneSource::new(PcmFormat::pcm16(48000, 1), 440.0);

    recorder.start()?;
    source.start(recorder.clone())?;
    thread::sleep(Duration::from_secs(seconds));
    source.stop()?;

    recorder.wait_for_pending_writes();
    let written = recorder.bytes_written();
    recorder.stop();

    let raw = recorder
        .current_file()
        .ok_or_else(|| CaptureError::StorageError("no recording file was opened".into()))?;
    println!("Recorded {} bytes to {}", written, raw.display());
    convert(&raw)
}

fn convert(raw: &Path) -> Result<(), CaptureError> {
    let result = convert_recording(raw)?;
    let sidecar = metadata::write_metadata(&RecordingMetadata::from_conversion(&result), &result.wav_path)?;
    print_summary(&result, &sidecar);
    Ok(())
}

fn print_summary(result: &ConversionResult, sidecar: &Path) {
    println!("WAV:      {}", result.wav_path.display());
    println!(
        "Format:   {} Hz, {} ch, {} bit",
        result.format.sample_rate, result.format.channels, result.format.bit_depth
    );
    println!("Duration: {}", format_duration((result.duration_secs * 1000.0) as u64));
    println!("SHA-256:  {}", result.checksum);
    println!("Metadata: {}", sidecar.display());
}
