use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::capture_buffer::CaptureBuffer;
use crate::models::config::RecorderConfiguration;
use crate::models::error::CaptureError;
use crate::models::state::RecorderState;
use crate::session::worker::SerialWorker;
use crate::storage::naming;
use crate::storage::raw_writer::RawPcmWriter;
use crate::traits::capture_source::SamplesReadyCallback;
use crate::traits::storage::StorageVolume;

type Sink = Arc<Mutex<RawPcmWriter>>;

/// Mutable recorder state, protected by `parking_lot::Mutex`.
///
/// Lock order is always state, then sink. The write worker only ever takes
/// the sink lock.
struct SessionState {
    is_running: bool,
    sink: Option<Sink>,
    output_file: Option<PathBuf>,
}

impl SessionState {
    fn new() -> Self {
        Self {
            is_running: false,
            sink: None,
            output_file: None,
        }
    }

    /// The sink the next write should go to, opening a file on first use.
    ///
    /// Returns `None` if not running or the file could not be created.
    fn try_open(&mut self, root: &Path, buffer: &CaptureBuffer, max_bytes: u64) -> Option<Sink> {
        if !self.is_running {
            return None;
        }
        if let Some(sink) = &self.sink {
            return Some(Arc::clone(sink));
        }

        let path = naming::new_recording_path(root, &buffer.format());
        match RawPcmWriter::create(path.clone(), max_bytes) {
            Ok(writer) => {
                log::info!("Opened file for recording: {}", path.display());
                let sink = Arc::new(Mutex::new(writer));
                self.sink = Some(Arc::clone(&sink));
                self.output_file = Some(path);
                Some(sink)
            }
            Err(e) => {
                log::error!("Failed to open audio output file: {}", e);
                None
            }
        }
    }

    /// Stop accepting buffers and close the current file, if any.
    fn try_close(&mut self) {
        self.is_running = false;
        if let Some(sink) = self.sink.take() {
            let mut writer = sink.lock();
            if let Err(e) = writer.close() {
                log::error!("Failed to close file with saved input audio: {}", e);
            }
            log::info!(
                "Closed {} after {} bytes",
                writer.file_path().display(),
                writer.bytes_written()
            );
        }
    }
}

/// Appends a single write to `sink`. Runs on the write worker.
///
/// A sink closed by `stop()` after the write was queued swallows it.
fn try_append(sink: &Mutex<RawPcmWriter>, payload: &[u8]) {
    let mut writer = sink.lock();
    if !writer.is_open() {
        log::debug!("Dropping {} bytes queued for a closed file", payload.len());
        return;
    }
    match writer.append(payload) {
        Ok(true) => {}
        Ok(false) => log::debug!("Size cap reached, dropping {} bytes", payload.len()),
        Err(e) => log::error!("Failed to write audio to file: {}", e),
    }
}

/// Records raw 16-bit PCM capture buffers to a file under a storage volume.
///
/// Buffers arrive through `append` (or `SamplesReadyCallback`) on the capture
/// thread. The decision to accept a buffer is made under the state lock;
/// the file write itself is handed to a serial worker so the capture thread
/// never blocks on I/O. Files are named after the format of the first
/// buffer received after `start()`.
///
/// I/O failures after `start()` are logged and swallowed: recording degrades
/// to producing no output rather than disturbing the capture pipeline.
///
/// ```text
/// [Capture thread] → append → [SessionState lock: running? file open?]
///                                      ↓
///                             [SerialWorker] → RawPcmWriter (capped)
/// ```
pub struct PcmFileRecorder {
    storage: Arc<dyn StorageVolume>,
    config: RecorderConfiguration,
    state: Mutex<SessionState>,
    worker: SerialWorker,
}

impl PcmFileRecorder {
    pub fn new(storage: Arc<dyn StorageVolume>, config: RecorderConfiguration) -> Result<Self, CaptureError> {
        config.validate().map_err(CaptureError::ConfigurationFailed)?;
        Ok(Self {
            storage,
            config,
            state: Mutex::new(SessionState::new()),
            worker: SerialWorker::spawn("pcm-file-writer")?,
        })
    }

    /// Start accepting buffers. Transitions: idle → running.
    ///
    /// Fails with `StorageUnavailable` if the storage volume is not writable,
    /// in which case nothing is created. The output file is opened lazily by
    /// the first accepted buffer.
    pub fn start(&self) -> Result<(), CaptureError> {
        if !self.storage.is_writable() {
            log::error!("Writing to {} is not possible", self.storage.root().display());
            return Err(CaptureError::StorageUnavailable);
        }
        self.state.lock().is_running = true;
        log::debug!("Recorder started");
        Ok(())
    }

    /// Stop recording and close the output file. Transitions: running/recording → idle.
    ///
    /// Writes already queued for the closed file are dropped. The file itself
    /// is left in place.
    pub fn stop(&self) {
        self.state.lock().try_close();
        log::debug!("Recorder stopped");
    }

    /// Offer one capture buffer to the recorder.
    ///
    /// Non-16-bit buffers are rejected whatever the state. Buffers arriving
    /// while idle are discarded silently.
    pub fn append(&self, buffer: CaptureBuffer) {
        if !buffer.is_pcm16() {
            log::error!("Invalid audio format: {} bits per sample", buffer.bits_per_sample);
            return;
        }

        let sink = {
            let mut state = self.state.lock();
            match state.try_open(self.storage.root(), &buffer, self.config.max_file_size_bytes) {
                Some(sink) => sink,
                None => return,
            }
        };

        let payload = buffer.payload;
        if !self.worker.post(move || try_append(&sink, &payload)) {
            log::error!("Write worker is gone, dropping buffer");
        }
    }

    /// Path of the most recently opened output file.
    pub fn current_file(&self) -> Option<PathBuf> {
        self.state.lock().output_file.clone()
    }

    /// Forget the most recently opened output path. Any open file stays open.
    pub fn reset(&self) {
        self.state.lock().output_file = None;
    }

    pub fn state(&self) -> RecorderState {
        let state = self.state.lock();
        match (&state.sink, state.is_running) {
            (Some(sink), true) => RecorderState::Recording {
                file_path: sink.lock().file_path().to_path_buf(),
            },
            (_, true) => RecorderState::Running,
            (_, false) => RecorderState::Idle,
        }
    }

    /// Bytes written to the currently open file; zero when no file is open.
    pub fn bytes_written(&self) -> u64 {
        let state = self.state.lock();
        state.sink.as_ref().map_or(0, |sink| sink.lock().bytes_written())
    }

    /// Block until every write queued so far has been applied (or dropped).
    pub fn wait_for_pending_writes(&self) {
        self.worker.wait_idle();
    }
}

impl SamplesReadyCallback for PcmFileRecorder {
    fn on_samples_ready(&self, buffer: CaptureBuffer) {
        self.append(buffer);
    }
}

impl Drop for PcmFileRecorder {
    fn drop(&mut self) {
        self.worker.wait_idle();
        self.state.lock().try_close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::capture_buffer::PcmFormat;
    use crate::traits::storage::LocalStorage;
    use std::fs;
    use std::thread;
    use std::time::Duration;
    use tempfile::TempDir;

    struct UnmountedStorage {
        root: PathBuf,
    }

    impl StorageVolume for UnmountedStorage {
        fn is_writable(&self) -> bool {
            false
        }

        fn root(&self) -> &Path {
            &self.root
        }
    }

    fn recorder_with_cap(max_file_size_bytes: u64) -> (TempDir, PcmFileRecorder) {
        let dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(LocalStorage::new(dir.path()));
        let recorder = PcmFileRecorder::new(storage, RecorderConfiguration { max_file_size_bytes }).unwrap();
        (dir, recorder)
    }

    fn recorder() -> (TempDir, PcmFileRecorder) {
        recorder_with_cap(RecorderConfiguration::default().max_file_size_bytes)
    }

    fn buffer(fill: u8, len: usize) -> CaptureBuffer {
        CaptureBuffer::new(PcmFormat::pcm16(48000, 1), vec![fill; len])
    }

    fn files_in(dir: &Path) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = fs::read_dir(dir).unwrap().map(|e| e.unwrap().path()).collect();
        files.sort();
        files
    }

    #[test]
    fn start_fails_on_unwritable_storage() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(UnmountedStorage {
            root: dir.path().to_path_buf(),
        });
        let recorder = PcmFileRecorder::new(storage, RecorderConfiguration::default()).unwrap();

        assert_eq!(recorder.start(), Err(CaptureError::StorageUnavailable));
        recorder.append(buffer(1, 100));
        recorder.wait_for_pending_writes();

        assert!(recorder.state().is_idle());
        assert!(recorder.current_file().is_none());
        assert!(files_in(dir.path()).is_empty());
    }

    #[test]
    fn start_does_not_open_a_file() {
        let (dir, recorder) = recorder();
        recorder.start().unwrap();

        assert_eq!(recorder.state(), RecorderState::Running);
        assert!(recorder.current_file().is_none());
        assert!(files_in(dir.path()).is_empty());
    }

    #[test]
    fn zero_cap_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(LocalStorage::new(dir.path()));
        let result = PcmFileRecorder::new(storage, RecorderConfiguration { max_file_size_bytes: 0 });
        assert!(matches!(result, Err(CaptureError::ConfigurationFailed(_))));
    }

    #[test]
    fn buffers_are_written_in_arrival_order() {
        let (_dir, recorder) = recorder();
        recorder.start().unwrap();

        let mut expected = Vec::new();
        for i in 0..20u8 {
            let payload = vec![i; 64 + i as usize * 2];
            expected.extend_from_slice(&payload);
            recorder.append(CaptureBuffer::new(PcmFormat::pcm16(48000, 1), payload));
        }
        recorder.wait_for_pending_writes();

        let path = recorder.current_file().unwrap();
        assert_eq!(recorder.bytes_written(), expected.len() as u64);
        recorder.stop();
        assert_eq!(fs::read(path).unwrap(), expected);
    }

    #[test]
    fn file_name_follows_first_buffer_format() {
        let (dir, recorder) = recorder();
        recorder.start().unwrap();

        recorder.append(CaptureBuffer::new(PcmFormat::pcm16(44100, 2), vec![0; 8]));
        recorder.append(CaptureBuffer::new(PcmFormat::pcm16(16000, 1), vec![0; 8]));
        recorder.wait_for_pending_writes();

        let path = recorder.current_file().unwrap();
        assert_eq!(path.parent(), Some(dir.path()));
        let name = path.file_name().unwrap().to_str().unwrap();
        let (_, format) = naming::parse_recording_file_name(name).unwrap();
        assert_eq!(format, PcmFormat::pcm16(44100, 2));
        assert_eq!(files_in(dir.path()).len(), 1);
        assert_eq!(recorder.state(), RecorderState::Recording { file_path: path });
    }

    #[test]
    fn cap_may_be_exceeded_by_one_buffer() {
        let (_dir, recorder) = recorder_with_cap(2500);
        recorder.start().unwrap();

        for i in 0..3 {
            recorder.append(buffer(i, 1000));
        }
        recorder.wait_for_pending_writes();
        // 2000 < 2500 when the third buffer is checked, so it lands whole
        assert_eq!(recorder.bytes_written(), 3000);

        recorder.append(buffer(9, 1000));
        recorder.wait_for_pending_writes();
        assert_eq!(recorder.bytes_written(), 3000);

        let path = recorder.current_file().unwrap();
        recorder.stop();
        let data = fs::read(path).unwrap();
        assert_eq!(data.len(), 3000);
        assert!(data[2000..].iter().all(|&b| b == 2));
    }

    #[test]
    fn wrong_bit_depth_is_rejected_in_any_state() {
        let (dir, recorder) = recorder();
        let eight_bit = CaptureBuffer::new(PcmFormat::new(48000, 1, 8), vec![0; 100]);

        recorder.append(eight_bit.clone());
        recorder.start().unwrap();
        recorder.append(eight_bit);
        recorder.wait_for_pending_writes();

        assert_eq!(recorder.state(), RecorderState::Running);
        assert_eq!(recorder.bytes_written(), 0);
        assert!(recorder.current_file().is_none());
        assert!(files_in(dir.path()).is_empty());
    }

    #[test]
    fn wrong_bit_depth_leaves_open_file_untouched() {
        let (_dir, recorder) = recorder();
        recorder.start().unwrap();
        recorder.append(buffer(1, 100));
        recorder.wait_for_pending_writes();
        let path = recorder.current_file().unwrap();

        recorder.append(CaptureBuffer::new(PcmFormat::new(48000, 1, 8), vec![9; 100]));
        recorder.append(CaptureBuffer::new(PcmFormat::new(48000, 1, 24), vec![9; 96]));
        recorder.wait_for_pending_writes();

        assert_eq!(recorder.bytes_written(), 100);
        assert_eq!(recorder.current_file(), Some(path.clone()));
        assert!(recorder.state().is_recording());
        recorder.stop();
        assert_eq!(fs::read(path).unwrap(), vec![1; 100]);
    }

    #[test]
    fn buffers_while_idle_are_discarded() {
        let (dir, recorder) = recorder();
        recorder.append(buffer(1, 100));
        recorder.wait_for_pending_writes();

        assert!(recorder.state().is_idle());
        assert!(files_in(dir.path()).is_empty());
    }

    #[test]
    fn stop_resets_counter_and_restart_opens_fresh_file() {
        let (dir, recorder) = recorder();
        recorder.start().unwrap();
        recorder.append(buffer(1, 100));
        recorder.wait_for_pending_writes();
        let first = recorder.current_file().unwrap();

        recorder.stop();
        assert_eq!(recorder.bytes_written(), 0);
        assert!(recorder.state().is_idle());
        // Stopping keeps the file and its path
        assert_eq!(recorder.current_file(), Some(first.clone()));

        recorder.append(buffer(2, 50));
        recorder.wait_for_pending_writes();
        assert_eq!(fs::read(&first).unwrap(), vec![1; 100]);

        // File names have millisecond resolution
        thread::sleep(Duration::from_millis(5));
        recorder.start().unwrap();
        recorder.append(buffer(3, 40));
        recorder.wait_for_pending_writes();

        let second = recorder.current_file().unwrap();
        assert_ne!(first, second);
        assert_eq!(recorder.bytes_written(), 40);
        recorder.stop();
        assert_eq!(fs::read(&second).unwrap(), vec![3; 40]);
        assert_eq!(files_in(dir.path()).len(), 2);
    }

    #[test]
    fn reset_forgets_path_but_keeps_recording() {
        let (_dir, recorder) = recorder();
        recorder.start().unwrap();
        recorder.append(buffer(1, 10));
        recorder.wait_for_pending_writes();
        let path = recorder.current_file().unwrap();

        recorder.reset();
        assert!(recorder.current_file().is_none());

        recorder.append(buffer(2, 10));
        recorder.wait_for_pending_writes();
        assert!(recorder.state().is_recording());
        assert_eq!(recorder.bytes_written(), 20);
        recorder.stop();
        assert_eq!(fs::metadata(path).unwrap().len(), 20);
    }

    #[test]
    fn open_failure_keeps_running_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("gone");
        fs::create_dir(&root).unwrap();
        let recorder =
            PcmFileRecorder::new(Arc::new(LocalStorage::new(&root)), RecorderConfiguration::default()).unwrap();
        recorder.start().unwrap();
        fs::remove_dir(&root).unwrap();

        recorder.append(buffer(1, 10));
        recorder.wait_for_pending_writes();

        assert_eq!(recorder.state(), RecorderState::Running);
        assert!(recorder.current_file().is_none());
        assert_eq!(recorder.bytes_written(), 0);
    }

    #[test]
    fn stop_racing_queued_writes_never_splits_a_buffer() {
        let (_dir, recorder) = recorder();
        recorder.start().unwrap();
        for i in 0..200u8 {
            recorder.append(buffer(i, 512));
        }
        recorder.stop();
        recorder.wait_for_pending_writes();

        let data = fs::read(recorder.current_file().unwrap()).unwrap();
        assert_eq!(data.len() % 512, 0);
        for (i, chunk) in data.chunks(512).enumerate() {
            assert!(chunk.iter().all(|&b| b == i as u8));
        }
    }

    #[test]
    fn recorded_file_converts_to_wav() {
        let (_dir, recorder) = recorder();
        recorder.start().unwrap();
        recorder.append(CaptureBuffer::from_samples(16000, 2, &[1, -1, 2, -2]));
        recorder.wait_for_pending_writes();
        recorder.stop();

        let result = crate::processing::pcm_to_wav::convert_recording(&recorder.current_file().unwrap()).unwrap();
        let wav = fs::read(&result.wav_path).unwrap();
        let header = crate::processing::wav_format::WavHeader::parse(&wav).unwrap();
        assert_eq!(header.format, PcmFormat::pcm16(16000, 2));
        assert_eq!(header.data_length, 8);
    }

    #[test]
    fn capture_thread_and_control_thread() {
        let (_dir, recorder) = recorder();
        let recorder = Arc::new(recorder);
        recorder.start().unwrap();

        let callback: Arc<dyn SamplesReadyCallback> = recorder.clone();
        let producer = thread::spawn(move || {
            for _ in 0..100 {
                callback.on_samples_ready(CaptureBuffer::from_samples(48000, 1, &[7; 240]));
            }
        });
        producer.join().unwrap();
        recorder.wait_for_pending_writes();

        assert_eq!(recorder.bytes_written(), 100 * 480);
        let path = recorder.current_file().unwrap();
        recorder.stop();
        assert_eq!(fs::metadata(path).unwrap().len(), 100 * 480);
    }
}
