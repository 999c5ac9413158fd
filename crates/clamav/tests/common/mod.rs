use std::path::{Path, PathBuf};
use std::sync::Mutex;

use relik_core::input::InputFile;
use relik_core::process::{CommandOutput, CommandRunner};
use relik_clamav::ClamavSettings;

type Responder = Box<dyn Fn(&[String]) -> std::io::Result<CommandOutput> + Send + Sync>;

/// A single recorded invocation.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub argv: Vec<String>,
    /// Contents of the `--config-file` argument at call time, if any.
    pub config_file: Option<(PathBuf, String)>,
}

impl RecordedCall {
    pub fn program(&self) -> &str {
        &self.argv[0]
    }
}

/// [`CommandRunner`] that records every argv and answers from a closure
/// instead of spawning ClamAV.
pub struct FakeRunner {
    responder: Responder,
    calls: Mutex<Vec<RecordedCall>>,
}

impl FakeRunner {
    pub fn new(
        responder: impl Fn(&[String]) -> std::io::Result<CommandOutput> + Send + Sync + 'static,
    ) -> Self {
        Self {
            responder: Box::new(responder),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// freshclam succeeds; clamscan reports every target clean.
    pub fn all_clean() -> Self {
        Self::new(|_| Ok(CommandOutput::new(0, "", "")))
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().expect("calls lock").clone()
    }
}

impl CommandRunner for FakeRunner {
    async fn run(&self, argv: &[String]) -> std::io::Result<CommandOutput> {
        let config_file = argv
            .iter()
            .position(|a| a == "--config-file")
            .and_then(|i| argv.get(i + 1))
            .map(|p| {
                let path = PathBuf::from(p);
                let contents = std::fs::read_to_string(&path).unwrap_or_default();
                (path, contents)
            });

        self.calls.lock().expect("calls lock").push(RecordedCall {
            argv: argv.to_vec(),
            config_file,
        });

        (self.responder)(argv)
    }
}

/// Settings with no default database paths, so tests only see the
/// directories they create.
pub fn test_settings() -> ClamavSettings {
    ClamavSettings {
        default_database_paths: Vec::new(),
        ..ClamavSettings::default()
    }
}

/// Create a file under `dir` and return it as a task input.
pub fn write_input(dir: &Path, name: &str, contents: &str) -> InputFile {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("write input file");
    InputFile::new(path.to_string_lossy(), name)
}

/// Number of entries in a directory.
pub fn dir_entry_count(dir: &Path) -> usize {
    std::fs::read_dir(dir).expect("read output dir").count()
}
