//! Run a command while mirroring its output into a timestamped log file.

use anyhow::{Context, Result};
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::sync::{Arc, Mutex};
use std::thread;

#[derive(Debug)]
pub struct RunOutcome {
    pub log_path: PathBuf,
    pub status: ExitStatus,
}

#[derive(Debug, Clone)]
pub struct RunLog {
    log_dir: PathBuf,
    echo: bool,
}

impl RunLog {
    /// `echo` mirrors output to the terminal as well as the log.
    pub fn new(log_dir: impl Into<PathBuf>, echo: bool) -> Self {
        Self {
            log_dir: log_dir.into(),
            echo,
        }
    }

    pub fn run(&self, program: &str, args: &[OsString]) -> Result<RunOutcome> {
        fs::create_dir_all(&self.log_dir)
            .with_context(|| format!("Failed to create log directory {:?}", self.log_dir))?;
        let log_path = self.log_path(program);
        let mut log = File::create(&log_path)
            .with_context(|| format!("Failed to create log file {:?}", log_path))?;

        let rendered: Vec<String> = std::iter::once(program.to_string())
            .chain(args.iter().map(|arg| arg.to_string_lossy().into_owned()))
            .collect();
        writeln!(log, "$ {}", rendered.join(" "))?;
        writeln!(log, "# started {}", chrono::Local::now().to_rfc3339())?;

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("Failed to run '{}'", program))?;

        let log = Arc::new(Mutex::new(log));
        let stdout = child.stdout.take().context("child stdout was not captured")?;
        let stderr = child.stderr.take().context("child stderr was not captured")?;
        let echo = self.echo;
        let readers = [
            spawn_mirror(stdout, Arc::clone(&log), echo.then(|| Box::new(io::stdout()) as Sink)),
            spawn_mirror(stderr, Arc::clone(&log), echo.then(|| Box::new(io::stderr()) as Sink)),
        ];

        let status = child
            .wait()
            .with_context(|| format!("Failed to wait for '{}'", program))?;
        for reader in readers {
            reader
                .join()
                .map_err(|_| anyhow::anyhow!("output mirror thread panicked"))?
                .context("Failed to mirror command output")?;
        }

        let mut log = log
            .lock()
            .map_err(|_| anyhow::anyhow!("log file lock poisoned"))?;
        writeln!(log, "# finished {} ({status})", chrono::Local::now().to_rfc3339())?;
        log.flush()?;
        tracing::debug!(log = %log_path.display(), %status, "command finished");

        Ok(RunOutcome { log_path, status })
    }

    fn log_path(&self, program: &str) -> PathBuf {
        let name = Path::new(program)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "command".to_string());
        let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S%.3f");
        self.log_dir.join(format!("{name}-{stamp}.log"))
    }
}

type Sink = Box<dyn Write + Send>;

fn spawn_mirror<R>(
    source: R,
    log: Arc<Mutex<File>>,
    mut sink: Option<Sink>,
) -> thread::JoinHandle<io::Result<()>>
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        let mut reader = BufReader::new(source);
        let mut line = Vec::new();
        loop {
            line.clear();
            if reader.read_until(b'\n', &mut line)? == 0 {
                return Ok(());
            }
            {
                let mut log = log
                    .lock()
                    .map_err(|_| io::Error::other("log file lock poisoned"))?;
                log.write_all(&line)?;
            }
            if let Some(sink) = sink.as_mut() {
                sink.write_all(&line)?;
                sink.flush()?;
            }
        }
    })
}
