use std::io::{self, Read, Write};

use crate::error::ModuleError;

/// Per-connection state owned by exactly one ModuleWorker
pub struct ModuleSession<R, W> {
    reader: R,
    writer: W,
    label: String,
    module_name: Option<String>,
    open: bool,
}

impl<R: Read, W: Write> ModuleSession<R, W> {
    /// `label` identifies the connection in logs until the module has
    /// announced its name (usually the peer address)
    pub fn new(reader: R, writer: W, label: impl Into<String>) -> Self {
        Self {
            reader,
            writer,
            label: label.into(),
            module_name: None,
            open: true,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn module_name(&self) -> Option<&str> {
        self.module_name.as_deref()
    }

    /// Module name if known, connection label otherwise
    pub fn display_name(&self) -> &str {
        self.module_name.as_deref().unwrap_or(&self.label)
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub(crate) fn set_module_name(&mut self, name: String) {
        self.module_name = Some(name);
    }

    pub(crate) fn reader(&mut self) -> &mut R {
        &mut self.reader
    }

    pub(crate) fn writer(&mut self) -> &mut W {
        &mut self.writer
    }

    /// Reads one byte, or `None` if the peer closed the stream cleanly
    pub(crate) fn read_first_byte(&mut self) -> io::Result<Option<u8>> {
        let mut byte = [0u8; 1];
        loop {
            match self.reader.read(&mut byte) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(byte[0])),
                Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
                Err(error) => return Err(error),
            }
        }
    }

    /// Sends a fully encoded frame in one write
    pub(crate) fn send(&mut self, frame: &[u8]) -> io::Result<()> {
        self.writer.write_all(frame)?;
        self.writer.flush()
    }

    /// Flushes anything still buffered; the underlying connection closes
    /// when the session is dropped
    pub(crate) fn close(&mut self) {
        if !self.open {
            return;
        }
        self.open = false;
        if let Err(error) = self.writer.flush() {
            log::debug!("Flush on close of '{}' failed: {}", self.display_name(), error);
        }
    }

    pub fn into_parts(self) -> (R, W) {
        (self.reader, self.writer)
    }
}

/// How a module session ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEnd {
    /// Module sent the exit command
    Exited,
    /// Module closed the connection between two commands
    Disconnected,
    /// Session was closed because of an error
    Failed(ModuleError),
}

/// Summary returned by ModuleWorker::run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOutcome {
    /// Name announced during the handshake, if it got that far
    pub module_name: Option<String>,
    /// Commands that completed, results included
    pub commands_served: u64,
    pub end: SessionEnd,
}

impl SessionOutcome {
    pub fn is_graceful(&self) -> bool {
        !matches!(self.end, SessionEnd::Failed(_))
    }

    pub fn error(&self) -> Option<&ModuleError> {
        match &self.end {
            SessionEnd::Failed(error) => Some(error),
            _ => None,
        }
    }
}
