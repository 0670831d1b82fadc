//! Host capabilities the results are exported through: file saving and the
//! system clipboard.

use std::path::PathBuf;

use scout_core::{ExportOutcome, SearchError};
use scout_engine::AtomicFileWriter;
use scout_logging::{scout_info, scout_warn};

pub trait Clipboard {
    fn set_text(&mut self, text: String) -> Result<(), String>;

    /// Called once before the process exits. Blocks while the copied text
    /// still depends on this process being alive.
    fn hand_over(&mut self) {}
}

/// System clipboard. The handle is opened lazily and kept open.
///
/// On Linux (X11 and XWayland) the selection is served by its owner, so the
/// copied text would vanish with the process unless a clipboard manager or
/// another application takes it over first; `hand_over` waits for that.
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
    #[cfg(target_os = "linux")]
    pending: Option<String>,
}

impl Clipboard for SystemClipboard {
    fn set_text(&mut self, text: String) -> Result<(), String> {
        if self.inner.is_none() {
            self.inner = Some(arboard::Clipboard::new().map_err(|err| err.to_string())?);
        }
        let clipboard = self
            .inner
            .as_mut()
            .ok_or_else(|| "clipboard unavailable".to_string())?;

        #[cfg(target_os = "linux")]
        let kept = text.clone();
        clipboard.set_text(text).map_err(|err| err.to_string())?;
        #[cfg(target_os = "linux")]
        {
            self.pending = Some(kept);
        }
        Ok(())
    }

    #[cfg(target_os = "linux")]
    fn hand_over(&mut self) {
        use arboard::SetExtLinux;

        let (Some(clipboard), Some(text)) = (self.inner.as_mut(), self.pending.take()) else {
            return;
        };
        scout_info!("Serving the clipboard until another application takes it");
        if let Err(err) = clipboard.set().wait().text(text) {
            scout_warn!("Clipboard hand-over failed: {}", err);
        }
    }
}

pub struct Host<C: Clipboard> {
    writer: AtomicFileWriter,
    clipboard: C,
}

impl<C: Clipboard> Host<C> {
    pub fn new(output_dir: PathBuf, clipboard: C) -> Self {
        Self {
            writer: AtomicFileWriter::new(output_dir),
            clipboard,
        }
    }

    #[cfg(test)]
    pub(crate) fn clipboard(&self) -> &C {
        &self.clipboard
    }

    pub fn save_file(&self, filename: &str, contents: &str) -> ExportOutcome {
        match self.writer.write(filename, contents) {
            Ok(path) => {
                scout_info!("Saved {} bytes to {:?}", contents.len(), path);
                ExportOutcome::CsvSaved { path }
            }
            Err(err) => {
                scout_warn!(
                    "Failed to save {} in {:?}: {}",
                    filename,
                    self.writer.dir(),
                    err
                );
                ExportOutcome::Failed(SearchError::Export(err.to_string()))
            }
        }
    }

    pub fn hand_over_clipboard(&mut self) {
        self.clipboard.hand_over();
    }

    pub fn copy_text(&mut self, text: String) -> ExportOutcome {
        let len = text.len();
        match self.clipboard.set_text(text) {
            Ok(()) => {
                scout_info!("Copied {} bytes to the clipboard", len);
                ExportOutcome::Copied
            }
            Err(err) => {
                scout_warn!("Clipboard write failed: {}", err);
                ExportOutcome::Failed(SearchError::Export(format!("clipboard: {err}")))
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    /// Records clipboard writes and hand-overs, optionally failing writes.
    #[derive(Default)]
    pub(crate) struct FakeClipboard {
        pub(crate) texts: Vec<String>,
        pub(crate) handed_over: Vec<String>,
        pub(crate) fail: bool,
    }

    impl Clipboard for FakeClipboard {
        fn set_text(&mut self, text: String) -> Result<(), String> {
            if self.fail {
                return Err("no display".into());
            }
            self.texts.push(text);
            Ok(())
        }

        fn hand_over(&mut self) {
            if let Some(text) = self.texts.last() {
                self.handed_over.push(text.clone());
            }
        }
    }

    #[test]
    fn save_file_reports_saved_path() {
        let temp = TempDir::new().unwrap();
        let host = Host::new(temp.path().to_path_buf(), FakeClipboard::default());

        let outcome = host.save_file("search_results.csv", "Title,URL,Date");
        let expected = temp.path().join("search_results.csv");
        assert_eq!(outcome, ExportOutcome::CsvSaved { path: expected.clone() });
        assert_eq!(fs::read_to_string(expected).unwrap(), "Title,URL,Date");
    }

    #[test]
    fn save_file_failure_becomes_export_error() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("file");
        fs::write(&blocker, "x").unwrap();
        let host = Host::new(blocker, FakeClipboard::default());

        let outcome = host.save_file("search_results.csv", "Title,URL,Date");
        assert!(matches!(
            outcome,
            ExportOutcome::Failed(SearchError::Export(_))
        ));
    }

    #[test]
    fn clipboard_failure_becomes_export_error() {
        let temp = TempDir::new().unwrap();
        let mut host = Host::new(
            temp.path().to_path_buf(),
            FakeClipboard {
                fail: true,
                ..FakeClipboard::default()
            },
        );

        assert_eq!(
            host.copy_text("Title: A\n".into()),
            ExportOutcome::Failed(SearchError::Export("clipboard: no display".into()))
        );
    }

    #[test]
    fn hand_over_is_a_no_op_without_a_copy() {
        let temp = TempDir::new().unwrap();
        let mut host = Host::new(temp.path().to_path_buf(), FakeClipboard::default());

        host.hand_over_clipboard();
        assert!(host.clipboard().handed_over.is_empty());
    }
}
