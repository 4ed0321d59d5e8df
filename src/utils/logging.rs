use crate::core::message::Message;
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Plain-text transcript log, appended to as messages arrive.
pub struct LoggingState {
    file_path: Option<String>,
}

impl LoggingState {
    /// When a path is given it is opened once up front so a bad path is
    /// reported before the terminal switches to the alternate screen.
    pub fn new(log_file: Option<String>) -> Result<Self, Box<dyn std::error::Error>> {
        if let Some(path) = &log_file {
            Self::test_file_access(path)?;
        }

        Ok(LoggingState {
            file_path: log_file,
        })
    }

    pub fn is_active(&self) -> bool {
        self.file_path.is_some()
    }

    pub fn log_message(&self, content: &str) -> Result<(), Box<dyn std::error::Error>> {
        let Some(file_path) = self.file_path.as_ref() else {
            return Ok(());
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(file_path)?;
        let mut writer = BufWriter::new(file);

        for line in content.lines() {
            writeln!(writer, "{line}")?;
        }
        // Blank line between entries, matching the on-screen spacing
        writeln!(writer)?;

        writer.flush()?;
        Ok(())
    }

    /// User lines carry a `You:` prefix; assistant text is written as-is.
    pub fn log_transcript_message(&self, message: &Message) -> Result<(), Box<dyn std::error::Error>> {
        if message.is_user() {
            self.log_message(&format!("You: {}", message.content))
        } else {
            self.log_message(&message.content)
        }
    }

    /// Section markers such as session starts and persona switches.
    pub fn log_marker(&self, text: &str) -> Result<(), Box<dyn std::error::Error>> {
        self.log_message(&format!("## {text}"))
    }

    pub fn get_status_string(&self) -> String {
        match &self.file_path {
            None => "disabled".to_string(),
            Some(path) => format!(
                "active ({})",
                Path::new(path)
                    .file_name()
                    .unwrap_or_default()
                    .to_string_lossy()
            ),
        }
    }

    fn test_file_access(path: &str) -> Result<(), Box<dyn std::error::Error>> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        file.flush()?;
        Ok(())
    }
}
