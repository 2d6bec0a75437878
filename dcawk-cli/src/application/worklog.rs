use std::fs::File;
use std::io::Write as _;
use std::path::Path;

use dcawk_core::error::Result;
use time::OffsetDateTime;

const BAR: &str = "============================================================";

fn timestamp() -> String {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    format!(
        "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
        now.year(),
        u8::from(now.month()),
        now.day(),
        now.hour(),
        now.minute(),
        now.second()
    )
}

/// Append-style plain-text run log: a header block, then timestamped
/// sections with free-form status lines.
pub struct RunLog {
    file: File,
}

impl RunLog {
    pub fn create(path: &Path) -> Result<Self> {
        let mut file = File::create(path)?;
        writeln!(file, "{BAR}")?;
        writeln!(file, "DCA WORKFLOW RUN LOG")?;
        writeln!(file, "{BAR}")?;
        writeln!(file, "Started: {}", timestamp())?;
        if let Ok(cwd) = std::env::current_dir() {
            writeln!(file, "Working directory: {}", cwd.display())?;
        }
        writeln!(file, "{BAR}")?;
        writeln!(file)?;
        Ok(Self { file })
    }

    pub fn section(&mut self, title: &str) -> Result<()> {
        writeln!(self.file, "\n{BAR}")?;
        writeln!(self.file, "{title}")?;
        writeln!(self.file, "Timestamp: {}", timestamp())?;
        writeln!(self.file, "{BAR}")?;
        Ok(())
    }

    pub fn line(&mut self, text: &str) -> Result<()> {
        writeln!(self.file, "{text}")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_holds_header_sections_and_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.log");
        {
            let mut log = RunLog::create(&path).unwrap();
            log.section("FETCH PRODUCTION").unwrap();
            log.line("Status: SUCCESS").unwrap();
        }
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("DCA WORKFLOW RUN LOG"));
        assert!(text.contains("FETCH PRODUCTION"));
        assert!(text.contains("Status: SUCCESS"));
    }

    #[test]
    fn timestamp_is_second_resolution() {
        let ts = timestamp();
        assert_eq!(ts.len(), 19);
        assert_eq!(&ts[10..11], " ");
    }
}
