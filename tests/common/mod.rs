use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use anyhow::Result;

#[allow(dead_code)]
pub const SAMPLE_LOG: &str = "\
09:15:30,Database Backup,START,PID001
09:16:00,Report Export,START,PID002
09:17:45,Database Backup,END,PID001
09:22:00,Report Export,END,PID002
10:00:00,Index Rebuild,START,PID003
10:11:30,Index Rebuild,END,PID003
11:00:00,Cache Warmup,START,PID004
11:05:00,Orphan Cleanup,END,PID005
";

pub fn create_test_log(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

#[allow(dead_code)]
pub fn setup_test_environment() -> Result<(TempDir, PathBuf)> {
    let temp_dir = TempDir::new()?;
    let path = create_test_log(temp_dir.path(), "jobs.log", SAMPLE_LOG)?;
    Ok((temp_dir, path))
}
