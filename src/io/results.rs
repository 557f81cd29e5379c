//! CSV output of sweep results

use color_eyre::eyre::{Result, WrapErr};
use ising_sweep::SweepResult;
use std::path::Path;

/// Write one `T,M,U` row per result, in the order given.
pub fn write_results<P: AsRef<Path>>(path: P, results: &[SweepResult]) -> Result<()> {
    let path = path.as_ref();
    let mut writer = csv::Writer::from_path(path)
        .wrap_err_with(|| format!("Unable to create results file: {}", path.display()))?;
    for result in results {
        writer
            .serialize(result)
            .wrap_err("Failed to write sweep result")?;
    }
    writer
        .flush()
        .wrap_err_with(|| format!("Unable to flush results file: {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_results_file_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        let results = [
            SweepResult {
                temperature: 0.5,
                magnetization: 16.0,
                energy: -32.0,
            },
            SweepResult {
                temperature: 2.5,
                magnetization: 3.25,
                energy: -10.5,
            },
        ];

        write_results(&path, &results).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines, vec!["T,M,U", "0.5,16.0,-32.0", "2.5,3.25,-10.5"]);
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("data.csv");
        assert!(write_results(&path, &[]).is_err());
    }
}
