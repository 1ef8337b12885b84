use anyhow::{Context, Result};
use std::path::PathBuf;

pub(crate) const DATA_FILE_NAME: &str = "transactions.csv";

pub(crate) struct Config {
    /// CSV file holding every transaction.
    pub(crate) data_file: PathBuf,
}

impl Config {
    /// Consume a global `--file <path>` flag from `args`. Without one the
    /// file lives in the per-user data directory, which is created if needed.
    pub(crate) fn from_args(args: &mut Vec<String>) -> Result<Self> {
        let data_file = match take_flag(args, "--file")? {
            Some(path) => PathBuf::from(shellexpand(&path)),
            None => default_data_file()?,
        };
        Ok(Self { data_file })
    }
}

/// Remove `flag` and its value from `args`, returning the value.
pub(crate) fn take_flag(args: &mut Vec<String>, flag: &str) -> Result<Option<String>> {
    let Some(pos) = args.iter().position(|a| a == flag) else {
        return Ok(None);
    };
    if pos + 1 >= args.len() {
        anyhow::bail!("{flag} needs a value");
    }
    let value = args.remove(pos + 1);
    args.remove(pos);
    Ok(Some(value))
}

fn default_data_file() -> Result<PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("com", "fintrack", "fintrack")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    let data_dir = proj_dirs.data_dir();
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;
    Ok(data_dir.join(DATA_FILE_NAME))
}

pub(crate) fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        format!("{home}/{rest}")
    } else {
        path.to_string()
    }
}
