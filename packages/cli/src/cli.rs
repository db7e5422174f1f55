use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::info;
use ufs::{
    create_lock_file, default_etc_hosts, read_lock_file, short_description, work_dir, Credentials,
    LockRecord, Ufs,
};

/// ufs - read local and remote files, inspect URLs and manage lock files
#[derive(Parser, Debug)]
#[command(name = "ufs")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Download timeout in seconds (0 uses the transport default)
    #[arg(long, default_value_t = 0, global = true)]
    pub timeout_secs: u64,

    /// User name for remote downloads
    #[arg(long, global = true)]
    pub user: Option<String>,

    /// Password for remote downloads
    #[arg(long, global = true)]
    pub password: Option<String>,

    /// Bearer token for remote downloads
    #[arg(long, global = true)]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write a local or remote file to stdout
    Cat { url: String },

    /// Print the directory relative references in URL resolve against
    Workdir {
        url: String,
        /// Directory used for remote URLs and bare file names [default: current directory]
        #[arg(long)]
        default_dir: Option<PathBuf>,
    },

    /// Print the log-safe short form of a URL
    Describe { url: String },

    /// Print the location of this platform's hosts file
    Hosts,

    /// Take a single-instance lock, hold it, then release it
    Lock {
        file: PathBuf,
        /// JSON payload stored next to the PID
        #[arg(long, default_value = "null")]
        data: String,
        /// Seconds to hold the lock before releasing it
        #[arg(long, default_value_t = 0)]
        hold_secs: u64,
    },

    /// Print the record stored in a lock file
    ReadLock { file: PathBuf },
}

#[derive(thiserror::Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Ufs(#[from] ufs::Error),

    #[error("invalid --data JSON: {0}")]
    Data(#[source] serde_json::Error),

    #[error("{0}")]
    Io(#[from] io::Error),
}

impl Args {
    /// Credentials assembled from `--user`, `--password` and `--token`.
    pub fn credentials(&self) -> Option<Arc<Credentials>> {
        let creds = Credentials {
            user: self.user.clone(),
            password: self.password.clone(),
            token: self.token.clone(),
            ..Default::default()
        };
        (!creds.is_empty()).then(|| Arc::new(creds))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

pub fn run(args: &Args, out: &mut dyn Write) -> Result<(), CliError> {
    match &args.command {
        Command::Cat { url } => {
            let ufs = Ufs::os()?;
            let file = ufs.file(url, args.credentials(), args.timeout())?;
            let mut content = file.download()?;
            let copied = io::copy(&mut content.blob, out)?;
            info!(url = %short_description(url), bytes = copied, "done");
        }
        Command::Workdir { url, default_dir } => {
            let default_dir = match default_dir {
                Some(dir) => dir.clone(),
                None => std::env::current_dir()?,
            };
            writeln!(out, "{}", work_dir(url, default_dir).display())?;
        }
        Command::Describe { url } => {
            writeln!(out, "{}", short_description(url))?;
        }
        Command::Hosts => {
            writeln!(out, "{}", default_etc_hosts()?.display())?;
        }
        Command::Lock {
            file,
            data,
            hold_secs,
        } => {
            let data: serde_json::Value = serde_json::from_str(data).map_err(CliError::Data)?;
            let lock = create_lock_file(file, &data)?;
            writeln!(out, "locked {} (pid {})", lock.path().display(), lock.pid())?;
            out.flush()?;

            if *hold_secs > 0 {
                thread::sleep(Duration::from_secs(*hold_secs));
            }
            lock.release()?;
        }
        Command::ReadLock { file } => {
            let record: LockRecord = read_lock_file(file)?;
            let json = serde_json::json!({ "pid": record.pid, "data": record.data });
            writeln!(out, "{json}")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn run_args(argv: &[&str]) -> Result<String, CliError> {
        let args = Args::try_parse_from(argv).unwrap();
        let mut out = Vec::new();
        run(&args, &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn describe_shortens() {
        let out = run_args(&["ufs", "describe", "SFTP://ABC/12345678.hosts"]).unwrap();
        assert_eq!(out, "SFTP://ABC...12345678.hosts\n");
    }

    #[test]
    fn workdir_uses_default_dir() {
        let out = run_args(&["ufs", "workdir", "http://x/y", "--default-dir", "D"]).unwrap();
        assert_eq!(out, "D\n");
    }

    #[test]
    fn cat_prints_local_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hello.txt");
        std::fs::write(&path, "hi there").unwrap();

        let out = run_args(&["ufs", "cat", path.to_str().unwrap()]).unwrap();
        assert_eq!(out, "hi there");
    }

    #[test]
    fn cat_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.txt");

        let err = run_args(&["ufs", "cat", path.to_str().unwrap()]).unwrap_err();
        assert!(matches!(err, CliError::Ufs(ufs::Error::NotFound { .. })));
    }

    #[test]
    fn lock_then_read_lock() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.lock");
        let path = path.to_str().unwrap();

        let out = run_args(&["ufs", "lock", path, "--data", r#"{"port":80}"#]).unwrap();
        assert!(out.starts_with("locked "));

        let out = run_args(&["ufs", "read-lock", path]).unwrap();
        let value: serde_json::Value = serde_json::from_str(out.trim()).unwrap();
        assert_eq!(value["pid"], std::process::id());
        assert_eq!(value["data"]["port"], 80);
    }

    #[test]
    fn bad_lock_data_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.lock");

        let err =
            run_args(&["ufs", "lock", path.to_str().unwrap(), "--data", "{oops"]).unwrap_err();
        assert!(matches!(err, CliError::Data(_)));
    }

    #[test]
    fn credentials_only_when_given() {
        let args = Args::try_parse_from(["ufs", "describe", "x"]).unwrap();
        assert!(args.credentials().is_none());

        let args = Args::try_parse_from(["ufs", "--token", "t", "describe", "x"]).unwrap();
        assert_eq!(args.credentials().unwrap().token.as_deref(), Some("t"));

        let args =
            Args::try_parse_from(["ufs", "cat", "x", "--user", "u", "--password", "p", "-vv"])
                .unwrap();
        let creds = args.credentials().unwrap();
        assert_eq!(creds.user.as_deref(), Some("u"));
        assert_eq!(creds.password.as_deref(), Some("p"));
        assert_eq!(args.verbose, 2);
    }
}
