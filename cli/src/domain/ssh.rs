//! OpenSSH argument construction for the Pi connection.
//!
//! Pure functions: the infra layer spawns the processes.

use crate::domain::config::PiConfig;

/// OpenSSH exit status for connection and authentication failures.
pub const SSH_CONNECTION_FAILURE: i32 = 255;

/// `sshpass` exit status when the password is rejected.
pub const SSHPASS_WRONG_PASSWORD: i32 = 5;

/// `sshpass` exit status when the host key is unknown.
pub const SSHPASS_HOST_KEY_UNKNOWN: i32 = 6;

/// Reason for a client exit status that means no session was established.
///
/// `sshpass` passes the remote exit status through, so under password auth
/// only its own auth statuses are treated as connection failures.
#[must_use]
pub fn connection_failure(auth: &SshAuth, exit_code: i32) -> Option<&'static str> {
    match (auth, exit_code) {
        (_, SSH_CONNECTION_FAILURE) => Some("ssh exited with status 255"),
        (SshAuth::Password(_), SSHPASS_WRONG_PASSWORD) => Some("password rejected"),
        (SshAuth::Password(_), SSHPASS_HOST_KEY_UNKNOWN) => Some("host key unknown"),
        _ => None,
    }
}

/// Seconds before `ssh`/`sftp` give up on the TCP connect.
pub const CONNECT_TIMEOUT_SECS: u32 = 10;

/// How the client authenticates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SshAuth {
    /// Explicit private key (`-i`).
    Key(String),
    /// Password fed to `sshpass` through its environment.
    Password(String),
    /// Whatever the local agent and default keys offer.
    Default,
}

/// Resolved connection target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshTarget {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub auth: SshAuth,
}

impl SshTarget {
    /// `key_path` takes precedence over `password`.
    #[must_use]
    pub fn from_config(cfg: &PiConfig) -> Self {
        let auth = match (&cfg.key_path, &cfg.password) {
            (Some(key), _) if !key.trim().is_empty() => SshAuth::Key(expand_home(key)),
            (_, Some(pw)) if !pw.is_empty() => SshAuth::Password(pw.clone()),
            _ => SshAuth::Default,
        };
        Self {
            host: cfg.host.clone(),
            port: cfg.port,
            username: cfg.username.clone(),
            auth,
        }
    }

    /// `user@host`, as shown in messages and passed to the client.
    #[must_use]
    pub fn destination(&self) -> String {
        format!("{}@{}", self.username, self.host)
    }

    /// Options shared by `ssh` and `sftp`.
    fn common_options(&self) -> Vec<String> {
        let mut args = vec![
            "-o".to_string(),
            "StrictHostKeyChecking=accept-new".to_string(),
            "-o".to_string(),
            format!("ConnectTimeout={CONNECT_TIMEOUT_SECS}"),
        ];
        match &self.auth {
            SshAuth::Key(path) => {
                args.extend(["-i".to_string(), path.clone()]);
                args.extend(["-o".to_string(), "BatchMode=yes".to_string()]);
            }
            SshAuth::Password(_) => {
                args.extend(["-o".to_string(), "BatchMode=no".to_string()]);
                args.extend([
                    "-o".to_string(),
                    "PreferredAuthentications=password,keyboard-interactive".to_string(),
                ]);
            }
            SshAuth::Default => {
                args.extend(["-o".to_string(), "BatchMode=yes".to_string()]);
            }
        }
        args
    }

    /// Arguments for `ssh` running `command` in the remote login shell.
    #[must_use]
    pub fn ssh_args(&self, command: &str) -> Vec<String> {
        let mut args = self.common_options();
        args.extend(["-p".to_string(), self.port.to_string()]);
        args.push(self.destination());
        args.push(command.to_string());
        args
    }

    /// Arguments for `sftp` reading its batch from stdin.
    #[must_use]
    pub fn sftp_args(&self) -> Vec<String> {
        let mut args = self.common_options();
        args.extend(["-P".to_string(), self.port.to_string()]);
        args.extend(["-b".to_string(), "-".to_string()]);
        args.push(self.destination());
        args
    }
}

/// SFTP batch that uploads one file, overwriting the destination.
#[must_use]
pub fn sftp_put_batch(local: &str, remote: &str) -> String {
    format!("put {} {}\n", quote_sftp(local), quote_sftp(remote))
}

/// SFTP batch syntax takes double-quoted paths with backslash escapes.
fn quote_sftp(path: &str) -> String {
    format!("\"{}\"", path.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Expand a leading `~/` against the home directory.
#[must_use]
pub fn expand_home(path: &str) -> String {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest).to_string_lossy().into_owned(),
        _ => path.to_string(),
    }
}
