//! Raspberry Pi command construction: package installs and diagnostics.

use std::fmt;

use crate::domain::error::IntentError;

/// Python packages that `auto` routes to pip even without a `python-` prefix.
const PIP_PACKAGES: &[&str] = &["numpy", "scipy", "pandas", "matplotlib"];

/// Package manager used by `install_library`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PackageManager {
    #[default]
    Auto,
    Pip,
    Apt,
    Npm,
}

impl PackageManager {
    /// Parse a manager name as given by the model or the user.
    ///
    /// # Errors
    ///
    /// Returns `IntentError::InvalidParameter` for unsupported managers.
    pub fn parse(name: &str) -> Result<Self, IntentError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "" | "auto" => Ok(Self::Auto),
            "pip" | "pip3" => Ok(Self::Pip),
            "apt" | "apt-get" => Ok(Self::Apt),
            "npm" => Ok(Self::Npm),
            other => Err(IntentError::InvalidParameter {
                name: "manager".to_string(),
                reason: format!("unknown package manager '{other}' (use auto, pip, apt or npm)"),
            }),
        }
    }

    /// Resolve `Auto` for a given package; concrete managers pass through.
    #[must_use]
    pub fn resolve(self, package: &str) -> Self {
        match self {
            Self::Auto if package.starts_with("python-") || PIP_PACKAGES.contains(&package) => {
                Self::Pip
            }
            Self::Auto => Self::Apt,
            other => other,
        }
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Auto => "auto",
            Self::Pip => "pip",
            Self::Apt => "apt",
            Self::Npm => "npm",
        })
    }
}

/// Remote shell command that installs `package` with a resolved manager.
#[must_use]
pub fn install_command(manager: PackageManager, package: &str) -> String {
    match manager.resolve(package) {
        PackageManager::Pip | PackageManager::Auto => format!("pip3 install {package}"),
        PackageManager::Apt => {
            format!("sudo apt-get update && sudo apt-get install -y {package}")
        }
        PackageManager::Npm => format!("npm install -g {package}"),
    }
}

/// Fixed, read-only diagnostic sequence run by `diagnose`.
pub const DIAGNOSTIC_CHECKS: &[(&str, &str)] = &[
    ("os_info", "cat /etc/os-release | grep PRETTY_NAME"),
    ("kernel", "uname -r"),
    ("cpu", "lscpu | grep 'Model name'"),
    ("memory", "free -h"),
    ("disk", "df -h /"),
    ("temperature", "vcgencmd measure_temp"),
    ("uptime", "uptime"),
    ("python_version", "python3 --version"),
    ("pip_packages", "pip3 list"),
];
