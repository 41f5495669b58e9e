use std::env;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use which::which;

/// How to reach the browser hosting the timesheet.
///
/// When `websocket_url` is set the adapter connects to an already running
/// browser (the usual case: the user is logged in there). Otherwise it launches
/// `executable` with a persistent profile so the session cookie survives runs.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CdpConfig {
    pub executable: PathBuf,
    pub user_data_dir: PathBuf,
    pub headless: bool,
    pub websocket_url: Option<String>,
    /// Opened when no existing tab matches `target_url_fragment`.
    pub target_url: Option<String>,
    pub target_url_fragment: String,
    pub launch_timeout_ms: u64,
    pub request_timeout_ms: u64,
}

impl Default for CdpConfig {
    fn default() -> Self {
        Self {
            executable: detect_chrome_executable().unwrap_or_default(),
            user_data_dir: default_profile_dir(),
            headless: resolve_headless_default(),
            websocket_url: None,
            target_url: None,
            target_url_fragment: "imputacion".to_string(),
            launch_timeout_ms: 20_000,
            request_timeout_ms: 30_000,
        }
    }
}

impl CdpConfig {
    pub fn with_websocket_url(mut self, url: impl Into<String>) -> Self {
        self.websocket_url = Some(url.into());
        self
    }

    /// Configured executable if it exists, else whatever detection finds.
    pub fn resolve_executable(&self) -> Option<PathBuf> {
        if !self.executable.as_os_str().is_empty() && self.executable.exists() {
            return Some(self.executable.clone());
        }
        detect_chrome_executable()
    }
}

fn resolve_headless_default() -> bool {
    match env::var("AUTOINCUR_HEADLESS") {
        Ok(value) => parse_flag(&value).unwrap_or(false),
        // The timesheet needs an interactive login, so headful by default.
        Err(_) => false,
    }
}

pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn default_profile_dir() -> PathBuf {
    if let Ok(path) = env::var("AUTOINCUR_CHROME_PROFILE") {
        return PathBuf::from(path);
    }
    Path::new("./.autoincur-profile").into()
}

pub fn detect_chrome_executable() -> Option<PathBuf> {
    if let Ok(raw) = env::var("AUTOINCUR_CHROME") {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            let candidate = PathBuf::from(trimmed);
            if candidate.exists() {
                return Some(candidate);
            }
        }
    }

    for name in chrome_executable_names() {
        if let Ok(path) = which(name) {
            return Some(path);
        }
    }

    let skip_defaults = env::var("AUTOINCUR_SKIP_OS_PATHS")
        .map(|value| !value.trim().is_empty())
        .unwrap_or(false);

    if !skip_defaults {
        for candidate in os_specific_chrome_paths() {
            if candidate.exists() {
                return Some(candidate);
            }
        }
    }

    None
}

fn chrome_executable_names() -> &'static [&'static str] {
    #[cfg(target_os = "windows")]
    {
        &["chrome.exe", "chromium.exe", "msedge.exe"]
    }

    #[cfg(not(target_os = "windows"))]
    {
        &[
            "google-chrome-stable",
            "google-chrome",
            "chromium",
            "chromium-browser",
        ]
    }
}

fn os_specific_chrome_paths() -> Vec<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        let mut paths = Vec::new();
        for key in ["PROGRAMFILES", "PROGRAMFILES(X86)", "LOCALAPPDATA"] {
            if let Ok(value) = env::var(key) {
                let root = PathBuf::from(value.trim());
                paths.push(root.join("Google/Chrome/Application/chrome.exe"));
                paths.push(root.join("Microsoft/Edge/Application/msedge.exe"));
            }
        }
        paths
    }

    #[cfg(target_os = "macos")]
    {
        vec![
            PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome"),
            PathBuf::from("/Applications/Chromium.app/Contents/MacOS/Chromium"),
        ]
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        vec![
            PathBuf::from("/usr/bin/google-chrome-stable"),
            PathBuf::from("/usr/bin/google-chrome"),
            PathBuf::from("/usr/bin/chromium-browser"),
            PathBuf::from("/usr/bin/chromium"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn detects_from_env_var() {
        let dir = tempdir().unwrap();
        let exe_path = dir.path().join("my-chrome");
        fs::write(&exe_path, b"").unwrap();
        let original = env::var("AUTOINCUR_CHROME").ok();
        env::set_var("AUTOINCUR_CHROME", exe_path.to_string_lossy().to_string());
        let detected = detect_chrome_executable();
        if let Some(value) = original {
            env::set_var("AUTOINCUR_CHROME", value);
        } else {
            env::remove_var("AUTOINCUR_CHROME");
        }
        assert_eq!(detected, Some(exe_path));
    }

    #[test]
    fn configured_executable_wins_when_present() {
        let dir = tempdir().unwrap();
        let exe_path = dir.path().join("chromium");
        fs::write(&exe_path, b"").unwrap();
        let cfg = CdpConfig {
            executable: exe_path.clone(),
            ..CdpConfig::default()
        };
        assert_eq!(cfg.resolve_executable(), Some(exe_path));
    }

    #[test]
    fn flags_accept_common_spellings() {
        assert_eq!(parse_flag(" YES "), Some(true));
        assert_eq!(parse_flag("off"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let cfg: CdpConfig =
            serde_json::from_str(r#"{"websocket_url":"ws://127.0.0.1:9222/devtools/browser/x"}"#)
                .unwrap();
        assert!(cfg.websocket_url.is_some());
        assert_eq!(cfg.target_url_fragment, "imputacion");
        assert_eq!(cfg.launch_timeout_ms, 20_000);
    }
}
