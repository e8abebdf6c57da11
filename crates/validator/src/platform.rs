use serde::{Deserialize, Serialize};

/// Operating system family the validator runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Linux,
    Windows,
    #[serde(rename = "macos")]
    MacOs,
    Other,
}

impl Platform {
    /// Platform of the current compile target
    pub const fn current() -> Self {
        if cfg!(target_os = "linux") {
            Platform::Linux
        } else if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else {
            Platform::Other
        }
    }

    pub fn is_linux(self) -> bool {
        self == Platform::Linux
    }

    pub fn is_windows(self) -> bool {
        self == Platform::Windows
    }

    pub fn is_macos(self) -> bool {
        self == Platform::MacOs
    }

    /// VA-API render nodes only exist on Linux
    pub fn supports_vaapi(self) -> bool {
        self.is_linux()
    }
}

impl Default for Platform {
    fn default() -> Self {
        Platform::current()
    }
}
