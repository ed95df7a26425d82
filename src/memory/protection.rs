// Sat Oct 17 2026 - Alex

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

bitflags! {
    /// Page protection classes. Bit values follow the Win32 `PAGE_*` constants so
    /// native query results can be intersected with a filter directly; other
    /// platforms translate their r/w/x triple into exactly one class.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct PageProtection: u32 {
        const NOACCESS = 0x01;
        const READONLY = 0x02;
        const READWRITE = 0x04;
        const WRITECOPY = 0x08;
        const EXECUTE = 0x10;
        const EXECUTE_READ = 0x20;
        const EXECUTE_READWRITE = 0x40;
        const EXECUTE_WRITECOPY = 0x80;
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown protection class: {0:?}")]
pub struct ProtectionParseError(pub String);

impl PageProtection {
    pub const DEFAULT_FILTER: Self = Self::READWRITE.union(Self::EXECUTE_READWRITE);

    pub const READABLE: Self = Self::READONLY
        .union(Self::READWRITE)
        .union(Self::WRITECOPY)
        .union(Self::EXECUTE_READ)
        .union(Self::EXECUTE_READWRITE)
        .union(Self::EXECUTE_WRITECOPY);

    pub fn from_rwx(read: bool, write: bool, execute: bool) -> Self {
        match (read, write, execute) {
            (false, false, false) => Self::NOACCESS,
            (true, false, false) => Self::READONLY,
            (_, true, false) => Self::READWRITE,
            (false, false, true) => Self::EXECUTE,
            (true, false, true) => Self::EXECUTE_READ,
            (_, true, true) => Self::EXECUTE_READWRITE,
        }
    }

    pub fn can_read(self) -> bool {
        self.intersects(Self::READABLE)
    }

    pub fn can_write(self) -> bool {
        self.intersects(
            Self::READWRITE | Self::WRITECOPY | Self::EXECUTE_READWRITE | Self::EXECUTE_WRITECOPY,
        )
    }

    pub fn can_execute(self) -> bool {
        self.intersects(
            Self::EXECUTE | Self::EXECUTE_READ | Self::EXECUTE_READWRITE | Self::EXECUTE_WRITECOPY,
        )
    }

    pub fn is_eligible(self, filter: Self) -> bool {
        self.intersects(filter)
    }

    fn short_name(self) -> &'static str {
        if self.contains(Self::EXECUTE_WRITECOPY) {
            "xwc"
        } else if self.contains(Self::EXECUTE_READWRITE) {
            "rwx"
        } else if self.contains(Self::EXECUTE_READ) {
            "r-x"
        } else if self.contains(Self::EXECUTE) {
            "--x"
        } else if self.contains(Self::WRITECOPY) {
            "wc"
        } else if self.contains(Self::READWRITE) {
            "rw-"
        } else if self.contains(Self::READONLY) {
            "r--"
        } else {
            "---"
        }
    }

    fn parse_class(token: &str) -> Result<Self, ProtectionParseError> {
        let class = match token.trim().to_ascii_lowercase().as_str() {
            "none" | "noaccess" | "---" => Self::NOACCESS,
            "r" | "ro" | "readonly" | "r--" => Self::READONLY,
            "rw" | "readwrite" | "rw-" => Self::READWRITE,
            "wc" | "writecopy" => Self::WRITECOPY,
            "x" | "execute" | "--x" => Self::EXECUTE,
            "rx" | "execute_read" | "r-x" => Self::EXECUTE_READ,
            "rwx" | "execute_readwrite" => Self::EXECUTE_READWRITE,
            "xwc" | "execute_writecopy" => Self::EXECUTE_WRITECOPY,
            "readable" => Self::READABLE,
            "all" => Self::all(),
            other => return Err(ProtectionParseError(other.to_string())),
        };
        Ok(class)
    }
}

impl Default for PageProtection {
    fn default() -> Self {
        Self::DEFAULT_FILTER
    }
}

impl FromStr for PageProtection {
    type Err = ProtectionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(',')
            .filter(|t| !t.trim().is_empty())
            .try_fold(Self::empty(), |acc, token| Ok(acc | Self::parse_class(token)?))
    }
}

impl fmt::Display for PageProtection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(|class| class.short_name()).collect();
        if names.is_empty() {
            write!(f, "---")
        } else {
            write!(f, "{}", names.join(","))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitState {
    Committed,
    Reserved,
    Free,
}

impl fmt::Display for CommitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Committed => write!(f, "commit"),
            Self::Reserved => write!(f, "reserve"),
            Self::Free => write!(f, "free"),
        }
    }
}
