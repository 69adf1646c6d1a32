//! Named paths of the demo pages.

use std::fmt;
use std::str::FromStr;

use anyhow::{Error, anyhow};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    MultiTable,
    Demo,
    OneTable,
    Drag,
    EnhancedTable,
}

impl Route {
    pub const ALL: [Route; 6] = [
        Route::Home,
        Route::MultiTable,
        Route::Demo,
        Route::OneTable,
        Route::Drag,
        Route::EnhancedTable,
    ];

    pub const fn path(self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::MultiTable => "/multi-table/",
            Self::Demo => "/demo/",
            Self::OneTable => "/onetable/",
            Self::Drag => "/drag/",
            Self::EnhancedTable => "/enhanced-table/",
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            Self::Home => "Project Breakdown",
            Self::MultiTable => "Master-Detail Tables",
            Self::Demo => "Data Table Demo",
            Self::OneTable => "Organization Hierarchy",
            Self::Drag => "Draggable Columns",
            Self::EnhancedTable => "Enhanced WBS Table",
        }
    }

    /// Match a path with or without its trailing slash.
    pub fn from_path(path: &str) -> Option<Self> {
        let trimmed = path.trim().trim_end_matches('/');
        let normalized = trimmed.strip_prefix('/').unwrap_or(trimmed);
        Self::ALL
            .into_iter()
            .find(|route| route.path().trim_matches('/') == normalized)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl FromStr for Route {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_path(s).ok_or_else(|| {
            let known: Vec<&str> = Self::ALL.iter().map(|r| r.path()).collect();
            anyhow!("unknown route {s:?} (known: {})", known.join(", "))
        })
    }
}
