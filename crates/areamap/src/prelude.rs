//! Prelude module for convenient imports
//!
//! ```ignore
//! use areamap::prelude::*;
//! ```
//!
//! This brings the following into scope:
//!
//! - Records: `AreaRecord`, `Exit`
//! - Building: `AreaBuilder`, `BuildOptions`, `MapSession`
//! - Provider seam: `LevelProvider`, `WorldSnapshot`, `RoomId`
//! - Geometry: `Point`, `Rect`, `Size`
//! - Error handling: `Error`, `Result`

// Records
pub use crate::record::{AreaRecord, Exit};

// Building
pub use crate::builder::{AreaBuilder, BuildOptions};
pub use crate::session::MapSession;

// Provider seam
pub use crate::provider::{LevelProvider, RoomId, WorldSnapshot};

// Geometry
pub use crate::geometry::{Point, Rect, Size};

// Error handling
pub use crate::error::{Error, Result};
