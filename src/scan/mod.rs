// Sat Oct 17 2026 - Alex

pub mod cancel;
pub mod error;
pub mod matcher;
pub mod results;
pub mod scanner;
pub mod window;

pub use cancel::CancelToken;
pub use error::ScanError;
pub use matcher::ChunkedMatcher;
pub use results::{MatchSet, ScanReport, ScanStats};
pub use scanner::Scanner;
pub use window::{Window, WindowPlan, DEFAULT_WINDOW_SIZE};
