//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Register routes → Build pipeline → Start listeners
//!
//! Shutdown:
//!     Signal received (signals.rs) → Shutdown::trigger (shutdown.rs)
//!     → Stop accepting → Drain in-flight requests → Exit
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
pub use signals::wait_for_signal;
