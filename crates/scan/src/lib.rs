//! `loyalty-scan` — client-side debouncing of raw scanner reads.
//!
//! Optical scanners emit a noisy stream of readings: misreads, partial
//! codes, and long runs of the same correct code. [`ScanStabilizer`] turns
//! that stream into at-most-one confirmed code per stable run;
//! [`ScanSession`] wraps it with the session lifecycle the scanning client
//! drives.

pub mod session;
pub mod stabilizer;

pub use session::ScanSession;
pub use stabilizer::{CONFIRM_COUNT, ScanStabilizer, WINDOW_LEN};
