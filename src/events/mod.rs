//! # Events Module
//!
//! Progress and announcement events emitted by the batch processor.
//!
//! ## Design
//! The core library never writes to the terminal. It emits events through
//! a channel, and the presentation layer (the CLI) decides what to show:
//! rename announcements, a progress bar, or nothing.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         if let Event::Rename(rename) = event {
//!             if let Some(line) = rename.announcement() {
//!                 eprintln!("{}", line);
//!             }
//!         }
//!     }
//! });
//!
//! processor.run_with_events(&sender)?;
//! ```

mod channel;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};
pub use types::*;
