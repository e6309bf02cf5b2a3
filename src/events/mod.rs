//! # Events Module
//!
//! Progress and log reporting for the pipeline, decoupled from any UI.
//!
//! ## Design
//! The core library reports through two narrow capabilities:
//! - [`ProgressSink`] receives `(done, total)` counters
//! - [`LogSink`] receives one human-readable line per call
//!
//! Both are implemented for plain closures, for the tracing adapter and
//! for [`EventSender`], which forwards everything over a channel so a UI
//! thread can subscribe.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         match event {
//!             Event::Hash(HashEvent::Progress(p)) => println!("Hashed {}/{}", p.completed, p.total),
//!             Event::Log { line } => println!("{}", line),
//!             _ => {}
//!         }
//!     }
//! });
//!
//! hasher.compute_fingerprints(&folder, &sender, &sender)?;
//! ```

mod channel;
mod sink;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};
pub use sink::{LogSink, NullSink, ProgressSink, TracingLog};
pub use types::*;
