//! Run orchestration: dispatch entries, then resolve overlap groups.
//!
//! # Architecture
//!
//! ```text
//! QuizRun
//!     ├── Dispatcher        one entry at a time, in input order
//!     │     └── AudioOps    acquire / download / transcode / trim / speed
//!     └── OverlapResolver   once, over the registry filled by dispatch
//!           └── AudioOps    mix
//! ```
//!
//! # Example
//!
//! ```ignore
//! use quizrip_core::orchestrator::QuizRun;
//!
//! let run = QuizRun::new(settings, layout, ops, logger);
//! let report = run.run(&sheet.entries)?;
//! println!("{}", report.summary());
//! ```

mod dispatcher;
mod errors;
#[cfg(test)]
mod fake_ops;
mod registry;
mod resolver;
mod run;
mod types;

pub use dispatcher::{CancelHandle, Dispatcher};
pub use errors::{
    EntryError, EntryResult, ResolveError, ResolveResult, RunError, RunResult,
};
pub use registry::OverlapRegistry;
pub use resolver::OverlapResolver;
pub use run::QuizRun;
pub use types::{
    DispatchReport, EntryOutcome, EntryReport, EntryStatus, MergedOverlap, OverlapFailure,
    ResolutionReport, RunReport,
};
