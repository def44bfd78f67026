//! Orchestration graph
//!
//! Named agent nodes plus START/END markers. Workers always hand control back
//! to their supervisor; the supervisor's conditional edge reads the routing
//! field and picks a worker or END.
//!
//! ```text
//! START -> supervisor --(Researcher)--> Researcher
//!              ^  |                          |
//!              |  +--(FINISH)--> END         |
//!              +-----------------------------+
//! ```

mod builder;
mod executor;
mod routing;

pub use builder::{GraphBuilder, DEFAULT_MAX_STEPS};
pub use executor::CompiledGraph;
pub use routing::{NodeId, RoutingTable, END, START};
