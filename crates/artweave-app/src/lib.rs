// Library root: re-exports the flow and CLI modules so integration tests and
// the `artweave` binary share one implementation.

pub mod cli;
pub mod flow;
