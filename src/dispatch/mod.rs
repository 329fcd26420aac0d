//! Message dispatch.
//!
//! The [`Dispatcher`] takes chat messages and protocol events from clients,
//! checks each candidate handler against the client's access lists and runs
//! the survivors in their own tasks. Handlers send through a
//! [`HandlerContext`], which passes every outbound message through the
//! registered filter chain.
//!
//! Handlers are registered on a [`Registry`]; the dispatcher always works on
//! an immutable snapshot of it.

pub mod acl;
mod context;
mod handler;
mod registry;
mod router;

pub use context::HandlerContext;
pub use handler::{
    CommandFn, CommandHandler, EventFn, EventHandler, Filter, FilterContext, FilterFn, RegexFn,
    RegexHandler, command_fn, event_fn, filter_fn, regex_fn,
};
pub use registry::{
    CommandRecord, EventRecord, FilterRecord, HandlerId, HandlerTable, RegexRecord, Registration,
    Registry,
};
pub use router::{DispatchOutcome, Dispatcher};
