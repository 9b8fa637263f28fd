//! Daemon operations.
//!
//! Every operation follows the same sequence: version gate, query (with any
//! filters folded in), request, transport round trip, response decode.

pub mod prune;
pub mod secret;
