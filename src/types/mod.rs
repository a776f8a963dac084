pub mod errors;

pub use errors::{ResolveError, ResolveResult};
