pub mod resolver;

pub use resolver::{
    resolve_client, ClientAliasRow, ClientCandidate, ClientDirectory, ClientMethod,
    ClientResolutionResult,
};
