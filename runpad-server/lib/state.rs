//! Application state shared by all handlers.
//!
//! Every component is constructed once at startup and threaded through the
//! router by reference counting; there are no ambient singletons.

use std::sync::Arc;

use getset::Getters;
use runpad_core::{orchestra::Orchestra, store::VersionStore};

use crate::config::Config;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// State threaded through the router.
#[derive(Clone, Getters)]
#[getset(get = "pub with_prefix")]
pub struct AppState {
    /// The loaded server configuration.
    config: Arc<Config>,

    /// Execution orchestrator over the sandbox pool.
    orchestra: Arc<Orchestra>,

    /// Versioned snapshot store.
    store: Arc<VersionStore>,
}

//--------------------------------------------------------------------------------------------------
// Implementations
//--------------------------------------------------------------------------------------------------

impl AppState {
    /// Bundle the components constructed at startup.
    pub fn new(config: Arc<Config>, orchestra: Arc<Orchestra>, store: Arc<VersionStore>) -> Self {
        Self {
            config,
            orchestra,
            store,
        }
    }
}
