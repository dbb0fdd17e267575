//! Registration table binding one handler per operation kind.
//!
//! Handlers are installed during setup and handed to
//! [`Dispatcher::new`](crate::Dispatcher::new), which takes ownership of the
//! table. A later registration for the same operation replaces the earlier
//! one.

use std::fmt;

use crate::error::HandlerFailure;
use crate::request::Operation;
use crate::service::ServiceKind;

/// Handler for `update(token)`.
pub type UpdateHandler = Box<dyn FnMut(&str) -> Result<(), HandlerFailure>>;

/// Handler for `check(token, service, key)`; `true` means the key is present.
pub type CheckHandler = Box<dyn FnMut(&str, ServiceKind, &str) -> Result<bool, HandlerFailure>>;

/// Handler for `lookup(token, service, key)`; `None` means not found.
pub type LookupHandler =
    Box<dyn FnMut(&str, ServiceKind, &str) -> Result<Option<String>, HandlerFailure>>;

/// Handler for `fetch(token, service)`; `None` means not found.
pub type FetchHandler = Box<dyn FnMut(&str, ServiceKind) -> Result<Option<String>, HandlerFailure>>;

/// One optional handler slot per operation kind.
///
/// `update` starts bound to a handler that acknowledges every request, so
/// tables without a refresh step need not register one. The remaining slots
/// start empty.
pub struct Registry {
    pub(crate) update: Option<UpdateHandler>,
    pub(crate) check: Option<CheckHandler>,
    pub(crate) lookup: Option<LookupHandler>,
    pub(crate) fetch: Option<FetchHandler>,
}

impl Registry {
    /// Creates a table with only the acknowledging `update` handler bound.
    #[must_use]
    pub fn new() -> Self {
        Self {
            update: Some(Box::new(acknowledge)),
            check: None,
            lookup: None,
            fetch: None,
        }
    }

    /// Creates a table with every slot empty.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            update: None,
            check: None,
            lookup: None,
            fetch: None,
        }
    }

    /// Binds the `update` handler.
    pub fn on_update(
        &mut self,
        handler: impl FnMut(&str) -> Result<(), HandlerFailure> + 'static,
    ) -> &mut Self {
        self.update = Some(Box::new(handler));
        self
    }

    /// Binds the `check` handler.
    pub fn on_check(
        &mut self,
        handler: impl FnMut(&str, ServiceKind, &str) -> Result<bool, HandlerFailure> + 'static,
    ) -> &mut Self {
        self.check = Some(Box::new(handler));
        self
    }

    /// Binds the `lookup` handler.
    pub fn on_lookup(
        &mut self,
        handler: impl FnMut(&str, ServiceKind, &str) -> Result<Option<String>, HandlerFailure>
        + 'static,
    ) -> &mut Self {
        self.lookup = Some(Box::new(handler));
        self
    }

    /// Binds the `fetch` handler.
    pub fn on_fetch(
        &mut self,
        handler: impl FnMut(&str, ServiceKind) -> Result<Option<String>, HandlerFailure> + 'static,
    ) -> &mut Self {
        self.fetch = Some(Box::new(handler));
        self
    }

    /// Returns whether a handler is bound for the operation.
    #[must_use]
    pub const fn is_bound(&self, operation: Operation) -> bool {
        match operation {
            Operation::Update => self.update.is_some(),
            Operation::Check => self.check.is_some(),
            Operation::Lookup => self.lookup.is_some(),
            Operation::Fetch => self.fetch.is_some(),
        }
    }

    /// Returns the first operation without a bound handler, in slot order.
    #[must_use]
    pub fn first_unbound(&self) -> Option<Operation> {
        Operation::ALL
            .into_iter()
            .find(|operation| !self.is_bound(*operation))
    }
}

fn acknowledge(_token: &str) -> Result<(), HandlerFailure> {
    Ok(())
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("update", &self.update.is_some())
            .field("check", &self.check.is_some())
            .field("lookup", &self.lookup.is_some())
            .field("fetch", &self.fetch.is_some())
            .finish()
    }
}
