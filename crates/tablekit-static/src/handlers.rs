//! Binds a [`StaticTable`] to the table operation handlers.

use std::rc::Rc;

use tablekit::{HandlerFailure, Registry};
use tracing::{debug, info, warn};

use crate::TABLE_TARGET;
use crate::table::{StaticTable, TableSource};

/// Builds a registration table answering every operation from `table`.
///
/// `update` reloads the table source; a failed reload answers `failure` and
/// leaves the previously loaded entries in place.
#[must_use]
pub fn registry<S: TableSource + 'static>(table: Rc<StaticTable<S>>) -> Registry {
    let mut registry = Registry::new();

    let updating = Rc::clone(&table);
    registry.on_update(move |token| {
        updating
            .reload()
            .map(|entries| {
                info!(
                    target: TABLE_TARGET,
                    token,
                    entries,
                    source = %updating.describe(),
                    "table reloaded"
                );
            })
            .map_err(|error| {
                warn!(target: TABLE_TARGET, token, %error, "table reload failed");
                HandlerFailure::new(error.to_string())
            })
    });

    let checking = Rc::clone(&table);
    registry.on_check(move |token, service, key| {
        let found = checking.contains(service, key);
        debug!(target: TABLE_TARGET, token, %service, key, found, "check");
        Ok(found)
    });

    let looking = Rc::clone(&table);
    registry.on_lookup(move |token, service, key| {
        let value = looking.lookup(service, key);
        debug!(
            target: TABLE_TARGET,
            token,
            %service,
            key,
            found = value.is_some(),
            "lookup"
        );
        Ok(value)
    });

    registry.on_fetch(move |token, service| {
        let value = table.fetch_next();
        debug!(
            target: TABLE_TARGET,
            token,
            %service,
            found = value.is_some(),
            "fetch"
        );
        Ok(value)
    });

    registry
}
