//! Handler registry.
//!
//! The dispatcher reads an immutable [`HandlerTable`] snapshot. Every
//! registration clones the current table, changes the clone and swaps it in,
//! so a dispatch in progress never sees a half-applied change.

use parking_lot::RwLock;
use regex::Regex;
use std::collections::BTreeMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, error, info};

use super::handler::{CommandHandler, EventHandler, Filter, FilterContext, RegexHandler};
use super::router::panic_message;
use crate::error::RegistryError;
use slircbot_proto::Message;

/// Stable identity of one registration.
pub type HandlerId = u64;

pub struct FilterRecord {
    pub id: HandlerId,
    pub name: String,
    pub filter: Arc<dyn Filter>,
}

pub struct CommandRecord {
    pub id: HandlerId,
    pub name: String,
    pub aliases: Vec<String>,
    pub handler: Arc<dyn CommandHandler>,
}

pub struct RegexRecord {
    pub id: HandlerId,
    pub name: String,
    pub regex: Regex,
    pub handler: Arc<dyn RegexHandler>,
}

pub struct EventRecord {
    pub id: HandlerId,
    pub name: String,
    /// Command to match (case-insensitive), or `*` for everything.
    pub event: String,
    pub handler: Arc<dyn EventHandler>,
}

impl EventRecord {
    pub fn matches(&self, command: &str) -> bool {
        self.event == "*" || self.event.eq_ignore_ascii_case(command)
    }
}

/// One immutable view of every registered handler.
#[derive(Clone, Default)]
pub struct HandlerTable {
    filters: Vec<Arc<FilterRecord>>,
    /// Keyed by name and by every alias.
    commands: BTreeMap<String, Arc<CommandRecord>>,
    regexes: BTreeMap<String, Arc<RegexRecord>>,
    events: BTreeMap<String, Arc<EventRecord>>,
}

impl HandlerTable {
    pub fn filters(&self) -> impl Iterator<Item = &FilterRecord> {
        self.filters.iter().map(Arc::as_ref)
    }

    /// Exact lookup by name or alias.
    pub fn command(&self, key: &str) -> Option<&Arc<CommandRecord>> {
        self.commands.get(key)
    }

    /// Distinct commands with a name or alias starting with `prefix`,
    /// ordered by name.
    pub fn commands_with_prefix(&self, prefix: &str) -> Vec<&Arc<CommandRecord>> {
        let mut found: Vec<&Arc<CommandRecord>> = Vec::new();
        for (key, record) in self.commands.range(prefix.to_string()..) {
            if !key.starts_with(prefix) {
                break;
            }
            if !found.iter().any(|r| r.id == record.id) {
                found.push(record);
            }
        }
        found.sort_by(|a, b| a.name.cmp(&b.name));
        found
    }

    /// Distinct command names, sorted.
    pub fn command_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.commands.values().map(|r| r.name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    pub fn regexes(&self) -> impl Iterator<Item = &Arc<RegexRecord>> {
        self.regexes.values()
    }

    pub fn events(&self) -> impl Iterator<Item = &Arc<EventRecord>> {
        self.events.values()
    }

    /// Run `msg` through the filter chain in registration order. A veto
    /// stops the chain. A filter that panics counts as a veto.
    pub fn apply_filters(&self, msg: Message, ctx: &FilterContext<'_>) -> Option<Message> {
        let mut msg = msg;
        for record in &self.filters {
            let filter = &record.filter;
            match catch_unwind(AssertUnwindSafe(|| filter.filter(msg, ctx))) {
                Ok(Some(next)) => msg = next,
                Ok(None) => {
                    debug!(filter = %record.name, "Outbound message vetoed");
                    return None;
                }
                Err(panic) => {
                    error!(filter = %record.name, panic = %panic_message(&*panic), "Filter panicked");
                    return None;
                }
            }
        }
        Some(msg)
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
            && self.commands.is_empty()
            && self.regexes.is_empty()
            && self.events.is_empty()
    }
}

/// A batch of registrations applied to a table that is not yet visible.
pub struct Registration<'a> {
    table: HandlerTable,
    ids: &'a AtomicU64,
}

impl Registration<'_> {
    fn next_id(&self) -> HandlerId {
        self.ids.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Append a filter. Re-registering a name replaces it in place.
    pub fn register_filter(
        &mut self,
        name: impl Into<String>,
        filter: impl Filter,
    ) -> Result<HandlerId, RegistryError> {
        let name = non_empty(name.into())?;
        let record = Arc::new(FilterRecord {
            id: self.next_id(),
            name,
            filter: Arc::new(filter),
        });
        let id = record.id;
        match self.table.filters.iter().position(|f| f.name == record.name) {
            Some(i) => self.table.filters[i] = record,
            None => self.table.filters.push(record),
        }
        Ok(id)
    }

    /// Register a command under `name` and each alias. Re-registering a name
    /// replaces the previous record and drops its aliases.
    pub fn register_command<I, S>(
        &mut self,
        name: impl Into<String>,
        aliases: I,
        handler: impl CommandHandler,
    ) -> Result<HandlerId, RegistryError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = non_empty(name.into())?;
        let aliases: Vec<String> = aliases
            .into_iter()
            .map(Into::into)
            .filter(|a: &String| !a.is_empty() && *a != name)
            .collect();

        let stale = self
            .table
            .commands
            .values()
            .find(|r| r.name == name)
            .map(|r| r.id);
        if let Some(stale) = stale {
            self.table.commands.retain(|_, r| r.id != stale);
        }

        let record = Arc::new(CommandRecord {
            id: self.next_id(),
            name: name.clone(),
            aliases: aliases.clone(),
            handler: Arc::new(handler),
        });
        for alias in aliases {
            self.table.commands.insert(alias, record.clone());
        }
        let id = record.id;
        self.table.commands.insert(name, record);
        Ok(id)
    }

    /// Register a handler for event `event` (a command such as `INVITE`,
    /// or `*`). Re-registering a name replaces it.
    pub fn register_event_handler(
        &mut self,
        name: impl Into<String>,
        event: impl Into<String>,
        handler: impl EventHandler,
    ) -> Result<HandlerId, RegistryError> {
        let name = non_empty(name.into())?;
        let record = Arc::new(EventRecord {
            id: self.next_id(),
            name: name.clone(),
            event: event.into(),
            handler: Arc::new(handler),
        });
        let id = record.id;
        self.table.events.insert(name, record);
        Ok(id)
    }

    /// Register a handler for chat lines matching `pattern`. Re-registering
    /// a name replaces it.
    pub fn register_regex_handler(
        &mut self,
        name: impl Into<String>,
        pattern: &str,
        handler: impl RegexHandler,
    ) -> Result<HandlerId, RegistryError> {
        let name = non_empty(name.into())?;
        let regex = Regex::new(pattern).map_err(|source| RegistryError::InvalidPattern {
            name: name.clone(),
            source,
        })?;
        let record = Arc::new(RegexRecord {
            id: self.next_id(),
            name: name.clone(),
            regex,
            handler: Arc::new(handler),
        });
        let id = record.id;
        self.table.regexes.insert(name, record);
        Ok(id)
    }
}

fn non_empty(name: String) -> Result<String, RegistryError> {
    if name.is_empty() {
        Err(RegistryError::EmptyName)
    } else {
        Ok(name)
    }
}

/// Owner of the current [`HandlerTable`].
#[derive(Default)]
pub struct Registry {
    table: RwLock<Arc<HandlerTable>>,
    ids: AtomicU64,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current table. Later registrations do not affect it.
    pub fn snapshot(&self) -> Arc<HandlerTable> {
        self.table.read().clone()
    }

    /// Apply `f` to a copy of the current table and publish the result.
    /// Nothing is published if `f` fails.
    pub fn update<T>(
        &self,
        f: impl FnOnce(&mut Registration<'_>) -> Result<T, RegistryError>,
    ) -> Result<T, RegistryError> {
        let mut current = self.table.write();
        let mut batch = Registration {
            table: HandlerTable::clone(&current),
            ids: &self.ids,
        };
        let out = f(&mut batch)?;
        *current = Arc::new(batch.table);
        Ok(out)
    }

    /// Replace every handler with the ones `f` registers, as one swap.
    pub fn reload(
        &self,
        f: impl FnOnce(&mut Registration<'_>) -> Result<(), RegistryError>,
    ) -> Result<(), RegistryError> {
        let mut batch = Registration {
            table: HandlerTable::default(),
            ids: &self.ids,
        };
        f(&mut batch)?;
        *self.table.write() = Arc::new(batch.table);
        info!("Handlers reloaded");
        Ok(())
    }

    pub fn register_filter(
        &self,
        name: impl Into<String>,
        filter: impl Filter,
    ) -> Result<HandlerId, RegistryError> {
        self.update(|r| r.register_filter(name, filter))
    }

    pub fn register_command<I, S>(
        &self,
        name: impl Into<String>,
        aliases: I,
        handler: impl CommandHandler,
    ) -> Result<HandlerId, RegistryError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.update(|r| r.register_command(name, aliases, handler))
    }

    pub fn register_event_handler(
        &self,
        name: impl Into<String>,
        event: impl Into<String>,
        handler: impl EventHandler,
    ) -> Result<HandlerId, RegistryError> {
        self.update(|r| r.register_event_handler(name, event, handler))
    }

    pub fn register_regex_handler(
        &self,
        name: impl Into<String>,
        pattern: &str,
        handler: impl RegexHandler,
    ) -> Result<HandlerId, RegistryError> {
        self.update(|r| r.register_regex_handler(name, pattern, handler))
    }
}
