//! Built-in plugins.
//!
//! Registered through the same contract any external collaborator uses.

mod echo;
mod filters;
mod logger;
mod misc;

pub use echo::EchoCommand;
pub use filters::{BotFilter, SPAM_WORDS, SpamFilter};
pub use logger::{EventLogger, NOISE_EVENTS};
pub use misc::{HelpCommand, InviteHandler, NickInUseHandler};

use crate::dispatch::Registration;
use crate::error::RegistryError;

/// Register every built-in plugin.
pub fn register(r: &mut Registration<'_>) -> Result<(), RegistryError> {
    r.register_command("echo", Vec::<String>::new(), EchoCommand)?;
    r.register_command("help", ["commands"], HelpCommand)?;
    r.register_event_handler("invite", "INVITE", InviteHandler)?;
    r.register_event_handler("newnick", "433", NickInUseHandler)?;
    r.register_event_handler("logger", "*", EventLogger)?;
    r.register_filter("spamwords", SpamFilter)?;
    r.register_filter("botfilter", BotFilter)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::Registry;

    #[test]
    fn builtins_register() {
        let registry = Registry::new();
        registry.reload(register).unwrap();
        let table = registry.snapshot();
        assert_eq!(table.command_names(), vec!["echo", "help"]);
        assert!(table.command("commands").is_some());
        assert_eq!(table.events().count(), 3);
        assert_eq!(table.filters().count(), 2);
    }
}
