//! Command categories. Each category owns one [`ActionGate`], so gated
//! commands in the same category serialize while different categories run
//! independently.

use crate::action_gate::ActionGate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Enumerates supported `CategoryId` values.
pub enum CategoryId {
    Diagnostic,
    Vps,
    Game,
}

impl CategoryId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Diagnostic => "diagnostic",
            Self::Vps => "vps",
            Self::Game => "game",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandDescriptor {
    pub name: &'static str,
    pub usage: &'static str,
    pub summary: &'static str,
    /// Gated commands must pass the category's [`ActionGate`].
    pub gated: bool,
}

const fn command(
    name: &'static str,
    usage: &'static str,
    summary: &'static str,
    gated: bool,
) -> CommandDescriptor {
    CommandDescriptor {
        name,
        usage,
        summary,
        gated,
    }
}

const DIAGNOSTIC_COMMANDS: &[CommandDescriptor] = &[
    command("help", "help", "List available commands.", false),
    command("ping", "ping", "Show gateway latency.", false),
    command("status", "status", "Show VPS and game server status.", false),
];

const VPS_COMMANDS: &[CommandDescriptor] = &[
    command("start", "start", "Start the VPS and game server.", true),
    command("stop", "stop", "Save the world and stop the VPS.", true),
    command("reboot", "reboot", "Reboot the VPS.", true),
];

const GAME_COMMANDS: &[CommandDescriptor] = &[
    command("pause", "pause", "Stop the game process, keep the VPS up.", true),
    command("resume", "resume", "Start the game process again.", true),
    command("backup", "backup", "Back up the world on the VPS.", true),
    command(
        "download",
        "download",
        "Show the latest world download link.",
        false,
    ),
    command(
        "command",
        "command <text>",
        "Send a console command to the game server.",
        true,
    ),
];

#[derive(Debug)]
pub struct CommandCategory {
    id: CategoryId,
    title: &'static str,
    commands: &'static [CommandDescriptor],
    gate: ActionGate,
}

impl CommandCategory {
    fn new(id: CategoryId, title: &'static str, commands: &'static [CommandDescriptor]) -> Self {
        Self {
            id,
            title,
            commands,
            gate: ActionGate::new(),
        }
    }

    pub fn id(&self) -> CategoryId {
        self.id
    }

    pub fn title(&self) -> &'static str {
        self.title
    }

    pub fn commands(&self) -> &'static [CommandDescriptor] {
        self.commands
    }

    pub fn gate(&self) -> &ActionGate {
        &self.gate
    }
}

#[derive(Debug)]
/// Fixed set of command categories served by the bot.
pub struct CategoryRegistry {
    categories: Vec<CommandCategory>,
}

impl CategoryRegistry {
    pub fn standard() -> Self {
        Self {
            categories: vec![
                CommandCategory::new(CategoryId::Diagnostic, "Diagnostics", DIAGNOSTIC_COMMANDS),
                CommandCategory::new(CategoryId::Vps, "VPS", VPS_COMMANDS),
                CommandCategory::new(CategoryId::Game, "Game server", GAME_COMMANDS),
            ],
        }
    }

    pub fn categories(&self) -> &[CommandCategory] {
        &self.categories
    }

    pub fn category(&self, id: CategoryId) -> Option<&CommandCategory> {
        self.categories.iter().find(|category| category.id == id)
    }

    /// Finds the category and descriptor for a command name.
    pub fn resolve(&self, name: &str) -> Option<(&CommandCategory, &'static CommandDescriptor)> {
        self.categories.iter().find_map(|category| {
            category
                .commands
                .iter()
                .find(|descriptor| descriptor.name == name)
                .map(|descriptor| (category, descriptor))
        })
    }
}
