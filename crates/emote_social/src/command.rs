//! Prefix command parsing and dispatch.

use emote_core::{CommandContext, EmoteFilter, IdentifyScope};
use emote_error::{BatchError, BatchErrorKind, EmoteResult};
use emote_transfer::EmoteManager;
use tracing::{debug, instrument};

/// Usage summary sent for the `help` command.
pub const HELP_TEXT: &str = "\
**Emote manager commands**
`add <name> <url|emote>` or `add` with an attachment: add one emote
`add-these <emotes...>`: add every custom emote given
`export [all|static|animated]`: download this server's emotes as zip files
`import <url>` or `import` with an attachment: add every image in a zip or tar file
`remove <names...>`: delete emotes
`rename <old> <new>`: rename an emote
`list [all|static|animated]`: list this server's emotes
`stats`: show how many emote slots are used
`show <emote>`: show an emote at full size
`identify <message link> [all|message|reaction]`: list the emotes used in a message
`archive`: download a web page showing this server's emotes";

/// A recognised command with its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `add`, `create`, `steal`
    Add(Vec<String>),
    /// `add-these`, `addthese`
    AddThese(Vec<String>),
    /// `export`
    Export(EmoteFilter),
    /// `import`
    Import(Option<String>),
    /// `remove`, `delete`, `rm`, `del`
    Remove(Vec<String>),
    /// `rename`, `mv`
    Rename {
        /// Current name or reference
        old: String,
        /// New name
        new: String,
    },
    /// `list`, `ls`
    List(EmoteFilter),
    /// `stats`
    Stats,
    /// `show`, `big`, `embiggen`
    Show(Option<String>),
    /// `identify`
    Identify {
        /// Message link
        url: String,
        /// Parts of the message to look at
        scope: IdentifyScope,
    },
    /// `archive`, `html`
    Archive,
    /// `help`
    Help,
}

impl Command {
    /// Canonical command name.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Add(_) => "add",
            Command::AddThese(_) => "add-these",
            Command::Export(_) => "export",
            Command::Import(_) => "import",
            Command::Remove(_) => "remove",
            Command::Rename { .. } => "rename",
            Command::List(_) => "list",
            Command::Stats => "stats",
            Command::Show(_) => "show",
            Command::Identify { .. } => "identify",
            Command::Archive => "archive",
            Command::Help => "help",
        }
    }

    /// Run the command.
    #[instrument(skip(self, manager, ctx), fields(command = self.name(), author = %ctx.author))]
    pub async fn run(self, manager: &EmoteManager, ctx: &CommandContext) -> EmoteResult<()> {
        match self {
            Command::Add(args) => manager.add(ctx, &args).await,
            Command::AddThese(args) => manager.add_these(ctx, &args).await,
            Command::Export(filter) => manager.export(ctx, filter).await,
            Command::Import(url) => manager.import(ctx, url.as_deref()).await,
            Command::Remove(names) => manager.remove(ctx, &names).await,
            Command::Rename { old, new } => manager.rename(ctx, &old, &new).await,
            Command::List(filter) => manager.list(ctx, filter).await,
            Command::Stats => manager.stats(ctx).await,
            Command::Show(arg) => manager.show(ctx, arg.as_deref()).await,
            Command::Identify { url, scope } => manager.identify(ctx, &url, scope).await,
            Command::Archive => manager.archive(ctx).await,
            Command::Help => manager.help(ctx, HELP_TEXT).await,
        }
    }
}

/// Split arguments on whitespace, keeping `"quoted text"` together.
///
/// # Examples
///
/// ```
/// use emote_social::split_args;
///
/// assert_eq!(split_args(r#"add "party parrot" <url>"#), vec!["add", "party parrot", "<url>"]);
/// ```
pub fn split_args(input: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut started = false;

    for c in input.chars() {
        match c {
            '"' => {
                quoted = !quoted;
                started = true;
            }
            c if c.is_whitespace() && !quoted => {
                if started {
                    args.push(std::mem::take(&mut current));
                    started = false;
                }
            }
            c => {
                current.push(c);
                started = true;
            }
        }
    }

    if started {
        args.push(current);
    }
    args
}

fn filter_arg(args: &[String]) -> Result<EmoteFilter, BatchError> {
    args.first()
        .map(|arg| arg.parse())
        .transpose()
        .map(Option::unwrap_or_default)
}

/// Parse a message as a command.
///
/// Returns `None` if the message does not start with `prefix` or names an unknown
/// command, and `Some(Err(_))` if a known command has unusable arguments.
pub fn parse_command(prefix: &str, content: &str) -> Option<Result<Command, BatchError>> {
    let rest = content.strip_prefix(prefix)?;
    let mut args = split_args(rest);
    if args.is_empty() {
        return None;
    }
    let name = args.remove(0).to_lowercase();

    let command = match name.as_str() {
        "add" | "create" | "steal" => Ok(Command::Add(args)),
        "add-these" | "addthese" => Ok(Command::AddThese(args)),
        "export" => filter_arg(&args).map(Command::Export),
        "import" => Ok(Command::Import(args.into_iter().next())),
        "remove" | "delete" | "rm" | "del" => Ok(Command::Remove(args)),
        "rename" | "mv" => match <[String; 2]>::try_from(args) {
            Ok([old, new]) => Ok(Command::Rename { old, new }),
            Err(_) => Err(BatchError::new(BatchErrorKind::BadArgument(
                "Usage: rename <old name> <new name>".to_string(),
            ))),
        },
        "list" | "ls" => filter_arg(&args).map(Command::List),
        "stats" => Ok(Command::Stats),
        "show" | "big" | "embiggen" => Ok(Command::Show(args.into_iter().next())),
        "identify" => {
            let mut args = args.into_iter();
            match args.next() {
                Some(url) => args
                    .next()
                    .map(|scope| scope.parse())
                    .transpose()
                    .map(|scope| Command::Identify {
                        url,
                        scope: scope.unwrap_or_default(),
                    }),
                None => Err(BatchError::new(BatchErrorKind::BadArgument(
                    "Usage: identify <message link> [all|message|reaction]".to_string(),
                ))),
            }
        }
        "archive" | "html" => Ok(Command::Archive),
        "help" => Ok(Command::Help),
        _ => {
            debug!(%name, "Unknown command");
            return None;
        }
    };
    Some(command)
}
