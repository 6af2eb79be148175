use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::{Parser, Subcommand};
use std::ffi::OsString;
use std::fmt;

use crate::config::Config;
use crate::feed::{self, AddFeedArgs, FeedUrlArgs};
use crate::post::{self, BrowseArgs};
use crate::scheduler::{self, AggArgs};
use crate::store::{PgStore, StoreError, UserStore};
use crate::user::{self, types::User, NameArgs};

#[derive(Parser, Debug)]
#[command(name = "gator", about = "RSS feed aggregator")]
pub struct Cli {
    /// Postgres connection string; falls back to DATABASE_URL, then the config file
    #[arg(global = true, short, long)]
    pub dsn: Option<String>,
    /// Emit a single JSON envelope to stdout; logs go to stderr
    #[arg(global = true, long, default_value_t = false)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Apply database migrations
    Init,
    /// Create a user and log in as them
    Register(NameArgs),
    /// Switch the current user
    Login(NameArgs),
    /// Delete every user and everything they own
    Reset,
    /// List users
    Users,
    /// Fetch feeds forever, one feed per interval
    Agg(AggArgs),
    /// Register a feed and follow it
    #[command(name = "addfeed")]
    AddFeed(AddFeedArgs),
    /// List all feeds
    Feeds,
    /// Follow an existing feed by url
    Follow(FeedUrlArgs),
    /// List feeds the current user follows
    Following,
    /// Stop following a feed
    Unfollow(FeedUrlArgs),
    /// Show recent posts from followed feeds
    Browse(BrowseArgs),
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Init => "init",
            Command::Register(_) => "register",
            Command::Login(_) => "login",
            Command::Reset => "reset",
            Command::Users => "users",
            Command::Agg(_) => "agg",
            Command::AddFeed(_) => "addfeed",
            Command::Feeds => "feeds",
            Command::Follow(_) => "follow",
            Command::Following => "following",
            Command::Unfollow(_) => "unfollow",
            Command::Browse(_) => "browse",
        }
    }

    /// Commands that act on behalf of the current user.
    pub fn requires_login(&self) -> bool {
        matches!(
            self,
            Command::AddFeed(_) | Command::Follow(_) | Command::Following | Command::Unfollow(_) | Command::Browse(_)
        )
    }
}

#[derive(Debug)]
pub enum DispatchError {
    UnknownCommand(String),
    NotLoggedIn,
    /// Help, version or malformed arguments, rendered by clap.
    Usage(clap::Error),
    Handler { command: &'static str, source: anyhow::Error },
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::UnknownCommand(name) => write!(f, "unknown command: {name}"),
            DispatchError::NotLoggedIn => write!(f, "not logged in; run `gator login <name>` or `gator register <name>`"),
            DispatchError::Usage(err) => write!(f, "{err}"),
            DispatchError::Handler { command, source } => write!(f, "{command} failed: {source:#}"),
        }
    }
}

impl std::error::Error for DispatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DispatchError::Usage(err) => Some(err),
            DispatchError::Handler { source, .. } => Some(&**source),
            _ => None,
        }
    }
}

/// Parse argv into a command. Runs before any storage is opened.
pub fn parse_args<I, T>(argv: I) -> Result<Cli, DispatchError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    Cli::try_parse_from(argv).map_err(|err| match err.kind() {
        ErrorKind::InvalidSubcommand => {
            let name = match err.get(ContextKind::InvalidSubcommand) {
                Some(ContextValue::String(name)) => name.clone(),
                _ => String::from("<unknown>"),
            };
            DispatchError::UnknownCommand(name)
        }
        _ => DispatchError::Usage(err),
    })
}

/// Explicit per-invocation state handed to every handler.
pub struct Ctx<'a> {
    pub store: &'a PgStore,
    pub config: &'a mut Config,
}

/// Resolve the configured current user, failing with `NotLoggedIn` when the
/// config names nobody or names a user storage does not know.
pub async fn require_user<S: UserStore + ?Sized>(store: &S, config: &Config) -> Result<User, DispatchError> {
    let name = config.current_user().ok_or(DispatchError::NotLoggedIn)?;
    match store.get_user(name).await {
        Ok(user) => Ok(user),
        Err(StoreError::NotFound) => Err(DispatchError::NotLoggedIn),
        Err(e) => Err(DispatchError::Handler { command: "login", source: e.into() }),
    }
}

pub async fn dispatch(ctx: Ctx<'_>, cmd: Command) -> Result<(), DispatchError> {
    let name = cmd.name();
    let current = if cmd.requires_login() { Some(require_user(ctx.store, ctx.config).await?) } else { None };

    let outcome = match (cmd, current) {
        (Command::Init, _) => crate::init::migrate(ctx.store).await,
        (Command::Register(args), _) => user::register(ctx.store, ctx.config, args).await,
        (Command::Login(args), _) => user::login(ctx.store, ctx.config, args).await,
        (Command::Reset, _) => user::reset(ctx.store).await,
        (Command::Users, _) => user::list(ctx.store, ctx.config).await,
        (Command::Agg(args), _) => scheduler::agg(ctx.store, args).await,
        (Command::Feeds, _) => feed::list_feeds(ctx.store).await,
        (Command::AddFeed(args), Some(u)) => feed::add_feed(ctx.store, &u, args).await,
        (Command::Follow(args), Some(u)) => feed::follow(ctx.store, &u, args).await,
        (Command::Following, Some(u)) => feed::following(ctx.store, &u).await,
        (Command::Unfollow(args), Some(u)) => feed::unfollow(ctx.store, &u, args).await,
        (Command::Browse(args), Some(u)) => post::browse(ctx.store, &u, args).await,
        (_, None) => Err(anyhow::anyhow!("no current user resolved")),
    };
    outcome.map_err(|source| DispatchError::Handler { command: name, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::mem::MemStore;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn unknown_command_is_rejected_by_name() {
        let err = parse_args(["gator", "bogus", "x"]).unwrap_err();
        match err {
            DispatchError::UnknownCommand(name) => assert_eq!(name, "bogus"),
            other => panic!("expected UnknownCommand, got {other:?}"),
        }
    }

    #[test]
    fn positional_commands_parse() {
        let cli = parse_args(["gator", "agg", "30s"]).unwrap();
        assert_eq!(cli.command, Command::Agg(AggArgs { interval: "30s".into() }));

        let cli = parse_args(["gator", "addfeed", "Boot.dev", "https://blog.boot.dev/index.xml"]).unwrap();
        assert_eq!(
            cli.command,
            Command::AddFeed(AddFeedArgs { name: "Boot.dev".into(), url: "https://blog.boot.dev/index.xml".into() })
        );
        assert!(cli.command.requires_login());

        let cli = parse_args(["gator", "--json", "browse"]).unwrap();
        assert!(cli.json);
        assert_eq!(cli.command, Command::Browse(BrowseArgs { limit: None }));

        let cli = parse_args(["gator", "browse", "10"]).unwrap();
        assert_eq!(cli.command, Command::Browse(BrowseArgs { limit: Some(10) }));
    }

    #[test]
    fn missing_arguments_are_usage_errors() {
        assert!(matches!(parse_args(["gator", "login"]), Err(DispatchError::Usage(_))));
        assert!(matches!(parse_args(["gator", "browse", "lots"]), Err(DispatchError::Usage(_))));
    }

    #[test]
    fn only_user_scoped_commands_require_login() {
        for cmd in [Command::Init, Command::Reset, Command::Users, Command::Feeds] {
            assert!(!cmd.requires_login(), "{}", cmd.name());
        }
        assert!(Command::Following.requires_login());
    }

    #[tokio::test]
    async fn require_user_without_config_user() {
        let store = MemStore::new();
        let err = require_user(&store, &Config::for_tests(None)).await.unwrap_err();
        assert!(matches!(err, DispatchError::NotLoggedIn));
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn require_user_with_unknown_name() {
        let store = MemStore::new();
        let err = require_user(&store, &Config::for_tests(Some("ghost"))).await.unwrap_err();
        assert!(matches!(err, DispatchError::NotLoggedIn));
    }

    #[tokio::test]
    async fn require_user_resolves_current_user() {
        let store = MemStore::new();
        let kahya = store.add_user("kahya");
        let user = require_user(&store, &Config::for_tests(Some("kahya"))).await.unwrap();
        assert_eq!(user, kahya);
    }

    #[test]
    fn handler_errors_keep_context() {
        let err = DispatchError::Handler { command: "follow", source: anyhow::anyhow!("no feed registered with url x") };
        assert_eq!(err.to_string(), "follow failed: no feed registered with url x");
    }
}
