//! Command line interface
//!
//! Every subcommand loads the configuration, logs in as the selected user,
//! runs one operation and prints its result as JSON.

pub mod logging;

use crate::{
    WikiClient,
    config::{ConfigLoader, Settings, WikiSettings, default_config_path, encrypt_password},
    types::{
        BlockOptions, EditOptions, EmailMessage, MoveOptions, ProtectOptions, Protection,
        UploadRequest,
    },
    utils::version,
};
use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::{Value, json};
use std::io::{BufRead, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Parser)]
#[command(name = "wikibot", author, version, about = "MediaWiki bot client", long_about = None)]
pub struct Cli {
    /// Configuration file
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Configured user to act as
    #[arg(short, long, global = true, value_name = "NAME")]
    pub user: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the wikitext of a page
    Get { title: String },
    /// Print a page with its id and namespace
    Info { title: String },
    /// Print the XML export of a page
    Export { title: String },
    /// Replace the text of a page
    Edit(EditArgs),
    /// Create a page that does not exist yet
    Create(CreateArgs),
    /// Move a page
    Move(MoveArgs),
    /// Delete a page
    Delete(ReasonArgs),
    /// Restore a deleted page
    Undelete(ReasonArgs),
    /// Protect an existing page
    Protect(ProtectArgs),
    /// Protect a missing title against creation
    ProtectTitle(ProtectTitleArgs),
    /// Block a user
    Block(BlockArgs),
    /// Unblock a user
    Unblock {
        user: String,
        #[arg(long, default_value = "")]
        reason: String,
    },
    /// Upload a file from a URL or the local disk
    Upload(UploadArgs),
    /// Email a user through the wiki
    Email(EmailArgs),
    /// List the categories of a page
    Categories { title: String },
    /// List the members of a category
    CategoryMembers(CategoryArgs),
    /// Print site information
    Siteinfo {
        /// Single field of the general site information
        field: Option<String>,
    },
    /// Encrypt a password for the configuration file
    EncodePassword {
        /// Read the password from stdin instead of prompting
        #[arg(long)]
        stdin: bool,
    },
    /// Write a starter configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Validate the configuration and every configured user
    CheckConfig,
}

#[derive(Debug, Args)]
pub struct TextSource {
    /// New page text
    #[arg(long, conflicts_with = "file")]
    text: Option<String>,
    /// Read the page text from a file (stdin when neither is given)
    #[arg(long)]
    file: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct EditArgs {
    title: String,
    #[command(flatten)]
    source: TextSource,
    #[arg(short, long, default_value = "")]
    summary: String,
    #[arg(long)]
    minor: bool,
    /// Mark as a bot edit (also honors bot exclusion templates)
    #[arg(long)]
    bot: bool,
    /// Allow saving empty text
    #[arg(long)]
    force: bool,
}

#[derive(Debug, Args)]
pub struct CreateArgs {
    title: String,
    #[command(flatten)]
    source: TextSource,
    #[arg(short, long, default_value = "")]
    summary: String,
}

#[derive(Debug, Args)]
pub struct MoveArgs {
    from: String,
    to: String,
    #[arg(long, default_value = "")]
    reason: String,
    /// Leave the talk page behind
    #[arg(long)]
    no_talk: bool,
    #[arg(long)]
    subpages: bool,
    #[arg(long)]
    no_redirect: bool,
}

#[derive(Debug, Args)]
pub struct ReasonArgs {
    title: String,
    #[arg(long, default_value = "")]
    reason: String,
}

#[derive(Debug, Args)]
pub struct ProtectArgs {
    title: String,
    /// `action=level`, repeatable (e.g. `edit=sysop`)
    #[arg(
        long = "protection",
        value_name = "ACTION=LEVEL",
        required = true,
        value_parser = parse_protection
    )]
    protections: Vec<Protection>,
    #[arg(long, default_value = "infinite")]
    expiry: String,
    #[arg(long)]
    cascade: bool,
    #[arg(long, default_value = "")]
    reason: String,
}

#[derive(Debug, Args)]
pub struct ProtectTitleArgs {
    title: String,
    #[arg(long, default_value = "sysop")]
    level: String,
    #[arg(long, default_value = "infinite")]
    expiry: String,
    #[arg(long, default_value = "")]
    reason: String,
}

#[derive(Debug, Args)]
pub struct BlockArgs {
    user: String,
    #[arg(long, default_value = "infinite")]
    expiry: String,
    #[arg(long, default_value = "")]
    reason: String,
    #[arg(long)]
    anon_only: bool,
    /// Let the user keep creating accounts
    #[arg(long)]
    allow_create: bool,
    #[arg(long)]
    no_autoblock: bool,
    #[arg(long)]
    no_email: bool,
    #[arg(long)]
    reblock: bool,
}

#[derive(Debug, Args)]
pub struct UploadArgs {
    /// Target file name without the `File:` prefix
    filename: String,
    #[arg(long, conflicts_with = "file", required_unless_present = "file")]
    url: Option<String>,
    #[arg(long)]
    file: Option<PathBuf>,
    #[arg(long, default_value = "")]
    comment: String,
    /// Description page text
    #[arg(long)]
    text: Option<String>,
    #[arg(long)]
    ignore_warnings: bool,
}

#[derive(Debug, Args)]
pub struct EmailArgs {
    target: String,
    #[arg(long)]
    subject: String,
    #[arg(long)]
    text: String,
    #[arg(long)]
    cc_me: bool,
}

#[derive(Debug, Args)]
pub struct CategoryArgs {
    category: String,
    /// Continue from a cursor printed by an earlier call
    #[arg(long)]
    cursor: Option<String>,
    #[arg(long, default_value_t = 50)]
    limit: u32,
    /// Follow cursors until the whole category is listed
    #[arg(long, conflicts_with = "cursor")]
    all: bool,
}

fn parse_protection(text: &str) -> std::result::Result<Protection, String> {
    Protection::parse(text).ok_or_else(|| format!("expected ACTION=LEVEL, got '{text}'"))
}

/// Run one command line invocation
pub async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.clone().or_else(default_config_path);

    if let Command::Init { force } = cli.command {
        let path = config_path.context("no configuration directory on this system")?;
        write_starter_config(&path, force)?;
        return print_json(&json!({"config": path}));
    }

    let settings = ConfigLoader::new().load(config_path.as_deref())?;
    logging::init_logging(&settings, cli.verbose)?;
    debug!("wikibot {} using {:?}", version::get_version(), config_path);

    match cli.command {
        Command::EncodePassword { stdin } => {
            if settings.key.trim().is_empty() {
                bail!("set 'key' in the configuration before encoding passwords");
            }
            let password = if stdin {
                read_password_line()?
            } else {
                prompt_password()?
            };
            let blob = encrypt_password(&password, &settings.key)?;
            print_json(&json!({"password": blob}))
        }
        Command::CheckConfig => {
            let mut users = Vec::new();
            for name in settings.users.keys() {
                let profile = settings.profile(name)?;
                users.push(json!({
                    "user": name,
                    "wiki": profile.wiki_id,
                    "api": profile.api_url.as_str(),
                }));
            }
            print_json(&json!({
                "wikis": settings.wiki.keys().collect::<Vec<_>>(),
                "users": users,
            }))
        }
        command => {
            let user = select_user(&settings, cli.user.as_deref())?;
            let profile = settings.profile(&user)?;
            info!("Connecting to {} as {}", profile.api_url, user);

            let client = WikiClient::connect(profile).await?;
            let result = execute(&client, command).await;
            client.close().await;
            print_json(&result?)
        }
    }
}

async fn execute(client: &WikiClient, command: Command) -> Result<Value> {
    let value = match command {
        Command::Get { title } => {
            let text = client.get_page(&title).await?;
            json!({"title": title, "text": text})
        }
        Command::Info { title } => to_json(client.fetch_page(&title).await?)?,
        Command::Export { title } => to_json(client.export_page(&title).await?)?,
        Command::Edit(args) => {
            let text = args.source.read()?;
            let options = EditOptions::new(args.summary)
                .with_minor(args.minor)
                .with_bot(args.bot)
                .with_force(args.force);
            to_json(client.edit_page(&args.title, &text, &options).await?)?
        }
        Command::Create(args) => {
            let text = args.source.read()?;
            to_json(client.create_page(&args.title, &text, &args.summary).await?)?
        }
        Command::Move(args) => {
            let options = MoveOptions::new(args.reason)
                .with_move_talk(!args.no_talk)
                .with_move_subpages(args.subpages)
                .with_no_redirect(args.no_redirect);
            to_json(client.move_page(&args.from, &args.to, &options).await?)?
        }
        Command::Delete(args) => to_json(client.delete_page(&args.title, &args.reason).await?)?,
        Command::Undelete(args) => {
            to_json(client.undelete_page(&args.title, &args.reason).await?)?
        }
        Command::Protect(args) => {
            let mut options = ProtectOptions::new(args.reason)
                .with_expiry(args.expiry)
                .with_cascade(args.cascade);
            options.protections = args.protections;
            to_json(client.protect_page(&args.title, &options).await?)?
        }
        Command::ProtectTitle(args) => {
            let options = ProtectOptions::new(args.reason)
                .with_protection("create", args.level)
                .with_expiry(args.expiry);
            to_json(client.protect_title(&args.title, &options).await?)?
        }
        Command::Block(args) => {
            let options = BlockOptions::new(args.reason)
                .with_expiry(args.expiry)
                .with_anon_only(args.anon_only)
                .with_no_create(!args.allow_create)
                .with_autoblock(!args.no_autoblock)
                .with_no_email(args.no_email)
                .with_reblock(args.reblock);
            to_json(client.block_user(&args.user, &options).await?)?
        }
        Command::Unblock { user, reason } => to_json(client.unblock_user(&user, &reason).await?)?,
        Command::Upload(args) => {
            let request = match (args.url, args.file) {
                (Some(url), _) => UploadRequest::from_url(&args.filename, url),
                (None, Some(file)) => UploadRequest::from_file(&args.filename, file),
                (None, None) => bail!("give --url or --file"),
            };
            let mut request = request
                .with_comment(args.comment)
                .with_ignore_warnings(args.ignore_warnings);
            if let Some(text) = args.text {
                request = request.with_text(text);
            }
            to_json(client.upload(&request).await?)?
        }
        Command::Email(args) => {
            let message = EmailMessage::new(args.subject, args.text).with_cc_me(args.cc_me);
            client.email_user(&args.target, &message).await?;
            json!({"target": args.target, "sent": true})
        }
        Command::Categories { title } => {
            let categories = client.page_categories(&title).await?;
            json!({"title": title, "categories": categories})
        }
        Command::CategoryMembers(args) => {
            let members = if args.all {
                client.all_category_members(&args.category).await?
            } else {
                client
                    .category_members(&args.category, args.cursor.as_deref(), args.limit)
                    .await?
            };
            json!({"category": args.category, "members": members})
        }
        Command::Siteinfo { field } => match field {
            Some(field) => client.site_info_field(&field).await?,
            None => Value::Object(client.site_info().await?),
        },
        Command::EncodePassword { .. } | Command::Init { .. } | Command::CheckConfig => {
            bail!("command does not talk to a wiki")
        }
    };
    Ok(value)
}

impl TextSource {
    fn read(&self) -> Result<String> {
        if let Some(text) = &self.text {
            return Ok(text.clone());
        }
        if let Some(path) = &self.file {
            return std::fs::read_to_string(path)
                .with_context(|| format!("cannot read {}", path.display()));
        }
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("cannot read page text from stdin")?;
        Ok(text)
    }
}

/// The `--user` choice, or the only configured user
fn select_user(settings: &Settings, requested: Option<&str>) -> Result<String> {
    if let Some(user) = requested {
        return Ok(user.to_string());
    }
    let mut users = settings.users.keys();
    match (users.next(), users.next()) {
        (Some(only), None) => Ok(only.clone()),
        (None, _) => bail!("no users configured; add a [users.<name>] section"),
        _ => bail!("several users configured; pick one with --user"),
    }
}

fn read_password_line() -> Result<String> {
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("cannot read password from stdin")?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        bail!("empty password");
    }
    Ok(password)
}

fn prompt_password() -> Result<String> {
    dialoguer::Password::with_theme(&dialoguer::theme::ColorfulTheme::default())
        .with_prompt("Password")
        .with_confirmation("Repeat password", "Passwords do not match")
        .interact()
        .context("cannot read password")
}

fn write_starter_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists, use --force to overwrite", path.display());
    }

    let mut settings = Settings::default();
    settings.wiki.insert(
        "example".to_string(),
        WikiSettings {
            name: "Example Wiki".to_string(),
            api: "https://wiki.example.org/w/api.php".to_string(),
            epm: 10,
        },
    );

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::write(path, settings.to_toml()?)?;
    Ok(())
}

fn to_json<T: Serialize>(value: T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
