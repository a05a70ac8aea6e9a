// Allow panic/unwrap/expect in tests (denied globally via Cargo.toml lints)
#![cfg_attr(
    test,
    allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic_in_result_fn,
        clippy::unwrap_in_result,
        clippy::arithmetic_side_effects,
        clippy::indexing_slicing
    )
)]

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use futures::TryStreamExt as _;
use std::io::Write as _;
use std::path::PathBuf;
use std::sync::Arc;
use tagspace::logging::{self, init_logging, parse_rotation, LogConfig, LOG_FILENAME};
use tagspace::tag::join_tags;
use tagspace::utils::{default_store_path, tagspace_home};
use tagspace::{
    config, split_into_tags, AllowAll, DefaultTagProvider, JsonFileBackend, OpenCatalog,
    ProviderOptions, RealmRegistry, Requester, Resource, TagSet, TagStore, TagSystem,
    TagsConfig,
};
use tracing::{debug, warn};

/// Tagspace - tag queries and tag history for realm-partitioned resources
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path of the JSON tag store (default: ~/.tagspace/tags.json)
    #[arg(long, env = "TAGSPACE_STORE")]
    store: Option<PathBuf>,

    /// Path of the config file (default: ~/.tagspace/config.toml)
    #[arg(long, env = "TAGSPACE_CONFIG")]
    config: Option<PathBuf>,

    /// User recorded as the author of changes
    #[arg(long, env = "TAGSPACE_USER", default_value = Requester::ANONYMOUS)]
    user: String,

    /// Enable JSON log format (for production/log aggregation)
    #[arg(long, env = "TAGSPACE_LOG_JSON", default_value = "false")]
    log_json: bool,

    /// Log rotation period: daily, hourly, or never
    #[arg(long, env = "TAGSPACE_LOG_ROTATION", default_value = "daily")]
    log_rotation: String,

    /// Custom log directory (default: ~/.tagspace/logs)
    #[arg(long, env = "TAGSPACE_LOG_DIR")]
    log_dir: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List resources matching a tag query, e.g. `"a b or -c realm:wiki"`
    Query { query: String },
    /// Show the tags of a resource
    Get { realm: String, id: String },
    /// Replace the tags of a resource
    Set {
        realm: String,
        id: String,
        tags: Vec<String>,
        #[arg(long, default_value = "")]
        comment: String,
    },
    /// Add tags to a resource
    Add {
        realm: String,
        id: String,
        #[arg(required = true)]
        tags: Vec<String>,
        #[arg(long, default_value = "")]
        comment: String,
    },
    /// Remove some tags from a resource, or all of them when none are given
    Remove {
        realm: String,
        id: String,
        tags: Vec<String>,
        #[arg(long, default_value = "")]
        comment: String,
    },
    /// Replace tags on every resource holding any of them
    Replace {
        #[arg(required = true)]
        old: Vec<String>,
        /// Tag to put in their place
        #[arg(long = "with")]
        new: Option<String>,
        /// Allow resources to end up without tags
        #[arg(long)]
        allow_delete: bool,
        /// Limit to these realms
        #[arg(long = "realm")]
        realms: Vec<String>,
        #[arg(long, default_value = "")]
        comment: String,
    },
    /// Move tags and history after a resource was renamed
    Rename {
        realm: String,
        old_id: String,
        new_id: String,
        #[arg(long, default_value = "")]
        comment: String,
    },
    /// Forget a deleted resource, history included
    Destroy { realm: String, id: String },
    /// Show the tag change log of a resource
    History { realm: String, id: String },
    /// Show the tags a resource had at an RFC 3339 timestamp
    At {
        realm: String,
        id: String,
        timestamp: String,
    },
    /// Show tag frequencies
    Tags {
        #[arg(long = "realm")]
        realms: Vec<String>,
        /// Only the N most frequent tags
        #[arg(long)]
        limit: Option<usize>,
    },
    /// List the realms that can carry tags
    Realms,
}

fn tag_args(args: &[String]) -> TagSet {
    split_into_tags(&args.join(" "))
}

fn realm_filter(realms: &[String]) -> Option<&[String]> {
    (!realms.is_empty()).then_some(realms)
}

fn build_system(config: &TagsConfig, store: &Arc<TagStore>) -> Result<TagSystem> {
    let mut builder = RealmRegistry::builder();
    for realm in config.realm_names() {
        let options = ProviderOptions::for_realm(config, &realm);
        let provider = DefaultTagProvider::new(
            realm,
            Arc::clone(store),
            Arc::new(AllowAll),
            Arc::new(OpenCatalog),
            options,
        );
        builder = builder.register(Arc::new(provider))?;
    }
    Ok(TagSystem::new(builder.build()))
}

#[allow(unknown_lints, max_lines_per_function, clippy::too_many_lines)]
async fn run(system: &TagSystem, requester: &Requester, command: Command) -> Result<()> {
    let mut out = std::io::stdout();
    match command {
        Command::Query { query } => {
            let mut matches = system.query(requester, &query, None)?;
            while let Some(hit) = matches.try_next().await? {
                writeln!(out, "{}\t{}", hit.resource, join_tags(&hit.tags))?;
            }
        }
        Command::Get { realm, id } => {
            let tags = system.get_tags(requester, &Resource::new(realm, id)).await?;
            writeln!(out, "{}", join_tags(&tags))?;
        }
        Command::Set {
            realm,
            id,
            tags,
            comment,
        } => {
            let resource = Resource::new(realm, id);
            system
                .set_tags(requester, &resource, &tag_args(&tags), &comment)
                .await?;
        }
        Command::Add {
            realm,
            id,
            tags,
            comment,
        } => {
            let resource = Resource::new(realm, id);
            system
                .add_tags(requester, &resource, &tag_args(&tags), &comment)
                .await?;
        }
        Command::Remove {
            realm,
            id,
            tags,
            comment,
        } => {
            let resource = Resource::new(realm, id);
            let unwanted = (!tags.is_empty()).then(|| tag_args(&tags));
            system
                .delete_tags(requester, &resource, unwanted.as_ref(), &comment)
                .await?;
        }
        Command::Replace {
            old,
            new,
            allow_delete,
            realms,
            comment,
        } => {
            let summary = system
                .replace_tag(
                    requester,
                    &tag_args(&old),
                    new.as_deref(),
                    &comment,
                    allow_delete,
                    realm_filter(&realms),
                )
                .await?;
            writeln!(
                out,
                "{} updated, {} cleared",
                summary.updated, summary.cleared
            )?;
        }
        Command::Rename {
            realm,
            old_id,
            new_id,
            comment,
        } => {
            let old = Resource::new(realm.as_str(), old_id);
            let new = Resource::new(realm, new_id);
            system.reparent_tags(requester, &old, &new, &comment).await?;
        }
        Command::Destroy { realm, id } => {
            system.resource_destroyed(&Resource::new(realm, id)).await?;
        }
        Command::History { realm, id } => {
            let resource = Resource::new(realm, id);
            for record in system.tag_changes(requester, &resource).await? {
                let when = record
                    .timestamp()
                    .map_or_else(|| record.time.to_string(), |t| t.to_rfc3339());
                writeln!(
                    out,
                    "{when}\t{}\t[{}] -> [{}]",
                    record.author, record.old_tags, record.new_tags
                )?;
            }
        }
        Command::At {
            realm,
            id,
            timestamp,
        } => {
            let at = DateTime::parse_from_rfc3339(&timestamp)?.with_timezone(&Utc);
            let tags = system
                .tags_at(requester, &Resource::new(realm, id), at)
                .await?;
            writeln!(out, "{}", join_tags(&tags))?;
        }
        Command::Tags { realms, limit } => {
            let counter = system
                .get_all_tags(requester, realm_filter(&realms))
                .await?;
            for (tag, count) in counter.most_common(limit) {
                writeln!(out, "{count}\t{tag}")?;
            }
        }
        Command::Realms => {
            for realm in system.taggable_realms(Some(requester)) {
                writeln!(out, "{realm}")?;
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Install color-eyre error hooks for colored error output
    color_eyre::install()?;

    let args = Args::parse();

    let log_dir = args
        .log_dir
        .as_ref()
        .map_or_else(|| tagspace_home().join("logs"), PathBuf::from);
    let log_file = log_dir.join(LOG_FILENAME);
    logging::set_log_file_path(log_file.to_string_lossy().to_string());

    let log_config = LogConfig {
        log_dir,
        json_format: args.log_json,
        rotation: parse_rotation(&args.log_rotation),
        ..Default::default()
    };
    if let Err(e) = init_logging(log_config) {
        eprintln!("Error: Failed to initialize logging: {e}");
        eprintln!("Logs: {}", logging::get_log_file_path());
        return Err(e);
    }

    let tags_config = match &args.config {
        Some(path) => config::load_config_from(path)?,
        None => config::load_config().unwrap_or_else(|e| {
            warn!("Failed to load config, using defaults: {e}");
            TagsConfig::default()
        }),
    };

    let store_path = args.store.clone().unwrap_or_else(default_store_path);
    debug!("Using tag store {}", store_path.display());
    let store = Arc::new(TagStore::open(Arc::new(JsonFileBackend::new(store_path))).await?);
    let system = build_system(&tags_config, &store)?;

    let outcome = run(&system, &Requester::new(args.user), args.command).await;
    if outcome.is_err() {
        eprintln!("Logs: {}", logging::get_log_file_path());
    }
    outcome
}
