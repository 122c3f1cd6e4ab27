use std::path::PathBuf;

use anyhow::Context;
use chrono::Datelike;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use katalog::{
    auth::SignUpOutcome,
    browse::{FilterOption, GroupPage, MemberPage, SearchOutcome, SearchSession, SubmissionsPage},
    config::Config,
    listing::{Filter, LoadMore, PhotocardFilter, SortMode},
    models::Photocard,
    upload::{CardKind, ImageFile, UploadForm},
    Katalog,
};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Account email; signs in before running the command
    #[arg(long, env = "KATALOG_EMAIL", global = true)]
    email: Option<String>,

    #[arg(long, env = "KATALOG_PASSWORD", global = true, hide_env_values = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List all groups
    Groups,
    /// Show a group's photocards
    Group {
        group_id: String,
        /// Member id, or "all"
        #[arg(long, default_value = "all")]
        member: Filter,
        /// Album title, or "all"
        #[arg(long, default_value = "all")]
        album: Filter,
        /// year-asc, year-desc, album-asc or album-desc
        #[arg(long)]
        sort: Option<SortMode>,
        /// Number of pages to load
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
    /// Show a member's photocards
    Member {
        group_id: String,
        member_id: String,
        #[arg(long, default_value = "all")]
        album: Filter,
    },
    /// Search groups, members and photocards
    Search {
        query: String,
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
    /// Show the signed-in user
    Me,
    /// List your submissions
    Submissions,
    /// Create an account with --email and --password
    Signup,
    /// Submit a new photocard
    Add(AddArgs),
}

#[derive(clap::Args, Debug)]
struct AddArgs {
    #[arg(long)]
    member: String,
    #[arg(long)]
    group: String,
    /// Defaults to the current year
    #[arg(long)]
    year: Option<i32>,
    /// Not from an album (fansign, event, ...); requires --description
    #[arg(long, conflicts_with_all = ["album", "version"], requires = "description")]
    other: bool,
    #[arg(long, required_unless_present = "other")]
    album: Option<String>,
    #[arg(long, required_unless_present = "other")]
    version: Option<String>,
    #[arg(long)]
    description: Option<String>,
    /// Front image
    #[arg(long)]
    front: PathBuf,
    /// Back image
    #[arg(long)]
    back: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());

    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    match log_format.to_lowercase().as_str() {
        "gcp" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_stackdriver::layer())
                .init();
        }
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_target(true)
                        .with_span_list(false)
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    let args = Args::parse();

    let config = Config::load()?;
    info!(api = %config.api.resolved_base(), "katalog {}", env!("CARGO_PKG_VERSION"));

    let app = Katalog::new(config)?;

    let Args {
        email,
        password,
        command,
    } = args;
    let credentials = Credentials { email, password };

    if !matches!(command, Command::Signup) && credentials.given() {
        let (email, password) = credentials.required()?;
        app.session.sign_in(email, password).await?;
    }

    let result = run(&app, &credentials, command).await;
    app.session.forget();
    result
}

struct Credentials {
    email: Option<String>,
    password: Option<String>,
}

impl Credentials {
    fn given(&self) -> bool {
        self.email.is_some() || self.password.is_some()
    }

    fn required(&self) -> anyhow::Result<(&str, &str)> {
        let email = self
            .email
            .as_deref()
            .context("--email (or KATALOG_EMAIL) is required")?;
        let password = self
            .password
            .as_deref()
            .context("--password (or KATALOG_PASSWORD) is required")?;
        Ok((email, password))
    }
}

async fn run(app: &Katalog, credentials: &Credentials, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Groups => {
            let groups = app.api.groups().await?;
            if groups.is_empty() {
                println!("No groups yet");
            }
            for group in groups {
                println!(
                    "{:<16} {} ({}) · {} · since {} · {} members",
                    group.id,
                    group.name,
                    group.korean_name,
                    group.company,
                    group.debut_year,
                    group.members.len()
                );
            }
        }
        Command::Group {
            group_id,
            member,
            album,
            sort,
            pages,
        } => {
            let mut page = GroupPage::load(&app.api, &group_id, app.config.page_size).await?;
            page.filter = PhotocardFilter { member, album };
            page.sort = sort;

            for _ in 1..pages {
                if !load_more(page.load_more().await) {
                    break;
                }
            }

            let group = &page.group;
            println!("{} ({})", group.name, group.korean_name);
            println!("{} · since {}", group.company, group.debut_year);
            println!(
                "{} members · {} photocards",
                group.members.len(),
                page.total_photocards()
            );
            print_options("Members", &page.member_options());
            print_options("Albums", &page.album_options());
            println!("Sort: {}", page.sort.unwrap_or(SortMode::YearAsc).label());
            println!();
            print_cards(&page.visible(), true);
            if page.has_more() {
                println!(
                    "... showing {} of {} (use --pages to load more)",
                    page.photocards().len(),
                    page.total_photocards()
                );
            }
        }
        Command::Member {
            group_id,
            member_id,
            album,
        } => {
            let mut page = MemberPage::load(&app.api, &group_id, &member_id).await?;
            page.album = album;

            let member = &page.member;
            println!("{} ({})", member.name, member.korean_name);
            println!(
                "{} photocards · {} albums",
                page.photocard_count(),
                page.albums().len()
            );
            print_options("Albums", &page.album_options());
            println!();
            let cards = page.visible();
            if cards.is_empty() {
                println!("No photocards found for this filter");
            }
            print_cards(&cards, false);
        }
        Command::Search { query, pages } => {
            let session = SearchSession::new(app.api.clone(), app.config.page_size);
            match session.search(&query).await? {
                SearchOutcome::Cleared => {
                    println!("Enter a search term");
                    return Ok(());
                }
                SearchOutcome::Loaded | SearchOutcome::Superseded => {}
            }
            for _ in 1..pages {
                if !load_more(session.load_more().await) {
                    break;
                }
            }

            println!(
                "Results for \"{}\": {} results",
                query,
                session.total_results()
            );
            let groups = session.groups();
            println!("\nGroups ({})", groups.len());
            for group in &groups {
                println!("  {:<16} {} ({})", group.id, group.name, group.korean_name);
            }
            let photocards = session.photocards();
            println!("\nPhotocards ({})", photocards.total());
            print_cards(&photocards.items(), true);
            if photocards.has_more() {
                println!(
                    "... showing {} of {} (use --pages to load more)",
                    photocards.len(),
                    photocards.total()
                );
            }
        }
        Command::Me => {
            let me = app.api.me().await?;
            println!(
                "{} {}",
                me.user.id,
                me.user.email.as_deref().unwrap_or("(no email)")
            );
        }
        Command::Submissions => {
            let page = SubmissionsPage::load(&app.api, &app.session).await?;
            if page.submissions.is_empty() {
                println!("No submissions yet");
            }
            for sub in &page.submissions {
                println!(
                    "{}  {:<8}  {} · {} · {} {}",
                    sub.submitted_at.format("%Y-%m-%d %H:%M"),
                    sub.status,
                    sub.group_name,
                    sub.member_name,
                    if sub.album == katalog::models::OTHER_ALBUM {
                        ""
                    } else {
                        sub.album.as_str()
                    },
                    sub.version
                );
            }
        }
        Command::Signup => {
            let (email, password) = credentials.required()?;
            match app.session.sign_up(email, password).await? {
                SignUpOutcome::SignedIn => println!("Account created and signed in as {email}"),
                SignUpOutcome::ConfirmationRequired => {
                    println!("Account created. Check {email} for a confirmation link, then sign in.")
                }
            }
        }
        Command::Add(add) => {
            let form = build_form(add).await?;
            match app.uploader.submit(&form).await {
                Ok(card) => println!("Photocard added: {}", card.id),
                Err(e) => anyhow::bail!(e.user_message()),
            }
        }
    }
    Ok(())
}

async fn build_form(add: AddArgs) -> anyhow::Result<UploadForm> {
    let kind = if add.other {
        CardKind::Other {
            description: add.description.unwrap_or_default(),
        }
    } else {
        CardKind::Album {
            album: add.album.unwrap_or_default(),
            version: add.version.unwrap_or_default(),
        }
    };

    let front = ImageFile::read(&add.front)
        .await
        .with_context(|| format!("Failed to read {}", add.front.display()))?;
    let back = match &add.back {
        Some(path) => Some(
            ImageFile::read(path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?,
        ),
        None => None,
    };

    Ok(UploadForm {
        member_name: add.member,
        group_name: add.group,
        year: add.year.unwrap_or_else(|| chrono::Utc::now().year()),
        kind,
        front: Some(front),
        back,
    })
}

/// Report a load-more outcome; returns whether another page may follow.
fn load_more(outcome: LoadMore) -> bool {
    match outcome {
        LoadMore::Appended(n) => n > 0,
        LoadMore::Failed(e) => {
            eprintln!("Could not load more photocards: {e}");
            false
        }
        LoadMore::Exhausted | LoadMore::InFlight | LoadMore::Stale => false,
    }
}

fn print_options(title: &str, options: &[FilterOption]) {
    let labels: Vec<String> = options
        .iter()
        .map(|o| {
            if o.value == o.label {
                o.label.clone()
            } else {
                format!("{} [{}]", o.label, o.value)
            }
        })
        .collect();
    println!("{title}: {}", labels.join(", "));
}

fn print_cards(cards: &[Photocard], show_member: bool) {
    for pc in cards {
        let mut line = format!("[{}]", pc.year);
        if show_member {
            line.push_str(&format!(" {}", pc.member_name));
        }
        if let Some(album) = pc.album_label() {
            line.push_str(&format!(" · {album}"));
        }
        line.push_str(&format!(" · {}", pc.description()));
        if let Some(badge) = pc.kind.badge() {
            line.push_str(&format!(" ({badge})"));
        }
        println!("{line}");
    }
}
