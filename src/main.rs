mod api;
mod auth;
mod config;
mod db;
mod error;
mod models;
mod reconcile;
mod store;
mod tui;

use clap::{ArgAction, ArgGroup, Args, Parser, Subcommand};
use std::path::PathBuf;

use api::{ApiClient, ExamPrepRequest};
use auth::{AuthSession, SESSION_KEY};
use config::Config;
use db::{Database, KeyValueStore};
use models::{Difficulty, ItemBody, ItemForm, ItemType, JsonOutput, PlanEntry};
use store::StudyPlanStore;
use tui::widgets::{bar, truncate};

#[derive(Parser)]
#[command(name = "rapid-revise")]
#[command(about = "Generate, track and complete exam study plans from the terminal")]
#[command(version)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Backend URL (overrides RAPID_REVISE_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize local storage
    Init,

    /// Show plan progress and stored keys
    Status,

    /// Manage the study plan
    #[command(subcommand)]
    Plan(PlanCommands),

    /// Manage videos, articles and questions in the plan
    #[command(subcommand)]
    Item(ItemCommands),

    /// Browse and vote on communities
    #[command(subcommand)]
    Community(CommunityCommands),

    /// Sign in and out of the backend
    #[command(subcommand)]
    Auth(AuthCommands),

    /// Launch interactive terminal UI
    Tui,
}

#[derive(Subcommand)]
enum PlanCommands {
    /// Show the plan overview
    Show,

    /// List plan entries
    List {
        /// Only one tab: videos, articles, questions or completed
        #[arg(long, short)]
        tab: Option<String>,
    },

    /// Generate a plan from a free-form prompt, optionally with a PDF syllabus
    Generate {
        /// What to study
        prompt: String,

        /// PDF file to upload with the prompt
        #[arg(long, short)]
        file: Option<PathBuf>,
    },

    /// Generate a plan from exam details
    Create {
        #[arg(long, short)]
        subject: String,

        /// Examination board
        #[arg(long, short)]
        board: String,

        #[arg(long, short)]
        class_level: String,

        #[arg(long, short)]
        department: String,
    },

    /// Discard the current plan
    Reset,

    /// Update plan metadata
    Set {
        /// easy, medium or hard
        #[arg(long, short)]
        difficulty: Option<String>,

        #[arg(long, short)]
        subject: Option<String>,
    },
}

#[derive(Args, Default)]
struct ItemFields {
    /// Video URL
    #[arg(long)]
    url: Option<String>,

    /// Video channel
    #[arg(long)]
    channel: Option<String>,

    /// Video duration, e.g. PT12M30S or "10 minutes"
    #[arg(long)]
    duration: Option<String>,

    /// Topic name for videos (defaults to the title)
    #[arg(long)]
    topic: Option<String>,

    /// Topic importance, 1-10
    #[arg(long, short, value_parser = clap::value_parser!(u8).range(1..=10))]
    importance: Option<u8>,

    /// Topic preparation time in minutes
    #[arg(long, short)]
    prep: Option<u32>,

    /// Article body
    #[arg(long, short)]
    content: Option<String>,

    /// Question text
    #[arg(long, short)]
    question: Option<String>,

    /// Answer text
    #[arg(long, short)]
    answer: Option<String>,
}

impl ItemFields {
    fn apply(self, form: &mut ItemForm) {
        if let Some(url) = self.url {
            form.url = url;
        }
        if let Some(channel) = self.channel {
            form.channel = channel;
        }
        if let Some(duration) = self.duration {
            form.duration = duration;
        }
        if let Some(topic) = self.topic {
            form.topic_name = topic;
        }
        if let Some(importance) = self.importance {
            form.importance = importance;
        }
        if let Some(prep) = self.prep {
            form.prep_time_minutes = prep;
        }
        if let Some(content) = self.content {
            form.content = content;
        }
        if let Some(question) = self.question {
            form.question = question;
        }
        if let Some(answer) = self.answer {
            form.answer = answer;
        }
    }
}

#[derive(Subcommand)]
enum ItemCommands {
    /// Add an entry to the plan
    Add {
        /// videos, articles or questions
        kind: String,

        /// Entry title
        title: String,

        #[command(flatten)]
        fields: ItemFields,
    },

    /// Show an entry, including the answer of a question
    Show {
        /// Entry ID
        id: String,
    },

    /// Edit an entry in place
    Edit {
        /// Entry ID
        id: String,

        /// New title
        #[arg(long, short)]
        title: Option<String>,

        #[command(flatten)]
        fields: ItemFields,
    },

    /// Delete an entry
    Delete {
        /// Entry ID
        id: String,
    },

    /// Flip an entry between done and not done
    Toggle {
        /// Entry ID
        id: String,
    },
}

#[derive(Subcommand)]
enum CommunityCommands {
    /// List all communities
    List,

    /// Show community details
    Show {
        /// Community ID
        id: String,
    },

    /// Create a community
    Create {
        name: String,

        #[arg(long, short)]
        description: Option<String>,
    },

    /// Vote a community up or down
    #[command(group(ArgGroup::new("direction").required(true).args(["up", "down"])))]
    Vote {
        /// Community ID
        id: String,

        #[arg(long)]
        up: bool,

        #[arg(long)]
        down: bool,
    },
}

#[derive(Subcommand)]
enum AuthCommands {
    /// Store a session token. Without --token, prints the sign-in URL
    Login {
        /// Session cookie value from the browser after signing in
        #[arg(long, short)]
        token: Option<String>,
    },

    /// Show the signed-in user
    Whoami,

    /// Sign out and forget the stored session
    Logout,
}

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn setup_logging(verbosity: u8) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let level = match verbosity {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

    // stdout is reserved for command output and --json
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_line_number(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

fn client_for(db: &Database, config: &Config) -> error::Result<ApiClient> {
    let mut client = ApiClient::new(&config.api_url);
    client.set_session(db.load(SESSION_KEY)?);
    tracing::debug!(url = client.base_url(), "using backend");
    Ok(client)
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env(cli.api_url.as_deref());
    let db = Database::open(&config.db_path)?;
    db.init()?;
    tracing::debug!(path = %config.db_path.display(), "opened storage");

    match cli.command {
        Commands::Init => {
            let store = StudyPlanStore::load(&db);
            if cli.json {
                println!("{}", serde_json::to_string(&JsonOutput::<()>::ok(()))?);
            } else {
                println!("Storage initialized at: {}", config.db_path.display());
                println!("Current plan: {}", store.plan().subject);
            }
        }

        Commands::Status => {
            let store = StudyPlanStore::load(&db);
            let summary = reconcile::summarize(store.plan());
            let keys = db.list_keys()?;

            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string(&JsonOutput::ok(serde_json::json!({
                        "subject": store.plan().subject,
                        "summary": summary,
                        "keys": keys
                    })))?
                );
            } else {
                println!("=== {} ===", store.plan().subject);
                println!(
                    "Progress: {}% ({}/{} done)",
                    summary.progress, summary.completed, summary.total
                );
                println!(
                    "Videos: {}  Articles: {}  Questions: {}",
                    summary.videos, summary.articles, summary.questions
                );
                println!();
                println!("{:<16} {:>8}  UPDATED", "KEY", "BYTES");
                println!("{}", "-".repeat(50));
                for key in keys {
                    println!("{:<16} {:>8}  {}", key.key, key.bytes, key.updated_at);
                }
            }
        }

        Commands::Plan(plan_cmd) => match plan_cmd {
            PlanCommands::Show => {
                let store = StudyPlanStore::load(&db);
                let plan = store.plan();
                let summary = reconcile::summarize(plan);

                if cli.json {
                    println!(
                        "{}",
                        serde_json::to_string(&JsonOutput::ok(serde_json::json!({
                            "plan": plan,
                            "summary": summary
                        })))?
                    );
                } else {
                    println!("Subject: {}", plan.subject);
                    println!("Difficulty: {}", plan.difficulty.label());
                    println!("Created: {}", plan.created_at.format("%b %d, %Y"));
                    println!("Total time: {} min", plan.total_time);
                    println!();
                    println!("--- Progress ---");
                    println!(
                        "{} {}% ({}/{} done)",
                        progress_bar(plan.progress, 20),
                        plan.progress,
                        summary.completed,
                        summary.total
                    );
                    println!(
                        "Videos: {} ({} min watch time)",
                        summary.videos, summary.watch_minutes
                    );
                    println!(
                        "Articles: {} ({} min reading)",
                        summary.articles, summary.reading_minutes
                    );
                    println!("Questions: {}", summary.questions);
                    println!("Prep remaining: {} min", summary.remaining_prep_minutes);
                }
            }

            PlanCommands::List { tab } => {
                let store = StudyPlanStore::load(&db);
                let tabs = &store.plan().tabs;
                let entries: Vec<PlanEntry> = match tab.as_deref() {
                    None => tabs.entries().collect(),
                    Some("completed") | Some("done") => tabs.completed(),
                    Some(name) => {
                        let kind = ItemType::from_str(name).ok_or_else(|| {
                            format!(
                                "Invalid tab '{}'. Use: videos, articles, questions or completed",
                                name
                            )
                        })?;
                        tabs.entries().filter(|e| e.item_type() == kind).collect()
                    }
                };

                if cli.json {
                    println!("{}", serde_json::to_string(&JsonOutput::ok(&entries))?);
                } else if entries.is_empty() {
                    println!("No items found.");
                } else {
                    println!("{:<22} {:<10} {:<5} TITLE", "ID", "TYPE", "DONE");
                    println!("{}", "-".repeat(75));
                    for entry in entries {
                        println!(
                            "{:<22} {:<10} {:<5} {}",
                            entry.id(),
                            entry.item_type().label(),
                            if entry.completed() { "[x]" } else { "[ ]" },
                            truncate(entry.title(), 40)
                        );
                    }
                }
            }

            PlanCommands::Generate { prompt, file } => {
                let client = client_for(&db, &config)?;
                let payload = client.generate_from_prompt(&prompt, file.as_deref())?;
                let mut store = StudyPlanStore::load(&db);
                store.import_generation(&payload)?;
                print_generated(&store, cli.json)?;
            }

            PlanCommands::Create {
                subject,
                board,
                class_level,
                department,
            } => {
                let client = client_for(&db, &config)?;
                let payload = client.generate_from_form(&ExamPrepRequest {
                    subject,
                    board,
                    class_level,
                    department,
                })?;
                let mut store = StudyPlanStore::load(&db);
                store.import_generation(&payload)?;
                print_generated(&store, cli.json)?;
            }

            PlanCommands::Reset => {
                let mut store = StudyPlanStore::load(&db);
                store.reset()?;
                if cli.json {
                    println!("{}", serde_json::to_string(&JsonOutput::<()>::ok(()))?);
                } else {
                    println!("Study plan reset.");
                }
            }

            PlanCommands::Set {
                difficulty,
                subject,
            } => {
                let mut store = StudyPlanStore::load(&db);
                if let Some(d) = difficulty {
                    let parsed = Difficulty::from_str(&d).ok_or_else(|| {
                        format!("Invalid difficulty '{}'. Use: easy, medium, or hard", d)
                    })?;
                    store.set_difficulty(parsed)?;
                }
                if let Some(s) = subject {
                    store.rename_subject(&s)?;
                }

                if cli.json {
                    println!("{}", serde_json::to_string(&JsonOutput::ok(store.plan()))?);
                } else {
                    println!(
                        "Plan: {} ({})",
                        store.plan().subject,
                        store.plan().difficulty.label()
                    );
                }
            }
        },

        Commands::Item(item_cmd) => match item_cmd {
            ItemCommands::Add {
                kind,
                title,
                fields,
            } => {
                let item_type = ItemType::from_str(&kind).ok_or_else(|| {
                    format!("Invalid kind '{}'. Use: videos, articles, or questions", kind)
                })?;

                let mut form = ItemForm {
                    item_type,
                    title: title.clone(),
                    ..ItemForm::default()
                };
                fields.apply(&mut form);

                let mut store = StudyPlanStore::load(&db);
                let id = store.add_item(&form)?;

                if cli.json {
                    println!(
                        "{}",
                        serde_json::to_string(&JsonOutput::ok(serde_json::json!({
                            "id": id,
                            "title": title,
                            "type": item_type
                        })))?
                    );
                } else {
                    println!("Added {} '{}' with ID: {}", item_type.label(), title, id);
                }
            }

            ItemCommands::Show { id } => {
                let store = StudyPlanStore::load(&db);
                match store.find(&id) {
                    Some(entry) if cli.json => {
                        println!("{}", serde_json::to_string(&JsonOutput::ok(entry))?);
                    }
                    Some(entry) => print_entry(entry),
                    None => not_found(cli.json)?,
                }
            }

            ItemCommands::Edit { id, title, fields } => {
                let mut store = StudyPlanStore::load(&db);
                let Some(entry) = store.find(&id) else {
                    return not_found(cli.json);
                };

                let mut form = ItemForm::from_entry(entry);
                if let Some(title) = title {
                    form.title = title;
                }
                fields.apply(&mut form);

                if store.edit_item(&id, &form)? {
                    if cli.json {
                        println!("{}", serde_json::to_string(&JsonOutput::<()>::ok(()))?);
                    } else {
                        println!("Item {} updated.", id);
                    }
                } else {
                    not_found(cli.json)?;
                }
            }

            ItemCommands::Delete { id } => {
                let mut store = StudyPlanStore::load(&db);
                if store.delete_item(&id)? {
                    if cli.json {
                        println!("{}", serde_json::to_string(&JsonOutput::<()>::ok(()))?);
                    } else {
                        println!("Item {} deleted.", id);
                    }
                } else {
                    not_found(cli.json)?;
                }
            }

            ItemCommands::Toggle { id } => {
                let mut store = StudyPlanStore::load(&db);
                match store.toggle_complete(&id)? {
                    Some(completed) => {
                        let progress = store.plan().progress;
                        if cli.json {
                            println!(
                                "{}",
                                serde_json::to_string(&JsonOutput::ok(serde_json::json!({
                                    "id": id,
                                    "completed": completed,
                                    "progress": progress
                                })))?
                            );
                        } else {
                            let state = if completed { "done" } else { "not done" };
                            println!("Item {} marked {}. Progress: {}%", id, state, progress);
                        }
                    }
                    None => not_found(cli.json)?,
                }
            }
        },

        Commands::Community(community_cmd) => {
            let client = client_for(&db, &config)?;
            match community_cmd {
                CommunityCommands::List => {
                    let communities = client.list_communities()?;
                    if cli.json {
                        println!("{}", serde_json::to_string(&JsonOutput::ok(&communities))?);
                    } else if communities.is_empty() {
                        println!("No communities found.");
                    } else {
                        println!("{:<26} {:<28} {:>6}  AUTHOR", "ID", "NAME", "SCORE");
                        println!("{}", "-".repeat(80));
                        for c in communities {
                            println!(
                                "{:<26} {:<28} {:>6}  {}",
                                c.id,
                                truncate(&c.name, 26),
                                c.score(),
                                c.author_name()
                            );
                        }
                    }
                }

                CommunityCommands::Show { id } => {
                    let community = client.get_community(&id)?;
                    if cli.json {
                        println!("{}", serde_json::to_string(&JsonOutput::ok(&community))?);
                    } else {
                        println!("Community: {}", community.name);
                        println!("ID: {}", community.id);
                        if !community.description.is_empty() {
                            println!("Description: {}", community.description);
                        }
                        println!("Created by: {}", community.author_name());
                        if let Some(members) = community.member_count {
                            println!("Members: {}", members);
                        }
                        println!(
                            "Votes: +{} / -{} (score {})",
                            community.upvotes,
                            community.downvotes,
                            community.score()
                        );
                    }
                }

                CommunityCommands::Create { name, description } => {
                    let community =
                        client.create_community(&name, description.as_deref().unwrap_or(""))?;
                    if cli.json {
                        println!("{}", serde_json::to_string(&JsonOutput::ok(&community))?);
                    } else {
                        println!(
                            "Created community '{}' with ID: {}",
                            community.name, community.id
                        );
                    }
                }

                CommunityCommands::Vote { id, up, down: _ } => {
                    let accepted = client.vote_community(&id, up)?;
                    if cli.json {
                        println!(
                            "{}",
                            serde_json::to_string(&JsonOutput::ok(serde_json::json!({
                                "id": id,
                                "accepted": accepted
                            })))?
                        );
                    } else if accepted {
                        println!("Vote recorded for community {}.", id);
                    } else {
                        println!("Vote was not accepted.");
                    }
                }
            }
        }

        Commands::Auth(auth_cmd) => {
            let mut client = client_for(&db, &config)?;
            match auth_cmd {
                AuthCommands::Login { token: None } => {
                    let url = client.login_url();
                    if cli.json {
                        println!(
                            "{}",
                            serde_json::to_string(&JsonOutput::ok(serde_json::json!({
                                "login_url": url
                            })))?
                        );
                    } else {
                        println!("Sign in at:");
                        println!("  {}", url);
                        println!();
                        println!("Then store the session cookie with:");
                        println!("  rapid-revise auth login --token <TOKEN>");
                    }
                }

                AuthCommands::Login { token: Some(token) } => {
                    let mut session = AuthSession::default();
                    let user = session.login(&db, &mut client, &token)?;
                    if cli.json {
                        println!("{}", serde_json::to_string(&JsonOutput::ok(user))?);
                    } else {
                        println!("Logged in as {} <{}>", user.name, user.email);
                    }
                }

                AuthCommands::Whoami => {
                    let session = AuthSession::init(&db, &mut client);
                    match session.user() {
                        Some(user) if cli.json => {
                            println!("{}", serde_json::to_string(&JsonOutput::ok(user))?);
                        }
                        Some(user) => {
                            println!("Name: {}", user.name);
                            println!("Email: {}", user.email);
                            if let Some(role) = &user.role {
                                println!("Role: {}", role);
                            }
                            if !user.interests.is_empty() {
                                println!("Interests: {}", user.interests.join(", "));
                            }
                        }
                        None => {
                            let msg = session.error().unwrap_or("Not logged in").to_string();
                            if cli.json {
                                println!(
                                    "{}",
                                    serde_json::to_string(&JsonOutput::<()>::err(msg))?
                                );
                            } else {
                                println!("{}.", msg);
                            }
                        }
                    }
                }

                AuthCommands::Logout => {
                    let mut session = AuthSession::init(&db, &mut client);
                    session.logout(&db, &mut client)?;
                    if cli.json {
                        println!("{}", serde_json::to_string(&JsonOutput::<()>::ok(()))?);
                    } else {
                        println!("Logged out.");
                    }
                }
            }
        }

        Commands::Tui => {
            tui::run(db)?;
        }
    }

    Ok(())
}

fn print_generated<S: KeyValueStore>(
    store: &StudyPlanStore<S>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let plan = store.plan();
    if json {
        println!("{}", serde_json::to_string(&JsonOutput::ok(plan))?);
    } else {
        println!("Generated plan: {}", plan.subject);
        println!(
            "Topics: {}  Questions: {}  Total time: {} min",
            plan.tabs.videos.len(),
            plan.tabs.questions.len(),
            plan.total_time
        );
    }
    Ok(())
}

fn print_entry(entry: PlanEntry) {
    println!("{}: {}", entry.item_type().label(), entry.title());
    println!("ID: {}", entry.id());
    println!("Done: {}", if entry.completed() { "yes" } else { "no" });

    match entry {
        PlanEntry::Topic(topic) => {
            println!("Importance: {}/10", topic.importance);
            println!("Prep time: {} min", topic.prep_time_minutes);
            for video in &topic.videos {
                println!();
                println!("  {} ({})", video.title, video.channel);
                println!("  {}", video.url);
                println!(
                    "  {} min, {} views",
                    models::parse_duration(&video.duration),
                    video.views
                );
            }
        }
        PlanEntry::Item(item) => match &item.body {
            ItemBody::Articles {
                content,
                read_time_minutes,
            } => {
                println!("Read time: {} min", read_time_minutes);
                println!();
                println!("{}", content);
            }
            ItemBody::Questions { question, answer } => {
                println!();
                println!("Q: {}", question);
                println!("A: {}", answer);
            }
        },
    }
}

fn not_found(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!(
            "{}",
            serde_json::to_string(&JsonOutput::<()>::err("Item not found"))?
        );
    } else {
        println!("Item not found.");
    }
    Ok(())
}

fn progress_bar(percent: u8, width: usize) -> String {
    bar((percent.min(100) as usize * width) / 100, width)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    mod progress_bar_tests {
        use super::*;

        #[test]
        fn empty_and_full() {
            assert_eq!(progress_bar(0, 4), "░░░░");
            assert_eq!(progress_bar(100, 4), "████");
        }

        #[test]
        fn half() {
            assert_eq!(progress_bar(50, 10), "█████░░░░░");
        }
    }

    mod item_fields_tests {
        use super::*;

        #[test]
        fn only_given_fields_change() {
            let mut form = ItemForm {
                item_type: ItemType::Questions,
                title: "Q".to_string(),
                question: "old".to_string(),
                answer: "kept".to_string(),
                ..ItemForm::default()
            };
            let fields = ItemFields {
                question: Some("new".to_string()),
                ..ItemFields::default()
            };
            fields.apply(&mut form);
            assert_eq!(form.question, "new");
            assert_eq!(form.answer, "kept");
            assert_eq!(form.importance, 5);
        }
    }

    mod cli_parsing_tests {
        use super::*;

        #[test]
        fn parse_init_command() {
            let cli = Cli::try_parse_from(["rapid-revise", "init"]).unwrap();
            assert!(!cli.json);
            assert_eq!(cli.verbose, 0);
            assert!(matches!(cli.command, Commands::Init));
        }

        #[test]
        fn parse_global_flags() {
            let cli = Cli::try_parse_from([
                "rapid-revise",
                "status",
                "--json",
                "-vv",
                "--api-url",
                "http://127.0.0.1:8080",
            ])
            .unwrap();
            assert!(cli.json);
            assert_eq!(cli.verbose, 2);
            assert_eq!(cli.api_url, Some("http://127.0.0.1:8080".to_string()));
            assert!(matches!(cli.command, Commands::Status));
        }

        #[test]
        fn parse_plan_list_with_tab() {
            let cli =
                Cli::try_parse_from(["rapid-revise", "plan", "list", "-t", "completed"]).unwrap();
            match cli.command {
                Commands::Plan(PlanCommands::List { tab }) => {
                    assert_eq!(tab, Some("completed".to_string()));
                }
                _ => panic!("Expected Plan List command"),
            }
        }

        #[test]
        fn parse_plan_generate_with_file() {
            let cli = Cli::try_parse_from([
                "rapid-revise",
                "plan",
                "generate",
                "Operating systems final",
                "--file",
                "syllabus.pdf",
            ])
            .unwrap();
            match cli.command {
                Commands::Plan(PlanCommands::Generate { prompt, file }) => {
                    assert_eq!(prompt, "Operating systems final");
                    assert_eq!(file, Some(PathBuf::from("syllabus.pdf")));
                }
                _ => panic!("Expected Plan Generate command"),
            }
        }

        #[test]
        fn parse_plan_create() {
            let cli = Cli::try_parse_from([
                "rapid-revise",
                "plan",
                "create",
                "--subject",
                "Cloud Computing",
                "--board",
                "AKTU",
                "--class-level",
                "4th Year",
                "--department",
                "CSE",
            ])
            .unwrap();
            match cli.command {
                Commands::Plan(PlanCommands::Create {
                    subject,
                    board,
                    class_level,
                    department,
                }) => {
                    assert_eq!(subject, "Cloud Computing");
                    assert_eq!(board, "AKTU");
                    assert_eq!(class_level, "4th Year");
                    assert_eq!(department, "CSE");
                }
                _ => panic!("Expected Plan Create command"),
            }
        }

        #[test]
        fn parse_plan_set() {
            let cli =
                Cli::try_parse_from(["rapid-revise", "plan", "set", "-d", "hard"]).unwrap();
            match cli.command {
                Commands::Plan(PlanCommands::Set {
                    difficulty,
                    subject,
                }) => {
                    assert_eq!(difficulty, Some("hard".to_string()));
                    assert!(subject.is_none());
                }
                _ => panic!("Expected Plan Set command"),
            }
        }

        #[test]
        fn parse_item_add_video() {
            let cli = Cli::try_parse_from([
                "rapid-revise",
                "item",
                "add",
                "videos",
                "Intro to S3",
                "--url",
                "https://youtube.com/watch?v=x",
                "-i",
                "8",
                "-p",
                "30",
            ])
            .unwrap();
            match cli.command {
                Commands::Item(ItemCommands::Add {
                    kind,
                    title,
                    fields,
                }) => {
                    assert_eq!(kind, "videos");
                    assert_eq!(title, "Intro to S3");
                    assert_eq!(fields.importance, Some(8));
                    assert_eq!(fields.prep, Some(30));
                    assert!(fields.content.is_none());
                }
                _ => panic!("Expected Item Add command"),
            }
        }

        #[test]
        fn parse_item_add_rejects_importance_out_of_range() {
            let result = Cli::try_parse_from([
                "rapid-revise",
                "item",
                "add",
                "videos",
                "x",
                "--importance",
                "11",
            ]);
            assert!(result.is_err());
        }

        #[test]
        fn parse_item_add_question() {
            let cli = Cli::try_parse_from([
                "rapid-revise",
                "item",
                "add",
                "questions",
                "Elasticity",
                "-q",
                "What is elasticity?",
                "-a",
                "Scaling with demand",
            ])
            .unwrap();
            match cli.command {
                Commands::Item(ItemCommands::Add { fields, .. }) => {
                    assert_eq!(fields.question, Some("What is elasticity?".to_string()));
                    assert_eq!(fields.answer, Some("Scaling with demand".to_string()));
                }
                _ => panic!("Expected Item Add command"),
            }
        }

        #[test]
        fn parse_item_edit() {
            let cli = Cli::try_parse_from([
                "rapid-revise",
                "item",
                "edit",
                "lq3x9k2abc",
                "--title",
                "S3 Deep Dive",
            ])
            .unwrap();
            match cli.command {
                Commands::Item(ItemCommands::Edit { id, title, fields }) => {
                    assert_eq!(id, "lq3x9k2abc");
                    assert_eq!(title, Some("S3 Deep Dive".to_string()));
                    assert!(fields.url.is_none());
                }
                _ => panic!("Expected Item Edit command"),
            }
        }

        #[test]
        fn parse_item_toggle_and_delete() {
            let cli = Cli::try_parse_from(["rapid-revise", "item", "toggle", "abc"]).unwrap();
            assert!(matches!(
                cli.command,
                Commands::Item(ItemCommands::Toggle { ref id }) if id == "abc"
            ));

            let cli = Cli::try_parse_from(["rapid-revise", "item", "delete", "abc"]).unwrap();
            assert!(matches!(
                cli.command,
                Commands::Item(ItemCommands::Delete { ref id }) if id == "abc"
            ));
        }

        #[test]
        fn parse_community_vote_requires_direction() {
            let result = Cli::try_parse_from(["rapid-revise", "community", "vote", "c1"]);
            assert!(result.is_err());

            let result =
                Cli::try_parse_from(["rapid-revise", "community", "vote", "c1", "--up", "--down"]);
            assert!(result.is_err());

            let cli =
                Cli::try_parse_from(["rapid-revise", "community", "vote", "c1", "--down"]).unwrap();
            match cli.command {
                Commands::Community(CommunityCommands::Vote { id, up, down }) => {
                    assert_eq!(id, "c1");
                    assert!(!up);
                    assert!(down);
                }
                _ => panic!("Expected Community Vote command"),
            }
        }

        #[test]
        fn parse_auth_login_token_optional() {
            let cli = Cli::try_parse_from(["rapid-revise", "auth", "login"]).unwrap();
            assert!(matches!(
                cli.command,
                Commands::Auth(AuthCommands::Login { token: None })
            ));

            let cli =
                Cli::try_parse_from(["rapid-revise", "auth", "login", "--token", "abc"]).unwrap();
            match cli.command {
                Commands::Auth(AuthCommands::Login { token }) => {
                    assert_eq!(token, Some("abc".to_string()));
                }
                _ => panic!("Expected Auth Login command"),
            }
        }

        #[test]
        fn parse_tui_command() {
            let cli = Cli::try_parse_from(["rapid-revise", "tui"]).unwrap();
            assert!(matches!(cli.command, Commands::Tui));
        }

        #[test]
        fn parse_invalid_command_fails() {
            let result = Cli::try_parse_from(["rapid-revise", "invalid"]);
            assert!(result.is_err());
        }

        #[test]
        fn parse_missing_required_arg_fails() {
            // item add requires kind and title
            let result = Cli::try_parse_from(["rapid-revise", "item", "add", "videos"]);
            assert!(result.is_err());

            // plan create requires all four fields
            let result =
                Cli::try_parse_from(["rapid-revise", "plan", "create", "--subject", "OS"]);
            assert!(result.is_err());
        }
    }
}
