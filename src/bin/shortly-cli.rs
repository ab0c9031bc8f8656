use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

use shortly_client::config::load_or_default;
use shortly_client::models::UploadRequest;
use shortly_client::observability::logging::init_logging;
use shortly_client::{Outcome, ShortlyClient};

#[derive(Parser)]
#[command(name = "shortly-cli")]
#[command(about = "Command-line client for the Shortly video backend", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the backend base URL
    #[arg(short, long)]
    url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account
    Signup { username: String, email: String, password: String },
    /// Log in and store the session
    Login { email: String, password: String },
    /// Forget the stored session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// List the public feed
    Feed {
        #[arg(long, default_value_t = 0)]
        page: u32,
        #[arg(long, default_value_t = 20)]
        size: u32,
    },
    /// Search videos by keyword
    Search {
        keyword: String,
        #[arg(long, default_value_t = 0)]
        page: u32,
        #[arg(long, default_value_t = 10)]
        size: u32,
    },
    /// List videos with a tag
    Tag {
        tag: String,
        #[arg(long, default_value_t = 0)]
        page: u32,
        #[arg(long, default_value_t = 20)]
        size: u32,
    },
    /// Like a video
    Like { video_id: i64 },
    /// Remove a like
    Unlike { video_id: i64 },
    /// List comments on a video
    Comments { video_id: i64 },
    /// Comment on a video
    Comment { video_id: i64, content: String },
    /// Upload a video file
    Upload {
        file: PathBuf,
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Comma-separated tags
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,
    },
    /// Manage favorite tags
    Favorites {
        #[command(subcommand)]
        action: FavoriteAction,
    },
    /// Subscribe to a creator
    Subscribe { creator_id: i64 },
    /// Unsubscribe from a creator
    Unsubscribe { creator_id: i64 },
    /// List subscribed creators
    Creators,
    /// Change the account password
    ChangePassword { current: String, new: String },
}

#[derive(Subcommand)]
enum FavoriteAction {
    List,
    Add { tag: String },
    Remove { tag: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = load_or_default(cli.config.as_deref())?;
    if let Some(url) = cli.url {
        config.api.base_url = url;
    }
    init_logging(&config.observability);

    let client = ShortlyClient::new(&config)?;

    match cli.command {
        Commands::Signup { username, email, password } => {
            print_outcome(client.auth().signup(&username, &email, &password).await?)?;
        }
        Commands::Login { email, password } => {
            print_outcome(client.auth().login(&email, &password).await?)?;
        }
        Commands::Logout => {
            client.auth().logout();
            print_json(&json!({ "success": true, "message": "Logged out" }))?;
        }
        Commands::Whoami => match client.auth().current_user() {
            Some(user) => print_json(&user)?,
            None => eprintln!("Not logged in"),
        },
        Commands::Feed { page, size } => {
            print_outcome(client.videos().list(page, size).await?)?;
        }
        Commands::Search { keyword, page, size } => {
            print_outcome(client.search().by_keyword(&keyword, page, size).await?)?;
        }
        Commands::Tag { tag, page, size } => {
            print_outcome(client.search().by_tag(&tag, page, size).await?)?;
        }
        Commands::Like { video_id } => {
            print_outcome(client.videos().like(video_id).await?)?;
        }
        Commands::Unlike { video_id } => {
            print_outcome(client.videos().unlike(video_id).await?)?;
        }
        Commands::Comments { video_id } => {
            print_outcome(client.comments().list(video_id).await?)?;
        }
        Commands::Comment { video_id, content } => {
            print_outcome(client.comments().create(video_id, &content).await?)?;
        }
        Commands::Upload { file, title, description, tags } => {
            let bytes = tokio::fs::read(&file).await?;
            let file_name = file
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("video.mp4")
                .to_string();
            let upload = UploadRequest {
                title,
                description,
                tags,
                mime: video_mime(&file).to_string(),
                file_name,
                bytes,
            };
            print_outcome(client.videos().upload(upload).await?)?;
        }
        Commands::Favorites { action } => match action {
            FavoriteAction::List => print_outcome(client.user().favorite_tags().await?)?,
            FavoriteAction::Add { tag } => print_outcome(client.user().add_favorite_tag(&tag).await?)?,
            FavoriteAction::Remove { tag } => print_outcome(client.user().remove_favorite_tag(&tag).await?)?,
        },
        Commands::Subscribe { creator_id } => {
            print_outcome(client.subscriptions().subscribe(creator_id).await?)?;
        }
        Commands::Unsubscribe { creator_id } => {
            print_outcome(client.subscriptions().unsubscribe(creator_id).await?)?;
        }
        Commands::Creators => {
            print_outcome(client.subscriptions().subscribed_creators().await?)?;
        }
        Commands::ChangePassword { current, new } => {
            print_outcome(client.user().change_password(&current, &new).await?)?;
        }
    }

    Ok(())
}

fn print_outcome<T: Serialize>(outcome: Outcome<T>) -> Result<(), Box<dyn std::error::Error>> {
    let value = match outcome {
        Outcome::Success { message, data } => {
            json!({ "success": true, "message": message, "data": serde_json::to_value(data)? })
        }
        Outcome::Failure { message } => {
            eprintln!("Error: {}", message);
            json!({ "success": false, "message": message })
        }
    };
    print_json(&value)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    let value: Value = serde_json::to_value(value)?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn video_mime(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("mov") => "video/quicktime",
        Some("avi") => "video/x-msvideo",
        Some("mkv") => "video/x-matroska",
        _ => "video/mp4",
    }
}
