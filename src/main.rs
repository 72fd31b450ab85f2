use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};
use leetmovie::comments::relative_time;
use leetmovie::config::Configuration;
use leetmovie::models::{Comment, CommentId, CommentSort, SearchFilters, Title, TitleId, TitleType, Vote};
use leetmovie::AppState;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "leetmovie.yaml")]
    config: PathBuf,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show one title with your rating and watchlist status
    Show { id: TitleId },
    /// Search titles by text and filters
    Search {
        #[arg(default_value = "")]
        query: String,
        #[arg(long = "type")]
        title_type: Option<TitleType>,
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        min_rating: Option<f32>,
        #[arg(long)]
        genre: Option<String>,
    },
    /// Titles sharing a genre with the given one
    Similar { id: TitleId },
    /// Highest rated titles
    Trending,
    /// Everything rated 8.5 or above
    TopRated,
    /// Most recent releases
    New,
    /// List genres, optionally with their titles
    Genres {
        #[arg(long)]
        titles: bool,
    },
    /// List release years
    Years,
    /// Inspect or change the watchlist
    Watchlist {
        #[command(subcommand)]
        action: Option<WatchlistAction>,
    },
    /// Rate a title from 1 to 5; repeating the same rating clears it
    Rate {
        id: TitleId,
        #[arg(value_parser = clap::value_parser!(u8).range(1..=5))]
        stars: u8,
    },
    /// List comments on a title
    Comments {
        id: TitleId,
        #[arg(long, default_value = "newest")]
        sort: CommentSort,
    },
    /// Post a comment on a title
    Comment { id: TitleId, text: String },
    /// Like or dislike a comment; repeating the same vote withdraws it
    Vote {
        id: TitleId,
        comment_id: CommentId,
        kind: Vote,
    },
}

#[derive(Subcommand)]
enum WatchlistAction {
    List,
    Toggle { id: TitleId },
    Add { id: TitleId },
    Remove { id: TitleId },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(&cli.log_level)
        .with_writer(std::io::stderr)
        .init();

    let config = if cli.config.exists() {
        let config = Configuration::from_file(&cli.config)?;
        info!("Configuration loaded from: {}", cli.config.display());
        config
    } else {
        debug!("No configuration at {}, using defaults", cli.config.display());
        Configuration::default()
    };

    let mut app = AppState::from_config(&config)?;
    run(&mut app, cli.command, cli.json)
}

fn run(app: &mut AppState, command: Command, json: bool) -> Result<()> {
    match command {
        Command::Show { id } => match app.query().find_by_id(id) {
            Some(title) if json => print_json(title)?,
            Some(title) => print_details(app, title),
            None => not_found(id),
        },
        Command::Search {
            query,
            title_type,
            year,
            min_rating,
            genre,
        } => {
            let filters = SearchFilters {
                title_type,
                year,
                min_rating,
                genre,
            };
            let results = app.query().search(&query, &filters);
            print_titles(app, &results, json)?;
            if !json {
                println!(
                    "{} result{} found",
                    results.len(),
                    if results.len() == 1 { "" } else { "s" }
                );
            }
        }
        Command::Similar { id } => {
            if app.query().find_by_id(id).is_none() {
                not_found(id);
            } else {
                print_titles(app, &app.query().similar_titles(id), json)?;
            }
        }
        Command::Trending => print_titles(app, &app.query().trending(), json)?,
        Command::TopRated => print_titles(app, &app.query().top_rated(), json)?,
        Command::New => print_titles(app, &app.query().new_releases(), json)?,
        Command::Genres { titles } => {
            let query = app.query();
            if json && titles {
                print_json(&query.by_genre())?;
            } else if json {
                print_json(&query.all_genres())?;
            } else if titles {
                for (genre, members) in query.by_genre() {
                    println!("{} ({})", genre, members.len());
                    for title in members {
                        println!("  {}", summary_line(app, title));
                    }
                }
            } else {
                for genre in query.all_genres() {
                    println!("{}", genre);
                }
            }
        }
        Command::Years => {
            let years = app.query().all_years();
            if json {
                print_json(&years)?;
            } else {
                for year in years {
                    println!("{}", year);
                }
            }
        }
        Command::Watchlist { action } => watchlist(app, action.unwrap_or(WatchlistAction::List), json)?,
        Command::Rate { id, stars } => {
            if app.query().find_by_id(id).is_none() {
                not_found(id);
                return Ok(());
            }
            match app.ratings.rate(id, stars) {
                0 => println!("Rating for {} cleared", id),
                stars => println!("Rated {} {}/5", id, stars),
            }
        }
        Command::Comments { id, sort } => {
            if app.query().find_by_id(id).is_none() {
                not_found(id);
                return Ok(());
            }
            let comments = app.comments.sorted(id, sort);
            if json {
                print_json(&comments)?;
            } else if comments.is_empty() {
                println!("No comments yet. Be the first!");
            } else {
                for comment in comments {
                    print_comment(comment);
                }
            }
        }
        Command::Comment { id, text } => {
            if app.query().find_by_id(id).is_none() {
                not_found(id);
                return Ok(());
            }
            match app.comments.add(id, &text) {
                Some(comment) if json => print_json(comment)?,
                Some(comment) => print_comment(comment),
                None => println!("Comment is empty, nothing posted"),
            }
        }
        Command::Vote {
            id,
            comment_id,
            kind,
        } => match app.comments.vote(id, comment_id, kind) {
            Some(comment) if json => print_json(comment)?,
            Some(comment) => print_comment(comment),
            None => println!("Comment {} not found on title {}", comment_id, id),
        },
    }
    Ok(())
}

fn watchlist(app: &mut AppState, action: WatchlistAction, json: bool) -> Result<()> {
    let id = match action {
        WatchlistAction::List => {
            let titles = app.query().titles_in(app.watchlist.ids());
            if !json && titles.is_empty() {
                println!("Your watchlist is empty");
                return Ok(());
            }
            print_titles(app, &titles, json)?;
            return Ok(());
        }
        WatchlistAction::Toggle { id } | WatchlistAction::Add { id } | WatchlistAction::Remove { id }
            if app.query().find_by_id(id).is_none() =>
        {
            not_found(id);
            return Ok(());
        }
        WatchlistAction::Toggle { id } => {
            app.watchlist.toggle(id);
            id
        }
        WatchlistAction::Add { id } => {
            app.watchlist.add(id);
            id
        }
        WatchlistAction::Remove { id } => {
            app.watchlist.remove(id);
            id
        }
    };

    if app.watchlist.contains(id) {
        println!("{} is on your watchlist ({} saved)", id, app.watchlist.len());
    } else {
        println!("{} is not on your watchlist ({} saved)", id, app.watchlist.len());
    }
    Ok(())
}

fn not_found(id: TitleId) {
    println!("Title {} not found", id);
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_titles(app: &AppState, titles: &[&Title], json: bool) -> Result<()> {
    if json {
        return print_json(titles);
    }
    for title in titles {
        println!("{}", summary_line(app, title));
    }
    Ok(())
}

fn summary_line(app: &AppState, title: &Title) -> String {
    let saved = if app.watchlist.contains(title.id) { " *" } else { "" };
    format!(
        "[{:>3}] {} ({}, {}) {:.1} - {}{}",
        title.id,
        title.title,
        title.year,
        title.title_type,
        title.rating,
        title.genre.join(", "),
        saved
    )
}

fn print_details(app: &AppState, title: &Title) {
    println!("{} ({})", title.title, title.year);
    println!("Type:     {}", title.title_type);
    println!("Rating:   {:.1} average", title.rating);
    match app.ratings.get(title.id) {
        0 => println!("Yours:    not rated"),
        stars => println!("Yours:    {}/5", stars),
    }
    println!("Genres:   {}", title.genre.join(", "));
    if !title.cast.is_empty() {
        println!("Cast:     {}", title.cast.join(", "));
    }
    if let Some(made_by) = title.made_by() {
        println!("By:       {}", made_by);
    }
    for (label, value) in [
        ("Duration", &title.duration),
        ("Language", &title.language),
        ("Country", &title.country),
        ("Status", &title.status),
        ("Trailer", &title.trailer),
    ] {
        if let Some(value) = value {
            println!("{:<9} {}", format!("{}:", label), value);
        }
    }
    if let (Some(seasons), Some(episodes)) = (title.seasons, title.episodes) {
        println!("Seasons:  {} ({} episodes)", seasons, episodes);
    }
    if !title.awards.is_empty() {
        println!("Awards:   {}", title.awards.join(", "));
    }
    if let Some(description) = &title.description {
        println!();
        println!("{}", description);
    }
    println!();
    println!(
        "Watchlist: {}   Comments: {}",
        if app.watchlist.contains(title.id) { "saved" } else { "-" },
        app.comments.count(title.id)
    );

    let similar = app.query().similar_titles(title.id);
    if !similar.is_empty() {
        println!();
        println!("More like this:");
        for other in similar {
            println!("  {}", summary_line(app, other));
        }
    }
}

fn print_comment(comment: &Comment) {
    let vote = match comment.user_vote {
        Some(Vote::Like) => " (you liked)",
        Some(Vote::Dislike) => " (you disliked)",
        None => "",
    };
    println!(
        "#{} {} - {}  +{} -{}{}",
        comment.id,
        comment.author,
        relative_time(comment.timestamp, Utc::now()),
        comment.likes,
        comment.dislikes,
        vote
    );
    println!("  {}", comment.text);
}
