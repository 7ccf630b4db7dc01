use anyhow::{Context, Result};
use catalog::{DirectorId, GenreId, User, UserId};
use clap::{Parser, Subcommand};
use colored::Colorize;
use ranking::RankedFilm;
use serde::Serialize;
use server::FilmorateService;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Filmorate - film catalog with friends, likes and rankings
#[derive(Parser)]
#[command(name = "filmorate")]
#[command(about = "Query a film catalog: popular films, search, shared tastes", long_about = None)]
struct Cli {
    /// Path to the catalog directory (users.dat, films.dat, ...)
    #[arg(short, long, default_value = "data/catalog")]
    data_dir: PathBuf,

    /// Print results as JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Most liked films, optionally by genre and release year
    Popular {
        /// Number of films to return (zero or negative returns nothing)
        #[arg(long, default_value = "10", allow_negative_numbers = true)]
        count: i64,

        #[arg(long)]
        genre_id: Option<GenreId>,

        #[arg(long)]
        year: Option<i32>,
    },

    /// Search films by title and/or director name (case-insensitive substring)
    Search {
        #[arg(long)]
        query: String,

        /// Fields to search: title, director or title,director
        #[arg(long, default_value = "title")]
        by: String,
    },

    /// Films liked by both users, most liked first
    CommonFilms {
        #[arg(long)]
        user_id: UserId,

        #[arg(long)]
        friend_id: UserId,
    },

    /// A director's films
    DirectorFilms {
        #[arg(long)]
        director_id: DirectorId,

        /// Sort order: year or likes
        #[arg(long, default_value = "year")]
        sort_by: String,
    },

    /// Friends of a user
    Friends {
        #[arg(long)]
        user_id: UserId,
    },

    /// Friends shared by two users
    CommonFriends {
        #[arg(long)]
        user_id: UserId,

        #[arg(long)]
        other_id: UserId,
    },

    /// Show a user profile, friends and liked films
    User {
        #[arg(long)]
        user_id: UserId,
    },

    /// Run benchmark to test query performance
    Benchmark {
        /// Number of queries to run
        #[arg(long, default_value = "100")]
        requests: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing; stdout is reserved for results
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    info!("Loading catalog from {}", cli.data_dir.display());
    let start = Instant::now();
    let service = FilmorateService::load_from_dir(&cli.data_dir)
        .with_context(|| format!("Failed to load catalog from {}", cli.data_dir.display()))?;
    if !cli.json {
        println!("{} Loaded catalog in {:?}", "✓".green(), start.elapsed());
    }

    let json = cli.json;
    match cli.command {
        Commands::Popular {
            count,
            genre_id,
            year,
        } => {
            let count = usize::try_from(count).unwrap_or(0);
            let films = service.popular(Some(count), genre_id, year)?;
            emit(json, &films, || print_films(&service, "Popular films", &films))?;
        }
        Commands::Search { query, by } => {
            let films = service
                .search(&query, &by)
                .with_context(|| format!("Search for '{}' by {} failed", query, by))?;
            let title = format!("Search results for '{}'", query);
            emit(json, &films, || print_films(&service, &title, &films))?;
        }
        Commands::CommonFilms { user_id, friend_id } => {
            let films = service.common_films(user_id, friend_id)?;
            let title = format!("Films liked by both {} and {}", user_id, friend_id);
            emit(json, &films, || print_films(&service, &title, &films))?;
        }
        Commands::DirectorFilms {
            director_id,
            sort_by,
        } => {
            let films = service.director_films(director_id, &sort_by)?;
            let director = service.director(director_id)?;
            let title = format!("Films by {} (sorted by {})", director.name, sort_by);
            emit(json, &films, || print_films(&service, &title, &films))?;
        }
        Commands::Friends { user_id } => {
            let friends = service.friends(user_id)?;
            let title = format!("Friends of user {}", user_id);
            emit(json, &friends, || print_users(&title, &friends))?;
        }
        Commands::CommonFriends { user_id, other_id } => {
            let friends = service.common_friends(user_id, other_id)?;
            let title = format!("Common friends of {} and {}", user_id, other_id);
            emit(json, &friends, || print_users(&title, &friends))?;
        }
        Commands::User { user_id } => handle_user(&service, user_id, json)?,
        Commands::Benchmark { requests } => handle_benchmark(service, requests).await?,
    }

    Ok(())
}

/// Print `value` as JSON, or run the text printer
fn emit<T: Serialize + ?Sized>(json: bool, value: &T, text: impl FnOnce()) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        text();
    }
    Ok(())
}

#[derive(Serialize)]
struct UserProfile {
    user: User,
    friends: Vec<User>,
    liked: Vec<RankedFilm>,
}

/// Handle the 'user' command
fn handle_user(service: &FilmorateService, user_id: UserId, json: bool) -> Result<()> {
    let user = service.user(user_id)?;
    let friends = service.friends(user_id)?;
    let liked = service.liked_films(user_id)?;

    let profile = UserProfile {
        user,
        friends,
        liked,
    };
    emit(json, &profile, || {
        let user = &profile.user;
        println!("{}", format!("User {}: {}", user.id, user.login).bold().blue());
        println!("{}Name: {}", "• ".green(), user.name);
        println!("{}Email: {}", "• ".green(), user.email);
        println!("{}Birthday: {}", "• ".green(), user.birthday);
        println!("{}Friends: {}", "• ".cyan(), profile.friends.len());
        for friend in &profile.friends {
            println!("  - {} ({})", friend.login, friend.id);
        }
        println!("{}Liked films: {}", "• ".cyan(), profile.liked.len());
        for ranked in &profile.liked {
            let film = &ranked.film;
            println!("  - {} ({}) - {} likes", film.title, film.release_year(), ranked.likes);
        }
    })
}

/// Handle the 'benchmark' command
///
/// Runs a mix of popular and search queries on the blocking pool and reports
/// latency percentiles.
async fn handle_benchmark(service: FilmorateService, requests: usize) -> Result<()> {
    if requests == 0 {
        println!("Nothing to run");
        return Ok(());
    }
    let genre_count = service.genres().len().max(1) as u32;

    let mut handles = vec![];
    let wall = Instant::now();
    for i in 0..requests {
        let service = service.clone();
        let genre_id = rand::random::<u32>() % genre_count + 1;
        let handle = tokio::task::spawn_blocking(move || {
            let start = Instant::now();
            if i % 2 == 0 {
                service.popular(None, Some(genre_id), None)?;
            } else {
                service.search("the", "title,director")?;
            }
            Ok::<_, anyhow::Error>(start.elapsed())
        });
        handles.push(handle);
    }

    let mut timings: Vec<Duration> = vec![];
    for handle in handles {
        timings.push(handle.await??);
    }
    let wall_time = wall.elapsed();
    debug!("Collected {} timings", timings.len());

    timings.sort();
    let total: Duration = timings.iter().sum();
    let avg_latency = total / timings.len() as u32;
    let percentile = |p: f32| timings[((timings.len() as f32 * p) as usize).min(timings.len() - 1)];
    let throughput = requests as f32 / wall_time.as_secs_f32();

    println!("{}", "Benchmark results:".bold().blue());
    println!("Total time: {:?}", wall_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", percentile(0.50));
    println!("P95 latency: {:?}", percentile(0.95));
    println!("P99 latency: {:?}", percentile(0.99));
    println!("Throughput: {:.2} requests/second", throughput);

    Ok(())
}

/// Print a ranked film list with genre names resolved
fn print_films(service: &FilmorateService, title: &str, films: &[RankedFilm]) {
    let genre_names: HashMap<GenreId, String> = service
        .genres()
        .into_iter()
        .map(|g| (g.id, g.name))
        .collect();

    println!("{}", format!("{}:", title).bold().blue());
    if films.is_empty() {
        println!("  (none)");
    }
    for (rank, ranked) in films.iter().enumerate() {
        let film = &ranked.film;
        let genres = film
            .genres
            .iter()
            .filter_map(|id| genre_names.get(id).map(String::as_str))
            .collect::<Vec<_>>()
            .join(", ");
        println!(
            "{}. {} ({}) [{}] - {} likes",
            (rank + 1).to_string().green(),
            film.title,
            film.release_year(),
            genres,
            ranked.likes
        );
    }
}

fn print_users(title: &str, users: &[User]) {
    println!("{}", format!("{}:", title).bold().blue());
    if users.is_empty() {
        println!("  (none)");
    }
    for user in users {
        println!("{}{} ({}) - {}", "• ".green(), user.login, user.id, user.name);
    }
}
