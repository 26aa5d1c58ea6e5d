use anyhow::{Context, Result};
use clap::Parser;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

use fer_lodge::data::{cross_check, MoviesFile, UserMoviesFile, UsersFile};

/// Cross-checks the static data files against each other and prints a
/// human-readable report. Exits non-zero only when a file cannot be read or
/// parsed; detected mismatches are reported but do not change the exit code.
#[derive(Parser)]
#[command(name = "check-data", about = "Validate the Fer Lodge data files")]
struct Args {
    /// Directory holding users.json, movies.json and user_movies.json
    #[arg(long, default_value = "assets/data")]
    data_dir: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();

    println!("Validating Fer Lodge data in {}...\n", args.data_dir.display());

    let users_file: UsersFile = read_json(&args.data_dir.join("users.json"))?;
    let movies_file: MoviesFile = read_json(&args.data_dir.join("movies.json"))?;
    let detail_file: UserMoviesFile = read_json(&args.data_dir.join("user_movies.json"))?;

    println!("Users:");
    println!("  - Total users: {}", users_file.users.len());
    for user in &users_file.users {
        println!("  - {}: {} movies", user.name, user.movies.len());
    }

    let user_movie_count = movies_file
        .movies
        .iter()
        .filter(|movie| movie.is_user_movie)
        .count();
    println!("\nMovies:");
    println!("  - Total movies: {}", movies_file.movies.len());
    println!("  - User movies: {}", user_movie_count);
    println!(
        "  - Extra movies: {}",
        movies_file.movies.len() - user_movie_count
    );

    println!("\nUser movie assignments:");
    for user in &users_file.users {
        match detail_file.user_movies.get(&user.name) {
            Some(entries) => {
                println!("  - {}: {} movies", user.name, entries.len());
                for entry in entries {
                    println!("      * {} ({})", entry.title, entry.year);
                }
            }
            None => println!("  - {}: no detail entries", user.name),
        }
    }

    println!("\nCross-reference:");
    let findings = cross_check(&users_file.users, &movies_file.movies, &detail_file);
    if findings.is_empty() {
        println!("  all checks passed");
    } else {
        for finding in &findings {
            println!("  ! {finding}");
        }
    }

    println!();
    if findings.is_empty() {
        println!("All data validation passed.");
    } else {
        println!(
            "{} validation issue(s) found. Please review the data.",
            findings.len()
        );
    }

    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}
