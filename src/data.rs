use gloo_net::http::Request;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

pub const DATA_BASE_PATH: &str = "assets/data";

// Every visitor's target set has exactly this many entries.
pub const TARGET_SET_LEN: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub id: String,
    pub title: String,
    pub year: i32,
    pub director: String,
    pub actors: Vec<String>,
    pub synopsis: String,
    pub is_user_movie: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub movies: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserMovie {
    pub id: String,
    pub title: String,
    pub year: i32,
    pub director: String,
    pub actors: Vec<String>,
    pub synopsis: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsersFile {
    pub users: Vec<User>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoviesFile {
    pub movies: Vec<Movie>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserMoviesFile {
    pub user_movies: HashMap<String, Vec<UserMovie>>,
}

#[derive(Debug)]
pub enum DataError {
    Network(String),
    Parse(String),
}

impl DataError {
    fn network<E: fmt::Display>(err: E) -> Self {
        Self::Network(err.to_string())
    }

    fn parse<E: fmt::Display>(err: E) -> Self {
        Self::Parse(err.to_string())
    }
}

impl fmt::Display for DataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network(message) => write!(f, "network error: {message}"),
            Self::Parse(message) => write!(f, "data error: {message}"),
        }
    }
}

pub async fn fetch_users() -> Result<Vec<User>, DataError> {
    let file: UsersFile = fetch_json("users.json").await?;
    Ok(file.users)
}

pub async fn fetch_movies() -> Result<Vec<Movie>, DataError> {
    let file: MoviesFile = fetch_json("movies.json").await?;
    Ok(file.movies)
}

async fn fetch_json<T: DeserializeOwned>(name: &str) -> Result<T, DataError> {
    let url = format!("{DATA_BASE_PATH}/{name}");
    let response = Request::get(&url)
        .send()
        .await
        .map_err(DataError::network)?;

    if !response.ok() {
        return Err(DataError::Network(format!(
            "HTTP {} while fetching {}",
            response.status(),
            url
        )));
    }

    let text = response.text().await.map_err(DataError::network)?;
    serde_json::from_str(&text).map_err(DataError::parse)
}

pub fn target_set<'a>(users: &'a [User], name: &str) -> Option<&'a [String]> {
    users
        .iter()
        .find(|user| user.name == name)
        .map(|user| user.movies.as_slice())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Discrepancy {
    DuplicateMovieId { id: String },
    WrongTargetLen { user: String, len: usize },
    MissingFromDetailMap { user: String },
    UnknownDetailUser { user: String },
    CountMismatch { user: String, listed: usize, detailed: usize },
    UnknownMovieId { user: String, id: String },
}

impl fmt::Display for Discrepancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateMovieId { id } => {
                write!(f, "movie id '{id}' appears more than once in the catalog")
            }
            Self::WrongTargetLen { user, len } => {
                write!(f, "{user} lists {len} movies, expected {TARGET_SET_LEN}")
            }
            Self::MissingFromDetailMap { user } => {
                write!(f, "{user} has no entry in the detail map")
            }
            Self::UnknownDetailUser { user } => {
                write!(f, "detail map entry '{user}' matches no known user")
            }
            Self::CountMismatch {
                user,
                listed,
                detailed,
            } => write!(
                f,
                "movie count mismatch for {user}: {listed} listed vs {detailed} detailed"
            ),
            Self::UnknownMovieId { user, id } => {
                write!(f, "{user} references '{id}', which is not in the catalog")
            }
        }
    }
}

// Offline consistency pass shared by the checker binary and the tests.
// Purely structural: no I/O, order of findings follows input order.
pub fn cross_check(
    users: &[User],
    movies: &[Movie],
    detail: &UserMoviesFile,
) -> Vec<Discrepancy> {
    let mut findings = Vec::new();

    let mut known_ids = HashSet::new();
    for movie in movies {
        if !known_ids.insert(movie.id.as_str()) {
            findings.push(Discrepancy::DuplicateMovieId {
                id: movie.id.clone(),
            });
        }
    }

    for user in users {
        if user.movies.len() != TARGET_SET_LEN {
            findings.push(Discrepancy::WrongTargetLen {
                user: user.name.clone(),
                len: user.movies.len(),
            });
        }

        match detail.user_movies.get(&user.name) {
            Some(detailed) => {
                if detailed.len() != user.movies.len() {
                    findings.push(Discrepancy::CountMismatch {
                        user: user.name.clone(),
                        listed: user.movies.len(),
                        detailed: detailed.len(),
                    });
                }
                for entry in detailed {
                    if !known_ids.contains(entry.id.as_str()) {
                        findings.push(Discrepancy::UnknownMovieId {
                            user: user.name.clone(),
                            id: entry.id.clone(),
                        });
                    }
                }
            }
            None => findings.push(Discrepancy::MissingFromDetailMap {
                user: user.name.clone(),
            }),
        }

        for id in &user.movies {
            if !known_ids.contains(id.as_str()) {
                findings.push(Discrepancy::UnknownMovieId {
                    user: user.name.clone(),
                    id: id.clone(),
                });
            }
        }
    }

    for name in detail.user_movies.keys() {
        if !users.iter().any(|user| &user.name == name) {
            findings.push(Discrepancy::UnknownDetailUser { user: name.clone() });
        }
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(id: &str, is_user_movie: bool) -> Movie {
        Movie {
            id: id.to_string(),
            title: id.to_uppercase(),
            year: 1990,
            director: "Someone".to_string(),
            actors: vec!["A".to_string()],
            synopsis: "...".to_string(),
            is_user_movie,
        }
    }

    fn detail_entry(id: &str) -> UserMovie {
        UserMovie {
            id: id.to_string(),
            title: id.to_uppercase(),
            year: 1990,
            director: "Someone".to_string(),
            actors: vec!["A".to_string()],
            synopsis: "...".to_string(),
        }
    }

    fn consistent_fixture() -> (Vec<User>, Vec<Movie>, UserMoviesFile) {
        let ids = ["m1", "m2", "m3", "m4", "m5"];
        let users = vec![User {
            name: "Ornella".to_string(),
            movies: ids.iter().map(|id| id.to_string()).collect(),
        }];
        let movies = ids.iter().map(|id| movie(id, true)).collect();
        let detail = UserMoviesFile {
            user_movies: HashMap::from([(
                "Ornella".to_string(),
                ids.iter().map(|id| detail_entry(id)).collect(),
            )]),
        };
        (users, movies, detail)
    }

    #[test]
    fn movie_json_shape_round_trips() {
        let raw = r#"{
            "movies": [{
                "id": "vertigo",
                "title": "Vértigo",
                "year": 1958,
                "director": "Alfred Hitchcock",
                "actors": ["James Stewart", "Kim Novak"],
                "synopsis": "Un detective con acrofobia.",
                "isUserMovie": true
            }]
        }"#;

        let parsed: MoviesFile = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.movies.len(), 1);
        assert!(parsed.movies[0].is_user_movie);
        assert_eq!(parsed.movies[0].year, 1958);

        let encoded = serde_json::to_string(&parsed).unwrap();
        assert!(encoded.contains("\"isUserMovie\":true"));
    }

    #[test]
    fn user_movies_json_uses_camel_case_key() {
        let raw = r#"{"userMovies": {"Paola": []}}"#;
        let parsed: UserMoviesFile = serde_json::from_str(raw).unwrap();
        assert!(parsed.user_movies.contains_key("Paola"));
    }

    #[test]
    fn target_set_is_an_exact_name_lookup() {
        let (users, _, _) = consistent_fixture();
        assert_eq!(target_set(&users, "Ornella").map(<[String]>::len), Some(5));
        assert!(target_set(&users, "ornella").is_none());
        assert!(target_set(&users, "Laura").is_none());
    }

    #[test]
    fn consistent_data_produces_no_findings() {
        let (users, movies, detail) = consistent_fixture();
        assert!(cross_check(&users, &movies, &detail).is_empty());
    }

    #[test]
    fn duplicate_catalog_ids_are_reported() {
        let (users, mut movies, detail) = consistent_fixture();
        movies.push(movie("m1", false));

        let findings = cross_check(&users, &movies, &detail);
        assert!(findings.contains(&Discrepancy::DuplicateMovieId {
            id: "m1".to_string()
        }));
    }

    #[test]
    fn short_target_set_and_count_mismatch_are_reported() {
        let (mut users, movies, detail) = consistent_fixture();
        users[0].movies.pop();

        let findings = cross_check(&users, &movies, &detail);
        assert!(findings.contains(&Discrepancy::WrongTargetLen {
            user: "Ornella".to_string(),
            len: 4
        }));
        assert!(findings.contains(&Discrepancy::CountMismatch {
            user: "Ornella".to_string(),
            listed: 4,
            detailed: 5
        }));
    }

    #[test]
    fn unknown_movie_ids_are_reported() {
        let (mut users, movies, detail) = consistent_fixture();
        users[0].movies[4] = "ghost".to_string();

        let findings = cross_check(&users, &movies, &detail);
        assert!(findings.contains(&Discrepancy::UnknownMovieId {
            user: "Ornella".to_string(),
            id: "ghost".to_string()
        }));
    }

    #[test]
    fn detail_map_drift_is_reported_both_ways() {
        let (users, movies, mut detail) = consistent_fixture();
        let entries = detail.user_movies.remove("Ornella").unwrap();
        detail.user_movies.insert("Marlene".to_string(), entries);

        let findings = cross_check(&users, &movies, &detail);
        assert!(findings.contains(&Discrepancy::MissingFromDetailMap {
            user: "Ornella".to_string()
        }));
        assert!(findings.contains(&Discrepancy::UnknownDetailUser {
            user: "Marlene".to_string()
        }));
    }
}
