use gloo_net::http::Request;
use serde::Deserialize;
use std::fmt;

const TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";
const TMDB_IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p";

// Bearer token baked in from the environment at build time; without it the
// gallery runs entirely on fallback art.
const ACCESS_TOKEN: Option<&str> = option_env!("TMDB_ACCESS_TOKEN");

const FALLBACK_CLASSIC: &str =
    "https://via.placeholder.com/500x750/2a2a2a/ffffff?text=Classic+Film";
const FALLBACK_MODERN: &str =
    "https://via.placeholder.com/500x750/1a1a1a/ffffff?text=Modern+Film";
const FALLBACK_INTERNATIONAL: &str =
    "https://via.placeholder.com/500x750/3a3a3a/ffffff?text=International+Film";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TmdbMovie {
    pub title: String,
    pub release_date: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub overview: String,
    pub vote_average: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SearchPage {
    results: Vec<TmdbMovie>,
}

#[derive(Debug)]
pub enum PosterError {
    MissingCredential,
    Network(String),
    Parse(String),
}

impl PosterError {
    fn network<E: fmt::Display>(err: E) -> Self {
        Self::Network(err.to_string())
    }

    fn parse<E: fmt::Display>(err: E) -> Self {
        Self::Parse(err.to_string())
    }
}

impl fmt::Display for PosterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCredential => write!(f, "no TMDB access token configured"),
            Self::Network(message) => write!(f, "poster lookup failed: {message}"),
            Self::Parse(message) => write!(f, "poster response unreadable: {message}"),
        }
    }
}

pub async fn search_movie(title: &str, year: i32) -> Result<Option<TmdbMovie>, PosterError> {
    let Some(token) = ACCESS_TOKEN else {
        return Err(PosterError::MissingCredential);
    };

    let year_param = year.to_string();
    let response = Request::get(&format!("{TMDB_BASE_URL}/search/movie"))
        .query([
            ("language", "es-ES"),
            ("query", title),
            ("year", year_param.as_str()),
        ])
        .header("Authorization", &format!("Bearer {token}"))
        .header("accept", "application/json")
        .send()
        .await
        .map_err(PosterError::network)?;

    if !response.ok() {
        return Err(PosterError::Network(format!(
            "HTTP {} from poster search",
            response.status()
        )));
    }

    let page: SearchPage = response.json().await.map_err(PosterError::parse)?;
    Ok(pick_match(page.results, year))
}

// Prefer an exact release-year match, otherwise the first (most relevant)
// result.
pub fn pick_match(results: Vec<TmdbMovie>, year: i32) -> Option<TmdbMovie> {
    if let Some(exact) = results
        .iter()
        .find(|movie| release_year(&movie.release_date) == Some(year))
    {
        return Some(exact.clone());
    }
    results.into_iter().next()
}

fn release_year(release_date: &str) -> Option<i32> {
    release_date.get(..4)?.parse().ok()
}

pub fn poster_url(path: &str) -> String {
    format!("{TMDB_IMAGE_BASE_URL}/w500{path}")
}

pub fn backdrop_url(path: &str) -> String {
    format!("{TMDB_IMAGE_BASE_URL}/w1280{path}")
}

// Three static buckets: before 1960, 1960-1999, 2000 onward.
pub fn fallback_poster(year: i32) -> &'static str {
    if year < 1960 {
        FALLBACK_CLASSIC
    } else if year < 2000 {
        FALLBACK_MODERN
    } else {
        FALLBACK_INTERNATIONAL
    }
}

// Per-movie view model: always renders, with or without a successful lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct MovieArt {
    pub poster_url: String,
    pub backdrop_url: Option<String>,
    pub overview: Option<String>,
    pub vote_average: Option<f64>,
    pub from_lookup: bool,
}

impl MovieArt {
    pub fn fallback(year: i32) -> Self {
        Self {
            poster_url: fallback_poster(year).to_string(),
            backdrop_url: None,
            overview: None,
            vote_average: None,
            from_lookup: false,
        }
    }
}

// A lookup without a poster path still degrades to the year bucket; metadata
// alone is not worth swapping the card art for.
pub fn resolve_art(found: Option<TmdbMovie>, year: i32) -> MovieArt {
    if let Some(movie) = found {
        if let Some(path) = movie.poster_path.as_deref() {
            return MovieArt {
                poster_url: poster_url(path),
                backdrop_url: movie.backdrop_path.as_deref().map(backdrop_url),
                overview: (!movie.overview.is_empty()).then(|| movie.overview.clone()),
                vote_average: (movie.vote_average > 0.0).then_some(movie.vote_average),
                from_lookup: true,
            };
        }
    }
    MovieArt::fallback(year)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result_for(release_date: &str) -> TmdbMovie {
        TmdbMovie {
            title: "Some Film".to_string(),
            release_date: release_date.to_string(),
            poster_path: Some("/p.jpg".to_string()),
            backdrop_path: None,
            overview: "…".to_string(),
            vote_average: 7.2,
        }
    }

    #[test]
    fn fallback_buckets_split_on_year() {
        assert_eq!(fallback_poster(1955), FALLBACK_CLASSIC);
        assert_eq!(fallback_poster(1959), FALLBACK_CLASSIC);
        assert_eq!(fallback_poster(1960), FALLBACK_MODERN);
        assert_eq!(fallback_poster(1985), FALLBACK_MODERN);
        assert_eq!(fallback_poster(1999), FALLBACK_MODERN);
        assert_eq!(fallback_poster(2000), FALLBACK_INTERNATIONAL);
        assert_eq!(fallback_poster(2010), FALLBACK_INTERNATIONAL);
    }

    #[test]
    fn exact_year_match_is_preferred() {
        let results = vec![
            result_for("1997-05-10"),
            result_for("1958-05-09"),
            result_for("1958-01-01"),
        ];
        let picked = pick_match(results, 1958).unwrap();
        assert_eq!(picked.release_date, "1958-05-09");
    }

    #[test]
    fn first_result_wins_without_an_exact_year() {
        let results = vec![result_for("1997-05-10"), result_for("2004-02-02")];
        let picked = pick_match(results, 1958).unwrap();
        assert_eq!(picked.release_date, "1997-05-10");

        assert!(pick_match(Vec::new(), 1958).is_none());
    }

    #[test]
    fn malformed_release_dates_are_tolerated() {
        let results = vec![result_for(""), result_for("n/a"), result_for("1958-05-09")];
        let picked = pick_match(results, 1958).unwrap();
        assert_eq!(picked.release_date, "1958-05-09");
    }

    #[test]
    fn image_urls_are_assembled_from_the_cdn_base() {
        assert_eq!(
            poster_url("/abc.jpg"),
            "https://image.tmdb.org/t/p/w500/abc.jpg"
        );
        assert_eq!(
            backdrop_url("/abc.jpg"),
            "https://image.tmdb.org/t/p/w1280/abc.jpg"
        );
    }

    #[test]
    fn lookup_art_requires_a_poster_path() {
        let mut movie = result_for("2010-06-01");
        movie.backdrop_path = Some("/b.jpg".to_string());

        let art = resolve_art(Some(movie.clone()), 2010);
        assert!(art.from_lookup);
        assert_eq!(art.poster_url, "https://image.tmdb.org/t/p/w500/p.jpg");
        assert_eq!(
            art.backdrop_url.as_deref(),
            Some("https://image.tmdb.org/t/p/w1280/b.jpg")
        );

        movie.poster_path = None;
        let degraded = resolve_art(Some(movie), 2010);
        assert!(!degraded.from_lookup);
        assert_eq!(degraded.poster_url, FALLBACK_INTERNATIONAL);

        let absent = resolve_art(None, 1955);
        assert_eq!(absent.poster_url, FALLBACK_CLASSIC);
    }

    #[test]
    fn search_page_tolerates_sparse_fields() {
        let raw = r#"{
            "page": 1,
            "results": [
                {"title": "Vertigo", "release_date": "1958-05-09", "poster_path": "/v.jpg"},
                {"title": "Unknown"}
            ],
            "total_pages": 1,
            "total_results": 2
        }"#;

        let page: SearchPage = serde_json::from_str(raw).unwrap();
        assert_eq!(page.results.len(), 2);
        assert_eq!(page.results[0].poster_path.as_deref(), Some("/v.jpg"));
        assert!(page.results[1].release_date.is_empty());
        assert!(page.results[1].poster_path.is_none());
    }
}
