//! Parser for catalog seed files.
//!
//! A catalog directory holds `::`-separated UTF-8 files:
//! - directors.dat: directorId::name
//! - users.dat: userId::email::login::name::birthday
//! - films.dat: filmId::title::description::releaseDate::duration::mpaId::genreIds::directorIds
//! - likes.dat: filmId::userId
//! - friends.dat: userId::friendId
//!
//! Dates are `YYYY-MM-DD`; id lists are `|`-separated and may be empty.
//! Blank lines and lines starting with `#` are skipped. Only users.dat and
//! films.dat are required.

use crate::error::{CatalogError, Result};
use crate::types::*;
use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use tracing::info;

/// A like as recorded in likes.dat
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedLike {
    pub film_id: FilmId,
    pub user_id: UserId,
}

/// A friendship as recorded in friends.dat
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedFriendship {
    pub user_id: UserId,
    pub friend_id: UserId,
}

/// Everything parsed from a catalog directory, not yet validated against itself.
#[derive(Debug, Default)]
pub struct CatalogSeed {
    pub directors: Vec<Director>,
    pub users: Vec<User>,
    pub films: Vec<Film>,
    pub likes: Vec<SeedLike>,
    pub friendships: Vec<SeedFriendship>,
}

/// Cursor over the `::`-separated fields of one line.
///
/// Remembers file and line so every failure carries its location.
struct Fields<'a> {
    file: &'static str,
    line: usize,
    parts: std::str::Split<'a, &'static str>,
}

impl<'a> Fields<'a> {
    fn new(file: &'static str, line: usize, text: &'a str) -> Self {
        Self {
            file,
            line,
            parts: text.split("::"),
        }
    }

    fn error(&self, reason: String) -> CatalogError {
        CatalogError::Parse {
            file: self.file.to_string(),
            line: self.line,
            reason,
        }
    }

    fn text(&mut self, field: &str) -> Result<&'a str> {
        match self.parts.next() {
            Some(value) => Ok(value.trim()),
            None => Err(self.error(format!("Missing {}", field))),
        }
    }

    fn number<T>(&mut self, field: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let raw = self.text(field)?;
        raw.parse()
            .map_err(|e| self.error(format!("Invalid {}: {}", field, e)))
    }

    fn date(&mut self, field: &str) -> Result<NaiveDate> {
        let raw = self.text(field)?;
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|e| self.error(format!("Invalid {}: {}", field, e)))
    }

    /// Fail if the line carries fields past the last one read
    fn finish<T>(mut self, record: T) -> Result<T> {
        match self.parts.next() {
            None => Ok(record),
            Some(extra) => Err(self.error(format!("Unexpected trailing field '{}'", extra.trim()))),
        }
    }

    fn id_list(&mut self, field: &str) -> Result<BTreeSet<u32>> {
        let raw = self.text(field)?;
        raw.split('|')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse()
                    .map_err(|e| self.error(format!("Invalid {}: {}", field, e)))
            })
            .collect()
    }
}

/// Iterate over (line number, content) of meaningful lines
fn records(content: &str) -> impl Iterator<Item = (usize, &str)> {
    content
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
}

fn read_file(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(CatalogError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    Ok(fs::read_to_string(path)?)
}

/// Read a file that may be absent; an absent file reads as empty
fn read_optional(path: &Path) -> Result<String> {
    if path.exists() {
        Ok(fs::read_to_string(path)?)
    } else {
        Ok(String::new())
    }
}

pub fn parse_directors(content: &str) -> Result<Vec<Director>> {
    records(content)
        .map(|(line, text)| {
            let mut fields = Fields::new("directors.dat", line, text);
            let record = Director {
                id: fields.number("directorId")?,
                name: fields.text("name")?.to_string(),
            };
            fields.finish(record)
        })
        .collect()
}

pub fn parse_users(content: &str) -> Result<Vec<User>> {
    records(content)
        .map(|(line, text)| {
            let mut fields = Fields::new("users.dat", line, text);
            let record = User {
                id: fields.number("userId")?,
                email: fields.text("email")?.to_string(),
                login: fields.text("login")?.to_string(),
                name: fields.text("name")?.to_string(),
                birthday: fields.date("birthday")?,
            };
            fields.finish(record)
        })
        .collect()
}

pub fn parse_films(content: &str) -> Result<Vec<Film>> {
    records(content)
        .map(|(line, text)| {
            let mut fields = Fields::new("films.dat", line, text);
            let record = Film {
                id: fields.number("filmId")?,
                title: fields.text("title")?.to_string(),
                description: fields.text("description")?.to_string(),
                release_date: fields.date("releaseDate")?,
                duration: fields.number("duration")?,
                mpa: fields.number("mpaId")?,
                genres: fields.id_list("genreIds")?,
                directors: fields.id_list("directorIds")?,
            };
            fields.finish(record)
        })
        .collect()
}

pub fn parse_likes(content: &str) -> Result<Vec<SeedLike>> {
    records(content)
        .map(|(line, text)| {
            let mut fields = Fields::new("likes.dat", line, text);
            let record = SeedLike {
                film_id: fields.number("filmId")?,
                user_id: fields.number("userId")?,
            };
            fields.finish(record)
        })
        .collect()
}

pub fn parse_friendships(content: &str) -> Result<Vec<SeedFriendship>> {
    records(content)
        .map(|(line, text)| {
            let mut fields = Fields::new("friends.dat", line, text);
            let record = SeedFriendship {
                user_id: fields.number("userId")?,
                friend_id: fields.number("friendId")?,
            };
            fields.finish(record)
        })
        .collect()
}

impl CatalogSeed {
    /// Read and parse every seed file of a catalog directory.
    ///
    /// Files are parsed in parallel with nested `rayon::join`s.
    pub fn load_from_dir(data_dir: &Path) -> Result<Self> {
        info!("Loading catalog seed from {:?}", data_dir);

        let ((directors, users), (films, (likes, friendships))) = rayon::join(
            || {
                rayon::join(
                    || read_optional(&data_dir.join("directors.dat")).and_then(|c| parse_directors(&c)),
                    || read_file(&data_dir.join("users.dat")).and_then(|c| parse_users(&c)),
                )
            },
            || {
                rayon::join(
                    || read_file(&data_dir.join("films.dat")).and_then(|c| parse_films(&c)),
                    || {
                        rayon::join(
                            || read_optional(&data_dir.join("likes.dat")).and_then(|c| parse_likes(&c)),
                            || {
                                read_optional(&data_dir.join("friends.dat"))
                                    .and_then(|c| parse_friendships(&c))
                            },
                        )
                    },
                )
            },
        );

        let seed = CatalogSeed {
            directors: directors?,
            users: users?,
            films: films?,
            likes: likes?,
            friendships: friendships?,
        };

        info!(
            "Parsed {} directors, {} users, {} films, {} likes, {} friendships",
            seed.directors.len(),
            seed.users.len(),
            seed.films.len(),
            seed.likes.len(),
            seed.friendships.len()
        );
        Ok(seed)
    }
}
