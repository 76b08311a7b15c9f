//! Tab-separated dataset import
//!
//! Reads the HetRec MovieLens layout: `movies.dat` and
//! `user_ratedmovies.dat`, one record per line, fields separated by tabs,
//! `\N` for a missing value. A first line whose leading field is not a
//! number is treated as a header. Any other malformed line aborts the import
//! with the line number.

use chrono::{DateTime, NaiveDate, Utc};
use csv::{ByteRecord, ReaderBuilder, Terminator};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};
use webfilmz_core::{
    Error, ImdbInfo, Movie, MovieStore, Rating, RatingStore, Result, RottenTomatoesInfo,
};

pub const MOVIES_FILE: &str = "movies.dat";
pub const RATINGS_FILE: &str = "user_ratedmovies.dat";

/// Ratings handed to the store per batch
pub const RATING_BATCH_SIZE: usize = 10_000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    pub movies: usize,
    pub ratings: usize,
}

/// Field text, decoded lossily; the public datasets are not all valid UTF-8
fn field(record: &ByteRecord, index: usize) -> Option<Cow<'_, str>> {
    record.get(index).map(|raw| match String::from_utf8_lossy(raw) {
        Cow::Borrowed(text) => Cow::Borrowed(text.trim_start_matches('\u{feff}').trim()),
        Cow::Owned(text) => Cow::Owned(text.trim_start_matches('\u{feff}').trim().to_string()),
    })
}

fn is_header(record: &ByteRecord) -> bool {
    field(record, 0).map_or(false, |first| first.parse::<u64>().is_err())
}

fn required<T: FromStr>(record: &ByteRecord, index: usize, name: &str, line: usize) -> Result<T> {
    let raw = field(record, index).unwrap_or_default();
    raw.parse().map_err(|_| Error::Import {
        line,
        reason: format!("field {} ({}) has invalid value {:?}", index, name, raw),
    })
}

/// A blank or `\N` field is missing; anything else must parse
fn optional<T: FromStr>(
    record: &ByteRecord,
    index: usize,
    name: &str,
    line: usize,
) -> Result<Option<T>> {
    match optional_text(record, index) {
        None => Ok(None),
        Some(_) => required(record, index, name, line).map(Some),
    }
}

fn optional_text(record: &ByteRecord, index: usize) -> Option<String> {
    match field(record, index) {
        None => None,
        Some(text) if text.is_empty() || text == "\\N" => None,
        Some(text) => Some(text.into_owned()),
    }
}

/// Parse one record of `movies.dat`
pub fn parse_movie(record: &ByteRecord, line_no: usize) -> Result<Movie> {
    let id = required(record, 0, "id", line_no)?;
    let title = optional_text(record, 1).ok_or_else(|| Error::Import {
        line: line_no,
        reason: "missing title".to_string(),
    })?;

    let imdb_id: Option<u64> = optional(record, 2, "imdbID", line_no)?;
    let picture_url = optional_text(record, 4);
    let imdb = (imdb_id.is_some() || picture_url.is_some()).then(|| ImdbInfo {
        id: imdb_id,
        picture_url,
    });

    let rotten_tomatoes = match optional_text(record, 6) {
        Some(rt_id) => Some(RottenTomatoesInfo {
            id: Some(rt_id),
            all_critics_rating: optional(record, 7, "rtAllCriticsRating", line_no)?,
            all_critics_num_reviews: optional(record, 8, "rtAllCriticsNumReviews", line_no)?,
            all_critics_num_fresh: optional(record, 9, "rtAllCriticsNumFresh", line_no)?,
            all_critics_num_rotten: optional(record, 10, "rtAllCriticsNumRotten", line_no)?,
            all_critics_score: optional(record, 11, "rtAllCriticsScore", line_no)?,
            top_critics_rating: optional(record, 12, "rtTopCriticsRating", line_no)?,
            top_critics_num_reviews: optional(record, 13, "rtTopCriticsNumReviews", line_no)?,
            top_critics_num_fresh: optional(record, 14, "rtTopCriticsNumFresh", line_no)?,
            top_critics_num_rotten: optional(record, 15, "rtTopCriticsNumRotten", line_no)?,
            audience_rating: optional(record, 16, "rtAudienceRating", line_no)?,
            audience_num_ratings: optional(record, 17, "rtAudienceNumRatings", line_no)?,
        }),
        None => None,
    };

    Ok(Movie {
        id,
        title,
        year: optional_text(record, 5),
        imdb,
        rotten_tomatoes,
    })
}

/// Parse one record of `user_ratedmovies.dat`
pub fn parse_rating(record: &ByteRecord, line_no: usize) -> Result<Rating> {
    let user_id = required(record, 0, "userID", line_no)?;
    let movie_id = required(record, 1, "movieID", line_no)?;
    let value: f64 = required(record, 2, "rating", line_no)?;

    let mut rating = Rating::new(user_id, movie_id, value).map_err(|e| Error::Import {
        line: line_no,
        reason: e.to_string(),
    })?;
    rating.date = parse_date(record, line_no)?;
    Ok(rating)
}

/// Day, month, year, hour, minute, second in fields 3..=8; all or nothing
fn parse_date(record: &ByteRecord, line_no: usize) -> Result<Option<DateTime<Utc>>> {
    if record.len() < 6 {
        return Ok(None);
    }
    let day: u32 = required(record, 3, "date_day", line_no)?;
    let month: u32 = required(record, 4, "date_month", line_no)?;
    let year: i32 = required(record, 5, "date_year", line_no)?;
    let hour: u32 = optional(record, 6, "date_hour", line_no)?.unwrap_or(0);
    let minute: u32 = optional(record, 7, "date_minute", line_no)?.unwrap_or(0);
    let second: u32 = optional(record, 8, "date_second", line_no)?.unwrap_or(0);

    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, second))
        .map(|naive| Some(naive.and_utc()))
        .ok_or_else(|| Error::Import {
            line: line_no,
            reason: format!(
                "invalid date {}-{}-{} {}:{}:{}",
                year, month, day, hour, minute, second
            ),
        })
}

fn csv_error(e: csv::Error) -> Error {
    let line = e.position().map_or(0, |pos| pos.line() as usize);
    match e.into_kind() {
        csv::ErrorKind::Io(io) => Error::Io(io),
        kind => Error::Import {
            line,
            reason: format!("{:?}", kind),
        },
    }
}

/// Feed each data record of `reader` to `handle`, skipping blanks and a header
fn for_each_record<R, F>(reader: R, mut handle: F) -> Result<usize>
where
    R: Read,
    F: FnMut(&ByteRecord, usize) -> Result<()>,
{
    // HetRec titles carry bare quotes, so quoting stays off
    let mut reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .terminator(Terminator::CRLF)
        .from_reader(reader);

    let mut record = ByteRecord::new();
    let mut handled = 0;
    let mut first = true;
    while reader.read_byte_record(&mut record).map_err(csv_error)? {
        let line_no = record.position().map_or(0, |pos| pos.line() as usize);
        if record.iter().all(|f| f.iter().all(u8::is_ascii_whitespace)) {
            continue;
        }
        if std::mem::take(&mut first) && is_header(&record) {
            debug!(line = line_no, "Skipping header");
            continue;
        }
        handle(&record, line_no)?;
        handled += 1;
    }
    Ok(handled)
}

pub fn import_movies<R, S>(reader: R, store: &S) -> Result<usize>
where
    R: Read,
    S: MovieStore + ?Sized,
{
    for_each_record(reader, |record, line_no| {
        store.insert_movie(&parse_movie(record, line_no)?)
    })
}

/// Import ratings in batches of [`RATING_BATCH_SIZE`].
///
/// On a malformed line the ratings parsed before it are still stored.
pub fn import_ratings<R, S>(reader: R, store: &S) -> Result<usize>
where
    R: Read,
    S: RatingStore + ?Sized,
{
    let mut batch = Vec::with_capacity(RATING_BATCH_SIZE);
    let result = for_each_record(reader, |record, line_no| {
        batch.push(parse_rating(record, line_no)?);
        if batch.len() == RATING_BATCH_SIZE {
            store.insert_ratings(&std::mem::take(&mut batch))?;
        }
        Ok(())
    });
    if !batch.is_empty() {
        store.insert_ratings(&batch)?;
    }
    result
}

/// Import `movies.dat` and `user_ratedmovies.dat` from `dir`
pub fn import_dataset<S>(dir: &Path, store: &S) -> Result<ImportReport>
where
    S: MovieStore + RatingStore + ?Sized,
{
    let movies = import_movies(File::open(dir.join(MOVIES_FILE))?, store)?;
    info!(movies, "Imported movies");
    let ratings = import_ratings(File::open(dir.join(RATINGS_FILE))?, store)?;
    info!(ratings, "Imported ratings");
    Ok(ImportReport { movies, ratings })
}
