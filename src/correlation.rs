// 🔗 Correlation Engine - join movies, reviews and listings by text
//
// There are no foreign keys. Every relationship is re-derived here by a
// linear scan and exact string equality (no trimming, no case folding):
//
//   review.movie_title  == movie.title
//   review.author       == identity
//   listing.cinema_name == cinema name
//   listing.movie_title == movie.title   (first movie with that title wins)
//
// Rows that match nothing are skipped silently. All functions are pure,
// borrow from a snapshot, and preserve store order.

use crate::entities::{Listing, Movie, Review};

/// Reviews of one movie, in insertion order.
pub fn reviews_for_movie<'a>(reviews: &'a [Review], movie: &Movie) -> Vec<&'a Review> {
    reviews
        .iter()
        .filter(|review| review.is_about(&movie.title))
        .collect()
}

/// Reviews of one movie written by `user`. Always a subset of
/// `reviews_for_movie` for the same movie.
pub fn reviews_for_user_and_movie<'a>(
    reviews: &'a [Review],
    user: &str,
    movie: &Movie,
) -> Vec<&'a Review> {
    reviews
        .iter()
        .filter(|review| review.is_by(user) && review.is_about(&movie.title))
        .collect()
}

/// Every movie with its reviews (possibly none). Orphan reviews, whose
/// title matches no movie, do not appear anywhere in the result.
pub fn catalog<'a>(movies: &'a [Movie], reviews: &'a [Review]) -> Vec<(&'a Movie, Vec<&'a Review>)> {
    movies
        .iter()
        .map(|movie| (movie, reviews_for_movie(reviews, movie)))
        .collect()
}

/// Movies `user` has reviewed, each with that user's reviews of it. Movies
/// the user has not reviewed are left out entirely.
pub fn reviewed_movies_for_user<'a>(
    movies: &'a [Movie],
    reviews: &'a [Review],
    user: &str,
) -> Vec<(&'a Movie, Vec<&'a Review>)> {
    movies
        .iter()
        .filter_map(|movie| {
            let own = reviews_for_user_and_movie(reviews, user, movie);
            if own.is_empty() {
                None
            } else {
                Some((movie, own))
            }
        })
        .collect()
}

/// Distinct cinema names in order of first appearance.
pub fn unique_cinema_names(listings: &[Listing]) -> Vec<&str> {
    let mut names: Vec<&str> = Vec::new();

    for listing in listings {
        if !names.contains(&listing.cinema_name.as_str()) {
            names.push(&listing.cinema_name);
        }
    }

    names
}

/// Listing rows for one cinema, in store order.
pub fn listings_for_cinema<'a>(listings: &'a [Listing], cinema_name: &str) -> Vec<&'a Listing> {
    listings
        .iter()
        .filter(|listing| listing.cinema_name == cinema_name)
        .collect()
}

/// First movie whose title matches exactly.
pub fn find_movie_by_title<'a>(movies: &'a [Movie], title: &str) -> Option<&'a Movie> {
    movies.iter().find(|movie| movie.title == title)
}

/// Movies showing at one cinema, in listing order. A listing whose title
/// resolves to no movie is skipped. A movie listed twice appears twice.
pub fn movies_for_cinema<'a>(
    listings: &[Listing],
    movies: &'a [Movie],
    cinema_name: &str,
) -> Vec<&'a Movie> {
    listings_for_cinema(listings, cinema_name)
        .into_iter()
        .filter_map(|listing| find_movie_by_title(movies, &listing.movie_title))
        .collect()
}

/// The grouped-by-cinema view: each distinct cinema, first-seen order,
/// with its resolved movies.
pub fn cinema_program<'a>(
    listings: &'a [Listing],
    movies: &'a [Movie],
) -> Vec<(&'a str, Vec<&'a Movie>)> {
    unique_cinema_names(listings)
        .into_iter()
        .map(|name| (name, movies_for_cinema(listings, movies, name)))
        .collect()
}
