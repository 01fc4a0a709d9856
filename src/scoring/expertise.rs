use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

use crate::quiz::models::AttemptWithQuiz;
use crate::vote::models::VoteWithAnime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
pub enum Genre {
    Shonen,
    Seinen,
    Aventure,
    Vibe,
    Culte,
}

const GENRE_MAP: &[(&str, Genre)] = &[
    ("One Piece", Genre::Shonen),
    ("Naruto", Genre::Shonen),
    ("Dragon Ball Z", Genre::Shonen),
    ("Bleach", Genre::Shonen),
    ("Jujutsu Kaisen", Genre::Shonen),
    ("Demon Slayer", Genre::Shonen),
    ("My Hero Academia", Genre::Shonen),
    ("Attack on Titan", Genre::Shonen),
    ("Black Clover", Genre::Shonen),
    ("Fairy Tail", Genre::Shonen),
    ("Hunter x Hunter", Genre::Shonen),
    ("Death Note", Genre::Seinen),
    ("Berserk", Genre::Seinen),
    ("Vinland Saga", Genre::Seinen),
    ("Tokyo Ghoul", Genre::Seinen),
    ("Monster", Genre::Seinen),
    ("Psycho-Pass", Genre::Seinen),
    ("Code Geass", Genre::Seinen),
    ("Steins;Gate", Genre::Seinen),
    ("Parasyte", Genre::Seinen),
    ("Sword Art Online", Genre::Aventure),
    ("Fullmetal Alchemist", Genre::Aventure),
    ("Frieren", Genre::Aventure),
    ("Mushoku Tensei", Genre::Aventure),
    ("Made in Abyss", Genre::Aventure),
    ("Re:Zero", Genre::Aventure),
    ("The Rising of the Shield Hero", Genre::Aventure),
    ("Doctor Stone", Genre::Aventure),
    ("Kaguya-sama", Genre::Vibe),
    ("Spy x Family", Genre::Vibe),
    ("Your Lie in April", Genre::Vibe),
    ("A Silent Voice", Genre::Vibe),
    ("Haikyuu!!", Genre::Vibe),
    ("Blue Lock", Genre::Vibe),
    ("Oshi no Ko", Genre::Vibe),
    ("Mushishi", Genre::Vibe),
    ("Neon Genesis Evangelion", Genre::Culte),
    ("Cowboy Bebop", Genre::Culte),
    ("Akira", Genre::Culte),
    ("Ghost in the Shell", Genre::Culte),
    ("Samurai Champloo", Genre::Culte),
    ("Mobile Suit Gundam", Genre::Culte),
    ("Sailor Moon", Genre::Culte),
    ("Dragon Ball", Genre::Culte),
    ("Yu Yu Hakusho", Genre::Culte),
];

/// Floor for the normalization divisor, so a handful of points never fills an axis
const NORMALIZATION_FLOOR: f64 = 10.0;
const VOTE_WEIGHT: f64 = 0.5;

pub fn genre_of(title: &str) -> Option<Genre> {
    GENRE_MAP
        .iter()
        .find(|(known, _)| *known == title)
        .map(|(_, genre)| *genre)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpertiseAxis {
    pub label: Genre,
    pub value: f64,
}

/// Five-axis genre radar built from quiz attempts and votes
pub fn calculate_expertise(
    attempts: &[AttemptWithQuiz],
    votes: &[VoteWithAnime],
) -> Vec<ExpertiseAxis> {
    let mut points: HashMap<Genre, f64> = Genre::iter().map(|g| (g, 0.0)).collect();

    for attempt in attempts {
        let genre = attempt
            .quiz
            .as_ref()
            .and_then(|quiz| genre_of(&quiz.title));
        match genre {
            Some(genre) => {
                *points.entry(genre).or_default() += f64::from(attempt.attempt.score) / 20.0
            }
            None => *points.entry(Genre::Shonen).or_default() += 1.0,
        }
    }

    for vote in votes {
        if let Some(genre) = vote.anime.as_ref().and_then(|anime| genre_of(&anime.title)) {
            *points.entry(genre).or_default() += VOTE_WEIGHT;
        }
    }

    let max = points.values().copied().fold(NORMALIZATION_FLOOR, f64::max);

    Genre::iter()
        .map(|label| ExpertiseAxis {
            label,
            value: points.get(&label).copied().unwrap_or_default() / max * 100.0,
        })
        .collect()
}
