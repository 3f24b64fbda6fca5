//! Seed quotes used when durable storage holds no usable collection.

use crate::model::quote::Quote;

const DEFAULT_QUOTES: &[(&str, &str, &str)] = &[
    (
        "The only way to do great work is to love what you do.",
        "Inspiration",
        "Steve Jobs",
    ),
    (
        "Strive not to be a success, but rather to be of value.",
        "Motivation",
        "Albert Einstein",
    ),
    (
        "The mind is everything. What you think you become.",
        "Mindset",
        "Buddha",
    ),
    (
        "An unexamined life is not worth living.",
        "Philosophy",
        "Socrates",
    ),
    (
        "Innovation distinguishes between a leader and a follower.",
        "Business",
        "Steve Jobs",
    ),
    (
        "The future belongs to those who believe in the beauty of their dreams.",
        "Dreams",
        "Eleanor Roosevelt",
    ),
    (
        "The greatest glory in living lies not in never falling, but in rising every time we fall.",
        "Motivation",
        "Nelson Mandela",
    ),
    (
        "It is during our darkest moments that we must focus to see the light.",
        "Inspiration",
        "Aristotle",
    ),
    (
        "Life is what happens when you're busy making other plans.",
        "Life",
        "John Lennon",
    ),
];

/// Builds the default seed set with freshly generated ids.
pub fn default_quotes() -> Vec<Quote> {
    DEFAULT_QUOTES
        .iter()
        .filter_map(|(text, category, author)| Quote::new(text, category, Some(author)).ok())
        .collect()
}
