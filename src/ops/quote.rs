//! Quote of the day.

use crate::ai::{flows, FlowInvoker};
use crate::models::Quote;
use chrono::{Datelike, Local, NaiveDate};
use tracing::warn;

const FALLBACK_QUOTES: &[(&str, &str)] = &[
    ("The best way to get started is to quit talking and begin doing.", "Walt Disney"),
    ("The pessimist sees difficulty in every opportunity. The optimist sees opportunity in every difficulty.", "Winston Churchill"),
    ("Don't let yesterday take up too much of today.", "Will Rogers"),
    ("You learn more from failure than from success. Don't let it stop you. Failure builds character.", "Unknown"),
    ("It's not whether you get knocked down, it's whether you get up.", "Vince Lombardi"),
    ("The only way to do great work is to love what you do.", "Steve Jobs"),
    ("Believe you can and you're halfway there.", "Theodore Roosevelt"),
    ("The future belongs to those who believe in the beauty of their dreams.", "Eleanor Roosevelt"),
    ("The only limit to our realization of tomorrow will be our doubts of today.", "Franklin D. Roosevelt"),
    ("Success is not final, failure is not fatal: it is the courage to continue that counts.", "Winston Churchill"),
    ("What you get by achieving your goals is not as important as what you become by achieving your goals.", "Zig Ziglar"),
    ("Act as if what you do makes a difference. It does.", "William James"),
    ("The mind is everything. What you think you become.", "Buddha"),
    ("The journey of a thousand miles begins with a single step.", "Lao Tzu"),
    ("You are never too old to set another goal or to dream a new dream.", "C.S. Lewis"),
];

/// A built-in quote, the same for every call on a given day.
pub fn fallback_quote(date: NaiveDate) -> Quote {
    let (quote, author) = FALLBACK_QUOTES[date.ordinal0() as usize % FALLBACK_QUOTES.len()];
    Quote {
        quote: quote.to_string(),
        author: author.to_string(),
    }
}

/// Asks the model for a quote on `theme`, falling back to the built-in
/// list if it cannot answer.
pub async fn quote_of_the_day(invoker: &FlowInvoker, theme: &str) -> Quote {
    match flows::quote_of_the_day(invoker, theme).await {
        Ok(quote) => quote,
        Err(e) => {
            warn!(error = %e, theme, "Quote generation failed, using built-in quote");
            fallback_quote(Local::now().date_naive())
        }
    }
}
