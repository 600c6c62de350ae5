use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use rust_decimal::Decimal;

use crate::domain::identity::NewAddress;

// French-flavoured sample data for demo fixtures.

pub const CATEGORY_NAMES: [&str; 5] = ["Laptops", "Smartphones", "Écrans", "Périphériques", "Composants"];

const FIRST_NAMES: &[&str] = &[
    "Jeanne", "Luc", "Camille", "Hugo", "Léa", "Théo", "Chloé", "Julien", "Manon", "Étienne",
    "Inès", "Mathis", "Zoé", "Gaël", "Océane",
];

const LAST_NAMES: &[&str] = &[
    "Martin", "Bernard", "Dubois", "Thomas", "Robert", "Richard", "Petit", "Durand", "Leroy",
    "Moreau", "Simon", "Laurent", "Lefèvre", "Michel", "Garcia",
];

const EMAIL_DOMAINS: &[&str] = &["example.fr", "example.com", "exemple.org"];

const STREET_TYPES: &[&str] = &["rue", "avenue", "boulevard", "place", "impasse", "chemin"];

const STREET_NAMES: &[&str] = &[
    "de la Paix", "Victor Hugo", "des Lilas", "Jean Jaurès", "de la République", "du Moulin",
    "Pasteur", "des Écoles", "Gambetta", "de Verdun",
];

const CITIES: &[&str] = &[
    "Paris", "Lyon", "Marseille", "Toulouse", "Nantes", "Bordeaux", "Lille", "Strasbourg",
    "Rennes", "Montpellier",
];

const COUNTRIES: &[&str] = &["France", "Belgique", "Suisse", "Luxembourg", "Canada"];

const WORDS: &[&str] = &[
    "alias", "consequatur", "aut", "perferendis", "sit", "voluptatem", "accusantium",
    "doloremque", "aperiam", "eaque", "ipsa", "quae", "ab", "illo", "inventore", "veritatis",
    "et", "quasi", "architecto", "beatae", "vitae", "dicta", "sunt", "explicabo", "nemo",
    "enim", "ipsam", "quia", "voluptas", "aspernatur", "odit", "fugit", "magni", "dolores",
    "ratione", "sequi", "nesciunt", "neque", "dolorem", "ipsum",
];

fn pick<'a, R: Rng>(rng: &mut R, items: &[&'a str]) -> &'a str {
    items.choose(rng).copied().unwrap_or_default()
}

pub fn first_name<R: Rng>(rng: &mut R) -> String {
    pick(rng, FIRST_NAMES).to_string()
}

pub fn last_name<R: Rng>(rng: &mut R) -> String {
    pick(rng, LAST_NAMES).to_string()
}

/// Ascii email made unique by `index`
pub fn email<R: Rng>(rng: &mut R, first: &str, last: &str, index: usize) -> String {
    let local: String = deunicode::deunicode(&format!("{first}.{last}"))
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '.')
        .collect();
    format!("{local}{index}@{}", pick(rng, EMAIL_DOMAINS))
}

pub fn address<R: Rng>(rng: &mut R, full_name: &str) -> NewAddress {
    NewAddress {
        full_name: full_name.to_string(),
        street: format!(
            "{} {} {}",
            rng.gen_range(1..=200),
            pick(rng, STREET_TYPES),
            pick(rng, STREET_NAMES)
        ),
        city: pick(rng, CITIES).to_string(),
        postal_code: format!("{:05}", rng.gen_range(1000..=95999)),
        country: pick(rng, COUNTRIES).to_string(),
    }
}

pub fn words<R: Rng>(rng: &mut R, count: usize) -> String {
    (0..count)
        .map(|_| pick(rng, WORDS))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn paragraph<R: Rng>(rng: &mut R) -> String {
    let sentences = rng.gen_range(3..=5);
    (0..sentences)
        .map(|_| {
            let count = rng.gen_range(6..=12);
            let sentence = words(rng, count);
            let mut chars = sentence.chars();
            match chars.next() {
                Some(first) => format!("{}{}.", first.to_uppercase(), chars.as_str()),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Price between 50.00 and 1500.00 with two decimals
pub fn price<R: Rng>(rng: &mut R) -> Decimal {
    Decimal::new(rng.gen_range(5_000..=150_000), 2)
}

pub fn stock<R: Rng>(rng: &mut R) -> u32 {
    rng.gen_range(10..=100)
}

/// Instant within the year before `now`
pub fn within_last_year<R: Rng>(rng: &mut R, now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::seconds(rng.gen_range(0..=365 * 24 * 3600))
}

/// Instant between January 1st of `now`'s year and `now`
pub fn this_year<R: Rng>(rng: &mut R, now: DateTime<Utc>) -> DateTime<Utc> {
    let Some(start) = Utc.with_ymd_and_hms(now.year(), 1, 1, 0, 0, 0).single() else {
        return now;
    };
    let span = (now - start).num_seconds().max(0);
    start + Duration::seconds(rng.gen_range(0..=span))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_email_is_ascii_and_indexed() {
        let mut rng = StdRng::seed_from_u64(7);
        let email = email(&mut rng, "Étienne", "Lefèvre", 3);

        assert!(email.starts_with("etienne.lefevre3@"));
        assert!(email.is_ascii());
    }

    #[test]
    fn test_price_and_stock_ranges() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..500 {
            let price = price(&mut rng);
            assert!(price >= Decimal::new(5000, 2) && price <= Decimal::new(150000, 2));
            assert_eq!(price.scale(), 2);
            assert!((10..=100).contains(&stock(&mut rng)));
        }
    }

    #[test]
    fn test_dates_stay_in_window() {
        let mut rng = StdRng::seed_from_u64(1);
        let now = Utc::now();
        for _ in 0..200 {
            let past = within_last_year(&mut rng, now);
            assert!(past <= now && now - past <= Duration::days(366));

            let this_year = this_year(&mut rng, now);
            assert!(this_year <= now && this_year.year() == now.year());
        }
    }

    #[test]
    fn test_paragraph_sentences() {
        let mut rng = StdRng::seed_from_u64(5);
        let text = paragraph(&mut rng);
        assert!(text.ends_with('.'));
        assert!(text.chars().next().unwrap().is_uppercase());
    }
}
