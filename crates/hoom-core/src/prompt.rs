//! Free-text search prompt → [`FilterCriteria`].
//!
//! The parser is a fixed set of independent regex extractors over a
//! normalized copy of the prompt. Each extractor targets one field and keeps
//! the first match it accepts. Nothing here fails: text that matches nothing
//! yields an empty criteria value.

use std::sync::LazyLock;

use regex::Regex;

use crate::filter::FilterCriteria;
use crate::listing::MarketScope;

// ---------------------------------------------------------------------------
// Extractors
// ---------------------------------------------------------------------------

static MIN_PRICE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:mas de|minimo|desde)\s+\$?\s*(\d+(?:\.\d+)?)").expect("valid regex")
});

static MAX_PRICE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:menos de|maximo|hasta)\s+\$?\s*(\d+(?:\.\d+)?)").expect("valid regex")
});

static BEDROOMS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:(?:^|[^\d.])(?P<n>\d+)|\b(?P<word>una|un))\s+(?:habitacion(?:es)?|cuartos?|recamaras?)\b")
        .expect("valid regex")
});

static BATHROOMS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:(?:^|[^\d.])(?P<n>\d+)|\b(?P<word>una|un))\s+banos?\b").expect("valid regex")
});

static CONSTRUCTION_AREA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+(?:\.\d+)?)\s*m2(?:\s+de\s+construccion)?").expect("valid regex")
});

static LAND_AREA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+(?:\.\d+)?)\s*m2\s+de\s+terreno").expect("valid regex")
});

/// Land-scope area phrase. An upper-bound word right before the number makes
/// it a maximum; anything else is a minimum.
static LAND_BOUND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\b(?P<bound>menos de|maximo|hasta)\s+)?(?P<n>\d+(?:\.\d+)?)\s*m2")
        .expect("valid regex")
});

static LEVELS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[^\d.])(\d+)\s*niveles?\b").expect("valid regex"));

static IS_NEW: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bnuevas?\b").expect("valid regex"));

/// Words that mark a number as a count or an area rather than an amount of
/// money. Matched against the normalized text right after the number.
const UNIT_KEYWORDS: [&str; 7] = [
    "habitacion",
    "cuarto",
    "recamara",
    "bano",
    "m2",
    "metro",
    "nivel",
];

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Parses a prompt in the general market scope.
#[must_use]
pub fn parse(prompt: &str) -> FilterCriteria {
    parse_in_scope(prompt, MarketScope::General)
}

/// Parses a prompt for the given scope.
///
/// Land scope reads `N m2` as land area (with `menos de`/`máximo`/`hasta`
/// turning it into an upper bound) and ignores room, level and newness
/// phrases.
#[must_use]
pub fn parse_in_scope(prompt: &str, scope: MarketScope) -> FilterCriteria {
    let text = normalize(prompt);

    let mut criteria = FilterCriteria {
        min_price: first_price(&MIN_PRICE, &text),
        max_price: first_price(&MAX_PRICE, &text),
        ..FilterCriteria::default()
    };

    match scope {
        MarketScope::General => {
            criteria.min_bedrooms = first_count(&BEDROOMS, &text);
            criteria.min_bathrooms = first_count(&BATHROOMS, &text);
            criteria.min_construction_area_m2 = first_construction_area(&text);
            criteria.min_land_area_m2 = LAND_AREA
                .captures(&text)
                .and_then(|caps| parse_amount(caps.get(1)?.as_str()));
            criteria.exact_levels = LEVELS
                .captures(&text)
                .and_then(|caps| caps.get(1)?.as_str().parse().ok());
            if IS_NEW.is_match(&text) {
                criteria.is_new = Some(true);
            }
        }
        MarketScope::Land => {
            let (min, max) = land_bounds(&text);
            criteria.min_land_area_m2 = min;
            criteria.max_land_area_m2 = max;
        }
    }

    criteria
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Lowercases, drops thousands separators and folds accents so every
/// extractor only needs the unaccented spelling.
fn normalize(prompt: &str) -> String {
    prompt
        .to_lowercase()
        .chars()
        .filter(|c| *c != ',')
        .map(|c| match c {
            'á' | 'à' | 'ä' => 'a',
            'é' | 'è' | 'ë' => 'e',
            'í' | 'ì' | 'ï' => 'i',
            'ó' | 'ò' | 'ö' => 'o',
            'ú' | 'ù' | 'ü' => 'u',
            'ñ' => 'n',
            '²' => '2',
            other => other,
        })
        .collect()
}

fn parse_amount(digits: &str) -> Option<f64> {
    digits.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn followed_by_unit(rest: &str) -> bool {
    let rest = rest.trim_start();
    UNIT_KEYWORDS.iter().any(|k| rest.starts_with(k))
}

fn first_price(re: &Regex, text: &str) -> Option<f64> {
    re.captures_iter(text).find_map(|caps| {
        let number = caps.get(1)?;
        if followed_by_unit(&text[number.end()..]) {
            return None;
        }
        parse_amount(number.as_str())
    })
}

/// Digits win; otherwise `un`/`una` count as one.
fn first_count(re: &Regex, text: &str) -> Option<u32> {
    let caps = re.captures(text)?;
    if let Some(digits) = caps.name("n") {
        return digits.as_str().parse().ok();
    }
    caps.name("word").map(|_| 1)
}

fn first_construction_area(text: &str) -> Option<f64> {
    CONSTRUCTION_AREA.captures_iter(text).find_map(|caps| {
        let whole = caps.get(0)?;
        let rest = text[whole.end()..].trim_start();
        if rest.starts_with("de terreno") {
            return None;
        }
        parse_amount(caps.get(1)?.as_str())
    })
}

fn land_bounds(text: &str) -> (Option<f64>, Option<f64>) {
    let mut min = None;
    let mut max = None;
    for caps in LAND_BOUND.captures_iter(text) {
        let Some(value) = caps.name("n").and_then(|n| parse_amount(n.as_str())) else {
            continue;
        };
        let slot = if caps.name("bound").is_some() {
            &mut max
        } else {
            &mut min
        };
        if slot.is_none() {
            *slot = Some(value);
        }
        if min.is_some() && max.is_some() {
            break;
        }
    }
    (min, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_prompt_yields_empty_criteria() {
        assert!(parse("").is_empty());
        assert!(parse_in_scope("", MarketScope::Land).is_empty());
    }

    #[test]
    fn lone_min_price_phrase_sets_only_min_price() {
        let criteria = parse("más de 1500000");
        assert_eq!(
            criteria,
            FilterCriteria {
                min_price: Some(1_500_000.0),
                ..FilterCriteria::default()
            }
        );
    }

    #[test]
    fn bedroom_count_is_not_read_as_a_price() {
        let criteria = parse("casas con más de 3 habitaciones y menos de $2000000");
        assert_eq!(criteria.min_bedrooms, Some(3));
        assert_eq!(criteria.max_price, Some(2_000_000.0));
        assert_eq!(criteria.min_price, None);
        assert_eq!(criteria.min_bathrooms, None);
        assert_eq!(criteria.min_construction_area_m2, None);
        assert_eq!(criteria.exact_levels, None);
        assert_eq!(criteria.is_new, None);
    }

    #[test]
    fn numeral_words_count_as_one() {
        assert_eq!(parse("una habitación").min_bedrooms, Some(1));
        assert_eq!(parse("un baño").min_bathrooms, Some(1));
        assert_eq!(parse("casa con un cuarto").min_bedrooms, Some(1));
    }

    #[test]
    fn room_word_without_numeral_is_left_unset() {
        assert_eq!(parse("habitaciones").min_bedrooms, None);
        assert_eq!(parse("tres recámaras").min_bedrooms, None);
        assert_eq!(parse("alguna habitación").min_bedrooms, None);
    }

    #[test]
    fn parsing_is_deterministic() {
        let prompt = "departamentos nuevos desde $1,200,000 con 2 recámaras y 2 baños";
        assert_eq!(parse(prompt), parse(prompt));
    }

    #[test]
    fn thousands_separators_are_stripped() {
        let criteria = parse("desde $1,200,000 hasta 3,500,000");
        assert_eq!(criteria.min_price, Some(1_200_000.0));
        assert_eq!(criteria.max_price, Some(3_500_000.0));
    }

    #[test]
    fn unaccented_spellings_are_accepted() {
        let criteria = parse("mas de 900000 maximo 1000000 con 3 recamaras y 2 banos");
        assert_eq!(criteria.min_price, Some(900_000.0));
        assert_eq!(criteria.max_price, Some(1_000_000.0));
        assert_eq!(criteria.min_bedrooms, Some(3));
        assert_eq!(criteria.min_bathrooms, Some(2));
    }

    #[test]
    fn construction_and_land_area_do_not_cross_match() {
        let criteria = parse("casa de 300 m2 de terreno y 180 m2 de construcción");
        assert_eq!(criteria.min_land_area_m2, Some(300.0));
        assert_eq!(criteria.min_construction_area_m2, Some(180.0));
    }

    #[test]
    fn superscript_square_meters_are_recognized() {
        assert_eq!(parse("120 m² de construcción").min_construction_area_m2, Some(120.0));
        assert_eq!(parse("150m2").min_construction_area_m2, Some(150.0));
    }

    #[test]
    fn area_after_price_word_is_not_a_price() {
        let criteria = parse("más de 200 m2");
        assert_eq!(criteria.min_price, None);
        assert_eq!(criteria.min_construction_area_m2, Some(200.0));
    }

    #[test]
    fn levels_and_new_flag() {
        let criteria = parse("casas nuevas de 2 niveles");
        assert_eq!(criteria.exact_levels, Some(2));
        assert_eq!(criteria.is_new, Some(true));
        assert_eq!(parse("1 nivel").exact_levels, Some(1));
    }

    #[test]
    fn new_flag_needs_a_whole_word() {
        assert_eq!(parse("se renueva el contrato").is_new, None);
    }

    #[test]
    fn first_match_wins_per_field() {
        let criteria = parse("2 baños o 3 baños");
        assert_eq!(criteria.min_bathrooms, Some(2));
    }

    #[test]
    fn fractional_counts_are_not_read_from_their_tail() {
        assert_eq!(parse("2.5 baños").min_bathrooms, None);
        assert_eq!(parse("1.5 recámaras").min_bedrooms, None);
        assert_eq!(parse("2.5 niveles").exact_levels, None);
        assert_eq!(parse("12 habitaciones").min_bedrooms, Some(12));
        assert_eq!(parse("casa con 2.5 baños o 3 baños").min_bathrooms, Some(3));
        assert_eq!(parse("3niveles").exact_levels, Some(3));
    }

    #[test]
    fn overflowing_counts_are_absent() {
        assert_eq!(parse("99999999999 habitaciones").min_bedrooms, None);
        assert_eq!(parse("99999999999 niveles").exact_levels, None);
    }

    #[test]
    fn land_scope_reads_area_bounds() {
        let criteria = parse_in_scope("terrenos de 200 m2 hasta 500 m2", MarketScope::Land);
        assert_eq!(criteria.min_land_area_m2, Some(200.0));
        assert_eq!(criteria.max_land_area_m2, Some(500.0));
        assert_eq!(criteria.min_construction_area_m2, None);
        assert_eq!(criteria.max_price, None);
    }

    #[test]
    fn land_scope_keeps_prices_and_ignores_rooms() {
        let criteria = parse_in_scope(
            "terreno de 300 m2 de terreno menos de $800000 con 3 habitaciones nuevas",
            MarketScope::Land,
        );
        assert_eq!(criteria.min_land_area_m2, Some(300.0));
        assert_eq!(criteria.max_land_area_m2, None);
        assert_eq!(criteria.max_price, Some(800_000.0));
        assert_eq!(criteria.min_bedrooms, None);
        assert_eq!(criteria.is_new, None);
    }

    #[test]
    fn general_scope_never_sets_land_upper_bound() {
        assert_eq!(parse("hasta 500 m2").max_land_area_m2, None);
    }
}
