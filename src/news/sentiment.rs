use once_cell::sync::Lazy;
use std::collections::HashMap;

/// AFINN-style valences for words that show up in news headlines.
/// Scores run from -5 to 5.
const LEXICON: &[(&str, i32)] = &[
    ("abandoned", -2),
    ("accident", -2),
    ("achievement", 3),
    ("advance", 2),
    ("amazing", 4),
    ("attack", -1),
    ("attacked", -2),
    ("award", 3),
    ("awarded", 3),
    ("bankruptcy", -3),
    ("benefit", 2),
    ("best", 3),
    ("blast", -2),
    ("bomb", -1),
    ("boost", 2),
    ("breakthrough", 3),
    ("brilliant", 4),
    ("casualties", -2),
    ("celebrate", 3),
    ("celebrated", 3),
    ("charged", -3),
    ("collapse", -2),
    ("conflict", -2),
    ("crash", -2),
    ("crashed", -2),
    ("crisis", -3),
    ("cure", 2),
    ("cut", -1),
    ("damage", -3),
    ("dead", -3),
    ("deadly", -3),
    ("death", -2),
    ("deaths", -2),
    ("defeat", -2),
    ("delight", 3),
    ("destroyed", -3),
    ("dies", -3),
    ("disaster", -2),
    ("discovery", 3),
    ("donate", 2),
    ("donated", 2),
    ("doubt", -1),
    ("drought", -3),
    ("emergency", -2),
    ("epidemic", -3),
    ("fail", -2),
    ("failed", -2),
    ("failure", -2),
    ("fear", -2),
    ("fears", -2),
    ("fire", -2),
    ("fraud", -4),
    ("free", 1),
    ("gain", 2),
    ("gains", 2),
    ("good", 3),
    ("great", 3),
    ("growth", 2),
    ("happy", 3),
    ("heal", 2),
    ("hero", 2),
    ("hope", 2),
    ("hopeful", 2),
    ("improve", 2),
    ("improved", 2),
    ("innovative", 2),
    ("inspiring", 2),
    ("killed", -3),
    ("kills", -3),
    ("launch", 1),
    ("lawsuit", -2),
    ("lose", -3),
    ("loss", -3),
    ("lost", -3),
    ("miracle", 4),
    ("murder", -2),
    ("outbreak", -2),
    ("panic", -3),
    ("peace", 2),
    ("progress", 2),
    ("promising", 2),
    ("protest", -2),
    ("rally", 1),
    ("recession", -2),
    ("record", 1),
    ("recovery", 2),
    ("rescue", 2),
    ("rescued", 2),
    ("safe", 1),
    ("scandal", -3),
    ("shooting", -3),
    ("shortage", -2),
    ("strike", -1),
    ("strong", 2),
    ("success", 2),
    ("successful", 3),
    ("support", 2),
    ("surge", 1),
    ("survived", 2),
    ("threat", -2),
    ("tragedy", -2),
    ("triumph", 4),
    ("victory", 3),
    ("violence", -3),
    ("vulnerable", -2),
    ("war", -2),
    ("warning", -3),
    ("win", 4),
    ("winner", 4),
    ("wins", 4),
    ("won", 3),
    ("worst", -3),
];

static VALENCES: Lazy<HashMap<&'static str, i32>> =
    Lazy::new(|| LEXICON.iter().copied().collect());

/// Sums valences over whitespace-separated tokens. Tokens are lowercased
/// and stripped of surrounding punctuation before lookup, so "Wins!" and
/// "wins" score the same. Unknown words contribute nothing.
pub fn score(text: &str) -> i32 {
    text.split_whitespace()
        .map(|token| {
            let word = token
                .trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase();
            VALENCES.get(word.as_str()).copied().unwrap_or(0)
        })
        .sum()
}

/// Good news means a non-negative combined score for the headline and
/// description. Neutral wire copy scores zero and is kept.
pub fn is_good_news(title: &str, description: Option<&str>) -> bool {
    let combined = match description {
        Some(desc) => format!("{} {}", title, desc),
        None => title.to_string(),
    };
    score(&combined) >= 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upbeat_text_scores_positive() {
        assert!(score("Local team wins championship in stunning victory") > 0);
    }

    #[test]
    fn grim_text_scores_negative() {
        assert!(score("Deadly crash kills three amid growing crisis") < 0);
    }

    #[test]
    fn neutral_text_scores_zero() {
        assert_eq!(score("Council meets to discuss zoning schedule"), 0);
    }

    #[test]
    fn punctuation_and_case_are_ignored() {
        assert_eq!(score("WINS!"), score("wins"));
        assert_eq!(score("\"Breakthrough,\""), score("breakthrough"));
    }

    #[test]
    fn empty_text_scores_zero() {
        assert_eq!(score(""), 0);
        assert_eq!(score("   "), 0);
    }

    #[test]
    fn good_news_keeps_neutral_and_positive() {
        assert!(is_good_news("Council meets to discuss zoning", None));
        assert!(is_good_news("Team wins big", Some("A great victory")));
        assert!(!is_good_news("Market collapse", Some("Panic spreads amid crisis")));
    }

    #[test]
    fn description_tips_the_balance() {
        assert!(!is_good_news("City fire", None));
        assert!(!is_good_news("City event", Some("disaster and tragedy strike")));
        assert!(is_good_news("City fire", Some("everyone rescued, hero praised, great recovery")));
    }
}
