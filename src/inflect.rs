//! Minimal English inflections for class names.
//!
//! Covers the common Rails `classify` cases: `seeds` -> `Seed`,
//! `user_categories` -> `UserCategory`.

const UNCOUNTABLE: &[&str] = &[
    "equipment",
    "information",
    "rice",
    "money",
    "species",
    "series",
    "fish",
    "sheep",
    "jeans",
    "police",
    "news",
];

const IRREGULAR: &[(&str, &str)] = &[
    ("people", "person"),
    ("men", "man"),
    ("children", "child"),
    ("sexes", "sex"),
    ("moves", "move"),
    ("zombies", "zombie"),
];

/// Suffix rules, first match wins.
const SUFFIXES: &[(&str, &str)] = &[
    ("quizzes", "quiz"),
    ("matrices", "matrix"),
    ("vertices", "vertex"),
    ("indices", "index"),
    ("statuses", "status"),
    ("aliases", "alias"),
    ("buses", "bus"),
    ("oxen", "ox"),
    ("movies", "movie"),
    ("shoes", "shoe"),
    ("hives", "hive"),
    ("lves", "lf"),
    ("rves", "rf"),
    ("xes", "x"),
    ("ches", "ch"),
    ("shes", "sh"),
    ("sses", "ss"),
    ("oes", "o"),
    ("ss", "ss"),
    ("us", "us"),
    ("is", "is"),
    ("ta", "tum"),
    ("ia", "ium"),
];

/// Singular form of the last word of `word`.
pub fn singularize(word: &str) -> String {
    let lower = word.to_ascii_lowercase();
    let last_word = lower.rsplit('_').next().unwrap_or(&lower);
    if UNCOUNTABLE.contains(&last_word) {
        return word.to_string();
    }

    for (plural, singular) in IRREGULAR {
        if lower.ends_with(plural) {
            return replace_suffix(word, plural.len(), singular);
        }
    }

    for (plural, singular) in SUFFIXES {
        if lower.ends_with(plural) {
            return replace_suffix(word, plural.len(), singular);
        }
    }

    if let Some(stem) = lower.strip_suffix("ies") {
        // `categories` -> `category`, but `movies` handled above
        let consonant = stem.chars().last().is_some_and(|c| !"aeiou".contains(c));
        if consonant {
            return replace_suffix(word, 3, "y");
        }
    }

    if let Some(stem) = lower.strip_suffix("ves") {
        let keep_f = stem.chars().last().is_some_and(|c| c != 'f');
        if keep_f && !stem.is_empty() {
            return replace_suffix(word, 3, "fe");
        }
    }

    if lower.ends_with('s') {
        return replace_suffix(word, 1, "");
    }

    word.to_string()
}

fn replace_suffix(word: &str, len: usize, replacement: &str) -> String {
    let cut = word.len().saturating_sub(len);
    format!("{}{}", &word[..cut], replacement)
}

/// `add_user_roles` -> `AddUserRoles`. Path separators become `::`.
pub fn camelize(s: &str) -> String {
    s.split('/')
        .map(|segment| {
            segment
                .split(['_', '-'])
                .filter(|part| !part.is_empty())
                .map(|part| {
                    let mut chars = part.chars();
                    match chars.next() {
                        Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                        None => String::new(),
                    }
                })
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("::")
}

/// Rails-style `classify`: drops any `schema.` prefix, singularizes and
/// camelizes. `public.user_categories` -> `UserCategory`.
pub fn classify(name: &str) -> String {
    let name = name.rsplit('.').next().unwrap_or(name);
    camelize(&singularize(name))
}
