//! Cleanup heuristics for hand-typed registration data.

/// Titles people enter as a name suffix that are not name suffixes.
const DISALLOWED_SUFFIXES: [&str; 10] = [
    "Mr", "Mr.", "Mrs", "Mrs.", "Ms", "Ms.", "Dr", "Dr.", "Rev", "Rev.",
];

const DIETARY_SEPARATOR: &str = "; ";
const MARKETING_SEPARATOR: &str = "; ";

fn is_mixed_case(value: &str) -> bool {
    value != value.to_lowercase() && value != value.to_uppercase()
}

/// Upper-cases the first letter of every word, lower-cases the rest. A word
/// starts after anything that is not a letter or digit, so `o'brien-smith`
/// becomes `O'Brien-Smith`.
#[must_use]
pub fn title_case(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    let mut word_start = true;
    for c in value.to_lowercase().chars() {
        if word_start {
            result.extend(c.to_uppercase());
        } else {
            result.push(c);
        }
        word_start = !c.is_alphanumeric();
    }
    result
}

/// Mixed case input is trusted as typed. All-lower or all-upper input takes
/// the casing of `companion` (the same name as typed by whoever registered
/// the participant) when that matches and is itself mixed case, and is title
/// cased otherwise.
#[must_use]
pub fn fix_case(value: &str, companion: &str) -> String {
    if is_mixed_case(value) {
        return value.to_owned();
    }
    if is_mixed_case(companion) && companion.to_lowercase() == value.to_lowercase() {
        return companion.to_owned();
    }
    title_case(value)
}

/// Drops nicknames that only repeat the first name, possibly followed by a
/// middle initial and the last name.
pub(crate) fn clean_nickname(nickname: &str, first_name: &str, last_name: &str) -> String {
    if nickname == first_name {
        return String::new();
    }
    if !last_name.is_empty() {
        if let Some(remainder) = nickname
            .strip_suffix(last_name)
            .and_then(|rest| rest.strip_suffix(' '))
        {
            let with_middle_initial = remainder
                .strip_prefix(first_name)
                .and_then(|rest| rest.strip_prefix(' '))
                .is_some_and(|initial| {
                    let mut chars = initial.chars();
                    chars.next().is_some_and(char::is_alphabetic) && chars.next().is_none()
                });
            if remainder == first_name || with_middle_initial {
                return String::new();
            }
            return remainder.trim_end().to_owned();
        }
    }
    nickname.to_owned()
}

pub(crate) fn clean_suffix(suffix: &str) -> String {
    if DISALLOWED_SUFFIXES
        .iter()
        .any(|disallowed| disallowed.eq_ignore_ascii_case(suffix))
    {
        String::new()
    } else {
        suffix.to_owned()
    }
}

/// What a checkbox column contributes: nothing when unchecked, the column
/// label for a plain "yes", the cell text otherwise.
pub(crate) fn checkbox(label: &str, value: &str) -> Option<String> {
    const NO: [&str; 4] = ["no", "n", "false", "0"];
    const YES: [&str; 5] = ["yes", "y", "x", "true", "1"];

    let value = value.trim();
    if value.is_empty() || NO.iter().any(|no| no.eq_ignore_ascii_case(value)) {
        None
    } else if YES.iter().any(|yes| yes.eq_ignore_ascii_case(value)) {
        Some(label.to_owned())
    } else {
        Some(value.to_owned())
    }
}

/// Vegetarian is dropped whenever the accumulated text already mentions
/// Vegan anywhere, so call this in the order vegan, vegetarian, gluten free.
/// The separator only goes between values, never in front of the first one.
pub(crate) fn append_dietary(restrictions: &mut String, value: &str) {
    if value.is_empty() {
        return;
    }
    if value == "Vegetarian" && restrictions.contains("Vegan") {
        return;
    }
    if !restrictions.is_empty() {
        restrictions.push_str(DIETARY_SEPARATOR);
    }
    restrictions.push_str(value);
}

pub(crate) fn append_marketing(marketing: &mut String, value: &str) {
    let value = value.replace(';', " ");
    let value = value.trim();
    if value.is_empty() {
        return;
    }
    if !marketing.is_empty() {
        marketing.push_str(MARKETING_SEPARATOR);
    }
    marketing.push_str(value);
}

pub(crate) fn clean_council(council: &str) -> String {
    if council.eq_ignore_ascii_case("Other") {
        String::new()
    } else {
        council.to_owned()
    }
}

/// Districts outside the home council mean nothing to us. `"North (Bay)"`
/// becomes `"North"`.
pub(crate) fn clean_district(district: &str, council: &str, home_council: &str) -> String {
    if !council.eq_ignore_ascii_case(home_council) {
        return String::new();
    }
    district
        .split_once('(')
        .map_or(district, |(before, _)| before)
        .trim_end()
        .to_owned()
}

/// `"Cub Pack"` becomes `"Pack"`.
pub(crate) fn shorten_unit_type(unit_type: &str) -> String {
    unit_type
        .split_whitespace()
        .last()
        .unwrap_or_default()
        .to_owned()
}

/// Digits only without leading zeros; councils and districts have no number.
pub(crate) fn clean_unit_number(unit_number: &str, unit_type: &str) -> String {
    if unit_type.eq_ignore_ascii_case("Council") || unit_type.eq_ignore_ascii_case("District") {
        return String::new();
    }
    let digits: String = unit_number.chars().filter(char::is_ascii_digit).collect();
    digits.trim_start_matches('0').to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mixed_case_is_kept() {
        assert_eq!(fix_case("McDonald", ""), "McDonald");
        assert_eq!(fix_case("deVries", "DEVRIES"), "deVries");
    }

    #[test]
    fn companion_casing_is_adopted() {
        assert_eq!(fix_case("MCDONALD", "McDonald"), "McDonald");
        assert_eq!(fix_case("mcdonald", "McDonald"), "McDonald");
        assert_eq!(fix_case("MCDONALD", "MCDONALD"), "Mcdonald");
        assert_eq!(fix_case("MCDONALD", "MacDonald"), "Mcdonald");
    }

    #[test]
    fn single_case_is_title_cased() {
        assert_eq!(fix_case("MARY-JANE", ""), "Mary-Jane");
        assert_eq!(fix_case("o'brien", ""), "O'Brien");
        assert_eq!(fix_case("", ""), "");
    }

    #[test]
    fn nickname_equal_to_first_name_is_dropped() {
        assert_eq!(clean_nickname("Robert", "Robert", "Smith"), "");
    }

    #[test]
    fn nickname_with_last_name_is_stripped() {
        assert_eq!(clean_nickname("Bob Smith", "Robert", "Smith"), "Bob");
        assert_eq!(clean_nickname("Robert Smith", "Robert", "Smith"), "");
        assert_eq!(clean_nickname("Robert J Smith", "Robert", "Smith"), "");
        assert_eq!(clean_nickname("Robert Jo Smith", "Robert", "Smith"), "Robert Jo");
    }

    #[test]
    fn unrelated_nickname_is_kept() {
        assert_eq!(clean_nickname("Bobby", "Robert", "Smith"), "Bobby");
        assert_eq!(clean_nickname("Bob Smithers", "Robert", "Smith"), "Bob Smithers");
        assert_eq!(clean_nickname("BobSmith", "Robert", "Smith"), "BobSmith");
    }

    #[test]
    fn titles_are_not_suffixes() {
        assert_eq!(clean_suffix("Mr."), "");
        assert_eq!(clean_suffix("DR"), "");
        assert_eq!(clean_suffix("Jr"), "Jr");
        assert_eq!(clean_suffix("III"), "III");
    }

    #[test]
    fn checkbox_values() {
        assert_eq!(checkbox("Vegan", "Yes"), Some("Vegan".to_owned()));
        assert_eq!(checkbox("Vegan", "x"), Some("Vegan".to_owned()));
        assert_eq!(checkbox("Vegan", ""), None);
        assert_eq!(checkbox("Vegan", "No"), None);
        assert_eq!(checkbox("Other", "Nut allergy"), Some("Nut allergy".to_owned()));
    }

    #[test]
    fn vegetarian_is_redundant_after_vegan() {
        let mut restrictions = String::new();
        append_dietary(&mut restrictions, "Vegan");
        append_dietary(&mut restrictions, "Vegetarian");
        append_dietary(&mut restrictions, "Gluten Free");
        assert_eq!(restrictions, "Vegan; Gluten Free");
    }

    #[test]
    fn vegetarian_is_dropped_for_any_mention_of_vegan() {
        let mut restrictions = String::new();
        append_dietary(&mut restrictions, "Vegan on weekdays");
        append_dietary(&mut restrictions, "Vegetarian");
        assert_eq!(restrictions, "Vegan on weekdays");
    }

    #[test]
    fn dietary_join_has_no_leading_separator() {
        let mut restrictions = String::new();
        append_dietary(&mut restrictions, "");
        append_dietary(&mut restrictions, "Vegetarian");
        assert_eq!(restrictions, "Vegetarian");
        append_dietary(&mut restrictions, "Gluten Free");
        assert_eq!(restrictions, "Vegetarian; Gluten Free");
    }

    #[test]
    fn marketing_semicolons_become_spaces() {
        let mut marketing = String::new();
        append_marketing(&mut marketing, "Email");
        append_marketing(&mut marketing, " ; ");
        append_marketing(&mut marketing, "Friend;neighbor");
        assert_eq!(marketing, "Email; Friend neighbor");
    }

    #[test]
    fn council_and_district() {
        assert_eq!(clean_council("Other"), "");
        assert_eq!(clean_council("Golden Gate"), "Golden Gate");
        assert_eq!(
            clean_district("Bay Area (North)", "Pacific Skyline", "Pacific Skyline"),
            "Bay Area"
        );
        assert_eq!(clean_district("Bay Area", "Golden Gate", "Pacific Skyline"), "");
    }

    #[test]
    fn unit_type_and_number() {
        assert_eq!(shorten_unit_type("Cub Pack"), "Pack");
        assert_eq!(shorten_unit_type("Troop"), "Troop");
        assert_eq!(shorten_unit_type(""), "");
        assert_eq!(clean_unit_number("Troop 0014", "Troop"), "14");
        assert_eq!(clean_unit_number("14", "Council"), "");
        assert_eq!(clean_unit_number("3", "district"), "");
    }
}
