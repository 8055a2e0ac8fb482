//! Canonical forms for cable identifiers, station names and signer names.
//!
//! All functions here are total: input that no table or pattern covers is
//! already canonical and comes back unchanged.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

static REFERENCE_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]{2})([A-Z]+)([0-9]+)$").expect("valid reference id regex")
});

/// Identifiers as issued with typos; mapped to the identifier the cable is
/// published under.
static MALFORMED_IDS: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("05REYKJAVIK 160", "05REYKJAVIK160"),
        ("06PARIS_2231", "06PARIS2231"),
        ("08STATE-116943", "08STATE116943"),
        ("09OSLOI622", "09OSLO622"),
        ("07BUENOSAIRE1144", "07BUENOSAIRES1144"),
        ("10BRASLIA61", "10BRASILIA61"),
        ("06TELAVIV0", "06TELAVIV30"),
    ])
});

/// Identifiers with no valid published equivalent; they get a synthetic
/// identifier that cannot collide with a real one.
static INVALID_IDS: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("08KABUL0000", "08KABUL0000_a"),
        ("09STATE0", "09STATE0_a"),
        ("10TRIPOLI4", "10TRIPOLI4_a"),
    ])
});

const ORIGIN_PREFIXES: [&str; 3] = ["USMISSION", "AMEMBASSY", "EMBASSY"];

static ORIGIN_FIXES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("RIO", "RIODEJANEIRO"),
        ("SECSTATE", "STATE"),
        ("DEPTOFSTATE", "STATE"),
        ("STATEDEPT", "STATE"),
        ("USUN", "USUNNEWYORK"),
        ("USUNNY", "USUNNEWYORK"),
        ("USEU", "USEUBRUSSELS"),
        ("UNVIE", "UNVIEVIENNA"),
        ("HCMC", "HOCHIMINHCITY"),
        ("SAOPAOLO", "SAOPAULO"),
        ("BRAZILIA", "BRASILIA"),
        ("MEXICOCITY", "MEXICO"),
        ("KUWAITCITY", "KUWAIT"),
        ("GUATEMALACITY", "GUATEMALA"),
        ("PANAMACITY", "PANAMA"),
    ])
});

static SIGNER_FIXES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("RICCIARONDE", "RICCIARDONE"),
        ("CLINTION", "CLINTON"),
        ("CLINTOM", "CLINTON"),
        ("RCIE", "RICE"),
        ("NEGREPONTE.", "NEGROPONTE"),
        ("NEGREPONTE", "NEGROPONTE"),
        ("KHALILZAD.", "KHALILZAD"),
    ])
});

/// Maps a (possibly malformed) reference id onto its canonical form.
pub fn canonicalize_id(reference_id: &str) -> String {
    if let Some(fixed) = MALFORMED_IDS.get(reference_id) {
        return (*fixed).to_string();
    }
    if let Some(fixed) = INVALID_IDS.get(reference_id) {
        return (*fixed).to_string();
    }

    if let Some(captures) = REFERENCE_ID.captures(reference_id) {
        let year = &captures[1];
        let origin = canonicalize_origin(&captures[2]);
        let serial = &captures[3];
        return format!("{year}{origin}{serial}");
    }

    reference_id.to_string()
}

/// Strips station prefixes and fixes known place-name variants.
pub fn canonicalize_origin(origin: &str) -> String {
    // Removing one prefix can splice the remaining letters into another.
    let mut stripped = origin.to_string();
    loop {
        let next = ORIGIN_PREFIXES
            .iter()
            .fold(stripped.clone(), |text, prefix| text.replace(prefix, ""));
        if next == stripped {
            break;
        }
        stripped = next;
    }
    if stripped.is_empty() {
        stripped = origin.to_string();
    }

    match ORIGIN_FIXES.get(stripped.as_str()) {
        Some(fixed) => (*fixed).to_string(),
        None => stripped,
    }
}

pub fn canonicalize_signer(name: &str) -> String {
    let upper = name.trim().to_uppercase();
    match SIGNER_FIXES.get(upper.as_str()) {
        Some(fixed) => (*fixed).to_string(),
        None => upper,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn place_name_corrections_apply_inside_ids() {
        assert_eq!(canonicalize_id("05RIO123"), "05RIODEJANEIRO123");
        assert_eq!(canonicalize_id("06SECSTATE123"), "06STATE123");
        assert_eq!(canonicalize_id("08USUN1042"), "08USUNNEWYORK1042");
    }

    #[test]
    fn station_prefixes_are_removed() {
        assert_eq!(canonicalize_id("06AMEMBASSYPARIS12"), "06PARIS12");
        assert_eq!(canonicalize_id("07USMISSIONUSNATO44"), "07USNATO44");
        assert_eq!(canonicalize_origin("AMEMBASSYRIO"), "RIODEJANEIRO");
        assert_eq!(canonicalize_origin("EMBASSY"), "EMBASSY");
        assert_eq!(canonicalize_id("09EMBEMBASSYASSYPARIS1"), "09PARIS1");
    }

    #[test]
    fn static_tables_win_over_the_pattern() {
        assert_eq!(canonicalize_id("09OSLOI622"), "09OSLO622");
        assert_eq!(canonicalize_id("05REYKJAVIK 160"), "05REYKJAVIK160");
        assert_eq!(canonicalize_id("10TRIPOLI4"), "10TRIPOLI4_a");
    }

    #[test]
    fn unmatched_ids_pass_through() {
        assert_eq!(canonicalize_id("09LONDON2803"), "09LONDON2803");
        assert_eq!(canonicalize_id("not an id"), "not an id");
        assert_eq!(canonicalize_id(""), "");
    }

    #[test]
    fn canonicalization_is_idempotent() {
        let mut samples = vec![
            "05RIO123".to_string(),
            "06SECSTATE123".to_string(),
            "06AMEMBASSYEMBASSY1".to_string(),
            "09EMBEMBASSYASSYPARIS1".to_string(),
            "09USMISUSMISSIONSIONAMEMBASSYROME3".to_string(),
            "09LONDON2803".to_string(),
            "garbage".to_string(),
        ];
        samples.extend(MALFORMED_IDS.keys().map(|key| key.to_string()));
        samples.extend(INVALID_IDS.keys().map(|key| key.to_string()));
        samples.extend(ORIGIN_FIXES.keys().map(|origin| format!("09{origin}77")));

        for sample in samples {
            let once = canonicalize_id(&sample);
            assert_eq!(canonicalize_id(&once), once, "not idempotent for {sample}");
        }
    }

    #[test]
    fn signer_names_are_uppercased_and_fixed() {
        assert_eq!(canonicalize_signer("Ricciaronde"), "RICCIARDONE");
        assert_eq!(canonicalize_signer(" clinton "), "CLINTON");
        assert_eq!(canonicalize_signer("RICE"), "RICE");
    }
}
