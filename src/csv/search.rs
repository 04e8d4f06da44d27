//! Row Search
//!
//! Filters parsed rows by exact or substring match, optionally case-insensitive.

/// Returns the rows matching `value`, in their original order.
///
/// With `column`, only that field is compared and rows too short to have it
/// are skipped. Without it, a row matches when any field does.
pub fn search<R>(
    rows: &[R],
    value: &str,
    column: Option<usize>,
    case_sensitive: bool,
    substring_match: bool,
) -> Vec<R>
where
    R: AsRef<[String]> + Clone,
{
    let needle = fold(value, case_sensitive);
    let matches = |field: &String| {
        let field = fold(field, case_sensitive);
        if substring_match {
            field.contains(needle.as_str())
        } else {
            field == needle
        }
    };

    rows.iter()
        .filter(|row| {
            let fields: &[String] = row.as_ref();
            match column {
                Some(idx) => fields.get(idx).is_some_and(&matches),
                None => fields.iter().any(&matches),
            }
        })
        .cloned()
        .collect()
}

fn fold(s: &str, case_sensitive: bool) -> String {
    if case_sensitive {
        s.to_string()
    } else {
        s.to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(data: &[&[&str]]) -> Vec<Vec<String>> {
        data.iter()
            .map(|r| r.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    fn people() -> Vec<Vec<String>> {
        rows(&[
            &["Colin", "19", "Student"],
            &["Thao", "52", "Doctor"],
            &["colin", "33", "Nurse"],
        ])
    }

    #[test]
    fn test_exact_case_sensitive() {
        let found = search(&people(), "Colin", None, true, false);
        assert_eq!(found, rows(&[&["Colin", "19", "Student"]]));
    }

    #[test]
    fn test_exact_case_insensitive_adds_case_variants() {
        let found = search(&people(), "Colin", None, false, false);
        assert_eq!(found.len(), 2);
        assert_eq!(found[1][0], "colin");
    }

    #[test]
    fn test_exact_does_not_match_substrings() {
        assert!(search(&people(), "Col", None, true, false).is_empty());
    }

    #[test]
    fn test_substring_any_column() {
        let data = rows(&[&["Colin", "19", "Student"], &["Thao", "52", "Doctor"]]);
        let found = search(&data, "o", None, false, true);
        assert_eq!(found, data);
    }

    #[test]
    fn test_column_restricts_match() {
        let found = search(&people(), "19", Some(0), true, false);
        assert!(found.is_empty());

        let found = search(&people(), "19", Some(1), true, false);
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_short_rows_never_match_column() {
        let data = rows(&[&["a"], &["b", "x"]]);
        let found = search(&data, "x", Some(1), true, false);
        assert_eq!(found, rows(&[&["b", "x"]]));
        assert!(search(&data, "a", Some(5), true, false).is_empty());
    }

    #[test]
    fn test_case_insensitive_query_folded() {
        let found = search(&people(), "DOC", Some(2), false, true);
        assert_eq!(found, rows(&[&["Thao", "52", "Doctor"]]));
    }

    #[test]
    fn test_input_untouched() {
        let data = people();
        let before = data.clone();
        let _ = search(&data, "colin", None, false, false);
        assert_eq!(data, before);
    }
}
