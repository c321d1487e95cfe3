//! Status normalization

/// Status reported for misses, failures and the `created` alias
pub const PENDING: &str = "pending";

/// Map a stored status to the response vocabulary.
///
/// Missing or empty input is `pending`. Everything else is lowercased and
/// passed through, except `created` which is reported as `pending`.
pub fn normalize_status(raw: Option<&str>) -> String {
    let raw = match raw {
        Some(s) if !s.is_empty() => s,
        _ => return PENDING.to_string(),
    };

    let folded = raw.to_lowercase();
    if folded == "created" {
        PENDING.to_string()
    } else {
        folded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_and_empty() {
        assert_eq!(normalize_status(None), "pending");
        assert_eq!(normalize_status(Some("")), "pending");
    }

    #[test]
    fn test_created_alias() {
        assert_eq!(normalize_status(Some("created")), "pending");
        assert_eq!(normalize_status(Some("CREATED")), "pending");
        assert_eq!(normalize_status(Some("Created")), "pending");
    }

    #[test]
    fn test_case_folding_passthrough() {
        assert_eq!(normalize_status(Some("SUCCESS")), "success");
        assert_eq!(normalize_status(Some("sended")), "sended");
        assert_eq!(normalize_status(Some("Successed")), "successed");
        assert_eq!(normalize_status(Some("PENDING")), "pending");
        assert_eq!(normalize_status(Some("refunded")), "refunded");
    }

    #[test]
    fn test_no_other_aliases() {
        assert_eq!(normalize_status(Some("new")), "new");
        assert_eq!(normalize_status(Some(" created ")), " created ");
    }
}
