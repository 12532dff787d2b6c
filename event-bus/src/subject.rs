//! NATS subject construction for account events
//!
//! Subjects are partitioned by account identifier so consumers can subscribe
//! to a single account's stream (`<prefix>.events.<account>`) or all of them
//! (`<prefix>.events.>`).

/// Build the subject for one account's event stream
pub fn for_account(prefix: &str, account_id: &str) -> String {
    format!("{}.events.{}", prefix, sanitize(account_id))
}

/// Sanitize a string for use as a NATS subject token
pub fn sanitize(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_account() {
        assert_eq!(
            for_account("corebank.accounts", "acct-1"),
            "corebank.accounts.events.acct-1"
        );
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("acct-1"), "acct-1");
        assert_eq!(sanitize("acct/1"), "acct_1");
        assert_eq!(sanitize("user@bank"), "user_bank");
    }

    #[test]
    fn test_for_account_sanitizes_id() {
        assert_eq!(
            for_account("corebank.accounts", "a.b c"),
            "corebank.accounts.events.a_b_c"
        );
    }
}
