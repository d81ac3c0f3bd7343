//! Draft validation shared by the create form and the edit dialog.

use crate::api::Draft;

pub const NAME_REQUIRED: &str = "Name is required";
pub const EMAIL_INVALID: &str = "Please enter a valid email address";

pub fn name_is_valid(name: &str) -> bool {
    !name.trim().is_empty()
}

/// Accepts `local@domain.tld`: exactly one `@`, no whitespace, and a domain
/// with a dot that has text on both sides.
pub fn email_is_valid(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .char_indices()
        .filter(|&(_, c)| c == '.')
        .any(|(i, _)| i > 0 && i + 1 < domain.len())
}

pub fn draft_is_valid(draft: &Draft) -> bool {
    name_is_valid(&draft.name) && email_is_valid(&draft.email)
}

/// Hint under the name field. Untouched (empty) fields get none.
pub fn name_hint(name: &str) -> Option<&'static str> {
    (!name.is_empty() && !name_is_valid(name)).then_some(NAME_REQUIRED)
}

pub fn email_hint(email: &str) -> Option<&'static str> {
    (!email.is_empty() && !email_is_valid(email)).then_some(EMAIL_INVALID)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_simple_addresses() {
        for ok in ["ann@x.com", "a.b@c.d.e", "Nathan@yesenia.net", "x@y.z"] {
            assert!(email_is_valid(ok), "{ok}");
        }
    }

    #[test]
    fn rejects_malformed_addresses() {
        for bad in ["", "ann", "ann@", "@x.com", "ann@x", "ann@.com", "ann@x.", "a b@x.com", "a@b@c.com", " ann@x.com"] {
            assert!(!email_is_valid(bad), "{bad:?}");
        }
    }

    #[test]
    fn hints_only_for_touched_fields() {
        assert_eq!(name_hint(""), None);
        assert_eq!(name_hint("   "), Some(NAME_REQUIRED));
        assert_eq!(name_hint("Ann"), None);
        assert_eq!(email_hint(""), None);
        assert_eq!(email_hint("ann@"), Some(EMAIL_INVALID));
    }

    #[test]
    fn whitespace_only_name_invalidates_draft() {
        assert!(!draft_is_valid(&Draft::new(" \t", "ann@x.com")));
        assert!(draft_is_valid(&Draft::new("Ann", "ann@x.com")));
    }
}
