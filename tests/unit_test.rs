// Unit tests for userdesk
// These exercise the public building blocks one at a time, without a terminal or network.

#[cfg(test)]
mod validate_tests {
    use userdesk::api::Draft;
    use userdesk::validate::{EMAIL_INVALID, NAME_REQUIRED, draft_is_valid, email_hint, email_is_valid, name_hint};

    #[test]
    fn test_email_shapes() {
        for ok in ["a@b.co", "first.last@sub.example.org", "x+tag@host.io"] {
            assert!(email_is_valid(ok), "{ok} should be valid");
        }
        for bad in ["", "plain", "a@b", "@b.co", "a@.co", "a@b.", "a b@c.de", "a@b@c.de"] {
            assert!(!email_is_valid(bad), "{bad} should be invalid");
        }
    }

    #[test]
    fn test_draft_requires_both_fields() {
        assert!(draft_is_valid(&Draft::new("Ann", "ann@example.com")));
        assert!(!draft_is_valid(&Draft::new("   ", "ann@example.com")));
        assert!(!draft_is_valid(&Draft::new("Ann", "ann@example")));
        assert!(!draft_is_valid(&Draft::default()));
    }

    #[test]
    fn test_hints_only_for_touched_fields() {
        assert_eq!(name_hint(""), None);
        assert_eq!(name_hint("  "), Some(NAME_REQUIRED));
        assert_eq!(email_hint(""), None);
        assert_eq!(email_hint("ann@"), Some(EMAIL_INVALID));
        assert_eq!(email_hint("ann@example.com"), None);
    }
}

#[cfg(test)]
mod pagination_tests {
    use userdesk::pagination::{PAGE_SIZE_OPTIONS, Pagination};

    #[test]
    fn test_clamp_on_exact_page_boundary() {
        let mut p = Pagination::new(5);
        p.next_page(15);
        p.next_page(15);
        assert_eq!(p.page_index(), 2);
        // 10 rows fill exactly two pages, so the third page disappears
        p.clamp(10);
        assert_eq!(p.page_index(), 1);
        assert_eq!(p.window(10), 5..10);
        p.clamp(10);
        assert_eq!(p.page_index(), 1, "already valid");
        p.clamp(5);
        assert_eq!(p.page_index(), 0);
    }

    #[test]
    fn test_label_after_set_page_size() {
        let mut p = Pagination::new(5);
        p.next_page(30);
        p.next_page(30);
        assert_eq!(p.label(30), "11–15 of 30");
        p.set_page_size(25);
        assert_eq!(p.label(30), "1–25 of 30");
        assert!(p.next_page(30));
        assert_eq!(p.label(30), "26–30 of 30");
        assert_eq!(p.page_count(30), 2);
    }

    #[test]
    fn test_odd_sizes_and_empty_sets() {
        // sizes outside the option list cycle back to the first option
        let mut p = Pagination::new(7);
        p.cycle_page_size();
        assert_eq!(p.page_size(), PAGE_SIZE_OPTIONS[0]);

        assert_eq!(Pagination::new(0).page_size(), 1);
        let mut empty = Pagination::new(5);
        assert_eq!(empty.page_count(0), 1);
        assert!(!empty.next_page(0));
        assert!(!empty.prev_page());
        let none: [u32; 0] = [];
        assert!(empty.slice(&none).is_empty());
    }
}

#[cfg(test)]
mod timer_tests {
    use std::time::{Duration, Instant};
    use userdesk::search::SearchBox;
    use userdesk::timer::{Debounced, ScopedTimer};

    #[test]
    fn test_timer_fires_exactly_at_deadline() {
        let t0 = Instant::now();
        let mut t = ScopedTimer::new();
        assert!(!t.fire(t0), "unarmed");
        t.schedule(t0, Duration::from_secs(3));
        assert!(t.is_pending());
        assert!(!t.fire(t0 + Duration::from_millis(2999)));
        assert!(t.fire(t0 + Duration::from_secs(3)));
    }

    #[test]
    fn test_raw_value_moves_before_settled() {
        let t0 = Instant::now();
        let mut d = Debounced::new(0u32, Duration::from_millis(500));
        d.update(t0, |v| *v += 1);
        d.update(t0 + Duration::from_millis(10), |v| *v += 1);
        assert_eq!((*d.raw(), *d.settled()), (2, 0));
        assert_eq!(d.poll(t0 + Duration::from_millis(510)), Some(&2));
        assert_eq!(d.poll(t0 + Duration::from_secs(5)), None, "nothing new to settle");
    }

    #[test]
    fn test_search_cleared_back_to_unfiltered_key() {
        let t0 = Instant::now();
        let mut s = SearchBox::with_delay(Duration::from_millis(100));
        s.set("ann", t0);
        assert_eq!(s.poll(t0 + Duration::from_millis(100)).as_deref(), Some("ann"));
        s.pop(t0 + Duration::from_millis(200));
        s.clear(t0 + Duration::from_millis(250));
        assert_eq!(s.text(), "");
        assert_eq!(s.effective(), "ann", "not settled yet");
        assert_eq!(s.poll(t0 + Duration::from_millis(350)).as_deref(), Some(""));
        assert_eq!(s.query_key().to_string(), r#"["users", ""]"#);
    }
}

#[cfg(test)]
mod keymap_tests {
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use userdesk::app::keymap::{KeyAction, Keymap, format_action};

    #[test]
    fn test_default_keys_for_help() {
        let km = Keymap::default();
        assert_eq!(km.keys_for(KeyAction::Quit), vec!["Ctrl+c".to_string(), "q".to_string()]);
        assert_eq!(km.keys_for(KeyAction::Retry), vec!["r".to_string()]);
        assert_eq!(format_action(KeyAction::CyclePageSize), "CyclePageSize");
    }

    #[test]
    fn test_rebinding_adds_key() {
        let km = Keymap::parse("NextPage = n\n");
        let n = KeyEvent::new(KeyCode::Char('n'), KeyModifiers::NONE);
        assert_eq!(km.resolve(&n), Some(KeyAction::NextPage));
        // untouched defaults survive
        let right = KeyEvent::new(KeyCode::Right, KeyModifiers::NONE);
        assert_eq!(km.resolve(&right), Some(KeyAction::NextPage));
    }
}

#[cfg(test)]
mod api_tests {
    use userdesk::api::{Draft, User};
    use userdesk::error::{ApiError, Operation};

    #[test]
    fn test_user_without_company_uses_fallback() {
        let user: User = serde_json::from_str(r#"{"id": 9, "name": "Kim", "email": "kim@x.io"}"#).unwrap();
        assert_eq!(user.company_label(), "No Company");
        assert_eq!(user.initial(), 'K');
    }

    #[test]
    fn test_draft_body_has_only_editable_fields() {
        let body = serde_json::to_value(Draft::new("Ann", "ann@example.com")).unwrap();
        assert_eq!(body, serde_json::json!({"name": "Ann", "email": "ann@example.com"}));
    }

    #[test]
    fn test_failure_messages_per_operation() {
        let cases = [
            (Operation::Fetch, "Failed to fetch users (HTTP 500)"),
            (Operation::Create, "Failed to add user (HTTP 500)"),
            (Operation::Update, "Failed to update user (HTTP 500)"),
            (Operation::Delete, "Failed to delete user (HTTP 500)"),
        ];
        for (op, text) in cases {
            assert_eq!(ApiError::request_failed(op, "HTTP 500").to_string(), text);
        }
    }
}
