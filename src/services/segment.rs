use megaphone::models::Contact;

/// Tag-based recipient selection over an already-loaded contact set.
/// Include is an any-of filter (empty means "all contacts"), exclude is a
/// none-of filter applied after include; the two are AND-combined. Pure
/// and store-free: campaign creation freezes the result, it is never
/// re-evaluated at send time.
pub fn filter_by_tags(
    contacts: Vec<Contact>,
    include: &[String],
    exclude: &[String],
) -> Vec<Contact> {
    contacts
        .into_iter()
        .filter(|contact| {
            include.is_empty() || contact.tags.iter().any(|t| include.contains(t))
        })
        .filter(|contact| !contact.tags.iter().any(|t| exclude.contains(t)))
        .collect()
}

/// Comma-separated tag list from a query parameter.
pub fn parse_tag_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn contact(id: i32, tags: &[&str]) -> Contact {
        Contact {
            id,
            tenant_id: 1,
            name: format!("contact-{}", id),
            phone: format!("98{:08}", id),
            email: None,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            created_at: Utc::now(),
        }
    }

    fn tags(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn ids(contacts: &[Contact]) -> Vec<i32> {
        contacts.iter().map(|c| c.id).collect()
    }

    #[test]
    fn test_empty_include_means_all() {
        let filtered = filter_by_tags(
            vec![contact(1, &["parent"]), contact(2, &[])],
            &[],
            &[],
        );
        assert_eq!(ids(&filtered), vec![1, 2]);
    }

    #[test]
    fn test_include_any_of() {
        let filtered = filter_by_tags(
            vec![
                contact(1, &["parent"]),
                contact(2, &["staff"]),
                contact(3, &["parent", "staff"]),
            ],
            &tags(&["parent"]),
            &[],
        );
        assert_eq!(ids(&filtered), vec![1, 3]);
    }

    #[test]
    fn test_exclude_none_of() {
        let filtered = filter_by_tags(
            vec![contact(1, &["parent"]), contact(2, &["parent", "opted-out"])],
            &[],
            &tags(&["opted-out"]),
        );
        assert_eq!(ids(&filtered), vec![1]);
    }

    #[test]
    fn test_exclude_applies_after_include() {
        let filtered = filter_by_tags(
            vec![
                contact(1, &["parent"]),
                contact(2, &["parent", "opted-out"]),
                contact(3, &["staff"]),
            ],
            &tags(&["parent"]),
            &tags(&["opted-out"]),
        );
        assert_eq!(ids(&filtered), vec![1]);
    }

    #[test]
    fn test_parse_tag_list() {
        assert_eq!(parse_tag_list("a, b ,,c"), tags(&["a", "b", "c"]));
        assert!(parse_tag_list(" , ").is_empty());
    }
}
