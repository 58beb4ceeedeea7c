//! Small string helpers shared by the completion pipeline

/// Longest common prefix of a set of strings.
///
/// Compared char-wise, so multi-byte characters are never split. An empty
/// input yields the empty string.
pub fn longest_common_prefix<S: AsRef<str>>(strings: &[S]) -> String {
    let Some(first) = strings.first() else {
        return String::new();
    };

    let mut prefix: Vec<char> = first.as_ref().chars().collect();

    for s in &strings[1..] {
        let mut common = 0;
        for (a, b) in prefix.iter().zip(s.as_ref().chars()) {
            if *a != b {
                break;
            }
            common += 1;
        }
        prefix.truncate(common);
        if prefix.is_empty() {
            break;
        }
    }

    prefix.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_set_yields_empty() {
        let none: [&str; 0] = [];
        assert_eq!(longest_common_prefix(&none), "");
    }

    #[test]
    fn single_element_is_itself() {
        assert_eq!(longest_common_prefix(&["length"]), "length");
    }

    #[test]
    fn shared_prefix() {
        assert_eq!(
            longest_common_prefix(&["starts_with", "startled", "start"]),
            "start"
        );
    }

    #[test]
    fn disjoint_strings_share_nothing() {
        assert_eq!(longest_common_prefix(&["abc", "xyz"]), "");
    }

    #[test]
    fn multibyte_not_split() {
        assert_eq!(longest_common_prefix(&["héllo", "hélp"]), "hél");
    }

    proptest! {
        #[test]
        fn singleton_equals_element(s in "\\PC*") {
            prop_assert_eq!(longest_common_prefix(&[s.as_str()]), s.clone());
        }

        #[test]
        fn result_prefixes_every_input(a in "\\PC*", b in "\\PC*") {
            let lcp = longest_common_prefix(&[a.as_str(), b.as_str()]);
            prop_assert!(a.starts_with(&lcp));
            prop_assert!(b.starts_with(&lcp));
        }

        #[test]
        fn order_does_not_matter(a in "\\PC*", b in "\\PC*") {
            prop_assert_eq!(
                longest_common_prefix(&[a.as_str(), b.as_str()]),
                longest_common_prefix(&[b.as_str(), a.as_str()])
            );
        }
    }
}
