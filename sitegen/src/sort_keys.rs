//! The fixed sort-key strings used in generated listing filenames (spec
//! §6.5 "Sort keys").

pub const SORT_KEYS: &[&str] = &[
    "by-bandwidth",
    "by-overall-bandwidth",
    "by-guard-bandwidth",
    "by-middle-bandwidth",
    "by-exit-bandwidth",
    "by-consensus-weight",
    "by-guard-consensus-weight",
    "by-middle-consensus-weight",
    "by-exit-consensus-weight",
    "by-exit-count",
    "by-guard-count",
    "by-middle-count",
    "by-unique-as-count",
    "by-unique-contact-count",
    "by-unique-family-count",
    "by-first-seen",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly_sixteen_sort_keys() {
        assert_eq!(SORT_KEYS.len(), 16);
    }
}
