//! Problem title derivation from links

/// Derives a display title from a problem link
pub trait TitleResolver: Send + Sync {
    fn resolve(&self, link: &str) -> Option<String>;
}

/// Turns `https://leetcode.com/problems/two-sum/` into `Two Sum`
#[derive(Debug, Clone, Copy, Default)]
pub struct LeetCodeSlugTitle;

const PROBLEMS_MARKER: &str = "/problems/";

impl TitleResolver for LeetCodeSlugTitle {
    fn resolve(&self, link: &str) -> Option<String> {
        let link = link.trim();
        if !link.contains("leetcode.com/problems/") {
            return None;
        }

        let (_, rest) = link.split_once(PROBLEMS_MARKER)?;
        let slug = rest
            .split(|c: char| c == '/' || c == '?' || c == '#')
            .next()
            .unwrap_or_default();

        let title = slug
            .split('-')
            .filter(|w| !w.is_empty())
            .map(capitalize)
            .collect::<Vec<_>>()
            .join(" ");

        if title.is_empty() {
            None
        } else {
            Some(title)
        }
    }
}

/// Never derives a title
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTitleResolver;

impl TitleResolver for NoTitleResolver {
    fn resolve(&self, _link: &str) -> Option<String> {
        None
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_to_title() {
        let r = LeetCodeSlugTitle;
        assert_eq!(
            r.resolve("https://leetcode.com/problems/two-sum/"),
            Some("Two Sum".to_string())
        );
        assert_eq!(
            r.resolve("https://leetcode.com/problems/lru-cache/description/"),
            Some("Lru Cache".to_string())
        );
        assert_eq!(
            r.resolve("  leetcode.com/problems/merge-k-sorted-lists?envType=daily  "),
            Some("Merge K Sorted Lists".to_string())
        );
    }

    #[test]
    fn test_non_problem_links() {
        let r = LeetCodeSlugTitle;
        assert_eq!(r.resolve(""), None);
        assert_eq!(r.resolve("https://example.com/problems/two-sum"), None);
        assert_eq!(r.resolve("https://leetcode.com/problems/"), None);
    }

    #[test]
    fn test_no_title_resolver() {
        assert_eq!(NoTitleResolver.resolve("https://leetcode.com/problems/two-sum/"), None);
    }
}
