//! Title and date headings
//!
//! Posts usually open with `# Title` followed by `## 2025-10-01`. Both
//! headings are lifted out of the body so they don't render twice.

use lazy_static::lazy_static;
use regex::Regex;

use super::FrontMatter;

lazy_static! {
    static ref H1_RE: Regex = Regex::new(r"^[ \t]*#[ \t]+(.+?)[ \t]*$").unwrap();
    static ref SUBHEADING_RE: Regex = Regex::new(r"^[ \t]*#{2,6}[ \t]+(.+?)[ \t]*$").unwrap();
    static ref FENCE_RE: Regex = Regex::new(r"^[ \t]{0,3}(`{3,}|~{3,})").unwrap();
}

/// Headings lifted out of a post body
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedHeadings {
    pub title: Option<String>,
    pub date: Option<String>,
    pub body: String,
}

/// Extract the first H1 as title and the next H2-H6 as date
pub fn extract_title_and_date(body: &str) -> ExtractedHeadings {
    let lines: Vec<&str> = body.lines().collect();
    let in_code = fenced_lines(&lines);

    let find = |re: &Regex, from: usize| {
        (from..lines.len())
            .filter(|&i| !in_code[i])
            .find_map(|i| re.captures(lines[i]).map(|caps| (i, caps[1].trim().to_string())))
    };

    let title = find(&H1_RE, 0);
    let date = find(&SUBHEADING_RE, title.as_ref().map_or(0, |(i, _)| i + 1));

    let removed: Vec<usize> = [&title, &date]
        .iter()
        .filter_map(|h| h.as_ref().map(|(i, _)| *i))
        .collect();
    let remaining: Vec<&str> = lines
        .iter()
        .enumerate()
        .filter(|(i, _)| !removed.contains(i))
        .map(|(_, line)| *line)
        .collect();

    ExtractedHeadings {
        title: title.map(|(_, t)| t),
        date: date.map(|(_, d)| d),
        body: remaining.join("\n").trim().to_string(),
    }
}

/// Mark lines that belong to a fenced code block, fences included
fn fenced_lines(lines: &[&str]) -> Vec<bool> {
    let mut fence: Option<&str> = None;
    lines
        .iter()
        .map(|line| {
            let marker = FENCE_RE.captures(line).and_then(|c| c.get(1)).map(|m| m.as_str());
            match (fence, marker) {
                (None, Some(open)) => fence = Some(open),
                (Some(open), Some(close)) if close.starts_with(open) && line.trim() == close => {
                    fence = None;
                    return true;
                }
                _ => {}
            }
            fence.is_some()
        })
        .collect()
}

/// Front matter wins, then the extracted heading, then the file name
pub fn resolve_title(fm: &FrontMatter, extracted: &ExtractedHeadings, file_name: &str) -> String {
    fm.title()
        .map(str::to_string)
        .or_else(|| extracted.title.clone())
        .unwrap_or_else(|| title_from_file_name(file_name))
}

/// Front matter wins, then the extracted heading, then empty
pub fn resolve_date(fm: &FrontMatter, extracted: &ExtractedHeadings) -> String {
    fm.date()
        .map(str::to_string)
        .or_else(|| extracted.date.clone())
        .unwrap_or_default()
}

/// `10052025_intro-genbio.md` -> `10052025 intro genbio`
pub fn title_from_file_name(file_name: &str) -> String {
    file_name
        .strip_suffix(".md")
        .unwrap_or(file_name)
        .replace(['-', '_'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_and_date() {
        let extracted = extract_title_and_date("# Title\n## 2025-01-01\nBody text");
        assert_eq!(extracted.title.as_deref(), Some("Title"));
        assert_eq!(extracted.date.as_deref(), Some("2025-01-01"));
        assert_eq!(extracted.body, "Body text");
    }

    #[test]
    fn test_only_first_matches_are_removed() {
        let md = "# Title\n\n### Oct 4, 2025\n\nIntro\n\n# Second H1\n\n## Section\n";
        let extracted = extract_title_and_date(md);
        assert_eq!(extracted.title.as_deref(), Some("Title"));
        assert_eq!(extracted.date.as_deref(), Some("Oct 4, 2025"));
        assert_eq!(extracted.body, "Intro\n\n# Second H1\n\n## Section");
    }

    #[test]
    fn test_date_without_title() {
        let extracted = extract_title_and_date("Intro\n\n## 2025-10-10\n\nBody");
        assert_eq!(extracted.title, None);
        assert_eq!(extracted.date.as_deref(), Some("2025-10-10"));
        assert_eq!(extracted.body, "Intro\n\n\nBody");
    }

    #[test]
    fn test_date_must_follow_title() {
        let extracted = extract_title_and_date("## Preface\n\n# Title\n\n## 2025-10-10\n\nBody");
        assert_eq!(extracted.title.as_deref(), Some("Title"));
        assert_eq!(extracted.date.as_deref(), Some("2025-10-10"));
        assert_eq!(extracted.body, "## Preface\n\n\n\nBody");
    }

    #[test]
    fn test_no_headings() {
        let extracted = extract_title_and_date("\n  Just text.  \n");
        assert_eq!(extracted.title, None);
        assert_eq!(extracted.date, None);
        assert_eq!(extracted.body, "Just text.");
    }

    #[test]
    fn test_hash_without_space_is_not_heading() {
        let extracted = extract_title_and_date("#hashtag\n\n# Real");
        assert_eq!(extracted.title.as_deref(), Some("Real"));
        assert_eq!(extracted.body, "#hashtag");
    }

    #[test]
    fn test_headings_in_code_fences_are_ignored() {
        let md = "```bash\n# install\n## deps\n```\n\n# Title\n## Date";
        let extracted = extract_title_and_date(md);
        assert_eq!(extracted.title.as_deref(), Some("Title"));
        assert_eq!(extracted.date.as_deref(), Some("Date"));
        assert_eq!(extracted.body, "```bash\n# install\n## deps\n```");
    }

    #[test]
    fn test_resolve_precedence() {
        let extracted = extract_title_and_date("# Heading Title\n## 2025-01-01\nBody");

        let (fm, _) = FrontMatter::parse("---\ntitle: Meta Title\n---\n");
        assert_eq!(resolve_title(&fm, &extracted, "post.md"), "Meta Title");
        assert_eq!(resolve_date(&fm, &extracted), "2025-01-01");

        let empty = FrontMatter::default();
        assert_eq!(resolve_title(&empty, &extracted, "post.md"), "Heading Title");

        let bare = extract_title_and_date("Body only");
        assert_eq!(
            resolve_title(&empty, &bare, "100425_everything-ode.md"),
            "100425 everything ode"
        );
        assert_eq!(resolve_date(&empty, &bare), "");
    }
}
