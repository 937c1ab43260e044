use url::Url;

/// Extracts the candidate short code from decode input.
///
/// Input without a `/` is taken as a bare code. Anything else is treated as
/// a short URL and the last non-empty path segment wins; when the text does
/// not parse as an absolute URL the same rule is applied to the raw text.
/// Returns `None` when nothing usable is left.
pub fn extract_short_code(input: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if !input.contains('/') {
        return Some(input.to_owned());
    }

    match Url::parse(input) {
        Ok(url) => match url.path_segments() {
            Some(segments) => last_non_empty(segments),
            // cannot-be-a-base urls such as `mailto:` have no segments
            None => last_segment_of(input),
        },
        Err(_) => last_segment_of(input),
    }
}

fn last_segment_of(text: &str) -> Option<String> {
    let path = text.split(&['?', '#'][..]).next().unwrap_or_default();
    last_non_empty(path.split('/'))
}

fn last_non_empty<'a>(segments: impl Iterator<Item = &'a str>) -> Option<String> {
    segments
        .filter(|segment| !segment.is_empty())
        .last()
        .map(str::to_owned)
}
