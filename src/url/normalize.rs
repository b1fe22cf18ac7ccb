use url::Url;

/// Resolves references against a base URL
///
/// References that cannot be resolved, or that do not resolve to an absolute
/// `http`/`https` URL, are dropped. Fragments are removed from the results.
///
/// # Arguments
///
/// * `base_url` - The URL the references were found on
/// * `references` - Raw references (absolute or relative)
///
/// # Returns
///
/// The absolute URLs, in input order
pub fn get_absolute<'a, I>(base_url: &Url, references: I) -> Vec<Url>
where
    I: IntoIterator<Item = &'a str>,
{
    references
        .into_iter()
        .filter_map(|reference| resolve(base_url, reference))
        .collect()
}

fn resolve(base_url: &Url, reference: &str) -> Option<Url> {
    let reference = reference.trim();
    if reference.is_empty() {
        return None;
    }

    let mut absolute = base_url.join(reference).ok()?;
    if absolute.scheme() != "http" && absolute.scheme() != "https" {
        return None;
    }
    if absolute.host_str().map_or(true, str::is_empty) {
        return None;
    }

    absolute.set_fragment(None);
    Some(absolute)
}
