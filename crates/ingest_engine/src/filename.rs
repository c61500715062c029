use sha2::{Digest, Sha256};

const MAX_STEM_LEN: usize = 80;

/// Windows-safe, deterministic filename for a page: `{slug(url)}--{short_hash(url)}.txt`
///
/// The slug keeps ASCII letters and digits and turns everything else into `_`,
/// so `https://a.com/x` becomes `https___a_com_x`. The hash keeps long URLs
/// that share a truncated slug apart.
pub fn page_filename(url: &str) -> String {
    let slug = url_slug(url);
    let hash = short_hash(url);
    format!("{slug}--{hash}.txt")
}

pub fn url_slug(url: &str) -> String {
    let mut slug: String = url
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if slug.len() > MAX_STEM_LEN {
        slug.truncate(MAX_STEM_LEN);
    }
    if slug.is_empty() {
        slug.push_str("untitled");
    }
    slug
}

fn short_hash(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let digest = hasher.finalize();
    let mut hex = String::with_capacity(8);
    for byte in digest.iter().take(4) {
        use std::fmt::Write;
        let _ = write!(&mut hex, "{byte:02x}");
    }
    hex
}

#[cfg(test)]
mod tests {
    use super::{page_filename, url_slug};

    #[test]
    fn slug_replaces_every_non_alphanumeric() {
        assert_eq!(url_slug("https://a.com/x?y=1"), "https___a_com_x_y_1");
        assert_eq!(url_slug(""), "untitled");
    }

    #[test]
    fn filename_is_stable_and_bounded() {
        let long = format!("https://example.com/{}", "seg/".repeat(50));
        let name = page_filename(&long);
        assert_eq!(name, page_filename(&long));
        assert!(name.ends_with(".txt"));
        // slug + "--" + 8 hex + ".txt"
        assert_eq!(name.len(), 80 + 2 + 8 + 4);
        assert_ne!(page_filename("https://a.com/1"), page_filename("https://a.com/2"));
    }
}
