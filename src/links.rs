//! Share URLs: building them, pulling tokens back out, social share links.
//!
//! The codec only produces tokens. A share link is
//! `<base_url>?<param>=<token>`, and because the token alphabet needs no
//! escaping the token is appended verbatim.

/// Text used when posting a gallery to social networks.
fn share_text(gallery_name: &str) -> String {
    format!("Check out my gallery: {gallery_name}")
}

/// Append `param=token` to `base_url` as a query parameter.
pub fn share_url(base_url: &str, param: &str, token: &str) -> String {
    let (base, fragment) = match base_url.split_once('#') {
        Some((base, fragment)) => (base, Some(fragment)),
        None => (base_url, None),
    };
    let separator = if !base.contains('?') {
        "?"
    } else if base.ends_with('?') || base.ends_with('&') {
        ""
    } else {
        "&"
    };
    let mut url = format!("{base}{separator}{param}={token}");
    if let Some(fragment) = fragment {
        url.push('#');
        url.push_str(fragment);
    }
    url
}

/// Extract the token from a share URL, or accept `input` as a bare token.
///
/// Returns `None` when `input` looks like a URL but has no `param` value.
pub fn token_from_input(input: &str, param: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    let looks_like_url = input.contains("://") || input.contains('?');
    if !looks_like_url {
        return Some(input.to_string());
    }

    let query = input.split_once('?')?.1;
    let query = query.split('#').next().unwrap_or(query);
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == param)
        .map(|(_, value)| {
            urlencoding::decode(value)
                .map(|decoded| decoded.into_owned())
                .unwrap_or_else(|_| value.to_string())
        })
        .filter(|token| !token.is_empty())
}

/// Pre-filled "share this" URLs for social networks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocialLinks {
    pub twitter: String,
    pub facebook: String,
}

pub fn social_links(gallery_name: &str, url: &str) -> SocialLinks {
    let text = urlencoding::encode(&share_text(gallery_name)).into_owned();
    let url = urlencoding::encode(url).into_owned();
    SocialLinks {
        twitter: format!("https://twitter.com/intent/tweet?text={text}&url={url}"),
        facebook: format!("https://www.facebook.com/sharer/sharer.php?u={url}"),
    }
}
