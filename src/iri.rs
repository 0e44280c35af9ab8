//! `mailto:` IRIs (RFC 6068).

/// Build a `mailto:` IRI.
///
/// Header values and the body are fully percent-encoded. Body lines are
/// terminated with CRLF, as the RFC requires.
pub fn mailto(to: &str, headers: &[(&str, &str)], body: Option<&str>) -> String {
    let mut iri = format!("mailto:{}", urlencoding::encode(to).replace("%40", "@"));

    let body = body.map(|body| body.lines().map(|line| format!("{line}\r\n")).collect::<String>());
    let query: Vec<String> = headers
        .iter()
        .map(|(name, value)| (*name, *value))
        .chain(body.as_deref().map(|body| ("body", body)))
        .map(|(name, value)| {
            format!(
                "{}={}",
                urlencoding::encode(name),
                urlencoding::encode(value)
            )
        })
        .collect();

    if !query.is_empty() {
        iri.push('?');
        iri.push_str(&query.join("&"));
    }
    iri
}
