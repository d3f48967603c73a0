// ── Domain label matching ──

/// True when `candidate` equals `domain` or is a sub-domain of it.
///
/// Labels are compared right to left, ignoring ASCII case and a trailing
/// root dot. An empty string on either side never matches.
pub fn is_subdomain_of(candidate: &str, domain: &str) -> bool {
    let candidate = candidate.trim_end_matches('.');
    let domain = domain.trim_end_matches('.');
    if candidate.is_empty() || domain.is_empty() {
        return false;
    }

    let mut candidate_labels = candidate.rsplit('.');
    domain.rsplit('.').all(|label| {
        candidate_labels
            .next()
            .is_some_and(|c| c.eq_ignore_ascii_case(label))
    })
}
