//! Access classification: pick strategies from the reference alone.
//!
//! Synchronous and side-effect free. The decision uses only the URL's host
//! and path, the configured policy, and whether the process has a rendering
//! engine; nothing is fetched.

use crate::config::{ExtractionConfig, RenderPolicy};
use crate::reference::DocumentReference;
use crate::strategy::StrategyDescriptor;
use once_cell::sync::Lazy;
use regex::Regex;

/// Viewers that build their slides in client-side script. The pattern is
/// matched against `host + path` with any leading `www.` removed.
static RE_CLIENT_RENDERED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?ix)^(?:
            (?:[a-z0-9-]+\.)*docsend\.com/ |
            (?:[a-z0-9-]+\.)*docsend\.dropbox\.com/ |
            pitch\.com/(?:v|public)/ |
            (?:[a-z0-9-]+\.)*gamma\.app/ |
            docs\.google\.com/presentation/ |
            (?:[a-z0-9-]+\.)*canva\.com/design/ |
            prezi\.com/ |
            (?:[a-z0-9-]+\.)*figma\.com/(?:proto|deck)/ |
            (?:[a-z0-9-]+\.)*beautiful\.ai/ |
            (?:[a-z0-9-]+\.)*slides\.com/
        )",
    )
    .unwrap()
});

/// True when the reference points at a known client-rendered viewer or a
/// host configured in `extra_hosts` (suffix match on the host).
pub fn requires_rendering(reference: &DocumentReference, extra_hosts: &[String]) -> bool {
    let host = reference.host();
    let target = format!("{}{}", host, reference.url().path());
    if RE_CLIENT_RENDERED.is_match(&target) {
        return true;
    }
    extra_hosts.iter().any(|h| {
        let h = h.trim_start_matches('.');
        !h.is_empty() && (host == h || host.ends_with(&format!(".{h}")))
    })
}

/// Ordered strategy list for `reference`.
///
/// Rendering goes first only when an engine is available and the policy
/// asks for it; static fetch is always present as the degraded path.
pub fn classify(
    reference: &DocumentReference,
    rendering_available: bool,
    config: &ExtractionConfig,
) -> Vec<StrategyDescriptor> {
    let wants_rendering = match config.render_policy {
        RenderPolicy::Never => false,
        RenderPolicy::Always => true,
        RenderPolicy::Auto => requires_rendering(reference, &config.rendering_hosts),
    };

    if wants_rendering && rendering_available {
        vec![StrategyDescriptor::RENDERED, StrategyDescriptor::STATIC_FETCH]
    } else {
        vec![StrategyDescriptor::STATIC_FETCH]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::ExtractionMethod;

    fn r(url: &str) -> DocumentReference {
        DocumentReference::parse(url, None).unwrap()
    }

    fn methods(list: &[StrategyDescriptor]) -> Vec<ExtractionMethod> {
        list.iter().map(|d| d.method).collect()
    }

    #[test]
    fn known_viewers_require_rendering() {
        for url in [
            "https://docsend.com/view/abc123",
            "https://www.docsend.com/view/abc123",
            "https://acme.docsend.com/view/xyz",
            "https://pitch.com/v/series-a-abc",
            "https://deck.gamma.app/docs/x",
            "https://docs.google.com/presentation/d/1abc/edit",
            "https://www.canva.com/design/DAF/view",
            "https://www.figma.com/proto/abc/Deck",
        ] {
            assert!(requires_rendering(&r(url), &[]), "{url} should need rendering");
        }
    }

    #[test]
    fn ordinary_pages_do_not() {
        for url in [
            "https://example.org/slides.html",
            "https://docs.google.com/document/d/1abc",
            "https://notdocsend.com/view/abc",
            "https://pitch.com/pricing",
        ] {
            assert!(!requires_rendering(&r(url), &[]), "{url} should not need rendering");
        }
    }

    #[test]
    fn extra_hosts_match_suffix() {
        let extra = vec!["decks.acme.io".to_string()];
        assert!(requires_rendering(&r("https://decks.acme.io/d/1"), &extra));
        assert!(requires_rendering(&r("https://eu.decks.acme.io/d/1"), &extra));
        assert!(!requires_rendering(&r("https://otherdecks.acme.io/d/1"), &extra));
    }

    #[test]
    fn auto_policy_orders_rendering_first_when_available() {
        let cfg = ExtractionConfig::default();
        let docsend = r("https://docsend.com/view/abc");
        assert_eq!(
            methods(&classify(&docsend, true, &cfg)),
            vec![ExtractionMethod::Rendered, ExtractionMethod::StaticFetch]
        );
        assert_eq!(
            methods(&classify(&docsend, false, &cfg)),
            vec![ExtractionMethod::StaticFetch]
        );
        assert_eq!(
            methods(&classify(&r("https://example.org/"), true, &cfg)),
            vec![ExtractionMethod::StaticFetch]
        );
    }

    #[test]
    fn explicit_policies() {
        let always = ExtractionConfig::builder()
            .render_policy(RenderPolicy::Always)
            .build()
            .unwrap();
        let never = ExtractionConfig::builder()
            .render_policy(RenderPolicy::Never)
            .build()
            .unwrap();
        let plain = r("https://example.org/");
        let docsend = r("https://docsend.com/view/abc");
        assert_eq!(classify(&plain, true, &always)[0].method, ExtractionMethod::Rendered);
        assert_eq!(classify(&plain, false, &always).len(), 1);
        assert_eq!(
            methods(&classify(&docsend, true, &never)),
            vec![ExtractionMethod::StaticFetch]
        );
    }

    #[test]
    fn classification_is_deterministic() {
        let cfg = ExtractionConfig::default();
        let docsend = r("https://docsend.com/view/abc");
        let first = classify(&docsend, true, &cfg);
        for _ in 0..10 {
            assert_eq!(classify(&docsend, true, &cfg), first);
        }
    }
}
