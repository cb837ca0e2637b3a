// crates/quick-surveys-core/src/runtime/links.rs
// ============================================================================
// Module: Quick Surveys External Links
// Description: Resolution and security checks for external survey links.
// Purpose: Decide whether a link is https and build per-viewer link URLs.
// Dependencies: crate::core, crate::interfaces, url
// ============================================================================

//! ## Overview
//! An external question's `link` is a message key whose text is the survey
//! URL. When the key does not resolve, a raw value that already parses as an
//! absolute URL is used directly. A link that resolves to nothing parseable
//! is left unchecked.

// ============================================================================
// SECTION: Imports
// ============================================================================

use url::Url;

use crate::core::ExternalQuestion;
use crate::interfaces::MessageResolver;
use crate::interfaces::ViewerContext;

// ============================================================================
// SECTION: Resolution
// ============================================================================

/// Resolves a link message to an absolute URL.
#[must_use]
pub fn resolve_link(link: &str, resolver: Option<&dyn MessageResolver>) -> Option<Url> {
    let resolved = resolver.and_then(|resolver| resolver.resolve(link));
    match resolved {
        Some(text) => Url::parse(text.trim()).ok(),
        None => Url::parse(link).ok(),
    }
}

/// Returns true when `url` is served over https.
#[must_use]
pub fn is_secure(url: &Url) -> bool {
    url.scheme() == "https"
}

/// Returns `url` with the viewer's instance token appended as a query
/// parameter.
#[must_use]
pub fn with_instance_token(url: &Url, parameter: &str, token: &str) -> Url {
    let mut out = url.clone();
    out.query_pairs_mut().append_pair(parameter, token);
    out
}

/// Builds the link a viewer follows for an external question.
///
/// The instance token is appended only when the question names a parameter
/// and the viewer carries a session token.
#[must_use]
pub fn viewer_link(
    question: &ExternalQuestion,
    viewer: &ViewerContext,
    resolver: Option<&dyn MessageResolver>,
) -> Option<Url> {
    let url = resolve_link(&question.link, resolver)?;
    match (&question.instance_token_parameter_name, &viewer.session_token) {
        (Some(parameter), Some(token)) => Some(with_instance_token(&url, parameter, token)),
        _ => Some(url),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
