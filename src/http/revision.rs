//! Conditional-request evaluation against document revisions
//!
//! Revisions are opaque tokens stamped by the store; clients send them
//! back quote-wrapped in `If-Match`/`If-None-Match` headers or bare in the
//! `rev` query parameter. The three checks are tried in that order and the
//! first one that applies decides the outcome.

use axum::http::header::{HeaderMap, IF_MATCH, IF_NONE_MATCH};

/// Client-supplied expected-revision constraints of one request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Preconditions {
    pub if_none_match: Option<String>,
    pub if_match: Option<String>,
    pub rev: Option<String>,
}

impl Preconditions {
    /// Collect the constraints from request headers and the `rev` query
    /// parameter.
    pub fn from_request(headers: &HeaderMap, rev: Option<String>) -> Self {
        let header = |name| {
            headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
        };
        Preconditions {
            if_none_match: header(IF_NONE_MATCH),
            if_match: header(IF_MATCH),
            rev,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.if_none_match.is_none() && self.if_match.is_none() && self.rev.is_none()
    }
}

/// Outcome of evaluating the preconditions against a revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevisionCheck {
    /// No constraint applies; carry out the request.
    Proceed,
    /// The client already holds this revision; answer 304 with no body.
    NotModified,
    /// An expected revision differs from the current one; answer 412.
    Mismatch,
}

/// Evaluate `preconditions` against the document's current revision.
pub fn check_revision(current: &str, preconditions: &Preconditions) -> RevisionCheck {
    if let Some(token) = &preconditions.if_none_match {
        if strip_quotes(token) == current {
            return RevisionCheck::NotModified;
        }
    }
    if let Some(token) = &preconditions.if_match {
        if strip_quotes(token) != current {
            return RevisionCheck::Mismatch;
        }
    }
    if let Some(rev) = &preconditions.rev {
        if rev != current {
            return RevisionCheck::Mismatch;
        }
    }
    RevisionCheck::Proceed
}

/// Strip one surrounding quote character on each side, if present.
fn strip_quotes(token: &str) -> &str {
    let token = token
        .strip_prefix('"')
        .or_else(|| token.strip_prefix('\''))
        .unwrap_or(token);
    token
        .strip_suffix('"')
        .or_else(|| token.strip_suffix('\''))
        .unwrap_or(token)
}
