// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Span reconciler: raw detector spans -> literal-keyed PII mapping

use super::config::CollisionPolicy;
use super::mapping::PiiMapping;
use super::recognizer::DetectionSpan;

/// Build the PII mapping from spans in detector order.
///
/// No overlap resolution or scoring happens here: every span contributes its
/// literal. When a literal shows up under several kinds, `policy` decides
/// which kind is kept; the key keeps the position where it first appeared.
pub fn reconcile(text: &str, spans: &[DetectionSpan], policy: CollisionPolicy) -> PiiMapping {
    let mut mapping = PiiMapping::new();

    for span in spans {
        let Some(literal) = text.get(span.start..span.end) else {
            continue;
        };
        if literal.is_empty() {
            continue;
        }

        match policy {
            CollisionPolicy::LastWriteWins => {
                mapping.insert(literal, span.kind);
            }
            CollisionPolicy::FirstWriteWins => {
                mapping.insert_if_absent(literal, span.kind);
            }
        }
    }

    mapping
}
