#![forbid(unsafe_code)]

//! Transformation selection.
//!
//! Hints narrow the candidate list in a fixed order and are ignored when they
//! would leave nothing. Remaining ties are broken by preferring the signing
//! view, the richest output format and then the Slovak language.

use tracing::debug;

use crate::params::{DestinationType, ManifestEntry, MediaDestination, XsltParams};

/// Pick one transformation from the manifest entries.
///
/// Returns `None` only for an empty list.
pub fn select_xslt(entries: &[ManifestEntry], hints: &XsltParams) -> Option<ManifestEntry> {
    let mut candidates: Vec<&ManifestEntry> = entries.iter().collect();

    let filters: [Box<dyn Fn(&ManifestEntry) -> bool + '_>; 3] = [
        Box::new(|e| {
            hints
                .destination_type
                .as_ref()
                .map_or(true, |dt| e.destination_type == *dt)
        }),
        Box::new(|e| {
            hints
                .language
                .as_deref()
                .map_or(true, |lang| e.language.as_deref() == Some(lang))
        }),
        Box::new(|e| {
            hints
                .target
                .as_deref()
                .map_or(true, |target| e.target_environment.as_deref() == Some(target))
        }),
    ];
    for filter in &filters {
        narrow(&mut candidates, |e| filter(e));
        if candidates.len() == 1 {
            return candidates.first().map(|e| (*e).clone());
        }
    }

    narrow(&mut candidates, |e| e.media_destination == MediaDestination::Sign);
    for preferred in [DestinationType::Xhtml, DestinationType::Html, DestinationType::Txt] {
        if narrow(&mut candidates, |e| e.destination_type == preferred) {
            break;
        }
    }
    for preferred in ["sk", "en"] {
        if narrow(&mut candidates, |e| e.language.as_deref() == Some(preferred)) {
            break;
        }
    }

    let selected = candidates.first().map(|e| (*e).clone());
    if let Some(entry) = &selected {
        debug!(path = %entry.full_path, destination_type = %entry.destination_type, "selected transformation");
    }
    selected
}

/// Keep only matching candidates, unless none match. Returns whether any did.
fn narrow<F>(candidates: &mut Vec<&ManifestEntry>, keep: F) -> bool
where
    F: Fn(&ManifestEntry) -> bool,
{
    if !candidates.iter().any(|e| keep(e)) {
        return false;
    }
    candidates.retain(|e| keep(e));
    true
}
